//! Command-line entry point for the Bookshelf library.
//!
//! # Responsibility
//! - Resolve configuration, start logging, open the database.
//! - Map subcommands onto `LibraryService` calls and print the results.

use anyhow::{bail, Context, Result};
use bookshelf_core::config::{DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
use bookshelf_core::db::open_db;
use bookshelf_core::{
    decode_genres, init_logging, Book, BookId, BookRepository, LibraryConfig, LibraryService,
    SqliteBookRepository,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Manage a personal book library stored in SQLite.
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version = bookshelf_core::core_version())]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = DB_PATH_ENV)]
    db_path: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, env = LOG_LEVEL_ENV)]
    log_level: Option<String>,

    /// Directory for rolling log files.
    #[arg(long, env = LOG_DIR_ENV)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every book.
    List {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Show one book.
    Show {
        id: BookId,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Add a new book.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Replace fields of an existing book.
    Edit {
        id: BookId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Delete a book.
    Delete { id: BookId },
}

/// Optional book fields shared by `add` and `edit`. An empty string clears a
/// text field; `--clear-*` flags clear numeric ones.
#[derive(Debug, Default, Args)]
struct BookFields {
    #[arg(long, conflicts_with = "clear_year_published")]
    year_published: Option<i32>,
    #[arg(long, conflicts_with = "clear_year_read")]
    year_read: Option<i32>,
    /// 1 to 5.
    #[arg(long, conflicts_with = "clear_rating")]
    rating: Option<i32>,
    #[arg(long)]
    clear_year_published: bool,
    #[arg(long)]
    clear_year_read: bool,
    #[arg(long)]
    clear_rating: bool,
    /// Comma-separated, e.g. "Sci-Fi, Classic".
    #[arg(long)]
    genres: Option<String>,
    #[arg(long)]
    summary: Option<String>,
    #[arg(long)]
    cover_image_path: Option<String>,
    #[arg(long)]
    cover_image: Option<String>,
    /// Bare flag means `true`; pass `false` to unset.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    remote_image: Option<bool>,
}

impl BookFields {
    fn apply_to(self, book: &mut Book) {
        if self.clear_year_published {
            book.year_published = None;
        }
        if self.clear_year_read {
            book.year_read = None;
        }
        if self.clear_rating {
            book.rating = None;
        }
        if let Some(year) = self.year_published {
            book.year_published = Some(year);
        }
        if let Some(year) = self.year_read {
            book.year_read = Some(year);
        }
        if let Some(rating) = self.rating {
            book.rating = Some(rating);
        }
        if let Some(genres) = self.genres {
            book.genres = decode_genres(&genres);
        }
        if let Some(summary) = self.summary {
            book.summary = non_empty(summary);
        }
        if let Some(path) = self.cover_image_path {
            book.cover_image_path = non_empty(path);
        }
        if let Some(image) = self.cover_image {
            book.cover_image = non_empty(image);
        }
        if let Some(remote) = self.remote_image {
            book.is_remote_image = remote;
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl Cli {
    fn resolve_config(&self) -> LibraryConfig {
        let mut config = LibraryConfig::from_env();
        if let Some(path) = &self.db_path {
            config.db_path = path.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config();

    let log_dir = absolute(&config.log_dir)?;
    init_logging(&config.log_level, &log_dir).context("failed to initialize logging")?;

    let conn = open_db(&config.db_path).with_context(|| {
        format!(
            "failed to open library database at {}",
            config.db_path.display()
        )
    })?;
    let repo = SqliteBookRepository::try_new(&conn).context("library database is not usable")?;
    let service = LibraryService::new(repo);

    let mut stdout = std::io::stdout().lock();
    run(&service, cli.command, &mut stdout)
}

fn run<R: BookRepository>(
    service: &LibraryService<R>,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::List { format } => {
            let books = service.get_all_books().context("failed to list books")?;
            match format {
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&books)?)?,
                OutputFormat::Pretty if books.is_empty() => writeln!(out, "No books yet.")?,
                OutputFormat::Pretty => {
                    for book in &books {
                        writeln!(out, "{}", summary_line(book))?;
                    }
                }
            }
        }
        Command::Show { id, format } => {
            let Some(book) = service.get_book_by_id(id).context("failed to load book")? else {
                bail!("book {id} not found");
            };
            match format {
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&book)?)?,
                OutputFormat::Pretty => write_details(out, &book)?,
            }
        }
        Command::Add {
            title,
            author,
            fields,
        } => {
            let mut book = Book::new(title, author);
            fields.apply_to(&mut book);
            let saved = service.save_book(&book).context("failed to add book")?;
            info!("event=cli_add module=cli status=ok");
            writeln!(out, "Added {}", summary_line(&saved))?;
        }
        Command::Edit {
            id,
            title,
            author,
            fields,
        } => {
            let Some(mut book) = service.get_book_by_id(id).context("failed to load book")? else {
                bail!("book {id} not found");
            };
            if let Some(title) = title {
                book.title = title;
            }
            if let Some(author) = author {
                book.author = author;
            }
            fields.apply_to(&mut book);
            let saved = service.save_book(&book).context("failed to update book")?;
            writeln!(out, "Updated {}", summary_line(&saved))?;
        }
        Command::Delete { id } => {
            if service.delete_book(id).context("failed to delete book")? {
                writeln!(out, "Deleted {id}")?;
            } else {
                writeln!(out, "No book with id {id}")?;
            }
        }
    }
    Ok(())
}

fn summary_line(book: &Book) -> String {
    let id = book.id.map(|id| id.to_string()).unwrap_or_default();
    let mut line = format!("{id}  {}", book.display_title());
    if let Some(rating) = book.rating {
        line.push_str(&format!("  [{rating}/5]"));
    }
    if !book.genres.is_empty() {
        line.push_str(&format!("  ({})", book.genres.join(", ")));
    }
    line
}

fn write_details(out: &mut impl Write, book: &Book) -> std::io::Result<()> {
    let optional = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    writeln!(out, "id:             {}", optional(book.id.map(|id| id.to_string())))?;
    writeln!(out, "title:          {}", book.title)?;
    writeln!(out, "author:         {}", book.author)?;
    writeln!(out, "published:      {}", optional(book.year_published.map(|y| y.to_string())))?;
    writeln!(out, "read:           {}", optional(book.year_read.map(|y| y.to_string())))?;
    writeln!(out, "rating:         {}", optional(book.rating.map(|r| format!("{r}/5"))))?;
    writeln!(out, "genres:         {}", book.genres.join(", "))?;
    writeln!(out, "cover path:     {}", optional(book.cover_image_path.clone()))?;
    writeln!(out, "cover image:    {}", optional(book.cover_image.clone()))?;
    writeln!(out, "remote image:   {}", book.is_remote_image)?;
    writeln!(out, "summary:        {}", optional(book.summary.clone()))?;
    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(path))
}
