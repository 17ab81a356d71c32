//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the canonical `books` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Book::validate()` before any SQL mutation.
//! - Every operation runs in its own transaction; errors roll it back.
//! - Absent rows are reported as `None`/`false`, never as errors.
//! - `update_book` never inserts.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::book::{Book, BookId, BookValidationError};
use crate::repo::book_row::BookRow;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const BOOKS_TABLE: &str = "books";

const REQUIRED_BOOK_COLUMNS: &[&str] = &[
    "id",
    "title",
    "author",
    "year_published",
    "year_read",
    "cover_image_path",
    "summary",
    "rating",
    "genres",
    "cover_image",
    "is_remote_image",
];

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    year_published,
    year_read,
    cover_image_path,
    summary,
    rating,
    genres,
    cover_image,
    is_remote_image
FROM books";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for book persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BookValidationError> for RepoError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for book CRUD operations.
pub trait BookRepository {
    /// Inserts a new row and returns the record as read back from storage.
    fn create_book(&self, book: &Book) -> RepoResult<Book>;
    /// Returns every stored book in insertion order.
    fn get_all_books(&self) -> RepoResult<Vec<Book>>;
    fn get_book_by_id(&self, id: BookId) -> RepoResult<Option<Book>>;
    /// Replaces every field of an existing row; `None` when no row matches.
    fn update_book(&self, book: &Book) -> RepoResult<Option<Book>>;
    /// Returns whether a row was removed.
    fn delete_book(&self, id: BookId) -> RepoResult<bool>;
    fn count_books(&self) -> RepoResult<u64>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    /// Wraps a connection produced by `db::open_db` / `db::open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the `books`
    ///   table does not have the expected shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let columns = table_columns(conn, BOOKS_TABLE)?;
        if columns.is_empty() {
            return Err(RepoError::MissingRequiredTable(BOOKS_TABLE));
        }
        if let Some(column) = REQUIRED_BOOK_COLUMNS
            .iter()
            .copied()
            .find(|required| !columns.iter().any(|name| name == required))
        {
            return Err(RepoError::MissingRequiredColumn {
                table: BOOKS_TABLE,
                column,
            });
        }

        Ok(Self { conn })
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(self.conn.unchecked_transaction()?)
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, book: &Book) -> RepoResult<Book> {
        book.validate()?;

        let id = book.id.unwrap_or_else(Uuid::new_v4);
        let row = BookRow::from_book(book, id);

        let tx = self.begin()?;
        tx.execute(
            "INSERT INTO books (
                id,
                title,
                author,
                year_published,
                year_read,
                cover_image_path,
                summary,
                rating,
                genres,
                cover_image,
                is_remote_image
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                row.id,
                row.title,
                row.author,
                row.year_published,
                row.year_read,
                row.cover_image_path,
                row.summary,
                row.rating,
                row.genres,
                row.cover_image,
                row.is_remote_image,
            ],
        )?;

        let stored = select_by_id(&tx, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted book {id} not found in read-back"))
        })?;
        tx.commit()?;

        info!("event=book_create module=repo status=ok book_id={id}");
        Ok(stored)
    }

    fn get_all_books(&self) -> RepoResult<Vec<Book>> {
        let tx = self.begin()?;
        let books = {
            let mut stmt = tx.prepare(&format!("{BOOK_SELECT_SQL} ORDER BY rowid ASC;"))?;
            let mut rows = stmt.query([])?;
            let mut books = Vec::new();
            while let Some(row) = rows.next()? {
                books.push(read_book_row(row)?.into_book()?);
            }
            books
        };
        tx.commit()?;

        debug!(
            "event=book_list module=repo status=ok count={}",
            books.len()
        );
        Ok(books)
    }

    fn get_book_by_id(&self, id: BookId) -> RepoResult<Option<Book>> {
        let tx = self.begin()?;
        let book = select_by_id(&tx, id)?;
        tx.commit()?;
        Ok(book)
    }

    fn update_book(&self, book: &Book) -> RepoResult<Option<Book>> {
        book.validate()?;

        let Some(id) = book.id else {
            debug!("event=book_update module=repo status=not_found reason=missing_id");
            return Ok(None);
        };
        let row = BookRow::from_book(book, id);

        let tx = self.begin()?;
        let changed = tx.execute(
            "UPDATE books
             SET
                title = ?1,
                author = ?2,
                year_published = ?3,
                year_read = ?4,
                cover_image_path = ?5,
                summary = ?6,
                rating = ?7,
                genres = ?8,
                cover_image = ?9,
                is_remote_image = ?10
             WHERE id = ?11;",
            params![
                row.title,
                row.author,
                row.year_published,
                row.year_read,
                row.cover_image_path,
                row.summary,
                row.rating,
                row.genres,
                row.cover_image,
                row.is_remote_image,
                row.id,
            ],
        )?;

        if changed == 0 {
            debug!("event=book_update module=repo status=not_found book_id={id}");
            return Ok(None);
        }

        let stored = select_by_id(&tx, id)?;
        tx.commit()?;

        info!("event=book_update module=repo status=ok book_id={id}");
        Ok(stored)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<bool> {
        let tx = self.begin()?;
        let changed = tx.execute(
            "DELETE FROM books WHERE id = ?1;",
            params![id.as_bytes().as_slice()],
        )?;
        tx.commit()?;

        let deleted = changed > 0;
        info!("event=book_delete module=repo status=ok book_id={id} deleted={deleted}");
        Ok(deleted)
    }

    fn count_books(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM books;", [], |row| row.get::<_, i64>(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn select_by_id(conn: &Connection, id: BookId) -> RepoResult<Option<Book>> {
    let row = conn
        .query_row(
            &format!("{BOOK_SELECT_SQL} WHERE id = ?1;"),
            params![id.as_bytes().as_slice()],
            read_book_row,
        )
        .optional()?;

    row.map(BookRow::into_book).transpose()
}

fn read_book_row(row: &Row<'_>) -> rusqlite::Result<BookRow> {
    Ok(BookRow {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        year_published: row.get("year_published")?,
        year_read: row.get("year_read")?,
        cover_image_path: row.get("cover_image_path")?,
        summary: row.get("summary")?,
        rating: row.get("rating")?,
        genres: row.get::<_, Option<String>>("genres")?.unwrap_or_default(),
        cover_image: row.get("cover_image")?,
        is_remote_image: row.get("is_remote_image")?,
    })
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}
