use bookshelf_core::db::migrations::latest_version;
use bookshelf_core::db::open_db_in_memory;
use bookshelf_core::{Book, BookRepository, RepoError, SqliteBookRepository};
use rusqlite::Connection;
use uuid::Uuid;

fn sample_book() -> Book {
    let mut book = Book::new("Dune", "Frank Herbert");
    book.year_published = Some(1965);
    book.year_read = Some(2019);
    book.rating = Some(5);
    book.summary = Some("Desert planet politics.".to_string());
    book.genres = vec!["Sci-Fi".to_string(), "Classic".to_string()];
    book.cover_image_path = Some("/covers/dune.png".to_string());
    book
}

#[test]
fn create_assigns_id_and_get_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let created = repo.create_book(&sample_book()).unwrap();
    let id = created.id.unwrap();
    assert!(!id.is_nil());

    let loaded = repo.get_book_by_id(id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.genres, vec!["Sci-Fi", "Classic"]);
    assert_eq!(loaded.rating, Some(5));
}

#[test]
fn create_keeps_caller_supplied_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let id = Uuid::parse_str("00000000-0000-4000-8000-000000000001").unwrap();
    let book = Book::with_id(id, "Emma", "Jane Austen").unwrap();

    let created = repo.create_book(&book).unwrap();
    assert_eq!(created.id, Some(id));
}

#[test]
fn create_with_duplicate_id_surfaces_storage_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let created = repo.create_book(&sample_book()).unwrap();
    let err = repo.create_book(&created).unwrap_err();

    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(repo.count_books().unwrap(), 1);
}

#[test]
fn create_normalizes_genres_on_read_back() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let mut book = Book::new("Solaris", "Stanislaw Lem");
    book.genres = vec!["Sci-Fi".to_string(), " Drama ".to_string(), "".to_string()];
    let created = repo.create_book(&book).unwrap();

    assert_eq!(created.genres, vec!["Sci-Fi", "Drama"]);
    let stored: String = conn
        .query_row("SELECT genres FROM books;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, "Sci-Fi, Drama");
}

#[test]
fn get_by_unknown_id_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    assert!(repo.get_book_by_id(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn get_all_returns_books_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let titles = ["Zorba the Greek", "Anna Karenina", "Middlemarch"];
    for title in titles {
        repo.create_book(&Book::new(title, "Someone")).unwrap();
    }

    let listed: Vec<String> = repo
        .get_all_books()
        .unwrap()
        .into_iter()
        .map(|book| book.title)
        .collect();
    assert_eq!(listed, titles);
}

#[test]
fn update_overwrites_every_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let mut book = repo.create_book(&sample_book()).unwrap();
    book.title = "Dune Messiah".to_string();
    book.year_published = Some(1969);
    book.year_read = None;
    book.rating = None;
    book.summary = None;
    book.genres = vec!["Sequel".to_string()];
    book.cover_image = Some("https://example.org/messiah.jpg".to_string());
    book.is_remote_image = true;

    let updated = repo.update_book(&book).unwrap().unwrap();
    assert_eq!(updated, book);
    assert_eq!(repo.get_book_by_id(book.id.unwrap()).unwrap().unwrap(), book);
}

#[test]
fn update_unknown_id_returns_none_without_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.create_book(&sample_book()).unwrap();

    let stray = Book::with_id(Uuid::new_v4(), "Ghost", "Nobody").unwrap();
    assert!(repo.update_book(&stray).unwrap().is_none());
    assert_eq!(repo.count_books().unwrap(), 1);
}

#[test]
fn update_without_id_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    assert!(repo.update_book(&sample_book()).unwrap().is_none());
    assert_eq!(repo.count_books().unwrap(), 0);
}

#[test]
fn delete_reports_whether_row_existed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let created = repo.create_book(&sample_book()).unwrap();
    let id = created.id.unwrap();

    assert!(!repo.delete_book(Uuid::new_v4()).unwrap());
    assert_eq!(repo.count_books().unwrap(), 1);

    assert!(repo.delete_book(id).unwrap());
    assert!(!repo.delete_book(id).unwrap());
    assert!(repo.get_book_by_id(id).unwrap().is_none());
    assert!(repo.update_book(&created).unwrap().is_none());
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let mut invalid = sample_book();
    invalid.rating = Some(9);
    let create_err = repo.create_book(&invalid).unwrap_err();
    assert!(matches!(create_err, RepoError::Validation(_)));
    assert_eq!(repo.count_books().unwrap(), 0);

    let mut stored = repo.create_book(&sample_book()).unwrap();
    stored.title = String::new();
    let update_err = repo.update_book(&stored).unwrap_err();
    assert!(matches!(update_err, RepoError::Validation(_)));

    let reloaded = repo.get_book_by_id(stored.id.unwrap()).unwrap().unwrap();
    assert_eq!(reloaded.title, "Dune");
}

#[test]
fn failed_operation_leaves_connection_usable() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let created = repo.create_book(&sample_book()).unwrap();
    repo.create_book(&created).unwrap_err();

    assert!(conn.is_autocommit());
    repo.create_book(&Book::new("Emma", "Jane Austen")).unwrap();
    assert_eq!(repo.count_books().unwrap(), 2);
}

#[test]
fn get_all_rejects_corrupted_id_bytes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.create_book(&sample_book()).unwrap();

    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         UPDATE books SET id = x'0102';",
    )
    .unwrap();

    let err = repo.get_all_books().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteBookRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_books_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteBookRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("books"))
    ));
}

#[test]
fn repository_rejects_books_table_missing_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE books (
            id BLOB PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            author TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteBookRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "books",
            column: "year_published"
        })
    ));
}
