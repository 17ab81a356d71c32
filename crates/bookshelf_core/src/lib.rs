//! Core domain logic for the Bookshelf personal library.
//! This crate is the single source of truth for book invariants and storage.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::LibraryConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::book::{Book, BookId, BookValidationError};
pub use repo::book_repo::{BookRepository, RepoError, RepoResult, SqliteBookRepository};
pub use repo::book_row::{decode_genres, encode_genres, BookRow};
pub use service::library_service::{LibraryError, LibraryResult, LibraryService, SaveAction};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
