//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the CRUD contract for stored books.
//! - Isolate SQLite query details and row mapping from the service layer.
//!
//! # Invariants
//! - Repository writes enforce `Book::validate()` before persistence.
//! - Not-found is a value (`None`/`false`), not an error.

pub mod book_repo;
pub mod book_row;
