//! Library use-case service.
//!
//! # Responsibility
//! - Provide the single entry point callers use to store and query books.
//! - Decide between create and update for `save_book`.
//!
//! # Invariants
//! - Validation failures are reported before any storage access.
//! - `save_book` never turns a failed update into an insert.
//! - Storage errors are propagated unchanged; nothing is retried.

use crate::model::book::{Book, BookId, BookValidationError};
use crate::repo::book_repo::{BookRepository, RepoError};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LibraryResult<T> = Result<T, LibraryError>;

/// Service error for library use-cases.
#[derive(Debug)]
pub enum LibraryError {
    /// Input record broke a model rule.
    Validation(BookValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Storage changed between the existence check and the write.
    InconsistentState(&'static str),
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid book: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent library state: {details}"),
        }
    }
}

impl Error for LibraryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<BookValidationError> for LibraryError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for LibraryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Outcome of the existence check performed by `save_book`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAction {
    Create,
    Update(BookId),
}

/// Facade over a [`BookRepository`].
pub struct LibraryService<R: BookRepository> {
    repo: R,
}

impl<R: BookRepository> LibraryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates or replaces a book.
    ///
    /// # Contract
    /// - Record with an id that is already stored: full replacement.
    /// - Record without id, or with an id nothing is stored under: insert.
    /// - Returns the record as read back from storage.
    pub fn save_book(&self, book: &Book) -> LibraryResult<Book> {
        book.validate()?;

        match self.plan_save(book)? {
            SaveAction::Update(id) => {
                debug!("event=book_save module=service action=update book_id={id}");
                self.repo
                    .update_book(book)?
                    .ok_or(LibraryError::InconsistentState(
                        "book disappeared before update",
                    ))
            }
            SaveAction::Create => {
                debug!("event=book_save module=service action=create");
                Ok(self.repo.create_book(book)?)
            }
        }
    }

    /// Resolves which write `save_book` performs for this record.
    pub fn plan_save(&self, book: &Book) -> LibraryResult<SaveAction> {
        let Some(id) = book.id else {
            return Ok(SaveAction::Create);
        };

        if self.repo.get_book_by_id(id)?.is_some() {
            Ok(SaveAction::Update(id))
        } else {
            Ok(SaveAction::Create)
        }
    }

    /// Lists every stored book.
    pub fn get_all_books(&self) -> LibraryResult<Vec<Book>> {
        Ok(self.repo.get_all_books()?)
    }

    /// Gets one book by id; `None` when absent.
    pub fn get_book_by_id(&self, id: BookId) -> LibraryResult<Option<Book>> {
        Ok(self.repo.get_book_by_id(id)?)
    }

    /// Deletes a book; `false` when nothing was stored under `id`.
    pub fn delete_book(&self, id: BookId) -> LibraryResult<bool> {
        Ok(self.repo.delete_book(id)?)
    }

    pub fn count_books(&self) -> LibraryResult<u64> {
        Ok(self.repo.count_books()?)
    }
}
