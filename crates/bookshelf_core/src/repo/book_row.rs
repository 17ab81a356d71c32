//! Storage mapping between [`Book`] and the `books` row shape.
//!
//! # Responsibility
//! - Describe the persisted row as an explicit struct.
//! - Convert in both directions with pure functions, no SQL involved.
//!
//! # Invariants
//! - The mapper never validates; that belongs to `Book::validate()`.
//! - Genre round-trips keep non-blank trimmed entries in order.

use crate::model::book::{Book, BookId};
use crate::repo::book_repo::{RepoError, RepoResult};
use uuid::Uuid;

/// Separator written between genres in the `genres` column.
pub const GENRE_SEPARATOR: &str = ", ";

/// Persisted shape of one `books` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRow {
    /// Raw 16-byte UUID.
    pub id: Vec<u8>,
    pub title: String,
    pub author: String,
    pub year_published: Option<i32>,
    pub year_read: Option<i32>,
    pub cover_image_path: Option<String>,
    pub summary: Option<String>,
    pub rating: Option<i32>,
    /// Comma-delimited genre list; empty when the book has none.
    pub genres: String,
    pub cover_image: Option<String>,
    /// SQLite boolean, `0` or `1`.
    pub is_remote_image: i64,
}

impl BookRow {
    /// Maps a record to its row using `id` as the primary key.
    ///
    /// `id` is passed separately because new records only receive one at
    /// insert time.
    pub fn from_book(book: &Book, id: BookId) -> Self {
        Self {
            id: id.as_bytes().to_vec(),
            title: book.title.clone(),
            author: book.author.clone(),
            year_published: book.year_published,
            year_read: book.year_read,
            cover_image_path: book.cover_image_path.clone(),
            summary: book.summary.clone(),
            rating: book.rating,
            genres: encode_genres(&book.genres),
            cover_image: book.cover_image.clone(),
            is_remote_image: i64::from(book.is_remote_image),
        }
    }

    /// Maps a row back to a stored record.
    ///
    /// # Errors
    /// - `RepoError::InvalidData` when the id is not 16 bytes or the boolean
    ///   column holds something other than `0`/`1`.
    pub fn into_book(self) -> RepoResult<Book> {
        let id = Uuid::from_slice(&self.id).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid id of {} bytes in books.id",
                self.id.len()
            ))
        })?;

        let is_remote_image = match self.is_remote_image {
            0 => false,
            1 => true,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid is_remote_image value `{other}` in books.is_remote_image"
                )));
            }
        };

        Ok(Book {
            id: Some(id),
            title: self.title,
            author: self.author,
            year_published: self.year_published,
            year_read: self.year_read,
            cover_image_path: self.cover_image_path,
            summary: self.summary,
            rating: self.rating,
            genres: decode_genres(&self.genres),
            cover_image: self.cover_image,
            is_remote_image,
        })
    }
}

/// Joins genres for storage, dropping blank entries and trimming the rest.
pub fn encode_genres(genres: &[String]) -> String {
    genres
        .iter()
        .map(|genre| genre.trim())
        .filter(|genre| !genre.is_empty())
        .collect::<Vec<_>>()
        .join(GENRE_SEPARATOR)
}

/// Splits a stored genre string, trimming parts and dropping empty ones.
pub fn decode_genres(stored: &str) -> Vec<String> {
    stored
        .split(',')
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
        .map(str::to_string)
        .collect()
}
