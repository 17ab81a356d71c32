//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical in-memory record for one book in the library.
//! - Own record-level validation (required text, numeric ranges, identity).
//!
//! # Invariants
//! - `id` is `None` until the repository persists the record, then stable.
//! - A persisted `id` is never the nil UUID.
//! - `genres` keeps caller order; blanks and duplicates are not filtered here.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;
use uuid::Uuid;

/// Stable identifier for a stored book.
pub type BookId = Uuid;

/// Earliest accepted publication year (movable-type printing).
pub const MIN_YEAR_PUBLISHED: i32 = 1450;
/// Earliest accepted reading year.
pub const MIN_YEAR_READ: i32 = 1900;
/// Accepted rating bounds, inclusive.
pub const RATING_RANGE: RangeInclusive<i32> = 1..=5;

/// Validation failures for [`Book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    /// Title is empty or whitespace only.
    EmptyTitle,
    /// Author is empty or whitespace only.
    EmptyAuthor,
    /// The nil UUID cannot identify a book.
    NilId,
    YearPublishedOutOfRange {
        year: i32,
        min: i32,
        max: i32,
    },
    YearReadOutOfRange {
        year: i32,
        min: i32,
        max: i32,
    },
    RatingOutOfRange(i32),
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is required"),
            Self::EmptyAuthor => write!(f, "author is required"),
            Self::NilId => write!(f, "book id cannot be the nil uuid"),
            Self::YearPublishedOutOfRange { year, min, max } => write!(
                f,
                "publication year must be between {min} and {max}, got {year}"
            ),
            Self::YearReadOutOfRange { year, min, max } => {
                write!(f, "year read must be between {min} and {max}, got {year}")
            }
            Self::RatingOutOfRange(rating) => write!(
                f,
                "rating must be between {} and {}, got {rating}",
                RATING_RANGE.start(),
                RATING_RANGE.end()
            ),
        }
    }
}

impl Error for BookValidationError {}

/// One book in the personal library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// `None` marks a record that has never been stored.
    pub id: Option<BookId>,
    pub title: String,
    pub author: String,
    pub year_published: Option<i32>,
    pub year_read: Option<i32>,
    /// Local filesystem path to a cover image, if any.
    pub cover_image_path: Option<String>,
    pub summary: Option<String>,
    /// 1..=5 when set.
    pub rating: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Alternate image reference, usually a remote URL.
    pub cover_image: Option<String>,
    #[serde(default)]
    pub is_remote_image: bool,
}

impl Book {
    /// Creates a new, not yet stored book with only the required fields set.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    /// Creates a book with a caller-provided identity.
    ///
    /// Used by import paths where the id already exists externally.
    ///
    /// # Errors
    /// - Returns `BookValidationError::NilId` for `Uuid::nil()`.
    pub fn with_id(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<Self, BookValidationError> {
        if id.is_nil() {
            return Err(BookValidationError::NilId);
        }

        Ok(Self {
            id: Some(id),
            ..Self::new(title, author)
        })
    }

    /// Returns whether this record has been assigned a stable id.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Checks record-level rules against the current calendar year.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        self.validate_for_year(current_year())
    }

    /// Checks record-level rules with an explicit upper bound for years.
    ///
    /// Rules are evaluated in field order and the first failure is returned.
    pub fn validate_for_year(&self, current_year: i32) -> Result<(), BookValidationError> {
        if self.id.is_some_and(|id| id.is_nil()) {
            return Err(BookValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        if self.author.trim().is_empty() {
            return Err(BookValidationError::EmptyAuthor);
        }

        if let Some(year) = self.year_published {
            if !(MIN_YEAR_PUBLISHED..=current_year).contains(&year) {
                return Err(BookValidationError::YearPublishedOutOfRange {
                    year,
                    min: MIN_YEAR_PUBLISHED,
                    max: current_year,
                });
            }
        }

        if let Some(year) = self.year_read {
            if !(MIN_YEAR_READ..=current_year).contains(&year) {
                return Err(BookValidationError::YearReadOutOfRange {
                    year,
                    min: MIN_YEAR_READ,
                    max: current_year,
                });
            }
        }

        if let Some(rating) = self.rating {
            if !RATING_RANGE.contains(&rating) {
                return Err(BookValidationError::RatingOutOfRange(rating));
            }
        }

        Ok(())
    }

    /// `Title - Author`, used by list views.
    pub fn display_title(&self) -> String {
        if self.author.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.author)
        }
    }
}

fn current_year() -> i32 {
    Utc::now().year()
}
