//! Domain model for the personal library.
//!
//! # Responsibility
//! - Define the data structures shared by persistence and callers.
//!
//! # Invariants
//! - Every stored book is identified by a stable `BookId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod book;
