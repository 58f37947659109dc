//! Verse storage for versedex
//!
//! This module reads the verse corpus from an embedded SQLite bible database.

pub mod database;
pub mod schema;

use crate::error::Result;
use serde::{Deserialize, Serialize};

// Re-export main types
pub use database::{ChapterInfo, DatabaseStats, VerseDatabase};

/// A single verse joined with its book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verse {
    /// Unique verse identifier, stable across rebuilds
    pub verse_id: i64,

    /// Book the verse belongs to
    pub book_id: i64,

    /// Display name of the book
    pub book_name: String,

    /// Chapter number (1-based)
    pub chapter: u32,

    /// Verse number within the chapter (1-based)
    pub verse: u32,

    /// Verse body
    pub text: String,
}

impl Verse {
    /// Canonical reference, e.g. `Genesis 1:1`
    pub fn reference(&self) -> String {
        format!("{} {}:{}", self.book_name, self.chapter, self.verse)
    }
}

/// A book of the bible
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: i64,
    pub name: String,
}

/// Relational source of the full verse corpus
pub trait VerseSource {
    /// Every verse in the corpus. Order only affects log readability.
    fn list_all_verses(&self) -> Result<Vec<Verse>>;
}

impl VerseSource for Vec<Verse> {
    fn list_all_verses(&self) -> Result<Vec<Verse>> {
        Ok(self.clone())
    }
}
