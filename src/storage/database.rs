//! SQLite database operations for versedex
//!
//! This module reads verses, books and chapter layouts from an OpenLP bible database.

use crate::error::{Result, VersedexError};
use crate::storage::schema::*;
use crate::storage::{Book, Verse, VerseSource};
use rusqlite::{Connection, OpenFlags, Row, params};
use std::path::Path;

/// Database connection and operations
pub struct VerseDatabase {
    conn: Connection,
}

impl VerseDatabase {
    /// Open an existing bible database read-only
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(VersedexError::Storage(format!(
                "Bible database not found: {}",
                path.display()
            )));
        }

        log::info!("Opening bible database at {}", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| VersedexError::Storage(format!("Failed to open database: {}", e)))?;

        Ok(Self { conn })
    }

    /// Create a writable database with the bible schema at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| VersedexError::Storage(format!("Failed to create database: {}", e)))?;

        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            VersedexError::Storage(format!("Failed to create in-memory database: {}", e))
        })?;

        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> Result<()> {
        self.conn
            .execute_batch(&format!(
                "{}{}{}",
                CREATE_BOOK_TABLE, CREATE_VERSE_TABLE, CREATE_VERSE_INDEXES
            ))
            .map_err(|e| VersedexError::Storage(format!("Failed to create schema: {}", e)))?;
        Ok(())
    }

    /// Insert a book
    pub fn insert_book(&self, id: i64, name: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO book (id, name) VALUES (?1, ?2)",
                params![id, name],
            )
            .map_err(|e| VersedexError::Storage(format!("Failed to insert book {}: {}", name, e)))?;
        Ok(())
    }

    /// Insert a verse into an existing book
    pub fn insert_verse(
        &self,
        verse_id: i64,
        book_id: i64,
        chapter: u32,
        verse: u32,
        text: &str,
    ) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO verse (id, book_id, chapter, verse, text) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![verse_id, book_id, chapter, verse, text],
            )
            .map_err(|e| {
                VersedexError::Storage(format!("Failed to insert verse {}: {}", verse_id, e))
            })?;
        Ok(())
    }

    /// All verses joined with their books, ordered by verse id
    pub fn list_all_verses(&self) -> Result<Vec<Verse>> {
        log::info!("Fetching all verses from database...");

        let mut stmt = self
            .conn
            .prepare(SELECT_ALL_VERSES)
            .map_err(|e| VersedexError::Storage(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], row_to_verse)
            .map_err(|e| VersedexError::Storage(format!("Failed to fetch verses: {}", e)))?;

        let mut verses = Vec::new();
        for verse in rows {
            verses.push(verse.map_err(|e| {
                VersedexError::Storage(format!("Failed to process verse row: {}", e))
            })?);
        }

        log::info!("Fetched {} verses from database", verses.len());
        Ok(verses)
    }

    /// All books ordered by id
    pub fn list_books(&self) -> Result<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM book ORDER BY id")
            .map_err(|e| VersedexError::Storage(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Book {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(|e| VersedexError::Storage(format!("Failed to fetch books: {}", e)))?;

        let mut books = Vec::new();
        for book in rows {
            books.push(book.map_err(|e| {
                VersedexError::Storage(format!("Failed to process book row: {}", e))
            })?);
        }
        Ok(books)
    }

    /// Chapters of a book with their verse counts
    pub fn chapters(&self, book_id: i64) -> Result<Vec<ChapterInfo>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT chapter, COUNT(*) FROM verse WHERE book_id = ?1 GROUP BY chapter ORDER BY chapter",
            )
            .map_err(|e| VersedexError::Storage(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![book_id], |row| {
                Ok(ChapterInfo {
                    number: row.get(0)?,
                    total_verses: row.get::<_, i64>(1)? as usize,
                })
            })
            .map_err(|e| VersedexError::Storage(format!("Failed to fetch chapters: {}", e)))?;

        let mut chapters = Vec::new();
        for chapter in rows {
            chapters.push(chapter.map_err(|e| {
                VersedexError::Storage(format!("Failed to process chapter row: {}", e))
            })?);
        }
        Ok(chapters)
    }

    /// `(verse number, text)` pairs of one chapter
    pub fn verse_texts(&self, book_id: i64, chapter: u32) -> Result<Vec<(u32, String)>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT verse, text FROM verse WHERE book_id = ?1 AND chapter = ?2 ORDER BY verse",
            )
            .map_err(|e| VersedexError::Storage(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![book_id, chapter], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| VersedexError::Storage(format!("Failed to fetch verse texts: {}", e)))?;

        let mut verses = Vec::new();
        for verse in rows {
            verses.push(verse.map_err(|e| {
                VersedexError::Storage(format!("Failed to process verse row: {}", e))
            })?);
        }
        Ok(verses)
    }

    /// Verses `from..=to` of a chapter, `to` defaulting to `from`.
    ///
    /// An inverted range is a no-op and returns no verses.
    pub fn verses_in_range(
        &self,
        book_name: &str,
        chapter: u32,
        from: u32,
        to: Option<u32>,
    ) -> Result<Vec<Verse>> {
        let to = to.unwrap_or(from);
        if to < from {
            log::debug!(
                "Ignoring inverted range {} {}:{}-{}",
                book_name,
                chapter,
                from,
                to
            );
            return Ok(Vec::new());
        }

        let mut stmt = self
            .conn
            .prepare(SELECT_VERSE_RANGE)
            .map_err(|e| VersedexError::Storage(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![book_name, chapter, from, to], row_to_verse)
            .map_err(|e| VersedexError::Storage(format!("Failed to fetch verse range: {}", e)))?;

        let mut verses = Vec::new();
        for verse in rows {
            verses.push(verse.map_err(|e| {
                VersedexError::Storage(format!("Failed to process verse row: {}", e))
            })?);
        }
        Ok(verses)
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let book_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM book", [], |row| row.get(0))
            .map_err(|e| VersedexError::Storage(format!("Failed to count books: {}", e)))?;

        let verse_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM verse", [], |row| row.get(0))
            .map_err(|e| VersedexError::Storage(format!("Failed to count verses: {}", e)))?;

        Ok(DatabaseStats {
            book_count: book_count as usize,
            verse_count: verse_count as usize,
        })
    }
}

impl VerseSource for VerseDatabase {
    fn list_all_verses(&self) -> Result<Vec<Verse>> {
        VerseDatabase::list_all_verses(self)
    }
}

fn row_to_verse(row: &Row) -> rusqlite::Result<Verse> {
    Ok(Verse {
        verse_id: row.get(0)?,
        book_id: row.get(1)?,
        book_name: row.get(2)?,
        chapter: row.get(3)?,
        verse: row.get(4)?,
        text: row.get(5)?,
    })
}

/// Chapter number with its verse count
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterInfo {
    pub number: u32,
    pub total_verses: usize,
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub book_count: usize,
    pub verse_count: usize,
}
