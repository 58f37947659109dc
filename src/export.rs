//! Bible summary export
//!
//! Dumps the database into the nested `bible_summary.json` layout consumed by
//! the verse picker: books, their chapters with verse totals, and verse texts.

use crate::error::Result;
use crate::storage::VerseDatabase;
use crate::utils::ensure_directory;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookSummary {
    pub book: String,

    #[serde(rename = "total chapters")]
    pub total_chapters: usize,

    pub chapters: Vec<ChapterEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChapterEntry {
    pub chapter: ChapterSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChapterSummary {
    pub number: u32,

    #[serde(rename = "total verses")]
    pub total_verses: usize,

    pub verses: Vec<VerseEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerseEntry {
    pub verse: VerseSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerseSummary {
    pub number: u32,
    pub text: String,
}

/// Totals of an export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportStats {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
    pub file_size_bytes: u64,
}

/// Build the summary of every book in id order
pub fn build_summary(db: &VerseDatabase) -> Result<Vec<BookSummary>> {
    let mut summary = Vec::new();

    for book in db.list_books()? {
        log::info!("Processing book: {}", book.name);
        let chapters = db.chapters(book.id)?;

        let mut entries = Vec::with_capacity(chapters.len());
        for chapter in chapters {
            log::debug!(
                "  Chapter {}: fetching {} verses...",
                chapter.number,
                chapter.total_verses
            );
            let verses = db
                .verse_texts(book.id, chapter.number)?
                .into_iter()
                .map(|(number, text)| VerseEntry {
                    verse: VerseSummary { number, text },
                })
                .collect();

            entries.push(ChapterEntry {
                chapter: ChapterSummary {
                    number: chapter.number,
                    total_verses: chapter.total_verses,
                    verses,
                },
            });
        }

        summary.push(BookSummary {
            book: book.name,
            total_chapters: entries.len(),
            chapters: entries,
        });
    }

    Ok(summary)
}

/// Write the summary as pretty JSON to `output`, creating parent directories
pub fn write_summary<P: AsRef<Path>>(db: &VerseDatabase, output: P) -> Result<ExportStats> {
    let output = output.as_ref();
    if let Some(parent) = output.parent() {
        ensure_directory(parent)?;
    }

    let summary = build_summary(db)?;
    std::fs::write(output, serde_json::to_string_pretty(&summary)?)?;

    let stats = ExportStats {
        books: summary.len(),
        chapters: summary.iter().map(|b| b.chapters.len()).sum(),
        verses: summary
            .iter()
            .flat_map(|b| &b.chapters)
            .map(|c| c.chapter.verses.len())
            .sum(),
        file_size_bytes: std::fs::metadata(output).map(|m| m.len()).unwrap_or(0),
    };

    log::info!(
        "Wrote {} books, {} chapters, {} verses to {}",
        stats.books,
        stats.chapters,
        stats.verses,
        output.display()
    );
    Ok(stats)
}
