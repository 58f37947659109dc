//! Database schema definitions
//!
//! versedex reads OpenLP bible databases. Only the columns the pipeline consumes
//! are declared here; these statements are used to build fixture databases.

/// SQL for creating the book table
pub const CREATE_BOOK_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS book (
    id INTEGER PRIMARY KEY,
    book_reference_id INTEGER,
    testament_reference_id INTEGER,
    name VARCHAR(50) NOT NULL
);
"#;

/// SQL for creating the verse table
pub const CREATE_VERSE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS verse (
    id INTEGER PRIMARY KEY,
    book_id INTEGER NOT NULL REFERENCES book(id),
    chapter INTEGER NOT NULL,
    verse INTEGER NOT NULL,
    text TEXT NOT NULL
);
"#;

/// SQL for the (book, chapter, verse) lookup index
pub const CREATE_VERSE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_verse_location ON verse(book_id, chapter, verse);
"#;

/// Every verse joined with its book, in verse id order
pub const SELECT_ALL_VERSES: &str = r#"
SELECT
    v.id AS verse_id,
    b.id AS book_id,
    b.name AS book_name,
    v.chapter,
    v.verse,
    v.text
FROM verse v
JOIN book b ON v.book_id = b.id
ORDER BY v.id
"#;

/// Inclusive verse range within one chapter of a book looked up by name
pub const SELECT_VERSE_RANGE: &str = r#"
SELECT
    v.id AS verse_id,
    b.id AS book_id,
    b.name AS book_name,
    v.chapter,
    v.verse,
    v.text
FROM verse v
JOIN book b ON v.book_id = b.id
WHERE b.name = ?1 AND v.chapter = ?2 AND v.verse BETWEEN ?3 AND ?4
ORDER BY v.verse
"#;
