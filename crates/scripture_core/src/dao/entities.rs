//! Row shapes persisted in the `translations`, `books` and `verses` tables.

use crate::model::corpus::BookId;
use rusqlite::Row;

/// Row of `translations`, keyed by `short_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationEntity {
    pub short_name: String,
    pub name: String,
    pub language: String,
    pub size: i64,
}

/// Row of `books`, keyed by `id`.
///
/// `translation_short_name` is a soft reference; no cascade is enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookEntity {
    pub id: BookId,
    pub name: String,
    pub short_name: String,
    pub translation_short_name: String,
}

/// Row of `verses`.
///
/// `id` is assigned by SQLite when `None`. The location tuple
/// `(book_id, chapter, verse, translation_short_name)` is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseEntity {
    pub id: Option<i64>,
    pub book_id: BookId,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    pub translation_short_name: String,
}

impl TranslationEntity {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            short_name: row.get("short_name")?,
            name: row.get("name")?,
            language: row.get("language")?,
            size: row.get("size")?,
        })
    }
}

impl BookEntity {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            short_name: row.get("short_name")?,
            translation_short_name: row.get("translation_short_name")?,
        })
    }
}

impl VerseEntity {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            book_id: row.get("book_id")?,
            chapter: row.get("chapter")?,
            verse: row.get("verse")?,
            text: row.get("text")?,
            translation_short_name: row.get("translation_short_name")?,
        })
    }
}
