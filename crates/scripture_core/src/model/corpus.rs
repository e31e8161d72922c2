//! Corpus value objects.
//!
//! # Invariants
//! - `Translation::short_name` is the unique translation key.
//! - `Book::id` is unique across every imported translation.
//! - A `Verse` is located by `(book_id, chapter, verse)` inside one
//!   translation.

use serde::{Deserialize, Serialize};

/// Integer key of a book row.
pub type BookId = i64;

/// One edition of the corpus, identified by a short code such as `kjv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub short_name: String,
    /// Display name, e.g. `King James Version`.
    pub name: String,
    /// Language tag, e.g. `en`.
    pub language: String,
    /// Size of the translation payload in bytes.
    pub size: i64,
}

/// A named subdivision of a translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    /// Abbreviation shown in compact views, e.g. `Gen`.
    pub short_name: String,
}

/// Smallest addressable unit of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub book_id: BookId,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl Verse {
    /// Returns a `chapter:verse` reference label.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.chapter, self.verse)
    }
}
