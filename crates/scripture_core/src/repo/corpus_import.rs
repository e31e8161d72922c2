//! Bulk import of one translation with its books and verses.
//!
//! # Responsibility
//! - Parse the JSON corpus document.
//! - Write translation, books and verses in a single transaction.
//!
//! # Invariants
//! - Book ids are unique across translations: an import that would move a
//!   book id to another translation is rejected and nothing is written.
//! - Every verse references a book declared in the same document.
//! - Re-importing the same document leaves readable results unchanged.

use crate::dao::corpus_dao;
use crate::model::corpus::{Book, BookId, Translation, Verse};
use crate::repo::bible_repo::{
    book_to_entity, translation_to_entity, verse_to_entity, RepoResult, SqliteBibleRepository,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Import-time validation failure.
#[derive(Debug)]
pub enum ImportError {
    /// Document is not valid corpus JSON.
    Parse(serde_json::Error),
    /// Translation short name is blank.
    MissingTranslation,
    /// Translation short name has leading or trailing whitespace.
    PaddedTranslationCode { short_name: String },
    /// Book id is already owned by a different translation.
    BookIdConflict { book_id: BookId, owner: String },
    /// Verse references a book not declared in the document.
    UnknownBook { book_id: BookId },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid corpus document: {err}"),
            Self::MissingTranslation => write!(f, "translation short name cannot be empty"),
            Self::PaddedTranslationCode { short_name } => write!(
                f,
                "translation short name `{short_name}` has surrounding whitespace"
            ),
            Self::BookIdConflict { book_id, owner } => {
                write!(f, "book id {book_id} already belongs to translation `{owner}`")
            }
            Self::UnknownBook { book_id } => {
                write!(f, "verse references undeclared book id {book_id}")
            }
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// One translation's worth of corpus data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub translation: Translation,
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub verses: Vec<Verse>,
}

impl CorpusDocument {
    /// Parses a corpus document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ImportError> {
        serde_json::from_str(text).map_err(ImportError::Parse)
    }
}

/// Row counts written by one import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub books: usize,
    pub verses: usize,
}

impl SqliteBibleRepository {
    /// Imports `document` atomically.
    ///
    /// # Errors
    /// - `ImportError::MissingTranslation` for a blank short name.
    /// - `ImportError::PaddedTranslationCode` for a short name with surrounding
    ///   whitespace.
    /// - `ImportError::UnknownBook` when a verse points outside the document.
    /// - `ImportError::BookIdConflict` when a book id is owned elsewhere.
    /// - `RepoError::Db` for storage failures; the transaction is rolled back.
    pub fn import_corpus(&self, document: &CorpusDocument) -> RepoResult<ImportSummary> {
        let started_at = Instant::now();
        let result = self.import_corpus_inner(document);
        let duration_ms = started_at.elapsed().as_millis();

        match &result {
            Ok(summary) => info!(
                "event=corpus_import module=repo status=ok translation={} books={} verses={} duration_ms={duration_ms}",
                document.translation.short_name, summary.books, summary.verses
            ),
            Err(err) => error!(
                "event=corpus_import module=repo status=error translation={} duration_ms={duration_ms} error={err}",
                document.translation.short_name
            ),
        }
        result
    }

    fn import_corpus_inner(&self, document: &CorpusDocument) -> RepoResult<ImportSummary> {
        let code = document.translation.short_name.trim();
        if code.is_empty() {
            return Err(ImportError::MissingTranslation.into());
        }
        if code != document.translation.short_name {
            return Err(ImportError::PaddedTranslationCode {
                short_name: document.translation.short_name.clone(),
            }
            .into());
        }

        let declared = document
            .books
            .iter()
            .map(|book| book.id)
            .collect::<BTreeSet<_>>();
        if let Some(verse) = document
            .verses
            .iter()
            .find(|verse| !declared.contains(&verse.book_id))
        {
            return Err(ImportError::UnknownBook {
                book_id: verse.book_id,
            }
            .into());
        }

        let books = document
            .books
            .iter()
            .map(|book| book_to_entity(book, code))
            .collect::<Vec<_>>();
        let verses = document
            .verses
            .iter()
            .map(|verse| verse_to_entity(verse, code))
            .collect::<Vec<_>>();

        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            for book_id in &declared {
                if let Some(owner) = corpus_dao::book_owner(&tx, *book_id)? {
                    if owner != code {
                        return Err(ImportError::BookIdConflict {
                            book_id: *book_id,
                            owner,
                        }
                        .into());
                    }
                }
            }

            corpus_dao::upsert_translation(&tx, &translation_to_entity(&document.translation))?;
            corpus_dao::upsert_books(&tx, &books)?;
            corpus_dao::upsert_verses(&tx, &verses)?;
            tx.commit()?;

            Ok(ImportSummary {
                books: books.len(),
                verses: verses.len(),
            })
        })
    }
}
