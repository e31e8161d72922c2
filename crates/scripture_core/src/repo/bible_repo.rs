//! Corpus repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Expose translations, books, chapter verses and verse search as domain
//!   values.
//! - Serialize access to one SQLite connection so the repository can be
//!   shared with background workers.
//!
//! # Invariants
//! - Every read maps rows one-to-one; result order is storage order.
//! - Write paths stamp rows with the owning translation short name.

use crate::dao::corpus_dao;
use crate::dao::entities::{BookEntity, TranslationEntity, VerseEntity};
use crate::db::DbError;
use crate::model::corpus::{Book, BookId, Translation, Verse};
use crate::repo::corpus_import::ImportError;
use log::{debug, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for corpus reads and imports.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Import(ImportError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Import(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Import(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ImportError> for RepoError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

/// Read contract over the stored corpus.
///
/// Every call performs blocking I/O; async callers should dispatch it to a
/// blocking-capable worker.
pub trait BibleRepository: Send + Sync {
    fn list_translations(&self) -> RepoResult<Vec<Translation>>;
    /// Books of `translation_code`; an unknown code yields an empty list.
    fn list_books(&self, translation_code: &str) -> RepoResult<Vec<Book>>;
    fn list_verses(&self, book_id: BookId, chapter: u32) -> RepoResult<Vec<Verse>>;
    /// Case-sensitive substring search, at most 100 verses.
    fn search_verses(&self, query_text: &str) -> RepoResult<Vec<Verse>>;
}

/// SQLite-backed corpus repository owning its connection.
pub struct SqliteBibleRepository {
    conn: Mutex<Connection>,
}

impl SqliteBibleRepository {
    /// Wraps a connection that already has migrations applied
    /// (see [`crate::db::open_db`]).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Runs `f` with exclusive access to the underlying connection.
    ///
    /// A panic inside a previous holder does not disable the repository:
    /// an unfinished transaction is rolled back when it unwinds, so the
    /// connection is taken over and the poison flag cleared.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let mut conn = self.conn.lock().unwrap_or_else(|poisoned| {
            warn!("event=repo_lock module=repo status=recovered reason=poisoned");
            self.conn.clear_poison();
            poisoned.into_inner()
        });
        f(&mut conn)
    }

    /// Inserts or replaces one translation.
    pub fn upsert_translation(&self, translation: &Translation) -> RepoResult<()> {
        self.with_connection(|conn| {
            corpus_dao::upsert_translation(conn, &translation_to_entity(translation))?;
            Ok(())
        })
    }

    /// Inserts or replaces books owned by `translation_code`.
    pub fn upsert_books(&self, translation_code: &str, books: &[Book]) -> RepoResult<()> {
        let rows = books
            .iter()
            .map(|book| book_to_entity(book, translation_code))
            .collect::<Vec<_>>();
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            corpus_dao::upsert_books(&tx, &rows)?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Inserts or replaces verses owned by `translation_code`.
    pub fn upsert_verses(&self, translation_code: &str, verses: &[Verse]) -> RepoResult<()> {
        let rows = verses
            .iter()
            .map(|verse| verse_to_entity(verse, translation_code))
            .collect::<Vec<_>>();
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            corpus_dao::upsert_verses(&tx, &rows)?;
            tx.commit()?;
            Ok(())
        })
    }
}

impl BibleRepository for SqliteBibleRepository {
    fn list_translations(&self) -> RepoResult<Vec<Translation>> {
        let rows = self.with_connection(|conn| Ok(corpus_dao::list_translations(conn)?))?;
        debug!("event=repo_read module=repo op=list_translations rows={}", rows.len());
        Ok(rows.into_iter().map(entity_to_translation).collect())
    }

    fn list_books(&self, translation_code: &str) -> RepoResult<Vec<Book>> {
        let rows =
            self.with_connection(|conn| Ok(corpus_dao::list_books(conn, translation_code)?))?;
        debug!("event=repo_read module=repo op=list_books rows={}", rows.len());
        Ok(rows.into_iter().map(entity_to_book).collect())
    }

    fn list_verses(&self, book_id: BookId, chapter: u32) -> RepoResult<Vec<Verse>> {
        let rows =
            self.with_connection(|conn| Ok(corpus_dao::list_verses(conn, book_id, chapter)?))?;
        debug!(
            "event=repo_read module=repo op=list_verses book_id={book_id} chapter={chapter} rows={}",
            rows.len()
        );
        Ok(rows.into_iter().map(entity_to_verse).collect())
    }

    fn search_verses(&self, query_text: &str) -> RepoResult<Vec<Verse>> {
        let rows =
            self.with_connection(|conn| Ok(corpus_dao::search_verses(conn, query_text)?))?;
        debug!(
            "event=repo_read module=repo op=search_verses query_chars={} rows={}",
            query_text.chars().count(),
            rows.len()
        );
        Ok(rows.into_iter().map(entity_to_verse).collect())
    }
}

fn entity_to_translation(entity: TranslationEntity) -> Translation {
    Translation {
        short_name: entity.short_name,
        name: entity.name,
        language: entity.language,
        size: entity.size,
    }
}

fn entity_to_book(entity: BookEntity) -> Book {
    Book {
        id: entity.id,
        name: entity.name,
        short_name: entity.short_name,
    }
}

fn entity_to_verse(entity: VerseEntity) -> Verse {
    Verse {
        book_id: entity.book_id,
        chapter: entity.chapter,
        verse: entity.verse,
        text: entity.text,
    }
}

pub(crate) fn translation_to_entity(translation: &Translation) -> TranslationEntity {
    TranslationEntity {
        short_name: translation.short_name.clone(),
        name: translation.name.clone(),
        language: translation.language.clone(),
        size: translation.size,
    }
}

pub(crate) fn book_to_entity(book: &Book, translation_code: &str) -> BookEntity {
    BookEntity {
        id: book.id,
        name: book.name.clone(),
        short_name: book.short_name.clone(),
        translation_short_name: translation_code.to_string(),
    }
}

pub(crate) fn verse_to_entity(verse: &Verse, translation_code: &str) -> VerseEntity {
    VerseEntity {
        id: None,
        book_id: verse.book_id,
        chapter: verse.chapter,
        verse: verse.verse,
        text: verse.text.clone(),
        translation_short_name: translation_code.to_string(),
    }
}
