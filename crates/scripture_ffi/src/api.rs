//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose corpus browsing, search and import to Dart via FRB.
//! - Flatten core errors into human-readable envelope messages.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call opens the configured database, so schema migrations are
//!   always applied before a query runs.

use scripture_core::db::open_db;
use scripture_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Book, CoreConfig, CorpusDocument, CorpusUseCases, RepoResult, SqliteBibleRepository,
    Translation, Verse,
};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

static CORPUS_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Translation row for the picker screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationItem {
    pub short_name: String,
    pub name: String,
    pub language: String,
    pub size: i64,
}

/// Book row for the book list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookItem {
    pub id: i64,
    pub name: String,
    pub short_name: String,
}

/// Verse row for reading and search result screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseItem {
    pub book_id: i64,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

/// Envelope for translation listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationsResponse {
    pub items: Vec<TranslationItem>,
    /// Error message, empty on success.
    pub error: String,
}

/// Envelope for book listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooksResponse {
    pub items: Vec<BookItem>,
    /// Error message, empty on success.
    pub error: String,
}

/// Envelope for chapter reads and verse search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersesResponse {
    pub items: Vec<VerseItem>,
    /// Error message, empty on success.
    pub error: String,
}

/// Result of a corpus import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResponse {
    pub ok: bool,
    pub books: u32,
    pub verses: u32,
    /// Human-readable outcome for diagnostics/UI.
    pub message: String,
}

/// Lists every imported translation.
///
/// # FFI contract
/// - Sync call, DB-backed execution; call from a background isolate.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn corpus_translations() -> TranslationsResponse {
    match with_use_cases(|use_cases| use_cases.get_translations.execute()) {
        Ok(items) => TranslationsResponse {
            items: items.into_iter().map(to_translation_item).collect(),
            error: String::new(),
        },
        Err(err) => TranslationsResponse {
            items: Vec::new(),
            error: format!("Failed to load translations: {err}"),
        },
    }
}

/// Lists books of `translation_code`; unknown codes return an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn corpus_books(translation_code: String) -> BooksResponse {
    match with_use_cases(|use_cases| use_cases.get_books.execute(&translation_code)) {
        Ok(items) => BooksResponse {
            items: items.into_iter().map(to_book_item).collect(),
            error: String::new(),
        },
        Err(err) => BooksResponse {
            items: Vec::new(),
            error: format!("Failed to load books: {err}"),
        },
    }
}

/// Lists verses of one chapter.
#[flutter_rust_bridge::frb(sync)]
pub fn corpus_verses(book_id: i64, chapter: u32) -> VersesResponse {
    verses_response(
        with_use_cases(|use_cases| use_cases.get_verses.execute(book_id, chapter)),
        "Failed to load verses",
    )
}

/// Case-sensitive substring search, at most 100 verses.
#[flutter_rust_bridge::frb(sync)]
pub fn corpus_search(text: String) -> VersesResponse {
    verses_response(
        with_use_cases(|use_cases| use_cases.search_verses.execute(&text)),
        "Failed to search verses",
    )
}

/// Imports one translation from a JSON corpus document.
///
/// # FFI contract
/// - Sync call; may take long for large corpora.
/// - All-or-nothing: on failure nothing is written.
#[flutter_rust_bridge::frb(sync)]
pub fn corpus_import_json(document_json: String) -> ImportResponse {
    let result = CorpusDocument::from_json(&document_json)
        .map_err(|err| err.to_string())
        .and_then(|document| {
            open_repository()?
                .import_corpus(&document)
                .map_err(|err| err.to_string())
        });

    match result {
        Ok(summary) => ImportResponse {
            ok: true,
            books: count_u32(summary.books),
            verses: count_u32(summary.verses),
            message: format!(
                "Imported {} book(s) and {} verse(s).",
                summary.books, summary.verses
            ),
        },
        Err(message) => ImportResponse {
            ok: false,
            books: 0,
            verses: 0,
            message: format!("corpus_import_json failed: {message}"),
        },
    }
}

fn resolve_db_path() -> PathBuf {
    CORPUS_DB_PATH
        .get_or_init(|| CoreConfig::from_env().db_path)
        .clone()
}

fn open_repository() -> Result<SqliteBibleRepository, String> {
    let conn =
        open_db(resolve_db_path()).map_err(|err| format!("corpus DB open failed: {err}"))?;
    Ok(SqliteBibleRepository::new(conn))
}

fn with_use_cases<T>(
    f: impl FnOnce(&CorpusUseCases<SqliteBibleRepository>) -> RepoResult<T>,
) -> Result<T, String> {
    let repo = open_repository()?;
    let use_cases = CorpusUseCases::new(Arc::new(repo));
    f(&use_cases).map_err(|err| err.to_string())
}

fn verses_response(result: Result<Vec<Verse>, String>, failure_prefix: &str) -> VersesResponse {
    match result {
        Ok(items) => VersesResponse {
            items: items.into_iter().map(to_verse_item).collect(),
            error: String::new(),
        },
        Err(err) => VersesResponse {
            items: Vec::new(),
            error: format!("{failure_prefix}: {err}"),
        },
    }
}

fn count_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_translation_item(translation: Translation) -> TranslationItem {
    TranslationItem {
        short_name: translation.short_name,
        name: translation.name,
        language: translation.language,
        size: translation.size,
    }
}

fn to_book_item(book: Book) -> BookItem {
    BookItem {
        id: book.id,
        name: book.name,
        short_name: book.short_name,
    }
}

fn to_verse_item(verse: Verse) -> VerseItem {
    VerseItem {
        book_id: verse.book_id,
        chapter: verse.chapter,
        verse: verse.verse,
        text: verse.text,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, corpus_books, corpus_import_json, corpus_search, corpus_translations,
        corpus_verses, init_logging, ping,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn imported_corpus_is_browsable_and_searchable() {
        let nanos = unique_nanos();
        let code = format!("t{nanos}");
        let book_id = i64::try_from(nanos % 1_000_000_000_000).unwrap();
        let token = format!("Token{nanos}");
        let document = serde_json::json!({
            "translation": {"short_name": code, "name": "Test Edition", "language": "en", "size": 42},
            "books": [{"id": book_id, "name": "Genesis", "short_name": "Gen"}],
            "verses": [
                {"book_id": book_id, "chapter": 1, "verse": 1, "text": format!("In the beginning {token}")},
                {"book_id": book_id, "chapter": 2, "verse": 1, "text": "Thus the heavens"}
            ]
        });

        let imported = corpus_import_json(document.to_string());
        assert!(imported.ok, "{}", imported.message);
        assert_eq!((imported.books, imported.verses), (1, 2));

        let translations = corpus_translations();
        assert!(translations.error.is_empty(), "{}", translations.error);
        assert!(translations.items.iter().any(|item| item.short_name == code));

        let books = corpus_books(code.clone());
        assert_eq!(books.items.len(), 1);
        assert_eq!(books.items[0].id, book_id);

        let verses = corpus_verses(book_id, 1);
        assert_eq!(verses.items.len(), 1);

        let hits = corpus_search(token.clone());
        assert_eq!(hits.items.len(), 1);
        assert_eq!(hits.items[0].book_id, book_id);
        assert!(corpus_search(token.to_lowercase()).items.is_empty());
    }

    #[test]
    fn unknown_translation_returns_empty_books_without_error() {
        let response = corpus_books(format!("missing-{}", unique_nanos()));
        assert!(response.items.is_empty());
        assert!(response.error.is_empty());
    }

    #[test]
    fn malformed_import_reports_failure() {
        let response = corpus_import_json("not json".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid corpus document"));
    }

    fn unique_nanos() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos()
    }
}
