//! Core of the scripture corpus browser.
//! Storage, repository, use cases and presentation state live here; FFI and
//! CLI crates only compose them.

pub mod app;
pub mod config;
pub mod dao;
pub mod db;
pub mod logging;
pub mod model;
pub mod presentation;
pub mod repo;
pub mod service;

pub use app::CorpusApp;
pub use config::CoreConfig;
pub use dao::corpus_dao::SEARCH_RESULT_LIMIT;
pub use db::{DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::corpus::{Book, BookId, Translation, Verse};
pub use presentation::view_model::{CorpusViewModel, RequestState};
pub use repo::bible_repo::{BibleRepository, RepoError, RepoResult, SqliteBibleRepository};
pub use repo::corpus_import::{CorpusDocument, ImportError, ImportSummary};
pub use service::corpus_use_cases::{
    CorpusUseCases, GetBooks, GetTranslations, GetVerses, SearchVerses,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
