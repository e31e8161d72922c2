//! Composition root wiring storage, repository, use cases and view model.
//!
//! # Invariants
//! - One repository (and therefore one connection) per `CorpusApp`.
//! - Everything handed out shares that repository; no global registry.

use crate::config::CoreConfig;
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::presentation::view_model::CorpusViewModel;
use crate::repo::bible_repo::SqliteBibleRepository;
use crate::service::corpus_use_cases::CorpusUseCases;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Explicitly constructed object graph for one corpus database.
pub struct CorpusApp {
    repo: Arc<SqliteBibleRepository>,
}

impl CorpusApp {
    /// Opens (and migrates) the database at `config.db_path`.
    pub fn open(config: &CoreConfig) -> DbResult<Self> {
        let conn = open_db(&config.db_path)?;
        Ok(Self::from_repository(SqliteBibleRepository::new(conn)))
    }

    /// Builds the graph over a fresh in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self::from_repository(SqliteBibleRepository::new(conn)))
    }

    pub fn from_repository(repo: SqliteBibleRepository) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }

    /// Shared repository, also used for imports.
    pub fn repository(&self) -> &Arc<SqliteBibleRepository> {
        &self.repo
    }

    pub fn use_cases(&self) -> CorpusUseCases<SqliteBibleRepository> {
        CorpusUseCases::new(Arc::clone(&self.repo))
    }

    /// Builds a view model that has already requested the translation list.
    pub fn view_model(&self, runtime: Handle) -> CorpusViewModel<SqliteBibleRepository> {
        CorpusViewModel::start(self.use_cases(), runtime)
    }
}
