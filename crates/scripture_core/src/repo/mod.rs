//! Repository layer between corpus rows and domain value objects.
//!
//! # Responsibility
//! - Define the read contract callers (use cases) depend on.
//! - Own the row-to-value projection and the bulk import write path.
//!
//! # Invariants
//! - Reads are pure field-by-field projections; no filtering or enrichment.
//! - Storage errors propagate unchanged inside `RepoError::Db`.

pub mod bible_repo;
pub mod corpus_import;
