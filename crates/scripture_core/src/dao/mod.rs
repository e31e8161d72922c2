//! Query layer over the corpus tables.
//!
//! # Responsibility
//! - Define persisted row shapes (`entities`).
//! - Execute the parameterized reads and bulk writes (`corpus_dao`).
//!
//! # Invariants
//! - Storage errors are returned as [`crate::db::DbError`] without
//!   translation.
//! - Translation and book writes replace by primary key; verse writes
//!   update text in place by location.

pub mod corpus_dao;
pub mod entities;
