//! Core use cases.
//!
//! # Responsibility
//! - Offer one single-operation entry point per corpus request.
//! - Keep presentation and FFI callers decoupled from storage details.

pub mod corpus_use_cases;
