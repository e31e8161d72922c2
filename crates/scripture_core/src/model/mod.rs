//! Domain value objects handed to callers above the repository boundary.
//!
//! # Responsibility
//! - Define immutable, storage-agnostic shapes for translations, books and
//!   verses.
//!
//! # Invariants
//! - Value objects never carry storage identity beyond the natural keys
//!   callers need to issue follow-up requests.

pub mod corpus;
