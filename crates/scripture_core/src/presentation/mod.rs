//! Presentation state holders consumed by UI layers.
//!
//! # Responsibility
//! - Run use cases off the caller's thread.
//! - Publish per-request snapshots (`items`, `loading`, `error`) that UI code
//!   can poll or subscribe to.

pub mod view_model;
