//! Flutter-facing bindings over `scripture_core`.

pub mod api;
