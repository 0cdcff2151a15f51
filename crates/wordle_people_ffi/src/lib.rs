//! Flutter-facing bindings for Wordle People core.
//!
//! # Responsibility
//! - Re-export the use-case API consumed by the generated Dart bridge.

pub mod api;
