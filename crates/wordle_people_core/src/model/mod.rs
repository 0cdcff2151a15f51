//! Domain model for generated people records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the closed enumerations that filters and storage agree on.
//!
//! # Invariants
//! - A persisted person is identified by a storage-assigned `PersonId`.
//! - Gender and color are closed sets; storage text outside them is invalid.

pub mod person;
