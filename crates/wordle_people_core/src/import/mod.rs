//! Bulk random-people import.
//!
//! # Responsibility
//! - Load a word list and synthesize `NewPerson` records from it.
//! - Persist generated records in batches and report progress lazily.
//!
//! # Invariants
//! - No storage write happens before the word list loads non-empty.
//! - Each full batch is written by exactly one repository call.
//! - A failed or cancelled import leaves earlier batches in place.

pub mod pipeline;
pub mod words;
