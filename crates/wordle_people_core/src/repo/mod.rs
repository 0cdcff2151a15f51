//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for people rows.
//! - Isolate SQLite query details from service/pipeline orchestration.
//!
//! # Invariants
//! - Each non-empty batch insert is one transaction.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod person_repo;
