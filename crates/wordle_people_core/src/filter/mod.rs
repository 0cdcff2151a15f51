//! Filter state and query-selection engine.
//!
//! # Responsibility
//! - Own the active color and gender filter sets for one session.
//! - Derive which storage query variant applies to the current sets.
//! - Publish derived selectors to observers with latest-value-wins semantics.
//!
//! # Invariants
//! - An empty set means "no filtering on that dimension", never "exclude all".
//! - Clearing one dimension never touches the other.

pub mod channel;
pub mod counts;
pub mod engine;
pub mod state;
