//! Core domain logic for Wordle People.
//! This crate is the single source of truth for filter and import invariants.

pub mod db;
pub mod filter;
pub mod import;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use filter::channel::{SelectorPublisher, SelectorSubscriber};
pub use filter::counts::{format_compact, FilterCounts};
pub use filter::engine::FilterEngine;
pub use filter::state::{FilterState, QuerySelector};
pub use import::pipeline::{
    random_person, ImportCancel, ImportConfig, ImportError, ImportProgress, ImportRun,
    DEFAULT_BATCH_SIZE, IMPORT_COUNT_CHOICES,
};
pub use import::words::{
    parse_word_list, BundledWordSource, FileWordSource, WordSource, WordSourceError,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::person::{Color, Gender, NewPerson, ParseEnumError, Person, PersonId};
pub use repo::person_repo::{
    PageRequest, PersonRepository, RepoError, RepoResult, SqlitePersonRepository,
    MAX_CACHED_ROWS, PAGE_SIZE,
};
pub use service::people_service::{PeoplePager, PeopleService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
