//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose filter, list, count, delete and import use cases to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` + message, never panics.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One process-wide `FilterEngine` guarded by a mutex owns filter state.
//! - Enum values cross the boundary as their variant names (`"North"`, `"Red"`).

use log::warn;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use wordle_people_core::db::open_db;
use wordle_people_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    BundledWordSource, Color, FileWordSource, FilterEngine, FilterState, Gender, ImportConfig,
    PageRequest, PeopleService, Person, QuerySelector, RepoResult, SqlitePersonRepository,
    WordSource, IMPORT_COUNT_CHOICES, MAX_CACHED_ROWS, PAGE_SIZE,
};

const DB_FILE_NAME: &str = "wordle_people.sqlite3";
const DB_PATH_ENV: &str = "WORDLE_PEOPLE_DB_PATH";
const WORDLIST_PATH_ENV: &str = "WORDLE_PEOPLE_WORDLIST_PATH";

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static WORDLIST_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();
static FILTER_ENGINE: OnceLock<Mutex<FilterEngine>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message on failure.
/// Safe to call repeatedly with the same `level + log_dir`.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Current filter sets and the derived selector name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResponse {
    /// Whether the command was applied.
    pub ok: bool,
    /// Active color filters, sorted.
    pub colors: Vec<String>,
    /// Active gender filters, sorted.
    pub genders: Vec<String>,
    /// `unfiltered|by_gender|by_color|by_gender_and_color`.
    pub selector: String,
    pub message: String,
}

/// One person row for list display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonItem {
    pub id: i64,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub gender: String,
    pub color: String,
}

/// One page of people for the active filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeoplePageResponse {
    pub ok: bool,
    pub items: Vec<PersonItem>,
    pub message: String,
    /// Effective applied page size.
    pub applied_limit: u32,
}

/// Filtered/total count pair for the title bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountsResponse {
    pub ok: bool,
    pub filtered: u64,
    pub total: u64,
    /// `"N"` or `"N of M"` with compact magnitudes.
    pub title: String,
    pub message: String,
}

/// Generic write-command result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Rows affected by the command.
    pub affected: u64,
    pub message: String,
}

/// Result of a full import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResponse {
    pub ok: bool,
    /// Every progress message in emission order.
    pub progress: Vec<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(affected: u64, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            affected,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            affected: 0,
            message: message.into(),
        }
    }
}

/// Adds or removes one color filter.
#[flutter_rust_bridge::frb(sync)]
pub fn filter_toggle_color(color: String, active: bool) -> FilterResponse {
    match Color::from_str(&color) {
        Ok(color) => with_filter(|engine| {
            engine.toggle_color(color, active);
        }),
        Err(err) => filter_failure(format!("filter_toggle_color failed: {err}")),
    }
}

/// Adds or removes one gender filter.
#[flutter_rust_bridge::frb(sync)]
pub fn filter_toggle_gender(gender: String, active: bool) -> FilterResponse {
    match Gender::from_str(&gender) {
        Ok(gender) => with_filter(|engine| {
            engine.toggle_gender(gender, active);
        }),
        Err(err) => filter_failure(format!("filter_toggle_gender failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn filter_clear_colors() -> FilterResponse {
    with_filter(FilterEngine::clear_colors)
}

#[flutter_rust_bridge::frb(sync)]
pub fn filter_clear_genders() -> FilterResponse {
    with_filter(FilterEngine::clear_genders)
}

#[flutter_rust_bridge::frb(sync)]
pub fn filter_clear_all() -> FilterResponse {
    with_filter(FilterEngine::clear_all)
}

/// Serializes current filter sets for host-side saved state.
#[flutter_rust_bridge::frb(sync)]
pub fn filter_snapshot_json() -> String {
    let snapshot = lock_filter().snapshot();
    serde_json::to_string(&snapshot).unwrap_or_else(|err| {
        warn!("event=filter_snapshot module=ffi status=error error={err}");
        String::new()
    })
}

/// Replaces filter sets from a saved snapshot.
///
/// Invalid JSON leaves the current filter untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn filter_restore_json(json: String) -> FilterResponse {
    match serde_json::from_str::<FilterState>(&json) {
        Ok(state) => {
            let mut engine = lock_filter();
            engine.replace(state);
            filter_response(&engine, "Filter restored.")
        }
        Err(err) => filter_failure(format!("filter_restore_json failed: {err}")),
    }
}

/// Returns one page of people for the active filter.
///
/// `limit` defaults to the page size and clamps to the cached-row bound.
#[flutter_rust_bridge::frb(sync)]
pub fn people_page(offset: u64, limit: Option<u32>) -> PeoplePageResponse {
    let applied_limit = normalize_page_limit(limit);
    let selector = current_selector();
    let request = PageRequest {
        limit: applied_limit,
        offset,
    };

    match with_people_service(|service| service.page(&selector, request)) {
        Ok(people) => {
            let items = people.into_iter().map(to_person_item).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No people.".to_string()
            } else {
                format!("Loaded {} person(s).", items.len())
            };
            PeoplePageResponse {
                ok: true,
                items,
                message,
                applied_limit,
            }
        }
        Err(err) => PeoplePageResponse {
            ok: false,
            items: Vec::new(),
            message: format!("people_page failed: {err}"),
            applied_limit,
        },
    }
}

/// Returns the filtered and total counts for the active filter.
#[flutter_rust_bridge::frb(sync)]
pub fn people_counts() -> CountsResponse {
    let selector = current_selector();
    match with_people_service(|service| service.counts(&selector)) {
        Ok(counts) => CountsResponse {
            ok: true,
            filtered: counts.filtered,
            total: counts.total,
            title: counts.title(),
            message: String::new(),
        },
        Err(err) => CountsResponse {
            ok: false,
            filtered: 0,
            total: 0,
            title: String::new(),
            message: format!("people_counts failed: {err}"),
        },
    }
}

/// Deletes one person by id.
#[flutter_rust_bridge::frb(sync)]
pub fn people_delete(id: i64) -> ActionResponse {
    match with_people_service(|service| service.delete_person(id)) {
        Ok(()) => ActionResponse::success(1, "Person deleted."),
        Err(err) => ActionResponse::failure(format!("people_delete failed: {err}")),
    }
}

/// Deletes every person.
#[flutter_rust_bridge::frb(sync)]
pub fn people_clear() -> ActionResponse {
    match with_people_service(|service| service.clear_all()) {
        Ok(deleted) => ActionResponse::success(deleted as u64, "All people deleted."),
        Err(err) => ActionResponse::failure(format!("people_clear failed: {err}")),
    }
}

/// Generates and stores `count` random people.
///
/// Runs the whole import before returning; call it off the UI thread.
/// Progress messages written before a failure are still returned.
pub fn people_import(count: u64) -> ImportResponse {
    let config = match ImportConfig::with_count(count) {
        Ok(config) => config,
        Err(err) => return import_failure(Vec::new(), err.to_string()),
    };

    let conn = match open_db(resolve_db_path()) {
        Ok(conn) => conn,
        Err(err) => return import_failure(Vec::new(), format!("DB open failed: {err}")),
    };
    let repo = match SqlitePersonRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => return import_failure(Vec::new(), format!("repo init failed: {err}")),
    };
    let service = PeopleService::new(repo);

    let word_source: Box<dyn WordSource> = match resolve_wordlist_path() {
        Some(path) => Box::new(FileWordSource::new(path)),
        None => Box::new(BundledWordSource),
    };

    let mut progress = Vec::new();
    for item in service.import(word_source.as_ref(), config) {
        match item {
            Ok(message) => progress.push(message.to_string()),
            Err(err) => return import_failure(progress, err.to_string()),
        }
    }

    ImportResponse {
        ok: true,
        message: format!("Imported {count} people."),
        progress,
    }
}

/// Import sizes offered in the import menu.
#[flutter_rust_bridge::frb(sync)]
pub fn import_count_choices() -> Vec<u64> {
    IMPORT_COUNT_CHOICES.to_vec()
}

fn import_failure(progress: Vec<String>, message: String) -> ImportResponse {
    warn!(
        "event=people_import module=ffi status=error progress_messages={}",
        progress.len()
    );
    ImportResponse {
        ok: false,
        progress,
        message: format!("people_import failed: {message}"),
    }
}

fn lock_filter() -> MutexGuard<'static, FilterEngine> {
    FILTER_ENGINE
        .get_or_init(|| Mutex::new(FilterEngine::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn current_selector() -> QuerySelector {
    lock_filter().current_selector()
}

fn with_filter(command: impl FnOnce(&mut FilterEngine)) -> FilterResponse {
    let mut engine = lock_filter();
    command(&mut *engine);
    filter_response(&engine, "Filter updated.")
}

fn filter_response(engine: &FilterEngine, message: &str) -> FilterResponse {
    FilterResponse {
        ok: true,
        colors: engine.colors().iter().map(|c| c.as_str().to_string()).collect(),
        genders: engine.genders().iter().map(|g| g.as_str().to_string()).collect(),
        selector: engine.current_selector().label().to_string(),
        message: message.to_string(),
    }
}

fn filter_failure(message: String) -> FilterResponse {
    let engine = lock_filter();
    FilterResponse {
        ok: false,
        message,
        ..filter_response(&engine, "")
    }
}

fn normalize_page_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => PAGE_SIZE,
        Some(value) => value.min(MAX_CACHED_ROWS),
    }
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            env_path(DB_PATH_ENV).unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME))
        })
        .clone()
}

fn resolve_wordlist_path() -> Option<PathBuf> {
    WORDLIST_PATH
        .get_or_init(|| env_path(WORDLIST_PATH_ENV))
        .clone()
}

fn env_path(name: &str) -> Option<PathBuf> {
    let raw = std::env::var(name).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

fn with_people_service<T>(
    f: impl FnOnce(&PeopleService<SqlitePersonRepository<'_>>) -> RepoResult<T>,
) -> Result<T, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    let repo = SqlitePersonRepository::try_new(&conn)
        .map_err(|err| format!("repo init failed: {err}"))?;
    let service = PeopleService::new(repo);
    f(&service).map_err(|err| err.to_string())
}

fn to_person_item(person: Person) -> PersonItem {
    PersonItem {
        id: person.id,
        gender: person.gender.as_str().to_string(),
        color: person.color.as_str().to_string(),
        first_name: person.first_name,
        middle_name: person.middle_name,
        last_name: person.last_name,
    }
}
