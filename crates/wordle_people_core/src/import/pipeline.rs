//! Lazy, batched import of randomly generated people.
//!
//! # Responsibility
//! - Drive the load → generate → batch-write sequence as an `Iterator`.
//! - Yield one progress message per completed stage or batch.
//!
//! # Invariants
//! - Messages are yielded in order: loading, started, one per full batch,
//!   then done. An error or cancellation ends the sequence early.
//! - The trailing partial batch (possibly empty) is always handed to
//!   storage before `Done`.
//! - After an error is yielded the iterator only returns `None`.

use super::words::{WordSource, WordSourceError};
use crate::model::person::{Color, Gender, NewPerson};
use crate::repo::person_repo::{PersonRepository, RepoError};
use log::{error, info, warn};
use rand::Rng;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Records written per storage call unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Import sizes offered to users.
pub const IMPORT_COUNT_CHOICES: [u64; 6] = [1_000, 5_000, 10_000, 25_000, 50_000, 100_000];

/// Errors that end an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import count must be positive")]
    InvalidCount,
    #[error("import batch size must be positive")]
    InvalidBatchSize,
    #[error("word list is empty; cannot synthesize names")]
    EmptyWordList,
    #[error("{0}")]
    WordSource(#[from] WordSourceError),
    #[error("failed to write imported batch: {0}")]
    StorageWrite(#[source] RepoError),
}

/// Validated size parameters for one import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportConfig {
    count: u64,
    batch_size: usize,
}

impl ImportConfig {
    /// # Errors
    /// - `InvalidCount` when `count == 0`.
    /// - `InvalidBatchSize` when `batch_size == 0`.
    pub fn new(count: u64, batch_size: usize) -> Result<Self, ImportError> {
        if count == 0 {
            return Err(ImportError::InvalidCount);
        }
        if batch_size == 0 {
            return Err(ImportError::InvalidBatchSize);
        }
        Ok(Self { count, batch_size })
    }

    /// Uses [`DEFAULT_BATCH_SIZE`].
    pub fn with_count(count: u64) -> Result<Self, ImportError> {
        Self::new(count, DEFAULT_BATCH_SIZE)
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

/// Human-readable import progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportProgress {
    LoadingWords,
    StartedBuilding,
    /// `done` is the index of the last record in the written batch.
    Imported { done: u64, total: u64 },
    Done,
}

impl Display for ImportProgress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadingWords => f.write_str("Loading words"),
            Self::StartedBuilding => f.write_str("Started building database"),
            Self::Imported { done, total } => write!(f, "Imported {done} of {total}"),
            Self::Done => f.write_str("Done"),
        }
    }
}

/// Cooperative cancellation flag shared between a UI thread and an import.
#[derive(Debug, Clone, Default)]
pub struct ImportCancel(Arc<AtomicBool>);

impl ImportCancel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the import to stop at its next record boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    LoadWords,
    Generate,
    Finished,
}

/// One import run. Iterate it to drive the work.
///
/// The run is single-use: each record is generated and written while the
/// iterator advances, and a finished run yields nothing more.
pub struct ImportRun<'repo, R, W, G>
where
    R: PersonRepository + ?Sized,
    W: WordSource,
    G: Rng,
{
    repo: &'repo R,
    word_source: W,
    rng: G,
    config: ImportConfig,
    cancel: ImportCancel,
    stage: Stage,
    words: Vec<String>,
    pending: Vec<NewPerson>,
    next_index: u64,
    insert_calls: usize,
    rows_written: u64,
    started_at: Instant,
}

impl<'repo, R, W, G> ImportRun<'repo, R, W, G>
where
    R: PersonRepository + ?Sized,
    W: WordSource,
    G: Rng,
{
    pub fn new(repo: &'repo R, word_source: W, rng: G, config: ImportConfig) -> Self {
        Self {
            repo,
            word_source,
            rng,
            config,
            cancel: ImportCancel::new(),
            stage: Stage::Start,
            words: Vec::new(),
            pending: Vec::with_capacity(config.batch_size.min(DEFAULT_BATCH_SIZE)),
            next_index: 1,
            insert_calls: 0,
            rows_written: 0,
            started_at: Instant::now(),
        }
    }

    /// Replaces the run's cancellation flag with a shared one.
    pub fn with_cancel(mut self, cancel: ImportCancel) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that can stop this run from another thread.
    pub fn cancel_handle(&self) -> ImportCancel {
        self.cancel.clone()
    }

    pub fn config(&self) -> ImportConfig {
        self.config
    }

    /// Repository insert calls issued so far, including an empty tail batch.
    pub fn insert_calls(&self) -> usize {
        self.insert_calls
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    fn load_words(&mut self) -> Result<ImportProgress, ImportError> {
        let words = self.word_source.load_words()?;
        if words.is_empty() {
            return Err(ImportError::EmptyWordList);
        }
        info!(
            "event=import_words module=import status=ok words={}",
            words.len()
        );
        self.words = words;
        Ok(ImportProgress::StartedBuilding)
    }

    fn generate(&mut self) -> Option<Result<ImportProgress, ImportError>> {
        while self.next_index <= self.config.count {
            if self.cancel.is_cancelled() {
                warn!(
                    "event=import_cancel module=import status=cancelled rows_written={} pending_dropped={}",
                    self.rows_written,
                    self.pending.len()
                );
                self.stage = Stage::Finished;
                return None;
            }

            let index = self.next_index;
            self.next_index += 1;
            self.pending.push(random_person(&mut self.rng, &self.words));

            if self.pending.len() >= self.config.batch_size {
                if let Err(err) = self.flush() {
                    return Some(Err(err));
                }
                return Some(Ok(ImportProgress::Imported {
                    done: index,
                    total: self.config.count,
                }));
            }
        }

        if let Err(err) = self.flush() {
            return Some(Err(err));
        }
        self.stage = Stage::Finished;
        info!(
            "event=import_done module=import status=ok rows_written={} insert_calls={} duration_ms={}",
            self.rows_written,
            self.insert_calls,
            self.started_at.elapsed().as_millis()
        );
        Some(Ok(ImportProgress::Done))
    }

    fn flush(&mut self) -> Result<(), ImportError> {
        self.insert_calls += 1;
        match self.repo.insert_batch(&self.pending) {
            Ok(inserted) => {
                self.rows_written += inserted as u64;
                info!(
                    "event=import_batch module=import status=ok inserted={} progress={}/{}",
                    inserted,
                    self.rows_written,
                    self.config.count
                );
                self.pending.clear();
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=import_batch module=import status=error rows_written={} error={}",
                    self.rows_written, err
                );
                self.stage = Stage::Finished;
                Err(ImportError::StorageWrite(err))
            }
        }
    }
}

impl<R, W, G> Iterator for ImportRun<'_, R, W, G>
where
    R: PersonRepository + ?Sized,
    W: WordSource,
    G: Rng,
{
    type Item = Result<ImportProgress, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.stage {
            Stage::Start => {
                info!(
                    "event=import_start module=import status=start count={} batch_size={}",
                    self.config.count, self.config.batch_size
                );
                self.started_at = Instant::now();
                self.stage = Stage::LoadWords;
                Some(Ok(ImportProgress::LoadingWords))
            }
            Stage::LoadWords => {
                let loaded = self.load_words();
                self.stage = if loaded.is_ok() {
                    Stage::Generate
                } else {
                    Stage::Finished
                };
                if let Err(err) = &loaded {
                    error!("event=import_words module=import status=error error={err}");
                }
                Some(loaded)
            }
            Stage::Generate => self.generate(),
            Stage::Finished => None,
        }
    }
}

/// Draws one person: three independent uniform word picks, then a uniform
/// gender and color.
///
/// `words` must be non-empty.
pub fn random_person<G: Rng>(rng: &mut G, words: &[String]) -> NewPerson {
    let first_name = pick_word(rng, words);
    let middle_name = pick_word(rng, words);
    let last_name = pick_word(rng, words);
    let gender = Gender::ALL[rng.random_range(0..Gender::ALL.len())];
    let color = Color::ALL[rng.random_range(0..Color::ALL.len())];

    NewPerson {
        first_name,
        middle_name,
        last_name,
        gender,
        color,
    }
}

fn pick_word<G: Rng>(rng: &mut G, words: &[String]) -> String {
    words[rng.random_range(0..words.len())].clone()
}
