//! People use-case service.
//!
//! # Responsibility
//! - Serve paged, selector-filtered people lists and count pairs.
//! - Start import runs and forward delete/clear commands.
//!
//! # Invariants
//! - Service APIs never bypass repository contracts.
//! - Service layer remains storage-agnostic.

use crate::filter::counts::FilterCounts;
use crate::filter::state::QuerySelector;
use crate::import::pipeline::{ImportConfig, ImportRun};
use crate::import::words::WordSource;
use crate::model::person::{Person, PersonId};
use crate::repo::person_repo::{PageRequest, PersonRepository, RepoResult, PAGE_SIZE};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Use-case service wrapper for people operations.
pub struct PeopleService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> PeopleService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Fetches one page of people matching `selector`, ordered by id.
    pub fn page(&self, selector: &QuerySelector, page: PageRequest) -> RepoResult<Vec<Person>> {
        self.repo.list_people(selector, page)
    }

    /// Iterates every matching person page by page.
    pub fn pager(&self, selector: QuerySelector) -> PeoplePager<'_, R> {
        PeoplePager::new(&self.repo, selector, PAGE_SIZE)
    }

    /// Count for `selector` paired with the unfiltered total.
    pub fn counts(&self, selector: &QuerySelector) -> RepoResult<FilterCounts> {
        self.repo.count_pair(selector)
    }

    pub fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        self.repo.get_person(id)
    }

    /// Deletes one person by id.
    pub fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        self.repo.delete_person(id)?;
        info!("event=people_delete module=service status=ok");
        Ok(())
    }

    /// Deletes every person. Returns rows deleted.
    pub fn clear_all(&self) -> RepoResult<usize> {
        let deleted = self.repo.delete_all()?;
        info!("event=people_clear module=service status=ok rows={deleted}");
        Ok(deleted)
    }

    /// Starts an import seeded from the OS random source.
    ///
    /// Nothing is generated or written until the returned run is iterated.
    pub fn import<W: WordSource>(
        &self,
        word_source: W,
        config: ImportConfig,
    ) -> ImportRun<'_, R, W, ChaCha8Rng> {
        let rng = ChaCha8Rng::from_rng(&mut rand::rng());
        self.import_with_rng(word_source, rng, config)
    }

    /// Starts an import with a caller-supplied random source.
    pub fn import_with_rng<W: WordSource, G: Rng>(
        &self,
        word_source: W,
        rng: G,
        config: ImportConfig,
    ) -> ImportRun<'_, R, W, G> {
        ImportRun::new(&self.repo, word_source, rng, config)
    }
}

/// Page-by-page walk over one selector's result set.
///
/// Ends after the first page shorter than the page size. Yields an error at
/// most once, then ends.
pub struct PeoplePager<'repo, R: PersonRepository + ?Sized> {
    repo: &'repo R,
    selector: QuerySelector,
    page_size: u32,
    next_page: u64,
    exhausted: bool,
}

impl<'repo, R: PersonRepository + ?Sized> PeoplePager<'repo, R> {
    pub fn new(repo: &'repo R, selector: QuerySelector, page_size: u32) -> Self {
        Self {
            repo,
            selector,
            page_size: page_size.max(1),
            next_page: 0,
            exhausted: false,
        }
    }

    pub fn selector(&self) -> &QuerySelector {
        &self.selector
    }
}

impl<R: PersonRepository + ?Sized> Iterator for PeoplePager<'_, R> {
    type Item = RepoResult<Vec<Person>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let request = PageRequest::nth(self.next_page, self.page_size);
        match self.repo.list_people(&self.selector, request) {
            Ok(people) => {
                self.next_page += 1;
                if people.len() < self.page_size as usize {
                    self.exhausted = true;
                }
                if people.is_empty() {
                    None
                } else {
                    Some(Ok(people))
                }
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}
