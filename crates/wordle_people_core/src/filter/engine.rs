//! Session filter engine.
//!
//! # Responsibility
//! - Apply toggle/clear commands to the filter sets.
//! - Republish the derived selector when a command changes it.
//!
//! # Invariants
//! - Mutations take `&mut self`; hosts sharing an engine across threads wrap
//!   it in a `Mutex`.
//! - The published selector always equals `current_selector()` once a
//!   command returns.

use super::channel::{SelectorPublisher, SelectorSubscriber};
use super::state::{FilterState, QuerySelector};
use crate::model::person::{Color, Gender};
use log::debug;
use std::collections::BTreeSet;

/// Owns one session's filter sets and the selector channel fed from them.
pub struct FilterEngine {
    state: FilterState,
    publisher: SelectorPublisher,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterEngine {
    /// Creates an engine with both dimensions unfiltered.
    pub fn new() -> Self {
        Self::restore(FilterState::new())
    }

    /// Creates an engine from a previously saved snapshot.
    pub fn restore(state: FilterState) -> Self {
        let publisher = SelectorPublisher::new(state.selector());
        Self { state, publisher }
    }

    /// Copy of the current sets, suitable for saving across suspend/resume.
    pub fn snapshot(&self) -> FilterState {
        self.state.clone()
    }

    /// Swaps in saved sets wholesale and republishes once.
    pub fn replace(&mut self, state: FilterState) {
        self.state = state;
        let selector = self.state.selector();
        let label = selector.label();
        let version = self.publisher.publish(selector);
        self.log_publish("replace", version, label);
    }

    /// Active color filters.
    pub fn colors(&self) -> &BTreeSet<Color> {
        &self.state.colors
    }

    /// Active gender filters.
    pub fn genders(&self) -> &BTreeSet<Gender> {
        &self.state.genders
    }

    /// Adds `color` when `active`, removes it otherwise.
    ///
    /// Returns whether the set changed. Nothing is republished when it did not.
    pub fn toggle_color(&mut self, color: Color, active: bool) -> bool {
        let changed = if active {
            self.state.colors.insert(color)
        } else {
            self.state.colors.remove(&color)
        };
        self.publish("toggle_color");
        changed
    }

    /// Adds `gender` when `active`, removes it otherwise.
    ///
    /// Returns whether the set changed. Nothing is republished when it did not.
    pub fn toggle_gender(&mut self, gender: Gender, active: bool) -> bool {
        let changed = if active {
            self.state.genders.insert(gender)
        } else {
            self.state.genders.remove(&gender)
        };
        self.publish("toggle_gender");
        changed
    }

    pub fn clear_colors(&mut self) {
        self.state.colors.clear();
        self.publish("clear_colors");
    }

    pub fn clear_genders(&mut self) {
        self.state.genders.clear();
        self.publish("clear_genders");
    }

    pub fn clear_all(&mut self) {
        self.state.colors.clear();
        self.state.genders.clear();
        self.publish("clear_all");
    }

    /// Derives the storage query variant for the current sets.
    pub fn current_selector(&self) -> QuerySelector {
        self.state.selector()
    }

    /// Opens a new observer of the selector stream.
    pub fn subscribe(&self) -> SelectorSubscriber {
        self.publisher.subscribe()
    }

    fn publish(&self, command: &'static str) {
        let selector = self.state.selector();
        let label = selector.label();
        match self.publisher.publish_if_changed(selector) {
            Some(version) => self.log_publish(command, version, label),
            None => debug!(
                "event=filter_publish module=filter command={command} status=skipped selector={label}"
            ),
        }
    }

    fn log_publish(&self, command: &'static str, version: u64, label: &'static str) {
        debug!(
            "event=filter_publish module=filter command={} status=ok version={} selector={} colors={} genders={}",
            command,
            version,
            label,
            self.state.colors.len(),
            self.state.genders.len()
        );
    }
}
