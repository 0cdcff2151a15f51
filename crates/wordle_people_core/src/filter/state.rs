//! Filter sets and the selector derived from them.

use crate::model::person::{Color, Gender};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Active filters for both dimensions.
///
/// Ordered sets keep SQL bind order and serialized snapshots deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub colors: BTreeSet<Color>,
    pub genders: BTreeSet<Gender>,
}

impl FilterState {
    /// Creates a state with no active filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether neither dimension filters anything.
    pub fn is_unfiltered(&self) -> bool {
        self.colors.is_empty() && self.genders.is_empty()
    }

    /// Derives the storage query variant for these sets.
    ///
    /// Total over every pair of set states: exactly one variant applies.
    pub fn selector(&self) -> QuerySelector {
        match (self.genders.is_empty(), self.colors.is_empty()) {
            (true, true) => QuerySelector::Unfiltered,
            (false, true) => QuerySelector::ByGender(self.genders.clone()),
            (true, false) => QuerySelector::ByColor(self.colors.clone()),
            (false, false) => QuerySelector::ByGenderAndColor {
                genders: self.genders.clone(),
                colors: self.colors.clone(),
            },
        }
    }
}

/// Which of the four people queries to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuerySelector {
    /// No filter on either column.
    #[default]
    Unfiltered,
    /// `gender IN (...)`.
    ByGender(BTreeSet<Gender>),
    /// `color IN (...)`.
    ByColor(BTreeSet<Color>),
    /// `gender IN (...) AND color IN (...)`.
    ByGenderAndColor {
        genders: BTreeSet<Gender>,
        colors: BTreeSet<Color>,
    },
}

impl QuerySelector {
    /// Stable short name for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unfiltered => "unfiltered",
            Self::ByGender(_) => "by_gender",
            Self::ByColor(_) => "by_color",
            Self::ByGenderAndColor { .. } => "by_gender_and_color",
        }
    }

    /// Gender filter carried by this selector, if any.
    pub fn genders(&self) -> Option<&BTreeSet<Gender>> {
        match self {
            Self::ByGender(genders) | Self::ByGenderAndColor { genders, .. } => Some(genders),
            Self::Unfiltered | Self::ByColor(_) => None,
        }
    }

    /// Color filter carried by this selector, if any.
    pub fn colors(&self) -> Option<&BTreeSet<Color>> {
        match self {
            Self::ByColor(colors) | Self::ByGenderAndColor { colors, .. } => Some(colors),
            Self::Unfiltered | Self::ByGender(_) => None,
        }
    }

    /// Returns whether a row with `gender` and `color` passes this selector.
    pub fn matches(&self, gender: Gender, color: Color) -> bool {
        self.genders().map_or(true, |genders| genders.contains(&gender))
            && self.colors().map_or(true, |colors| colors.contains(&color))
    }
}
