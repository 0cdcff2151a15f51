//! Filtered/total count pair shown next to the people list.

use serde::{Deserialize, Serialize};

const MAGNITUDE_SUFFIXES: [char; 6] = ['k', 'M', 'G', 'T', 'P', 'E'];

/// Row count for the active selector alongside the unfiltered total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCounts {
    pub filtered: u64,
    pub total: u64,
}

impl FilterCounts {
    /// Returns whether the filter hides any rows.
    pub fn is_narrowed(&self) -> bool {
        self.filtered != self.total
    }

    /// Title text: `"N"` when nothing is hidden, `"N of M"` otherwise.
    pub fn title(&self) -> String {
        if self.is_narrowed() {
            format!(
                "{} of {}",
                format_compact(self.filtered),
                format_compact(self.total)
            )
        } else {
            format_compact(self.total)
        }
    }
}

/// Formats a count with one decimal and a magnitude suffix from 1000 up.
///
/// `999 -> "999"`, `1000 -> "1.0k"`, `25_000 -> "25.0k"`, `1_500_000 -> "1.5M"`.
pub fn format_compact(count: u64) -> String {
    if count < 1000 {
        return count.to_string();
    }

    let mut scaled = count as f64;
    let mut exponent = 0usize;
    while scaled >= 1000.0 && exponent < MAGNITUDE_SUFFIXES.len() {
        scaled /= 1000.0;
        exponent += 1;
    }

    let suffix = MAGNITUDE_SUFFIXES
        .get(exponent.saturating_sub(1))
        .copied()
        .unwrap_or('E');
    format!("{scaled:.1}{suffix}")
}
