//! The filter pass and its summary text.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use heatmap_core::types::FeatureCollection;

use crate::state::FilterState;

/// Result of one filter pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FilterOutcome {
    /// Matching records, in source order
    pub collection: FeatureCollection,
    /// Number of matching records
    pub count: usize,
}

/// Returns the records of `collection` that satisfy every active constraint
/// in `state`.
///
/// Pure: the output depends only on the two arguments. With no active
/// constraint the result equals the input.
pub fn apply_filters(collection: &FeatureCollection, state: &FilterState) -> FilterOutcome {
    let filtered: FeatureCollection = if state.is_active() {
        collection.iter().filter(|f| state.matches(f)).cloned().collect()
    } else {
        collection.clone()
    };

    debug!(total = collection.len(), matched = filtered.len(), filters = %state.describe(), "Filtered");
    FilterOutcome {
        count: filtered.len(),
        collection: filtered,
    }
}

/// Screen-reader summary of a filter pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSummary {
    /// Number of matching records
    pub count: usize,
    /// Active constraints, `"district: Sydney, weather: Rain"`; empty if none
    pub active: String,
}

impl FilterSummary {
    /// Summarises `count` results under `state`.
    pub fn new(count: usize, state: &FilterState) -> Self {
        Self {
            count,
            active: state.describe(),
        }
    }

    /// Short message for the notification surface.
    pub fn notification_text(&self) -> String {
        if self.active.is_empty() {
            format!("Showing all {} locations", self.count)
        } else {
            format!("Found {} locations matching: {}", self.count, self.active)
        }
    }
}

impl fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.active.is_empty() {
            write!(f, "Showing all {} results, no filters applied", self.count)
        } else {
            write!(f, "Showing {} results filtered by {}", self.count, self.active)
        }
    }
}
