//! Filter dimensions and the filter state.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use heatmap_core::constants::{
    FILTER_ALL, PROPERTY_DISTRICT, PROPERTY_FREQUENCY, PROPERTY_INTENSITY_CATEGORY, PROPERTY_TIME_PERIOD,
    PROPERTY_WEATHER,
};
use heatmap_core::error::HeatmapError;
use heatmap_core::types::Feature;

// ═══════════════════════════════════════════════════════════════════════════════
// DIMENSION
// ═══════════════════════════════════════════════════════════════════════════════

/// A categorical attribute that can constrain the visible records.
///
/// Declaration order is the order used in summaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterDimension {
    /// Intensity bucket, matched against `intensity_category`
    Intensity,
    /// District name
    District,
    /// Occurrence frequency bucket
    Frequency,
    /// Time of day
    TimePeriod,
    /// Weather condition
    Weather,
}

impl FilterDimension {
    /// Every dimension, in summary order.
    pub const ALL: [FilterDimension; 5] = [
        FilterDimension::Intensity,
        FilterDimension::District,
        FilterDimension::Frequency,
        FilterDimension::TimePeriod,
        FilterDimension::Weather,
    ];

    /// Key used to name the dimension (`time_period`, ...).
    pub fn key(self) -> &'static str {
        match self {
            FilterDimension::Intensity => "intensity",
            FilterDimension::District => "district",
            FilterDimension::Frequency => "frequency",
            FilterDimension::TimePeriod => "time_period",
            FilterDimension::Weather => "weather",
        }
    }

    /// Record property the dimension is matched against.
    pub fn property_name(self) -> &'static str {
        match self {
            FilterDimension::Intensity => PROPERTY_INTENSITY_CATEGORY,
            FilterDimension::District => PROPERTY_DISTRICT,
            FilterDimension::Frequency => PROPERTY_FREQUENCY,
            FilterDimension::TimePeriod => PROPERTY_TIME_PERIOD,
            FilterDimension::Weather => PROPERTY_WEATHER,
        }
    }

    /// Human-readable label (`time period`).
    pub fn label(self) -> &'static str {
        match self {
            FilterDimension::TimePeriod => "time period",
            other => other.key(),
        }
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FilterDimension {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.key() == s)
            .ok_or_else(|| HeatmapError::Config(format!("Unknown filter dimension: {s}")))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALUE
// ═══════════════════════════════════════════════════════════════════════════════

/// Required value for one dimension.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterValue {
    /// No constraint
    #[default]
    All,
    /// Property must equal this string exactly
    Exact(String),
}

impl FilterValue {
    /// Parses a selector value; the literal `"all"` means no constraint.
    pub fn parse(value: &str) -> Self {
        if value == FILTER_ALL {
            FilterValue::All
        } else {
            FilterValue::Exact(value.to_string())
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Option<String>> for FilterValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(FilterValue::All, FilterValue::from)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::All => f.write_str(FILTER_ALL),
            FilterValue::Exact(v) => f.write_str(v),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Current constraint per dimension. Dimensions not present are unconstrained.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    active: BTreeMap<FilterDimension, String>,
}

impl FilterState {
    /// Creates a state with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterState::set`].
    pub fn with(mut self, dimension: FilterDimension, value: impl Into<FilterValue>) -> Self {
        self.set(dimension, value);
        self
    }

    /// Sets one dimension. [`FilterValue::All`] clears it.
    pub fn set(&mut self, dimension: FilterDimension, value: impl Into<FilterValue>) {
        match value.into() {
            FilterValue::All => {
                self.active.remove(&dimension);
            }
            FilterValue::Exact(v) => {
                self.active.insert(dimension, v);
            }
        }
    }

    /// Returns the constraint on `dimension`.
    pub fn get(&self, dimension: FilterDimension) -> FilterValue {
        self.active
            .get(&dimension)
            .map_or(FilterValue::All, |v| FilterValue::Exact(v.clone()))
    }

    /// Clears every dimension.
    pub fn reset(&mut self) {
        self.active.clear();
    }

    /// True if any dimension is constrained.
    pub fn is_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Active constraints in summary order.
    pub fn active(&self) -> impl Iterator<Item = (FilterDimension, &str)> {
        self.active.iter().map(|(d, v)| (*d, v.as_str()))
    }

    /// True if `feature` satisfies every active constraint.
    ///
    /// The property must be a JSON string equal to the required value;
    /// a missing or non-string property never matches.
    pub fn matches(&self, feature: &Feature) -> bool {
        self.active.iter().all(|(dimension, required)| {
            feature.properties.get_str(dimension.property_name()) == Some(required.as_str())
        })
    }

    /// Active constraints as `"district: Sydney, time period: Night"`.
    pub fn describe(&self) -> String {
        self.active()
            .map(|(d, v)| format!("{}: {}", d.label(), v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
