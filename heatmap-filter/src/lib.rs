//! # Heatmap Filter
//!
//! Categorical filtering of point collections.
//!
//! A record is kept when, for every constrained [`FilterDimension`], its
//! property is a string exactly equal to the required value. The literal
//! `"all"` means "no constraint".
//!
//! ## Example
//!
//! ```rust,ignore
//! use heatmap_filter::{apply_filters, FilterDimension, FilterState};
//!
//! let state = FilterState::new().with(FilterDimension::District, "Sydney");
//! let outcome = apply_filters(&collection, &state);
//! println!("{} matching", outcome.count);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod apply;
mod service;
mod state;

pub use apply::{apply_filters, FilterOutcome, FilterSummary};
pub use service::{FilterCallback, FilterService};
pub use state::{FilterDimension, FilterState, FilterValue};
