#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pure filtering and aggregation over normalized incident features.
//!
//! Every function here is deterministic and side-effect free: the same
//! inputs always produce the same output, so downstream recomputation can
//! be triggered as often as convenient.

pub mod aggregate;
pub mod filter;

pub use aggregate::{
    CategoryCount, DEFAULT_TOP_LIMIT, HourCount, TimeBucket, distinct_categories,
    hour_distribution, time_series, top_categories,
};
pub use filter::filter_features;
