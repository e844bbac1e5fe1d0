#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared domain types for the incident map core.
//!
//! Defines the canonical incident feature produced by the dataset
//! normalizer, the time/spatial extent types, and the application state
//! model that drives every derived view. All other incident-map crates
//! build on these types.

pub mod time;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use time::{ExtentBounds, TimeExtent};

/// Basemap id used when the query string does not select one.
pub const DEFAULT_BASEMAP: &str = "dark-gray-vector";

/// Category and sheet labels fall back to this when the source record
/// carries no usable value.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Supported interface languages.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Lang {
    /// English (default).
    #[default]
    En,
    /// Spanish.
    Es,
}

/// Granularity of the time-series aggregation.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeStep {
    /// Calendar days, midnight-aligned.
    Day,
    /// ISO weeks, Monday-aligned.
    Week,
    /// Calendar months (default).
    #[default]
    Month,
    /// Calendar years.
    Year,
}

/// Spatial filtering mode.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExtentMode {
    /// Ignore the map viewport (default).
    #[default]
    All,
    /// Restrict to the current map viewport.
    View,
}

/// A normalized point incident.
///
/// Created once by the dataset normalizer and never mutated afterward. The
/// original source property bag is preserved alongside the resolved fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentFeature {
    /// Stable identifier, either the source feature id or a synthetic
    /// position-derived one.
    pub id: String,
    /// `(longitude, latitude)` in WGS84.
    pub coordinates: (f64, f64),
    /// The source property bag, enriched with the resolved fields.
    pub properties: serde_json::Map<String, serde_json::Value>,
    /// Resolved occurrence instant.
    pub timestamp: DateTime<Utc>,
    /// Resolved category label, [`UNKNOWN_LABEL`] when unresolvable.
    pub category: String,
    /// Source-sheet label, [`UNKNOWN_LABEL`] when absent.
    pub sheet: String,
}

/// The category/sheet/spatial filter selection.
///
/// Empty allow-lists restrict nothing; non-empty lists admit only listed
/// labels.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Category allow-list.
    pub categories: Vec<String>,
    /// Source-sheet allow-list.
    pub sheets: Vec<String>,
    /// Whether to restrict to the current map viewport.
    pub extent_mode: ExtentMode,
}

/// The single mutable application state.
///
/// All mutations go through the named transitions on
/// `incident_map_state::AppStore`; everything downstream is derived from a
/// snapshot of this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Interface language.
    pub lang: Lang,
    /// Basemap id forwarded to the map collaborator.
    pub basemap: String,
    /// Current analysis window, always within the dataset's global extent.
    pub time_extent: TimeExtent,
    /// Time-series granularity.
    pub time_step: TimeStep,
    /// Category/sheet/spatial filters.
    pub filters: FilterState,
}

impl AppState {
    /// The default state for a dataset with the given global extent: English,
    /// default basemap, the twelve-month default window, monthly granularity,
    /// and no filters.
    #[must_use]
    pub fn with_defaults(global_extent: &TimeExtent) -> Self {
        Self {
            lang: Lang::default(),
            basemap: DEFAULT_BASEMAP.to_string(),
            time_extent: TimeExtent::default_window(global_extent),
            time_step: TimeStep::default(),
            filters: FilterState::default(),
        }
    }
}

/// Change between a current and a previous period total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDelta {
    /// `current - previous`.
    pub diff: i64,
    /// `(current - previous) / previous * 100`.
    pub pct: f64,
}

impl PeriodDelta {
    /// Computes the delta between two totals.
    ///
    /// Returns `None` when `previous` is zero: the relative change is
    /// undefined and callers render it as "no comparison available" rather
    /// than a number.
    #[must_use]
    pub fn between(current: u64, previous: u64) -> Option<Self> {
        if previous == 0 {
            return None;
        }
        let diff = i64::try_from(current).unwrap_or(i64::MAX)
            - i64::try_from(previous).unwrap_or(i64::MAX);
        #[allow(clippy::cast_precision_loss)]
        let pct = diff as f64 / previous as f64 * 100.0;
        Some(Self { diff, pct })
    }
}
