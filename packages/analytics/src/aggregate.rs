//! The aggregation engine: time-bucketed series, category rankings, and
//! hour-of-day histograms.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike as _, Months, NaiveTime, TimeDelta, Timelike as _, Utc};
use incident_map_models::{IncidentFeature, TimeStep};
use serde::{Deserialize, Serialize};

/// Default number of entries returned by [`top_categories`].
pub const DEFAULT_TOP_LIMIT: usize = 8;

/// One non-empty bucket of the time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucket {
    /// Start of the enclosing period.
    pub start: DateTime<Utc>,
    /// Start advanced by exactly one unit of the granularity.
    pub end: DateTime<Utc>,
    /// Number of features in the bucket.
    pub count: u64,
}

/// A category with its feature count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category label.
    pub name: String,
    /// Number of features with this label.
    pub count: u64,
}

/// One hour-of-day histogram bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourCount {
    /// Hour of day, 0-23.
    pub hour: u8,
    /// Number of features in this hour.
    pub count: u64,
}

/// Buckets each feature to the start of its enclosing period and counts per
/// bucket.
///
/// The representation is sparse: buckets with zero features are omitted, so
/// callers must not assume contiguous coverage. Buckets are sorted ascending
/// by start.
#[must_use]
pub fn time_series(features: &[IncidentFeature], step: TimeStep) -> Vec<TimeBucket> {
    let mut buckets: BTreeMap<DateTime<Utc>, u64> = BTreeMap::new();
    for feature in features {
        *buckets.entry(start_of_step(feature.timestamp, step)).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(start, count)| TimeBucket {
            start,
            end: advance_step(start, step),
            count,
        })
        .collect()
}

/// Counts features per category and returns the top `limit` entries.
///
/// Ordering is descending by count with ties broken by ascending label, so
/// the result is stable under permutation of the input.
#[must_use]
pub fn top_categories(features: &[IncidentFeature], limit: usize) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for feature in features {
        *counts.entry(feature.category.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}

/// Counts features per hour of day.
///
/// Always returns exactly 24 buckets in hour order, zeros included.
#[must_use]
pub fn hour_distribution(features: &[IncidentFeature]) -> Vec<HourCount> {
    let mut counts = [0_u64; 24];
    for feature in features {
        // hour() is always 0-23
        let hour = usize::try_from(feature.timestamp.hour()).unwrap_or(0);
        counts[hour] += 1;
    }
    counts
        .iter()
        .enumerate()
        .map(|(hour, &count)| HourCount {
            hour: u8::try_from(hour).unwrap_or(u8::MAX),
            count,
        })
        .collect()
}

/// Number of distinct category labels in the feature list.
#[must_use]
pub fn distinct_categories(features: &[IncidentFeature]) -> usize {
    features
        .iter()
        .map(|f| f.category.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

fn start_of_step(instant: DateTime<Utc>, step: TimeStep) -> DateTime<Utc> {
    let day = instant.date_naive();
    let aligned = match step {
        TimeStep::Day => day,
        TimeStep::Week => {
            day - TimeDelta::days(i64::from(day.weekday().num_days_from_monday()))
        }
        TimeStep::Month => day.with_day(1).unwrap_or(day),
        TimeStep::Year => day.with_day(1).and_then(|d| d.with_month(1)).unwrap_or(day),
    };
    aligned.and_time(NaiveTime::MIN).and_utc()
}

fn advance_step(start: DateTime<Utc>, step: TimeStep) -> DateTime<Utc> {
    match step {
        TimeStep::Day => start + TimeDelta::days(1),
        TimeStep::Week => start + TimeDelta::days(7),
        TimeStep::Month => start.checked_add_months(Months::new(1)).unwrap_or(start),
        TimeStep::Year => start.checked_add_months(Months::new(12)).unwrap_or(start),
    }
}
