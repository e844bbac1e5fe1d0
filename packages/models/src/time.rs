//! Time extent and spatial bounds types shared across the incident map core.

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// An inclusive time range with `start <= end` guaranteed by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeExtent {
    /// Inclusive start of the range.
    pub start: DateTime<Utc>,
    /// Inclusive end of the range.
    pub end: DateTime<Utc>,
}

impl TimeExtent {
    /// Creates an extent, swapping the endpoints if they arrive inverted.
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Returns whether `instant` lies within this extent, inclusive on both
    /// ends.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// Clamps this extent into `global`.
    ///
    /// The clamped start is `max(global.start, self.start)` and the clamped
    /// end is `min(global.end, self.end)`. When the clamped pair is inverted
    /// (the two extents are disjoint) the full `global` extent is returned
    /// instead.
    #[must_use]
    pub fn clamp_to(&self, global: &Self) -> Self {
        let start = self.start.max(global.start);
        let end = self.end.min(global.end);
        if start > end { *global } else { Self { start, end } }
    }

    /// Length of the extent as a signed duration (always non-negative).
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// The window of the same length immediately preceding this one, ending
    /// at this extent's start. Used for period-over-period comparisons.
    #[must_use]
    pub fn previous_period(&self) -> Self {
        Self {
            start: self.start - self.duration(),
            end: self.start,
        }
    }

    /// The default analysis window for a dataset whose global extent is
    /// `global`: twelve calendar months anchored at the global start, capped
    /// at the global end.
    ///
    /// Month addition preserves the day-of-month, falling back to the last
    /// valid day when the target month is shorter.
    #[must_use]
    pub fn default_window(global: &Self) -> Self {
        let candidate = global
            .start
            .checked_add_months(Months::new(12))
            .unwrap_or(global.end);
        Self {
            start: global.start,
            end: candidate.min(global.end),
        }
    }
}

/// A spatial bounding rectangle in lon/lat, inclusive on all four edges.
///
/// Typically the current map viewport, reported by the rendering collaborator
/// and consumed only when the extent filter mode is `view`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtentBounds {
    /// Western edge (minimum longitude).
    pub xmin: f64,
    /// Southern edge (minimum latitude).
    pub ymin: f64,
    /// Eastern edge (maximum longitude).
    pub xmax: f64,
    /// Northern edge (maximum latitude).
    pub ymax: f64,
}

impl ExtentBounds {
    /// Returns whether the `(lon, lat)` point lies within the rectangle,
    /// inclusive on all edges.
    #[must_use]
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.xmin && lon <= self.xmax && lat >= self.ymin && lat <= self.ymax
    }
}
