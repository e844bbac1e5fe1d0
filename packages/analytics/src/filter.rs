//! The filter engine.

use incident_map_models::{ExtentBounds, ExtentMode, FilterState, IncidentFeature, TimeExtent};

/// Filters features against the current selection.
///
/// A feature passes when its timestamp lies in `window` (inclusive on both
/// ends), its category and sheet are admitted by the respective allow-lists
/// (an empty list restricts nothing), and, only when the extent mode is
/// `view` and `bounds` is supplied, its coordinates fall inside the bounds
/// rectangle (inclusive on all edges).
///
/// Input order is preserved; features are cloned, never mutated.
#[must_use]
pub fn filter_features(
    features: &[IncidentFeature],
    filters: &FilterState,
    window: &TimeExtent,
    bounds: Option<&ExtentBounds>,
) -> Vec<IncidentFeature> {
    features
        .iter()
        .filter(|feature| passes(feature, filters, window, bounds))
        .cloned()
        .collect()
}

fn passes(
    feature: &IncidentFeature,
    filters: &FilterState,
    window: &TimeExtent,
    bounds: Option<&ExtentBounds>,
) -> bool {
    if !window.contains(feature.timestamp) {
        return false;
    }
    if !filters.categories.is_empty() && !filters.categories.contains(&feature.category) {
        return false;
    }
    if !filters.sheets.is_empty() && !filters.sheets.contains(&feature.sheet) {
        return false;
    }
    let (lon, lat) = feature.coordinates;
    if filters.extent_mode == ExtentMode::View
        && bounds.is_some_and(|bounds| !bounds.contains(lon, lat))
    {
        return false;
    }
    true
}
