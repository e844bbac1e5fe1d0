#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident dataset normalization.
//!
//! Turns a raw GeoJSON-style point-feature collection into the canonical
//! [`Dataset`]: validated [`IncidentFeature`] records, the global time
//! extent, the distinct category/sheet label sets, and a re-serialized
//! [`RenderDocument`] for the map collaborator. Raw elements with non-point
//! geometry or no parseable timestamp are dropped silently; the dataset as a
//! whole fails only when nothing survives.

pub mod document;
pub mod fields;
pub mod loader;
pub mod parse;

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use incident_map_models::{IncidentFeature, TimeExtent, UNKNOWN_LABEL};
use serde_json::{Map, Value};

pub use document::RenderDocument;
pub use fields::FieldConfig;
pub use loader::{load_dataset, read_dataset};

/// Errors that can occur while loading or normalizing a dataset.
///
/// None of these are recoverable mid-session: either the dataset loads and
/// every derivation proceeds, or the whole session ends in a terminal
/// failure state.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// HTTP transport failed.
    #[error("HTTP request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The fetch returned a non-success status.
    #[error("Failed to fetch data ({status})")]
    Http {
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local file read failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The raw collection had zero elements.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Every raw element was dropped during normalization.
    #[error("No features with valid timestamp and coordinates")]
    NoValidFeatures,
}

/// The canonical, immutable dataset derived once from raw input.
#[derive(Debug)]
pub struct Dataset {
    features: Vec<IncidentFeature>,
    extent: TimeExtent,
    categories: Vec<String>,
    sheets: Vec<String>,
    document: RenderDocument,
}

impl Dataset {
    /// All normalized features, in input order.
    #[must_use]
    pub fn features(&self) -> &[IncidentFeature] {
        &self.features
    }

    /// The global time extent over all features.
    #[must_use]
    pub const fn extent(&self) -> &TimeExtent {
        &self.extent
    }

    /// Sorted, deduplicated category labels.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Sorted, deduplicated source-sheet labels.
    #[must_use]
    pub fn sheets(&self) -> &[String] {
        &self.sheets
    }

    /// The re-serialized render document.
    #[must_use]
    pub const fn document(&self) -> &RenderDocument {
        &self.document
    }

    /// Releases the render document payload. See [`RenderDocument::release`].
    pub fn release_document(&mut self) -> bool {
        self.document.release()
    }
}

/// Normalizes a raw point-feature collection.
///
/// `raw` is the parsed JSON document; only its `features` array is consulted,
/// so malformed sibling members are tolerated. Per element: non-point or
/// short-coordinate geometry drops it, an unresolvable timestamp drops it,
/// an unresolvable category or sheet falls back to `"Unknown"`.
///
/// # Errors
///
/// [`DatasetError::EmptyDataset`] when the raw collection has zero elements,
/// [`DatasetError::NoValidFeatures`] when every element is dropped, and
/// [`DatasetError::Json`] when the render document fails to serialize.
pub fn normalize(raw: &Value, fields: &FieldConfig) -> Result<Dataset, DatasetError> {
    let raw_features = raw
        .get("features")
        .and_then(Value::as_array)
        .map_or(&[] as &[Value], Vec::as_slice);
    if raw_features.is_empty() {
        return Err(DatasetError::EmptyDataset);
    }

    let mut features = Vec::new();
    let mut render_features = Vec::new();
    let mut dropped_geometry = 0_usize;
    let mut dropped_timestamp = 0_usize;

    for (index, element) in raw_features.iter().enumerate() {
        let Some(coordinates) = point_coordinates(element.get("geometry")) else {
            dropped_geometry += 1;
            continue;
        };
        let props = element
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let Some(timestamp) = resolve_timestamp(&props, fields) else {
            dropped_timestamp += 1;
            continue;
        };
        let category = resolve_category(&props, fields);
        let sheet = resolve_sheet(&props, fields);
        let id = feature_id(element, index);

        let mut enriched = props;
        enriched.insert(
            fields.timestamp_field.clone(),
            Value::String(timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        enriched.insert(fields.category_field.clone(), Value::String(category.clone()));
        enriched.insert(fields.sheet_field.clone(), Value::String(sheet.clone()));

        render_features.push(geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
                coordinates.0,
                coordinates.1,
            ]))),
            id: Some(geojson::feature::Id::String(id.clone())),
            properties: Some(enriched.clone()),
            foreign_members: None,
        });
        features.push(IncidentFeature {
            id,
            coordinates,
            properties: enriched,
            timestamp,
            category,
            sheet,
        });
    }

    if features.is_empty() {
        return Err(DatasetError::NoValidFeatures);
    }

    log::info!(
        "Normalized {} of {} raw features ({dropped_geometry} non-point, {dropped_timestamp} without timestamp)",
        features.len(),
        raw_features.len(),
    );

    let extent = global_extent(&features);
    let categories: BTreeSet<String> = features.iter().map(|f| f.category.clone()).collect();
    let sheets: BTreeSet<String> = features.iter().map(|f| f.sheet.clone()).collect();

    let collection = geojson::FeatureCollection {
        bbox: None,
        features: render_features,
        foreign_members: None,
    };
    let document = RenderDocument::new(serde_json::to_vec(&collection)?);

    Ok(Dataset {
        features,
        extent,
        categories: categories.into_iter().collect(),
        sheets: sheets.into_iter().collect(),
        document,
    })
}

fn point_coordinates(geometry: Option<&Value>) -> Option<(f64, f64)> {
    let geometry = geometry?;
    if geometry.get("type").and_then(Value::as_str) != Some("Point") {
        return None;
    }
    let coordinates = geometry.get("coordinates").and_then(Value::as_array)?;
    if coordinates.len() < 2 {
        return None;
    }
    let lon = coordinates[0].as_f64()?;
    let lat = coordinates[1].as_f64()?;
    (lon.is_finite() && lat.is_finite()).then_some((lon, lat))
}

fn resolve_timestamp(
    props: &Map<String, Value>,
    fields: &FieldConfig,
) -> Option<DateTime<Utc>> {
    fields
        .timestamp_candidates()
        .filter_map(|field| props.get(field))
        .find_map(parse::parse_timestamp)
}

fn resolve_category(props: &Map<String, Value>, fields: &FieldConfig) -> String {
    fields
        .category_candidates()
        .filter_map(|field| props.get(field))
        .find_map(parse::non_empty_str)
        .unwrap_or(UNKNOWN_LABEL)
        .to_string()
}

fn resolve_sheet(props: &Map<String, Value>, fields: &FieldConfig) -> String {
    match props.get(&fields.sheet_field) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => UNKNOWN_LABEL.to_string(),
    }
}

fn feature_id(element: &Value, index: usize) -> String {
    match element.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("feature-{index}"),
    }
}

fn global_extent(features: &[IncidentFeature]) -> TimeExtent {
    let mut min = features[0].timestamp;
    let mut max = min;
    for feature in features {
        min = min.min(feature.timestamp);
        max = max.max(feature.timestamp);
    }
    TimeExtent::new(min, max)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw_feature(id: Option<Value>, geometry: Value, props: Value) -> Value {
        let mut feature = json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": props,
        });
        if let Some(id) = id {
            feature["id"] = id;
        }
        feature
    }

    fn point(lon: f64, lat: f64) -> Value {
        json!({ "type": "Point", "coordinates": [lon, lat] })
    }

    fn collection(features: Vec<Value>) -> Value {
        json!({ "type": "FeatureCollection", "features": features })
    }

    #[test]
    fn empty_collection_fails() {
        let err = normalize(&collection(vec![]), &FieldConfig::default()).unwrap_err();
        assert!(matches!(err, DatasetError::EmptyDataset));
    }

    #[test]
    fn all_dropped_fails() {
        let raw = collection(vec![
            raw_feature(None, json!({ "type": "LineString" }), json!({})),
            raw_feature(None, point(0.5, 0.5), json!({ "timestamp": "nat" })),
        ]);
        let err = normalize(&raw, &FieldConfig::default()).unwrap_err();
        assert!(matches!(err, DatasetError::NoValidFeatures));
    }

    #[test]
    fn non_point_geometries_dropped_silently() {
        let raw = collection(vec![
            raw_feature(
                None,
                json!({ "type": "Polygon", "coordinates": [] }),
                json!({ "timestamp": "2024-01-01T00:00:00Z" }),
            ),
            raw_feature(
                None,
                json!({ "type": "Point", "coordinates": [1.0] }),
                json!({ "timestamp": "2024-01-01T00:00:00Z" }),
            ),
            raw_feature(
                None,
                point(-87.6, 41.8),
                json!({ "timestamp": "2024-01-02T00:00:00Z" }),
            ),
        ]);
        let dataset = normalize(&raw, &FieldConfig::default()).unwrap();
        assert_eq!(dataset.features().len(), 1);
    }

    #[test]
    fn timestamp_fallback_order_respected() {
        let raw = collection(vec![raw_feature(
            None,
            point(0.0, 0.0),
            json!({
                "timestamp": "nat",
                "Reported Date & Time": "2024-02-01T08:00:00Z",
                "Occurred From Date & Time": "2023-01-01T00:00:00Z",
            }),
        )]);
        let dataset = normalize(&raw, &FieldConfig::default()).unwrap();
        assert_eq!(
            dataset.features()[0].timestamp.to_string(),
            "2024-02-01 08:00:00 UTC"
        );
    }

    #[test]
    fn category_falls_back_then_defaults_to_unknown() {
        let raw = collection(vec![
            raw_feature(
                None,
                point(0.0, 0.0),
                json!({
                    "timestamp": "2024-01-01T00:00:00Z",
                    "offense_type": "  ",
                    "Case Type": " Burglary ",
                }),
            ),
            raw_feature(
                None,
                point(1.0, 1.0),
                json!({ "timestamp": "2024-01-01T00:00:00Z" }),
            ),
        ]);
        let dataset = normalize(&raw, &FieldConfig::default()).unwrap();
        assert_eq!(dataset.features()[0].category, "Burglary");
        assert_eq!(dataset.features()[1].category, "Unknown");
        assert_eq!(dataset.categories(), ["Burglary", "Unknown"]);
    }

    #[test]
    fn ids_are_stable_and_synthesized_by_position() {
        let raw = collection(vec![
            raw_feature(
                Some(json!("abc")),
                point(0.0, 0.0),
                json!({ "timestamp": "2024-01-01T00:00:00Z" }),
            ),
            raw_feature(
                Some(json!(42)),
                point(0.0, 0.0),
                json!({ "timestamp": "2024-01-01T00:00:00Z" }),
            ),
            raw_feature(
                None,
                point(0.0, 0.0),
                json!({ "timestamp": "2024-01-01T00:00:00Z" }),
            ),
        ]);
        let dataset = normalize(&raw, &FieldConfig::default()).unwrap();
        let ids: Vec<&str> = dataset.features().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["abc", "42", "feature-2"]);
    }

    #[test]
    fn global_extent_spans_kept_features_only() {
        let raw = collection(vec![
            raw_feature(
                None,
                point(0.0, 0.0),
                json!({ "timestamp": "2024-06-01T00:00:00Z" }),
            ),
            // dropped: contributes nothing to the extent
            raw_feature(
                None,
                json!({ "type": "LineString" }),
                json!({ "timestamp": "1999-01-01T00:00:00Z" }),
            ),
            raw_feature(
                None,
                point(0.0, 0.0),
                json!({ "timestamp": "2024-01-01T00:00:00Z" }),
            ),
        ]);
        let dataset = normalize(&raw, &FieldConfig::default()).unwrap();
        assert_eq!(dataset.extent().start.to_string(), "2024-01-01 00:00:00 UTC");
        assert_eq!(dataset.extent().end.to_string(), "2024-06-01 00:00:00 UTC");
    }

    #[test]
    fn render_document_carries_resolved_fields() {
        let raw = collection(vec![raw_feature(
            None,
            point(-87.6, 41.8),
            json!({
                "Reported Date & Time": "2024-02-01T08:00:00Z",
                "Case Type": "Theft",
                "_sheet": "Sheet1",
            }),
        )]);
        let mut dataset = normalize(&raw, &FieldConfig::default()).unwrap();

        let bytes = dataset.document().as_bytes().unwrap();
        let doc: Value = serde_json::from_slice(bytes).unwrap();
        let feature = &doc["features"][0];
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["properties"]["offense_type"], "Theft");
        assert_eq!(feature["properties"]["_sheet"], "Sheet1");
        assert_eq!(
            feature["properties"]["timestamp"],
            "2024-02-01T08:00:00Z"
        );

        assert!(dataset.release_document());
        assert!(!dataset.release_document());
    }

    #[test]
    fn sheet_defaults_to_unknown() {
        let raw = collection(vec![raw_feature(
            None,
            point(0.0, 0.0),
            json!({ "timestamp": "2024-01-01T00:00:00Z" }),
        )]);
        let dataset = normalize(&raw, &FieldConfig::default()).unwrap();
        assert_eq!(dataset.features()[0].sheet, "Unknown");
        assert_eq!(dataset.sheets(), ["Unknown"]);
    }
}
