//! Dataset loading entry points.
//!
//! The fetch is the only asynchronous boundary in the core: it is awaited
//! once at startup, is never retried automatically, and a failure leaves the
//! session in a terminal no-dataset state.

use std::path::Path;

use serde_json::Value;

use crate::{Dataset, DatasetError, FieldConfig, normalize};

/// Fetches a GeoJSON document over HTTP and normalizes it.
///
/// # Errors
///
/// Returns [`DatasetError::Http`] for a non-success status,
/// [`DatasetError::Fetch`] for transport failures, and the normalization
/// errors from [`normalize`].
pub async fn load_dataset(url: &str, fields: &FieldConfig) -> Result<Dataset, DatasetError> {
    log::info!("Fetching dataset from {url}");
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DatasetError::Http {
            status: status.as_u16(),
        });
    }
    let raw: Value = response.json().await?;
    normalize(&raw, fields)
}

/// Reads a GeoJSON document from a local file and normalizes it.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] when the file cannot be read,
/// [`DatasetError::Json`] when it is not valid JSON, and the normalization
/// errors from [`normalize`].
pub fn read_dataset(path: &Path, fields: &FieldConfig) -> Result<Dataset, DatasetError> {
    log::info!("Reading dataset from {}", path.display());
    let text = std::fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&text)?;
    normalize(&raw, fields)
}
