//! Query-string encoding and decoding of the application state.
//!
//! Wire fields: `lang`, `basemap`, `timeStart`, `timeEnd` (RFC 3339),
//! `step`, `categories`, `sheets` (pipe-joined, percent-escaped entries),
//! `extentMode`. Encoding omits every field equal to its default so shared
//! links stay short; decoding treats invalid or missing values as defaults
//! rather than failing.

use std::str::FromStr as _;

use chrono::{DateTime, SecondsFormat, Utc};
use incident_map_models::{
    AppState, DEFAULT_BASEMAP, ExtentMode, FilterState, Lang, TimeExtent, TimeStep,
};

/// Decodes an application state from a query string.
///
/// Called exactly once, at initialization. Enum fields are validated against
/// their closed sets; a window is only honored when both `timeStart` and
/// `timeEnd` parse in order, and is then clamped into `global_extent` (an
/// inverted pair reinstates the full extent); everything else falls back to
/// its default.
#[must_use]
pub fn decode(query: &str, global_extent: &TimeExtent) -> AppState {
    let pairs: Vec<(&str, &str)> = query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| pair.split_once('='))
        .collect();
    let raw = |key: &str| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v);
    let scalar = |key: &str| {
        raw(key).and_then(|v| urlencoding::decode(v).ok().map(|s| s.into_owned()))
    };

    let lang = scalar("lang")
        .and_then(|v| Lang::from_str(&v).ok())
        .unwrap_or_default();
    let basemap = scalar("basemap").unwrap_or_else(|| DEFAULT_BASEMAP.to_string());
    let time_step = scalar("step")
        .and_then(|v| TimeStep::from_str(&v).ok())
        .unwrap_or_default();
    let extent_mode = scalar("extentMode")
        .and_then(|v| ExtentMode::from_str(&v).ok())
        .unwrap_or_default();

    let start = scalar("timeStart").and_then(|v| parse_instant(&v));
    let end = scalar("timeEnd").and_then(|v| parse_instant(&v));
    let time_extent = match (start, end) {
        (Some(start), Some(end)) if start <= end => {
            TimeExtent::new(start, end).clamp_to(global_extent)
        }
        // an inverted pair reinstates the full extent, like a disjoint one
        (Some(_), Some(_)) => *global_extent,
        _ => TimeExtent::default_window(global_extent),
    };

    AppState {
        lang,
        basemap,
        time_extent,
        time_step,
        filters: FilterState {
            categories: raw("categories").map(decode_list).unwrap_or_default(),
            sheets: raw("sheets").map(decode_list).unwrap_or_default(),
            extent_mode,
        },
    }
}

/// Encodes an application state into a query string, omitting fields equal
/// to their defaults. Returns an empty string for the all-defaults state.
#[must_use]
pub fn encode(state: &AppState, global_extent: &TimeExtent) -> String {
    let mut parts: Vec<String> = Vec::new();

    if state.lang != Lang::default() {
        parts.push(format!("lang={}", state.lang));
    }
    if state.time_extent != TimeExtent::default_window(global_extent) {
        parts.push(format!(
            "timeStart={}",
            urlencoding::encode(&format_instant(state.time_extent.start))
        ));
        parts.push(format!(
            "timeEnd={}",
            urlencoding::encode(&format_instant(state.time_extent.end))
        ));
    }
    if state.basemap != DEFAULT_BASEMAP {
        parts.push(format!("basemap={}", urlencoding::encode(&state.basemap)));
    }
    if state.time_step != TimeStep::default() {
        parts.push(format!("step={}", state.time_step));
    }
    if let Some(joined) = encode_list(&state.filters.categories) {
        parts.push(format!("categories={joined}"));
    }
    if let Some(joined) = encode_list(&state.filters.sheets) {
        parts.push(format!("sheets={joined}"));
    }
    if state.filters.extent_mode != ExtentMode::default() {
        parts.push(format!("extentMode={}", state.filters.extent_mode));
    }

    parts.join("&")
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn decode_list(raw: &str) -> Vec<String> {
    raw.split('|')
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| urlencoding::decode(entry).ok())
        .map(|entry| entry.into_owned())
        .collect()
}

fn encode_list(entries: &[String]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    Some(
        entries
            .iter()
            .map(|entry| urlencoding::encode(entry).into_owned())
            .collect::<Vec<_>>()
            .join("|"),
    )
}

/// One-directional state-to-address-bar synchronization.
///
/// Keeps the last query string it handed out; [`QuerySync::sync`] returns a
/// new string only when the encoded state differs, so the caller never
/// performs redundant history operations and a self-authored write can never
/// feed back into a decode.
#[derive(Debug, Clone)]
pub struct QuerySync {
    last_written: String,
}

impl QuerySync {
    /// Creates a sync whose memo starts at the empty query, so an
    /// all-defaults state triggers no initial write.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_written: String::new(),
        }
    }

    /// Encodes `state` and returns the query string when it differs from the
    /// last one returned. `None` means the address bar is already current.
    pub fn sync(&mut self, state: &AppState, global_extent: &TimeExtent) -> Option<String> {
        let encoded = encode(state, global_extent);
        if self.last_written == encoded {
            return None;
        }
        log::debug!("query sync: \"{encoded}\"");
        self.last_written.clone_from(&encoded);
        Some(encoded)
    }

    /// The last query string handed out, or the initial empty memo.
    #[must_use]
    pub fn last_written(&self) -> &str {
        &self.last_written
    }
}

impl Default for QuerySync {
    fn default() -> Self {
        Self::new()
    }
}
