//! Source field configuration for the normalizer.

/// Property field names the normalizer resolves against.
///
/// Each resolution tries the primary field first, then the fallbacks in
/// listed order. The defaults match the production export, where the primary
/// fields are written back by the normalizer itself and the fallbacks cover
/// the raw source sheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    /// Primary timestamp field; also the field the resolved timestamp is
    /// written back under in the render document.
    pub timestamp_field: String,
    /// Ordered timestamp fallback fields.
    pub timestamp_fallbacks: Vec<String>,
    /// Primary category field; also the write-back field.
    pub category_field: String,
    /// Ordered category fallback fields.
    pub category_fallbacks: Vec<String>,
    /// Source-sheet field. No fallbacks; absent means unknown.
    pub sheet_field: String,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            timestamp_field: "timestamp".to_string(),
            timestamp_fallbacks: [
                "Reported Date & Time",
                "Occurred From Date & Time",
                "Occurred Incident Date & Time",
                "Offense Start Date & Time",
                "Case Status Date & Time",
            ]
            .map(str::to_string)
            .to_vec(),
            category_field: "offense_type".to_string(),
            category_fallbacks: [
                "Case Type",
                "Occurred Incident Code",
                "Offense",
                "NIBRS Code Name",
                "Primary Offense",
            ]
            .map(str::to_string)
            .to_vec(),
            sheet_field: "_sheet".to_string(),
        }
    }
}

impl FieldConfig {
    /// All timestamp candidates, primary first.
    pub(crate) fn timestamp_candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.timestamp_field.as_str())
            .chain(self.timestamp_fallbacks.iter().map(String::as_str))
    }

    /// All category candidates, primary first.
    pub(crate) fn category_candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.category_field.as_str())
            .chain(self.category_fallbacks.iter().map(String::as_str))
    }
}
