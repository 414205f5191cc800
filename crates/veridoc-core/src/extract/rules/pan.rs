//! PAN (Permanent Account Number) extraction and validation.

use super::{ExtractionMatch, FieldExtractor};
use super::patterns::{PAN_NUMBER, PAN_SHAPE};

/// PAN field extractor. Matches case-insensitively and uppercases the value.
pub struct PanExtractor;

impl PanExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PanExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PanExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        PAN_NUMBER
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let pan = caps[1].to_uppercase();
                let confidence = if &caps[1] == pan { 0.95 } else { 0.8 };
                Some(
                    ExtractionMatch::new(pan, confidence, full.as_str())
                        .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }
}

/// Extract a PAN, normalized to uppercase.
pub fn extract_pan(text: &str) -> Option<String> {
    PanExtractor::new().extract(text).map(|m| m.value)
}

/// Check the fixed shape: five letters, four digits, one letter.
///
/// Lowercase input is accepted and compared after uppercasing.
pub fn validate_pan(value: &str) -> bool {
    PAN_SHAPE.is_match(&value.trim().to_uppercase())
}
