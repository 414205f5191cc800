//! Field extraction module.

pub mod assist;
mod parser;
pub mod rules;

pub use assist::{build_prompt, parse_assistant_reply, resolve_fields, sanitize_fields};
pub use parser::{ExtractionResult, FieldOrigin, RuleBasedExtractor};
pub use rules::marks::recompute_percentage;

use chrono::Utc;

use crate::models::document::{DocumentClass, FieldMap};
use crate::text::{normalize, NormalizedText};

/// Trait for document field extractors.
///
/// Extraction is total: a field that cannot be found is left out of the
/// map, and blank text yields an empty map.
pub trait DocumentExtractor {
    /// Extract fields from normalized text.
    fn extract_fields(&self, class: DocumentClass, text: &NormalizedText) -> FieldMap;

    /// Normalize raw text, extract it and report what is missing.
    fn extract(&self, class: DocumentClass, raw: &str) -> ExtractionResult {
        let started = Utc::now();
        let fields = self.extract_fields(class, &normalize(raw));
        ExtractionResult::new(class, fields, FieldOrigin::RuleBased, started)
    }
}

/// Extract fields with the default rule-based extractor.
pub fn extract(class: DocumentClass, raw: &str) -> FieldMap {
    RuleBasedExtractor::new().extract_fields(class, &normalize(raw))
}
