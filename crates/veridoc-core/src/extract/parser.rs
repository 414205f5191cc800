//! Rule-based extraction for every document class.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::document::{keys, DocumentClass, FieldMap};
use crate::text::NormalizedText;

use super::rules::{
    aadhaar::{extract_address, extract_gender},
    names::{
        first_all_caps_line, labeled_father_name, labeled_name, second_distinct_all_caps_line,
    },
    transcript::header_chains,
    AadhaarExtractor, DateExtractor, FieldExtractor, MarksParser, PanExtractor, StrategyChain,
};
use super::DocumentExtractor;

/// Where the fields of an extraction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldOrigin {
    /// Regex and heuristic rules.
    RuleBased,
    /// Validated reply of the AI-assisted parser.
    Assisted,
}

/// Result of document extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Extracted fields.
    pub fields: FieldMap,
    /// One warning per vocabulary field that was not found.
    pub warnings: Vec<String>,
    /// Which extractor produced the fields.
    pub origin: FieldOrigin,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    pub(crate) fn new(
        class: DocumentClass,
        fields: FieldMap,
        origin: FieldOrigin,
        started: DateTime<Utc>,
    ) -> Self {
        let warnings = class
            .vocabulary()
            .iter()
            .filter(|key| !fields.contains(key))
            .map(|key| format!("Could not extract {}", key))
            .collect();

        let elapsed = (Utc::now() - started).num_milliseconds().max(0) as u64;

        Self {
            fields,
            warnings,
            origin,
            processing_time_ms: elapsed,
        }
    }
}

/// Rule-based extractor covering identity cards, tax cards and marksheets.
pub struct RuleBasedExtractor {
    marks: MarksParser,
}

impl RuleBasedExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self {
            marks: MarksParser::new(),
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_min_subject_rows(config.min_subject_rows)
    }

    /// Set how many subject rows a marks tier must yield.
    pub fn with_min_subject_rows(mut self, rows: usize) -> Self {
        self.marks = self.marks.with_min_rows(rows);
        self
    }

    fn identity_fields(&self, text: &NormalizedText) -> FieldMap {
        let mut fields = FieldMap::new();

        fields.insert_opt(
            keys::AADHAR_NUMBER,
            AadhaarExtractor::new().extract(&text.raw).map(|m| m.value),
        );
        fields.insert_opt(
            keys::DATE_OF_BIRTH,
            DateExtractor::new().extract(&text.raw).map(|m| m.value),
        );

        let name = StrategyChain::new(keys::NAME)
            .then("labeled", labeled_name)
            .then("all_caps_line", first_all_caps_line)
            .resolve(text);
        fields.insert_opt(keys::NAME, name.map(|m| m.value));

        fields.insert_opt(keys::GENDER, extract_gender(&text.raw));
        fields.insert_opt(keys::ADDRESS, extract_address(text));

        fields
    }

    fn tax_fields(&self, text: &NormalizedText) -> FieldMap {
        let mut fields = FieldMap::new();

        fields.insert_opt(
            keys::PAN_NUMBER,
            PanExtractor::new().extract(&text.raw).map(|m| m.value),
        );

        let name = StrategyChain::new(keys::NAME)
            .then("labeled", labeled_name)
            .then("all_caps_line", first_all_caps_line)
            .resolve(text)
            .map(|m| m.value);

        let holder = name.clone();
        let father = StrategyChain::new(keys::FATHER_NAME)
            .then("labeled", labeled_father_name)
            .then("second_all_caps_line", move |text| {
                second_distinct_all_caps_line(text, holder.as_deref())
            })
            .resolve(text);

        fields.insert_opt(keys::NAME, name);
        fields.insert_opt(keys::FATHER_NAME, father.map(|m| m.value));
        fields.insert_opt(
            keys::DATE_OF_BIRTH,
            DateExtractor::new().extract(&text.raw).map(|m| m.value),
        );

        fields
    }

    fn transcript_fields(&self, text: &NormalizedText) -> FieldMap {
        let mut fields = FieldMap::new();

        for chain in header_chains() {
            fields.insert_opt(chain.field(), chain.resolve(text).map(|m| m.value));
        }

        let table = self.marks.parse(text);
        debug!(
            subjects = table.subjects.len(),
            aggregate = ?table.aggregate,
            "marks table parsed"
        );
        table.write_fields(&mut fields);

        fields
    }
}

impl Default for RuleBasedExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor for RuleBasedExtractor {
    fn extract_fields(&self, class: DocumentClass, text: &NormalizedText) -> FieldMap {
        if text.is_blank() {
            debug!(class = %class, "blank text, nothing to extract");
            return FieldMap::new();
        }

        let fields = match class {
            DocumentClass::IdentityCard => self.identity_fields(text),
            DocumentClass::TaxCard => self.tax_fields(text),
            DocumentClass::Transcript => self.transcript_fields(text),
        };

        info!(
            class = %class,
            found = fields.len(),
            expected = class.vocabulary().len(),
            "extracted document fields"
        );

        fields
    }
}
