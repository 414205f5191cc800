//! Rule-based field extractors for identity cards, tax cards and marksheets.

pub mod aadhaar;
pub mod dates;
pub mod marks;
pub mod names;
pub mod pan;
pub mod patterns;
pub mod transcript;

pub use aadhaar::{extract_aadhaar, validate_aadhaar, AadhaarExtractor};
pub use dates::{extract_date_of_birth, DateExtractor};
pub use marks::{MarksParser, MarksTable, SubjectRecord};
pub use pan::{extract_pan, validate_pan, PanExtractor};
pub use patterns::*;

use tracing::debug;

use crate::text::NormalizedText;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// A single heuristic for one field.
pub type Strategy = Box<dyn Fn(&NormalizedText) -> Option<ExtractionMatch<String>> + Send + Sync>;

/// Ordered list of competing heuristics for one field.
///
/// Strategies run in priority order and the first match wins; later
/// strategies are not evaluated once one succeeds.
pub struct StrategyChain {
    field: &'static str,
    strategies: Vec<(&'static str, Strategy)>,
}

impl StrategyChain {
    /// Create an empty chain for `field`.
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    /// Append a lower-priority strategy.
    pub fn then<F>(mut self, name: &'static str, strategy: F) -> Self
    where
        F: Fn(&NormalizedText) -> Option<ExtractionMatch<String>> + Send + Sync + 'static,
    {
        self.strategies.push((name, Box::new(strategy)));
        self
    }

    /// Field this chain resolves.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Names of the strategies, in priority order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|(name, _)| *name).collect()
    }

    /// Run strategies in order and return the first match.
    pub fn resolve(&self, text: &NormalizedText) -> Option<ExtractionMatch<String>> {
        for (name, strategy) in &self.strategies {
            if let Some(found) = strategy(text) {
                debug!(
                    field = self.field,
                    strategy = *name,
                    value = %found.value,
                    "field resolved"
                );
                return Some(found);
            }
        }
        debug!(field = self.field, "no strategy matched");
        None
    }
}
