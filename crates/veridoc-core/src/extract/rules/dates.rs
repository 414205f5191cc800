//! Date of birth extraction.

use super::{ExtractionMatch, FieldExtractor};
use super::patterns::DATE_DMY;

/// Extracts `DD-MM-YYYY` / `DD/MM/YYYY` dates as written in the document.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_DMY
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), 0.8, m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Extract the date of birth.
///
/// The first date in the text wins. Issue dates or a parent's date of birth
/// printed before the holder's are not told apart.
pub fn extract_date_of_birth(text: &str) -> Option<String> {
    DateExtractor::new().extract(text).map(|m| m.value)
}
