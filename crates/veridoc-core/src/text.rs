//! Raw text normalization shared by all extractors.

use serde::{Deserialize, Serialize};

/// Raw extracted text together with its trimmed, non-blank lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedText {
    /// Text as supplied by OCR or manual entry.
    pub raw: String,

    /// Trimmed non-blank lines, in document order.
    pub lines: Vec<String>,
}

impl NormalizedText {
    /// Whether the text contained nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in the first half of the document.
    pub fn first_half(&self) -> &[String] {
        &self.lines[..self.lines.len().div_ceil(2)]
    }
}

/// Split raw text into trimmed, non-empty lines.
pub fn normalize(raw: &str) -> NormalizedText {
    let lines = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    NormalizedText {
        raw: raw.to_string(),
        lines,
    }
}

/// Capitalize the first letter of every word and lowercase the rest.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_blank_lines() {
        let text = normalize("  GOVERNMENT OF INDIA \n\n\t\nJOHN DOE\r\n 1234 5678 9123 ");
        assert_eq!(
            text.lines,
            vec!["GOVERNMENT OF INDIA", "JOHN DOE", "1234 5678 9123"]
        );
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize("").is_blank());
        assert!(normalize(" \n \n").is_blank());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = "a\n\n  b  \nc";
        let once = normalize(raw);
        let twice = normalize(&once.raw);
        assert_eq!(once.lines, twice.lines);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("COMPUTER  SCIENCE"), "Computer Science");
        assert_eq!(title_case("female"), "Female");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_first_half_rounds_up() {
        let text = normalize("a\nb\nc");
        assert_eq!(text.first_half(), &["a".to_string(), "b".to_string()]);
    }
}
