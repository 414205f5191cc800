//! Aadhaar (national identity number) extraction and validation, plus the
//! identity-card extras printed around it.

use super::{ExtractionMatch, FieldExtractor};
use super::patterns::{AADHAAR_NUMBER, ADDRESS_LABEL, GENDER};
use crate::text::{title_case, NormalizedText};

/// Maximum number of lines read after an `Address` label.
const ADDRESS_CONTINUATION_LINES: usize = 3;

/// Aadhaar number extractor.
pub struct AadhaarExtractor;

impl AadhaarExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AadhaarExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AadhaarExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        AADHAAR_NUMBER
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let digits = format!("{}{}{}", &caps[1], &caps[2], &caps[3]);
                Some(
                    ExtractionMatch::new(digits, 0.9, full.as_str())
                        .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }
}

/// Extract the Aadhaar number, digits only.
pub fn extract_aadhaar(text: &str) -> Option<String> {
    AadhaarExtractor::new().extract(text).map(|m| m.value)
}

/// Check that a value holds exactly 12 digits once whitespace is removed.
pub fn validate_aadhaar(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() == 12 && compact.chars().all(|c| c.is_ascii_digit())
}

/// Format as `XXXX XXXX XXXX`.
pub fn format_aadhaar(value: &str) -> Option<String> {
    if !validate_aadhaar(value) {
        return None;
    }
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    Some(format!("{} {} {}", &digits[0..4], &digits[4..8], &digits[8..12]))
}

/// Gender token, title-cased (`Male`, `Female`, `Transgender`).
pub fn extract_gender(text: &str) -> Option<String> {
    GENDER.captures(text).map(|caps| title_case(&caps[1]))
}

/// Address following an `Address` label.
///
/// Takes the rest of the label line plus up to three following lines,
/// stopping at the line holding the Aadhaar number.
pub fn extract_address(text: &NormalizedText) -> Option<String> {
    let (index, caps) = text
        .lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| ADDRESS_LABEL.captures(line).map(|caps| (i, caps)))?;

    let mut parts = Vec::new();
    let rest = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    if !rest.is_empty() {
        parts.push(rest.trim_end_matches(',').to_string());
    }

    for line in text.lines.iter().skip(index + 1).take(ADDRESS_CONTINUATION_LINES) {
        if AADHAAR_NUMBER.is_match(line) {
            break;
        }
        parts.push(line.trim_end_matches(',').to_string());
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize;

    #[test]
    fn test_extract_grouped_number() {
        assert_eq!(
            extract_aadhaar("Aadhaar No: 1234 5678 9123"),
            Some("123456789123".to_string())
        );
    }

    #[test]
    fn test_extract_contiguous_number() {
        assert_eq!(extract_aadhaar("123456789012"), Some("123456789012".to_string()));
    }

    #[test]
    fn test_short_number_not_extracted() {
        assert_eq!(extract_aadhaar("1234 5678 912"), None);
    }

    #[test]
    fn test_validate_aadhaar() {
        assert!(validate_aadhaar("123456789123"));
        assert!(validate_aadhaar("1234 5678 9123"));
        assert!(!validate_aadhaar("12345678912"));
        assert!(!validate_aadhaar("12345678912a"));
        assert!(!validate_aadhaar(""));
    }

    #[test]
    fn test_format_aadhaar() {
        assert_eq!(format_aadhaar("123456789123"), Some("1234 5678 9123".to_string()));
        assert_eq!(format_aadhaar("123"), None);
    }

    #[test]
    fn test_extract_gender() {
        assert_eq!(extract_gender("DOB: 01/01/1990 FEMALE"), Some("Female".to_string()));
        assert_eq!(extract_gender("Sex: male"), Some("Male".to_string()));
        assert_eq!(extract_gender("no gender here"), None);
    }

    #[test]
    fn test_extract_address_stops_at_number() {
        let text = normalize(
            "Address: S/O Ram Kumar,\n12 MG Road\nBengaluru 560001\n1234 5678 9123\nExtra",
        );
        assert_eq!(
            extract_address(&text),
            Some("S/O Ram Kumar, 12 MG Road, Bengaluru 560001".to_string())
        );
    }

    #[test]
    fn test_extract_address_missing() {
        assert_eq!(extract_address(&normalize("JOHN DOE\n01/01/1990")), None);
    }
}
