//! Rule-based verification scoring.
//!
//! Each document class has a fixed, ordered list of checks. Hard checks
//! decide validity; soft checks only lower the confidence. Every check is
//! evaluated, so the details always describe the whole field map.

use chrono::{Datelike, Local};
use tracing::debug;

use crate::extract::rules::{validate_aadhaar, validate_pan};
use crate::models::document::{keys, DocumentClass, FieldMap};
use crate::models::verification::VerificationResult;

/// Earliest passing year accepted on a marksheet.
pub const EARLIEST_PASSING_YEAR: i32 = 1990;

const MAX_CONFIDENCE: u32 = 100;

/// Verification scorer.
#[derive(Debug, Clone)]
pub struct Scorer {
    current_year: i32,
}

impl Scorer {
    /// Scorer that accepts passing years up to the current local year.
    pub fn new() -> Self {
        Self {
            current_year: Local::now().year(),
        }
    }

    /// Scorer with a fixed notion of the current year.
    pub fn with_current_year(current_year: i32) -> Self {
        Self { current_year }
    }

    /// Score a field map for a document class.
    pub fn score(&self, class: DocumentClass, fields: &FieldMap) -> VerificationResult {
        let mut tally = Tally::default();

        match class {
            DocumentClass::IdentityCard => self.identity_checks(&mut tally, fields),
            DocumentClass::TaxCard => self.tax_checks(&mut tally, fields),
            DocumentClass::Transcript => self.transcript_checks(&mut tally, fields),
        }

        debug!(
            class = %class,
            valid = tally.valid,
            confidence = tally.confidence,
            "document scored"
        );
        tally.finish()
    }

    /// Score using a class tag; unknown tags yield an unsupported result.
    pub fn score_tagged(&self, tag: &str, fields: &FieldMap) -> VerificationResult {
        match DocumentClass::from_tag(tag) {
            Some(class) => self.score(class, fields),
            None => {
                debug!(tag, "unsupported document type");
                VerificationResult::unsupported()
            }
        }
    }

    fn identity_checks(&self, tally: &mut Tally, fields: &FieldMap) {
        tally.hard(
            fields.get_present(keys::AADHAR_NUMBER).is_some_and(validate_aadhaar),
            25,
            "Aadhar number format is valid",
            "Invalid Aadhar number format",
        );
        tally.hard(
            has_min_len(fields, keys::NAME, 2),
            25,
            "Name field verified",
            "Name is required",
        );
        tally.hard(
            fields.get_present(keys::DATE_OF_BIRTH).is_some(),
            25,
            "Date of birth format verified",
            "Date of birth is required",
        );
        tally.soft(
            has_min_len(fields, keys::ADDRESS, 10),
            (25, 10),
            "Address format verified",
            "Address should be more detailed",
        );
    }

    fn tax_checks(&self, tally: &mut Tally, fields: &FieldMap) {
        tally.hard(
            fields.get_present(keys::PAN_NUMBER).is_some_and(validate_pan),
            30,
            "PAN number format is valid",
            "Invalid PAN number format",
        );
        tally.hard(
            has_min_len(fields, keys::NAME, 2),
            25,
            "Name field verified",
            "Name is required",
        );
        tally.soft(
            fields.get_present(keys::FATHER_NAME).is_some(),
            (20, 10),
            "Father's name verified",
            "Father's name not provided",
        );
        tally.soft(
            fields.get_present(keys::DATE_OF_BIRTH).is_some(),
            (15, 10),
            "Date of birth verified",
            "Date of birth not provided",
        );
    }

    fn transcript_checks(&self, tally: &mut Tally, fields: &FieldMap) {
        tally.hard(
            fields.get_present(keys::ROLL_NUMBER).is_some(),
            20,
            "Roll number verified",
            "Roll number is required",
        );
        tally.hard(
            has_min_len(fields, keys::STUDENT_NAME, 2),
            20,
            "Student name verified",
            "Student name is required",
        );
        tally.hard(
            fields.get_present(keys::BOARD).is_some(),
            20,
            "Board information verified",
            "Board/University is required",
        );
        tally.hard(
            self.passing_year_ok(fields.get_present(keys::YEAR)),
            20,
            "Passing year verified",
            "Invalid passing year",
        );
        tally.soft(
            fields.get_present(keys::PERCENTAGE).is_some()
                || fields.get_present(keys::SUBJECTS).is_some(),
            (15, 5),
            "Marks information verified",
            "Percentage/CGPA not provided",
        );
    }

    fn passing_year_ok(&self, year: Option<&str>) -> bool {
        year.and_then(|y| y.parse::<i32>().ok())
            .is_some_and(|y| (EARLIEST_PASSING_YEAR..=self.current_year).contains(&y))
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Score with a scorer bound to the current year.
pub fn score(class: DocumentClass, fields: &FieldMap) -> VerificationResult {
    Scorer::new().score(class, fields)
}

/// Score using a class tag.
pub fn score_tagged(tag: &str, fields: &FieldMap) -> VerificationResult {
    Scorer::new().score_tagged(tag, fields)
}

fn has_min_len(fields: &FieldMap, key: &str, min: usize) -> bool {
    fields
        .get_present(key)
        .is_some_and(|value| value.chars().count() >= min)
}

#[derive(Debug)]
struct Tally {
    valid: bool,
    confidence: u32,
    details: Vec<String>,
}

impl Default for Tally {
    fn default() -> Self {
        Self {
            valid: true,
            confidence: 0,
            details: Vec::new(),
        }
    }
}

impl Tally {
    /// A failed hard check invalidates the document and earns nothing.
    fn hard(&mut self, passed: bool, points: u32, ok: &str, failed: &str) {
        if passed {
            self.confidence += points;
            self.details.push(ok.to_string());
        } else {
            self.valid = false;
            self.details.push(failed.to_string());
        }
    }

    /// A failed soft check earns partial credit.
    fn soft(&mut self, passed: bool, (full, partial): (u32, u32), ok: &str, warning: &str) {
        if passed {
            self.confidence += full;
            self.details.push(ok.to_string());
        } else {
            self.confidence += partial;
            self.details.push(warning.to_string());
        }
    }

    fn finish(self) -> VerificationResult {
        let confidence = self.confidence.min(MAX_CONFIDENCE) as u8;
        let message = if self.valid {
            format!("Document verification successful ({}% confidence)", confidence)
        } else {
            "Document verification failed - please check the details".to_string()
        };

        VerificationResult {
            is_valid: self.valid,
            message,
            details: self.details,
            confidence: Some(confidence),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FieldMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_identity_full_pass() {
        let result = Scorer::with_current_year(2024).score(
            DocumentClass::IdentityCard,
            &fields(&[
                ("aadharNumber", "123456789012"),
                ("name", "JOHN DOE"),
                ("dateOfBirth", "01/01/1990"),
                ("address", "123 Long Street Name City"),
            ]),
        );
        assert!(result.is_valid);
        assert_eq!(result.confidence, Some(100));
        assert_eq!(result.message, "Document verification successful (100% confidence)");
        assert_eq!(result.details.len(), 4);
    }

    #[test]
    fn test_identity_short_address_is_soft() {
        let result = score(
            DocumentClass::IdentityCard,
            &fields(&[
                ("aadharNumber", "1234 5678 9012"),
                ("name", "JOHN DOE"),
                ("dateOfBirth", "01/01/1990"),
                ("address", "Delhi"),
            ]),
        );
        assert!(result.is_valid);
        assert_eq!(result.confidence, Some(85));
        assert_eq!(result.details[3], "Address should be more detailed");
    }

    #[test]
    fn test_identity_eleven_digits_fail() {
        let result = score(
            DocumentClass::IdentityCard,
            &fields(&[("aadharNumber", "12345678901")]),
        );
        assert!(!result.is_valid);
        assert_eq!(result.details[0], "Invalid Aadhar number format");
    }

    #[test]
    fn test_tax_card_missing_pan() {
        let result = score(
            DocumentClass::TaxCard,
            &fields(&[("name", "RAHUL SHARMA"), ("fatherName", "SURESH SHARMA")]),
        );
        assert!(!result.is_valid);
        assert!(result.details.contains(&"Invalid PAN number format".to_string()));
        // name 25 + father 20 + missing dob 10
        assert_eq!(result.confidence, Some(55));
        assert_eq!(
            result.message,
            "Document verification failed - please check the details"
        );
    }

    #[test]
    fn test_tax_card_lowercase_pan_passes() {
        let result = score(
            DocumentClass::TaxCard,
            &fields(&[
                ("panNumber", "abcde1234f"),
                ("name", "RAHUL SHARMA"),
                ("fatherName", "SURESH SHARMA"),
                ("dateOfBirth", "31/10/1992"),
            ]),
        );
        assert!(result.is_valid);
        assert_eq!(result.confidence, Some(90));
    }

    #[test]
    fn test_transcript_year_window() {
        let base = [
            ("rollNumber", "2134567"),
            ("studentName", "PRIYA SINGH"),
            ("board", "CBSE"),
            ("percentage", "82.00%"),
        ];
        let scorer = Scorer::with_current_year(2024);

        let mut ok = fields(&base);
        ok.insert("year", "2024");
        let result = scorer.score(DocumentClass::Transcript, &ok);
        assert!(result.is_valid);
        assert_eq!(result.confidence, Some(95));

        for year in ["1989", "2025", "20XX"] {
            let mut bad = fields(&base);
            bad.insert("year", year);
            let result = scorer.score(DocumentClass::Transcript, &bad);
            assert!(!result.is_valid, "year {} accepted", year);
            assert!(result.details.contains(&"Invalid passing year".to_string()));
        }
    }

    #[test]
    fn test_transcript_without_marks_is_soft() {
        let result = Scorer::with_current_year(2024).score(
            DocumentClass::Transcript,
            &fields(&[
                ("rollNumber", "2134567"),
                ("studentName", "PRIYA SINGH"),
                ("board", "CBSE"),
                ("year", "2019"),
            ]),
        );
        assert!(result.is_valid);
        assert_eq!(result.confidence, Some(85));
    }

    #[test]
    fn test_empty_maps_never_panic() {
        for class in DocumentClass::ALL {
            let result = score(class, &FieldMap::new());
            assert!(!result.is_valid);
            assert!(result.confidence.is_some());
        }
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let result = score(DocumentClass::TaxCard, &fields(&[("name", "   ")]));
        assert!(result.details.contains(&"Name is required".to_string()));
    }

    #[test]
    fn test_unknown_tag() {
        let result = score_tagged("unknown", &FieldMap::new());
        assert!(!result.is_valid);
        assert_eq!(result.message, "Unsupported document type");
        assert_eq!(result.confidence, None);
    }
}
