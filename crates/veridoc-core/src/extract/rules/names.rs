//! Person-name heuristics shared by identity and tax cards.

use regex::Regex;

use super::ExtractionMatch;
use super::patterns::{ALL_CAPS_LINE, FATHER_NAME_LABEL, LABELED_NAME_VALUE, NAME_LABEL};
use crate::text::NormalizedText;

/// Card furniture that is printed in capitals but is never a person's name.
const CARD_HEADERS: &[&str] = &[
    "GOVERNMENT OF INDIA",
    "GOVT OF INDIA",
    "INCOME TAX DEPARTMENT",
    "PERMANENT ACCOUNT NUMBER",
    "PERMANENT ACCOUNT NUMBER CARD",
    "UNIQUE IDENTIFICATION AUTHORITY OF INDIA",
    "AADHAAR",
    "AADHAR",
    "MALE",
    "FEMALE",
    "TRANSGENDER",
    "SIGNATURE",
];

/// Lines made only of capital letters and spaces, in document order.
pub fn all_caps_lines(text: &NormalizedText) -> Vec<&str> {
    text.lines
        .iter()
        .map(String::as_str)
        .filter(|line| ALL_CAPS_LINE.is_match(line))
        .filter(|line| line.trim().len() >= 2)
        .filter(|line| !CARD_HEADERS.contains(&line.trim()))
        .collect()
}

/// Value attached to a label: the rest of the label line, or the next line
/// when the label stands alone.
pub fn labeled_value<'a>(text: &'a NormalizedText, label: &Regex) -> Option<&'a str> {
    for (i, line) in text.lines.iter().enumerate() {
        let Some(caps) = label.captures(line) else {
            continue;
        };
        let rest = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        if !rest.is_empty() {
            return Some(rest);
        }
        if let Some(next) = text.lines.get(i + 1) {
            return Some(next.as_str());
        }
    }
    None
}

/// Capitalized text after a "Name" label, 3 to 30 characters.
pub fn labeled_name(text: &NormalizedText) -> Option<ExtractionMatch<String>> {
    labeled_value(text, &NAME_LABEL)
        .filter(|value| LABELED_NAME_VALUE.is_match(value))
        .map(|value| ExtractionMatch::new(value.to_string(), 0.95, value))
}

/// First all-caps line.
pub fn first_all_caps_line(text: &NormalizedText) -> Option<ExtractionMatch<String>> {
    all_caps_lines(text)
        .first()
        .map(|line| ExtractionMatch::new(line.trim().to_string(), 0.6, *line))
}

/// Capitalized text after a "Father's Name" label.
pub fn labeled_father_name(text: &NormalizedText) -> Option<ExtractionMatch<String>> {
    labeled_value(text, &FATHER_NAME_LABEL)
        .filter(|value| LABELED_NAME_VALUE.is_match(value))
        .map(|value| ExtractionMatch::new(value.to_string(), 0.95, value))
}

/// First all-caps line that differs from the first one and from `holder`.
pub fn second_distinct_all_caps_line(
    text: &NormalizedText,
    holder: Option<&str>,
) -> Option<ExtractionMatch<String>> {
    let lines = all_caps_lines(text);
    let first = lines.first()?.trim();

    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| *line != first)
        .find(|line| Some(*line) != holder)
        .map(|line| ExtractionMatch::new(line.to_string(), 0.5, line))
}
