//! Subject/marks table recovery from OCR text of a marksheet.
//!
//! Rows are recovered in tiers: labeled rows (a known subject keyword plus
//! marks), coded rows (`[code] subject total obtained`), and as a last resort
//! a positional enumeration of every plausible mark in the text.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::patterns::{
    AGGREGATE_MARKS, CODED_ROW, MARK_TOKEN, SUBJECT_KEYWORD, SUBJECT_LINE, SUBJECT_SUM_LINE,
};
use crate::models::document::{keys, FieldMap};
use crate::text::{title_case, NormalizedText};

/// Rows a tier must produce before later tiers are skipped.
pub const DEFAULT_MIN_SUBJECT_ROWS: usize = 4;

const THEORY_MAXIMUM: u32 = 100;
const PRACTICAL_MAXIMUM: u32 = 50;

/// Smallest column maximum accepted from OCR rows.
const MIN_COLUMN_MAXIMUM: u32 = 20;

/// Subjects that do not count towards the percentage.
const NON_ACADEMIC: &[&str] = &[
    "WORK EXPERIENCE",
    "PHYSICAL EDUCATION",
    "PHY & HEALTH EDUCA",
    "HEALTH EDUCATION",
    "GENERAL STUDIES",
    "ART EDUCATION",
];

/// Subjects paired with bare marks when no table structure is found.
const COMMON_SUBJECTS: &[&str] = &[
    "English",
    "Mathematics",
    "Physics",
    "Chemistry",
    "Computer",
    "Biology",
];

/// One row of a marks table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub subject_name: String,
    pub marks_obtained: u32,
    pub marks_maximum: u32,
}

impl SubjectRecord {
    /// Create a record, rejecting `obtained > maximum` and a zero maximum.
    pub fn new(name: impl Into<String>, obtained: u32, maximum: u32) -> Option<Self> {
        if maximum == 0 || obtained > maximum {
            return None;
        }
        Some(Self {
            subject_name: name.into(),
            marks_obtained: obtained,
            marks_maximum: maximum,
        })
    }

    /// Create a record from OCR marks. Obtained marks are capped at 100, or
    /// 50 on practical lines.
    fn from_ocr(name: String, obtained: u32, maximum: u32, practical: bool) -> Option<Self> {
        let limit = if practical { PRACTICAL_MAXIMUM } else { THEORY_MAXIMUM };
        if name.is_empty()
            || obtained > limit
            || maximum > THEORY_MAXIMUM
            || maximum < MIN_COLUMN_MAXIMUM
        {
            return None;
        }
        Self::new(name, obtained, maximum)
    }
}

/// Subjects recovered from one marksheet, plus an aggregate pair if printed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarksTable {
    pub subjects: Vec<SubjectRecord>,

    /// Printed `obtained/maximum` total such as `410/500`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<(u32, u32)>,
}

impl MarksTable {
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn total_obtained(&self) -> u32 {
        self.subjects.iter().map(|s| s.marks_obtained).sum()
    }

    pub fn total_maximum(&self) -> u32 {
        self.subjects.iter().map(|s| s.marks_maximum).sum()
    }

    /// Percentage rounded to two decimal places.
    ///
    /// A printed aggregate pair takes precedence over the per-subject sum.
    /// Without subjects there is no percentage.
    pub fn percentage(&self) -> Option<Decimal> {
        if self.is_empty() {
            return None;
        }
        let (obtained, maximum) = self
            .aggregate
            .unwrap_or((self.total_obtained(), self.total_maximum()));
        if maximum == 0 {
            return None;
        }
        let ratio = Decimal::from(obtained) * Decimal::ONE_HUNDRED / Decimal::from(maximum);
        Some(ratio.round_dp(2))
    }

    /// Percentage as stored in a field map, e.g. `82.00%`.
    pub fn percentage_text(&self) -> Option<String> {
        self.percentage().map(|p| format!("{:.2}%", p))
    }

    /// One `Subject: obtained/maximum` line per subject.
    pub fn serialize_subjects(&self) -> String {
        self.subjects
            .iter()
            .map(|s| format!("{}: {}/{}", s.subject_name, s.marks_obtained, s.marks_maximum))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Re-read a serialized subjects block, e.g. after the user edited it.
    ///
    /// Accepts `Subject: 71/100` and `Subject: 60 + 25 = 85` lines; anything
    /// else is skipped.
    pub fn parse_subjects(block: &str) -> Self {
        let subjects = block
            .lines()
            .map(str::trim)
            .filter_map(|line| {
                if let Some(caps) = SUBJECT_SUM_LINE.captures(line) {
                    let total = caps[4].parse().ok()?;
                    return SubjectRecord::new(caps[1].trim(), total, THEORY_MAXIMUM);
                }
                let caps = SUBJECT_LINE.captures(line)?;
                SubjectRecord::new(caps[1].trim(), caps[2].parse().ok()?, caps[3].parse().ok()?)
            })
            .collect();

        Self {
            subjects,
            aggregate: None,
        }
    }

    /// Store `subjects` and `percentage`; an empty table stores nothing.
    pub fn write_fields(&self, fields: &mut FieldMap) {
        if self.is_empty() {
            return;
        }
        fields.insert(keys::SUBJECTS, self.serialize_subjects());
        fields.insert_opt(keys::PERCENTAGE, self.percentage_text());
    }
}

/// Refresh `percentage` from the `subjects` block of a field map.
///
/// Returns the new value, or `None` (leaving the map untouched) when the
/// block holds no readable subject line.
pub fn recompute_percentage(fields: &mut FieldMap) -> Option<String> {
    let table = MarksTable::parse_subjects(fields.get_present(keys::SUBJECTS)?);
    let percentage = table.percentage_text()?;
    fields.insert(keys::PERCENTAGE, percentage.clone());
    Some(percentage)
}

/// Tiered marks-table parser.
#[derive(Debug, Clone)]
pub struct MarksParser {
    min_rows: usize,
    enumerate_fallback: bool,
}

impl MarksParser {
    pub fn new() -> Self {
        Self {
            min_rows: DEFAULT_MIN_SUBJECT_ROWS,
            enumerate_fallback: true,
        }
    }

    /// Set how many rows a tier must yield to stop the search.
    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    /// Disable the positional enumeration fallback.
    pub fn without_fallback(mut self) -> Self {
        self.enumerate_fallback = false;
        self
    }

    /// Recover the marks table. Never fails; an empty table means nothing
    /// usable was found.
    pub fn parse(&self, text: &NormalizedText) -> MarksTable {
        let mut subjects = self.structured_rows(text);

        if subjects.is_empty() && self.enumerate_fallback {
            subjects = enumerate_marks(text);
            debug!(rows = subjects.len(), tier = "enumeration", "marks tier finished");
        }

        let aggregate = if subjects.is_empty() {
            None
        } else {
            aggregate_pair(&text.raw)
        };

        MarksTable { subjects, aggregate }
    }

    fn structured_rows(&self, text: &NormalizedText) -> Vec<SubjectRecord> {
        let labeled: Vec<_> = text.lines.iter().filter_map(|l| labeled_row(l)).collect();
        debug!(rows = labeled.len(), tier = "labeled", "marks tier finished");
        if labeled.len() >= self.min_rows {
            return labeled;
        }

        let coded: Vec<_> = text.lines.iter().filter_map(|l| coded_row(l)).collect();
        debug!(rows = coded.len(), tier = "coded", "marks tier finished");

        if coded.len() >= labeled.len() { coded } else { labeled }
    }
}

impl Default for MarksParser {
    fn default() -> Self {
        Self::new()
    }
}

fn is_practical(line: &str) -> bool {
    line.to_uppercase().contains("PRACT")
}

fn is_non_academic(line: &str) -> bool {
    let upper = line.to_uppercase();
    NON_ACADEMIC.iter().any(|subject| upper.contains(subject))
}

/// A line holding a known subject keyword and at least two marks.
///
/// With three or more numbers the third is obtained and the second is the
/// maximum; with two, the second is obtained against a default maximum.
fn labeled_row(line: &str) -> Option<SubjectRecord> {
    if is_non_academic(line) {
        return None;
    }
    let keyword = SUBJECT_KEYWORD.find(line)?;
    let numbers: Vec<u32> = MARK_TOKEN
        .find_iter(line)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    let practical = is_practical(line);
    let (obtained, maximum) = match numbers.as_slice() {
        [_, maximum, obtained, ..] => (*obtained, *maximum),
        [_, obtained] => (*obtained, THEORY_MAXIMUM),
        _ => return None,
    };

    let name = subject_name_around(line, keyword.start(), keyword.end());
    SubjectRecord::from_ocr(name, obtained, maximum, practical)
}

/// `[code] subject total obtained`, or `[code] subject theory practical total`
/// when the first two marks add up to the third.
fn coded_row(line: &str) -> Option<SubjectRecord> {
    if is_non_academic(line) {
        return None;
    }
    let caps = CODED_ROW.captures(line)?;
    let name = title_case(caps[2].trim_matches(|c: char| c == ' ' || c == '-'));
    let first: u32 = caps[3].parse().ok()?;
    let second: u32 = caps[4].parse().ok()?;
    let third: Option<u32> = caps.get(5).and_then(|m| m.as_str().parse().ok());

    match third {
        Some(total) if first + second == total => {
            SubjectRecord::from_ocr(name, total, THEORY_MAXIMUM, false)
        }
        _ => SubjectRecord::from_ocr(name, second, first, is_practical(line)),
    }
}

/// Zip every mark-sized number in the text against common subject names.
fn enumerate_marks(text: &NormalizedText) -> Vec<SubjectRecord> {
    MARK_TOKEN
        .find_iter(&text.raw)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .filter(|mark| *mark <= THEORY_MAXIMUM)
        .zip(COMMON_SUBJECTS)
        .filter_map(|(mark, name)| SubjectRecord::new(*name, mark, THEORY_MAXIMUM))
        .collect()
}

/// First `obtained/maximum` pair that is not part of a date and whose
/// maximum exceeds a single paper.
fn aggregate_pair(raw: &str) -> Option<(u32, u32)> {
    AGGREGATE_MARKS.captures_iter(raw).find_map(|caps| {
        let full = caps.get(0)?;
        let before = raw[..full.start()].chars().next_back();
        let after = raw[full.end()..].chars().next();
        if before == Some('/') || after == Some('/') {
            return None;
        }
        let obtained: u32 = caps[1].parse().ok()?;
        let maximum: u32 = caps[2].parse().ok()?;
        (maximum > THEORY_MAXIMUM && obtained <= maximum).then_some((obtained, maximum))
    })
}

/// Widen a keyword match to the full subject name around it.
fn subject_name_around(line: &str, start: usize, end: usize) -> String {
    let is_name_char =
        |c: char| c.is_ascii_alphabetic() || matches!(c, ' ' | '&' | '.' | '(' | ')' | '\'' | '-');

    let head = line[..start]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_name_char(*c))
        .last()
        .map_or(start, |(i, _)| i);
    let tail = line[end..]
        .char_indices()
        .find(|(_, c)| !is_name_char(*c))
        .map_or(line.len(), |(i, _)| end + i);

    title_case(line[head..tail].trim_matches(|c: char| c == ' ' || c == '-'))
}
