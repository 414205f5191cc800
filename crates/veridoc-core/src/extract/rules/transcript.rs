//! Marksheet header fields: roll number, student name, board, year and class.
//!
//! Each field is resolved by a [`StrategyChain`]; the first strategy that
//! matches wins.

use super::patterns::{
    ALL_CAPS_LINE, BOARD_KEYWORDS, CBSE, CENTRE_NUMBER, CISCE, CLASS_TEN, CLASS_TWELVE,
    INSTITUTION_KEYWORDS, NAME_TRAILING_LABEL, ROLL_NUMBER_LABELED, ROLL_NUMBER_REGIONAL, SECONDARY, SENIOR_SECONDARY,
    STANDALONE_NUMBER, STUDENT_ID_LABELED, STUDENT_NAME_LABELED, SUBJECT_KEYWORD, YEAR,
};
use super::{ExtractionMatch, StrategyChain};
use crate::models::document::keys;
use crate::text::NormalizedText;

/// Lines searched for a board name before falling back to institutions.
const BOARD_HEADER_LINES: usize = 5;

/// Words that disqualify a label match from being the student's name.
const NON_STUDENT_LABELS: &[&str] = &["MOTHER", "FATHER", "GUARDIAN", "SCHOOL", "CENTRE", "CENTER"];

/// Words that disqualify an all-caps line from being the student's name.
const NON_NAME_WORDS: &[&str] = &[
    "BOARD",
    "UNIVERSITY",
    "SCHOOL",
    "COLLEGE",
    "VIDYALAYA",
    "INSTITUTE",
    "EXAMINATION",
    "CERTIFICATE",
    "MARKS",
    "STATEMENT",
    "RESULT",
    "SECONDARY",
    "EDUCATION",
    "TOTAL",
    "GRADE",
];

/// State boards recognized from a `BOARD` line naming the state.
const STATE_BOARDS: &[(&str, &str)] = &[
    ("UTTAR PRADESH", "Board of High School and Intermediate Education, Uttar Pradesh"),
    ("BIHAR", "Bihar School Examination Board"),
    ("MAHARASHTRA", "Maharashtra State Board of Secondary and Higher Secondary Education"),
    ("KERALA", "Kerala Board of Public Examinations"),
    ("WEST BENGAL", "West Bengal Board of Secondary Education"),
    ("GUJARAT", "Gujarat Secondary and Higher Secondary Education Board"),
    ("RAJASTHAN", "Board of Secondary Education, Rajasthan"),
];

const CBSE_NAME: &str = "Central Board of Secondary Education (CBSE)";
const CISCE_NAME: &str = "Council for the Indian School Certificate Examinations (CISCE)";

pub const UPPER_LEVEL: &str = "12th";
pub const LOWER_LEVEL: &str = "10th";

/// Roll/seat number: labeled, then regional shape, then a bare number line
/// that is not a centre number.
pub fn roll_number_chain() -> StrategyChain {
    StrategyChain::new(keys::ROLL_NUMBER)
        .then("labeled", |text| {
            [&*ROLL_NUMBER_LABELED, &*STUDENT_ID_LABELED]
                .iter()
                .find_map(|pattern| pattern.captures(&text.raw))
                .map(|caps| ExtractionMatch::new(caps[1].to_string(), 0.95, &caps[0]))
        })
        .then("regional", |text| {
            ROLL_NUMBER_REGIONAL.captures(&text.raw).map(|caps| {
                ExtractionMatch::new(format!("{}{}", &caps[1], &caps[2]), 0.75, &caps[0])
            })
        })
        .then("standalone", |text| {
            let centres: Vec<&str> = CENTRE_NUMBER
                .captures_iter(&text.raw)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
                .collect();
            text.lines
                .iter()
                .find(|line| STANDALONE_NUMBER.is_match(line) && !centres.contains(&line.as_str()))
                .map(|line| ExtractionMatch::new(line.clone(), 0.5, line.as_str()))
        })
}

/// Student name: labeled text, then an all-caps line that is not a header
/// or a subject, preferring the first half of the document.
pub fn student_name_chain() -> StrategyChain {
    StrategyChain::new(keys::STUDENT_NAME)
        .then("labeled", labeled_student_name)
        .then("all_caps_line", |text| {
            let candidate = |line: &&String| is_name_line(line);
            text.first_half()
                .iter()
                .find(candidate)
                .or_else(|| text.lines.iter().find(candidate))
                .map(|line| ExtractionMatch::new(line.clone(), 0.6, line.as_str()))
        })
}

/// Board: a canonical regional board, then a header line with board
/// keywords, then any line naming an institution.
pub fn board_chain() -> StrategyChain {
    StrategyChain::new(keys::BOARD)
        .then("regional", regional_board)
        .then("header", |text| {
            text.lines
                .iter()
                .take(BOARD_HEADER_LINES)
                .find(|line| BOARD_KEYWORDS.is_match(line))
                .map(|line| ExtractionMatch::new(line.clone(), 0.8, line.as_str()))
        })
        .then("institution", |text| {
            text.lines
                .iter()
                .find(|line| INSTITUTION_KEYWORDS.is_match(line))
                .map(|line| ExtractionMatch::new(line.clone(), 0.6, line.as_str()))
        })
}

/// Year: first 19xx/20xx token.
pub fn year_chain() -> StrategyChain {
    StrategyChain::new(keys::YEAR).then("first_year", |text| {
        YEAR.captures(&text.raw)
            .map(|caps| ExtractionMatch::new(caps[1].to_string(), 0.7, &caps[0]))
    })
}

/// Class level from the examination title or an explicit class marker.
pub fn class_chain() -> StrategyChain {
    StrategyChain::new(keys::CLASS)
        .then("upper_level", |text| {
            SENIOR_SECONDARY
                .find(&text.raw)
                .or_else(|| CLASS_TWELVE.find(&text.raw))
                .map(|m| ExtractionMatch::new(UPPER_LEVEL.to_string(), 0.9, m.as_str()))
        })
        .then("lower_level", |text| {
            SECONDARY
                .find(&text.raw)
                .or_else(|| CLASS_TEN.find(&text.raw))
                .map(|m| ExtractionMatch::new(LOWER_LEVEL.to_string(), 0.9, m.as_str()))
        })
}

/// All header chains, in field order.
pub fn header_chains() -> Vec<StrategyChain> {
    vec![
        roll_number_chain(),
        student_name_chain(),
        board_chain(),
        year_chain(),
        class_chain(),
    ]
}

fn labeled_student_name(text: &NormalizedText) -> Option<ExtractionMatch<String>> {
    for line in &text.lines {
        for caps in STUDENT_NAME_LABELED.captures_iter(line) {
            let (Some(full), Some(value)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            let prefix = line[..full.start()].to_uppercase();
            if NON_STUDENT_LABELS.iter().any(|label| prefix.contains(label)) {
                continue;
            }

            let name = drop_cut_word(line, value.end(), value.as_str());
            // "Name" is swallowed when it follows a "Student" label
            let name = match name.get(..5) {
                Some(head) if head.eq_ignore_ascii_case("NAME ") => &name[5..],
                _ => name,
            };
            let name = match NAME_TRAILING_LABEL.find(name) {
                Some(label) => &name[..label.start()],
                None => name,
            };
            let name = name.trim();

            // "Name of the School", "Name of Candidate" with no value
            let of_phrase = name
                .split_whitespace()
                .next()
                .is_some_and(|word| word.eq_ignore_ascii_case("OF"));

            if name.len() >= 10 && !of_phrase && !is_header_text(name) {
                return Some(ExtractionMatch::new(name.to_string(), 0.9, full.as_str()));
            }
        }
    }
    None
}

/// Drop a trailing word the length limit cut in half.
fn drop_cut_word<'a>(line: &str, match_end: usize, name: &'a str) -> &'a str {
    let cut = line[match_end..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic());
    if !cut {
        return name;
    }
    match name.rsplit_once(' ') {
        Some((head, _)) => head.trim_end(),
        None => name,
    }
}

fn is_name_line(line: &str) -> bool {
    let len = line.chars().count();
    (8..=50).contains(&len) && ALL_CAPS_LINE.is_match(line) && !is_header_text(line)
}

/// Institution, document-title or subject wording.
fn is_header_text(text: &str) -> bool {
    let upper = text.to_uppercase();
    NON_NAME_WORDS.iter().any(|word| upper.contains(word)) || SUBJECT_KEYWORD.is_match(text)
}

fn regional_board(text: &NormalizedText) -> Option<ExtractionMatch<String>> {
    if let Some(m) = CBSE.find(&text.raw) {
        return Some(ExtractionMatch::new(CBSE_NAME.to_string(), 0.95, m.as_str()));
    }
    if let Some(m) = CISCE.find(&text.raw) {
        return Some(ExtractionMatch::new(CISCE_NAME.to_string(), 0.95, m.as_str()));
    }

    text.lines.iter().find_map(|line| {
        let upper = line.to_uppercase();
        if !upper.contains("BOARD") {
            return None;
        }
        STATE_BOARDS
            .iter()
            .find(|(state, _)| upper.contains(state))
            .map(|(_, board)| ExtractionMatch::new(board.to_string(), 0.9, line.as_str()))
    })
}
