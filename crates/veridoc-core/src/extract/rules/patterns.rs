//! Common regex patterns for identity card and marksheet extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Aadhaar number: 12 digits, optionally grouped 4-4-4 by single spaces
    pub static ref AADHAAR_NUMBER: Regex = Regex::new(
        r"\b(\d{4}) ?(\d{4}) ?(\d{4})\b"
    ).unwrap();

    // PAN: five letters, four digits, one letter
    pub static ref PAN_NUMBER: Regex = Regex::new(
        r"(?i)\b([A-Z]{5}\d{4}[A-Z])\b"
    ).unwrap();

    pub static ref PAN_SHAPE: Regex = Regex::new(
        r"^[A-Z]{5}\d{4}[A-Z]$"
    ).unwrap();

    // DD-MM-YYYY or DD/MM/YYYY
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{2})[-/](\d{2})[-/](\d{4})\b"
    ).unwrap();

    // Names
    pub static ref ALL_CAPS_LINE: Regex = Regex::new(
        r"^[A-Z\s]+$"
    ).unwrap();

    pub static ref NAME_LABEL: Regex = Regex::new(
        r"^(?i:name)\b\s*[:\-]?\s*(.*)$"
    ).unwrap();

    pub static ref FATHER_NAME_LABEL: Regex = Regex::new(
        r"^(?i:father(?:'|’)?s?\s*name)\b\s*[:\-]?\s*(.*)$"
    ).unwrap();

    pub static ref LABELED_NAME_VALUE: Regex = Regex::new(
        r"^[A-Z][A-Za-z .']{2,29}$"
    ).unwrap();

    // Identity card extras
    pub static ref GENDER: Regex = Regex::new(
        r"(?i)\b(MALE|FEMALE|TRANSGENDER)\b"
    ).unwrap();

    pub static ref ADDRESS_LABEL: Regex = Regex::new(
        r"^(?i:address)\b\s*[:\-]?\s*(.*)$"
    ).unwrap();

    // Roll / seat numbers
    pub static ref ROLL_NUMBER_LABELED: Regex = Regex::new(
        r"(?i)(?:ROLL\s*NO|SEAT\s*NO|ROLL\s*NUMBER|SEAT\s*NUMBER)\.?[\s:.\-]*(\d+)"
    ).unwrap();

    pub static ref STUDENT_ID_LABELED: Regex = Regex::new(
        r"(?i)(?:STUDENT\s*ID|ID\s*NO)\.?[\s:.\-]*(\d+)"
    ).unwrap();

    pub static ref ROLL_NUMBER_REGIONAL: Regex = Regex::new(
        r"\b([A-Z]) ?(\d{6})\b"
    ).unwrap();

    pub static ref STANDALONE_NUMBER: Regex = Regex::new(
        r"^\d{4,8}$"
    ).unwrap();

    pub static ref CENTRE_NUMBER: Regex = Regex::new(
        r"(?i)CENT(?:RE|ER)(?:\s*(?:NO|CODE|NUMBER))?\.?[\s:.\-]*(\d{4,8})"
    ).unwrap();

    // Student name following a NAME / STUDENT / CANDIDATE label
    pub static ref STUDENT_NAME_LABELED: Regex = Regex::new(
        r"(?i:\b(?:NAME(?:\s+OF\s+(?:THE\s+)?(?:CANDIDATE|STUDENT))?|STUDENT|CANDIDATE))\b[\s:.\-]*([A-Za-z][A-Za-z .]{9,49})"
    ).unwrap();

    // Label that ends a same-line student name, as in `Name: X Roll No 12`
    pub static ref NAME_TRAILING_LABEL: Regex = Regex::new(
        r"(?i)\s+(?:ROLL|SEAT|FATHER|MOTHER|GUARDIAN|D\.?O\.?B|DATE|CLASS|SCHOOL|CENTRE|CENTER|GENDER|SEX)\b"
    ).unwrap();

    // Board / institution
    pub static ref BOARD_KEYWORDS: Regex = Regex::new(
        r"(?i)\b(?:BOARD|UNIVERSITY|CBSE|ICSE|STATE|KERALA|MAHARASHTRA|UP|BIHAR|WEST BENGAL|GUJARAT|RAJASTHAN)\b"
    ).unwrap();

    pub static ref INSTITUTION_KEYWORDS: Regex = Regex::new(
        r"(?i)\b(?:VIDYALAYA|SCHOOL|COLLEGE|BOARD|UNIVERSITY|INSTITUTE|ACADEMY)\b"
    ).unwrap();

    pub static ref CBSE: Regex = Regex::new(
        r"(?i)\bCENTRAL\s+BOARD\s+OF\s+SECONDARY\s+EDUCATION\b|\bCBSE\b"
    ).unwrap();

    pub static ref CISCE: Regex = Regex::new(
        r"(?i)\bCOUNCIL\s+FOR\s+THE\s+INDIAN\s+SCHOOL\s+CERTIFICATE\b|\bCISCE\b"
    ).unwrap();

    // Year of examination
    pub static ref YEAR: Regex = Regex::new(
        r"\b((?:19|20)\d{2})\b"
    ).unwrap();

    // Class level
    pub static ref SENIOR_SECONDARY: Regex = Regex::new(
        r"(?i)\b(?:SENIOR|HIGHER)\s+SECONDARY\b"
    ).unwrap();

    pub static ref SECONDARY: Regex = Regex::new(
        r"(?i)\bSECONDARY\b"
    ).unwrap();

    pub static ref CLASS_TWELVE: Regex = Regex::new(
        r"(?i)\bCLASS\s*[:\-]?\s*(?:XII|12)(?:TH)?\b"
    ).unwrap();

    pub static ref CLASS_TEN: Regex = Regex::new(
        r"(?i)\bCLASS\s*[:\-]?\s*(?:X|10)(?:TH)?\b"
    ).unwrap();

    // Marks
    pub static ref SUBJECT_KEYWORD: Regex = Regex::new(
        r"(?i)\b(?:ENGLISH|MATHEMATICS|MATHS|PHYSICS|CHEMISTRY|COMPUTER|BIOLOGY|HINDI|SANSKRIT|SOCIAL|PRACTICAL|THEORY|SCIENCE|ECONOMICS|ACCOUNTANCY|BUSINESS|HISTORY|GEOGRAPHY|POLITICAL|MARATHI|BENGALI|TAMIL|TELUGU|KANNADA|MALAYALAM|GUJARATI|PUNJABI|URDU|ODIA|ASSAMESE)\b"
    ).unwrap();

    pub static ref MARK_TOKEN: Regex = Regex::new(
        r"\b\d{2,3}\b"
    ).unwrap();

    pub static ref CODED_ROW: Regex = Regex::new(
        r"^(?:(\d{3})\s+)?([A-Za-z][A-Za-z&.()'/ \-]*?)\s+(\d{2,3})\s+(\d{2,3})(?:\s+(\d{2,3}))?\b"
    ).unwrap();

    pub static ref AGGREGATE_MARKS: Regex = Regex::new(
        r"\b(\d{2,3})/(\d{2,3})\b"
    ).unwrap();

    // Serialized subject lines: "English: 71/100"
    pub static ref SUBJECT_LINE: Regex = Regex::new(
        r"^(.+?)\s*:\s*(\d{1,3})\s*/\s*(\d{1,3})$"
    ).unwrap();

    // Assistant-style subject lines: "MATHEMATICS: 85 + 0 = 85"
    pub static ref SUBJECT_SUM_LINE: Regex = Regex::new(
        r"^(.+?)\s*:\s*(\d{1,3})\s*\+\s*(\d{1,3})\s*=\s*(\d{1,3})$"
    ).unwrap();
}
