//! End-to-end checks: raw text -> field map -> verification -> proof code.

use pretty_assertions::assert_eq;
use veridoc_core::{
    extract, fingerprint, keys, normalize, score_tagged, DocumentClass, FieldMap, ProofCheck,
    ProofLedger, Scorer,
};

const AADHAAR_CARD: &str = "\
GOVERNMENT OF INDIA
JOHN DOE
DOB: 01/01/1990
MALE
Address: 221B Baker Street,
Sector 12, New Delhi 110001
1234 5678 9123
";

const MARKSHEET: &str = "\
CENTRAL BOARD OF SECONDARY EDUCATION
SENIOR SECONDARY SCHOOL EXAMINATION (CLASS XII) 2019
Roll No: 2134567
Centre No: 8812
Name of Candidate: PRIYA SINGHANIA
Mother's Name: SUNITA SINGHANIA
SUB CODE SUBJECT MAX MARKS MARKS OBTAINED
301 ENGLISH CORE 100 091
041 MATHEMATICS 100 088
042 PHYSICS 100 085
043 CHEMISTRY 100 088
083 COMPUTER SCIENCE 100 095
500 WORK EXPERIENCE 100 090
";

fn map(pairs: &[(&str, &str)]) -> FieldMap {
    pairs.iter().copied().collect()
}

#[test]
fn identity_card_extracts_and_verifies() {
    let fields = extract(DocumentClass::IdentityCard, AADHAAR_CARD);

    let expected = map(&[
        (keys::AADHAR_NUMBER, "123456789123"),
        (keys::NAME, "JOHN DOE"),
        (keys::DATE_OF_BIRTH, "01/01/1990"),
        (keys::GENDER, "Male"),
        (keys::ADDRESS, "221B Baker Street, Sector 12, New Delhi 110001"),
    ]);
    assert_eq!(fields, expected);

    let result = Scorer::with_current_year(2024).score(DocumentClass::IdentityCard, &fields);
    assert!(result.is_valid);
    assert_eq!(result.confidence, Some(100));
}

#[test]
fn marksheet_extracts_and_verifies() {
    let fields = extract(DocumentClass::Transcript, MARKSHEET);

    assert_eq!(fields.get(keys::ROLL_NUMBER), Some("2134567"));
    assert_eq!(fields.get(keys::STUDENT_NAME), Some("PRIYA SINGHANIA"));
    assert_eq!(
        fields.get(keys::BOARD),
        Some("Central Board of Secondary Education (CBSE)")
    );
    assert_eq!(fields.get(keys::YEAR), Some("2019"));
    assert_eq!(fields.get(keys::CLASS), Some("12th"));
    assert_eq!(
        fields.get(keys::SUBJECTS),
        Some(
            "English Core: 91/100\nMathematics: 88/100\nPhysics: 85/100\n\
             Chemistry: 88/100\nComputer Science: 95/100"
        )
    );
    assert_eq!(fields.get(keys::PERCENTAGE), Some("89.40%"));

    let result = Scorer::with_current_year(2024).score(DocumentClass::Transcript, &fields);
    assert!(result.is_valid);
    assert_eq!(result.confidence, Some(95));
}

#[test]
fn mixed_case_marksheet_keeps_student_name() {
    let raw = "\
Board of Secondary Education, Rajasthan
Secondary Examination 2021
Student Name: Priya Singhania
Roll No: 2134567
013 ENGLISH 100 071
050 MATHEMATICS 100 093
";
    let fields = extract(DocumentClass::Transcript, raw);

    assert_eq!(fields.get(keys::STUDENT_NAME), Some("Priya Singhania"));
    assert_eq!(
        fields.get(keys::BOARD),
        Some("Board of Secondary Education, Rajasthan")
    );
    assert_eq!(fields.get(keys::PERCENTAGE), Some("82.00%"));

    let result = Scorer::with_current_year(2024).score(DocumentClass::Transcript, &fields);
    assert!(result.is_valid);
    assert_eq!(result.confidence, Some(95));
}

#[test]
fn coded_rows_give_two_subject_percentage() {
    let fields = extract(
        DocumentClass::Transcript,
        "013 ENGLISH 100 071\n050 MATHEMATICS 100 093",
    );
    assert_eq!(
        fields.get(keys::SUBJECTS),
        Some("English: 71/100\nMathematics: 93/100")
    );
    assert_eq!(fields.get(keys::PERCENTAGE), Some("82.00%"));
}

#[test]
fn extraction_is_repeatable() {
    for class in DocumentClass::ALL {
        assert_eq!(extract(class, MARKSHEET), extract(class, MARKSHEET));
    }
}

#[test]
fn normalization_is_idempotent() {
    let once = normalize(MARKSHEET);
    assert_eq!(normalize(&once.raw).lines, once.lines);
}

#[test]
fn empty_text_is_not_an_error() {
    for class in DocumentClass::ALL {
        let fields = extract(class, "");
        assert!(fields.is_empty());
        let result = Scorer::new().score(class, &fields);
        assert!(!result.is_valid);
    }
}

#[test]
fn tax_card_without_pan_fails() {
    let fields = map(&[
        (keys::NAME, "RAHUL SHARMA"),
        (keys::FATHER_NAME, "SURESH SHARMA"),
        (keys::DATE_OF_BIRTH, "31/10/1992"),
    ]);
    let result = Scorer::new().score(DocumentClass::TaxCard, &fields);

    assert!(!result.is_valid);
    assert_eq!(result.details[0], "Invalid PAN number format");
    assert_eq!(result.confidence, Some(60));
}

#[test]
fn unsupported_class_has_no_confidence() {
    let result = score_tagged("unknown", &FieldMap::new());
    assert!(!result.is_valid);
    assert_eq!(result.message, "Unsupported document type");
    assert_eq!(result.confidence, None);

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("confidence").is_none());
}

#[test]
fn user_edits_change_the_proof_code() {
    let mut fields = extract(DocumentClass::IdentityCard, AADHAAR_CARD);
    let original = fingerprint(DocumentClass::IdentityCard, &fields, Some("digest"));

    fields.apply_edits([(keys::NAME, "JOHN A DOE")]);
    let edited = fingerprint(DocumentClass::IdentityCard, &fields, Some("digest"));
    assert_ne!(original, edited);

    let mut ledger = ProofLedger::default();
    let entry = ledger.generate(DocumentClass::IdentityCard, &fields, Some("digest"));
    assert_eq!(entry.code, edited);
    assert_eq!(
        ledger.verify(DocumentClass::IdentityCard, &fields, Some("digest"), &edited),
        ProofCheck::Issued(&entry)
    );
}
