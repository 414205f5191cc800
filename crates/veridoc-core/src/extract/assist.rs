//! Contract with the optional AI-assisted field parser.
//!
//! The collaborator itself lives outside the library. This module builds
//! its prompt, validates its untyped JSON reply against the vocabulary of
//! the document class, and falls back to rule-based extraction when the
//! reply is unusable.

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::AssistError;
use crate::models::document::{keys, DocumentClass, FieldMap};
use crate::text::normalize;

use super::rules::marks::recompute_percentage;
use super::{DocumentExtractor, ExtractionResult, FieldOrigin};

lazy_static! {
    static ref JSON_OBJECT: Regex = Regex::new(r"\{[\s\S]*\}").unwrap();
}

/// Build the instruction prompt sent with the document text.
pub fn build_prompt(class: DocumentClass, text: &str) -> String {
    let schema = class
        .vocabulary()
        .iter()
        .map(|key| format!("  \"{}\": \"{}\"", key, field_hint(key)))
        .collect::<Vec<_>>()
        .join(",\n");

    let rules = match class {
        DocumentClass::IdentityCard => {
            "The Aadhaar number has 12 digits, often printed in groups of four."
        }
        DocumentClass::TaxCard => concat!(
            "The PAN is 5 letters, 4 digits and 1 letter (ABCDE1234F). ",
            "Do not report the father's name as the cardholder's name. ",
            "Write the date of birth as DD/MM/YYYY."
        ),
        DocumentClass::Transcript => concat!(
            "Use the roll or seat number, never the school or centre code. ",
            "Do not report the mother's, father's or school name as the student name. ",
            "SENIOR SECONDARY or CLASS XII means 12th; SECONDARY or CLASS X means 10th. ",
            "Use the total-marks column per subject and skip Work Experience, ",
            "Physical Education, General Studies and Art Education. ",
            "Write subjects one per line as \"Subject: obtained/maximum\" and the ",
            "percentage as obtained / maximum * 100 with two decimals."
        ),
    };

    format!(
        "You parse Indian {title} documents from OCR text that may contain recognition errors.\n\n\
         TEXT:\n{text}\n\n\
         Reply with a single JSON object using exactly these keys and leave out any key you cannot find:\n\
         {{\n{schema}\n}}\n\n\
         {rules}\n\
         Reply with the JSON object only.",
        title = class.title(),
        text = text,
        schema = schema,
        rules = rules,
    )
}

fn field_hint(key: &str) -> &'static str {
    match key {
        keys::AADHAR_NUMBER => "12-digit Aadhaar number",
        keys::NAME => "cardholder's full name",
        keys::DATE_OF_BIRTH => "date of birth",
        keys::GENDER => "Male, Female or Transgender",
        keys::ADDRESS => "address if printed",
        keys::PAN_NUMBER => "10-character PAN",
        keys::FATHER_NAME => "father's name if printed",
        keys::ROLL_NUMBER => "roll or seat number",
        keys::STUDENT_NAME => "student's full name",
        keys::BOARD => "board, university or school",
        keys::YEAR => "4-digit examination year",
        keys::CLASS => "10th or 12th",
        keys::SUBJECTS => "one subject per line",
        keys::PERCENTAGE => "overall percentage",
        _ => "",
    }
}

/// Pull the outermost JSON object out of free-form reply text.
pub fn parse_assistant_reply(reply: &str) -> Result<Map<String, Value>, AssistError> {
    let json = JSON_OBJECT.find(reply).ok_or(AssistError::NoJson)?;
    match serde_json::from_str(json.as_str()) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(AssistError::Malformed("expected a JSON object".to_string())),
        Err(e) => Err(AssistError::Malformed(e.to_string())),
    }
}

/// Keep only vocabulary keys with scalar, non-blank values.
///
/// Numbers become strings; `null`, booleans, arrays and objects are
/// dropped. A reply carrying an `error` key is rejected.
pub fn sanitize_fields(
    class: DocumentClass,
    reply: &Map<String, Value>,
) -> Result<FieldMap, AssistError> {
    if let Some(error) = reply.get("error") {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(AssistError::Reported(message));
    }

    let mut fields = FieldMap::new();
    for (key, value) in reply {
        if !class.accepts(key) {
            debug!(key = %key, "dropping key outside the vocabulary");
            continue;
        }
        let value = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => continue,
        };
        if !value.is_empty() {
            fields.insert(key.clone(), value);
        }
    }

    if fields.is_empty() {
        return Err(AssistError::Empty);
    }
    Ok(fields)
}

/// Decode and validate a full reply.
pub fn assisted_fields(class: DocumentClass, reply: &str) -> Result<FieldMap, AssistError> {
    let object = parse_assistant_reply(reply)?;
    let mut fields = sanitize_fields(class, &object)?;
    if class == DocumentClass::Transcript && !fields.contains(keys::PERCENTAGE) {
        recompute_percentage(&mut fields);
    }
    Ok(fields)
}

/// Use the collaborator's reply when it is usable, otherwise extract with
/// `fallback`. A missing reply means the collaborator failed or was not
/// called.
pub fn resolve_fields<E: DocumentExtractor + ?Sized>(
    fallback: &E,
    class: DocumentClass,
    raw: &str,
    reply: Option<&str>,
) -> ExtractionResult {
    let started = Utc::now();

    match reply.map(|reply| assisted_fields(class, reply)) {
        Some(Ok(fields)) => {
            debug!(class = %class, fields = fields.len(), "using assisted fields");
            ExtractionResult::new(class, fields, FieldOrigin::Assisted, started)
        }
        Some(Err(e)) => {
            warn!(class = %class, error = %e, "assisted parse unusable, using rules");
            let fields = fallback.extract_fields(class, &normalize(raw));
            ExtractionResult::new(class, fields, FieldOrigin::RuleBased, started)
        }
        None => fallback.extract(class, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::RuleBasedExtractor;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_prompt_lists_vocabulary() {
        let prompt = build_prompt(DocumentClass::Transcript, "ROLL NO 123");
        for key in DocumentClass::Transcript.vocabulary() {
            assert!(prompt.contains(&format!("\"{}\"", key)), "missing {}", key);
        }
        assert!(prompt.contains("ROLL NO 123"));
    }

    #[test]
    fn test_reply_with_surrounding_prose() {
        let reply = "Sure! Here it is:\n```json\n{\"panNumber\": \"ABCDE1234F\"}\n```";
        let object = parse_assistant_reply(reply).unwrap();
        assert_eq!(object["panNumber"], "ABCDE1234F");
    }

    #[test]
    fn test_reply_without_json() {
        assert!(matches!(parse_assistant_reply("no idea"), Err(AssistError::NoJson)));
        assert!(matches!(
            parse_assistant_reply("{not json}"),
            Err(AssistError::Malformed(_))
        ));
    }

    #[test]
    fn test_sanitize_drops_unknown_and_blank() {
        let reply = object(json!({
            "rollNumber": 1234567,
            "studentName": "  PRIYA SINGH ",
            "board": "",
            "year": null,
            "subjects": ["English"],
            "favouriteColour": "blue"
        }));
        let fields = sanitize_fields(DocumentClass::Transcript, &reply).unwrap();

        assert_eq!(fields.get(keys::ROLL_NUMBER), Some("1234567"));
        assert_eq!(fields.get(keys::STUDENT_NAME), Some("PRIYA SINGH"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_sanitize_rejects_error_payload() {
        let reply = object(json!({"error": "Both AI services unavailable"}));
        assert!(matches!(
            sanitize_fields(DocumentClass::TaxCard, &reply),
            Err(AssistError::Reported(msg)) if msg == "Both AI services unavailable"
        ));
    }

    #[test]
    fn test_assisted_transcript_gets_percentage() {
        let reply = r#"{"studentName": "PRIYA SINGH", "subjects": "English: 90/100\nHindi: 80/100"}"#;
        let fields = assisted_fields(DocumentClass::Transcript, reply).unwrap();
        assert_eq!(fields.get(keys::PERCENTAGE), Some("85.00%"));
    }

    #[test]
    fn test_resolve_prefers_reply() {
        let result = resolve_fields(
            &RuleBasedExtractor::new(),
            DocumentClass::TaxCard,
            "XYZAB9876C",
            Some(r#"{"panNumber": "ABCDE1234F", "name": "RAHUL SHARMA"}"#),
        );
        assert_eq!(result.origin, FieldOrigin::Assisted);
        assert_eq!(result.fields.get(keys::PAN_NUMBER), Some("ABCDE1234F"));
    }

    #[test]
    fn test_resolve_falls_back_to_rules() {
        let extractor = RuleBasedExtractor::new();
        for reply in [Some("garbage"), Some(r#"{"error": "quota"}"#), Some("{}"), None] {
            let result = resolve_fields(&extractor, DocumentClass::TaxCard, "XYZAB9876C", reply);
            assert_eq!(result.origin, FieldOrigin::RuleBased);
            assert_eq!(result.fields.get(keys::PAN_NUMBER), Some("XYZAB9876C"));
        }
    }
}
