//! Document classes and the field map produced by extraction.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Field names used across document classes.
pub mod keys {
    pub const AADHAR_NUMBER: &str = "aadharNumber";
    pub const NAME: &str = "name";
    pub const DATE_OF_BIRTH: &str = "dateOfBirth";
    pub const GENDER: &str = "gender";
    pub const ADDRESS: &str = "address";

    pub const PAN_NUMBER: &str = "panNumber";
    pub const FATHER_NAME: &str = "fatherName";

    pub const ROLL_NUMBER: &str = "rollNumber";
    pub const STUDENT_NAME: &str = "studentName";
    pub const BOARD: &str = "board";
    pub const YEAR: &str = "year";
    pub const CLASS: &str = "class";
    pub const SUBJECTS: &str = "subjects";
    pub const PERCENTAGE: &str = "percentage";
}

/// Kind of document being verified.
///
/// Chosen by the caller for the whole session; never inferred from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentClass {
    /// National identity card (Aadhaar).
    #[serde(rename = "aadhar")]
    IdentityCard,
    /// Tax identity card (PAN).
    #[serde(rename = "pan")]
    TaxCard,
    /// Academic transcript (marksheet).
    #[serde(rename = "marksheet")]
    Transcript,
}

impl DocumentClass {
    /// All supported classes.
    pub const ALL: [DocumentClass; 3] = [
        DocumentClass::IdentityCard,
        DocumentClass::TaxCard,
        DocumentClass::Transcript,
    ];

    /// Wire tag for this class.
    pub fn tag(&self) -> &'static str {
        match self {
            DocumentClass::IdentityCard => "aadhar",
            DocumentClass::TaxCard => "pan",
            DocumentClass::Transcript => "marksheet",
        }
    }

    /// Parse a class tag, accepting a few aliases.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "aadhar" | "aadhaar" | "identity" | "identity_card" | "id" => {
                Some(DocumentClass::IdentityCard)
            }
            "pan" | "tax" | "tax_card" => Some(DocumentClass::TaxCard),
            "marksheet" | "transcript" | "marks" => Some(DocumentClass::Transcript),
            _ => None,
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            DocumentClass::IdentityCard => "Aadhar Card",
            DocumentClass::TaxCard => "PAN Card",
            DocumentClass::Transcript => "Marksheet",
        }
    }

    /// Field names that belong to this class, in display order.
    pub fn vocabulary(&self) -> &'static [&'static str] {
        match self {
            DocumentClass::IdentityCard => &[
                keys::AADHAR_NUMBER,
                keys::NAME,
                keys::DATE_OF_BIRTH,
                keys::GENDER,
                keys::ADDRESS,
            ],
            DocumentClass::TaxCard => &[
                keys::PAN_NUMBER,
                keys::NAME,
                keys::FATHER_NAME,
                keys::DATE_OF_BIRTH,
            ],
            DocumentClass::Transcript => &[
                keys::ROLL_NUMBER,
                keys::STUDENT_NAME,
                keys::BOARD,
                keys::YEAR,
                keys::CLASS,
                keys::SUBJECTS,
                keys::PERCENTAGE,
            ],
        }
    }

    /// Whether `key` is part of this class's vocabulary.
    pub fn accepts(&self, key: &str) -> bool {
        self.vocabulary().contains(&key)
    }
}

impl fmt::Display for DocumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DocumentClass {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| ConfigError::UnknownDocumentType(s.to_string()))
    }
}

/// Extracted or user-edited fields of one document.
///
/// A missing key means the field was not found. Keys are kept sorted, so
/// iteration order does not depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    /// Create an empty field map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Get a field value, treating blank values as absent.
    pub fn get_present(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Set a field only when a value was found.
    pub fn insert_opt(&mut self, key: &str, value: Option<String>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Remove a field.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Whether the field is set.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Apply user edits on top of this map. Edited values are authoritative;
    /// a blank edit clears the field.
    pub fn apply_edits<I, K, V>(&mut self, edits: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in edits {
            let key = key.into();
            let value = value.into();
            if value.trim().is_empty() {
                self.0.remove(&key);
            } else {
                self.0.insert(key, value);
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_tags() {
        assert_eq!(DocumentClass::from_tag("aadhar"), Some(DocumentClass::IdentityCard));
        assert_eq!(DocumentClass::from_tag("PAN"), Some(DocumentClass::TaxCard));
        assert_eq!(DocumentClass::from_tag("transcript"), Some(DocumentClass::Transcript));
        assert_eq!(DocumentClass::from_tag("unknown"), None);
        assert!("passport".parse::<DocumentClass>().is_err());
    }

    #[test]
    fn test_class_serde_uses_tags() {
        let json = serde_json::to_string(&DocumentClass::Transcript).unwrap();
        assert_eq!(json, "\"marksheet\"");
    }

    #[test]
    fn test_field_map_blank_edit_clears() {
        let mut fields = FieldMap::new();
        fields.insert("name", "JOHN DOE");
        fields.apply_edits([("name", "  "), ("gender", "Male")]);
        assert!(!fields.contains("name"));
        assert_eq!(fields.get("gender"), Some("Male"));
    }

    #[test]
    fn test_get_present_ignores_blank() {
        let fields: FieldMap = [("board", "   ")].into_iter().collect();
        assert_eq!(fields.get_present("board"), None);
    }
}
