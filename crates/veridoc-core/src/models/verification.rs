//! Verification outcomes and proof-code records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::DocumentClass;

/// Outcome of scoring one field map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// Conjunction of all hard checks.
    pub is_valid: bool,

    /// Summary message.
    pub message: String,

    /// One finding per check, in check order.
    #[serde(default)]
    pub details: Vec<String>,

    /// Accumulated confidence (0 - 100). Absent for unsupported documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
}

impl VerificationResult {
    /// Result for a document class the scorer does not know.
    pub fn unsupported() -> Self {
        Self {
            is_valid: false,
            message: "Unsupported document type".to_string(),
            details: vec!["Document type not recognized".to_string()],
            confidence: None,
        }
    }
}

/// A generated proof code, kept for later equality checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofCodeEntry {
    /// Content fingerprint.
    pub code: String,

    /// Class of the fingerprinted document.
    pub doc_type: DocumentClass,

    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl ProofCodeEntry {
    /// Create an entry stamped with the current time.
    pub fn new(code: impl Into<String>, doc_type: DocumentClass) -> Self {
        Self {
            code: code.into(),
            doc_type,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_has_no_confidence() {
        let result = VerificationResult::unsupported();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isValid"], false);
        assert!(json.get("confidence").is_none());
    }
}
