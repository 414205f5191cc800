//! Configuration structures for the verification pipeline.
//!
//! The core never reads configuration on its own; callers load a
//! [`VeridocConfig`] and pass the resolved values down.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default bound of the proof-code ledger.
pub const DEFAULT_MAX_PROOF_ENTRIES: usize = 20;

/// Main configuration for veridoc.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VeridocConfig {
    /// Service credentials.
    pub credentials: CredentialsConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Proof-code ledger configuration.
    pub proofs: ProofConfig,
}

/// Credentials for the external collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Key for the text-extraction / AI field parsing service.
    pub text_extraction_key: String,

    /// Key for the document verification service.
    pub verification_key: String,

    /// OpenAI key, used for AI-assisted parsing when the Gemini call fails.
    pub backup_key: String,

    /// Per-class verification endpoints, keyed by class tag.
    pub endpoints: BTreeMap<String, EndpointConfig>,
}

/// A verification endpoint for one document class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Endpoint URL.
    pub url: String,

    /// Endpoint key.
    pub key: String,
}

impl CredentialsConfig {
    /// Text-extraction key, if one is configured.
    pub fn text_extraction_key(&self) -> Option<&str> {
        Some(self.text_extraction_key.trim()).filter(|k| !k.is_empty())
    }

    /// Fallback parser key, if one is configured.
    pub fn backup_key(&self) -> Option<&str> {
        Some(self.backup_key.trim()).filter(|k| !k.is_empty())
    }

    /// Endpoint configured for a class tag, if any.
    pub fn endpoint(&self, tag: &str) -> Option<&EndpointConfig> {
        self.endpoints.get(tag).filter(|e| !e.url.trim().is_empty())
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// A marks-table tier yielding fewer rows than this hands over to the
    /// next tier.
    pub min_subject_rows: usize,

    /// Ask the AI-assisted field parser before the rule-based extractor.
    pub use_ai_parser: bool,

    /// Model used for AI-assisted parsing and image text extraction.
    pub ai_model: String,

    /// Sampling temperature for the AI collaborator.
    pub ai_temperature: f32,

    /// Output token limit for the AI collaborator.
    pub ai_max_output_tokens: u32,

    /// OpenAI model used when Gemini parsing fails.
    pub fallback_model: String,

    /// Output token limit for the fallback model.
    pub fallback_max_tokens: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_subject_rows: crate::extract::rules::marks::DEFAULT_MIN_SUBJECT_ROWS,
            use_ai_parser: true,
            ai_model: "gemini-1.5-flash".to_string(),
            ai_temperature: 0.1,
            ai_max_output_tokens: 2048,
            fallback_model: "gpt-4o-mini".to_string(),
            fallback_max_tokens: 1000,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider a PDF as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 50 }
    }
}

/// Proof-code ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofConfig {
    /// Maximum number of remembered proof codes.
    pub max_entries: usize,
}

impl Default for ProofConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_PROOF_ENTRIES,
        }
    }
}

impl VeridocConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Access {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load from `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|source| ConfigError::Access {
            path: path.display().to_string(),
            source,
        })
    }

    /// Default location of the configuration file.
    pub fn default_path(config_dir: Option<PathBuf>) -> PathBuf {
        config_dir
            .unwrap_or_else(|| PathBuf::from("."))
            .join("veridoc")
            .join("config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: VeridocConfig =
            serde_json::from_str(r#"{"extraction": {"use_ai_parser": false}}"#).unwrap();
        assert!(!config.extraction.use_ai_parser);
        assert_eq!(config.extraction.min_subject_rows, 4);
        assert_eq!(config.proofs.max_entries, 20);
    }

    #[test]
    fn test_blank_key_is_absent() {
        let mut credentials = CredentialsConfig::default();
        assert_eq!(credentials.text_extraction_key(), None);
        credentials.text_extraction_key = "AIza-test".to_string();
        assert_eq!(credentials.text_extraction_key(), Some("AIza-test"));

        credentials.backup_key = "  ".to_string();
        assert_eq!(credentials.backup_key(), None);
        credentials.backup_key = " sk-test ".to_string();
        assert_eq!(credentials.backup_key(), Some("sk-test"));
    }

    #[test]
    fn test_endpoint_requires_url() {
        let mut credentials = CredentialsConfig::default();
        credentials
            .endpoints
            .insert("pan".to_string(), EndpointConfig::default());
        assert!(credentials.endpoint("pan").is_none());
    }
}
