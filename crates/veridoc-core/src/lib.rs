//! Core library for identity and academic document verification.
//!
//! This crate provides:
//! - Text normalization of OCR or manually entered text
//! - Field extraction for Aadhaar cards, PAN cards and marksheets
//! - Marks-table recovery and percentage computation
//! - Rule-based verification scoring
//! - Deterministic proof codes and a bounded proof-code ledger
//! - Validation of AI-assisted parser replies
//! - PDF text extraction (`pdf` feature)

pub mod error;
pub mod extract;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod proof;
pub mod text;
pub mod verify;

pub use error::{AssistError, ConfigError, Result, VeridocError};
pub use extract::{
    extract, recompute_percentage, resolve_fields, DocumentExtractor, ExtractionResult,
    FieldOrigin, RuleBasedExtractor,
};
pub use models::config::VeridocConfig;
pub use models::document::{keys, DocumentClass, FieldMap};
pub use models::verification::{ProofCodeEntry, VerificationResult};
#[cfg(feature = "pdf")]
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, PdfType};
pub use proof::{file_digest, fingerprint, ProofCheck, ProofLedger};
pub use text::{normalize, NormalizedText};
pub use verify::{score, score_tagged, Scorer};
