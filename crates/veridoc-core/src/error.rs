//! Error types for the veridoc-core library.
//!
//! Extraction and scoring are total and never produce these errors; they
//! surface only from I/O, configuration, PDF decoding and collaborator
//! replies.

use thiserror::Error;

/// Main error type for the veridoc library.
#[derive(Error, Debug)]
pub enum VeridocError {
    /// PDF processing error.
    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// AI-assisted parser reply could not be used.
    #[error("assistant error: {0}")]
    Assist(#[from] AssistError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to PDF processing.
#[cfg(feature = "pdf")]
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to loading or editing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("cannot access {path}: {source}")]
    Access {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the expected layout.
    #[error("invalid configuration in {path}: {reason}")]
    Invalid { path: String, reason: String },

    /// Unknown document class tag.
    #[error("unknown document type: {0}")]
    UnknownDocumentType(String),
}

/// Errors related to replies from the AI-assisted field parser.
#[derive(Error, Debug)]
pub enum AssistError {
    /// The reply contained no JSON object.
    #[error("reply contains no JSON object")]
    NoJson,

    /// The reply JSON could not be decoded.
    #[error("reply JSON is malformed: {0}")]
    Malformed(String),

    /// The collaborator answered with an error payload.
    #[error("collaborator reported an error: {0}")]
    Reported(String),

    /// The reply held no usable field for the document class.
    #[error("reply holds no usable fields")]
    Empty,
}

/// Result type for the veridoc library.
pub type Result<T> = std::result::Result<T, VeridocError>;
