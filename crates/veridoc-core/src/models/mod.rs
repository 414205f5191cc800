//! Data models shared by extraction, scoring and proof codes.

pub mod config;
pub mod document;
pub mod verification;

pub use config::VeridocConfig;
pub use document::{DocumentClass, FieldMap};
pub use verification::{ProofCodeEntry, VerificationResult};
