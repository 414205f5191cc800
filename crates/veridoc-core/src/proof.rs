//! Proof codes: deterministic fingerprints of a verified field map.

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Result;
use crate::models::config::DEFAULT_MAX_PROOF_ENTRIES;
use crate::models::document::{DocumentClass, FieldMap};
use crate::models::verification::ProofCodeEntry;

/// SHA-256 of raw file bytes, hex encoded.
pub fn file_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Fingerprint a field map.
///
/// Values are trimmed and blank fields dropped, then the map is serialized
/// as JSON with sorted keys and hashed together with the class tag and the
/// optional file digest. The SHA-256 digest is encoded as unpadded
/// URL-safe base64.
pub fn fingerprint(class: DocumentClass, fields: &FieldMap, file_digest: Option<&str>) -> String {
    let normalized: Map<String, Value> = fields
        .iter()
        .filter_map(|(key, value)| {
            let value = value.trim();
            (!value.is_empty()).then(|| (key.to_string(), Value::String(value.to_string())))
        })
        .collect();

    let payload = format!(
        "{}|{}|{}",
        class.tag(),
        Value::Object(normalized),
        file_digest.unwrap_or_default()
    );

    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Outcome of checking a proof code against a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofCheck<'a> {
    /// The code matches and was issued from this ledger.
    Issued(&'a ProofCodeEntry),
    /// The code matches the document but is not in the ledger.
    Unrecorded,
    Mismatch,
}

impl ProofCheck<'_> {
    pub fn matches(&self) -> bool {
        !matches!(self, ProofCheck::Mismatch)
    }
}

/// Bounded list of generated proof codes, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofLedger {
    #[serde(skip, default = "default_max_entries")]
    max_entries: usize,

    #[serde(default)]
    entries: Vec<ProofCodeEntry>,
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_PROOF_ENTRIES
}

impl ProofLedger {
    /// Create an empty ledger holding at most `max_entries` codes.
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            entries: Vec::new(),
        }
    }

    /// Load a ledger from a JSON file; a missing file is an empty ledger.
    pub fn load(path: &Path, max_entries: usize) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new(max_entries));
        }
        let content = fs::read_to_string(path)?;
        let mut ledger: Self = serde_json::from_str(&content)?;
        ledger.set_max_entries(max_entries);
        Ok(ledger)
    }

    /// Save the ledger as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Change the bound, dropping the oldest entries if needed.
    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries;
        self.entries.truncate(max_entries);
    }

    /// Fingerprint a field map and record the code.
    pub fn generate(
        &mut self,
        class: DocumentClass,
        fields: &FieldMap,
        file_digest: Option<&str>,
    ) -> ProofCodeEntry {
        let entry = ProofCodeEntry::new(fingerprint(class, fields, file_digest), class);
        self.record(entry.clone());
        entry
    }

    /// Add an entry at the front, replacing any entry with the same code.
    pub fn record(&mut self, entry: ProofCodeEntry) {
        self.entries.retain(|e| e.code != entry.code);
        self.entries.insert(0, entry);
        self.entries.truncate(self.max_entries);
        debug!(entries = self.entries.len(), "proof code recorded");
    }

    /// Remove a code. Returns whether it was present.
    pub fn remove(&mut self, code: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.code != code);
        self.entries.len() != before
    }

    /// Look up a code.
    pub fn find(&self, code: &str) -> Option<&ProofCodeEntry> {
        self.entries.iter().find(|e| e.code == code)
    }

    /// Check `code` against the given document and this ledger.
    pub fn verify(
        &self,
        class: DocumentClass,
        fields: &FieldMap,
        file_digest: Option<&str>,
        code: &str,
    ) -> ProofCheck<'_> {
        let code = code.trim();
        if fingerprint(class, fields, file_digest) != code {
            return ProofCheck::Mismatch;
        }
        match self.find(code) {
            Some(entry) if entry.doc_type == class => ProofCheck::Issued(entry),
            _ => ProofCheck::Unrecorded,
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn entries(&self) -> &[ProofCodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ProofLedger {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PROOF_ENTRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FieldMap {
        [("panNumber", "ABCDE1234F"), ("name", "RAHUL SHARMA")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let mut reordered = FieldMap::new();
        reordered.insert("name", "RAHUL SHARMA");
        reordered.insert("panNumber", "ABCDE1234F");

        assert_eq!(
            fingerprint(DocumentClass::TaxCard, &sample(), Some("abc")),
            fingerprint(DocumentClass::TaxCard, &reordered, Some("abc"))
        );
    }

    #[test]
    fn test_fingerprint_is_url_safe_sha256() {
        let code = fingerprint(DocumentClass::TaxCard, &sample(), None);
        assert_eq!(code.len(), 43);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_fingerprint_depends_on_inputs() {
        let base = fingerprint(DocumentClass::TaxCard, &sample(), None);
        assert_ne!(base, fingerprint(DocumentClass::IdentityCard, &sample(), None));
        assert_ne!(base, fingerprint(DocumentClass::TaxCard, &sample(), Some("abc")));

        let mut padded = sample();
        padded.insert("name", "  RAHUL SHARMA ");
        padded.insert("fatherName", "");
        assert_eq!(base, fingerprint(DocumentClass::TaxCard, &padded, None));
    }

    #[test]
    fn test_file_digest() {
        assert_eq!(
            file_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_ledger_dedup_and_bound() {
        let mut ledger = ProofLedger::new(2);
        ledger.record(ProofCodeEntry::new("a", DocumentClass::TaxCard));
        ledger.record(ProofCodeEntry::new("b", DocumentClass::TaxCard));
        ledger.record(ProofCodeEntry::new("a", DocumentClass::TaxCard));
        let codes: Vec<_> = ledger.entries().iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["a", "b"]);

        ledger.record(ProofCodeEntry::new("c", DocumentClass::TaxCard));
        let codes: Vec<_> = ledger.entries().iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["c", "a"]);
    }

    #[test]
    fn test_ledger_generate_find_remove_verify() {
        let mut ledger = ProofLedger::default();
        let entry = ledger.generate(DocumentClass::TaxCard, &sample(), None);

        assert!(ledger.find(&entry.code).is_some());
        assert_eq!(
            ledger.verify(DocumentClass::TaxCard, &sample(), None, &entry.code),
            ProofCheck::Issued(&entry)
        );
        assert_eq!(
            ledger.verify(DocumentClass::TaxCard, &FieldMap::new(), None, &entry.code),
            ProofCheck::Mismatch
        );

        assert!(ledger.remove(&entry.code));
        assert!(!ledger.remove(&entry.code));
        assert!(ledger.is_empty());

        let check = ledger.verify(DocumentClass::TaxCard, &sample(), None, &entry.code);
        assert_eq!(check, ProofCheck::Unrecorded);
        assert!(check.matches());
    }

    #[test]
    fn test_ledger_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger").join("proofs.json");

        let mut ledger = ProofLedger::new(5);
        ledger.generate(DocumentClass::Transcript, &sample(), Some("digest"));
        ledger.save(&path).unwrap();

        let loaded = ProofLedger::load(&path, 5).unwrap();
        assert_eq!(loaded, ledger);
    }
}
