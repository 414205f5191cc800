//! WASM bindings for document verification.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! Field maps cross the boundary as plain objects of string values.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use veridoc_core::extract::build_prompt;
use veridoc_core::extract::rules::aadhaar::format_aadhaar;
use veridoc_core::{
    resolve_fields, DocumentClass, DocumentExtractor, FieldMap, ProofLedger, RuleBasedExtractor,
    Scorer,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_err)
}

fn fields_from_js(fields: JsValue) -> Result<FieldMap, JsValue> {
    serde_wasm_bindgen::from_value(fields).map_err(js_err)
}

fn class_from_tag(doc_type: &str) -> Result<DocumentClass, JsValue> {
    doc_type.parse().map_err(js_err)
}

/// Normalize OCR text into trimmed, non-empty lines.
#[wasm_bindgen]
pub fn normalize_text(raw: &str) -> Result<JsValue, JsValue> {
    to_js(&veridoc_core::normalize(raw).lines)
}

/// Extract fields from document text with the rule-based extractor.
///
/// Returns `{ fields, warnings, origin, processingTimeMs }`.
#[wasm_bindgen]
pub fn extract_fields(doc_type: &str, text: &str) -> Result<JsValue, JsValue> {
    let class = class_from_tag(doc_type)?;
    to_js(&RuleBasedExtractor::new().extract(class, text))
}

/// Score a field map. Unknown document types yield an unsupported result
/// rather than an error.
#[wasm_bindgen]
pub fn verify_fields(doc_type: &str, fields: JsValue) -> Result<JsValue, JsValue> {
    let fields = fields_from_js(fields)?;
    to_js(&Scorer::new().score_tagged(doc_type, &fields))
}

/// Proof code of a (possibly edited) field map.
#[wasm_bindgen]
pub fn proof_code(
    doc_type: &str,
    fields: JsValue,
    file_digest: Option<String>,
) -> Result<String, JsValue> {
    let class = class_from_tag(doc_type)?;
    let fields = fields_from_js(fields)?;
    Ok(veridoc_core::fingerprint(class, &fields, file_digest.as_deref()))
}

/// Hex SHA-256 of the uploaded file's bytes.
#[wasm_bindgen]
pub fn file_digest(bytes: &[u8]) -> String {
    veridoc_core::file_digest(bytes)
}

/// Validate an Aadhaar number (12 digits, spaces allowed).
#[wasm_bindgen]
pub fn validate_aadhaar(value: &str) -> bool {
    veridoc_core::extract::rules::validate_aadhaar(value)
}

/// Validate a PAN (case-insensitive).
#[wasm_bindgen]
pub fn validate_pan(value: &str) -> bool {
    veridoc_core::extract::rules::validate_pan(value)
}

/// Refresh `percentage` from an edited `subjects` block.
#[wasm_bindgen]
pub fn recompute_percentage(fields: JsValue) -> Result<JsValue, JsValue> {
    let mut fields = fields_from_js(fields)?;
    veridoc_core::recompute_percentage(&mut fields);
    to_js(&fields)
}

/// One verification session for a single document type.
///
/// Keeps the extractor settings and an in-memory proof ledger. The page
/// persists the ledger itself via `ledger_json` / `load_ledger`.
#[wasm_bindgen]
pub struct DocumentVerifier {
    class: DocumentClass,
    extractor: RuleBasedExtractor,
    scorer: Scorer,
    ledger: ProofLedger,
}

#[wasm_bindgen]
impl DocumentVerifier {
    /// Create a verifier for `aadhar`, `pan` or `marksheet` documents.
    #[wasm_bindgen(constructor)]
    pub fn new(doc_type: &str) -> Result<DocumentVerifier, JsValue> {
        Ok(Self {
            class: class_from_tag(doc_type)?,
            extractor: RuleBasedExtractor::new(),
            scorer: Scorer::new(),
            ledger: ProofLedger::default(),
        })
    }

    /// Document type tag.
    #[wasm_bindgen(getter)]
    pub fn doc_type(&self) -> String {
        self.class.tag().to_string()
    }

    /// Marks-table tier threshold.
    #[wasm_bindgen]
    pub fn set_min_subject_rows(&mut self, rows: usize) {
        self.extractor = RuleBasedExtractor::new().with_min_subject_rows(rows);
    }

    /// Bound of the proof ledger.
    #[wasm_bindgen]
    pub fn set_max_proof_entries(&mut self, max_entries: usize) {
        self.ledger.set_max_entries(max_entries);
    }

    /// Prompt for the AI-assisted parser.
    #[wasm_bindgen]
    pub fn prompt(&self, text: &str) -> String {
        build_prompt(self.class, text)
    }

    /// Rule-based extraction.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.extractor.extract(self.class, text))
    }

    /// Use the AI collaborator's reply when usable, otherwise the rules.
    /// Pass `undefined` when the collaborator failed.
    #[wasm_bindgen]
    pub fn resolve(&self, text: &str, reply: Option<String>) -> Result<JsValue, JsValue> {
        to_js(&resolve_fields(
            &self.extractor,
            self.class,
            text,
            reply.as_deref(),
        ))
    }

    /// Score a field map.
    #[wasm_bindgen]
    pub fn verify(&self, fields: JsValue) -> Result<JsValue, JsValue> {
        let fields = fields_from_js(fields)?;
        to_js(&self.scorer.score(self.class, &fields))
    }

    /// Record and return the proof code of a verified field map.
    #[wasm_bindgen]
    pub fn generate_proof(
        &mut self,
        fields: JsValue,
        file_digest: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let fields = fields_from_js(fields)?;
        let entry = self
            .ledger
            .generate(self.class, &fields, file_digest.as_deref());
        to_js(&entry)
    }

    /// Whether `code` is the proof code of this field map.
    #[wasm_bindgen]
    pub fn check_proof(
        &self,
        fields: JsValue,
        file_digest: Option<String>,
        code: &str,
    ) -> Result<bool, JsValue> {
        let fields = fields_from_js(fields)?;
        Ok(self
            .ledger
            .verify(self.class, &fields, file_digest.as_deref(), code)
            .matches())
    }

    /// Forget a proof code.
    #[wasm_bindgen]
    pub fn remove_proof(&mut self, code: &str) -> bool {
        self.ledger.remove(code)
    }

    /// Remembered proof codes, newest first.
    #[wasm_bindgen]
    pub fn proof_entries(&self) -> Result<JsValue, JsValue> {
        to_js(self.ledger.entries())
    }

    /// Ledger as JSON, for local storage.
    #[wasm_bindgen]
    pub fn ledger_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.ledger).map_err(js_err)
    }

    /// Replace the ledger with one saved by `ledger_json`.
    #[wasm_bindgen]
    pub fn load_ledger(&mut self, json: &str) -> Result<(), JsValue> {
        let mut ledger: ProofLedger = serde_json::from_str(json).map_err(js_err)?;
        ledger.set_max_entries(self.ledger.max_entries());
        self.ledger = ledger;
        Ok(())
    }
}

/// Helpers for form display.
#[wasm_bindgen]
pub struct DocumentUtils;

#[wasm_bindgen]
impl DocumentUtils {
    /// Format an Aadhaar number in groups of four (XXXX XXXX XXXX).
    #[wasm_bindgen]
    pub fn format_aadhaar(value: &str) -> String {
        format_aadhaar(value).unwrap_or_else(|| value.to_string())
    }

    /// Human-readable document title.
    #[wasm_bindgen]
    pub fn title(doc_type: &str) -> Result<String, JsValue> {
        Ok(class_from_tag(doc_type)?.title().to_string())
    }

    /// Field names of a document type, in display order.
    #[wasm_bindgen]
    pub fn vocabulary(doc_type: &str) -> Result<JsValue, JsValue> {
        to_js(class_from_tag(doc_type)?.vocabulary())
    }
}
