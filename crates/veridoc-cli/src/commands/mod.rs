//! CLI subcommands and the input handling they share.

pub mod batch;
pub mod config;
pub mod extract;
pub mod proof;
pub mod verify;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{debug, info, warn};

use veridoc_core::extract::resolve_fields;
use veridoc_core::{
    file_digest, keys, recompute_percentage, DocumentClass, ExtractionResult, FieldMap, PdfExtractor,
    PdfType, ProofLedger, RuleBasedExtractor, VeridocConfig,
};

use crate::gemini::GeminiClient;

/// Settings shared by every command.
pub struct Context {
    pub config: VeridocConfig,
    pub config_path: PathBuf,
    pub ledger_path: PathBuf,
    pub api_key: Option<String>,
    pub backup_key: Option<String>,
}

impl Context {
    /// Load the config file, defaults when it does not exist yet.
    pub fn load(
        config_path: Option<&Path>,
        ledger_path: Option<&Path>,
        api_key: Option<String>,
        backup_key: Option<String>,
    ) -> anyhow::Result<Self> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);
        let ledger_path = ledger_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_ledger_path);
        let config = VeridocConfig::load_or_default(&config_path)?;

        Ok(Self {
            config,
            config_path,
            ledger_path,
            api_key,
            backup_key,
        })
    }

    /// Proof-code ledger bounded by the configured size.
    pub fn ledger(&self) -> anyhow::Result<ProofLedger> {
        Ok(ProofLedger::load(
            &self.ledger_path,
            self.config.proofs.max_entries,
        )?)
    }

    /// Gemini client, when a key is given on the command line, in the
    /// environment or in the config file. A backup key adds the OpenAI
    /// fallback for field parsing.
    pub fn gemini(&self) -> anyhow::Result<Option<GeminiClient>> {
        let credentials = &self.config.credentials;
        let Some(key) = cli_key(self.api_key.as_deref()).or_else(|| credentials.text_extraction_key()) else {
            return Ok(None);
        };

        let client = GeminiClient::new(key, &self.config.extraction)?;
        Ok(Some(
            match cli_key(self.backup_key.as_deref()).or_else(|| credentials.backup_key()) {
                Some(backup) => client.with_fallback(backup, &self.config.extraction),
                None => client,
            },
        ))
    }
}

fn cli_key(key: Option<&str>) -> Option<&str> {
    key.map(str::trim).filter(|k| !k.is_empty())
}

pub fn default_config_path() -> PathBuf {
    VeridocConfig::default_path(dirs::config_dir())
}

pub fn default_ledger_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("veridoc")
        .join("proofs.json")
}

pub fn parse_class(tag: &str) -> Result<DocumentClass, String> {
    DocumentClass::from_tag(tag)
        .ok_or_else(|| format!("unknown document type '{}' (use aadhar, pan or marksheet)", tag))
}

/// Parse a `key=value` edit.
pub fn parse_edit(edit: &str) -> Result<(String, String), String> {
    let (key, value) = edit
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", edit))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{}'", edit));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Options controlling how a document is read and extracted.
#[derive(Args, Clone)]
pub struct ExtractOptions {
    /// Document type (aadhar, pan, marksheet)
    #[arg(short = 't', long = "class", value_parser = parse_class)]
    pub class: DocumentClass,

    /// Require the AI-assisted parser (fails without an API key)
    #[arg(long, conflicts_with = "rules_only")]
    pub ai: bool,

    /// Never call the AI collaborator, even when a key is configured
    #[arg(long)]
    pub rules_only: bool,
}

/// Text pulled out of an input file.
pub struct LoadedDocument {
    pub text: String,
    pub digest: String,
}

/// Read a document's text. Text files are taken as-is, PDFs use their
/// embedded text, and images or scanned PDFs go to the vision collaborator.
pub async fn load_document(
    path: &Path,
    config: &VeridocConfig,
    gemini: Option<&GeminiClient>,
) -> anyhow::Result<LoadedDocument> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let data = fs::read(path)?;
    let digest = file_digest(&data);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    info!("Reading {}", path.display());

    let text = match extension.as_str() {
        "txt" | "text" => String::from_utf8(data)?,
        "pdf" => {
            let content = PdfExtractor::read(&data, config.pdf.min_text_length)?;
            debug!(
                pages = content.page_count,
                pdf_type = ?content.pdf_type,
                "PDF analyzed"
            );
            match content.pdf_type {
                PdfType::Text => content.text,
                PdfType::Scanned => match gemini {
                    Some(client) => client.image_text(&data, "application/pdf").await?,
                    None => anyhow::bail!(
                        "{} is a scanned PDF. Configure a Gemini API key or supply a text file.",
                        path.display()
                    ),
                },
                PdfType::Empty => anyhow::bail!("PDF appears to be empty"),
            }
        }
        "png" | "jpg" | "jpeg" | "webp" => match gemini {
            Some(client) => client.image_text(&data, image_mime(&extension)).await?,
            None => anyhow::bail!(
                "Reading images requires a Gemini API key. \
                 Set GEMINI_API_KEY or supply the document text as a .txt file."
            ),
        },
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    if text.trim().is_empty() {
        anyhow::bail!("No text could be read from {}", path.display());
    }

    Ok(LoadedDocument { text, digest })
}

fn image_mime(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// Extract fields, preferring the AI-assisted parser when allowed.
pub async fn extract_document(
    text: &str,
    options: &ExtractOptions,
    config: &VeridocConfig,
    gemini: Option<&GeminiClient>,
) -> anyhow::Result<ExtractionResult> {
    let rules = RuleBasedExtractor::from_config(&config.extraction);

    if options.ai && gemini.is_none() {
        anyhow::bail!("--ai requires a Gemini API key");
    }

    let assisted = !options.rules_only && (options.ai || config.extraction.use_ai_parser);
    let reply = match gemini.filter(|_| assisted) {
        Some(client) => match client.parse_fields(options.class, text).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                warn!("AI-assisted parsing failed: {}", e);
                None
            }
        },
        None => None,
    };

    Ok(resolve_fields(&rules, options.class, text, reply.as_deref()))
}

/// Apply user edits; the percentage follows an edited subjects block.
pub fn apply_edits(class: DocumentClass, fields: &mut FieldMap, edits: &[(String, String)]) {
    if edits.is_empty() {
        return;
    }
    for (key, _) in edits {
        if !class.accepts(key) {
            warn!("Field '{}' is not part of a {} document", key, class.title());
        }
    }

    let percentage_edited = edits.iter().any(|(k, _)| k == keys::PERCENTAGE);
    let subjects_edited = edits.iter().any(|(k, _)| k == keys::SUBJECTS);

    fields.apply_edits(edits.iter().cloned());

    if class == DocumentClass::Transcript && subjects_edited && !percentage_edited {
        recompute_percentage(fields);
    }
}

/// CSV with the class vocabulary as header and one row per field map.
pub fn fields_csv<'a>(
    class: DocumentClass,
    rows: impl IntoIterator<Item = &'a FieldMap>,
) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(class.vocabulary())?;
    for fields in rows {
        wtr.write_record(
            class
                .vocabulary()
                .iter()
                .map(|key| fields.get(key).unwrap_or_default()),
        )?;
    }
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

/// Human-readable listing in vocabulary order, then any extra fields.
pub fn fields_text(class: DocumentClass, fields: &FieldMap) -> String {
    let mut output = format!("{}\n", class.title());

    for key in class.vocabulary() {
        let Some(value) = fields.get(key) else {
            continue;
        };
        if value.contains('\n') {
            output.push_str(&format!("  {}:\n", key));
            for line in value.lines() {
                output.push_str(&format!("    {}\n", line));
            }
        } else {
            output.push_str(&format!("  {}: {}\n", key, value));
        }
    }
    for (key, value) in fields.iter().filter(|(k, _)| !class.accepts(k)) {
        output.push_str(&format!("  {}: {}\n", key, value));
    }

    output
}
