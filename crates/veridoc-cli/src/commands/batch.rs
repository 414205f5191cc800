//! Batch command - extract and score many documents of one class.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use veridoc_core::{ExtractionResult, Scorer, VerificationResult};

use super::extract::OutputFormat;
use super::verify::VerificationReport;
use super::{extract_document, fields_csv, fields_text, load_document, Context, ExtractOptions};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    #[command(flatten)]
    options: ExtractOptions,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome for a single file.
struct FileResult {
    path: PathBuf,
    outcome: Result<(ExtractionResult, VerificationResult), String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Utc::now();
    let gemini = ctx.gemini()?;
    let class = args.options.class;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(
                ext.to_lowercase().as_str(),
                "txt" | "text" | "pdf" | "png" | "jpg" | "jpeg" | "webp"
            )
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let scorer = Scorer::new();
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Utc::now();

        let outcome = async {
            let document = load_document(&path, &ctx.config, gemini.as_ref()).await?;
            let extraction =
                extract_document(&document.text, &args.options, &ctx.config, gemini.as_ref())
                    .await?;
            let verification = scorer.score(class, &extraction.fields);
            anyhow::Ok((extraction, verification))
        }
        .await;

        let processing_time_ms = (Utc::now() - file_start).num_milliseconds().max(0) as u64;

        let outcome = match outcome {
            Ok(pair) => Ok(pair),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    Err(error_msg)
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        };

        results.push(FileResult {
            path,
            outcome,
            processing_time_ms,
        });
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Ok((extraction, verification)) = &result.outcome {
                let output_path = write_output(output_dir, result, extraction, verification, &args)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let verified = results
        .iter()
        .filter(|r| matches!(&r.outcome, Ok((_, v)) if v.is_valid))
        .count();
    let failed: Vec<_> = results.iter().filter(|r| r.outcome.is_err()).collect();
    let elapsed_ms = (Utc::now() - start).num_milliseconds();

    println!();
    println!(
        "{} Processed {} files in {}ms",
        style("✓").green(),
        results.len(),
        elapsed_ms
    );
    println!(
        "   {} verified, {} not verified, {} failed",
        style(verified).green(),
        style(results.len() - verified - failed.len()).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(error) = &result.outcome {
                println!("  - {}: {}", result.path.display(), error);
            }
        }
    }

    Ok(())
}

fn write_output(
    output_dir: &Path,
    result: &FileResult,
    extraction: &ExtractionResult,
    verification: &VerificationResult,
    args: &BatchArgs,
) -> anyhow::Result<PathBuf> {
    let class = args.options.class;
    let output_name = result
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));

    let content = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&VerificationReport {
            doc_type: class,
            fields: extraction.fields.clone(),
            origin: extraction.origin,
            verification: verification.clone(),
            proof: None,
        })?,
        OutputFormat::Csv => fields_csv(class, [&extraction.fields])?,
        OutputFormat::Text => {
            let mut text = fields_text(class, &extraction.fields);
            text.push_str(&format!("\n{}\n", verification.message));
            text
        }
    };

    fs::write(&output_path, content)?;
    Ok(output_path)
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "valid",
        "confidence",
        "origin",
        "missing_fields",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &result.outcome {
            Ok((extraction, verification)) => {
                let origin = serde_json::to_value(extraction.origin)?;
                wtr.write_record([
                    filename,
                    "success",
                    &verification.is_valid.to_string(),
                    &verification
                        .confidence
                        .map(|c| c.to_string())
                        .unwrap_or_default(),
                    origin.as_str().unwrap_or(""),
                    &extraction.warnings.len().to_string(),
                    &result.processing_time_ms.to_string(),
                    "",
                ])?;
            }
            Err(error) => {
                wtr.write_record([
                    filename,
                    "error",
                    "",
                    "",
                    "",
                    "",
                    &result.processing_time_ms.to_string(),
                    error.as_str(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
