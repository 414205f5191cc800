//! Extract command - pull the fields out of a single document.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use veridoc_core::{DocumentClass, ExtractionResult};

use super::{extract_document, fields_csv, fields_text, load_document, Context, ExtractOptions};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (.txt, .pdf or image)
    #[arg(required = true)]
    input: PathBuf,

    #[command(flatten)]
    options: ExtractOptions,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// List the fields that could not be extracted
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text listing
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, ctx: &Context) -> anyhow::Result<()> {
    let gemini = ctx.gemini()?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Reading document...");

    let document = load_document(&args.input, &ctx.config, gemini.as_ref()).await?;

    pb.set_message("Extracting fields...");
    let result = extract_document(&document.text, &args.options, &ctx.config, gemini.as_ref()).await?;
    pb.finish_and_clear();

    debug!(
        origin = ?result.origin,
        time_ms = result.processing_time_ms,
        "extraction finished"
    );

    let output = format_result(args.options.class, &result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_warnings {
        for warning in &result.warnings {
            eprintln!("{} {}", style("!").yellow(), warning);
        }
    }

    Ok(())
}

pub fn format_result(
    class: DocumentClass,
    result: &ExtractionResult,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => fields_csv(class, [&result.fields]),
        OutputFormat::Text => Ok(fields_text(class, &result.fields)),
    }
}
