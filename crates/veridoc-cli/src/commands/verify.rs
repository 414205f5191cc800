//! Verify command - extract, apply edits, score and optionally issue a
//! proof code.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use veridoc_core::{
    DocumentClass, FieldMap, FieldOrigin, ProofCodeEntry, Scorer, VerificationResult,
};

use super::{apply_edits, extract_document, fields_text, load_document, parse_edit, Context, ExtractOptions};

/// Arguments for the verify command.
#[derive(Args)]
pub struct VerifyArgs {
    /// Input file (.txt, .pdf or image)
    #[arg(required = true)]
    input: PathBuf,

    #[command(flatten)]
    options: ExtractOptions,

    /// Correct an extracted field (repeatable), e.g. --field name="RAHUL SHARMA"
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_edit)]
    fields: Vec<(String, String)>,

    /// Generate a proof code when the document verifies
    #[arg(long)]
    proof: bool,

    /// Print JSON instead of a text report
    #[arg(long)]
    json: bool,
}

/// Everything known about one verified document.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub doc_type: DocumentClass,
    pub fields: FieldMap,
    pub origin: FieldOrigin,
    pub verification: VerificationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofCodeEntry>,
}

pub async fn run(args: VerifyArgs, ctx: &Context) -> anyhow::Result<()> {
    let gemini = ctx.gemini()?;
    let class = args.options.class;

    let document = load_document(&args.input, &ctx.config, gemini.as_ref()).await?;
    let extraction =
        extract_document(&document.text, &args.options, &ctx.config, gemini.as_ref()).await?;

    let mut fields = extraction.fields;
    apply_edits(class, &mut fields, &args.fields);

    let verification = Scorer::new().score(class, &fields);
    info!(
        valid = verification.is_valid,
        confidence = ?verification.confidence,
        "{} scored",
        args.input.display()
    );

    let proof = if args.proof && verification.is_valid {
        let mut ledger = ctx.ledger()?;
        let entry = ledger.generate(class, &fields, Some(&document.digest));
        ledger.save(&ctx.ledger_path)?;
        Some(entry)
    } else {
        None
    };

    let report = VerificationReport {
        doc_type: class,
        fields,
        origin: extraction.origin,
        verification,
        proof,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
        if args.proof && report.proof.is_none() {
            println!(
                "{} No proof code issued for a document that failed verification",
                style("!").yellow()
            );
        }
    }

    if report.verification.is_valid {
        Ok(())
    } else {
        std::process::exit(2);
    }
}

fn print_report(report: &VerificationReport) {
    print!("{}", fields_text(report.doc_type, &report.fields));
    println!();

    let verdict = &report.verification;
    if verdict.is_valid {
        println!("{} {}", style("✓").green(), verdict.message);
    } else {
        println!("{} {}", style("✗").red(), style(&verdict.message).red());
    }
    for detail in &verdict.details {
        println!("  - {}", detail);
    }

    if let Some(proof) = &report.proof {
        println!();
        println!("{} Proof code: {}", style("ℹ").blue(), style(&proof.code).cyan().bold());
    }
}
