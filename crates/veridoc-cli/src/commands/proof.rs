//! Proof command - issue, list, revoke and check proof codes.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use veridoc_core::{FieldMap, ProofCheck, Scorer};

use super::{apply_edits, extract_document, load_document, parse_edit, Context, ExtractOptions};

/// Arguments for the proof command.
#[derive(Args)]
pub struct ProofArgs {
    #[command(subcommand)]
    command: ProofCommand,
}

#[derive(Subcommand)]
enum ProofCommand {
    /// Verify a document and record its proof code
    Generate(DocumentArgs),

    /// List remembered proof codes, newest first
    List {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget a proof code
    Remove {
        /// Proof code
        code: String,
    },

    /// Check that a proof code matches a document
    Check {
        #[command(flatten)]
        document: DocumentArgs,

        /// Proof code to check
        #[arg(long)]
        code: String,
    },
}

#[derive(Args)]
struct DocumentArgs {
    /// Input file (.txt, .pdf or image)
    input: PathBuf,

    #[command(flatten)]
    options: ExtractOptions,

    /// Correct an extracted field (repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_edit)]
    fields: Vec<(String, String)>,
}

pub async fn run(args: ProofArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.command {
        ProofCommand::Generate(document) => generate(document, ctx).await,
        ProofCommand::List { json } => list(ctx, json),
        ProofCommand::Remove { code } => remove(&code, ctx),
        ProofCommand::Check { document, code } => check(document, &code, ctx).await,
    }
}

async fn generate(args: DocumentArgs, ctx: &Context) -> anyhow::Result<()> {
    let class = args.options.class;
    let (fields, digest) = read_fields(&args, ctx).await?;

    let verification = Scorer::new().score(class, &fields);
    if !verification.is_valid {
        for detail in &verification.details {
            eprintln!("  - {}", detail);
        }
        anyhow::bail!("{}", verification.message);
    }

    let mut ledger = ctx.ledger()?;
    let entry = ledger.generate(class, &fields, Some(&digest));
    ledger.save(&ctx.ledger_path)?;

    println!("{}", entry.code);
    eprintln!(
        "{} {} ({} codes stored)",
        style("✓").green(),
        verification.message,
        ledger.len()
    );

    Ok(())
}

fn list(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let ledger = ctx.ledger()?;

    if json {
        println!("{}", serde_json::to_string_pretty(ledger.entries())?);
        return Ok(());
    }

    if ledger.is_empty() {
        println!("{} No proof codes stored", style("ℹ").blue());
        return Ok(());
    }

    for entry in ledger.entries() {
        println!(
            "{}  {:<10} {}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.doc_type.tag(),
            style(&entry.code).cyan()
        );
    }

    Ok(())
}

fn remove(code: &str, ctx: &Context) -> anyhow::Result<()> {
    let mut ledger = ctx.ledger()?;

    if !ledger.remove(code.trim()) {
        anyhow::bail!("Proof code not found: {}", code);
    }
    ledger.save(&ctx.ledger_path)?;

    println!("{} Removed {}", style("✓").green(), code.trim());
    Ok(())
}

async fn check(args: DocumentArgs, code: &str, ctx: &Context) -> anyhow::Result<()> {
    let (fields, digest) = read_fields(&args, ctx).await?;
    let ledger = ctx.ledger()?;

    let note = match ledger.verify(args.options.class, &fields, Some(&digest), code) {
        ProofCheck::Mismatch => anyhow::bail!("Proof code does not match this document"),
        ProofCheck::Issued(entry) => {
            format!(" (issued {})", entry.created_at.format("%Y-%m-%d %H:%M"))
        }
        ProofCheck::Unrecorded => " (not issued from this ledger)".to_string(),
    };

    println!("{} Proof code matches{}", style("✓").green(), note);
    Ok(())
}

async fn read_fields(
    args: &DocumentArgs,
    ctx: &Context,
) -> anyhow::Result<(FieldMap, String)> {
    let gemini = ctx.gemini()?;
    let document = load_document(&args.input, &ctx.config, gemini.as_ref()).await?;
    let extraction =
        extract_document(&document.text, &args.options, &ctx.config, gemini.as_ref()).await?;

    let mut fields = extraction.fields;
    apply_edits(args.options.class, &mut fields, &args.fields);
    Ok((fields, document.digest))
}
