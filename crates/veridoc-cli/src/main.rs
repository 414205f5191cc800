//! CLI application for identity and marksheet document verification.

mod commands;
mod gemini;
mod openai;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, extract, proof, verify, Context};

/// veridoc - Extract, verify and fingerprint Aadhaar, PAN and marksheet documents
#[derive(Parser)]
#[command(name = "veridoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the proof-code ledger
    #[arg(long, global = true, env = "VERIDOC_LEDGER")]
    ledger: Option<PathBuf>,

    /// Gemini API key, overrides the configured key
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OpenAI key for AI-assisted parsing when Gemini fails
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    backup_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from a single document
    Extract(extract::ExtractArgs),

    /// Extract and verify a single document
    Verify(verify::VerifyArgs),

    /// Extract and verify multiple documents
    Batch(batch::BatchArgs),

    /// Manage proof codes
    Proof(proof::ProofArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let ctx = Context::load(
        cli.config.as_deref(),
        cli.ledger.as_deref(),
        cli.api_key,
        cli.backup_key,
    )?;

    match cli.command {
        Commands::Extract(args) => extract::run(args, &ctx).await,
        Commands::Verify(args) => verify::run(args, &ctx).await,
        Commands::Batch(args) => batch::run(args, &ctx).await,
        Commands::Proof(args) => proof::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
