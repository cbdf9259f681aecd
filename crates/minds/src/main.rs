//! Minds - command-line client for the Minds AI data platform
//!
//! Main entry point for the Minds CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ask, config, datasources, minds};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Minds - manage datasources and minds, and ask them questions
#[derive(Parser)]
#[command(name = "minds")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Client config context to use instead of the current one
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Service URL [default: $MINDS_BASE_URL, then https://mdb.ai]
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// API key [default: $MINDS_API_KEY, then the context's auth]
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Project minds are scoped to
    #[arg(long, global = true)]
    pub project: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Datasource management
    Datasources(datasources::DatasourcesArgs),

    /// Mind management
    Minds(minds::MindsArgs),

    /// Ask a mind a one-shot question
    Ask(ask::AskArgs),

    /// Client configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: console (human-readable) plus rotating JSON file
    let filter = if cli.verbose {
        "minds=debug,minds_client=debug,minds_config=debug,info"
    } else {
        "minds=info,minds_client=info,minds_config=info,warn"
    };

    let log_dir = minds_config::config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "minds.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "minds=trace,minds_client=trace,minds_config=trace,info",
                )),
        )
        .init();

    // Create context for commands
    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
        overrides: minds_config::ConnectionOverrides {
            context: cli.context,
            api_key: cli.api_key,
            base_url: cli.base_url,
            project: cli.project,
        },
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Datasources(args) => datasources::run(args, &ctx).await,
        Commands::Minds(args) => minds::run(args, &ctx).await,
        Commands::Ask(args) => ask::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
