//! Newsframe CLI
//!
//! Starts batch runs on a Newsframe server and follows their progress live.

mod api;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Newsframe CLI - branded news cards, one per category
#[derive(Parser)]
#[command(name = "newsframe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Start news card batches and watch them progress")]
#[command(long_about = r#"
Newsframe gathers one article per category, renders a branded card for each
and queues it for publishing.

Examples:
  newsframe run                                # Every default category
  newsframe run -c business -c technology      # Selected categories only
  newsframe categories                         # List what the server offers
"#)]
struct Cli {
    /// Server URL
    #[arg(long, env = "NEWSFRAME_SERVER_URL", default_value = "http://127.0.0.1:8080", global = true)]
    server: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch and stream its progress
    Run {
        /// Category key to include; repeat for several. Defaults to all
        #[arg(short, long = "category")]
        categories: Vec<String>,
    },

    /// List the server's categories
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("newsframe_cli={},utils={},warn", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let api = api::ApiClient::new(&cli.server);
    let out = output::OutputHandler::new(cli.verbose);

    match cli.command {
        Commands::Run { categories } => {
            let tally = commands::run_batch(&api, &out, &categories).await?;
            if tally.all_failed() {
                std::process::exit(1);
            }
        }
        Commands::Categories => {
            commands::list_categories(&api, &out).await?;
        }
    }

    Ok(())
}
