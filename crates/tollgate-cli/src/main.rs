//! Tollgate CLI tool.

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod backends;
mod commands;

#[derive(Parser)]
#[command(name = "tollgate")]
#[command(about = "Tollgate presubmit dispatch CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a trigger configuration
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "tollgate.kdl")]
        path: String,
    },
    /// Run and skip presubmits for one pull request event
    Dispatch(DispatchArgs),
}

#[derive(Args)]
pub struct DispatchArgs {
    /// Path to the configuration file
    #[arg(long, default_value = "tollgate.kdl")]
    pub config: String,
    /// Repository as org/repo
    #[arg(long)]
    pub repo: String,
    /// Base branch of the pull request
    #[arg(long)]
    pub base: String,
    /// Head commit of the pull request
    #[arg(long)]
    pub head: String,
    /// Pull request number
    #[arg(long)]
    pub pull: Option<u64>,
    /// Pull request author
    #[arg(long)]
    pub author: Option<String>,
    /// Correlation id of the triggering event
    #[arg(long, env = "TOLLGATE_EVENT_ID")]
    pub event_id: String,
    /// Presubmits to run
    #[arg(long = "run", value_delimiter = ',')]
    pub run: Vec<String>,
    /// Presubmits to report as skipped
    #[arg(long = "skip", value_delimiter = ',')]
    pub skip: Vec<String>,
    /// Publish no skipped statuses
    #[arg(long)]
    pub elide_skipped: bool,
    /// Log statuses instead of publishing them to GitHub
    #[arg(long)]
    pub dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries execution requests
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            commands::validate(&path)?;
        }
        Commands::Dispatch(args) => {
            commands::dispatch::dispatch(args).await?;
        }
    }

    Ok(())
}
