//! kinrec - enroll and match face and voice embeddings.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{EnrollArgs, ListArgs, MatchArgs, RemoveArgs, VerifyArgs};

/// kinrec - biometric identity matching CLI.
///
/// Enrollments live in two redb files (face.redb, voice.redb) under the
/// store directory. Vectors are given as JSON arrays, inline or from a file.
#[derive(Parser)]
#[command(name = "kinrec")]
#[command(about = "Enroll and match face and voice embeddings")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.kinrec/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store directory (default is ~/.kinrec/store)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enroll a vector for an identity
    Enroll(EnrollArgs),
    /// Find the enrolled identity best matching a vector
    Match(MatchArgs),
    /// Check a vector against a claimed identity
    Verify(VerifyArgs),
    /// Remove every enrollment of an identity
    Remove(RemoveArgs),
    /// List the enrollments of a partition
    List(ListArgs),
    /// Show record counts
    Stats,
    /// Print the effective configuration
    Config,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Enroll(args) => commands::enroll(&cli, args).await,
        Commands::Match(args) => commands::identify(&cli, args).await,
        Commands::Verify(args) => commands::verify(&cli, args).await,
        Commands::Remove(args) => commands::remove(&cli, args).await,
        Commands::List(args) => commands::list(&cli, args).await,
        Commands::Stats => commands::stats(&cli).await,
        Commands::Config => commands::show_config(&cli),
    }
}
