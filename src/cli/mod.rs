//! Command-line interface.

mod check;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use scansum::config::{AppConfig, DEFAULT_CONFIG_PATH};

#[derive(Parser)]
#[command(name = "scansum")]
#[command(about = "OCR and summarize folders of scanned PDFs")]
#[command(version)]
pub struct Cli {
    /// Config file path (YAML, TOML or JSON)
    #[arg(short, long, global = true, env = "SCANSUM_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// OCR every document, summarize it and write the JSON report (default)
    Run {
        /// Input folder (overrides file_processing.input_folder)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Report path (overrides file_processing.output_file)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only process the first N files (overrides file_processing.test_limit)
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Check that the OCR tools and the configured model are available
    Check,
}

/// Dispatch the parsed command line.
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Run {
        input: None,
        output: None,
        limit: None,
    }) {
        Commands::Run {
            input,
            output,
            limit,
        } => run::cmd_run(config, input, output, limit).await,
        Commands::Check => check::cmd_check(&config).await,
    }
}
