//! scansum - OCR and summarize folders of scanned PDFs.

mod cli;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scansum::config::{AppConfig, LogFormat, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    let args = cli::Cli::parse();

    // Logging comes up even when the config is broken so the error is reported
    let loaded = AppConfig::load(&args.config);
    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    init_tracing(&logging, args.verbose);

    let config = loaded.map_err(|e| {
        tracing::error!("Fatal error occurred: {}", e);
        e
    });
    let config = config
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    cli::run(args, config).await
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let default_filter = if verbose {
        "scansum=debug".to_string()
    } else {
        format!("scansum={}", logging.level_directive())
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    match logging.log_format() {
        LogFormat::Full => registry.with(fmt::layer()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }
}
