//! Gamma exposure dashboard client - Entry Point

use anyhow::{bail, Result};
use clap::Parser;
use gex_telemetry::LogLevel;
use tracing::info;

/// Gamma exposure dashboard client
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via GEX_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Run a single refresh cycle and exit
    #[arg(long)]
    once: bool,

    /// Refresh interval in seconds (overrides config)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    gex_telemetry::init_logging(level)?;

    info!("Starting gex-app v{}", env!("CARGO_PKG_VERSION"));

    let mut config = gex_app::AppConfig::load(args.config.as_deref())?;
    if let Some(secs) = args.interval {
        config.refresh_interval_secs = secs;
        config.validate()?;
    }
    info!(
        api_base_url = %config.api_base_url,
        interval_secs = config.refresh_interval_secs,
        expiry = %config.filter.expiry,
        customer = %config.filter.customer,
        "Configuration loaded"
    );

    if args.once {
        match gex_app::Application::run_once(&config).await? {
            Some(report) if report.is_success() => {
                info!(duration_ms = report.duration_ms, "Single cycle completed");
                return Ok(());
            }
            Some(report) => bail!(
                "refresh cycle failed (market_ok={}, exposure_ok={})",
                report.market_ok,
                report.exposure_ok
            ),
            None => bail!("refresh cycle was skipped"),
        }
    }

    let app = gex_app::Application::new(config)?;
    app.run().await?;

    Ok(())
}
