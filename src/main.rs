use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;

use pickup_explorer::app::PickupExplorerApp;
use pickup_explorer::config::AppConfig;

/// Interactive hour-of-day explorer for pickup data.
#[derive(Debug, Parser)]
#[command(name = "pickup-explorer", version, about)]
struct Cli {
    /// URL or path of the CSV (plain or gzip) to explore
    source: Option<String>,

    /// Number of rows to load (0 = all)
    #[arg(short = 'n', long = "rows")]
    rows: Option<usize>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::default(),
    }
    .with_overrides(cli.source, cli.rows);
    config.validate().context("invalid configuration")?;

    log::info!(
        "Exploring {} ({} rows, date column '{}')",
        config.source,
        config
            .row_limit()
            .map_or_else(|| "all".to_string(), |n| n.to_string()),
        config.date_column
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 860.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Pickup Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(PickupExplorerApp::new(&config)))),
    )
    .map_err(|e| anyhow!("UI error: {e}"))
}
