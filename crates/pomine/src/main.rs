use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use pomine::app::coordinator::MiningStrategy;
use pomine::app::export::{BatchRequest, run_batch};
use pomine::app::selection::{IndexSpec, SelectionMode};
use pomine::infra::config::Config;
use pomine::ui::app::{UiApp, UiOptions};

/// Interactive partial-order miner for event logs.
#[derive(Debug, Parser)]
#[command(name = "pomine", version, about)]
struct Cli {
    /// Event log to open.
    log: Option<PathBuf>,

    /// Selection mode: explicit, threshold, or threshold-overrides.
    #[arg(long)]
    mode: Option<String>,

    /// Mining strategy: full or incremental.
    #[arg(long)]
    strategy: Option<String>,

    /// Mine once, write the model to PATH, and exit without opening the UI.
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Fragment subset for --export: all, none, or a list such as 0,2-4.
    #[arg(long, value_name = "SPEC")]
    select: Option<String>,

    /// Reload the log automatically when it changes on disk.
    #[arg(long)]
    watch: bool,
}

fn main() -> Result<()> {
    pomine::init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let mode: SelectionMode = match cli.mode.as_deref() {
        Some(raw) => raw.parse()?,
        None => config.selection_mode()?,
    };
    let strategy: MiningStrategy = match cli.strategy.as_deref() {
        Some(raw) => raw.parse()?,
        None => config.mining_strategy()?,
    };

    if let Some(output) = cli.export.as_deref() {
        let log_path = cli
            .log
            .as_deref()
            .context("--export requires an event log argument")?;
        let spec: IndexSpec = match cli.select.as_deref() {
            Some(raw) => raw.parse().context("invalid --select value")?,
            None => IndexSpec::All,
        };
        let summary = run_batch(
            &config,
            &BatchRequest {
                log_path,
                output: Some(output),
                spec,
                strategy,
            },
        )?;
        println!(
            "mined {} of {} fragments: {} places, {} transitions, {} arcs",
            summary.selected, summary.fragments, summary.places, summary.transitions, summary.arcs
        );
        println!("wrote {}", summary.export.path.display());
        return Ok(());
    }

    let mut app = UiApp::new(
        config,
        UiOptions {
            log: cli.log,
            watch: cli.watch,
            mode,
            strategy,
        },
    )?;
    app.run()
}
