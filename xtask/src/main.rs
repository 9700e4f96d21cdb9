use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cargo nextest with default configuration
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Generate a deterministic sample event log
    GenLog {
        /// Output path for the log
        #[arg(long, default_value = "sample.log")]
        out: PathBuf,
        /// Number of trace lines to emit
        #[arg(long, default_value_t = 200)]
        traces: usize,
        /// Seed for the generator
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest { profile, release } => run_nextest(profile, release)?,
        Commands::GenLog { out, traces, seed } => gen_log(&out, traces, seed)?,
    }
    Ok(())
}

fn run_nextest(profile: Option<String>, release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("nextest").arg("run");
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if release {
        cmd.arg("--release");
    }
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("cargo nextest run failed");
    }
    Ok(())
}

/// Trace shapes for the sample order process, with relative weights.
const SHAPES: &[(&[&str], u64)] = &[
    (&["receive", "check", "pay", "ship"], 5),
    (&["receive", "check", "reject"], 2),
    (&["receive", "pay", "check", "ship"], 2),
    (&["receive", "cancel"], 1),
];

fn gen_log(out: &PathBuf, traces: usize, seed: u64) -> Result<()> {
    let total: u64 = SHAPES.iter().map(|(_, weight)| weight).sum();
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        state >> 33
    };

    let mut buffer = String::from("# generated sample log\n");
    for _ in 0..traces {
        let mut pick = next() % total;
        let shape = SHAPES
            .iter()
            .find(|(_, weight)| {
                if pick < *weight {
                    true
                } else {
                    pick -= weight;
                    false
                }
            })
            .map(|(shape, _)| *shape)
            .unwrap_or(SHAPES[0].0);
        let count = next() % 4 + 1;
        buffer.push_str(&format!("{count}x {}\n", shape.join(" ")));
    }

    fs::write(out, buffer).with_context(|| format!("failed to write {}", out.display()))?;
    println!("wrote {} traces to {}", traces, out.display());
    Ok(())
}
