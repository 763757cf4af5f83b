//! Vellum CLI
//!
//! Detects, fills and harvests `{{NAME}}` placeholders in Quill Delta
//! documents and proposal templates.
//!
//! ## Usage
//!
//! ```bash
//! vellum detect template.delta.json
//! vellum transform body.json --placeholders defs.json --values values.json
//! vellum fill template.json --client "Acme Corp" --derived-ids -o proposal.json
//! vellum harvest proposal-body.json
//! vellum flatten proposal-body.json
//! vellum prepare template.json
//! ```
//!
//! Output is JSON on stdout (or `--output`); logs go to stderr. `RUST_LOG`
//! overrides the configured `log_filter`.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::Command;
use crate::config::Config;

/// Placeholder tooling for Vellum proposal templates.
#[derive(Parser, Debug)]
#[command(name = "vellum", version)]
#[command(about = "Detect, fill and harvest {{NAME}} placeholders in Delta documents")]
struct Args {
    /// Config file (default: ~/.config/vellum/vellum.ron)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write JSON output here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("vellum: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(?config, "loaded config");

    match commands::run(args.command, &config, args.output.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
