//! frappe-report - task activity reports from a Frappe site
//!
//! Fetches projects, tasks and comments, filters them and writes a
//! project → task tree → comment JSON report.

use clap::Parser;
use frappe_report::cli::Cli;
use frappe_report::output::{emit_error, infer_command_name_from_args};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let command = infer_command_name_from_args();
    let cli = Cli::parse();

    // Tracing is opt-in via RUST_LOG or --verbose.
    // Keep startup robust in CI/robot envs: ignore invalid/huge filters.
    let filter = if cli.verbose {
        EnvFilter::new("frappe_report=debug")
    } else {
        std::env::var("RUST_LOG")
            .ok()
            .and_then(|raw| {
                let raw = raw.trim();
                if raw.is_empty() || raw.len() > 4096 {
                    return None;
                }
                EnvFilter::try_new(raw).ok()
            })
            .unwrap_or_else(|| EnvFilter::new("off"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
