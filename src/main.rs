//! Belay CLI entry point.

use std::process::ExitCode;

use belay::cli::{Cli, CommandDispatcher};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug`/`--verbose` flags set level to DEBUG
/// 2. `--quiet` raises the threshold to WARN
/// 3. `RUST_LOG` environment variable (if set)
/// 4. Default is INFO
fn init_tracing(debug: bool, quiet: bool) {
    let filter = if debug {
        EnvFilter::new("belay=debug")
    } else if quiet {
        EnvFilter::new("belay=warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("belay=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug || cli.verbose, cli.quiet);

    tracing::debug!("Belay starting with args: {:?}", cli);

    if cli.no_color {
        console::set_colors_enabled(false);
    }

    // Determine project root
    let project_root = cli
        .project
        .as_ref()
        .cloned()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let dispatcher = CommandDispatcher::new(project_root).with_manifest(cli.manifest.clone());

    match dispatcher.dispatch(cli.command).await {
        Ok(result) => {
            if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(result.exit_code.clamp(1, 255) as u8)
            }
        }
        Err(err) => {
            eprintln!("{} {}", console::style("error:").red().bold(), err);
            ExitCode::from(2)
        }
    }
}
