//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Belay - CI pipeline orchestration for multi-component repositories.
#[derive(Debug, Parser)]
#[command(name = "belay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to manifest file (overrides default ./belay.yml)
    #[arg(short, long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the pipeline (default if no command specified)
    Run(RunArgs),

    /// Print the validated step graph without running anything
    Graph(GraphArgs),
}

/// Arguments for the run command.
#[derive(Debug, Args, Default)]
pub struct RunArgs {
    /// Maximum number of steps running at once
    #[arg(short = 'j', long, env = "BELAY_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the graph command.
#[derive(Debug, Args, Default)]
pub struct GraphArgs {
    /// Print the graph as JSON
    #[arg(long)]
    pub json: bool,
}
