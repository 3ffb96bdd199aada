//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::cli::args::{Commands, RunArgs};
use crate::error::Result;

use super::graph::GraphCommand;
use super::run::RunCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
#[async_trait]
pub trait Command {
    /// Execute the command.
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    async fn execute(&self) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    manifest_path: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            project_root,
            manifest_path: None,
        }
    }

    /// Override the manifest location.
    pub fn with_manifest(mut self, manifest_path: Option<PathBuf>) -> Self {
        self.manifest_path = manifest_path;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Route a parsed subcommand to its implementation.
    ///
    /// No subcommand means `run`, matching `belay` invoked bare.
    pub async fn dispatch(&self, command: Option<Commands>) -> Result<CommandResult> {
        match command.unwrap_or(Commands::Run(RunArgs::default())) {
            Commands::Run(args) => {
                RunCommand::new(&self.project_root, self.manifest_path.clone(), args)
                    .execute()
                    .await
            }
            Commands::Graph(args) => {
                GraphCommand::new(&self.project_root, self.manifest_path.clone(), args)
                    .execute()
                    .await
            }
        }
    }
}
