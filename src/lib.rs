//! Belay - CI pipeline orchestration for multi-component repositories.
//!
//! Belay runs the install/lint/test phases of a repository made of several
//! loosely-coupled components (a Python service, a JavaScript frontend, ...).
//! Each component contributes named steps to a shared dependency graph; the
//! scheduler runs independent steps concurrently, holds dependent steps back
//! until their predecessors succeed, and skips everything downstream of a
//! failure without aborting unrelated branches.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`error`] - Error types and result aliases
//! - [`logs`] - Log sinks for per-step process output
//! - [`manifest`] - `belay.yml` loading, parsing, and validation
//! - [`pipeline`] - Step graph construction and concurrent execution
//! - [`process`] - External process execution with line streaming
//! - [`producers`] - Per-component step factories (Python, JavaScript)
//!
//! # Example
//!
//! ```
//! use belay::pipeline::{PipelineBuilder, Step};
//!
//! let mut builder = PipelineBuilder::new();
//! builder.add_step(
//!     Step::new("install-app", |_ctx| async { Ok(()) }).required_by("install"),
//! );
//! let graph = builder.build().unwrap();
//! assert!(graph.contains("install-app"));
//! ```
//!
//! For end-to-end execution, see the integration tests.

pub mod cli;
pub mod error;
pub mod logs;
pub mod manifest;
pub mod pipeline;
pub mod process;
pub mod producers;

pub use error::{BelayError, Result};
