//! Command-line interface and argument parsing.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, GraphArgs, RunArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
