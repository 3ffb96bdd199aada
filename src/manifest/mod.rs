//! `belay.yml` loading, parsing, and validation.
//!
//! The manifest is the collaborator that describes the application
//! topology: which components exist, where they live, and which lint/test
//! tools they run. The pipeline core never reads it directly; the CLI
//! turns it into resource contexts and step sources.

pub mod loader;
pub mod schema;

pub use loader::{find_manifest, load_manifest, MANIFEST_FILE};
pub use schema::{ComponentConfig, ComponentKind, Manifest, TestCommand, ToolCommand};
