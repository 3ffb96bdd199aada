//! Graph command implementation.
//!
//! The `belay graph` command builds and validates the pipeline from the
//! manifest, then prints the resolved step graph without running anything.
//! Build-time errors (duplicates, dangling references, cycles) surface
//! here the same way they would on `belay run`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use console::style;
use serde::Serialize;

use crate::cli::args::GraphArgs;
use crate::error::Result;
use crate::manifest;
use crate::pipeline::PipelineBuilder;
use crate::producers;

use super::dispatcher::{Command, CommandResult};

/// The graph command implementation.
pub struct GraphCommand {
    project_root: PathBuf,
    manifest_path: Option<PathBuf>,
    args: GraphArgs,
}

/// JSON shape for one step in `belay graph --json`.
#[derive(Debug, Serialize)]
struct GraphEntry {
    aggregator: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
}

impl GraphCommand {
    /// Create a new graph command.
    pub fn new(project_root: &Path, manifest_path: Option<PathBuf>, args: GraphArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            manifest_path,
            args,
        }
    }
}

#[async_trait]
impl Command for GraphCommand {
    async fn execute(&self) -> Result<CommandResult> {
        let (_, manifest) =
            manifest::loader::resolve(&self.project_root, self.manifest_path.as_deref())?;

        let mut builder = PipelineBuilder::new();
        producers::register_components(&mut builder, &manifest, &self.project_root)?;
        let graph = builder.build()?;

        if self.args.json {
            let entries: BTreeMap<&str, GraphEntry> = graph
                .step_names()
                .map(|name| {
                    (
                        name,
                        GraphEntry {
                            aggregator: graph.is_aggregator(name),
                            depends_on: graph
                                .dependencies_of(name)
                                .map(|deps| deps.iter().cloned().collect())
                                .unwrap_or_default(),
                        },
                    )
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&entries).map_err(anyhow::Error::from)?
            );
        } else {
            for name in graph.step_names() {
                let marker = if graph.is_aggregator(name) {
                    style("◆").cyan()
                } else {
                    style("·").dim()
                };
                let deps = graph
                    .dependencies_of(name)
                    .filter(|deps| !deps.is_empty())
                    .map(|deps| {
                        let names: Vec<&str> = deps.iter().map(String::as_str).collect();
                        format!("  <-  {}", names.join(", "))
                    })
                    .unwrap_or_default();
                println!("  {} {}{}", marker, name, style(deps).dim());
            }
        }

        Ok(CommandResult::success())
    }
}
