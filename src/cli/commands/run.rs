//! Run command implementation.
//!
//! The `belay run` command builds the pipeline from the manifest and
//! executes it to completion or first cancellation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use console::style;
use tokio_util::sync::CancellationToken;

use crate::cli::args::RunArgs;
use crate::error::Result;
use crate::manifest;
use crate::pipeline::{
    PipelineBuilder, RunOptions, RunReport, Scheduler, StepReport, StepStatus,
};
use crate::producers;

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    manifest_path: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project_root: &Path, manifest_path: Option<PathBuf>, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            manifest_path,
            args,
        }
    }
}

#[async_trait]
impl Command for RunCommand {
    async fn execute(&self) -> Result<CommandResult> {
        let (manifest_path, manifest) =
            manifest::loader::resolve(&self.project_root, self.manifest_path.as_deref())?;
        tracing::debug!(manifest = %manifest_path.display(), "loaded manifest");

        let mut builder = PipelineBuilder::new();
        producers::register_components(&mut builder, &manifest, &self.project_root)?;
        let graph = builder.build()?;
        tracing::info!(steps = graph.len(), "pipeline built");

        // First interrupt cancels the run cooperatively; running commands
        // are killed and pending steps are skipped.
        let cancel = CancellationToken::new();
        {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received, cancelling run");
                    cancel.cancel();
                }
            });
        }

        let mut options = RunOptions::default().with_cancel(cancel);
        if let Some(limit) = self.args.concurrency.or(manifest.concurrency) {
            options = options.with_concurrency(limit);
        }

        let report = Scheduler::new(options).execute(graph).await;

        if self.args.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?
            );
        } else {
            print_summary(&report);
        }

        Ok(if report.success() {
            CommandResult::success()
        } else {
            CommandResult::failure(1)
        })
    }
}

/// Render a human-readable run summary.
fn print_summary(report: &RunReport) {
    println!();
    for step in &report.steps {
        print_step_line(step);
    }

    let succeeded = report.with_status(StepStatus::Succeeded).count();
    let failed = report.with_status(StepStatus::Failed).count();
    let skipped = report.with_status(StepStatus::Skipped).count();

    let mut parts = vec![format!("{succeeded} succeeded")];
    if failed > 0 {
        parts.push(format!("{failed} failed"));
    }
    if skipped > 0 {
        parts.push(format!("{skipped} skipped"));
    }
    println!(
        "\n  {} in {}",
        parts.join(", "),
        format_duration(report.duration)
    );
}

fn print_step_line(step: &StepReport) {
    let marker = match step.status {
        StepStatus::Succeeded => style(step.status.display_char()).green(),
        StepStatus::Failed => style(step.status.display_char()).red(),
        StepStatus::Skipped => style(step.status.display_char()).dim(),
        _ => style(step.status.display_char()),
    };

    let duration = step
        .duration()
        .map(|d| format!(" ({})", format_duration(d)))
        .unwrap_or_default();
    println!("  {} {}{}", marker, step.name, style(duration).dim());

    if step.status == StepStatus::Failed {
        if let Some(error) = &step.error {
            println!("      {}", style(error).red());
        }
        // Last stderr lines usually carry the actual diagnostic.
        for line in step.stderr.iter().rev().take(10).collect::<Vec<_>>().into_iter().rev() {
            println!("      {}", style(line).dim());
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        format!("{}m {}s", duration.as_secs() / 60, duration.as_secs() % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_picks_sensible_units() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(95)), "1m 35s");
    }
}
