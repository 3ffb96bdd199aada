//! Execution-time context handed to step actions.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::error::{BelayError, Result};
use crate::logs::LogSink;
use crate::process::{self, ProcessResult, ProcessSpec};

/// Shared capture slot for a step's process output.
///
/// The scheduler keeps a clone so it can fold the captured lines and exit
/// code into the step's report after the action finishes.
#[derive(Debug, Clone, Default)]
pub struct StepCapture {
    inner: Arc<Mutex<CaptureInner>>,
}

#[derive(Debug, Default)]
struct CaptureInner {
    stdout: Vec<String>,
    stderr: Vec<String>,
    exit_code: Option<i32>,
}

impl StepCapture {
    pub(crate) fn record(&self, result: &ProcessResult) {
        let mut inner = self.inner.lock().expect("capture lock poisoned");
        inner.stdout.extend(result.stdout.iter().cloned());
        inner.stderr.extend(result.stderr.iter().cloned());
        inner.exit_code = result.exit_code;
    }

    /// Snapshot as (stdout, stderr, exit code).
    pub(crate) fn snapshot(&self) -> (Vec<String>, Vec<String>, Option<i32>) {
        let inner = self.inner.lock().expect("capture lock poisoned");
        (inner.stdout.clone(), inner.stderr.clone(), inner.exit_code)
    }
}

/// Context a step action runs with.
///
/// Cloneable; all clones share the same capture slot and cancellation
/// token. Actions that shell out should do so through
/// [`run_process`](Self::run_process) so output lands in the step's report.
#[derive(Clone)]
pub struct StepContext {
    name: Arc<str>,
    sink: Arc<dyn LogSink>,
    cancel: CancellationToken,
    capture: StepCapture,
}

impl StepContext {
    pub(crate) fn new(name: &str, sink: Arc<dyn LogSink>, cancel: CancellationToken) -> Self {
        Self {
            name: Arc::from(name),
            sink,
            cancel,
            capture: StepCapture::default(),
        }
    }

    /// Name of the owning step.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token fired when the run is cancelled. Long-running custom actions
    /// should poll this to stay cooperative.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn capture(&self) -> StepCapture {
        self.capture.clone()
    }

    /// Emit an informational line attributed to this step.
    pub fn info(&self, message: &str) {
        tracing::info!(step = %self.name, "{}", message);
    }

    /// Run an external command in `cwd`, streaming output to the run's log
    /// sink and recording it for the step's report.
    ///
    /// Fails the step on launch errors and on non-zero exit codes.
    pub async fn run_process(
        &self,
        command: &str,
        args: impl IntoIterator<Item = impl Into<String>>,
        cwd: impl Into<PathBuf>,
    ) -> Result<()> {
        let spec = ProcessSpec::new(command, args, cwd);
        tracing::debug!(step = %self.name, command = %spec.display(), "running");

        let result = process::run(&spec, &self.name, Arc::clone(&self.sink), self.cancel.clone())
            .await?;
        self.capture.record(&result);

        if result.success {
            Ok(())
        } else {
            Err(BelayError::CommandFailed {
                command: spec.display(),
                code: result.exit_code,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::MemorySink;

    #[cfg(unix)]
    #[tokio::test]
    async fn run_process_records_capture_and_fails_on_nonzero() {
        let ctx = StepContext::new("demo", MemorySink::new(), CancellationToken::new());

        let err = ctx
            .run_process("sh", ["-c", "echo captured; exit 3"], std::env::temp_dir())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BelayError::CommandFailed { code: Some(3), .. }
        ));

        let (stdout, _stderr, exit_code) = ctx.capture().snapshot();
        assert_eq!(stdout, vec!["captured"]);
        assert_eq!(exit_code, Some(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn capture_accumulates_across_runs() {
        let ctx = StepContext::new("demo", MemorySink::new(), CancellationToken::new());
        let dir = std::env::temp_dir();

        ctx.run_process("sh", ["-c", "echo first"], &dir).await.unwrap();
        ctx.run_process("sh", ["-c", "echo second"], &dir).await.unwrap();

        let (stdout, _, exit_code) = ctx.capture().snapshot();
        assert_eq!(stdout, vec!["first", "second"]);
        assert_eq!(exit_code, Some(0));
    }
}
