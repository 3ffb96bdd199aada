//! External process execution with line streaming.
//!
//! One function, [`run`], does the work: spawn the command, drain stdout and
//! stderr concurrently into a [`LogSink`], wait for exit, and report the
//! captured output with the exit code. Command resolution (shells, PATH
//! tricks) is the caller's concern; the command is executed as given.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{BelayError, Result};
use crate::logs::{LogSink, LogStream};

/// A command to execute: program, arguments, working directory.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    /// Program to run (resolved via PATH by the OS).
    pub command: String,

    /// Arguments, passed verbatim.
    pub args: Vec<String>,

    /// Working directory for the child.
    pub cwd: PathBuf,
}

impl ProcessSpec {
    /// Create a new spec.
    pub fn new(
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
        }
    }

    /// Render the command line for error messages and logs.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Result of executing an external process.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Captured stdout lines, in order.
    pub stdout: Vec<String>,

    /// Captured stderr lines, in order.
    pub stderr: Vec<String>,

    /// Execution duration.
    pub duration: Duration,

    /// Whether the process exited with code 0.
    pub success: bool,
}

/// Spawn a reader task that streams one pipe line-by-line into the sink
/// while collecting the lines for the step's report.
fn spawn_reader(
    reader: impl AsyncRead + Unpin + Send + 'static,
    step: String,
    stream: LogStream,
    sink: Arc<dyn LogSink>,
) -> JoinHandle<Vec<String>> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        let mut captured = Vec::new();
        while let Ok(Some(line)) = lines.next_line().await {
            sink.line(&step, stream, &line);
            captured.push(line);
        }
        captured
    })
}

/// Execute a process to completion, streaming output to `sink`.
///
/// Returns `Ok` with `success = false` on a non-zero exit; the caller
/// decides how that fails the owning step. A process that cannot be
/// spawned at all returns [`BelayError::LaunchFailed`].
///
/// When `cancel` fires the child is killed best-effort and the call
/// returns [`BelayError::Cancelled`]. Both reader tasks are joined before
/// returning on every path, so reported output is always fully flushed.
pub async fn run(
    spec: &ProcessSpec,
    step: &str,
    sink: Arc<dyn LogSink>,
    cancel: CancellationToken,
) -> Result<ProcessResult> {
    let start = Instant::now();

    let mut cmd = Command::new(&spec.command);
    cmd.args(&spec.args)
        .current_dir(&spec.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| BelayError::LaunchFailed {
        command: spec.display(),
        message: e.to_string(),
    })?;

    let stdout = child.stdout.take().unwrap();
    let stderr = child.stderr.take().unwrap();

    let stdout_task = spawn_reader(stdout, step.to_string(), LogStream::Stdout, Arc::clone(&sink));
    let stderr_task = spawn_reader(stderr, step.to_string(), LogStream::Stderr, sink);

    let status = tokio::select! {
        status = child.wait() => status.map_err(|e| BelayError::LaunchFailed {
            command: spec.display(),
            message: e.to_string(),
        })?,
        _ = cancel.cancelled() => {
            child.start_kill().ok();
            let _ = child.wait().await;
            let _ = stdout_task.await;
            let _ = stderr_task.await;
            return Err(BelayError::Cancelled);
        }
    };

    // The pipes close once the child exits; the readers finish on EOF.
    let stdout_lines = stdout_task.await.unwrap_or_default();
    let stderr_lines = stderr_task.await.unwrap_or_default();

    Ok(ProcessResult {
        exit_code: status.code(),
        stdout: stdout_lines,
        stderr: stderr_lines,
        duration: start.elapsed(),
        success: status.success(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::MemorySink;

    fn spec(script: &str) -> ProcessSpec {
        ProcessSpec::new("sh", ["-c", script], std::env::temp_dir())
    }

    #[test]
    fn display_joins_command_and_args() {
        let s = ProcessSpec::new("uv", ["sync", "--all-groups"], "/tmp");
        assert_eq!(s.display(), "uv sync --all-groups");
        let bare = ProcessSpec::new("uv", Vec::<String>::new(), "/tmp");
        assert_eq!(bare.display(), "uv");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_both_streams_in_order() {
        let sink = MemorySink::new();
        let result = run(
            &spec("echo one; echo two 1>&2; echo three; exit 1"),
            "demo",
            sink.clone(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(1));
        assert_eq!(result.stdout, vec!["one", "three"]);
        assert_eq!(result.stderr, vec!["two"]);
        assert_eq!(
            sink.lines_for("demo", LogStream::Stdout),
            vec!["one".to_string(), "three".to_string()]
        );
        assert_eq!(
            sink.lines_for("demo", LogStream::Stderr),
            vec!["two".to_string()]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success() {
        let result = run(
            &spec("echo done"),
            "demo",
            MemorySink::new(),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, vec!["done"]);
    }

    #[tokio::test]
    async fn missing_executable_is_launch_failed() {
        let spec = ProcessSpec::new(
            "definitely-not-a-real-binary-4242",
            Vec::<String>::new(),
            std::env::temp_dir(),
        );
        let err = run(
            &spec,
            "demo",
            MemorySink::new(),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BelayError::LaunchFailed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancellation_kills_the_child() {
        let cancel = CancellationToken::new();
        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                run(&spec("sleep 30"), "demo", MemorySink::new(), cancel).await
            })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();

        let started = Instant::now();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(BelayError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
