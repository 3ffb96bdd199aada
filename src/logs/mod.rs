//! Log sinks for per-step process output.
//!
//! Every line an external command writes is attributed to the step that ran
//! it and to one of the two standard streams. Sinks receive lines in the
//! order they were read from each stream; ordering between the two streams
//! of one step, or between concurrently running steps, is not defined.

use std::sync::{Arc, Mutex};

/// Which standard stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogStream::Stdout => write!(f, "stdout"),
            LogStream::Stderr => write!(f, "stderr"),
        }
    }
}

/// Consumer of step output lines.
///
/// Implementations must be cheap: the process reader tasks call `line`
/// inline while draining the child's pipes.
pub trait LogSink: Send + Sync {
    fn line(&self, step: &str, stream: LogStream, line: &str);
}

/// Sink that forwards lines to the `tracing` subscriber.
///
/// Stdout lines are logged at INFO, stderr lines at WARN, mirroring how CI
/// logs usually color the two streams.
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn line(&self, step: &str, stream: LogStream, line: &str) {
        match stream {
            LogStream::Stdout => tracing::info!(step = %step, "{}", line),
            LogStream::Stderr => tracing::warn!(step = %step, "{}", line),
        }
    }
}

/// Sink that collects lines in memory.
///
/// Used by tests to assert on captured output; also backs `--quiet` runs
/// where output is only shown for failed steps.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(String, LogStream, String)>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All captured lines, in arrival order.
    pub fn lines(&self) -> Vec<(String, LogStream, String)> {
        self.lines.lock().expect("sink lock poisoned").clone()
    }

    /// Lines captured for one step and stream, in order.
    pub fn lines_for(&self, step: &str, stream: LogStream) -> Vec<String> {
        self.lines
            .lock()
            .expect("sink lock poisoned")
            .iter()
            .filter(|(s, st, _)| s == step && *st == stream)
            .map(|(_, _, l)| l.clone())
            .collect()
    }
}

impl LogSink for MemorySink {
    fn line(&self, step: &str, stream: LogStream, line: &str) {
        self.lines
            .lock()
            .expect("sink lock poisoned")
            .push((step.to_string(), stream, line.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_preserves_per_stream_order() {
        let sink = MemorySink::new();
        sink.line("build", LogStream::Stdout, "one");
        sink.line("build", LogStream::Stderr, "oops");
        sink.line("build", LogStream::Stdout, "two");
        sink.line("other", LogStream::Stdout, "unrelated");

        assert_eq!(
            sink.lines_for("build", LogStream::Stdout),
            vec!["one".to_string(), "two".to_string()]
        );
        assert_eq!(
            sink.lines_for("build", LogStream::Stderr),
            vec!["oops".to_string()]
        );
    }

    #[test]
    fn stream_displays_lowercase() {
        assert_eq!(LogStream::Stdout.to_string(), "stdout");
        assert_eq!(LogStream::Stderr.to_string(), "stderr");
    }
}
