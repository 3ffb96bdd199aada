//! Run reports.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Status of a step during and after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step is waiting on unresolved prerequisites.
    Pending,

    /// All prerequisites succeeded; the step is queued to run.
    Ready,

    /// Step is currently executing.
    Running,

    /// Step completed successfully.
    Succeeded,

    /// Step failed (its own action, or a prerequisite of an aggregator).
    Failed,

    /// Step never ran because an ancestor failed or the run was cancelled.
    Skipped,
}

impl StepStatus {
    /// Check if this is a terminal state (no more changes expected).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Succeeded | StepStatus::Failed | StepStatus::Skipped
        )
    }

    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Pending => '○',
            StepStatus::Ready => '◌',
            StepStatus::Running => '◉',
            StepStatus::Succeeded => '✓',
            StepStatus::Failed => '✗',
            StepStatus::Skipped => '⊘',
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::Ready => "ready",
            StepStatus::Running => "running",
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// Overall outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// Every step succeeded.
    Succeeded,

    /// At least one step failed.
    Failed,

    /// The run was cancelled before completion.
    Cancelled,
}

/// Final record for one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Step name.
    pub name: String,

    /// Terminal status.
    pub status: StepStatus,

    /// When the step started running (None if it never ran).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the step reached a terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Exit code of the last process the step ran, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    /// Captured stdout lines, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stdout: Vec<String>,

    /// Captured stderr lines, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stderr: Vec<String>,

    /// Error message (if failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    /// Wall-clock time the step spent running.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => (end - start).to_std().ok(),
            _ => None,
        }
    }
}

/// Aggregate result of one pipeline run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Overall outcome.
    pub outcome: RunOutcome,

    /// Total wall-clock duration.
    pub duration: Duration,

    /// Per-step records, ordered by step name.
    pub steps: Vec<StepReport>,
}

impl RunReport {
    /// Whether every step succeeded.
    pub fn success(&self) -> bool {
        self.outcome == RunOutcome::Succeeded
    }

    /// Look up one step's record.
    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Steps that ended in the given status.
    pub fn with_status(&self, status: StepStatus) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(move |s| s.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(StepStatus::Succeeded.is_terminal());
        assert!(StepStatus::Failed.is_terminal());
        assert!(StepStatus::Skipped.is_terminal());
        assert!(!StepStatus::Pending.is_terminal());
        assert!(!StepStatus::Ready.is_terminal());
        assert!(!StepStatus::Running.is_terminal());
    }

    #[test]
    fn report_serializes_without_empty_fields() {
        let report = StepReport {
            name: "install-app".into(),
            status: StepStatus::Skipped,
            started_at: None,
            finished_at: None,
            exit_code: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            error: None,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"status\":\"skipped\""));
        assert!(!json.contains("exit_code"));
        assert!(!json.contains("stdout"));
    }

    #[test]
    fn duration_requires_both_timestamps() {
        let mut report = StepReport {
            name: "x".into(),
            status: StepStatus::Succeeded,
            started_at: Some(Utc::now()),
            finished_at: None,
            exit_code: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            error: None,
        };
        assert!(report.duration().is_none());
        report.finished_at = Some(report.started_at.unwrap() + chrono::Duration::seconds(2));
        assert_eq!(report.duration(), Some(Duration::from_secs(2)));
    }
}
