//! Concurrent step execution.
//!
//! The scheduler is a work-scheduling loop, not a topological batch
//! executor: a step is spawned the moment its last prerequisite succeeds,
//! independent of unrelated branches' progress. The loop exclusively owns
//! the per-step status table; tasks report transitions over a channel, so
//! every status write is applied serially while readiness checks stay
//! race-free.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::error::BelayError;
use crate::logs::{LogSink, TracingSink};
use crate::pipeline::context::{StepCapture, StepContext};
use crate::pipeline::graph::StepGraph;
use crate::pipeline::report::{RunOutcome, RunReport, StepReport, StepStatus};
use crate::pipeline::step::ActionFn;

/// Options for executing a graph.
pub struct RunOptions {
    /// Maximum steps running at once (None = unbounded).
    pub concurrency: Option<usize>,

    /// Sink receiving per-step process output.
    pub sink: Arc<dyn LogSink>,

    /// Token that cancels the run cooperatively.
    pub cancel: CancellationToken,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: None,
            sink: Arc::new(TracingSink),
            cancel: CancellationToken::new(),
        }
    }
}

impl RunOptions {
    /// Bound the number of concurrently running steps.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit);
        self
    }

    /// Replace the log sink.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Use an externally controlled cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Transition reported by a step task to the scheduler loop.
enum StepEvent {
    Started(String),
    Finished(String, crate::Result<()>),
}

/// Mutable execution record for one step.
struct ExecEntry {
    status: StepStatus,
    aggregator: bool,
    /// Prerequisites not yet succeeded.
    remaining: usize,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    error: Option<String>,
    capture: Option<StepCapture>,
}

/// The scheduler loop's view of the run.
struct RunState {
    entries: BTreeMap<String, ExecEntry>,
    dependents: BTreeMap<String, BTreeSet<String>>,
    terminal: usize,
}

impl RunState {
    fn all_terminal(&self) -> bool {
        self.terminal == self.entries.len()
    }

    fn is_terminal(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_none_or(|e| e.status.is_terminal())
    }

    fn mark_running(&mut self, name: &str) {
        if let Some(entry) = self.entries.get_mut(name) {
            if entry.status == StepStatus::Ready {
                entry.status = StepStatus::Running;
                entry.started_at = Some(Utc::now());
            }
        }
    }

    /// Decrement dependents' prerequisite counts; return the names that
    /// just became ready.
    fn on_prerequisite_done(&mut self, name: &str) -> Vec<String> {
        let mut unblocked = Vec::new();
        let Some(dependents) = self.dependents.get(name) else {
            return unblocked;
        };
        for dependent in dependents {
            if let Some(entry) = self.entries.get_mut(dependent.as_str()) {
                if entry.status != StepStatus::Pending {
                    continue;
                }
                entry.remaining = entry.remaining.saturating_sub(1);
                if entry.remaining == 0 {
                    unblocked.push(dependent.clone());
                }
            }
        }
        unblocked
    }

    fn record_success(&mut self, name: &str) -> Vec<String> {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.status = StepStatus::Succeeded;
            entry.finished_at = Some(Utc::now());
            self.terminal += 1;
        }
        self.on_prerequisite_done(name)
    }

    fn record_failure(&mut self, name: &str, message: String) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.status = StepStatus::Failed;
            entry.finished_at = Some(Utc::now());
            entry.error = Some(message);
            self.terminal += 1;
        }
    }

    /// Transitively mark everything reachable from `from` as not runnable.
    ///
    /// Ordinary steps end `Skipped`; aggregators end `Failed`, since they
    /// report the outcome of their phase. Only `Pending` steps are touched:
    /// anything already spawned had all prerequisites succeed, so it cannot
    /// be downstream of `from`.
    fn cascade_skip(&mut self, from: &str) {
        let mut stack = vec![from.to_string()];
        while let Some(current) = stack.pop() {
            let Some(dependents) = self.dependents.get(&current) else {
                continue;
            };
            for dependent in dependents {
                let Some(entry) = self.entries.get_mut(dependent.as_str()) else {
                    continue;
                };
                if entry.status != StepStatus::Pending {
                    continue;
                }
                if entry.aggregator {
                    entry.status = StepStatus::Failed;
                    entry.error =
                        Some(format!("prerequisite '{}' did not succeed", current));
                } else {
                    entry.status = StepStatus::Skipped;
                }
                self.terminal += 1;
                stack.push(dependent.clone());
            }
        }
    }

    /// Cancellation: everything that has not started ends `Skipped`.
    fn skip_all_pending(&mut self) {
        for entry in self.entries.values_mut() {
            if matches!(entry.status, StepStatus::Pending | StepStatus::Ready) {
                entry.status = StepStatus::Skipped;
                self.terminal += 1;
            }
        }
    }
}

/// Launch every queued step whose prerequisites are satisfied.
///
/// Aggregators complete inline; ordinary steps are spawned as tasks that
/// report back over `tx`. An aggregator completing can unblock more steps,
/// which are pushed back onto the queue.
fn drain_ready(
    queue: &mut VecDeque<String>,
    state: &mut RunState,
    actions: &mut HashMap<String, ActionFn>,
    tx: &UnboundedSender<StepEvent>,
    semaphore: &Option<Arc<Semaphore>>,
    sink: &Arc<dyn LogSink>,
    cancel: &CancellationToken,
) {
    while let Some(name) = queue.pop_front() {
        let Some(entry) = state.entries.get_mut(&name) else {
            continue;
        };
        if entry.status != StepStatus::Pending {
            continue;
        }

        if entry.aggregator {
            let now = Utc::now();
            entry.status = StepStatus::Succeeded;
            entry.started_at = Some(now);
            entry.finished_at = Some(now);
            state.terminal += 1;
            tracing::info!(phase = %name, "phase completed successfully");
            let unblocked = state.on_prerequisite_done(&name);
            queue.extend(unblocked);
            continue;
        }

        entry.status = StepStatus::Ready;
        let ctx = StepContext::new(&name, Arc::clone(sink), cancel.clone());
        entry.capture = Some(ctx.capture());
        let action = actions
            .remove(&name)
            .expect("non-aggregator step carries an action");

        let tx = tx.clone();
        let semaphore = semaphore.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let _permit = match semaphore {
                Some(s) => match s.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => {
                        let _ = tx.send(StepEvent::Finished(
                            ctx.name().to_string(),
                            Err(BelayError::Cancelled),
                        ));
                        return;
                    }
                },
                None => None,
            };
            if cancel.is_cancelled() {
                let _ = tx.send(StepEvent::Finished(
                    ctx.name().to_string(),
                    Err(BelayError::Cancelled),
                ));
                return;
            }

            let name = ctx.name().to_string();
            let _ = tx.send(StepEvent::Started(name.clone()));
            let result = action(ctx).await;
            let _ = tx.send(StepEvent::Finished(name, result));
        });
    }
}

/// Executes a sealed [`StepGraph`] to completion or cancellation.
///
/// Each graph is executed by exactly one scheduler run; `execute` consumes
/// the graph, so per-step execution state can never be shared between runs.
pub struct Scheduler {
    options: RunOptions,
}

impl Scheduler {
    /// Create a scheduler with the given options.
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Run the graph. Never returns early on step failures: independent
    /// branches keep executing, and the report covers every step.
    pub async fn execute(self, graph: StepGraph) -> RunReport {
        let RunOptions {
            concurrency,
            sink,
            cancel,
        } = self.options;
        let start = Instant::now();

        let StepGraph {
            steps,
            dependencies,
            dependents,
        } = graph;

        let mut actions: HashMap<String, ActionFn> = HashMap::new();
        let mut entries: BTreeMap<String, ExecEntry> = BTreeMap::new();
        for (name, step) in steps {
            let aggregator = step.is_aggregator();
            if let Some(action) = step.action {
                actions.insert(name.clone(), action);
            }
            let remaining = dependencies.get(&name).map_or(0, BTreeSet::len);
            entries.insert(
                name,
                ExecEntry {
                    status: StepStatus::Pending,
                    aggregator,
                    remaining,
                    started_at: None,
                    finished_at: None,
                    error: None,
                    capture: None,
                },
            );
        }

        let mut state = RunState {
            entries,
            dependents,
            terminal: 0,
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let semaphore = concurrency.map(|n| Arc::new(Semaphore::new(n.max(1))));

        let mut queue: VecDeque<String> = state
            .entries
            .iter()
            .filter(|(_, e)| e.remaining == 0)
            .map(|(name, _)| name.clone())
            .collect();
        drain_ready(
            &mut queue, &mut state, &mut actions, &tx, &semaphore, &sink, &cancel,
        );

        let mut cancelled = false;
        while !state.all_terminal() {
            tokio::select! {
                _ = cancel.cancelled(), if !cancelled => {
                    cancelled = true;
                    tracing::warn!("cancellation requested, skipping steps that have not started");
                    state.skip_all_pending();
                }
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    match event {
                        StepEvent::Started(name) => state.mark_running(&name),
                        StepEvent::Finished(name, result) => {
                            if state.is_terminal(&name) {
                                continue;
                            }
                            match result {
                                Ok(()) => {
                                    tracing::debug!(step = %name, "step succeeded");
                                    queue.extend(state.record_success(&name));
                                    drain_ready(
                                        &mut queue, &mut state, &mut actions,
                                        &tx, &semaphore, &sink, &cancel,
                                    );
                                }
                                Err(err) => {
                                    tracing::error!(step = %name, error = %err, "step failed");
                                    state.record_failure(&name, err.to_string());
                                    state.cascade_skip(&name);
                                }
                            }
                        }
                    }
                }
            }
        }

        let outcome = if cancelled {
            RunOutcome::Cancelled
        } else if state
            .entries
            .values()
            .any(|e| e.status == StepStatus::Failed)
        {
            RunOutcome::Failed
        } else {
            RunOutcome::Succeeded
        };

        let steps = state
            .entries
            .into_iter()
            .map(|(name, entry)| {
                let (stdout, stderr, exit_code) = entry
                    .capture
                    .map(|c| c.snapshot())
                    .unwrap_or_default();
                StepReport {
                    name,
                    status: entry.status,
                    started_at: entry.started_at,
                    finished_at: entry.finished_at,
                    exit_code,
                    stdout,
                    stderr,
                    error: entry.error,
                }
            })
            .collect();

        RunReport {
            outcome,
            duration: start.elapsed(),
            steps,
        }
    }
}
