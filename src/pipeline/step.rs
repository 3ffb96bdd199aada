//! Step and edge definitions.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::pipeline::context::StepContext;

/// Well-known phase aggregator names.
///
/// These steps always exist: [`PipelineBuilder`](crate::pipeline::PipelineBuilder)
/// seeds them, so producers can declare `required_by` edges against them
/// without coordinating with anyone.
pub mod phases {
    pub const INSTALL: &str = "install";
    pub const LINT: &str = "lint";
    pub const TEST: &str = "test";

    /// All well-known phases, in display order.
    pub const ALL: [&str; 3] = [INSTALL, LINT, TEST];
}

/// Boxed future returned by a step action.
pub type ActionFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// A step's unit of work. Consumed on execution; steps run at most once.
pub(crate) type ActionFn = Box<dyn FnOnce(StepContext) -> ActionFuture + Send>;

/// An atomic, named unit of pipeline work.
///
/// Ordering is declared with two kinds of edges:
///
/// - `depends_on("x")`: this step may not start until `x` has succeeded.
/// - `required_by("x")`: `x` may not be considered complete until this step
///   has succeeded - the inverse spelling, letting a step insert itself
///   before a phase it does not own.
///
/// Both spellings are normalized into one edge direction at build time.
pub struct Step {
    pub(crate) name: String,
    pub(crate) depends_on: BTreeSet<String>,
    pub(crate) required_by: BTreeSet<String>,
    pub(crate) action: Option<ActionFn>,
}

impl Step {
    /// Create a step with an async action.
    pub fn new<F, Fut>(name: impl Into<String>, action: F) -> Self
    where
        F: FnOnce(StepContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            depends_on: BTreeSet::new(),
            required_by: BTreeSet::new(),
            action: Some(Box::new(move |ctx| Box::pin(action(ctx)))),
        }
    }

    /// Create an action-less join point.
    ///
    /// An aggregator succeeds once every step that declared itself
    /// `required_by` it has succeeded; it performs no work of its own.
    pub fn aggregator(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depends_on: BTreeSet::new(),
            required_by: BTreeSet::new(),
            action: None,
        }
    }

    /// Require `step` to succeed before this step starts.
    pub fn depends_on(mut self, step: impl Into<String>) -> Self {
        self.depends_on.insert(step.into());
        self
    }

    /// Insert this step as a prerequisite of `step`.
    pub fn required_by(mut self, step: impl Into<String>) -> Self {
        self.required_by.insert(step.into());
        self
    }

    /// The step's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is an action-less join point.
    pub fn is_aggregator(&self) -> bool {
        self.action.is_none()
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("depends_on", &self.depends_on)
            .field("required_by", &self.required_by)
            .field("aggregator", &self.is_aggregator())
            .finish()
    }
}
