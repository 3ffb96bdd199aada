//! Deferred step production.
//!
//! Producers do not hand the builder finished steps directly when the steps
//! depend on resource metadata; they register a [`StepSource`] bound to a
//! [`ResourceContext`] instead. Sources are expanded at `build()` time, so a
//! producer never sees the final graph or any other producer's steps.

use std::path::PathBuf;

use crate::pipeline::step::Step;

/// Resource-scoped metadata a step source produces steps from.
///
/// Produced by the manifest layer (or any embedding application); the
/// pipeline core only reads these fields.
#[derive(Debug, Clone)]
pub struct ResourceContext {
    /// Component name, used to derive step names (`install-<name>`, ...).
    pub name: String,

    /// Directory commands for this component run in.
    pub working_directory: PathBuf,

    /// Package manager executable, when the component has one.
    pub package_manager: Option<String>,
}

impl ResourceContext {
    /// Create a context for a named component rooted at `working_directory`.
    pub fn new(name: impl Into<String>, working_directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            working_directory: working_directory.into(),
            package_manager: None,
        }
    }

    /// Set the package manager executable.
    pub fn with_package_manager(mut self, package_manager: impl Into<String>) -> Self {
        self.package_manager = Some(package_manager.into());
        self
    }
}

/// A deferred producer of steps for one resource.
///
/// Consumed exactly once at graph build time. Closures of type
/// `FnOnce(&ResourceContext) -> Vec<Step>` implement this trait, which is
/// the common case; implement it by hand only when the source carries
/// state worth naming.
pub trait StepSource: Send {
    /// Produce this source's steps for `resource`.
    fn produce(self: Box<Self>, resource: &ResourceContext) -> Vec<Step>;
}

impl<F> StepSource for F
where
    F: FnOnce(&ResourceContext) -> Vec<Step> + Send,
{
    fn produce(self: Box<Self>, resource: &ResourceContext) -> Vec<Step> {
        self(resource)
    }
}
