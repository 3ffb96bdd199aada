//! Manifest schema definitions.
//!
//! This module contains the struct definitions that map to the
//! `belay.yml` file format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{BelayError, Result};

/// Root structure for `belay.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Project name (for display purposes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Component definitions, keyed by component name.
    ///
    /// Ordered map: iteration order must not depend on declaration order
    /// hashing, so repeated builds wire the same graph.
    pub components: BTreeMap<String, ComponentConfig>,

    /// Default concurrency limit for runs (overridden by `--concurrency`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

/// One component of the application topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// What kind of component this is (decides which producer wires it).
    pub kind: ComponentKind,

    /// Component directory, relative to the project root.
    pub path: PathBuf,

    /// Package manager executable (JavaScript components). Detected from
    /// lockfiles when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,

    /// Extra arguments for the install step (`uv sync <args>` /
    /// `<pm> install <args>`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub install_args: Vec<String>,

    /// Lint tools to run (Python components; executed via `uv run`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lint: Vec<ToolCommand>,

    /// Whether to run the package.json `lint` script (JavaScript components).
    #[serde(default, skip_serializing_if = "is_false")]
    pub lint_script: bool,

    /// Test suites to run (Python components; executed via `uv run`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test: Vec<TestCommand>,
}

fn is_false(value: &bool) -> bool {
    !value
}

/// Supported component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Python,
    Javascript,
}

/// A named tool invocation, e.g. `ruff check` or `mypy .`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCommand {
    /// Tool executable; also used in the step name (`lint-<name>-<component>`).
    pub name: String,

    /// Arguments passed to the tool.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// A named test suite, e.g. `unit: pytest -v tests/unit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCommand {
    /// Suite name, used in the step name (`test-<name>-<component>`).
    pub name: String,

    /// Test runner executable.
    pub command: String,

    /// Arguments passed to the runner.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Manifest {
    /// Validate cross-field constraints the schema cannot express.
    pub fn validate(&self) -> Result<()> {
        for (name, component) in &self.components {
            if name.trim().is_empty() || name.contains(char::is_whitespace) {
                return Err(BelayError::ManifestValidationError {
                    message: format!("invalid component name '{name}'"),
                });
            }
            if component.path.as_os_str().is_empty() {
                return Err(BelayError::ManifestValidationError {
                    message: format!("component '{name}' has an empty path"),
                });
            }
            match component.kind {
                ComponentKind::Python => {
                    if component.lint_script {
                        return Err(BelayError::ManifestValidationError {
                            message: format!(
                                "component '{name}': lint_script only applies to javascript components"
                            ),
                        });
                    }
                    if component.package_manager.is_some() {
                        return Err(BelayError::ManifestValidationError {
                            message: format!(
                                "component '{name}': python components are managed by uv"
                            ),
                        });
                    }
                }
                ComponentKind::Javascript => {
                    if !component.lint.is_empty() || !component.test.is_empty() {
                        return Err(BelayError::ManifestValidationError {
                            message: format!(
                                "component '{name}': lint/test tool lists only apply to python components"
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
