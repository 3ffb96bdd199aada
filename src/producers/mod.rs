//! Per-component step factories.
//!
//! Each producer turns one component of the topology into pipeline steps
//! hanging off the well-known phases. Producers never see the final graph
//! or each other; they only declare `depends_on`/`required_by` edges
//! against names they derive from their own component.

pub mod javascript;
pub mod python;

use std::path::Path;

use crate::error::Result;
use crate::manifest::{ComponentKind, Manifest};
use crate::pipeline::{PipelineBuilder, ResourceContext};

/// Register step sources for every component in the manifest.
///
/// Component paths are resolved against `project_root`; JavaScript
/// components without an explicit package manager fall back to lockfile
/// detection.
pub fn register_components(
    builder: &mut PipelineBuilder,
    manifest: &Manifest,
    project_root: &Path,
) -> Result<()> {
    for (name, component) in &manifest.components {
        let dir = project_root.join(&component.path);
        match component.kind {
            ComponentKind::Python => {
                let resource = ResourceContext::new(name, &dir);
                builder.add_source(
                    resource.clone(),
                    python::install(component.install_args.clone()),
                );
                if !component.lint.is_empty() {
                    builder.add_source(resource.clone(), python::lint(component.lint.clone()));
                }
                if !component.test.is_empty() {
                    builder.add_source(resource, python::test(component.test.clone()));
                }
            }
            ComponentKind::Javascript => {
                let package_manager = component
                    .package_manager
                    .clone()
                    .unwrap_or_else(|| javascript::detect_package_manager(&dir).to_string());
                let resource =
                    ResourceContext::new(name, &dir).with_package_manager(package_manager);
                builder.add_source(
                    resource.clone(),
                    javascript::install(component.install_args.clone()),
                );
                if component.lint_script {
                    builder.add_source(resource, javascript::lint());
                }
            }
        }
    }
    Ok(())
}
