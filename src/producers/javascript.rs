//! Step factories for JavaScript components.
//!
//! Layout per component `<name>`:
//!
//! - `install-<name>`: `<package manager> install [install_args]`,
//!   required by `install`.
//! - `lint-<name>`: runs the package.json `lint` script through the
//!   package manager, depends on `install-<name>`, required by `lint`.

use std::path::Path;

use crate::pipeline::{phases, ResourceContext, Step, StepSource};

/// Detect the package manager from lockfiles, defaulting to npm.
pub fn detect_package_manager(dir: &Path) -> &'static str {
    if dir.join("pnpm-lock.yaml").exists() {
        "pnpm"
    } else if dir.join("yarn.lock").exists() {
        "yarn"
    } else if dir.join("bun.lockb").exists() {
        "bun"
    } else {
        "npm"
    }
}

fn package_manager_of(resource: &ResourceContext) -> String {
    resource
        .package_manager
        .clone()
        .unwrap_or_else(|| detect_package_manager(&resource.working_directory).to_string())
}

/// Package-manager install step.
pub fn install(args: Vec<String>) -> impl StepSource {
    move |resource: &ResourceContext| {
        let dir = resource.working_directory.clone();
        let package_manager = package_manager_of(resource);
        let mut cmd_args = vec!["install".to_string()];
        cmd_args.extend(args);

        vec![
            Step::new(format!("install-{}", resource.name), move |ctx| async move {
                ctx.run_process(&package_manager, cmd_args, dir).await
            })
            .required_by(phases::INSTALL),
        ]
    }
}

/// `lint` script step.
pub fn lint() -> impl StepSource {
    |resource: &ResourceContext| {
        let dir = resource.working_directory.clone();
        let package_manager = package_manager_of(resource);
        let component = resource.name.clone();

        vec![
            Step::new(format!("lint-{component}"), move |ctx| async move {
                // yarn runs scripts directly; the others need `run`.
                let args: Vec<String> = match package_manager.as_str() {
                    "yarn" => vec!["lint".into()],
                    _ => vec!["run".into(), "lint".into(), "--silent".into()],
                };
                ctx.run_process(&package_manager, args, dir).await
            })
            .depends_on(format!("install-{}", resource.name))
            .required_by(phases::LINT),
        ]
    }
}
