//! Step factories for uv-managed Python components.
//!
//! Layout per component `<name>`:
//!
//! - `install-<name>`: `uv sync [install_args]`, required by `install`.
//! - `lint-<name>`: per-component join, depends on `install-<name>`,
//!   required by `lint`; each configured tool gets a `lint-<tool>-<name>`
//!   step running `uv run <tool> <args>` that is required by the join.
//! - `test-<name>`: per-component join, required by `test`; each suite
//!   gets a `test-<suite>-<name>` step running `uv run <command> <args>`
//!   that depends on `install-<name>` and is required by the join.

use crate::manifest::{TestCommand, ToolCommand};
use crate::pipeline::{phases, ResourceContext, Step, StepSource};

/// `uv sync` install step.
pub fn install(args: Vec<String>) -> impl StepSource {
    move |resource: &ResourceContext| {
        let dir = resource.working_directory.clone();
        let mut cmd_args = vec!["sync".to_string()];
        cmd_args.extend(args);

        vec![
            Step::new(format!("install-{}", resource.name), move |ctx| async move {
                ctx.run_process("uv", cmd_args, dir).await
            })
            .required_by(phases::INSTALL),
        ]
    }
}

/// Per-tool lint steps plus the component's lint join point.
pub fn lint(commands: Vec<ToolCommand>) -> impl StepSource {
    move |resource: &ResourceContext| {
        let component = resource.name.clone();
        let join = format!("lint-{component}");

        let mut steps = vec![Step::new(join.clone(), {
            let component = component.clone();
            move |ctx| async move {
                ctx.info(&format!("linting for {component} completed successfully"));
                Ok(())
            }
        })
        .depends_on(format!("install-{component}"))
        .required_by(phases::LINT)];

        for tool in commands {
            let dir = resource.working_directory.clone();
            let mut args = vec!["run".to_string(), tool.name.clone()];
            args.extend(tool.args);

            steps.push(
                Step::new(
                    format!("lint-{}-{}", tool.name, component),
                    move |ctx| async move { ctx.run_process("uv", args, dir).await },
                )
                .required_by(join.clone()),
            );
        }

        steps
    }
}

/// Per-suite test steps plus the component's test join point.
pub fn test(commands: Vec<TestCommand>) -> impl StepSource {
    move |resource: &ResourceContext| {
        let component = resource.name.clone();
        let join = format!("test-{component}");

        let mut steps = vec![Step::new(join.clone(), {
            let component = component.clone();
            move |ctx| async move {
                ctx.info(&format!("testing for {component} completed successfully"));
                Ok(())
            }
        })
        .required_by(phases::TEST)];

        for suite in commands {
            let dir = resource.working_directory.clone();
            let mut args = vec!["run".to_string(), suite.command];
            args.extend(suite.args);

            steps.push(
                Step::new(
                    format!("test-{}-{}", suite.name, component),
                    move |ctx| async move { ctx.run_process("uv", args, dir).await },
                )
                .depends_on(format!("install-{component}"))
                .required_by(join.clone()),
            );
        }

        steps
    }
}
