//! Library integration tests.

use belay::BelayError;

#[test]
fn error_types_are_public() {
    let err = BelayError::DuplicateStep {
        name: "install-app".into(),
    };
    assert!(err.to_string().contains("install-app"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> belay::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use belay::cli::{Cli, Commands};
    use clap::Parser;

    // Actually test parsing with parse_from
    let cli = Cli::parse_from(["belay", "run", "--json", "-j", "2"]);
    assert!(cli.command.is_some());

    if let Some(Commands::Run(args)) = cli.command {
        assert!(args.json);
        assert_eq!(args.concurrency, Some(2));
    } else {
        panic!("Expected Run command");
    }
}

#[test]
fn pipeline_types_are_public() {
    use belay::pipeline::{phases, PipelineBuilder, Step};

    let mut builder = PipelineBuilder::new();
    builder.add_step(
        Step::new("install-app", |_ctx| async { Ok(()) }).required_by(phases::INSTALL),
    );
    let graph = builder.build().unwrap();
    assert!(graph.contains("install-app"));
    assert!(graph.contains(phases::INSTALL));
}
