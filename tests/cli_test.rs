//! Tests for CLI parsing and error-to-exit-code mapping

use std::path::PathBuf;

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use termgraph::application::ApplicationError;
use termgraph::cli::commands::execute_command;
use termgraph::cli::{Cli, CliError, Commands};
use termgraph::domain::DomainError;
use termgraph::exitcode;
use termgraph::util::testing::isolate_user_config;

#[test]
fn given_build_args_when_parsing_then_paths_are_captured() {
    let cli = Cli::try_parse_from([
        "termgraph",
        "-v",
        "build",
        "onto.json",
        "--definitions",
        "defs.json",
        "--out",
        "dist",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
        Some(Commands::Build {
            ontology,
            definitions,
            out,
        }) => {
            assert_eq!(ontology, PathBuf::from("onto.json"));
            assert_eq!(definitions, Some(PathBuf::from("defs.json")));
            assert_eq!(out, Some(PathBuf::from("dist")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn given_distance_without_terms_when_parsing_then_rejected() {
    assert!(Cli::try_parse_from(["termgraph", "distance", "onto.json"]).is_err());
}

#[rstest]
#[case(CliError::Usage("x".into()), exitcode::USAGE)]
#[case(CliError::MissingInput(PathBuf::from("x")), exitcode::NOINPUT)]
#[case(
    CliError::Application(ApplicationError::Domain(DomainError::CycleDetected("a".into()))),
    exitcode::DATAERR
)]
#[case(
    CliError::Application(ApplicationError::Config { message: "bad".into() }),
    exitcode::CONFIG
)]
fn given_error_when_mapping_then_sysexits_code(#[case] err: CliError, #[case] expected: i32) {
    assert_eq!(err.exit_code(), expected);
}

#[test]
fn given_missing_ontology_when_building_then_missing_input_error() {
    isolate_user_config();
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("absent.json");
    let cli = Cli::try_parse_from([
        "termgraph".into(),
        "build".into(),
        missing.clone().into_os_string(),
    ])
    .unwrap();

    let err = execute_command(&cli).unwrap_err();

    assert!(matches!(err, CliError::MissingInput(ref p) if *p == missing));
    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_ontology_when_building_then_writes_into_out_dir() {
    isolate_user_config();
    let temp = TempDir::new().unwrap();
    let ontology = temp.path().join("onto.json");
    std::fs::write(&ontology, r#"[{"id": "a"}, {"id": "b", "broader": "a"}]"#).unwrap();
    let out = temp.path().join("dist");
    let cli = Cli::try_parse_from([
        "termgraph".into(),
        "build".into(),
        ontology.into_os_string(),
        "--out".into(),
        out.clone().into_os_string(),
    ])
    .unwrap();

    execute_command(&cli).unwrap();

    assert!(out.join("tree.json").is_file());
    assert!(out.join("distances.json").is_file());
}
