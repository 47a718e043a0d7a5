//! Argument parsing and override mapping

use clap::{CommandFactory, Parser};

use super::args::{Cli, Commands};
use super::run::build_cli_args;

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_analyze_flags_map_to_overrides() {
    let cli = Cli::try_parse_from([
        "adsage",
        "analyze",
        "Why did ROAS drop?",
        "--data",
        "ads.csv",
        "--offline",
        "--no-reflection",
        "--min-confidence",
        "0.7",
        "--output-dir",
        "out",
        "--model",
        "gpt-4o",
    ])
    .unwrap();

    match &cli.command {
        Commands::Analyze { query, data, .. } => {
            assert_eq!(query, "Why did ROAS drop?");
            assert_eq!(data.to_str(), Some("ads.csv"));
        }
        other => panic!("expected analyze, got {other:?}"),
    }

    let args = build_cli_args(&cli);
    assert_eq!(args.provider.as_deref(), Some("offline"));
    assert!(args.no_reflection);
    assert_eq!(args.min_confidence, Some(0.7));
    assert_eq!(args.output_dir.as_ref().map(|d| d.as_str()), Some("out"));
    assert_eq!(args.model.as_deref(), Some("gpt-4o"));
}

#[test]
fn test_offline_overrides_provider_flag() {
    let cli = Cli::try_parse_from([
        "adsage", "--provider", "groq", "analyze", "q", "--data", "a.csv", "--offline",
    ])
    .unwrap();
    assert_eq!(build_cli_args(&cli).provider.as_deref(), Some("offline"));
}

#[test]
fn test_check_data_leaves_run_overrides_unset() {
    let cli = Cli::try_parse_from(["adsage", "check-data", "--data", "a.csv", "--verbose"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.command.operation(), "check-data");

    let args = build_cli_args(&cli);
    assert!(args.provider.is_none());
    assert!(!args.no_reflection);
    assert!(args.output_dir.is_none());
}

#[test]
fn test_normalize_accepts_optional_file() {
    let cli = Cli::try_parse_from(["adsage", "normalize", "--contract", "plan"]).unwrap();
    match cli.command {
        Commands::Normalize { contract, file } => {
            assert_eq!(contract, "plan");
            assert!(file.is_none());
        }
        other => panic!("expected normalize, got {other:?}"),
    }
}

#[test]
fn test_analyze_requires_data() {
    assert!(Cli::try_parse_from(["adsage", "analyze", "q"]).is_err());
}
