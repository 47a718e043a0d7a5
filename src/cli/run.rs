//! CLI entry point and dispatch
//!
//! `run()` parses arguments, installs logging, discovers configuration, builds
//! the tokio runtime and dispatches to the command handlers. It prints every
//! error itself and only hands the exit code back to `main`.

use adsage_config::{CliArgs, Config};
use adsage_utils::error::AdsageError;
use adsage_utils::exit_codes::ExitCode;
use adsage_utils::logging::init_tracing;
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use super::args::{Cli, Commands};
use super::commands;

/// Main CLI execution function.
///
/// Returns `Err(ExitCode)` after the error has already been reported on stderr.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose, cli.json_logs) {
        eprintln!("✗ Failed to initialize logging: {e}");
    }

    let operation = cli.command.operation();
    let cli_args = build_cli_args(&cli);

    let config = match Config::discover(&cli_args) {
        Ok(config) => Arc::new(config),
        Err(err) => {
            let err = AdsageError::from(err);
            report_error(&err, "config");
            return Err(err.to_exit_code());
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::Analyze {
                query, data, json, ..
            } => commands::execute_analyze_command(&query, &data, json, config).await,
            Commands::CheckData { data } => commands::execute_check_data_command(&data, &config),
            Commands::Normalize { contract, file } => {
                commands::execute_normalize_command(&contract, file.as_deref())
            }
        }
    });

    if let Err(error) = result {
        if let Some(adsage_error) = error.downcast_ref::<AdsageError>() {
            report_error(adsage_error, operation);
            return Err(adsage_error.to_exit_code());
        }

        eprintln!("✗ Unexpected error during {operation}: {error:#}");
        eprintln!("\n  Run with --verbose for more detailed output");
        return Err(ExitCode::INTERNAL);
    }

    Ok(())
}

/// Configuration overrides carried by the command line.
pub(crate) fn build_cli_args(cli: &Cli) -> CliArgs {
    let mut args = CliArgs {
        config_path: cli.config.clone(),
        provider: cli.provider.clone(),
        model: cli.model.clone(),
        timeout_secs: cli.timeout,
        ..CliArgs::default()
    };

    if let Commands::Analyze {
        output_dir,
        offline,
        no_reflection,
        min_confidence,
        ..
    } = &cli.command
    {
        if *offline {
            args.provider = Some("offline".to_string());
        }
        args.output_dir = output_dir.clone();
        args.no_reflection = *no_reflection;
        args.min_confidence = *min_confidence;
    }

    args
}

fn report_error(err: &AdsageError, operation: &str) {
    eprintln!("✗ {operation} failed");
    eprintln!();
    eprint!("{}", err.display_for_user());
}
