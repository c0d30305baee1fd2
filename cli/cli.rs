mod cli_args;
mod commands;
mod output;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use colored::*;
use std::process;

use cli_args::Cli;
use gpt_copy_core::{AppError, Rule};

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let cli_rules = cli_args::rules_from_matches(&matches);

    setup_logging(cli.quiet, cli.verbose);
    log::debug!("CLI args parsed: {:?}", cli);

    let quiet = cli.quiet;
    let exit_code = match run_app(&cli, cli_rules) {
        Ok(()) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = match e.downcast_ref::<AppError>() {
                Some(AppError::Config(_)) | Some(AppError::TomlParse(_)) => 1,
                Some(AppError::Io(_))
                | Some(AppError::FileRead { .. })
                | Some(AppError::Ignore(_)) => 2,
                Some(AppError::InvalidArgument(_)) => 5,
                Some(AppError::TikToken(_)) => 8,
                Some(_) => 1,
                None => 1,
            };

            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: &Cli, cli_rules: Vec<Rule>) -> Result<()> {
    if let Some(shell) = cli.completions {
        return commands::completion::handle_completions(shell);
    }
    commands::generate::handle_generate_command(cli, cli_rules, cli.quiet)
}
