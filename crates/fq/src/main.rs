use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod logger;

use cli::{Cli, Commands, ConfigCommands};
use commands::apply::ApplyOptions;
use commands::{CommandContext, CommandError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                eprintln!("{error_json:#}");
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

fn run(cli: &Cli) -> commands::Result<()> {
    let ctx = CommandContext::from_cli(cli);

    match &cli.command {
        Commands::Apply {
            records,
            conditions,
            filters,
            case_sensitive,
            no_dates,
            no_app_filters,
            count,
            compact,
        } => {
            let opts = ApplyOptions {
                records: records.clone(),
                conditions: conditions.clone(),
                filters: filters.clone(),
                case_sensitive: *case_sensitive,
                no_dates: *no_dates,
                no_app_filters: *no_app_filters,
                count: *count,
                compact: *compact,
            };
            commands::apply::execute(&ctx, &opts)
        }
        Commands::Config { command } => match command {
            Some(ConfigCommands::Path) => commands::config::execute_path(&ctx),
            Some(ConfigCommands::Show) | None => commands::config::execute_show(&ctx),
        },
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Filter(_) => "FILTER_ERROR",
        CommandError::Input(_) => "INPUT_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    match e {
        CommandError::Filter(_) => ExitCode::from(1),
        CommandError::Input(_) => ExitCode::from(2),
        CommandError::Io(_) => ExitCode::from(3),
        CommandError::Json(_) => ExitCode::from(4),
        CommandError::Config(_) => ExitCode::from(5),
    }
}
