mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::debug;

use awning_config::{ConfigError, DEFAULT_LOG_RETENTION_DAYS, Settings};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;
use crate::logging::FileLog;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Shell completions need no settings
    if let Command::Completions(args) = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(args.shell, &mut cmd, "awning", &mut std::io::stdout());
        return Ok(());
    }

    let auto = cli.command.is_auto();
    let settings = Settings::load(cli.global.env_file.as_deref());

    // The file sink comes up even when settings fail, so an automation run
    // leaves its configuration error in the daily log.
    let file_log = if auto {
        Some(file_log(settings.as_ref().ok(), &cli.global)?)
    } else {
        None
    };
    let _guard = logging::init(&cli.global, auto, file_log.as_ref())?;

    let result = execute(cli, settings, file_log.as_ref()).await;
    if let Err(err) = &result {
        logging::record_failure(err);
    }
    result
}

async fn execute(
    cli: Cli,
    settings: Result<Settings, ConfigError>,
    file_log: Option<&FileLog>,
) -> Result<(), CliError> {
    let settings = settings?;
    if let Some(path) = settings.env_file() {
        debug!(path = %path.display(), "loaded env file");
    }
    if let Some(file) = file_log {
        settings.log_retention_days()?;
        debug!(dir = %file.dir.display(), retention_days = file.retention_days, "file logging");
    }

    debug!(command = ?cli.command, "dispatching command");
    commands::dispatch(cli.command, &settings, &cli.global).await
}

/// Log location and retention. Falls back to the working directory and the
/// default retention when settings are unusable.
fn file_log(settings: Option<&Settings>, global: &GlobalOpts) -> Result<FileLog, CliError> {
    let cwd = std::env::current_dir()?;
    let retention_days = settings
        .and_then(|s| s.log_retention_days().ok())
        .unwrap_or(DEFAULT_LOG_RETENTION_DAYS);
    Ok(FileLog::resolve(
        global.log_dir.as_deref(),
        settings.and_then(Settings::env_file),
        &cwd,
        retention_days,
    ))
}
