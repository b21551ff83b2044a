//! Tracing setup.
//!
//! Everything logs to stderr. Automation runs also append to a daily
//! rolling file (`awning.YYYY-MM-DD.log`), keeping at most
//! `LOG_RETENTION_DAYS` files.

use std::path::{Path, PathBuf};

use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalOpts;
use crate::error::CliError;

const LOG_FILE_PREFIX: &str = "awning";
const LOG_FILE_SUFFIX: &str = "log";
const LOG_DIR_NAME: &str = "logs";

/// Target of the final error event. The stderr layer skips it because
/// `main` already prints the full diagnostic there.
const FAILURE_TARGET: &str = "awning::failure";

/// Where and how long to keep the automation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLog {
    pub dir: PathBuf,
    pub retention_days: usize,
}

impl FileLog {
    /// `--log-dir` if given, else `logs/` beside the loaded .env file,
    /// else `logs/` in the working directory.
    pub fn resolve(
        log_dir: Option<&Path>,
        env_file: Option<&Path>,
        cwd: &Path,
        retention_days: usize,
    ) -> Self {
        let dir = log_dir.map_or_else(
            || {
                env_file
                    .and_then(Path::parent)
                    .unwrap_or(cwd)
                    .join(LOG_DIR_NAME)
            },
            Path::to_path_buf,
        );
        Self {
            dir,
            retention_days,
        }
    }
}

/// Filter directive for our own crates; dependencies stay at `warn`.
fn default_directive(verbosity: u8, auto: bool) -> String {
    let level = match (verbosity, auto) {
        (0, false) => "warn",
        (0, true) | (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };
    format!(
        "warn,awning={level},awning_core={level},awning_api={level},awning_config={level}"
    )
}

/// Install the global subscriber. The returned guard must be held until
/// exit so buffered file output is flushed.
pub fn init(
    global: &GlobalOpts,
    auto: bool,
    file: Option<&FileLog>,
) -> Result<Option<WorkerGuard>, CliError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global.verbose, auto)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(crate::output::should_color(&global.color))
        .with_filter(filter_fn(|meta| meta.target() != FAILURE_TARGET));

    let (file_layer, guard) = match file {
        Some(file) => {
            let appender = rolling_appender(file)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Record the error that ends the run, so it reaches the log file too.
pub fn record_failure(err: &CliError) {
    error!(target: FAILURE_TARGET, error = %err, "run failed");
}

fn rolling_appender(file: &FileLog) -> Result<RollingFileAppender, CliError> {
    std::fs::create_dir_all(&file.dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(file.retention_days)
        .build(&file.dir)
        .map_err(|source| CliError::LogSetup {
            dir: file.dir.display().to_string(),
            source,
        })
}
