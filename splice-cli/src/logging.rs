// ============================================================================
// splice-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: Console and file output through fern
//
// Two sinks share one `log` dispatch:
// - stderr: info level (debug with --verbose); info lines are printed bare,
//   other levels get a colored tag
// - a timestamped log file: always debug level, plain text, with time,
//   level and target on every line
//
// Periodic progress lines (target "splice::progress") are kept off the
// console while progress bars are drawn; they still reach the file.
//
// AI-ASSISTANT-INFO: fern logger initialization and log file naming

// ---- Internal crate imports ----
use crate::error::CliResult;

// ---- External crate imports ----
use console::style;
use log::{Level, LevelFilter};
use splice_core::CoreError;

// ---- Standard library imports ----
use std::fs;
use std::path::{Path, PathBuf};

/// Log target of the core's periodic progress lines.
pub const PROGRESS_TARGET: &str = "splice::progress";

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let name = format!("splice_compose_{}.log", splice_cli::logging::get_timestamp());
/// assert!(name.ends_with(".log"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// `splice_<command>_<YYYYMMDD_HHMMSS>.log`
#[must_use]
pub fn log_file_name(command: &str) -> String {
    format!("splice_{command}_{}.log", get_timestamp())
}

fn level_tag(level: Level) -> String {
    let tag = match level {
        Level::Error => style("ERROR").red().bold(),
        Level::Warn => style("WARN").yellow(),
        Level::Info => style("INFO").green(),
        Level::Debug => style("DEBUG").blue(),
        Level::Trace => style("TRACE").magenta(),
    };
    tag.for_stderr().to_string()
}

/// Installs the global logger.
///
/// Returns the log file path when `log_dir` is set. Must be called once.
pub fn init(verbose: bool, show_progress_bars: bool, log_dir: Option<&Path>, command: &str) -> CliResult<Option<PathBuf>> {
    let console_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let progress_level = if show_progress_bars {
        LevelFilter::Warn
    } else {
        console_level
    };

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            if record.level() == Level::Info {
                out.finish(format_args!("{message}"));
            } else {
                out.finish(format_args!("{} {message}", level_tag(record.level())));
            }
        })
        .level(console_level)
        .level_for(PROGRESS_TARGET, progress_level)
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new().chain(console);

    let log_path = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let path = dir.join(log_file_name(command));
            let file = fern::Dispatch::new()
                .format(|out, message, record| {
                    let plain = strip_ansi_escapes::strip_str(message.to_string());
                    out.finish(format_args!(
                        "{} {:<5} [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        plain
                    ));
                })
                .level(LevelFilter::Debug)
                .chain(fern::log_file(&path)?);
            dispatch = dispatch.chain(file);
            Some(path)
        }
        None => None,
    };

    dispatch
        .apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize logging: {e}")))?;

    Ok(log_path)
}
