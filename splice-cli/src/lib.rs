// ============================================================================
// splice-cli/src/lib.rs
// ============================================================================
//
// SPLICE CLI: Library portion of the command-line application
//
// Argument definitions, command implementations and terminal output live
// here so integration tests can drive them; main.rs only maps the result of
// `run` to an exit code.
//
// KEY COMPONENTS:
// - cli: clap argument structures
// - commands: compose, batch and check
// - logging / terminal / progress: console, log file and progress bars
// - interrupt: Ctrl-C aborts the running job
//
// AI-ASSISTANT-INFO: CLI library entry point and command dispatch

pub mod cli;
pub mod commands;
pub mod error;
pub mod interrupt;
pub mod logging;
pub mod progress;
pub mod terminal;

// ---- Re-exports ----
pub use cli::{BatchArgs, Cli, Commands, ComposeArgs, GlobalArgs};
pub use commands::batch::run_batch;
pub use commands::check::run_check;
pub use commands::compose::run_compose;
pub use error::{CliResult, EXIT_BATCH_FAILURES, EXIT_FAILURE, EXIT_INTERRUPTED, exit_code_for};

// ---- External crate imports ----
use log::{debug, info};
use splice_core::{BatchSummary, CancellationToken};

// ---- Standard library imports ----
use std::path::{Path, PathBuf};

/// Subcommand name used in log file names.
fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Compose(_) => "compose",
        Commands::Batch(_) => "batch",
        Commands::Check => "check",
    }
}

/// `--log-dir` if given, otherwise a `logs` directory next to the output.
/// `check` writes no log file unless asked.
fn log_dir_for(cli: &Cli) -> Option<PathBuf> {
    if let Some(dir) = &cli.global.log_dir {
        return Some(dir.clone());
    }
    match &cli.command {
        Commands::Compose(args) => {
            let anchor = args.output.as_deref().or(args.job.as_deref())?;
            let parent = anchor.parent().unwrap_or(Path::new(""));
            Some(parent.join("logs"))
        }
        Commands::Batch(args) => Some(args.output_dir.join("logs")),
        Commands::Check => None,
    }
}

/// Exit code for a batch that ran to its end or was stopped.
fn batch_exit_code(summary: &BatchSummary) -> i32 {
    if summary.cancelled {
        EXIT_INTERRUPTED
    } else if summary.has_failures() {
        EXIT_BATCH_FAILURES
    } else {
        0
    }
}

/// Runs the parsed command line and returns the process exit code.
pub fn run(cli: &Cli) -> CliResult<i32> {
    terminal::set_color(!cli.global.no_color);

    let log_dir = log_dir_for(cli);
    let log_file = logging::init(
        cli.global.verbose,
        progress::bars_visible(),
        log_dir.as_deref(),
        command_name(&cli.command),
    )?;
    if let Some(path) = &log_file {
        info!("Log file: {}", path.display());
    }
    debug!("Arguments: {cli:?}");

    let cancel = CancellationToken::new();
    match &cli.command {
        Commands::Compose(args) => {
            interrupt::install(cancel.clone())?;
            run_compose(args, &cli.global, &cancel)?;
            Ok(0)
        }
        Commands::Batch(args) => {
            interrupt::install(cancel.clone())?;
            let summary = run_batch(args, &cli.global, &cancel)?;
            Ok(batch_exit_code(&summary))
        }
        Commands::Check => {
            run_check(&cli.global)?;
            Ok(0)
        }
    }
}
