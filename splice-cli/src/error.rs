// ============================================================================
// splice-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reuses the core error type and adds context on the way up. Exit
// codes are decided here so the binary only has to map a result.
//
// KEY COMPONENTS:
// - CliResult: Type alias for CLI operations
// - CliErrorContext: context wrapping for Results and Options
// - suggestion_for: operator hints for common failures
//
// AI-ASSISTANT-INFO: CLI error handling utilities

// ---- Internal crate imports ----
use splice_core::{CoreError, CoreResult, InputError, ProbeError, ProcessError};

// ---- Standard library imports ----
use std::fmt;

/// Exit code for any error.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for a batch that finished with at least one failed file.
pub const EXIT_BATCH_FAILURES: i32 = 2;

/// Exit code after an operator stop (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Extension trait for adding context to errors in the CLI.
///
/// Works like anyhow's `context`, but stays on `CoreError`.
pub trait CliErrorContext<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Lazily built context.
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{context}: {core_error}"))
        })
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {core_error}", f()))
        })
    }
}

impl<T> CliErrorContext<T> for Option<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.ok_or_else(|| CoreError::OperationFailed(context.to_string()))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| CoreError::OperationFailed(f().to_string()))
    }
}

/// Exit code for a failed command.
#[must_use]
pub fn exit_code_for(error: &CoreError) -> i32 {
    match error {
        CoreError::Cancelled | CoreError::Process(ProcessError::Killed { .. }) => EXIT_INTERRUPTED,
        _ => EXIT_FAILURE,
    }
}

/// A hint for the operator, for failures that have an obvious fix.
#[must_use]
pub fn suggestion_for(error: &CoreError) -> Option<&'static str> {
    match error {
        CoreError::Process(ProcessError::BinaryNotFound(_))
        | CoreError::Probe(ProbeError::ToolNotFound(_)) => Some(
            "Install ffmpeg, or point --ffmpeg/--ffprobe (SPLICE_FFMPEG/SPLICE_FFPROBE) at the binaries",
        ),
        CoreError::Process(ProcessError::Timeout { .. }) => {
            Some("Run `splice check --verbose` to see which tool is hanging")
        }
        CoreError::Input(InputError::WrongInputCount { .. }) => {
            Some("Pass one --input per source, in order")
        }
        CoreError::Json(_) => Some("Check the job file against the documented job format"),
        _ => None,
    }
}
