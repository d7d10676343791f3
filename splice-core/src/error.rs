// ============================================================================
// splice-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error Taxonomy for splice-core
//
// Each failure domain gets its own error enum so callers can match on the
// stage that failed; `CoreError` aggregates them for propagation with `?`.
//
// KEY COMPONENTS:
// - ProbeError: prober invocation and output parsing failures
// - ProcessError: encoder spawn/exit failures
// - PlanError: reconciliation/trim planning failures
// - InputError: job-submission validation failures
// - CoreError: top-level aggregate, plus cancellation and I/O
//
// AI-ASSISTANT-INFO: Error types and result alias for the core library

use std::path::PathBuf;
use thiserror::Error;

/// Failures while profiling a single input with the prober.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("No video stream found in {0}")]
    NoVideoStream(String),

    #[error("Malformed prober output for {path}: {reason}")]
    MalformedOutput { path: String, reason: String },

    #[error("Prober binary not found: {0}")]
    ToolNotFound(String),

    #[error("Prober failed for {path}: {stderr}")]
    ProcessFailed { path: String, stderr: String },
}

/// Failures of an external encoder (or availability check) invocation.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Binary not found: {0}")]
    BinaryNotFound(String),

    #[error("{tool} exited with status {code:?}. Stderr tail:\n{stderr_tail}")]
    NonZeroExit {
        tool: String,
        code: Option<i32>,
        stderr_tail: String,
    },

    #[error("Failed to start {tool}: {source}")]
    SpawnFailure {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} did not respond within {seconds}s and was killed")]
    Timeout { tool: String, seconds: u64 },

    #[error("{tool} was stopped by the operator")]
    Killed { tool: String },

    #[error("I/O error while supervising {tool}: {message}")]
    Io { tool: String, message: String },
}

/// Failures while turning profiles and job options into a plan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error(
        "Invalid trim: {duration:.2}s source minus {intro_trim:.2}s intro trim and {outro_trim:.2}s outro trim leaves {remaining:.2}s"
    )]
    InvalidTrim {
        duration: f64,
        intro_trim: f64,
        outro_trim: f64,
        remaining: f64,
    },
}

/// Failures detected at the job-submission boundary, before any process runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{mode} requires {expected} input(s), got {actual}")]
    WrongInputCount {
        mode: String,
        expected: String,
        actual: usize,
    },

    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Batch contains no input files")]
    EmptyBatch,
}

/// Top-level error for all splice-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Job cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for splice-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// True when the error is the cooperative-cancellation signal.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_trim_message_is_readable() {
        let err = CoreError::from(PlanError::InvalidTrim {
            duration: 12.0,
            intro_trim: 10.0,
            outro_trim: 5.0,
            remaining: -3.0,
        });
        let msg = err.to_string();
        assert!(msg.contains("12.00s"));
        assert!(msg.contains("-3.00s"));
    }

    #[test]
    fn test_wrong_input_count_message() {
        let err = InputError::WrongInputCount {
            mode: "sidebyside".to_string(),
            expected: "exactly 2".to_string(),
            actual: 3,
        };
        assert_eq!(err.to_string(), "sidebyside requires exactly 2 input(s), got 3");
    }

    #[test]
    fn test_cancelled_detection() {
        assert!(CoreError::Cancelled.is_cancelled());
        assert!(!CoreError::Config("x".into()).is_cancelled());
    }
}
