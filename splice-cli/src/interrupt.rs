// ============================================================================
// splice-cli/src/interrupt.rs
// ============================================================================
//
// INTERRUPT HANDLING: Ctrl-C as an operator stop
//
// The first interrupt aborts the running job through its cancellation token:
// the encoder is killed, the job returns and its workspace is removed. A
// second interrupt exits at once.
//
// AI-ASSISTANT-INFO: ctrlc handler wired to the core CancellationToken

// ---- Internal crate imports ----
use crate::error::{CliResult, EXIT_INTERRUPTED};

// ---- External crate imports ----
use log::warn;
use splice_core::{CancellationToken, CoreError};

// ---- Standard library imports ----
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterruptAction {
    /// Job aborted; let it unwind and clean up
    Abort,
    /// Operator insisted; leave immediately
    Exit,
}

fn on_interrupt(token: &CancellationToken, count: &AtomicUsize) -> InterruptAction {
    if count.fetch_add(1, Ordering::SeqCst) == 0 {
        token.abort();
        InterruptAction::Abort
    } else {
        InterruptAction::Exit
    }
}

/// Routes Ctrl-C to `token`. Call once per process.
pub fn install(token: CancellationToken) -> CliResult<()> {
    let count = AtomicUsize::new(0);
    ctrlc::set_handler(move || match on_interrupt(&token, &count) {
        InterruptAction::Abort => {
            warn!("Interrupted: stopping the current job (press Ctrl-C again to exit now)");
        }
        InterruptAction::Exit => process::exit(EXIT_INTERRUPTED),
    })
    .map_err(|e| CoreError::OperationFailed(format!("Failed to install Ctrl-C handler: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_interrupt_aborts_the_job() {
        let token = CancellationToken::new();
        let job_token = token.clone();
        let count = AtomicUsize::new(0);

        assert_eq!(on_interrupt(&token, &count), InterruptAction::Abort);
        assert!(job_token.is_cancelled());
        assert!(job_token.is_kill_requested());
    }

    #[test]
    fn test_second_interrupt_exits() {
        let token = CancellationToken::new();
        let count = AtomicUsize::new(0);
        on_interrupt(&token, &count);
        assert_eq!(on_interrupt(&token, &count), InterruptAction::Exit);
    }
}
