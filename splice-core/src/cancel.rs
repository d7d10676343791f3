//! Cooperative cancellation.
//!
//! `cancel()` is checked by the orchestrator at stage boundaries: before each
//! batch file, before each preprocessing run and before composing. `abort()`
//! additionally asks the process runner to kill the encoder that is running.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    kill: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop before the next stage; a running encoder finishes.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Stop now, killing a running encoder.
    pub fn abort(&self) {
        self.kill.store(true, Ordering::SeqCst);
        self.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_kill_requested(&self) -> bool {
        self.kill.load(Ordering::SeqCst)
    }

    /// `Err(CoreError::Cancelled)` once cancellation was requested.
    pub fn check(&self) -> crate::CoreResult<()> {
        if self.is_cancelled() {
            Err(crate::CoreError::Cancelled)
        } else {
            Ok(())
        }
    }
}
