// ============================================================================
// splice-core/src/events.rs
// ============================================================================
//
// EVENT STREAM: Per-job progress, log and stage events
//
// Each orchestrator run owns an `EventSink`; the caller holds the matching
// `EventStream`. Sending never blocks and never fails the job: a dropped
// receiver simply turns the sink into a no-op. Events of one job arrive in
// the order they were produced.
//
// KEY COMPONENTS:
// - PipelineEvent: Progress / Log / Stage
// - ProgressEvent, ProgressStatus, Severity, Stage
// - EventSink / EventStream / event_channel()
//
// AI-ASSISTANT-INFO: Channel-based replacement for progress callbacks

use serde::Serialize;
use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Running,
    Complete,
}

/// Progress of the current encoder run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub current_percent: f64,
    pub elapsed_seconds: f64,
    pub expected_total_seconds: Option<f64>,
    pub status: ProgressStatus,
    /// What is being encoded (file name or stage)
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl From<Severity> for log::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Debug => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

/// Orchestrator states, for both composition jobs and batch files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Analyzing,
    Repackaging,
    Preprocessing,
    Composing,
    Processing,
    CleaningUp,
    Complete,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Analyzing => "Analyzing",
            Stage::Repackaging => "Repackaging",
            Stage::Preprocessing => "Preprocessing",
            Stage::Composing => "Composing",
            Stage::Processing => "Processing",
            Stage::CleaningUp => "Cleaning up",
            Stage::Complete => "Complete",
            Stage::Failed => "Failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum PipelineEvent {
    Progress(ProgressEvent),
    Log { severity: Severity, message: String },
    Stage { stage: Stage, label: String },
}

/// Producer half of a job's event stream.
///
/// Cloning is cheap; all clones feed the same stream.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<Sender<PipelineEvent>>,
}

impl EventSink {
    /// A sink that drops everything (logs are still written through `log`).
    #[must_use]
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    fn send(&self, event: PipelineEvent) {
        if let Some(sender) = &self.sender {
            // A gone consumer is not the job's problem.
            let _ = sender.send(event);
        }
    }

    pub fn progress(&self, event: ProgressEvent) {
        self.send(PipelineEvent::Progress(event));
    }

    /// Emits a log event and mirrors it to the `log` facade.
    pub fn log(&self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        log::log!(log::Level::from(severity), "{message}");
        self.send(PipelineEvent::Log { severity, message });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Severity::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Severity::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Severity::Error, message);
    }

    pub fn stage(&self, stage: Stage, label: impl Into<String>) {
        let label = label.into();
        log::debug!("Stage {stage}: {label}");
        self.send(PipelineEvent::Stage { stage, label });
    }
}

/// Consumer half of a job's event stream.
#[derive(Debug)]
pub struct EventStream {
    receiver: Receiver<PipelineEvent>,
}

impl EventStream {
    /// Next event, blocking; `None` once every sink is gone.
    pub fn recv(&self) -> Option<PipelineEvent> {
        self.receiver.recv().ok()
    }

    /// Next event if one is ready; `Err(true)` once every sink is gone.
    pub fn try_recv(&self) -> Result<PipelineEvent, bool> {
        self.receiver.try_recv().map_err(|e| e == TryRecvError::Disconnected)
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<PipelineEvent, bool> {
        self.receiver
            .recv_timeout(timeout)
            .map_err(|e| e == RecvTimeoutError::Disconnected)
    }

    /// Everything currently queued, without blocking.
    pub fn drain(&self) -> Vec<PipelineEvent> {
        self.receiver.try_iter().collect()
    }
}

impl Iterator for EventStream {
    type Item = PipelineEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

/// Creates a connected sink/stream pair for one job.
#[must_use]
pub fn event_channel() -> (EventSink, EventStream) {
    let (sender, receiver) = mpsc::channel();
    (
        EventSink {
            sender: Some(sender),
        },
        EventStream { receiver },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_order() {
        let (sink, stream) = event_channel();
        sink.stage(Stage::Analyzing, "job");
        sink.info("hello");
        sink.stage(Stage::Complete, "job");
        drop(sink);

        let events: Vec<PipelineEvent> = stream.collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], PipelineEvent::Stage { stage: Stage::Analyzing, .. }));
        assert!(matches!(&events[1], PipelineEvent::Log { message, .. } if message == "hello"));
        assert!(matches!(events[2], PipelineEvent::Stage { stage: Stage::Complete, .. }));
    }

    #[test]
    fn test_sending_after_consumer_dropped_is_harmless() {
        let (sink, stream) = event_channel();
        drop(stream);
        sink.warn("nobody listening");
        EventSink::disabled().error("also fine");
    }

    #[test]
    fn test_try_recv_reports_disconnect() {
        let (sink, stream) = event_channel();
        assert_eq!(stream.try_recv(), Err(false));
        drop(sink);
        assert_eq!(stream.try_recv(), Err(true));
    }
}
