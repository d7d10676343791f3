//! Progress state for encoder runs.
//!
//! The encoder reports its position as `time=` tokens on stderr. This module
//! turns those into monotonic progress: elapsed time never regresses, the same
//! instant is never reported twice, the percentage is capped at 99 while the
//! process runs and becomes exactly 100 only on success.

pub mod ffmpeg_handler;

use crate::events::{ProgressEvent, ProgressStatus};
use crate::utils::parse_ffmpeg_time;
use std::collections::VecDeque;

pub use ffmpeg_handler::FfmpegProgressHandler;

/// Highest percentage reported before the process has exited successfully.
pub const RUNNING_PERCENT_CAP: f64 = 99.0;

/// Extracts the last `time=` value from a stderr line, in seconds.
///
/// Accepts both `HH:MM:SS.ss` and bare seconds; `time=N/A` yields `None`.
#[must_use]
pub fn parse_time_token(line: &str) -> Option<f64> {
    line.rmatch_indices("time=").find_map(|(idx, token)| {
        let rest = line[idx + token.len()..].trim_start();
        let value = rest.split_whitespace().next()?;
        parse_ffmpeg_time(value)
    })
}

/// Monotonic progress for one encoder run.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    expected_duration: Option<f64>,
    elapsed: Option<f64>,
    completed: bool,
    label: String,
}

impl ProgressTracker {
    /// `expected_duration` of `None` or `<= 0` means the percentage stays 0.
    pub fn new(expected_duration: Option<f64>, label: impl Into<String>) -> Self {
        Self {
            expected_duration: expected_duration.filter(|d| d.is_finite() && *d > 0.0),
            elapsed: None,
            completed: false,
            label: label.into(),
        }
    }

    #[must_use]
    pub fn expected_duration(&self) -> Option<f64> {
        self.expected_duration
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed.unwrap_or(0.0)
    }

    /// Percentage while running.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.completed {
            return 100.0;
        }
        match self.expected_duration {
            Some(total) => (self.elapsed() / total * 100.0).clamp(0.0, RUNNING_PERCENT_CAP),
            None => 0.0,
        }
    }

    /// Records an elapsed time; returns an event only if it moved forward.
    pub fn observe(&mut self, elapsed: f64) -> Option<ProgressEvent> {
        if self.completed || !elapsed.is_finite() || elapsed < 0.0 {
            return None;
        }
        if self.elapsed.is_some_and(|last| elapsed <= last) {
            return None;
        }
        self.elapsed = Some(elapsed);
        Some(self.snapshot(ProgressStatus::Running))
    }

    /// Marks the run successful; the returned event is exactly 100%.
    pub fn complete(&mut self) -> ProgressEvent {
        self.completed = true;
        if let Some(total) = self.expected_duration {
            if self.elapsed() < total {
                self.elapsed = Some(total);
            }
        }
        self.snapshot(ProgressStatus::Complete)
    }

    fn snapshot(&self, status: ProgressStatus) -> ProgressEvent {
        ProgressEvent {
            current_percent: self.percent(),
            elapsed_seconds: self.elapsed(),
            expected_total_seconds: self.expected_duration,
            status,
            label: self.label.clone(),
        }
    }
}

/// Bounded buffer of the most recent stderr lines.
#[derive(Debug, Clone)]
pub struct StderrTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl StderrTail {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: &str) {
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    /// The buffered lines joined with newlines, oldest first.
    #[must_use]
    pub fn joined(&self) -> String {
        self.lines.iter().cloned().collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_token_forms() {
        assert_eq!(
            parse_time_token("frame=  50 fps=25 q=28.0 size=  256kB time=00:00:02.00 bitrate= 1048.6kbits/s speed=1x"),
            Some(2.0)
        );
        assert_eq!(parse_time_token("size=1kB time=12.5 bitrate=1k"), Some(12.5));
        assert_eq!(parse_time_token("time=N/A bitrate=N/A"), None);
        assert_eq!(parse_time_token("Stream #0:0: Video: h264"), None);
    }

    #[test]
    fn test_progress_is_monotonic_and_capped() {
        let mut tracker = ProgressTracker::new(Some(10.0), "clip");
        let mut events = Vec::new();
        for t in [1.0, 3.0, 3.0, 2.0, 9.95, 12.0] {
            if let Some(e) = tracker.observe(t) {
                events.push(e);
            }
        }
        let elapsed: Vec<f64> = events.iter().map(|e| e.elapsed_seconds).collect();
        assert_eq!(elapsed, vec![1.0, 3.0, 9.95, 12.0]);
        assert!(events.iter().all(|e| e.current_percent <= 99.0));
        assert_eq!(events.last().map(|e| e.current_percent), Some(99.0));

        let done = tracker.complete();
        assert_eq!(done.current_percent, 100.0);
        assert_eq!(done.status, ProgressStatus::Complete);
        assert!(tracker.observe(20.0).is_none());
    }

    #[test]
    fn test_unknown_duration_stays_at_zero_percent() {
        let mut tracker = ProgressTracker::new(Some(0.0), "x");
        assert_eq!(tracker.observe(5.0).map(|e| e.current_percent), Some(0.0));
        assert_eq!(tracker.complete().current_percent, 100.0);
    }

    #[test]
    fn test_stderr_tail_keeps_latest_lines() {
        let mut tail = StderrTail::new(2);
        tail.push("one");
        tail.push("");
        tail.push("two\n");
        tail.push("three");
        assert_eq!(tail.joined(), "two\nthree");
    }
}
