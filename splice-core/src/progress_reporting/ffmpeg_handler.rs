//! Encoder event handler.
//!
//! Consumes `ffmpeg-sidecar` events for one run: advances the progress
//! tracker, forwards progress to the job's event sink, keeps the stderr tail
//! for error reports and logs a progress line at every 10% step.

use super::{ProgressTracker, StderrTail, parse_time_token};
use crate::events::EventSink;
use crate::utils::{format_duration, parse_ffmpeg_time};
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel as FfmpegLogLevel};
use std::time::Instant;

/// Handler for the events of one encoder run.
pub struct FfmpegProgressHandler<'a> {
    tracker: ProgressTracker,
    tail: StderrTail,
    sink: &'a EventSink,
    start_time: Instant,
    last_logged_percent_threshold: i32,
    last_speed: f32,
}

impl<'a> FfmpegProgressHandler<'a> {
    pub fn new(
        sink: &'a EventSink,
        expected_duration: Option<f64>,
        label: &str,
        tail_lines: usize,
    ) -> Self {
        Self {
            tracker: ProgressTracker::new(expected_duration, label),
            tail: StderrTail::new(tail_lines),
            sink,
            start_time: Instant::now(),
            last_logged_percent_threshold: -1,
            last_speed: 0.0,
        }
    }

    pub fn handle_event(&mut self, event: FfmpegEvent) {
        match event {
            FfmpegEvent::Progress(progress) => {
                self.last_speed = progress.speed;
                if let Some(secs) = parse_ffmpeg_time(&progress.time) {
                    self.advance(secs);
                }
            }
            FfmpegEvent::Log(level, message) => self.handle_log(&level, &message),
            FfmpegEvent::Error(error) => self.handle_error(&error),
            _ => {}
        }
    }

    /// Emits the terminal 100% event.
    pub fn finish_success(&mut self) {
        let event = self.tracker.complete();
        log::info!(
            target: "splice::progress",
            "{}: 100.0% complete in {}",
            event.label,
            format_duration(self.start_time.elapsed().as_secs_f64())
        );
        self.sink.progress(event);
    }

    #[must_use]
    pub fn stderr_tail(&self) -> String {
        self.tail.joined()
    }

    #[must_use]
    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    fn advance(&mut self, elapsed: f64) {
        if let Some(event) = self.tracker.observe(elapsed) {
            self.log_progress_if_needed(event.current_percent, event.elapsed_seconds);
            self.sink.progress(event);
        }
    }

    fn handle_log(&mut self, level: &FfmpegLogLevel, message: &str) {
        self.tail.push(message);
        if let Some(secs) = parse_time_token(message) {
            self.advance(secs);
            return;
        }
        match level {
            FfmpegLogLevel::Fatal | FfmpegLogLevel::Error => {
                log::error!(target: "ffmpeg_log", "{message}");
            }
            FfmpegLogLevel::Warning => log::warn!(target: "ffmpeg_log", "{message}"),
            _ => log::trace!(target: "ffmpeg_log", "{message}"),
        }
    }

    fn handle_error(&mut self, error: &str) {
        self.tail.push(error);
        if is_non_critical_ffmpeg_error(error) {
            log::debug!("ffmpeg non-critical message: {error}");
        } else {
            log::warn!(target: "ffmpeg_log", "ffmpeg stderr error: {error}");
        }
    }

    fn log_progress_if_needed(&mut self, percent: f64, elapsed: f64) {
        let current_threshold = (percent as i32 / 10) * 10;
        if current_threshold <= self.last_logged_percent_threshold || current_threshold < 10 {
            return;
        }
        let expected = self.tracker.expected_duration().unwrap_or(0.0);
        log::info!(
            target: "splice::progress",
            "{}: {:.1}% complete | Time: {} / {} | Speed: {:.2}x",
            self.tracker.label(),
            percent,
            format_duration(elapsed),
            format_duration(expected),
            self.last_speed
        );
        self.last_logged_percent_threshold = current_threshold;
    }
}

/// Encoder stderr messages that do not indicate a problem.
fn is_non_critical_ffmpeg_error(error: &str) -> bool {
    error.contains("deprecated pixel format")
        || error.contains("No accelerated colorspace conversion")
        || error.contains("automatically inserted filter")
        || error.contains("Timestamps are unset")
        || error.contains("Queue input is backward")
        || error.contains("first frame is no keyframe")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PipelineEvent, event_channel};

    fn log_line(text: &str) -> FfmpegEvent {
        FfmpegEvent::Log(FfmpegLogLevel::Info, text.to_string())
    }

    #[test]
    fn test_log_lines_drive_progress_and_tail() {
        let (sink, stream) = event_channel();
        let mut handler = FfmpegProgressHandler::new(&sink, Some(10.0), "clip.mp4", 3);

        handler.handle_event(log_line("frame=1 time=00:00:02.50 bitrate=1k"));
        handler.handle_event(log_line("frame=2 time=00:00:02.50 bitrate=1k"));
        handler.handle_event(FfmpegEvent::Error("Conversion failed!".to_string()));
        handler.handle_event(log_line("frame=3 time=00:00:05.00 bitrate=1k"));
        handler.finish_success();

        let percents: Vec<f64> = stream
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                PipelineEvent::Progress(p) => Some(p.current_percent),
                _ => None,
            })
            .collect();
        assert_eq!(percents, vec![25.0, 50.0, 100.0]);
        assert!(handler.stderr_tail().contains("Conversion failed!"));
        assert_eq!(handler.tracker().percent(), 100.0);
    }

    #[test]
    fn test_non_critical_classification() {
        assert!(is_non_critical_ffmpeg_error("deprecated pixel format used"));
        assert!(!is_non_critical_ffmpeg_error("Invalid data found"));
    }
}
