//! Encoder runner.
//!
//! Spawns one encoder run, feeds its events to a [`FfmpegProgressHandler`]
//! and turns the exit status into a result. The runner refuses to spawn when
//! the encoder is unresolved, and kills the process when the job's
//! cancellation token asks for an abort.

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use crate::cancel::CancellationToken;
use crate::error::{CoreResult, ProcessError};
use crate::events::EventSink;
use crate::progress_reporting::FfmpegProgressHandler;
use crate::tools::{FFMPEG, ToolLocator};

pub struct ProcessRunner<'a, S: FfmpegSpawner> {
    spawner: &'a S,
    tools: &'a ToolLocator,
    sink: &'a EventSink,
    cancel: &'a CancellationToken,
    tail_lines: usize,
}

impl<'a, S: FfmpegSpawner> ProcessRunner<'a, S> {
    pub fn new(
        spawner: &'a S,
        tools: &'a ToolLocator,
        sink: &'a EventSink,
        cancel: &'a CancellationToken,
        tail_lines: usize,
    ) -> Self {
        Self {
            spawner,
            tools,
            sink,
            cancel,
            tail_lines,
        }
    }

    /// Runs the encoder with `args` to completion.
    ///
    /// `expected_duration` drives the progress percentage; `label` names the
    /// run in progress events and logs.
    pub fn run(&self, args: &[String], expected_duration: Option<f64>, label: &str) -> CoreResult<()> {
        let program = self.tools.require_ffmpeg()?;
        if self.cancel.is_kill_requested() {
            return Err(killed().into());
        }

        log::debug!("Running: {} {}", program.display(), args.join(" "));
        let mut process = self.spawner.spawn(program, args)?;
        let mut handler =
            FfmpegProgressHandler::new(self.sink, expected_duration, label, self.tail_lines);

        let cancel = self.cancel;
        let streamed = process.handle_events(|event| {
            if cancel.is_kill_requested() {
                return Err(killed().into());
            }
            handler.handle_event(event);
            Ok(())
        });

        if let Err(err) = streamed {
            log::warn!("Stopping ffmpeg for {label}: {err}");
            if let Err(kill_err) = process.kill() {
                log::warn!("Failed to kill ffmpeg: {kill_err}");
            }
            if let Err(wait_err) = process.wait() {
                log::debug!("Wait after kill failed: {wait_err}");
            }
            return Err(err);
        }

        let status = process.wait()?;
        if status.success() {
            handler.finish_success();
            Ok(())
        } else {
            let stderr_tail = handler.stderr_tail();
            log::error!("ffmpeg failed for {label} ({status})");
            Err(ProcessError::NonZeroExit {
                tool: FFMPEG.to_string(),
                code: status.code(),
                stderr_tail,
            }
            .into())
        }
    }
}

fn killed() -> ProcessError {
    ProcessError::Killed {
        tool: FFMPEG.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::events::{PipelineEvent, event_channel};
    use crate::external::mocks::{MockFfmpegSpawner, time_event};
    use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};

    fn fake_tools(dir: &std::path::Path) -> ToolLocator {
        let bin = dir.join("ffmpeg");
        std::fs::write(&bin, b"").unwrap();
        ToolLocator::new(&bin, &bin)
    }

    fn progress_percents(events: Vec<PipelineEvent>) -> Vec<f64> {
        events
            .into_iter()
            .filter_map(|e| match e {
                PipelineEvent::Progress(p) => Some(p.current_percent),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_success_reports_monotonic_progress_then_100() {
        let dir = tempfile::tempdir().unwrap();
        let tools = fake_tools(dir.path());
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation(
            "out.mp4",
            vec![time_event(2.0), time_event(2.0), time_event(1.0), time_event(8.0), time_event(12.0)],
            false,
        );
        let (sink, stream) = event_channel();
        let cancel = CancellationToken::new();
        let runner = ProcessRunner::new(&spawner, &tools, &sink, &cancel, 5);

        runner
            .run(&["-i".into(), "in.mp4".into(), "out.mp4".into()], Some(10.0), "out.mp4")
            .unwrap();

        assert_eq!(progress_percents(stream.drain()), vec![20.0, 80.0, 99.0, 100.0]);
    }

    #[test]
    fn test_non_zero_exit_carries_code_and_tail() {
        let dir = tempfile::tempdir().unwrap();
        let tools = fake_tools(dir.path());
        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation(
            "broken.mp4",
            vec![FfmpegEvent::Log(
                LogLevel::Error,
                "Invalid data found when processing input".to_string(),
            )],
            1,
        );
        let sink = EventSink::disabled();
        let cancel = CancellationToken::new();
        let runner = ProcessRunner::new(&spawner, &tools, &sink, &cancel, 5);

        let err = runner
            .run(&["broken.mp4".into()], Some(10.0), "broken")
            .unwrap_err();
        match err {
            CoreError::Process(ProcessError::NonZeroExit {
                code, stderr_tail, ..
            }) => {
                assert_eq!(code, Some(1));
                assert!(stderr_tail.contains("Invalid data found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_binary_never_spawns() {
        let spawner = MockFfmpegSpawner::new();
        let tools = ToolLocator::unresolved();
        let sink = EventSink::disabled();
        let cancel = CancellationToken::new();
        let runner = ProcessRunner::new(&spawner, &tools, &sink, &cancel, 5);

        let err = runner.run(&["out.mp4".into()], None, "x").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Process(ProcessError::BinaryNotFound(_))
        ));
        assert!(spawner.get_received_calls().is_empty());
    }

    #[test]
    fn test_abort_kills_running_process() {
        let dir = tempfile::tempdir().unwrap();
        let tools = fake_tools(dir.path());
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("out.mp4", vec![time_event(1.0), time_event(2.0)], false);
        let sink = EventSink::disabled();
        let cancel = CancellationToken::new();
        let runner = ProcessRunner::new(&spawner, &tools, &sink, &cancel, 5);

        cancel.abort();
        let err = runner.run(&["out.mp4".into()], Some(10.0), "x").unwrap_err();
        assert!(matches!(err, CoreError::Process(ProcessError::Killed { .. })));
    }

    #[test]
    fn test_abort_mid_stream_kills_spawned_process() {
        let dir = tempfile::tempdir().unwrap();
        let tools = fake_tools(dir.path());
        let spawner = MockFfmpegSpawner::new();
        let cancel = CancellationToken::new();
        spawner.add_success_expectation("out.mp4", vec![time_event(1.0), time_event(2.0)], false);
        spawner.abort_after_events(&cancel, 1);
        let sink = EventSink::disabled();
        let runner = ProcessRunner::new(&spawner, &tools, &sink, &cancel, 5);

        let err = runner.run(&["out.mp4".into()], Some(10.0), "x").unwrap_err();
        assert!(matches!(err, CoreError::Process(ProcessError::Killed { .. })));
        assert_eq!(spawner.kill_count(), 1);
    }
}
