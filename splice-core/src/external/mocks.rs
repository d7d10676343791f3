// splice-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for this crate's unit tests and, via the "test-mocks" feature, for
// downstream test suites.

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use super::ffprobe_executor::FfprobeExecutor;
use crate::cancel::CancellationToken;
use crate::error::{CoreError, CoreResult, ProbeError};
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    // wait(2) status layout: exit code lives in the second byte
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// A stderr progress line reporting `seconds` of encoded output.
#[must_use]
pub fn time_event(seconds: f64) -> FfmpegEvent {
    let hours = (seconds / 3600.0).floor();
    let minutes = ((seconds - hours * 3600.0) / 60.0).floor();
    let secs = seconds - hours * 3600.0 - minutes * 60.0;
    FfmpegEvent::Log(
        LogLevel::Info,
        format!(
            "frame=  100 fps= 25 q=28.0 size=    1024kB time={:02}:{:02}:{:05.2} bitrate=1000.0kbits/s speed=1.00x",
            hours as u64, minutes as u64, secs
        ),
    )
}

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Rc<RefCell<Vec<FfmpegEvent>>>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
    abort_after: Option<(CancellationToken, usize)>,
    kills: Rc<Cell<usize>>,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let events = self.events_to_emit.borrow().clone();
        for (index, event) in events.into_iter().enumerate() {
            if let Some((token, after)) = &self.abort_after {
                if index == *after {
                    token.abort();
                }
            }
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.kills.set(self.kills.get() + 1);
        Ok(())
    }
}

/// Represents an expected encoder call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub create_dummy_output: bool,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// Each spawn consumes the first expectation whose pattern is a substring of
/// any argument. The received argument vectors are recorded in order.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
    abort_after: Rc<RefCell<Option<(CancellationToken, usize)>>>,
    kills: Rc<Cell<usize>>,
}

impl MockFfmpegSpawner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        create_dummy_output: bool,
    ) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            create_dummy_output,
        });
    }

    fn process(&self, events: Vec<FfmpegEvent>, exit_code: i32) -> MockFfmpegProcess {
        MockFfmpegProcess {
            events_to_emit: Rc::new(RefCell::new(events)),
            exit_status: exit_status(exit_code),
            abort_after: None,
            kills: Rc::clone(&self.kills),
        }
    }

    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        create_dummy_output: bool,
    ) {
        let process = self.process(events, 0);
        self.add_expectation(arg_pattern, Ok(process), create_dummy_output);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), false);
    }

    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        let process = self.process(events, exit_code);
        self.add_expectation(arg_pattern, Ok(process), false);
    }

    /// Makes every spawned process call `token.abort()` right before
    /// emitting its event at index `after`.
    pub fn abort_after_events(&self, token: &CancellationToken, after: usize) {
        *self.abort_after.borrow_mut() = Some((token.clone(), after));
    }

    #[must_use]
    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    #[must_use]
    pub fn kill_count(&self) -> usize {
        self.kills.get()
    }

    #[must_use]
    pub fn pending_expectations(&self) -> usize {
        self.expectations.borrow().len()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, _program: &Path, args: &[String]) -> CoreResult<Self::Process> {
        self.received_calls.borrow_mut().push(args.to_vec());

        let mut expectations = self.expectations.borrow_mut();
        let found_index = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));

        let Some(index) = found_index else {
            log::error!("MockFfmpegSpawner: No expectation found for command args: {args:?}");
            panic!("MockFfmpegSpawner: No expectation found for command args: {args:?}");
        };

        let expectation = expectations.remove(index);
        log::info!(
            "MockFfmpegSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );

        let mut process = expectation.result?;
        if expectation.create_dummy_output {
            create_dummy_output(args);
        }
        process.abort_after = self.abort_after.borrow().clone();
        Ok(process)
    }
}

fn create_dummy_output(args: &[String]) {
    let Some(output) = args.last() else {
        log::warn!("MockFfmpegSpawner couldn't find output path in args to create dummy file.");
        return;
    };
    let output_path = PathBuf::from(output);
    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::error!("MockFfmpegSpawner failed to create parent dir {parent:?}: {e}");
        }
    }
    match std::fs::write(&output_path, b"mock output") {
        Ok(()) => log::info!("MockFfmpegSpawner created dummy output file: {output_path:?}"),
        Err(e) => log::error!("MockFfmpegSpawner failed to create dummy output file {output_path:?}: {e}"),
    }
}

/// Mock implementation of FfprobeExecutor: input path -> JSON or error.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    results: Rc<RefCell<HashMap<PathBuf, Result<String, ProbeError>>>>,
    probed: Rc<RefCell<Vec<PathBuf>>>,
}

impl MockFfprobeExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_json(&self, input_path: &Path, json: impl Into<String>) {
        self.results
            .borrow_mut()
            .insert(input_path.to_path_buf(), Ok(json.into()));
    }

    pub fn expect_error(&self, input_path: &Path, error: ProbeError) {
        self.results
            .borrow_mut()
            .insert(input_path.to_path_buf(), Err(error));
    }

    #[must_use]
    pub fn probed_paths(&self) -> Vec<PathBuf> {
        self.probed.borrow().clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe_json(&self, input_path: &Path) -> Result<String, ProbeError> {
        self.probed.borrow_mut().push(input_path.to_path_buf());
        match self.results.borrow().get(input_path) {
            Some(result) => result.clone(),
            None => {
                log::error!(
                    "MockFfprobeExecutor: No expectation set for path: {}",
                    input_path.display()
                );
                Err(ProbeError::ProcessFailed {
                    path: input_path.display().to_string(),
                    stderr: "no mock expectation".to_string(),
                })
            }
        }
    }
}

/// Prober JSON for a file with one video and an optional audio stream.
#[must_use]
pub fn video_probe_json(
    codec: &str,
    width: u32,
    height: u32,
    frame_rate: &str,
    duration: f64,
    audio: Option<(&str, u32, u32)>,
) -> String {
    let mut streams = vec![serde_json::json!({
        "codec_type": "video",
        "codec_name": codec,
        "width": width,
        "height": height,
        "pix_fmt": "yuv420p",
        "r_frame_rate": frame_rate,
        "sample_aspect_ratio": "1:1",
        "display_aspect_ratio": "16:9",
    })];
    if let Some((audio_codec, sample_rate, channels)) = audio {
        streams.push(serde_json::json!({
            "codec_type": "audio",
            "codec_name": audio_codec,
            "sample_rate": sample_rate.to_string(),
            "channels": channels,
            "bit_rate": "128000",
        }));
    }
    serde_json::json!({
        "streams": streams,
        "format": { "duration": format!("{duration:.6}"), "bit_rate": "2000000" },
    })
    .to_string()
}

/// Prober JSON for an audio-only file with the given bitrate.
#[must_use]
pub fn audio_probe_json(codec: &str, bitrate_kbps: u32, duration: f64) -> String {
    serde_json::json!({
        "streams": [{
            "codec_type": "audio",
            "codec_name": codec,
            "sample_rate": "44100",
            "channels": 2,
            "bit_rate": (bitrate_kbps * 1000).to_string(),
        }],
        "format": {
            "duration": format!("{duration:.6}"),
            "bit_rate": (bitrate_kbps * 1000).to_string(),
        },
    })
    .to_string()
}
