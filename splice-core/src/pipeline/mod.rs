// ============================================================================
// splice-core/src/pipeline/mod.rs
// ============================================================================
//
// PIPELINE ORCHESTRATOR: Job state machines on top of the building blocks
//
// Composition: Analyzing -> (Repackaging | Preprocessing)? -> Composing ->
// CleaningUp -> Complete | Failed.
// Batch, per file: Analyzing -> Processing -> Complete | Failed, files one
// after another, continuing after per-file failures.
//
// At most one external process runs at a time. Cancellation is checked
// before each batch file, before each preprocessing run and before compose.
//
// KEY COMPONENTS:
// - Orchestrator: owns the spawner, profiler, tools, config, sink and token
// - compose: composition jobs (CompositionReport)
// - batch: batch requests (BatchSummary)
// - preprocess: repackage / conform argument vectors
//
// AI-ASSISTANT-INFO: Top-level job orchestration

pub mod batch;
pub mod compose;
pub mod preprocess;

// ---- Internal crate imports ----
use crate::cancel::CancellationToken;
use crate::config::CoreConfig;
use crate::events::EventSink;
use crate::external::{FfmpegSpawner, FfprobeExecutor, ProcessRunner};
use crate::media::StreamProfiler;
use crate::tools::ToolLocator;

pub use batch::derive_output_path;
pub use compose::CompositionReport;

/// Runs composition jobs and batches against one set of tools.
///
/// Generic over the encoder spawner and prober executor so tests can run the
/// whole state machine against mocks.
pub struct Orchestrator<S: FfmpegSpawner, P: FfprobeExecutor> {
    spawner: S,
    profiler: StreamProfiler<P>,
    tools: ToolLocator,
    config: CoreConfig,
    sink: EventSink,
    cancel: CancellationToken,
}

impl<S: FfmpegSpawner, P: FfprobeExecutor> Orchestrator<S, P> {
    pub fn new(spawner: S, prober: P, tools: ToolLocator, config: CoreConfig) -> Self {
        Self {
            spawner,
            profiler: StreamProfiler::new(prober),
            tools,
            config,
            sink: EventSink::disabled(),
            cancel: CancellationToken::new(),
        }
    }

    /// Routes progress, log and stage events to `sink`.
    #[must_use]
    pub fn with_events(mut self, sink: EventSink) -> Self {
        self.sink = sink;
        self
    }

    /// Uses `token` for cooperative cancellation.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    fn runner(&self) -> ProcessRunner<'_, S> {
        ProcessRunner::new(
            &self.spawner,
            &self.tools,
            &self.sink,
            &self.cancel,
            self.config.stderr_tail_lines,
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Orchestrator;
    use crate::config::CoreConfig;
    use crate::events::{EventStream, event_channel};
    use crate::external::mocks::{
        MockFfmpegSpawner, MockFfprobeExecutor, audio_probe_json, video_probe_json,
    };
    use crate::tools::ToolLocator;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Orchestrator wired to mocks, with scratch input/output/workspace dirs.
    pub struct Harness {
        pub orchestrator: Orchestrator<MockFfmpegSpawner, MockFfprobeExecutor>,
        pub spawner: MockFfmpegSpawner,
        pub prober: MockFfprobeExecutor,
        pub events: EventStream,
        inputs: TempDir,
        outputs: TempDir,
        workspace_base: TempDir,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with_config(|_| {})
        }

        pub fn with_config(adjust: impl FnOnce(&mut CoreConfig)) -> Self {
            let inputs = tempfile::tempdir().unwrap();
            let outputs = tempfile::tempdir().unwrap();
            let workspace_base = tempfile::tempdir().unwrap();

            let bin = inputs.path().join("ffmpeg-bin");
            fs::write(&bin, b"").unwrap();
            let tools = ToolLocator::new(&bin, &bin);

            let mut config = CoreConfig {
                temp_dir: Some(workspace_base.path().to_path_buf()),
                ..CoreConfig::default()
            };
            adjust(&mut config);

            let spawner = MockFfmpegSpawner::new();
            let prober = MockFfprobeExecutor::new();
            let (sink, events) = event_channel();
            let orchestrator =
                Orchestrator::new(spawner.clone(), prober.clone(), tools, config).with_events(sink);

            Self {
                orchestrator,
                spawner,
                prober,
                events,
                inputs,
                outputs,
                workspace_base,
            }
        }

        fn touch(&self, name: &str) -> PathBuf {
            let path = self.inputs.path().join(name);
            fs::write(&path, b"media").unwrap();
            path
        }

        /// Creates an input file and registers its prober output (25 fps, AAC stereo).
        pub fn video_input(&self, name: &str, codec: &str, width: u32, height: u32, duration: f64) -> PathBuf {
            let path = self.touch(name);
            self.prober.expect_json(
                &path,
                video_probe_json(codec, width, height, "25/1", duration, Some(("aac", 48_000, 2))),
            );
            path
        }

        pub fn audio_input(&self, name: &str, bitrate_kbps: u32, duration: f64) -> PathBuf {
            let path = self.touch(name);
            self.prober
                .expect_json(&path, audio_probe_json("mp3", bitrate_kbps, duration));
            path
        }

        pub fn output(&self, name: &str) -> PathBuf {
            self.outputs.path().join(name)
        }

        pub fn output_dir(&self) -> &Path {
            self.outputs.path()
        }

        pub fn workspace_is_clean(&self) -> bool {
            fs::read_dir(self.workspace_base.path())
                .map(|entries| entries.count() == 0)
                .unwrap_or(false)
        }
    }
}
