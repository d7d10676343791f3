// ============================================================================
// splice-core/src/pipeline/batch.rs
// ============================================================================
//
// BATCH PROCESSING: One operation applied to many files
//
// WORKFLOW (per file, strictly one after another):
// 1. Check cancellation; a cancelled batch returns what it has so far
// 2. Derive the output path and refuse to overwrite the input
// 3. Analyzing: lenient container metrics (malformed prober output counts
//    as unknown metrics and the file is processed anyway)
// 4. Apply the skip rules unless `force_process` is set
// 5. Processing: one encoder run
//
// A failing file is recorded and the batch moves on.
//
// AI-ASSISTANT-INFO: Batch state machine and per-file argument vectors

// ---- Internal crate imports ----
use super::Orchestrator;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, ProbeError};
use crate::events::Stage;
use crate::external::{FfmpegSpawner, FfprobeExecutor};
use crate::filters::SourceStats;
use crate::filters::quality::{audio_args, container_args, video_args};
use crate::job::{BatchOperation, BatchRequest, ContainerFormat, QualityConfig};
use crate::media::ContainerMetrics;
use crate::reporting::{BatchSummary, FileOutcome, FileStatus};
use crate::utils::display_name;

// ---- Standard library imports ----
use std::fs;
use std::path::{Path, PathBuf};

/// `<output_dir>/<stem><suffix>.<ext>` for `input`.
pub fn derive_output_path(
    input: &Path,
    output_dir: &Path,
    suffix: Option<&str>,
    format: ContainerFormat,
) -> CoreResult<PathBuf> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            CoreError::PathError(format!("cannot derive a file name from {}", input.display()))
        })?;
    Ok(output_dir.join(format!(
        "{stem}{}.{}",
        suffix.unwrap_or_default(),
        format.extension()
    )))
}

/// Compares by canonical parent directory plus file name, so an output that
/// does not exist yet can still be matched against its input.
fn is_same_file(a: &Path, b: &Path) -> bool {
    fn canonical(path: &Path) -> Option<PathBuf> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        Some(parent.canonicalize().ok()?.join(path.file_name()?))
    }
    match (canonical(a), canonical(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn kbps(bps: u64) -> u64 {
    bps / 1000
}

/// Why `operation` can leave this file alone, if it can.
#[must_use]
pub fn skip_reason(
    operation: &BatchOperation,
    metrics: &ContainerMetrics,
    config: &CoreConfig,
) -> Option<String> {
    match operation {
        BatchOperation::CompressAudio { .. } => {
            let bitrate = kbps(metrics.effective_audio_bitrate()?);
            let threshold = u64::from(config.mp3_bitrate_threshold_kbps);
            (bitrate <= threshold).then(|| {
                format!("audio bitrate {bitrate} kbps is at or below the {threshold} kbps threshold")
            })
        }
        BatchOperation::CompressVideo { .. } => {
            let threshold = u64::from(config.video_bitrate_threshold_kbps?);
            let bitrate = kbps(metrics.video_bitrate?);
            (bitrate <= threshold).then(|| {
                format!("video bitrate {bitrate} kbps is at or below the {threshold} kbps threshold")
            })
        }
        BatchOperation::Transcode { .. } => None,
    }
}

/// Encoder arguments for one batch file.
#[must_use]
pub fn batch_args(
    operation: &BatchOperation,
    input: &Path,
    output: &Path,
    metrics: &ContainerMetrics,
    config: &CoreConfig,
) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
    ];

    match operation {
        BatchOperation::CompressAudio {
            target_bitrate_kbps,
        } => {
            let target = target_bitrate_kbps.unwrap_or(config.mp3_target_bitrate_kbps);
            args.extend([
                "-vn".to_string(),
                "-c:a".to_string(),
                ContainerFormat::Mp3.audio_encoder().to_string(),
                "-b:a".to_string(),
                format!("{target}k"),
            ]);
        }
        BatchOperation::CompressVideo { quality } => {
            args.extend(av_args(quality, ContainerFormat::Mp4, metrics));
        }
        BatchOperation::Transcode { format, quality } => {
            if format.is_audio_only() {
                args.push("-vn".to_string());
                args.extend(audio_args(quality, *format, &SourceStats::from(metrics)));
            } else {
                args.extend(av_args(quality, *format, metrics));
            }
        }
    }

    args.push(output.to_string_lossy().into_owned());
    args
}

fn av_args(quality: &QualityConfig, format: ContainerFormat, metrics: &ContainerMetrics) -> Vec<String> {
    let stats = SourceStats::from(metrics);
    let mut args = video_args(quality, format, &stats);
    let known_silent = metrics.has_video() && metrics.audio_codec.is_none();
    if known_silent {
        args.push("-an".to_string());
    } else {
        args.extend(audio_args(quality, format, &stats));
    }
    args.extend(container_args(format));
    args
}

impl<S: FfmpegSpawner, P: FfprobeExecutor> Orchestrator<S, P> {
    /// Applies `request.operation` to every input file in order.
    ///
    /// Per-file problems never abort the batch; only an invalid request or an
    /// unusable output directory does.
    pub fn run_batch(&self, request: &BatchRequest) -> CoreResult<BatchSummary> {
        request.validate()?;
        fs::create_dir_all(&request.output_directory)?;

        let total = request.input_files.len();
        let mut summary = BatchSummary::default();
        self.sink.info(format!(
            "Starting {} batch of {total} file(s)",
            request.operation.name()
        ));

        for (index, input) in request.input_files.iter().enumerate() {
            if self.cancel.is_cancelled() {
                self.sink.warn(format!(
                    "Batch cancelled with {} file(s) left",
                    total - index
                ));
                summary.cancelled = true;
                break;
            }

            let label = display_name(input);
            log::info!("Batch file {}/{total}: {label}", index + 1);
            let outcome = self.process_batch_file(request, input, &label);
            match outcome.status {
                FileStatus::Success => self.sink.stage(Stage::Complete, &label),
                FileStatus::Skipped => {
                    self.sink.info(format!(
                        "Skipped {label}: {}",
                        outcome.reason.as_deref().unwrap_or_default()
                    ));
                    self.sink.stage(Stage::Complete, &label);
                }
                FileStatus::Error => {
                    self.sink.error(format!(
                        "Failed {label}: {}",
                        outcome.reason.as_deref().unwrap_or_default()
                    ));
                    self.sink.stage(Stage::Failed, &label);
                }
            }
            summary.record(outcome);
        }

        self.sink.info(format!(
            "Batch finished: {} succeeded, {} skipped, {} failed",
            summary.succeeded_count, summary.skipped_count, summary.failed_count
        ));
        Ok(summary)
    }

    fn process_batch_file(&self, request: &BatchRequest, input: &Path, label: &str) -> FileOutcome {
        let options = &request.options;
        let input_buf = input.to_path_buf();
        self.sink.stage(Stage::Analyzing, label);

        if !input.is_file() {
            return FileOutcome::error(input_buf, None, format!("input not found: {}", input.display()));
        }

        let output = match derive_output_path(
            input,
            &request.output_directory,
            options.output_suffix.as_deref(),
            request.operation.output_format(),
        ) {
            Ok(path) => path,
            Err(e) => return FileOutcome::error(input_buf, None, e.to_string()),
        };

        if is_same_file(input, &output) {
            return FileOutcome::error(
                input_buf,
                Some(output),
                "output path is the input file; set an output suffix or another directory",
            );
        }
        if output.exists() && !options.overwrite {
            return FileOutcome::skipped(
                input_buf,
                format!("output {} already exists", output.display()),
            );
        }

        let metrics = match self.profiler.probe_metrics(input) {
            Ok(metrics) => metrics,
            Err(ProbeError::MalformedOutput { reason, .. }) => {
                log::warn!("Unreadable prober output for {label} ({reason}); processing anyway");
                ContainerMetrics::unknown()
            }
            Err(e) => return FileOutcome::error(input_buf, Some(output), e.to_string()),
        };

        if matches!(request.operation, BatchOperation::CompressVideo { .. })
            && metrics.video_codec.is_none()
            && metrics != ContainerMetrics::unknown()
        {
            return FileOutcome::error(input_buf, Some(output), "no video stream to compress");
        }

        if !options.force_process {
            if let Some(reason) = skip_reason(&request.operation, &metrics, &self.config) {
                return FileOutcome::skipped(input_buf, reason);
            }
        }

        self.sink.stage(Stage::Processing, label);
        let args = batch_args(&request.operation, input, &output, &metrics, &self.config);
        match self.runner().run(&args, metrics.duration, label) {
            Ok(()) => FileOutcome::success(input_buf, output),
            Err(e) => FileOutcome::error(input_buf, Some(output), e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Harness;
    use super::*;
    use crate::external::mocks::time_event;
    use crate::job::{BatchOptions, QualityPreset};

    fn audio_request(h: &Harness, inputs: Vec<PathBuf>) -> BatchRequest {
        BatchRequest {
            operation: BatchOperation::CompressAudio {
                target_bitrate_kbps: None,
            },
            input_files: inputs,
            output_directory: h.output_dir().to_path_buf(),
            options: BatchOptions::default(),
        }
    }

    #[test]
    fn test_mp3_batch_skips_low_bitrate_files() {
        let h = Harness::new();
        let inputs: Vec<PathBuf> = [("a.mp3", 96), ("b.mp3", 128), ("c.mp3", 192), ("d.mp3", 256), ("e.mp3", 320)]
            .iter()
            .map(|(name, rate)| h.audio_input(name, *rate, 60.0))
            .collect();
        for _ in 0..3 {
            h.spawner
                .add_success_expectation("libmp3lame", vec![time_event(30.0)], true);
        }

        let summary = h.orchestrator.run_batch(&audio_request(&h, inputs)).unwrap();

        assert_eq!(summary.succeeded_count, 3);
        assert_eq!(summary.skipped_count, 2);
        assert_eq!(summary.failed_count, 0);
        assert!(!summary.cancelled);
        let statuses: Vec<FileStatus> = summary.per_file.iter().map(|f| f.status).collect();
        assert_eq!(
            statuses,
            vec![
                FileStatus::Skipped,
                FileStatus::Skipped,
                FileStatus::Success,
                FileStatus::Success,
                FileStatus::Success
            ]
        );

        let calls = h.spawner.get_received_calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].join(" ").contains("-vn -c:a libmp3lame -b:a 128k"));
    }

    #[test]
    fn test_failed_file_does_not_stop_batch() {
        let h = Harness::new();
        let inputs = vec![h.audio_input("bad.mp3", 320, 10.0), h.audio_input("good.mp3", 320, 10.0)];
        h.spawner.add_exit_error_expectation("bad.mp3", vec![], 1);
        h.spawner.add_success_expectation("good.mp3", vec![], true);

        let summary = h.orchestrator.run_batch(&audio_request(&h, inputs)).unwrap();
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.succeeded_count, 1);
        assert!(summary.per_file[0].reason.as_deref().unwrap().contains("exited"));
    }

    #[test]
    fn test_existing_output_skipped_unless_overwrite() {
        let h = Harness::new();
        let input = h.audio_input("song.mp3", 320, 10.0);
        fs::write(h.output("song.mp3"), b"old").unwrap();

        let summary = h
            .orchestrator
            .run_batch(&audio_request(&h, vec![input.clone()]))
            .unwrap();
        assert_eq!(summary.skipped_count, 1);

        let mut request = audio_request(&h, vec![input]);
        request.options.overwrite = true;
        h.spawner.add_success_expectation("libmp3lame", vec![], true);
        let summary = h.orchestrator.run_batch(&request).unwrap();
        assert_eq!(summary.succeeded_count, 1);
    }

    #[test]
    fn test_output_equal_to_input_is_an_error() {
        let h = Harness::new();
        let input = h.audio_input("track.mp3", 320, 10.0);
        let mut request = audio_request(&h, vec![input.clone()]);
        request.output_directory = input.parent().unwrap().to_path_buf();
        request.options.overwrite = true;

        let summary = h.orchestrator.run_batch(&request).unwrap();
        assert_eq!(summary.failed_count, 1);
        assert!(h.spawner.get_received_calls().is_empty());
    }

    #[test]
    fn test_malformed_probe_is_processed_anyway() {
        let h = Harness::new();
        let input = h.audio_input("odd.mp3", 96, 10.0);
        h.prober.expect_error(
            &input,
            ProbeError::MalformedOutput {
                path: input.display().to_string(),
                reason: "truncated".to_string(),
            },
        );
        h.spawner.add_success_expectation("libmp3lame", vec![], true);

        let summary = h.orchestrator.run_batch(&audio_request(&h, vec![input])).unwrap();
        assert_eq!(summary.succeeded_count, 1);
    }

    #[test]
    fn test_force_process_ignores_threshold() {
        let h = Harness::new();
        let input = h.audio_input("low.mp3", 64, 10.0);
        let mut request = audio_request(&h, vec![input]);
        request.options.force_process = true;
        h.spawner.add_success_expectation("libmp3lame", vec![], true);

        let summary = h.orchestrator.run_batch(&request).unwrap();
        assert_eq!(summary.succeeded_count, 1);
    }

    #[test]
    fn test_abort_stops_remaining_files() {
        let h = Harness::new();
        let inputs = vec![
            h.audio_input("one.mp3", 320, 10.0),
            h.audio_input("two.mp3", 320, 10.0),
            h.audio_input("three.mp3", 320, 10.0),
        ];
        h.spawner
            .add_success_expectation("one.mp3", vec![time_event(1.0), time_event(2.0)], true);
        h.spawner.abort_after_events(h.orchestrator.cancellation(), 1);

        let summary = h.orchestrator.run_batch(&audio_request(&h, inputs)).unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.total(), 1);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(h.spawner.get_received_calls().len(), 1);
    }

    #[test]
    fn test_video_threshold_skips_small_files() {
        let h = Harness::with_config(|c| c.video_bitrate_threshold_kbps = Some(5_000));
        // 2000 kbps container minus 128 kbps audio
        let input = h.video_input("clip.mp4", "h264", 1280, 720, 10.0);
        let request = BatchRequest {
            operation: BatchOperation::CompressVideo {
                quality: QualityConfig::Preset(QualityPreset::Small),
            },
            input_files: vec![input],
            output_directory: h.output_dir().to_path_buf(),
            options: BatchOptions {
                output_suffix: Some("_small".to_string()),
                ..BatchOptions::default()
            },
        };

        let summary = h.orchestrator.run_batch(&request).unwrap();
        assert_eq!(summary.skipped_count, 1);
        assert!(summary.per_file[0].reason.as_deref().unwrap().contains("1872 kbps"));
    }

    #[test]
    fn test_transcode_to_audio_only_drops_video() {
        let h = Harness::new();
        let input = h.video_input("talk.mp4", "h264", 1280, 720, 10.0);
        h.spawner.add_success_expectation("talk.m4a", vec![], true);
        let request = BatchRequest {
            operation: BatchOperation::Transcode {
                format: ContainerFormat::M4a,
                quality: QualityConfig::default(),
            },
            input_files: vec![input],
            output_directory: h.output_dir().to_path_buf(),
            options: BatchOptions::default(),
        };

        let summary = h.orchestrator.run_batch(&request).unwrap();
        assert_eq!(summary.succeeded_count, 1);
        let args = h.spawner.get_received_calls().remove(0);
        assert!(args.contains(&"-vn".to_string()));
        assert!(!args.contains(&"-c:v".to_string()));
        assert_eq!(summary.per_file[0].output, Some(h.output("talk.m4a")));
    }

    #[test]
    fn test_derive_output_path_with_suffix() {
        let path = derive_output_path(
            Path::new("/music/live set.flac"),
            Path::new("/out"),
            Some("_128k"),
            ContainerFormat::Mp3,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/out/live set_128k.mp3"));
    }
}
