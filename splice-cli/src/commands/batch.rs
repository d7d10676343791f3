//! Implementation of the `batch` subcommand.

use crate::cli::{BatchArgs, BatchKind, GlobalArgs};
use crate::commands::{core_setup, orchestrator};
use crate::error::{CliErrorContext, CliResult};
use crate::progress::ProgressRenderer;
use crate::terminal::{
    print_failure, print_file_list, print_section, print_skipped, print_status, print_success,
};

use splice_core::{
    BatchOperation, BatchOptions, BatchRequest, BatchSummary, CancellationToken, CoreConfig,
    FileOutcome, FileStatus, event_channel,
};

use log::debug;

pub fn build_request(args: &BatchArgs, config: &CoreConfig) -> CliResult<BatchRequest> {
    let quality = args.quality.to_config(config.default_quality);
    let operation = match args.operation {
        BatchKind::CompressAudio => BatchOperation::CompressAudio {
            target_bitrate_kbps: args.bitrate,
        },
        BatchKind::CompressVideo => BatchOperation::CompressVideo { quality },
        BatchKind::Transcode => BatchOperation::Transcode {
            format: args
                .format
                .cli_context("transcode needs a target --format")?,
            quality,
        },
    };

    Ok(BatchRequest {
        operation,
        input_files: args.inputs.clone(),
        output_directory: args.output_dir.clone(),
        options: BatchOptions {
            force_process: args.force,
            overwrite: args.overwrite,
            output_suffix: args.suffix.clone(),
        },
    })
}

/// Runs the `batch` subcommand. Per-file failures are reported in the
/// summary, not as an error.
pub fn run_batch(
    args: &BatchArgs,
    global: &GlobalArgs,
    cancel: &CancellationToken,
) -> CliResult<BatchSummary> {
    let (tools, config) = core_setup(global)?;
    let request = build_request(args, &config)?;

    print_section("Batch");
    print_status("Operation", request.operation.name(), true);
    print_status(
        "Output dir",
        &request.output_directory.display().to_string(),
        false,
    );
    print_file_list(
        &format!("Found {} file(s):", request.input_files.len()),
        &request.input_files,
    );
    debug!("Request: {request:?}");

    let (sink, events) = event_channel();
    let renderer = ProgressRenderer::spawn(events);
    let orchestrator = orchestrator(tools, config, sink, cancel);

    let result = orchestrator.run_batch(&request);
    drop(orchestrator);
    renderer.finish();
    let summary = result?;

    print_summary(&summary);

    if args.json {
        let json = serde_json::to_string_pretty(&summary)?;
        println!("{json}");
    }

    Ok(summary)
}

fn outcome_line(outcome: &FileOutcome) -> String {
    let name = outcome.input.display();
    match (&outcome.output, &outcome.reason) {
        (_, Some(reason)) => format!("{name}: {reason}"),
        (Some(output), None) => format!("{name} -> {}", output.display()),
        (None, None) => name.to_string(),
    }
}

fn print_summary(summary: &BatchSummary) {
    print_section("Batch Summary");
    for outcome in &summary.per_file {
        let line = outcome_line(outcome);
        match outcome.status {
            FileStatus::Success => print_success(&line),
            FileStatus::Skipped => print_skipped(&line),
            FileStatus::Error => print_failure(&line),
        }
    }
    print_counts(summary);
}

fn print_counts(summary: &BatchSummary) {
    print_status("Succeeded", &summary.succeeded_count.to_string(), false);
    print_status("Skipped", &summary.skipped_count.to_string(), false);
    print_status(
        "Failed",
        &summary.failed_count.to_string(),
        summary.failed_count > 0,
    );
    if summary.cancelled {
        print_status("Cancelled", "remaining files were not processed", true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use splice_core::{ContainerFormat, QualityConfig, QualityPreset};
    use std::path::PathBuf;

    fn batch_args(argv: &[&str]) -> BatchArgs {
        let mut full = vec!["splice", "batch"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Batch(args) => args,
            _ => panic!("expected batch"),
        }
    }

    #[test]
    fn test_transcode_request() {
        let args = batch_args(&[
            "transcode", "a.avi", "b.avi", "-o", "out", "--format", "webm", "--suffix", "_web",
            "--overwrite",
        ]);
        let request = build_request(&args, &CoreConfig::default()).unwrap();

        assert_eq!(
            request.operation,
            BatchOperation::Transcode {
                format: ContainerFormat::Webm,
                quality: QualityConfig::Preset(QualityPreset::Balanced),
            }
        );
        assert_eq!(request.input_files.len(), 2);
        assert_eq!(request.output_directory, PathBuf::from("out"));
        assert!(request.options.overwrite);
        assert!(!request.options.force_process);
        assert_eq!(request.options.output_suffix.as_deref(), Some("_web"));
    }

    #[test]
    fn test_compress_audio_bitrate_is_optional() {
        let args = batch_args(&["compress-audio", "talk.wav", "-o", "out"]);
        let request = build_request(&args, &CoreConfig::default()).unwrap();
        assert_eq!(
            request.operation,
            BatchOperation::CompressAudio {
                target_bitrate_kbps: None
            }
        );

        let args = batch_args(&["compress-audio", "talk.wav", "-o", "out", "--bitrate", "96"]);
        let request = build_request(&args, &CoreConfig::default()).unwrap();
        assert_eq!(
            request.operation,
            BatchOperation::CompressAudio {
                target_bitrate_kbps: Some(96)
            }
        );
    }

    #[test]
    fn test_compress_video_force() {
        let args = batch_args(&["compress-video", "clip.mov", "-o", "out", "--force", "-q", "small"]);
        let request = build_request(&args, &CoreConfig::default()).unwrap();
        assert!(request.options.force_process);
        assert_eq!(
            request.operation,
            BatchOperation::CompressVideo {
                quality: QualityConfig::Preset(QualityPreset::Small)
            }
        );
    }

    #[test]
    fn test_outcome_lines() {
        let ok = FileOutcome::success(PathBuf::from("a.mp4"), PathBuf::from("out/a.mp4"));
        assert_eq!(outcome_line(&ok), "a.mp4 -> out/a.mp4");

        let skipped = FileOutcome {
            input: PathBuf::from("b.mp4"),
            output: None,
            status: FileStatus::Skipped,
            reason: Some("already compressed".to_string()),
        };
        assert_eq!(outcome_line(&skipped), "b.mp4: already compressed");
    }
}
