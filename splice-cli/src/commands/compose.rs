//! Implementation of the `compose` subcommand.
//!
//! Builds a composition job from a JSON descriptor or from flags, runs it
//! with live progress, and prints a short summary.

use crate::cli::{ComposeArgs, GlobalArgs, ModeArg};
use crate::commands::{core_setup, orchestrator};
use crate::error::{CliErrorContext, CliResult};
use crate::progress::ProgressRenderer;
use crate::terminal::{print_section, print_status, print_success};

use splice_core::job::{OverlayScale, OverlaySpec, TimeWindow};
use splice_core::{
    CancellationToken, CompositionJob, CompositionMode, CompositionReport, CoreConfig,
    event_channel, format_bytes, format_duration,
};

use log::debug;
use std::fs;

/// Turns the parsed arguments into a job. The job is validated when it runs.
pub fn build_job(args: &ComposeArgs, config: &CoreConfig) -> CliResult<CompositionJob> {
    if let Some(path) = &args.job {
        return CompositionJob::from_json_file(path)
            .cli_with_context(|| format!("Failed to load job file {}", path.display()));
    }

    let mode = args.mode.cli_context("A composition mode is required")?;
    let output = args
        .output
        .clone()
        .cli_context("An output file is required")?;

    let mode = match mode {
        ModeArg::Concat => CompositionMode::Concat { audio: args.audio },
        ModeArg::SideBySide => CompositionMode::SideBySide { audio: args.audio },
        ModeArg::Pip => CompositionMode::Pip {
            size: args.pip_size.unwrap_or_default(),
            corner: args.corner.unwrap_or_default(),
            audio: args.audio,
        },
        ModeArg::Insert => CompositionMode::IntroOutroInsert {
            intro: args.intro.clone(),
            outro: args.outro.clone(),
            intro_trim_seconds: args.intro_trim,
            outro_trim_seconds: args.outro_trim,
        },
        ModeArg::Overlay => CompositionMode::LogoWatermarkOverlay {
            overlays: overlay_specs(args),
        },
    };

    let mut job = CompositionJob::new(mode, args.inputs.clone(), output);
    if let Some(format) = args.format {
        job.format = format;
    }
    job.quality = args.quality.to_config(config.default_quality);
    job.geometry.resolution = args.resolution;
    if let Some(aspect) = args.aspect {
        job.geometry.aspect = aspect;
    }
    job.geometry.background = args.background.clone();

    Ok(job)
}

fn overlay_specs(args: &ComposeArgs) -> Vec<OverlaySpec> {
    let scale = match args.overlay_width {
        Some(px) => OverlayScale::Pixels(px),
        None => OverlayScale::Fraction(args.overlay_scale),
    };
    let window = args
        .overlay_start
        .zip(args.overlay_end)
        .map(|(start, end)| TimeWindow { start, end });

    args.overlays
        .iter()
        .map(|image| OverlaySpec {
            image: image.clone(),
            scale,
            opacity: args.opacity,
            position: args.overlay_position,
            window,
        })
        .collect()
}

/// Runs the `compose` subcommand.
pub fn run_compose(
    args: &ComposeArgs,
    global: &GlobalArgs,
    cancel: &CancellationToken,
) -> CliResult<CompositionReport> {
    let (tools, config) = core_setup(global)?;
    let job = build_job(args, &config)?;

    print_section("Composition");
    print_status("Mode", job.mode.name(), true);
    for (i, input) in job.sources().iter().enumerate() {
        print_status(&format!("Input {}", i + 1), &input.display().to_string(), false);
    }
    print_status("Output", &job.output.display().to_string(), false);
    debug!("Job: {job:?}");

    let (sink, events) = event_channel();
    let renderer = ProgressRenderer::spawn(events);
    let orchestrator = orchestrator(tools, config, sink, cancel);

    let result = orchestrator.run_composition(&job);
    drop(orchestrator);
    renderer.finish();
    let report = result?;

    print_section("Summary");
    print_success(&format!("Wrote {}", report.output.display()));
    print_status("Strategy", &report.strategy.to_string(), false);
    if report.preprocessed_inputs > 0 {
        print_status("Preprocessed", &report.preprocessed_inputs.to_string(), false);
    }
    print_status("Duration", &format_duration(report.expected_duration), false);
    print_status("Elapsed", &format_duration(report.elapsed_seconds), false);
    if let Ok(meta) = fs::metadata(&report.output) {
        print_status("Size", &format_bytes(meta.len()), true);
    }

    Ok(report)
}
