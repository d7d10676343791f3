//! Parallel layouts: side-by-side and picture-in-picture.

use super::{FilterGraph, GraphContext, format_rate, normalize_video, parallel_audio};
use crate::error::{CoreError, CoreResult};
use crate::job::{CompositionMode, Corner, Resolution};
use crate::utils::even;

use super::OUTPUT_PIXEL_FORMAT;

/// Two inputs, each fitted into half the target width at full height, stacked
/// horizontally.
pub fn build_side_by_side(ctx: &GraphContext<'_>) -> CoreResult<FilterGraph> {
    let half = Resolution::new(even(ctx.target.width / 2), ctx.target.height);

    let mut chains = vec![
        normalize_video(ctx, 0, half, None, "left"),
        normalize_video(ctx, 1, half, None, "right"),
        "[left][right]hstack=inputs=2[outv]".to_string(),
    ];
    let audio_out = parallel_audio(ctx, &mut chains);

    Ok(FilterGraph {
        inputs: ctx.profiles.iter().map(|p| p.path.clone()).collect(),
        chains,
        video_out: "outv".to_string(),
        audio_out,
        segment_durations: ctx.profiles.iter().map(|p| p.duration).collect(),
    })
}

/// `overlay` coordinates placing an inset `margin` pixels from a corner.
#[must_use]
pub fn corner_position(corner: Corner, margin: u32) -> (String, String) {
    let left = margin.to_string();
    let top = margin.to_string();
    let right = format!("main_w-overlay_w-{margin}");
    let bottom = format!("main_h-overlay_h-{margin}");
    match corner {
        Corner::TopLeft => (left, top),
        Corner::TopRight => (right, top),
        Corner::BottomLeft => (left, bottom),
        Corner::BottomRight => (right, bottom),
    }
}

/// Main input fills the frame; the second is scaled to a fraction of the
/// width and composited at a corner.
pub fn build_pip(ctx: &GraphContext<'_>) -> CoreResult<FilterGraph> {
    let CompositionMode::Pip { size, corner, .. } = &ctx.job.mode else {
        return Err(CoreError::OperationFailed(format!(
            "pip builder called for {}",
            ctx.job.mode.name()
        )));
    };

    let inset_width = even(ctx.target.width / size.divisor()).max(2);
    let (x, y) = corner_position(*corner, ctx.margin);

    // The inset keeps its own aspect ratio; only the width is fixed.
    let inset = format!(
        "[1:v]scale={inset_width}:-2,setsar=1,fps={},format={OUTPUT_PIXEL_FORMAT}[inset]",
        format_rate(ctx.frame_rate)
    );

    let mut chains = vec![
        normalize_video(ctx, 0, ctx.target, None, "base"),
        inset,
        format!("[base][inset]overlay=x={x}:y={y}:eof_action=pass[outv]"),
    ];
    let audio_out = parallel_audio(ctx, &mut chains);

    Ok(FilterGraph {
        inputs: ctx.profiles.iter().map(|p| p.path.clone()).collect(),
        chains,
        video_out: "outv".to_string(),
        audio_out,
        segment_durations: ctx.profiles.iter().map(|p| p.duration).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::{context, profile};
    use crate::job::{AudioPolicy, CompositionJob, PipSize};

    #[test]
    fn test_side_by_side_halves_the_target() {
        let profiles = vec![
            profile("wide.mp4", 1920, 1080, 12.0),
            profile("small.mp4", 640, 480, 8.0),
        ];
        let job = CompositionJob::new(
            CompositionMode::SideBySide { audio: None },
            vec!["/in/wide.mp4".into(), "/in/small.mp4".into()],
            "/out/sbs.mp4",
        );
        let ctx = context(&job, &profiles, Resolution::new(1920, 1080));
        let graph = build_side_by_side(&ctx).unwrap();
        let fc = graph.filter_complex();

        assert!(fc.contains(
            "[0:v]scale=960:1080:force_original_aspect_ratio=decrease,pad=960:1080:(ow-iw)/2:(oh-ih)/2"
        ));
        assert!(fc.contains(
            "[1:v]scale=960:1080:force_original_aspect_ratio=decrease,pad=960:1080:(ow-iw)/2:(oh-ih)/2"
        ));
        assert!(fc.contains("hstack=inputs=2[outv]"));
        assert_eq!(graph.audio_out.as_deref(), Some("outa"));
        assert!(fc.contains("[0:a]aresample=48000"));
    }

    #[test]
    fn test_side_by_side_odd_half_is_even() {
        let profiles = vec![
            profile("a.mp4", 1278, 720, 1.0),
            profile("b.mp4", 1278, 720, 1.0),
        ];
        let job = CompositionJob::new(
            CompositionMode::SideBySide { audio: Some(AudioPolicy::Mix) },
            vec!["/in/a.mp4".into(), "/in/b.mp4".into()],
            "/out/sbs.mp4",
        );
        let ctx = context(&job, &profiles, Resolution::new(1278, 720));
        let fc = build_side_by_side(&ctx).unwrap().filter_complex();
        assert!(fc.contains("pad=638:720"));
        assert!(fc.contains("amix=inputs=2:duration=longest[outa]"));
    }

    #[test]
    fn test_pip_corner_and_size() {
        let profiles = vec![
            profile("main.mp4", 1920, 1080, 30.0),
            profile("cam.mp4", 1280, 720, 40.0),
        ];
        let job = CompositionJob::new(
            CompositionMode::Pip {
                size: PipSize::Quarter,
                corner: Corner::BottomRight,
                audio: None,
            },
            vec!["/in/main.mp4".into(), "/in/cam.mp4".into()],
            "/out/pip.mp4",
        );
        let ctx = context(&job, &profiles, Resolution::new(1920, 1080));
        let graph = build_pip(&ctx).unwrap();
        let fc = graph.filter_complex();

        assert!(fc.contains("[1:v]scale=480:-2,setsar=1"));
        assert!(fc.contains("overlay=x=main_w-overlay_w-20:y=main_h-overlay_h-20"));
        assert_eq!(graph.segment_durations, vec![30.0, 40.0]);
    }

    #[test]
    fn test_corner_positions() {
        assert_eq!(
            corner_position(Corner::TopLeft, 20),
            ("20".to_string(), "20".to_string())
        );
        assert_eq!(
            corner_position(Corner::TopRight, 10).0,
            "main_w-overlay_w-10"
        );
    }
}
