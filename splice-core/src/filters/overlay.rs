//! Logo and watermark overlay chains.
//!
//! The base video is normalized to the target frame; each image input is
//! scaled, optionally faded through a channel mixer, and composited onto the
//! running result. A time window gates an overlay with an `enable` expression.

use super::{FilterGraph, GraphContext, format_seconds, normalize_video, parallel_audio};
use crate::error::{CoreError, CoreResult};
use crate::job::{CompositionMode, OverlayPosition, OverlayScale, OverlaySpec};
use crate::utils::even;

/// Overlay width in pixels for a target frame `target_width` wide.
#[must_use]
pub fn overlay_width(scale: OverlayScale, target_width: u32) -> u32 {
    let width = match scale {
        OverlayScale::Pixels(px) => px,
        OverlayScale::Fraction(fraction) => (f64::from(target_width) * fraction).round() as u32,
    };
    even(width).max(2)
}

/// `overlay` x/y expressions for a position.
#[must_use]
pub fn position_expr(position: OverlayPosition, margin: u32) -> (String, String) {
    let near = margin.to_string();
    let far_x = format!("main_w-overlay_w-{margin}");
    let far_y = format!("main_h-overlay_h-{margin}");
    match position {
        OverlayPosition::TopLeft => (near.clone(), near),
        OverlayPosition::TopRight => (far_x, near),
        OverlayPosition::BottomLeft => (near, far_y),
        OverlayPosition::BottomRight => (far_x, far_y),
        OverlayPosition::Center => (
            "(main_w-overlay_w)/2".to_string(),
            "(main_h-overlay_h)/2".to_string(),
        ),
        OverlayPosition::Custom { x, y } => (x.to_string(), y.to_string()),
    }
}

fn image_chain(spec: &OverlaySpec, input: usize, target_width: u32, label: &str) -> String {
    let width = overlay_width(spec.scale, target_width);
    let blend = if spec.opacity < 1.0 {
        format!(",format=rgba,colorchannelmixer=aa={}", format_opacity(spec.opacity))
    } else {
        String::new()
    };
    format!("[{input}:v]scale={width}:-2{blend}[{label}]")
}

fn format_opacity(opacity: f64) -> String {
    format_seconds(opacity.clamp(0.0, 1.0))
}

fn composite(spec: &OverlaySpec, base: &str, image: &str, out: &str, margin: u32) -> String {
    let (x, y) = position_expr(spec.position, margin);
    let enable = spec
        .window
        .map(|w| {
            format!(
                ":enable='between(t,{},{})'",
                format_seconds(w.start),
                format_seconds(w.end)
            )
        })
        .unwrap_or_default();
    format!("[{base}][{image}]overlay=x={x}:y={y}{enable}[{out}]")
}

/// Base video with every configured overlay composited in order.
pub fn build_overlay(ctx: &GraphContext<'_>) -> CoreResult<FilterGraph> {
    let CompositionMode::LogoWatermarkOverlay { overlays } = &ctx.job.mode else {
        return Err(CoreError::OperationFailed(format!(
            "overlay builder called for {}",
            ctx.job.mode.name()
        )));
    };
    let base = ctx.profiles.first().ok_or_else(|| {
        CoreError::OperationFailed("overlay mode needs a base video".to_string())
    })?;

    let mut chains = vec![normalize_video(ctx, 0, ctx.target, None, "base")];
    let mut inputs = vec![base.path.clone()];
    let mut current = "base".to_string();

    for (k, spec) in overlays.iter().enumerate() {
        let input = k + 1;
        let image = format!("ov{k}");
        let out = if k + 1 == overlays.len() {
            "outv".to_string()
        } else {
            format!("tmp{k}")
        };
        inputs.push(spec.image.clone());
        chains.push(image_chain(spec, input, ctx.target.width, &image));
        chains.push(composite(spec, &current, &image, &out, ctx.margin));
        current = out;
    }

    let audio_out = parallel_audio(ctx, &mut chains);

    Ok(FilterGraph {
        inputs,
        chains,
        video_out: current,
        audio_out,
        segment_durations: vec![base.duration],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::{context, profile};
    use crate::job::{CompositionJob, Resolution, TimeWindow};

    fn spec(image: &str, opacity: f64, window: Option<TimeWindow>) -> OverlaySpec {
        OverlaySpec {
            image: image.into(),
            scale: OverlayScale::Fraction(0.1),
            opacity,
            position: OverlayPosition::TopRight,
            window,
        }
    }

    #[test]
    fn test_two_overlays_chain_through_intermediate() {
        let profiles = vec![profile("base.mp4", 1920, 1080, 60.0)];
        let job = CompositionJob::new(
            CompositionMode::LogoWatermarkOverlay {
                overlays: vec![
                    spec("/img/logo.png", 0.5, None),
                    spec("/img/bug.png", 1.0, Some(TimeWindow { start: 5.0, end: 12.5 })),
                ],
            },
            vec!["/in/base.mp4".into()],
            "/out/branded.mp4",
        );
        let ctx = context(&job, &profiles, Resolution::new(1920, 1080));
        let graph = build_overlay(&ctx).unwrap();
        let fc = graph.filter_complex();

        assert_eq!(graph.inputs.len(), 3);
        assert!(fc.contains("[1:v]scale=192:-2,format=rgba,colorchannelmixer=aa=0.5[ov0]"));
        assert!(fc.contains("[2:v]scale=192:-2[ov1]"));
        assert!(fc.contains("[base][ov0]overlay=x=main_w-overlay_w-20:y=20[tmp0]"));
        assert!(fc.contains("[tmp0][ov1]overlay=x=main_w-overlay_w-20:y=20:enable='between(t,5,12.5)'[outv]"));
        assert_eq!(graph.video_out, "outv");
        assert_eq!(graph.segment_durations, vec![60.0]);
    }

    #[test]
    fn test_positions() {
        assert_eq!(
            position_expr(OverlayPosition::Custom { x: 12, y: 34 }, 20),
            ("12".to_string(), "34".to_string())
        );
        assert_eq!(
            position_expr(OverlayPosition::Center, 20).0,
            "(main_w-overlay_w)/2"
        );
    }

    #[test]
    fn test_overlay_width() {
        assert_eq!(overlay_width(OverlayScale::Pixels(201), 1920), 200);
        assert_eq!(overlay_width(OverlayScale::Fraction(0.25), 1280), 320);
    }
}
