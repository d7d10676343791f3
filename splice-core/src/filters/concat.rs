// ============================================================================
// splice-core/src/filters/concat.rs
// ============================================================================
//
// CONCAT GRAPH: Sequential composition of normalized segments
//
// Every segment gets one video normalization chain (fit to the target frame,
// square pixels, fixed display aspect, common frame rate and pixel format)
// and, unless the job is muted, one audio chain or a synthesized silence of
// the segment's length. A single concat node then joins the pairs in order.
//
// AI-ASSISTANT-INFO: Concat filter graph, shared with intro/outro insertion

use super::{FilterGraph, GraphContext, normalize_audio, normalize_video, silence};
use crate::error::CoreResult;
use crate::job::AudioPolicy;

/// One entry of a concat graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Index of the source in the encoder inputs
    pub input: usize,
    /// `start..end` seconds of the source to keep
    pub window: Option<(f64, f64)>,
}

impl Segment {
    #[must_use]
    pub fn whole(input: usize) -> Self {
        Self {
            input,
            window: None,
        }
    }
}

/// Concat graph over every source, in order.
pub fn build_concat(ctx: &GraphContext<'_>) -> CoreResult<FilterGraph> {
    let segments: Vec<Segment> = (0..ctx.profiles.len()).map(Segment::whole).collect();
    Ok(concat_segments(ctx, &segments))
}

/// Concat graph over explicit segments.
#[must_use]
pub fn concat_segments(ctx: &GraphContext<'_>, segments: &[Segment]) -> FilterGraph {
    let with_audio = ctx.audio != AudioPolicy::Mute;
    let mut chains = Vec::with_capacity(segments.len() * 2 + 1);
    let mut pads = String::new();
    let mut durations = Vec::with_capacity(segments.len());

    for (i, segment) in segments.iter().enumerate() {
        let profile = &ctx.profiles[segment.input];
        let duration = segment
            .window
            .map_or(profile.duration, |(start, end)| end - start);
        durations.push(duration);

        let video = format!("v{i}");
        chains.push(normalize_video(
            ctx,
            segment.input,
            ctx.target,
            segment.window,
            &video,
        ));
        pads.push_str(&format!("[{video}]"));

        if with_audio {
            let audio = format!("a{i}");
            if profile.has_audio() {
                chains.push(normalize_audio(ctx, segment.input, segment.window, &audio));
            } else {
                log::debug!(
                    "{} has no audio; inserting {:.2}s of silence",
                    profile.display_name,
                    duration
                );
                chains.push(silence(ctx, duration, &audio));
            }
            pads.push_str(&format!("[{audio}]"));
        }
    }

    let count = segments.len();
    let (audio_flag, outputs) = if with_audio {
        (1, "[outv][outa]")
    } else {
        (0, "[outv]")
    };
    chains.push(format!(
        "{pads}concat=n={count}:v=1:a={audio_flag}{outputs}"
    ));

    FilterGraph {
        inputs: ctx.profiles.iter().map(|p| p.path.clone()).collect(),
        chains,
        video_out: "outv".to_string(),
        audio_out: with_audio.then(|| "outa".to_string()),
        segment_durations: durations,
    }
}
