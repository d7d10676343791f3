//! Intro/outro insertion.
//!
//! The main clip is trimmed at both ends, then intro, main and outro are
//! joined with the concat graph.

use super::concat::{Segment, concat_segments};
use super::{FilterGraph, GraphContext};
use crate::error::{CoreError, CoreResult, PlanError};
use crate::job::CompositionMode;

/// Duration left after trimming; must be strictly positive.
pub fn validate_trim(duration: f64, intro_trim: f64, outro_trim: f64) -> Result<f64, PlanError> {
    let remaining = duration - intro_trim - outro_trim;
    if remaining > 0.0 && remaining.is_finite() {
        Ok(remaining)
    } else {
        Err(PlanError::InvalidTrim {
            duration,
            intro_trim,
            outro_trim,
            remaining,
        })
    }
}

/// `[intro] + trimmed main + [outro]` as one concat graph.
pub fn build_insert(ctx: &GraphContext<'_>) -> CoreResult<FilterGraph> {
    let CompositionMode::IntroOutroInsert {
        intro,
        intro_trim_seconds,
        outro_trim_seconds,
        ..
    } = &ctx.job.mode
    else {
        return Err(CoreError::OperationFailed(format!(
            "insert builder called for {}",
            ctx.job.mode.name()
        )));
    };

    let main_index = usize::from(intro.is_some());
    let main = ctx.profiles.get(main_index).ok_or_else(|| {
        CoreError::OperationFailed("insert mode is missing its main clip".to_string())
    })?;

    let remaining = validate_trim(main.duration, *intro_trim_seconds, *outro_trim_seconds)?;
    let window = (*intro_trim_seconds > 0.0 || *outro_trim_seconds > 0.0)
        .then(|| (*intro_trim_seconds, intro_trim_seconds + remaining));

    let segments: Vec<Segment> = (0..ctx.profiles.len())
        .map(|i| Segment {
            input: i,
            window: if i == main_index { window } else { None },
        })
        .collect();

    Ok(concat_segments(ctx, &segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::{context, profile};
    use crate::job::{CompositionJob, Resolution};

    #[test]
    fn test_trim_longer_than_source_is_invalid() {
        assert_eq!(
            validate_trim(12.0, 10.0, 5.0),
            Err(PlanError::InvalidTrim {
                duration: 12.0,
                intro_trim: 10.0,
                outro_trim: 5.0,
                remaining: -3.0,
            })
        );
        assert!(validate_trim(15.0, 10.0, 5.0).is_err());
    }

    #[test]
    fn test_trim_leaves_five_seconds() {
        assert_eq!(validate_trim(20.0, 10.0, 5.0), Ok(5.0));
    }

    #[test]
    fn test_insert_graph_orders_intro_main_outro() {
        let profiles = vec![
            profile("intro.mp4", 1920, 1080, 3.0),
            profile("main.mp4", 1920, 1080, 20.0),
            profile("outro.mp4", 1280, 720, 4.0),
        ];
        let job = CompositionJob::new(
            CompositionMode::IntroOutroInsert {
                intro: Some("/in/intro.mp4".into()),
                outro: Some("/in/outro.mp4".into()),
                intro_trim_seconds: 10.0,
                outro_trim_seconds: 5.0,
            },
            vec!["/in/main.mp4".into()],
            "/out/final.mp4",
        );
        let ctx = context(&job, &profiles, Resolution::new(1920, 1080));
        let graph = build_insert(&ctx).unwrap();
        let fc = graph.filter_complex();

        assert_eq!(graph.segment_durations, vec![3.0, 5.0, 4.0]);
        assert!(fc.contains("[1:v]trim=start=10:end=15,setpts=PTS-STARTPTS"));
        assert!(!fc.contains("[0:v]trim"));
        assert!(fc.contains("concat=n=3:v=1:a=1[outv][outa]"));
    }

    #[test]
    fn test_insert_with_impossible_trim_fails() {
        let profiles = vec![profile("main.mp4", 1920, 1080, 12.0)];
        let job = CompositionJob::new(
            CompositionMode::IntroOutroInsert {
                intro: None,
                outro: None,
                intro_trim_seconds: 10.0,
                outro_trim_seconds: 5.0,
            },
            vec!["/in/main.mp4".into()],
            "/out/final.mp4",
        );
        let ctx = context(&job, &profiles, Resolution::new(1920, 1080));
        assert!(matches!(
            build_insert(&ctx),
            Err(CoreError::Plan(PlanError::InvalidTrim { .. }))
        ));
    }
}
