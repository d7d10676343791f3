// ============================================================================
// splice-core/src/reconcile.rs
// ============================================================================
//
// RECONCILIATION PLANNER: Deciding how inputs are made concatenation-safe
//
// Every input profile is compared against a reference profile. The result
// decides whether the inputs go into the compose step as they are, are first
// stream-copied into an elementary-stream container, or are re-encoded to the
// reference's geometry and timing.
//
// KEY COMPONENTS:
// - MismatchReasons: per-field difference flags against the reference
// - InputAssessment / InputAction: what preprocessing each input receives
// - ReconciliationStrategy / ReconciliationPlan: the overall decision
// - plan(): the pure planning function
//
// AI-ASSISTANT-INFO: Reference-based reconciliation planning

// ---- Internal crate imports ----
use crate::codec::CodecFamily;
use crate::media::MediaStreamProfile;

// ---- External crate imports ----
use serde::Serialize;

// ---- Standard library imports ----
use std::fmt;
use std::path::PathBuf;

/// Frame rates closer than this (after rounding to 2 decimals) are equal.
const FRAME_RATE_TOLERANCE: f64 = 0.01;

/// Which fields of an input differ from the reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MismatchReasons {
    pub codec: bool,
    pub audio_codec: bool,
    pub frame_rate: bool,
    pub resolution: bool,
    pub pixel_format: bool,
    pub audio_sample_rate: bool,
    pub audio_channels: bool,
}

impl MismatchReasons {
    #[must_use]
    pub fn any(&self) -> bool {
        self.codec
            || self.audio_codec
            || self.frame_rate
            || self.resolution
            || self.pixel_format
            || self.audio_sample_rate
            || self.audio_channels
    }

    /// Differences that stream copy cannot paper over.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        self.frame_rate || self.resolution || self.pixel_format
    }

    /// Names of the differing fields, for logs.
    #[must_use]
    pub fn describe(&self) -> Vec<&'static str> {
        let flags = [
            (self.codec, "codec"),
            (self.audio_codec, "audio codec"),
            (self.frame_rate, "frame rate"),
            (self.resolution, "resolution"),
            (self.pixel_format, "pixel format"),
            (self.audio_sample_rate, "audio sample rate"),
            (self.audio_channels, "audio channels"),
        ];
        flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, name)| *name)
            .collect()
    }
}

/// Preprocessing an input receives before composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InputAction {
    Keep,
    Repackage,
    Reencode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputAssessment {
    pub file: PathBuf,
    pub mismatches: MismatchReasons,
    pub action: InputAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReconciliationStrategy {
    None,
    FastRepackage,
    FullReencode,
}

impl fmt::Display for ReconciliationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReconciliationStrategy::None => "none",
            ReconciliationStrategy::FastRepackage => "fast repackage",
            ReconciliationStrategy::FullReencode => "full re-encode",
        };
        f.write_str(name)
    }
}

/// Outcome of comparing a job's inputs against its reference profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationPlan {
    pub reference: MediaStreamProfile,
    /// One entry per input, in input order.
    pub inputs: Vec<InputAssessment>,
    pub strategy: ReconciliationStrategy,
}

impl ReconciliationPlan {
    /// Indices of the inputs that need `action`.
    #[must_use]
    pub fn indices_needing(&self, action: InputAction) -> Vec<usize> {
        self.inputs
            .iter()
            .enumerate()
            .filter(|(_, a)| a.action == action)
            .map(|(i, _)| i)
            .collect()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compares one profile against the reference.
///
/// The codec flag tracks the raw identifier (case-insensitive), so
/// `h264` against `avc1` is a codec mismatch even though both belong to the
/// same family; the family only decides whether a repackage can absorb it.
#[must_use]
pub fn compare(profile: &MediaStreamProfile, reference: &MediaStreamProfile) -> MismatchReasons {
    let codec = !profile
        .video_codec
        .trim()
        .eq_ignore_ascii_case(reference.video_codec.trim())
        || profile.video_family() != reference.video_family();

    let audio_codec = match (profile.audio_family(), reference.audio_family()) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    };

    let audio_sample_rate = match (profile.audio_sample_rate, reference.audio_sample_rate) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    };

    let audio_channels = match (profile.audio_channels, reference.audio_channels) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    };

    MismatchReasons {
        codec,
        audio_codec,
        frame_rate: (round2(profile.frame_rate) - round2(reference.frame_rate)).abs()
            > FRAME_RATE_TOLERANCE,
        resolution: profile.resolution() != reference.resolution(),
        pixel_format: profile.pixel_format != reference.pixel_format,
        audio_sample_rate,
        audio_channels,
    }
}

/// Plans reconciliation of `profiles` against `reference`.
///
/// `reference` is normally one of `profiles` (the first input, or the main
/// clip in insert/overlay modes) and never reports a mismatch against itself.
/// A fast repackage applies to every input, the reference included.
///
/// Heterogeneous sets get the conservative treatment: with more than one
/// non-reference input, no individual mismatch, and not every file H.264,
/// every input is re-encoded.
#[must_use]
pub fn plan(profiles: &[MediaStreamProfile], reference: &MediaStreamProfile) -> ReconciliationPlan {
    let assessments: Vec<(PathBuf, MismatchReasons)> = profiles
        .iter()
        .map(|p| (p.path.clone(), compare(p, reference)))
        .collect();

    let all_h264 = profiles
        .iter()
        .chain(std::iter::once(reference))
        .all(|p| p.video_family() == CodecFamily::H264);
    let any_mismatch = assessments.iter().any(|(_, m)| m.any());
    let any_structural = assessments.iter().any(|(_, m)| m.is_structural());
    // Positions, not paths: a clip repeated in the list counts each time.
    let reference_listed = profiles.iter().any(|p| p.path == reference.path);
    let non_reference_count = profiles.len().saturating_sub(usize::from(reference_listed));

    let strategy = if !any_mismatch {
        if non_reference_count > 1 && !all_h264 {
            log::warn!(
                "Inputs match the reference but are not all H.264; re-encoding all {} inputs",
                profiles.len()
            );
            ReconciliationStrategy::FullReencode
        } else {
            ReconciliationStrategy::None
        }
    } else if all_h264 && !any_structural {
        ReconciliationStrategy::FastRepackage
    } else {
        ReconciliationStrategy::FullReencode
    };

    let heterogeneous = strategy == ReconciliationStrategy::FullReencode && !any_mismatch;

    let inputs = assessments
        .into_iter()
        .map(|(file, mismatches)| {
            let action = match strategy {
                ReconciliationStrategy::None => InputAction::Keep,
                ReconciliationStrategy::FastRepackage => InputAction::Repackage,
                ReconciliationStrategy::FullReencode if heterogeneous || mismatches.any() => {
                    InputAction::Reencode
                }
                ReconciliationStrategy::FullReencode => InputAction::Keep,
            };
            if mismatches.any() {
                log::debug!(
                    "{} differs from reference {}: {}",
                    file.display(),
                    reference.display_name,
                    mismatches.describe().join(", ")
                );
            }
            InputAssessment {
                file,
                mismatches,
                action,
            }
        })
        .collect();

    log::info!("Reconciliation strategy: {strategy}");

    ReconciliationPlan {
        reference: reference.clone(),
        inputs,
        strategy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn profile(name: &str, codec: &str) -> MediaStreamProfile {
        MediaStreamProfile {
            path: PathBuf::from(format!("/in/{name}")),
            display_name: name.to_string(),
            duration: 10.0,
            video_codec: codec.to_string(),
            audio_codec: Some("aac".to_string()),
            width: 1920,
            height: 1080,
            pixel_format: "yuv420p".to_string(),
            frame_rate: 25.0,
            sample_aspect_ratio: Some("1:1".to_string()),
            display_aspect_ratio: Some("16:9".to_string()),
            audio_sample_rate: Some(48000),
            audio_channels: Some(2),
            video_bitrate: Some(5_000_000),
            audio_bitrate: Some(128_000),
            codec_profile: None,
            codec_level: None,
        }
    }

    #[test]
    fn test_identical_profiles_need_nothing() {
        let profiles = vec![
            profile("a.mp4", "h264"),
            profile("b.mp4", "h264"),
            profile("c.mp4", "h264"),
        ];
        let plan = plan(&profiles, &profiles[0]);
        assert_eq!(plan.strategy, ReconciliationStrategy::None);
        assert!(plan.inputs.iter().all(|a| a.action == InputAction::Keep));
    }

    #[test]
    fn test_h264_alias_difference_repackages() {
        let profiles = vec![profile("a.mp4", "h264"), profile("b.mov", "avc1")];
        let plan = plan(&profiles, &profiles[0]);
        assert_eq!(plan.strategy, ReconciliationStrategy::FastRepackage);
        assert!(plan.inputs[1].mismatches.codec);
        assert_eq!(plan.indices_needing(InputAction::Repackage), vec![0, 1]);
    }

    #[test]
    fn test_structural_mismatch_reencodes_only_offenders() {
        let mut small = profile("b.mp4", "h264");
        small.width = 1280;
        small.height = 720;
        let profiles = vec![profile("a.mp4", "h264"), small, profile("c.mp4", "h264")];
        let plan = plan(&profiles, &profiles[0]);
        assert_eq!(plan.strategy, ReconciliationStrategy::FullReencode);
        assert_eq!(plan.indices_needing(InputAction::Reencode), vec![1]);
        assert!(plan.inputs[1].mismatches.resolution);
    }

    #[test]
    fn test_frame_rate_tolerance() {
        let mut ntsc = profile("b.mp4", "h264");
        ntsc.frame_rate = 25.004;
        assert!(!compare(&ntsc, &profile("a.mp4", "h264")).frame_rate);
        ntsc.frame_rate = 29.97;
        assert!(compare(&ntsc, &profile("a.mp4", "h264")).frame_rate);
    }

    #[test]
    fn test_audio_fields_compared_only_when_both_known() {
        let mut silent = profile("b.mp4", "h264");
        silent.audio_codec = None;
        silent.audio_sample_rate = None;
        silent.audio_channels = None;
        assert!(!compare(&silent, &profile("a.mp4", "h264")).any());
    }

    #[test]
    fn test_heterogeneous_non_h264_set_reencodes_everything() {
        let profiles = vec![
            profile("a.mkv", "hevc"),
            profile("b.mkv", "hevc"),
            profile("c.mkv", "hevc"),
        ];
        let plan = plan(&profiles, &profiles[0]);
        assert_eq!(plan.strategy, ReconciliationStrategy::FullReencode);
        assert_eq!(plan.indices_needing(InputAction::Reencode), vec![0, 1, 2]);
    }

    #[test]
    fn test_repeated_reference_clip_counts_per_position() {
        let profiles = vec![
            profile("a.mkv", "hevc"),
            profile("b.mkv", "hevc"),
            profile("a.mkv", "hevc"),
        ];
        let plan = plan(&profiles, &profiles[0]);
        assert_eq!(plan.strategy, ReconciliationStrategy::FullReencode);
        assert_eq!(plan.indices_needing(InputAction::Reencode), vec![0, 1, 2]);
    }

    #[test]
    fn test_single_non_h264_pair_is_left_alone() {
        let profiles = vec![profile("a.mkv", "hevc"), profile("b.mkv", "hevc")];
        let plan = plan(&profiles, &profiles[0]);
        assert_eq!(plan.strategy, ReconciliationStrategy::None);
    }

    #[test]
    fn test_audio_codec_difference_with_non_h264_video_reencodes() {
        let mut mp3 = profile("b.mkv", "hevc");
        mp3.audio_codec = Some("mp3".to_string());
        let profiles = vec![profile("a.mkv", "hevc"), mp3];
        let plan = plan(&profiles, &profiles[0]);
        assert_eq!(plan.strategy, ReconciliationStrategy::FullReencode);
        assert_eq!(plan.indices_needing(InputAction::Reencode), vec![1]);
        assert_eq!(plan.inputs[0].file, Path::new("/in/a.mkv"));
    }
}
