//! Stream profile types produced by the profiler.

use crate::codec::{self, CodecFamily};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default frame rate used when the prober reports a degenerate ratio.
pub const DEFAULT_FRAME_RATE: f64 = 25.0;

/// Share of the container bitrate assumed to be video when the audio
/// bitrate is unknown.
pub const VIDEO_SHARE_OF_TOTAL_BITRATE: f64 = 0.85;

/// Stream metadata for one source file, as needed for reconciliation and
/// filter-graph construction.
///
/// Created once per file per job; never mutated afterwards (intermediates
/// produced during preprocessing get a derived copy via [`Self::conformed`]
/// or [`Self::with_path`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaStreamProfile {
    pub path: PathBuf,
    pub display_name: String,
    /// Container duration in seconds
    pub duration: f64,
    pub video_codec: String,
    pub audio_codec: Option<String>,
    pub width: u32,
    pub height: u32,
    pub pixel_format: String,
    pub frame_rate: f64,
    pub sample_aspect_ratio: Option<String>,
    pub display_aspect_ratio: Option<String>,
    pub audio_sample_rate: Option<u32>,
    pub audio_channels: Option<u32>,
    /// Bits per second; estimated from the container when the stream omits it
    pub video_bitrate: Option<u64>,
    pub audio_bitrate: Option<u64>,
    pub codec_profile: Option<String>,
    pub codec_level: Option<i64>,
}

impl MediaStreamProfile {
    /// Resolution in the `WIDTHxHEIGHT` form used for comparisons.
    #[must_use]
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    #[must_use]
    pub fn has_audio(&self) -> bool {
        self.audio_codec.is_some()
    }

    #[must_use]
    pub fn video_family(&self) -> CodecFamily {
        codec::family_of(&self.video_codec)
    }

    #[must_use]
    pub fn audio_family(&self) -> Option<CodecFamily> {
        self.audio_codec.as_deref().map(codec::family_of)
    }

    /// Same stream layout, different file (e.g. a stream-copied intermediate).
    #[must_use]
    pub fn with_path(&self, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..self.clone()
        }
    }

    /// Profile of an intermediate re-encoded to match `reference`.
    ///
    /// Audio presence and duration are kept from `self`; everything the
    /// re-encode forces comes from the reference.
    #[must_use]
    pub fn conformed(&self, reference: &MediaStreamProfile, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            display_name: self.display_name.clone(),
            duration: self.duration,
            video_codec: reference.video_codec.clone(),
            audio_codec: self.audio_codec.as_ref().map(|_| {
                reference
                    .audio_codec
                    .clone()
                    .unwrap_or_else(|| "aac".to_string())
            }),
            width: reference.width,
            height: reference.height,
            pixel_format: reference.pixel_format.clone(),
            frame_rate: reference.frame_rate,
            sample_aspect_ratio: Some("1:1".to_string()),
            display_aspect_ratio: reference.display_aspect_ratio.clone(),
            audio_sample_rate: self.audio_codec.as_ref().and(reference.audio_sample_rate),
            audio_channels: self.audio_codec.as_ref().and(reference.audio_channels),
            video_bitrate: None,
            audio_bitrate: None,
            codec_profile: reference.codec_profile.clone(),
            codec_level: reference.codec_level,
        }
    }

    /// Like [`conformed`](Self::conformed), but the frame size and aspect
    /// ratios stay those of `self`.
    #[must_use]
    pub fn retimed(&self, reference: &MediaStreamProfile, path: &Path) -> Self {
        Self {
            width: self.width,
            height: self.height,
            sample_aspect_ratio: self.sample_aspect_ratio.clone(),
            display_aspect_ratio: self.display_aspect_ratio.clone(),
            ..self.conformed(reference, path)
        }
    }
}

/// Lenient container-level metrics.
///
/// Used where a video stream is not required (audio batches) or where a
/// malformed probe should degrade to "unknown" instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerMetrics {
    pub duration: Option<f64>,
    pub total_bitrate: Option<u64>,
    pub video_codec: Option<String>,
    pub video_bitrate: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub audio_codec: Option<String>,
    pub audio_bitrate: Option<u64>,
}

impl ContainerMetrics {
    /// Metrics for a file the prober could not describe.
    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_video(&self) -> bool {
        self.video_codec.is_some()
    }

    /// Audio bitrate, falling back to the container bitrate for audio-only files.
    #[must_use]
    pub fn effective_audio_bitrate(&self) -> Option<u64> {
        self.audio_bitrate.or(if self.has_video() {
            None
        } else {
            self.total_bitrate
        })
    }
}
