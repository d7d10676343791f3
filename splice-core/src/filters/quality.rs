//! Quality and codec directives.
//!
//! Maps a [`QualityConfig`] and output container onto encoder arguments.
//! Named presets are a fixed `{crf, speed, audio bitrate}` triple. Source
//! matching targets the source's own bitrate plus 10% headroom, or a
//! resolution-tiered CRF when the bitrate is unknown.

use crate::job::{ContainerFormat, CustomQuality, QualityConfig, QualityPreset};
use crate::media::{ContainerMetrics, MediaStreamProfile};

use super::OUTPUT_PIXEL_FORMAT;

/// Bitrate headroom applied when matching the source bitrate.
pub const SOURCE_MATCH_HEADROOM: f64 = 1.1;

/// Audio bitrate when nothing else decides it.
pub const FALLBACK_AUDIO_KBPS: u32 = 128;

const DEFAULT_SPEED: &str = "medium";

/// The measurements quality decisions are based on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceStats {
    /// Bits per second
    pub video_bitrate: Option<u64>,
    pub audio_bitrate: Option<u64>,
    pub width: u32,
    pub height: u32,
}

impl SourceStats {
    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl From<&MediaStreamProfile> for SourceStats {
    fn from(profile: &MediaStreamProfile) -> Self {
        Self {
            video_bitrate: profile.video_bitrate,
            audio_bitrate: profile.audio_bitrate,
            width: profile.width,
            height: profile.height,
        }
    }
}

impl From<&ContainerMetrics> for SourceStats {
    fn from(metrics: &ContainerMetrics) -> Self {
        Self {
            video_bitrate: metrics.video_bitrate,
            audio_bitrate: metrics.effective_audio_bitrate(),
            width: metrics.width.unwrap_or(0),
            height: metrics.height.unwrap_or(0),
        }
    }
}

/// CRF for a source of `pixels` when no bitrate is known; finer for larger frames.
#[must_use]
pub fn tiered_crf(pixels: u64) -> u8 {
    match pixels {
        p if p >= 3840 * 2160 => 20,
        p if p >= 1920 * 1080 => 21,
        p if p >= 1280 * 720 => 22,
        _ => 23,
    }
}

/// Source bitrate plus headroom, in kbit/s.
#[must_use]
pub fn matched_bitrate_kbps(bitrate_bps: u64) -> u64 {
    ((bitrate_bps as f64 * SOURCE_MATCH_HEADROOM) / 1000.0).round() as u64
}

enum RateControl {
    Crf(u8),
    BitrateKbps(u64),
}

fn source_match(source: &SourceStats) -> RateControl {
    match source.video_bitrate.filter(|b| *b > 0) {
        Some(bitrate) => RateControl::BitrateKbps(matched_bitrate_kbps(bitrate)),
        None => RateControl::Crf(tiered_crf(source.pixel_count())),
    }
}

fn custom_rate(custom: &CustomQuality, source: &SourceStats) -> RateControl {
    if let Some(kbps) = custom.video_bitrate_kbps {
        RateControl::BitrateKbps(u64::from(kbps))
    } else if let Some(crf) = custom.crf {
        RateControl::Crf(crf)
    } else {
        source_match(source)
    }
}

/// Video codec, rate-control and pixel-format arguments.
///
/// Empty for audio-only containers.
#[must_use]
pub fn video_args(quality: &QualityConfig, format: ContainerFormat, source: &SourceStats) -> Vec<String> {
    let Some(encoder) = format.video_encoder() else {
        return Vec::new();
    };

    let (rate, speed) = match quality {
        QualityConfig::Preset(preset) => (RateControl::Crf(preset.crf()), preset.speed()),
        QualityConfig::SourceMatch => (source_match(source), DEFAULT_SPEED),
        QualityConfig::Custom(custom) => (
            custom_rate(custom, source),
            custom.speed.as_deref().unwrap_or(DEFAULT_SPEED),
        ),
    };

    let mut args = vec!["-c:v".to_string(), encoder.to_string()];
    let is_h264 = encoder == "libx264";

    if is_h264 {
        args.extend(["-preset".to_string(), speed.to_string()]);
    } else {
        args.extend(["-row-mt".to_string(), "1".to_string()]);
    }

    match rate {
        RateControl::Crf(crf) => {
            args.extend(["-crf".to_string(), crf.to_string()]);
            if !is_h264 {
                args.extend(["-b:v".to_string(), "0".to_string()]);
            }
        }
        RateControl::BitrateKbps(kbps) => {
            args.extend(["-b:v".to_string(), format!("{kbps}k")]);
        }
    }

    args.extend(["-pix_fmt".to_string(), OUTPUT_PIXEL_FORMAT.to_string()]);

    if is_h264 {
        let custom = match quality {
            QualityConfig::Custom(custom) => Some(custom),
            _ => None,
        };
        let profile = custom
            .and_then(|c| c.profile.as_deref())
            .unwrap_or("baseline");
        args.extend(["-profile:v".to_string(), profile.to_string()]);
        if let Some(level) = custom.and_then(|c| c.level.as_deref()) {
            args.extend(["-level".to_string(), level.to_string()]);
        }
    }

    args
}

/// Audio bitrate in kbit/s for the given quality.
#[must_use]
pub fn audio_bitrate_kbps(quality: &QualityConfig, source: &SourceStats) -> u32 {
    match quality {
        QualityConfig::Preset(preset) => preset.audio_bitrate_kbps(),
        QualityConfig::SourceMatch => source
            .audio_bitrate
            .map(|bps| ((bps / 1000) as u32).clamp(64, 320))
            .unwrap_or(FALLBACK_AUDIO_KBPS),
        QualityConfig::Custom(custom) => custom
            .audio_bitrate_kbps
            .unwrap_or(QualityPreset::Balanced.audio_bitrate_kbps()),
    }
}

/// Audio codec, bitrate and sample-rate arguments.
#[must_use]
pub fn audio_args(quality: &QualityConfig, format: ContainerFormat, source: &SourceStats) -> Vec<String> {
    let mut args = vec!["-c:a".to_string(), format.audio_encoder().to_string()];
    if format.audio_takes_bitrate() {
        args.push("-b:a".to_string());
        args.push(format!("{}k", audio_bitrate_kbps(quality, source)));
    }
    if let Some(rate) = quality.sample_rate() {
        args.extend(["-ar".to_string(), rate.to_string()]);
    }
    args
}

/// Container-level flags.
#[must_use]
pub fn container_args(format: ContainerFormat) -> Vec<String> {
    if format.wants_faststart() {
        vec!["-movflags".to_string(), "+faststart".to_string()]
    } else {
        Vec::new()
    }
}
