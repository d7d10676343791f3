// ============================================================================
// splice-core/src/media/probe.rs
// ============================================================================
//
// STREAM PROFILER: Turning prober JSON into MediaStreamProfile values
//
// KEY COMPONENTS:
// - StreamProfiler: runs an FfprobeExecutor and parses its output
// - parse_profile / parse_metrics: strict and lenient parsers
// - parse_frame_rate / estimate_video_bitrate: derived-field helpers
//
// The prober reports most numeric fields as strings ("44100", "128000",
// "12.480000"), some as numbers, so numeric fields are read through
// `serde_json::Value` and converted leniently.
//
// AI-ASSISTANT-INFO: ffprobe output parsing and profile construction

// ---- Internal crate imports ----
use crate::error::ProbeError;
use crate::external::FfprobeExecutor;
use crate::media::profile::{
    ContainerMetrics, DEFAULT_FRAME_RATE, MediaStreamProfile, VIDEO_SHARE_OF_TOTAL_BITRATE,
};
use crate::utils::display_name;

// ---- External crate imports ----
use serde::Deserialize;
use serde_json::Value;

// ---- Standard library imports ----
use std::path::Path;

// ============================================================================
// RAW PROBER DOCUMENT
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProbeDocument {
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<Value>,
    height: Option<Value>,
    pix_fmt: Option<String>,
    r_frame_rate: Option<String>,
    sample_rate: Option<Value>,
    channels: Option<Value>,
    bit_rate: Option<Value>,
    profile: Option<Value>,
    level: Option<Value>,
    sample_aspect_ratio: Option<String>,
    display_aspect_ratio: Option<String>,
    duration: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    duration: Option<Value>,
    bit_rate: Option<Value>,
}

impl ProbeDocument {
    fn first_stream(&self, kind: &str) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
    }

    fn format_duration(&self) -> Option<f64> {
        self.format
            .as_ref()
            .and_then(|f| value_as_f64(f.duration.as_ref()))
    }

    fn format_bitrate(&self) -> Option<u64> {
        self.format
            .as_ref()
            .and_then(|f| value_as_u64(f.bit_rate.as_ref()))
    }
}

fn value_as_f64(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn value_as_u64(value: Option<&Value>) -> Option<u64> {
    value_as_f64(value)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u64)
}

fn value_as_u32(value: Option<&Value>) -> Option<u32> {
    value_as_u64(value).and_then(|v| u32::try_from(v).ok())
}

fn value_as_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() && s != "unknown" => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_document(path: &Path, json: &str) -> Result<ProbeDocument, ProbeError> {
    serde_json::from_str::<ProbeDocument>(json).map_err(|e| ProbeError::MalformedOutput {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

// ============================================================================
// DERIVED FIELDS
// ============================================================================

/// Parses a `num/den` frame-rate string.
///
/// Falls back to [`DEFAULT_FRAME_RATE`] when the field is absent, malformed or
/// has a zero denominator/numerator.
#[must_use]
pub fn parse_frame_rate(rate: Option<&str>) -> f64 {
    let Some(rate) = rate else {
        return DEFAULT_FRAME_RATE;
    };

    let parsed = match rate.split_once('/') {
        Some((num, den)) => match (num.trim().parse::<f64>(), den.trim().parse::<f64>()) {
            (Ok(n), Ok(d)) if d != 0.0 => Some(n / d),
            _ => None,
        },
        None => rate.trim().parse::<f64>().ok(),
    };

    match parsed {
        Some(fps) if fps.is_finite() && fps > 0.0 => fps,
        _ => DEFAULT_FRAME_RATE,
    }
}

/// Video bitrate, estimated from the container when the stream omits it.
///
/// `total - audio` when both are known, `total * 0.85` when only the total is.
#[must_use]
pub fn estimate_video_bitrate(
    stream_bitrate: Option<u64>,
    total_bitrate: Option<u64>,
    audio_bitrate: Option<u64>,
) -> Option<u64> {
    if stream_bitrate.is_some() {
        return stream_bitrate;
    }
    match (total_bitrate, audio_bitrate) {
        (Some(total), Some(audio)) if total > audio => Some(total - audio),
        (Some(total), Some(_)) => Some((total as f64 * VIDEO_SHARE_OF_TOTAL_BITRATE) as u64),
        (Some(total), None) => Some((total as f64 * VIDEO_SHARE_OF_TOTAL_BITRATE) as u64),
        (None, _) => None,
    }
}

// ============================================================================
// PARSERS
// ============================================================================

/// Parses prober JSON into a profile; a video stream is mandatory.
pub fn parse_profile(path: &Path, json: &str) -> Result<MediaStreamProfile, ProbeError> {
    let doc = parse_document(path, json)?;
    let malformed = |reason: &str| ProbeError::MalformedOutput {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };

    let video = doc
        .first_stream("video")
        .ok_or_else(|| ProbeError::NoVideoStream(path.display().to_string()))?;
    let audio = doc.first_stream("audio");

    let video_codec = video
        .codec_name
        .clone()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| malformed("video stream has no codec_name"))?;
    let width = value_as_u32(video.width.as_ref())
        .filter(|w| *w > 0)
        .ok_or_else(|| malformed("video stream has no valid width"))?;
    let height = value_as_u32(video.height.as_ref())
        .filter(|h| *h > 0)
        .ok_or_else(|| malformed("video stream has no valid height"))?;

    let duration = doc
        .format_duration()
        .or_else(|| value_as_f64(video.duration.as_ref()))
        .unwrap_or_else(|| {
            log::warn!(
                "No duration reported for {}; progress will be unavailable",
                path.display()
            );
            0.0
        });

    let audio_bitrate = audio.and_then(|a| value_as_u64(a.bit_rate.as_ref()));
    let video_bitrate = estimate_video_bitrate(
        value_as_u64(video.bit_rate.as_ref()),
        doc.format_bitrate(),
        audio_bitrate,
    );

    Ok(MediaStreamProfile {
        path: path.to_path_buf(),
        display_name: display_name(path),
        duration,
        video_codec,
        audio_codec: audio.and_then(|a| a.codec_name.clone()),
        width,
        height,
        pixel_format: video
            .pix_fmt
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        frame_rate: parse_frame_rate(video.r_frame_rate.as_deref()),
        sample_aspect_ratio: video.sample_aspect_ratio.clone(),
        display_aspect_ratio: video.display_aspect_ratio.clone(),
        audio_sample_rate: audio.and_then(|a| value_as_u32(a.sample_rate.as_ref())),
        audio_channels: audio.and_then(|a| value_as_u32(a.channels.as_ref())),
        video_bitrate,
        audio_bitrate,
        codec_profile: value_as_string(video.profile.as_ref()),
        codec_level: value_as_f64(video.level.as_ref())
            .map(|l| l as i64)
            .filter(|l| *l > 0),
    })
}

/// Parses prober JSON into lenient container metrics (no stream is required).
pub fn parse_metrics(path: &Path, json: &str) -> Result<ContainerMetrics, ProbeError> {
    let doc = parse_document(path, json)?;
    let video = doc.first_stream("video");
    let audio = doc.first_stream("audio");
    let total_bitrate = doc.format_bitrate();
    let audio_bitrate = audio.and_then(|a| value_as_u64(a.bit_rate.as_ref()));

    Ok(ContainerMetrics {
        duration: doc.format_duration(),
        total_bitrate,
        video_codec: video.and_then(|v| v.codec_name.clone()),
        video_bitrate: video.and_then(|v| {
            estimate_video_bitrate(value_as_u64(v.bit_rate.as_ref()), total_bitrate, audio_bitrate)
        }),
        width: video.and_then(|v| value_as_u32(v.width.as_ref())),
        height: video.and_then(|v| value_as_u32(v.height.as_ref())),
        audio_codec: audio.and_then(|a| a.codec_name.clone()),
        audio_bitrate,
    })
}

// ============================================================================
// PROFILER
// ============================================================================

/// Runs the prober through an [`FfprobeExecutor`] and parses the result.
#[derive(Debug, Clone)]
pub struct StreamProfiler<P: FfprobeExecutor> {
    executor: P,
}

impl<P: FfprobeExecutor> StreamProfiler<P> {
    pub fn new(executor: P) -> Self {
        Self { executor }
    }

    /// Full profile of a file that must contain a video stream.
    pub fn probe(&self, path: &Path) -> Result<MediaStreamProfile, ProbeError> {
        let json = self.executor.probe_json(path)?;
        let profile = parse_profile(path, &json)?;
        log::debug!(
            "Profiled {}: {} {} @ {:.3} fps, {}, audio {:?}, {:.2}s",
            profile.display_name,
            profile.video_codec,
            profile.resolution(),
            profile.frame_rate,
            profile.pixel_format,
            profile.audio_codec,
            profile.duration
        );
        Ok(profile)
    }

    /// Container metrics; tolerant of files without video.
    pub fn probe_metrics(&self, path: &Path) -> Result<ContainerMetrics, ProbeError> {
        let json = self.executor.probe_json(path)?;
        parse_metrics(path, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "codec_type": "video",
                "profile": "High",
                "width": 1920,
                "height": 1080,
                "pix_fmt": "yuv420p",
                "level": 40,
                "sample_aspect_ratio": "1:1",
                "display_aspect_ratio": "16:9",
                "r_frame_rate": "30000/1001",
                "bit_rate": "4500000"
            },
            {
                "index": 1,
                "codec_name": "aac",
                "codec_type": "audio",
                "sample_rate": "48000",
                "channels": 2,
                "bit_rate": "192000"
            }
        ],
        "format": { "duration": "12.480000", "bit_rate": "4700000" }
    }"#;

    #[test]
    fn test_parse_full_profile() {
        let p = parse_profile(Path::new("/in/clip.mp4"), SAMPLE).unwrap();
        assert_eq!(p.display_name, "clip.mp4");
        assert_eq!(p.video_codec, "h264");
        assert_eq!(p.audio_codec.as_deref(), Some("aac"));
        assert_eq!(p.resolution(), "1920x1080");
        assert!((p.frame_rate - 29.97).abs() < 0.01);
        assert_eq!(p.audio_sample_rate, Some(48000));
        assert_eq!(p.audio_channels, Some(2));
        assert_eq!(p.video_bitrate, Some(4_500_000));
        assert_eq!(p.codec_profile.as_deref(), Some("High"));
        assert_eq!(p.codec_level, Some(40));
        assert!((p.duration - 12.48).abs() < 1e-9);
    }

    #[test]
    fn test_no_video_stream_is_hard_failure() {
        let json = r#"{"streams":[{"codec_type":"audio","codec_name":"mp3"}],"format":{}}"#;
        assert_eq!(
            parse_profile(Path::new("song.mp3"), json),
            Err(ProbeError::NoVideoStream("song.mp3".to_string()))
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = parse_profile(Path::new("x.mp4"), "not json at all").unwrap_err();
        assert!(matches!(err, ProbeError::MalformedOutput { .. }));

        let err = parse_profile(Path::new("x.mp4"), r#"{"format":{}}"#).unwrap_err();
        assert!(matches!(err, ProbeError::MalformedOutput { .. }));
    }

    #[test]
    fn test_frame_rate_fallbacks() {
        assert_eq!(parse_frame_rate(Some("25/1")), 25.0);
        assert_eq!(parse_frame_rate(Some("0/0")), DEFAULT_FRAME_RATE);
        assert_eq!(parse_frame_rate(Some("30/0")), DEFAULT_FRAME_RATE);
        assert_eq!(parse_frame_rate(None), DEFAULT_FRAME_RATE);
        assert_eq!(parse_frame_rate(Some("garbage")), DEFAULT_FRAME_RATE);
    }

    #[test]
    fn test_bitrate_estimation() {
        assert_eq!(estimate_video_bitrate(Some(1000), Some(5000), None), Some(1000));
        assert_eq!(estimate_video_bitrate(None, Some(5000), Some(1000)), Some(4000));
        assert_eq!(estimate_video_bitrate(None, Some(10_000), None), Some(8500));
        assert_eq!(estimate_video_bitrate(None, None, Some(1000)), None);
    }

    #[test]
    fn test_metrics_for_audio_only() {
        let json = r#"{
            "streams":[{"codec_type":"audio","codec_name":"mp3","bit_rate":"320000"}],
            "format":{"duration":"180.5","bit_rate":"320500"}
        }"#;
        let m = parse_metrics(Path::new("song.mp3"), json).unwrap();
        assert!(!m.has_video());
        assert_eq!(m.audio_bitrate, Some(320_000));
        assert_eq!(m.duration, Some(180.5));
    }
}
