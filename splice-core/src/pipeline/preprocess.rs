//! Preprocessing argument vectors.
//!
//! A fast repackage stream-copies an H.264 input into MPEG-TS with Annex B
//! bitstreams so the compose step can read every input the same way. A
//! conform re-encodes one input to the reference's frame rate and pixel
//! format. Sequential modes also fit it to the reference frame; parallel
//! modes keep the source frame, since the layout graph fits every panel.

use crate::filters::{OUTPUT_PIXEL_FORMAT, fit_filter, format_rate};
use crate::job::AspectMode;
use crate::media::MediaStreamProfile;
use crate::utils::even;
use std::path::Path;

/// Extension of repackaged intermediates.
pub const REPACKAGE_EXTENSION: &str = "ts";

/// Extension of conformed intermediates.
pub const CONFORM_EXTENSION: &str = "mp4";

const CONFORM_PRESET: &str = "veryfast";
const CONFORM_CRF: u8 = 18;

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Stream copy into MPEG-TS.
#[must_use]
pub fn repackage_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        path_arg(input),
        "-c".to_string(),
        "copy".to_string(),
        "-bsf:v".to_string(),
        "h264_mp4toannexb".to_string(),
        "-f".to_string(),
        "mpegts".to_string(),
        path_arg(output),
    ]
}

/// Frame handling of a conform run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConformGeometry<'a> {
    /// Fit to the reference frame size
    Reference {
        aspect: AspectMode,
        background: &'a str,
    },
    /// Keep the source frame size
    Source,
}

/// Near-lossless re-encode of `source` to match `reference`.
#[must_use]
pub fn conform_args(
    source: &MediaStreamProfile,
    reference: &MediaStreamProfile,
    geometry: ConformGeometry<'_>,
    output: &Path,
) -> Vec<String> {
    let rate = format_rate(reference.frame_rate);
    let video_filter = match geometry {
        ConformGeometry::Reference { aspect, background } => format!(
            "{},setsar=1,fps={rate},format={OUTPUT_PIXEL_FORMAT}",
            fit_filter(even(reference.width), even(reference.height), aspect, background),
        ),
        ConformGeometry::Source => format!("fps={rate},format={OUTPUT_PIXEL_FORMAT}"),
    };

    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        path_arg(&source.path),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-vf".to_string(),
        video_filter,
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        CONFORM_PRESET.to_string(),
        "-crf".to_string(),
        CONFORM_CRF.to_string(),
    ];

    if source.has_audio() {
        args.extend(["-map".to_string(), "0:a:0".to_string()]);
        args.extend(["-c:a".to_string(), "aac".to_string()]);
        if let Some(rate) = reference.audio_sample_rate {
            args.extend(["-ar".to_string(), rate.to_string()]);
        }
        if let Some(channels) = reference.audio_channels {
            args.extend(["-ac".to_string(), channels.to_string()]);
        }
    } else {
        args.push("-an".to_string());
    }

    args.push(path_arg(output));
    args
}
