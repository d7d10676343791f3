//! Codec family classification.
//!
//! Maps the raw codec identifiers reported by the prober (or used as encoder
//! names) onto canonical families whose bitstreams are interchangeable. The
//! classification is a pure, total function: unknown identifiers map to
//! `CodecFamily::Other` holding the lowercase id.

use std::fmt;

/// Canonical compatibility family of a codec identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CodecFamily {
    H264,
    H265,
    Aac,
    Mp3,
    Wmv,
    Wma,
    /// Unrecognized identifier, lowercased and trimmed.
    Other(String),
}

impl CodecFamily {
    /// Canonical tag for the family.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            CodecFamily::H264 => "h264",
            CodecFamily::H265 => "h265",
            CodecFamily::Aac => "aac",
            CodecFamily::Mp3 => "mp3",
            CodecFamily::Wmv => "wmv",
            CodecFamily::Wma => "wma",
            CodecFamily::Other(id) => id,
        }
    }
}

impl fmt::Display for CodecFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Alias groups. Exact matches are tried first across all groups, then
// substring matches in table order.
const H264_ALIASES: &[&str] = &[
    "h264",
    "libx264",
    "avc1",
    "avc",
    "x264",
    "h264_nvenc",
    "h264_qsv",
    "h264_videotoolbox",
];
const H265_ALIASES: &[&str] = &[
    "hevc",
    "h265",
    "libx265",
    "hvc1",
    "hev1",
    "x265",
    "hevc_nvenc",
    "hevc_qsv",
];
const AAC_ALIASES: &[&str] = &["aac", "libfdk_aac", "mp4a", "aac_latm"];
const MP3_ALIASES: &[&str] = &["mp3", "libmp3lame", "mp3float", "mp3adu"];
const WMV_ALIASES: &[&str] = &["wmv1", "wmv2", "wmv3", "wmv"];
const WMA_ALIASES: &[&str] = &["wmav1", "wmav2", "wmapro", "wmalossless", "wma"];

fn alias_table() -> [(&'static [&'static str], CodecFamily); 6] {
    [
        (H264_ALIASES, CodecFamily::H264),
        (H265_ALIASES, CodecFamily::H265),
        (AAC_ALIASES, CodecFamily::Aac),
        (MP3_ALIASES, CodecFamily::Mp3),
        (WMV_ALIASES, CodecFamily::Wmv),
        (WMA_ALIASES, CodecFamily::Wma),
    ]
}

/// Returns the canonical family for a codec identifier (case-insensitive).
#[must_use]
pub fn family_of(codec_id: &str) -> CodecFamily {
    let id = codec_id.trim().to_ascii_lowercase();
    let table = alias_table();

    for (aliases, family) in &table {
        if aliases.iter().any(|alias| *alias == id) {
            return family.clone();
        }
    }
    if !id.is_empty() {
        for (aliases, family) in &table {
            if aliases.iter().any(|alias| id.contains(alias)) {
                return family.clone();
            }
        }
    }
    CodecFamily::Other(id)
}

/// True when both identifiers belong to the same family.
#[must_use]
pub fn compatible(a: &str, b: &str) -> bool {
    family_of(a) == family_of(b)
}
