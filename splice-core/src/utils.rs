//! Utility functions for formatting and path handling.
//!
//! This module provides general-purpose helpers used throughout the
//! splice-core library: duration/byte formatting, ffmpeg time parsing and
//! safe file-name extraction.

use std::path::Path;

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Parses an ffmpeg time value to seconds.
///
/// Accepts both `HH:MM:SS.ss` and bare seconds (`123.45`). Negative values
/// and `N/A` yield `None`.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let time = time.trim();
    if time.is_empty() || time.starts_with('-') {
        return None;
    }

    let parts: Vec<&str> = time.split(':').collect();
    let seconds = match parts.len() {
        3 => {
            let hours = parts[0].parse::<f64>().ok()?;
            let minutes = parts[1].parse::<f64>().ok()?;
            let seconds = parts[2].parse::<f64>().ok()?;
            hours * 3600.0 + minutes * 60.0 + seconds
        }
        1 => parts[0].parse::<f64>().ok()?,
        _ => return None,
    };

    if seconds.is_finite() && seconds >= 0.0 {
        Some(seconds)
    } else {
        None
    }
}

/// Safely extracts filename from a path with consistent error handling.
pub fn get_filename_safe(path: &Path) -> crate::CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| {
            crate::CoreError::PathError(format!("Failed to get filename for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}

/// Best-effort display name: the file name, or the whole path when it has none.
#[must_use]
pub fn display_name(path: &Path) -> String {
    get_filename_safe(path).unwrap_or_else(|_| path.display().to_string())
}

/// Rounds down to the nearest even number (encoders reject odd chroma dimensions).
#[must_use]
pub fn even(value: u32) -> u32 {
    value & !1
}

/// Greatest common divisor, used to reduce aspect ratios.
#[must_use]
pub fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(59.9), "00:00:59");
        assert_eq!(format_duration(3661.0), "01:01:01");
        assert_eq!(format_duration(90061.0), "25:01:01");

        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(1024 * 1024 * 2), "2.00 MiB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GiB");
    }

    #[test]
    fn test_parse_ffmpeg_time() {
        assert_eq!(parse_ffmpeg_time("00:00:00"), Some(0.0));
        assert_eq!(parse_ffmpeg_time("01:02:03"), Some(3723.0));
        assert_eq!(parse_ffmpeg_time("00:00:01.25"), Some(1.25));
        assert_eq!(parse_ffmpeg_time("01:30:45.75"), Some(5445.75));

        // Bare seconds
        assert_eq!(parse_ffmpeg_time("12.5"), Some(12.5));
        assert_eq!(parse_ffmpeg_time("7"), Some(7.0));

        assert_eq!(parse_ffmpeg_time(""), None);
        assert_eq!(parse_ffmpeg_time("N/A"), None);
        assert_eq!(parse_ffmpeg_time("00:00"), None);
        assert_eq!(parse_ffmpeg_time("-00:00:01.00"), None);
        assert_eq!(parse_ffmpeg_time("aa:bb:cc"), None);
    }

    #[test]
    fn test_get_filename_safe() {
        assert_eq!(
            get_filename_safe(Path::new("/path/to/file.mp4")).unwrap(),
            "file.mp4"
        );
        assert!(get_filename_safe(Path::new("/")).is_err());
    }

    #[test]
    fn test_even_and_gcd() {
        assert_eq!(even(961), 960);
        assert_eq!(even(960), 960);
        assert_eq!(gcd(1920, 1080), 120);
        assert_eq!(gcd(7, 0), 7);
    }
}
