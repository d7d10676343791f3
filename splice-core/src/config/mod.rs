//! Configuration structures and constants for the splice-core library.
//!
//! This module holds the knobs that are not part of an individual job:
//! where job workspaces live, how long the availability check may take,
//! batch skip thresholds and composition defaults.

mod builder;

use crate::error::{CoreError, CoreResult};
use crate::job::QualityPreset;
use std::path::PathBuf;
use std::time::Duration;

pub use builder::CoreConfigBuilder;

// Default constants

/// Hard bound on the `-version` availability check, after which the tool is killed.
pub const DEFAULT_AVAILABILITY_TIMEOUT_SECS: u64 = 5;

/// Number of trailing stderr lines kept for error reports.
pub const DEFAULT_STDERR_TAIL_LINES: usize = 20;

/// MP3 files at or below this audio bitrate are skipped by audio compression.
pub const DEFAULT_MP3_BITRATE_THRESHOLD_KBPS: u32 = 128;

/// Bitrate used when re-encoding MP3 files.
pub const DEFAULT_MP3_TARGET_BITRATE_KBPS: u32 = 128;

/// Distance in pixels between a picture-in-picture inset and the frame edge.
pub const DEFAULT_PIP_MARGIN: u32 = 20;

/// Fill color for letterbox/pillarbox padding.
pub const DEFAULT_BACKGROUND: &str = "black";

/// Main configuration structure for the splice-core library.
///
/// Created once by the consumer (e.g. splice-cli) and passed to the
/// orchestrator. All fields have defaults; the builder is the usual way to
/// override a few of them.
///
/// # Examples
///
/// ```rust
/// use splice_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .temp_dir(PathBuf::from("/tmp/splice"))
///     .mp3_bitrate_threshold_kbps(160)
///     .build();
/// assert_eq!(config.mp3_bitrate_threshold_kbps, 160);
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Base directory for job workspaces (system temp dir when `None`)
    pub temp_dir: Option<PathBuf>,

    /// Timeout for the encoder/prober availability check
    pub availability_timeout: Duration,

    /// How many trailing stderr lines a failed run reports
    pub stderr_tail_lines: usize,

    pub mp3_bitrate_threshold_kbps: u32,
    pub mp3_target_bitrate_kbps: u32,

    /// Video compression skips files at or below this bitrate; `None` never skips
    pub video_bitrate_threshold_kbps: Option<u32>,

    /// Quality used when a job or batch does not specify one
    pub default_quality: QualityPreset,

    pub pip_margin: u32,
    pub default_background: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            availability_timeout: Duration::from_secs(DEFAULT_AVAILABILITY_TIMEOUT_SECS),
            stderr_tail_lines: DEFAULT_STDERR_TAIL_LINES,
            mp3_bitrate_threshold_kbps: DEFAULT_MP3_BITRATE_THRESHOLD_KBPS,
            mp3_target_bitrate_kbps: DEFAULT_MP3_TARGET_BITRATE_KBPS,
            video_bitrate_threshold_kbps: None,
            default_quality: QualityPreset::Balanced,
            pip_margin: DEFAULT_PIP_MARGIN,
            default_background: DEFAULT_BACKGROUND.to_string(),
        }
    }
}

impl CoreConfig {
    /// Rejects values no job could run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.availability_timeout.is_zero() {
            return Err(CoreError::Config(
                "availability timeout must be greater than zero".to_string(),
            ));
        }
        if self.stderr_tail_lines == 0 {
            return Err(CoreError::Config(
                "stderr tail must keep at least one line".to_string(),
            ));
        }
        if self.mp3_target_bitrate_kbps == 0 {
            return Err(CoreError::Config(
                "MP3 target bitrate must be greater than zero".to_string(),
            ));
        }
        if self.default_background.trim().is_empty() {
            return Err(CoreError::Config(
                "background color must not be empty".to_string(),
            ));
        }
        if let Some(dir) = &self.temp_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(CoreError::Config(format!(
                    "temp dir {} is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Base directory for job workspaces.
    #[must_use]
    pub fn workspace_base(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
