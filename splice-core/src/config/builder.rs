// ============================================================================
// splice-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Fluent construction of CoreConfig
//
// KEY COMPONENTS:
// - CoreConfigBuilder: starts from CoreConfig::default() and overrides fields
//
// AI-ASSISTANT-INFO: Builder pattern implementation for CoreConfig

// ---- Standard library imports ----
use std::path::PathBuf;
use std::time::Duration;

// ---- Internal crate imports ----
use super::CoreConfig;
use crate::job::QualityPreset;

/// Builder for creating CoreConfig instances.
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new builder holding the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base directory for job workspaces.
    #[must_use]
    pub fn temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.config.temp_dir = Some(temp_dir);
        self
    }

    #[must_use]
    pub fn availability_timeout(mut self, timeout: Duration) -> Self {
        self.config.availability_timeout = timeout;
        self
    }

    #[must_use]
    pub fn stderr_tail_lines(mut self, lines: usize) -> Self {
        self.config.stderr_tail_lines = lines;
        self
    }

    /// Sets the bitrate at or below which MP3 files are left alone.
    #[must_use]
    pub fn mp3_bitrate_threshold_kbps(mut self, kbps: u32) -> Self {
        self.config.mp3_bitrate_threshold_kbps = kbps;
        self
    }

    #[must_use]
    pub fn mp3_target_bitrate_kbps(mut self, kbps: u32) -> Self {
        self.config.mp3_target_bitrate_kbps = kbps;
        self
    }

    /// Enables skipping of video files at or below `kbps`.
    #[must_use]
    pub fn video_bitrate_threshold_kbps(mut self, kbps: u32) -> Self {
        self.config.video_bitrate_threshold_kbps = Some(kbps);
        self
    }

    #[must_use]
    pub fn default_quality(mut self, preset: QualityPreset) -> Self {
        self.config.default_quality = preset;
        self
    }

    #[must_use]
    pub fn pip_margin(mut self, margin: u32) -> Self {
        self.config.pip_margin = margin;
        self
    }

    #[must_use]
    pub fn default_background(mut self, color: &str) -> Self {
        self.config.default_background = color.to_string();
        self
    }

    /// Builds the configuration. Call `CoreConfig::validate` to check it.
    #[must_use]
    pub fn build(self) -> CoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_only_what_is_set() {
        let config = CoreConfigBuilder::new()
            .pip_margin(32)
            .video_bitrate_threshold_kbps(2500)
            .default_quality(QualityPreset::High)
            .build();

        assert_eq!(config.pip_margin, 32);
        assert_eq!(config.video_bitrate_threshold_kbps, Some(2500));
        assert_eq!(config.default_quality, QualityPreset::High);
        assert_eq!(config.stderr_tail_lines, super::super::DEFAULT_STDERR_TAIL_LINES);
    }
}
