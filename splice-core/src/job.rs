// ============================================================================
// splice-core/src/job.rs
// ============================================================================
//
// JOB MODEL: What callers submit to the orchestrator
//
// Composition jobs and batch requests are closed, tagged types. Everything a
// job can ask for is validated here, at the submission boundary, so the
// planner and graph builders never have to second-guess option shapes.
//
// KEY COMPONENTS:
// - CompositionJob / CompositionMode: single-output composition requests
// - QualityConfig / QualityPreset: named preset, source match, or custom
// - Geometry / Resolution / AspectMode: output frame shape
// - AudioPolicy, PipSize, Corner, OverlaySpec: mode options
// - ContainerFormat: output container and its default codecs
// - BatchRequest / BatchOperation / BatchOptions: per-file batch requests
//
// AI-ASSISTANT-INFO: Job descriptors and submission-time validation

// ---- Internal crate imports ----
use crate::error::InputError;
use crate::filters::{DurationPolicy, mode_spec};

// ---- External crate imports ----
use serde::{Deserialize, Serialize};

// ---- Standard library imports ----
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ============================================================================
// OUTPUT CONTAINERS
// ============================================================================

/// Output container, which also fixes the default encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Mp4,
    Mkv,
    Mov,
    Webm,
    Avi,
    Mp3,
    M4a,
    Wav,
    Ogg,
    Flac,
}

impl ContainerFormat {
    pub const ALL: [ContainerFormat; 10] = [
        ContainerFormat::Mp4,
        ContainerFormat::Mkv,
        ContainerFormat::Mov,
        ContainerFormat::Webm,
        ContainerFormat::Avi,
        ContainerFormat::Mp3,
        ContainerFormat::M4a,
        ContainerFormat::Wav,
        ContainerFormat::Ogg,
        ContainerFormat::Flac,
    ];

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Mkv => "mkv",
            ContainerFormat::Mov => "mov",
            ContainerFormat::Webm => "webm",
            ContainerFormat::Avi => "avi",
            ContainerFormat::Mp3 => "mp3",
            ContainerFormat::M4a => "m4a",
            ContainerFormat::Wav => "wav",
            ContainerFormat::Ogg => "ogg",
            ContainerFormat::Flac => "flac",
        }
    }

    #[must_use]
    pub fn is_audio_only(self) -> bool {
        matches!(
            self,
            ContainerFormat::Mp3
                | ContainerFormat::M4a
                | ContainerFormat::Wav
                | ContainerFormat::Ogg
                | ContainerFormat::Flac
        )
    }

    /// Video encoder for this container; `None` for audio-only containers.
    #[must_use]
    pub fn video_encoder(self) -> Option<&'static str> {
        match self {
            ContainerFormat::Webm => Some("libvpx-vp9"),
            f if f.is_audio_only() => None,
            _ => Some("libx264"),
        }
    }

    #[must_use]
    pub fn audio_encoder(self) -> &'static str {
        match self {
            ContainerFormat::Webm => "libopus",
            ContainerFormat::Mp3 => "libmp3lame",
            ContainerFormat::Wav => "pcm_s16le",
            ContainerFormat::Ogg => "libvorbis",
            ContainerFormat::Flac => "flac",
            _ => "aac",
        }
    }

    /// Lossless and PCM encoders take no bitrate.
    #[must_use]
    pub fn audio_takes_bitrate(self) -> bool {
        !matches!(self, ContainerFormat::Wav | ContainerFormat::Flac)
    }

    /// Containers whose index is moved to the front for progressive playback.
    #[must_use]
    pub fn wants_faststart(self) -> bool {
        matches!(
            self,
            ContainerFormat::Mp4 | ContainerFormat::Mov | ContainerFormat::M4a
        )
    }

    /// Guesses the container from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ContainerFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('.').to_ascii_lowercase();
        ContainerFormat::ALL
            .into_iter()
            .find(|f| f.extension() == wanted)
            .ok_or_else(|| format!("unsupported container format '{s}'"))
    }
}

// ============================================================================
// QUALITY
// ============================================================================

/// Named quality presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    High,
    Balanced,
    Small,
}

impl QualityPreset {
    #[must_use]
    pub fn crf(self) -> u8 {
        match self {
            QualityPreset::High => 18,
            QualityPreset::Balanced => 23,
            QualityPreset::Small => 28,
        }
    }

    #[must_use]
    pub fn speed(self) -> &'static str {
        match self {
            QualityPreset::High => "slow",
            QualityPreset::Balanced => "medium",
            QualityPreset::Small => "fast",
        }
    }

    #[must_use]
    pub fn audio_bitrate_kbps(self) -> u32 {
        match self {
            QualityPreset::High => 192,
            QualityPreset::Balanced => 128,
            QualityPreset::Small => 96,
        }
    }
}

impl FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(QualityPreset::High),
            "balanced" | "medium" => Ok(QualityPreset::Balanced),
            "small" | "low" => Ok(QualityPreset::Small),
            other => Err(format!("unknown quality preset '{other}'")),
        }
    }
}

/// Explicit encoding settings. Unset fields fall back to source matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomQuality {
    pub video_bitrate_kbps: Option<u32>,
    pub crf: Option<u8>,
    pub speed: Option<String>,
    /// H.264 profile; setting one lifts the baseline default
    pub profile: Option<String>,
    pub level: Option<String>,
    pub frame_rate: Option<f64>,
    pub sample_rate: Option<u32>,
    pub audio_bitrate_kbps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityConfig {
    Preset(QualityPreset),
    /// Target the input's own bitrate (plus headroom) or a tiered CRF
    SourceMatch,
    Custom(CustomQuality),
}

impl Default for QualityConfig {
    fn default() -> Self {
        QualityConfig::Preset(QualityPreset::Balanced)
    }
}

impl QualityConfig {
    pub fn validate(&self) -> Result<(), InputError> {
        let QualityConfig::Custom(custom) = self else {
            return Ok(());
        };
        if custom.crf.is_some_and(|crf| crf > 51) {
            return Err(InputError::InvalidOption(
                "crf must be between 0 and 51".to_string(),
            ));
        }
        if custom
            .frame_rate
            .is_some_and(|fps| !fps.is_finite() || fps <= 0.0)
        {
            return Err(InputError::InvalidOption(
                "frame rate must be positive".to_string(),
            ));
        }
        if custom.video_bitrate_kbps == Some(0)
            || custom.audio_bitrate_kbps == Some(0)
            || custom.sample_rate == Some(0)
        {
            return Err(InputError::InvalidOption(
                "bitrates and sample rate must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Frame rate forced by the job, if any.
    #[must_use]
    pub fn frame_rate(&self) -> Option<f64> {
        match self {
            QualityConfig::Custom(custom) => custom.frame_rate,
            _ => None,
        }
    }

    #[must_use]
    pub fn sample_rate(&self) -> Option<u32> {
        match self {
            QualityConfig::Custom(custom) => custom.sample_rate,
            _ => None,
        }
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .to_ascii_lowercase()
            .split_once('x')
            .map(|(w, h)| (w.trim().parse::<u32>(), h.trim().parse::<u32>()))
            .ok_or_else(|| format!("resolution '{s}' is not WIDTHxHEIGHT"))?;
        match (w, h) {
            (Ok(width), Ok(height)) if width > 0 && height > 0 => Ok(Self { width, height }),
            _ => Err(format!("resolution '{s}' is not WIDTHxHEIGHT")),
        }
    }
}

/// How a source is fitted into a frame of a different shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectMode {
    /// Scale to fit and fill the rest with the background color
    #[default]
    Pad,
    /// Scale to cover and cut the overflow
    Crop,
    Stretch,
}

impl FromStr for AspectMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pad" => Ok(AspectMode::Pad),
            "crop" => Ok(AspectMode::Crop),
            "stretch" => Ok(AspectMode::Stretch),
            other => Err(format!("unknown aspect mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    /// Output frame size; the reference input's size when unset
    pub resolution: Option<Resolution>,
    pub aspect: AspectMode,
    /// Padding color; the configured default when unset
    pub background: Option<String>,
}

impl Geometry {
    /// Rejects frame sizes and colors the filter graph cannot take.
    pub fn validate(&self) -> Result<(), InputError> {
        if let Some(res) = self.resolution {
            if res.width == 0 || res.height == 0 {
                return Err(InputError::InvalidOption(format!(
                    "resolution {res} must be non-zero in both dimensions"
                )));
            }
        }
        if let Some(color) = &self.background {
            if color.is_empty() || color.contains([';', '[', ']', ':', ',', '\'', '=']) {
                return Err(InputError::InvalidOption(format!(
                    "background '{color}' is not a color name or hex value"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// MODE OPTIONS
// ============================================================================

/// Which audio ends up in a multi-input output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AudioPolicy {
    /// Audio of every segment, in order (sequential modes)
    Concatenate,
    /// Audio of one input only (parallel modes)
    FromInput(usize),
    /// All inputs mixed together (parallel modes)
    Mix,
    Mute,
}

impl FromStr for AudioPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "concat" | "concatenate" => Ok(AudioPolicy::Concatenate),
            "mix" => Ok(AudioPolicy::Mix),
            "mute" | "none" => Ok(AudioPolicy::Mute),
            _ => s
                .strip_prefix("input")
                .and_then(|i| i.trim_start_matches([':', '=']).parse::<usize>().ok())
                .map(AudioPolicy::FromInput)
                .ok_or_else(|| format!("unknown audio policy '{s}'")),
        }
    }
}

/// Inset size as a fraction of the output width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipSize {
    Sixth,
    #[default]
    Quarter,
    Third,
}

impl PipSize {
    #[must_use]
    pub fn divisor(self) -> u32 {
        match self {
            PipSize::Sixth => 6,
            PipSize::Quarter => 4,
            PipSize::Third => 3,
        }
    }
}

impl FromStr for PipSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sixth" | "1/6" => Ok(PipSize::Sixth),
            "quarter" | "1/4" => Ok(PipSize::Quarter),
            "third" | "1/3" => Ok(PipSize::Third),
            other => Err(format!("unknown inset size '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl FromStr for Corner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "top_left" => Ok(Corner::TopLeft),
            "top_right" => Ok(Corner::TopRight),
            "bottom_left" => Ok(Corner::BottomLeft),
            "bottom_right" => Ok(Corner::BottomRight),
            other => Err(format!("unknown corner '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
    Custom { x: i32, y: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayScale {
    /// Absolute overlay width in pixels
    Pixels(u32),
    /// Overlay width as a fraction of the output width
    Fraction(f64),
}

/// Interval of the output, in seconds, during which an overlay is shown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySpec {
    pub image: PathBuf,
    pub scale: OverlayScale,
    #[serde(default = "full_opacity")]
    pub opacity: f64,
    pub position: OverlayPosition,
    #[serde(default)]
    pub window: Option<TimeWindow>,
}

fn full_opacity() -> f64 {
    1.0
}

/// The closed set of composition modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CompositionMode {
    Concat {
        #[serde(default)]
        audio: Option<AudioPolicy>,
    },
    #[serde(rename = "sidebyside")]
    SideBySide {
        #[serde(default)]
        audio: Option<AudioPolicy>,
    },
    Pip {
        #[serde(default)]
        size: PipSize,
        #[serde(default)]
        corner: Corner,
        #[serde(default)]
        audio: Option<AudioPolicy>,
    },
    /// `inputs` holds the main clip only
    IntroOutroInsert {
        #[serde(default)]
        intro: Option<PathBuf>,
        #[serde(default)]
        outro: Option<PathBuf>,
        #[serde(default)]
        intro_trim_seconds: f64,
        #[serde(default)]
        outro_trim_seconds: f64,
    },
    /// `inputs` holds the base video only
    LogoWatermarkOverlay { overlays: Vec<OverlaySpec> },
}

impl CompositionMode {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CompositionMode::Concat { .. } => "concat",
            CompositionMode::SideBySide { .. } => "sidebyside",
            CompositionMode::Pip { .. } => "pip",
            CompositionMode::IntroOutroInsert { .. } => "introOutroInsert",
            CompositionMode::LogoWatermarkOverlay { .. } => "logoWatermarkOverlay",
        }
    }

    fn explicit_audio(&self) -> Option<AudioPolicy> {
        match self {
            CompositionMode::Concat { audio }
            | CompositionMode::SideBySide { audio }
            | CompositionMode::Pip { audio, .. } => *audio,
            _ => None,
        }
    }
}

// ============================================================================
// COMPOSITION JOB
// ============================================================================

/// A single-output composition request.
///
/// When a JSON descriptor leaves out `format`, it is inferred from the
/// output extension, as in [`CompositionJob::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "JobDescriptor")]
pub struct CompositionJob {
    pub mode: CompositionMode,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub format: ContainerFormat,
    pub quality: QualityConfig,
    pub geometry: Geometry,
}

#[derive(Deserialize)]
struct JobDescriptor {
    mode: CompositionMode,
    inputs: Vec<PathBuf>,
    output: PathBuf,
    #[serde(default)]
    format: Option<ContainerFormat>,
    #[serde(default)]
    quality: QualityConfig,
    #[serde(default)]
    geometry: Geometry,
}

impl From<JobDescriptor> for CompositionJob {
    fn from(d: JobDescriptor) -> Self {
        let format = d
            .format
            .or_else(|| ContainerFormat::from_path(&d.output))
            .unwrap_or(ContainerFormat::Mp4);
        Self {
            mode: d.mode,
            inputs: d.inputs,
            output: d.output,
            format,
            quality: d.quality,
            geometry: d.geometry,
        }
    }
}

impl CompositionJob {
    pub fn new(mode: CompositionMode, inputs: Vec<PathBuf>, output: impl Into<PathBuf>) -> Self {
        let output = output.into();
        let format = ContainerFormat::from_path(&output).unwrap_or(ContainerFormat::Mp4);
        Self {
            mode,
            inputs,
            output,
            format,
            quality: QualityConfig::default(),
            geometry: Geometry::default(),
        }
    }

    /// Loads a job descriptor from a JSON file.
    pub fn from_json_file(path: &Path) -> crate::CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// The audio policy in effect: the explicit one or the mode's default.
    #[must_use]
    pub fn audio_policy(&self) -> AudioPolicy {
        self.mode
            .explicit_audio()
            .unwrap_or(mode_spec(&self.mode).audio_policy)
    }

    /// Video sources in composition order (intro, main, outro for inserts).
    #[must_use]
    pub fn sources(&self) -> Vec<PathBuf> {
        match &self.mode {
            CompositionMode::IntroOutroInsert { intro, outro, .. } => intro
                .iter()
                .chain(self.inputs.iter())
                .chain(outro.iter())
                .cloned()
                .collect(),
            _ => self.inputs.clone(),
        }
    }

    /// Index into [`Self::sources`] of the reference profile.
    #[must_use]
    pub fn reference_index(&self) -> usize {
        match &self.mode {
            CompositionMode::IntroOutroInsert { intro, .. } => usize::from(intro.is_some()),
            _ => 0,
        }
    }

    /// Checks everything that can be checked before any process runs.
    ///
    /// Input count comes first so a wrong-count job is rejected even when
    /// its files do not exist.
    pub fn validate(&self) -> Result<(), InputError> {
        let spec = mode_spec(&self.mode);
        if !spec.input_count.allows(self.inputs.len()) {
            return Err(InputError::WrongInputCount {
                mode: self.mode.name().to_string(),
                expected: spec.input_count.to_string(),
                actual: self.inputs.len(),
            });
        }

        self.validate_audio_policy(spec.duration_policy)?;
        self.validate_mode_options()?;
        self.quality.validate()?;
        self.geometry.validate()?;

        if self.format.is_audio_only() {
            return Err(InputError::InvalidOption(format!(
                "{} cannot hold a composed video",
                self.format
            )));
        }

        let mut required = self.sources();
        if let CompositionMode::LogoWatermarkOverlay { overlays } = &self.mode {
            required.extend(overlays.iter().map(|o| o.image.clone()));
        }
        for path in &required {
            if !path.is_file() {
                return Err(InputError::MissingInput(path.clone()));
            }
        }
        if required.iter().any(|p| p == &self.output) {
            return Err(InputError::InvalidOption(format!(
                "output {} would overwrite one of the inputs",
                self.output.display()
            )));
        }
        Ok(())
    }

    fn validate_audio_policy(&self, duration: DurationPolicy) -> Result<(), InputError> {
        let policy = self.audio_policy();
        let fits = match (policy, duration) {
            (AudioPolicy::Mute, _) => true,
            (AudioPolicy::Concatenate, DurationPolicy::Sum) => true,
            (AudioPolicy::FromInput(i), DurationPolicy::Max) => i < self.inputs.len(),
            (AudioPolicy::Mix, DurationPolicy::Max) => true,
            _ => false,
        };
        if fits {
            Ok(())
        } else {
            Err(InputError::InvalidOption(format!(
                "audio policy {policy:?} does not apply to {}",
                self.mode.name()
            )))
        }
    }

    fn validate_mode_options(&self) -> Result<(), InputError> {
        match &self.mode {
            CompositionMode::IntroOutroInsert {
                intro,
                outro,
                intro_trim_seconds,
                outro_trim_seconds,
            } => {
                if !intro_trim_seconds.is_finite()
                    || !outro_trim_seconds.is_finite()
                    || *intro_trim_seconds < 0.0
                    || *outro_trim_seconds < 0.0
                {
                    return Err(InputError::InvalidOption(
                        "trim values must be zero or positive".to_string(),
                    ));
                }
                if intro.is_none()
                    && outro.is_none()
                    && *intro_trim_seconds == 0.0
                    && *outro_trim_seconds == 0.0
                {
                    return Err(InputError::InvalidOption(
                        "introOutroInsert needs an intro, an outro or a trim".to_string(),
                    ));
                }
                Ok(())
            }
            CompositionMode::LogoWatermarkOverlay { overlays } => {
                if overlays.is_empty() {
                    return Err(InputError::InvalidOption(
                        "logoWatermarkOverlay needs at least one overlay".to_string(),
                    ));
                }
                overlays.iter().try_for_each(validate_overlay)
            }
            _ => Ok(()),
        }
    }
}

fn validate_overlay(overlay: &OverlaySpec) -> Result<(), InputError> {
    if !(0.0..=1.0).contains(&overlay.opacity) {
        return Err(InputError::InvalidOption(format!(
            "opacity {} for {} is outside 0..1",
            overlay.opacity,
            overlay.image.display()
        )));
    }
    match overlay.scale {
        OverlayScale::Pixels(0) => {
            return Err(InputError::InvalidOption(
                "overlay width must be greater than zero".to_string(),
            ));
        }
        OverlayScale::Fraction(f) if !(f > 0.0 && f <= 1.0) => {
            return Err(InputError::InvalidOption(format!(
                "overlay scale fraction {f} is outside (0, 1]"
            )));
        }
        _ => {}
    }
    if let Some(window) = overlay.window {
        if !(window.start >= 0.0 && window.end > window.start) {
            return Err(InputError::InvalidOption(format!(
                "overlay window {}..{} is empty or negative",
                window.start, window.end
            )));
        }
    }
    Ok(())
}

// ============================================================================
// BATCH REQUESTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchOperation {
    /// MP3 re-encode; the configured target bitrate when unset
    CompressAudio {
        #[serde(default)]
        target_bitrate_kbps: Option<u32>,
    },
    /// H.264/AAC re-encode into MP4
    CompressVideo {
        #[serde(default)]
        quality: QualityConfig,
    },
    Transcode {
        format: ContainerFormat,
        #[serde(default)]
        quality: QualityConfig,
    },
}

impl BatchOperation {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BatchOperation::CompressAudio { .. } => "compress-audio",
            BatchOperation::CompressVideo { .. } => "compress-video",
            BatchOperation::Transcode { .. } => "transcode",
        }
    }

    #[must_use]
    pub fn output_format(&self) -> ContainerFormat {
        match self {
            BatchOperation::CompressAudio { .. } => ContainerFormat::Mp3,
            BatchOperation::CompressVideo { .. } => ContainerFormat::Mp4,
            BatchOperation::Transcode { format, .. } => *format,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Process files even when they are already below the skip threshold
    pub force_process: bool,
    /// Replace existing outputs instead of skipping the file
    pub overwrite: bool,
    /// Appended to the input stem when naming outputs
    pub output_suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub operation: BatchOperation,
    pub input_files: Vec<PathBuf>,
    pub output_directory: PathBuf,
    #[serde(default)]
    pub options: BatchOptions,
}

impl BatchRequest {
    /// Request-level checks; per-file problems are reported per file instead.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.input_files.is_empty() {
            return Err(InputError::EmptyBatch);
        }
        if self.output_directory.is_file() {
            return Err(InputError::InvalidOption(format!(
                "output directory {} is a file",
                self.output_directory.display()
            )));
        }
        if let Some(suffix) = &self.options.output_suffix {
            if suffix.contains(['/', '\\']) {
                return Err(InputError::InvalidOption(format!(
                    "output suffix '{suffix}' must not contain path separators"
                )));
            }
        }
        if let BatchOperation::CompressAudio {
            target_bitrate_kbps: Some(0),
        } = self.operation
        {
            return Err(InputError::InvalidOption(
                "target bitrate must be greater than zero".to_string(),
            ));
        }
        match &self.operation {
            BatchOperation::CompressVideo { quality } | BatchOperation::Transcode { quality, .. } => {
                quality.validate()
            }
            BatchOperation::CompressAudio { .. } => Ok(()),
        }
    }
}
