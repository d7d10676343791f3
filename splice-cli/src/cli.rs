// ============================================================================
// splice-cli/src/cli.rs
// ============================================================================
//
// COMMAND-LINE INTERFACE: Argument definitions
//
// Defines the clap structures for the three subcommands (compose, batch,
// check) and the global options shared by all of them.
//
// KEY COMPONENTS:
// - Cli / Commands: top-level parser
// - GlobalArgs: verbosity, log directory, tool overrides, workspace base
// - ComposeArgs: composition job from a JSON file or from flags
// - BatchArgs: one operation over many files
// - QualityArgs: quality flags shared by compose and batch
//
// AI-ASSISTANT-INFO: clap argument definitions for the splice binary

// ---- External crate imports ----
use clap::{Args, Parser, Subcommand, ValueEnum};
use splice_core::job::{CustomQuality, OverlayPosition, Resolution};
use splice_core::{
    AspectMode, AudioPolicy, ContainerFormat, QualityConfig, QualityPreset,
    job::{Corner, PipSize},
};

// ---- Standard library imports ----
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Splice: media reconciliation and composition",
    long_about = "Joins, arranges and converts media files with ffmpeg. Inputs are \
                  profiled with ffprobe and repackaged or re-encoded as needed before \
                  they are composed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Show debug output on the console
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for log files (defaults to a `logs` directory next to the output)
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path to the ffmpeg binary
    #[arg(long, global = true, value_name = "PATH", env = "SPLICE_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long, global = true, value_name = "PATH", env = "SPLICE_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Base directory for per-job scratch workspaces
    #[arg(long, global = true, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Composes several inputs into one output
    Compose(ComposeArgs),
    /// Applies one operation to many files
    Batch(BatchArgs),
    /// Checks that ffmpeg and ffprobe can be run
    Check,
}

// ============================================================================
// COMPOSE
// ============================================================================

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Inputs one after another
    Concat,
    /// Two inputs next to each other
    #[value(name = "sidebyside", alias = "side-by-side")]
    SideBySide,
    /// Second input as an inset over the first
    Pip,
    /// Intro and/or outro around a trimmed main clip
    #[value(alias = "intro-outro")]
    Insert,
    /// Image overlays on a base video
    #[value(alias = "watermark")]
    Overlay,
}

#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// JSON job descriptor; replaces all mode, input and output flags
    #[arg(long, value_name = "FILE", conflicts_with_all = ["mode", "inputs", "output"])]
    pub job: Option<PathBuf>,

    /// Composition mode
    #[arg(short, long, value_enum, required_unless_present = "job")]
    pub mode: Option<ModeArg>,

    /// Input file (repeat for each input, in order)
    #[arg(short = 'i', long = "input", value_name = "FILE", required_unless_present = "job")]
    pub inputs: Vec<PathBuf>,

    /// Output file; its extension picks the container unless --format is given
    #[arg(short, long, value_name = "FILE", required_unless_present = "job")]
    pub output: Option<PathBuf>,

    /// Output container (mp4, mkv, mov, webm, avi)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ContainerFormat>,

    #[command(flatten)]
    pub quality: QualityArgs,

    // --- Geometry ---
    /// Output frame size as WIDTHxHEIGHT (defaults to the reference input)
    #[arg(long, value_name = "WxH")]
    pub resolution: Option<Resolution>,

    /// How sources of a different shape are fitted: pad, crop or stretch
    #[arg(long, value_name = "MODE")]
    pub aspect: Option<AspectMode>,

    /// Padding color
    #[arg(long, value_name = "COLOR")]
    pub background: Option<String>,

    /// Audio policy: concat, mix, mute or input:N
    #[arg(long, value_name = "POLICY")]
    pub audio: Option<AudioPolicy>,

    // --- Picture-in-picture ---
    /// Inset size: sixth, quarter or third of the output width
    #[arg(long, value_name = "SIZE")]
    pub pip_size: Option<PipSize>,

    /// Inset corner: top-left, top-right, bottom-left or bottom-right
    #[arg(long, value_name = "CORNER")]
    pub corner: Option<Corner>,

    // --- Intro/outro insertion ---
    /// Clip played before the main input
    #[arg(long, value_name = "FILE")]
    pub intro: Option<PathBuf>,

    /// Clip played after the main input
    #[arg(long, value_name = "FILE")]
    pub outro: Option<PathBuf>,

    /// Seconds cut from the start of the main input
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub intro_trim: f64,

    /// Seconds cut from the end of the main input
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub outro_trim: f64,

    // --- Overlays ---
    /// Overlay image (repeat for several overlays)
    #[arg(long = "overlay", value_name = "IMAGE")]
    pub overlays: Vec<PathBuf>,

    /// Overlay position: a corner name, center, or X,Y in pixels
    #[arg(long, value_name = "POSITION", value_parser = parse_overlay_position, default_value = "bottom-right")]
    pub overlay_position: OverlayPosition,

    /// Overlay width in pixels
    #[arg(long, value_name = "PIXELS", conflicts_with = "overlay_scale")]
    pub overlay_width: Option<u32>,

    /// Overlay width as a fraction of the output width
    #[arg(long, value_name = "FRACTION", default_value_t = 0.15)]
    pub overlay_scale: f64,

    /// Overlay opacity between 0 and 1
    #[arg(long, value_name = "OPACITY", default_value_t = 1.0)]
    pub opacity: f64,

    /// Show overlays from this time on (seconds)
    #[arg(long, value_name = "SECONDS", requires = "overlay_end")]
    pub overlay_start: Option<f64>,

    /// Hide overlays after this time (seconds)
    #[arg(long, value_name = "SECONDS", requires = "overlay_start")]
    pub overlay_end: Option<f64>,
}

/// Parses `top-left`, `center`, ... or `X,Y`.
pub fn parse_overlay_position(s: &str) -> Result<OverlayPosition, String> {
    match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "top_left" => Ok(OverlayPosition::TopLeft),
        "top_right" => Ok(OverlayPosition::TopRight),
        "bottom_left" => Ok(OverlayPosition::BottomLeft),
        "bottom_right" => Ok(OverlayPosition::BottomRight),
        "center" | "centre" => Ok(OverlayPosition::Center),
        other => other
            .split_once(',')
            .and_then(|(x, y)| {
                Some(OverlayPosition::Custom {
                    x: x.trim().parse().ok()?,
                    y: y.trim().parse().ok()?,
                })
            })
            .ok_or_else(|| format!("unknown overlay position '{s}'")),
    }
}

// ============================================================================
// BATCH
// ============================================================================

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    /// Re-encode MP3s above the bitrate threshold
    CompressAudio,
    /// Re-encode videos to H.264/AAC MP4
    CompressVideo,
    /// Convert to another container
    Transcode,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Operation applied to every file
    #[arg(value_enum)]
    pub operation: BatchKind,

    /// Files to process
    #[arg(required = true, value_name = "FILES")]
    pub inputs: Vec<PathBuf>,

    /// Directory for the processed files
    #[arg(short, long = "output-dir", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Target container for transcode
    #[arg(long, value_name = "FORMAT", required_if_eq("operation", "transcode"))]
    pub format: Option<ContainerFormat>,

    /// Target MP3 bitrate in kbit/s for compress-audio
    #[arg(long, value_name = "KBPS")]
    pub bitrate: Option<u32>,

    #[command(flatten)]
    pub quality: QualityArgs,

    /// Process files even when they are already below the skip threshold
    #[arg(long)]
    pub force: bool,

    /// Replace existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Appended to each output file name, before the extension
    #[arg(long, value_name = "SUFFIX")]
    pub suffix: Option<String>,

    /// Print the batch summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// QUALITY
// ============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct QualityArgs {
    /// Quality preset: high, balanced or small
    #[arg(short, long, value_name = "PRESET", conflicts_with = "match_source")]
    pub quality: Option<QualityPreset>,

    /// Match the source bitrate instead of using a preset
    #[arg(long)]
    pub match_source: bool,

    /// Constant rate factor (0-51)
    #[arg(long, value_name = "CRF", value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: Option<u8>,

    /// Video bitrate in kbit/s
    #[arg(long, value_name = "KBPS")]
    pub video_bitrate: Option<u32>,

    /// Audio bitrate in kbit/s
    #[arg(long, value_name = "KBPS")]
    pub audio_bitrate: Option<u32>,

    /// Encoder speed preset (e.g. veryfast, medium, slow)
    #[arg(long, value_name = "SPEED")]
    pub speed: Option<String>,

    /// H.264 profile (baseline, main, high)
    #[arg(long, value_name = "PROFILE")]
    pub h264_profile: Option<String>,

    /// H.264 level (e.g. 4.1)
    #[arg(long, value_name = "LEVEL")]
    pub level: Option<String>,

    /// Output frame rate
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f64>,

    /// Output audio sample rate in Hz
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,
}

impl QualityArgs {
    /// Explicit settings win over `--match-source`, which wins over a preset.
    #[must_use]
    pub fn to_config(&self, default_preset: QualityPreset) -> QualityConfig {
        let custom = CustomQuality {
            video_bitrate_kbps: self.video_bitrate,
            crf: self.crf,
            speed: self.speed.clone(),
            profile: self.h264_profile.clone(),
            level: self.level.clone(),
            frame_rate: self.fps,
            sample_rate: self.sample_rate,
            audio_bitrate_kbps: self.audio_bitrate,
        };
        if custom != CustomQuality::default() {
            QualityConfig::Custom(custom)
        } else if self.match_source {
            QualityConfig::SourceMatch
        } else {
            QualityConfig::Preset(self.quality.unwrap_or(default_preset))
        }
    }
}
