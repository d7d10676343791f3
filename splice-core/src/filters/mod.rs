// ============================================================================
// splice-core/src/filters/mod.rs
// ============================================================================
//
// FILTER GRAPH BUILDER: Encoder argument vectors per composition mode
//
// Each composition mode has one entry in a small strategy table giving its
// input-count constraint, graph builder, default audio policy and how the
// expected output duration is derived. `FilterGraphBuilder::build` selects
// the entry once and turns the resulting graph into a complete encoder
// argument vector.
//
// KEY COMPONENTS:
// - ModeSpec / mode_spec(): the strategy table
// - GraphContext: everything a mode builder needs, resolved up front
// - FilterGraph: inputs, filter chains, output labels, segment durations
// - FilterGraphBuilder / EncoderInvocation: final argument vector assembly
// - Shared chain helpers: video normalization, audio normalization, silence
//
// AI-ASSISTANT-INFO: Filter graph construction and strategy table

pub mod concat;
pub mod insert;
pub mod layout;
pub mod overlay;
pub mod quality;

// ---- Internal crate imports ----
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::job::{AspectMode, AudioPolicy, CompositionJob, CompositionMode, Resolution};
use crate::media::MediaStreamProfile;
use crate::reconcile::ReconciliationPlan;
use crate::utils::{even, gcd};

// ---- Standard library imports ----
use std::fmt;
use std::path::PathBuf;

pub use insert::validate_trim;
pub use quality::SourceStats;

/// Sample rate used when neither the job nor the reference dictates one.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Pixel format every composed output is normalized to.
pub const OUTPUT_PIXEL_FORMAT: &str = "yuv420p";

// ============================================================================
// STRATEGY TABLE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCount {
    Exactly(usize),
    AtLeast(usize),
}

impl InputCount {
    #[must_use]
    pub fn allows(self, count: usize) -> bool {
        match self {
            InputCount::Exactly(n) => count == n,
            InputCount::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for InputCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputCount::Exactly(n) => write!(f, "exactly {n}"),
            InputCount::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// How segment durations combine into the expected output duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationPolicy {
    /// Segments play one after another
    Sum,
    /// Segments play at the same time
    Max,
}

impl DurationPolicy {
    #[must_use]
    pub fn apply(self, durations: &[f64]) -> f64 {
        let valid = durations.iter().copied().filter(|d| d.is_finite() && *d > 0.0);
        match self {
            DurationPolicy::Sum => valid.sum(),
            DurationPolicy::Max => valid.fold(0.0, f64::max),
        }
    }
}

pub type GraphBuilderFn = fn(&GraphContext<'_>) -> CoreResult<FilterGraph>;

/// One row of the strategy table.
#[derive(Debug, Clone, Copy)]
pub struct ModeSpec {
    pub input_count: InputCount,
    pub graph_builder: GraphBuilderFn,
    /// Used when the job does not choose a policy itself
    pub audio_policy: AudioPolicy,
    pub duration_policy: DurationPolicy,
}

static CONCAT: ModeSpec = ModeSpec {
    input_count: InputCount::AtLeast(2),
    graph_builder: concat::build_concat,
    audio_policy: AudioPolicy::Concatenate,
    duration_policy: DurationPolicy::Sum,
};

static SIDE_BY_SIDE: ModeSpec = ModeSpec {
    input_count: InputCount::Exactly(2),
    graph_builder: layout::build_side_by_side,
    audio_policy: AudioPolicy::FromInput(0),
    duration_policy: DurationPolicy::Max,
};

static PIP: ModeSpec = ModeSpec {
    input_count: InputCount::Exactly(2),
    graph_builder: layout::build_pip,
    audio_policy: AudioPolicy::FromInput(0),
    duration_policy: DurationPolicy::Max,
};

static INTRO_OUTRO_INSERT: ModeSpec = ModeSpec {
    input_count: InputCount::Exactly(1),
    graph_builder: insert::build_insert,
    audio_policy: AudioPolicy::Concatenate,
    duration_policy: DurationPolicy::Sum,
};

static LOGO_WATERMARK_OVERLAY: ModeSpec = ModeSpec {
    input_count: InputCount::Exactly(1),
    graph_builder: overlay::build_overlay,
    audio_policy: AudioPolicy::FromInput(0),
    duration_policy: DurationPolicy::Max,
};

/// Strategy table lookup.
#[must_use]
pub fn mode_spec(mode: &CompositionMode) -> &'static ModeSpec {
    match mode {
        CompositionMode::Concat { .. } => &CONCAT,
        CompositionMode::SideBySide { .. } => &SIDE_BY_SIDE,
        CompositionMode::Pip { .. } => &PIP,
        CompositionMode::IntroOutroInsert { .. } => &INTRO_OUTRO_INSERT,
        CompositionMode::LogoWatermarkOverlay { .. } => &LOGO_WATERMARK_OVERLAY,
    }
}

// ============================================================================
// GRAPH TYPES
// ============================================================================

/// Resolved parameters shared by every mode builder.
#[derive(Debug, Clone)]
pub struct GraphContext<'a> {
    pub job: &'a CompositionJob,
    /// Profiles of `job.sources()`, in the same order
    pub profiles: &'a [MediaStreamProfile],
    pub target: Resolution,
    pub frame_rate: f64,
    pub sample_rate: u32,
    pub aspect: AspectMode,
    pub background: &'a str,
    pub audio: AudioPolicy,
    pub margin: u32,
}

/// A built filter graph, ready to be placed in an argument vector.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    /// Encoder inputs in `-i` order
    pub inputs: Vec<PathBuf>,
    pub chains: Vec<String>,
    pub video_out: String,
    pub audio_out: Option<String>,
    /// Durations combined by the mode's duration policy
    pub segment_durations: Vec<f64>,
}

impl FilterGraph {
    /// The `-filter_complex` value.
    #[must_use]
    pub fn filter_complex(&self) -> String {
        self.chains.join(";")
    }
}

/// A complete encoder invocation and the duration its progress is measured against.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderInvocation {
    pub args: Vec<String>,
    pub expected_duration: f64,
}

// ============================================================================
// SHARED CHAIN HELPERS
// ============================================================================

/// Frame rate as the encoder's filters expect it.
#[must_use]
pub fn format_rate(fps: f64) -> String {
    if (fps - fps.round()).abs() < 0.001 {
        format!("{}", fps.round() as u64)
    } else {
        format!("{fps:.3}")
    }
}

/// Seconds with millisecond precision, trailing zeros removed.
#[must_use]
pub fn format_seconds(seconds: f64) -> String {
    let text = format!("{seconds:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// `scale`/`pad`/`crop` stages fitting a source into `width`x`height`.
#[must_use]
pub fn fit_filter(width: u32, height: u32, aspect: AspectMode, background: &str) -> String {
    match aspect {
        AspectMode::Pad => format!(
            "scale={width}:{height}:force_original_aspect_ratio=decrease,pad={width}:{height}:(ow-iw)/2:(oh-ih)/2:color={background}"
        ),
        AspectMode::Crop => format!(
            "scale={width}:{height}:force_original_aspect_ratio=increase,crop={width}:{height}"
        ),
        AspectMode::Stretch => format!("scale={width}:{height}"),
    }
}

/// One normalization chain: `[N:v]` to `[label]` at the given frame size.
///
/// `window` trims the source to `start..end` seconds first.
#[must_use]
pub fn normalize_video(
    ctx: &GraphContext<'_>,
    input: usize,
    size: Resolution,
    window: Option<(f64, f64)>,
    label: &str,
) -> String {
    let trim = window
        .map(|(start, end)| {
            format!(
                "trim=start={}:end={},setpts=PTS-STARTPTS,",
                format_seconds(start),
                format_seconds(end)
            )
        })
        .unwrap_or_default();
    let divisor = gcd(size.width, size.height).max(1);
    format!(
        "[{input}:v]{trim}{},setsar=1,setdar={}/{},fps={},format={OUTPUT_PIXEL_FORMAT}[{label}]",
        fit_filter(size.width, size.height, ctx.aspect, ctx.background),
        size.width / divisor,
        size.height / divisor,
        format_rate(ctx.frame_rate),
    )
}

/// Resamples `[N:a]` to the job's sample rate and stereo layout.
#[must_use]
pub fn normalize_audio(
    ctx: &GraphContext<'_>,
    input: usize,
    window: Option<(f64, f64)>,
    label: &str,
) -> String {
    let trim = window
        .map(|(start, end)| {
            format!(
                "atrim=start={}:end={},asetpts=PTS-STARTPTS,",
                format_seconds(start),
                format_seconds(end)
            )
        })
        .unwrap_or_default();
    format!(
        "[{input}:a]{trim}aresample={},aformat=sample_fmts=fltp:channel_layouts=stereo[{label}]",
        ctx.sample_rate
    )
}

/// Silent stereo audio of `duration` seconds for a source without audio.
#[must_use]
pub fn silence(ctx: &GraphContext<'_>, duration: f64, label: &str) -> String {
    format!(
        "anullsrc=channel_layout=stereo:sample_rate={},atrim=duration={}[{label}]",
        ctx.sample_rate,
        format_seconds(duration.max(0.0))
    )
}

/// Audio for modes whose inputs play simultaneously.
///
/// Returns the output label, or `None` when the result is silent.
pub(crate) fn parallel_audio(ctx: &GraphContext<'_>, chains: &mut Vec<String>) -> Option<String> {
    let with_audio: Vec<usize> = ctx
        .profiles
        .iter()
        .enumerate()
        .filter(|(_, p)| p.has_audio())
        .map(|(i, _)| i)
        .collect();

    match ctx.audio {
        AudioPolicy::Mute | AudioPolicy::Concatenate => None,
        AudioPolicy::FromInput(i) => {
            if with_audio.contains(&i) {
                chains.push(normalize_audio(ctx, i, None, "outa"));
                Some("outa".to_string())
            } else {
                log::warn!("Input {i} has no audio; output will be silent");
                None
            }
        }
        AudioPolicy::Mix => match with_audio.as_slice() {
            [] => None,
            [only] => {
                chains.push(normalize_audio(ctx, *only, None, "outa"));
                Some("outa".to_string())
            }
            many => {
                let mut labels = String::new();
                for i in many {
                    let label = format!("a{i}");
                    chains.push(normalize_audio(ctx, *i, None, &label));
                    labels.push_str(&format!("[{label}]"));
                }
                chains.push(format!(
                    "{labels}amix=inputs={}:duration=longest[outa]",
                    many.len()
                ));
                Some("outa".to_string())
            }
        },
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Turns a validated job, its (possibly preprocessed) profiles and its plan
/// into an encoder invocation.
#[derive(Debug, Clone)]
pub struct FilterGraphBuilder<'a> {
    config: &'a CoreConfig,
}

impl<'a> FilterGraphBuilder<'a> {
    #[must_use]
    pub fn new(config: &'a CoreConfig) -> Self {
        Self { config }
    }

    /// Builds the full argument vector for `job`.
    ///
    /// `profiles` must line up with `job.sources()`.
    pub fn build(
        &self,
        job: &CompositionJob,
        profiles: &[MediaStreamProfile],
        plan: &ReconciliationPlan,
    ) -> CoreResult<EncoderInvocation> {
        let sources = job.sources();
        if profiles.len() != sources.len() {
            return Err(CoreError::OperationFailed(format!(
                "{} profiles supplied for {} sources",
                profiles.len(),
                sources.len()
            )));
        }

        let spec = mode_spec(&job.mode);
        let reference = &plan.reference;
        let target = job.geometry.resolution.map_or_else(
            || Resolution::new(even(reference.width), even(reference.height)),
            |r| Resolution::new(even(r.width), even(r.height)),
        );
        let background = job
            .geometry
            .background
            .as_deref()
            .unwrap_or(&self.config.default_background);

        let ctx = GraphContext {
            job,
            profiles,
            target,
            frame_rate: job.quality.frame_rate().unwrap_or(reference.frame_rate),
            sample_rate: job
                .quality
                .sample_rate()
                .or(reference.audio_sample_rate)
                .unwrap_or(DEFAULT_SAMPLE_RATE),
            aspect: job.geometry.aspect,
            background,
            audio: job.audio_policy(),
            margin: self.config.pip_margin,
        };

        let graph = (spec.graph_builder)(&ctx)?;
        let expected_duration = spec.duration_policy.apply(&graph.segment_durations);

        let mut args = vec!["-y".to_string()];
        for input in &graph.inputs {
            args.push("-i".to_string());
            args.push(input.to_string_lossy().into_owned());
        }
        args.push("-filter_complex".to_string());
        args.push(graph.filter_complex());
        args.push("-map".to_string());
        args.push(format!("[{}]", graph.video_out));

        let source = SourceStats::from(reference);
        args.extend(quality::video_args(&job.quality, job.format, &source));
        match &graph.audio_out {
            Some(label) => {
                args.push("-map".to_string());
                args.push(format!("[{label}]"));
                args.extend(quality::audio_args(&job.quality, job.format, &source));
            }
            None => args.push("-an".to_string()),
        }
        args.extend(quality::container_args(job.format));
        args.push(job.output.to_string_lossy().into_owned());

        log::debug!(
            "{} graph for {} source(s): {}",
            job.mode.name(),
            sources.len(),
            graph.filter_complex()
        );

        Ok(EncoderInvocation {
            args,
            expected_duration,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::job::Geometry;

    pub fn profile(name: &str, width: u32, height: u32, duration: f64) -> MediaStreamProfile {
        MediaStreamProfile {
            path: PathBuf::from(format!("/in/{name}")),
            display_name: name.to_string(),
            duration,
            video_codec: "h264".to_string(),
            audio_codec: Some("aac".to_string()),
            width,
            height,
            pixel_format: "yuv420p".to_string(),
            frame_rate: 25.0,
            sample_aspect_ratio: Some("1:1".to_string()),
            display_aspect_ratio: None,
            audio_sample_rate: Some(48_000),
            audio_channels: Some(2),
            video_bitrate: Some(4_000_000),
            audio_bitrate: Some(128_000),
            codec_profile: None,
            codec_level: None,
        }
    }

    pub fn context<'a>(
        job: &'a CompositionJob,
        profiles: &'a [MediaStreamProfile],
        target: Resolution,
    ) -> GraphContext<'a> {
        GraphContext {
            job,
            profiles,
            target,
            frame_rate: 25.0,
            sample_rate: 48_000,
            aspect: Geometry::default().aspect,
            background: "black",
            audio: job.audio_policy(),
            margin: 20,
        }
    }
}
