//! Core library for reconciling and composing media files with ffmpeg and ffprobe.
//!
//! The crate profiles inputs, decides whether they can be joined as-is,
//! stream-copied or must be re-encoded, builds the encoder filter graph for
//! each composition mode and supervises the encoder runs. Batch operations
//! (audio/video compression, transcoding) run through the same orchestrator.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use splice_core::{CompositionJob, CompositionMode, CoreConfig, Orchestrator, ToolLocator};
//! use splice_core::external::{CommandFfprobeExecutor, SidecarSpawner};
//! use splice_core::events::event_channel;
//!
//! let tools = ToolLocator::resolve(None, None);
//! let prober = CommandFfprobeExecutor::new(&tools);
//! let (sink, events) = event_channel();
//! let orchestrator = Orchestrator::new(SidecarSpawner, prober, tools, CoreConfig::default())
//!     .with_events(sink);
//!
//! let job = CompositionJob::new(
//!     CompositionMode::Concat { audio: None },
//!     vec!["a.mp4".into(), "b.mp4".into()],
//!     "joined.mp4",
//! );
//! let report = orchestrator.run_composition(&job).unwrap();
//! println!("{} via {}", report.output.display(), report.strategy);
//! drop(events);
//! ```

pub mod cancel;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod external;
pub mod filters;
pub mod job;
pub mod media;
pub mod pipeline;
pub mod progress_reporting;
pub mod reconcile;
pub mod reporting;
pub mod temp_files;
pub mod tools;
pub mod utils;

// Re-exports for public API
pub use cancel::CancellationToken;
pub use codec::{CodecFamily, compatible, family_of};
pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{CoreError, CoreResult, InputError, PlanError, ProbeError, ProcessError};
pub use events::{EventSink, EventStream, PipelineEvent, ProgressEvent, Stage, event_channel};
pub use filters::{EncoderInvocation, FilterGraphBuilder};
pub use job::{
    AspectMode, AudioPolicy, BatchOperation, BatchOptions, BatchRequest, CompositionJob,
    CompositionMode, ContainerFormat, QualityConfig, QualityPreset,
};
pub use media::{MediaStreamProfile, StreamProfiler};
pub use pipeline::{CompositionReport, Orchestrator};
pub use reconcile::{ReconciliationPlan, ReconciliationStrategy};
pub use reporting::{BatchSummary, FileOutcome, FileStatus};
pub use temp_files::TempWorkspace;
pub use tools::ToolLocator;
pub use utils::{format_bytes, format_duration, parse_ffmpeg_time};
