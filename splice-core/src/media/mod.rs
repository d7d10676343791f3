//! Media stream profiling.
//!
//! `profile` holds the data types the rest of the pipeline consumes;
//! `probe` turns prober output into them.

pub mod probe;
pub mod profile;

pub use probe::{StreamProfiler, estimate_video_bitrate, parse_frame_rate, parse_metrics, parse_profile};
pub use profile::{ContainerMetrics, DEFAULT_FRAME_RATE, MediaStreamProfile};
