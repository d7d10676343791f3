// ============================================================================
// splice-core/src/tools.rs
// ============================================================================
//
// TOOL LOCATION: Resolving the encoder/prober binaries once per process
//
// The locator is resolved at startup (explicit paths first, then a PATH
// lookup) and passed into every profiler, runner and orchestrator. Nothing
// below this layer looks tools up on its own.
//
// AI-ASSISTANT-INFO: ToolLocator capability for ffmpeg/ffprobe paths

use crate::error::ProcessError;
use std::path::{Path, PathBuf};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

/// Resolved locations of the external encoder and prober.
///
/// A `None` entry means the tool could not be found; runs that need it fail
/// with `BinaryNotFound` without spawning anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolLocator {
    ffmpeg: Option<PathBuf>,
    ffprobe: Option<PathBuf>,
}

impl ToolLocator {
    /// Locator with explicit, already-known paths.
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: Some(ffmpeg.into()),
            ffprobe: Some(ffprobe.into()),
        }
    }

    /// Locator where neither tool is available.
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Resolves both tools, preferring explicit overrides over a PATH lookup.
    ///
    /// A bare override name (no directory component) is itself looked up on
    /// PATH; a path override is taken as-is and checked when used.
    #[must_use]
    pub fn resolve(ffmpeg_override: Option<&Path>, ffprobe_override: Option<&Path>) -> Self {
        let locator = Self {
            ffmpeg: resolve_one(FFMPEG, ffmpeg_override),
            ffprobe: resolve_one(FFPROBE, ffprobe_override),
        };
        log::debug!("Resolved tools: {locator:?}");
        locator
    }

    #[must_use]
    pub fn ffmpeg(&self) -> Option<&Path> {
        self.ffmpeg.as_deref()
    }

    #[must_use]
    pub fn ffprobe(&self) -> Option<&Path> {
        self.ffprobe.as_deref()
    }

    /// The encoder path, or `BinaryNotFound` if it is unresolved or missing.
    pub fn require_ffmpeg(&self) -> Result<&Path, ProcessError> {
        require(FFMPEG, self.ffmpeg())
    }

    /// The prober path, or `BinaryNotFound` if it is unresolved or missing.
    pub fn require_ffprobe(&self) -> Result<&Path, ProcessError> {
        require(FFPROBE, self.ffprobe())
    }
}

fn resolve_one(name: &str, override_path: Option<&Path>) -> Option<PathBuf> {
    match override_path {
        Some(path) if path.components().count() > 1 || path.is_absolute() => {
            Some(path.to_path_buf())
        }
        Some(bare) => which::which(bare).ok(),
        None => which::which(name).ok(),
    }
}

fn require<'a>(name: &str, path: Option<&'a Path>) -> Result<&'a Path, ProcessError> {
    match path {
        Some(p) if p.is_file() => Ok(p),
        Some(p) => Err(ProcessError::BinaryNotFound(format!(
            "{name} ({})",
            p.display()
        ))),
        None => Err(ProcessError::BinaryNotFound(name.to_string())),
    }
}
