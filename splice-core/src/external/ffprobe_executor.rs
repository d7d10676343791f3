//! Prober invocation.
//!
//! This module runs the external prober against one input and hands back its
//! JSON document. Parsing lives in `media::probe`, so the executor stays a
//! thin, mockable seam.

use crate::error::ProbeError;
use crate::tools::{FFPROBE, ToolLocator};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Trait for anything that can produce the prober's JSON for an input.
pub trait FfprobeExecutor {
    /// Returns the raw structured (JSON) prober output for `input_path`.
    fn probe_json(&self, input_path: &Path) -> Result<String, ProbeError>;
}

/// Argument vector requesting stream and container metadata as JSON.
#[must_use]
pub fn prober_args(input_path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        input_path.to_string_lossy().into_owned(),
    ]
}

/// Production executor running the prober binary from a [`ToolLocator`].
#[derive(Debug, Clone)]
pub struct CommandFfprobeExecutor {
    ffprobe: Option<PathBuf>,
}

impl CommandFfprobeExecutor {
    #[must_use]
    pub fn new(tools: &ToolLocator) -> Self {
        Self {
            ffprobe: tools.ffprobe().map(Path::to_path_buf),
        }
    }
}

impl FfprobeExecutor for CommandFfprobeExecutor {
    fn probe_json(&self, input_path: &Path) -> Result<String, ProbeError> {
        let ffprobe = self
            .ffprobe
            .as_deref()
            .ok_or_else(|| ProbeError::ToolNotFound(FFPROBE.to_string()))?;

        log::debug!("Running ffprobe on: {}", input_path.display());

        let output = Command::new(ffprobe)
            .args(prober_args(input_path))
            .output()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    ProbeError::ToolNotFound(ffprobe.display().to_string())
                } else {
                    ProbeError::ProcessFailed {
                        path: input_path.display().to_string(),
                        stderr: format!("failed to start ffprobe: {e}"),
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::warn!(
                "ffprobe exited with {} for {}",
                output.status,
                input_path.display()
            );
            return Err(ProbeError::ProcessFailed {
                path: input_path.display().to_string(),
                stderr: if stderr.is_empty() {
                    format!("ffprobe exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prober_args_end_with_input() {
        let args = prober_args(Path::new("/media/clip.mp4"));
        assert_eq!(args.last().map(String::as_str), Some("/media/clip.mp4"));
        assert!(args.contains(&"-show_streams".to_string()));
        assert!(args.contains(&"-show_format".to_string()));
    }

    #[test]
    fn test_unresolved_prober_is_tool_not_found() {
        let executor = CommandFfprobeExecutor::new(&ToolLocator::unresolved());
        assert_eq!(
            executor.probe_json(Path::new("x.mp4")),
            Err(ProbeError::ToolNotFound("ffprobe".to_string()))
        );
    }
}
