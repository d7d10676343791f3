// ============================================================================
// splice-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the encoder and prober binaries
//
// Everything that launches an external process lives here, behind traits
// so the pipeline can be exercised with mocks.
//
// KEY COMPONENTS:
// - FfmpegSpawner / FfmpegProcess: encoder seam (ffmpeg-sidecar in production)
// - FfprobeExecutor: prober seam
// - ProcessRunner: one supervised encoder run with progress
// - check_tool / check_availability: `-version` probe with a hard timeout
//
// AI-ASSISTANT-INFO: External tool interactions and abstractions for ffmpeg/ffprobe

// ---- Internal crate imports ----
use crate::error::{CoreResult, ProcessError};
use crate::tools::{FFMPEG, FFPROBE, ToolLocator};

// ---- Standard library imports ----
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Traits and implementations for executing encoder commands
pub mod ffmpeg_executor;

/// Traits and implementations for executing prober commands
pub mod ffprobe_executor;

/// Supervised encoder runs with progress and error capture
pub mod runner;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{CommandFfprobeExecutor, FfprobeExecutor, prober_args};
pub use runner::ProcessRunner;

// ============================================================================
// AVAILABILITY CHECK
// ============================================================================

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of a successful `-version` check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersion {
    pub tool: String,
    pub path: PathBuf,
    /// First line of the tool's version banner.
    pub version_line: String,
}

/// Runs `<path> -version`, killing it if it has not exited within `timeout`.
pub fn check_tool(tool: &str, path: &Path, timeout: Duration) -> Result<ToolVersion, ProcessError> {
    let mut child = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProcessError::BinaryNotFound(format!("{tool} ({})", path.display()))
            } else {
                ProcessError::SpawnFailure {
                    tool: tool.to_string(),
                    source: e,
                }
            }
        })?;

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= timeout => {
                log::warn!("{tool} -version timed out after {timeout:?}, killing it");
                if let Err(e) = child.kill() {
                    log::warn!("Failed to kill {tool}: {e}");
                }
                if let Err(e) = child.wait() {
                    log::debug!("Wait after killing {tool} failed: {e}");
                }
                return Err(ProcessError::Timeout {
                    tool: tool.to_string(),
                    seconds: timeout.as_secs(),
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                return Err(ProcessError::Io {
                    tool: tool.to_string(),
                    message: e.to_string(),
                });
            }
        }
    };

    let version_line = child
        .stdout
        .take()
        .and_then(|stdout| BufReader::new(stdout).lines().next())
        .and_then(Result::ok)
        .unwrap_or_default();

    if !status.success() {
        return Err(ProcessError::NonZeroExit {
            tool: tool.to_string(),
            code: status.code(),
            stderr_tail: version_line,
        });
    }

    log::debug!("{tool} available at {}: {version_line}", path.display());
    Ok(ToolVersion {
        tool: tool.to_string(),
        path: path.to_path_buf(),
        version_line,
    })
}

/// Checks both tools; the first failure is returned.
pub fn check_availability(tools: &ToolLocator, timeout: Duration) -> CoreResult<Vec<ToolVersion>> {
    let ffmpeg = check_tool(FFMPEG, tools.require_ffmpeg()?, timeout)?;
    let ffprobe = check_tool(FFPROBE, tools.require_ffprobe()?, timeout)?;
    Ok(vec![ffmpeg, ffprobe])
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_check_tool_reads_first_version_line() {
        let dir = tempfile::tempdir().unwrap();
        let bin = script(
            dir.path(),
            "ffmpeg",
            "echo 'ffmpeg version 6.1 Copyright (c)'\necho 'built with gcc'",
        );
        let version = check_tool(FFMPEG, &bin, Duration::from_secs(5)).unwrap();
        assert_eq!(version.version_line, "ffmpeg version 6.1 Copyright (c)");
    }

    #[test]
    fn test_check_tool_kills_on_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let bin = script(dir.path(), "ffmpeg", "sleep 10");
        let started = Instant::now();
        let err = check_tool(FFMPEG, &bin, Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, ProcessError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_check_availability_without_tools() {
        let err = check_availability(&ToolLocator::unresolved(), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::Process(ProcessError::BinaryNotFound(_))
        ));
    }
}
