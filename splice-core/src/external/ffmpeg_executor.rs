// ============================================================================
// splice-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Encoder Process Abstraction
//
// Traits for spawning the encoder and consuming its events, plus the concrete
// implementation on top of ffmpeg-sidecar. Argument vectors are built by the
// filter/pipeline layers; this module only launches them.
//
// KEY COMPONENTS:
// - FfmpegProcess: an active encoder process (events, wait, kill)
// - FfmpegSpawner: creates processes from a program path and argv
// - SidecarSpawner / SidecarProcess: ffmpeg-sidecar implementation
//
// AI-ASSISTANT-INFO: Encoder process management seam (mockable)

// ---- Internal crate imports ----
use crate::error::{CoreResult, ProcessError};
use crate::tools::FFMPEG;

// ---- External crate imports ----
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;

// ---- Standard library imports ----
use std::io;
use std::path::Path;
use std::process::ExitStatus;

/// Trait representing an active encoder process.
pub trait FfmpegProcess {
    /// Feeds every event to `handler` until the process closes its output or
    /// the handler returns an error.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Waits for the process to exit.
    fn wait(&mut self) -> CoreResult<ExitStatus>;

    /// Forcefully terminates the process.
    fn kill(&mut self) -> CoreResult<()>;
}

/// Trait for something that can start encoder processes.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    fn spawn(&self, program: &Path, args: &[String]) -> CoreResult<Self::Process>;
}

/// `ffmpeg_sidecar` child wrapped as an [`FfmpegProcess`].
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {e}");
            ProcessError::Io {
                tool: FFMPEG.to_string(),
                message: e.to_string(),
            }
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| io_error("wait", &e).into())
    }

    fn kill(&mut self) -> CoreResult<()> {
        self.0.kill().map_err(|e| io_error("kill", &e).into())
    }
}

fn io_error(action: &str, e: &io::Error) -> ProcessError {
    ProcessError::Io {
        tool: FFMPEG.to_string(),
        message: format!("{action} failed: {e}"),
    }
}

/// Production spawner backed by `ffmpeg-sidecar`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, program: &Path, args: &[String]) -> CoreResult<Self::Process> {
        let mut cmd = FfmpegCommand::new_with_path(program);
        cmd.args(args);
        cmd.spawn().map(SidecarProcess).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ProcessError::BinaryNotFound(program.display().to_string()).into()
            } else {
                ProcessError::SpawnFailure {
                    tool: FFMPEG.to_string(),
                    source: e,
                }
                .into()
            }
        })
    }
}
