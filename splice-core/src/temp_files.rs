//! Job-scoped temporary workspace.
//!
//! Every composition job gets one directory under the configured temp base.
//! Intermediates (repackaged streams, conformed inputs) are created inside it
//! and tracked; `dispose_all` removes them and the directory itself. The
//! workspace also disposes on `Drop`, so early returns and panics clean up
//! the same way a successful run does.
//!
//! Cleanup never fails the job: a missing entry is ignored, anything else is
//! logged and skipped.

use crate::error::CoreResult;
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, TempDir};

const WORKSPACE_PREFIX: &str = "splice_job_";

#[derive(Debug)]
pub struct TempWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
    tracked: Vec<PathBuf>,
}

impl TempWorkspace {
    /// Creates a fresh workspace directory inside `base`.
    pub fn create(base: &Path) -> CoreResult<Self> {
        fs::create_dir_all(base)?;
        let dir = TempFileBuilder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(base)?;
        let path = dir.path().to_path_buf();
        log::debug!("Created job workspace: {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
            tracked: Vec::new(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Registers a file for removal on dispose.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.tracked.push(path.into());
    }

    #[must_use]
    pub fn tracked(&self) -> &[PathBuf] {
        &self.tracked
    }

    /// Returns a tracked path `<prefix>_<random>.<ext>` inside the workspace.
    /// The file itself is not created.
    pub fn create_file_path(&mut self, prefix: &str, extension: &str) -> PathBuf {
        let random_suffix: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        let path = self.path.join(format!("{prefix}_{random_suffix}.{extension}"));
        self.track(path.clone());
        path
    }

    /// Removes every tracked file and the workspace directory.
    ///
    /// Safe to call more than once.
    pub fn dispose_all(&mut self) {
        for file in self.tracked.drain(..) {
            remove_quietly(&file, fs::remove_file(&file));
        }

        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            // close() reports errors that TempDir's own Drop would swallow
            remove_quietly(&path, dir.close());
            log::debug!("Disposed job workspace: {}", path.display());
        }
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

fn remove_quietly(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove {}: {e}", path.display()),
    }
}
