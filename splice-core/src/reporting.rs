// ============================================================================
// splice-core/src/reporting.rs
// ============================================================================
//
// BATCH REPORTING: Per-file outcomes and aggregate counts
//
// KEY COMPONENTS:
// - FileStatus: success / skipped / error
// - FileOutcome: one input's result with a human-readable reason
// - BatchSummary: counts plus per-file detail, serializable for callers
//
// AI-ASSISTANT-INFO: Batch result model returned by the orchestrator

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Success,
    Skipped,
    Error,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileStatus::Success => "success",
            FileStatus::Skipped => "skipped",
            FileStatus::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub status: FileStatus,
    /// Why the file was skipped or failed; empty on success.
    pub reason: Option<String>,
}

impl FileOutcome {
    pub fn success(input: PathBuf, output: PathBuf) -> Self {
        Self {
            input,
            output: Some(output),
            status: FileStatus::Success,
            reason: None,
        }
    }

    pub fn skipped(input: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            input,
            output: None,
            status: FileStatus::Skipped,
            reason: Some(reason.into()),
        }
    }

    pub fn error(input: PathBuf, output: Option<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            input,
            output,
            status: FileStatus::Error,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub succeeded_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    /// Set when the batch stopped early; unprocessed files are not listed.
    pub cancelled: bool,
    #[serde(rename = "perFileDetail")]
    pub per_file: Vec<FileOutcome>,
}

impl BatchSummary {
    /// Records an outcome and updates the matching counter.
    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome.status {
            FileStatus::Success => self.succeeded_count += 1,
            FileStatus::Skipped => self.skipped_count += 1,
            FileStatus::Error => self.failed_count += 1,
        }
        self.per_file.push(outcome);
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.per_file.len()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_updates_counts() {
        let mut summary = BatchSummary::default();
        summary.record(FileOutcome::success("a.mp3".into(), "out/a.mp3".into()));
        summary.record(FileOutcome::skipped("b.mp3".into(), "already at 96 kbps"));
        summary.record(FileOutcome::error("c.mp3".into(), None, "ffmpeg exited with 1"));

        assert_eq!(summary.succeeded_count, 1);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.total(), 3);
        assert!(summary.has_failures());
    }

    #[test]
    fn test_serializes_with_camel_case_counts() {
        let mut summary = BatchSummary::default();
        summary.record(FileOutcome::skipped("b.mp3".into(), "low bitrate"));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["skippedCount"], 1);
        assert_eq!(json["perFileDetail"][0]["status"], "skipped");
    }
}
