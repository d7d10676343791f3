//! Implementation of the `check` subcommand: verifies that ffmpeg and
//! ffprobe can be found and actually run.

use crate::cli::GlobalArgs;
use crate::commands::core_setup;
use crate::error::CliResult;
use crate::terminal::{print_failure, print_section, print_status, print_success};

use splice_core::external::{ToolVersion, check_tool};
use splice_core::tools::{FFMPEG, FFPROBE};
use splice_core::{CoreError, ProcessError};

/// Runs the `check` subcommand. Fails if either tool is unusable.
pub fn run_check(global: &GlobalArgs) -> CliResult<Vec<ToolVersion>> {
    let (tools, config) = core_setup(global)?;
    let timeout = config.availability_timeout;

    print_section("Tool Check");

    let results = [
        (FFMPEG, tools.require_ffmpeg().and_then(|p| check_tool(FFMPEG, p, timeout))),
        (FFPROBE, tools.require_ffprobe().and_then(|p| check_tool(FFPROBE, p, timeout))),
    ];

    let mut versions = Vec::new();
    let mut first_error: Option<ProcessError> = None;
    for (tool, result) in results {
        match result {
            Ok(version) => {
                print_success(&format!("{tool} found"));
                print_status("Path", &version.path.display().to_string(), false);
                print_status("Version", &version.version_line, true);
                versions.push(version);
            }
            Err(e) => {
                print_failure(&format!("{tool}: {e}"));
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(CoreError::from(e)),
        None => Ok(versions),
    }
}
