// ============================================================================
// splice-cli/src/main.rs
// ============================================================================
//
// SPLICE BINARY: Parses the command line and maps the outcome to an exit code
//
// 0 on success, 1 on any error, 2 when a batch finished with failed files,
// 130 when Ctrl-C stopped the job.
//
// AI-ASSISTANT-INFO: Binary entry point

use clap::Parser;
use splice_cli::error::suggestion_for;
use splice_cli::{Cli, exit_code_for, run, terminal};
use std::process;

fn main() {
    let cli = Cli::parse();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            log::debug!("Fatal error: {e:?}");
            terminal::print_error("Error", &e.to_string(), suggestion_for(&e));
            exit_code_for(&e)
        }
    };

    process::exit(code);
}
