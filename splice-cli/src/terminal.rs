// ============================================================================
// splice-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: UI Components and Styling
//
// Consistent output components for the CLI. Everything except fatal errors
// goes through the `log` facade at info level, so the console and the log
// file see the same lines (the file sink strips the styling).
//
// Visual hierarchy:
// 1. Sections (===== SECTION =====)
// 2. Processing steps (» Step description)
// 3. Sub-items (indented details)
// 4. Status items (Label:     Value)
// 5. Outcomes (✓ done, ✗ failed, - skipped)
//
// AI-ASSISTANT-INFO: Terminal UI components and styling for the CLI

// ---- External crate imports ----
use console::style;
use log::info;

// ---- Standard library imports ----
use std::path::PathBuf;

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const PROGRESS_SYMBOL: &str = "⧖";
    pub const PROCESSING_SYMBOL: &str = "»";
    pub const SKIPPED_SYMBOL: &str = "-";
    pub const ERROR_SYMBOL: &str = "✗";

    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";

    pub const STATUS_INDENT: &str = "  ";
    pub const SUB_ITEM_INDENT: &str = "    ";

    pub const PROGRESS_CHARS: &str = "##.";

    /// Width of the label column in status lines
    pub const LABEL_WIDTH: usize = 15;
}

/// Enables or disables ANSI styling on both output streams.
pub fn set_color(enable: bool) {
    console::set_colors_enabled(enable);
    console::set_colors_enabled_stderr(enable);
}

/// Section header for a major phase.
pub fn print_section(title: &str) {
    info!("");
    info!(
        "{}{}{}",
        styling::SECTION_PREFIX,
        style(title.to_uppercase()).cyan().bold().for_stderr(),
        styling::SECTION_SUFFIX
    );
}

/// Key-value line; `highlight` makes the value bold.
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let label = format!("{label}:");
    let value = if highlight {
        style(value).bold().for_stderr().to_string()
    } else {
        value.to_string()
    };
    info!(
        "{}{:<width$} {}",
        styling::STATUS_INDENT,
        label,
        value,
        width = styling::LABEL_WIDTH
    );
}

pub fn print_processing(message: &str) {
    info!(
        "{}{} {}",
        styling::STATUS_INDENT,
        styling::PROCESSING_SYMBOL,
        style(message).bold().for_stderr()
    );
}

pub fn print_sub_item(message: &str) {
    info!("{}{}", styling::SUB_ITEM_INDENT, message);
}

pub fn print_success(message: &str) {
    info!(
        "{}{} {}",
        styling::STATUS_INDENT,
        style(styling::SUCCESS_SYMBOL).green().for_stderr(),
        message
    );
}

pub fn print_skipped(message: &str) {
    info!(
        "{}{} {}",
        styling::STATUS_INDENT,
        style(styling::SKIPPED_SYMBOL).yellow().for_stderr(),
        message
    );
}

pub fn print_failure(message: &str) {
    info!(
        "{}{} {}",
        styling::STATUS_INDENT,
        style(styling::ERROR_SYMBOL).red().bold().for_stderr(),
        message
    );
}

/// Fatal error, written straight to stderr so it shows even without a logger.
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    eprintln!(
        "{} {} {}",
        styling::ERROR_SYMBOL,
        style(format!("{title}:")).red().bold().for_stderr(),
        message
    );
    if let Some(hint) = suggestion {
        eprintln!("{}{}", styling::STATUS_INDENT, style(hint).dim().for_stderr());
    }
}

pub fn print_file_list(header: &str, files: &[PathBuf]) {
    if files.is_empty() {
        info!("No files to process.");
        return;
    }
    info!("{header}");
    for file in files {
        print_sub_item(&file.display().to_string());
    }
}
