// ============================================================================
// splice-cli/src/progress.rs
// ============================================================================
//
// PROGRESS RENDERING: Event-stream consumer for the terminal
//
// A dedicated thread drains the job's event stream and turns stage events
// into status lines and progress events into an indicatif bar, one bar per
// encoder run. The orchestrator never waits on this thread; it ends when
// the last event sink is dropped.
//
// Log events are not printed here: the core already wrote them through the
// `log` facade when it emitted them.
//
// AI-ASSISTANT-INFO: indicatif progress bars fed by the core event channel

// ---- Internal crate imports ----
use crate::terminal::{self, styling};

// ---- External crate imports ----
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, warn};
use splice_core::events::{ProgressStatus, Severity};
use splice_core::{EventStream, PipelineEvent, ProgressEvent, Stage};

// ---- Standard library imports ----
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Bar positions are in permille for a smooth bar on long runs.
const BAR_LENGTH: u64 = 1000;

/// Whether progress bars will actually be drawn.
#[must_use]
pub fn bars_visible() -> bool {
    Term::stderr().is_term()
}

fn bar_style() -> ProgressStyle {
    let width = Term::stderr().size().1 as usize;
    let template = if width >= 100 {
        "  {prefix} {msg}: {percent:>3}% [{bar:30}] ({elapsed_precise})"
    } else if width >= 60 {
        "  {prefix} {percent:>3}% [{bar:20}] {msg}"
    } else {
        "  {prefix} {percent:>3}% [{bar:10}]"
    };
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(styling::PROGRESS_CHARS)
}

/// Renders one job's events until the stream closes.
pub struct ProgressRenderer {
    handle: JoinHandle<()>,
}

impl ProgressRenderer {
    pub fn spawn(events: EventStream) -> Self {
        let handle = thread::spawn(move || {
            let mut state = RenderState::new(bars_visible());
            for event in events {
                state.handle(event);
            }
            state.finish_bar();
        });
        Self { handle }
    }

    /// Waits for the stream to close. Drop every sink first.
    pub fn finish(self) {
        if self.handle.join().is_err() {
            warn!("Progress display thread panicked");
        }
    }
}

struct RenderState {
    visible: bool,
    bar: Option<ProgressBar>,
    label: String,
}

impl RenderState {
    fn new(visible: bool) -> Self {
        Self {
            visible,
            bar: None,
            label: String::new(),
        }
    }

    fn handle(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::Progress(progress) => self.progress(&progress),
            PipelineEvent::Stage { stage, label } => self.stage(stage, &label),
            PipelineEvent::Log { severity, message } => {
                if severity == Severity::Error {
                    debug!("Job reported an error: {message}");
                }
            }
        }
    }

    fn progress(&mut self, event: &ProgressEvent) {
        if self.bar.is_none() || self.label != event.label {
            self.finish_bar();
            self.bar = Some(self.new_bar(&event.label));
            self.label = event.label.clone();
        }
        let position = (event.current_percent * 10.0).round() as u64;
        if event.status == ProgressStatus::Complete {
            if let Some(bar) = self.bar.take() {
                bar.set_position(position);
                bar.finish();
            }
        } else if let Some(bar) = &self.bar {
            bar.set_position(position);
        }
    }

    fn new_bar(&self, label: &str) -> ProgressBar {
        let bar = ProgressBar::new(BAR_LENGTH);
        if !self.visible {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(bar_style());
        bar.set_prefix(styling::PROGRESS_SYMBOL);
        bar.set_message(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    fn finish_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }

    fn stage(&mut self, stage: Stage, label: &str) {
        let print = || match stage {
            Stage::Analyzing => terminal::print_processing(&format!("Analyzing {label}")),
            Stage::Repackaging => terminal::print_sub_item("Repackaging inputs (stream copy)"),
            Stage::Preprocessing => terminal::print_sub_item("Re-encoding mismatched inputs"),
            Stage::Composing => terminal::print_sub_item(&format!("Composing {label}")),
            Stage::Processing => terminal::print_sub_item(&format!("Encoding {label}")),
            Stage::CleaningUp => debug!("Cleaning up workspace for {label}"),
            Stage::Complete => terminal::print_success(&format!("{label} done")),
            Stage::Failed => terminal::print_failure(&format!("{label} failed")),
        };
        match &self.bar {
            Some(bar) => bar.suspend(print),
            None => print(),
        }
        if matches!(stage, Stage::Complete | Stage::Failed) {
            self.finish_bar();
        }
    }
}
