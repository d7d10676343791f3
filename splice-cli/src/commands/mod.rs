//! Command implementations for the CLI.
//!
//! Each submodule implements one subcommand; the helpers here build the
//! pieces every command shares.

pub mod batch;
pub mod check;
pub mod compose;

use crate::cli::GlobalArgs;
use crate::error::CliResult;

use splice_core::external::{CommandFfprobeExecutor, SidecarSpawner};
use splice_core::{
    CancellationToken, CoreConfig, CoreConfigBuilder, EventSink, Orchestrator, ToolLocator,
};

/// Resolves the tools and builds a validated core configuration.
pub fn core_setup(global: &GlobalArgs) -> CliResult<(ToolLocator, CoreConfig)> {
    let tools = ToolLocator::resolve(global.ffmpeg.as_deref(), global.ffprobe.as_deref());

    let mut builder = CoreConfigBuilder::new();
    if let Some(dir) = &global.temp_dir {
        builder = builder.temp_dir(dir.clone());
    }
    let config = builder.build();
    config.validate()?;

    Ok((tools, config))
}

/// An orchestrator driving the real ffmpeg/ffprobe binaries, stopped
/// through `cancel`.
pub fn orchestrator(
    tools: ToolLocator,
    config: CoreConfig,
    sink: EventSink,
    cancel: &CancellationToken,
) -> Orchestrator<SidecarSpawner, CommandFfprobeExecutor> {
    let prober = CommandFfprobeExecutor::new(&tools);
    Orchestrator::new(SidecarSpawner, prober, tools, config)
        .with_events(sink)
        .with_cancellation(cancel.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use splice_core::event_channel;

    #[test]
    fn test_orchestrator_shares_the_interrupt_token() {
        let cancel = CancellationToken::new();
        let (sink, _events) = event_channel();
        let tools = ToolLocator::resolve(None, None);
        let orchestrator = orchestrator(tools, CoreConfig::default(), sink, &cancel);

        assert!(!orchestrator.cancellation().is_cancelled());
        cancel.abort();
        assert!(orchestrator.cancellation().is_cancelled());
        assert!(orchestrator.cancellation().is_kill_requested());
    }
}
