use anyhow::Result;
use clap::Parser;
use winit::event_loop::EventLoop;

use keybind::cli::CliArgs;

mod runtime;

use runtime::ProbeApp;

// ============================================================================
// MAIN - Entry point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();
    keybind::tracing::init(args.verbose);
    if args.verbose {
        if let Some(path) = keybind::config_paths::log_file() {
            eprintln!("Logging to {}", path.display());
        }
    }

    let config = args.into_config().map_err(anyhow::Error::msg)?;
    tracing::info!(
        "Starting probe with {} binding(s), interval {} ms",
        config.bindings.bindings.len(),
        config.bindings.sequence_interval_ms
    );

    let event_loop = EventLoop::new()?;
    let mut app = ProbeApp::new(config);

    event_loop.run_app(&mut app)?;

    Ok(())
}
