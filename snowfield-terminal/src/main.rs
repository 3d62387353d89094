/// Snowfield - a textured ground and a spinning cube in the terminal
///
/// Controls:
///   - Up / W: Move forward
///   - Down / S: Move backward
///   - Left / A, Right / D: Turn
///   - Q/ESC: Quit
use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use snowfield_terminal::{screenshot, Cli, TerminalApp, ViewerConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = ViewerConfig::try_from(&cli).context("invalid options")?;

    if let Some(output) = &config.screenshot {
        return screenshot(&config, output)
            .with_context(|| format!("failed to render {}", output.path.display()));
    }

    let mut app = TerminalApp::new(&config).context("failed to set up the viewer")?;
    app.run().context("viewer failed")?;

    Ok(())
}

/// Route logs to the log file, or to stderr when no terminal UI is drawn
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match (&cli.log_file, &cli.screenshot) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        (None, Some(_)) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        // The scene owns the terminal; without a log file there is nowhere to write
        (None, None) => {}
    }
    Ok(())
}
