//! Daybook CLI binary

use anyhow::{Context, Result};
use cli::config::Config;
use cli::{Mode, run_headless, run_interactive};
use daybook_core::Controller;
use daybook_shared::bootstrap;
use std::fs::File;
use std::io::{self, BufReader};

fn main() -> Result<()> {
    bootstrap::init_env();
    let _guard = bootstrap::init_tracing("cli");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = Mode::from_args(&args)?;

    let config = Config::from_env()?;
    tracing::info!(
        "Configuration loaded (calendar '{}', timezone {})",
        config.core.default_calendar,
        config.core.default_timezone
    );

    let mut controller = Controller::new(&config.core);

    match mode {
        Mode::Interactive => {
            run_interactive(&mut controller, io::stdin().lock(), io::stdout(), &config.prompt)
        }
        Mode::Headless(path) => {
            let script = File::open(&path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            run_headless(&mut controller, BufReader::new(script), io::stdout())
        }
    }
}
