//! Daybook CLI - Text front end for calendar management
//!
//! This crate provides the interactive prompt and the headless script
//! runner. Both parse one command per line and hand it to the core
//! [`Controller`].

pub mod commands;
pub mod config;
pub mod csv_file;
pub mod handlers;

use anyhow::{Context, Result, anyhow};
use commands::parse_command;
use daybook_core::Controller;
use handlers::{Response, handle_command};
use std::io::{BufRead, Write};

/// How the binary was asked to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Headless(std::path::PathBuf),
}

impl Mode {
    /// Parse `--mode interactive` or `--mode headless <script>`.
    /// No arguments means interactive.
    pub fn from_args(args: &[String]) -> Result<Self> {
        match args {
            [] => Ok(Self::Interactive),
            [flag, mode, rest @ ..] if flag.eq_ignore_ascii_case("--mode") => {
                match (mode.to_ascii_lowercase().as_str(), rest) {
                    ("interactive", []) => Ok(Self::Interactive),
                    ("headless", [script]) => Ok(Self::Headless(script.into())),
                    ("headless", []) => Err(anyhow!("Headless mode requires a script file path")),
                    _ => Err(anyhow!("Invalid mode arguments: {}", args.join(" "))),
                }
            }
            _ => Err(anyhow!(
                "Usage: cli [--mode interactive | --mode headless <script>]"
            )),
        }
    }
}

/// Run the interactive prompt until `exit` or end of input
///
/// Failed commands are reported and the session continues.
pub fn run_interactive<R: BufRead, W: Write>(
    controller: &mut Controller,
    input: R,
    mut output: W,
    prompt: &str,
) -> Result<()> {
    tracing::info!("Starting interactive session");

    write!(output, "{}", prompt)?;
    output.flush()?;

    for line in input.lines() {
        let line = line.context("Failed to read command")?;

        match run_line(controller, &line) {
            Ok(Some(Response::Exit)) => break,
            Ok(Some(Response::Message(message))) => writeln!(output, "{}", message)?,
            Ok(None) => {}
            Err(e) => writeln!(output, "Error: {:#}", e)?,
        }

        write!(output, "{}", prompt)?;
        output.flush()?;
    }

    tracing::info!("Interactive session ended");
    Ok(())
}

/// Run a script, stopping at the first failing command or `exit`
pub fn run_headless<R: BufRead, W: Write>(
    controller: &mut Controller,
    script: R,
    mut output: W,
) -> Result<()> {
    tracing::info!("Running headless script");

    for (idx, line) in script.lines().enumerate() {
        let line = line.context("Failed to read script")?;
        let line_number = idx + 1;

        match run_line(controller, &line)
            .with_context(|| format!("Line {}: {}", line_number, line.trim()))?
        {
            Some(Response::Exit) => {
                tracing::info!("Script exited at line {}", line_number);
                return Ok(());
            }
            Some(Response::Message(message)) => writeln!(output, "{}", message)?,
            None => {}
        }
    }

    tracing::info!("Script finished");
    Ok(())
}

fn run_line(controller: &mut Controller, line: &str) -> Result<Option<Response>> {
    match parse_command(line)? {
        Some(command) => handle_command(controller, command).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mode_from_args() {
        assert_eq!(Mode::from_args(&[]).unwrap(), Mode::Interactive);
        assert_eq!(
            Mode::from_args(&args(&["--mode", "Interactive"])).unwrap(),
            Mode::Interactive
        );
        assert_eq!(
            Mode::from_args(&args(&["--mode", "headless", "plan.txt"])).unwrap(),
            Mode::Headless("plan.txt".into())
        );
        assert!(Mode::from_args(&args(&["--mode", "headless"])).is_err());
        assert!(Mode::from_args(&args(&["--mode", "gui"])).is_err());
        assert!(Mode::from_args(&args(&["plan.txt"])).is_err());
    }
}
