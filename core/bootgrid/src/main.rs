//! bootgrid: terminal heat map of when this machine was running.
//!
//! Reads boot/shutdown session records (by running `last` or from a file),
//! measures uptime per time-of-day bucket for each day and prints the result
//! as a colored grid, or as JSON with `--output json`.

mod cli;
mod error;
mod logging;
mod render;
mod source;
mod terminal;

use bootgrid_core::{load_config, BootgridEngine};
use clap::Parser;
use std::io;

use crate::cli::{Cli, OutputFormat};
use crate::error::CliError;
use crate::terminal::Capabilities;

fn main() {
    let cli = Cli::parse();
    let logging_guard = logging::init(cli.verbose, cli.log_file.as_deref());

    let code = match run(&cli) {
        Ok(()) => 0,
        Err(CliError::Render(e)) if e.is_broken_pipe() => 0,
        Err(e) => {
            // Stderr logs would repeat the message printed below.
            if cli.log_file.is_some() {
                tracing::error!(error = %e, "bootgrid failed");
            }
            eprintln!("bootgrid: {e}");
            1
        }
    };

    // `process::exit` skips destructors; flush the log writer first.
    drop(logging_guard);
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let mut config = load_config(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    let mut engine = BootgridEngine::from_config(&config)?;
    let now = cli.now(engine.zone)?;
    if let Some(window) = cli.window(now, engine.zone) {
        engine.window = window;
    }

    let text = match &cli.input {
        Some(path) => source::read_input(path)?,
        None => source::run_command(&config.command)?,
    };

    let run = engine.run(&text, now)?;
    tracing::info!(
        sessions = run.sessions,
        skipped = run.skipped_lines,
        days = run.report.rows.len(),
        "built uptime grid"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Json => render::render_json(&mut out, &run.report)?,
        OutputFormat::Text => {
            let style = terminal::choose_style(
                &Capabilities::detect(),
                cli.color,
                cli.palette,
                cli.ascii,
                cli.oldest_first,
            )?;
            render::render_text(&mut out, &run.report, &style)?;
        }
    }
    Ok(())
}
