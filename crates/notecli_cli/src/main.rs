//! `notecli` entry point.
//!
//! # Responsibility
//! - Parse arguments, resolve file locations and start logging.
//! - Open the note store once per invocation and close it exactly once.
//!
//! # Invariants
//! - Logging failures never block a command; they are reported on stderr.
//! - Any command or close failure exits with a non-zero status.

mod cli;
mod commands;
mod editor;
mod error;
mod paths;

use clap::Parser;
use cli::Cli;
use editor::ExternalEditor;
use error::CliResult;
use log::warn;
use notecli_core::{default_log_level, init_logging, EngineOptions, LocalDbEngine, NoteEngine};
use paths::AppPaths;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let paths = AppPaths::resolve(cli.db.as_deref());
    paths.ensure_store_dir()?;

    if let Err(err) = init_logging(log_level(&cli), &paths.log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let mut engine = LocalDbEngine::open(&paths.store_file, &EngineOptions::default())?;
    let stdout = std::io::stdout();
    let result = commands::dispatch(
        &mut engine,
        cli.command,
        &ExternalEditor::from_env(),
        &mut stdout.lock(),
    );

    let closed = engine.close();
    if let Err(err) = &closed {
        warn!("event=cli_exit module=cli status=error error={err}");
    }
    result?;
    closed?;
    Ok(())
}

fn log_level(cli: &Cli) -> &str {
    cli.log_level.as_deref().unwrap_or(default_log_level())
}

#[cfg(test)]
mod tests {
    use super::log_level;
    use crate::cli::Cli;
    use clap::Parser;
    use notecli_core::default_log_level;

    #[test]
    fn log_level_prefers_flag_over_build_default() {
        let cli = Cli::try_parse_from(["notecli", "--log-level", "warn", "list"]).unwrap();
        assert_eq!(log_level(&cli), "warn");

        let mut cli = Cli::try_parse_from(["notecli", "list"]).unwrap();
        cli.log_level = None;
        assert_eq!(log_level(&cli), default_log_level());
    }
}
