//! Text editor integration.

use crate::error::{CliError, CliResult};
use std::io::Write;
use std::process::Command;

const FALLBACK_EDITOR: &str = "vi";

/// Produces edited text from an initial buffer.
pub trait TextEditor {
    fn edit(&self, initial: &str) -> CliResult<String>;
}

/// Runs `$EDITOR` on a temporary file and waits for it to exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_env() -> Self {
        match std::env::var("EDITOR") {
            Ok(value) if !value.trim().is_empty() => Self::new(value),
            _ => Self::new(FALLBACK_EDITOR),
        }
    }
}

impl TextEditor for ExternalEditor {
    fn edit(&self, initial: &str) -> CliResult<String> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| CliError::Editor("editor command is empty".to_string()))?;

        let mut buffer = tempfile::Builder::new()
            .prefix("notecli-buffer-")
            .suffix(".txt")
            .tempfile()?;
        buffer.write_all(initial.as_bytes())?;
        buffer.flush()?;

        let status = Command::new(program)
            .args(parts)
            .arg(buffer.path())
            .status()
            .map_err(|err| CliError::Editor(format!("cannot launch `{program}`: {err}")))?;
        if !status.success() {
            return Err(CliError::Editor(format!("`{program}` exited with {status}")));
        }

        let edited = std::fs::read_to_string(buffer.path())?;
        Ok(strip_final_newline(edited))
    }
}

/// Drops the single line terminator most editors append on save.
fn strip_final_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    text
}
