//! CLI error type.

use notecli_core::EngineError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    Engine(EngineError),
    Io(std::io::Error),
    Editor(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Editor(message) => write!(f, "editor failed: {message}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Editor(_) => None,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
