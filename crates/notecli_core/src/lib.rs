//! Note persistence engine for the `notecli` tool.
//!
//! This crate owns the note record, the embedded store and the
//! [`NoteEngine`] contract. It never prints; callers render results.

pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod options;

pub use db::{DbError, DbResult};
pub use engine::{
    EngineError, EngineResult, LocalDbEngine, MemoryNoteEngine, NoteEngine, NOTES_BUCKET,
};
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::note::{DecodeError, Note, NoteId, ParseNoteIdError, NOTE_ID_DISPLAY_WIDTH};
pub use options::EngineOptions;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
