//! Note engine contract and implementations.
//!
//! # Responsibility
//! - Define [`NoteEngine`], the only surface the command layer talks to.
//! - Provide the embedded-store engine and an in-memory engine.
//!
//! # Invariants
//! - Every mutating call is its own atomic unit; there are no batches.
//! - Store errors surface unchanged; nothing is retried.
//! - Operations after `close` fail with [`EngineError::EngineClosed`].

use crate::db::DbError;
use crate::model::note::{
    DecodeError, EncodeError, Note, NoteId, NoteValidationError, ParseNoteIdError,
};
use crate::options::EngineOptions;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

mod local_db;
mod memory;

pub use local_db::LocalDbEngine;
pub use memory::MemoryNoteEngine;

/// Name of the record collection holding notes.
pub const NOTES_BUCKET: &str = "notes";

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by [`NoteEngine`] operations.
#[derive(Debug)]
pub enum EngineError {
    /// The store file could not be created, opened, locked or migrated.
    StorageOpen { path: PathBuf, source: DbError },
    /// The notes collection vanished from an open store.
    CollectionMissing(&'static str),
    /// Zero, empty or unparseable identifier.
    InvalidId(String),
    NoteNotFound(NoteId),
    EmptyContent,
    Decode(DecodeError),
    Encode(EncodeError),
    /// Store failure during an operation on an open engine.
    Storage(DbError),
    NotInitialized,
    AlreadyInitialized(PathBuf),
    EngineClosed,
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageOpen { path, source } => {
                if source.is_lock_contention() {
                    write!(
                        f,
                        "cannot open note store `{}`: locked by another process",
                        path.display()
                    )
                } else {
                    write!(f, "cannot open note store `{}`: {source}", path.display())
                }
            }
            Self::CollectionMissing(name) => write!(f, "collection `{name}` not found"),
            Self::InvalidId(value) if value.is_empty() => write!(f, "note id is required"),
            Self::InvalidId(value) => write!(f, "invalid note id `{value}`"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::EmptyContent => write!(f, "note content cannot be empty"),
            Self::Decode(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "note store error: {err}"),
            Self::NotInitialized => write!(f, "note engine is not initialized"),
            Self::AlreadyInitialized(path) => {
                write!(f, "note engine already open at `{}`", path.display())
            }
            Self::EngineClosed => write!(f, "note engine is closed"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageOpen { source, .. } => Some(source),
            Self::Decode(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for EngineError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

impl From<DecodeError> for EngineError {
    fn from(value: DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<EncodeError> for EngineError {
    fn from(value: EncodeError) -> Self {
        Self::Encode(value)
    }
}

impl From<NoteValidationError> for EngineError {
    fn from(value: NoteValidationError) -> Self {
        match value {
            NoteValidationError::EmptyContent => Self::EmptyContent,
        }
    }
}

impl From<ParseNoteIdError> for EngineError {
    fn from(value: ParseNoteIdError) -> Self {
        Self::InvalidId(value.input().to_string())
    }
}

/// Capability set consumed by the command layer.
///
/// Implementations own their storage handle. `close` must be called at most
/// once; dropping an engine also releases its handle.
pub trait NoteEngine {
    /// Opens the store at `path`, creating the notes collection if absent.
    fn initialize(&mut self, path: &Path, options: &EngineOptions) -> EngineResult<()>;

    /// Validates, assigns a fresh id and persists a new note atomically.
    fn create_note(&mut self, content: &str, headline: &str, tags: &[String])
        -> EngineResult<Note>;

    fn read_note(&self, id: NoteId) -> EngineResult<Note>;

    /// Partially overwrites a note and returns the stored result.
    ///
    /// Empty `content`/`headline` and an empty `tags` slice keep the stored
    /// value; `updated_at` is always refreshed.
    fn update_note(
        &mut self,
        id: NoteId,
        content: &str,
        headline: &str,
        tags: &[String],
    ) -> EngineResult<Note>;

    /// Hard-deletes a note. Deleting a missing id succeeds.
    fn delete_note(&mut self, id: NoteId) -> EngineResult<()>;

    /// Lists notes in id order, keeping those with any tag in `tags`
    /// (case-insensitive) when `tags` is non-empty.
    fn list_notes(&self, tags: &[String]) -> EngineResult<Vec<Note>>;

    /// Lists notes whose headline or content contains `query` verbatim.
    fn search_notes(&self, query: &str) -> EngineResult<Vec<Note>>;

    fn close(&mut self) -> EngineResult<()>;
}

/// Rejects the zero sentinel id.
pub fn ensure_valid_id(id: NoteId) -> EngineResult<()> {
    if id.is_sentinel() {
        return Err(EngineError::InvalidId(id.get().to_string()));
    }
    Ok(())
}
