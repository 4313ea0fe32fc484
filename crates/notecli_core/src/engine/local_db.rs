//! Embedded-store note engine.
//!
//! # Responsibility
//! - Own the single store connection for the process.
//! - Encode notes into the `notes` bucket under 8-byte big-endian keys.
//! - Allocate ids from the bucket sequence inside the write transaction.
//!
//! # Invariants
//! - Create/update/delete each run in one `IMMEDIATE` transaction; a failed
//!   step rolls back every earlier step of the same call.
//! - Scans abort on the first undecodable record.
//! - Log events carry ids and counts only, never note text.

use super::{ensure_valid_id, EngineError, EngineResult, NoteEngine, NOTES_BUCKET};
use crate::db::{
    bucket, create_bucket_if_not_exists, open_store, open_store_in_memory, Bucket, DbError,
};
use crate::model::note::{validate_content, Note, NoteId};
use crate::options::EngineOptions;
use log::{debug, error, info};
use rusqlite::{Connection, TransactionBehavior};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Instant;

const MEMORY_PATH: &str = ":memory:";

enum EngineState {
    Uninitialized,
    Open { conn: Connection, path: PathBuf },
    Closed,
}

/// [`NoteEngine`] backed by a single locked SQLite file.
///
/// Dropping an open engine closes the connection and releases the file lock.
pub struct LocalDbEngine {
    state: EngineState,
}

impl Default for LocalDbEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalDbEngine {
    /// Creates an engine that must be initialized before use.
    pub fn new() -> Self {
        Self {
            state: EngineState::Uninitialized,
        }
    }

    /// Creates and initializes an engine for the store at `path`.
    pub fn open(path: impl AsRef<Path>, options: &EngineOptions) -> EngineResult<Self> {
        let mut engine = Self::new();
        engine.initialize(path.as_ref(), options)?;
        Ok(engine)
    }

    /// Creates an engine over a private in-memory store.
    pub fn open_in_memory() -> EngineResult<Self> {
        let path = PathBuf::from(MEMORY_PATH);
        let conn = open_store_in_memory().map_err(|source| EngineError::StorageOpen {
            path: path.clone(),
            source,
        })?;
        create_bucket_if_not_exists(&conn, NOTES_BUCKET).map_err(|source| {
            EngineError::StorageOpen {
                path: path.clone(),
                source,
            }
        })?;
        Ok(Self {
            state: EngineState::Open { conn, path },
        })
    }

    /// Path of the open store, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.state {
            EngineState::Open { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, EngineState::Open { .. })
    }

    fn conn(&self) -> EngineResult<&Connection> {
        match &self.state {
            EngineState::Open { conn, .. } => Ok(conn),
            EngineState::Uninitialized => Err(EngineError::NotInitialized),
            EngineState::Closed => Err(EngineError::EngineClosed),
        }
    }

    fn conn_mut(&mut self) -> EngineResult<&mut Connection> {
        match &mut self.state {
            EngineState::Open { conn, .. } => Ok(conn),
            EngineState::Uninitialized => Err(EngineError::NotInitialized),
            EngineState::Closed => Err(EngineError::EngineClosed),
        }
    }

    fn scan(&self, mut keep: impl FnMut(&Note) -> bool) -> EngineResult<Vec<Note>> {
        let conn = self.conn()?;
        let notes_bucket = notes_bucket(conn)?;
        let mut notes = Vec::new();
        notes_bucket.for_each(|key, value| -> EngineResult<()> {
            let note = Note::decode(value)?;
            if NoteId::from_key(key) != Some(note.id) {
                return Err(DbError::InvalidData(format!(
                    "record key does not match note id {}",
                    note.id
                ))
                .into());
            }
            if keep(&note) {
                notes.push(note);
            }
            Ok(())
        })?;
        Ok(notes)
    }
}

impl NoteEngine for LocalDbEngine {
    fn initialize(&mut self, path: &Path, options: &EngineOptions) -> EngineResult<()> {
        match &self.state {
            EngineState::Open { path: current, .. } => {
                return Err(EngineError::AlreadyInitialized(current.clone()));
            }
            EngineState::Closed => return Err(EngineError::EngineClosed),
            EngineState::Uninitialized => {}
        }

        let storage_open = |source| EngineError::StorageOpen {
            path: path.to_path_buf(),
            source,
        };
        let conn = open_store(path, options).map_err(storage_open)?;
        // On failure `conn` drops here, releasing the file lock.
        create_bucket_if_not_exists(&conn, NOTES_BUCKET).map_err(storage_open)?;

        self.state = EngineState::Open {
            conn,
            path: path.to_path_buf(),
        };
        Ok(())
    }

    fn create_note(
        &mut self,
        content: &str,
        headline: &str,
        tags: &[String],
    ) -> EngineResult<Note> {
        let started_at = Instant::now();
        let result = (|| -> EngineResult<Note> {
            let conn = self.conn_mut()?;
            validate_content(content)?;

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let note = {
                let notes_bucket = notes_bucket(&tx)?;
                let id = NoteId::new(notes_bucket.next_sequence()?);
                let note = Note::new(id, headline, content, tags.to_vec());
                note.validate()?;
                notes_bucket.put(&id.to_key(), &note.encode()?)?;
                note
            };
            tx.commit()?;
            Ok(note)
        })();

        log_outcome("note_create", started_at, &result, |note| {
            format!("id={} tags={}", note.id.get(), note.tags.len())
        });
        result
    }

    fn read_note(&self, id: NoteId) -> EngineResult<Note> {
        let conn = self.conn()?;
        ensure_valid_id(id)?;
        let data = notes_bucket(conn)?
            .get(&id.to_key())?
            .ok_or(EngineError::NoteNotFound(id))?;
        Ok(Note::decode(&data)?)
    }

    fn update_note(
        &mut self,
        id: NoteId,
        content: &str,
        headline: &str,
        tags: &[String],
    ) -> EngineResult<Note> {
        let started_at = Instant::now();
        let result = (|| -> EngineResult<Note> {
            let conn = self.conn_mut()?;
            ensure_valid_id(id)?;

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let note = {
                let notes_bucket = notes_bucket(&tx)?;
                let key = id.to_key();
                let data = notes_bucket
                    .get(&key)?
                    .ok_or(EngineError::NoteNotFound(id))?;
                let mut note = Note::decode(&data)?;
                note.merge_update(content, headline, tags);
                note.validate()?;
                notes_bucket.put(&key, &note.encode()?)?;
                note
            };
            tx.commit()?;
            Ok(note)
        })();

        log_outcome("note_update", started_at, &result, |note| {
            format!("id={}", note.id.get())
        });
        result
    }

    fn delete_note(&mut self, id: NoteId) -> EngineResult<()> {
        let started_at = Instant::now();
        let result = (|| -> EngineResult<()> {
            let conn = self.conn_mut()?;
            ensure_valid_id(id)?;

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let removed = notes_bucket(&tx)?.delete(&id.to_key())?;
            tx.commit()?;
            if !removed {
                debug!(
                    "event=note_delete module=engine status=noop id={}",
                    id.get()
                );
            }
            Ok(())
        })();

        log_outcome("note_delete", started_at, &result, |_| {
            format!("id={}", id.get())
        });
        result
    }

    fn list_notes(&self, tags: &[String]) -> EngineResult<Vec<Note>> {
        let started_at = Instant::now();
        let result = self.scan(|note| note.matches_tag_filter(tags));
        log_outcome("note_list", started_at, &result, |notes| {
            format!("tag_filters={} count={}", tags.len(), notes.len())
        });
        result
    }

    fn search_notes(&self, query: &str) -> EngineResult<Vec<Note>> {
        let started_at = Instant::now();
        let result = self.scan(|note| note.matches_query(query));
        log_outcome("note_search", started_at, &result, |notes| {
            format!("query_chars={} count={}", query.chars().count(), notes.len())
        });
        result
    }

    fn close(&mut self) -> EngineResult<()> {
        match std::mem::replace(&mut self.state, EngineState::Closed) {
            EngineState::Open { conn, .. } => {
                conn.close().map_err(|(_conn, err)| {
                    error!("event=store_close module=engine status=error error={err}");
                    EngineError::from(err)
                })?;
                info!("event=store_close module=engine status=ok");
                Ok(())
            }
            EngineState::Uninitialized => {
                self.state = EngineState::Uninitialized;
                Err(EngineError::NotInitialized)
            }
            EngineState::Closed => Err(EngineError::EngineClosed),
        }
    }
}

fn notes_bucket(conn: &Connection) -> EngineResult<Bucket<'_>> {
    bucket(conn, NOTES_BUCKET)?.ok_or(EngineError::CollectionMissing(NOTES_BUCKET))
}

fn log_outcome<T, D: Display>(
    event: &str,
    started_at: Instant,
    result: &EngineResult<T>,
    details: impl FnOnce(&T) -> D,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(value) => info!(
            "event={event} module=engine status=ok duration_ms={duration_ms} {}",
            details(value)
        ),
        Err(err) => error!(
            "event={event} module=engine status=error duration_ms={duration_ms} error={err}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineState, LocalDbEngine};
    use crate::db::DbError;
    use crate::engine::{EngineError, NoteEngine, NOTES_BUCKET};
    use crate::model::note::{Note, NoteId};

    fn raw_conn(engine: &LocalDbEngine) -> &rusqlite::Connection {
        match &engine.state {
            EngineState::Open { conn, .. } => conn,
            _ => panic!("engine is not open"),
        }
    }

    #[test]
    fn vanished_collection_is_reported() {
        let mut engine = LocalDbEngine::open_in_memory().unwrap();
        engine.create_note("body", "", &[]).unwrap();
        raw_conn(&engine)
            .execute("DELETE FROM buckets WHERE name = ?1;", [NOTES_BUCKET])
            .unwrap();

        assert!(matches!(
            engine.read_note(NoteId::new(1)),
            Err(EngineError::CollectionMissing(NOTES_BUCKET))
        ));
        assert!(matches!(
            engine.create_note("body", "", &[]),
            Err(EngineError::CollectionMissing(_))
        ));
        assert!(matches!(
            engine.list_notes(&[]),
            Err(EngineError::CollectionMissing(_))
        ));
    }

    #[test]
    fn failed_update_rolls_back() {
        let mut engine = LocalDbEngine::open_in_memory().unwrap();
        let mut stored = engine.create_note("body", "old", &[]).unwrap();
        stored.content.clear();
        raw_conn(&engine)
            .execute(
                "UPDATE records SET value = ?1 WHERE bucket = ?2 AND key = ?3;",
                rusqlite::params![stored.encode().unwrap(), NOTES_BUCKET, &stored.id.to_key()[..]],
            )
            .unwrap();

        let err = engine.update_note(stored.id, "", "new", &[]).unwrap_err();
        assert!(matches!(err, EngineError::EmptyContent));

        let reloaded: Note = engine.read_note(stored.id).unwrap();
        assert_eq!(reloaded.headline, "old");
        assert_eq!(reloaded.updated_at, stored.updated_at);
    }

    #[test]
    fn failed_create_does_not_store_a_record() {
        let mut engine = LocalDbEngine::open_in_memory().unwrap();
        assert!(engine.create_note("", "", &[]).is_err());
        let first = engine.create_note("body", "", &[]).unwrap();
        assert_eq!(first.id, NoteId::new(1));
    }

    #[test]
    fn scan_rejects_record_stored_under_foreign_key() {
        let mut engine = LocalDbEngine::open_in_memory().unwrap();
        let note = engine.create_note("body", "", &[]).unwrap();
        raw_conn(&engine)
            .execute(
                "UPDATE records SET key = ?1 WHERE bucket = ?2;",
                rusqlite::params![&NoteId::new(9).to_key()[..], NOTES_BUCKET],
            )
            .unwrap();

        assert!(matches!(
            engine.list_notes(&[]),
            Err(EngineError::Storage(DbError::InvalidData(_)))
        ));
        assert!(matches!(
            engine.search_notes(""),
            Err(EngineError::Storage(DbError::InvalidData(_)))
        ));
        assert_eq!(note.id, NoteId::new(1));
    }
}
