//! In-memory note engine.
//!
//! Mirrors [`super::LocalDbEngine`] semantics without touching disk. Notes
//! are kept decoded; ids come from a private counter that is never rewound.

use super::{ensure_valid_id, EngineError, EngineResult, NoteEngine};
use crate::model::note::{validate_content, Note, NoteId};
use crate::options::EngineOptions;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryState {
    Uninitialized,
    Open,
    Closed,
}

#[derive(Debug)]
pub struct MemoryNoteEngine {
    state: MemoryState,
    sequence: u64,
    notes: BTreeMap<NoteId, Note>,
}

impl Default for MemoryNoteEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNoteEngine {
    /// Creates an engine that must be initialized before use.
    pub fn new() -> Self {
        Self {
            state: MemoryState::Uninitialized,
            sequence: 0,
            notes: BTreeMap::new(),
        }
    }

    /// Creates an engine that is ready for use.
    pub fn open() -> Self {
        Self {
            state: MemoryState::Open,
            ..Self::new()
        }
    }

    fn ensure_open(&self) -> EngineResult<()> {
        match self.state {
            MemoryState::Open => Ok(()),
            MemoryState::Uninitialized => Err(EngineError::NotInitialized),
            MemoryState::Closed => Err(EngineError::EngineClosed),
        }
    }
}

impl NoteEngine for MemoryNoteEngine {
    fn initialize(&mut self, path: &Path, _options: &EngineOptions) -> EngineResult<()> {
        match self.state {
            MemoryState::Uninitialized => {
                self.state = MemoryState::Open;
                Ok(())
            }
            MemoryState::Open => Err(EngineError::AlreadyInitialized(path.to_path_buf())),
            MemoryState::Closed => Err(EngineError::EngineClosed),
        }
    }

    fn create_note(
        &mut self,
        content: &str,
        headline: &str,
        tags: &[String],
    ) -> EngineResult<Note> {
        self.ensure_open()?;
        validate_content(content)?;

        self.sequence += 1;
        let note = Note::new(NoteId::new(self.sequence), headline, content, tags.to_vec());
        self.notes.insert(note.id, note.clone());
        Ok(note)
    }

    fn read_note(&self, id: NoteId) -> EngineResult<Note> {
        self.ensure_open()?;
        ensure_valid_id(id)?;
        self.notes
            .get(&id)
            .cloned()
            .ok_or(EngineError::NoteNotFound(id))
    }

    fn update_note(
        &mut self,
        id: NoteId,
        content: &str,
        headline: &str,
        tags: &[String],
    ) -> EngineResult<Note> {
        self.ensure_open()?;
        ensure_valid_id(id)?;

        let stored = self.notes.get(&id).ok_or(EngineError::NoteNotFound(id))?;
        let mut updated = stored.clone();
        updated.merge_update(content, headline, tags);
        updated.validate()?;
        self.notes.insert(id, updated.clone());
        Ok(updated)
    }

    fn delete_note(&mut self, id: NoteId) -> EngineResult<()> {
        self.ensure_open()?;
        ensure_valid_id(id)?;
        self.notes.remove(&id);
        Ok(())
    }

    fn list_notes(&self, tags: &[String]) -> EngineResult<Vec<Note>> {
        self.ensure_open()?;
        Ok(self
            .notes
            .values()
            .filter(|note| note.matches_tag_filter(tags))
            .cloned()
            .collect())
    }

    fn search_notes(&self, query: &str) -> EngineResult<Vec<Note>> {
        self.ensure_open()?;
        Ok(self
            .notes
            .values()
            .filter(|note| note.matches_query(query))
            .cloned()
            .collect())
    }

    fn close(&mut self) -> EngineResult<()> {
        self.ensure_open()?;
        self.state = MemoryState::Closed;
        self.notes.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryNoteEngine;
    use crate::engine::{EngineError, NoteEngine};
    use crate::model::note::NoteId;
    use crate::options::EngineOptions;
    use std::path::Path;

    #[test]
    fn requires_initialize_before_use() {
        let mut engine = MemoryNoteEngine::new();
        assert!(matches!(
            engine.list_notes(&[]),
            Err(EngineError::NotInitialized)
        ));
        engine
            .initialize(Path::new("unused"), &EngineOptions::default())
            .unwrap();
        assert!(engine.list_notes(&[]).unwrap().is_empty());
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut engine = MemoryNoteEngine::open();
        let first = engine.create_note("one", "", &[]).unwrap();
        engine.delete_note(first.id).unwrap();
        let second = engine.create_note("two", "", &[]).unwrap();
        assert_eq!(first.id, NoteId::new(1));
        assert_eq!(second.id, NoteId::new(2));
    }

    #[test]
    fn failed_update_leaves_note_untouched() {
        let mut engine = MemoryNoteEngine::open();
        let created = engine.create_note("body", "", &[]).unwrap();
        engine.notes.get_mut(&created.id).unwrap().content.clear();

        let err = engine.update_note(created.id, "", "head", &[]).unwrap_err();
        assert!(matches!(err, EngineError::EmptyContent));
        assert_eq!(engine.read_note(created.id).unwrap().headline, "");
    }
}
