use notecli_core::{EngineError, EngineOptions, LocalDbEngine, Note, NoteEngine, NoteId};
use rusqlite::{params, Connection};
use std::path::Path;

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn ids(notes: &[Note]) -> Vec<u64> {
    notes.iter().map(|note| note.id.get()).collect()
}

fn seeded_engine(dir: &Path) -> LocalDbEngine {
    let mut engine = LocalDbEngine::open(dir.join("notes.db"), &EngineOptions::default()).unwrap();
    engine
        .create_note("quarterly report", "Work", &tags(&["Work", "urgent"]))
        .unwrap();
    engine
        .create_note("say hello to grandma", "", &tags(&["family"]))
        .unwrap();
    engine
        .create_note("plain note without tags", "hello there", &[])
        .unwrap();
    engine
        .create_note("standup notes", "", &tags(&["WORK"]))
        .unwrap();
    engine
}

#[test]
fn list_without_filter_returns_every_note_in_id_order() {
    let dir = tempfile::tempdir().unwrap();
    let engine = seeded_engine(dir.path());

    assert_eq!(ids(&engine.list_notes(&[]).unwrap()), vec![1, 2, 3, 4]);
}

#[test]
fn list_tag_filter_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let engine = seeded_engine(dir.path());

    assert_eq!(ids(&engine.list_notes(&tags(&["work"])).unwrap()), vec![1, 4]);
}

#[test]
fn list_tag_filter_is_logical_or() {
    let dir = tempfile::tempdir().unwrap();
    let engine = seeded_engine(dir.path());

    let listed = engine.list_notes(&tags(&["family", "urgent"])).unwrap();
    assert_eq!(ids(&listed), vec![1, 2]);
    assert!(engine.list_notes(&tags(&["nothing"])).unwrap().is_empty());
}

#[test]
fn search_matches_headline_or_content_case_sensitively() {
    let dir = tempfile::tempdir().unwrap();
    let engine = seeded_engine(dir.path());

    assert_eq!(ids(&engine.search_notes("hello").unwrap()), vec![2, 3]);
    assert_eq!(ids(&engine.search_notes("Work").unwrap()), vec![1]);
    assert!(engine.search_notes("HELLO").unwrap().is_empty());
}

#[test]
fn empty_store_lists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let engine = LocalDbEngine::open(dir.path().join("notes.db"), &EngineOptions::default()).unwrap();

    assert!(engine.list_notes(&[]).unwrap().is_empty());
    assert!(engine.search_notes("anything").unwrap().is_empty());
}

#[test]
fn corrupt_record_aborts_list_and_search() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");
    let mut engine = seeded_engine(dir.path());
    engine.close().unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE records SET value = ?1 WHERE bucket = 'notes' AND key = ?2;",
        params![&b"{broken"[..], &NoteId::new(2).to_key()[..]],
    )
    .unwrap();
    drop(conn);

    let engine = LocalDbEngine::open(&path, &EngineOptions::default()).unwrap();
    assert!(matches!(
        engine.list_notes(&[]),
        Err(EngineError::Decode(_))
    ));
    assert!(matches!(
        engine.search_notes("note"),
        Err(EngineError::Decode(_))
    ));
    assert!(matches!(
        engine.read_note(NoteId::new(2)),
        Err(EngineError::Decode(_))
    ));
    assert!(engine.read_note(NoteId::new(1)).is_ok());
}
