//! Command handlers.
//!
//! Handlers depend only on [`NoteEngine`] and write human-readable output to
//! the supplied writer.

use crate::cli::Command;
use crate::editor::TextEditor;
use crate::error::{CliError, CliResult};
use notecli_core::{EngineError, Note, NoteEngine, NoteId};
use std::io::Write;

const LIST_TITLE_MAX_CHARS: usize = 60;

/// Runs one parsed subcommand.
pub fn dispatch<E: NoteEngine>(
    engine: &mut E,
    command: Command,
    editor: &impl TextEditor,
    out: &mut impl Write,
) -> CliResult<()> {
    match command {
        Command::Add {
            content,
            headline,
            tags,
        } => {
            let content = match content {
                Some(content) => content,
                None => editor.edit("")?,
            };
            add(engine, out, &content, &headline, &tags)
        }
        Command::Update {
            id,
            content,
            headline,
            tags,
        } => update(engine, out, &id, &content, &headline, &tags),
        Command::List { tags } => list(engine, out, &tags),
        Command::Show { id } => show(engine, out, &id),
        Command::Search { query } => search(engine, out, &query),
        Command::Edit { id } => edit(engine, out, editor, &id),
        Command::Delete { id } => delete(engine, out, &id),
    }
}

pub fn add<E: NoteEngine>(
    engine: &mut E,
    out: &mut impl Write,
    content: &str,
    headline: &str,
    tags: &[String],
) -> CliResult<()> {
    let note = engine.create_note(content, headline, &clean_tags(tags))?;
    writeln!(out, "Note created successfully with ID: {}", note.id)?;
    Ok(())
}

pub fn update<E: NoteEngine>(
    engine: &mut E,
    out: &mut impl Write,
    id: &str,
    content: &str,
    headline: &str,
    tags: &[String],
) -> CliResult<()> {
    let id = parse_id(id)?;
    engine.update_note(id, content, headline, &clean_tags(tags))?;
    writeln!(out, "Note updated successfully.")?;
    Ok(())
}

pub fn list<E: NoteEngine>(engine: &E, out: &mut impl Write, tags: &[String]) -> CliResult<()> {
    let notes = engine.list_notes(&clean_tags(tags))?;
    write_note_lines(out, &notes)
}

pub fn search<E: NoteEngine>(engine: &E, out: &mut impl Write, query: &str) -> CliResult<()> {
    let notes = engine.search_notes(query)?;
    write_note_lines(out, &notes)
}

pub fn show<E: NoteEngine>(engine: &E, out: &mut impl Write, id: &str) -> CliResult<()> {
    let note = engine.read_note(parse_id(id)?)?;
    writeln!(out, "Id: {}", note.id)?;
    writeln!(out, "Headline: {}", note.headline)?;
    writeln!(out, "Content: {}", note.content)?;
    writeln!(out, "Tags: {}", note.tags.join(", "))?;
    writeln!(out, "Created At: {}", note.created_at)?;
    writeln!(out, "Updated At: {}", note.updated_at)?;
    Ok(())
}

/// Replaces a note's content with the editor result.
///
/// An empty result keeps the stored content.
pub fn edit<E: NoteEngine>(
    engine: &mut E,
    out: &mut impl Write,
    editor: &impl TextEditor,
    id: &str,
) -> CliResult<()> {
    let id = parse_id(id)?;
    let note = engine.read_note(id)?;
    let edited = editor.edit(&note.content)?;
    if edited == note.content {
        writeln!(out, "Note unchanged.")?;
        return Ok(());
    }
    engine.update_note(id, &edited, "", &[])?;
    writeln!(out, "Note updated successfully.")?;
    Ok(())
}

pub fn delete<E: NoteEngine>(engine: &mut E, out: &mut impl Write, id: &str) -> CliResult<()> {
    engine.delete_note(parse_id(id)?)?;
    writeln!(out, "Note deleted successfully.")?;
    Ok(())
}

fn parse_id(value: &str) -> CliResult<NoteId> {
    value
        .parse::<NoteId>()
        .map_err(|err| CliError::Engine(EngineError::from(err)))
}

/// Trims tags and drops blank ones left over from comma splitting.
fn clean_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn write_note_lines(out: &mut impl Write, notes: &[Note]) -> CliResult<()> {
    if notes.is_empty() {
        writeln!(out, "No notes found.")?;
        return Ok(());
    }
    writeln!(out, "Notes found:")?;
    for note in notes {
        writeln!(out, "[{}] {}", note.id, list_title(note))?;
    }
    Ok(())
}

fn list_title(note: &Note) -> String {
    let single_line = note.title().replace(['\n', '\r'], " ");
    let mut title: String = single_line.chars().take(LIST_TITLE_MAX_CHARS).collect();
    if single_line.chars().count() > LIST_TITLE_MAX_CHARS {
        title.push_str("...");
    }
    title
}
