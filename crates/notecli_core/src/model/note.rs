//! Note record, identifier and codec.
//!
//! # Responsibility
//! - Define the persisted note shape and its validation rule.
//! - Encode/decode notes as self-describing JSON documents.
//! - Provide the tag filter and substring search predicates.
//!
//! # Invariants
//! - `content` must be non-empty for a note to be persisted.
//! - `NoteId(0)` is the sentinel "no id" value and never names a note.
//! - Record keys are the 8-byte big-endian form of the id.

use crate::model::timestamp::{timestamp_after, timestamp_now};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Zero-padded width used when rendering ids for humans.
pub const NOTE_ID_DISPLAY_WIDTH: usize = 8;

/// Store-assigned note identifier.
///
/// Allocated from the notes collection sequence, so values are unique and
/// strictly increasing for the lifetime of one store file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(u64);

impl NoteId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns whether this is the zero "no id" sentinel.
    pub const fn is_sentinel(self) -> bool {
        self.0 == 0
    }

    /// Returns the record key used by the notes collection.
    pub fn to_key(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Parses a record key; `None` unless the key is exactly 8 bytes.
    pub fn from_key(key: &[u8]) -> Option<Self> {
        <[u8; 8]>::try_from(key)
            .ok()
            .map(|bytes| Self(u64::from_be_bytes(bytes)))
    }
}

impl From<u64> for NoteId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$}", self.0, width = NOTE_ID_DISPLAY_WIDTH)
    }
}

/// Error returned when user text does not parse as a [`NoteId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNoteIdError {
    input: String,
}

impl ParseNoteIdError {
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Display for ParseNoteIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.input.is_empty() {
            write!(f, "note id is required")
        } else {
            write!(f, "invalid note id `{}`", self.input)
        }
    }
}

impl Error for ParseNoteIdError {}

impl FromStr for NoteId {
    type Err = ParseNoteIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(ParseNoteIdError {
                input: trimmed.to_string(),
            });
        }
        trimmed.parse::<u64>().map(Self).map_err(|_| ParseNoteIdError {
            input: trimmed.to_string(),
        })
    }
}

/// Validation failure for note write paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyContent,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "note content cannot be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// Stored bytes that do not parse as a note.
#[derive(Debug)]
pub struct DecodeError(serde_json::Error);

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed note record: {}", self.0)
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

/// Note could not be serialized.
#[derive(Debug)]
pub struct EncodeError(serde_json::Error);

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to encode note record: {}", self.0)
    }
}

impl Error for EncodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

/// Checks the content rule shared by create and update.
pub fn validate_content(content: &str) -> Result<(), NoteValidationError> {
    if content.is_empty() {
        return Err(NoteValidationError::EmptyContent);
    }
    Ok(())
}

/// Persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub headline: String,
    pub content: String,
    /// Display order is insertion order; duplicates are kept.
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Note {
    /// Creates a note stamped with the current time for both timestamps.
    pub fn new(
        id: NoteId,
        headline: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        let now = timestamp_now();
        Self {
            id,
            headline: headline.into(),
            content: content.into(),
            tags,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_content(&self.content)
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        serde_json::to_vec(self).map_err(EncodeError)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(bytes).map_err(DecodeError)
    }

    pub fn set_headline(&mut self, headline: impl Into<String>) {
        self.headline = headline.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Replaces the whole tag list.
    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    /// Moves `updated_at` strictly forward.
    pub fn touch(&mut self) {
        self.updated_at = timestamp_after(&self.updated_at);
    }

    /// Applies a partial update and refreshes `updated_at`.
    ///
    /// Empty `content`/`headline` and an empty `tags` slice keep the stored
    /// value. The result is not validated here.
    pub fn merge_update(&mut self, content: &str, headline: &str, tags: &[String]) {
        if !content.is_empty() {
            self.set_content(content);
        }
        if !headline.is_empty() {
            self.set_headline(headline);
        }
        if !tags.is_empty() {
            self.set_tags(tags.to_vec());
        }
        self.touch();
    }

    /// Returns whether the note passes a tag filter.
    ///
    /// An empty filter keeps every note; otherwise any requested tag must
    /// equal any note tag, ignoring case.
    pub fn matches_tag_filter(&self, filter: &[String]) -> bool {
        if filter.is_empty() {
            return true;
        }
        filter.iter().any(|wanted| {
            let wanted = wanted.to_lowercase();
            self.tags.iter().any(|tag| tag.to_lowercase() == wanted)
        })
    }

    /// Case-sensitive literal substring match over headline and content.
    pub fn matches_query(&self, query: &str) -> bool {
        self.headline.contains(query) || self.content.contains(query)
    }

    /// Headline when present, content otherwise.
    pub fn title(&self) -> &str {
        if self.headline.is_empty() {
            &self.content
        } else {
            &self.headline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteId, NoteValidationError};

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn note_id_displays_zero_padded() {
        assert_eq!(NoteId::new(1).to_string(), "00000001");
        assert_eq!(NoteId::new(123_456_789).to_string(), "123456789");
    }

    #[test]
    fn note_id_parses_padded_and_rejects_garbage() {
        assert_eq!("00000042".parse::<NoteId>().unwrap(), NoteId::new(42));
        assert_eq!(" 7 ".parse::<NoteId>().unwrap(), NoteId::new(7));
        assert!("".parse::<NoteId>().is_err());
        assert!("-1".parse::<NoteId>().is_err());
        assert!("+1".parse::<NoteId>().is_err());
        assert!("abc".parse::<NoteId>().is_err());
        assert!("99999999999999999999999".parse::<NoteId>().is_err());
        assert!("0".parse::<NoteId>().unwrap().is_sentinel());
    }

    #[test]
    fn note_id_key_is_big_endian() {
        let id = NoteId::new(258);
        assert_eq!(id.to_key(), [0, 0, 0, 0, 0, 0, 1, 2]);
        assert_eq!(NoteId::from_key(&id.to_key()), Some(id));
        assert_eq!(NoteId::from_key(&[1, 2, 3]), None);
    }

    #[test]
    fn codec_roundtrip_preserves_all_fields() {
        let note = Note::new(NoteId::new(3), "head", "body", tags(&["b", "A", "b"]));
        let decoded = Note::decode(&note.encode().unwrap()).unwrap();
        assert_eq!(decoded, note);
    }

    #[test]
    fn decode_accepts_any_field_order() {
        let raw = br#"{"tags":["x"],"updated_at":"u","content":"c","id":9,"created_at":"c0","headline":""}"#;
        let note = Note::decode(raw).unwrap();
        assert_eq!(note.id, NoteId::new(9));
        assert_eq!(note.content, "c");
        assert_eq!(note.tags, tags(&["x"]));
    }

    #[test]
    fn decode_rejects_malformed_bytes() {
        assert!(Note::decode(b"{not json").is_err());
        assert!(Note::decode(&[0xff, 0x00, 0x12]).is_err());
        assert!(Note::decode(br#"{"id":"one"}"#).is_err());
    }

    #[test]
    fn validate_requires_content() {
        let note = Note::new(NoteId::new(1), "headline only", "", Vec::new());
        assert_eq!(note.validate(), Err(NoteValidationError::EmptyContent));
        let note = Note::new(NoteId::new(1), "", " ", Vec::new());
        assert!(note.validate().is_ok());
    }

    #[test]
    fn merge_update_only_overwrites_supplied_fields() {
        let mut note = Note::new(NoteId::new(1), "head", "body", tags(&["one"]));
        let created_at = note.created_at.clone();
        let before = note.updated_at.clone();

        note.merge_update("", "", &[]);
        assert_eq!(note.headline, "head");
        assert_eq!(note.content, "body");
        assert_eq!(note.tags, tags(&["one"]));
        assert!(note.updated_at > before);

        note.merge_update("new body", "", &tags(&["two", "three"]));
        assert_eq!(note.headline, "head");
        assert_eq!(note.content, "new body");
        assert_eq!(note.tags, tags(&["two", "three"]));
        assert_eq!(note.created_at, created_at);
    }

    #[test]
    fn tag_filter_is_case_insensitive_or() {
        let note = Note::new(NoteId::new(1), "", "body", tags(&["Work", "home"]));
        assert!(note.matches_tag_filter(&[]));
        assert!(note.matches_tag_filter(&tags(&["work"])));
        assert!(note.matches_tag_filter(&tags(&["missing", "HOME"])));
        assert!(!note.matches_tag_filter(&tags(&["errand"])));
    }

    #[test]
    fn query_is_case_sensitive_substring() {
        let note = Note::new(NoteId::new(1), "Greeting", "say hello world", Vec::new());
        assert!(note.matches_query("hello"));
        assert!(note.matches_query("Greet"));
        assert!(!note.matches_query("Hello"));
        assert!(note.matches_query(""));
    }

    #[test]
    fn title_falls_back_to_content() {
        let note = Note::new(NoteId::new(1), "", "body", Vec::new());
        assert_eq!(note.title(), "body");
        let note = Note::new(NoteId::new(1), "head", "body", Vec::new());
        assert_eq!(note.title(), "head");
    }
}
