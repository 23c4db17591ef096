//! In-memory note store.
//!
//! Notes live only for the lifetime of the process. The store hands out
//! creation-ordered ids and owns the best-effort reconciliation of analysis
//! themes back onto notes.

use thiserror::Error;
use time::OffsetDateTime;

use crate::models::{Note, NoteBuilder, NoteId, Theme};

/// Errors raised by note mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoteStoreError {
    /// Submitted text was empty or whitespace-only.
    #[error("Note text cannot be empty")]
    EmptyText,

    /// No note with this id exists.
    #[error("Note {0} not found")]
    NotFound(NoteId),
}

/// Ordered collection of user-authored notes.
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    notes: Vec<Note>,
    last_id: i64,
}

impl NoteStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all notes in insertion order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Looks up a note by id.
    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id() == id)
    }

    /// Returns the text of every note, in order.
    pub fn texts(&self) -> Vec<String> {
        self.notes.iter().map(|n| n.text().to_string()).collect()
    }

    /// Adds a note with the given text, trimmed.
    ///
    /// # Errors
    ///
    /// Returns `NoteStoreError::EmptyText` if the trimmed text is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use noema::NoteStore;
    ///
    /// let mut store = NoteStore::new();
    /// let id = store.add("  walk more  ").unwrap().id();
    /// assert_eq!(store.get(id).unwrap().text(), "walk more");
    /// assert!(store.add("   ").is_err());
    /// ```
    pub fn add(&mut self, text: &str) -> Result<&Note, NoteStoreError> {
        self.add_at(text, OffsetDateTime::now_utc())
    }

    fn add_at(&mut self, text: &str, now: OffsetDateTime) -> Result<&Note, NoteStoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NoteStoreError::EmptyText);
        }

        let id = self.next_id(now);
        self.notes.push(
            NoteBuilder::new()
                .id(id)
                .text(text)
                .created_at(now)
                .build(),
        );

        Ok(&self.notes[self.notes.len() - 1])
    }

    /// Replaces the text of an existing note.
    ///
    /// # Errors
    ///
    /// Returns `EmptyText` for blank text and `NotFound` for an unknown id.
    pub fn edit(&mut self, id: NoteId, text: &str) -> Result<(), NoteStoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NoteStoreError::EmptyText);
        }

        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id() == id)
            .ok_or(NoteStoreError::NotFound(id))?;
        note.set_text(text);
        Ok(())
    }

    /// Removes a note and returns it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    pub fn delete(&mut self, id: NoteId) -> Result<Note, NoteStoreError> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id() == id)
            .ok_or(NoteStoreError::NotFound(id))?;
        Ok(self.notes.remove(index))
    }

    /// Removes every note.
    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Assigns theme names back onto notes by exact text match.
    ///
    /// Every existing assignment is cleared first. For each theme in order and
    /// each of its entries, the first note whose text is byte-for-byte equal
    /// receives the theme name; a later theme overwrites an earlier one.
    /// Notes that match nothing keep no theme.
    pub fn assign_themes(&mut self, themes: &[Theme]) {
        for note in &mut self.notes {
            note.set_theme(None);
        }

        for theme in themes {
            for entry in &theme.notes {
                if let Some(note) = self.notes.iter_mut().find(|n| n.text() == entry.text) {
                    note.set_theme(Some(theme.name.clone()));
                }
            }
        }
    }

    fn next_id(&mut self, now: OffsetDateTime) -> NoteId {
        let millis = i64::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX);
        let id = millis.max(self.last_id + 1);
        self.last_id = id;
        NoteId::new(id)
    }
}
