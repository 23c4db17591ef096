use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::NoteId;

/// A user-authored note.
///
/// Notes are the unit of input for analysis. The `theme` is only populated
/// after an analysis run matched this note's text against a returned theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    id: NoteId,
    text: String,
    theme: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl Note {
    /// Returns the note's identifier.
    pub fn id(&self) -> NoteId {
        self.id
    }

    /// Returns the note's text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the theme assigned by the last analysis, if any.
    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    /// Returns when this note was created.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub(crate) fn set_theme(&mut self, theme: Option<String>) {
        self.theme = theme;
    }
}

/// Builder for constructing `Note` instances with optional fields.
///
/// # Examples
///
/// ```
/// use noema::{NoteBuilder, NoteId};
///
/// let note = NoteBuilder::new()
///     .id(NoteId::new(1))
///     .text("My first note")
///     .build();
///
/// assert_eq!(note.id(), NoteId::new(1));
/// assert_eq!(note.text(), "My first note");
/// assert!(note.theme().is_none());
/// ```
#[derive(Debug, Default)]
pub struct NoteBuilder {
    id: Option<NoteId>,
    text: Option<String>,
    theme: Option<String>,
    created_at: Option<OffsetDateTime>,
}

impl NoteBuilder {
    /// Creates a new `NoteBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the note ID.
    pub fn id(mut self, id: NoteId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the note text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the assigned theme.
    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    /// Sets the created timestamp.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builds the `Note`, using defaults for optional fields.
    ///
    /// # Panics
    ///
    /// Panics if `id` or `text` have not been set.
    pub fn build(self) -> Note {
        Note {
            id: self.id.expect("id is required"),
            text: self.text.expect("text is required"),
            theme: self.theme,
            created_at: self.created_at.unwrap_or_else(OffsetDateTime::now_utc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_builder_creates_note_without_theme() {
        let note = NoteBuilder::new().id(NoteId::new(1)).text("Test note").build();

        assert_eq!(note.id(), NoteId::new(1));
        assert_eq!(note.text(), "Test note");
        assert_eq!(note.theme(), None);
    }

    #[test]
    fn note_builder_allows_setting_all_fields() {
        let now = OffsetDateTime::now_utc();

        let note = NoteBuilder::new()
            .id(NoteId::new(42))
            .text("Complete note")
            .theme("Focus")
            .created_at(now)
            .build();

        assert_eq!(note.id(), NoteId::new(42));
        assert_eq!(note.theme(), Some("Focus"));
        assert_eq!(note.created_at(), now);
    }

    #[test]
    fn note_serializes_with_camel_case_timestamp() {
        let created_at = time::macros::datetime!(2024-03-01 12:00:00 UTC);
        let note = NoteBuilder::new()
            .id(NoteId::new(7))
            .text("hello")
            .created_at(created_at)
            .build();

        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["text"], "hello");
        assert!(json["theme"].is_null());
        assert_eq!(json["createdAt"], "2024-03-01T12:00:00Z");
    }
}
