use serde::{Deserialize, Serialize};

/// A note entry inside a theme, as returned by the analysis provider.
///
/// User notes carry the exact text that was submitted; AI notes are new text
/// written by the provider. A bare JSON string is accepted as a user note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawNoteRef")]
pub struct NoteRef {
    pub text: String,
    pub ai_generated: bool,
}

impl NoteRef {
    /// Creates a reference to a user-authored note.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ai_generated: false,
        }
    }

    /// Creates a provider-authored note.
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ai_generated: true,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNoteRef {
    Text(String),
    Entry {
        text: String,
        #[serde(default, rename = "aiGenerated")]
        ai_generated: bool,
    },
}

impl From<RawNoteRef> for NoteRef {
    fn from(raw: RawNoteRef) -> Self {
        match raw {
            RawNoteRef::Text(text) => NoteRef::user(text),
            RawNoteRef::Entry { text, ai_generated } => NoteRef { text, ai_generated },
        }
    }
}

/// A provider-assigned grouping of notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
    #[serde(default)]
    pub notes: Vec<NoteRef>,
}

impl Theme {
    /// Creates a theme with no notes and no insight.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            insight: None,
            notes: Vec::new(),
        }
    }

    /// Sets the short insight shown under the theme name.
    pub fn with_insight(mut self, insight: impl Into<String>) -> Self {
        self.insight = Some(insight.into());
        self
    }

    /// Appends a note entry.
    pub fn with_note(mut self, note: NoteRef) -> Self {
        self.notes.push(note);
        self
    }

    /// Number of provider-authored notes in this theme.
    pub fn ai_note_count(&self) -> usize {
        self.notes.iter().filter(|n| n.ai_generated).count()
    }
}
