use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a note.
///
/// The value is a unix timestamp in milliseconds taken when the note was
/// created. `NoteStore` bumps it when two notes land in the same millisecond,
/// so ids are unique and sort in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    /// Creates a new note ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying ID value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
