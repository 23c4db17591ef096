pub mod analyzer;
pub mod client;
pub mod config;
pub mod graph;
pub mod models;
pub mod openai;
pub mod server;
pub mod state;
pub mod store;
pub mod tui;

pub use analyzer::{AnalysisError, Analyzer};
pub use client::ApiClient;
pub use models::{AnalysisResult, Insight, Note, NoteBuilder, NoteId, NoteRef, Theme};
pub use state::{AppState, View};
pub use store::{NoteStore, NoteStoreError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_accessible_from_crate_root() {
        let mut store = NoteStore::new();
        assert!(store.add("first thought").is_ok());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn types_accessible_from_crate_root() {
        let theme = Theme::new("Focus").with_note(NoteRef::ai("Protect mornings"));
        assert_eq!(theme.ai_note_count(), 1);

        let note = NoteBuilder::new().id(NoteId::new(1)).text("test").build();
        assert_eq!(note.text(), "test");

        let state = AppState::new();
        assert_eq!(state.view(), View::List);
        assert!(AnalysisResult::default().is_empty());
    }
}
