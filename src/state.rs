//! Application state shared by the presentation layer.
//!
//! `AppState` owns the notes, the latest analysis result and the UI flags,
//! and enforces when a result is invalidated.

use thiserror::Error;
use tracing::debug;

use crate::analyzer::{AnalysisError, MIN_NOTES};
use crate::models::{AnalysisResult, Insight, Note, NoteId, Theme};
use crate::store::{NoteStore, NoteStoreError};

/// Which presentation is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    List,
    Map,
}

impl View {
    pub fn toggled(self) -> Self {
        match self {
            Self::List => Self::Map,
            Self::Map => Self::List,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("An analysis is already in progress")]
    AnalysisInFlight,
}

/// Notes, the current analysis result and the UI flags around them.
#[derive(Debug, Default)]
pub struct AppState {
    notes: NoteStore,
    themes: Vec<Theme>,
    insights: Vec<Insight>,
    loading: bool,
    error: Option<String>,
    view: View,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.notes()
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn insights(&self) -> &[Insight] {
        &self.insights
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The error banner, if one is showing.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggled();
    }

    /// True once enough notes exist to request an analysis.
    pub fn ready_to_analyze(&self) -> bool {
        self.notes.len() >= MIN_NOTES
    }

    /// True when themes or insights from a previous analysis are present.
    pub fn has_result(&self) -> bool {
        !self.themes.is_empty() || !self.insights.is_empty()
    }

    /// Adds a note and clears the error banner.
    pub fn add_note(&mut self, text: &str) -> Result<NoteId, NoteStoreError> {
        let id = self.notes.add(text)?.id();
        self.error = None;
        Ok(id)
    }

    /// Edits a note. Any analysis result is discarded.
    pub fn edit_note(&mut self, id: NoteId, text: &str) -> Result<(), NoteStoreError> {
        self.notes.edit(id, text)?;
        self.invalidate_result();
        Ok(())
    }

    /// Deletes a note. Any analysis result is discarded.
    pub fn delete_note(&mut self, id: NoteId) -> Result<Note, NoteStoreError> {
        let note = self.notes.delete(id)?;
        self.invalidate_result();
        Ok(note)
    }

    /// Removes notes, results and the banner, and returns to the list view.
    pub fn clear_all(&mut self) {
        self.notes.clear();
        self.themes.clear();
        self.insights.clear();
        self.error = None;
        self.view = View::List;
    }

    /// Marks an analysis as in flight and returns the note texts to send.
    ///
    /// # Errors
    ///
    /// `AnalysisInFlight` when one is already running. `TooFewNotes` when
    /// fewer than `MIN_NOTES` notes exist; the banner is set in that case.
    pub fn begin_analysis(&mut self) -> Result<Vec<String>, StateError> {
        if self.loading {
            return Err(StateError::AnalysisInFlight);
        }

        if !self.ready_to_analyze() {
            let err = AnalysisError::TooFewNotes {
                count: self.notes.len(),
            };
            self.error = Some(err.to_string());
            return Err(err.into());
        }

        self.loading = true;
        self.error = None;
        Ok(self.notes.texts())
    }

    /// Stores a successful result and switches to the graph view.
    pub fn apply_analysis(&mut self, result: AnalysisResult) {
        self.notes.assign_themes(&result.themes);
        debug!(
            themes = result.themes.len(),
            ai_notes = result.themes.iter().map(Theme::ai_note_count).sum::<usize>(),
            insights = result.insights.len(),
            "applying analysis result"
        );
        self.themes = result.themes;
        self.insights = result.insights;
        self.loading = false;
        self.error = None;
        self.view = View::Map;
    }

    /// Records a failed analysis. Prior themes and insights are kept.
    pub fn fail_analysis(&mut self, err: &AnalysisError) {
        self.loading = false;
        self.error = Some(err.to_string());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn invalidate_result(&mut self) {
        if self.has_result() {
            self.themes.clear();
            self.insights.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteRef;

    fn state_with(texts: &[&str]) -> AppState {
        let mut state = AppState::new();
        for text in texts {
            state.add_note(text).unwrap();
        }
        state
    }

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            themes: vec![
                Theme::new("T1")
                    .with_note(NoteRef::user("A"))
                    .with_note(NoteRef::user("B"))
                    .with_note(NoteRef::ai("X")),
                Theme::new("T2").with_note(NoteRef::user("C")),
            ],
            insights: vec![Insight::new("I1", "d", ["T1", "T2"])],
        }
    }

    #[test]
    fn begin_analysis_with_too_few_notes_sets_banner() {
        let mut state = state_with(&["A", "B"]);

        let err = state.begin_analysis().unwrap_err();

        assert_eq!(
            err,
            StateError::Analysis(AnalysisError::TooFewNotes { count: 2 })
        );
        assert_eq!(
            state.error(),
            Some("Please add at least 3 notes to generate insights.")
        );
        assert!(!state.is_loading());
    }

    #[test]
    fn begin_analysis_blocks_duplicate_submission() {
        let mut state = state_with(&["A", "B", "C"]);

        assert_eq!(state.begin_analysis().unwrap(), vec!["A", "B", "C"]);
        assert!(state.is_loading());
        assert_eq!(state.begin_analysis(), Err(StateError::AnalysisInFlight));
    }

    #[test]
    fn apply_analysis_reconciles_and_switches_view() {
        let mut state = state_with(&["A", "B", "C"]);
        state.begin_analysis().unwrap();

        state.apply_analysis(sample_result());

        assert!(!state.is_loading());
        assert_eq!(state.view(), View::Map);
        let themes: Vec<_> = state.notes().iter().map(|n| n.theme()).collect();
        assert_eq!(themes, vec![Some("T1"), Some("T1"), Some("T2")]);
        assert_eq!(state.insights().len(), 1);
    }

    #[test]
    fn failed_analysis_keeps_previous_result() {
        let mut state = state_with(&["A", "B", "C"]);
        state.begin_analysis().unwrap();
        state.apply_analysis(sample_result());

        state.begin_analysis().unwrap();
        state.fail_analysis(&AnalysisError::RateLimit {
            message: "slow down".to_string(),
        });

        assert!(!state.is_loading());
        assert_eq!(state.error(), Some("slow down"));
        assert_eq!(state.themes().len(), 2);
        assert_eq!(state.insights().len(), 1);
    }

    #[test]
    fn edit_after_analysis_clears_result() {
        let mut state = state_with(&["A", "B", "C"]);
        state.apply_analysis(sample_result());
        let id = state.notes()[0].id();

        state.edit_note(id, "A2").unwrap();

        assert!(state.themes().is_empty());
        assert!(state.insights().is_empty());
        assert_eq!(state.notes()[0].text(), "A2");
    }

    #[test]
    fn delete_after_analysis_clears_result() {
        let mut state = state_with(&["A", "B", "C"]);
        state.apply_analysis(sample_result());
        let id = state.notes()[2].id();

        state.delete_note(id).unwrap();

        assert!(!state.has_result());
        assert_eq!(state.note_count(), 2);
    }

    #[test]
    fn unknown_ids_are_reported_not_panicked() {
        let mut state = state_with(&["A"]);
        let missing = NoteId::new(-1);

        assert_eq!(
            state.delete_note(missing).unwrap_err(),
            NoteStoreError::NotFound(missing)
        );
        assert_eq!(
            state.edit_note(missing, "x").unwrap_err(),
            NoteStoreError::NotFound(missing)
        );
    }

    #[test]
    fn add_note_clears_banner_and_rejects_blank() {
        let mut state = state_with(&["A"]);
        let _ = state.begin_analysis();
        assert!(state.error().is_some());

        state.add_note("B").unwrap();
        assert!(state.error().is_none());
        assert_eq!(state.add_note("  "), Err(NoteStoreError::EmptyText));
    }

    #[test]
    fn clear_all_resets_everything() {
        let mut state = state_with(&["A", "B", "C"]);
        state.apply_analysis(sample_result());

        state.clear_all();

        assert_eq!(state.note_count(), 0);
        assert!(!state.has_result());
        assert_eq!(state.view(), View::List);
    }

    #[test]
    fn view_toggles() {
        let mut state = AppState::new();
        state.toggle_view();
        assert_eq!(state.view(), View::Map);
        state.toggle_view();
        assert_eq!(state.view(), View::List);
    }
}
