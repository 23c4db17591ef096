use std::time::{Duration, Instant};

use tracing::debug;

use crate::analyzer::AnalysisError;
use crate::graph::{
    GraphNode, LayoutConfig, RandomSource, RevealAnimator, RunToken, ThreadRandom, Tick,
    compute_layout,
};
use crate::models::{AnalysisResult, Note, NoteId};
use crate::state::{AppState, View};

use super::viewport::Viewport;

/// Application state for the TUI.
///
/// Wraps `AppState` with input, selection, graph animation and viewport
/// state. Analysis requests are queued here and picked up by the event loop.
pub struct App {
    state: AppState,
    /// Currently focused area
    focus: Focus,
    /// Input line buffer
    input: String,
    /// Note being edited through the input line
    editing: Option<NoteId>,
    /// Selected row in the notes list
    selected_note: Option<usize>,
    layout_config: LayoutConfig,
    animator: RevealAnimator,
    /// Current animation run and when it started
    run: Option<(RunToken, Instant)>,
    /// Time since the current run started, as of the last tick
    elapsed: Duration,
    rng: Box<dyn RandomSource>,
    viewport: Viewport,
    selected_node: Option<usize>,
    /// Node whose full text is shown in the modal
    modal: Option<usize>,
    confirm_clear: bool,
    pending_request: Option<Vec<String>>,
}

/// Keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The input line receives characters
    Input,
    /// The active view (notes list or graph) receives commands
    View,
}

impl App {
    /// Creates an empty app with input focus and the list view.
    ///
    /// # Examples
    ///
    /// ```
    /// use noema::graph::LayoutConfig;
    /// use noema::tui::{App, Focus};
    ///
    /// let app = App::new(LayoutConfig::default());
    /// assert!(app.state().notes().is_empty());
    /// assert_eq!(app.focus(), Focus::Input);
    /// ```
    pub fn new(layout_config: LayoutConfig) -> Self {
        Self::with_random(layout_config, Box::new(ThreadRandom::new()))
    }

    /// Creates an app drawing explosion targets from `rng`.
    pub fn with_random(layout_config: LayoutConfig, rng: Box<dyn RandomSource>) -> Self {
        let mut viewport = Viewport::default();
        viewport.center_on(layout_config.center);
        Self {
            state: AppState::new(),
            focus: Focus::Input,
            input: String::new(),
            editing: None,
            selected_note: None,
            layout_config,
            animator: RevealAnimator::new(),
            run: None,
            elapsed: Duration::ZERO,
            rng,
            viewport,
            selected_node: None,
            modal: None,
            confirm_clear: false,
            pending_request: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn editing(&self) -> Option<NoteId> {
        self.editing
    }

    pub fn selected_note_index(&self) -> Option<usize> {
        self.selected_note
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.selected_note.and_then(|i| self.state.notes().get(i))
    }

    pub fn animator(&self) -> &RevealAnimator {
        &self.animator
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selected_node(&self) -> Option<usize> {
        self.selected_node
    }

    /// The node shown in the modal, if one is open.
    pub fn modal_node(&self) -> Option<&GraphNode> {
        let index = self.modal?;
        self.animator.layout()?.nodes.get(index)
    }

    pub fn is_confirming_clear(&self) -> bool {
        self.confirm_clear
    }

    // --- focus and input ---

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::View,
            Focus::View => Focus::Input,
        };
        if self.focus == Focus::View
            && self.state.view() == View::List
            && self.selected_note.is_none()
            && self.state.note_count() > 0
        {
            self.selected_note = Some(0);
        }
    }

    /// Dismisses the banner, cancels editing and returns to the input line.
    pub fn reset_focus(&mut self) {
        self.state.dismiss_error();
        if self.editing.take().is_some() {
            self.input.clear();
        }
        self.focus = Focus::Input;
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    /// Adds the input as a note, or saves it over the note being edited.
    ///
    /// Blank input is ignored.
    pub fn submit_input(&mut self) {
        if self.input.trim().is_empty() {
            return;
        }

        let result = match self.editing {
            Some(id) => self.state.edit_note(id, &self.input),
            None => self.state.add_note(&self.input).map(|_| ()),
        };

        match result {
            Ok(()) => {
                self.input.clear();
                self.editing = None;
                self.sync_graph();
            }
            Err(e) => debug!(error = %e, "note update rejected"),
        }
    }

    // --- notes list ---

    pub fn select_next(&mut self) {
        let len = self.state.note_count();
        if len == 0 {
            return;
        }
        self.selected_note = Some(match self.selected_note {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        });
    }

    pub fn select_previous(&mut self) {
        let len = self.state.note_count();
        if len == 0 {
            return;
        }
        self.selected_note = Some(match self.selected_note {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        });
    }

    /// Loads the selected note into the input line for editing.
    pub fn begin_edit(&mut self) {
        if let Some((id, text)) = self
            .selected_note()
            .map(|note| (note.id(), note.text().to_string()))
        {
            self.editing = Some(id);
            self.input = text;
            self.focus = Focus::Input;
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_note().map(Note::id) else {
            return;
        };
        if self.state.delete_note(id).is_ok() {
            let len = self.state.note_count();
            self.selected_note = match self.selected_note {
                _ if len == 0 => None,
                Some(i) => Some(i.min(len - 1)),
                None => None,
            };
            self.sync_graph();
        }
    }

    // --- clearing ---

    pub fn request_clear(&mut self) {
        self.confirm_clear = true;
    }

    /// Resolves a pending clear confirmation.
    pub fn confirm_clear(&mut self, confirmed: bool) {
        self.confirm_clear = false;
        if confirmed {
            self.state.clear_all();
            self.input.clear();
            self.editing = None;
            self.selected_note = None;
            self.focus = Focus::Input;
            self.sync_graph();
        }
    }

    // --- analysis ---

    pub fn toggle_view(&mut self) {
        self.state.toggle_view();
    }

    /// Queues an analysis of the current notes.
    ///
    /// Too few notes sets the error banner; a request while one is in flight
    /// is ignored.
    pub fn generate(&mut self) {
        match self.state.begin_analysis() {
            Ok(notes) => self.pending_request = Some(notes),
            Err(e) => debug!(error = %e, "analysis not started"),
        }
    }

    /// Hands the queued analysis request to the caller.
    pub fn take_analysis_request(&mut self) -> Option<Vec<String>> {
        self.pending_request.take()
    }

    /// Applies the outcome of an analysis and starts the reveal animation.
    pub fn finish_analysis(&mut self, result: Result<AnalysisResult, AnalysisError>) {
        match result {
            Ok(result) => {
                self.state.apply_analysis(result);
                let layout = compute_layout(
                    self.state.themes(),
                    self.state.insights(),
                    &self.layout_config,
                );
                let token = self.animator.start(layout, self.rng.as_mut());
                self.run = Some((token, Instant::now()));
                self.elapsed = Duration::ZERO;
                self.selected_node = None;
                self.modal = None;
                self.viewport.center_on(self.layout_config.center);
                self.focus = Focus::View;
            }
            Err(e) => self.state.fail_analysis(&e),
        }
    }

    // --- graph ---

    /// Restarts the reveal animation with fresh explosion targets.
    pub fn replay(&mut self) {
        if let Some(token) = self.animator.replay(self.rng.as_mut()) {
            self.run = Some((token, Instant::now()));
            self.elapsed = Duration::ZERO;
            self.modal = None;
        }
    }

    /// Advances the animation to `now` and applies any pending fit.
    pub fn on_tick(&mut self, now: Instant) {
        let Some((token, started)) = self.run else {
            return;
        };
        self.elapsed = now.saturating_duration_since(started);

        if let Tick::Advanced(phase) = self.animator.tick(token, self.elapsed) {
            debug!(?phase, "animation phase");
        }

        if self.animator.take_fit_request() {
            self.fit_view();
        }
    }

    pub fn set_canvas_area(&mut self, width: u16, height: u16) {
        self.viewport.set_area(width, height);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn fit_view(&mut self) {
        if let Some((min, max)) = self.animator.layout().and_then(|l| l.bounds()) {
            self.viewport.fit(min, max);
        }
    }

    pub fn select_next_node(&mut self) {
        let len = self.node_count();
        if len == 0 {
            return;
        }
        self.selected_node = Some(self.selected_node.map_or(0, |i| (i + 1) % len));
    }

    pub fn select_previous_node(&mut self) {
        let len = self.node_count();
        if len == 0 {
            return;
        }
        self.selected_node = Some(match self.selected_node {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        });
    }

    pub fn open_modal(&mut self) {
        if self.selected_node.is_some_and(|i| i < self.node_count()) {
            self.modal = self.selected_node;
        }
    }

    pub fn close_modal(&mut self) -> bool {
        self.modal.take().is_some()
    }

    fn node_count(&self) -> usize {
        self.animator.layout().map_or(0, |l| l.nodes.len())
    }

    /// Drops the graph once its analysis result has been invalidated.
    fn sync_graph(&mut self) {
        if !self.state.has_result() && self.animator.layout().is_some() {
            self.animator.clear();
            self.run = None;
            self.elapsed = Duration::ZERO;
            self.selected_node = None;
            self.modal = None;
        }
    }
}
