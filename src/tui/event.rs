//! Keyboard event handling for the TUI.
//!
//! Maps crossterm keyboard events to application state changes. Keys typed
//! on the input line are text; commands apply when the view has focus.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Focus};
use crate::state::View;

/// Handles a keyboard event and updates the app state accordingly.
///
/// Returns `true` if the application should quit, `false` otherwise.
///
/// # Event Handling
///
/// - `Ctrl-C`: quit from anywhere; `q` quits when the view has focus
/// - `Ctrl-G`: generate insights from anywhere; `g` when the view has focus
/// - `Tab`: switch between the input line and the view
/// - `Esc`: close the modal, or dismiss the banner and return to input
/// - Input line: characters, `Backspace`, `Enter` to add or save
/// - Notes list: `j`/`k` select, `e` edit, `d` delete
/// - Graph: arrows or `hjkl` pan, `+`/`-` zoom, `f` fit, `n`/`p` select a
///   node, `Enter` open it, `r` replay
/// - View: `v` toggle list/graph, `c` clear all (confirm with `y`)
///
/// # Examples
///
/// ```
/// use noema::graph::LayoutConfig;
/// use noema::tui::{App, event::handle_key_event};
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
///
/// let mut app = App::new(LayoutConfig::default());
/// let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
/// assert!(handle_key_event(&mut app, key));
/// ```
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.is_confirming_clear() {
        app.confirm_clear(matches!(key.code, KeyCode::Char('y' | 'Y')));
        return false;
    }

    if app.modal_node().is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.close_modal();
        }
        return false;
    }

    if ctrl && key.code == KeyCode::Char('g') {
        app.generate();
        return false;
    }

    if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
        app.toggle_focus();
        return false;
    }

    if key.code == KeyCode::Esc {
        app.reset_focus();
        return false;
    }

    match app.focus() {
        Focus::Input => {
            handle_input(app, key);
            false
        }
        Focus::View => handle_view(app, key),
    }
}

fn handle_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_char(c);
        }
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Enter => app.submit_input(),
        _ => {}
    }
}

/// Returns `true` on quit.
fn handle_view(app: &mut App, key: KeyEvent) -> bool {
    if !(key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT) {
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('g') => app.generate(),
        KeyCode::Char('v') => app.toggle_view(),
        KeyCode::Char('c') => app.request_clear(),
        _ => match app.state().view() {
            View::List => handle_list(app, key),
            View::Map => handle_graph(app, key),
        },
    }
    false
}

fn handle_list(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Char('d') => app.delete_selected(),
        _ => {}
    }
}

fn handle_graph(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.pan(-1.0, 0.0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(1.0, 0.0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0.0, -1.0),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0.0, 1.0),
        KeyCode::Char('+' | '=') => app.zoom_in(),
        KeyCode::Char('-' | '_') => app.zoom_out(),
        KeyCode::Char('f') => app.fit_view(),
        KeyCode::Char('n') => app.select_next_node(),
        KeyCode::Char('p') => app.select_previous_node(),
        KeyCode::Enter => app.open_modal(),
        KeyCode::Char('r') => app.replay(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalysisError;
    use crate::graph::{LayoutConfig, SequenceRandom};
    use crate::models::{AnalysisResult, NoteRef, Theme};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key_event(app, key(KeyCode::Char(c)));
        }
    }

    fn app_with_notes(texts: &[&str]) -> App {
        let mut app = App::with_random(
            LayoutConfig::default(),
            Box::new(SequenceRandom::new(vec![0.5])),
        );
        for text in texts {
            type_text(&mut app, text);
            handle_key_event(&mut app, key(KeyCode::Enter));
        }
        app
    }

    fn analyzed_app() -> App {
        let mut app = app_with_notes(&["A", "B", "C"]);
        handle_key_event(&mut app, ctrl('g'));
        app.take_analysis_request().unwrap();
        app.finish_analysis(Ok(AnalysisResult {
            themes: vec![Theme::new("T")
                .with_note(NoteRef::user("A"))
                .with_note(NoteRef::user("B"))
                .with_note(NoteRef::user("C"))],
            insights: Vec::new(),
        }));
        app
    }

    #[test]
    fn ctrl_c_quits_from_anywhere() {
        let mut app = app_with_notes(&[]);
        assert!(handle_key_event(&mut app, ctrl('c')));

        app.toggle_focus();
        assert!(handle_key_event(&mut app, ctrl('c')));
    }

    #[test]
    fn q_types_on_the_input_line_and_quits_from_the_view() {
        let mut app = app_with_notes(&[]);
        assert!(!handle_key_event(&mut app, key(KeyCode::Char('q'))));
        assert_eq!(app.input(), "q");

        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus(), Focus::View);
        assert!(handle_key_event(&mut app, key(KeyCode::Char('q'))));
    }

    #[test]
    fn enter_adds_notes_and_backspace_edits() {
        let mut app = app_with_notes(&["first"]);
        type_text(&mut app, "secx");
        handle_key_event(&mut app, key(KeyCode::Backspace));
        type_text(&mut app, "ond");
        handle_key_event(&mut app, key(KeyCode::Enter));

        let texts: Vec<_> = app.state().notes().iter().map(|n| n.text()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn shift_characters_are_typed() {
        let mut app = app_with_notes(&[]);
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT));
        assert_eq!(app.input(), "A");
    }

    #[test]
    fn ctrl_g_with_too_few_notes_shows_banner_and_esc_dismisses() {
        let mut app = app_with_notes(&["A"]);
        handle_key_event(&mut app, ctrl('g'));
        assert!(app.state().error().is_some());
        assert!(app.take_analysis_request().is_none());

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(app.state().error().is_none());
    }

    #[test]
    fn list_keys_select_edit_and_delete() {
        let mut app = app_with_notes(&["A", "B", "C"]);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.selected_note_index(), Some(0));

        handle_key_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.selected_note_index(), Some(1));

        handle_key_event(&mut app, key(KeyCode::Char('d')));
        assert_eq!(app.state().note_count(), 2);

        handle_key_event(&mut app, key(KeyCode::Char('e')));
        assert_eq!(app.focus(), Focus::Input);
        assert_eq!(app.input(), "C");
        type_text(&mut app, "2");
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.state().notes()[1].text(), "C2");
    }

    #[test]
    fn clear_needs_y_to_confirm() {
        let mut app = app_with_notes(&["A", "B"]);
        handle_key_event(&mut app, key(KeyCode::Tab));

        handle_key_event(&mut app, key(KeyCode::Char('c')));
        handle_key_event(&mut app, key(KeyCode::Char('n')));
        assert_eq!(app.state().note_count(), 2);

        handle_key_event(&mut app, key(KeyCode::Char('c')));
        handle_key_event(&mut app, key(KeyCode::Char('y')));
        assert_eq!(app.state().note_count(), 0);
    }

    #[test]
    fn graph_keys_pan_zoom_and_open_modal() {
        let mut app = analyzed_app();
        assert_eq!(app.state().view(), View::Map);
        assert_eq!(app.focus(), Focus::View);

        let center = app.viewport().center();
        handle_key_event(&mut app, key(KeyCode::Char('l')));
        assert!(app.viewport().center().x > center.x);

        let zoom = app.viewport().zoom();
        handle_key_event(&mut app, key(KeyCode::Char('+')));
        assert!(app.viewport().zoom() > zoom);
        handle_key_event(&mut app, key(KeyCode::Char('-')));
        handle_key_event(&mut app, key(KeyCode::Char('-')));
        assert!(app.viewport().zoom() < zoom);

        handle_key_event(&mut app, key(KeyCode::Char('n')));
        handle_key_event(&mut app, key(KeyCode::Char('n')));
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.modal_node().unwrap().full_text, "A");

        // Keys other than Esc/Enter are swallowed while the modal is open.
        assert!(!handle_key_event(&mut app, key(KeyCode::Char('q'))));
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(app.modal_node().is_none());
    }

    #[test]
    fn v_toggles_view_and_r_replays() {
        let mut app = analyzed_app();
        handle_key_event(&mut app, key(KeyCode::Char('v')));
        assert_eq!(app.state().view(), View::List);
        handle_key_event(&mut app, key(KeyCode::Char('v')));
        assert_eq!(app.state().view(), View::Map);

        let token = app.animator().token();
        handle_key_event(&mut app, key(KeyCode::Char('r')));
        assert_ne!(app.animator().token(), token);
    }

    #[test]
    fn failed_generation_keeps_view_usable() {
        let mut app = app_with_notes(&["A", "B", "C"]);
        handle_key_event(&mut app, ctrl('g'));
        app.take_analysis_request().unwrap();
        app.finish_analysis(Err(AnalysisError::failed("down")));

        assert_eq!(app.state().error(), Some("down"));
        assert_eq!(app.state().view(), View::List);
    }
}
