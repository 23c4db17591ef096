//! Terminal User Interface for capturing notes and exploring the thought graph.
//!
//! Uses ratatui for rendering and crossterm for terminal management. Analysis
//! calls block, so each one runs on a worker thread and reports back over a
//! channel that the event loop polls between frames.

use std::io;
use std::panic;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use tracing::{debug, warn};

use crate::analyzer::{AnalysisError, Analyzer};
use crate::graph::LayoutConfig;
use crate::models::AnalysisResult;

mod app;
pub mod event;
mod ui;
mod viewport;

pub use app::{App, Focus};
pub use viewport::Viewport;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

type AnalysisOutcome = Result<AnalysisResult, AnalysisError>;

/// Initializes the terminal for TUI rendering.
///
/// Enables raw mode and enters the alternate screen.
///
/// # Errors
///
/// Returns an error if terminal initialization fails.
fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// Always called before exiting the TUI, even on error.
///
/// # Errors
///
/// Returns an error if terminal restoration fails.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Minimal terminal restoration for the panic hook. Errors are ignored.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Restores the terminal before the original panic hook runs.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Runs `notes` through the analyzer on a worker thread.
fn spawn_analysis(analyzer: &Arc<dyn Analyzer>, notes: Vec<String>) -> Receiver<AnalysisOutcome> {
    let (tx, rx) = mpsc::channel();
    let analyzer = Arc::clone(analyzer);
    thread::spawn(move || {
        debug!(notes = notes.len(), "analysis worker started");
        // The receiver is gone only if the UI has already exited.
        let _ = tx.send(analyzer.analyze(&notes));
    });
    rx
}

/// Collects a finished analysis, if any, without blocking.
fn poll_analysis(pending: &mut Option<Receiver<AnalysisOutcome>>) -> Option<AnalysisOutcome> {
    let rx = pending.as_ref()?;
    let outcome = match rx.try_recv() {
        Ok(outcome) => outcome,
        Err(TryRecvError::Empty) => return None,
        Err(TryRecvError::Disconnected) => {
            warn!("analysis worker exited without a result");
            Err(AnalysisError::failed("Analysis worker stopped unexpectedly"))
        }
    };
    *pending = None;
    Some(outcome)
}

/// Runs the main event loop for the TUI.
///
/// Exits when the user quits or an error occurs. Terminal state is always
/// restored, even on error.
///
/// # Errors
///
/// Returns an error if event polling, rendering, or terminal operations fail.
pub fn run_event_loop(app: &mut App, analyzer: Arc<dyn Analyzer>) -> Result<()> {
    let mut terminal = init_terminal()?;

    let result = run_event_loop_internal(app, &analyzer, &mut terminal);

    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

fn run_event_loop_internal(
    app: &mut App,
    analyzer: &Arc<dyn Analyzer>,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    let mut pending: Option<Receiver<AnalysisOutcome>> = None;

    loop {
        if let Some(notes) = app.take_analysis_request() {
            pending = Some(spawn_analysis(analyzer, notes));
        }
        if let Some(outcome) = poll_analysis(&mut pending) {
            app.finish_analysis(outcome);
        }
        app.on_tick(Instant::now());

        let size = terminal.size()?;
        let (width, height) = ui::canvas_size(Rect::new(0, 0, size.width, size.height), app);
        app.set_canvas_area(width, height);

        terminal.draw(|frame| {
            ui::draw(frame, app);
        })?;

        if crossterm_event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = crossterm_event::read()?
            && event::handle_key_event(app, key)
        {
            break;
        }
    }

    Ok(())
}

/// Entry point for the TUI application.
///
/// # Errors
///
/// Returns an error if terminal initialization or the event loop fails.
pub fn run(analyzer: Arc<dyn Analyzer>, layout: LayoutConfig) -> Result<()> {
    init_panic_hook();

    let mut app = App::new(layout);
    run_event_loop(&mut app, analyzer).context("TUI event loop failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoteRef, Theme};

    struct FixedAnalyzer;

    impl Analyzer for FixedAnalyzer {
        fn analyze(&self, notes: &[String]) -> Result<AnalysisResult, AnalysisError> {
            Ok(AnalysisResult {
                themes: vec![notes.iter().fold(Theme::new("All"), |t, n| {
                    t.with_note(NoteRef::user(n.clone()))
                })],
                insights: Vec::new(),
            })
        }
    }

    fn wait_for(pending: &mut Option<Receiver<AnalysisOutcome>>) -> AnalysisOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = poll_analysis(pending) {
                return outcome;
            }
            assert!(Instant::now() < deadline, "analysis worker timed out");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn worker_result_reaches_the_app() {
        let analyzer: Arc<dyn Analyzer> = Arc::new(FixedAnalyzer);
        let mut app = App::new(LayoutConfig::default());
        for text in ["one", "two", "three"] {
            for c in text.chars() {
                app.push_char(c);
            }
            app.submit_input();
        }
        app.generate();

        let notes = app.take_analysis_request().unwrap();
        let mut pending = Some(spawn_analysis(&analyzer, notes));
        let outcome = wait_for(&mut pending);
        assert!(pending.is_none());

        app.finish_analysis(outcome);
        assert_eq!(app.state().themes().len(), 1);
        assert_eq!(app.animator().layout().unwrap().nodes.len(), 4);
    }

    #[test]
    fn dropped_worker_reports_failure() {
        let (tx, rx) = mpsc::channel::<AnalysisOutcome>();
        drop(tx);
        let mut pending = Some(rx);

        let outcome = poll_analysis(&mut pending).unwrap();
        assert_eq!(
            outcome,
            Err(AnalysisError::failed("Analysis worker stopped unexpectedly"))
        );
    }

    #[test]
    fn idle_poll_returns_nothing() {
        let mut pending = None;
        assert!(poll_analysis(&mut pending).is_none());
    }
}
