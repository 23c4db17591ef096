//! UI rendering functions for the TUI.
//!
//! Lays out a header, the input line, an optional banner, the active view
//! (notes list or thought graph) and a shortcut bar.

use std::collections::HashMap;
use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
        canvas::{Canvas, Context, Line as CanvasLine, Points, Rectangle},
    },
};

use super::app::{App, Focus};
use crate::graph::layout::truncate_label;
use crate::graph::style::{AI_COLOR, INSIGHT_COLOR, THEME_COLOR, node_color};
use crate::graph::{EdgeKind, GraphLayout, GraphNode, NodeKind, Point, Rgb};
use crate::state::View;

/// Characters of a note label drawn on the graph.
const GRAPH_LABEL_CHARS: usize = 28;
/// World length of one dash (and one gap) on insight edges.
const DASH_LENGTH: f64 = 24.0;
/// Rows under the canvas holding the selected node's label.
const DETAIL_HEIGHT: u16 = 5;
/// Time for the highlight on an animated edge to travel its length.
const PULSE_PERIOD_MS: u128 = 1500;
/// Fraction of an animated edge covered by the highlight.
const PULSE_LENGTH: f64 = 0.06;

/// Main rendering function for the TUI.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = main_chunks(frame.area(), app);

    render_header(frame, app, chunks[0]);
    render_input(frame, app, chunks[1]);
    render_banner(frame, app, chunks[2]);
    match app.state().view() {
        View::List => render_list_view(frame, app, chunks[3]),
        View::Map => render_graph_view(frame, app, chunks[3]),
    }
    render_shortcut_bar(frame, app, chunks[4]);

    if let Some(node) = app.modal_node() {
        render_modal(frame, app, node);
    }
}

/// Splits the screen into header, input, banner, view and shortcut rows.
pub(super) fn main_chunks(area: Rect, app: &App) -> [Rect; 5] {
    let banner = u16::from(app.state().error().is_some() || app.is_confirming_clear());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // Header
            Constraint::Length(3),      // Input line
            Constraint::Length(banner), // Error or confirmation banner
            Constraint::Min(0),         // View
            Constraint::Length(1),      // Shortcut bar
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3], chunks[4]]
}

/// Splits the graph view into the canvas and, while a node is selected, a
/// detail strip below it.
fn graph_chunks(area: Rect, app: &App) -> (Rect, Option<Rect>) {
    if selected_graph_node(app).is_none() || area.height < DETAIL_HEIGHT * 2 {
        return (area, None);
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(DETAIL_HEIGHT)])
        .split(area);
    (chunks[0], Some(chunks[1]))
}

/// Canvas size in cells, inside its border, for a screen of `screen`.
pub(super) fn canvas_size(screen: Rect, app: &App) -> (u16, u16) {
    let (canvas, _) = graph_chunks(main_chunks(screen, app)[3], app);
    (canvas.width.saturating_sub(2), canvas.height.saturating_sub(2))
}

fn selected_graph_node(app: &App) -> Option<&GraphNode> {
    let index = app.selected_node()?;
    app.animator().layout()?.nodes.get(index)
}

fn node_badge(kind: NodeKind) -> (&'static str, Rgb) {
    match kind {
        NodeKind::Theme => ("THEME", THEME_COLOR),
        NodeKind::AiNote => ("AI NOTE", AI_COLOR),
        NodeKind::UserNote => ("YOUR NOTE", THEME_COLOR),
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.state();
    let count = state.note_count();
    let mut spans = vec![
        Span::styled(" noema", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled("  ·  ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{count} {}", if count == 1 { "note" } else { "notes" })),
    ];

    if state.is_loading() {
        spans.push(Span::styled("  ·  ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            "Analyzing your thoughts...",
            Style::default().fg(color(AI_COLOR)),
        ));
    } else if state.ready_to_analyze() {
        spans.push(Span::styled("  ·  ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            "Ready to analyze",
            Style::default().fg(Color::Green),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::Input;
    let title = if app.editing().is_some() {
        "Edit note (Enter to save, Esc to cancel)"
    } else {
        "New note"
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(focus_style(is_focused));

    let mut content = app.input().to_string();
    if is_focused {
        content.push('█');
    }

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
    if area.height == 0 {
        return;
    }

    let line = if app.is_confirming_clear() {
        Line::from(Span::styled(
            " Clear all notes and insights? (y/n)",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ))
    } else if let Some(error) = app.state().error() {
        Line::from(Span::styled(
            format!(" {error}  (Esc to dismiss)"),
            Style::default().fg(Color::White).bg(Color::Red),
        ))
    } else {
        return;
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Renders the insights panel (when present) above the notes list.
fn render_list_view(frame: &mut Frame, app: &App, area: Rect) {
    let insights = app.state().insights();
    let (insight_area, notes_area) = if insights.is_empty() {
        (None, area)
    } else {
        let wanted = u16::try_from(insights.len() * 3 + 2).unwrap_or(u16::MAX);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(wanted.min(area.height / 2)), Constraint::Min(0)])
            .split(area);
        (Some(chunks[0]), chunks[1])
    };

    if let Some(insight_area) = insight_area {
        let mut text = Text::default();
        for insight in insights {
            text.lines.push(Line::from(Span::styled(
                format!("✨ {}", insight.title),
                Style::default()
                    .fg(color(INSIGHT_COLOR))
                    .add_modifier(Modifier::BOLD),
            )));
            text.lines.push(Line::from(insight.description.clone()));
            if !insight.connected_themes.is_empty() {
                text.lines.push(Line::from(Span::styled(
                    format!("   connects {}", insight.connected_themes.join(" ↔ ")),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )));
            }
        }
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Insights"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, insight_area);
    }

    let is_focused = app.focus() == Focus::View;
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Notes")
        .border_style(focus_style(is_focused));

    if app.state().notes().is_empty() {
        let paragraph = Paragraph::new(Text::from(vec![
            Line::from("No notes yet. Type a thought and press Enter."),
            Line::from(Span::styled(
                "Add 3 or more notes, then press Ctrl-G to discover connections.",
                Style::default().fg(Color::DarkGray),
            )),
        ]))
        .block(block);
        frame.render_widget(paragraph, notes_area);
        return;
    }

    let items: Vec<ListItem> = app
        .state()
        .notes()
        .iter()
        .map(|note| {
            let mut spans = vec![Span::raw(note.text().to_string())];
            if let Some(theme) = note.theme() {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    format!("[{theme}]"),
                    Style::default()
                        .fg(color(THEME_COLOR))
                        .add_modifier(Modifier::ITALIC),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::REVERSED),
    );

    let mut list_state = ListState::default();
    if is_focused {
        list_state.select(app.selected_note_index());
    }

    frame.render_stateful_widget(list, notes_area, &mut list_state);
}

/// Node positions and opacities as currently animated.
fn animated_nodes(app: &App, layout: &GraphLayout) -> Vec<(Point, f64)> {
    let animator = app.animator();
    layout
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            (
                animator
                    .rendered_position(i, app.elapsed())
                    .unwrap_or(node.final_position),
                animator
                    .rendered_opacity(i, app.elapsed())
                    .unwrap_or(node.opacity),
            )
        })
        .collect()
}

fn graph_title(app: &App, layout: &GraphLayout) -> String {
    let stats = layout.stats();
    let mut title = format!(
        " Thought Graph · {} themes · {} AI notes · {} insights ",
        stats.themes, stats.ai_notes, stats.insight_edges
    );
    if app.animator().is_animating() {
        title.push_str("· Discovering Connections... ");
    }
    title
}

fn render_graph_view(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::View;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(is_focused));

    let Some(layout) = app.animator().layout() else {
        let paragraph = Paragraph::new(Text::from(vec![
            Line::from(""),
            Line::from("Your thoughts await visualization"),
            Line::from(Span::styled(
                "Add 3+ notes and generate insights to begin",
                Style::default().fg(Color::DarkGray),
            )),
        ]))
        .alignment(ratatui::layout::Alignment::Center)
        .block(block.title("Thought Graph"));
        frame.render_widget(paragraph, area);
        return;
    };

    let nodes = animated_nodes(app, layout);
    let index: HashMap<&str, usize> = layout
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let (canvas_area, detail_area) = graph_chunks(area, app);
    let viewport = app.viewport();
    let [x0, x1] = viewport.x_bounds();
    let [y0, y1] = viewport.y_bounds();
    // World units covered by one braille dot column.
    let dot = (x1 - x0) / (f64::from(canvas_area.width.saturating_sub(2).max(1)) * 2.0);
    let pulse = pulse_at(app.elapsed());

    let canvas = Canvas::default()
        .block(block.title(graph_title(app, layout)))
        .marker(Marker::Braille)
        .x_bounds(viewport.x_bounds())
        .y_bounds([-y1, -y0])
        .paint(|ctx| {
            for edge in &layout.edges {
                let (Some(&s), Some(&t)) = (
                    index.get(edge.source.as_str()),
                    index.get(edge.target.as_str()),
                ) else {
                    continue;
                };
                let ((from, from_alpha), (to, to_alpha)) = (nodes[s], nodes[t]);
                if from_alpha.min(to_alpha) < 0.2 {
                    continue;
                }

                let style = edge.style();
                for offset in stroke_offsets(style.width) {
                    let (a, b) = parallel(from, to, offset * dot);
                    if style.dashed {
                        draw_dashed(ctx, a, b, color(style.color));
                    } else {
                        ctx.draw(&CanvasLine::new(a.x, -a.y, b.x, -b.y, color(style.color)));
                    }
                }
                if style.animated {
                    let a = from.lerp(to, pulse);
                    let b = from.lerp(to, (pulse + PULSE_LENGTH).min(1.0));
                    ctx.draw(&CanvasLine::new(a.x, -a.y, b.x, -b.y, Color::White));
                }
            }

            ctx.layer();

            for edge in layout.edges.iter().filter(|e| e.kind == EdgeKind::Insight) {
                if let (Some(label), Some(&s), Some(&t)) = (
                    edge.label.as_deref(),
                    index.get(edge.source.as_str()),
                    index.get(edge.target.as_str()),
                ) {
                    let mid = nodes[s].0.lerp(nodes[t].0, 0.5);
                    ctx.print(mid.x, -mid.y, Span::raw(label.to_string()));
                }
            }

            for (i, node) in layout.nodes.iter().enumerate() {
                let (pos, alpha) = nodes[i];
                if alpha < 0.2 {
                    continue;
                }
                let selected = app.selected_node() == Some(i);
                ctx.print(pos.x, -pos.y, node_span(node, alpha, selected));
            }
        });

    frame.render_widget(canvas, canvas_area);

    let inner = canvas_area.inner(ratatui::layout::Margin::new(1, 1));
    render_legend(frame, inner);
    render_minimap(frame, app, layout, &nodes, inner);

    if let (Some(node), Some(detail_area)) = (selected_graph_node(app), detail_area) {
        render_node_detail(frame, node, detail_area);
    }
}

/// Shows the display label of the selected node, wrapped.
fn render_node_detail(frame: &mut Frame, node: &GraphNode, area: Rect) {
    let (badge, badge_color) = node_badge(node.kind);

    let mut text = Text::from(Line::from(node.label.clone()));
    if let Some(insight) = &node.insight {
        text.lines.push(Line::from(Span::styled(
            insight.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {badge} "),
            Style::default()
                .fg(color(badge_color))
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(" Enter for full text ")
        .border_style(Style::default().fg(color(badge_color)));

    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

/// Perpendicular offsets, in dots, of the parallel strokes for an edge width.
fn stroke_offsets(width: u8) -> Vec<f64> {
    let count = width.saturating_sub(2).max(1);
    let mid = f64::from(count - 1) / 2.0;
    (0..count).map(|k| f64::from(k) - mid).collect()
}

/// The segment `from -> to` shifted sideways by `offset` world units.
fn parallel(from: Point, to: Point, offset: f64) -> (Point, Point) {
    let length = from.distance(to);
    if length == 0.0 || offset == 0.0 {
        return (from, to);
    }
    let (nx, ny) = ((from.y - to.y) / length, (to.x - from.x) / length);
    (
        Point::new(from.x + nx * offset, from.y + ny * offset),
        Point::new(to.x + nx * offset, to.y + ny * offset),
    )
}

/// Position along an animated edge of its travelling highlight.
fn pulse_at(elapsed: Duration) -> f64 {
    (elapsed.as_millis() % PULSE_PERIOD_MS) as f64 / PULSE_PERIOD_MS as f64
}

fn draw_dashed(ctx: &mut Context, from: Point, to: Point, line_color: Color) {
    let length = from.distance(to);
    let dashes = (length / DASH_LENGTH).ceil().max(1.0) as usize;
    for k in (0..dashes).step_by(2) {
        let a = from.lerp(to, k as f64 / dashes as f64);
        let b = from.lerp(to, ((k + 1) as f64 / dashes as f64).min(1.0));
        ctx.draw(&CanvasLine::new(a.x, -a.y, b.x, -b.y, line_color));
    }
}

fn node_span(node: &GraphNode, alpha: f64, selected: bool) -> Span<'static> {
    let text = match node.kind {
        NodeKind::Theme => format!("◆ {} ({})", node.label, node.note_count),
        NodeKind::UserNote => format!("● {}", truncate_label(&node.full_text, GRAPH_LABEL_CHARS)),
        NodeKind::AiNote => format!("✦ {}", truncate_label(&node.full_text, GRAPH_LABEL_CHARS)),
    };

    let mut style = if alpha < 1.0 {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(color(node_color(node.kind)))
    };
    if node.kind == NodeKind::Theme {
        style = style.add_modifier(Modifier::BOLD);
    }
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(text, style)
}

fn render_legend(frame: &mut Frame, area: Rect) {
    if area.width < 30 || area.height < 6 {
        return;
    }
    let legend = Text::from(vec![
        Line::from(Span::styled("── your note", Style::default().fg(color(THEME_COLOR)))),
        Line::from(Span::styled("── AI note", Style::default().fg(color(AI_COLOR)))),
        Line::from(Span::styled("- - insight ✨", Style::default().fg(color(INSIGHT_COLOR)))),
    ]);
    let rect = Rect::new(area.x, area.y + area.height - 3, 16, 3);
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(legend), rect);
}

fn render_minimap(frame: &mut Frame, app: &App, layout: &GraphLayout, nodes: &[(Point, f64)], area: Rect) {
    const WIDTH: u16 = 26;
    const HEIGHT: u16 = 9;
    if area.width < WIDTH * 2 || area.height < HEIGHT + 4 {
        return;
    }
    let Some((min, max)) = layout.bounds() else {
        return;
    };

    let pad = 250.0;
    let rect = Rect::new(area.x + area.width - WIDTH, area.y, WIDTH, HEIGHT);
    let viewport = app.viewport();
    let [vx0, vx1] = viewport.x_bounds();
    let [vy0, vy1] = viewport.y_bounds();

    let minimap = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title("Map"))
        .marker(Marker::Braille)
        .x_bounds([min.x - pad, max.x + pad])
        .y_bounds([-(max.y + pad), -(min.y - pad)])
        .paint(|ctx| {
            for (node, (pos, _)) in layout.nodes.iter().zip(nodes) {
                ctx.draw(&Points {
                    coords: &[(pos.x, -pos.y)],
                    color: color(node_color(node.kind)),
                });
            }
            ctx.draw(&Rectangle {
                x: vx0,
                y: -vy1,
                width: vx1 - vx0,
                height: vy1 - vy0,
                color: Color::Cyan,
            });
            let center = viewport.center();
            ctx.draw(&Points {
                coords: &[(center.x, -center.y)],
                color: Color::Cyan,
            });
        });

    frame.render_widget(Clear, rect);
    frame.render_widget(minimap, rect);
}

fn render_modal(frame: &mut Frame, app: &App, node: &GraphNode) {
    let area = centered_rect(60, 50, frame.area());

    let (badge, badge_color) = node_badge(node.kind);

    let mut text = Text::default();
    match node.kind {
        NodeKind::Theme => {
            text.lines.push(Line::from(Span::styled(
                node.full_text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            text.lines.push(Line::from(Span::styled(
                format!("{} notes", node.note_count),
                Style::default().fg(Color::DarkGray),
            )));
            if let Some(insight) = &node.insight {
                text.lines.push(Line::from(""));
                text.lines.push(Line::from(insight.clone()));
            }
        }
        NodeKind::UserNote | NodeKind::AiNote => {
            text.lines.push(Line::from(node.full_text.clone()));
            let theme = node
                .parent
                .as_deref()
                .and_then(|id| app.animator().layout()?.node(id));
            if let Some(theme) = theme {
                text.lines.push(Line::from(""));
                text.lines.push(Line::from(Span::styled(
                    format!("Theme: {}", theme.label),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {badge} "),
            Style::default()
                .fg(color(badge_color))
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(" Esc to close ")
        .border_style(Style::default().fg(color(badge_color)));

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Renders the shortcut bar at the bottom of the screen.
///
/// Shows keyboard shortcuts for the current focus and view.
fn render_shortcut_bar(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan);
    let sep_style = Style::default().fg(Color::DarkGray);

    let shortcuts: &[(&str, &str)] = match (app.focus(), app.state().view()) {
        (Focus::Input, _) => &[
            ("Enter", "add"),
            ("Ctrl-G", "generate"),
            ("Tab", "view"),
            ("Esc", "dismiss"),
            ("Ctrl-C", "quit"),
        ],
        (Focus::View, View::List) => &[
            ("j/k", "select"),
            ("e", "edit"),
            ("d", "delete"),
            ("g", "generate"),
            ("v", "graph"),
            ("c", "clear"),
            ("Tab", "input"),
            ("q", "quit"),
        ],
        (Focus::View, View::Map) => &[
            ("hjkl", "pan"),
            ("+/-", "zoom"),
            ("f", "fit"),
            ("n/p", "node"),
            ("Enter", "open"),
            ("r", "replay"),
            ("v", "list"),
            ("q", "quit"),
        ],
    };

    let mut spans = Vec::new();
    for (i, (key, action)) in shortcuts.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", sep_style));
        }
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::raw(format!(": {action}")));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LayoutConfig, SequenceRandom};
    use crate::models::{AnalysisResult, Insight, NoteRef, Theme};
    use ratatui::{Terminal, backend::TestBackend};

    fn render(app: &App) -> String {
        render_sized(app, 120, 40)
    }

    fn render_sized(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app_with_notes(texts: &[&str]) -> App {
        let mut app = App::with_random(
            LayoutConfig::default(),
            Box::new(SequenceRandom::new(vec![0.5])),
        );
        for text in texts {
            for c in text.chars() {
                app.push_char(c);
            }
            app.submit_input();
        }
        app
    }

    fn analyzed_app() -> App {
        let mut app = app_with_notes(&["Alpha", "Beta", "Gamma"]);
        app.generate();
        app.take_analysis_request().unwrap();
        app.finish_analysis(Ok(AnalysisResult {
            themes: vec![
                Theme::new("Growth")
                    .with_insight("Small steps compound")
                    .with_note(NoteRef::user("Alpha"))
                    .with_note(NoteRef::ai("A bridge between ideas")),
                Theme::new("Rest").with_note(NoteRef::user("Beta")),
            ],
            insights: vec![Insight::new("Rhythm", "Work and rest", ["Growth", "Rest"])],
        }));
        app
    }

    #[test]
    fn main_layout_rows() {
        let app = app_with_notes(&[]);
        let chunks = main_chunks(Rect::new(0, 0, 100, 30), &app);
        assert_eq!(chunks[0].height, 1);
        assert_eq!(chunks[1].height, 3);
        assert_eq!(chunks[2].height, 0);
        assert_eq!(chunks[4].height, 1);
        assert_eq!(chunks[3].height, 25);
    }

    #[test]
    fn header_shows_count_and_readiness() {
        let app = app_with_notes(&["a", "b"]);
        let screen = render(&app);
        assert!(screen.contains("2 notes"));
        assert!(!screen.contains("Ready to analyze"));

        let app = app_with_notes(&["a", "b", "c"]);
        assert!(render(&app).contains("Ready to analyze"));
    }

    #[test]
    fn banner_appears_for_errors() {
        let mut app = app_with_notes(&["a"]);
        app.generate();
        let chunks = main_chunks(Rect::new(0, 0, 100, 30), &app);
        assert_eq!(chunks[2].height, 1);
        assert!(render(&app).contains("Please add at least 3 notes to generate insights."));
    }

    #[test]
    fn list_view_shows_notes_themes_and_insights() {
        let mut app = analyzed_app();
        app.toggle_view();
        let screen = render(&app);
        assert!(screen.contains("Alpha [Growth]"));
        assert!(screen.contains("Gamma"));
        assert!(screen.contains("Rhythm"));
        assert!(screen.contains("Growth ↔ Rest"));
    }

    #[test]
    fn graph_view_shows_stats_and_animation_banner() {
        let app = analyzed_app();
        let screen = render(&app);
        assert!(screen.contains("2 themes"));
        assert!(screen.contains("1 AI notes"));
        assert!(screen.contains("1 insights"));
        assert!(screen.contains("Discovering Connections..."));
    }

    #[test]
    fn graph_view_placeholder_without_result() {
        let mut app = app_with_notes(&["a"]);
        app.toggle_view();
        assert!(render(&app).contains("Your thoughts await visualization"));
    }

    #[test]
    fn modal_shows_badge_and_full_text() {
        let mut app = analyzed_app();
        app.on_tick(std::time::Instant::now() + std::time::Duration::from_secs(10));
        // theme-0, note-0-0, note-0-1 (AI)
        for _ in 0..3 {
            app.select_next_node();
        }
        app.open_modal();

        let screen = render(&app);
        assert!(screen.contains("AI NOTE"));
        assert!(screen.contains("A bridge between ideas"));
        assert!(screen.contains("Theme: Growth"));
    }

    #[test]
    fn theme_modal_shows_insight() {
        let mut app = analyzed_app();
        app.select_next_node();
        app.open_modal();
        let screen = render(&app);
        assert!(screen.contains("THEME"));
        assert!(screen.contains("Small steps compound"));
    }

    fn app_with_theme(theme: Theme) -> App {
        let mut app = app_with_notes(&["one", "two", "three"]);
        app.generate();
        app.take_analysis_request().unwrap();
        app.finish_analysis(Ok(AnalysisResult {
            themes: vec![theme],
            insights: Vec::new(),
        }));
        app.on_tick(std::time::Instant::now() + std::time::Duration::from_secs(10));
        // theme-0, then note-0-0
        app.select_next_node();
        app.select_next_node();
        app
    }

    #[test]
    fn selected_note_shows_its_full_display_label() {
        let text = format!("{} end", "thought ".repeat(12).trim_end());
        assert_eq!(text.chars().count(), 99);
        let app = app_with_theme(Theme::new("Long").with_note(NoteRef::user(text.as_str())));

        let screen = render_sized(&app, 200, 40);
        assert!(screen.contains(&text));
        assert!(screen.contains("YOUR NOTE"));
    }

    #[test]
    fn selected_ai_note_label_is_cut_at_its_limit() {
        let text = format!("{}{}", "a".repeat(160), "Z".repeat(10));
        let app = app_with_theme(Theme::new("Long").with_note(NoteRef::ai(text.as_str())));

        let screen = render_sized(&app, 200, 40);
        assert!(screen.contains(&format!("{}...", "a".repeat(160))));
        assert!(!screen.contains("aZ"));
        assert!(screen.contains("AI NOTE"));
    }

    #[test]
    fn detail_strip_shrinks_the_canvas_only_while_selected() {
        let screen = Rect::new(0, 0, 120, 40);
        let mut app = analyzed_app();
        assert_eq!(canvas_size(screen, &app), (118, 33));

        app.select_next_node();
        assert_eq!(canvas_size(screen, &app), (118, 33 - DETAIL_HEIGHT));
    }

    #[test]
    fn wider_edges_get_more_strokes() {
        assert_eq!(stroke_offsets(3), vec![0.0]);
        assert_eq!(stroke_offsets(4), vec![-0.5, 0.5]);
        assert_eq!(stroke_offsets(5), vec![-1.0, 0.0, 1.0]);
    }

    #[test]
    fn parallel_strokes_shift_sideways() {
        let (a, b) = parallel(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 2.0);
        assert_eq!(a, Point::new(0.0, 2.0));
        assert_eq!(b, Point::new(10.0, 2.0));

        let p = Point::new(5.0, 5.0);
        assert_eq!(parallel(p, p, 2.0), (p, p));
    }

    #[test]
    fn pulse_travels_and_wraps() {
        assert_eq!(pulse_at(Duration::ZERO), 0.0);
        assert_eq!(pulse_at(Duration::from_millis(750)), 0.5);
        assert_eq!(pulse_at(Duration::from_millis(1500)), 0.0);
    }
}
