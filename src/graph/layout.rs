//! Deterministic placement of themes and notes.
//!
//! Themes sit evenly spaced on a circle around the layout center, starting at
//! the top. Each theme's notes are placed around it either on an arc facing
//! outward or in a grid beside it. Positions are node centers.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::models::{Insight, Theme};

use super::style::{EdgeStyle, INSIGHT_LABEL};

/// Maximum label length, in characters, for user notes.
pub const USER_LABEL_LIMIT: usize = 160;

/// Maximum label length, in characters, for AI notes.
pub const AI_LABEL_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point `distance` away in direction `angle` (radians).
    pub fn offset(self, angle: f64, distance: f64) -> Self {
        Self::new(
            self.x + distance * angle.cos(),
            self.y + distance * angle.sin(),
        )
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation; `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// How notes are arranged around their theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotePlacement {
    /// Notes fan out on an arc centered on the theme's outward direction.
    Arc {
        radius: f64,
        spread_per_note: f64,
        max_spread: f64,
    },
    /// Notes fill rows beside the theme, perpendicular to its direction.
    Grid {
        columns: usize,
        offset: f64,
        column_spacing: f64,
        row_spacing: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub center: Point,
    pub theme_radius: f64,
    pub placement: NotePlacement,
}

impl LayoutConfig {
    pub fn arc() -> Self {
        Self {
            center: Point::new(600.0, 400.0),
            theme_radius: 380.0,
            placement: NotePlacement::Arc {
                radius: 240.0,
                spread_per_note: 0.5,
                max_spread: 0.75 * PI,
            },
        }
    }

    pub fn grid() -> Self {
        Self {
            center: Point::new(800.0, 500.0),
            theme_radius: 500.0,
            placement: NotePlacement::Grid {
                columns: 3,
                offset: 400.0,
                column_spacing: 300.0,
                row_spacing: 150.0,
            },
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::arc()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Theme,
    UserNote,
    AiNote,
}

/// A positioned node in the thought graph.
///
/// `final_position` comes from the layout. `position`, `explosion_target`
/// and `opacity` belong to the reveal animation and start out at their
/// settled values.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub full_text: String,
    /// Theme insight, for theme nodes.
    pub insight: Option<String>,
    /// Number of notes under a theme node; zero for notes.
    pub note_count: usize,
    /// Owning theme id, for note nodes.
    pub parent: Option<String>,
    pub position: Point,
    pub final_position: Point,
    pub explosion_target: Point,
    pub opacity: f64,
}

impl GraphNode {
    fn new(id: String, kind: NodeKind, label: String, full_text: String, at: Point) -> Self {
        Self {
            id,
            kind,
            label,
            full_text,
            insight: None,
            note_count: 0,
            parent: None,
            position: at,
            final_position: at,
            explosion_target: at,
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    UserNote,
    AiNote,
    Insight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub label: Option<String>,
}

impl GraphEdge {
    pub fn style(&self) -> EdgeStyle {
        EdgeStyle::for_kind(self.kind)
    }
}

/// Node and edge counts shown in the graph header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    pub themes: usize,
    pub user_notes: usize,
    pub ai_notes: usize,
    pub insight_edges: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphLayout {
    pub center: Point,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphLayout {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn stats(&self) -> LayoutStats {
        let mut stats = LayoutStats::default();
        for node in &self.nodes {
            match node.kind {
                NodeKind::Theme => stats.themes += 1,
                NodeKind::UserNote => stats.user_notes += 1,
                NodeKind::AiNote => stats.ai_notes += 1,
            }
        }
        stats.insight_edges = self
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Insight)
            .count();
        stats
    }

    /// Bounding box `(min, max)` of the final positions.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut points = self.nodes.iter().map(|n| n.final_position);
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        }))
    }
}

/// Angle of theme `index` out of `count`, starting at the top.
pub fn theme_angle(index: usize, count: usize) -> f64 {
    index as f64 * TAU / count.max(1) as f64 - FRAC_PI_2
}

/// Truncates to `limit` characters, appending `...` when anything was cut.
pub fn truncate_label(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn note_position(config: &LayoutConfig, theme_pos: Point, angle: f64, index: usize, count: usize) -> Point {
    match config.placement {
        NotePlacement::Arc {
            radius,
            spread_per_note,
            max_spread,
        } => {
            let spread = max_spread.min(count as f64 * spread_per_note);
            let start = angle - spread / 2.0;
            let step = spread / count.saturating_sub(1).max(1) as f64;
            theme_pos.offset(start + step * index as f64, radius)
        }
        NotePlacement::Grid {
            columns,
            offset,
            column_spacing,
            row_spacing,
        } => {
            let columns = columns.max(1);
            let base = theme_pos.offset(angle + FRAC_PI_2, offset);
            let column = (index % columns) as f64 - (columns - 1) as f64 / 2.0;
            let row = (index / columns) as f64;
            Point::new(base.x + column * column_spacing, base.y + row * row_spacing)
        }
    }
}

/// Lays out themes, their notes and the insight edges between themes.
///
/// Insight edges need at least two connected theme names; the first two are
/// resolved by exact name, first match wins, and an insight whose names do
/// not both resolve is skipped.
pub fn compute_layout(themes: &[Theme], insights: &[Insight], config: &LayoutConfig) -> GraphLayout {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for (i, theme) in themes.iter().enumerate() {
        let angle = theme_angle(i, themes.len());
        let theme_pos = config.center.offset(angle, config.theme_radius);
        let theme_id = format!("theme-{i}");

        let mut theme_node = GraphNode::new(
            theme_id.clone(),
            NodeKind::Theme,
            theme.name.clone(),
            theme.name.clone(),
            theme_pos,
        );
        theme_node.insight = theme.insight.clone();
        theme_node.note_count = theme.notes.len();
        nodes.push(theme_node);

        for (j, note) in theme.notes.iter().enumerate() {
            let (kind, edge_kind, limit) = if note.ai_generated {
                (NodeKind::AiNote, EdgeKind::AiNote, AI_LABEL_LIMIT)
            } else {
                (NodeKind::UserNote, EdgeKind::UserNote, USER_LABEL_LIMIT)
            };
            let note_id = format!("note-{i}-{j}");
            let pos = note_position(config, theme_pos, angle, j, theme.notes.len());

            let mut node = GraphNode::new(
                note_id.clone(),
                kind,
                truncate_label(&note.text, limit),
                note.text.clone(),
                pos,
            );
            node.parent = Some(theme_id.clone());
            nodes.push(node);

            edges.push(GraphEdge {
                id: format!("edge-{theme_id}-to-{note_id}"),
                source: theme_id.clone(),
                target: note_id,
                kind: edge_kind,
                label: None,
            });
        }
    }

    for (k, insight) in insights.iter().enumerate() {
        let [first, second, ..] = insight.connected_themes.as_slice() else {
            continue;
        };
        let resolve = |name: &String| themes.iter().position(|t| &t.name == name);
        if let (Some(a), Some(b)) = (resolve(first), resolve(second)) {
            edges.push(GraphEdge {
                id: format!("insight-edge-{k}"),
                source: format!("theme-{a}"),
                target: format!("theme-{b}"),
                kind: EdgeKind::Insight,
                label: Some(INSIGHT_LABEL.to_string()),
            });
        }
    }

    GraphLayout {
        center: config.center,
        nodes,
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteRef;

    const EPS: f64 = 1e-9;

    fn theme_with(name: &str, notes: usize) -> Theme {
        (0..notes).fold(Theme::new(name), |t, j| {
            t.with_note(NoteRef::user(format!("{name} note {j}")))
        })
    }

    #[test]
    fn themes_are_evenly_spaced_on_one_circle() {
        let config = LayoutConfig::arc();
        for n in 1..=6 {
            let themes: Vec<_> = (0..n).map(|i| theme_with(&format!("T{i}"), 0)).collect();
            let layout = compute_layout(&themes, &[], &config);

            for (i, node) in layout.nodes.iter().enumerate() {
                let d = node.final_position.distance(config.center);
                assert!((d - config.theme_radius).abs() < EPS);

                let angle = (node.final_position.y - config.center.y)
                    .atan2(node.final_position.x - config.center.x);
                let expected = theme_angle(i, n);
                let diff = (angle - expected).rem_euclid(TAU);
                assert!(diff < EPS || (TAU - diff) < EPS, "theme {i} of {n}");
            }
        }
    }

    #[test]
    fn first_theme_sits_at_the_top() {
        let config = LayoutConfig::arc();
        let layout = compute_layout(&[theme_with("T", 0)], &[], &config);
        let pos = layout.nodes[0].final_position;
        assert!((pos.x - 600.0).abs() < EPS);
        assert!((pos.y - 20.0).abs() < EPS);
    }

    #[test]
    fn arc_spread_is_capped() {
        let config = LayoutConfig::arc();
        for k in 2..=10 {
            let layout = compute_layout(&[theme_with("T", k)], &[], &config);
            let theme_pos = layout.nodes[0].final_position;
            let angles: Vec<f64> = layout.nodes[1..]
                .iter()
                .map(|n| {
                    let p = n.final_position;
                    (p.y - theme_pos.y).atan2(p.x - theme_pos.x)
                })
                .collect();

            let expected = (k as f64 * 0.5).min(0.75 * PI);
            let first = angles[0];
            let last = angles[angles.len() - 1];
            let spread = (last - first).rem_euclid(TAU);
            assert!(spread <= 0.75 * PI + EPS, "k={k} spread={spread}");
            assert!((spread - expected).abs() < 1e-6, "k={k}");

            for node in &layout.nodes[1..] {
                assert!((node.final_position.distance(theme_pos) - 240.0).abs() < EPS);
            }
        }
    }

    #[test]
    fn single_note_sits_on_the_theme_direction() {
        let config = LayoutConfig::arc();
        let layout = compute_layout(&[theme_with("T", 1)], &[], &config);
        let theme_pos = layout.nodes[0].final_position;
        let note_pos = layout.nodes[1].final_position;
        let expected = theme_pos.offset(-FRAC_PI_2 - 0.25, 240.0);
        assert!(note_pos.distance(expected) < EPS);
    }

    #[test]
    fn grid_places_rows_beside_the_theme() {
        let config = LayoutConfig::grid();
        let layout = compute_layout(&[theme_with("T", 4)], &[], &config);
        let theme_pos = layout.nodes[0].final_position;
        assert!(theme_pos.distance(Point::new(800.0, 0.0)) < EPS);

        // θ = -π/2, so the offset direction θ + π/2 points along +x.
        let base = Point::new(1200.0, 0.0);
        let expected = [
            Point::new(base.x - 300.0, base.y),
            Point::new(base.x, base.y),
            Point::new(base.x + 300.0, base.y),
            Point::new(base.x - 300.0, base.y + 150.0),
        ];
        for (node, want) in layout.nodes[1..].iter().zip(expected) {
            assert!(node.final_position.distance(want) < 1e-6, "{}", node.id);
        }
    }

    #[test]
    fn ids_edges_and_kinds() {
        let themes = vec![Theme::new("T1")
            .with_note(NoteRef::user("A"))
            .with_note(NoteRef::ai("X"))];
        let layout = compute_layout(&themes, &[], &LayoutConfig::default());

        let ids: Vec<_> = layout.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["theme-0", "note-0-0", "note-0-1"]);
        assert_eq!(layout.nodes[0].note_count, 2);
        assert_eq!(layout.nodes[2].kind, NodeKind::AiNote);
        assert_eq!(layout.nodes[2].parent.as_deref(), Some("theme-0"));

        assert_eq!(layout.edges.len(), 2);
        assert_eq!(layout.edges[0].id, "edge-theme-0-to-note-0-0");
        assert_eq!(layout.edges[0].kind, EdgeKind::UserNote);
        assert_eq!(layout.edges[1].kind, EdgeKind::AiNote);
        assert!(layout.edges[1].style().animated);
    }

    #[test]
    fn insight_edges_require_two_resolved_names() {
        let themes = vec![Theme::new("T1"), Theme::new("T2"), Theme::new("T1")];
        let insights = vec![
            Insight::new("ok", "", ["T2", "T1"]),
            Insight::new("one", "", ["T1"]),
            Insight::new("unknown", "", ["T1", "Nope"]),
            Insight::new("three", "", ["T1", "T2", "Nope"]),
        ];
        let layout = compute_layout(&themes, &insights, &LayoutConfig::default());

        let insight_edges: Vec<_> = layout
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Insight)
            .collect();
        assert_eq!(insight_edges.len(), 2);

        assert_eq!(insight_edges[0].id, "insight-edge-0");
        assert_eq!(insight_edges[0].source, "theme-1");
        assert_eq!(insight_edges[0].target, "theme-0");
        assert_eq!(insight_edges[0].label.as_deref(), Some("✨"));

        assert_eq!(insight_edges[1].id, "insight-edge-3");
        assert!(insight_edges[1].style().dashed);
    }

    #[test]
    fn labels_truncate_by_characters() {
        let long_user = "é".repeat(200);
        let long_ai = "x".repeat(250);
        let themes = vec![Theme::new("T")
            .with_note(NoteRef::user(long_user.clone()))
            .with_note(NoteRef::ai(long_ai.clone()))
            .with_note(NoteRef::user("short"))];
        let layout = compute_layout(&themes, &[], &LayoutConfig::default());

        assert_eq!(layout.nodes[1].label.chars().count(), 163);
        assert!(layout.nodes[1].label.ends_with("..."));
        assert_eq!(layout.nodes[1].full_text, long_user);
        assert_eq!(layout.nodes[2].label.chars().count(), 203);
        assert_eq!(layout.nodes[3].label, "short");
        assert_eq!(truncate_label(&"a".repeat(160), 160), "a".repeat(160));
    }

    #[test]
    fn stats_and_bounds() {
        let themes = vec![
            Theme::new("T1")
                .with_note(NoteRef::user("A"))
                .with_note(NoteRef::ai("X")),
            Theme::new("T2").with_note(NoteRef::user("B")),
        ];
        let insights = vec![Insight::new("I", "", ["T1", "T2"])];
        let layout = compute_layout(&themes, &insights, &LayoutConfig::default());

        assert_eq!(
            layout.stats(),
            LayoutStats {
                themes: 2,
                user_notes: 2,
                ai_notes: 1,
                insight_edges: 1,
            }
        );

        let (min, max) = layout.bounds().unwrap();
        for node in &layout.nodes {
            let p = node.final_position;
            assert!(p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y);
        }
        assert!(compute_layout(&[], &[], &LayoutConfig::default()).bounds().is_none());
    }
}
