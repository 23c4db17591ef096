//! Colours and stroke styles for the thought graph.

use super::layout::{EdgeKind, NodeKind};

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Formats as `#rrggbb`.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

pub const THEME_COLOR: Rgb = Rgb(0x5f, 0x6b, 0x5f);
pub const AI_COLOR: Rgb = Rgb(0xa8, 0x55, 0xf7);
pub const USER_COLOR: Rgb = Rgb(0xff, 0xff, 0xff);
pub const INSIGHT_COLOR: Rgb = Rgb(0xfb, 0xbf, 0x24);

/// Label drawn on insight edges.
pub const INSIGHT_LABEL: &str = "✨";

/// How an edge is stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeStyle {
    pub color: Rgb,
    pub width: u8,
    pub animated: bool,
    pub dashed: bool,
}

impl EdgeStyle {
    pub fn for_kind(kind: EdgeKind) -> Self {
        match kind {
            EdgeKind::UserNote => Self {
                color: THEME_COLOR,
                width: 3,
                animated: false,
                dashed: false,
            },
            EdgeKind::AiNote => Self {
                color: AI_COLOR,
                width: 4,
                animated: true,
                dashed: false,
            },
            EdgeKind::Insight => Self {
                color: INSIGHT_COLOR,
                width: 5,
                animated: true,
                dashed: true,
            },
        }
    }
}

/// Minimap fill colour for a node.
pub fn node_color(kind: NodeKind) -> Rgb {
    match kind {
        NodeKind::Theme => THEME_COLOR,
        NodeKind::AiNote => AI_COLOR,
        NodeKind::UserNote => USER_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_taxonomy() {
        let user = EdgeStyle::for_kind(EdgeKind::UserNote);
        assert_eq!(user.color.hex(), "#5f6b5f");
        assert_eq!(user.width, 3);
        assert!(!user.animated && !user.dashed);

        let ai = EdgeStyle::for_kind(EdgeKind::AiNote);
        assert_eq!(ai.color.hex(), "#a855f7");
        assert_eq!(ai.width, 4);
        assert!(ai.animated && !ai.dashed);

        let insight = EdgeStyle::for_kind(EdgeKind::Insight);
        assert_eq!(insight.color.hex(), "#fbbf24");
        assert_eq!(insight.width, 5);
        assert!(insight.animated && insight.dashed);
    }

    #[test]
    fn minimap_colors() {
        assert_eq!(node_color(NodeKind::Theme).hex(), "#5f6b5f");
        assert_eq!(node_color(NodeKind::AiNote).hex(), "#a855f7");
        assert_eq!(node_color(NodeKind::UserNote).hex(), "#ffffff");
    }
}
