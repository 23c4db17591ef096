//! Thought-graph construction and reveal animation.
//!
//! `layout` turns themes and insights into positioned nodes and styled
//! edges. `animator` stages those nodes through the reveal sequence.

pub mod animator;
pub mod layout;
pub mod random;
pub mod style;

pub use animator::{Phase, RevealAnimator, RunToken, Tick, Timeline};
pub use layout::{
    EdgeKind, GraphEdge, GraphLayout, GraphNode, LayoutConfig, LayoutStats, NodeKind,
    NotePlacement, Point, compute_layout,
};
pub use random::{RandomSource, SequenceRandom, ThreadRandom};
pub use style::{EdgeStyle, Rgb};
