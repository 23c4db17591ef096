mod ids;
mod insight;
mod note;
mod theme;

pub use ids::NoteId;
pub use insight::{AnalysisResult, Insight};
pub use note::{Note, NoteBuilder};
pub use theme::{NoteRef, Theme};
