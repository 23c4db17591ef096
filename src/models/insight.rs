use serde::{Deserialize, Serialize};

use super::Theme;

/// A provider-synthesized statement connecting two or more themes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub connected_themes: Vec<String>,
}

impl Insight {
    /// Creates an insight connecting the given theme names.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        connected_themes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            connected_themes: connected_themes.into_iter().map(Into::into).collect(),
        }
    }
}

/// The outcome of one analysis call: themes plus cross-theme insights.
///
/// Both keys are required on the wire; a payload missing either one is a
/// malformed response, not an empty result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub themes: Vec<Theme>,
    pub insights: Vec<Insight>,
}

impl AnalysisResult {
    /// Returns true when neither themes nor insights are present.
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty() && self.insights.is_empty()
    }
}
