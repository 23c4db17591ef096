//! Note analysis using LLMs.
//!
//! This module defines the `Analyzer` seam shared by the HTTP client and the
//! server, the error taxonomy surfaced to users, and `NoteAnalyzer`, which
//! turns a list of notes into themes and insights through a chat-completion
//! provider.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::AnalysisResult;
use crate::openai::{ChatClientTrait, ChatRequest, DEFAULT_MODEL, OpenAiError};

/// Minimum number of notes an analysis accepts.
pub const MIN_NOTES: usize = 3;

pub(crate) const AUTH_MESSAGE: &str = "Invalid OpenAI API key. Please check your configuration.";
pub(crate) const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again in a moment.";

/// Errors surfaced by an analysis call.
///
/// The `Display` output is the message shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// Fewer than `MIN_NOTES` notes were supplied. Raised before any network call.
    #[error("Please add at least 3 notes to generate insights.")]
    TooFewNotes { count: usize },

    /// The provider API key is missing.
    #[error("OpenAI API key is not configured")]
    NotConfigured,

    /// The provider rejected the credentials.
    #[error("{message}")]
    Auth { message: String },

    /// The provider is rate limiting requests.
    #[error("{message}")]
    RateLimit { message: String },

    /// The provider answered, but without the `themes` and `insights` keys.
    #[error("Invalid response structure: {detail}")]
    MalformedResponse { detail: String },

    /// Any other failure.
    #[error("{message}")]
    Failed { message: String },
}

impl AnalysisError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            detail: detail.into(),
        }
    }

    pub(crate) fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

impl From<OpenAiError> for AnalysisError {
    fn from(error: OpenAiError) -> Self {
        match error {
            OpenAiError::MissingApiKey => Self::NotConfigured,
            OpenAiError::Http { status: 401, .. } => Self::Auth {
                message: AUTH_MESSAGE.to_string(),
            },
            OpenAiError::Http { status: 429, .. } => Self::RateLimit {
                message: RATE_LIMIT_MESSAGE.to_string(),
            },
            other => Self::failed(other.to_string()),
        }
    }
}

/// Turns note texts into themes and insights.
///
/// Implementations must reject fewer than `MIN_NOTES` notes without doing
/// any I/O.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, notes: &[String]) -> Result<AnalysisResult, AnalysisError>;
}

/// Fails with `TooFewNotes` when `notes` is below the minimum.
pub fn ensure_min_notes(notes: &[String]) -> Result<(), AnalysisError> {
    if notes.len() < MIN_NOTES {
        return Err(AnalysisError::TooFewNotes { count: notes.len() });
    }
    Ok(())
}

const SYSTEM_PROMPT: &str = "You help people find connections between their ideas. You write like a sharp, friendly colleague with correct spelling and grammar. You surface patterns, links and fresh angles that help with brainstorming, research and creative work, and you never hand out task lists. You always answer with valid JSON.";

/// Prompt template for note analysis.
///
/// `{notes}` is replaced by the numbered note list.
const PROMPT_TEMPLATE: &str = r#"Help me organize these thoughts and find the connections I might have missed.

Every note I list below MUST appear in your answer. Do not drop any of them.

1. GROUP: Sort all of my notes into 2-4 specific, concrete themes. Each of my notes goes into exactly one theme with "aiGenerated": false.

2. ADD: For each theme write 2-3 NEW notes marked "aiGenerated": true. They should:
   - point out links between my specific notes, referring to them by content
   - offer angles I have not considered
   - surface patterns or relationships across the notes
   - lean toward "what if" connections and deeper meaning

3. CONNECT: Write 2-4 insights that link different themes: unexpected connections and syntheses that spark new thinking.

My notes (each one must appear with "aiGenerated": false):
{notes}

Answer with JSON in exactly this shape:
{
  "themes": [
    {
      "name": "Specific Theme Name",
      "insight": "A one or two sentence observation about this theme",
      "notes": [
        { "text": "EXACT text of one of my notes", "aiGenerated": false },
        { "text": "A new note of 40-90 words connecting specific notes in this theme", "aiGenerated": true }
      ]
    }
  ],
  "insights": [
    {
      "title": "Short Connection Title",
      "description": "How these themes connect, with concrete examples from the notes",
      "connectedThemes": ["Theme Name 1", "Theme Name 2"]
    }
  ]
}

RULES:
- Copy my notes character for character; never rephrase them
- Only your own new notes may have "aiGenerated": true
- AI notes are 40-90 words and reveal connections rather than give tasks
- Theme names in "connectedThemes" must match a theme "name" exactly"#;

/// Renders the analysis prompt for the given notes.
pub fn build_prompt(notes: &[String]) -> String {
    let numbered = notes
        .iter()
        .enumerate()
        .map(|(i, note)| format!("{}. {}", i + 1, note))
        .collect::<Vec<_>>()
        .join("\n");
    PROMPT_TEMPLATE.replace("{notes}", &numbered)
}

fn build_request(notes: &[String]) -> ChatRequest {
    let mut request = ChatRequest::new(SYSTEM_PROMPT, build_prompt(notes));
    request.temperature = 0.8;
    request.max_tokens = 3000;
    request.json_response = true;
    request
}

/// Builder for constructing `NoteAnalyzer` instances.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use noema::analyzer::{Analyzer, NoteAnalyzerBuilder};
/// use noema::openai::OpenAiClientBuilder;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = OpenAiClientBuilder::new().build()?;
/// let analyzer = NoteAnalyzerBuilder::new()
///     .model(client.model().to_string())
///     .client(Arc::new(client))
///     .build();
///
/// let notes = vec!["a".to_string(), "b".to_string(), "c".to_string()];
/// let result = analyzer.analyze(&notes)?;
/// println!("{} themes", result.themes.len());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct NoteAnalyzerBuilder {
    client: Option<Arc<dyn ChatClientTrait>>,
    model: Option<String>,
}

impl NoteAnalyzerBuilder {
    /// Creates a new `NoteAnalyzerBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chat client used to reach the provider.
    pub fn client(mut self, client: Arc<dyn ChatClientTrait>) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the model name. Defaults to `DEFAULT_MODEL`.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Builds the `NoteAnalyzer`.
    ///
    /// # Panics
    ///
    /// Panics if `client()` was not called before `build()`.
    #[must_use]
    pub fn build(self) -> NoteAnalyzer {
        NoteAnalyzer {
            client: self.client.expect("client must be set via client() method"),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

/// Analyzes notes by prompting a chat-completion provider.
pub struct NoteAnalyzer {
    client: Arc<dyn ChatClientTrait>,
    model: String,
}

impl NoteAnalyzer {
    /// Creates a new `NoteAnalyzer` for the given client and model.
    #[must_use]
    pub fn new(client: Arc<dyn ChatClientTrait>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Returns the model this analyzer requests.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Analyzer for NoteAnalyzer {
    fn analyze(&self, notes: &[String]) -> Result<AnalysisResult, AnalysisError> {
        ensure_min_notes(notes)?;

        info!(notes = notes.len(), model = %self.model, "analyzing notes");
        let response = self
            .client
            .complete(&self.model, &build_request(notes))
            .inspect_err(|e| warn!(error = %e, "provider call failed"))?;

        let json_str = extract_json(&response)
            .ok_or_else(|| AnalysisError::malformed("no JSON object in provider response"))?;

        let result = parse_analysis(&json_str)?;
        info!(
            themes = result.themes.len(),
            insights = result.insights.len(),
            "analysis complete"
        );
        Ok(result)
    }
}

/// Extracts the outermost JSON object from a model response.
///
/// Handles clean JSON, markdown code fences and explanatory text around the
/// object.
fn extract_json(response: &str) -> Option<String> {
    let trimmed = response.trim();

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;

    if start <= end {
        Some(trimmed[start..=end].to_string())
    } else {
        None
    }
}

/// Parses a provider JSON payload into an `AnalysisResult`.
///
/// # Errors
///
/// Returns `MalformedResponse` if the payload is not a JSON object, is
/// missing `themes` or `insights`, or has entries of the wrong shape.
pub fn parse_analysis(json_str: &str) -> Result<AnalysisResult, AnalysisError> {
    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| AnalysisError::malformed(format!("failed to parse JSON: {e}")))?;

    let obj = value
        .as_object()
        .ok_or_else(|| AnalysisError::malformed("expected a JSON object"))?;

    for key in ["themes", "insights"] {
        if obj.get(key).is_none_or(serde_json::Value::is_null) {
            return Err(AnalysisError::malformed(format!("missing '{key}'")));
        }
    }

    serde_json::from_value(value).map_err(|e| AnalysisError::malformed(e.to_string()))
}
