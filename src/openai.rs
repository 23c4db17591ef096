/// OpenAI chat-completions client module.
///
/// This module provides a blocking HTTP client for the chat-completions API,
/// including error classification and builder-based configuration.
mod client;

pub use client::{
    ChatClientTrait, ChatRequest, DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiClient,
    OpenAiClientBuilder, OpenAiError,
};
