//! Hosted chat-completion providers.

use anyhow::Result;

pub mod groq;

pub use groq::GroqProvider;

/// Default sampling temperature for answers.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Trait implemented by concrete LLM providers.
pub trait LlmProvider: Send + Sync {
    /// Sends the prompt and returns the generated text verbatim.
    fn answer(&self, request: &ProviderRequest<'_>) -> Result<String>;
}

/// Request envelope shared by providers.
#[derive(Debug, Clone, Copy)]
pub struct ProviderRequest<'a> {
    /// Fully composed prompt.
    pub prompt: &'a str,
    /// Sampling temperature.
    pub temperature: f32,
    /// Optional cap on generated tokens.
    pub max_tokens: Option<usize>,
}

impl<'a> ProviderRequest<'a> {
    /// Request with default sampling settings.
    pub fn new(prompt: &'a str) -> Self {
        Self {
            prompt,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }
}
