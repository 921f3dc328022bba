use crate::api_types::{Message, MessagesResponse};
use anyhow::Result;
use async_trait::async_trait;

/// Parameters for a single completion call.
#[derive(Debug, Clone)]
pub struct CompletionParams {
    /// Maximum tokens to generate (will be clamped to provider limits)
    pub max_tokens: u32,
    /// Sampling temperature (0.1 - 2.0)
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 150,
            temperature: 0.8,
        }
    }
}

/// External text-generation capability behind the model-backed generator.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<MessagesResponse>;

    /// Model identifier for status output.
    fn model_name(&self) -> &str;
}

// Providers available in crate::providers
