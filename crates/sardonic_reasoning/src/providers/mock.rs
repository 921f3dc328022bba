//! Mock LLM provider with deterministic responses, for running without API keys.

use crate::api_types::{Message, MessagesResponse};
use crate::llm::{CompletionParams, LlmClient};
use anyhow::Result;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    latency: Duration,
}

impl MockProvider {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            latency: Duration::from_millis(200),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait::async_trait]
impl LlmClient for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        messages: Vec<Message>,
        _params: CompletionParams,
    ) -> Result<MessagesResponse> {
        tokio::time::sleep(self.latency).await;
        let turns = messages.len();
        Ok(MessagesResponse::from_text(format!(
            "(Mock {} Response) Riveting stuff, truly. That makes {} messages of pure brilliance so far.",
            self.model, turns
        )))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
