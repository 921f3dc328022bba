//! OpenAI-compatible chat completions provider.
//!
//! Grok (x.ai) and Ollama expose the same `/chat/completions` shape, so one
//! client covers all three; only the base URL and key differ.

use crate::api_types::{Message, MessagesResponse};
use crate::llm::{CompletionParams, LlmClient};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(model: &str, base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Convert messages to the OpenAI wire format, system prompt first.
pub fn build_openai_messages(system: &str, messages: &[Message]) -> Vec<Value> {
    let mut openai_messages = vec![json!({"role": "system", "content": system})];
    for msg in messages {
        let text = msg.text();
        if !text.is_empty() {
            openai_messages.push(json!({"role": msg.role.as_str(), "content": text}));
        }
    }
    openai_messages
}

pub fn build_payload(model: &str, system: &str, messages: &[Message], params: &CompletionParams) -> Value {
    json!({
        "model": model,
        "messages": build_openai_messages(system, messages),
        "temperature": params.temperature,
        "max_tokens": params.max_tokens,
    })
}

/// Extract the first choice's text from a completions response body.
pub fn parse_completion(body: &Value) -> Result<MessagesResponse> {
    let choice = &body["choices"][0];
    let text = choice["message"]["content"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .context("Completion response carried no text")?;
    Ok(MessagesResponse {
        content: vec![crate::api_types::ContentBlock::Text {
            text: text.to_string(),
        }],
        stop_reason: choice["finish_reason"].as_str().map(|s| s.to_string()),
    })
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(
        &self,
        system: &str,
        messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<MessagesResponse> {
        let payload = build_payload(&self.model, system, &messages, &params);
        let url = format!("{}/chat/completions", self.base_url);

        let mut request = self.client.post(&url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Completion API Error ({}): {}", status, error_text);
        }

        let body: Value = response.json().await.context("Invalid completion JSON")?;
        parse_completion(&body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
