//! Generation tiers behind one capability interface.
//!
//! The engine is handed a single `Generator` at construction and never
//! inspects which variant it got.

use crate::api_types::MessagesResponse;
use crate::llm::{CompletionParams, LlmClient};
use crate::prompts::PromptBuilder;
use crate::response_bank::ResponseBank;
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use sardonic_core::{Candidate, Intent, Mood, RandomSource, Source, Turn};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

pub const TEMPLATE_CONFIDENCE: f32 = 0.95;
pub const GENERATED_CONFIDENCE: f32 = 0.9;

/// Histories longer than this get a "still here" prefix on template replies.
const CONTINUATION_AFTER_TURNS: usize = 3;

/// Sampling options forwarded to a generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Sampling randomness, 0.1–2.0.
    pub temperature: f32,
    /// Upper bound on output length, in tokens.
    pub max_length: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            max_length: 150,
        }
    }
}

#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    /// Descriptive metadata surfaced as `model_info`.
    fn info(&self) -> Value;

    /// Last known availability of the backing model.
    fn is_available(&self) -> bool;

    async fn generate(
        &self,
        text: &str,
        mood: Mood,
        intent: Intent,
        history: &[Turn],
        params: &GenerationParams,
    ) -> Result<Candidate>;
}

// ============================================================================
// Template tier
// ============================================================================

/// Curated replies from the response bank. Never fails.
pub struct TemplateGenerator {
    bank: Arc<ResponseBank>,
    rng: Arc<RandomSource>,
}

impl TemplateGenerator {
    pub fn new(bank: Arc<ResponseBank>, rng: Arc<RandomSource>) -> Self {
        Self { bank, rng }
    }
}

#[async_trait]
impl Generator for TemplateGenerator {
    fn name(&self) -> &str {
        "template"
    }

    fn info(&self) -> Value {
        json!({
            "model_type": "template",
            "templates": self.bank.len(),
        })
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        _text: &str,
        mood: Mood,
        intent: Intent,
        history: &[Turn],
        _params: &GenerationParams,
    ) -> Result<Candidate> {
        let text = self.rng.with(|rng| {
            let reply = self.bank.fallback(intent, mood, rng);
            if history.len() > CONTINUATION_AFTER_TURNS {
                if let Some(prefix) = self.bank.continuation_prefix(rng) {
                    return format!("{} {}", prefix, reply);
                }
            }
            reply.to_string()
        });
        Ok(Candidate::new(text, Source::Template, TEMPLATE_CONFIDENCE))
    }
}

// ============================================================================
// Model-backed tier
// ============================================================================

static LEADING_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(mr\.?\s*sarcastic|assistant|chatbot|bot|ai)\s*:\s*").unwrap()
});

/// Start of a hallucinated next turn ("\nHuman: ...").
static NEXT_SPEAKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\n\s*(human|user|mr\.?\s*sarcastic|assistant)\s*:").unwrap()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strip speaker labels and trailing invented turns, keep the first
/// paragraph, and cap the result at `max_words` words.
pub fn clean_model_output(raw: &str, max_words: usize) -> String {
    let text = LEADING_LABEL_RE.replace(raw, "");
    let text = match NEXT_SPEAKER_RE.find(&text) {
        Some(m) => &text[..m.start()],
        None => &text[..],
    };
    let paragraph = text
        .split("\n\n")
        .map(str::trim)
        .find(|p| !p.is_empty())
        .unwrap_or("");
    let collapsed = WHITESPACE_RE.replace_all(paragraph, " ");

    let words: Vec<&str> = collapsed.split(' ').filter(|w| !w.is_empty()).collect();
    if words.len() <= max_words {
        words.join(" ")
    } else {
        words[..max_words].join(" ")
    }
}

/// Replies produced by an external language model.
pub struct ModelGenerator {
    client: Box<dyn LlmClient>,
    prompts: PromptBuilder,
    available: AtomicBool,
}

impl ModelGenerator {
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self {
            client,
            prompts: PromptBuilder::new(),
            available: AtomicBool::new(true),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    async fn call(
        &self,
        text: &str,
        mood: Mood,
        intent: Intent,
        history: &[Turn],
        params: &GenerationParams,
    ) -> Result<MessagesResponse> {
        let system = self.prompts.system_prompt(mood, intent);
        let messages = self.prompts.messages(history, text);
        let completion = CompletionParams {
            max_tokens: params.max_length,
            temperature: params.temperature,
        };
        self.client.complete(&system, messages, completion).await
    }
}

#[async_trait]
impl Generator for ModelGenerator {
    fn name(&self) -> &str {
        "model"
    }

    fn info(&self) -> Value {
        json!({
            "model_type": "model",
            "model_name": self.client.model_name(),
            "available": self.is_available(),
        })
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    async fn generate(
        &self,
        text: &str,
        mood: Mood,
        intent: Intent,
        history: &[Turn],
        params: &GenerationParams,
    ) -> Result<Candidate> {
        let response = match self.call(text, mood, intent, history, params).await {
            Ok(response) => response,
            Err(e) => {
                self.available.store(false, Ordering::Relaxed);
                return Err(e).context("Model completion failed");
            }
        };
        self.available.store(true, Ordering::Relaxed);

        let cleaned = clean_model_output(&response.text(), params.max_length as usize);
        tracing::debug!("Model produced {} chars", cleaned.len());
        Ok(Candidate::new(cleaned, Source::Generated, GENERATED_CONFIDENCE))
    }
}
