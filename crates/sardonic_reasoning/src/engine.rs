use crate::generator::{GenerationParams, Generator, ModelGenerator, TemplateGenerator};
use crate::providers::create_client;
use crate::quality::{QualityGate, Verdict};
use crate::recommend::{RecommendationEngine, DEFAULT_LIMIT};
use crate::response_bank::ResponseBank;
use anyhow::Result;
use sardonic_core::classifier::{classify, is_short_acknowledgement};
use sardonic_core::config::{EngineConfig, LlmConfig};
use sardonic_core::{
    Candidate, ContentCatalog, EngineError, Intent, Mood, RandomSource, SardonicConfig, Source, Turn,
};
use sardonic_memory::ConversationStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const SHORT_CIRCUIT_CONFIDENCE: f32 = 0.9;
pub const RECOMMENDATION_CONFIDENCE: f32 = 0.9;
pub const REJECTION_FALLBACK_CONFIDENCE: f32 = 0.6;
pub const FALLBACK_CONFIDENCE: f32 = 0.5;

pub const TEMPERATURE_RANGE: (f32, f32) = (0.1, 2.0);
pub const MAX_LENGTH_RANGE: (u32, u32) = (10, 500);

// ============================================================================
// Request / reply
// ============================================================================

/// A prior exchange supplied by a client that keeps its own history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(alias = "message")]
    pub user: String,
    #[serde(alias = "response")]
    pub bot: String,
}

impl HistoryEntry {
    fn to_turn(&self) -> Turn {
        let (intent, mood) = classify(&self.user, &[]);
        let recommended = RecommendationEngine::lists_items(&self.bot);
        Turn::new(&self.user, &self.bot, intent, mood).with_recommendations(recommended)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
    /// Falls back to the engine's configured default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_id: None,
            conversation_history: Vec::new(),
            temperature: None,
            max_length: None,
        }
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.conversation_history = history;
        self
    }

    /// The user id, unless blank.
    fn user(&self) -> Option<&str> {
        self.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub mood_detected: Mood,
    pub intent_detected: Intent,
    pub confidence: f32,
    pub source: Source,
    pub model_info: Value,
    /// Seconds spent producing the reply.
    pub generation_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_recommendations: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub model_available: bool,
    pub generator: String,
    pub model_info: Value,
    pub catalog_size: usize,
    pub templates: usize,
    pub active_histories: usize,
    pub total_turns: usize,
}

// ============================================================================
// Settings & builder
// ============================================================================

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub recommendation_limit: usize,
    pub max_message_chars: usize,
    pub generation_timeout: Duration,
    /// Sampling used when a request leaves temperature or length unset.
    pub generation: GenerationParams,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::new(&EngineConfig::default(), &LlmConfig::default())
    }
}

impl From<&SardonicConfig> for EngineSettings {
    fn from(config: &SardonicConfig) -> Self {
        Self::new(&config.engine, &config.llm)
    }
}

impl EngineSettings {
    pub fn new(config: &EngineConfig, llm: &LlmConfig) -> Self {
        Self {
            recommendation_limit: if config.recommendation_limit == 0 {
                DEFAULT_LIMIT
            } else {
                config.recommendation_limit
            },
            max_message_chars: config.max_message_chars,
            generation_timeout: Duration::from_secs(config.generation_timeout_secs.max(1)),
            generation: GenerationParams {
                temperature: llm.temperature,
                max_length: llm.max_length,
            },
        }
    }
}

pub struct ResponseEngineBuilder {
    store: Arc<ConversationStore>,
    generator: Option<Arc<dyn Generator>>,
    catalog: Arc<ContentCatalog>,
    bank: Arc<ResponseBank>,
    random: Arc<RandomSource>,
    quality: QualityGate,
    settings: EngineSettings,
}

impl ResponseEngineBuilder {
    /// Defaults to the template generator when none is set.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn catalog(mut self, catalog: ContentCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    pub fn bank(mut self, bank: ResponseBank) -> Self {
        self.bank = Arc::new(bank);
        self
    }

    pub fn random(mut self, random: RandomSource) -> Self {
        self.random = Arc::new(random);
        self
    }

    pub fn quality(mut self, quality: QualityGate) -> Self {
        self.quality = quality;
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> ResponseEngine {
        let generator: Arc<dyn Generator> = match self.generator {
            Some(generator) => generator,
            None => Arc::new(TemplateGenerator::new(self.bank.clone(), self.random.clone())),
        };
        ResponseEngine {
            store: self.store,
            generator,
            recommender: RecommendationEngine::new(self.catalog),
            bank: self.bank,
            random: self.random,
            quality: self.quality,
            settings: self.settings,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Turns one chat request into one reply.
///
/// Flow: validate, classify, then exactly one of short-circuit,
/// recommendation or generation (with quality check and fallback), then
/// persist the turn for identified users.
pub struct ResponseEngine {
    store: Arc<ConversationStore>,
    generator: Arc<dyn Generator>,
    recommender: RecommendationEngine,
    bank: Arc<ResponseBank>,
    random: Arc<RandomSource>,
    quality: QualityGate,
    settings: EngineSettings,
}

impl ResponseEngine {
    pub fn builder(store: Arc<ConversationStore>) -> ResponseEngineBuilder {
        ResponseEngineBuilder {
            store,
            generator: None,
            catalog: Arc::new(ContentCatalog::empty()),
            bank: Arc::new(ResponseBank::builtin()),
            random: Arc::new(RandomSource::entropy()),
            quality: QualityGate::default(),
            settings: EngineSettings::default(),
        }
    }

    /// Wire an engine from configuration: catalog, response bank, provider.
    ///
    /// A missing catalog file is not fatal; the engine starts with an empty
    /// catalog.
    pub fn from_config(config: &SardonicConfig) -> Result<Self> {
        let store = Arc::new(ConversationStore::new(config.engine.history_cap));

        let catalog = match &config.catalog.path {
            Some(path) => ContentCatalog::from_json_file(path).unwrap_or_else(|e| {
                tracing::warn!("Catalog unavailable ({:#}), starting with an empty catalog", e);
                ContentCatalog::empty()
            }),
            None => ContentCatalog::empty(),
        };

        let bank = match &config.responses.path {
            Some(path) => ResponseBank::from_json_file(path)?,
            None => ResponseBank::builtin(),
        };

        let random = match config.engine.seed {
            Some(seed) => RandomSource::seeded(seed),
            None => RandomSource::entropy(),
        };

        let settings = EngineSettings::from(config);
        let mut builder = Self::builder(store)
            .catalog(catalog)
            .bank(bank)
            .random(random)
            .quality(QualityGate::new(config.quality.clone()))
            .settings(settings.clone());

        if let Some(client) = create_client(&config.llm, settings.generation_timeout)? {
            builder = builder.generator(Arc::new(ModelGenerator::new(client)));
        }

        let engine = builder.build();
        tracing::info!(
            "Response engine ready (generator: {}, catalog: {} items)",
            engine.generator.name(),
            engine.recommender.catalog().len()
        );
        Ok(engine)
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub async fn respond(&self, request: ChatRequest) -> Result<ChatReply, EngineError> {
        let started = Instant::now();
        let params = self.generation_params(&request);
        self.validate(&request, &params)?;
        let text = request.message.trim();
        let user = request.user();

        let history = match user {
            Some(id) => self.store.read(id).await,
            None => request.conversation_history.iter().map(HistoryEntry::to_turn).collect(),
        };

        let (intent, mood) = classify(text, &history);
        tracing::debug!("Classified input as intent={} mood={}", intent, mood);

        let mut has_recommendations = None;
        let candidate = if is_short_acknowledgement(text) {
            let after_recommendation = history.last().is_some_and(|t| t.recommended);
            tracing::debug!("Short acknowledgement (after recommendation: {})", after_recommendation);
            let reply = self
                .random
                .with(|rng| self.bank.acknowledgement(after_recommendation, rng).to_string());
            Candidate::new(reply, Source::ShortCircuit, SHORT_CIRCUIT_CONFIDENCE)
        } else if RecommendationEngine::should_recommend(intent, text) {
            let limit = self.settings.recommendation_limit;
            let (reply, count) = self.random.with(|rng| {
                let items = self.recommender.recommend(mood, limit, rng);
                (self.recommender.format(&items, mood, rng), items.len())
            });
            tracing::debug!("Recommended {} items for mood {}", count, mood);
            has_recommendations = Some(count > 0);
            Candidate::new(reply, Source::Recommendation, RECOMMENDATION_CONFIDENCE)
        } else {
            self.generate(text, intent, mood, &history, &params).await
        };

        if let Some(id) = user {
            let turn = Turn::new(text, &candidate.text, intent, mood)
                .with_recommendations(has_recommendations == Some(true));
            self.store.append(id, turn).await;
        }

        Ok(ChatReply {
            response: candidate.text,
            mood_detected: mood,
            intent_detected: intent,
            confidence: candidate.confidence,
            source: candidate.source,
            model_info: self.generator.info(),
            generation_time: started.elapsed().as_secs_f64(),
            has_recommendations,
        })
    }

    /// Request values where given, configured defaults otherwise.
    fn generation_params(&self, request: &ChatRequest) -> GenerationParams {
        let defaults = self.settings.generation;
        GenerationParams {
            temperature: request.temperature.unwrap_or(defaults.temperature),
            max_length: request.max_length.unwrap_or(defaults.max_length),
        }
    }

    fn validate(&self, request: &ChatRequest, params: &GenerationParams) -> Result<(), EngineError> {
        let text = request.message.trim();
        if text.is_empty() {
            return Err(EngineError::EmptyMessage);
        }
        let len = text.chars().count();
        if len > self.settings.max_message_chars {
            return Err(EngineError::MessageTooLong {
                len,
                max: self.settings.max_message_chars,
            });
        }
        let (t_min, t_max) = TEMPERATURE_RANGE;
        if !(t_min..=t_max).contains(&params.temperature) {
            return Err(EngineError::InvalidParameter(format!(
                "temperature must be between {} and {}",
                t_min, t_max
            )));
        }
        let (l_min, l_max) = MAX_LENGTH_RANGE;
        if !(l_min..=l_max).contains(&params.max_length) {
            return Err(EngineError::InvalidParameter(format!(
                "max_length must be between {} and {}",
                l_min, l_max
            )));
        }
        Ok(())
    }

    /// One generation attempt, bounded by the configured timeout. Failure,
    /// timeout and rejection all end in a curated fallback; nothing is
    /// retried.
    async fn generate(
        &self,
        text: &str,
        intent: Intent,
        mood: Mood,
        history: &[Turn],
        params: &GenerationParams,
    ) -> Candidate {
        let attempt = tokio::time::timeout(
            self.settings.generation_timeout,
            self.generator.generate(text, mood, intent, history, params),
        )
        .await;

        match attempt {
            Ok(Ok(candidate)) => match self.quality.evaluate(&candidate.text, text) {
                Verdict::Accept => candidate,
                Verdict::Reject(reason) => {
                    tracing::warn!("Rejected {} candidate: {}", candidate.source, reason);
                    self.fallback(intent, mood, Source::FallbackAfterRejection, REJECTION_FALLBACK_CONFIDENCE)
                }
            },
            Ok(Err(e)) => {
                tracing::warn!("Generation failed: {:#}", e);
                self.fallback(intent, mood, Source::Fallback, FALLBACK_CONFIDENCE)
            }
            Err(_) => {
                tracing::warn!(
                    "Generation timed out after {:?}",
                    self.settings.generation_timeout
                );
                self.fallback(intent, mood, Source::Fallback, FALLBACK_CONFIDENCE)
            }
        }
    }

    fn fallback(&self, intent: Intent, mood: Mood, source: Source, confidence: f32) -> Candidate {
        let text = self
            .random
            .with(|rng| self.bank.fallback(intent, mood, rng).to_string());
        Candidate::new(text, source, confidence)
    }

    pub async fn status(&self) -> EngineStatus {
        EngineStatus {
            model_available: self.generator.is_available(),
            generator: self.generator.name().to_string(),
            model_info: self.generator.info(),
            catalog_size: self.recommender.catalog().len(),
            templates: self.bank.len(),
            active_histories: self.store.active_users().await,
            total_turns: self.store.total_turns().await,
        }
    }

    pub async fn history(&self, user_id: &str) -> Vec<Turn> {
        self.store.read(user_id).await
    }

    pub async fn clear_history(&self, user_id: &str) {
        self.store.clear(user_id).await;
        tracing::info!("Cleared conversation history for {}", user_id);
    }
}
