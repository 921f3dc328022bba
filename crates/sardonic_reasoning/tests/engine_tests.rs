//! Integration tests for the ResponseEngine.
//!
//! Generators are swapped for stubs (echoing, failing, slow) and a scripted
//! MockLlmClient so every path of the request flow can be driven without a
//! real model.

use anyhow::Result;
use async_trait::async_trait;
use sardonic_core::{
    Candidate, ContentCatalog, EngineError, Intent, Mood, RandomSource, SardonicConfig, Source, Turn,
};
use sardonic_memory::ConversationStore;
use sardonic_reasoning::api_types::{Message, MessagesResponse};
use sardonic_reasoning::engine::{ChatRequest, EngineSettings, HistoryEntry, ResponseEngine};
use sardonic_reasoning::generator::{GenerationParams, Generator, ModelGenerator};
use sardonic_reasoning::llm::{CompletionParams, LlmClient};
use sardonic_reasoning::ResponseBank;
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::Mutex;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Returns pre-configured responses in order; an exhausted queue yields an
/// empty completion.
struct MockLlmClient {
    responses: Mutex<Vec<MessagesResponse>>,
    call_count: AtomicUsize,
    seen_params: Arc<Mutex<Vec<CompletionParams>>>,
}

impl MockLlmClient {
    fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(MessagesResponse::from_text).collect()),
            call_count: AtomicUsize::new(0),
            seen_params: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        _system: &str,
        _messages: Vec<Message>,
        params: CompletionParams,
    ) -> Result<MessagesResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.seen_params.lock().await.push(params);
        let mut queue = self.responses.lock().await;
        if queue.is_empty() {
            Ok(MessagesResponse::from_text(""))
        } else {
            Ok(queue.remove(0))
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// Generator stubs
// ============================================================================

/// Hands the user's input straight back.
struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    fn info(&self) -> Value {
        json!({"model_type": "echo"})
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        text: &str,
        _mood: Mood,
        _intent: Intent,
        _history: &[Turn],
        _params: &GenerationParams,
    ) -> Result<Candidate> {
        Ok(Candidate::new(text, Source::Generated, 0.9))
    }
}

struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    fn info(&self) -> Value {
        json!({"model_type": "failing"})
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn generate(
        &self,
        _text: &str,
        _mood: Mood,
        _intent: Intent,
        _history: &[Turn],
        _params: &GenerationParams,
    ) -> Result<Candidate> {
        anyhow::bail!("model is down")
    }
}

struct SlowGenerator;

#[async_trait]
impl Generator for SlowGenerator {
    fn name(&self) -> &str {
        "slow"
    }

    fn info(&self) -> Value {
        json!({"model_type": "slow"})
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        _text: &str,
        _mood: Mood,
        _intent: Intent,
        _history: &[Turn],
        _params: &GenerationParams,
    ) -> Result<Candidate> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Candidate::new("Finally done thinking about that one.", Source::Generated, 0.9))
    }
}

// ============================================================================
// Helpers
// ============================================================================

const SAD_CATALOG: &str = r#"[
    {"id": "s1", "title": "Someone Like You", "artist": "Adele", "mood": "Sad", "duration": "4:45",
     "youtubeUrl": "https://www.youtube.com/watch?v=hLQl3WQQoQ0"},
    {"id": "s2", "title": "Fix You", "artist": "Coldplay", "mood": "Sad", "duration": "4:55",
     "youtubeUrl": "https://www.youtube.com/watch?v=k4V3Mo61fJM"}
]"#;

const FOCUS_CATALOG: &str = r#"[
    {"id": "f1", "title": "Weightless", "artist": "Marconi Union", "mood": "focus", "duration": "8:09"},
    {"id": "f2", "title": "Clair de Lune", "artist": "Claude Debussy", "mood": "focus", "duration": "5:12"}
]"#;

const MIXED_CATALOG: &str = r#"[
    {"id": "h1", "title": "Happy", "artist": "Pharrell Williams", "mood": "happy", "duration": "3:53"},
    {"id": "c1", "title": "Weightless", "artist": "Marconi Union", "mood": "chill", "duration": "8:09"},
    {"id": "e1", "title": "Can't Stop", "artist": "Red Hot Chili Peppers", "mood": "energetic", "duration": "4:29"}
]"#;

const MUSIC_ACK: &str = "Glad you liked the songs I picked, obviously.";
const GENERIC_ACK: &str = "Such a thrilling reply, I am on the edge of my seat.";

fn test_bank() -> ResponseBank {
    let overlay = json!({
        "ack_music": [MUSIC_ACK],
        "ack_generic": [GENERIC_ACK],
    });
    ResponseBank::from_json_str(&overlay.to_string()).unwrap()
}

fn store(cap: usize) -> Arc<ConversationStore> {
    Arc::new(ConversationStore::new(cap))
}

fn count_items(response: &str) -> usize {
    response
        .lines()
        .filter(|line| line.split_once(". \"").is_some_and(|(n, _)| n.parse::<usize>().is_ok()))
        .count()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_sad_music_request_round_trip() {
    let engine = ResponseEngine::builder(store(15))
        .catalog(ContentCatalog::from_json_str(SAD_CATALOG).unwrap())
        .random(RandomSource::fixed(1))
        .build();

    let reply = engine
        .respond(ChatRequest::new("I'm feeling sad, suggest some music").for_user("alice"))
        .await
        .unwrap();

    assert_eq!(reply.intent_detected, Intent::ContentRequest);
    assert_eq!(reply.mood_detected, Mood::Sad);
    assert_eq!(reply.source, Source::Recommendation);
    assert_eq!(reply.has_recommendations, Some(true));
    assert_eq!(count_items(&reply.response), 2);
    assert!(reply.response.contains("\"Fix You\" by Coldplay (4:55)"));

    let history = engine.history("alice").await;
    assert_eq!(history.len(), 1);
    assert!(history[0].recommended);
}

#[tokio::test]
async fn test_recommendation_with_no_matching_items() {
    let engine = ResponseEngine::builder(store(15))
        .catalog(ContentCatalog::from_json_str(SAD_CATALOG).unwrap())
        .random(RandomSource::fixed(1))
        .build();

    let reply = engine
        .respond(ChatRequest::new("I'm so happy, recommend a song"))
        .await
        .unwrap();

    assert_eq!(reply.mood_detected, Mood::Happy);
    assert_eq!(reply.has_recommendations, Some(false));
    assert_eq!(count_items(&reply.response), 0);
    assert!(!reply.response.is_empty());
}

#[tokio::test]
async fn test_content_request_beats_question() {
    let engine = ResponseEngine::builder(store(15))
        .catalog(ContentCatalog::from_json_str(MIXED_CATALOG).unwrap())
        .random(RandomSource::fixed(2))
        .build();

    let reply = engine
        .respond(ChatRequest::new("can you recommend a song?"))
        .await
        .unwrap();

    assert_eq!(reply.intent_detected, Intent::ContentRequest);
    assert_eq!(reply.source, Source::Recommendation);
    assert_eq!(count_items(&reply.response), 3);
}

#[tokio::test]
async fn test_acknowledgement_after_recommendation_mentions_music() {
    let engine = ResponseEngine::builder(store(15))
        .catalog(ContentCatalog::from_json_str(MIXED_CATALOG).unwrap())
        .bank(test_bank())
        .random(RandomSource::fixed(3))
        .build();

    let first = engine
        .respond(ChatRequest::new("suggest songs").for_user("bob"))
        .await
        .unwrap();
    assert_eq!(first.has_recommendations, Some(true));

    let second = engine.respond(ChatRequest::new("ok").for_user("bob")).await.unwrap();
    assert_eq!(second.source, Source::ShortCircuit);
    assert_eq!(second.response, MUSIC_ACK);
    assert_eq!(engine.history("bob").await.len(), 2);
}

#[tokio::test]
async fn test_acknowledgement_without_recommendation_is_generic() {
    let engine = ResponseEngine::builder(store(15))
        .bank(test_bank())
        .random(RandomSource::fixed(4))
        .build();

    engine
        .respond(ChatRequest::new("hello there").for_user("carol"))
        .await
        .unwrap();
    let reply = engine.respond(ChatRequest::new("Cool!").for_user("carol")).await.unwrap();
    assert_eq!(reply.source, Source::ShortCircuit);
    assert_eq!(reply.response, GENERIC_ACK);

    // No prior turn at all
    let reply = engine.respond(ChatRequest::new("ok").for_user("dave")).await.unwrap();
    assert_eq!(reply.response, GENERIC_ACK);
}

#[tokio::test]
async fn test_acknowledgement_uses_client_history_when_anonymous() {
    let engine = ResponseEngine::builder(store(15))
        .catalog(ContentCatalog::from_json_str(FOCUS_CATALOG).unwrap())
        .bank(test_bank())
        .random(RandomSource::fixed(5))
        .build();

    let first = engine
        .respond(ChatRequest::new("need to focus, suggest songs"))
        .await
        .unwrap();
    assert_eq!(first.source, Source::Recommendation);
    assert_eq!(first.mood_detected, Mood::Focus);
    assert!(first.response.starts_with("Trying to focus?"));

    // The client echoes the engine's own reply back as its history
    let request = ChatRequest::new("ok").with_history(vec![HistoryEntry {
        user: "need to focus, suggest songs".to_string(),
        bot: first.response,
    }]);
    let reply = engine.respond(request).await.unwrap();
    assert_eq!(reply.source, Source::ShortCircuit);
    assert_eq!(reply.response, MUSIC_ACK);
}

#[tokio::test]
async fn test_acknowledgement_after_empty_recommendation_is_generic() {
    let engine = ResponseEngine::builder(store(15))
        .bank(test_bank())
        .random(RandomSource::fixed(5))
        .build();

    let first = engine.respond(ChatRequest::new("suggest songs")).await.unwrap();
    assert_eq!(first.has_recommendations, Some(false));

    let request = ChatRequest::new("ok").with_history(vec![HistoryEntry {
        user: "suggest songs".to_string(),
        bot: first.response,
    }]);
    let reply = engine.respond(request).await.unwrap();
    assert_eq!(reply.response, GENERIC_ACK);
}

#[tokio::test]
async fn test_echoing_generator_falls_back_after_rejection() {
    let engine = ResponseEngine::builder(store(15))
        .generator(Arc::new(EchoGenerator))
        .random(RandomSource::fixed(6))
        .build();

    let reply = engine
        .respond(ChatRequest::new("tell me something about penguins").for_user("erin"))
        .await
        .unwrap();

    assert_eq!(reply.source, Source::FallbackAfterRejection);
    assert_ne!(reply.source, Source::Generated);
    assert_eq!(reply.confidence, 0.6);
    assert_ne!(reply.response, "tell me something about penguins");
}

#[tokio::test]
async fn test_generation_error_falls_back() {
    let engine = ResponseEngine::builder(store(15))
        .generator(Arc::new(FailingGenerator))
        .random(RandomSource::fixed(7))
        .build();

    let reply = engine.respond(ChatRequest::new("hello")).await.unwrap();
    assert_eq!(reply.source, Source::Fallback);
    assert_eq!(reply.confidence, 0.5);
    assert!(!engine.status().await.model_available);
}

#[tokio::test(start_paused = true)]
async fn test_generation_timeout_falls_back() {
    let settings = EngineSettings {
        generation_timeout: Duration::from_secs(2),
        ..EngineSettings::default()
    };
    let engine = ResponseEngine::builder(store(15))
        .generator(Arc::new(SlowGenerator))
        .settings(settings)
        .random(RandomSource::fixed(8))
        .build();

    let reply = engine.respond(ChatRequest::new("why is the sky blue")).await.unwrap();
    assert_eq!(reply.source, Source::Fallback);
    assert_eq!(reply.intent_detected, Intent::Question);
}

#[tokio::test]
async fn test_model_reply_is_accepted_and_persisted() {
    let client = MockLlmClient::new(vec![
        "Mr. Sarcastic: Penguins wear tuxedos everywhere and still never get invited anywhere.",
    ]);
    let engine = ResponseEngine::builder(store(15))
        .generator(Arc::new(ModelGenerator::new(Box::new(client))))
        .build();

    let reply = engine
        .respond(ChatRequest::new("tell me about penguins").for_user("frank"))
        .await
        .unwrap();

    assert_eq!(reply.source, Source::Generated);
    assert_eq!(
        reply.response,
        "Penguins wear tuxedos everywhere and still never get invited anywhere."
    );
    assert_eq!(reply.model_info["model_name"], "scripted");

    let history = engine.history("frank").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].bot_text, reply.response);
}

#[tokio::test]
async fn test_configured_sampling_reaches_the_model() {
    let client = MockLlmClient::new(vec![
        "Penguins wear tuxedos everywhere and still never get invited anywhere.",
        "Fine, a longer answer, since you insist on being so demanding today.",
    ]);
    let seen = client.seen_params.clone();
    let mut config = SardonicConfig::default();
    config.llm.temperature = 0.9;
    config.llm.max_length = 200;
    let engine = ResponseEngine::builder(store(15))
        .generator(Arc::new(ModelGenerator::new(Box::new(client))))
        .settings(EngineSettings::from(&config))
        .build();

    engine.respond(ChatRequest::new("tell me about penguins")).await.unwrap();

    let mut request = ChatRequest::new("tell me more about penguins");
    request.temperature = Some(1.3);
    engine.respond(request).await.unwrap();

    let seen = seen.lock().await;
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].temperature, 0.9);
    assert_eq!(seen[0].max_tokens, 200);
    assert_eq!(seen[1].temperature, 1.3);
    assert_eq!(seen[1].max_tokens, 200);
}

#[tokio::test]
async fn test_empty_model_output_is_rejected() {
    let client = MockLlmClient::new(vec![]);
    let engine = ResponseEngine::builder(store(15))
        .generator(Arc::new(ModelGenerator::new(Box::new(client))))
        .random(RandomSource::fixed(9))
        .build();

    let reply = engine.respond(ChatRequest::new("tell me a story")).await.unwrap();
    assert!(reply.source.is_fallback());
}

#[tokio::test]
async fn test_empty_input_changes_nothing() {
    let engine = ResponseEngine::builder(store(15)).build();
    engine.respond(ChatRequest::new("hello").for_user("gina")).await.unwrap();

    let err = engine.respond(ChatRequest::new("").for_user("gina")).await.unwrap_err();
    assert_eq!(err, EngineError::EmptyMessage);
    assert_eq!(engine.history("gina").await.len(), 1);

    let err = engine.respond(ChatRequest::new("").for_user("nobody")).await.unwrap_err();
    assert_eq!(err, EngineError::EmptyMessage);
    assert_eq!(engine.status().await.active_histories, 1);
}

#[tokio::test]
async fn test_anonymous_requests_keep_no_history() {
    let engine = ResponseEngine::builder(store(15)).build();
    for text in ["hello", "who are you", "ok"] {
        engine.respond(ChatRequest::new(text)).await.unwrap();
    }
    let status = engine.status().await;
    assert_eq!(status.active_histories, 0);
    assert_eq!(status.total_turns, 0);
}

#[tokio::test]
async fn test_history_is_bounded_and_clearable() {
    let engine = ResponseEngine::builder(store(3)).build();
    for i in 0..5 {
        engine
            .respond(ChatRequest::new(format!("message number {}", i)).for_user("hank"))
            .await
            .unwrap();
    }
    let history = engine.history("hank").await;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].user_text, "message number 2");
    assert_eq!(history[2].user_text, "message number 4");

    engine.clear_history("hank").await;
    assert!(engine.history("hank").await.is_empty());
}

#[tokio::test]
async fn test_users_are_isolated() {
    let engine = ResponseEngine::builder(store(15)).build();
    engine.respond(ChatRequest::new("hello").for_user("ivy")).await.unwrap();
    engine.respond(ChatRequest::new("hey").for_user("jack")).await.unwrap();
    engine.respond(ChatRequest::new("who are you").for_user("jack")).await.unwrap();

    assert_eq!(engine.history("ivy").await.len(), 1);
    assert_eq!(engine.history("jack").await.len(), 2);
    assert_eq!(engine.status().await.total_turns, 3);
}
