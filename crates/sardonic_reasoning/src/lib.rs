pub mod api_types;
pub mod engine;
pub mod generator;
pub mod llm;
pub mod prompts;
pub mod providers;
pub mod quality;
pub mod recommend;
pub mod response_bank;

pub use engine::{ChatReply, ChatRequest, EngineSettings, EngineStatus, HistoryEntry, ResponseEngine};
pub use generator::{GenerationParams, Generator, ModelGenerator, TemplateGenerator};
pub use llm::LlmClient;
pub use quality::QualityGate;
pub use recommend::RecommendationEngine;
pub use response_bank::ResponseBank;
