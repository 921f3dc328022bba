use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SardonicConfig {
    pub engine: EngineConfig,
    pub llm: LlmConfig,
    pub quality: QualityConfig,
    pub catalog: CatalogConfig,
    pub responses: ResponsesConfig,
    pub gateway: GatewayConfig,
}

impl SardonicConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: SardonicConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SARDONIC_LLM_PROVIDER") {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("SARDONIC_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(v);
        }
        if let Ok(v) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(n) = v.parse() {
                self.llm.temperature = n;
            }
        }
        if let Ok(v) = std::env::var("LLM_MAX_LENGTH") {
            if let Ok(n) = v.parse() {
                self.llm.max_length = n;
            }
        }
        if let Ok(v) = std::env::var("SARDONIC_HISTORY_CAP") {
            if let Ok(n) = v.parse() {
                self.engine.history_cap = n;
            }
        }
        if let Ok(v) = std::env::var("SARDONIC_GENERATION_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.engine.generation_timeout_secs = n;
            }
        }
        if let Ok(v) = std::env::var("SARDONIC_SEED") {
            if let Ok(n) = v.parse() {
                self.engine.seed = Some(n);
            }
        }
        if let Ok(v) = std::env::var("SARDONIC_CATALOG") {
            self.catalog.path = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("SARDONIC_PORT") {
            if let Ok(n) = v.parse() {
                self.gateway.port = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Turns kept per user before the oldest is evicted.
    pub history_cap: usize,
    /// Items per recommendation reply.
    pub recommendation_limit: usize,
    pub max_message_chars: usize,
    /// Upper bound on a model-backed generation attempt.
    pub generation_timeout_secs: u64,
    /// Fixed seed for template/recommendation selection (tests, demos).
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_cap: 15,
            recommendation_limit: 3,
            max_message_chars: 1000,
            generation_timeout_secs: 10,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// "template", "mock", "openai", "grok" or "ollama".
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    /// Name of the env var holding the API key.
    pub api_key_env: Option<String>,
    pub temperature: f32,
    pub max_length: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "template".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            api_key_env: None,
            temperature: 0.8,
            max_length: 150,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub min_chars: usize,
    /// Output must be at least this multiple of the input length when it
    /// contains the input verbatim.
    pub echo_ratio: f32,
    pub min_unique_ratio: f32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_chars: 10,
            echo_ratio: 1.5,
            min_unique_ratio: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResponsesConfig {
    /// Optional JSON file overlaying the builtin response bank.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8001,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
