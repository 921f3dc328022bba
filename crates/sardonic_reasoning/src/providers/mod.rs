pub mod mock;
pub mod openai;

pub use mock::MockProvider;
pub use openai::OpenAiClient;

use crate::llm::LlmClient;
use anyhow::Result;
use sardonic_core::config::LlmConfig;
use std::time::Duration;

/// Build the LLM client named by `config.provider`.
///
/// Returns `None` for the template-only setup, where no model is wired in.
pub fn create_client(config: &LlmConfig, timeout: Duration) -> Result<Option<Box<dyn LlmClient>>> {
    let (default_url, default_key_env) = match config.provider.as_str() {
        "template" | "none" => return Ok(None),
        "mock" => return Ok(Some(Box::new(MockProvider::new(&config.model)))),
        "openai" => ("https://api.openai.com/v1", Some("OPENAI_API_KEY")),
        "grok" => ("https://api.x.ai/v1", Some("GROK_API_KEY")),
        "ollama" => ("http://localhost:11434/v1", None),
        other => anyhow::bail!("Unknown LLM provider: {}", other),
    };

    let base_url = config.base_url.as_deref().unwrap_or(default_url);
    let key_env = config.api_key_env.as_deref().or(default_key_env);
    let api_key = key_env.and_then(|name| std::env::var(name).ok());
    if key_env.is_some() && api_key.is_none() {
        tracing::warn!(
            "No API key found for provider '{}'; requests will likely be rejected",
            config.provider
        );
    }

    tracing::info!("Using {} provider at {} (model {})", config.provider, base_url, config.model);
    let client = OpenAiClient::new(&config.model, base_url, api_key, timeout)?;
    Ok(Some(Box::new(client)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.to_string(),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_template_has_no_client() {
        let client = create_client(&cfg("template"), Duration::from_secs(1)).unwrap();
        assert!(client.is_none());
    }

    #[test]
    fn test_mock_and_ollama_clients() {
        let mock = create_client(&cfg("mock"), Duration::from_secs(1)).unwrap().unwrap();
        assert_eq!(mock.model_name(), "gpt-4o-mini");
        let ollama = create_client(&cfg("ollama"), Duration::from_secs(1)).unwrap();
        assert!(ollama.is_some());
    }

    #[test]
    fn test_unknown_provider_errors() {
        assert!(create_client(&cfg("carrier-pigeon"), Duration::from_secs(1)).is_err());
    }
}
