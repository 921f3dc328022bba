use sardonic_core::Turn;
use serde::{Deserialize, Serialize};

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_available: bool,
    pub catalog_size: usize,
    pub active_conversations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub user_id: String,
    pub history: Vec<Turn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub status: String,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sardonic_core::{Intent, Mood};

    #[test]
    fn test_history_response_serializes_turns() {
        let resp = HistoryResponse {
            user_id: "u1".into(),
            history: vec![Turn::new("hi", "oh, it's you", Intent::Greeting, Mood::Neutral)],
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["history"][0]["intent"], "greeting");
        assert_eq!(json["history"][0]["bot_text"], "oh, it's you");
    }

    #[test]
    fn test_error_body() {
        let json = serde_json::to_string(&ErrorBody::new("nope")).unwrap();
        assert_eq!(json, r#"{"error":"nope"}"#);
    }
}
