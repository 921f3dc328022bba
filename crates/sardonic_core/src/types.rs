use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// Intent / Mood
// ============================================================================

/// Coarse category of what the user is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Identity,
    IdentityClaim,
    Friendship,
    Insult,
    Confusion,
    Question,
    ContentRequest,
    General,
}

impl Intent {
    pub const ALL: [Intent; 9] = [
        Intent::Greeting,
        Intent::Identity,
        Intent::IdentityClaim,
        Intent::Friendship,
        Intent::Insult,
        Intent::Confusion,
        Intent::Question,
        Intent::ContentRequest,
        Intent::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Identity => "identity",
            Intent::IdentityClaim => "identity_claim",
            Intent::Friendship => "friendship",
            Intent::Insult => "insult",
            Intent::Confusion => "confusion",
            Intent::Question => "question",
            Intent::ContentRequest => "content_request",
            Intent::General => "general",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|i| i.as_str() == s)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse affect category inferred from wording, independent of [`Intent`].
///
/// Also used as the tag on catalog items, which is why parsing is
/// case-insensitive ("Sad" and "sad" are the same mood).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Bored,
    Energetic,
    Chill,
    Focus,
    Relaxed,
    Confused,
    Neutral,
}

impl Mood {
    pub const ALL: [Mood; 10] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Angry,
        Mood::Bored,
        Mood::Energetic,
        Mood::Chill,
        Mood::Focus,
        Mood::Relaxed,
        Mood::Confused,
        Mood::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Bored => "bored",
            Mood::Energetic => "energetic",
            Mood::Chill => "chill",
            Mood::Focus => "focus",
            Mood::Relaxed => "relaxed",
            Mood::Confused => "confused",
            Mood::Neutral => "neutral",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive mood deserializer for catalog files.
pub fn deserialize_mood_tag<'de, D>(deserializer: D) -> Result<Mood, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Mood::parse_str(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unknown mood tag '{}'", raw)))
}

// ============================================================================
// Turns
// ============================================================================

/// One stored exchange. Immutable once appended to a history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub user_text: String,
    pub bot_text: String,
    pub intent: Intent,
    pub mood: Mood,
    /// Unix timestamp (seconds)
    pub timestamp: i64,
    /// Whether the bot reply carried catalog recommendations.
    #[serde(default)]
    pub recommended: bool,
}

impl Turn {
    pub fn new(user_text: &str, bot_text: &str, intent: Intent, mood: Mood) -> Self {
        Self {
            user_text: user_text.to_string(),
            bot_text: bot_text.to_string(),
            intent,
            mood,
            timestamp: chrono::Utc::now().timestamp(),
            recommended: false,
        }
    }

    pub fn with_recommendations(mut self, recommended: bool) -> Self {
        self.recommended = recommended;
        self
    }
}

// ============================================================================
// Content
// ============================================================================

/// A recommendable catalog entry (a song).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(alias = "mood", deserialize_with = "deserialize_mood_tag")]
    pub mood_tag: Mood,
    #[serde(default)]
    pub duration: String,
    #[serde(alias = "youtubeUrl", alias = "url", default)]
    pub locator: String,
}

// ============================================================================
// Candidates
// ============================================================================

/// Which tier produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Template,
    Generated,
    Fallback,
    FallbackAfterRejection,
    ShortCircuit,
    Recommendation,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Template => "template",
            Source::Generated => "generated",
            Source::Fallback => "fallback",
            Source::FallbackAfterRejection => "fallback_after_rejection",
            Source::ShortCircuit => "short_circuit",
            Source::Recommendation => "recommendation",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Source::Fallback | Source::FallbackAfterRejection)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated reply that has not yet passed the quality gate.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub text: String,
    pub source: Source,
    pub confidence: f32,
}

impl Candidate {
    pub fn new(text: impl Into<String>, source: Source, confidence: f32) -> Self {
        Self {
            text: text.into(),
            source,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}
