use regex::Regex;
use sardonic_core::config::QualityConfig;
use sardonic_core::Candidate;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

static ARTIFACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|\W)(human|user|bot|ai|assistant|chatbot|mr\.\s*sarcastic)\s*:").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooShort,
    EchoesInput,
    Repetitive,
    SpeakerArtifact,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::TooShort => "too short",
            RejectReason::EchoesInput => "echoes the input",
            RejectReason::Repetitive => "repetitive",
            RejectReason::SpeakerArtifact => "speaker label artifact",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Heuristic accept/reject check for generated candidates.
#[derive(Debug, Clone, Default)]
pub struct QualityGate {
    config: QualityConfig,
}

impl QualityGate {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn accept(&self, candidate: &Candidate, user_text: &str) -> bool {
        self.evaluate(&candidate.text, user_text).is_accept()
    }

    pub fn evaluate(&self, output: &str, user_text: &str) -> Verdict {
        let output = output.trim();
        let out_len = output.chars().count();
        if out_len < self.config.min_chars {
            return Verdict::Reject(RejectReason::TooShort);
        }

        let out_lower = output.to_lowercase();
        let in_lower = user_text.trim().to_lowercase();
        if !in_lower.is_empty() && out_lower.contains(&in_lower) {
            let in_len = in_lower.chars().count() as f32;
            if (out_len as f32) < in_len * self.config.echo_ratio {
                return Verdict::Reject(RejectReason::EchoesInput);
            }
        }

        let tokens: Vec<&str> = out_lower.split_whitespace().collect();
        let unique: HashSet<&str> = tokens.iter().copied().collect();
        let unique_ratio = unique.len() as f32 / tokens.len().max(1) as f32;
        if unique_ratio < self.config.min_unique_ratio || tokens.windows(2).any(|w| w[0] == w[1]) {
            return Verdict::Reject(RejectReason::Repetitive);
        }

        if ARTIFACT_RE.is_match(output) {
            return Verdict::Reject(RejectReason::SpeakerArtifact);
        }

        Verdict::Accept
    }
}
