//! Mood-based content recommendation over the loaded catalog.

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use sardonic_core::classifier::mentions_music;
use sardonic_core::{ContentCatalog, ContentItem, Intent, Mood};
use std::fmt::Write;
use std::sync::{Arc, LazyLock};

static ITEM_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\d+\. ".+" by "#).unwrap());

pub const DEFAULT_LIMIT: usize = 3;

/// Tags used when a mood has no mapping of its own.
pub const BROAD_TAGS: &[Mood] = &[Mood::Happy, Mood::Chill, Mood::Energetic, Mood::Relaxed];

/// Fixed mood → catalog tag mapping.
pub fn tags_for(mood: Mood) -> &'static [Mood] {
    match mood {
        Mood::Happy => &[Mood::Happy, Mood::Energetic],
        Mood::Sad => &[Mood::Sad, Mood::Relaxed],
        Mood::Angry => &[Mood::Angry, Mood::Energetic],
        Mood::Bored => &[Mood::Chill, Mood::Relaxed],
        Mood::Energetic => &[Mood::Energetic, Mood::Happy],
        Mood::Chill => &[Mood::Chill, Mood::Relaxed],
        Mood::Focus => &[Mood::Focus, Mood::Chill],
        Mood::Relaxed => &[Mood::Relaxed, Mood::Chill],
        Mood::Confused | Mood::Neutral => BROAD_TAGS,
    }
}

fn framing_lines(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Sad => &[
            "Feeling down? Here's some music that understands your pain:",
            "Sad vibes detected. These might help, or at least keep you company:",
        ],
        Mood::Happy => &[
            "Someone's in a good mood! Let's keep that energy going:",
            "Happy? Fine. Here's a soundtrack to be insufferably cheerful to:",
        ],
        Mood::Angry => &[
            "Need to blow off some steam? Try these:",
            "Channel that rage into something productive, like these tracks:",
        ],
        Mood::Bored => &[
            "Bored? Here's something to fill the void in your life:",
            "Let me cure your boredom with some actual taste:",
        ],
        Mood::Energetic => &["Feeling pumped? These should keep you bouncing off the walls:"],
        Mood::Chill | Mood::Relaxed => &["Time to unwind. Here's something mellow:"],
        Mood::Focus => &["Trying to focus? These won't distract you. Much:"],
        Mood::Confused | Mood::Neutral => &[
            "Here are some songs that might suit your mood, whatever that is:",
            "I picked these for you. You're welcome in advance:",
        ],
    }
}

const NOTHING_FOUND: &str =
    "I looked everywhere and found nothing in my collection for that mood. Impressive, you've stumped me. Try describing it differently?";

pub struct RecommendationEngine {
    catalog: Arc<ContentCatalog>,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<ContentCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    /// Whether a request should take the recommendation path instead of
    /// generation.
    pub fn should_recommend(intent: Intent, text: &str) -> bool {
        intent == Intent::ContentRequest || mentions_music(text)
    }

    /// Up to `limit` items tagged for `mood`, in random order.
    pub fn recommend<R: Rng + ?Sized>(&self, mood: Mood, limit: usize, rng: &mut R) -> Vec<ContentItem> {
        let mut matches: Vec<&ContentItem> = self.catalog.with_tags(tags_for(mood)).collect();
        matches.shuffle(rng);
        matches.into_iter().take(limit).cloned().collect()
    }

    /// A framing sentence followed by one numbered line per item.
    pub fn format<R: Rng + ?Sized>(&self, items: &[ContentItem], mood: Mood, rng: &mut R) -> String {
        if items.is_empty() {
            return NOTHING_FOUND.to_string();
        }
        let framing = framing_lines(mood).choose(rng).copied().unwrap_or("Here you go:");
        let mut out = String::from(framing);
        for (i, item) in items.iter().enumerate() {
            let _ = write!(out, "\n{}. \"{}\" by {}", i + 1, item.title, item.artist);
            if !item.duration.is_empty() {
                let _ = write!(out, " ({})", item.duration);
            }
            if !item.locator.is_empty() {
                let _ = write!(out, " - {}", item.locator);
            }
        }
        out
    }

    /// Whether `text` carries at least one item line in the format
    /// [`format`](Self::format) produces.
    pub fn lists_items(text: &str) -> bool {
        ITEM_LINE_RE.is_match(text)
    }
}
