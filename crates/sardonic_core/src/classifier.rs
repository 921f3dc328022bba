//! Keyword-based intent and mood classification.
//!
//! Both axes are decided by ordered rule tables: the first category whose
//! keyword list matches wins. The order is a precedence, not an accident,
//! so overlapping triggers resolve the same way every time.

use crate::types::{Intent, Mood, Turn};

/// One rule: a category and the keywords that select it.
pub type Rule<C> = (C, &'static [&'static str]);

/// Intent rules in precedence order.
pub const INTENT_RULES: &[Rule<Intent>] = &[
    (
        Intent::ContentRequest,
        &[
            "suggest", "recommend", "recommendation", "recommendations", "song", "songs",
            "music", "playlist", "play something", "something to listen", "what should i listen",
        ],
    ),
    (
        Intent::Insult,
        &[
            "shut up", "fuck off", "stupid", "dumb", "hate you", "asshole", "idiot", "useless",
            "you suck",
        ],
    ),
    (
        Intent::IdentityClaim,
        &[
            "i am him", "i'm him", "iam him", "i made you", "i created you", "i built you",
            "i'm your creator", "i am your creator",
        ],
    ),
    (
        Intent::Identity,
        &[
            "who are you", "who made you", "who created you", "your creator", "creator",
            "your name", "who am i", "are you a bot", "are you real", "are you human",
        ],
    ),
    (
        Intent::Friendship,
        &[
            "be my friend", "be your friend", "be friends", "friendship", "best friend", "friends",
        ],
    ),
    (
        Intent::Confusion,
        &[
            "do you even understand", "understand me", "what are you talking about",
            "talking about", "makes no sense", "don't get it", "dont get it", "confused", "confusing",
        ],
    ),
    (
        Intent::Greeting,
        &[
            "hello", "hi", "hey", "sup", "yo", "howdy", "greetings", "what's up", "whats up",
            "good morning", "good evening",
        ],
    ),
    (
        Intent::Question,
        &["?", "how", "what", "why", "when", "where", "who", "which"],
    ),
];

/// Mood rules in precedence order.
pub const MOOD_RULES: &[Rule<Mood>] = &[
    (
        Mood::Sad,
        &[
            "sad", "depressed", "feel down", "feeling down", "unhappy", "crying", "upset",
            "feel bad", "miserable", "lonely", "heartbroken",
        ],
    ),
    (
        Mood::Angry,
        &["angry", "mad", "furious", "pissed", "annoyed", "frustrated", "rage", "hate"],
    ),
    (
        Mood::Happy,
        &["happy", "excited", "joy", "great", "awesome", "fantastic", "wonderful", "amazing", "good"],
    ),
    (Mood::Bored, &["bored", "boring", "dull", "nothing to do", "meh"]),
    (
        Mood::Energetic,
        &["energetic", "pumped", "hyped", "hype", "workout", "gym", "party", "dance"],
    ),
    (
        Mood::Chill,
        &["chill", "chilling", "lofi", "lo-fi", "calm", "mellow", "vibe", "vibes"],
    ),
    (
        Mood::Focus,
        &["focus", "study", "studying", "concentrate", "productive", "homework", "coding"],
    ),
    (
        Mood::Relaxed,
        &["relax", "relaxed", "relaxing", "sleepy", "tired", "peaceful", "unwind"],
    ),
    (
        Mood::Confused,
        &["confused", "confusing", "don't understand", "dont understand", "makes no sense", "lost", "huh"],
    ),
];

/// Low-content tokens that bypass generation entirely.
pub const SHORT_ACKNOWLEDGEMENTS: &[&str] = &[
    "ok", "okay", "k", "kk", "cool", "bruh", "nice", "sure", "alright", "lol", "hmm", "yeah", "fine",
];

const MUSIC_WORDS: &[&str] = &[
    "music", "song", "songs", "playlist", "tune", "tunes", "track", "tracks", "beats", "jams",
    "album", "listen",
];

/// Lower-cased word tokens. Apostrophes stay inside words ("i'm").
fn tokenize(lower: &str) -> Vec<&str> {
    lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect()
}

/// Single alphabetic keywords match whole words; anything else is a phrase
/// and matches as a substring.
fn keyword_matches(lower: &str, tokens: &[&str], keyword: &str) -> bool {
    if keyword.chars().all(char::is_alphabetic) {
        tokens.contains(&keyword)
    } else {
        lower.contains(keyword)
    }
}

fn first_match<C: Copy>(rules: &[Rule<C>], lower: &str, tokens: &[&str]) -> Option<C> {
    rules
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| keyword_matches(lower, tokens, k)))
        .map(|(category, _)| *category)
}

/// Intent by keyword precedence; `General` when nothing matches.
pub fn detect_intent(text: &str) -> Intent {
    let lower = text.to_lowercase();
    let tokens = tokenize(&lower);
    first_match(INTENT_RULES, &lower, &tokens).unwrap_or(Intent::General)
}

/// Mood by keyword precedence; `None` when nothing matches.
pub fn detect_mood(text: &str) -> Option<Mood> {
    let lower = text.to_lowercase();
    let tokens = tokenize(&lower);
    first_match(MOOD_RULES, &lower, &tokens)
}

/// Classify an utterance.
///
/// `recent_history` only matters for short acknowledgements with no mood
/// wording of their own: those carry the previous turn's mood forward.
pub fn classify(text: &str, recent_history: &[Turn]) -> (Intent, Mood) {
    let intent = detect_intent(text);
    let mood = match detect_mood(text) {
        Some(mood) => mood,
        None if is_short_acknowledgement(text) => recent_history
            .last()
            .map(|turn| turn.mood)
            .unwrap_or(Mood::Neutral),
        None => Mood::Neutral,
    };
    (intent, mood)
}

/// Trimmed, lower-cased, trailing punctuation removed.
pub fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_lowercase()
}

pub fn is_short_acknowledgement(text: &str) -> bool {
    let normalized = normalize(text);
    SHORT_ACKNOWLEDGEMENTS.contains(&normalized.as_str())
}

/// A mood word next to a music word ("some chill beats") reads as a
/// request even when the intent rules did not catch it.
pub fn mentions_music(text: &str) -> bool {
    let lower = text.to_lowercase();
    let tokens = tokenize(&lower);
    let has_music = MUSIC_WORDS.iter().any(|w| tokens.contains(w));
    has_music && first_match(MOOD_RULES, &lower, &tokens).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_request_beats_question() {
        assert_eq!(detect_intent("what songs make you happy"), Intent::ContentRequest);
        assert_eq!(detect_intent("can you recommend something?"), Intent::ContentRequest);
        assert_eq!(detect_intent("why is the sky blue?"), Intent::Question);
    }

    #[test]
    fn test_insult_beats_anger() {
        let (intent, mood) = classify("I hate you, you idiot", &[]);
        assert_eq!(intent, Intent::Insult);
        assert_eq!(mood, Mood::Angry);
    }

    #[test]
    fn test_identity_claim_beats_identity() {
        assert_eq!(detect_intent("I'm your creator, who are you?"), Intent::IdentityClaim);
        assert_eq!(detect_intent("who are you"), Intent::Identity);
    }

    #[test]
    fn test_greeting_is_whole_word() {
        assert_eq!(detect_intent("hi there"), Intent::Greeting);
        // "this" contains "hi" but is not a greeting
        assert_eq!(detect_intent("this is fine"), Intent::General);
    }

    #[test]
    fn test_confusion_not_swallowed_by_identity() {
        assert_eq!(detect_intent("what are you talking about"), Intent::Confusion);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(classify("the weather exists", &[]), (Intent::General, Mood::Neutral));
        assert_eq!(classify("", &[]), (Intent::General, Mood::Neutral));
    }

    #[test]
    fn test_mood_detection() {
        assert_eq!(detect_mood("I'm feeling sad today"), Some(Mood::Sad));
        assert_eq!(detect_mood("so bored right now"), Some(Mood::Bored));
        assert_eq!(detect_mood("need to focus on homework"), Some(Mood::Focus));
        assert_eq!(detect_mood("hello"), None);
    }

    #[test]
    fn test_phrases_do_not_fire_inside_other_phrases() {
        assert_eq!(detect_intent("I don't get it"), Intent::Confusion);
        assert_ne!(detect_intent("forget it"), Intent::Confusion);
        assert_eq!(detect_mood("feeling down lately"), Some(Mood::Sad));
        assert_eq!(detect_mood("calm down"), Some(Mood::Chill));
        assert_eq!(detect_mood("slow down"), None);
    }

    #[test]
    fn test_short_ack_carries_previous_mood() {
        let prev = Turn::new("I'm so sad", "aww", Intent::General, Mood::Sad);
        assert_eq!(classify("ok", &[prev.clone()]), (Intent::General, Mood::Sad));
        // Non-ack input ignores history
        assert_eq!(classify("the weather", &[prev]).1, Mood::Neutral);
    }

    #[test]
    fn test_short_ack_normalization() {
        assert!(is_short_acknowledgement("ok"));
        assert!(is_short_acknowledgement("  Okay!! "));
        assert!(is_short_acknowledgement("bruh."));
        assert!(!is_short_acknowledgement("ok but why"));
        assert!(!is_short_acknowledgement(""));
    }

    #[test]
    fn test_mentions_music() {
        assert!(mentions_music("I need some chill beats"));
        assert!(mentions_music("sad tunes please"));
        assert!(!mentions_music("play some tunes"));
        assert!(!mentions_music("I'm sad"));
    }

    #[test]
    fn test_round_trip_request_classification() {
        let (intent, mood) = classify("I'm feeling sad, suggest some music", &[]);
        assert_eq!(intent, Intent::ContentRequest);
        assert_eq!(mood, Mood::Sad);
    }
}
