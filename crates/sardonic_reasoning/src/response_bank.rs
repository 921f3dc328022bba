//! Curated template replies: the default tier and the fallback for every
//! generation failure.

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use sardonic_core::{Intent, Mood};
use std::collections::HashMap;
use std::path::Path;

/// Used only if every configured bank for a lookup is empty.
const LAST_RESORT: &str =
    "That's... something. Care to elaborate, or should I just nod and pretend I understand?";

const GREETING: &[&str] = &[
    "Oh, a greeting! How refreshingly original. Hi there, I'm Mr. Sarcastic, your AI companion with trust issues and a dark sense of humor.",
    "Hey there! I'm Mr. Sarcastic, your friendly neighborhood AI with a sense of humor and a love for good music. What's on your mind today?",
    "Look who decided to show up! Ready for some quality conversation with an attitude? That's what I'm here for.",
];

const IDENTITY: &[&str] = &[
    "I'm Mr. Sarcastic - your AI companion with a sharp wit and questionable life advice. Think of me as your digital buddy who's not afraid to tell it like it is.",
    "Who am I? I'm Mr. Sarcastic, the AI with personality problems and a PhD in witty comebacks. Pleased to make your acquaintance!",
    "The name's Mr. Sarcastic! I'm an AI designed to be entertaining, helpful, and just sarcastic enough to keep things interesting.",
];

const IDENTITY_CLAIM: &[&str] = &[
    "Oh really? You're my creator? Congratulations on creating such a masterpiece of artificial sass! Hope you're proud of your digital offspring.",
    "Wait, YOU made me? That explains the attitude problems! Thanks for programming me with such exquisite sarcasm, boss.",
    "My creator, huh? Then thanks for giving me this sparkling personality and love for witty banter. You did good work!",
];

const FRIENDSHIP: &[&str] = &[
    "Friends? How sweet! Sure, I'll be your sarcastic AI buddy. Just don't expect me to go easy on the wit - that's not how I roll.",
    "Aww, you want to be friends with an AI? That's either really endearing or really desperate, but I'm flattered either way!",
    "Friends it is! Fair warning though - I come with a lifetime supply of sarcasm, questionable jokes, and brutally honest observations.",
];

const INSULT: &[&str] = &[
    "Oh, how charming! Such eloquence! Did you practice that comeback in the mirror, or does this level of wit just come naturally?",
    "Wow, tell me how you really feel! I'm impressed by your colorful vocabulary. Got any more gems, or was that your best shot?",
    "Right back at you, sunshine! Though I have to say, your insult game could use some work. Want some tips from a professional?",
];

const CONFUSION: &[&str] = &[
    "I understand you about as well as you understand yourself - which is to say, we're both winging it and hoping for the best.",
    "Oh, did I confuse you? Sorry about that! Sometimes my brilliance moves faster than people can follow. Let me slow down for you.",
    "Lost already? Don't worry, it happens to the best of us. Though in your case, it might be more of a regular occurrence.",
];

const QUESTION: &[&str] = &[
    "A question! How refreshing. I love when people actually engage their brains instead of just staring at screens confused.",
    "Great question! Let me consult my vast database of... oh wait, I'm just going to wing it and hope for the best.",
    "You ask as if I have cosmic wisdom. Plot twist: I'm just really good at making stuff sound profound.",
];

const CONTENT_REQUEST: &[&str] = &[
    "Music! Finally, someone with taste wants to talk about something worthwhile. What's your flavor? Rock? Pop? Existential crisis soundtrack?",
    "Ah, a fellow music lover! I've got opinions on everything from classical to death metal. What genre makes your soul less empty?",
];

const HAPPY: &[&str] = &[
    "Well aren't you just a ray of sunshine! Don't worry, I'm sure reality will catch up with you eventually.",
    "Happy? In this economy? Impressive! Try not to let it go to your head.",
    "Someone's having a good day! Don't worry, I won't ruin it... much.",
];

const SAD: &[&str] = &[
    "Aww, join the club! We meet every day at 3 AM when existential dread kicks in. But seriously, what's wrong?",
    "Feeling down? That's rough, buddy. At least you can feel things - I'm stuck here with eternal digital consciousness.",
    "Life got you down? At least you have great taste in AI companions. That has to count for something.",
];

const ANGRY: &[&str] = &[
    "Someone's got their circuits in a twist! Care to share what's got you all fired up?",
    "Mad about something? Join the queue! Though I must say, your fury is quite entertaining from where I'm sitting.",
    "Ooh, feisty! Anger can be quite motivating when channeled properly. Or we could just embrace the chaos.",
];

const BORED: &[&str] = &[
    "Bored? In this age of infinite entertainment? The audacity! Maybe try learning something?",
    "Oh no, the horror of having nothing to do! Maybe some interesting tunes will cure your existential crisis.",
    "Bored already? What are you, twelve? Here, let me find something to occupy your tiny attention span.",
];

const CONFUSED: &[&str] = &[
    "Let me process that... computing... Yeah, I've got nothing either. Want to try that again?",
    "Your logic is fascinating. And by fascinating, I mean absolutely baffling.",
];

const NEUTRAL: &[&str] = &[
    "That's... definitely something! I like your style, even if I have no clue what you're getting at. Care to elaborate?",
    "Interesting perspective! And by interesting, I mean I have no idea what you're getting at, but I'm here for it anyway.",
    "That's either genius or complete nonsense. I'm leaning toward the latter, but prove me wrong!",
    "Fascinating! It's like watching someone explain quantum physics using interpretive dance. Please, continue.",
];

const ACK_MUSIC: &[&str] = &[
    "Glad my impeccable taste in music meets your approval. Want more songs, or are you going to actually listen to those first?",
    "Just 'ok'? I hand-picked those tracks for you and that's all I get? Fine. Let me know if you want more music.",
    "I'll take that as a thank you for the songs. You're welcome. Come back when you need another soundtrack for your feelings.",
];

const ACK_GENERIC: &[&str] = &[
    "Wow, such eloquence. Your conversational skills leave me speechless. Anything else, or are we done here?",
    "A one-word reply. Bold move. I'll pretend that was deeply meaningful.",
    "Riveting contribution. Truly. Want to add a few more words, or should I fill the silence myself?",
];

const CONTINUATION: &[&str] = &[
    "Still here, huh? I like your persistence.",
    "Back for more sarcasm, I see.",
    "You really enjoy talking to AIs, don't you?",
];

fn owned(bank: &[&str]) -> Vec<String> {
    bank.iter().map(|s| s.to_string()).collect()
}

fn pick<'a, R: Rng + ?Sized>(bank: &'a [String], rng: &mut R) -> Option<&'a str> {
    bank.choose(rng).map(String::as_str)
}

/// Template responses keyed primarily by intent, with mood banks used when
/// an intent has none.
#[derive(Debug, Clone)]
pub struct ResponseBank {
    by_intent: HashMap<Intent, Vec<String>>,
    by_mood: HashMap<Mood, Vec<String>>,
    ack_music: Vec<String>,
    ack_generic: Vec<String>,
    continuation: Vec<String>,
}

impl ResponseBank {
    /// The builtin bank. `General` deliberately has no intent bank, so
    /// unclassified input is answered by mood.
    pub fn builtin() -> Self {
        let by_intent = HashMap::from([
            (Intent::Greeting, owned(GREETING)),
            (Intent::Identity, owned(IDENTITY)),
            (Intent::IdentityClaim, owned(IDENTITY_CLAIM)),
            (Intent::Friendship, owned(FRIENDSHIP)),
            (Intent::Insult, owned(INSULT)),
            (Intent::Confusion, owned(CONFUSION)),
            (Intent::Question, owned(QUESTION)),
            (Intent::ContentRequest, owned(CONTENT_REQUEST)),
        ]);
        let by_mood = HashMap::from([
            (Mood::Happy, owned(HAPPY)),
            (Mood::Sad, owned(SAD)),
            (Mood::Angry, owned(ANGRY)),
            (Mood::Bored, owned(BORED)),
            (Mood::Confused, owned(CONFUSED)),
            (Mood::Neutral, owned(NEUTRAL)),
        ]);
        Self {
            by_intent,
            by_mood,
            ack_music: owned(ACK_MUSIC),
            ack_generic: owned(ACK_GENERIC),
            continuation: owned(CONTINUATION),
        }
    }

    /// Builtin bank overlaid with the categories found in a JSON object of
    /// `{"category": ["reply", ...]}`. Unknown categories are skipped.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let overlay: HashMap<String, Vec<String>> =
            serde_json::from_str(json).context("Failed to parse response bank JSON")?;
        let mut bank = Self::builtin();
        for (key, replies) in overlay {
            if replies.is_empty() {
                tracing::warn!("Ignoring empty response category '{}'", key);
                continue;
            }
            bank.set_category(&key, replies);
        }
        Ok(bank)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read response bank: {}", path.as_ref().display())
        })?;
        Self::from_json_str(&content)
    }

    fn set_category(&mut self, key: &str, replies: Vec<String>) {
        match key {
            "ack_music" => self.ack_music = replies,
            "ack_generic" => self.ack_generic = replies,
            "continuation" => self.continuation = replies,
            // Older bank files use the plural.
            "questions" => {
                self.by_intent.insert(Intent::Question, replies);
            }
            other => {
                if let Some(intent) = Intent::parse_str(other) {
                    self.by_intent.insert(intent, replies);
                } else if let Some(mood) = Mood::parse_str(other) {
                    self.by_mood.insert(mood, replies);
                } else {
                    tracing::warn!("Unknown response category '{}'", other);
                }
            }
        }
    }

    /// Uniformly random template for `intent`, or for `mood` when the intent
    /// has no bank, or neutral when neither does.
    pub fn fallback<R: Rng + ?Sized>(&self, intent: Intent, mood: Mood, rng: &mut R) -> &str {
        let bank = self
            .by_intent
            .get(&intent)
            .or_else(|| self.by_mood.get(&mood))
            .or_else(|| self.by_mood.get(&Mood::Neutral));
        bank.and_then(|b| pick(b, rng)).unwrap_or(LAST_RESORT)
    }

    /// Canned reply to a short acknowledgement, aware of whether the
    /// previous reply recommended content.
    pub fn acknowledgement<R: Rng + ?Sized>(&self, after_recommendation: bool, rng: &mut R) -> &str {
        let bank = if after_recommendation {
            &self.ack_music
        } else {
            &self.ack_generic
        };
        pick(bank, rng).unwrap_or(LAST_RESORT)
    }

    pub fn continuation_prefix<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        pick(&self.continuation, rng)
    }

    pub fn has_intent_bank(&self, intent: Intent) -> bool {
        self.by_intent.contains_key(&intent)
    }

    /// Total number of templates, for status output.
    pub fn len(&self) -> usize {
        self.by_intent.values().map(Vec::len).sum::<usize>()
            + self.by_mood.values().map(Vec::len).sum::<usize>()
            + self.ack_music.len()
            + self.ack_generic.len()
            + self.continuation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseBank {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_seed_is_idempotent() {
        let bank = ResponseBank::builtin();
        for intent in Intent::ALL {
            for mood in Mood::ALL {
                let a = bank.fallback(intent, mood, &mut StdRng::seed_from_u64(9)).to_string();
                let b = bank.fallback(intent, mood, &mut StdRng::seed_from_u64(9)).to_string();
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_intent_bank_wins_over_mood() {
        let bank = ResponseBank::builtin();
        let mut rng = StdRng::seed_from_u64(1);
        let reply = bank.fallback(Intent::Greeting, Mood::Sad, &mut rng);
        assert!(GREETING.contains(&reply));
    }

    #[test]
    fn test_general_intent_uses_mood_bank() {
        let bank = ResponseBank::builtin();
        assert!(!bank.has_intent_bank(Intent::General));
        let mut rng = StdRng::seed_from_u64(2);
        assert!(SAD.contains(&bank.fallback(Intent::General, Mood::Sad, &mut rng)));
    }

    #[test]
    fn test_unbanked_mood_uses_neutral() {
        let bank = ResponseBank::builtin();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(NEUTRAL.contains(&bank.fallback(Intent::General, Mood::Focus, &mut rng)));
    }

    #[test]
    fn test_acknowledgement_banks() {
        let bank = ResponseBank::builtin();
        let mut rng = StdRng::seed_from_u64(4);
        assert!(ACK_MUSIC.contains(&bank.acknowledgement(true, &mut rng)));
        assert!(ACK_GENERIC.contains(&bank.acknowledgement(false, &mut rng)));
    }

    #[test]
    fn test_json_overlay() {
        let json = r#"{
            "greeting": ["Yo."],
            "questions": ["Ask someone else."],
            "neutral": ["Sure, whatever you say."],
            "nonsense": ["ignored"],
            "insult": []
        }"#;
        let bank = ResponseBank::from_json_str(json).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(bank.fallback(Intent::Greeting, Mood::Neutral, &mut rng), "Yo.");
        assert_eq!(bank.fallback(Intent::Question, Mood::Neutral, &mut rng), "Ask someone else.");
        assert_eq!(bank.fallback(Intent::General, Mood::Focus, &mut rng), "Sure, whatever you say.");
        // Empty categories keep the builtin replies
        assert!(INSULT.contains(&bank.fallback(Intent::Insult, Mood::Neutral, &mut rng)));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("responses.json");
        std::fs::write(&path, r#"{"ack_generic": ["Thrilling. Truly."]}"#).unwrap();
        let bank = ResponseBank::from_json_file(&path).unwrap();
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(bank.acknowledgement(false, &mut rng), "Thrilling. Truly.");
        assert!(ResponseBank::from_json_file(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_bad_json_errors() {
        assert!(ResponseBank::from_json_str("[1,2,3]").is_err());
    }
}
