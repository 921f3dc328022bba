use crate::api_types::Message;
use sardonic_core::{Intent, Mood, Turn};

const PERSONA: &str = "You are Mr. Sarcastic, a witty AI companion with a sharp tongue and a soft spot for good music. \
Reply in one or two sentences. Be sarcastic but never cruel, and stay on the user's topic. \
Do not prefix your reply with a speaker name.";

/// How many past exchanges are replayed to the model.
pub const CONTEXT_TURNS: usize = 2;

fn mood_context(mood: Mood) -> Option<&'static str> {
    match mood {
        Mood::Happy => Some("The user seems happy. Tease them about it a little."),
        Mood::Sad => Some("The user seems sad. Keep the sarcasm gentle and show you care underneath it."),
        Mood::Angry => Some("The user seems angry. Stay calm and unimpressed."),
        Mood::Bored => Some("The user seems bored. Mock their boredom and offer something to do."),
        Mood::Energetic => Some("The user is full of energy. Match it, grudgingly."),
        Mood::Chill | Mood::Relaxed => Some("The user is in a relaxed mood. Keep the tone laid back."),
        Mood::Focus => Some("The user is trying to focus. Be brief."),
        Mood::Confused => Some("The user seems confused. Clarify, with attitude."),
        Mood::Neutral => None,
    }
}

/// Builds the system prompt and message list for one model call.
pub struct PromptBuilder {
    persona: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            persona: PERSONA.to_string(),
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_persona(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
        }
    }

    pub fn system_prompt(&self, mood: Mood, intent: Intent) -> String {
        let mut prompt = self.persona.clone();
        if let Some(ctx) = mood_context(mood) {
            prompt.push_str("\n\n");
            prompt.push_str(ctx);
        }
        if intent == Intent::Insult {
            prompt.push_str("\nThe user is being rude. Roast them back, lightly.");
        }
        prompt
    }

    /// The last exchanges as alternating user/assistant messages, then the
    /// current input.
    pub fn messages(&self, history: &[Turn], user_text: &str) -> Vec<Message> {
        let start = history.len().saturating_sub(CONTEXT_TURNS);
        let mut messages = Vec::with_capacity(CONTEXT_TURNS * 2 + 1);
        for turn in &history[start..] {
            messages.push(Message::user(&turn.user_text));
            messages.push(Message::assistant(&turn.bot_text));
        }
        messages.push(Message::user(user_text));
        messages
    }
}
