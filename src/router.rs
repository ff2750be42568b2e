//! Message router - decides, per incoming message, between a cached
//! explanation, a canned topic pointer, an AI answer, or silence.
//!
//! Owns all mutable conversational state (cooldowns, topic memory)
//! behind per-map locks; "now" is always passed in by the caller so the
//! decision logic itself never reads the clock.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::content::ContentStore;
use crate::context::ContextMemory;
use crate::cooldown::CooldownTracker;
use crate::format::{format_explanation, format_lesson, truncate};
use crate::intent::{detect_intent, IntentRule, RULES};
use crate::openai;

pub const NOT_FOUND_REPLY: &str =
    "🤔 I don't have anything on that topic. Try /topics to see what's available.";
pub const AI_APOLOGY: &str =
    "😅 Sorry, I couldn't come up with an answer right now. Please try again later.";
pub const AI_UNAVAILABLE_REPLY: &str =
    "I don't have an explanation for that yet.";
pub const ASK_COOLDOWN_REPLY: &str =
    "⏳ One question at a time! Give me a minute before asking again.";
pub const NO_TOPICS_REPLY: &str =
    "No lessons installed yet.";

pub struct MessageRouter {
    content: ContentStore,
    rules: &'static [IntentRule],
    intent_cooldown: Mutex<CooldownTracker>,
    ai_cooldown: Mutex<CooldownTracker>,
    context: Mutex<ContextMemory>,
    ai: Option<openai::Client>,
}

impl MessageRouter {
    pub fn new(
        content: ContentStore,
        ai: Option<openai::Client>,
        intent_window: Duration,
        ai_window: Duration,
        context_timeout: Duration,
    ) -> Self {
        Self {
            content,
            rules: RULES,
            intent_cooldown: Mutex::new(CooldownTracker::new(intent_window)),
            ai_cooldown: Mutex::new(CooldownTracker::new(ai_window)),
            context: Mutex::new(ContextMemory::new(context_timeout)),
            ai,
        }
    }

    /// Free-form (non-command) message. `None` means stay silent.
    pub async fn handle_free_text(
        &self,
        user_id: i64,
        text: &str,
        now: Instant,
    ) -> Option<String> {
        if let Some(topic) = detect_intent(text, self.rules) {
            {
                let mut cooldown = self.intent_cooldown.lock().await;
                if !cooldown.should_fire(user_id, now) {
                    debug!("Intent '{topic}' suppressed by cooldown for user {user_id}");
                    return None;
                }
                cooldown.record_fired(user_id, now);
            }
            self.context.lock().await.remember(user_id, topic, now);
            info!("🎯 Detected intent '{topic}' for user {user_id}");

            return Some(match self.content.explanation(topic) {
                Some(raw) => format_explanation(topic, &raw),
                None => topic_pointer(topic),
            });
        }

        // No local intent: AI fallback, silently skipped when unconfigured
        let ai = self.ai.as_ref()?;
        {
            let mut cooldown = self.ai_cooldown.lock().await;
            if !cooldown.should_fire(user_id, now) {
                debug!("AI fallback suppressed by cooldown for user {user_id}");
                return None;
            }
            cooldown.record_fired(user_id, now);
        }
        let topic = self.context.lock().await.recall(user_id, now);
        Some(self.call_ai(ai, text, topic.as_deref()).await)
    }

    /// Explicit /ask command. Always replies with something.
    pub async fn ask(&self, user_id: i64, question: &str, now: Instant) -> String {
        let Some(ai) = self.ai.as_ref() else {
            return AI_UNAVAILABLE_REPLY.to_string();
        };
        {
            let mut cooldown = self.ai_cooldown.lock().await;
            if !cooldown.should_fire(user_id, now) {
                return ASK_COOLDOWN_REPLY.to_string();
            }
            cooldown.record_fired(user_id, now);
        }
        let topic = self.context.lock().await.recall(user_id, now);
        self.call_ai(ai, question, topic.as_deref()).await
    }

    pub fn study(&self, topic: &str) -> String {
        match self.content.lesson(topic) {
            Some(raw) => format_lesson(topic, &raw),
            None => NOT_FOUND_REPLY.to_string(),
        }
    }

    pub fn explain(&self, topic: &str) -> String {
        match self.content.explanation(topic) {
            Some(raw) => format_explanation(topic, &raw),
            None => NOT_FOUND_REPLY.to_string(),
        }
    }

    pub fn topics(&self) -> String {
        let topics = self.content.list_topics();
        if topics.is_empty() {
            return NO_TOPICS_REPLY.to_string();
        }
        let mut out = String::from("📚 Available topics:\n");
        for topic in &topics {
            out.push_str("• ");
            out.push_str(topic);
            out.push('\n');
        }
        out.push_str("\nUse /study <topic> or /explain <topic>.");
        truncate(out)
    }

    async fn call_ai(
        &self,
        ai: &openai::Client,
        question: &str,
        topic: Option<&str>,
    ) -> String {
        match ai.ask(question, topic).await {
            Ok(answer) => truncate(answer),
            Err(e) => {
                warn!("AI fallback failed: {e}");
                AI_APOLOGY.to_string()
            }
        }
    }
}

fn topic_pointer(topic: &str) -> String {
    format!(
        "👀 Sounds like you're asking about {}. Try /study {} for the lesson.",
        topic.replace('_', " "),
        topic
    )
}
