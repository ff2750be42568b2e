//! Keyword-based intent detection for grammar topics.
//!
//! Deliberately dumb: lowercase the message, check literal substrings.
//! No tokenization, no word boundaries ("para" matches inside "comparar"
//! and that is fine). Rules are checked in declared order and the first
//! match wins, so more specific rules go first.

/// A single grammar-topic rule.
///
/// Fires when ALL `must_have` substrings are present and AT LEAST ONE
/// trigger word is present in the lowercased input.
pub struct IntentRule {
    pub topic: &'static str,
    pub must_have: &'static [&'static str],
    pub trigger_words: &'static [&'static str],
}

/// Question indicators shared by most rules, Portuguese and English.
const QUESTION_TRIGGERS: &[&str] = &[
    "qual",
    "quando",
    "como",
    "porque",
    "por que",
    "difference",
    "diferença",
    "when",
    "how",
    "why",
    "what",
    "explain",
    "confus",
    "?",
];

/// Built-in rule set. Order matters: "pronunc"/"pronúncia" must be
/// checked before any future pronoun rule, and the two-word contrast
/// topics sit at the top because they are the most specific.
pub const RULES: &[IntentRule] = &[
    IntentRule {
        topic: "ser_vs_estar",
        must_have: &["ser", "estar"],
        trigger_words: QUESTION_TRIGGERS,
    },
    IntentRule {
        topic: "por_vs_para",
        must_have: &["por", "para"],
        trigger_words: QUESTION_TRIGGERS,
    },
    IntentRule {
        topic: "false_cognates",
        must_have: &["cognat"],
        trigger_words: QUESTION_TRIGGERS,
    },
    // "subjun" covers both "subjunctive" and "subjuntivo"
    IntentRule {
        topic: "subjunctive",
        must_have: &["subjun"],
        trigger_words: QUESTION_TRIGGERS,
    },
    IntentRule {
        topic: "contractions",
        must_have: &["contraction"],
        trigger_words: QUESTION_TRIGGERS,
    },
    IntentRule {
        topic: "contractions",
        must_have: &["contraç"],
        trigger_words: QUESTION_TRIGGERS,
    },
    IntentRule {
        topic: "gender",
        must_have: &["gender"],
        trigger_words: QUESTION_TRIGGERS,
    },
    IntentRule {
        topic: "verb_conjugation",
        must_have: &["conjugat"],
        trigger_words: QUESTION_TRIGGERS,
    },
    IntentRule {
        topic: "plurals",
        must_have: &["plural"],
        trigger_words: QUESTION_TRIGGERS,
    },
    IntentRule {
        topic: "pronunciation",
        must_have: &["pronunc"],
        trigger_words: QUESTION_TRIGGERS,
    },
    IntentRule {
        topic: "pronunciation",
        must_have: &["pronounce"],
        trigger_words: QUESTION_TRIGGERS,
    },
    IntentRule {
        topic: "accents",
        must_have: &["accent"],
        trigger_words: QUESTION_TRIGGERS,
    },
    IntentRule {
        topic: "accents",
        must_have: &["acentu"],
        trigger_words: QUESTION_TRIGGERS,
    },
];

/// Return the topic of the first rule that matches, or `None`.
pub fn detect_intent(text: &str, rules: &[IntentRule]) -> Option<&'static str> {
    let text = text.to_lowercase();
    rules
        .iter()
        .find(|rule| {
            rule.must_have.iter().all(|kw| text.contains(kw))
                && rule.trigger_words.iter().any(|kw| text.contains(kw))
        })
        .map(|rule| rule.topic)
}
