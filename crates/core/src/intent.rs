use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::OutcomeKind;

/// One conversational intent: a kind tag, its trigger keywords compiled as
/// word-boundary patterns, and the canned reply.
pub struct IntentEntry {
    pub kind: OutcomeKind,
    pub reply: &'static str,
    patterns: Vec<Regex>,
}

struct IntentSpec {
    kind: OutcomeKind,
    keywords: &'static [&'static str],
    reply: &'static str,
}

/// Table order is the tie-break when several intents' keywords are present.
const INTENT_SPECS: &[IntentSpec] = &[
    IntentSpec {
        kind: OutcomeKind::Greeting,
        keywords: &[
            "hi",
            "hello",
            "hey",
            "good morning",
            "good afternoon",
            "good evening",
        ],
        reply: "Hello! Welcome to our travel guide. How can I help you today?",
    },
    IntentSpec {
        kind: OutcomeKind::Thanks,
        keywords: &["thanks", "thank you", "thx"],
        reply: "You're welcome! If you have any questions, feel free to ask.",
    },
    IntentSpec {
        kind: OutcomeKind::Goodbye,
        keywords: &["bye", "goodbye", "see you", "later"],
        reply: "Goodbye! Have a great day!",
    },
    IntentSpec {
        kind: OutcomeKind::Smalltalk,
        keywords: &["how are you", "whats up", "how is it going"],
        reply: "I'm doing great, thanks for asking! Ready to help you plan your next stop.",
    },
    IntentSpec {
        kind: OutcomeKind::Help,
        keywords: &["help", "what can you do"],
        reply: "You can ask me for nearby places to visit, narrow them by a category \
                like parks or museums, set a time budget such as '2 hours' or a radius \
                like 'within 5 km', or ask a question about the service.",
    },
    IntentSpec {
        kind: OutcomeKind::Yes,
        keywords: &["yes", "yeah", "yep", "sure"],
        reply: "Great! Tell me what you are looking for, or share your location for nearby ideas.",
    },
    IntentSpec {
        kind: OutcomeKind::No,
        keywords: &["no", "nope", "not really"],
        reply: "Alright. If you change your mind, just ask me about places to visit.",
    },
];

static INTENT_TABLE: Lazy<Vec<IntentEntry>> = Lazy::new(|| {
    INTENT_SPECS
        .iter()
        .map(|spec| IntentEntry {
            kind: spec.kind,
            reply: spec.reply,
            patterns: spec
                .keywords
                .iter()
                .map(|keyword| {
                    Regex::new(&format!(r"\b{}\b", regex::escape(keyword)))
                        .expect("intent keyword pattern must compile")
                })
                .collect(),
        })
        .collect()
});

/// Match cleaned text against the intent table in definition order.
/// Keywords match on word boundaries only; substring containment would turn
/// "archive" into a greeting via the embedded "hi".
pub fn find_intent(text: &str) -> Option<&'static IntentEntry> {
    INTENT_TABLE
        .iter()
        .find(|entry| entry.patterns.iter().any(|pattern| pattern.is_match(text)))
}
