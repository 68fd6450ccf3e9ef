//! Rule-based fallback gateway.
//!
//! Classifies intent and pulls out the obvious entities with compiled-once
//! regex sets. Used when no model server is configured; deliberately
//! conservative — a missed entity costs one clarifying question, a wrong
//! one pollutes the profile.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use trialmatch_core::{Intent, SlotKey, SlotValues};

use crate::gateway::{NluError, NluGateway, NluOutcome};

// =============================================================================
// Compiled regex sets (compiled once, reused across calls)
// =============================================================================

struct IntentPatterns {
    goodbye: Vec<Regex>,
    greeting: Vec<Regex>,
    find_trials: Vec<Regex>,
}

static INTENT_PATTERNS: LazyLock<IntentPatterns> = LazyLock::new(|| {
    let mk = |pats: &[&str]| -> Vec<Regex> {
        pats.iter()
            .map(|p| Regex::new(p).expect("Invalid intent regex"))
            .collect()
    };

    IntentPatterns {
        // Goodbye first, so "ok bye" is not read as a greeting.
        goodbye: mk(&[
            r"(?i)\bgood\s*bye\b",
            r"(?i)\bbye\b",
            r"(?i)\bsee\s+you\b",
            r"(?i)\bfarewell\b",
            r"(?i)\bthat'?s\s+all\b",
            r"(?i)\bi'?m\s+done\b",
        ]),
        greeting: mk(&[
            r"(?i)\bhello\b",
            r"(?i)\bhi\b",
            r"(?i)\bhey\b",
            r"(?i)\bgood\s+(morning|afternoon|evening)\b",
            r"(?i)\bgreetings\b",
        ]),
        find_trials: mk(&[
            r"(?i)\b(find|search|look)\s+(for\s+)?(me\s+)?(a\s+)?(clinical\s+)?trials?\b",
            r"(?i)\bshow\s+me\s+(some\s+)?(clinical\s+)?trials?\b",
            r"(?i)\bclinical\s+trials?\b",
            r"(?i)\bmatching\s+(studies|trials)\b",
            r"(?i)\btrials?\s+(near|in|for)\b",
            r"(?i)\bany\s+trials?\b",
            r"(?i)\benroll\b",
        ]),
    }
});

struct EntityPatterns {
    cancer_type: Regex,
    cancer_word: Regex,
    stage: Regex,
    age_prefixed: Regex,
    age_years_old: Regex,
    sex: Regex,
    location: Regex,
}

static ENTITY_PATTERNS: LazyLock<EntityPatterns> = LazyLock::new(|| EntityPatterns {
    // "<modifier...> cancer", e.g. "breast cancer", "non-small cell lung
    // cancer". Leading non-modifier words are stripped in code; the regex
    // crate has no lookaround.
    cancer_type: Regex::new(r"(?i)\b((?:[a-z][a-z-]*\s+){1,4}cancer)\b").unwrap(),
    // Cancers that are not phrased with the word "cancer".
    cancer_word: Regex::new(
        r"(?i)\b(leukemia|lymphoma|melanoma|myeloma|glioblastoma|sarcoma|mesothelioma)\b",
    )
    .unwrap(),
    stage: Regex::new(r"(?i)\bstage\s+(iv|iii|ii|i|[0-4])\b").unwrap(),
    age_prefixed: Regex::new(r"(?i)\b(?:i\s+am|i'?m|age)\s+(\d{1,3})\b").unwrap(),
    age_years_old: Regex::new(r"(?i)\b(\d{1,3})[\s-]*years?[\s-]*old\b").unwrap(),
    sex: Regex::new(r"(?i)\b(male|female|man|woman)\b").unwrap(),
    // "in Boston Massachusetts" — two or more capitalized tokens after a
    // locative preposition.
    location: Regex::new(r"(?:\b(?:in|near|around|from)\s+)([A-Z][a-zA-Z]*(?:\s+[A-Z][a-zA-Z]*)+)")
        .unwrap(),
});

// Words that can precede "cancer" in a sentence but are never part of the
// diagnosis phrase itself.
static NON_MODIFIER_WORDS: &[&str] = &[
    "a", "an", "the", "my", "her", "his", "their", "this", "that", "i", "me",
    "is", "was", "are", "were", "have", "has", "had", "with", "for", "of",
    "in", "about", "and", "or", "diagnosed", "find", "search", "show",
    "trials", "trial", "some", "any",
];

/// Offline rule-based NLU gateway.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleNlu;

impl RuleNlu {
    pub fn new() -> Self {
        Self
    }

    /// Classify the intent of a raw utterance.
    ///
    /// Checks patterns in order: goodbye, greeting, find-trials. Falls back
    /// to `Other` if nothing matches.
    pub fn classify_intent(&self, text: &str) -> Intent {
        let pats = &*INTENT_PATTERNS;

        for re in &pats.goodbye {
            if re.is_match(text) {
                return Intent::Goodbye;
            }
        }
        for re in &pats.greeting {
            if re.is_match(text) {
                return Intent::Greeting;
            }
        }
        for re in &pats.find_trials {
            if re.is_match(text) {
                return Intent::FindTrials;
            }
        }

        Intent::Other
    }

    /// Extract best-effort entities from a raw utterance.
    pub fn extract_slots(&self, text: &str) -> SlotValues {
        let pats = &*ENTITY_PATTERNS;
        let mut slots = SlotValues::new();

        if let Some(phrase) = pats
            .cancer_type
            .captures(text)
            .and_then(|c| trim_cancer_phrase(&c[1]))
        {
            slots.insert(SlotKey::CancerType, phrase);
        } else if let Some(c) = pats.cancer_word.captures(text) {
            slots.insert(SlotKey::CancerType, c[1].to_lowercase());
        }

        if let Some(c) = pats.stage.captures(text) {
            slots.insert(SlotKey::Stage, normalize_stage(&c[1]));
        }

        if let Some(c) = pats
            .age_prefixed
            .captures(text)
            .or_else(|| pats.age_years_old.captures(text))
        {
            slots.insert(SlotKey::Age, c[1].to_string());
        }

        if let Some(c) = pats.sex.captures(text) {
            let sex = match c[1].to_lowercase().as_str() {
                "man" => "male".to_string(),
                "woman" => "female".to_string(),
                other => other.to_string(),
            };
            slots.insert(SlotKey::Sex, sex);
        }

        if let Some(c) = pats.location.captures(text) {
            slots.insert(SlotKey::Location, c[1].trim().to_string());
        }

        slots
    }
}

/// Strip leading non-modifier words from a raw "<words> cancer" capture.
///
/// Returns `None` when no modifier survives ("I have cancer" carries no
/// usable type).
fn trim_cancer_phrase(raw: &str) -> Option<String> {
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    // Last word is "cancer" itself.
    while words.len() > 1 && NON_MODIFIER_WORDS.contains(&words[0].to_lowercase().as_str()) {
        words.remove(0);
    }
    if words.len() < 2 {
        return None;
    }
    Some(words.join(" ").to_lowercase())
}

/// Render roman-numeral stages in arabic, matching the registry's wording.
fn normalize_stage(raw: &str) -> String {
    match raw.to_lowercase().as_str() {
        "i" => "1".to_string(),
        "ii" => "2".to_string(),
        "iii" => "3".to_string(),
        "iv" => "4".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl NluGateway for RuleNlu {
    async fn extract(
        &self,
        text: &str,
        _context: &SlotValues,
    ) -> Result<NluOutcome, NluError> {
        Ok(NluOutcome {
            intent: self.classify_intent(text),
            slots: self.extract_slots(text),
        })
    }
}
