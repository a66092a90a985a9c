//! Local Fallback Provider
//!
//! Keyword-based intent detection and regex cleanup. No network, always
//! available; used when no remote credential is configured.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::{Captures, Regex};
use tracing::debug;

use super::traits::{IntentClassification, LlmProvider, ProviderError, RefineRequest};
use crate::types::Intent;

/// Confidence for a keyword hit
pub const MATCH_CONFIDENCE: f32 = 0.7;

/// Confidence when nothing matched
pub const NO_MATCH_CONFIDENCE: f32 = 0.6;

/// Keyword groups, tested in order; the first hit wins
const KEYWORD_GROUPS: &[(Intent, &[&str])] = &[
    (
        Intent::Refusal,
        &["not interested", "decline", "pass", "no thanks", "reject", "興味ない"],
    ),
    (
        Intent::Disagreement,
        &["disagree", "don't think", "wrong", "incorrect", "反対", "違う"],
    ),
    (
        Intent::Delay,
        &["later", "postpone", "delay", "can't meet", "busy", "後で", "延期"],
    ),
    (
        Intent::Disinterest,
        &["not interested", "don't want", "not for me", "興味ない"],
    ),
    (
        Intent::Criticism,
        &["inefficient", "bad", "poor", "needs improvement", "問題", "改善"],
    ),
];

const VERB_ENDINGS: &[&str] = &["させていただきます", "いたします", "ございます"];
const CONNECTIVES: &[&str] = &["ため", "という状況", "でして"];

/// Two or more copies of the same verb ending
static REPEATED_ENDING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("(?:させていただきます){2,}|(?:いたします){2,}|(?:ございます){2,}")
        .expect("verb-ending pattern is valid")
});

/// Two or more connectives in a row, in any combination
static CONNECTIVE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("(?:ため|という状況|でして){2,}").expect("connective pattern is valid")
});

/// Match `text` against the keyword groups
#[must_use]
pub fn classify_by_keywords(text: &str) -> IntentClassification {
    let lowered = text.to_lowercase();

    KEYWORD_GROUPS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lowered.contains(w)))
        .map_or(
            IntentClassification::new(Intent::NeutralPolite, NO_MATCH_CONFIDENCE),
            |(intent, _)| IntentClassification::new(*intent, MATCH_CONFIDENCE),
        )
}

/// Replace a whole match with the literal from `units` it starts with
fn first_unit<'a>(units: &'a [&'a str]) -> impl Fn(&Captures<'_>) -> String + 'a {
    move |caps: &Captures<'_>| {
        let run = &caps[0];
        units
            .iter()
            .find(|unit| run.starts_with(**unit))
            .map_or_else(|| run.to_string(), |unit| (*unit).to_string())
    }
}

/// Collapse repeated verb endings and connective runs
///
/// Idempotent: the output contains no run the patterns could match again.
#[must_use]
pub fn dedupe(text: &str) -> String {
    let text = REPEATED_ENDING.replace_all(text, first_unit(VERB_ENDINGS));
    CONNECTIVE_RUN
        .replace_all(&text, first_unit(CONNECTIVES))
        .into_owned()
}

/// Provider that never leaves the process
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackProvider;

impl FallbackProvider {
    /// Create the fallback provider
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmProvider for FallbackProvider {
    fn name(&self) -> &str {
        "fallback"
    }

    fn model(&self) -> &str {
        "keyword-rules"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn classify_intent(&self, text: &str) -> Result<IntentClassification, ProviderError> {
        Ok(classify_by_keywords(text))
    }

    async fn refine(&self, request: &RefineRequest) -> Result<String, ProviderError> {
        let cleaned = dedupe(&request.filled_template);
        debug!(changed = cleaned != request.filled_template, "Fallback cleanup applied");
        Ok(cleaned)
    }
}
