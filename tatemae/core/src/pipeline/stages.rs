//! The four pipeline stages
//!
//! Provider-backed stages contain their own failures: a provider error is
//! recorded as a [`Stage`] degradation and a default is substituted. Only
//! broken state transitions or an unusable lexicon escape as [`PipelineError`].

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use super::state::{Stage, StateError, TranslationState};
use crate::language::detect_language;
use crate::lexicon::{self, Lexicon};
use crate::provider::{LlmProvider, RefineRequest};
use crate::types::Intent;

/// Confidence substituted when classification fails
pub const CLASSIFICATION_FAILURE_CONFIDENCE: f32 = 0.5;

/// Confidence substituted for a non-finite provider score
const NON_FINITE_CONFIDENCE: f32 = 0.8;

/// Failure that aborts the whole pipeline
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Corrupted state transition
    #[error(transparent)]
    State(#[from] StateError),
    /// Neither the intent nor `neutral_polite` has a template
    #[error("no templates available for intent '{0}'")]
    NoTemplates(Intent),
    /// A template slot has no candidate phrases
    #[error("no phrases for placeholder '{0}'")]
    MissingPhrases(String),
}

/// Stage 1: detect the source language
///
/// # Errors
///
/// Only on a broken state transition.
pub fn detect(state: &mut TranslationState) -> Result<(), StateError> {
    let language = detect_language(state.request().text());
    debug!(language = %language, "Language detected");
    state.set_detected_language(language)
}

/// Stage 2: classify the intent
///
/// # Errors
///
/// Only on a broken state transition; provider failures degrade to
/// `neutral_polite` at [`CLASSIFICATION_FAILURE_CONFIDENCE`].
pub async fn classify(
    state: &mut TranslationState,
    provider: &dyn LlmProvider,
) -> Result<(), StateError> {
    let (intent, confidence) = match provider.classify_intent(state.request().text()).await {
        Ok(classification) => (classification.intent, clamp_confidence(classification.confidence)),
        Err(e) => {
            warn!(provider = provider.name(), error = %e, "Intent classification failed, using neutral_polite");
            state.record_degradation(Stage::ClassifyIntent, e.to_string());
            (Intent::NeutralPolite, CLASSIFICATION_FAILURE_CONFIDENCE)
        }
    };

    debug!(intent = %intent, confidence, "Intent classified");
    state.set_classification(intent, confidence)
}

/// Keep a provider score inside `[0, 1]`
#[must_use]
pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        NON_FINITE_CONFIDENCE
    }
}

/// Pick a template for `intent` and fill every slot
///
/// Returns `(template, filled)`. Every occurrence of a placeholder receives
/// the same phrase.
///
/// # Errors
///
/// [`PipelineError::NoTemplates`] or [`PipelineError::MissingPhrases`] if the
/// lexicon cannot serve the request.
pub fn fill_template<R: Rng + ?Sized>(
    lexicon: &Lexicon,
    intent: Intent,
    rng: &mut R,
) -> Result<(String, String), PipelineError> {
    let mut candidates = lexicon.templates(intent);
    if candidates.is_empty() {
        warn!(intent = %intent, "No templates for intent, using neutral_polite");
        candidates = lexicon.templates(Intent::NeutralPolite);
    }
    let template = candidates
        .choose(rng)
        .ok_or(PipelineError::NoTemplates(intent))?;

    let mut filled = template.clone();
    for name in lexicon::placeholders(template) {
        let phrase = lexicon
            .phrases(name)
            .choose(rng)
            .ok_or_else(|| PipelineError::MissingPhrases(name.to_string()))?;
        filled = filled.replace(&format!("{{{name}}}"), phrase);
    }

    Ok((template.clone(), filled))
}

/// Stage 3: choose and fill a template
///
/// # Errors
///
/// See [`fill_template`]; also fails on a broken state transition.
pub fn fill<R: Rng + ?Sized>(
    state: &mut TranslationState,
    lexicon: &Lexicon,
    rng: &mut R,
) -> Result<(), PipelineError> {
    let intent = state.intent()?;
    let (template, filled) = fill_template(lexicon, intent, rng)?;
    debug!(template = %template, "Template filled");
    state.set_template(template, filled)?;
    Ok(())
}

/// Stage 4: refine the filled template
///
/// # Errors
///
/// Only on a broken state transition; provider failures (including an empty
/// refinement) pass the filled template through unchanged.
pub async fn refine(
    state: &mut TranslationState,
    provider: &dyn LlmProvider,
) -> Result<(), StateError> {
    let filled = state.filled_template()?.to_string();
    let request = RefineRequest::new(
        state.request().text(),
        filled.clone(),
        state.intent()?,
        state.request().level(),
    )
    .with_fidelity(state.request().fidelity());

    let output = match provider.refine(&request).await {
        Ok(refined) if !refined.trim().is_empty() => refined,
        Ok(_) => {
            warn!(provider = provider.name(), "Empty refinement, keeping filled template");
            state.record_degradation(Stage::Refine, "empty refinement");
            filled
        }
        Err(e) => {
            warn!(provider = provider.name(), error = %e, "Refinement failed, keeping filled template");
            state.record_degradation(Stage::Refine, e.to_string());
            filled
        }
    };

    state.set_output(output)
}
