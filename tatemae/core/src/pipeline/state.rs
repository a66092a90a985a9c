//! Per-call pipeline state
//!
//! Every field a stage produces is written exactly once. A second write, or
//! a read of a field whose stage has not run, is a [`StateError`].

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::types::{ContextTag, FidelityLevel, Intent, Language, PolitenessLevel};

/// Broken state transition
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StateError {
    /// A stage tried to overwrite a field it does not own
    #[error("pipeline state field '{field}' was already set")]
    AlreadySet {
        /// Field name
        field: &'static str,
    },
    /// A stage read a field that no earlier stage produced
    #[error("pipeline state field '{field}' is missing")]
    Missing {
        /// Field name
        field: &'static str,
    },
}

/// A validated translation request
#[derive(Clone, Debug, PartialEq)]
pub struct TranslationRequest {
    text: String,
    level: PolitenessLevel,
    context: Option<ContextTag>,
    fidelity: FidelityLevel,
}

impl TranslationRequest {
    pub(crate) fn new(
        text: impl Into<String>,
        level: PolitenessLevel,
        context: Option<ContextTag>,
        fidelity: FidelityLevel,
    ) -> Self {
        Self {
            text: text.into(),
            level,
            context,
            fidelity,
        }
    }

    /// Input text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Target register
    #[must_use]
    pub fn level(&self) -> PolitenessLevel {
        self.level
    }

    /// Situational tag
    #[must_use]
    pub fn context(&self) -> Option<ContextTag> {
        self.context
    }

    /// Requested fidelity
    #[must_use]
    pub fn fidelity(&self) -> FidelityLevel {
        self.fidelity
    }
}

/// Stages that can degrade
///
/// Only the provider-backed stages fall back to a default. Language detection
/// cannot fail, and a template failure aborts the run instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Intent classification through the provider
    ClassifyIntent,
    /// Politeness refinement through the provider
    Refine,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ClassifyIntent => "classify_intent",
            Self::Refine => "refine",
        })
    }
}

/// A stage that substituted a default instead of its real output
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Degradation {
    /// Stage that degraded
    pub stage: Stage,
    /// What went wrong
    pub reason: String,
}

/// Set `slot` once, or report which field was already written
fn set_once<T>(slot: &mut Option<T>, value: T, field: &'static str) -> Result<(), StateError> {
    if slot.is_some() {
        return Err(StateError::AlreadySet { field });
    }
    *slot = Some(value);
    Ok(())
}

fn require<'a, T>(slot: &'a Option<T>, field: &'static str) -> Result<&'a T, StateError> {
    slot.as_ref().ok_or(StateError::Missing { field })
}

/// Working state of one translation
#[derive(Clone, Debug)]
pub struct TranslationState {
    request: TranslationRequest,
    detected_language: Option<Language>,
    intermediate_translation: Option<String>,
    intent: Option<Intent>,
    confidence: Option<f32>,
    template: Option<String>,
    filled_template: Option<String>,
    output: Option<String>,
    degradations: Vec<Degradation>,
}

impl TranslationState {
    /// Fresh state for `request`
    #[must_use]
    pub fn new(request: TranslationRequest) -> Self {
        Self {
            request,
            detected_language: None,
            intermediate_translation: None,
            intent: None,
            confidence: None,
            template: None,
            filled_template: None,
            output: None,
            degradations: Vec::new(),
        }
    }

    /// The request this state was created for
    #[must_use]
    pub fn request(&self) -> &TranslationRequest {
        &self.request
    }

    // ------------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------------

    /// Detected source language
    ///
    /// # Errors
    ///
    /// [`StateError::Missing`] before language detection has run.
    pub fn detected_language(&self) -> Result<Language, StateError> {
        require(&self.detected_language, "detected_language").copied()
    }

    /// Reserved for a machine-translation pre-pass; currently always `None`
    #[must_use]
    pub fn intermediate_translation(&self) -> Option<&str> {
        self.intermediate_translation.as_deref()
    }

    /// Detected intent
    ///
    /// # Errors
    ///
    /// [`StateError::Missing`] before classification has run.
    pub fn intent(&self) -> Result<Intent, StateError> {
        require(&self.intent, "intent").copied()
    }

    /// Classification confidence in `[0, 1]`
    ///
    /// # Errors
    ///
    /// [`StateError::Missing`] before classification has run.
    pub fn confidence(&self) -> Result<f32, StateError> {
        require(&self.confidence, "confidence").copied()
    }

    /// Raw template chosen for the intent
    ///
    /// # Errors
    ///
    /// [`StateError::Missing`] before template filling has run.
    pub fn template(&self) -> Result<&str, StateError> {
        require(&self.template, "template").map(String::as_str)
    }

    /// Template after placeholder substitution
    ///
    /// # Errors
    ///
    /// [`StateError::Missing`] before template filling has run.
    pub fn filled_template(&self) -> Result<&str, StateError> {
        require(&self.filled_template, "filled_template").map(String::as_str)
    }

    /// Final text
    ///
    /// # Errors
    ///
    /// [`StateError::Missing`] before refinement has run.
    pub fn output(&self) -> Result<&str, StateError> {
        require(&self.output, "output").map(String::as_str)
    }

    /// Stages that fell back to a default
    #[must_use]
    pub fn degradations(&self) -> &[Degradation] {
        &self.degradations
    }

    // ------------------------------------------------------------------------
    // Writers
    // ------------------------------------------------------------------------

    /// Record the detected language
    ///
    /// # Errors
    ///
    /// [`StateError::AlreadySet`] on a second call.
    pub fn set_detected_language(&mut self, language: Language) -> Result<(), StateError> {
        set_once(&mut self.detected_language, language, "detected_language")
    }

    /// Record intent and confidence together
    ///
    /// # Errors
    ///
    /// [`StateError::AlreadySet`] on a second call.
    pub fn set_classification(&mut self, intent: Intent, confidence: f32) -> Result<(), StateError> {
        if self.confidence.is_some() {
            return Err(StateError::AlreadySet { field: "confidence" });
        }
        set_once(&mut self.intent, intent, "intent")?;
        self.confidence = Some(confidence);
        Ok(())
    }

    /// Record the chosen template and its filled form
    ///
    /// # Errors
    ///
    /// [`StateError::AlreadySet`] on a second call.
    pub fn set_template(&mut self, template: String, filled: String) -> Result<(), StateError> {
        if self.filled_template.is_some() {
            return Err(StateError::AlreadySet { field: "filled_template" });
        }
        set_once(&mut self.template, template, "template")?;
        self.filled_template = Some(filled);
        Ok(())
    }

    /// Record the final text
    ///
    /// # Errors
    ///
    /// [`StateError::AlreadySet`] on a second call.
    pub fn set_output(&mut self, output: String) -> Result<(), StateError> {
        set_once(&mut self.output, output, "output")
    }

    /// Note that `stage` substituted a default
    pub fn record_degradation(&mut self, stage: Stage, reason: impl Into<String>) {
        self.degradations.push(Degradation {
            stage,
            reason: reason.into(),
        });
    }
}
