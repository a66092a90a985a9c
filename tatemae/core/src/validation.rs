//! Input Validation
//!
//! Boundary checks for everything a caller hands the translator.
//!
//! Free text and enum options are treated differently:
//! - malformed text (not a string, blank, too long) is rejected outright
//! - an unknown level, context or fidelity is replaced by its safe default
//!   and logged at `warn`

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::pipeline::TranslationRequest;
use crate::translator::TranslateOptions;
use crate::types::{ContextTag, FidelityLevel, PolitenessLevel};

/// Length limits, counted in Unicode scalar values
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputLimits {
    /// Minimum characters (default: 1)
    pub min_chars: usize,
    /// Maximum characters (default: 5000)
    pub max_chars: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            min_chars: 1,
            max_chars: 5_000,
        }
    }
}

/// Why an input was rejected
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Input was not a string
    #[error("input must be text, got {0}")]
    NotText(&'static str),
    /// Input was empty or whitespace only
    #[error("input text is empty")]
    Empty,
    /// Input was shorter than the minimum
    #[error("input text too short: {chars} characters (min: {min})")]
    TooShort {
        /// Characters received
        chars: usize,
        /// Configured minimum
        min: usize,
    },
    /// Input was longer than the maximum
    #[error("input text too long: {chars} characters (max: {max})")]
    TooLong {
        /// Characters received
        chars: usize,
        /// Configured maximum
        max: usize,
    },
}

/// Turns raw caller input into a [`TranslationRequest`]
#[derive(Clone, Debug, Default)]
pub struct InputValidator {
    limits: InputLimits,
}

impl InputValidator {
    /// Create a validator with the given limits
    #[must_use]
    pub fn new(limits: InputLimits) -> Self {
        Self { limits }
    }

    /// Configured limits
    #[must_use]
    pub fn limits(&self) -> &InputLimits {
        &self.limits
    }

    /// Check the text on its own
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`] for blank input, `TooShort`/`TooLong` when
    /// the character count is out of bounds.
    pub fn check_text(&self, text: &str) -> Result<(), ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::Empty);
        }

        let chars = text.chars().count();
        if chars < self.limits.min_chars {
            return Err(ValidationError::TooShort {
                chars,
                min: self.limits.min_chars,
            });
        }
        if chars > self.limits.max_chars {
            return Err(ValidationError::TooLong {
                chars,
                max: self.limits.max_chars,
            });
        }
        Ok(())
    }

    /// Validate text and coerce options
    ///
    /// # Errors
    ///
    /// See [`InputValidator::check_text`].
    pub fn validate(
        &self,
        text: &str,
        options: &TranslateOptions,
    ) -> Result<TranslationRequest, ValidationError> {
        self.check_text(text)?;
        Ok(TranslationRequest::new(
            text,
            coerce_level(&options.level),
            coerce_context(options.context.as_deref()),
            coerce_fidelity(options.fidelity.as_deref()),
        ))
    }

    /// Validate an untyped payload
    ///
    /// # Errors
    ///
    /// [`ValidationError::NotText`] for anything but a JSON string, then as
    /// [`InputValidator::validate`].
    pub fn validate_value(
        &self,
        value: &Value,
        options: &TranslateOptions,
    ) -> Result<TranslationRequest, ValidationError> {
        match value {
            Value::String(text) => self.validate(text, options),
            other => Err(ValidationError::NotText(json_kind(other))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Unknown level → `business`
#[must_use]
pub fn coerce_level(level: &str) -> PolitenessLevel {
    level.parse().unwrap_or_else(|_| {
        warn!(level, "Invalid politeness level, using business");
        PolitenessLevel::Business
    })
}

/// Unknown or `none` context → no context
#[must_use]
pub fn coerce_context(context: Option<&str>) -> Option<ContextTag> {
    match context {
        None | Some("" | "none") => None,
        Some(raw) => match raw.parse() {
            Ok(tag) => Some(tag),
            Err(_) => {
                warn!(context = raw, "Invalid context, ignoring");
                None
            }
        },
    }
}

/// Missing or unknown fidelity → `medium`
#[must_use]
pub fn coerce_fidelity(fidelity: Option<&str>) -> FidelityLevel {
    match fidelity {
        None => FidelityLevel::default(),
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(fidelity = raw, "Invalid fidelity, using medium");
            FidelityLevel::Medium
        }),
    }
}
