//! Public Translator
//!
//! The one entry point adapters need. Every call returns a
//! [`TranslationResult`]; validation failures and pipeline-fatal errors come
//! back as error results, never as `Err` or a panic.
//!
//! # Example
//!
//! ```no_run
//! use tatemae_core::{setup_provider, ProviderSettings, TranslateOptions, Translator};
//!
//! # async fn demo() {
//! let setup = setup_provider(&ProviderSettings::fallback_only());
//! let translator = Translator::new(setup.provider);
//!
//! let result = translator
//!     .translate("I'm not interested in this job.", &TranslateOptions::default())
//!     .await;
//! println!("{} ({})", result.tatemae_text, result.intent);
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::lexicon::Lexicon;
use crate::pipeline::{Pipeline, StateError, TranslationRequest, TranslationState};
use crate::provider::{LlmProvider, ProviderInfo};
use crate::types::{Language, PolitenessLevel};
use crate::validation::{coerce_context, coerce_level, InputLimits, InputValidator};

/// Text returned with every error result
pub const ERROR_TEXT: &str = "申し訳ございません。現在処理できない状況です。";

/// Intent reported on error results
pub const ERROR_INTENT: &str = "error";

/// Raw per-call options
///
/// Kept as strings so that unknown values can be coerced rather than
/// rejected at the type level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    /// Politeness level (`business`, `ultra_polite`, `casual`)
    pub level: String,
    /// Context tag (`business`, `personal`, `recruiter`), or none
    pub context: Option<String>,
    /// Fidelity (`high`, `medium`, `low`)
    pub fidelity: Option<String>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            level: PolitenessLevel::Business.as_str().to_string(),
            context: None,
            fidelity: Some("medium".to_string()),
        }
    }
}

impl TranslateOptions {
    /// Options with the given level
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// Set context
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set fidelity
    #[must_use]
    pub fn with_fidelity(mut self, fidelity: impl Into<String>) -> Self {
        self.fidelity = Some(fidelity.into());
        self
    }
}

/// Outcome of one translation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Final text
    pub tatemae_text: String,
    /// Intent name, or `"error"`
    pub intent: String,
    /// Classification confidence in `[0, 1]`; `0.0` on error
    pub confidence: f32,
    /// Detected source language; `None` on error
    pub detected_language: Option<Language>,
    /// Politeness level used
    pub level: String,
    /// Context tag used
    pub context: Option<String>,
    /// Error description, only on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranslationResult {
    /// Build an error result
    pub fn failure(level: PolitenessLevel, context: Option<String>, error: impl Into<String>) -> Self {
        Self {
            tatemae_text: ERROR_TEXT.to_string(),
            intent: ERROR_INTENT.to_string(),
            confidence: 0.0,
            detected_language: None,
            level: level.as_str().to_string(),
            context,
            error: Some(error.into()),
        }
    }

    /// Whether this is an error result
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Validating façade over the pipeline
pub struct Translator {
    pipeline: Pipeline,
    validator: InputValidator,
}

impl Translator {
    /// Translator using the built-in lexicon
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self::with_lexicon(provider, Lexicon::shared())
    }

    /// Translator using a custom lexicon
    #[must_use]
    pub fn with_lexicon(provider: Arc<dyn LlmProvider>, lexicon: Arc<Lexicon>) -> Self {
        Self {
            pipeline: Pipeline::new(provider, lexicon),
            validator: InputValidator::default(),
        }
    }

    /// Replace the random source used for template selection
    #[must_use]
    pub fn with_rng(self, rng: StdRng) -> Self {
        let provider = Arc::clone(self.pipeline.provider());
        let lexicon = Arc::clone(self.pipeline.lexicon());
        Self {
            pipeline: Pipeline::with_rng(provider, lexicon, rng),
            validator: self.validator,
        }
    }

    /// Replace the input limits
    #[must_use]
    pub fn with_limits(mut self, limits: InputLimits) -> Self {
        self.validator = InputValidator::new(limits);
        self
    }

    /// Describe the active provider
    #[must_use]
    pub fn provider_info(&self) -> ProviderInfo {
        self.pipeline.provider().info()
    }

    /// Translate `text`
    pub async fn translate(&self, text: &str, options: &TranslateOptions) -> TranslationResult {
        match self.validator.validate(text, options) {
            Ok(request) => self.run(request).await,
            Err(e) => {
                warn!(error = %e, "Rejected input");
                rejection(options, e.to_string())
            }
        }
    }

    /// Translate an untyped payload; anything but a JSON string is rejected
    pub async fn translate_value(&self, value: &Value, options: &TranslateOptions) -> TranslationResult {
        match self.validator.validate_value(value, options) {
            Ok(request) => self.run(request).await,
            Err(e) => {
                warn!(error = %e, "Rejected input");
                rejection(options, e.to_string())
            }
        }
    }

    /// Translate and return only the text
    pub async fn translate_simple(&self, text: &str, level: &str) -> String {
        self.translate(text, &TranslateOptions::with_level(level))
            .await
            .tatemae_text
    }

    async fn run(&self, request: TranslationRequest) -> TranslationResult {
        let level = request.level();
        let context = request.context().map(|c| c.as_str().to_string());

        let state = match self.pipeline.run(request).await {
            Ok(state) => state,
            Err(e) => {
                error!(error = %e, "Translation pipeline failed");
                return TranslationResult::failure(level, context, e.to_string());
            }
        };

        let assembled = assemble(&state, level, context.clone());

        match assembled {
            Ok(result) => {
                info!(
                    intent = %result.intent,
                    confidence = result.confidence,
                    degraded = !state.degradations().is_empty(),
                    "Translation complete"
                );
                result
            }
            Err(e) => {
                error!(error = %e, "Translation state incomplete");
                TranslationResult::failure(level, context, e.to_string())
            }
        }
    }
}

/// Read the finished state into a result
fn assemble(
    state: &TranslationState,
    level: PolitenessLevel,
    context: Option<String>,
) -> Result<TranslationResult, StateError> {
    Ok(TranslationResult {
        tatemae_text: state.output()?.to_string(),
        intent: state.intent()?.as_str().to_string(),
        confidence: state.confidence()?,
        detected_language: Some(state.detected_language()?),
        level: level.as_str().to_string(),
        context,
        error: None,
    })
}

/// Error result for rejected input, with options coerced as usual
fn rejection(options: &TranslateOptions, error: impl Into<String>) -> TranslationResult {
    let context = coerce_context(options.context.as_deref()).map(|c| c.as_str().to_string());
    TranslationResult::failure(coerce_level(&options.level), context, error)
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("pipeline", &self.pipeline)
            .field("validator", &self.validator)
            .finish()
    }
}
