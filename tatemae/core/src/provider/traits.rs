//! Provider Traits
//!
//! Trait definitions for the backends the pipeline consults. This abstraction
//! allows the pipeline to classify intent and refine text with a remote LLM
//! or with the local keyword/regex fallback without changing core logic.
//!
//! # Design Philosophy
//!
//! The LlmProvider trait provides a common interface for:
//! - Classifying the speaker's intent
//! - Rewriting a filled template into the requested register
//! - Reporting whether the backend can be used at all
//!
//! Implementations handle provider-specific details (API formats, auth, etc.)

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::types::{FidelityLevel, Intent, PolitenessLevel};

/// Outcome of intent classification
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntentClassification {
    /// Detected intent
    pub intent: Intent,
    /// Confidence score, expected in `[0, 1]`
    pub confidence: f32,
}

impl IntentClassification {
    /// Create a classification
    #[must_use]
    pub fn new(intent: Intent, confidence: f32) -> Self {
        Self { intent, confidence }
    }
}

/// Everything the refinement step needs to know
#[derive(Clone, Debug)]
pub struct RefineRequest {
    /// The speaker's original, direct message
    pub input_text: String,
    /// Template text after placeholder substitution
    pub filled_template: String,
    /// Intent detected for the message
    pub intent: Intent,
    /// Requested register
    pub level: PolitenessLevel,
    /// Requested closeness to the original meaning
    pub fidelity: FidelityLevel,
}

impl RefineRequest {
    /// Create a request with medium fidelity
    pub fn new(
        input_text: impl Into<String>,
        filled_template: impl Into<String>,
        intent: Intent,
        level: PolitenessLevel,
    ) -> Self {
        Self {
            input_text: input_text.into(),
            filled_template: filled_template.into(),
            intent,
            level,
            fidelity: FidelityLevel::default(),
        }
    }

    /// Set fidelity
    #[must_use]
    pub fn with_fidelity(mut self, fidelity: FidelityLevel) -> Self {
        self.fidelity = fidelity;
        self
    }
}

/// Errors a provider can report
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ProviderError {
    /// Provider is not configured or its client could not be built
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
    /// Could not reach the backend
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Request exceeded its timeout
    #[error("Request timed out")]
    Timeout,
    /// Backend asked us to slow down
    #[error("Rate limited{}", retry_after_ms.map(|ms| format!(", retry after {ms}ms")).unwrap_or_default())]
    RateLimited {
        /// Server hint from `Retry-After`, if any
        retry_after_ms: Option<u64>,
    },
    /// Credential rejected
    #[error("Authentication failed")]
    AuthenticationFailed,
    /// Backend rejected the request as malformed
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// Any other non-success HTTP status
    #[error("Backend returned {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },
    /// Backend answered, but not in a usable form
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Whether retrying the same call may succeed
    ///
    /// Only rate limiting, connection failures and timeouts qualify.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::ConnectionFailed(_) | Self::Timeout
        )
    }
}

/// Description of the active backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    /// Provider name (e.g. "deepseek", "fallback")
    pub provider: String,
    /// Model identifier, or a short label for non-LLM providers
    pub model: String,
    /// Whether the provider reports itself usable
    pub available: bool,
}

/// Provider trait
///
/// Implement this trait to add support for a different backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "deepseek", "openai", "fallback")
    fn name(&self) -> &str;

    /// Model identifier used for requests
    fn model(&self) -> &str;

    /// Check if the provider is configured and usable. Never fails.
    fn is_available(&self) -> bool;

    /// Classify the intent of `text`
    async fn classify_intent(&self, text: &str) -> Result<IntentClassification, ProviderError>;

    /// Rewrite a filled template into the requested register
    async fn refine(&self, request: &RefineRequest) -> Result<String, ProviderError>;

    /// Describe this provider
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            provider: self.name().to_string(),
            model: self.model().to_string(),
            available: self.is_available(),
        }
    }
}
