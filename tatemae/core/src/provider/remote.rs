//! Remote Provider
//!
//! LLM provider for OpenAI-compatible chat-completions services.
//!
//! # Wire Format
//!
//! Both supported services accept the same request:
//! - `POST {base_url}/chat/completions` with `Authorization: Bearer <key>`
//! - JSON body `{ model, messages: [{role, content}], temperature }`
//!
//! and answer with the generated text at `choices[0].message.content`.
//!
//! Every call goes through the configured [`RetryConfig`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::prompts::{self, CLASSIFY_SYSTEM_PROMPT, REFINE_SYSTEM_PROMPT, REFINE_TEMPERATURE};
use super::retry::RetryConfig;
use super::traits::{IntentClassification, LlmProvider, ProviderError, RefineRequest};

/// Keys at or below this length are treated as placeholders
pub const MIN_API_KEY_LEN: usize = 20;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Services
// ============================================================================

/// Chat-completions services the remote provider knows how to reach
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemoteService {
    /// DeepSeek
    DeepSeek,
    /// OpenAI
    OpenAi,
}

impl RemoteService {
    /// Provider name reported through [`LlmProvider::name`]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::OpenAi => "openai",
        }
    }

    /// Base URL used when none is configured
    #[must_use]
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::DeepSeek => "https://api.deepseek.com",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Model used when none is configured
    #[must_use]
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek-chat",
            Self::OpenAi => "gpt-4",
        }
    }
}

impl fmt::Display for RemoteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection settings for one remote service
#[derive(Clone, PartialEq)]
pub struct RemoteConfig {
    /// Which service this is
    pub service: RemoteService,
    /// Bearer credential
    pub api_key: Option<String>,
    /// Endpoint root; `/chat/completions` is appended
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature for classification
    pub temperature: f32,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry policy wrapped around every call
    pub retry: RetryConfig,
}

impl RemoteConfig {
    /// Settings with the service defaults and no credential
    #[must_use]
    pub fn new(service: RemoteService) -> Self {
        Self {
            service,
            api_key: None,
            base_url: service.default_base_url().to_string(),
            model: service.default_model().to_string(),
            temperature: 0.7,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
        }
    }

    /// Set the credential
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("service", &self.service)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Whether `key` passes the minimum-length sanity check
#[must_use]
pub fn is_usable_key(key: &str) -> bool {
    key.len() > MIN_API_KEY_LEN
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

// ============================================================================
// Provider
// ============================================================================

/// Remote chat-completions provider
#[derive(Clone)]
pub struct RemoteProvider {
    config: RemoteConfig,
    api_key: String,
    http_client: reqwest::Client,
}

impl RemoteProvider {
    /// Build a provider from settings
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unavailable`] if the credential is missing,
    /// fails the length check, or the HTTP client cannot be constructed.
    pub fn new(config: RemoteConfig) -> Result<Self, ProviderError> {
        let api_key = match config.api_key.as_deref() {
            Some(key) if is_usable_key(key) => key.to_string(),
            Some(_) => {
                return Err(ProviderError::Unavailable(format!(
                    "{} API key is too short",
                    config.service
                )))
            }
            None => {
                return Err(ProviderError::Unavailable(format!(
                    "{} API key not configured",
                    config.service
                )))
            }
        };

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("HTTP client: {e}")))?;

        info!(
            provider = config.service.as_str(),
            model = %config.model,
            base_url = %config.base_url,
            "Remote provider initialized"
        );

        Ok(Self {
            config,
            api_key,
            http_client,
        })
    }

    /// Settings this provider was built from
    #[must_use]
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Get chat completions endpoint URL
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// One request, no retry
    async fn chat_once(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
        };

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1_000));
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, retry_after_ms, body));
        }

        let parsed: ChatResponse = response.json().await.map_err(map_transport_error)?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse("no choices in response".into()))
    }

    /// One logical call with retry
    async fn chat(
        &self,
        label: &str,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        self.config
            .retry
            .run(label, move || self.chat_once(system, user, temperature))
            .await
    }
}

impl fmt::Debug for RemoteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteProvider")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Map a non-success status to the error taxonomy
fn map_status(status: StatusCode, retry_after_ms: Option<u64>, body: String) -> ProviderError {
    match status.as_u16() {
        429 => ProviderError::RateLimited { retry_after_ms },
        401 | 403 => ProviderError::AuthenticationFailed,
        code @ 400..=499 => ProviderError::BadRequest(if body.is_empty() {
            format!("HTTP {code}")
        } else {
            body
        }),
        code => ProviderError::Http { status: code, body },
    }
}

/// Map a reqwest failure to the error taxonomy
fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else if e.is_decode() {
        ProviderError::MalformedResponse(e.to_string())
    } else if e.is_builder() {
        ProviderError::BadRequest(e.to_string())
    } else {
        ProviderError::ConnectionFailed(e.to_string())
    }
}

#[async_trait]
impl LlmProvider for RemoteProvider {
    fn name(&self) -> &str {
        self.config.service.as_str()
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_available(&self) -> bool {
        is_usable_key(&self.api_key)
    }

    async fn classify_intent(&self, text: &str) -> Result<IntentClassification, ProviderError> {
        let prompt = prompts::classification_prompt(text);
        let reply = self
            .chat("classify_intent", CLASSIFY_SYSTEM_PROMPT, &prompt, self.config.temperature)
            .await?;

        let classification = prompts::parse_classification(&reply);
        debug!(
            provider = self.name(),
            intent = %classification.intent,
            confidence = classification.confidence,
            "Intent classified"
        );
        Ok(classification)
    }

    async fn refine(&self, request: &RefineRequest) -> Result<String, ProviderError> {
        let prompt = prompts::refine_prompt(request);
        let reply = self
            .chat("refine", REFINE_SYSTEM_PROMPT, &prompt, REFINE_TEMPERATURE)
            .await?;

        let refined = prompts::strip_wrapping_quotes(&reply);
        if refined.is_empty() {
            return Err(ProviderError::MalformedResponse("empty refinement".into()));
        }
        Ok(refined.to_string())
    }
}
