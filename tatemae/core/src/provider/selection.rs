//! Provider selection
//!
//! Evaluated once when a translator is built. Each remote candidate either
//! comes up (`RemoteConfigured`) or records why it could not
//! (`RemoteUnavailable`); if none comes up the local fallback is used.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::fallback::FallbackProvider;
use super::remote::{RemoteConfig, RemoteProvider, RemoteService};
use super::retry::RetryConfig;
use super::traits::LlmProvider;
use crate::types::ParseEnumError;

/// Which backend the caller asked for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// DeepSeek, then OpenAI, then fallback
    #[default]
    Auto,
    /// DeepSeek only, then fallback
    Deepseek,
    /// OpenAI only, then fallback
    Openai,
    /// Local rules only
    Fallback,
}

impl ProviderKind {
    /// All kinds
    pub const ALL: [ProviderKind; 4] = [Self::Auto, Self::Deepseek, Self::Openai, Self::Fallback];

    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Deepseek => "deepseek",
            Self::Openai => "openai",
            Self::Fallback => "fallback",
        }
    }

    /// Remote services to try, in order
    #[must_use]
    pub fn candidates(&self) -> &'static [RemoteService] {
        match self {
            Self::Auto => &[RemoteService::DeepSeek, RemoteService::OpenAi],
            Self::Deepseek => &[RemoteService::DeepSeek],
            Self::Openai => &[RemoteService::OpenAi],
            Self::Fallback => &[],
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError {
                kind: "provider",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Already-validated settings the selector works from
#[derive(Clone, Debug)]
pub struct ProviderSettings {
    /// Requested backend
    pub kind: ProviderKind,
    /// DeepSeek connection settings
    pub deepseek: RemoteConfig,
    /// OpenAI connection settings
    pub openai: RemoteConfig,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Auto,
            deepseek: RemoteConfig::new(RemoteService::DeepSeek),
            openai: RemoteConfig::new(RemoteService::OpenAi),
        }
    }
}

impl ProviderSettings {
    /// Settings that always select the local fallback
    #[must_use]
    pub fn fallback_only() -> Self {
        Self {
            kind: ProviderKind::Fallback,
            ..Default::default()
        }
    }

    /// Apply temperature, timeout and retry policy to both services
    #[must_use]
    pub fn with_shared(mut self, temperature: f32, timeout: Duration, retry: &RetryConfig) -> Self {
        for remote in [&mut self.deepseek, &mut self.openai] {
            remote.temperature = temperature;
            remote.timeout = timeout;
            remote.retry = retry.clone();
        }
        self
    }

    fn remote(&self, service: RemoteService) -> &RemoteConfig {
        match service {
            RemoteService::DeepSeek => &self.deepseek,
            RemoteService::OpenAi => &self.openai,
        }
    }
}

/// One step of the selection trail
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionState {
    /// Remote client built and active
    RemoteConfigured(RemoteService),
    /// Remote client could not be built
    RemoteUnavailable {
        /// Service that was tried
        service: RemoteService,
        /// Why it was rejected
        reason: String,
    },
    /// Local fallback active
    FallbackActive,
}

/// Outcome of provider selection
#[derive(Clone)]
pub struct ProviderSetup {
    /// The provider to hand to the translator
    pub provider: Arc<dyn LlmProvider>,
    /// Every state visited, ending in the active one
    pub selection: Vec<SelectionState>,
}

impl ProviderSetup {
    /// Final state of the selection
    #[must_use]
    pub fn active(&self) -> &SelectionState {
        self.selection
            .last()
            .unwrap_or(&SelectionState::FallbackActive)
    }

    /// Whether the local fallback was selected
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self.active(), SelectionState::FallbackActive)
    }
}

impl fmt::Debug for ProviderSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSetup")
            .field("provider", &self.provider.name())
            .field("selection", &self.selection)
            .finish()
    }
}

/// Choose and build a provider
///
/// Never fails: a remote candidate that cannot be built is recorded in the
/// trail and the next one is tried, ending at the local fallback.
#[must_use]
pub fn setup_provider(settings: &ProviderSettings) -> ProviderSetup {
    let mut selection = Vec::new();

    for &service in settings.kind.candidates() {
        match RemoteProvider::new(settings.remote(service).clone()) {
            Ok(provider) => {
                info!(provider = service.as_str(), "Using remote provider");
                selection.push(SelectionState::RemoteConfigured(service));
                return ProviderSetup {
                    provider: Arc::new(provider),
                    selection,
                };
            }
            Err(e) => {
                warn!(provider = service.as_str(), error = %e, "Remote provider unavailable");
                selection.push(SelectionState::RemoteUnavailable {
                    service,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!("Using local fallback provider");
    selection.push(SelectionState::FallbackActive);
    ProviderSetup {
        provider: Arc::new(FallbackProvider::new()),
        selection,
    }
}
