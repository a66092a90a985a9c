//! Provider Abstraction Layer
//!
//! The pipeline asks a provider two questions: what does this message mean,
//! and how would a polite speaker say it. Two implementations answer them:
//!
//! - [`RemoteProvider`]: OpenAI-compatible chat-completions services
//!   (DeepSeek, OpenAI) with bounded retry on transient failures
//! - [`FallbackProvider`]: keyword rules and regex cleanup, fully offline
//!
//! [`setup_provider`] picks one from [`ProviderSettings`].

pub mod fallback;
pub mod prompts;
pub mod remote;
pub mod retry;
pub mod selection;
pub mod traits;

pub use fallback::FallbackProvider;
pub use remote::{RemoteConfig, RemoteProvider, RemoteService};
pub use retry::RetryConfig;
pub use selection::{setup_provider, ProviderKind, ProviderSettings, ProviderSetup, SelectionState};
pub use traits::{IntentClassification, LlmProvider, ProviderError, ProviderInfo, RefineRequest};
