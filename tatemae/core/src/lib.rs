//! Tatemae Core - Direct Statements to Polite Japanese
//!
//! This crate turns a blunt message ("I'm not interested in this job.") into
//! the socially softened Japanese a careful speaker would actually send. It
//! has no UI dependencies; the `tatemae` binary and any other adapter call
//! into [`Translator`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Translator                             │
//! │   validate ──► Pipeline ──► TranslationResult                 │
//! │                   │                                           │
//! │   ┌───────────┬───┴────────┬───────────────┬──────────────┐   │
//! │   │ detect    │ classify   │ fill template │ refine       │   │
//! │   │ language  │ intent     │ (Lexicon)     │ politeness   │   │
//! │   └───────────┴─────┬──────┴───────────────┴──────┬───────┘   │
//! │                     └──────── LlmProvider ────────┘           │
//! │                     ┌─────────────┴─────────────┐             │
//! │               RemoteProvider             FallbackProvider     │
//! │           (DeepSeek / OpenAI + retry)    (keywords + regex)   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use tatemae_core::{load_config, setup_provider, TranslateOptions, Translator};
//!
//! # async fn demo() -> Result<(), tatemae_core::ConfigError> {
//! let config = load_config()?;
//! let setup = setup_provider(&config.provider_settings());
//! let translator = Translator::new(setup.provider);
//!
//! let options = TranslateOptions::with_level("ultra_polite");
//! let result = translator.translate("I disagree with this plan", &options).await;
//! println!("{}", result.tatemae_text);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Overview
//!
//! - [`types`]: Intents, politeness levels, fidelity, context tags, languages
//! - [`language`]: Script-based source language detection
//! - [`lexicon`]: Templates, softening phrases and politeness profiles
//! - [`provider`]: Provider trait, remote and fallback providers, retry, selection
//! - [`pipeline`]: Per-call state and the four stages
//! - [`validation`]: Input checks and option coercion
//! - [`translator`]: The public façade
//! - [`config`]: TOML and environment configuration

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod language;
pub mod lexicon;
pub mod pipeline;
pub mod provider;
pub mod translator;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use config::{
    default_config_path, load_config, load_config_from_path, load_config_with_env, ConfigError,
    ConfigOverrides, ConfigSource, TranslatorConfig, TranslatorToml,
};
pub use language::detect_language;
pub use lexicon::{Lexicon, LexiconError, PolitenessProfile};
pub use pipeline::{
    Degradation, Pipeline, PipelineError, Stage, StateError, TranslationRequest, TranslationState,
};
pub use provider::{
    setup_provider, FallbackProvider, IntentClassification, LlmProvider, ProviderError,
    ProviderInfo, ProviderKind, ProviderSettings, ProviderSetup, RefineRequest, RemoteConfig,
    RemoteProvider, RemoteService, RetryConfig, SelectionState,
};
pub use translator::{TranslateOptions, TranslationResult, Translator, ERROR_INTENT, ERROR_TEXT};
pub use types::{ContextTag, FidelityLevel, Intent, Language, ParseEnumError, PolitenessLevel};
pub use validation::{InputLimits, InputValidator, ValidationError};
