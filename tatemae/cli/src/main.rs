//! Tatemae - Command-line Translator
//!
//! Thin front end over `tatemae_core`: parse arguments, load configuration,
//! pick a provider, then translate once or open an interactive session.
//!
//! # Usage
//!
//! ```bash
//! # One message
//! tatemae -m "I'm not interested in this job."
//!
//! # From a pipe, text only
//! echo "Let's postpone this" | tatemae --stdin -q
//!
//! # Full result as JSON, offline
//! tatemae -m "I disagree" --model fallback --json
//!
//! # Interactive session (default when no message is given)
//! tatemae -l ultra_polite
//!
//! # Verbose logging
//! RUST_LOG=debug tatemae -m "Maybe later"
//! ```

mod repl;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use tatemae_core::{
    load_config_from_path, setup_provider, ConfigOverrides, Lexicon, ProviderKind,
    TranslateOptions, TranslationResult, Translator, TranslatorConfig,
};

use repl::Repl;

/// Tatemae - say what you mean, politely, in Japanese
#[derive(Parser, Debug)]
#[command(name = "tatemae")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Message to translate
    #[arg(short = 'm', long, value_name = "TEXT", conflicts_with = "stdin")]
    message: Option<String>,

    /// Read the message from standard input
    #[arg(long)]
    stdin: bool,

    /// Politeness level (business, ultra_polite, casual)
    #[arg(short = 'l', long, env = "TATEMAE_LEVEL", default_value = "business")]
    level: String,

    /// Context tag (business, personal, recruiter)
    #[arg(short = 'c', long)]
    context: Option<String>,

    /// How closely to follow the original meaning (high, medium, low)
    #[arg(short = 'f', long, default_value = "medium")]
    fidelity: String,

    /// Provider to use (auto, deepseek, openai, fallback)
    #[arg(long, value_name = "PROVIDER")]
    model: Option<ProviderKind>,

    /// Configuration file path
    #[arg(long, env = "TATEMAE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Replacement lexicon file
    #[arg(long, value_name = "FILE")]
    lexicon: Option<PathBuf>,

    /// Print only the translated text
    #[arg(short = 'q', long, conflicts_with = "json")]
    quiet: bool,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Show intent, confidence and provider details
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Start an interactive session
    #[arg(short = 'i', long)]
    interactive: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn options(&self) -> TranslateOptions {
        TranslateOptions {
            level: self.level.clone(),
            context: self.context.clone(),
            fidelity: Some(self.fidelity.clone()),
        }
    }

    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(kind) = self.model {
            overrides = overrides.with_provider_kind(kind);
        }
        if let Some(ref level) = self.log_level {
            overrides = overrides.with_log_level(level.clone());
        }
        if let Some(ref path) = self.lexicon {
            overrides = overrides.with_lexicon_path(path.clone());
        }
        overrides
    }
}

/// How a translation is printed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Text only
    Quiet,
    /// Text, plus details with `--verbose`
    Plain {
        /// Include intent, confidence and language
        verbose: bool,
    },
    /// Serialized result
    Json,
}

impl OutputMode {
    fn from_args(args: &Args) -> Self {
        if args.json {
            Self::Json
        } else if args.quiet {
            Self::Quiet
        } else {
            Self::Plain {
                verbose: args.verbose,
            }
        }
    }

    /// Render a result for the terminal
    pub fn render(self, result: &TranslationResult) -> String {
        match self {
            Self::Quiet => result.tatemae_text.clone(),
            Self::Json => serde_json::to_string_pretty(result)
                .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}")),
            Self::Plain { verbose } => {
                let mut out = result.tatemae_text.clone();
                if verbose {
                    let language = result
                        .detected_language
                        .map_or("-", |language| language.as_str());
                    out.push_str(&format!(
                        "\n  intent: {} ({:.2})  language: {}  level: {}",
                        result.intent, result.confidence, language, result.level
                    ));
                }
                if let Some(ref error) = result.error {
                    out.push_str(&format!("\n  error: {error}"));
                }
                out
            }
        }
    }
}

/// Initialize logging on stderr with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("tatemae={level},tatemae_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration, then layer command-line overrides on top
fn resolve_config(args: &Args) -> Result<TranslatorConfig> {
    let mut config =
        load_config_from_path(args.config.clone()).context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    Ok(config)
}

/// Built-in lexicon, or the configured replacement
fn resolve_lexicon(config: &TranslatorConfig) -> Result<Arc<Lexicon>> {
    match config.lexicon_path {
        Some(ref path) => {
            let lexicon = Lexicon::load(path)
                .with_context(|| format!("Failed to load lexicon: {}", path.display()))?;
            Ok(Arc::new(lexicon))
        }
        None => Ok(Lexicon::shared()),
    }
}

async fn read_stdin() -> Result<String> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read standard input")?;
    Ok(input)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env file is not an error
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    init_logging(&config.log_level);

    // Loading ran before the subscriber existed
    for ignored in config.ignored_values() {
        warn!(value = %ignored, "Ignored configuration value");
    }

    debug!(config = ?config, "Configuration loaded");

    let lexicon = resolve_lexicon(&config)?;
    let settings = config.provider_settings();
    let setup = setup_provider(&settings);
    info!(selection = ?setup.selection, "Provider selected");

    let translator = Translator::with_lexicon(Arc::clone(&setup.provider), Arc::clone(&lexicon));
    let mode = OutputMode::from_args(&args);

    let message = if args.stdin {
        Some(read_stdin().await?)
    } else {
        args.message.clone()
    };

    match message {
        Some(text) if !args.interactive => {
            if text.trim().is_empty() {
                eprintln!("Error: no input text");
                return Ok(ExitCode::FAILURE);
            }

            let result = translator.translate(text.trim(), &args.options()).await;
            println!("{}", mode.render(&result));

            Ok(if result.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        _ => {
            let mut repl = Repl::new(translator, settings, lexicon, args.options(), mode);
            repl.run().await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
