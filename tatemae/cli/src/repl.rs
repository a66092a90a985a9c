//! Interactive session
//!
//! Reads one message per line and translates it with the current options.
//! Lines starting with `:` are commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::info;

use tatemae_core::{
    setup_provider, ContextTag, FidelityLevel, Lexicon, PolitenessLevel, ProviderKind,
    ProviderSettings, TranslateOptions, Translator,
};

use crate::OutputMode;

const PROMPT: &str = "tatemae> ";

const HELP: &str = "\
Commands:
  :level <business|ultra_polite|casual>   set politeness level
  :fidelity <high|medium|low>             set fidelity
  :context <business|personal|recruiter|none>
                                          set or clear context
  :model [auto|deepseek|openai|fallback]  show or switch provider
  :help                                   show this help
  :quit, :q                               leave
Anything else is translated.";

/// One parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Translate the text
    Translate(String),
    /// Change the politeness level
    Level(PolitenessLevel),
    /// Change the fidelity
    Fidelity(FidelityLevel),
    /// Set or clear the context
    Context(Option<ContextTag>),
    /// Show the active provider
    ShowModel,
    /// Switch provider
    SwitchModel(ProviderKind),
    /// Print help
    Help,
    /// Leave the session
    Quit,
    /// Blank line
    Empty,
    /// Command that could not be understood
    Invalid(String),
}

impl Command {
    /// Parse one input line
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(rest) = line.strip_prefix(':') else {
            return Self::Translate(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        match (name, arg) {
            ("quit" | "q", _) => Self::Quit,
            ("help" | "h", _) => Self::Help,
            ("model", None) => Self::ShowModel,
            ("model", Some(kind)) => kind
                .parse()
                .map_or_else(|e| Self::Invalid(format!("{e}")), Self::SwitchModel),
            ("level", Some(level)) => level
                .parse()
                .map_or_else(|e| Self::Invalid(format!("{e}")), Self::Level),
            ("fidelity", Some(fidelity)) => fidelity
                .parse()
                .map_or_else(|e| Self::Invalid(format!("{e}")), Self::Fidelity),
            ("context", Some("none")) => Self::Context(None),
            ("context", Some(context)) => context
                .parse()
                .map_or_else(|e| Self::Invalid(format!("{e}")), |tag| Self::Context(Some(tag))),
            ("level" | "fidelity" | "context", None) => {
                Self::Invalid(format!(":{name} needs a value"))
            }
            _ => Self::Invalid(format!("unknown command ':{name}' (try :help)")),
        }
    }
}

/// Interactive translator session
pub struct Repl {
    translator: Translator,
    settings: ProviderSettings,
    lexicon: Arc<Lexicon>,
    options: TranslateOptions,
    mode: OutputMode,
    stdout: Stdout,
}

impl Repl {
    /// Create a session with starting options
    pub fn new(
        translator: Translator,
        settings: ProviderSettings,
        lexicon: Arc<Lexicon>,
        options: TranslateOptions,
        mode: OutputMode,
    ) -> Self {
        Self {
            translator,
            settings,
            lexicon,
            options,
            mode,
            stdout: tokio::io::stdout(),
        }
    }

    /// Read lines until `:quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        let info = self.translator.provider_info();
        self.say(&format!(
            "tatemae {} ({} / {}). Type :help for commands.",
            env!("CARGO_PKG_VERSION"),
            info.provider,
            info.model
        ))
        .await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            self.prompt().await?;
            let Some(line) = lines.next_line().await.context("Failed to read input")? else {
                break;
            };

            if !self.handle(Command::parse(&line)).await? {
                break;
            }
        }

        info!("Interactive session ended");
        Ok(())
    }

    /// Apply one command; `false` ends the session
    async fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Quit => return Ok(false),
            Command::Empty => {}
            Command::Help => self.say(HELP).await?,
            Command::Translate(text) => {
                let result = self.translator.translate(&text, &self.options).await;
                self.say(&self.mode.render(&result)).await?;
            }
            Command::Level(level) => {
                self.options.level = level.as_str().to_string();
                self.say(&format!("level: {level}")).await?;
            }
            Command::Fidelity(fidelity) => {
                self.options.fidelity = Some(fidelity.as_str().to_string());
                self.say(&format!("fidelity: {fidelity}")).await?;
            }
            Command::Context(context) => {
                self.options.context = context.map(|tag| tag.as_str().to_string());
                let shown = context.map_or("none", |tag| tag.as_str());
                self.say(&format!("context: {shown}")).await?;
            }
            Command::ShowModel => {
                let info = self.translator.provider_info();
                self.say(&format!(
                    "provider: {}  model: {}  available: {}",
                    info.provider, info.model, info.available
                ))
                .await?;
            }
            Command::SwitchModel(kind) => self.switch_provider(kind).await?,
            Command::Invalid(message) => self.say(&format!("error: {message}")).await?,
        }
        Ok(true)
    }

    async fn switch_provider(&mut self, kind: ProviderKind) -> Result<()> {
        self.settings.kind = kind;
        let setup = setup_provider(&self.settings);
        let fallback_note = if setup.is_fallback() && kind != ProviderKind::Fallback {
            " (remote unavailable, using fallback)"
        } else {
            ""
        };

        self.translator = Translator::with_lexicon(setup.provider, Arc::clone(&self.lexicon));
        let info = self.translator.provider_info();
        self.say(&format!("provider: {} / {}{fallback_note}", info.provider, info.model))
            .await
    }

    async fn prompt(&mut self) -> Result<()> {
        self.stdout.write_all(PROMPT.as_bytes()).await?;
        self.stdout.flush().await?;
        Ok(())
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.stdout.write_all(text.as_bytes()).await?;
        self.stdout.write_all(b"\n").await?;
        self.stdout.flush().await?;
        Ok(())
    }
}
