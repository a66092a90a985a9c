//! Closed Vocabulary
//!
//! The small enumerations every stage of the pipeline agrees on: intent
//! categories, politeness levels, fidelity levels, context tags and the
//! detected source language.
//!
//! All of them serialize as `snake_case` strings, which is also the form the
//! façade accepts and the form written into a [`crate::TranslationResult`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string did not name any member of a closed set
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    /// Which set was being parsed ("intent", "level", ...)
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ============================================================================
// Intent
// ============================================================================

/// Communicative purpose of the speaker's direct statement
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Declining or rejecting something
    Refusal,
    /// Disagreeing with a statement or idea
    Disagreement,
    /// Postponing or delaying something
    Delay,
    /// Not interested in an opportunity
    Disinterest,
    /// Criticizing or pointing out flaws
    Criticism,
    /// Neutral or polite statement
    #[default]
    NeutralPolite,
}

impl Intent {
    /// Every intent, in classification-prompt order
    pub const ALL: [Intent; 6] = [
        Self::Refusal,
        Self::Disagreement,
        Self::Delay,
        Self::Disinterest,
        Self::Criticism,
        Self::NeutralPolite,
    ];

    /// Wire name of the intent
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Refusal => "refusal",
            Self::Disagreement => "disagreement",
            Self::Delay => "delay",
            Self::Disinterest => "disinterest",
            Self::Criticism => "criticism",
            Self::NeutralPolite => "neutral_polite",
        }
    }

    /// One-line definition used when prompting a classifier
    #[must_use]
    pub fn definition(&self) -> &'static str {
        match self {
            Self::Refusal => "The speaker is declining or rejecting something",
            Self::Disagreement => "The speaker disagrees with a statement or idea",
            Self::Delay => "The speaker is postponing or delaying something",
            Self::Disinterest => "The speaker is not interested in an opportunity",
            Self::Criticism => "The speaker is criticizing or pointing out flaws",
            Self::NeutralPolite => "The speaker is making a neutral or polite statement",
        }
    }
}

impl FromStr for Intent {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("intent", s))
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Politeness Level
// ============================================================================

/// Target formality register
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolitenessLevel {
    /// Standard business keigo
    #[default]
    Business,
    /// Heavy keigo for superiors and important clients
    UltraPolite,
    /// Light polite register for teammates
    Casual,
}

impl PolitenessLevel {
    /// All levels
    pub const ALL: [PolitenessLevel; 3] = [Self::Business, Self::UltraPolite, Self::Casual];

    /// Wire name of the level
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::UltraPolite => "ultra_polite",
            Self::Casual => "casual",
        }
    }

    /// Register description handed to the rewrite prompt
    #[must_use]
    pub fn description_ja(&self) -> &'static str {
        match self {
            Self::Business => "標準的なビジネス敬語（普通の丁寧さ）",
            Self::UltraPolite => "非常に丁寧で改まった敬語（上司や重要な取引先向け）",
            Self::Casual => "カジュアルだが礼儀正しい表現（社内チーム向け）",
        }
    }
}

impl FromStr for PolitenessLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("level", s))
    }
}

impl fmt::Display for PolitenessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Fidelity Level
// ============================================================================

/// How much of the original meaning survives the rewrite
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FidelityLevel {
    /// Close to a direct but polite rendering, minimal euphemism
    High,
    /// Balanced indirection
    #[default]
    Medium,
    /// Maximum indirection, literal meaning may be lost
    Low,
}

impl FidelityLevel {
    /// All fidelity levels
    pub const ALL: [FidelityLevel; 3] = [Self::High, Self::Medium, Self::Low];

    /// Wire name of the fidelity level
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for FidelityLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|fidelity| fidelity.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("fidelity", s))
    }
}

impl fmt::Display for FidelityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Context Tag
// ============================================================================

/// Optional situational tag carried through to the result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextTag {
    /// Work correspondence
    Business,
    /// Friends and family
    Personal,
    /// Replies to recruiters
    Recruiter,
}

impl ContextTag {
    /// All context tags
    pub const ALL: [ContextTag; 3] = [Self::Business, Self::Personal, Self::Recruiter];

    /// Wire name of the context tag
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Personal => "personal",
            Self::Recruiter => "recruiter",
        }
    }
}

impl FromStr for ContextTag {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|context| context.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("context", s))
    }
}

impl fmt::Display for ContextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Language
// ============================================================================

/// Source language of the input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Japanese (kana present)
    Ja,
    /// Chinese (CJK ideographs without kana)
    Zh,
    /// English, and the default for everything else
    En,
}

impl Language {
    /// ISO 639-1 code
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ja => "ja",
            Self::Zh => "zh",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
