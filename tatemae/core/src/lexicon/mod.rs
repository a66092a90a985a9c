//! Lexicon
//!
//! Static phrase data the template generator draws from:
//!
//! - intent → ordered list of sentence templates with `{placeholder}` slots
//! - placeholder → ordered list of candidate softening phrases
//! - politeness level → honorific metadata (verb endings, starters, closings)
//!
//! The built-in lexicon is loaded once and shared read-only. A replacement can
//! be loaded from TOML; it goes through the same [`Lexicon::validate`] check so
//! that a filled template can never contain an unresolved placeholder.
//!
//! ```toml
//! [templates]
//! refusal = ["現在は{soft_reason}、今回は見送らせていただきます。"]
//! # ... one entry per intent
//!
//! [phrases]
//! soft_reason = ["スケジュールの都合上"]
//!
//! [profiles.business]            # optional, built-in profiles otherwise
//! verb_endings = ["ます"]
//! sentence_starters = [""]
//! closings = ["。"]
//! ```

mod builtin;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Intent, PolitenessLevel};

/// `{name}` placeholder syntax
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

static BUILTIN: LazyLock<Arc<Lexicon>> = LazyLock::new(|| Arc::new(Lexicon::builtin()));

/// Errors raised while loading or validating a lexicon
#[derive(Debug, Error)]
pub enum LexiconError {
    /// Lexicon file could not be read
    #[error("Failed to read lexicon at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Lexicon file is not valid TOML for this shape
    #[error("Failed to parse lexicon: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A key under `[templates]` or `[profiles]` is not a known intent/level
    #[error("Unknown key in lexicon: {0}")]
    UnknownKey(#[from] crate::types::ParseEnumError),

    /// An intent has no templates
    #[error("No templates for intent '{0}'")]
    EmptyTemplates(Intent),

    /// A template references a placeholder with no candidate phrases
    #[error("Template placeholder '{{{placeholder}}}' has no phrases (template: {template})")]
    MissingPhrases {
        /// Placeholder name without braces
        placeholder: String,
        /// Template that referenced it
        template: String,
    },
}

/// Honorific metadata for one politeness level
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolitenessProfile {
    /// Verb endings typical of the register
    pub verb_endings: Vec<String>,
    /// Sentence openers (may be empty strings)
    pub sentence_starters: Vec<String>,
    /// Sentence closings
    pub closings: Vec<String>,
}

/// On-disk shape of a lexicon
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LexiconToml {
    templates: HashMap<String, Vec<String>>,
    phrases: HashMap<String, Vec<String>>,
    profiles: HashMap<String, PolitenessProfile>,
}

/// Templates, phrases and politeness profiles
#[derive(Clone, Debug)]
pub struct Lexicon {
    templates: HashMap<Intent, Vec<String>>,
    phrases: HashMap<String, Vec<String>>,
    profiles: HashMap<PolitenessLevel, PolitenessProfile>,
}

impl Lexicon {
    /// Build the built-in lexicon
    #[must_use]
    pub fn builtin() -> Self {
        let templates: HashMap<Intent, Vec<String>> = Intent::ALL
            .into_iter()
            .map(|intent| {
                let list: Vec<String> = builtin::templates(intent)
                    .iter()
                    .map(|t| (*t).to_string())
                    .collect();
                (intent, list)
            })
            .collect();

        let phrases: HashMap<String, Vec<String>> = builtin::PHRASES
            .iter()
            .map(|(name, list)| {
                (
                    (*name).to_string(),
                    list.iter().map(|p| (*p).to_string()).collect(),
                )
            })
            .collect();

        let profiles: HashMap<PolitenessLevel, PolitenessProfile> = PolitenessLevel::ALL
            .into_iter()
            .map(|level| {
                let data = builtin::profile(level);
                let owned =
                    |list: &[&str]| -> Vec<String> { list.iter().map(|s| (*s).to_string()).collect() };
                (
                    level,
                    PolitenessProfile {
                        verb_endings: owned(data.verb_endings),
                        sentence_starters: owned(data.sentence_starters),
                        closings: owned(data.closings),
                    },
                )
            })
            .collect();

        Self {
            templates,
            phrases,
            profiles,
        }
    }

    /// Shared handle to the built-in lexicon (constructed on first use)
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Parse and validate a lexicon from TOML
    ///
    /// Profiles missing from the document are taken from the built-in lexicon.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML, unknown intent/level keys, or a
    /// lexicon that fails [`Lexicon::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self, LexiconError> {
        let raw: LexiconToml = toml::from_str(content)?;

        let mut templates = HashMap::new();
        for (key, list) in raw.templates {
            templates.insert(key.parse::<Intent>()?, list);
        }

        let mut profiles = Self::builtin().profiles;
        for (key, profile) in raw.profiles {
            profiles.insert(key.parse::<PolitenessLevel>()?, profile);
        }

        let lexicon = Self {
            templates,
            phrases: raw.phrases,
            profiles,
        };
        lexicon.validate()?;
        Ok(lexicon)
    }

    /// Load and validate a lexicon file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails [`Lexicon::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let content = std::fs::read_to_string(path).map_err(|e| LexiconError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let lexicon = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded custom lexicon");
        Ok(lexicon)
    }

    /// Check that every intent has templates and every placeholder has phrases
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), LexiconError> {
        for intent in Intent::ALL {
            let templates = self.templates(intent);
            if templates.is_empty() {
                return Err(LexiconError::EmptyTemplates(intent));
            }

            for template in templates {
                for placeholder in placeholders(template) {
                    if self.phrases(placeholder).is_empty() {
                        return Err(LexiconError::MissingPhrases {
                            placeholder: placeholder.to_string(),
                            template: template.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Templates registered for `intent` (empty if none)
    #[must_use]
    pub fn templates(&self, intent: Intent) -> &[String] {
        self.templates.get(&intent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Candidate phrases for a placeholder name (empty if none)
    #[must_use]
    pub fn phrases(&self, placeholder: &str) -> &[String] {
        self.phrases.get(placeholder).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Honorific metadata for a politeness level
    #[must_use]
    pub fn profile(&self, level: PolitenessLevel) -> Option<&PolitenessProfile> {
        self.profiles.get(&level)
    }

    /// Names of all placeholders with phrase lists
    pub fn placeholder_names(&self) -> impl Iterator<Item = &str> {
        self.phrases.keys().map(String::as_str)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Distinct placeholder names in `template`, in order of first appearance
#[must_use]
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for captures in PLACEHOLDER.captures_iter(template) {
        if let Some(name) = captures.get(1).map(|m| m.as_str()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Whether `text` still contains `{placeholder}` syntax
#[must_use]
pub fn has_placeholder(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

#[cfg(test)]
impl Lexicon {
    /// Built-in profiles with the given tables, skipping [`Lexicon::validate`]
    pub(crate) fn unchecked(
        templates: HashMap<Intent, Vec<String>>,
        phrases: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            templates,
            phrases,
            profiles: Self::builtin().profiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lexicon_is_valid() {
        let lexicon = Lexicon::builtin();
        lexicon.validate().unwrap();

        for intent in Intent::ALL {
            assert_eq!(lexicon.templates(intent).len(), 3, "{intent}");
        }
        assert_eq!(lexicon.placeholder_names().count(), 10);
    }

    #[test]
    fn test_every_builtin_phrase_list_is_used() {
        let lexicon = Lexicon::builtin();
        let used: Vec<&str> = Intent::ALL
            .into_iter()
            .flat_map(|intent| lexicon.templates(intent).iter())
            .flat_map(|t| placeholders(t))
            .collect();

        for name in lexicon.placeholder_names() {
            assert!(used.contains(&name), "unused phrase list: {name}");
        }
    }

    #[test]
    fn test_placeholders_in_order_without_duplicates() {
        assert_eq!(
            placeholders("{a}と{b_c}、また{a}"),
            vec!["a", "b_c"]
        );
        assert!(placeholders("承知いたしました。").is_empty());
        assert!(has_placeholder("現在は{soft_reason}"));
        assert!(!has_placeholder("{ not a placeholder }"));
    }

    #[test]
    fn test_profiles_present_for_all_levels() {
        let lexicon = Lexicon::builtin();
        let ultra = lexicon.profile(PolitenessLevel::UltraPolite).unwrap();
        assert!(ultra.verb_endings.contains(&"いたします".to_string()));
        assert_eq!(ultra.sentence_starters.len(), 2);
        assert!(lexicon.profile(PolitenessLevel::Casual).is_some());
    }

    fn minimal_toml(extra: &str) -> String {
        let mut doc = String::from("[templates]\n");
        for intent in Intent::ALL {
            doc.push_str(&format!("{} = [\"{{greeting}}。\"]\n", intent.as_str()));
        }
        doc.push_str("\n[phrases]\ngreeting = [\"承知いたしました\"]\n");
        doc.push_str(extra);
        doc
    }

    #[test]
    fn test_from_toml_str_accepts_complete_lexicon() {
        let lexicon = Lexicon::from_toml_str(&minimal_toml("")).unwrap();
        assert_eq!(lexicon.templates(Intent::Delay), ["{greeting}。"]);
        assert_eq!(lexicon.phrases("greeting"), ["承知いたしました"]);
        // Profiles fall back to built-in data
        assert!(lexicon.profile(PolitenessLevel::Business).is_some());
    }

    #[test]
    fn test_from_toml_str_overrides_profile() {
        let extra = "\n[profiles.casual]\nverb_endings = [\"っす\"]\n";
        let lexicon = Lexicon::from_toml_str(&minimal_toml(extra)).unwrap();
        let casual = lexicon.profile(PolitenessLevel::Casual).unwrap();
        assert_eq!(casual.verb_endings, vec!["っす".to_string()]);
        assert!(casual.closings.is_empty());
    }

    #[test]
    fn test_from_toml_str_rejects_missing_intent() {
        let err = Lexicon::from_toml_str(
            "[templates]\nrefusal = [\"今回は見送ります。\"]\n",
        )
        .unwrap_err();
        assert!(matches!(err, LexiconError::EmptyTemplates(Intent::Disagreement)));
    }

    #[test]
    fn test_from_toml_str_rejects_unknown_placeholder() {
        let doc = minimal_toml("").replace("{greeting}", "{farewell}");
        let err = Lexicon::from_toml_str(&doc).unwrap_err();
        match err {
            LexiconError::MissingPhrases { placeholder, .. } => assert_eq!(placeholder, "farewell"),
            other => panic!("Expected MissingPhrases, got {other:?}"),
        }
    }

    #[test]
    fn test_from_toml_str_rejects_unknown_intent_key() {
        let doc = minimal_toml("").replace("[templates]\n", "[templates]\nsarcasm = [\"x\"]\n");
        assert!(matches!(
            Lexicon::from_toml_str(&doc),
            Err(LexiconError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(minimal_toml("").as_bytes()).unwrap();

        let lexicon = Lexicon::load(file.path()).unwrap();
        assert_eq!(lexicon.templates(Intent::Refusal).len(), 1);

        let missing = Lexicon::load(Path::new("/nonexistent/lexicon.toml"));
        assert!(matches!(missing, Err(LexiconError::ReadError { .. })));
    }
}
