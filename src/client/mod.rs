//! Translation service client boundary.
//!
//! Every call is blocking and fallible. Callers run them off the UI thread.

pub mod deepl;

use crate::error::ClientResult;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub use deepl::DeepLClient;

/// Which side of a translation a language list is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageRole {
    Source,
    Target,
}

impl LanguageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageRole::Source => "source",
            LanguageRole::Target => "target",
        }
    }
}

/// A supported language as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Language {
    #[serde(rename = "language")]
    pub code: String,
    pub name: String,
}

/// Tone bias applied to a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Formality {
    #[default]
    Automatic,
    PreferMore,
    PreferLess,
}

impl Formality {
    pub const ALL: [Formality; 3] = [
        Formality::Automatic,
        Formality::PreferMore,
        Formality::PreferLess,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Formality::Automatic => "Automatic",
            Formality::PreferMore => "Formal tone",
            Formality::PreferLess => "Informal tone",
        }
    }

    /// Value of the `formality` request parameter; `None` lets the service decide.
    pub fn api_value(self) -> Option<&'static str> {
        match self {
            Formality::Automatic => None,
            Formality::PreferMore => Some("prefer_more"),
            Formality::PreferLess => Some("prefer_less"),
        }
    }
}

/// Optional translate parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    pub source_lang: Option<String>,
    pub formality: Option<Formality>,
    pub glossary_id: Option<String>,
}

/// Result of a translate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub detected_source_lang: Option<String>,
}

/// Glossary metadata.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlossaryInfo {
    #[serde(rename = "glossary_id")]
    pub id: String,
    pub name: String,
    pub source_lang: String,
    pub target_lang: String,
    pub entry_count: u64,
    pub creation_time: DateTime<Utc>,
}

/// A single source → target term override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryEntry {
    pub source: String,
    pub target: String,
}

impl GlossaryEntry {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A (source, target) combination glossaries can be created for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguagePair {
    pub source_lang: String,
    pub target_lang: String,
}

/// Operations offered by the translation service.
pub trait TranslationClient: Send + Sync {
    fn list_languages(&self, role: LanguageRole) -> ClientResult<Vec<Language>>;

    fn translate(
        &self,
        text: &str,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> ClientResult<Translation>;

    fn list_glossaries(&self) -> ClientResult<Vec<GlossaryInfo>>;

    fn glossary_entries(&self, id: &str) -> ClientResult<Vec<GlossaryEntry>>;

    fn create_glossary(
        &self,
        name: &str,
        source_lang: &str,
        target_lang: &str,
        entries: &[GlossaryEntry],
    ) -> ClientResult<GlossaryInfo>;

    fn delete_glossary(&self, id: &str) -> ClientResult<()>;

    fn glossary_language_pairs(&self) -> ClientResult<Vec<LanguagePair>>;
}
