//! Language catalog fetched once at startup.

use crate::client::{Language, LanguageRole};
use crate::config::DETECT_LANGUAGE_LABEL;
use crate::error::{AppError, Result};

/// Source and target language lists.
///
/// Immutable after construction: the view selects by position, so the
/// order handed out by `options` must never change.
#[derive(Debug, Clone, Default)]
pub struct LanguageCatalog {
    source: Vec<Language>,
    target: Vec<Language>,
}

impl LanguageCatalog {
    pub fn new(source: Vec<Language>, target: Vec<Language>) -> Self {
        Self { source, target }
    }

    /// Display names in selection order.
    ///
    /// The source list starts with the auto-detect option.
    pub fn options(&self, role: LanguageRole) -> Vec<String> {
        match role {
            LanguageRole::Source => std::iter::once(DETECT_LANGUAGE_LABEL.to_string())
                .chain(self.source.iter().map(|l| l.name.clone()))
                .collect(),
            LanguageRole::Target => self.target.iter().map(|l| l.name.clone()).collect(),
        }
    }

    /// Resolves a source option index; index 0 is auto-detect (`None`).
    pub fn source_code_at(&self, index: usize) -> Result<Option<String>> {
        if index == 0 {
            return Ok(None);
        }
        self.source
            .get(index - 1)
            .map(|l| Some(l.code.clone()))
            .ok_or(AppError::SelectionOutOfRange {
                index,
                len: self.source.len() + 1,
            })
    }

    /// Resolves a target option index.
    pub fn target_code_at(&self, index: usize) -> Result<String> {
        self.target
            .get(index)
            .map(|l| l.code.clone())
            .ok_or(AppError::SelectionOutOfRange {
                index,
                len: self.target.len(),
            })
    }

    /// Position of a target language code, ignoring case.
    pub fn target_index_of(&self, code: &str) -> Option<usize> {
        self.target
            .iter()
            .position(|l| l.code.eq_ignore_ascii_case(code))
    }
}
