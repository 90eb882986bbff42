//! Live settings for the next translation.

use crate::client::Formality;

/// Input text and selected options.
///
/// Owned by the controller on the UI thread; read once per commit.
#[derive(Debug, Default)]
pub struct SessionState {
    input_text: String,
    input_revision: u64,
    source_lang: Option<String>,
    target_lang: Option<String>,
    formality: Formality,
    glossary_id: Option<String>,
}

impl SessionState {
    /// Creates an empty session: auto-detect source, no target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records new input text. Every call counts as a change.
    pub fn set_input_text(&mut self, text: String) {
        self.input_text = text;
        self.input_revision += 1;
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    /// Incremented on every input change.
    pub fn input_revision(&self) -> u64 {
        self.input_revision
    }

    /// `None` means auto-detect.
    pub fn set_source_lang(&mut self, code: Option<String>) {
        self.source_lang = code.filter(|c| !c.is_empty());
    }

    pub fn source_lang(&self) -> Option<&str> {
        self.source_lang.as_deref()
    }

    pub fn set_target_lang(&mut self, code: String) {
        self.target_lang = Some(code);
    }

    pub fn target_lang(&self) -> Option<&str> {
        self.target_lang.as_deref()
    }

    pub fn set_formality(&mut self, formality: Formality) {
        self.formality = formality;
    }

    pub fn formality(&self) -> Formality {
        self.formality
    }

    pub fn set_glossary(&mut self, id: Option<String>) {
        self.glossary_id = id.filter(|id| !id.is_empty());
    }

    pub fn glossary_id(&self) -> Option<&str> {
        self.glossary_id.as_deref()
    }
}
