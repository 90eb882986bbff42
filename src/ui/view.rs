//! The view boundary.
//!
//! The controller only talks to the screen through `View` and only hears
//! from it through `ViewEvent`s; it never touches concrete widgets.

use crate::client::{Formality, GlossaryEntry, GlossaryInfo, LanguageRole};

/// Pages of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Translate,
    Glossaries,
}

/// A selectable glossary as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryOption {
    pub id: String,
    pub name: String,
}

impl From<&GlossaryInfo> for GlossaryOption {
    fn from(info: &GlossaryInfo) -> Self {
        Self {
            id: info.id.clone(),
            name: info.name.clone(),
        }
    }
}

/// A glossary opened on the glossaries page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedGlossary {
    pub info: GlossaryInfo,
    pub entries: Vec<GlossaryEntry>,
}

/// Events emitted by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// The input text changed; the controller reads it via `View::input_text`.
    InputChanged,
    /// A language option was picked by position.
    LanguageSelected { role: LanguageRole, index: usize },
    FormalitySelected(Formality),
    /// `None` disables glossaries.
    GlossarySelected(Option<GlossaryOption>),
    GlossaryInspectRequested(String),
    GlossaryCreateRequested {
        name: String,
        source_lang: String,
        target_lang: String,
        entries: Vec<GlossaryEntry>,
    },
    GlossaryUpdateRequested {
        id: String,
        name: String,
        entries: Vec<GlossaryEntry>,
    },
    GlossaryDeleteRequested(String),
    GlossaryRefreshRequested,
    PageRequested(Page),
    Quit,
}

/// Capabilities the controller needs from the screen.
pub trait View {
    fn input_text(&self) -> String;

    fn clear_output(&mut self);

    /// Appends to the output area.
    fn write_output(&mut self, text: &str);

    fn set_status(&mut self, text: &str);

    /// Replaces the options of a language selector. Positions are stable
    /// until the next call.
    fn set_language_options(&mut self, role: LanguageRole, options: Vec<String>);

    /// Moves a language selector without emitting an event.
    fn select_language(&mut self, role: LanguageRole, index: usize);

    fn set_formality_options(&mut self, options: Vec<Formality>);

    fn set_glossary_options(&mut self, options: Vec<GlossaryOption>);

    /// Deselects the glossary selector without emitting an event.
    fn clear_glossary_selection(&mut self);

    fn set_glossary_language_options(&mut self, languages: Vec<String>);

    /// `None` closes the glossary currently shown.
    fn show_glossary(&mut self, glossary: Option<InspectedGlossary>);

    fn switch_page(&mut self, page: Page);
}
