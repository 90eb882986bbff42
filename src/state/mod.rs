//! State management for the translator application.

pub mod catalog;
pub mod glossaries;
pub mod session;

pub use catalog::LanguageCatalog;
pub use glossaries::{GlossaryDirectory, GlossaryListing};
pub use session::SessionState;

/// Application-wide state container.
pub struct AppState {
    /// Settings for the next translation, touched only on the UI thread.
    pub session: SessionState,
    /// Language lists; empty until the startup fetch completes.
    pub catalog: LanguageCatalog,
    /// Glossary mirror; workers hand their fetches to the UI thread.
    pub glossaries: GlossaryDirectory,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            session: SessionState::new(),
            catalog: LanguageCatalog::default(),
            glossaries: GlossaryDirectory::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
