//! Service for building and issuing translation requests.
//!
//! Turns the current session into a request, and numbers every commit so
//! that only the most recently issued one may update the output.

use crate::client::{Formality, LanguageRole, TranslateOptions, Translation, TranslationClient};
use crate::error::{AppError, Result};
use crate::state::{LanguageCatalog, SessionState};
use log::{debug, info};
use std::sync::Arc;

/// A request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    pub text: String,
    pub target_lang: String,
    pub options: TranslateOptions,
}

/// What a commit has to do for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitPlan {
    /// Input is empty: clear the output, send nothing.
    ClearOutput,
    /// Send this request.
    Translate(TranslateRequest),
}

/// Checks the session and builds the request for a commit.
pub fn plan_commit(session: &SessionState) -> Result<CommitPlan> {
    if session.input_text().is_empty() {
        return Ok(CommitPlan::ClearOutput);
    }

    let target_lang = session
        .target_lang()
        .ok_or(AppError::TargetLanguageNotSet)?;

    let options = TranslateOptions {
        source_lang: session.source_lang().map(str::to_string),
        formality: Some(session.formality()).filter(|f| *f != Formality::Automatic),
        glossary_id: session.glossary_id().map(str::to_string),
    };

    Ok(CommitPlan::Translate(TranslateRequest {
        text: session.input_text().to_string(),
        target_lang: target_lang.to_string(),
        options,
    }))
}

/// Hands out increasing commit numbers and tells stale results apart.
#[derive(Debug, Default)]
pub struct CommitSequencer {
    latest: u64,
}

impl CommitSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the number of a new commit; earlier commits become stale.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Whether a result for `seq` may still be shown.
    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

/// Service performing translate calls.
#[derive(Clone)]
pub struct TranslationService {
    client: Arc<dyn TranslationClient>,
}

impl TranslationService {
    pub fn new(client: Arc<dyn TranslationClient>) -> Self {
        Self { client }
    }

    /// Fetches both language lists.
    pub fn load_catalog(&self) -> Result<LanguageCatalog> {
        let source = self.client.list_languages(LanguageRole::Source)?;
        let target = self.client.list_languages(LanguageRole::Target)?;
        info!(
            "Loaded {} source and {} target languages",
            source.len(),
            target.len()
        );
        Ok(LanguageCatalog::new(source, target))
    }

    /// Sends a request. Blocks on the network.
    pub fn translate(&self, request: &TranslateRequest) -> Result<Translation> {
        debug!(
            "Translating {} chars to {} ({:?})",
            request.text.chars().count(),
            request.target_lang,
            request.options
        );
        Ok(self
            .client
            .translate(&request.text, &request.target_lang, &request.options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MockClient;

    fn session(text: &str, target: Option<&str>) -> SessionState {
        let mut session = SessionState::new();
        session.set_input_text(text.to_string());
        if let Some(target) = target {
            session.set_target_lang(target.to_string());
        }
        session
    }

    #[test]
    fn empty_input_only_clears() {
        let session = session("", None);
        assert_eq!(plan_commit(&session).unwrap(), CommitPlan::ClearOutput);
    }

    #[test]
    fn missing_target_is_reported() {
        let session = session("Hello", None);
        assert!(matches!(
            plan_commit(&session),
            Err(AppError::TargetLanguageNotSet)
        ));
    }

    #[test]
    fn minimal_request_has_no_options() {
        let session = session("Hello", Some("DE"));
        let plan = plan_commit(&session).unwrap();
        assert_eq!(
            plan,
            CommitPlan::Translate(TranslateRequest {
                text: "Hello".to_string(),
                target_lang: "DE".to_string(),
                options: TranslateOptions::default(),
            })
        );
    }

    #[test]
    fn request_carries_selected_options() {
        let mut session = session("Hello", Some("DE"));
        session.set_source_lang(Some("EN".to_string()));
        session.set_formality(Formality::PreferLess);
        session.set_glossary(Some("g-1".to_string()));

        let CommitPlan::Translate(request) = plan_commit(&session).unwrap() else {
            panic!("expected a translate plan");
        };
        assert_eq!(request.options.source_lang.as_deref(), Some("EN"));
        assert_eq!(request.options.formality, Some(Formality::PreferLess));
        assert_eq!(request.options.glossary_id.as_deref(), Some("g-1"));
    }

    #[test]
    fn only_latest_commit_is_current() {
        let mut sequencer = CommitSequencer::new();
        let first = sequencer.issue();
        let second = sequencer.issue();
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
    }

    #[test]
    fn service_forwards_to_client() {
        let client = Arc::new(MockClient::new());
        let service = TranslationService::new(client.clone());
        let session = session("Hello", Some("DE"));
        let CommitPlan::Translate(request) = plan_commit(&session).unwrap() else {
            panic!("expected a translate plan");
        };

        let translation = service.translate(&request).unwrap();

        assert_eq!(translation.text, "DE:Hello");
        assert_eq!(client.translate_calls().len(), 1);
    }

    #[test]
    fn catalog_keeps_service_order() {
        let service = TranslationService::new(Arc::new(MockClient::new()));
        let catalog = service.load_catalog().unwrap();
        assert_eq!(catalog.target_code_at(1).unwrap(), "EN-GB");
        assert_eq!(catalog.source_code_at(1).unwrap().as_deref(), Some("EN"));
    }
}
