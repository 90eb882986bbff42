//! Controller reacting to view events and background results.
//!
//! Threading model:
//! - the UI loop thread owns the controller, the view and the state; every
//!   state change happens in `handle_event` or `handle_message` on that thread
//! - `rayon::spawn`: blocking client calls, results come back as `Message`s
//! - the debounce task only posts `Message::Settled`

use crate::client::{
    Formality, GlossaryEntry, LanguagePair, LanguageRole, Translation, TranslationClient,
};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::{
    CommitPlan, CommitSequencer, DebounceService, GlossaryChange, GlossaryService, GlossarySync,
    TranslationService, plan_commit,
};
use crate::state::{AppState, LanguageCatalog};
use crate::ui::state_helpers::{
    set_error, set_error_with_prefix, set_glossary_options, show_translation,
};
use crate::ui::view::{GlossaryOption, InspectedGlossary, View, ViewEvent};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::Sender;

/// Results delivered to the UI loop.
#[derive(Debug)]
pub enum Message {
    /// The input has been quiet for the settling interval.
    Settled,
    TranslationFinished {
        seq: u64,
        auto_detected: bool,
        result: Result<Translation>,
    },
    LanguagesLoaded(Result<LanguageCatalog>),
    /// A glossary operation finished and the list was fetched again.
    GlossariesSynced(GlossarySync),
    GlossaryPairsLoaded(Result<Vec<LanguagePair>>),
    GlossaryEntriesLoaded {
        id: String,
        result: Result<Vec<GlossaryEntry>>,
    },
}

/// Whether the UI loop keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Controller<V: View> {
    view: V,
    state: AppState,
    translations: TranslationService,
    glossaries: GlossaryService,
    debounce: DebounceService,
    sequencer: CommitSequencer,
    /// Input revision used by the latest commit.
    committed_revision: u64,
    /// Glossary open on the glossaries page.
    inspected: Option<String>,
    /// Glossaries whose entries are being fetched.
    pending_entries: HashSet<String>,
    initial_target_lang: Option<String>,
    outbox: Sender<Message>,
}

impl<V: View> Controller<V> {
    pub fn new(
        view: V,
        client: Arc<dyn TranslationClient>,
        config: &Config,
        outbox: Sender<Message>,
    ) -> Self {
        let debounce = DebounceService::start(config.settle_interval, {
            let outbox = outbox.clone();
            move || {
                if outbox.send(Message::Settled).is_err() {
                    debug!("UI loop is gone, settle signal dropped");
                }
            }
        });

        Self {
            view,
            state: AppState::new(),
            translations: TranslationService::new(client.clone()),
            glossaries: GlossaryService::new(client),
            debounce,
            sequencer: CommitSequencer::new(),
            committed_revision: 0,
            inspected: None,
            pending_entries: HashSet::new(),
            initial_target_lang: config.initial_target_lang.clone(),
            outbox,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Publishes static options and starts the initial fetches.
    pub fn start(&mut self) {
        self.view.set_formality_options(Formality::ALL.to_vec());

        let translations = self.translations.clone();
        self.spawn(move || Message::LanguagesLoaded(translations.load_catalog()));

        self.refresh_glossaries();

        let glossaries = self.glossaries.clone();
        self.spawn(move || Message::GlossaryPairsLoaded(glossaries.fetch_language_pairs()));
    }

    /// Runs a blocking job on the rayon pool and posts its result.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() -> Message + Send + 'static,
    {
        let outbox = self.outbox.clone();
        rayon::spawn(move || {
            if outbox.send(job()).is_err() {
                debug!("UI loop is gone, result dropped");
            }
        });
    }

    pub fn handle_event(&mut self, event: ViewEvent) -> Flow {
        match event {
            ViewEvent::InputChanged => {
                let text = self.view.input_text();
                if text != self.state.session.input_text() {
                    self.state.session.set_input_text(text);
                    self.debounce.notify();
                }
            }
            ViewEvent::LanguageSelected { role, index } => {
                if let Err(e) = self.select_language(role, index) {
                    set_error(&mut self.view, e);
                    return Flow::Continue;
                }
                self.commit();
            }
            ViewEvent::FormalitySelected(formality) => {
                self.state.session.set_formality(formality);
                self.commit();
            }
            ViewEvent::GlossarySelected(option) => self.select_glossary(option),
            ViewEvent::GlossaryInspectRequested(id) => self.inspect_glossary(id),
            ViewEvent::GlossaryCreateRequested {
                name,
                source_lang,
                target_lang,
                entries,
            } => {
                if !self
                    .state
                    .glossaries
                    .supports_pair(&source_lang, &target_lang)
                {
                    set_error(
                        &mut self.view,
                        AppError::UnsupportedLanguagePair {
                            source_lang,
                            target_lang,
                        },
                    );
                    return Flow::Continue;
                }
                let glossaries = self.glossaries.clone();
                self.spawn(move || {
                    Message::GlossariesSynced(glossaries.sync_after(|s| {
                        s.create(&name, &source_lang, &target_lang, &entries)
                            .map(GlossaryChange::Created)
                    }))
                });
            }
            ViewEvent::GlossaryUpdateRequested { id, name, entries } => {
                let Some(original) = self.state.glossaries.get(&id) else {
                    set_error(&mut self.view, AppError::GlossaryNotFound(id));
                    return Flow::Continue;
                };
                let glossaries = self.glossaries.clone();
                self.spawn(move || {
                    Message::GlossariesSynced(glossaries.sync_after(|s| {
                        s.replace(&original, &name, &entries)
                            .map(|replacement| GlossaryChange::Replaced {
                                original: original.id.clone(),
                                replacement,
                            })
                    }))
                });
            }
            ViewEvent::GlossaryDeleteRequested(id) => {
                let glossaries = self.glossaries.clone();
                self.spawn(move || {
                    Message::GlossariesSynced(glossaries.sync_after(|s| {
                        s.delete(&id).map(|()| GlossaryChange::Deleted(id.clone()))
                    }))
                });
            }
            ViewEvent::GlossaryRefreshRequested => self.refresh_glossaries(),
            ViewEvent::PageRequested(page) => self.view.switch_page(page),
            ViewEvent::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    pub fn handle_message(&mut self, message: Message) {
        match message {
            Message::Settled => {
                if self.state.session.input_revision() == self.committed_revision {
                    debug!("Input unchanged since last commit, nothing to do");
                    return;
                }
                self.commit();
            }
            Message::TranslationFinished {
                seq,
                auto_detected,
                result,
            } => {
                if !self.sequencer.is_current(seq) {
                    debug!("Discarding result of stale commit #{}", seq);
                    return;
                }
                match result {
                    Ok(translation) => show_translation(&mut self.view, &translation, auto_detected),
                    Err(e) => set_error_with_prefix(&mut self.view, "Translation failed", e),
                }
            }
            Message::LanguagesLoaded(Ok(catalog)) => self.apply_catalog(catalog),
            Message::LanguagesLoaded(Err(e)) => {
                set_error_with_prefix(&mut self.view, "Failed to load languages", e)
            }
            Message::GlossariesSynced(sync) => self.apply_glossary_sync(sync),
            Message::GlossaryPairsLoaded(Ok(pairs)) => {
                self.state.glossaries.set_language_pairs(pairs);
                self.view
                    .set_glossary_language_options(self.state.glossaries.language_summary());
            }
            Message::GlossaryPairsLoaded(Err(e)) => set_error_with_prefix(
                &mut self.view,
                "Failed to load glossary languages",
                e,
            ),
            Message::GlossaryEntriesLoaded { id, result } => self.apply_entries(id, result),
        }
    }

    /// Translates the current session.
    ///
    /// Every commit takes a sequence number, so a response of an earlier
    /// commit can never overwrite the outcome of this one.
    fn commit(&mut self) {
        let seq = self.sequencer.issue();
        self.committed_revision = self.state.session.input_revision();

        match plan_commit(&self.state.session) {
            Ok(CommitPlan::ClearOutput) => {
                debug!("Commit #{}: empty input", seq);
                self.view.clear_output();
            }
            Ok(CommitPlan::Translate(request)) => {
                debug!("Commit #{} issued", seq);
                let auto_detected = request.options.source_lang.is_none();
                let translations = self.translations.clone();
                self.spawn(move || Message::TranslationFinished {
                    seq,
                    auto_detected,
                    result: translations.translate(&request),
                });
            }
            Err(e) => set_error(&mut self.view, e),
        }
    }

    fn select_language(&mut self, role: LanguageRole, index: usize) -> Result<()> {
        let catalog = &self.state.catalog;
        match role {
            LanguageRole::Source => {
                let code = catalog.source_code_at(index)?;
                self.state.session.set_source_lang(code);
            }
            LanguageRole::Target => {
                let code = catalog.target_code_at(index)?;
                self.state.session.set_target_lang(code);
            }
        }
        Ok(())
    }

    /// Applies a glossary selection after checking it against the directory.
    fn select_glossary(&mut self, option: Option<GlossaryOption>) {
        let Some(option) = option else {
            self.state.session.set_glossary(None);
            self.commit();
            return;
        };

        let directory = &self.state.glossaries;
        let known = match directory.get(&option.id) {
            Some(info) if info.name == option.name => Ok(info),
            Some(info) => Err(AppError::GlossaryNameMismatch {
                expected: info.name,
                actual: option.name,
            }),
            // Recreated by an update: same name, new id.
            None => directory
                .find_by_name(&option.name)
                .and_then(|id| directory.get(&id))
                .ok_or(AppError::GlossaryNotFound(option.id)),
        };

        match known {
            Ok(info) => {
                self.state.session.set_glossary(Some(info.id.clone()));
                if self.state.glossaries.cached_entries(&info.id).is_none() {
                    self.request_entries(info.id);
                }
                self.commit();
            }
            Err(e) => {
                self.state.session.set_glossary(None);
                self.view.clear_glossary_selection();
                set_error(&mut self.view, e);
            }
        }
    }

    /// Opens a glossary on the glossaries page, fetching its entries once.
    fn inspect_glossary(&mut self, id: String) {
        let Some(info) = self.state.glossaries.get(&id) else {
            set_error(&mut self.view, AppError::GlossaryNotFound(id));
            return;
        };
        self.inspected = Some(id.clone());
        match self.state.glossaries.cached_entries(&id) {
            Some(entries) => self.view.show_glossary(Some(InspectedGlossary { info, entries })),
            None => self.request_entries(id),
        }
    }

    fn request_entries(&mut self, id: String) {
        if !self.pending_entries.insert(id.clone()) {
            debug!("Entries of {} already requested", id);
            return;
        }
        let glossaries = self.glossaries.clone();
        self.spawn(move || {
            let result = glossaries.fetch_entries(&id);
            Message::GlossaryEntriesLoaded { id, result }
        });
    }

    /// Caches fetched entries and shows them if their glossary is open.
    fn apply_entries(&mut self, id: String, result: Result<Vec<GlossaryEntry>>) {
        self.pending_entries.remove(&id);
        let open = self.inspected.as_deref() == Some(id.as_str());

        let entries = match result {
            Ok(entries) => entries,
            Err(e) if open => {
                set_error_with_prefix(&mut self.view, "Failed to load glossary", e);
                return;
            }
            Err(e) => {
                warn!("Failed to prefetch entries of {}: {}", id, e);
                return;
            }
        };

        // Removed by a refresh while the fetch was running.
        let Some(info) = self.state.glossaries.get(&id) else {
            debug!("Dropping entries of vanished glossary {}", id);
            return;
        };
        self.state.glossaries.cache_entries(id, entries.clone());
        if open {
            self.view.show_glossary(Some(InspectedGlossary { info, entries }));
        }
    }

    fn refresh_glossaries(&self) {
        let glossaries = self.glossaries.clone();
        self.spawn(move || Message::GlossariesSynced(glossaries.refresh()));
    }

    /// Applies a finished glossary operation and the list fetched after it.
    ///
    /// The change is applied locally first, so it shows up even when the
    /// list could not be fetched.
    fn apply_glossary_sync(&mut self, sync: GlossarySync) {
        let GlossarySync { change, listing } = sync;
        let was_open = self.inspected.clone();

        if let Ok(change) = &change {
            self.apply_change(change);
        }
        let list_error = match listing {
            Ok(listing) => {
                self.state.glossaries.replace_all(listing);
                None
            }
            Err(e) => Some(e),
        };
        let selection_dropped = self.sync_glossaries();

        match (change, list_error) {
            (Ok(GlossaryChange::Listed), Some(e)) => {
                set_error_with_prefix(&mut self.view, "Failed to refresh glossaries", e)
            }
            (Ok(change), Some(e)) => {
                let prefix = format!("{}; glossary list not refreshed", self.describe(&change));
                set_error_with_prefix(&mut self.view, &prefix, e);
            }
            (Ok(change), None) => {
                if !selection_dropped {
                    let notice = self.describe(&change);
                    self.view.set_status(&notice);
                }
                if let GlossaryChange::Replaced {
                    original,
                    replacement,
                } = change
                {
                    if was_open.as_deref() == Some(original.as_str()) {
                        self.inspect_glossary(replacement.id);
                    }
                }
            }
            (Err(e), _) => set_error_with_prefix(&mut self.view, "Glossary operation failed", e),
        }
    }

    fn apply_change(&mut self, change: &GlossaryChange) {
        let directory = &mut self.state.glossaries;
        match change {
            GlossaryChange::Listed => {}
            GlossaryChange::Created(info) => directory.push(info.clone()),
            GlossaryChange::Replaced {
                original,
                replacement,
            } => {
                directory.remove(original);
                directory.push(replacement.clone());
            }
            GlossaryChange::Deleted(id) => directory.remove(id),
        }
    }

    fn describe(&self, change: &GlossaryChange) -> String {
        match change {
            GlossaryChange::Listed => {
                format!("Loaded {} glossaries", self.state.glossaries.list().len())
            }
            GlossaryChange::Created(info) => format!("Created glossary \"{}\"", info.name),
            GlossaryChange::Replaced { replacement, .. } => {
                format!("Updated glossary \"{}\"", replacement.name)
            }
            GlossaryChange::Deleted(id) => format!("Deleted glossary {}", id),
        }
    }

    /// Publishes the glossary list and drops selections that vanished.
    ///
    /// Returns whether the translation glossary was deselected.
    fn sync_glossaries(&mut self) -> bool {
        let directory = &self.state.glossaries;
        set_glossary_options(&mut self.view, &directory.list());

        if self
            .inspected
            .as_deref()
            .is_some_and(|id| !directory.contains(id))
        {
            self.inspected = None;
            self.view.show_glossary(None);
        }

        match self.state.session.glossary_id() {
            Some(id) if !directory.contains(id) => {
                info!("Selected glossary {} no longer exists", id);
                self.state.session.set_glossary(None);
                self.view.clear_glossary_selection();
                self.view
                    .set_status("The selected glossary no longer exists; glossary disabled");
                true
            }
            _ => false,
        }
    }

    fn apply_catalog(&mut self, catalog: LanguageCatalog) {
        self.view
            .set_language_options(LanguageRole::Source, catalog.options(LanguageRole::Source));
        self.view
            .set_language_options(LanguageRole::Target, catalog.options(LanguageRole::Target));
        self.view.select_language(LanguageRole::Source, 0);

        let initial = self.initial_target_lang.take();
        self.state.catalog = catalog;

        if let Some(code) = initial {
            match self.state.catalog.target_index_of(&code) {
                Some(index) => {
                    if let Err(e) = self.select_language(LanguageRole::Target, index) {
                        set_error(&mut self.view, e);
                        return;
                    }
                    self.view.select_language(LanguageRole::Target, index);
                    self.commit();
                }
                None => self
                    .view
                    .set_status(&format!("Unknown target language: {}", code)),
            }
        }
    }
}
