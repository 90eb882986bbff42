//! Local mirror of server-side glossaries.
//!
//! Owned by the UI thread; workers only fetch and hand their results over.

use crate::client::{GlossaryEntry, GlossaryInfo, LanguagePair};
use crate::glossary_cache::GlossaryCache;
use log::debug;

/// A fetched glossary list. Stamps grow in the order the fetches started.
#[derive(Debug, Clone, PartialEq)]
pub struct GlossaryListing {
    pub stamp: u64,
    pub glossaries: Vec<GlossaryInfo>,
}

/// Glossary metadata list, supported language pairs and cached entries.
#[derive(Default)]
pub struct GlossaryDirectory {
    glossaries: Vec<GlossaryInfo>,
    /// Stamp of the listing currently applied.
    stamp: u64,
    language_pairs: Vec<LanguagePair>,
    entries: GlossaryCache,
}

impl GlossaryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the metadata list and drops entries of vanished glossaries.
    ///
    /// A listing fetched before the one already applied is ignored; returns
    /// whether the list was replaced.
    pub fn replace_all(&mut self, listing: GlossaryListing) -> bool {
        if listing.stamp <= self.stamp {
            debug!(
                "Ignoring glossary listing #{}, #{} is newer",
                listing.stamp, self.stamp
            );
            return false;
        }
        debug!(
            "Glossary directory refreshed: {} glossaries (#{})",
            listing.glossaries.len(),
            listing.stamp
        );
        self.stamp = listing.stamp;
        self.glossaries = listing.glossaries;
        let glossaries = &self.glossaries;
        self.entries
            .retain(|id| glossaries.iter().any(|g| g.id == id));
        true
    }

    /// Appends a newly created glossary unless it is already listed.
    pub fn push(&mut self, info: GlossaryInfo) {
        if !self.contains(&info.id) {
            self.glossaries.push(info);
        }
    }

    /// Drops a deleted glossary together with its cached entries.
    pub fn remove(&mut self, id: &str) {
        self.glossaries.retain(|g| g.id != id);
        self.invalidate(id);
    }

    /// Returns the list of known glossaries.
    pub fn list(&self) -> Vec<GlossaryInfo> {
        self.glossaries.clone()
    }

    /// Returns the metadata of a single glossary.
    pub fn get(&self, id: &str) -> Option<GlossaryInfo> {
        self.glossaries.iter().find(|g| g.id == id).cloned()
    }

    /// Returns the id of the first glossary with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<String> {
        self.glossaries
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.id.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.glossaries.iter().any(|g| g.id == id)
    }

    /// Cached entries of a glossary, if fetched before.
    pub fn cached_entries(&mut self, id: &str) -> Option<Vec<GlossaryEntry>> {
        self.entries.get(id)
    }

    pub fn cache_entries(&mut self, id: String, entries: Vec<GlossaryEntry>) {
        self.entries.put(id, entries);
    }

    /// Forgets cached entries of a deleted or recreated glossary.
    pub fn invalidate(&mut self, id: &str) {
        self.entries.remove(id);
    }

    pub fn set_language_pairs(&mut self, pairs: Vec<LanguagePair>) {
        self.language_pairs = pairs;
    }

    /// Whether `source -> target` can hold a glossary.
    ///
    /// Until the pair list has been loaded every pair is accepted and the
    /// service gets the final say.
    pub fn supports_pair(&self, source: &str, target: &str) -> bool {
        self.language_pairs.is_empty()
            || self.language_pairs.iter().any(|p| {
                p.source_lang.eq_ignore_ascii_case(source)
                    && p.target_lang.eq_ignore_ascii_case(target)
            })
    }

    /// Target languages available for `source`; an empty `source` lists all.
    pub fn target_langs_for(&self, source: &str) -> Vec<String> {
        let mut langs: Vec<String> = self
            .language_pairs
            .iter()
            .filter(|p| source.is_empty() || p.source_lang.eq_ignore_ascii_case(source))
            .map(|p| p.target_lang.clone())
            .collect();
        langs.sort();
        langs.dedup();
        langs
    }

    /// Source languages available for `target`; an empty `target` lists all.
    pub fn source_langs_for(&self, target: &str) -> Vec<String> {
        let mut langs: Vec<String> = self
            .language_pairs
            .iter()
            .filter(|p| target.is_empty() || p.target_lang.eq_ignore_ascii_case(target))
            .map(|p| p.source_lang.clone())
            .collect();
        langs.sort();
        langs.dedup();
        langs
    }

    /// One line per glossary source language listing its targets.
    pub fn language_summary(&self) -> Vec<String> {
        self.source_langs_for("")
            .into_iter()
            .map(|source| format!("{} -> {}", source, self.target_langs_for(&source).join(", ")))
            .collect()
    }
}
