//! Service for glossary management.
//!
//! Wraps the blocking glossary calls of the translation client. The methods
//! run on worker threads and only return what the server said; the
//! controller applies the results to the `GlossaryDirectory` on the UI thread.

use crate::client::{GlossaryEntry, GlossaryInfo, LanguagePair, TranslationClient};
use crate::error::{AppError, Result};
use crate::state::GlossaryListing;
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// What a glossary operation changed on the server.
#[derive(Debug, Clone, PartialEq)]
pub enum GlossaryChange {
    /// Nothing; the list was only re-fetched.
    Listed,
    Created(GlossaryInfo),
    Replaced {
        original: String,
        replacement: GlossaryInfo,
    },
    Deleted(String),
}

/// Outcome of a glossary operation and of the list fetch that followed it.
///
/// The two are independent: a failed list fetch never hides what the
/// operation did.
#[derive(Debug)]
pub struct GlossarySync {
    pub change: Result<GlossaryChange>,
    pub listing: Result<GlossaryListing>,
}

/// Service for managing glossaries.
#[derive(Clone)]
pub struct GlossaryService {
    client: Arc<dyn TranslationClient>,
    /// Last stamp handed to a list fetch.
    fetches: Arc<AtomicU64>,
}

impl GlossaryService {
    /// Creates a new glossary service.
    pub fn new(client: Arc<dyn TranslationClient>) -> Self {
        Self {
            client,
            fetches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Fetches the full glossary list.
    ///
    /// The stamp is taken before the request, so a listing with a higher
    /// stamp was requested after every operation that finished before it.
    pub fn fetch_all(&self) -> Result<GlossaryListing> {
        let stamp = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        let glossaries = self.client.list_glossaries()?;
        debug!("Fetched {} glossaries (#{})", glossaries.len(), stamp);
        Ok(GlossaryListing { stamp, glossaries })
    }

    /// Re-fetches the list without changing anything.
    pub fn refresh(&self) -> GlossarySync {
        GlossarySync {
            change: Ok(GlossaryChange::Listed),
            listing: self.fetch_all(),
        }
    }

    /// Runs `operation`, then re-fetches the list whether it failed or not.
    pub fn sync_after<F>(&self, operation: F) -> GlossarySync
    where
        F: FnOnce(&Self) -> Result<GlossaryChange>,
    {
        let change = operation(self);
        let listing = self.fetch_all();
        if let Err(e) = &listing {
            warn!("Glossary list not refreshed after {:?}: {}", change, e);
        }
        GlossarySync { change, listing }
    }

    /// Fetches the language pairs glossaries can be created for.
    pub fn fetch_language_pairs(&self) -> Result<Vec<LanguagePair>> {
        let pairs = self.client.glossary_language_pairs()?;
        info!("Loaded {} glossary language pairs", pairs.len());
        Ok(pairs)
    }

    pub fn fetch_entries(&self, id: &str) -> Result<Vec<GlossaryEntry>> {
        let entries = self.client.glossary_entries(id)?;
        debug!("Fetched {} entries of glossary {}", entries.len(), id);
        Ok(entries)
    }

    /// Creates a glossary.
    ///
    /// The caller has checked the language pair against the directory.
    pub fn create(
        &self,
        name: &str,
        source_lang: &str,
        target_lang: &str,
        entries: &[GlossaryEntry],
    ) -> Result<GlossaryInfo> {
        let created = self
            .client
            .create_glossary(name, source_lang, target_lang, entries)?;
        info!("Created glossary {} ({})", created.name, created.id);
        Ok(created)
    }

    /// Replaces a glossary by creating a new one and deleting the original.
    ///
    /// Not atomic: if the delete fails both glossaries remain, and the error
    /// names both ids.
    pub fn replace(
        &self,
        original: &GlossaryInfo,
        name: &str,
        entries: &[GlossaryEntry],
    ) -> Result<GlossaryInfo> {
        let replacement = self.create(
            name,
            &original.source_lang,
            &original.target_lang,
            entries,
        )?;

        match self.client.delete_glossary(&original.id) {
            Ok(()) => {
                info!("Glossary {} replaced by {}", original.id, replacement.id);
                Ok(replacement)
            }
            Err(source) => {
                warn!(
                    "Glossary {} replaced by {} but not deleted: {}",
                    original.id, replacement.id, source
                );
                Err(AppError::GlossaryUpdateIncomplete {
                    original: original.id.clone(),
                    replacement: replacement.id,
                    source,
                })
            }
        }
    }

    /// Deletes a glossary.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_glossary(id)?;
        info!("Deleted glossary {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{MockClient, info};
    use crate::error::ClientError;

    fn art_terms() -> GlossaryInfo {
        info("A", "Art terms", "en", "de", 1)
    }

    fn client_with_a() -> Arc<MockClient> {
        Arc::new(
            MockClient::new().with_glossary(art_terms(), vec![GlossaryEntry::new("artist", "Maler")]),
        )
    }

    fn replace_a(service: &GlossaryService, name: &str) -> GlossarySync {
        service.sync_after(|s| {
            s.replace(&art_terms(), name, &[GlossaryEntry::new("artist", "Künstler")])
                .map(|replacement| GlossaryChange::Replaced {
                    original: "A".to_string(),
                    replacement,
                })
        })
    }

    #[test]
    fn listings_are_stamped_in_fetch_order() {
        let service = GlossaryService::new(client_with_a());
        let first = service.fetch_all().unwrap();
        let second = service.clone().fetch_all().unwrap();

        assert!(second.stamp > first.stamp);
        assert_eq!(first.glossaries, vec![art_terms()]);
    }

    #[test]
    fn replace_keeps_language_pair_and_deletes_original() {
        let client = client_with_a();
        let service = GlossaryService::new(client.clone());

        let sync = replace_a(&service, "Art terms v2");

        let Ok(GlossaryChange::Replaced { replacement, .. }) = sync.change else {
            panic!("expected a replacement");
        };
        assert_eq!(replacement.name, "Art terms v2");
        assert_eq!(replacement.source_lang, "en");
        assert_eq!(replacement.target_lang, "de");
        assert_eq!(sync.listing.unwrap().glossaries, vec![replacement.clone()]);
        assert_eq!(
            service.fetch_entries(&replacement.id).unwrap(),
            vec![GlossaryEntry::new("artist", "Künstler")]
        );
    }

    #[test]
    fn failed_delete_during_update_leaves_both_glossaries() {
        let client = client_with_a();
        let service = GlossaryService::new(client.clone());
        client.set_fail_delete(true);

        let sync = service.sync_after(|s| {
            s.replace(&art_terms(), "Art terms", &[GlossaryEntry::new("artist", "Maler")])
                .map(|replacement| GlossaryChange::Replaced {
                    original: "A".to_string(),
                    replacement,
                })
        });

        assert!(matches!(
            sync.change,
            Err(AppError::GlossaryUpdateIncomplete { ref original, .. }) if original == "A"
        ));
        let list = sync.listing.unwrap().glossaries;
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|g| g.name == "Art terms" && g.entry_count == 1));
    }

    #[test]
    fn failed_list_fetch_does_not_mask_update_outcome() {
        let client = client_with_a();
        let service = GlossaryService::new(client.clone());
        client.set_fail_list(true);

        let sync = replace_a(&service, "Art terms v2");

        assert!(matches!(sync.change, Ok(GlossaryChange::Replaced { .. })));
        assert!(matches!(
            sync.listing,
            Err(AppError::Client(ClientError::TooManyRequests))
        ));
    }

    #[test]
    fn failed_list_fetch_keeps_incomplete_update_error() {
        let client = client_with_a();
        let service = GlossaryService::new(client.clone());
        client.set_fail_delete(true);
        client.set_fail_list(true);

        let sync = replace_a(&service, "Art terms v2");

        assert!(matches!(
            sync.change,
            Err(AppError::GlossaryUpdateIncomplete { .. })
        ));
        assert!(sync.listing.is_err());
    }

    #[test]
    fn list_is_fetched_after_a_failed_operation() {
        let client = client_with_a();
        let service = GlossaryService::new(client.clone());

        let sync = service.sync_after(|s| {
            s.delete("missing")
                .map(|()| GlossaryChange::Deleted("missing".to_string()))
        });

        assert!(matches!(
            sync.change,
            Err(AppError::Client(ClientError::NotFound))
        ));
        assert_eq!(sync.listing.unwrap().glossaries, vec![art_terms()]);
    }
}
