//! Services used by the controller: input debounce, translation commits and
//! glossary management.

pub mod debounce_service;
pub mod glossary_service;
pub mod translation_service;

pub use debounce_service::DebounceService;
pub use glossary_service::{GlossaryChange, GlossaryService, GlossarySync};
pub use translation_service::{CommitPlan, CommitSequencer, TranslationService, plan_commit};
