//! Helper functions to update several view properties in one go.

use crate::client::{GlossaryInfo, Translation};
use crate::ui::view::{GlossaryOption, View};
use log::error;
use std::fmt::Display;

/// Sets an error message in the status area with a prefix.
///
/// Logs the error and updates the view's status text.
pub fn set_error_with_prefix(view: &mut impl View, prefix: &str, error: impl Display) {
    let error_message = format!("{}: {}", prefix, error);
    error!("{}", error_message);
    view.set_status(&error_message);
}

/// Sets an error message in the status area as is.
pub fn set_error(view: &mut impl View, error: impl Display) {
    let error_message = error.to_string();
    error!("{}", error_message);
    view.set_status(&error_message);
}

/// Replaces the output with a translation and reports the detected language.
///
/// Groups: output text, status
pub fn show_translation(view: &mut impl View, translation: &Translation, auto_detected: bool) {
    view.clear_output();
    view.write_output(&translation.text);
    match (&translation.detected_source_lang, auto_detected) {
        (Some(lang), true) => view.set_status(&format!("Detected source language: {}", lang)),
        _ => view.set_status(""),
    }
}

/// Publishes the glossary list to every glossary selector.
pub fn set_glossary_options(view: &mut impl View, glossaries: &[GlossaryInfo]) {
    view.set_glossary_options(glossaries.iter().map(GlossaryOption::from).collect());
}
