//! Command prompt parsing.
//!
//! Commands are whitespace separated words; double quotes group words.

use crate::client::GlossaryEntry;
use crate::error::{AppError, Result};
use crate::ui::view::{InspectedGlossary, Page, ViewEvent};
use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]*)"|(\S+)"#).expect("token pattern is valid"));

pub const HELP: &str = "translate | glossaries | refresh | new <name> <src> <tgt> [a=b ...] | \
                        update <name> [a=b ...] | add a=b ... | remove <term> ... | delete | quit";

/// Splits a command line into words, honoring double quotes.
fn tokenize(line: &str) -> Result<Vec<String>> {
    if line.matches('"').count() % 2 != 0 {
        return Err(AppError::InvalidCommand("unbalanced quotes".to_string()));
    }
    Ok(TOKEN
        .captures_iter(line)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect())
}

/// Parses `source=target` words.
fn parse_entries(words: &[String]) -> Result<Vec<GlossaryEntry>> {
    words
        .iter()
        .map(|word| match word.split_once('=') {
            Some((source, target)) if !source.trim().is_empty() && !target.trim().is_empty() => {
                Ok(GlossaryEntry::new(source.trim(), target.trim()))
            }
            _ => Err(AppError::InvalidCommand(format!(
                "expected source=target, got {:?}",
                word
            ))),
        })
        .collect()
}

fn inspected(glossary: Option<&InspectedGlossary>) -> Result<&InspectedGlossary> {
    glossary.ok_or_else(|| AppError::InvalidCommand("no glossary selected".to_string()))
}

/// Parses a command line into the event it stands for.
///
/// `update`, `add`, `remove` and `delete` act on the glossary currently
/// open on the glossaries page. An empty line yields `None`.
pub fn parse_command(line: &str, open: Option<&InspectedGlossary>) -> Result<Option<ViewEvent>> {
    let words = tokenize(line)?;
    let Some((command, args)) = words.split_first() else {
        return Ok(None);
    };

    let event = match command.as_str() {
        "translate" => ViewEvent::PageRequested(Page::Translate),
        "glossaries" => ViewEvent::PageRequested(Page::Glossaries),
        "refresh" => ViewEvent::GlossaryRefreshRequested,
        "quit" | "q" => ViewEvent::Quit,
        "new" => match args {
            [name, source_lang, target_lang, entries @ ..] => ViewEvent::GlossaryCreateRequested {
                name: name.clone(),
                source_lang: source_lang.clone(),
                target_lang: target_lang.clone(),
                entries: parse_entries(entries)?,
            },
            _ => {
                return Err(AppError::InvalidCommand(
                    "usage: new <name> <source> <target> [source=target ...]".to_string(),
                ));
            }
        },
        "update" => {
            let glossary = inspected(open)?;
            let Some((name, entries)) = args.split_first() else {
                return Err(AppError::InvalidCommand(
                    "usage: update <name> [source=target ...]".to_string(),
                ));
            };
            let entries = if entries.is_empty() {
                glossary.entries.clone()
            } else {
                parse_entries(entries)?
            };
            ViewEvent::GlossaryUpdateRequested {
                id: glossary.info.id.clone(),
                name: name.clone(),
                entries,
            }
        }
        "add" => {
            let glossary = inspected(open)?;
            if args.is_empty() {
                return Err(AppError::InvalidCommand(
                    "usage: add source=target ...".to_string(),
                ));
            }
            let mut entries = glossary.entries.clone();
            for added in parse_entries(args)? {
                entries.retain(|e| e.source != added.source);
                entries.push(added);
            }
            ViewEvent::GlossaryUpdateRequested {
                id: glossary.info.id.clone(),
                name: glossary.info.name.clone(),
                entries,
            }
        }
        "remove" => {
            let glossary = inspected(open)?;
            let mut entries = glossary.entries.clone();
            entries.retain(|e| !args.contains(&e.source));
            if entries.len() == glossary.entries.len() {
                return Err(AppError::InvalidCommand(
                    "no matching entries to remove".to_string(),
                ));
            }
            ViewEvent::GlossaryUpdateRequested {
                id: glossary.info.id.clone(),
                name: glossary.info.name.clone(),
                entries,
            }
        }
        "delete" => ViewEvent::GlossaryDeleteRequested(inspected(open)?.info.id.clone()),
        "help" => return Err(AppError::InvalidCommand(HELP.to_string())),
        other => return Err(AppError::InvalidCommand(format!("unknown command {:?}", other))),
    };

    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::info;

    fn open() -> InspectedGlossary {
        InspectedGlossary {
            info: info("g-1", "Art terms", "en", "de", 2),
            entries: vec![
                GlossaryEntry::new("artist", "Maler"),
                GlossaryEntry::new("prize", "Preis"),
            ],
        }
    }

    #[test]
    fn quoted_words_stay_together() {
        assert_eq!(
            tokenize(r#"new "My terms" en de "ice cream=Eis""#).unwrap(),
            vec!["new", "My terms", "en", "de", "ice cream=Eis"]
        );
        assert!(tokenize(r#"new "broken"#).is_err());
    }

    #[test]
    fn parses_new_glossary() {
        let event = parse_command(r#"new "My terms" en de artist=Maler"#, None)
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            ViewEvent::GlossaryCreateRequested {
                name: "My terms".to_string(),
                source_lang: "en".to_string(),
                target_lang: "de".to_string(),
                entries: vec![GlossaryEntry::new("artist", "Maler")],
            }
        );
        assert!(parse_command("new only-name", None).is_err());
        assert!(parse_command("new n en de broken", None).is_err());
    }

    #[test]
    fn update_keeps_entries_when_none_given() {
        let open = open();
        let event = parse_command("update Renamed", Some(&open)).unwrap().unwrap();
        assert_eq!(
            event,
            ViewEvent::GlossaryUpdateRequested {
                id: "g-1".to_string(),
                name: "Renamed".to_string(),
                entries: open.entries.clone(),
            }
        );
    }

    #[test]
    fn add_and_remove_edit_the_open_glossary() {
        let open = open();
        let Some(ViewEvent::GlossaryUpdateRequested { entries, name, .. }) =
            parse_command("add artist=Künstler museum=Museum", Some(&open)).unwrap()
        else {
            panic!("expected an update");
        };
        assert_eq!(name, "Art terms");
        assert_eq!(
            entries,
            vec![
                GlossaryEntry::new("prize", "Preis"),
                GlossaryEntry::new("artist", "Künstler"),
                GlossaryEntry::new("museum", "Museum"),
            ]
        );

        let Some(ViewEvent::GlossaryUpdateRequested { entries, .. }) =
            parse_command("remove prize", Some(&open)).unwrap()
        else {
            panic!("expected an update");
        };
        assert_eq!(entries, vec![GlossaryEntry::new("artist", "Maler")]);
        assert!(parse_command("remove nothing", Some(&open)).is_err());
    }

    #[test]
    fn glossary_commands_need_an_open_glossary() {
        assert!(matches!(
            parse_command("delete", None),
            Err(AppError::InvalidCommand(_))
        ));
        assert_eq!(
            parse_command("delete", Some(&open())).unwrap(),
            Some(ViewEvent::GlossaryDeleteRequested("g-1".to_string()))
        );
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse_command("   ", None).unwrap(), None);
        assert_eq!(
            parse_command("glossaries", None).unwrap(),
            Some(ViewEvent::PageRequested(Page::Glossaries))
        );
        assert_eq!(parse_command("q", None).unwrap(), Some(ViewEvent::Quit));
        assert!(parse_command("frobnicate", None).is_err());
    }
}
