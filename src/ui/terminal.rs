//! Terminal implementation of the view.
//!
//! Renders with `ratatui` and turns `crossterm` key presses into
//! `ViewEvent`s. Positions of option lists are kept exactly as handed in by
//! the controller.

use crate::client::{Formality, LanguageRole};
use crate::config::NO_GLOSSARY_LABEL;
use crate::ui::commands::parse_command;
use crate::ui::state_helpers::set_error;
use crate::ui::view::{GlossaryOption, InspectedGlossary, Page, View, ViewEvent};
use crossterm::ExecutableCommand;
use crossterm::cursor::Show;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Row, Table, Wrap};
use std::io::{self, Stdout};

/// Owns the terminal while the UI runs; restores it when dropped.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    pub fn draw(&mut self, view: &TerminalView) -> io::Result<()> {
        self.terminal.draw(|frame| view.draw(frame))?;
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        let _ = io::stdout().execute(Show);
    }
}

/// Widgets of the translate page that can take focus, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Focus {
    #[default]
    Input,
    Source,
    Target,
    Formality,
    Glossary,
}

const FOCUS_ORDER: [Focus; 5] = [
    Focus::Input,
    Focus::Source,
    Focus::Target,
    Focus::Formality,
    Focus::Glossary,
];

/// A one-line dropdown cycled with the arrow keys.
#[derive(Debug, Default)]
struct Selector {
    options: Vec<String>,
    selected: Option<usize>,
}

impl Selector {
    fn set_options(&mut self, options: Vec<String>) {
        self.options = options;
        self.selected = None;
    }

    fn select(&mut self, index: usize) {
        if index < self.options.len() {
            self.selected = Some(index);
        }
    }

    /// Moves the selection and returns the new position.
    fn step(&mut self, forward: bool) -> Option<usize> {
        let len = self.options.len();
        if len == 0 {
            return None;
        }
        let next = match (self.selected, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        if self.selected == Some(next) {
            return None;
        }
        self.selected = Some(next);
        Some(next)
    }

    fn current(&self) -> &str {
        self.selected
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
            .unwrap_or(if self.options.is_empty() {
                "loading..."
            } else {
                "(not set)"
            })
    }
}

/// The whole screen.
#[derive(Debug, Default)]
pub struct TerminalView {
    page: Page,
    focus: Focus,
    input: String,
    output: String,
    status: String,
    prompt: Option<String>,
    source: Selector,
    target: Selector,
    formality: Selector,
    formalities: Vec<Formality>,
    glossary: Selector,
    glossaries: Vec<GlossaryOption>,
    glossary_languages: Vec<String>,
    glossary_cursor: usize,
    shown_glossary: Option<InspectedGlossary>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translates a key press into a view event, updating local widget state.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ViewEvent> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return Some(ViewEvent::Quit);
        }
        if self.prompt.is_some() {
            return self.handle_prompt_key(key);
        }

        match key.code {
            KeyCode::F(1) => return Some(ViewEvent::PageRequested(Page::Translate)),
            KeyCode::F(2) => return Some(ViewEvent::PageRequested(Page::Glossaries)),
            KeyCode::Char('1') if alt => return Some(ViewEvent::PageRequested(Page::Translate)),
            KeyCode::Char('2') if alt => return Some(ViewEvent::PageRequested(Page::Glossaries)),
            KeyCode::Char(':') if alt || !self.typing() => {
                self.prompt = Some(String::new());
                return None;
            }
            _ => {}
        }

        match self.page {
            Page::Translate => self.handle_translate_key(key, alt),
            Page::Glossaries => self.handle_glossaries_key(key),
        }
    }

    fn typing(&self) -> bool {
        self.page == Page::Translate && self.focus == Focus::Input
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Option<ViewEvent> {
        let prompt = self.prompt.as_mut()?;
        match key.code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Backspace => {
                if prompt.pop().is_none() {
                    self.prompt = None;
                }
            }
            KeyCode::Char(c) => prompt.push(c),
            KeyCode::Enter => {
                let line = self.prompt.take().unwrap_or_default();
                match parse_command(&line, self.shown_glossary.as_ref()) {
                    Ok(event) => return event,
                    Err(e) => set_error(self, e),
                }
            }
            _ => {}
        }
        None
    }

    fn handle_translate_key(&mut self, key: KeyEvent, alt: bool) -> Option<ViewEvent> {
        if alt {
            let focus = match key.code {
                KeyCode::Char('i') => Focus::Input,
                KeyCode::Char('s') => Focus::Source,
                KeyCode::Char('t') => Focus::Target,
                KeyCode::Char('f') => Focus::Formality,
                KeyCode::Char('g') => Focus::Glossary,
                _ => return None,
            };
            self.focus = focus;
            return None;
        }

        match key.code {
            KeyCode::Tab => {
                self.cycle_focus(true);
                return None;
            }
            KeyCode::BackTab => {
                self.cycle_focus(false);
                return None;
            }
            _ => {}
        }

        if self.focus == Focus::Input {
            return self.edit_input(key);
        }

        let forward = match key.code {
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => true,
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => false,
            _ => return None,
        };

        match self.focus {
            Focus::Input => None,
            Focus::Source => self.source.step(forward).map(|index| ViewEvent::LanguageSelected {
                role: LanguageRole::Source,
                index,
            }),
            Focus::Target => self.target.step(forward).map(|index| ViewEvent::LanguageSelected {
                role: LanguageRole::Target,
                index,
            }),
            Focus::Formality => self
                .formality
                .step(forward)
                .and_then(|index| self.formalities.get(index).copied())
                .map(ViewEvent::FormalitySelected),
            Focus::Glossary => self.glossary.step(forward).map(|index| {
                ViewEvent::GlossarySelected(index.checked_sub(1).and_then(|i| self.glossaries.get(i).cloned()))
            }),
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let len = FOCUS_ORDER.len();
        let current = FOCUS_ORDER
            .iter()
            .position(|f| *f == self.focus)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.focus = FOCUS_ORDER[next];
    }

    fn edit_input(&mut self, key: KeyEvent) -> Option<ViewEvent> {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c)
            }
            KeyCode::Enter => self.input.push('\n'),
            KeyCode::Backspace => {
                self.input.pop()?;
            }
            _ => return None,
        }
        Some(ViewEvent::InputChanged)
    }

    fn handle_glossaries_key(&mut self, key: KeyEvent) -> Option<ViewEvent> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.glossary_cursor + 1 < self.glossaries.len() {
                    self.glossary_cursor += 1;
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.glossary_cursor = self.glossary_cursor.saturating_sub(1);
                None
            }
            KeyCode::Enter => self
                .glossaries
                .get(self.glossary_cursor)
                .map(|g| ViewEvent::GlossaryInspectRequested(g.id.clone())),
            KeyCode::Char('r') => Some(ViewEvent::GlossaryRefreshRequested),
            _ => None,
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let [header, body, status, help] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        match self.page {
            Page::Translate => {
                self.draw_selectors(frame, header);
                self.draw_texts(frame, body);
            }
            Page::Glossaries => {
                let languages = if self.glossary_languages.is_empty() {
                    "loading...".to_string()
                } else {
                    self.glossary_languages.join("; ")
                };
                frame.render_widget(
                    Paragraph::new(languages)
                        .block(Block::default().borders(Borders::ALL).title("Glossary languages")),
                    header,
                );
                self.draw_glossaries(frame, body);
            }
        }

        match &self.prompt {
            Some(prompt) => {
                frame.render_widget(Paragraph::new(format!(":{}", prompt)), status);
                let x = status.x + 1 + prompt.chars().count() as u16;
                frame.set_cursor_position((x.min(status.right().saturating_sub(1)), status.y));
            }
            None => frame.render_widget(
                Paragraph::new(self.status.as_str()).style(Style::default().fg(Color::Yellow)),
                status,
            ),
        }

        let hints = match self.page {
            Page::Translate => {
                "Tab focus | Alt+i/s/t/f/g jump | arrows choose | F2 glossaries | : command | Ctrl+Q quit"
            }
            Page::Glossaries => "arrows move | Enter open | r refresh | F1 translate | : command | Ctrl+Q quit",
        };
        frame.render_widget(
            Paragraph::new(hints).style(Style::default().add_modifier(Modifier::DIM)),
            help,
        );
    }

    fn block(&self, title: &str, focus: Focus) -> Block<'static> {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title.to_string());
        if self.page == Page::Translate && self.focus == focus {
            block.border_style(Style::default().fg(Color::Cyan))
        } else {
            block
        }
    }

    fn draw_selectors(&self, frame: &mut Frame, area: Rect) {
        let [source, target, formality, glossary] = Layout::horizontal([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .areas(area);

        for (selector, title, focus, area) in [
            (&self.source, "Source", Focus::Source, source),
            (&self.target, "Target", Focus::Target, target),
            (&self.formality, "Formality", Focus::Formality, formality),
            (&self.glossary, "Glossary", Focus::Glossary, glossary),
        ] {
            frame.render_widget(
                Paragraph::new(selector.current()).block(self.block(title, focus)),
                area,
            );
        }
    }

    fn draw_texts(&self, frame: &mut Frame, area: Rect) {
        let [input, output] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(area);

        frame.render_widget(
            Paragraph::new(self.input.as_str())
                .wrap(Wrap { trim: false })
                .block(self.block("Input", Focus::Input)),
            input,
        );
        frame.render_widget(
            Paragraph::new(self.output.as_str())
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title("Translation")),
            output,
        );
    }

    fn draw_glossaries(&self, frame: &mut Frame, area: Rect) {
        let [list_area, detail_area] =
            Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
                .areas(area);

        let items: Vec<ListItem> = self
            .glossaries
            .iter()
            .map(|g| ListItem::new(g.name.as_str()))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Glossaries"))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut list_state =
            ListState::default().with_selected((!self.glossaries.is_empty()).then_some(self.glossary_cursor));
        frame.render_stateful_widget(list, list_area, &mut list_state);

        let [info_area, entries_area] =
            Layout::vertical([Constraint::Length(6), Constraint::Min(3)]).areas(detail_area);

        let Some(glossary) = &self.shown_glossary else {
            frame.render_widget(
                Paragraph::new("Press Enter to open a glossary")
                    .block(Block::default().borders(Borders::ALL).title("Details")),
                detail_area,
            );
            return;
        };

        let info = &glossary.info;
        let lines = vec![
            Line::from(vec![Span::styled("Name: ", Style::default().add_modifier(Modifier::BOLD)), Span::raw(info.name.as_str())]),
            Line::from(format!("Id: {}", info.id)),
            Line::from(format!(
                "Languages: {} -> {}",
                info.source_lang.to_uppercase(),
                info.target_lang.to_uppercase()
            )),
            Line::from(format!(
                "Entries: {}  Created: {}",
                info.entry_count,
                info.creation_time.format("%Y-%m-%d %H:%M")
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Details")),
            info_area,
        );

        let rows = glossary
            .entries
            .iter()
            .map(|e| Row::new(vec![e.source.clone(), e.target.clone()]));
        let table = Table::new(rows, [Constraint::Percentage(50), Constraint::Percentage(50)])
            .header(
                Row::new(vec!["Source", "Target"])
                    .style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .block(Block::default().borders(Borders::ALL).title("Entries"));
        frame.render_widget(table, entries_area);
    }
}

impl View for TerminalView {
    fn input_text(&self) -> String {
        self.input.clone()
    }

    fn clear_output(&mut self) {
        self.output.clear();
    }

    fn write_output(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn set_language_options(&mut self, role: LanguageRole, options: Vec<String>) {
        match role {
            LanguageRole::Source => self.source.set_options(options),
            LanguageRole::Target => self.target.set_options(options),
        }
    }

    fn select_language(&mut self, role: LanguageRole, index: usize) {
        match role {
            LanguageRole::Source => self.source.select(index),
            LanguageRole::Target => self.target.select(index),
        }
    }

    fn set_formality_options(&mut self, options: Vec<Formality>) {
        self.formality
            .set_options(options.iter().map(|f| f.label().to_string()).collect());
        self.formality.select(0);
        self.formalities = options;
    }

    fn set_glossary_options(&mut self, options: Vec<GlossaryOption>) {
        let selected_id = self
            .glossary
            .selected
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.glossaries.get(i))
            .map(|g| g.id.clone());

        self.glossary.set_options(
            std::iter::once(NO_GLOSSARY_LABEL.to_string())
                .chain(options.iter().map(|g| g.name.clone()))
                .collect(),
        );
        let position = selected_id
            .and_then(|id| options.iter().position(|g| g.id == id))
            .map_or(0, |i| i + 1);
        self.glossary.select(position);

        self.glossary_cursor = self.glossary_cursor.min(options.len().saturating_sub(1));
        self.glossaries = options;
    }

    fn clear_glossary_selection(&mut self) {
        self.glossary.select(0);
    }

    fn set_glossary_language_options(&mut self, languages: Vec<String>) {
        self.glossary_languages = languages;
    }

    fn show_glossary(&mut self, glossary: Option<InspectedGlossary>) {
        self.shown_glossary = glossary;
    }

    fn switch_page(&mut self, page: Page) {
        self.page = page;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GlossaryEntry;
    use crate::client::testing::info;
    use ratatui::backend::TestBackend;

    fn press(view: &mut TerminalView, code: KeyCode) -> Option<ViewEvent> {
        view.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_line(view: &mut TerminalView, line: &str) -> Option<ViewEvent> {
        let mut last = None;
        for c in line.chars() {
            last = press(view, KeyCode::Char(c));
        }
        last
    }

    fn loaded_view() -> TerminalView {
        let mut view = TerminalView::new();
        view.set_language_options(
            LanguageRole::Source,
            vec!["Detect language".to_string(), "English".to_string()],
        );
        view.select_language(LanguageRole::Source, 0);
        view.set_language_options(
            LanguageRole::Target,
            vec!["German".to_string(), "French".to_string()],
        );
        view.set_formality_options(Formality::ALL.to_vec());
        view.set_glossary_options(vec![GlossaryOption {
            id: "g-1".to_string(),
            name: "Art terms".to_string(),
        }]);
        view
    }

    fn screen(view: &TerminalView) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| view.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn typing_reports_full_text() {
        let mut view = loaded_view();
        assert_eq!(
            type_line(&mut view, "Hi"),
            Some(ViewEvent::InputChanged)
        );
        assert_eq!(view.input_text(), "Hi");
        assert_eq!(
            press(&mut view, KeyCode::Backspace),
            Some(ViewEvent::InputChanged)
        );
        assert_eq!(view.input_text(), "H");
    }

    #[test]
    fn target_selector_starts_unset() {
        let mut view = loaded_view();
        view.handle_key(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::ALT));
        assert_eq!(
            press(&mut view, KeyCode::Down),
            Some(ViewEvent::LanguageSelected {
                role: LanguageRole::Target,
                index: 0
            })
        );
    }

    #[test]
    fn tab_cycles_through_selectors() {
        let mut view = loaded_view();
        press(&mut view, KeyCode::Tab);
        assert_eq!(
            press(&mut view, KeyCode::Down),
            Some(ViewEvent::LanguageSelected {
                role: LanguageRole::Source,
                index: 1
            })
        );
        press(&mut view, KeyCode::Tab);
        press(&mut view, KeyCode::Tab);
        assert_eq!(
            press(&mut view, KeyCode::Down),
            Some(ViewEvent::FormalitySelected(Formality::PreferMore))
        );
    }

    #[test]
    fn glossary_selector_has_a_none_entry() {
        let mut view = loaded_view();
        view.handle_key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::ALT));
        assert_eq!(
            press(&mut view, KeyCode::Down),
            Some(ViewEvent::GlossarySelected(Some(GlossaryOption {
                id: "g-1".to_string(),
                name: "Art terms".to_string(),
            })))
        );
        assert_eq!(
            press(&mut view, KeyCode::Down),
            Some(ViewEvent::GlossarySelected(None))
        );
    }

    #[test]
    fn glossary_selection_survives_list_refresh() {
        let mut view = loaded_view();
        view.handle_key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::ALT));
        press(&mut view, KeyCode::Down);

        view.set_glossary_options(vec![
            GlossaryOption {
                id: "g-0".to_string(),
                name: "Other".to_string(),
            },
            GlossaryOption {
                id: "g-1".to_string(),
                name: "Art terms".to_string(),
            },
        ]);
        assert_eq!(view.glossary.current(), "Art terms");

        view.clear_glossary_selection();
        assert_eq!(view.glossary.current(), NO_GLOSSARY_LABEL);
    }

    #[test]
    fn command_prompt_emits_events_and_reports_errors() {
        let mut view = loaded_view();
        press(&mut view, KeyCode::Tab);
        press(&mut view, KeyCode::Char(':'));
        type_line(&mut view, "glossaries");
        assert_eq!(
            press(&mut view, KeyCode::Enter),
            Some(ViewEvent::PageRequested(Page::Glossaries))
        );

        press(&mut view, KeyCode::Char(':'));
        type_line(&mut view, "delete");
        assert_eq!(press(&mut view, KeyCode::Enter), None);
        assert!(view.status.starts_with("Invalid command"));
    }

    #[test]
    fn colon_in_input_is_text() {
        let mut view = loaded_view();
        assert_eq!(
            press(&mut view, KeyCode::Char(':')),
            Some(ViewEvent::InputChanged)
        );
        assert_eq!(view.input_text(), ":");
        assert!(view.prompt.is_none());
    }

    #[test]
    fn quit_keys() {
        let mut view = loaded_view();
        assert_eq!(
            view.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(ViewEvent::Quit)
        );
        assert_eq!(
            view.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(ViewEvent::Quit)
        );
    }

    #[test]
    fn glossaries_page_opens_selected_glossary() {
        let mut view = loaded_view();
        view.switch_page(Page::Glossaries);
        assert_eq!(
            press(&mut view, KeyCode::Enter),
            Some(ViewEvent::GlossaryInspectRequested("g-1".to_string()))
        );
        assert_eq!(
            press(&mut view, KeyCode::Char('r')),
            Some(ViewEvent::GlossaryRefreshRequested)
        );
    }

    #[test]
    fn renders_translate_page() {
        let mut view = loaded_view();
        view.write_output("Hallo");
        view.set_status("Detected source language: EN");

        let screen = screen(&view);

        assert!(screen.contains("Detect language"));
        assert!(screen.contains("Hallo"));
        assert!(screen.contains("Detected source language: EN"));
        assert!(screen.contains("(not set)"));
    }

    #[test]
    fn selectors_show_loading_until_options_arrive() {
        let view = TerminalView::new();
        assert!(screen(&view).contains("loading..."));
        assert!(screen(&loaded_view()).contains("(not set)"));
    }

    #[test]
    fn renders_open_glossary() {
        let mut view = loaded_view();
        view.switch_page(Page::Glossaries);
        view.show_glossary(Some(InspectedGlossary {
            info: info("g-1", "Art terms", "en", "de", 1),
            entries: vec![GlossaryEntry::new("artist", "Maler")],
        }));

        let screen = screen(&view);

        assert!(screen.contains("EN -> DE"));
        assert!(screen.contains("Maler"));
    }
}
