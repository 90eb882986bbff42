//! Wires the client, the terminal and the controller together and runs the
//! UI loop until the user quits.

use crate::client::DeepLClient;
use crate::config::Config;
use crate::error::Result;
use crate::ui::{Controller, Flow, Message, TerminalGuard, TerminalView};
use crossterm::event::{self, Event, KeyEventKind};
use log::info;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

/// How long to wait for a key before looking at the inbox again.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handles every message that arrived since the last iteration.
fn drain_inbox(controller: &mut Controller<TerminalView>, inbox: &Receiver<Message>) {
    while let Ok(message) = inbox.try_recv() {
        controller.handle_message(message);
    }
}

pub fn run(config: Config) -> Result<()> {
    let client = Arc::new(DeepLClient::new(&config)?);
    let (outbox, inbox) = mpsc::channel();
    let mut controller = Controller::new(TerminalView::new(), client, &config, outbox);

    let mut terminal = TerminalGuard::enter()?;
    controller.start();
    info!("UI started against {}", config.server_url);

    loop {
        drain_inbox(&mut controller, &inbox);
        terminal.draw(controller.view())?;

        if !event::poll(EVENT_POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let Some(view_event) = controller.view_mut().handle_key(key) else {
            continue;
        };
        if controller.handle_event(view_event) == Flow::Quit {
            break;
        }
    }

    info!("UI stopped");
    Ok(())
}
