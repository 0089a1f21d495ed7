//! Terminal rendering of interpreter events

use crate::events::{EventKind, EventSink, OutputEvent};
use colored::Colorize;
use nexus_logger as logger;
use std::io::Write;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

/// Format one event the way the simulator shows it
pub fn render_event(event: &OutputEvent) -> String {
    match event.kind {
        EventKind::Input => format!("{} {}", "$".green(), event.content.white()),
        EventKind::Output => event.content.clone(),
        EventKind::Error => event.content.red().to_string(),
        EventKind::Success => event.content.green().to_string(),
        EventKind::Info => event.content.blue().to_string(),
    }
}

/// Sink that prints events to stdout as they arrive
#[derive(Debug, Default)]
pub struct ConsoleSink {
    /// The interactive shell echoes input itself through the line editor
    pub echo_input: bool,
}

impl ConsoleSink {
    pub fn new(echo_input: bool) -> Self {
        Self { echo_input }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: OutputEvent) {
        if event.kind == EventKind::Input && !self.echo_input {
            return;
        }
        println!("{}", render_event(&event));
    }

    fn clear(&mut self) {
        print!("{}", CLEAR_SCREEN);
        if let Err(e) = std::io::stdout().flush() {
            logger::debug(&format!("Failed to flush stdout after clear: {}", e));
        }
    }
}
