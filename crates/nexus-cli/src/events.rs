//! Tagged output events produced by the interpreter

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Echo of the line the operator typed
    Input,
    Output,
    Error,
    Success,
    Info,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            EventKind::Input => "input",
            EventKind::Output => "output",
            EventKind::Error => "error",
            EventKind::Success => "success",
            EventKind::Info => "info",
        };
        write!(f, "{}", tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    pub kind: EventKind,
    pub content: String,
}

impl OutputEvent {
    pub fn new(kind: EventKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Receiver of events in emission order
pub trait EventSink {
    fn emit(&mut self, event: OutputEvent);

    /// Forget everything emitted so far
    fn clear(&mut self);

    fn input(&mut self, content: &str) {
        self.emit(OutputEvent::new(EventKind::Input, content));
    }

    fn output(&mut self, content: &str) {
        self.emit(OutputEvent::new(EventKind::Output, content));
    }

    fn error(&mut self, content: &str) {
        self.emit(OutputEvent::new(EventKind::Error, content));
    }

    fn success(&mut self, content: &str) {
        self.emit(OutputEvent::new(EventKind::Success, content));
    }

    fn info(&mut self, content: &str) {
        self.emit(OutputEvent::new(EventKind::Info, content));
    }
}

/// In-memory sink that keeps the full transcript
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    events: Vec<OutputEvent>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[OutputEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&OutputEvent> {
        self.events.last()
    }

    /// Contents of every event of `kind`, in order
    pub fn contents_of(&self, kind: EventKind) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.content.as_str())
            .collect()
    }
}

impl EventSink for Transcript {
    fn emit(&mut self, event: OutputEvent) {
        self.events.push(event);
    }

    fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_keeps_order_and_clears() {
        let mut transcript = Transcript::new();
        transcript.input("nexus sync");
        transcript.info("Connecting");
        transcript.success("done");
        assert_eq!(transcript.events().len(), 3);
        assert_eq!(transcript.contents_of(EventKind::Info), vec!["Connecting"]);
        assert!(transcript.last().is_some_and(|e| e.kind == EventKind::Success));

        transcript.clear();
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_event_kind_tags() {
        assert_eq!(EventKind::Input.to_string(), "input");
        assert_eq!(EventKind::Success.to_string(), "success");
    }
}
