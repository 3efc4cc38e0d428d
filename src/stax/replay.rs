//! Replay cursors and event readers
//!
//! - [`EventCursor`]: owned events exposed through the stream cursor API
//! - [`CursorEventReader`]: owned events pulled from any stream cursor
//! - [`IterEventReader`]: owned events pulled from an iterator

use std::iter::Peekable;

use super::{CursorEvent, EventReader, Namespace, StaxEvent, StreamCursor};
use crate::attributes::Attribute;
use crate::error::{BridgeError, Result};
use crate::name::QName;

/// Stream cursor over recorded events
///
/// Positioned on the first event after construction. An empty event list
/// behaves like a lone EndDocument.
#[derive(Debug, Clone)]
pub struct EventCursor {
    events: Vec<StaxEvent>,
    index: usize,
    version: Option<String>,
    encoding: Option<String>,
    standalone: Option<bool>,
}

impl EventCursor {
    pub fn new(mut events: Vec<StaxEvent>) -> Self {
        if events.is_empty() {
            events.push(StaxEvent::EndDocument);
        }
        let mut cursor = EventCursor {
            events,
            index: 0,
            version: None,
            encoding: None,
            standalone: None,
        };
        cursor.capture_declaration();
        cursor
    }

    fn current(&self) -> &StaxEvent {
        &self.events[self.index]
    }

    fn capture_declaration(&mut self) {
        if let StaxEvent::StartDocument {
            version,
            encoding,
            standalone,
        } = &self.events[self.index]
        {
            self.version = version.clone();
            self.encoding = encoding.clone();
            self.standalone = *standalone;
        }
    }
}

impl StreamCursor for EventCursor {
    fn event_type(&self) -> CursorEvent {
        self.current().kind()
    }

    fn next(&mut self) -> Result<CursorEvent> {
        if !self.has_next() {
            return Err(BridgeError::IllegalState(format!(
                "no event after {}",
                self.event_type()
            )));
        }
        self.index += 1;
        self.capture_declaration();
        Ok(self.event_type())
    }

    fn has_next(&self) -> bool {
        self.index + 1 < self.events.len()
    }

    fn text(&self) -> &str {
        match self.current() {
            StaxEvent::EntityDeclaration(text) | StaxEvent::NotationDeclaration(text) => text,
            other => other.text(),
        }
    }

    fn pi_target(&self) -> &str {
        self.current().pi_target()
    }

    fn pi_data(&self) -> &str {
        self.current().pi_data()
    }

    fn name(&self) -> Option<&QName> {
        self.current().name()
    }

    fn attribute_count(&self) -> usize {
        match self.current() {
            StaxEvent::Attribute(_) => 1,
            other => other.attributes().len(),
        }
    }

    fn attribute(&self, index: usize) -> Option<&Attribute> {
        match self.current() {
            StaxEvent::Attribute(attribute) if index == 0 => Some(attribute),
            other => other.attributes().get(index),
        }
    }

    fn namespace_count(&self) -> usize {
        match self.current() {
            StaxEvent::Namespace(_) => 1,
            other => other.namespaces().len(),
        }
    }

    fn namespace(&self, index: usize) -> Option<&Namespace> {
        match self.current() {
            StaxEvent::Namespace(namespace) if index == 0 => Some(namespace),
            other => other.namespaces().get(index),
        }
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    fn standalone(&self) -> Option<bool> {
        self.standalone
    }
}

/// Event reader that pulls from a stream cursor.
///
/// The first event handed out is the one the cursor is positioned on when
/// the reader is created.
pub struct CursorEventReader<C> {
    cursor: C,
    peeked: Option<StaxEvent>,
    started: bool,
    exhausted: bool,
}

impl<C: StreamCursor> CursorEventReader<C> {
    pub fn new(cursor: C) -> Self {
        CursorEventReader {
            cursor,
            peeked: None,
            started: false,
            exhausted: false,
        }
    }

    /// Give back the underlying cursor
    pub fn into_inner(self) -> C {
        self.cursor
    }

    fn fill(&mut self) -> Result<()> {
        if self.peeked.is_some() || self.exhausted {
            return Ok(());
        }
        if !self.started {
            self.started = true;
        } else if self.cursor.has_next() {
            self.cursor.next()?;
        } else {
            self.exhausted = true;
            return Ok(());
        }
        self.peeked = Some(StaxEvent::from_cursor(&self.cursor));
        Ok(())
    }
}

impl<C: StreamCursor> EventReader for CursorEventReader<C> {
    fn peek(&mut self) -> Result<Option<&StaxEvent>> {
        self.fill()?;
        Ok(self.peeked.as_ref())
    }

    fn next_event(&mut self) -> Result<Option<StaxEvent>> {
        self.fill()?;
        Ok(self.peeked.take())
    }
}

/// Event reader over any iterator of owned events
pub struct IterEventReader<I: Iterator<Item = StaxEvent>> {
    iter: Peekable<I>,
}

impl<I: Iterator<Item = StaxEvent>> IterEventReader<I> {
    pub fn new(events: impl IntoIterator<IntoIter = I>) -> Self {
        IterEventReader {
            iter: events.into_iter().peekable(),
        }
    }
}

impl<I: Iterator<Item = StaxEvent>> EventReader for IterEventReader<I> {
    fn peek(&mut self) -> Result<Option<&StaxEvent>> {
        Ok(self.iter.peek())
    }

    fn next_event(&mut self) -> Result<Option<StaxEvent>> {
        Ok(self.iter.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<StaxEvent> {
        vec![
            StaxEvent::StartDocument {
                version: Some("1.0".into()),
                encoding: None,
                standalone: Some(true),
            },
            StaxEvent::start_element(QName::local("a")),
            StaxEvent::Characters("hi".into()),
            StaxEvent::end_element(QName::local("a")),
            StaxEvent::EndDocument,
        ]
    }

    #[test]
    fn test_event_cursor_walk() {
        let mut cursor = EventCursor::new(sample());
        assert_eq!(cursor.event_type(), CursorEvent::StartDocument);
        assert_eq!(cursor.version(), Some("1.0"));
        assert_eq!(cursor.standalone(), Some(true));

        assert_eq!(cursor.next().unwrap(), CursorEvent::StartElement);
        assert_eq!(cursor.name().map(|n| n.local_name.as_str()), Some("a"));
        assert_eq!(cursor.next().unwrap(), CursorEvent::Characters);
        assert_eq!(cursor.text(), "hi");
        cursor.next().unwrap();
        cursor.next().unwrap();
        assert!(!cursor.has_next());
        assert!(matches!(cursor.next(), Err(BridgeError::IllegalState(_))));
        // declaration values survive moving on
        assert_eq!(cursor.version(), Some("1.0"));
    }

    #[test]
    fn test_empty_event_cursor() {
        let cursor = EventCursor::new(Vec::new());
        assert_eq!(cursor.event_type(), CursorEvent::EndDocument);
        assert!(!cursor.has_next());
    }

    #[test]
    fn test_cursor_event_reader() {
        let mut reader = CursorEventReader::new(EventCursor::new(sample()));
        assert!(reader.peek().unwrap().is_some_and(|e| e.is_start_document()));
        let mut collected = Vec::new();
        while let Some(event) = reader.next_event().unwrap() {
            collected.push(event);
        }
        assert_eq!(collected, sample());
        assert!(reader.peek().unwrap().is_none());
    }

    #[test]
    fn test_iter_event_reader() {
        let mut reader = IterEventReader::new(sample());
        assert_eq!(reader.peek().unwrap().map(|e| e.kind()), Some(CursorEvent::StartDocument));
        assert_eq!(reader.next_event().unwrap().map(|e| e.kind()), Some(CursorEvent::StartDocument));
        assert_eq!(reader.next_event().unwrap().map(|e| e.kind()), Some(CursorEvent::StartElement));
    }
}
