//! Stream cursor to push events
//!
//! Drains a [`StreamCursor`] into a [`ContentHandler`] in three phases:
//!
//! - prolog: everything before the root element (only when the cursor starts
//!   on StartDocument)
//! - body: the root element subtree, tracked with a depth counter
//! - epilog: everything after the root element up to EndDocument (again only
//!   for cursors that started on StartDocument)
//!
//! Events that are legal for the phase but have no push counterpart are
//! skipped. Anything else is reported as [`BridgeError::Malformed`].
//!
//! A cursor may report no namespaces on an end element. The declarations of
//! every open element are kept on a stack and closed from there in that case.

use log::{debug, trace};

use crate::attributes::Attributes;
use crate::error::{BridgeError, Phase, Result};
use crate::sax::{emit_comment, ContentHandler, DocumentInfo};
use crate::stax::{CursorEvent, Namespace, StreamCursor};

/// Bridge from a stream cursor to a content handler
pub struct StreamToSax<'h, H: ContentHandler + ?Sized> {
    handler: &'h mut H,
    /// Declarations of the open elements, innermost last
    open_namespaces: Vec<Vec<Namespace>>,
}

impl<'h, H: ContentHandler + ?Sized> StreamToSax<'h, H> {
    pub fn new(handler: &'h mut H) -> Self {
        StreamToSax {
            handler,
            open_namespaces: Vec::new(),
        }
    }

    /// Drain `cursor` into the handler.
    ///
    /// The cursor must be positioned on StartDocument or StartElement. On
    /// success the handler has seen exactly one StartDocument/EndDocument pair.
    pub fn bridge<C: StreamCursor + ?Sized>(&mut self, cursor: &mut C) -> Result<()> {
        let initial = cursor.event_type();
        if initial != CursorEvent::StartDocument && initial != CursorEvent::StartElement {
            return Err(BridgeError::IllegalState(format!(
                "cursor must be on StartDocument or StartElement, found {}",
                initial
            )));
        }
        let is_document = initial == CursorEvent::StartDocument;
        debug!("bridging stream cursor starting at {}", initial);
        self.open_namespaces.clear();

        let info = DocumentInfo {
            version: cursor.version().map(str::to_string),
            encoding: cursor.encoding().map(str::to_string),
            standalone: cursor.standalone(),
        };
        if !info.is_empty() {
            self.handler.document_info(&info)?;
        }
        self.handler.start_document()?;

        if is_document {
            self.prolog(cursor)?;
        }
        self.body(cursor)?;
        if is_document {
            self.epilog(cursor)?;
        }

        self.handler.end_document()
    }

    fn advance<C: StreamCursor + ?Sized>(cursor: &mut C, phase: Phase) -> Result<CursorEvent> {
        if !cursor.has_next() {
            return Err(BridgeError::IllegalState(format!("cursor exhausted in {}", phase)));
        }
        cursor.next()
    }

    fn prolog<C: StreamCursor + ?Sized>(&mut self, cursor: &mut C) -> Result<()> {
        loop {
            match Self::advance(cursor, Phase::Prolog)? {
                CursorEvent::StartElement => break,
                CursorEvent::Characters => self.handler.characters(cursor.text())?,
                CursorEvent::Space => self.handler.ignorable_whitespace(cursor.text())?,
                CursorEvent::Comment => emit_comment(&mut *self.handler, cursor.text())?,
                CursorEvent::ProcessingInstruction => self
                    .handler
                    .processing_instruction(cursor.pi_target(), cursor.pi_data())?,
                CursorEvent::Dtd => {}
                other => {
                    return Err(BridgeError::Malformed {
                        phase: Phase::Prolog,
                        event: other.name(),
                    })
                }
            }
        }
        trace!("prolog done");
        Ok(())
    }

    fn body<C: StreamCursor + ?Sized>(&mut self, cursor: &mut C) -> Result<()> {
        let mut depth = 0usize;
        let mut event = cursor.event_type();

        loop {
            match event {
                CursorEvent::StartElement => {
                    depth += 1;
                    self.start_element(cursor)?;
                }
                CursorEvent::EndElement => {
                    self.end_element(cursor)?;
                    depth = depth.saturating_sub(1);
                }
                CursorEvent::Characters => self.handler.characters(cursor.text())?,
                CursorEvent::Space => self.handler.ignorable_whitespace(cursor.text())?,
                CursorEvent::Comment => emit_comment(&mut *self.handler, cursor.text())?,
                CursorEvent::ProcessingInstruction => self
                    .handler
                    .processing_instruction(cursor.pi_target(), cursor.pi_data())?,
                CursorEvent::Attribute
                | CursorEvent::Namespace
                | CursorEvent::EntityReference
                | CursorEvent::EntityDeclaration
                | CursorEvent::NotationDeclaration
                | CursorEvent::CData
                | CursorEvent::Dtd => {}
                CursorEvent::StartDocument | CursorEvent::EndDocument => {
                    return Err(BridgeError::Malformed {
                        phase: Phase::Body,
                        event: event.name(),
                    })
                }
            }

            if depth == 0 {
                break;
            }
            event = Self::advance(cursor, Phase::Body)?;
        }
        trace!("body done");
        Ok(())
    }

    fn epilog<C: StreamCursor + ?Sized>(&mut self, cursor: &mut C) -> Result<()> {
        while cursor.has_next() {
            match cursor.next()? {
                CursorEvent::EndDocument => break,
                CursorEvent::Characters => self.handler.characters(cursor.text())?,
                CursorEvent::Space => self.handler.ignorable_whitespace(cursor.text())?,
                CursorEvent::Comment => emit_comment(&mut *self.handler, cursor.text())?,
                CursorEvent::ProcessingInstruction => self
                    .handler
                    .processing_instruction(cursor.pi_target(), cursor.pi_data())?,
                other => {
                    return Err(BridgeError::Malformed {
                        phase: Phase::Epilog,
                        event: other.name(),
                    })
                }
            }
        }
        trace!("epilog done");
        Ok(())
    }

    fn start_element<C: StreamCursor + ?Sized>(&mut self, cursor: &C) -> Result<()> {
        let namespaces: Vec<Namespace> = (0..cursor.namespace_count())
            .filter_map(|i| cursor.namespace(i).cloned())
            .collect();
        for namespace in &namespaces {
            self.handler
                .start_prefix_mapping(&namespace.prefix, &namespace.uri)?;
        }
        self.open_namespaces.push(namespaces);

        let attributes: Attributes = (0..cursor.attribute_count())
            .filter_map(|i| cursor.attribute(i).cloned())
            .collect();
        let name = cursor
            .name()
            .ok_or_else(|| BridgeError::IllegalState("start element without a name".to_string()))?;
        self.handler.start_element(name, &attributes)
    }

    fn end_element<C: StreamCursor + ?Sized>(&mut self, cursor: &C) -> Result<()> {
        let name = cursor
            .name()
            .ok_or_else(|| BridgeError::IllegalState("end element without a name".to_string()))?;
        self.handler.end_element(name)?;

        let declared = self.open_namespaces.pop().unwrap_or_default();
        let closing: Vec<Namespace> = if cursor.namespace_count() == 0 {
            declared
        } else {
            (0..cursor.namespace_count())
                .filter_map(|i| cursor.namespace(i).cloned())
                .collect()
        };
        for namespace in closing.iter().rev() {
            self.handler.end_prefix_mapping(&namespace.prefix)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::QName;
    use crate::sax::{EventRecorder, SaxEvent};
    use crate::stax::{EventCursor, Namespace, StaxEvent, TextCursor};

    fn bridge_text(input: &str) -> Result<Vec<SaxEvent>> {
        let mut cursor = TextCursor::new(input)?;
        let mut recorder = EventRecorder::new();
        StreamToSax::new(&mut recorder).bridge(&mut cursor)?;
        Ok(recorder.take_events())
    }

    fn bridge_events(events: Vec<StaxEvent>) -> Result<Vec<SaxEvent>> {
        let mut cursor = EventCursor::new(events);
        let mut recorder = EventRecorder::new();
        StreamToSax::new(&mut recorder).bridge(&mut cursor)?;
        Ok(recorder.take_events())
    }

    #[test]
    fn test_simple_document() {
        let events = bridge_text("<?xml version=\"1.0\"?><a x=\"1\">hi</a>").unwrap();
        assert!(matches!(&events[0], SaxEvent::DocumentInfo(info) if info.version.as_deref() == Some("1.0")));
        assert_eq!(events[1], SaxEvent::StartDocument);
        match &events[2] {
            SaxEvent::StartElement { name, attributes } => {
                assert_eq!(name.local_name, "a");
                assert_eq!(attributes[0].value, "1");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(events[3], SaxEvent::Characters("hi".into()));
        assert!(events[4].is_end_element());
        assert_eq!(events[5], SaxEvent::EndDocument);
        assert_eq!(events.len(), 6);
    }

    #[test]
    fn test_prefix_mappings_wrap_element() {
        let events = bridge_text("<a xmlns=\"urn:d\" xmlns:p=\"urn:p\"/>").unwrap();
        assert_eq!(
            events[1..7],
            [
                SaxEvent::StartPrefixMapping { prefix: "".into(), uri: "urn:d".into() },
                SaxEvent::StartPrefixMapping { prefix: "p".into(), uri: "urn:p".into() },
                SaxEvent::StartElement {
                    name: QName::new(Some("urn:d"), "a"),
                    attributes: Vec::new(),
                },
                SaxEvent::EndElement { name: QName::new(Some("urn:d"), "a") },
                SaxEvent::EndPrefixMapping { prefix: "p".into() },
                SaxEvent::EndPrefixMapping { prefix: "".into() },
            ]
        );
    }

    #[test]
    fn test_prolog_epilog_and_space() {
        let events = bridge_text("<!--pre--> <r/><?post x?>").unwrap();
        assert_eq!(events[1], SaxEvent::Comment("pre".into()));
        assert_eq!(events[2], SaxEvent::IgnorableWhitespace(" ".into()));
        assert_eq!(
            events[5],
            SaxEvent::ProcessingInstruction {
                target: "post".into(),
                data: "x".into()
            }
        );
    }

    #[test]
    fn test_illegal_initial_state() {
        let result = bridge_events(vec![StaxEvent::Characters("x".into())]);
        assert!(matches!(result, Err(BridgeError::IllegalState(_))));
    }

    #[test]
    fn test_malformed_prolog() {
        let result = bridge_events(vec![
            StaxEvent::start_document(),
            StaxEvent::EntityReference("e".into()),
        ]);
        assert!(matches!(
            result,
            Err(BridgeError::Malformed { phase: Phase::Prolog, event: "EntityReference" })
        ));
    }

    #[test]
    fn test_malformed_epilog() {
        let result = bridge_events(vec![
            StaxEvent::start_document(),
            StaxEvent::start_element(QName::local("a")),
            StaxEvent::end_element(QName::local("a")),
            StaxEvent::start_element(QName::local("b")),
        ]);
        assert!(matches!(
            result,
            Err(BridgeError::Malformed { phase: Phase::Epilog, event: "StartElement" })
        ));
    }

    #[test]
    fn test_body_no_ops() {
        let events = bridge_events(vec![
            StaxEvent::start_document(),
            StaxEvent::start_element(QName::local("a")),
            StaxEvent::EntityReference("e".into()),
            StaxEvent::CData("skipped".into()),
            StaxEvent::Namespace(Namespace::new("p", "urn:p")),
            StaxEvent::end_element(QName::local("a")),
            StaxEvent::EndDocument,
        ])
        .unwrap();
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_start_document_in_body() {
        let result = bridge_events(vec![
            StaxEvent::start_element(QName::local("a")),
            StaxEvent::start_document(),
        ]);
        assert!(matches!(result, Err(BridgeError::Malformed { phase: Phase::Body, .. })));
    }

    #[test]
    fn test_fragment_cursor() {
        let events = bridge_events(vec![
            StaxEvent::start_element(QName::local("a")),
            StaxEvent::Characters("t".into()),
            StaxEvent::end_element(QName::local("a")),
            StaxEvent::start_element(QName::local("next")),
        ])
        .unwrap();
        assert_eq!(events.first(), Some(&SaxEvent::StartDocument));
        assert_eq!(events.last(), Some(&SaxEvent::EndDocument));
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_end_namespaces_from_start() {
        let events = bridge_events(vec![
            StaxEvent::start_document(),
            StaxEvent::StartElement {
                name: QName::new(Some("urn:p"), "p:a"),
                attributes: Vec::new(),
                namespaces: vec![Namespace::new("p", "urn:p"), Namespace::new("q", "urn:q")],
            },
            StaxEvent::start_element(QName::local("b")),
            StaxEvent::end_element(QName::local("b")),
            StaxEvent::end_element(QName::new(Some("urn:p"), "p:a")),
            StaxEvent::EndDocument,
        ])
        .unwrap();

        assert_eq!(
            events[events.len() - 3..],
            [
                SaxEvent::EndPrefixMapping { prefix: "q".into() },
                SaxEvent::EndPrefixMapping { prefix: "p".into() },
                SaxEvent::EndDocument,
            ]
        );
        assert_eq!(events.iter().filter(|e| e.is_prefix_mapping()).count(), 4);
    }

    #[test]
    fn test_truncated_body() {
        let result = bridge_events(vec![
            StaxEvent::start_document(),
            StaxEvent::start_element(QName::local("a")),
        ]);
        assert!(matches!(result, Err(BridgeError::IllegalState(_))));
    }
}
