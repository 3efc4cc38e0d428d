//! Event reader to push events
//!
//! Same phases and rules as [`StreamToSax`](super::StreamToSax), driven by
//! owned events. End-element events may omit their namespaces, so the
//! declarations of every open element are kept on a stack and used when the
//! end event carries none.

use log::{debug, trace};

use crate::attributes::{Attribute, Attributes};
use crate::error::{BridgeError, Phase, Result};
use crate::name::QName;
use crate::sax::{emit_comment, ContentHandler, DocumentInfo};
use crate::stax::{EventReader, Namespace, StaxEvent};

/// Bridge from an event reader to a content handler
pub struct EventToSax<'h, H: ContentHandler + ?Sized> {
    handler: &'h mut H,
    /// Declarations of the open elements, innermost last
    open_namespaces: Vec<Vec<Namespace>>,
}

impl<'h, H: ContentHandler + ?Sized> EventToSax<'h, H> {
    pub fn new(handler: &'h mut H) -> Self {
        EventToSax {
            handler,
            open_namespaces: Vec::new(),
        }
    }

    /// Drain `reader` into the handler.
    ///
    /// The next event must be StartDocument or StartElement.
    pub fn bridge<R: EventReader + ?Sized>(&mut self, reader: &mut R) -> Result<()> {
        let is_document = match reader.peek()? {
            Some(StaxEvent::StartDocument { .. }) => true,
            Some(StaxEvent::StartElement { .. }) => false,
            Some(other) => {
                return Err(BridgeError::IllegalState(format!(
                    "reader must be at StartDocument or StartElement, found {}",
                    other.kind()
                )))
            }
            None => return Err(BridgeError::IllegalState("reader is empty".to_string())),
        };
        debug!("bridging event reader, document: {}", is_document);
        self.open_namespaces.clear();

        if is_document {
            if let Some(StaxEvent::StartDocument {
                version,
                encoding,
                standalone,
            }) = reader.next_event()?
            {
                let info = DocumentInfo {
                    version,
                    encoding,
                    standalone,
                };
                if !info.is_empty() {
                    self.handler.document_info(&info)?;
                }
            }
        }
        self.handler.start_document()?;

        let first = if is_document {
            self.prolog(reader)?
        } else {
            Self::advance(reader, Phase::Body)?
        };
        self.body(reader, first)?;
        if is_document {
            self.epilog(reader)?;
        }

        self.handler.end_document()
    }

    fn advance<R: EventReader + ?Sized>(reader: &mut R, phase: Phase) -> Result<StaxEvent> {
        reader
            .next_event()?
            .ok_or_else(|| BridgeError::IllegalState(format!("reader exhausted in {}", phase)))
    }

    /// Handle the prolog and return the root StartElement
    fn prolog<R: EventReader + ?Sized>(&mut self, reader: &mut R) -> Result<StaxEvent> {
        loop {
            let event = Self::advance(reader, Phase::Prolog)?;
            if event.is_start_element() {
                trace!("prolog done");
                return Ok(event);
            }
            match &event {
                StaxEvent::Characters(text) => self.handler.characters(text)?,
                StaxEvent::Space(text) => self.handler.ignorable_whitespace(text)?,
                StaxEvent::Comment(text) => emit_comment(&mut *self.handler, text)?,
                StaxEvent::ProcessingInstruction { target, data } => {
                    self.handler.processing_instruction(target, data)?
                }
                StaxEvent::Dtd(_) => {}
                other => {
                    return Err(BridgeError::Malformed {
                        phase: Phase::Prolog,
                        event: other.kind().name(),
                    })
                }
            }
        }
    }

    fn body<R: EventReader + ?Sized>(&mut self, reader: &mut R, first: StaxEvent) -> Result<()> {
        let mut depth = 0usize;
        let mut event = first;

        loop {
            match event {
                StaxEvent::StartElement {
                    name,
                    attributes,
                    namespaces,
                } => {
                    depth += 1;
                    self.start_element(&name, attributes, namespaces)?;
                }
                StaxEvent::EndElement { name, namespaces } => {
                    self.end_element(&name, namespaces)?;
                    depth = depth.saturating_sub(1);
                }
                StaxEvent::Characters(text) => self.handler.characters(&text)?,
                StaxEvent::Space(text) => self.handler.ignorable_whitespace(&text)?,
                StaxEvent::Comment(text) => emit_comment(&mut *self.handler, &text)?,
                StaxEvent::ProcessingInstruction { target, data } => {
                    self.handler.processing_instruction(&target, &data)?
                }
                StaxEvent::Attribute(_)
                | StaxEvent::Namespace(_)
                | StaxEvent::EntityReference(_)
                | StaxEvent::EntityDeclaration(_)
                | StaxEvent::NotationDeclaration(_)
                | StaxEvent::CData(_)
                | StaxEvent::Dtd(_) => {}
                other @ (StaxEvent::StartDocument { .. } | StaxEvent::EndDocument) => {
                    return Err(BridgeError::Malformed {
                        phase: Phase::Body,
                        event: other.kind().name(),
                    })
                }
            }

            if depth == 0 {
                break;
            }
            event = Self::advance(reader, Phase::Body)?;
        }
        trace!("body done");
        Ok(())
    }

    fn epilog<R: EventReader + ?Sized>(&mut self, reader: &mut R) -> Result<()> {
        while let Some(event) = reader.next_event()? {
            match event {
                StaxEvent::EndDocument => break,
                StaxEvent::Characters(text) => self.handler.characters(&text)?,
                StaxEvent::Space(text) => self.handler.ignorable_whitespace(&text)?,
                StaxEvent::Comment(text) => emit_comment(&mut *self.handler, &text)?,
                StaxEvent::ProcessingInstruction { target, data } => {
                    self.handler.processing_instruction(&target, &data)?
                }
                other => {
                    return Err(BridgeError::Malformed {
                        phase: Phase::Epilog,
                        event: other.kind().name(),
                    })
                }
            }
        }
        trace!("epilog done");
        Ok(())
    }

    fn start_element(
        &mut self,
        name: &QName,
        attributes: Vec<Attribute>,
        namespaces: Vec<Namespace>,
    ) -> Result<()> {
        for namespace in &namespaces {
            self.handler
                .start_prefix_mapping(&namespace.prefix, &namespace.uri)?;
        }
        self.handler.start_element(name, &Attributes::from(attributes))?;
        self.open_namespaces.push(namespaces);
        Ok(())
    }

    fn end_element(&mut self, name: &QName, namespaces: Vec<Namespace>) -> Result<()> {
        self.handler.end_element(name)?;

        let declared = self.open_namespaces.pop().unwrap_or_default();
        let closing = if namespaces.is_empty() { declared } else { namespaces };
        for namespace in closing.iter().rev() {
            self.handler.end_prefix_mapping(&namespace.prefix)?;
        }
        Ok(())
    }
}
