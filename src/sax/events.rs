//! SAX Event Types
//!
//! Owned form of the push events, used to record a stream and replay it later.

use super::{emit_cdata, emit_comment, ContentHandler, DocumentInfo};
use crate::attributes::{Attribute, Attributes};
use crate::error::Result;
use crate::name::QName;

/// A recorded SAX event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent {
    /// Document metadata (precedes StartDocument)
    DocumentInfo(DocumentInfo),
    StartDocument,
    EndDocument,
    StartPrefixMapping {
        prefix: String,
        uri: String,
    },
    EndPrefixMapping {
        prefix: String,
    },
    StartElement {
        name: QName,
        attributes: Vec<Attribute>,
    },
    EndElement {
        name: QName,
    },
    Characters(String),
    IgnorableWhitespace(String),
    StartCData,
    EndCData,
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
}

impl SaxEvent {
    /// Check if this is a start element event
    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, SaxEvent::StartElement { .. })
    }

    /// Check if this is an end element event
    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, SaxEvent::EndElement { .. })
    }

    /// Check if this is a prefix mapping event (start or end)
    #[inline]
    pub fn is_prefix_mapping(&self) -> bool {
        matches!(
            self,
            SaxEvent::StartPrefixMapping { .. } | SaxEvent::EndPrefixMapping { .. }
        )
    }

    /// Get the element name if this is a start or end element
    pub fn element_name(&self) -> Option<&QName> {
        match self {
            SaxEvent::StartElement { name, .. } | SaxEvent::EndElement { name } => Some(name),
            _ => None,
        }
    }

    /// Deliver this event to a handler
    pub fn replay<H: ContentHandler + ?Sized>(&self, handler: &mut H) -> Result<()> {
        match self {
            SaxEvent::DocumentInfo(info) => handler.document_info(info),
            SaxEvent::StartDocument => handler.start_document(),
            SaxEvent::EndDocument => handler.end_document(),
            SaxEvent::StartPrefixMapping { prefix, uri } => {
                handler.start_prefix_mapping(prefix, uri)
            }
            SaxEvent::EndPrefixMapping { prefix } => handler.end_prefix_mapping(prefix),
            SaxEvent::StartElement { name, attributes } => {
                let attributes: Attributes = attributes.iter().cloned().collect();
                handler.start_element(name, &attributes)
            }
            SaxEvent::EndElement { name } => handler.end_element(name),
            SaxEvent::Characters(text) => handler.characters(text),
            SaxEvent::IgnorableWhitespace(text) => handler.ignorable_whitespace(text),
            SaxEvent::StartCData => match handler.as_lexical() {
                Some(lexical) => lexical.start_cdata(),
                None => Ok(()),
            },
            SaxEvent::EndCData => match handler.as_lexical() {
                Some(lexical) => lexical.end_cdata(),
                None => Ok(()),
            },
            SaxEvent::Comment(text) => emit_comment(handler, text),
            SaxEvent::ProcessingInstruction { target, data } => {
                handler.processing_instruction(target, data)
            }
        }
    }
}

/// Replay a whole recorded stream
pub fn replay_all<H: ContentHandler + ?Sized>(events: &[SaxEvent], handler: &mut H) -> Result<()> {
    for event in events {
        event.replay(handler)?;
    }
    Ok(())
}

/// Replay a CDATA section as a single unit (markers + characters)
pub fn replay_cdata<H: ContentHandler + ?Sized>(text: &str, handler: &mut H) -> Result<()> {
    emit_cdata(handler, text)
}
