//! SAX (Simple API for XML) Module
//!
//! The push-event contract spoken at every adapter boundary.
//!
//! ## Architecture
//!
//! ```text
//! DomToSax ─────┐
//! StreamToSax ──┼──> ContentHandler (+ LexicalHandler) ──> SaxToDom / XmlWriter / EventRecorder
//! EventToSax ───┘
//! ```
//!
//! ## Capabilities
//!
//! CDATA markers and comments are optional. A handler that wants them returns
//! itself from [`ContentHandler::as_lexical`]; producers fall back to plain
//! characters (CDATA) or drop the event (comments) otherwise.

pub mod collector;
pub mod events;

pub use collector::EventRecorder;
pub use events::SaxEvent;

use crate::attributes::Attributes;
use crate::error::Result;
use crate::name::QName;

/// Document-level metadata delivered once, before `start_document`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    pub version: Option<String>,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

impl DocumentInfo {
    pub fn is_empty(&self) -> bool {
        self.version.is_none() && self.encoding.is_none() && self.standalone.is_none()
    }
}

/// Receiver of the push event stream
///
/// Every method returns a [`Result`]; an `Err` aborts the producing adapter and
/// is handed back to its caller unchanged.
pub trait ContentHandler {
    /// Called once before `start_document` when the producer knows the
    /// document's version, encoding or standalone flag (optional)
    fn document_info(&mut self, _info: &DocumentInfo) -> Result<()> {
        Ok(())
    }

    fn start_document(&mut self) -> Result<()>;

    fn end_document(&mut self) -> Result<()>;

    /// A prefix comes into scope; `""` is the default namespace
    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()>;

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<()>;

    /// Namespace declarations are never part of `attributes`; they arrive as
    /// prefix mappings immediately before this call
    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> Result<()>;

    fn end_element(&mut self, name: &QName) -> Result<()>;

    fn characters(&mut self, text: &str) -> Result<()>;

    /// Whitespace a cursor reported as ignorable (optional)
    fn ignorable_whitespace(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()>;

    /// The lexical side of this handler, if it has one
    fn as_lexical(&mut self) -> Option<&mut dyn LexicalHandler> {
        None
    }
}

/// CDATA boundaries and comments
pub trait LexicalHandler {
    fn start_cdata(&mut self) -> Result<()>;

    fn end_cdata(&mut self) -> Result<()>;

    fn comment(&mut self, text: &str) -> Result<()>;
}

impl<H: ContentHandler + ?Sized> ContentHandler for &mut H {
    fn document_info(&mut self, info: &DocumentInfo) -> Result<()> {
        (**self).document_info(info)
    }

    fn start_document(&mut self) -> Result<()> {
        (**self).start_document()
    }

    fn end_document(&mut self) -> Result<()> {
        (**self).end_document()
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()> {
        (**self).start_prefix_mapping(prefix, uri)
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<()> {
        (**self).end_prefix_mapping(prefix)
    }

    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> Result<()> {
        (**self).start_element(name, attributes)
    }

    fn end_element(&mut self, name: &QName) -> Result<()> {
        (**self).end_element(name)
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        (**self).characters(text)
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<()> {
        (**self).ignorable_whitespace(text)
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        (**self).processing_instruction(target, data)
    }

    fn as_lexical(&mut self) -> Option<&mut dyn LexicalHandler> {
        (**self).as_lexical()
    }
}

/// Forward a comment if the handler accepts them
pub(crate) fn emit_comment<H: ContentHandler + ?Sized>(handler: &mut H, text: &str) -> Result<()> {
    match handler.as_lexical() {
        Some(lexical) => lexical.comment(text),
        None => Ok(()),
    }
}

/// Forward CDATA content, wrapped in CDATA markers when the handler accepts
/// them and as plain characters otherwise
pub(crate) fn emit_cdata<H: ContentHandler + ?Sized>(handler: &mut H, text: &str) -> Result<()> {
    let lexical = match handler.as_lexical() {
        Some(lexical) => {
            lexical.start_cdata()?;
            true
        }
        None => false,
    };
    handler.characters(text)?;
    if lexical {
        if let Some(lexical) = handler.as_lexical() {
            lexical.end_cdata()?;
        }
    }
    Ok(())
}
