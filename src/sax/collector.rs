//! SAX Collector
//!
//! Implements ContentHandler to record every event it receives.

use super::events::SaxEvent;
use super::{ContentHandler, DocumentInfo, LexicalHandler};
use crate::attributes::Attributes;
use crate::error::Result;
use crate::name::QName;

/// Handler that gathers SAX events in arrival order
pub struct EventRecorder {
    /// Collected events
    events: Vec<SaxEvent>,
    /// Whether comments and CDATA markers are accepted
    lexical: bool,
}

impl EventRecorder {
    /// Create a new recorder that also accepts lexical events
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(64),
            lexical: true,
        }
    }

    /// Create a recorder without the lexical capability
    pub fn without_lexical() -> Self {
        Self {
            events: Vec::with_capacity(64),
            lexical: false,
        }
    }

    /// Take the collected events
    pub fn take_events(&mut self) -> Vec<SaxEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get the collected events as a slice
    pub fn events(&self) -> &[SaxEvent] {
        &self.events
    }

    /// Get number of collected events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Only the prefix mapping events, in order
    pub fn prefix_mappings(&self) -> Vec<&SaxEvent> {
        self.events.iter().filter(|e| e.is_prefix_mapping()).collect()
    }
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHandler for EventRecorder {
    fn document_info(&mut self, info: &DocumentInfo) -> Result<()> {
        self.events.push(SaxEvent::DocumentInfo(info.clone()));
        Ok(())
    }

    fn start_document(&mut self) -> Result<()> {
        self.events.push(SaxEvent::StartDocument);
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.events.push(SaxEvent::EndDocument);
        Ok(())
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()> {
        self.events.push(SaxEvent::StartPrefixMapping {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
        });
        Ok(())
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<()> {
        self.events.push(SaxEvent::EndPrefixMapping {
            prefix: prefix.to_string(),
        });
        Ok(())
    }

    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> Result<()> {
        self.events.push(SaxEvent::StartElement {
            name: name.clone(),
            attributes: attributes.as_slice().to_vec(),
        });
        Ok(())
    }

    fn end_element(&mut self, name: &QName) -> Result<()> {
        self.events.push(SaxEvent::EndElement { name: name.clone() });
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.events.push(SaxEvent::Characters(text.to_string()));
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<()> {
        self.events.push(SaxEvent::IgnorableWhitespace(text.to_string()));
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        self.events.push(SaxEvent::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        });
        Ok(())
    }

    fn as_lexical(&mut self) -> Option<&mut dyn LexicalHandler> {
        if self.lexical {
            Some(self)
        } else {
            None
        }
    }
}

impl LexicalHandler for EventRecorder {
    fn start_cdata(&mut self) -> Result<()> {
        self.events.push(SaxEvent::StartCData);
        Ok(())
    }

    fn end_cdata(&mut self) -> Result<()> {
        self.events.push(SaxEvent::EndCData);
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        self.events.push(SaxEvent::Comment(text.to_string()));
        Ok(())
    }
}
