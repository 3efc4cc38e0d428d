//! StAX-style pull cursors
//!
//! Two pull interfaces are provided:
//!
//! - [`StreamCursor`]: a cursor positioned on one event at a time, queried
//!   through accessors (`name`, `text`, `attribute(i)`, ...). Never rewinds.
//! - [`EventReader`]: hands out owned [`StaxEvent`] values, with one event of
//!   lookahead through `peek`.
//!
//! Implementations:
//! - [`TextCursor`]: parses XML text
//! - [`EventCursor`]: replays recorded events as a stream cursor
//! - [`CursorEventReader`]: event reader over any stream cursor
//! - [`IterEventReader`]: event reader over an iterator of events

pub mod events;
pub mod replay;
pub mod text;

pub use events::{Namespace, StaxEvent};
pub use replay::{CursorEventReader, EventCursor, IterEventReader};
pub use text::TextCursor;

use crate::attributes::Attribute;
use crate::error::Result;
use crate::name::QName;

/// Kind of event a cursor is positioned on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorEvent {
    StartDocument,
    EndDocument,
    StartElement,
    EndElement,
    Characters,
    /// Ignorable whitespace
    Space,
    CData,
    Comment,
    ProcessingInstruction,
    Dtd,
    EntityReference,
    Attribute,
    Namespace,
    EntityDeclaration,
    NotationDeclaration,
}

impl CursorEvent {
    /// Event kind name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            CursorEvent::StartDocument => "StartDocument",
            CursorEvent::EndDocument => "EndDocument",
            CursorEvent::StartElement => "StartElement",
            CursorEvent::EndElement => "EndElement",
            CursorEvent::Characters => "Characters",
            CursorEvent::Space => "Space",
            CursorEvent::CData => "CData",
            CursorEvent::Comment => "Comment",
            CursorEvent::ProcessingInstruction => "ProcessingInstruction",
            CursorEvent::Dtd => "Dtd",
            CursorEvent::EntityReference => "EntityReference",
            CursorEvent::Attribute => "Attribute",
            CursorEvent::Namespace => "Namespace",
            CursorEvent::EntityDeclaration => "EntityDeclaration",
            CursorEvent::NotationDeclaration => "NotationDeclaration",
        }
    }
}

impl std::fmt::Display for CursorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Cursor-style pull interface
///
/// Accessors describe the current event. Values returned by reference stay
/// valid only until the next call to [`next`](Self::next).
pub trait StreamCursor {
    /// Kind of the current event
    fn event_type(&self) -> CursorEvent;

    /// Advance to the next event and return its kind.
    /// Calling this when [`has_next`](Self::has_next) is false is an error.
    fn next(&mut self) -> Result<CursorEvent>;

    /// True while an event follows the current one
    fn has_next(&self) -> bool;

    /// Character content of Characters, Space, CData, Comment and Dtd
    /// events; the name of an EntityReference. Empty otherwise.
    fn text(&self) -> &str;

    /// Target of the current processing instruction
    fn pi_target(&self) -> &str;

    /// Data of the current processing instruction
    fn pi_data(&self) -> &str;

    /// Name of the current StartElement or EndElement
    fn name(&self) -> Option<&QName>;

    /// Number of attributes on the current StartElement
    fn attribute_count(&self) -> usize;

    fn attribute(&self, index: usize) -> Option<&Attribute>;

    /// Number of namespaces declared on the current StartElement, or going
    /// out of scope at the current EndElement
    fn namespace_count(&self) -> usize;

    fn namespace(&self, index: usize) -> Option<&Namespace>;

    /// XML version from the declaration
    fn version(&self) -> Option<&str>;

    /// Encoding from the declaration
    fn encoding(&self) -> Option<&str>;

    /// Standalone flag, when the declaration sets one
    fn standalone(&self) -> Option<bool>;
}

impl<C: StreamCursor + ?Sized> StreamCursor for &mut C {
    fn event_type(&self) -> CursorEvent {
        (**self).event_type()
    }

    fn next(&mut self) -> Result<CursorEvent> {
        (**self).next()
    }

    fn has_next(&self) -> bool {
        (**self).has_next()
    }

    fn text(&self) -> &str {
        (**self).text()
    }

    fn pi_target(&self) -> &str {
        (**self).pi_target()
    }

    fn pi_data(&self) -> &str {
        (**self).pi_data()
    }

    fn name(&self) -> Option<&QName> {
        (**self).name()
    }

    fn attribute_count(&self) -> usize {
        (**self).attribute_count()
    }

    fn attribute(&self, index: usize) -> Option<&Attribute> {
        (**self).attribute(index)
    }

    fn namespace_count(&self) -> usize {
        (**self).namespace_count()
    }

    fn namespace(&self, index: usize) -> Option<&Namespace> {
        (**self).namespace(index)
    }

    fn version(&self) -> Option<&str> {
        (**self).version()
    }

    fn encoding(&self) -> Option<&str> {
        (**self).encoding()
    }

    fn standalone(&self) -> Option<bool> {
        (**self).standalone()
    }
}

/// Iterator-style pull interface over owned events
pub trait EventReader {
    /// The next event without consuming it; `None` once exhausted
    fn peek(&mut self) -> Result<Option<&StaxEvent>>;

    /// Consume and return the next event; `None` once exhausted
    fn next_event(&mut self) -> Result<Option<StaxEvent>>;
}

impl<R: EventReader + ?Sized> EventReader for &mut R {
    fn peek(&mut self) -> Result<Option<&StaxEvent>> {
        (**self).peek()
    }

    fn next_event(&mut self) -> Result<Option<StaxEvent>> {
        (**self).next_event()
    }
}
