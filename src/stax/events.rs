//! Owned pull events
//!
//! [`StaxEvent`] is what an [`EventReader`](super::EventReader) hands out. It
//! is also the storage format of the replay cursors, so the accessor helpers
//! below mirror the [`StreamCursor`](super::StreamCursor) accessors.

use super::{CursorEvent, StreamCursor};
use crate::attributes::Attribute;
use crate::name::QName;

/// Namespace declaration on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Declared prefix, `""` for the default namespace
    pub prefix: String,
    pub uri: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Namespace {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// True for a default namespace declaration
    pub fn is_default(&self) -> bool {
        self.prefix.is_empty()
    }
}

/// An owned pull event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaxEvent {
    StartDocument {
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<bool>,
    },
    EndDocument,
    StartElement {
        name: QName,
        attributes: Vec<Attribute>,
        /// Declarations made on this element
        namespaces: Vec<Namespace>,
    },
    EndElement {
        name: QName,
        /// Declarations going out of scope; may be empty when unknown
        namespaces: Vec<Namespace>,
    },
    Characters(String),
    Space(String),
    CData(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
    /// Document type declaration text
    Dtd(String),
    /// Unexpanded entity reference (name only)
    EntityReference(String),
    Attribute(Attribute),
    Namespace(Namespace),
    EntityDeclaration(String),
    NotationDeclaration(String),
}

impl StaxEvent {
    /// A start-document event without declaration values
    pub fn start_document() -> Self {
        StaxEvent::StartDocument {
            version: None,
            encoding: None,
            standalone: None,
        }
    }

    /// A start-element event without attributes or declarations
    pub fn start_element(name: QName) -> Self {
        StaxEvent::StartElement {
            name,
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    pub fn end_element(name: QName) -> Self {
        StaxEvent::EndElement {
            name,
            namespaces: Vec::new(),
        }
    }

    /// The cursor kind of this event
    pub fn kind(&self) -> CursorEvent {
        match self {
            StaxEvent::StartDocument { .. } => CursorEvent::StartDocument,
            StaxEvent::EndDocument => CursorEvent::EndDocument,
            StaxEvent::StartElement { .. } => CursorEvent::StartElement,
            StaxEvent::EndElement { .. } => CursorEvent::EndElement,
            StaxEvent::Characters(_) => CursorEvent::Characters,
            StaxEvent::Space(_) => CursorEvent::Space,
            StaxEvent::CData(_) => CursorEvent::CData,
            StaxEvent::Comment(_) => CursorEvent::Comment,
            StaxEvent::ProcessingInstruction { .. } => CursorEvent::ProcessingInstruction,
            StaxEvent::Dtd(_) => CursorEvent::Dtd,
            StaxEvent::EntityReference(_) => CursorEvent::EntityReference,
            StaxEvent::Attribute(_) => CursorEvent::Attribute,
            StaxEvent::Namespace(_) => CursorEvent::Namespace,
            StaxEvent::EntityDeclaration(_) => CursorEvent::EntityDeclaration,
            StaxEvent::NotationDeclaration(_) => CursorEvent::NotationDeclaration,
        }
    }

    pub fn is_start_document(&self) -> bool {
        matches!(self, StaxEvent::StartDocument { .. })
    }

    pub fn is_start_element(&self) -> bool {
        matches!(self, StaxEvent::StartElement { .. })
    }

    /// Character content, comment text, DTD text or entity reference name
    pub fn text(&self) -> &str {
        match self {
            StaxEvent::Characters(text)
            | StaxEvent::Space(text)
            | StaxEvent::CData(text)
            | StaxEvent::Comment(text)
            | StaxEvent::Dtd(text)
            | StaxEvent::EntityReference(text) => text,
            _ => "",
        }
    }

    pub fn pi_target(&self) -> &str {
        match self {
            StaxEvent::ProcessingInstruction { target, .. } => target,
            _ => "",
        }
    }

    pub fn pi_data(&self) -> &str {
        match self {
            StaxEvent::ProcessingInstruction { data, .. } => data,
            _ => "",
        }
    }

    /// Element name of start and end events
    pub fn name(&self) -> Option<&QName> {
        match self {
            StaxEvent::StartElement { name, .. } | StaxEvent::EndElement { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        match self {
            StaxEvent::StartElement { attributes, .. } => attributes,
            _ => &[],
        }
    }

    pub fn namespaces(&self) -> &[Namespace] {
        match self {
            StaxEvent::StartElement { namespaces, .. } | StaxEvent::EndElement { namespaces, .. } => {
                namespaces
            }
            _ => &[],
        }
    }

    /// Capture the event a stream cursor is positioned on
    pub fn from_cursor<C: StreamCursor + ?Sized>(cursor: &C) -> Self {
        let text = || cursor.text().to_string();
        let namespaces = || {
            (0..cursor.namespace_count())
                .filter_map(|i| cursor.namespace(i).cloned())
                .collect::<Vec<_>>()
        };
        let name = || cursor.name().cloned().unwrap_or_default();

        match cursor.event_type() {
            CursorEvent::StartDocument => StaxEvent::StartDocument {
                version: cursor.version().map(str::to_string),
                encoding: cursor.encoding().map(str::to_string),
                standalone: cursor.standalone(),
            },
            CursorEvent::EndDocument => StaxEvent::EndDocument,
            CursorEvent::StartElement => StaxEvent::StartElement {
                name: name(),
                attributes: (0..cursor.attribute_count())
                    .filter_map(|i| cursor.attribute(i).cloned())
                    .collect(),
                namespaces: namespaces(),
            },
            CursorEvent::EndElement => StaxEvent::EndElement {
                name: name(),
                namespaces: namespaces(),
            },
            CursorEvent::Characters => StaxEvent::Characters(text()),
            CursorEvent::Space => StaxEvent::Space(text()),
            CursorEvent::CData => StaxEvent::CData(text()),
            CursorEvent::Comment => StaxEvent::Comment(text()),
            CursorEvent::ProcessingInstruction => StaxEvent::ProcessingInstruction {
                target: cursor.pi_target().to_string(),
                data: cursor.pi_data().to_string(),
            },
            CursorEvent::Dtd => StaxEvent::Dtd(text()),
            CursorEvent::EntityReference => StaxEvent::EntityReference(text()),
            CursorEvent::Attribute => match cursor.attribute(0) {
                Some(attribute) => StaxEvent::Attribute(attribute.clone()),
                None => StaxEvent::Attribute(Attribute::new(QName::default(), "")),
            },
            CursorEvent::Namespace => match cursor.namespace(0) {
                Some(namespace) => StaxEvent::Namespace(namespace.clone()),
                None => StaxEvent::Namespace(Namespace::new("", "")),
            },
            CursorEvent::EntityDeclaration => StaxEvent::EntityDeclaration(text()),
            CursorEvent::NotationDeclaration => StaxEvent::NotationDeclaration(text()),
        }
    }
}
