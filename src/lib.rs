//! xmlbridge - Lossless bridging between XML event models
//!
//! Three forms of one document:
//! - Tree: arena document ([`dom::XmlDocument`], read through [`dom::DocumentAccess`])
//! - Push: [`sax::ContentHandler`] with optional [`sax::LexicalHandler`]
//! - Pull: [`stax::StreamCursor`] and [`stax::EventReader`]
//!
//! Adapters ([`bridge`]):
//! - DomToSax: tree -> push
//! - StreamToSax / EventToSax: pull -> push
//! - SaxToDom: push -> tree
//!
//! Namespace bindings are reconciled by [`namespace::NamespaceScopes`] so that
//! a prefix already bound to the same URI is never announced twice.
//!
//! ```
//! use xmlbridge::{transform, Source, WriterConfig};
//!
//! let out = transform::to_string(
//!     Source::text("<a xmlns=\"urn:a\"><b/></a>"),
//!     &WriterConfig::new().omit_xml_declaration(true),
//! )
//! .unwrap();
//! assert_eq!(out, "<a xmlns=\"urn:a\"><b/></a>");
//! ```

pub mod attributes;
pub mod bridge;
pub mod config;
pub mod core;
pub mod dom;
pub mod error;
pub mod name;
pub mod namespace;
pub mod sax;
pub mod serialize;
pub mod stax;
pub mod transform;

pub use attributes::{Attribute, Attributes};
pub use bridge::{DomToSax, EventToSax, SaxToDom, StreamToSax};
pub use config::{ReaderConfig, WriterConfig};
pub use dom::{DocumentAccess, NodeId, NodeKind, XmlDocument, DOCUMENT_NODE};
pub use error::{BridgeError, Phase, Result};
pub use name::QName;
pub use namespace::NamespaceScopes;
pub use sax::{ContentHandler, DocumentInfo, EventRecorder, LexicalHandler, SaxEvent};
pub use serialize::XmlWriter;
pub use stax::{CursorEvent, EventReader, StaxEvent, StreamCursor, TextCursor};
pub use transform::{IdentityTransform, Source, TransformEngine};
