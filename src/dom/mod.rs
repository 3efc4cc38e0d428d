//! DOM Module - Arena-based XML Document
//!
//! Implements an efficient DOM representation using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - String interning for names and character content
//!
//! The tree walker only needs read access, expressed by [`DocumentAccess`];
//! the event-to-tree builder uses the mutation API of [`XmlDocument`].

pub mod document;
pub mod node;
pub mod strings;

pub use document::{ChildIter, XmlDocument, DOCUMENT_NODE};
pub use node::{NodeId, NodeKind, XmlAttribute, XmlNode};
pub use strings::StringPool;

use crate::name::local_part;

/// Read-only access to a source tree
pub trait DocumentAccess {
    /// ID of the document node
    fn document_node_id(&self) -> NodeId;

    /// Get a node by ID
    fn get_node(&self, id: NodeId) -> Option<&XmlNode>;

    /// Get the string pool for direct access
    fn strings(&self) -> &StringPool;

    /// Children in document order - returns collected Vec for trait object compatibility
    fn children_vec(&self, id: NodeId) -> Vec<NodeId>;

    /// Declared XML version
    fn xml_version(&self) -> Option<&str>;

    /// Encoding the document was read with
    fn input_encoding(&self) -> Option<&str>;

    /// Standalone flag from the XML declaration
    fn xml_standalone(&self) -> bool;

    /// Kind of a node
    fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get_node(id).map(|n| n.kind)
    }

    /// Qualified name (element, attribute), PI target, entity or doctype name
    fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        Some(self.strings().get(node.name_id))
    }

    /// Local name as recorded by the namespace-aware constructors.
    /// `None` for nodes created without namespace information.
    fn node_local_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        node.local_id.map(|l| self.strings().get(l))
    }

    /// Local name, derived from the qualified name when not recorded
    fn effective_local_name(&self, id: NodeId) -> Option<&str> {
        self.node_local_name(id)
            .or_else(|| self.node_name(id).map(local_part))
    }

    /// Namespace URI
    fn namespace_uri(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        node.namespace_id.map(|n| self.strings().get(n))
    }

    /// Text content, comment text, PI data or attribute value
    fn node_value(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Text
            | NodeKind::CData
            | NodeKind::Comment
            | NodeKind::ProcessingInstruction
            | NodeKind::Attribute => Some(self.strings().get(node.value_id)),
            _ => None,
        }
    }

    /// Attributes of an element, empty for other nodes
    fn attributes(&self, id: NodeId) -> &[XmlAttribute] {
        self.get_node(id)
            .map(|n| n.attributes.as_slice())
            .unwrap_or(&[])
    }
}
