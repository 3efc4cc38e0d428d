//! XML Node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Detached container for a list of nodes
    DocumentFragment,
    /// `<!DOCTYPE name>`
    DocumentType,
    /// Element node
    Element,
    /// Attribute created as a standalone node
    Attribute,
    /// Text content
    Text,
    /// CDATA section
    CData,
    /// Comment
    Comment,
    /// Processing instruction
    ProcessingInstruction,
    /// Unexpanded entity reference
    EntityReference,
}

/// An XML node in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    /// Type of this node
    pub kind: NodeKind,
    /// Parent node (None for document root and detached nodes)
    pub parent: Option<NodeId>,
    /// First child node
    pub first_child: Option<NodeId>,
    /// Last child node
    pub last_child: Option<NodeId>,
    /// Previous sibling
    pub prev_sibling: Option<NodeId>,
    /// Next sibling
    pub next_sibling: Option<NodeId>,
    /// Qualified name (elements, attributes), PI target, entity or doctype name
    pub name_id: u32,
    /// Local name, only for nodes created through the namespace-aware API
    pub local_id: Option<u32>,
    /// Namespace URI
    pub namespace_id: Option<u32>,
    /// Text content, comment text, PI data or attribute value
    pub value_id: u32,
    /// Attributes, in document order (elements only)
    pub attributes: Vec<XmlAttribute>,
}

impl XmlNode {
    fn with_kind(kind: NodeKind) -> Self {
        XmlNode {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name_id: 0,
            local_id: None,
            namespace_id: None,
            value_id: 0,
            attributes: Vec::new(),
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        Self::with_kind(NodeKind::Document)
    }

    /// Create a new element node
    pub fn element(name_id: u32) -> Self {
        let mut node = Self::with_kind(NodeKind::Element);
        node.name_id = name_id;
        node
    }

    /// Create a node holding only character content (text, CDATA, comment)
    pub fn character_data(kind: NodeKind, value_id: u32) -> Self {
        let mut node = Self::with_kind(kind);
        node.value_id = value_id;
        node
    }

    /// Create a processing instruction node
    pub fn processing_instruction(target_id: u32, data_id: u32) -> Self {
        let mut node = Self::with_kind(NodeKind::ProcessingInstruction);
        node.name_id = target_id;
        node.value_id = data_id;
        node
    }

    /// Create a named leaf (entity reference, doctype, attribute)
    pub fn named(kind: NodeKind, name_id: u32) -> Self {
        let mut node = Self::with_kind(kind);
        node.name_id = name_id;
        node
    }

    /// Create an empty document fragment
    pub fn fragment() -> Self {
        Self::with_kind(NodeKind::DocumentFragment)
    }

    /// Check if this is an element node
    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Check if this is a text node
    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    /// Check if this node has children
    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }

    /// Check if this node has attributes
    #[inline]
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Nodes of these kinds may hold children
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Document | NodeKind::DocumentFragment | NodeKind::Element
        )
    }
}

/// Stored attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Qualified name
    pub name_id: u32,
    /// Local name (namespace-aware attributes only)
    pub local_id: Option<u32>,
    /// Namespace URI
    pub namespace_id: Option<u32>,
    /// Attribute value
    pub value_id: u32,
    /// Declared as ID
    pub is_id: bool,
}

impl XmlAttribute {
    pub fn new(name_id: u32, value_id: u32) -> Self {
        XmlAttribute {
            name_id,
            local_id: None,
            namespace_id: None,
            value_id,
            is_id: false,
        }
    }
}
