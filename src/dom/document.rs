//! XML Document - Arena-based DOM representation
//!
//! Efficient DOM storage with:
//! - Arena allocation for nodes (node 0 is the document node)
//! - NodeId indices for traversal
//! - String interning for names and content
//!
//! Nodes are created detached and then linked with [`XmlDocument::append_child`]
//! or [`XmlDocument::insert_before`].

use super::node::{NodeId, NodeKind, XmlAttribute, XmlNode};
use super::strings::StringPool;
use super::DocumentAccess;
use crate::attributes::is_namespace_declaration;
use crate::bridge::{SaxToDom, StreamToSax};
use crate::config::ReaderConfig;
use crate::error::{BridgeError, Result};
use crate::name::local_part;
use crate::stax::TextCursor;

/// ID of the document node in every [`XmlDocument`]
pub const DOCUMENT_NODE: NodeId = 0;

/// An XML document stored in arena format
#[derive(Debug)]
pub struct XmlDocument {
    /// Arena of nodes
    nodes: Vec<XmlNode>,
    /// Interned strings
    pub strings: StringPool,
    xml_version: Option<String>,
    input_encoding: Option<String>,
    xml_standalone: bool,
}

impl XmlDocument {
    /// Create an empty document holding only the document node
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(256);
        nodes.push(XmlNode::document());
        XmlDocument {
            nodes,
            strings: StringPool::new(),
            xml_version: None,
            input_encoding: None,
            xml_standalone: false,
        }
    }

    /// Parse XML text into a new document
    pub fn parse(input: &str) -> Result<Self> {
        Self::parse_with_config(input, &ReaderConfig::default())
    }

    /// Parse XML text with explicit reader options
    pub fn parse_with_config(input: &str, config: &ReaderConfig) -> Result<Self> {
        let mut cursor = TextCursor::with_config(input, config.clone())?;
        let mut builder = SaxToDom::new();
        StreamToSax::new(&mut builder).bridge(&mut cursor)?;
        Ok(builder.into_document())
    }

    fn push_node(&mut self, node: XmlNode) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    fn intern_uri(&mut self, uri: Option<&str>) -> Option<u32> {
        uri.filter(|u| !u.is_empty()).map(|u| self.strings.intern(u))
    }

    // =========================================================================
    // Node creation
    // =========================================================================

    /// Create an element without namespace information
    pub fn create_element(&mut self, qualified_name: &str) -> NodeId {
        let name_id = self.strings.intern(qualified_name);
        self.push_node(XmlNode::element(name_id))
    }

    /// Create an element through the namespace-aware API.
    /// An empty URI is the same as no namespace.
    pub fn create_element_ns(&mut self, uri: Option<&str>, qualified_name: &str) -> NodeId {
        let mut node = XmlNode::element(self.strings.intern(qualified_name));
        node.local_id = Some(self.strings.intern(local_part(qualified_name)));
        node.namespace_id = self.intern_uri(uri);
        self.push_node(node)
    }

    /// Create a text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let value_id = self.strings.intern(text);
        self.push_node(XmlNode::character_data(NodeKind::Text, value_id))
    }

    /// Create a CDATA section
    pub fn create_cdata(&mut self, text: &str) -> NodeId {
        let value_id = self.strings.intern(text);
        self.push_node(XmlNode::character_data(NodeKind::CData, value_id))
    }

    /// Create a comment
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        let value_id = self.strings.intern(text);
        self.push_node(XmlNode::character_data(NodeKind::Comment, value_id))
    }

    /// Create a processing instruction
    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        let target_id = self.strings.intern(target);
        let data_id = self.strings.intern(data);
        self.push_node(XmlNode::processing_instruction(target_id, data_id))
    }

    /// Create an entity reference node
    pub fn create_entity_reference(&mut self, name: &str) -> NodeId {
        let name_id = self.strings.intern(name);
        self.push_node(XmlNode::named(NodeKind::EntityReference, name_id))
    }

    /// Create a document type node
    pub fn create_document_type(&mut self, name: &str) -> NodeId {
        let name_id = self.strings.intern(name);
        self.push_node(XmlNode::named(NodeKind::DocumentType, name_id))
    }

    /// Create an empty document fragment
    pub fn create_document_fragment(&mut self) -> NodeId {
        self.push_node(XmlNode::fragment())
    }

    /// Create a standalone attribute node
    pub fn create_attribute_ns(&mut self, uri: Option<&str>, qualified_name: &str, value: &str) -> NodeId {
        let mut node = XmlNode::named(NodeKind::Attribute, self.strings.intern(qualified_name));
        node.local_id = Some(self.strings.intern(local_part(qualified_name)));
        node.namespace_id = self.intern_uri(uri);
        node.value_id = self.strings.intern(value);
        self.push_node(node)
    }

    // =========================================================================
    // Linking
    // =========================================================================

    fn node(&self, id: NodeId) -> Result<&XmlNode> {
        self.nodes
            .get(id as usize)
            .ok_or_else(|| BridgeError::Hierarchy(format!("unknown node {}", id)))
    }

    /// Validate that `child` may become a child of `parent`
    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        if !parent_node.is_container() {
            return Err(BridgeError::Hierarchy(format!(
                "{:?} node {} cannot have children",
                parent_node.kind, parent
            )));
        }
        if matches!(child_node.kind, NodeKind::Document | NodeKind::Attribute) {
            return Err(BridgeError::Hierarchy(format!(
                "{:?} node {} cannot be a child",
                child_node.kind, child
            )));
        }
        if child_node.parent.is_some() {
            return Err(BridgeError::Hierarchy(format!("node {} is already attached", child)));
        }

        // Refuse cycles: child must not be an ancestor of parent
        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(BridgeError::Hierarchy(format!(
                    "node {} is an ancestor of {}",
                    child, parent
                )));
            }
            ancestor = self.nodes[id as usize].parent;
        }
        Ok(())
    }

    /// Link a child node as the last child of its parent
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Link `child` under `parent` immediately before `reference`, or at the
    /// end when `reference` is `None`. Fragments contribute their children.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> Result<()> {
        if let Some(reference) = reference {
            if self.node(reference)?.parent != Some(parent) {
                return Err(BridgeError::Hierarchy(format!(
                    "node {} is not a child of {}",
                    reference, parent
                )));
            }
        }

        if self.node(child)?.kind == NodeKind::DocumentFragment {
            self.check_insert(parent, child)?;
            let moved: Vec<NodeId> = self.children(child).collect();
            for id in moved {
                self.unlink(id);
                self.link(parent, id, reference);
            }
            return Ok(());
        }

        self.check_insert(parent, child)?;
        self.link(parent, child, reference);
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let prev = match reference {
            Some(reference) => self.nodes[reference as usize].prev_sibling,
            None => self.nodes[parent as usize].last_child,
        };

        {
            let node = &mut self.nodes[child as usize];
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }

        match prev {
            Some(prev_id) => self.nodes[prev_id as usize].next_sibling = Some(child),
            None => self.nodes[parent as usize].first_child = Some(child),
        }
        match reference {
            Some(reference) => self.nodes[reference as usize].prev_sibling = Some(child),
            None => self.nodes[parent as usize].last_child = Some(child),
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[child as usize];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        let Some(parent) = parent else {
            return;
        };

        match prev {
            Some(prev_id) => self.nodes[prev_id as usize].next_sibling = next,
            None => self.nodes[parent as usize].first_child = next,
        }
        match next {
            Some(next_id) => self.nodes[next_id as usize].prev_sibling = prev,
            None => self.nodes[parent as usize].last_child = prev,
        }

        let node = &mut self.nodes[child as usize];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    fn element_mut(&mut self, id: NodeId) -> Result<&mut XmlNode> {
        match self.nodes.get_mut(id as usize) {
            Some(node) if node.is_element() => Ok(node),
            Some(node) => Err(BridgeError::Hierarchy(format!(
                "{:?} node {} cannot carry attributes",
                node.kind, id
            ))),
            None => Err(BridgeError::Hierarchy(format!("unknown node {}", id))),
        }
    }

    /// Set an attribute by lexical name, without namespace information
    pub fn set_attribute(&mut self, element: NodeId, qualified_name: &str, value: &str) -> Result<()> {
        let name_id = self.strings.intern(qualified_name);
        let value_id = self.strings.intern(value);
        let node = self.element_mut(element)?;

        match node.attributes.iter_mut().find(|a| a.name_id == name_id) {
            Some(existing) => existing.value_id = value_id,
            None => node.attributes.push(XmlAttribute::new(name_id, value_id)),
        }
        Ok(())
    }

    /// Set an attribute through the namespace-aware API
    pub fn set_attribute_ns(
        &mut self,
        element: NodeId,
        uri: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> Result<()> {
        let name_id = self.strings.intern(qualified_name);
        let local_id = self.strings.intern(local_part(qualified_name));
        let namespace_id = self.intern_uri(uri);
        let value_id = self.strings.intern(value);

        let strings = &self.strings;
        let node = match self.nodes.get_mut(element as usize) {
            Some(node) if node.is_element() => node,
            _ => return Err(BridgeError::Hierarchy(format!("node {} is not an element", element))),
        };

        let existing = node.attributes.iter_mut().find(|a| {
            let local = match a.local_id {
                Some(id) => strings.get(id),
                None => local_part(strings.get(a.name_id)),
            };
            a.namespace_id == namespace_id && local == strings.get(local_id)
        });
        match existing {
            Some(attr) => {
                attr.name_id = name_id;
                attr.value_id = value_id;
            }
            None => node.attributes.push(XmlAttribute {
                name_id,
                local_id: Some(local_id),
                namespace_id,
                value_id,
                is_id: false,
            }),
        }
        Ok(())
    }

    /// Mark (or unmark) an existing attribute as an ID
    pub fn set_id_attribute(&mut self, element: NodeId, qualified_name: &str, is_id: bool) -> Result<()> {
        let name_id = self.strings.intern(qualified_name);
        let node = self.element_mut(element)?;
        match node.attributes.iter_mut().find(|a| a.name_id == name_id) {
            Some(attr) => {
                attr.is_id = is_id;
                Ok(())
            }
            None => Err(BridgeError::Hierarchy(format!(
                "element {} has no attribute {}",
                element, qualified_name
            ))),
        }
    }

    /// Attribute value by lexical name
    pub fn get_attribute(&self, element: NodeId, qualified_name: &str) -> Option<&str> {
        self.attributes(element)
            .iter()
            .find(|a| self.strings.get(a.name_id) == qualified_name)
            .map(|a| self.strings.get(a.value_id))
    }

    /// Attribute value by expanded name
    pub fn get_attribute_ns(&self, element: NodeId, uri: Option<&str>, local_name: &str) -> Option<&str> {
        let uri = uri.filter(|u| !u.is_empty());
        self.attributes(element)
            .iter()
            .find(|a| {
                a.namespace_id.map(|n| self.strings.get(n)) == uri
                    && self.attribute_local_name(a) == local_name
            })
            .map(|a| self.strings.get(a.value_id))
    }

    /// Local name of a stored attribute (derived when not recorded)
    pub fn attribute_local_name(&self, attr: &XmlAttribute) -> &str {
        match attr.local_id {
            Some(id) => self.strings.get(id),
            None => local_part(self.strings.get(attr.name_id)),
        }
    }

    // =========================================================================
    // Document metadata
    // =========================================================================

    pub fn set_xml_version(&mut self, version: Option<&str>) {
        self.xml_version = version.map(str::to_string);
    }

    pub fn set_input_encoding(&mut self, encoding: Option<&str>) {
        self.input_encoding = encoding.map(str::to_string);
    }

    pub fn set_xml_standalone(&mut self, standalone: bool) {
        self.xml_standalone = standalone;
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Get the root element (first element child of document)
    pub fn root_element_id(&self) -> Option<NodeId> {
        self.children(DOCUMENT_NODE)
            .find(|&id| self.nodes[id as usize].is_element())
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.get_node(id).and_then(|n| n.first_child);
        ChildIter { doc: self, next: first }
    }

    /// Concatenated text of all descendant text and CDATA nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for child in self.children(id) {
            let node = &self.nodes[child as usize];
            match node.kind {
                NodeKind::Text | NodeKind::CData => out.push_str(self.strings.get(node.value_id)),
                NodeKind::Element | NodeKind::DocumentFragment => self.collect_text(child, out),
                _ => {}
            }
        }
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // Structural comparison
    // =========================================================================

    /// Compare two subtrees by content.
    ///
    /// Elements and attributes compare by expanded name, so differing prefixes
    /// and namespace declaration attributes do not matter. Adjacent text and
    /// CDATA nodes are merged and empty ones dropped before comparing; doctype
    /// and entity reference nodes are skipped.
    pub fn structurally_equal(&self, node: NodeId, other: &XmlDocument, other_node: NodeId) -> bool {
        let (Some(a), Some(b)) = (self.get_node(node), other.get_node(other_node)) else {
            return false;
        };
        if a.kind != b.kind {
            return false;
        }

        match a.kind {
            NodeKind::Element => {
                if self.namespace_uri(node) != other.namespace_uri(other_node)
                    || self.effective_local_name(node) != other.effective_local_name(other_node)
                    || self.comparable_attributes(node) != other.comparable_attributes(other_node)
                {
                    return false;
                }
            }
            NodeKind::Comment | NodeKind::Text | NodeKind::CData => {
                return self.node_value(node) == other.node_value(other_node);
            }
            NodeKind::ProcessingInstruction => {
                return self.node_name(node) == other.node_name(other_node)
                    && self.node_value(node) == other.node_value(other_node);
            }
            _ => {}
        }

        let left = self.comparable_children(node);
        let right = other.comparable_children(other_node);
        left.len() == right.len()
            && left.iter().zip(right.iter()).all(|pair| match pair {
                (Comparable::Text(x), Comparable::Text(y)) => x == y,
                (Comparable::Node(x), Comparable::Node(y)) => self.structurally_equal(*x, other, *y),
                _ => false,
            })
    }

    fn comparable_attributes(&self, element: NodeId) -> Vec<(Option<&str>, &str, &str)> {
        let mut attrs: Vec<_> = self
            .attributes(element)
            .iter()
            .filter(|a| !is_namespace_declaration(self.strings.get(a.name_id)))
            .map(|a| {
                (
                    a.namespace_id.map(|n| self.strings.get(n)),
                    self.attribute_local_name(a),
                    self.strings.get(a.value_id),
                )
            })
            .collect();
        attrs.sort();
        attrs
    }

    fn comparable_children(&self, id: NodeId) -> Vec<Comparable> {
        let mut items: Vec<Comparable> = Vec::new();
        for child in self.children(id) {
            let node = &self.nodes[child as usize];
            match node.kind {
                NodeKind::Text | NodeKind::CData => {
                    let text = self.strings.get(node.value_id);
                    if text.is_empty() {
                        continue;
                    }
                    match items.last_mut() {
                        Some(Comparable::Text(run)) => run.push_str(text),
                        _ => items.push(Comparable::Text(text.to_string())),
                    }
                }
                NodeKind::DocumentType | NodeKind::EntityReference => {}
                _ => items.push(Comparable::Node(child)),
            }
        }
        items
    }
}

enum Comparable {
    Text(String),
    Node(NodeId),
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over child nodes
pub struct ChildIter<'d> {
    doc: &'d XmlDocument,
    next: Option<NodeId>,
}

impl<'d> Iterator for ChildIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.get_node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

// =============================================================================
// DocumentAccess trait implementation
// =============================================================================

impl DocumentAccess for XmlDocument {
    fn document_node_id(&self) -> NodeId {
        DOCUMENT_NODE
    }

    fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    fn strings(&self) -> &StringPool {
        &self.strings
    }

    fn children_vec(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).collect()
    }

    fn xml_version(&self) -> Option<&str> {
        self.xml_version.as_deref()
    }

    fn input_encoding(&self) -> Option<&str> {
        self.input_encoding.as_deref()
    }

    fn xml_standalone(&self) -> bool {
        self.xml_standalone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_navigate() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("root");
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(DOCUMENT_NODE, root).unwrap();
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();

        assert_eq!(doc.root_element_id(), Some(root));
        let children: Vec<_> = doc.children(root).collect();
        assert_eq!(children, vec![a, b]);

        // Check sibling links
        let first = doc.get_node(a).unwrap();
        assert!(first.prev_sibling.is_none());
        assert_eq!(first.next_sibling, Some(b));
    }

    #[test]
    fn test_insert_before() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("root");
        doc.append_child(DOCUMENT_NODE, root).unwrap();
        let last = doc.create_element("last");
        doc.append_child(root, last).unwrap();

        let first = doc.create_element("first");
        let middle = doc.create_text("mid");
        doc.insert_before(root, first, Some(last)).unwrap();
        doc.insert_before(root, middle, Some(last)).unwrap();

        let children: Vec<_> = doc.children(root).collect();
        assert_eq!(children, vec![first, middle, last]);
        assert_eq!(doc.get_node(last).unwrap().prev_sibling, Some(middle));
    }

    #[test]
    fn test_insert_before_foreign_reference() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("root");
        let stray = doc.create_element("stray");
        let child = doc.create_element("child");
        let err = doc.insert_before(root, child, Some(stray)).unwrap_err();
        assert!(matches!(err, BridgeError::Hierarchy(_)));
    }

    #[test]
    fn test_refuses_double_attach_and_cycles() {
        let mut doc = XmlDocument::new();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.append_child(a, b).unwrap();
        assert!(doc.append_child(DOCUMENT_NODE, b).is_err());
        assert!(doc.append_child(b, a).is_err());

        let text = doc.create_text("t");
        assert!(doc.append_child(text, a).is_err());
    }

    #[test]
    fn test_fragment_children_move() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("root");
        let fragment = doc.create_document_fragment();
        let x = doc.create_element("x");
        let y = doc.create_element("y");
        doc.append_child(fragment, x).unwrap();
        doc.append_child(fragment, y).unwrap();

        doc.append_child(root, fragment).unwrap();
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![x, y]);
        assert_eq!(doc.children(fragment).count(), 0);
    }

    #[test]
    fn test_attributes() {
        let mut doc = XmlDocument::new();
        let e = doc.create_element_ns(Some("urn:x"), "p:e");
        doc.set_attribute(e, "id", "1").unwrap();
        doc.set_attribute(e, "id", "2").unwrap();
        doc.set_attribute_ns(e, Some("urn:y"), "q:attr", "v").unwrap();
        doc.set_attribute_ns(e, Some("urn:y"), "r:attr", "w").unwrap();
        doc.set_id_attribute(e, "id", true).unwrap();

        assert_eq!(doc.attributes(e).len(), 2);
        assert_eq!(doc.get_attribute(e, "id"), Some("2"));
        assert_eq!(doc.get_attribute_ns(e, Some("urn:y"), "attr"), Some("w"));
        assert!(doc.attributes(e)[0].is_id);
        assert!(doc.set_id_attribute(e, "missing", true).is_err());
    }

    #[test]
    fn test_namespace_aware_names() {
        let mut doc = XmlDocument::new();
        let plain = doc.create_element("a:b");
        let aware = doc.create_element_ns(None, "c");

        assert_eq!(doc.node_local_name(plain), None);
        assert_eq!(doc.effective_local_name(plain), Some("b"));
        assert_eq!(doc.node_local_name(aware), Some("c"));
        assert_eq!(doc.namespace_uri(aware), None);
    }

    #[test]
    fn test_text_content() {
        let mut doc = XmlDocument::new();
        let root = doc.create_element("r");
        let t1 = doc.create_text("a");
        let inner = doc.create_element("i");
        let t2 = doc.create_cdata("b");
        let c = doc.create_comment("skip");
        doc.append_child(root, t1).unwrap();
        doc.append_child(root, inner).unwrap();
        doc.append_child(inner, t2).unwrap();
        doc.append_child(root, c).unwrap();
        assert_eq!(doc.text_content(root), "ab");
    }

    #[test]
    fn test_structural_equality_merges_text() {
        let mut left = XmlDocument::new();
        let l_root = left.create_element_ns(Some("urn:x"), "p:r");
        left.append_child(DOCUMENT_NODE, l_root).unwrap();
        left.set_attribute(l_root, "xmlns:p", "urn:x").unwrap();
        for part in ["ab", "", "c"] {
            let t = left.create_text(part);
            left.append_child(l_root, t).unwrap();
        }

        let mut right = XmlDocument::new();
        let r_root = right.create_element_ns(Some("urn:x"), "q:r");
        right.append_child(DOCUMENT_NODE, r_root).unwrap();
        let t = right.create_text("abc");
        right.append_child(r_root, t).unwrap();

        assert!(left.structurally_equal(DOCUMENT_NODE, &right, DOCUMENT_NODE));

        let extra = right.create_element("extra");
        right.append_child(r_root, extra).unwrap();
        assert!(!left.structurally_equal(DOCUMENT_NODE, &right, DOCUMENT_NODE));
    }

    #[test]
    fn test_parse_simple() {
        let doc = XmlDocument::parse("<root>hello</root>").unwrap();
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.node_name(root), Some("root"));
        assert_eq!(doc.text_content(root), "hello");
    }
}
