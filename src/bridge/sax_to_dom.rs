//! Push events to tree
//!
//! A [`ContentHandler`] that builds an arena document. Character data is
//! buffered and becomes one text node when the next structural event
//! arrives, so consecutive `characters` calls never produce adjacent text
//! nodes and an empty buffer never produces a node at all.
//!
//! The builder can also graft events under an existing node: with a
//! `next_sibling`, top-level nodes are inserted before it instead of being
//! appended.

use log::{debug, trace};

use crate::attributes::Attributes;
use crate::dom::{DocumentAccess, NodeId, NodeKind, XmlDocument, DOCUMENT_NODE};
use crate::error::{BridgeError, Result};
use crate::name::QName;
use crate::namespace::ns;
use crate::sax::{ContentHandler, DocumentInfo, LexicalHandler};

/// Event-to-tree builder
#[derive(Debug)]
pub struct SaxToDom {
    document: XmlDocument,
    /// Node new content is attached under when the stack is at its base
    root: NodeId,
    /// Top-level nodes go before this node when set
    next_sibling: Option<NodeId>,
    /// Open parents, innermost last
    stack: Vec<NodeId>,
    /// Pending character data
    text: String,
    /// Prefix mappings waiting for the next element
    namespace_decls: Vec<(String, String)>,
    /// Document metadata waiting for the first element
    document_info: Option<DocumentInfo>,
}

impl SaxToDom {
    /// Build into a fresh document
    pub fn new() -> Self {
        SaxToDom {
            document: XmlDocument::new(),
            root: DOCUMENT_NODE,
            next_sibling: None,
            stack: Vec::new(),
            text: String::new(),
            namespace_decls: Vec::new(),
            document_info: None,
        }
    }

    /// Build under `root` of an existing document, before `next_sibling` when
    /// given. `next_sibling` must be a child of `root`.
    pub fn with_root(document: XmlDocument, root: NodeId, next_sibling: Option<NodeId>) -> Result<Self> {
        match document.get_node(root) {
            Some(node) if node.is_container() => {}
            Some(node) => {
                return Err(BridgeError::Hierarchy(format!(
                    "{:?} node {} cannot hold content",
                    node.kind, root
                )))
            }
            None => return Err(BridgeError::Hierarchy(format!("unknown node {}", root))),
        }
        if let Some(sibling) = next_sibling {
            let parent = document.get_node(sibling).and_then(|n| n.parent);
            if parent != Some(root) {
                return Err(BridgeError::Hierarchy(format!(
                    "node {} is not a child of {}",
                    sibling, root
                )));
            }
        }

        Ok(SaxToDom {
            document,
            root,
            next_sibling,
            ..Self::new()
        })
    }

    /// The document built so far
    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    /// Give back the built document
    pub fn into_document(self) -> XmlDocument {
        self.document
    }

    /// The node content is attached under
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(self.root)
    }

    /// Attach a new node under the current parent
    fn attach(&mut self, node: NodeId) -> Result<()> {
        let parent = self.current();
        match self.next_sibling {
            Some(sibling) if parent == self.root => self.document.insert_before(parent, node, Some(sibling)),
            _ => self.document.append_child(parent, node),
        }
    }

    /// Turn pending character data into a text node
    fn flush_text(&mut self) -> Result<()> {
        if self.text.is_empty() {
            return Ok(());
        }
        let text = self.document.create_text(&self.text);
        self.text.clear();
        self.attach(text)
    }

    fn apply_document_info(&mut self) {
        let Some(info) = self.document_info.take() else {
            return;
        };
        if self.document.node_kind(self.root) != Some(NodeKind::Document) {
            return;
        }
        trace!("applying document info {:?}", info);
        if let Some(version) = info.version.as_deref() {
            self.document.set_xml_version(Some(version));
        }
        if let Some(encoding) = info.encoding.as_deref() {
            self.document.set_input_encoding(Some(encoding));
        }
        if let Some(standalone) = info.standalone {
            self.document.set_xml_standalone(standalone);
        }
    }
}

impl Default for SaxToDom {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHandler for SaxToDom {
    fn document_info(&mut self, info: &DocumentInfo) -> Result<()> {
        self.document_info = Some(info.clone());
        Ok(())
    }

    fn start_document(&mut self) -> Result<()> {
        debug!("building under node {}", self.root);
        self.stack.clear();
        self.stack.push(self.root);
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.flush_text()?;
        self.stack.pop();
        Ok(())
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()> {
        self.namespace_decls.push((prefix.to_string(), uri.to_string()));
        Ok(())
    }

    fn end_prefix_mapping(&mut self, _prefix: &str) -> Result<()> {
        Ok(())
    }

    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> Result<()> {
        self.flush_text()?;
        self.apply_document_info();

        let qualified = name.qualified();
        let element = match name.namespace_uri.as_deref() {
            Some(uri) => self.document.create_element_ns(Some(uri), &qualified),
            None => self.document.create_element(&qualified),
        };

        for (prefix, uri) in self.namespace_decls.drain(..) {
            let declaration = if prefix.is_empty() {
                ns::XMLNS_PREFIX.to_string()
            } else {
                format!("{}:{}", ns::XMLNS_PREFIX, prefix)
            };
            self.document
                .set_attribute_ns(element, Some(ns::XMLNS), &declaration, &uri)?;
        }

        for attribute in attributes {
            let attr_name = attribute.name.qualified();
            if attribute.name.local_name.is_empty() {
                self.document.set_attribute(element, &attr_name, &attribute.value)?;
            } else {
                self.document.set_attribute_ns(
                    element,
                    attribute.name.namespace_uri.as_deref(),
                    &attr_name,
                    &attribute.value,
                )?;
            }
            if attribute.attr_type() == "ID" {
                self.document.set_id_attribute(element, &attr_name, true)?;
            }
        }

        self.attach(element)?;
        self.stack.push(element);
        Ok(())
    }

    fn end_element(&mut self, _name: &QName) -> Result<()> {
        self.flush_text()?;
        self.stack.pop();
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        // The document node takes no text children
        if self.document.node_kind(self.current()) != Some(NodeKind::Document) {
            self.text.push_str(text);
        }
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        self.flush_text()?;
        let pi = self.document.create_processing_instruction(target, data);
        self.attach(pi)
    }

    fn as_lexical(&mut self) -> Option<&mut dyn LexicalHandler> {
        Some(self)
    }
}

impl LexicalHandler for SaxToDom {
    fn start_cdata(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_cdata(&mut self) -> Result<()> {
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        self.flush_text()?;
        let comment = self.document.create_comment(text);
        self.attach(comment)
    }
}
