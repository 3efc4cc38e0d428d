//! Tree to push events
//!
//! Walks an arena document depth-first and replays it into a
//! [`ContentHandler`]. Namespace bindings come from three places and all go
//! through one [`NamespaceScopes`] so a binding already in scope is never
//! announced twice:
//!
//! 1. `xmlns` / `xmlns:p` attributes on the element
//! 2. prefixes used by namespaced attributes (unprefixed ones get a fresh
//!    `ns<N>` prefix that is neither in scope nor spelled on the element)
//! 3. the element's own prefix and namespace
//!
//! Prefixes pushed for an element are ended in reverse order after its end tag.

use log::{debug, trace};

use crate::attributes::{is_namespace_declaration, Attribute, Attributes};
use crate::dom::{DocumentAccess, NodeId, NodeKind};
use crate::error::{BridgeError, Result};
use crate::name::{local_part, prefix_part, split_name, QName};
use crate::namespace::NamespaceScopes;
use crate::sax::{emit_cdata, emit_comment, ContentHandler, DocumentInfo};

/// Depth-first tree walker feeding a content handler
pub struct DomToSax<'h, H: ContentHandler + ?Sized> {
    handler: &'h mut H,
    scopes: NamespaceScopes,
    /// Next synthetic prefix number
    prefix_counter: usize,
}

impl<'h, H: ContentHandler + ?Sized> DomToSax<'h, H> {
    pub fn new(handler: &'h mut H) -> Self {
        DomToSax {
            handler,
            scopes: NamespaceScopes::new(),
            prefix_counter: 0,
        }
    }

    /// Replay the subtree rooted at `node`.
    ///
    /// A document node produces its own StartDocument/EndDocument; any other
    /// root is wrapped in a synthetic pair so the handler always sees a
    /// complete document.
    pub fn parse<D: DocumentAccess + ?Sized>(&mut self, doc: &D, node: NodeId) -> Result<()> {
        let kind = doc
            .node_kind(node)
            .ok_or_else(|| BridgeError::Hierarchy(format!("unknown node {}", node)))?;
        debug!("walking {:?} node {}", kind, node);

        if kind == NodeKind::Document {
            return self.walk(doc, node);
        }
        self.handler.start_document()?;
        self.walk(doc, node)?;
        self.handler.end_document()
    }

    /// Replay the whole document
    pub fn parse_document<D: DocumentAccess + ?Sized>(&mut self, doc: &D) -> Result<()> {
        self.parse(doc, doc.document_node_id())
    }

    /// Next `ns<N>` that is unbound and not in `reserved`
    fn next_prefix(&mut self, reserved: &[&str]) -> String {
        loop {
            let prefix = format!("ns{}", self.prefix_counter);
            self.prefix_counter += 1;
            if self.scopes.lookup(&prefix).is_none() && !reserved.contains(&prefix.as_str()) {
                trace!("generated prefix {}", prefix);
                return prefix;
            }
        }
    }

    fn walk<D: DocumentAccess + ?Sized>(&mut self, doc: &D, node: NodeId) -> Result<()> {
        let Some(kind) = doc.node_kind(node) else {
            return Ok(());
        };

        match kind {
            NodeKind::Attribute
            | NodeKind::DocumentFragment
            | NodeKind::DocumentType
            | NodeKind::EntityReference => Ok(()),

            NodeKind::CData => emit_cdata(&mut *self.handler, doc.node_value(node).unwrap_or("")),

            NodeKind::Comment => emit_comment(&mut *self.handler, doc.node_value(node).unwrap_or("")),

            NodeKind::Document => {
                let info = DocumentInfo {
                    version: doc.xml_version().map(str::to_string),
                    encoding: doc.input_encoding().map(str::to_string),
                    standalone: doc.xml_standalone().then_some(true),
                };
                self.handler.document_info(&info)?;
                self.handler.start_document()?;
                for child in doc.children_vec(node) {
                    self.walk(doc, child)?;
                }
                self.handler.end_document()
            }

            NodeKind::Element => self.walk_element(doc, node),

            NodeKind::ProcessingInstruction => self.handler.processing_instruction(
                doc.node_name(node).unwrap_or(""),
                doc.node_value(node).unwrap_or(""),
            ),

            NodeKind::Text => self.handler.characters(doc.node_value(node).unwrap_or("")),
        }
    }

    fn walk_element<D: DocumentAccess + ?Sized>(&mut self, doc: &D, node: NodeId) -> Result<()> {
        let strings = doc.strings();
        let stored = doc.attributes(node);
        let qname = doc.node_name(node).unwrap_or("");
        let mut pushed: Vec<String> = Vec::new();

        // Prefixes written on this element, off limits for generated ones
        let mut reserved: Vec<&str> = vec![prefix_part(qname)];
        for attr in stored {
            let name = strings.get(attr.name_id);
            match name.strip_prefix("xmlns:") {
                Some(declared) => reserved.push(declared),
                None => reserved.extend(split_name(name).0),
            }
        }

        // Namespace declarations first
        for attr in stored {
            let attr_name = strings.get(attr.name_id);
            if !is_namespace_declaration(attr_name) {
                continue;
            }
            let prefix = attr_name.strip_prefix("xmlns:").unwrap_or("");
            if self.scopes.enter_prefix(prefix, strings.get(attr.value_id), &mut *self.handler)? {
                pushed.push(prefix.to_string());
            }
        }

        // Regular attributes, with bindings for the namespaces they use
        let mut attributes = Attributes::with_capacity(stored.len());
        for attr in stored {
            let attr_name = strings.get(attr.name_id);
            if is_namespace_declaration(attr_name) {
                continue;
            }
            let local = match attr.local_id {
                Some(id) => strings.get(id),
                None => local_part(attr_name),
            };
            let uri = attr.namespace_id.map(|id| strings.get(id)).filter(|u| !u.is_empty());

            let name = match uri {
                Some(uri) => {
                    let prefix = match split_name(attr_name).0 {
                        Some(prefix) => prefix.to_string(),
                        None => self.next_prefix(&reserved),
                    };
                    if self.scopes.enter_prefix(&prefix, uri, &mut *self.handler)? {
                        pushed.push(prefix.clone());
                    }
                    QName {
                        namespace_uri: Some(uri.to_string()),
                        local_name: local.to_string(),
                        prefix: Some(prefix),
                    }
                }
                None => QName::new(None, attr_name),
            };
            attributes.push(Attribute::new(name, strings.get(attr.value_id)).with_id(attr.is_id));
        }

        // The element's own binding
        let uri = doc.namespace_uri(node);
        match uri {
            Some(uri) => {
                let prefix = prefix_part(qname);
                if self.scopes.enter_prefix(prefix, uri, &mut *self.handler)? {
                    pushed.push(prefix.to_string());
                }
            }
            None if doc.node_local_name(node).is_some() => {
                // Created through the namespace-aware API without a namespace:
                // bind the default prefix to no namespace
                if self.scopes.enter_prefix("", "", &mut *self.handler)? {
                    pushed.push(String::new());
                }
            }
            None => {}
        }

        let name = QName {
            namespace_uri: uri.map(str::to_string),
            local_name: doc.effective_local_name(node).unwrap_or("").to_string(),
            prefix: split_name(qname).0.map(str::to_string),
        };
        self.handler.start_element(&name, &attributes)?;

        for child in doc.children_vec(node) {
            self.walk(doc, child)?;
        }

        self.handler.end_element(&name)?;

        for prefix in pushed.iter().rev() {
            self.scopes.exit_prefix(prefix, &mut *self.handler)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{XmlDocument, DOCUMENT_NODE};
    use crate::sax::{EventRecorder, SaxEvent};

    fn record(doc: &XmlDocument, node: NodeId) -> Vec<SaxEvent> {
        let mut recorder = EventRecorder::new();
        DomToSax::new(&mut recorder).parse(doc, node).unwrap();
        recorder.take_events()
    }

    fn start_mapping(prefix: &str, uri: &str) -> SaxEvent {
        SaxEvent::StartPrefixMapping {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    #[test]
    fn test_document_walk() {
        let mut doc = XmlDocument::new();
        doc.set_xml_version(Some("1.0"));
        let root = doc.create_element("root");
        let text = doc.create_text("hi");
        doc.append_child(DOCUMENT_NODE, root).unwrap();
        doc.append_child(root, text).unwrap();

        let events = record(&doc, DOCUMENT_NODE);
        assert!(matches!(&events[0], SaxEvent::DocumentInfo(info) if info.version.as_deref() == Some("1.0")));
        assert_eq!(events[1], SaxEvent::StartDocument);
        assert!(events[2].is_start_element());
        assert_eq!(events[3], SaxEvent::Characters("hi".into()));
        assert!(events[4].is_end_element());
        assert_eq!(events[5], SaxEvent::EndDocument);
    }

    #[test]
    fn test_element_root_is_wrapped() {
        let mut doc = XmlDocument::new();
        let e = doc.create_element("e");
        let events = record(&doc, e);
        assert_eq!(events.first(), Some(&SaxEvent::StartDocument));
        assert_eq!(events.last(), Some(&SaxEvent::EndDocument));
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_declared_prefix_bound_once() {
        let mut doc = XmlDocument::new();
        let e = doc.create_element_ns(Some("urn:x"), "p:e");
        doc.set_attribute(e, "xmlns:p", "urn:x").unwrap();

        let events = record(&doc, e);
        let mappings: Vec<_> = events.iter().filter(|e| e.is_prefix_mapping()).collect();
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0], &start_mapping("p", "urn:x"));

        // the declaration is not an attribute of the start event
        match &events[2] {
            SaxEvent::StartElement { attributes, .. } => assert!(attributes.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_synthetic_prefix() {
        let mut doc = XmlDocument::new();
        let e = doc.create_element("e");
        doc.set_attribute_ns(e, Some("urn:y"), "attr", "v").unwrap();
        doc.set_attribute_ns(e, Some("urn:z"), "other", "w").unwrap();

        let events = record(&doc, e);
        assert_eq!(events[1], start_mapping("ns0", "urn:y"));
        assert_eq!(events[2], start_mapping("ns1", "urn:z"));
        match &events[3] {
            SaxEvent::StartElement { attributes, .. } => {
                assert_eq!(attributes[0].name.qualified(), "ns0:attr");
                assert_eq!(attributes[1].name.qualified(), "ns1:other");
            }
            other => panic!("unexpected {:?}", other),
        }
        // ended in reverse order
        assert_eq!(events[5], SaxEvent::EndPrefixMapping { prefix: "ns1".into() });
        assert_eq!(events[6], SaxEvent::EndPrefixMapping { prefix: "ns0".into() });
    }

    #[test]
    fn test_synthetic_prefix_avoids_element_prefix() {
        let mut doc = XmlDocument::new();
        let e = doc.create_element_ns(Some("urn:a"), "ns0:e");
        doc.set_attribute_ns(e, Some("urn:b"), "attr", "v").unwrap();
        doc.set_attribute_ns(e, Some("urn:c"), "ns1:other", "w").unwrap();

        let events = record(&doc, e);
        assert_eq!(events[1], start_mapping("ns2", "urn:b"));
        assert_eq!(events[2], start_mapping("ns1", "urn:c"));
        assert_eq!(events[3], start_mapping("ns0", "urn:a"));
        match &events[4] {
            SaxEvent::StartElement { attributes, .. } => {
                assert_eq!(attributes[0].name.qualified(), "ns2:attr");
                assert_eq!(attributes[1].name.qualified(), "ns1:other");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_synthetic_prefix_avoids_bound_prefix() {
        let mut doc = XmlDocument::new();
        let outer = doc.create_element("outer");
        let inner = doc.create_element("inner");
        doc.append_child(outer, inner).unwrap();
        doc.set_attribute(outer, "xmlns:ns0", "urn:a").unwrap();
        doc.set_attribute_ns(inner, Some("urn:b"), "attr", "v").unwrap();

        let events = record(&doc, outer);
        assert!(events.contains(&start_mapping("ns1", "urn:b")));
        assert!(!events.contains(&start_mapping("ns0", "urn:b")));
    }

    #[test]
    fn test_namespace_aware_unnamespaced_element() {
        let mut doc = XmlDocument::new();
        let e = doc.create_element_ns(None, "e");
        let events = record(&doc, e);
        assert_eq!(events[1], start_mapping("", ""));
    }

    #[test]
    fn test_lexical_fallbacks() {
        let mut doc = XmlDocument::new();
        let e = doc.create_element("e");
        let cdata = doc.create_cdata("<raw>");
        let comment = doc.create_comment("note");
        doc.append_child(e, cdata).unwrap();
        doc.append_child(e, comment).unwrap();

        let events = record(&doc, e);
        assert_eq!(events[2], SaxEvent::StartCData);
        assert_eq!(events[3], SaxEvent::Characters("<raw>".into()));
        assert_eq!(events[4], SaxEvent::EndCData);
        assert_eq!(events[5], SaxEvent::Comment("note".into()));

        let mut plain = EventRecorder::without_lexical();
        DomToSax::new(&mut plain).parse(&doc, e).unwrap();
        let events = plain.take_events();
        assert_eq!(events[2], SaxEvent::Characters("<raw>".into()));
        assert!(events[3].is_end_element());
    }

    #[test]
    fn test_ignored_kinds() {
        let mut doc = XmlDocument::new();
        let e = doc.create_element("e");
        let entity = doc.create_entity_reference("ent");
        doc.append_child(e, entity).unwrap();
        let attr = doc.create_attribute_ns(None, "a", "v");

        assert_eq!(record(&doc, e).len(), 4);
        assert_eq!(record(&doc, attr), vec![SaxEvent::StartDocument, SaxEvent::EndDocument]);
    }

    #[test]
    fn test_unknown_node() {
        let doc = XmlDocument::new();
        let mut recorder = EventRecorder::new();
        assert!(DomToSax::new(&mut recorder).parse(&doc, 99).is_err());
    }
}
