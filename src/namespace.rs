//! Namespace Resolution
//!
//! Two bookkeeping structures live here:
//!
//! - [`NamespaceScopes`]: per-prefix URI stacks that decide whether a prefix
//!   mapping has to be (re)announced to a content handler. Used by the tree
//!   walker, which sees declarations and synthesized bindings mixed together.
//! - [`NamespaceResolver`]: depth-scoped bindings used by the text cursor to
//!   resolve prefixes while reading.

use std::collections::HashMap;

use crate::error::Result;
use crate::sax::ContentHandler;

/// Well-known namespace URIs and prefixes
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
    pub const XML_PREFIX: &str = "xml";
    pub const XMLNS_PREFIX: &str = "xmlns";
}

/// Prefix → stack of URIs currently bound to it
///
/// The top of each stack is the binding visible at the current point of the
/// traversal. One instance serves one traversal; call [`clear`](Self::clear)
/// before reusing it for an unrelated document.
#[derive(Debug, Default)]
pub struct NamespaceScopes {
    stacks: HashMap<String, Vec<String>>,
}

impl NamespaceScopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring `prefix → uri` into scope.
    ///
    /// Returns `true` if the binding was pushed and a start-prefix-mapping was
    /// forwarded, `false` if `uri` is already the innermost binding of `prefix`
    /// (or `prefix` is `xml`). Every `true` must be matched by exactly one
    /// [`exit_prefix`](Self::exit_prefix).
    pub fn enter_prefix<H: ContentHandler + ?Sized>(
        &mut self,
        prefix: &str,
        uri: &str,
        handler: &mut H,
    ) -> Result<bool> {
        if prefix == ns::XML_PREFIX {
            return Ok(false);
        }

        let stack = self.stacks.entry(prefix.to_string()).or_default();
        if stack.last().map(String::as_str) == Some(uri) {
            return Ok(false);
        }

        handler.start_prefix_mapping(prefix, uri)?;
        stack.push(uri.to_string());
        Ok(true)
    }

    /// Drop the innermost binding of `prefix` and forward an
    /// end-prefix-mapping. A prefix that was never entered is ignored.
    pub fn exit_prefix<H: ContentHandler + ?Sized>(
        &mut self,
        prefix: &str,
        handler: &mut H,
    ) -> Result<()> {
        let popped = self.stacks.get_mut(prefix).and_then(Vec::pop);
        if popped.is_some() {
            handler.end_prefix_mapping(prefix)?;
        }
        Ok(())
    }

    /// The URI currently visible for `prefix`
    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        self.stacks
            .get(prefix)
            .and_then(|stack| stack.last())
            .map(String::as_str)
    }

    /// Number of bindings stacked on `prefix`
    pub fn depth(&self, prefix: &str) -> usize {
        self.stacks.get(prefix).map_or(0, Vec::len)
    }

    /// True when no prefix has a visible binding
    pub fn is_empty(&self) -> bool {
        self.stacks.values().all(Vec::is_empty)
    }

    /// Forget every binding
    pub fn clear(&mut self) {
        self.stacks.clear();
    }
}

/// Namespace binding (prefix -> URI) declared at some element depth
#[derive(Debug, Clone)]
struct NsBinding {
    prefix: String,
    uri: String,
    depth: u32,
}

/// Stack-based namespace resolver
#[derive(Debug)]
pub struct NamespaceResolver {
    /// Stack of namespace bindings
    bindings: Vec<NsBinding>,
    /// Current element depth
    depth: u32,
}

impl NamespaceResolver {
    /// Create a new namespace resolver with pre-declared xml and xmlns namespaces
    pub fn new() -> Self {
        let mut resolver = NamespaceResolver {
            bindings: Vec::with_capacity(16),
            depth: 0,
        };

        resolver.bindings.push(NsBinding {
            prefix: ns::XML_PREFIX.to_string(),
            uri: ns::XML.to_string(),
            depth: 0,
        });
        resolver.bindings.push(NsBinding {
            prefix: ns::XMLNS_PREFIX.to_string(),
            uri: ns::XMLNS.to_string(),
            depth: 0,
        });

        resolver
    }

    /// Enter a new element scope
    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave an element scope, removing any bindings declared in it
    pub fn pop_scope(&mut self) {
        while let Some(binding) = self.bindings.last() {
            if binding.depth < self.depth {
                break;
            }
            self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Declare a namespace binding for the current scope.
    /// Returns false for the reserved `xml` and `xmlns` prefixes.
    pub fn declare(&mut self, prefix: &str, uri: &str) -> bool {
        if prefix == ns::XML_PREFIX || prefix == ns::XMLNS_PREFIX {
            return false;
        }

        self.bindings.push(NsBinding {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
            depth: self.depth,
        });
        true
    }

    /// Resolve a prefix to a namespace URI (`""` is the default namespace).
    /// An empty URI means the prefix was undeclared.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        // Search from most recent to oldest
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    /// Get current depth
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl Default for NamespaceResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sax::{EventRecorder, SaxEvent};

    #[test]
    fn test_enter_new_prefix() {
        let mut scopes = NamespaceScopes::new();
        let mut recorder = EventRecorder::new();

        assert!(scopes.enter_prefix("p", "urn:x", &mut recorder).unwrap());
        assert_eq!(scopes.lookup("p"), Some("urn:x"));
        assert_eq!(
            recorder.events(),
            &[SaxEvent::StartPrefixMapping {
                prefix: "p".into(),
                uri: "urn:x".into()
            }]
        );
    }

    #[test]
    fn test_same_uri_not_reemitted() {
        let mut scopes = NamespaceScopes::new();
        let mut recorder = EventRecorder::new();

        assert!(scopes.enter_prefix("p", "urn:x", &mut recorder).unwrap());
        assert!(!scopes.enter_prefix("p", "urn:x", &mut recorder).unwrap());
        assert_eq!(recorder.event_count(), 1);
        assert_eq!(scopes.depth("p"), 1);
    }

    #[test]
    fn test_shadow_and_restore() {
        let mut scopes = NamespaceScopes::new();
        let mut recorder = EventRecorder::new();

        scopes.enter_prefix("p", "urn:one", &mut recorder).unwrap();
        assert!(scopes.enter_prefix("p", "urn:two", &mut recorder).unwrap());
        assert_eq!(scopes.lookup("p"), Some("urn:two"));

        scopes.exit_prefix("p", &mut recorder).unwrap();
        assert_eq!(scopes.lookup("p"), Some("urn:one"));
        scopes.exit_prefix("p", &mut recorder).unwrap();
        assert!(scopes.is_empty());
        assert_eq!(recorder.event_count(), 4);
    }

    #[test]
    fn test_xml_prefix_is_implicit() {
        let mut scopes = NamespaceScopes::new();
        let mut recorder = EventRecorder::new();

        assert!(!scopes.enter_prefix("xml", ns::XML, &mut recorder).unwrap());
        scopes.exit_prefix("xml", &mut recorder).unwrap();
        assert_eq!(recorder.event_count(), 0);
    }

    #[test]
    fn test_exit_unknown_prefix_is_noop() {
        let mut scopes = NamespaceScopes::new();
        let mut recorder = EventRecorder::new();
        scopes.exit_prefix("nope", &mut recorder).unwrap();
        assert_eq!(recorder.event_count(), 0);
    }

    #[test]
    fn test_exit_after_balanced_pair_is_noop() {
        let mut scopes = NamespaceScopes::new();
        let mut recorder = EventRecorder::new();
        assert!(scopes.enter_prefix("p", "urn:p", &mut recorder).unwrap());
        scopes.exit_prefix("p", &mut recorder).unwrap();
        scopes.exit_prefix("p", &mut recorder).unwrap();

        assert_eq!(recorder.event_count(), 2);
        assert_eq!(
            recorder.events()[1],
            SaxEvent::EndPrefixMapping { prefix: "p".into() }
        );
        assert_eq!(scopes.depth("p"), 0);
    }

    #[test]
    fn test_resolver_default_namespaces() {
        let resolver = NamespaceResolver::new();
        assert_eq!(resolver.resolve("xml"), Some(ns::XML));
        assert_eq!(resolver.resolve(""), None);
    }

    #[test]
    fn test_resolver_scope_pop() {
        let mut resolver = NamespaceResolver::new();

        resolver.push_scope();
        resolver.declare("foo", "http://example.com/foo");
        assert_eq!(resolver.resolve("foo"), Some("http://example.com/foo"));

        resolver.push_scope();
        resolver.declare("foo", "http://example.com/bar");
        assert_eq!(resolver.resolve("foo"), Some("http://example.com/bar"));

        resolver.pop_scope();
        assert_eq!(resolver.resolve("foo"), Some("http://example.com/foo"));

        resolver.pop_scope();
        assert_eq!(resolver.resolve("foo"), None);
    }

    #[test]
    fn test_resolver_undeclare_default() {
        let mut resolver = NamespaceResolver::new();
        resolver.push_scope();
        resolver.declare("", "urn:d");
        resolver.push_scope();
        resolver.declare("", "");
        assert_eq!(resolver.resolve(""), None);
        resolver.pop_scope();
        assert_eq!(resolver.resolve(""), Some("urn:d"));
    }
}
