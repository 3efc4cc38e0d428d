//! XML text cursor
//!
//! A namespace-aware pull parser over a `&str`, built on the memchr
//! [`Scanner`]. Markup is read one construct at a time; each construct
//! yields one or more owned [`StaxEvent`]s that are queued and then exposed
//! through the [`StreamCursor`] accessors.
//!
//! Well-formedness failures (unterminated constructs, mismatched end tags,
//! unbound prefixes, text or a second element after the root) surface as
//! [`BridgeError::Syntax`] carrying the byte offset.

use std::collections::VecDeque;

use log::trace;
use memchr::{memchr, memchr2};

use super::{CursorEvent, Namespace, StaxEvent, StreamCursor};
use crate::attributes::{is_namespace_declaration, Attribute};
use crate::config::ReaderConfig;
use crate::core::attributes::{parse_attributes, RawAttribute};
use crate::core::entities::{normalize_newlines, split_references, TextPiece};
use crate::core::scanner::{is_all_whitespace, Scanner};
use crate::error::{BridgeError, Result};
use crate::name::{split_name, QName};
use crate::namespace::{ns, NamespaceResolver};

/// Element still open at the current position
struct OpenElement<'a> {
    /// Lexical name as written, compared against the end tag
    raw_name: &'a str,
    name: QName,
    namespaces: Vec<Namespace>,
}

/// Pull cursor over XML text
pub struct TextCursor<'a> {
    scanner: Scanner<'a>,
    config: ReaderConfig,
    resolver: NamespaceResolver,
    open: Vec<OpenElement<'a>>,
    queue: VecDeque<StaxEvent>,
    current: StaxEvent,
    version: Option<String>,
    encoding: Option<String>,
    standalone: Option<bool>,
    seen_root: bool,
}

impl<'a> TextCursor<'a> {
    /// Create a cursor with default options, positioned on StartDocument
    pub fn new(input: &'a str) -> Result<Self> {
        Self::with_config(input, ReaderConfig::default())
    }

    /// Create a cursor with explicit options, positioned on StartDocument.
    /// The XML declaration, if any, is read here.
    pub fn with_config(input: &'a str, config: ReaderConfig) -> Result<Self> {
        let mut cursor = TextCursor {
            scanner: Scanner::new(input),
            config,
            resolver: NamespaceResolver::new(),
            open: Vec::new(),
            queue: VecDeque::new(),
            current: StaxEvent::start_document(),
            version: None,
            encoding: None,
            standalone: None,
            seen_root: false,
        };

        if cursor.scanner.starts_with("\u{feff}") {
            cursor.scanner.advance('\u{feff}'.len_utf8());
        }
        cursor.read_declaration()?;
        cursor.current = StaxEvent::StartDocument {
            version: cursor.version.clone(),
            encoding: cursor.encoding.clone(),
            standalone: cursor.standalone,
        };
        Ok(cursor)
    }

    /// Byte offset of the next unread input
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// The current event as an owned value
    pub fn current_event(&self) -> &StaxEvent {
        &self.current
    }

    fn error(&self, message: impl Into<String>) -> BridgeError {
        BridgeError::syntax(message, self.scanner.position())
    }

    // =========================================================================
    // XML declaration
    // =========================================================================

    fn read_declaration(&mut self) -> Result<()> {
        let rest = self.scanner.remaining().as_bytes();
        let is_declaration = rest.starts_with(b"<?xml")
            && matches!(rest.get(5), Some(b' ' | b'\t' | b'\n' | b'\r' | b'?'));
        if !is_declaration {
            return Ok(());
        }

        self.scanner.advance(5);
        let offset = self.scanner.position();
        let body = self
            .scanner
            .read_until("?>")
            .ok_or_else(|| BridgeError::syntax("unterminated XML declaration", offset))?;

        for RawAttribute { name, value } in parse_attributes(body, offset)? {
            match name {
                "version" => self.version = Some(value.into_owned()),
                "encoding" => self.encoding = Some(value.into_owned()),
                "standalone" => {
                    self.standalone = match value.as_ref() {
                        "yes" => Some(true),
                        "no" => Some(false),
                        other => {
                            return Err(BridgeError::syntax(
                                format!("invalid standalone value '{}'", other),
                                offset,
                            ))
                        }
                    }
                }
                other => {
                    return Err(BridgeError::syntax(
                        format!("unexpected '{}' in XML declaration", other),
                        offset,
                    ))
                }
            }
        }
        if self.version.is_none() {
            return Err(BridgeError::syntax("XML declaration without version", offset));
        }
        Ok(())
    }

    // =========================================================================
    // Markup
    // =========================================================================

    /// Read the next construct and queue its events
    fn read_construct(&mut self) -> Result<()> {
        if self.scanner.is_eof() {
            return self.finish();
        }

        if self.scanner.peek() != Some(b'<') {
            return self.read_text();
        }

        if self.scanner.starts_with("<!--") {
            self.read_comment()
        } else if self.scanner.starts_with("<![CDATA[") {
            self.read_cdata()
        } else if self.scanner.starts_with("<!DOCTYPE") {
            self.read_doctype()
        } else if self.scanner.starts_with("<?") {
            self.read_processing_instruction()
        } else if self.scanner.starts_with("</") {
            self.read_end_tag()
        } else {
            self.read_start_tag()
        }
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(open) = self.open.last() {
            return Err(self.error(format!("unclosed element <{}>", open.raw_name)));
        }
        if !self.seen_root {
            return Err(self.error("no root element"));
        }
        self.queue.push_back(StaxEvent::EndDocument);
        Ok(())
    }

    fn read_text(&mut self) -> Result<()> {
        let start = self.scanner.position();
        let raw = self.scanner.read_text();

        if self.open.is_empty() {
            if !is_all_whitespace(raw) {
                return Err(BridgeError::syntax(
                    if self.seen_root {
                        "text after the root element"
                    } else {
                        "text before the root element"
                    },
                    start,
                ));
            }
            self.queue
                .push_back(StaxEvent::Space(normalize_newlines(raw).into_owned()));
            return Ok(());
        }

        let text = normalize_newlines(raw);
        for piece in split_references(&text) {
            match piece {
                TextPiece::Text(text) => self.queue.push_back(StaxEvent::Characters(text.into_owned())),
                TextPiece::Reference(name) if self.config.report_entity_references => {
                    self.queue.push_back(StaxEvent::EntityReference(name.to_string()))
                }
                TextPiece::Reference(name) => {
                    self.queue.push_back(StaxEvent::Characters(format!("&{};", name)))
                }
            }
        }
        Ok(())
    }

    fn read_comment(&mut self) -> Result<()> {
        let start = self.scanner.position();
        self.scanner.advance(4);
        let body = self
            .scanner
            .read_until("-->")
            .ok_or_else(|| BridgeError::syntax("unterminated comment", start))?;
        self.queue
            .push_back(StaxEvent::Comment(normalize_newlines(body).into_owned()));
        Ok(())
    }

    fn read_cdata(&mut self) -> Result<()> {
        let start = self.scanner.position();
        if self.open.is_empty() {
            return Err(BridgeError::syntax("CDATA section outside the root element", start));
        }
        self.scanner.advance(9);
        let body = self
            .scanner
            .read_until("]]>")
            .ok_or_else(|| BridgeError::syntax("unterminated CDATA section", start))?;
        let text = normalize_newlines(body).into_owned();
        if self.config.report_cdata {
            self.queue.push_back(StaxEvent::CData(text));
        } else {
            self.queue.push_back(StaxEvent::Characters(text));
        }
        Ok(())
    }

    fn read_doctype(&mut self) -> Result<()> {
        let start = self.scanner.position();
        if self.seen_root {
            return Err(BridgeError::syntax("DOCTYPE after the root element", start));
        }
        let rest = self.scanner.remaining();
        let bytes = rest.as_bytes();
        // An internal subset ends at the first `]`
        let end = match memchr2(b'[', b'>', bytes) {
            Some(i) if bytes[i] == b'[' => memchr(b']', &bytes[i..])
                .and_then(|close| memchr(b'>', &bytes[i + close..]).map(|gt| i + close + gt)),
            found => found,
        };
        let Some(end) = end else {
            return Err(BridgeError::syntax("unterminated DOCTYPE", start));
        };

        let text = &rest[..=end];
        self.scanner.advance(end + 1);
        self.queue.push_back(StaxEvent::Dtd(text.to_string()));
        Ok(())
    }

    fn read_processing_instruction(&mut self) -> Result<()> {
        let start = self.scanner.position();
        self.scanner.advance(2);
        let target = self
            .scanner
            .read_name()
            .ok_or_else(|| BridgeError::syntax("processing instruction without target", start))?;
        if target.eq_ignore_ascii_case("xml") {
            return Err(BridgeError::syntax("XML declaration not at start of document", start));
        }

        let body = self
            .scanner
            .read_until("?>")
            .ok_or_else(|| BridgeError::syntax("unterminated processing instruction", start))?;
        if !body.is_empty() && !body.starts_with([' ', '\t', '\n', '\r']) {
            return Err(BridgeError::syntax("invalid processing instruction target", start));
        }
        let data = normalize_newlines(body.trim_start()).into_owned();

        self.queue.push_back(StaxEvent::ProcessingInstruction {
            target: target.to_string(),
            data,
        });
        Ok(())
    }

    fn read_end_tag(&mut self) -> Result<()> {
        let start = self.scanner.position();
        self.scanner.advance(2);
        let raw_name = self
            .scanner
            .read_name()
            .ok_or_else(|| BridgeError::syntax("end tag without name", start))?;
        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'>') {
            return Err(self.error(format!("malformed end tag </{}", raw_name)));
        }
        self.scanner.advance(1);

        let Some(open) = self.open.pop() else {
            return Err(BridgeError::syntax(
                format!("end tag </{}> without start tag", raw_name),
                start,
            ));
        };
        if open.raw_name != raw_name {
            return Err(BridgeError::syntax(
                format!("end tag </{}> does not match <{}>", raw_name, open.raw_name),
                start,
            ));
        }

        self.close(open);
        Ok(())
    }

    fn close(&mut self, open: OpenElement<'a>) {
        if self.config.namespace_aware {
            self.resolver.pop_scope();
        }
        self.queue.push_back(StaxEvent::EndElement {
            name: open.name,
            namespaces: open.namespaces,
        });
    }

    fn read_start_tag(&mut self) -> Result<()> {
        let start = self.scanner.position();
        if self.seen_root && self.open.is_empty() {
            return Err(BridgeError::syntax("second root element", start));
        }
        self.scanner.advance(1);
        let raw_name = self
            .scanner
            .read_name()
            .ok_or_else(|| BridgeError::syntax("invalid element name", start))?;
        let body_offset = self.scanner.position();
        let body = self
            .scanner
            .read_tag_body()
            .ok_or_else(|| BridgeError::syntax(format!("unterminated start tag <{}", raw_name), start))?;

        let (body, is_empty) = match body.strip_suffix('/') {
            Some(inner) => (inner, true),
            None => (body, false),
        };
        let raw_attributes = parse_attributes(body, body_offset)?;

        let (name, attributes, namespaces) = if self.config.namespace_aware {
            self.resolve_names(raw_name, raw_attributes, start)?
        } else {
            let attributes = raw_attributes
                .into_iter()
                .map(|a| Attribute::new(QName::new(None, a.name), a.value))
                .collect();
            (QName::new(None, raw_name), attributes, Vec::new())
        };

        trace!("start tag <{}> at {}", raw_name, start);
        self.seen_root = true;
        self.queue.push_back(StaxEvent::StartElement {
            name: name.clone(),
            attributes,
            namespaces: namespaces.clone(),
        });

        let open = OpenElement {
            raw_name,
            name,
            namespaces,
        };
        if is_empty {
            self.close(open);
        } else {
            self.open.push(open);
        }
        Ok(())
    }

    /// Declare the element's namespaces and resolve its names
    fn resolve_names(
        &mut self,
        raw_name: &str,
        raw_attributes: Vec<RawAttribute<'_>>,
        offset: usize,
    ) -> Result<(QName, Vec<Attribute>, Vec<Namespace>)> {
        self.resolver.push_scope();

        let mut namespaces = Vec::new();
        let mut plain = Vec::with_capacity(raw_attributes.len());
        for attribute in raw_attributes {
            if !is_namespace_declaration(attribute.name) {
                plain.push(attribute);
                continue;
            }
            let prefix = attribute.name.strip_prefix("xmlns:").unwrap_or("");
            let uri = attribute.value.as_ref();
            // Only the default namespace may be undeclared
            if prefix == ns::XMLNS_PREFIX
                || (prefix == ns::XML_PREFIX) != (uri == ns::XML)
                || (!prefix.is_empty() && uri.is_empty())
            {
                return Err(BridgeError::syntax(
                    format!("illegal namespace declaration {}=\"{}\"", attribute.name, uri),
                    offset,
                ));
            }
            if prefix == ns::XML_PREFIX {
                continue;
            }
            self.resolver.declare(prefix, uri);
            namespaces.push(Namespace::new(prefix, uri));
        }

        let name = self.resolve_element(raw_name, offset)?;
        let mut attributes = Vec::with_capacity(plain.len());
        for attribute in plain {
            let uri = match split_name(attribute.name).0 {
                Some(prefix) => Some(self.resolve_prefix(prefix, offset)?),
                None => None,
            };
            let qname = QName::new(uri, attribute.name);
            if attributes.iter().any(|a: &Attribute| a.name.matches(&qname)) {
                return Err(BridgeError::syntax(
                    format!("duplicate attribute {}", attribute.name),
                    offset,
                ));
            }
            attributes.push(Attribute::new(qname, attribute.value));
        }

        Ok((name, attributes, namespaces))
    }

    fn resolve_element(&self, raw_name: &str, offset: usize) -> Result<QName> {
        match split_name(raw_name).0 {
            Some(prefix) => {
                let uri = self.resolve_prefix(prefix, offset)?;
                Ok(QName::new(Some(uri), raw_name))
            }
            None => Ok(QName::new(self.resolver.resolve(""), raw_name)),
        }
    }

    fn resolve_prefix(&self, prefix: &str, offset: usize) -> Result<&str> {
        self.resolver
            .resolve(prefix)
            .ok_or_else(|| BridgeError::syntax(format!("unbound namespace prefix '{}'", prefix), offset))
    }
}

impl StreamCursor for TextCursor<'_> {
    fn event_type(&self) -> CursorEvent {
        self.current.kind()
    }

    fn next(&mut self) -> Result<CursorEvent> {
        if !self.has_next() {
            return Err(BridgeError::IllegalState("no event after EndDocument".to_string()));
        }
        while self.queue.is_empty() {
            self.read_construct()?;
        }
        if let Some(event) = self.queue.pop_front() {
            self.current = event;
        }
        Ok(self.current.kind())
    }

    fn has_next(&self) -> bool {
        !matches!(self.current, StaxEvent::EndDocument)
    }

    fn text(&self) -> &str {
        self.current.text()
    }

    fn pi_target(&self) -> &str {
        self.current.pi_target()
    }

    fn pi_data(&self) -> &str {
        self.current.pi_data()
    }

    fn name(&self) -> Option<&QName> {
        self.current.name()
    }

    fn attribute_count(&self) -> usize {
        self.current.attributes().len()
    }

    fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.current.attributes().get(index)
    }

    fn namespace_count(&self) -> usize {
        self.current.namespaces().len()
    }

    fn namespace(&self, index: usize) -> Option<&Namespace> {
        self.current.namespaces().get(index)
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    fn standalone(&self) -> Option<bool> {
        self.standalone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &str, config: ReaderConfig) -> Result<Vec<StaxEvent>> {
        let mut cursor = TextCursor::with_config(input, config)?;
        let mut events = vec![cursor.current_event().clone()];
        while cursor.has_next() {
            cursor.next()?;
            events.push(cursor.current_event().clone());
        }
        Ok(events)
    }

    fn kinds(input: &str) -> Vec<CursorEvent> {
        collect(input, ReaderConfig::default())
            .unwrap()
            .iter()
            .map(StaxEvent::kind)
            .collect()
    }

    #[test]
    fn test_simple_document() {
        use CursorEvent::*;
        assert_eq!(
            kinds("<a>hi<b/></a>"),
            vec![StartDocument, StartElement, Characters, StartElement, EndElement, EndElement, EndDocument]
        );
    }

    #[test]
    fn test_declaration() {
        let cursor = TextCursor::new("<?xml version=\"1.1\" encoding='UTF-8' standalone=\"yes\"?><r/>").unwrap();
        assert_eq!(cursor.event_type(), CursorEvent::StartDocument);
        assert_eq!(cursor.version(), Some("1.1"));
        assert_eq!(cursor.encoding(), Some("UTF-8"));
        assert_eq!(cursor.standalone(), Some(true));

        assert!(TextCursor::new("<?xml encoding='x'?><r/>").is_err());
        assert!(TextCursor::new("<?xml version='1.0' standalone='maybe'?><r/>").is_err());
    }

    #[test]
    fn test_prolog_and_epilog() {
        use CursorEvent::*;
        assert_eq!(
            kinds("<!DOCTYPE r [<!ENTITY e 'x'>]>\n<!--c--><?pi data?><r/>\n"),
            vec![StartDocument, Dtd, Space, Comment, ProcessingInstruction, StartElement, EndElement, Space, EndDocument]
        );
    }

    #[test]
    fn test_text_decoding() {
        let events = collect("<a>x &lt;&amp;&#65;\r\ny</a>", ReaderConfig::default()).unwrap();
        assert_eq!(events[2], StaxEvent::Characters("x <&A\ny".into()));
    }

    #[test]
    fn test_entity_references() {
        let events = collect("<a>1&ent;2</a>", ReaderConfig::default()).unwrap();
        assert_eq!(events[2], StaxEvent::Characters("1".into()));
        assert_eq!(events[3], StaxEvent::EntityReference("ent".into()));
        assert_eq!(events[4], StaxEvent::Characters("2".into()));

        let config = ReaderConfig::default().report_entity_references(false);
        let events = collect("<a>&ent;</a>", config).unwrap();
        assert_eq!(events[2], StaxEvent::Characters("&ent;".into()));
    }

    #[test]
    fn test_cdata() {
        let events = collect("<a><![CDATA[<x>]]></a>", ReaderConfig::default()).unwrap();
        assert_eq!(events[2], StaxEvent::Characters("<x>".into()));

        let events = collect("<a><![CDATA[<x>]]></a>", ReaderConfig::default().report_cdata(true)).unwrap();
        assert_eq!(events[2], StaxEvent::CData("<x>".into()));
    }

    #[test]
    fn test_namespaces() {
        let events = collect(
            "<p:a xmlns:p=\"urn:p\" xmlns=\"urn:d\" p:x=\"1\" y=\"2\"><b/></p:a>",
            ReaderConfig::default(),
        )
        .unwrap();

        let StaxEvent::StartElement { name, attributes, namespaces } = &events[1] else {
            panic!("expected start element, got {:?}", events[1]);
        };
        assert_eq!(name.uri(), "urn:p");
        assert_eq!(name.prefix_str(), "p");
        assert_eq!(namespaces, &vec![Namespace::new("p", "urn:p"), Namespace::new("", "urn:d")]);
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].name.uri(), "urn:p");
        assert_eq!(attributes[1].name.namespace_uri, None);

        // default namespace applies to the unprefixed child
        assert_eq!(events[2].name().map(QName::uri), Some("urn:d"));

        // end element carries the declarations going out of scope
        assert_eq!(events[4].namespaces().len(), 2);
    }

    #[test]
    fn test_namespace_unaware() {
        let config = ReaderConfig::default().namespace_aware(false);
        let events = collect("<p:a xmlns:p=\"urn:p\"/>", config).unwrap();
        assert_eq!(events[1].name().and_then(|n| n.namespace_uri.as_deref()), None);
        assert_eq!(events[1].attributes().len(), 1);
        assert!(events[1].namespaces().is_empty());
    }

    #[test]
    fn test_syntax_errors() {
        let cases = [
            "",
            "text",
            "<a>",
            "<a></b>",
            "<a/><b/>",
            "<a/>tail",
            "<a><!-- open</a>",
            "<q:a/>",
            "<a q:x=\"1\"/>",
            "<a x=\"1\" x=\"2\"/>",
            "<a xmlns:p=\"\"/>",
            "<a><?xml version='1.0'?></a>",
            "</a>",
        ];
        for input in cases {
            let result = collect(input, ReaderConfig::default());
            assert!(
                matches!(result, Err(BridgeError::Syntax { .. })),
                "{:?} gave {:?}",
                input,
                result
            );
        }
    }

    #[test]
    fn test_error_offset() {
        match collect("<a></b>", ReaderConfig::default()) {
            Err(BridgeError::Syntax { offset, .. }) => assert_eq!(offset, 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_next_after_end() {
        let mut cursor = TextCursor::new("<a/>").unwrap();
        while cursor.has_next() {
            cursor.next().unwrap();
        }
        assert!(matches!(cursor.next(), Err(BridgeError::IllegalState(_))));
    }
}
