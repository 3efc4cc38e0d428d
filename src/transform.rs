//! Transformation entry point
//!
//! A [`TransformEngine`] consumes a tree and pushes its result into a
//! [`ContentHandler`]. [`transform`] accepts any [`Source`]: trees are handed
//! over directly, every other source is first built into a tree with
//! [`SaxToDom`]. [`transform_identity`] skips the engine and routes the source
//! through the matching adapter straight into the handler.

use log::debug;

use crate::bridge::{DomToSax, EventToSax, SaxToDom, StreamToSax};
use crate::config::{ReaderConfig, WriterConfig};
use crate::dom::{NodeId, XmlDocument, DOCUMENT_NODE};
use crate::error::Result;
use crate::sax::ContentHandler;
use crate::serialize::XmlWriter;
use crate::stax::{EventReader, StreamCursor, TextCursor};

/// Something that turns a tree into push events
pub trait TransformEngine {
    fn transform(&mut self, doc: &XmlDocument, node: NodeId, handler: &mut dyn ContentHandler) -> Result<()>;
}

/// Copies the input tree to the handler unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTransform;

impl TransformEngine for IdentityTransform {
    fn transform(&mut self, doc: &XmlDocument, node: NodeId, handler: &mut dyn ContentHandler) -> Result<()> {
        DomToSax::new(handler).parse(doc, node)
    }
}

/// Input of a transformation
pub enum Source<'a> {
    /// A subtree of an existing document
    Dom { document: &'a XmlDocument, node: NodeId },
    /// A stream cursor on StartDocument or StartElement
    Stream(&'a mut dyn StreamCursor),
    /// An event reader whose next event is StartDocument or StartElement
    Events(&'a mut dyn EventReader),
    /// XML text
    Text { input: &'a str, config: ReaderConfig },
}

impl<'a> Source<'a> {
    /// The whole of `document`
    pub fn document(document: &'a XmlDocument) -> Self {
        Source::Dom {
            document,
            node: DOCUMENT_NODE,
        }
    }

    /// XML text read with the default reader options
    pub fn text(input: &'a str) -> Self {
        Source::Text {
            input,
            config: ReaderConfig::default(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Source::Dom { .. } => "dom",
            Source::Stream(_) => "stream",
            Source::Events(_) => "events",
            Source::Text { .. } => "text",
        }
    }
}

/// Run `engine` over `source`
pub fn transform<E: TransformEngine + ?Sized>(
    engine: &mut E,
    source: Source<'_>,
    handler: &mut dyn ContentHandler,
) -> Result<()> {
    match source {
        Source::Dom { document, node } => engine.transform(document, node, handler),
        other => {
            let doc = to_document(other)?;
            engine.transform(&doc, DOCUMENT_NODE, handler)
        }
    }
}

/// Replay `source` into `handler` unchanged
pub fn transform_identity(source: Source<'_>, handler: &mut dyn ContentHandler) -> Result<()> {
    debug!("identity transform from {} source", source.kind());
    match source {
        Source::Dom { document, node } => DomToSax::new(handler).parse(document, node),
        Source::Stream(cursor) => StreamToSax::new(handler).bridge(cursor),
        Source::Events(reader) => EventToSax::new(handler).bridge(reader),
        Source::Text { input, config } => {
            let mut cursor = TextCursor::with_config(input, config)?;
            StreamToSax::new(handler).bridge(&mut cursor)
        }
    }
}

/// Build a new document from `source`
pub fn to_document(source: Source<'_>) -> Result<XmlDocument> {
    let mut builder = SaxToDom::new();
    transform_identity(source, &mut builder)?;
    Ok(builder.into_document())
}

/// Write `source` out as XML text
pub fn to_string(source: Source<'_>, config: &WriterConfig) -> Result<String> {
    let mut writer = XmlWriter::new(String::new(), config.clone());
    transform_identity(source, &mut writer)?;
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;
    use crate::dom::DocumentAccess;
    use crate::name::QName;
    use crate::sax::{EventRecorder, SaxEvent};
    use crate::stax::{CursorEventReader, EventCursor, StaxEvent};

    /// Renames every element to `x`
    struct Rename;

    struct RenameHandler<'h> {
        inner: &'h mut dyn ContentHandler,
    }

    impl ContentHandler for RenameHandler<'_> {
        fn start_document(&mut self) -> Result<()> {
            self.inner.start_document()
        }
        fn end_document(&mut self) -> Result<()> {
            self.inner.end_document()
        }
        fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()> {
            self.inner.start_prefix_mapping(prefix, uri)
        }
        fn end_prefix_mapping(&mut self, prefix: &str) -> Result<()> {
            self.inner.end_prefix_mapping(prefix)
        }
        fn start_element(&mut self, _name: &QName, attributes: &Attributes) -> Result<()> {
            self.inner.start_element(&QName::local("x"), attributes)
        }
        fn end_element(&mut self, _name: &QName) -> Result<()> {
            self.inner.end_element(&QName::local("x"))
        }
        fn characters(&mut self, text: &str) -> Result<()> {
            self.inner.characters(text)
        }
        fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
            self.inner.processing_instruction(target, data)
        }
    }

    impl TransformEngine for Rename {
        fn transform(&mut self, doc: &XmlDocument, node: NodeId, handler: &mut dyn ContentHandler) -> Result<()> {
            let mut renamer = RenameHandler { inner: handler };
            DomToSax::new(&mut renamer).parse(doc, node)
        }
    }

    #[test]
    fn test_identity_from_text() {
        let out = to_string(
            Source::text("<a><b>t</b></a>"),
            &WriterConfig::new().omit_xml_declaration(true),
        )
        .unwrap();
        assert_eq!(out, "<a><b>t</b></a>");
    }

    #[test]
    fn test_every_source_builds_the_same_tree() {
        let input = "<r xmlns:p=\"urn:p\"><p:c k=\"v\">text</p:c><!--note--></r>";
        let expected = XmlDocument::parse(input).unwrap();
        let expected_root = expected.root_element_id().unwrap();

        let from_dom = to_document(Source::document(&expected)).unwrap();

        let mut cursor = TextCursor::new(input).unwrap();
        let from_stream = to_document(Source::Stream(&mut cursor)).unwrap();

        let mut reader = CursorEventReader::new(TextCursor::new(input).unwrap());
        let from_events = to_document(Source::Events(&mut reader)).unwrap();

        for doc in [&from_dom, &from_stream, &from_events] {
            let root = doc.root_element_id().unwrap();
            assert!(expected.structurally_equal(expected_root, doc, root));
        }
    }

    #[test]
    fn test_engine_runs_on_built_tree() {
        let mut cursor = EventCursor::new(vec![
            StaxEvent::start_document(),
            StaxEvent::start_element(QName::local("a")),
            StaxEvent::end_element(QName::local("a")),
            StaxEvent::EndDocument,
        ]);
        let mut recorder = EventRecorder::new();
        transform(&mut Rename, Source::Stream(&mut cursor), &mut recorder).unwrap();

        let names: Vec<_> = recorder
            .events()
            .iter()
            .filter_map(SaxEvent::element_name)
            .map(|n| n.local_name.clone())
            .collect();
        assert_eq!(names, vec!["x", "x"]);
    }

    #[test]
    fn test_identity_engine_on_subtree() {
        let doc = XmlDocument::parse("<a><b>1</b></a>").unwrap();
        let root = doc.root_element_id().unwrap();
        let b = doc.children_vec(root)[0];

        let mut recorder = EventRecorder::new();
        transform(
            &mut IdentityTransform,
            Source::Dom { document: &doc, node: b },
            &mut recorder,
        )
        .unwrap();
        let events = recorder.take_events();
        assert_eq!(events.first(), Some(&SaxEvent::StartDocument));
        assert_eq!(events[2], SaxEvent::Characters("1".into()));
        assert_eq!(events.len(), 5);
    }
}
