//! XML text output
//!
//! [`XmlWriter`] is a push-event sink that writes markup to any
//! [`fmt::Write`]. Start tags are left open until the next event so that
//! elements without content can be written as `<a/>`.

use std::fmt::{self, Write as _};
use std::io;

use log::debug;

use crate::attributes::Attributes;
use crate::bridge::DomToSax;
use crate::config::WriterConfig;
use crate::core::entities::{escape_attribute, escape_text};
use crate::dom::{DocumentAccess, NodeId};
use crate::error::{BridgeError, Result};
use crate::name::QName;
use crate::namespace::ns;
use crate::sax::{ContentHandler, DocumentInfo, LexicalHandler};

/// What an open element has written so far, for indentation
#[derive(Debug, Clone, Copy, Default)]
struct Written {
    markup: bool,
    text: bool,
}

/// Push-event sink producing XML text
pub struct XmlWriter<W: fmt::Write> {
    out: W,
    config: WriterConfig,
    info: Option<DocumentInfo>,
    /// Prefix mappings for the next start tag
    pending_namespaces: Vec<(String, String)>,
    /// A start tag is written up to its attributes, `>` not yet
    tag_open: bool,
    in_cdata: bool,
    /// Anything written at all
    started: bool,
    /// One entry per open element
    open: Vec<Written>,
}

impl<W: fmt::Write> XmlWriter<W> {
    pub fn new(out: W, config: WriterConfig) -> Self {
        XmlWriter {
            out,
            config,
            info: None,
            pending_namespaces: Vec::new(),
            tag_open: false,
            in_cdata: false,
            started: false,
            open: Vec::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn close_start_tag(&mut self) -> Result<()> {
        if self.tag_open {
            self.out.write_char('>')?;
            self.tag_open = false;
        }
        Ok(())
    }

    /// Newline and indentation before markup, unless the parent holds text
    fn indent(&mut self, depth: usize) -> Result<()> {
        let Some(width) = self.config.indent else {
            return Ok(());
        };
        if !self.started || self.open.last().is_some_and(|w| w.text) {
            return Ok(());
        }
        self.out.write_char('\n')?;
        for _ in 0..width * depth {
            self.out.write_char(' ')?;
        }
        Ok(())
    }

    /// Prepare for a markup item (tag, comment, PI) at the current depth
    fn begin_markup(&mut self) -> Result<()> {
        self.close_start_tag()?;
        self.indent(self.open.len())?;
        if let Some(parent) = self.open.last_mut() {
            parent.markup = true;
        }
        self.started = true;
        Ok(())
    }

    fn begin_text(&mut self) -> Result<()> {
        self.close_start_tag()?;
        if let Some(parent) = self.open.last_mut() {
            parent.text = true;
        }
        self.started = true;
        Ok(())
    }

    fn write_declaration(&mut self) -> Result<()> {
        let info = self.info.take().unwrap_or_default();
        let version = info.version.as_deref().unwrap_or("1.0");
        write!(self.out, "<?xml version=\"{}\"", version)?;
        if let Some(encoding) = info.encoding.as_deref() {
            write!(self.out, " encoding=\"{}\"", encoding)?;
        }
        if let Some(standalone) = info.standalone {
            write!(self.out, " standalone=\"{}\"", if standalone { "yes" } else { "no" })?;
        }
        self.out.write_str("?>")?;
        self.started = true;
        Ok(())
    }
}

impl<W: fmt::Write> ContentHandler for XmlWriter<W> {
    fn document_info(&mut self, info: &DocumentInfo) -> Result<()> {
        self.info = Some(info.clone());
        Ok(())
    }

    fn start_document(&mut self) -> Result<()> {
        if !self.config.omit_xml_declaration {
            self.write_declaration()?;
        }
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.close_start_tag()
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<()> {
        self.pending_namespaces.push((prefix.to_string(), uri.to_string()));
        Ok(())
    }

    fn end_prefix_mapping(&mut self, _prefix: &str) -> Result<()> {
        Ok(())
    }

    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> Result<()> {
        self.begin_markup()?;
        write!(self.out, "<{}", name.qualified())?;

        for (prefix, uri) in std::mem::take(&mut self.pending_namespaces) {
            if prefix.is_empty() {
                write!(self.out, " {}=\"{}\"", ns::XMLNS_PREFIX, escape_attribute(&uri))?;
            } else {
                write!(self.out, " {}:{}=\"{}\"", ns::XMLNS_PREFIX, prefix, escape_attribute(&uri))?;
            }
        }
        for attribute in attributes {
            write!(
                self.out,
                " {}=\"{}\"",
                attribute.name.qualified(),
                escape_attribute(&attribute.value)
            )?;
        }

        self.open.push(Written::default());
        if self.config.collapse_empty_elements {
            self.tag_open = true;
        } else {
            self.out.write_char('>')?;
        }
        Ok(())
    }

    fn end_element(&mut self, name: &QName) -> Result<()> {
        let written = self.open.pop().unwrap_or_default();
        if self.tag_open {
            self.out.write_str("/>")?;
            self.tag_open = false;
            return Ok(());
        }
        if written.markup && !written.text {
            self.indent(self.open.len())?;
        }
        write!(self.out, "</{}>", name.qualified())?;
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.begin_text()?;
        if self.in_cdata {
            self.out.write_str(&text.replace("]]>", "]]]]><![CDATA[>"))?;
        } else {
            self.out.write_str(&escape_text(text))?;
        }
        Ok(())
    }

    fn ignorable_whitespace(&mut self, text: &str) -> Result<()> {
        if self.config.indent.is_some() {
            return Ok(());
        }
        self.close_start_tag()?;
        self.out.write_str(text)?;
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        if data.contains("?>") {
            return Err(BridgeError::Handler(format!(
                "processing instruction {} data contains '?>'",
                target
            )));
        }
        self.begin_markup()?;
        if data.is_empty() {
            write!(self.out, "<?{}?>", target)?;
        } else {
            write!(self.out, "<?{} {}?>", target, data)?;
        }
        Ok(())
    }

    fn as_lexical(&mut self) -> Option<&mut dyn LexicalHandler> {
        Some(self)
    }
}

impl<W: fmt::Write> LexicalHandler for XmlWriter<W> {
    fn start_cdata(&mut self) -> Result<()> {
        self.begin_text()?;
        self.out.write_str("<![CDATA[")?;
        self.in_cdata = true;
        Ok(())
    }

    fn end_cdata(&mut self) -> Result<()> {
        self.out.write_str("]]>")?;
        self.in_cdata = false;
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<()> {
        if text.contains("--") || text.ends_with('-') {
            return Err(BridgeError::Handler(format!(
                "comment text {:?} cannot be written",
                text
            )));
        }
        self.begin_markup()?;
        write!(self.out, "<!--{}-->", text)?;
        Ok(())
    }
}

/// Serialize a whole document
pub fn to_string<D: DocumentAccess + ?Sized>(doc: &D, config: &WriterConfig) -> Result<String> {
    node_to_string(doc, doc.document_node_id(), config)
}

/// Serialize the subtree rooted at `node`
pub fn node_to_string<D: DocumentAccess + ?Sized>(
    doc: &D,
    node: NodeId,
    config: &WriterConfig,
) -> Result<String> {
    let mut writer = XmlWriter::new(String::new(), config.clone());
    DomToSax::new(&mut writer).parse(doc, node)?;
    let text = writer.into_inner();
    debug!("serialized node {} to {} bytes", node, text.len());
    Ok(text)
}

/// Serialize a whole document to a byte sink
pub fn write_document<D, W>(doc: &D, config: &WriterConfig, mut out: W) -> Result<()>
where
    D: DocumentAccess + ?Sized,
    W: io::Write,
{
    let text = to_string(doc, config)?;
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}
