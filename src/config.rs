//! Reader and writer options.
//!
//! Both structs deserialize with `#[serde(default)]`, so a partial JSON or TOML
//! table only overrides the fields it names.

use serde::{Deserialize, Serialize};

/// Options for [`TextCursor`](crate::stax::TextCursor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Report CDATA sections as `CData` cursor events instead of `Characters`
    pub report_cdata: bool,
    /// Report undeclared named entity references as `EntityReference` events.
    /// When false they are kept literally in the surrounding text.
    pub report_entity_references: bool,
    /// Resolve prefixes to namespace URIs; unbound prefixes become errors
    pub namespace_aware: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            report_cdata: false,
            report_entity_references: true,
            namespace_aware: true,
        }
    }
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report_cdata(mut self, yes: bool) -> Self {
        self.report_cdata = yes;
        self
    }

    pub fn report_entity_references(mut self, yes: bool) -> Self {
        self.report_entity_references = yes;
        self
    }

    pub fn namespace_aware(mut self, yes: bool) -> Self {
        self.namespace_aware = yes;
        self
    }
}

/// Options for [`XmlWriter`](crate::serialize::XmlWriter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Skip the `<?xml ...?>` declaration
    pub omit_xml_declaration: bool,
    /// Spaces per nesting level; `None` writes everything on one line
    pub indent: Option<usize>,
    /// Write `<a/>` for elements without content
    pub collapse_empty_elements: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            omit_xml_declaration: false,
            indent: None,
            collapse_empty_elements: true,
        }
    }
}

impl WriterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn omit_xml_declaration(mut self, yes: bool) -> Self {
        self.omit_xml_declaration = yes;
        self
    }

    pub fn indent(mut self, spaces: Option<usize>) -> Self {
        self.indent = spaces;
        self
    }

    pub fn collapse_empty_elements(mut self, yes: bool) -> Self {
        self.collapse_empty_elements = yes;
        self
    }
}
