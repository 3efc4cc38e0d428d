//! XML Attribute Parsing
//!
//! Parses `name="value"` pairs from the inside of a start tag or an XML
//! declaration. Values are entity-decoded and whitespace-normalized; names
//! are left lexical, namespace resolution happens in the cursor.

use super::entities::decode_text;
use super::scanner::{is_whitespace, name_end};
use crate::error::{BridgeError, Result};
use memchr::memchr;
use std::borrow::Cow;

/// A parsed attribute, before namespace processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute<'a> {
    /// Lexical name (may include a prefix)
    pub name: &'a str,
    /// Attribute value (entities decoded)
    pub value: Cow<'a, str>,
}

/// Parse attributes from raw tag content (after the element name).
///
/// `offset` is the byte position of `input` in the document and is only used
/// for error reporting.
pub fn parse_attributes(input: &str, offset: usize) -> Result<Vec<RawAttribute<'_>>> {
    let bytes = input.as_bytes();
    let mut attrs: Vec<RawAttribute<'_>> = Vec::new();
    let mut pos = 0;

    loop {
        let before_ws = pos;
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }
        if pos == before_ws && !attrs.is_empty() {
            return Err(BridgeError::syntax("whitespace required between attributes", offset + pos));
        }

        // Attribute name
        let name_start = pos;
        pos = name_end(input, pos);
        if pos == name_start {
            return Err(BridgeError::syntax("invalid attribute name", offset + pos));
        }
        let name = &input[name_start..pos];

        // '=' with optional surrounding whitespace
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'=') {
            return Err(BridgeError::syntax(
                format!("attribute '{}' has no value", name),
                offset + pos,
            ));
        }
        pos += 1;
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        // Quoted value
        let quote = match bytes.get(pos) {
            Some(&q) if q == b'"' || q == b'\'' => q,
            _ => {
                return Err(BridgeError::syntax(
                    format!("value of attribute '{}' must be quoted", name),
                    offset + pos,
                ))
            }
        };
        pos += 1;
        let Some(len) = memchr(quote, &bytes[pos..]) else {
            return Err(BridgeError::syntax(
                format!("unterminated value for attribute '{}'", name),
                offset + pos,
            ));
        };
        let raw = &input[pos..pos + len];
        if let Some(lt) = memchr(b'<', raw.as_bytes()) {
            return Err(BridgeError::syntax("'<' not allowed in attribute value", offset + pos + lt));
        }
        pos += len + 1;

        if attrs.iter().any(|a| a.name == name) {
            return Err(BridgeError::syntax(
                format!("duplicate attribute '{}'", name),
                offset + name_start,
            ));
        }
        attrs.push(RawAttribute {
            name,
            value: normalize_value(raw),
        });
    }

    Ok(attrs)
}

/// Literal tabs and line ends in a value become spaces, then references are
/// decoded (so `&#10;` survives as a newline)
fn normalize_value(raw: &str) -> Cow<'_, str> {
    if !raw.bytes().any(|b| matches!(b, b'\t' | b'\n' | b'\r')) {
        return decode_text(raw);
    }
    let spaced = raw.replace("\r\n", " ").replace(['\t', '\n', '\r'], " ");
    Cow::Owned(decode_text(&spaced).into_owned())
}
