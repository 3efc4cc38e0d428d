//! XML Entity Decoding and Escaping
//!
//! Handles:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//! - Line-end normalization (CRLF and lone CR become LF)
//!
//! References to entities that are not built in are left to the caller,
//! which either keeps them as text or reports them as entity references.
//! Uses Cow for zero-copy when nothing needs rewriting.

use memchr::{memchr, memchr3};
use std::borrow::Cow;

/// A piece of character content after reference decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPiece<'a> {
    /// Decoded text
    Text(Cow<'a, str>),
    /// Reference to an entity that is not built in (name without `&` and `;`)
    Reference(&'a str),
}

/// Decode text, keeping unknown entity references verbatim.
/// A bare `&` without a terminating `;` is kept as-is.
pub fn decode_text(input: &str) -> Cow<'_, str> {
    let input = normalize_newlines(input);
    if memchr(b'&', input.as_bytes()).is_none() {
        return input;
    }
    let mut out = String::with_capacity(input.len());
    for piece in split_references(&input) {
        match piece {
            TextPiece::Text(text) => out.push_str(&text),
            TextPiece::Reference(name) => {
                out.push('&');
                out.push_str(name);
                out.push(';');
            }
        }
    }
    Cow::Owned(out)
}

/// Split text into decoded runs and unknown entity references.
///
/// Adjacent decoded runs are merged so a reference-free input yields a
/// single piece.
pub fn split_references(input: &str) -> Vec<TextPiece<'_>> {
    let mut pieces = Vec::new();
    let mut run: Option<Cow<'_, str>> = None;
    let mut pos = 0;

    while let Some(amp) = memchr(b'&', &input.as_bytes()[pos..]) {
        let amp = pos + amp;
        push_text(&mut run, &input[pos..amp]);

        let Some(semi) = memchr(b';', &input.as_bytes()[amp..]) else {
            push_text(&mut run, "&");
            pos = amp + 1;
            continue;
        };
        let name = &input[amp + 1..amp + semi];
        pos = amp + semi + 1;

        match decode_entity(name) {
            Some(ch) => {
                let mut buf = [0u8; 4];
                push_text(&mut run, ch.encode_utf8(&mut buf));
            }
            None if is_entity_name(name) => {
                if let Some(text) = run.take() {
                    pieces.push(TextPiece::Text(text));
                }
                pieces.push(TextPiece::Reference(name));
            }
            None => {
                push_text(&mut run, &input[amp..pos]);
            }
        }
    }

    if pos == 0 {
        pieces.push(TextPiece::Text(Cow::Borrowed(input)));
        return pieces;
    }
    push_text(&mut run, &input[pos..]);
    if let Some(text) = run {
        pieces.push(TextPiece::Text(text));
    }
    pieces
}

fn push_text(run: &mut Option<Cow<'_, str>>, text: &str) {
    if text.is_empty() {
        return;
    }
    match run {
        Some(existing) => existing.to_mut().push_str(text),
        None => *run = Some(Cow::Owned(text.to_string())),
    }
}

/// Decode a built-in or numeric entity (without `&` and `;`)
fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => entity.strip_prefix('#').and_then(decode_numeric_entity),
    }
}

/// Decode a numeric character reference body (after `#`)
fn decode_numeric_entity(entity: &str) -> Option<char> {
    let codepoint = match entity.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.parse::<u32>().ok()?,
    };
    if !is_valid_xml_char(codepoint) {
        return None;
    }
    char::from_u32(codepoint)
}

fn is_entity_name(name: &str) -> bool {
    !name.is_empty() && super::scanner::name_end(name, 0) == name.len()
}

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

/// Replace CRLF and lone CR with LF
pub fn normalize_newlines(input: &str) -> Cow<'_, str> {
    if memchr(b'\r', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Escape character content for output
pub fn escape_text(input: &str) -> Cow<'_, str> {
    if memchr3(b'<', b'>', b'&', input.as_bytes()).is_none() && memchr(b'\r', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '\r' => result.push_str("&#13;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escape an attribute value for output inside double quotes
pub fn escape_attribute(input: &str) -> Cow<'_, str> {
    let needs_escape = input
        .bytes()
        .any(|b| matches!(b, b'<' | b'>' | b'&' | b'"' | b'\n' | b'\r' | b'\t'));
    if !needs_escape {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\n' => result.push_str("&#10;"),
            '\r' => result.push_str("&#13;"),
            '\t' => result.push_str("&#9;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities() {
        let result = decode_text("Hello, World!");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_basic_entities() {
        let result = decode_text("&lt;hello&gt; &amp; &quot;world&apos;");
        assert_eq!(result, "<hello> & \"world'");
    }

    #[test]
    fn test_numeric() {
        assert_eq!(decode_text("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_text("&#x1F600;"), "😀");
    }

    #[test]
    fn test_invalid_numeric_kept() {
        assert_eq!(decode_text("&#0;"), "&#0;");
        assert_eq!(decode_text("&#xZZ;"), "&#xZZ;");
    }

    #[test]
    fn test_unknown_and_bare() {
        assert_eq!(decode_text("&unknown;"), "&unknown;");
        assert_eq!(decode_text("a & b"), "a & b");
    }

    #[test]
    fn test_split_references() {
        let pieces = split_references("x&lt;&ent;y");
        assert_eq!(
            pieces,
            vec![
                TextPiece::Text(Cow::Owned("x<".to_string())),
                TextPiece::Reference("ent"),
                TextPiece::Text(Cow::Owned("y".to_string())),
            ]
        );
        assert_eq!(split_references("plain"), vec![TextPiece::Text(Cow::Borrowed("plain"))]);
        assert_eq!(split_references("&ent;"), vec![TextPiece::Reference("ent")]);
    }

    #[test]
    fn test_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc"), "a\nb\nc");
        assert!(matches!(normalize_newlines("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_text("<a> & \"b\""), "&lt;a&gt; &amp; \"b\"");
        assert_eq!(escape_attribute("say \"hi\"\n"), "say &quot;hi&quot;&#10;");
        assert!(matches!(escape_text("plain"), Cow::Borrowed(_)));
    }
}
