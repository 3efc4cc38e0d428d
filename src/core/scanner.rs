//! SIMD-accelerated delimiter scanning using memchr
//!
//! Works on `&str` input and only ever stops on ASCII delimiters, so every
//! position it reports is a char boundary and slicing never panics.

use memchr::{memchr, memchr2, memmem};

/// Cursor over XML text with delimiter search helpers
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    /// Get the current byte position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Remaining input
    #[inline]
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    /// Advance past an ASCII sequence of `n` bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Check if input starts with `needle` at current position
    #[inline]
    pub fn starts_with(&self, needle: &str) -> bool {
        self.remaining().starts_with(needle)
    }

    /// Skip whitespace characters (space, tab, newline, carriage return)
    #[inline]
    pub fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && is_whitespace(bytes[self.pos]) {
            self.pos += 1;
        }
    }

    /// Read text up to the next `<`, or to the end of input
    pub fn read_text(&mut self) -> &'a str {
        let start = self.pos;
        let end = memchr(b'<', self.remaining().as_bytes()).map_or(self.input.len(), |i| start + i);
        self.pos = end;
        &self.input[start..end]
    }

    /// Read up to `terminator`, advancing past it.
    /// Returns `None` (without moving) when the terminator is missing.
    pub fn read_until(&mut self, terminator: &str) -> Option<&'a str> {
        let start = self.pos;
        let found = memmem::find(self.remaining().as_bytes(), terminator.as_bytes())?;
        self.pos = start + found + terminator.len();
        Some(&self.input[start..start + found])
    }

    /// Read the inside of a tag up to its closing `>` that is not inside
    /// quotes, advancing past the `>`
    pub fn read_tag_body(&mut self) -> Option<&'a str> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut pos = start;

        while pos < bytes.len() {
            let rest = &bytes[pos..];
            let hit = memchr2(b'>', b'"', rest).into_iter().chain(memchr(b'\'', rest)).min()?;
            let at = pos + hit;
            match bytes[at] {
                b'>' => {
                    self.pos = at + 1;
                    return Some(&self.input[start..at]);
                }
                quote => {
                    let close = memchr(quote, &bytes[at + 1..])?;
                    pos = at + 1 + close + 1;
                }
            }
        }
        None
    }

    /// Read an XML name at the current position
    pub fn read_name(&mut self) -> Option<&'a str> {
        let start = self.pos;
        let end = name_end(self.input, start);
        if end == start {
            return None;
        }
        self.pos = end;
        Some(&self.input[start..end])
    }
}

/// Byte offset where the name beginning at `start` ends (`start` if none)
pub fn name_end(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    match bytes.get(start) {
        Some(&b) if is_name_start_char(b) => {}
        _ => return start,
    }
    let mut pos = start + 1;
    while pos < bytes.len() && is_name_char(bytes[pos]) {
        pos += 1;
    }
    pos
}

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Check if a string is entirely XML whitespace
#[inline]
pub fn is_all_whitespace(text: &str) -> bool {
    text.bytes().all(is_whitespace)
}

/// Check if byte is valid XML name start character
/// Allows ASCII letters, underscore, colon, and non-ASCII (UTF-8 Unicode)
#[inline]
fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

/// Check if byte is valid XML name character
#[inline]
fn is_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b':') || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_text() {
        let mut scanner = Scanner::new("hello <world>");
        assert_eq!(scanner.read_text(), "hello ");
        assert_eq!(scanner.position(), 6);
        assert!(scanner.starts_with("<world"));
    }

    #[test]
    fn test_read_tag_body_quoted() {
        let mut scanner = Scanner::new("a attr=\">test\" b='>'>content");
        assert_eq!(scanner.read_tag_body(), Some("a attr=\">test\" b='>'"));
        assert_eq!(scanner.remaining(), "content");
    }

    #[test]
    fn test_read_tag_body_unterminated() {
        let mut scanner = Scanner::new("a attr=\">");
        assert_eq!(scanner.read_tag_body(), None);
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn test_read_until() {
        let mut scanner = Scanner::new(" note -->rest");
        assert_eq!(scanner.read_until("-->"), Some(" note "));
        assert_eq!(scanner.remaining(), "rest");
        assert_eq!(scanner.read_until("-->"), None);
    }

    #[test]
    fn test_read_name() {
        let mut scanner = Scanner::new("p:element-name>");
        assert_eq!(scanner.read_name(), Some("p:element-name"));
        assert_eq!(scanner.position(), 14);
        assert_eq!(Scanner::new("1abc").read_name(), None);
    }

    #[test]
    fn test_skip_whitespace() {
        let mut scanner = Scanner::new("  \t\n hello");
        scanner.skip_whitespace();
        assert_eq!(scanner.position(), 5);
        assert!(is_all_whitespace(" \r\n"));
        assert!(!is_all_whitespace(" x"));
    }
}
