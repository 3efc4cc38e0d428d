//! Qualified names
//!
//! A [`QName`] carries the namespace URI, local part and prefix separately so
//! that every adapter can hand the `(uri, local, qname)` triple to a content
//! handler without re-splitting strings.

use memchr::memrchr;

/// A namespace-qualified XML name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QName {
    /// Namespace URI, `None` when the name is in no namespace
    pub namespace_uri: Option<String>,
    /// Local part (after the colon)
    pub local_name: String,
    /// Prefix (before the colon), `None` for unprefixed names
    pub prefix: Option<String>,
}

impl QName {
    /// An unprefixed name in no namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        QName {
            namespace_uri: None,
            local_name: local_name.into(),
            prefix: None,
        }
    }

    /// Build a name from a namespace URI and a lexical `prefix:local` name.
    /// An empty URI is treated as no namespace.
    pub fn new(namespace_uri: Option<&str>, qualified_name: &str) -> Self {
        let (prefix, local_name) = split_name(qualified_name);
        QName {
            namespace_uri: namespace_uri.filter(|u| !u.is_empty()).map(str::to_string),
            local_name: local_name.to_string(),
            prefix: prefix.map(str::to_string),
        }
    }

    /// Namespace URI, or `""` when absent
    pub fn uri(&self) -> &str {
        self.namespace_uri.as_deref().unwrap_or("")
    }

    /// Prefix, or `""` when absent
    pub fn prefix_str(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }

    /// The lexical `prefix:local` form
    pub fn qualified(&self) -> String {
        match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, self.local_name),
            _ => self.local_name.clone(),
        }
    }

    /// True when both names refer to the same expanded name
    pub fn matches(&self, other: &QName) -> bool {
        self.uri() == other.uri() && self.local_name == other.local_name
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => write!(f, "{}:{}", prefix, self.local_name),
            _ => f.write_str(&self.local_name),
        }
    }
}

/// Split a name into prefix and local part at the last colon.
///
/// A leading colon does not start a prefix, so `":a"` has no prefix.
pub fn split_name(name: &str) -> (Option<&str>, &str) {
    match memrchr(b':', name.as_bytes()) {
        Some(pos) if pos > 0 => (Some(&name[..pos]), &name[pos + 1..]),
        _ => (None, name),
    }
}

/// Local part of a lexical name
#[inline]
pub fn local_part(name: &str) -> &str {
    split_name(name).1
}

/// Prefix of a lexical name, `""` if unprefixed
#[inline]
pub fn prefix_part(name: &str) -> &str {
    split_name(name).0.unwrap_or("")
}
