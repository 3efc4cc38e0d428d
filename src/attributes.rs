//! Attribute lists
//!
//! The same [`Attribute`] type travels through pull cursors and push events.
//! [`Attributes`] is the ordered list handed to `start_element`.

use crate::name::QName;

/// A single attribute with its resolved name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
    /// Declared as an ID attribute
    pub is_id: bool,
}

impl Attribute {
    pub fn new(name: QName, value: impl Into<String>) -> Self {
        Attribute {
            name,
            value: value.into(),
            is_id: false,
        }
    }

    /// Mark this attribute as an ID
    pub fn with_id(mut self, is_id: bool) -> Self {
        self.is_id = is_id;
        self
    }

    /// SAX attribute type string
    pub fn attr_type(&self) -> &'static str {
        if self.is_id {
            "ID"
        } else {
            "CDATA"
        }
    }

    /// True for `xmlns` and `xmlns:*` declarations
    pub fn is_namespace_declaration(&self) -> bool {
        is_namespace_declaration(&self.name.qualified())
    }
}

/// True for `xmlns` and `xmlns:*` lexical names
#[inline]
pub fn is_namespace_declaration(qualified_name: &str) -> bool {
    qualified_name == "xmlns" || qualified_name.starts_with("xmlns:")
}

/// Ordered attribute list for a start-element event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Attributes { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Attributes {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, attribute: Attribute) {
        self.items.push(attribute);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Attribute> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Attribute] {
        &self.items
    }

    /// Value by lexical name
    pub fn value(&self, qualified_name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|a| a.name.qualified() == qualified_name)
            .map(|a| a.value.as_str())
    }

    /// Index by expanded name
    pub fn index_of(&self, uri: &str, local_name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|a| a.name.uri() == uri && a.name.local_name == local_name)
    }

    pub fn into_vec(self) -> Vec<Attribute> {
        self.items
    }
}

impl From<Vec<Attribute>> for Attributes {
    fn from(items: Vec<Attribute>) -> Self {
        Attributes { items }
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<T: IntoIterator<Item = Attribute>>(iter: T) -> Self {
        Attributes {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
