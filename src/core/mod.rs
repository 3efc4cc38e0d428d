//! Core XML text primitives
//!
//! The building blocks of the text cursor:
//! - Scanner: delimiter detection using memchr
//! - Entities: reference decoding and output escaping with Cow (zero-copy when possible)
//! - Attributes: attribute parsing for start tags and the XML declaration

pub mod attributes;
pub mod entities;
pub mod scanner;
