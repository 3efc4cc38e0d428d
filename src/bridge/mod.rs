//! Adapters between the three event models
//!
//! ```text
//! tree   ── DomToSax ────┐
//! cursor ── StreamToSax ─┼──> ContentHandler ── SaxToDom ──> tree
//! reader ── EventToSax ──┘
//! ```
//!
//! Each adapter borrows its handler for its own lifetime and owns its
//! per-traversal state. Nothing is shared between instances.

pub mod dom_to_sax;
pub mod event_to_sax;
pub mod sax_to_dom;
pub mod stream_to_sax;

pub use dom_to_sax::DomToSax;
pub use event_to_sax::EventToSax;
pub use sax_to_dom::SaxToDom;
pub use stream_to_sax::StreamToSax;
