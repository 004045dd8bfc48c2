//! Minimal owned XML document model with quick-xml based reading and writing.

mod node;
mod reader;
mod writer;

pub use node::{Attribute, Element, Node};
pub use reader::{parse_document, read_document};
pub use writer::{to_xml_bytes, write_document};

/// A parsed XML document. Only the root element is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }
}
