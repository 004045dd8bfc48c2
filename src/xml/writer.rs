//! Serialization of the merged document.

use std::path::Path;

use quick_xml::escape::escape;

use super::{Document, Element, Node};
use crate::error::{Error, Result};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Serialize a document to UTF-8 bytes.
///
/// The declaration is followed directly by the root element; no whitespace
/// is added anywhere else.
pub fn to_xml_bytes(doc: &Document) -> Vec<u8> {
    let mut out = String::from(XML_DECLARATION);
    write_element(&doc.root, &mut out);
    out.into_bytes()
}

/// Serialize a document and write it verbatim to `path`.
pub fn write_document(doc: &Document, path: &Path) -> Result<()> {
    std::fs::write(path, to_xml_bytes(doc)).map_err(|e| Error::io(path, e))
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attrs {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&escape(attr.value.as_str()));
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(e) => write_element(e, out),
        Node::Text(text) => out.push_str(&escape(text.as_str())),
        Node::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        Node::ProcessingInstruction(pi) => {
            out.push_str("<?");
            out.push_str(pi);
            out.push_str("?>");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::xml::{parse_document, Attribute};

    fn serialize(root: Element) -> String {
        String::from_utf8(to_xml_bytes(&Document { root })).unwrap()
    }

    #[test]
    fn test_declaration_and_empty_elements() {
        let root = Element::new("doc")
            .with_child(Element::new("characters"))
            .with_child(Node::text("\n"))
            .with_child(Element::new("text"));
        assert_eq!(
            serialize(root),
            "<?xml version=\"1.0\" encoding=\"utf-8\"?><doc><characters/>\n<text/></doc>"
        );
    }

    #[test]
    fn test_escaping() {
        let root = Element {
            name: "quote".to_string(),
            attrs: vec![Attribute::new("speaker", "\"Tom\" & <Jerry>")],
            children: vec![Node::text("a < b & c")],
        };
        let xml = serialize(root);
        assert!(xml.contains(r#"speaker="&quot;Tom&quot; &amp; &lt;Jerry&gt;""#), "{xml}");
        assert!(xml.contains("a &lt; b &amp; c"), "{xml}");
    }

    #[test]
    fn test_reparse_preserves_tree() {
        let source = r#"<doc><text id="t">He said <quote id="q3" connection="m1,m2">&quot;no&quot;</quote><!--x--><![CDATA[<raw>]]></text></doc>"#;
        let doc = parse_document(source, Path::new("in.xml")).unwrap();
        let xml = String::from_utf8(to_xml_bytes(&doc)).unwrap();
        let reparsed = parse_document(&xml, Path::new("out.xml")).unwrap();
        assert_eq!(reparsed, doc);
    }
}
