//! Chapter document parsing (quick-xml event stream to owned tree).

use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use super::{Attribute, Document, Element, Node};
use crate::error::{Error, Result};
use crate::util::decode_chapter;

/// Read, decode and parse a chapter file.
pub fn read_document(path: &Path) -> Result<Document> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let content = decode_chapter(&bytes);
    parse_document(&content, path)
}

/// Parse an XML document held in memory.
///
/// `path` is only used to label errors. The prolog (declaration, doctype,
/// comments before the root) is dropped.
pub fn parse_document(content: &str, path: &Path) -> Result<Document> {
    let mut reader = Reader::from_str(content);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|source| Error::Xml {
            path: path.to_path_buf(),
            source,
        })?;

        match event {
            Event::Start(e) => {
                if root.is_some() && stack.is_empty() {
                    return Err(Error::malformed(path, "multiple root elements"));
                }
                stack.push(element_from_start(&e, path)?);
            }
            Event::Empty(e) => {
                let element = element_from_start(&e, path)?;
                attach(&mut stack, &mut root, Node::Element(element), path)?;
            }
            Event::End(_) => {
                // quick-xml has already checked that the end name matches
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::malformed(path, "unexpected end tag"))?;
                attach(&mut stack, &mut root, Node::Element(element), path)?;
            }
            Event::Text(e) => {
                let raw = String::from_utf8_lossy(e.as_ref());
                let text = unescape(&raw).map_err(|e| Error::malformed(path, e.to_string()))?;
                push_text(&mut stack, &text, path)?;
            }
            Event::GeneralRef(e) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                let resolved = resolve_entity(&entity).ok_or_else(|| {
                    Error::malformed(path, format!("undefined entity &{entity};"))
                })?;
                push_text(&mut stack, &resolved, path)?;
            }
            Event::CData(e) => {
                if let Some(parent) = stack.last_mut() {
                    let data = String::from_utf8_lossy(e.as_ref()).into_owned();
                    parent.children.push(Node::CData(data));
                }
            }
            Event::Comment(e) => {
                if let Some(parent) = stack.last_mut() {
                    let comment = String::from_utf8_lossy(e.as_ref()).into_owned();
                    parent.children.push(Node::Comment(comment));
                }
            }
            Event::PI(e) => {
                if let Some(parent) = stack.last_mut() {
                    let pi = String::from_utf8_lossy(e.as_ref()).into_owned();
                    parent.children.push(Node::ProcessingInstruction(pi));
                }
            }
            Event::Eof => break,
            // Declaration and doctype are not carried into the tree
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::malformed(
            path,
            format!("unclosed element <{}>", open.name),
        ));
    }

    root.map(|root| Document { root })
        .ok_or_else(|| Error::malformed(path, "no root element"))
}

fn element_from_start(start: &BytesStart<'_>, path: &Path) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw)
            .map_err(|e| Error::malformed(path, format!("attribute {key}: {e}")))?
            .into_owned();
        attrs.push(Attribute { name: key, value });
    }

    Ok(Element {
        name,
        attrs,
        children: Vec::new(),
    })
}

/// Attach a finished node to the open parent, or make it the root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    node: Node,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }

    match node {
        Node::Element(element) if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        Node::Element(_) => Err(Error::malformed(path, "multiple root elements")),
        _ => Ok(()),
    }
}

/// Append character data, merging with a preceding text node.
fn push_text(stack: &mut [Element], text: &str, path: &Path) -> Result<()> {
    let Some(parent) = stack.last_mut() else {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(Error::malformed(path, "text outside the root element"));
    };

    match parent.children.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(text),
        _ => parent.children.push(Node::Text(text.to_string())),
    }
    Ok(())
}

/// Resolve predefined XML entities and numeric character references.
fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}
