//! Markup parsing
//!
//! quick-xml event loop building the arena tree. Whitespace text runs inside
//! the root element are kept as-is so an unmodified tree serializes back to
//! the same text.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::XmlDocument;
use crate::{MarkupError, MarkupResult, XmlId};

/// Parse markup text into a document.
///
/// `parse("")` succeeds and yields a document with no root. A second root
/// element or non-whitespace text outside the root is a parse failure.
pub fn parse(text: &str) -> MarkupResult<XmlDocument> {
    let mut reader = Reader::from_str(text);
    let mut doc = XmlDocument::new();
    let mut stack: Vec<XmlId> = Vec::new();

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(MarkupError::Parse {
                    position: reader.error_position(),
                    message: e.to_string(),
                    source: Some(e),
                });
            }
        };
        match event {
            Event::Decl(_) => {
                // Canonicalized; the dialect always carries the same declaration.
                let pi = doc
                    .tree_mut()
                    .create_pi("xml", "version=\"1.0\" encoding=\"UTF-8\"");
                doc.push_header_node(pi);
            }
            Event::PI(pi) => {
                let target = String::from_utf8_lossy(pi.target()).into_owned();
                let data = String::from_utf8_lossy(pi.content()).trim().to_string();
                let id = doc.tree_mut().create_pi(target, data);
                attach_misc(&mut doc, &stack, id)?;
            }
            Event::Comment(c) => {
                let content = String::from_utf8_lossy(&c).into_owned();
                let id = doc.tree_mut().create_comment(content);
                attach_misc(&mut doc, &stack, id)?;
            }
            Event::Start(start) => {
                let id = open_element(&mut doc, &mut reader, &stack, &start)?;
                stack.push(id);
            }
            Event::Empty(start) => {
                open_element(&mut doc, &mut reader, &stack, &start)?;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(t) => {
                let content = t
                    .unescape()
                    .map_err(|e| text_error(&reader, e.to_string()))?
                    .into_owned();
                append_text(&mut doc, &stack, content)?;
            }
            Event::CData(c) => {
                let content = String::from_utf8_lossy(&c).into_owned();
                append_text(&mut doc, &stack, content)?;
            }
            Event::DocType(_) => {
                return Err(text_error(&reader, "doctype is not part of the dialect"));
            }
            Event::Eof => break,
        }
    }

    if !stack.is_empty() {
        return Err(MarkupError::Parse {
            position: reader.buffer_position(),
            message: "unterminated element".to_string(),
            source: None,
        });
    }

    tracing::debug!(nodes = doc.tree().len(), "parsed markup document");
    Ok(doc)
}

fn open_element(
    doc: &mut XmlDocument,
    reader: &mut Reader<&[u8]>,
    stack: &[XmlId],
    start: &BytesStart<'_>,
) -> MarkupResult<XmlId> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let id = doc.tree_mut().create_element(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| text_error(reader, format!("bad attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| text_error(reader, format!("bad attribute value: {e}")))?
            .into_owned();
        let element = doc.tree_mut().element_mut(id).ok_or(MarkupError::NotAnElement)?;
        element.set_attribute(key, value);
    }

    match stack.last() {
        Some(&parent) => doc.tree_mut().append_child(parent, id)?,
        None => {
            if doc.root().is_some() {
                return Err(MarkupError::MultipleRoots);
            }
            doc.set_root(Some(id));
        }
    }
    Ok(id)
}

fn append_text(doc: &mut XmlDocument, stack: &[XmlId], content: String) -> MarkupResult<()> {
    match stack.last() {
        Some(&parent) => {
            let id = doc.tree_mut().create_text(content);
            doc.tree_mut().append_child(parent, id)
        }
        // Whitespace between header directives is canonicalized away.
        None if content.trim().is_empty() => Ok(()),
        None => Err(MarkupError::TextOutsideRoot),
    }
}

fn attach_misc(doc: &mut XmlDocument, stack: &[XmlId], id: XmlId) -> MarkupResult<()> {
    match stack.last() {
        Some(&parent) => doc.tree_mut().append_child(parent, id),
        None if doc.root().is_none() => {
            doc.push_header_node(id);
            Ok(())
        }
        None => {
            doc.push_trailer_node(id);
            Ok(())
        }
    }
}

fn text_error(reader: &Reader<&[u8]>, message: impl Into<String>) -> MarkupError {
    MarkupError::Parse {
        position: reader.buffer_position(),
        message: message.into(),
        source: None,
    }
}
