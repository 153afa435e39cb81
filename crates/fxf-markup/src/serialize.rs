//! Markup serialization
//!
//! Emits canonical text: attributes in stored order with `"` quoting,
//! markup-significant characters escaped, one header node per line,
//! self-closing tags for childless elements. An unmodified parsed tree in
//! canonical form round-trips byte for byte.

use std::borrow::Cow;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;

use crate::document::XmlDocument;
use crate::node::XmlData;
use crate::tree::XmlTree;
use crate::XmlId;

const INDENT: &str = "   ";

/// Serialize a document to markup text. An empty document yields `""`.
pub fn serialize(doc: &XmlDocument) -> String {
    let mut writer = Writer::new(Vec::new());
    for &id in doc.header() {
        write_node(doc.tree(), id, &mut writer);
        write_raw(&mut writer, "\n");
    }
    if let Some(root) = doc.root() {
        write_node(doc.tree(), root, &mut writer);
        write_raw(&mut writer, "\n");
    }
    for &id in doc.trailer() {
        write_node(doc.tree(), id, &mut writer);
        write_raw(&mut writer, "\n");
    }
    String::from_utf8(writer.into_inner()).expect("serializer emits UTF-8")
}

fn write_node(tree: &XmlTree, id: XmlId, writer: &mut Writer<Vec<u8>>) {
    let Some(node) = tree.get(id) else { return };
    match node.data() {
        XmlData::Element(element) => {
            let mut start = BytesStart::new(element.name.as_str());
            for (key, value) in element.attributes() {
                start.push_attribute(Attribute {
                    key: QName(key.as_bytes()),
                    value: Cow::Owned(escape_attribute(value).into_owned().into_bytes()),
                });
            }
            if element.children().is_empty() {
                write_event(writer, Event::Empty(start));
            } else {
                write_event(writer, Event::Start(start));
                for &child in element.children() {
                    write_node(tree, child, writer);
                }
                write_event(writer, Event::End(BytesEnd::new(element.name.as_str())));
            }
        }
        XmlData::Text(text) => {
            let escaped = escape_text(text);
            write_event(writer, Event::Text(BytesText::from_escaped(escaped)));
        }
        XmlData::Comment(comment) => {
            write_event(writer, Event::Comment(BytesText::from_escaped(comment.as_str())));
        }
        XmlData::ProcessingInstruction { target, data } => {
            let content = if data.is_empty() {
                target.clone()
            } else {
                format!("{target} {data}")
            };
            write_event(writer, Event::PI(BytesPI::new(content.as_str())));
        }
    }
}

fn write_raw(writer: &mut Writer<Vec<u8>>, text: &str) {
    write_event(writer, Event::Text(BytesText::from_escaped(text)));
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) {
    writer.write_event(event).expect("in-memory write");
}

/// Escape `&`, `<`, `>` in text content
fn escape_text(text: &str) -> Cow<'_, str> {
    escape_with(text, false)
}

/// Escape `&`, `<`, `>`, `"` in attribute values
fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape_with(value, true)
}

fn escape_with(text: &str, quotes: bool) -> Cow<'_, str> {
    let needs = text
        .bytes()
        .any(|b| b == b'&' || b == b'<' || b == b'>' || (quotes && b == b'"'));
    if !needs {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if quotes => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Rewrite inter-element whitespace so every element child sits on its own
/// line, indented three spaces per depth. Mixed content (elements alongside
/// non-whitespace text) is left untouched. Explicit opt-in before a save.
pub fn normalize_indentation(doc: &mut XmlDocument) {
    if let Some(root) = doc.root() {
        normalize_element(doc.tree_mut(), root, 0);
    }
}

fn normalize_element(tree: &mut XmlTree, element: XmlId, depth: usize) {
    let children = tree.children(element).to_vec();
    let mut has_structured_child = false;
    let mut has_significant_text = false;
    for &child in &children {
        match tree.get(child).map(|n| n.data()) {
            Some(XmlData::Text(t)) if !t.trim().is_empty() => has_significant_text = true,
            Some(XmlData::Text(_)) => {}
            Some(_) => has_structured_child = true,
            None => {}
        }
    }

    if has_structured_child && !has_significant_text {
        for &child in &children {
            if matches!(tree.get(child).map(|n| n.data()), Some(XmlData::Text(_))) {
                let _ = tree.detach(child);
            }
        }
        let kept = tree.children(element).to_vec();
        let mut position = 0;
        for child in kept {
            let lead = tree.create_text(format!("\n{}", INDENT.repeat(depth + 1)));
            let _ = tree.insert_child(element, position, lead);
            position += 2;
            if tree.get(child).is_some_and(|n| n.is_element()) {
                normalize_element(tree, child, depth + 1);
            }
        }
        let tail = tree.create_text(format!("\n{}", INDENT.repeat(depth)));
        let _ = tree.append_child(element, tail);
    } else {
        for &child in &children {
            if tree.get(child).is_some_and(|n| n.is_element()) {
                normalize_element(tree, child, depth + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_round_trip_canonical_text() {
        let text = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<?import forge.controls.Button?>\n<Button text=\"Go\"/>\n";
        let doc = parse(text).unwrap();
        assert_eq!(serialize(&doc), text);
    }

    #[test]
    fn test_round_trip_nested_whitespace() {
        let text = "<a>\n   <b c=\"1\"/>\n   <d>hello</d>\n</a>\n";
        let doc = parse(text).unwrap();
        assert_eq!(serialize(&doc), text);
    }

    #[test]
    fn test_escaping() {
        let text = "<a t=\"x &lt; y &quot;q&quot;\">1 &amp; 2</a>\n";
        let doc = parse(text).unwrap();
        assert_eq!(serialize(&doc), text);
    }

    #[test]
    fn test_empty_document_serializes_empty() {
        let doc = parse("").unwrap();
        assert_eq!(serialize(&doc), "");
    }

    #[test]
    fn test_normalize_indentation() {
        let mut doc = parse("<a><b><c/></b></a>").unwrap();
        normalize_indentation(&mut doc);
        assert_eq!(
            serialize(&doc),
            "<a>\n   <b>\n      <c/>\n   </b>\n</a>\n"
        );
    }

    #[test]
    fn test_normalize_leaves_mixed_content() {
        let mut doc = parse("<a>text <b/> tail</a>").unwrap();
        normalize_indentation(&mut doc);
        assert_eq!(serialize(&doc), "<a>text <b/> tail</a>\n");
    }

    #[test]
    fn test_normalize_is_stable() {
        let mut doc = parse("<a><b/><c/></a>").unwrap();
        normalize_indentation(&mut doc);
        let once = serialize(&doc);
        let mut doc2 = parse(&once).unwrap();
        normalize_indentation(&mut doc2);
        assert_eq!(serialize(&doc2), once);
    }
}
