// WHY: The only place where document text becomes markup
// Text and attribute values are always escaped here, so no caller can interpolate raw source text
// Tag and attribute names are not escapable and are checked against `is_markup_name` instead

use quick_xml::escape::{escape, partial_escape};

use super::{is_markup_name, Document, Element, NodeData, NodeId};
use crate::parse_result::FuriganaPart;

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Written in place of a tag name that is not a valid markup name
pub const FALLBACK_TAG: &str = "span";

/// Serialize `id` and its subtree as HTML
pub fn to_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

/// Serialize only the children of `id`
pub fn to_inner_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    for child in doc.children(id) {
        write_node(doc, *child, &mut out);
    }
    out
}

/// Render furigana parts as ruby markup, e.g.
/// `<ruby><rb>食べ</rb><rt>たべ</rt></ruby>` for a reading pair and escaped text otherwise
pub fn furigana_to_ruby(parts: &[FuriganaPart]) -> String {
    let mut scratch = Document::new(Element::new("span"));
    let root = scratch.root();
    scratch.append_furigana(root, parts);
    to_inner_html(&scratch, root)
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    let Some(node) = doc.node(id) else {
        return;
    };

    match &node.data {
        NodeData::Text(text) => out.push_str(&partial_escape(text.as_str())),
        NodeData::Element(element) => {
            let tag = tag_name(element);
            write_open_tag(tag, element, out);
            if VOID_ELEMENTS.iter().any(|void| tag.eq_ignore_ascii_case(void)) {
                return;
            }
            for child in node.children() {
                write_node(doc, *child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn tag_name(element: &Element) -> &str {
    if is_markup_name(&element.tag) {
        &element.tag
    } else {
        FALLBACK_TAG
    }
}

fn write_open_tag(tag: &str, element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in element.attrs.iter().filter(|(name, _)| is_markup_name(name)) {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
    out.push('>');
}
