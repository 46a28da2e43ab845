// WHY: Linearizes a content subtree into text fragments positioned in one flat UTF-16 space
// The aligner only ever sees this flat view, never the nesting

use tracing::debug;

use crate::content::{Document, NodeData, NodeId};
use crate::offset::utf16_len;
use crate::parse_result::{spelling_of, FuriganaPart};

/// Attribute marking a spoiler label that is not part of the logical text
pub const SPOILER_LABEL_ATTR: &str = "data-ttu-spoiler-img";

/// One contiguous run of original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    /// Node the text came from; this is what gets replaced
    pub node: NodeId,
    pub text: String,
    /// UTF-16 length of `text`
    pub length: usize,
    /// Start in the shared offset space
    pub offset: usize,
    /// Set for ruby groups; `text` is then the concatenated bases
    pub furigana: Option<Vec<FuriganaPart>>,
}

impl TextFragment {
    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn is_ruby(&self) -> bool {
        self.furigana.is_some()
    }
}

/// Result of one extraction pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub fragments: Vec<TextFragment>,
    /// Total UTF-16 length covered by `fragments`
    pub consumed: usize,
}

/// How a node takes part in the flattened text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentUnit<'a> {
    TextRun(&'a str),
    RubyGroup(Vec<FuriganaPart>),
    SkippedLabel,
    Container(&'a [NodeId]),
}

/// Classify a node. Unknown ids classify as an empty container.
pub fn classify(doc: &Document, id: NodeId) -> ContentUnit<'_> {
    let Some(node) = doc.node(id) else {
        return ContentUnit::Container(&[]);
    };

    match &node.data {
        NodeData::Text(text) => ContentUnit::TextRun(text),
        NodeData::Element(element) if element.has_attr(SPOILER_LABEL_ATTR) => {
            ContentUnit::SkippedLabel
        }
        NodeData::Element(element) if element.is("ruby") => {
            ContentUnit::RubyGroup(ruby_parts(doc, node.children()))
        }
        NodeData::Element(_) => ContentUnit::Container(node.children()),
    }
}

/// Pair up the bases and readings of a `<ruby>` element's children
///
/// Bases come from direct text children and `<rb>` elements, readings from `<rt>`.
/// Base `i` takes reading `i`; bases without a reading become plain parts.
fn ruby_parts(doc: &Document, children: &[NodeId]) -> Vec<FuriganaPart> {
    let mut bases = Vec::new();
    let mut readings = Vec::new();

    for child in children {
        match doc.node(*child).map(|node| &node.data) {
            Some(NodeData::Text(text)) => bases.push(text.clone()),
            Some(NodeData::Element(element)) if element.is("rb") => {
                bases.push(doc.text_content(*child))
            }
            Some(NodeData::Element(element)) if element.is("rt") => {
                readings.push(doc.text_content(*child))
            }
            // <rp> fallback parentheses and anything else carry no base text
            _ => {}
        }
    }

    let mut readings = readings.into_iter();
    bases
        .into_iter()
        .map(|base| match readings.next() {
            Some(reading) => FuriganaPart::Ruby(base, reading),
            None => FuriganaPart::Plain(base),
        })
        .collect()
}


/// Extract fragments from `nodes` (in order), starting at `offset`
pub fn extract_fragments(doc: &Document, nodes: &[NodeId], offset: usize) -> Extraction {
    let mut fragments = Vec::new();
    let end = extract_into(doc, nodes, offset, &mut fragments);

    debug!(
        "Extracted {} fragments covering offsets {}..{}",
        fragments.len(),
        offset,
        end
    );

    Extraction {
        fragments,
        consumed: end - offset,
    }
}

/// Extract fragments from all children of `id`, starting at offset 0
pub fn extract_children(doc: &Document, id: NodeId) -> Extraction {
    extract_fragments(doc, doc.children(id), 0)
}

fn extract_into(
    doc: &Document,
    nodes: &[NodeId],
    mut offset: usize,
    fragments: &mut Vec<TextFragment>,
) -> usize {
    for &node in nodes {
        match classify(doc, node) {
            ContentUnit::TextRun(text) => {
                let length = utf16_len(text);
                fragments.push(TextFragment {
                    node,
                    text: text.to_string(),
                    length,
                    offset,
                    furigana: None,
                });
                offset += length;
            }
            ContentUnit::RubyGroup(parts) => {
                let text = spelling_of(&parts);
                let length = utf16_len(&text);
                fragments.push(TextFragment {
                    node,
                    text,
                    length,
                    offset,
                    furigana: Some(parts),
                });
                offset += length;
            }
            ContentUnit::SkippedLabel => {}
            ContentUnit::Container(children) => {
                offset = extract_into(doc, children, offset, fragments);
            }
        }
    }
    offset
}
