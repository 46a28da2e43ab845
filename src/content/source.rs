use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use super::{is_markup_name, Document, Element, NodeId, FALLBACK_TAG};

/// Serialized content tree as handed over by the page-integration side
///
/// ```json
/// {"type": "element", "tag": "p", "children": [{"type": "text", "text": "猫が"}]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceNode {
    Text {
        text: String,
    },
    Element {
        tag: String,
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<SourceNode>,
    },
}

impl SourceNode {
    pub fn text(text: impl Into<String>) -> Self {
        SourceNode::Text { text: text.into() }
    }

    pub fn element(tag: impl Into<String>, children: Vec<SourceNode>) -> Self {
        SourceNode::Element {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children,
        }
    }

    /// Builder-style attribute setter; ignored on text nodes
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let SourceNode::Element { attrs, .. } = &mut self {
            attrs.insert(name.into(), value.into());
        }
        self
    }
}

impl Document {
    /// Build a document from a serialized tree
    ///
    /// A bare text root is wrapped in a `<div>` so the document always has an element root.
    pub fn from_source(source: &SourceNode) -> Self {
        match source {
            SourceNode::Element { tag, attrs, children } => {
                let mut doc = Document::new(to_element(tag, attrs));
                let root = doc.root();
                for child in children {
                    doc.build_from_source(root, child);
                }
                doc
            }
            SourceNode::Text { .. } => {
                let mut doc = Document::new(Element::new("div"));
                let root = doc.root();
                doc.build_from_source(root, source);
                doc
            }
        }
    }

    fn build_from_source(&mut self, parent: NodeId, source: &SourceNode) {
        match source {
            SourceNode::Text { text } => {
                self.append_new_text(parent, text.as_str());
            }
            SourceNode::Element { tag, attrs, children } => {
                let id = self.append_new_element(parent, to_element(tag, attrs));
                for child in children {
                    self.build_from_source(id, child);
                }
            }
        }
    }
}

/// Convert a serialized element, replacing an invalid tag name and dropping invalid attribute names
fn to_element(tag: &str, attrs: &BTreeMap<String, String>) -> Element {
    let mut element = if is_markup_name(tag) {
        Element::new(tag)
    } else {
        warn!("Invalid tag name {:?} replaced with <{}>", tag, FALLBACK_TAG);
        Element::new(FALLBACK_TAG)
    };
    for (name, value) in attrs {
        if is_markup_name(name) {
            element.set_attr(name.as_str(), value.as_str());
        } else {
            warn!("Dropping invalid attribute name {:?} on <{}>", name, element.tag);
        }
    }
    element
}
