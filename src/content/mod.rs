// WHY: Arena-backed content tree standing in for the page DOM
// Node identity is a stable index so a replaced node can be re-parented instead of copied

use serde::{Deserialize, Serialize};

use crate::error::AlignError;
use crate::parse_result::FuriganaPart;

pub mod render;
pub mod source;

pub use render::{furigana_to_ruby, to_html, to_inner_html, FALLBACK_TAG};
pub use source::SourceNode;

/// Handle to a node inside a [`Document`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// An element with its tag name and attributes in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, overwriting an existing value of the same name
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Tag comparison is ASCII case-insensitive, like HTML
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }
}

/// Content tree with one root. Detached nodes stay in the arena until the document is dropped.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Create a document whose root is `root`
    pub fn new(root: Element) -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element(root),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0).map(|node| &mut node.data) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Children of `id`, empty for text nodes and unknown ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeData::Element(element))
    }

    /// Create a text node as the last child of `parent`
    ///
    /// The node is left detached if `parent` does not belong to this document.
    pub fn append_new_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.push_under(parent, NodeData::Text(text.into()))
    }

    /// Create an element as the last child of `parent`
    ///
    /// The node is left detached if `parent` does not belong to this document.
    pub fn append_new_element(&mut self, parent: NodeId, element: Element) -> NodeId {
        self.push_under(parent, NodeData::Element(element))
    }

    fn push_under(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.push(data);
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(id);
            self.nodes[id.0].parent = Some(parent);
        }
        id
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn check(&self, id: NodeId) -> Result<(), AlignError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(AlignError::UnknownNode(id))
        }
    }

    /// Remove `id` from its parent's child list. No-op for already detached nodes.
    pub fn detach(&mut self, id: NodeId) -> Result<(), AlignError> {
        self.check(id)?;
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != id);
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if it is attached elsewhere
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), AlignError> {
        self.check(parent)?;
        self.detach(child)?;
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Put `replacement` at the position `original` occupies; `original` ends up detached
    pub fn replace_node(&mut self, original: NodeId, replacement: NodeId) -> Result<(), AlignError> {
        self.check(original)?;
        self.check(replacement)?;
        let parent = self.nodes[original.0]
            .parent
            .ok_or(AlignError::DetachedNode(original))?;

        self.detach(replacement)?;
        let slot = self.nodes[parent.0]
            .children
            .iter()
            .position(|child| *child == original)
            .ok_or(AlignError::DetachedNode(original))?;

        self.nodes[parent.0].children[slot] = replacement;
        self.nodes[replacement.0].parent = Some(parent);
        self.nodes[original.0].parent = None;
        Ok(())
    }

    /// Concatenated text of `id` and all of its descendants, in document order
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(_) => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// True when walking parents from `id` reaches the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Append furigana parts under `parent`: `<ruby><rb>base</rb><rt>reading</rt></ruby>` for
    /// each reading pair and a bare text node for each plain part
    pub fn append_furigana(&mut self, parent: NodeId, parts: &[FuriganaPart]) {
        for part in parts {
            match part {
                FuriganaPart::Plain(text) => {
                    self.append_new_text(parent, text.as_str());
                }
                FuriganaPart::Ruby(base, reading) => {
                    let ruby = self.append_new_element(parent, Element::new("ruby"));
                    let rb = self.append_new_element(ruby, Element::new("rb"));
                    self.append_new_text(rb, base.as_str());
                    let rt = self.append_new_element(ruby, Element::new("rt"));
                    self.append_new_text(rt, reading.as_str());
                }
            }
        }
    }
}

/// True for names that are safe to write as a tag or attribute name: `[A-Za-z][A-Za-z0-9:_-]*`
pub fn is_markup_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-'))
}

/// Reduce an arbitrary tag (e.g. a card state) to a safe class token: `[A-Za-z0-9_-]` only
pub fn class_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}
