use std::collections::HashMap;

use crate::content::NodeId;
use crate::parse_result::VocabularyEntry;
use crate::popup::{AnnotationDisplay, PopupContent};

use super::{AlignStats, Mutation};

/// Link from an annotated word node back to its token and vocabulary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub token_index: usize,
    pub vocabulary_index: usize,
}

/// Result of applying a parse: the mutations performed plus hover lookups for every word node
#[derive(Debug)]
pub struct Overlay<D> {
    display: D,
    vocab: Vec<VocabularyEntry>,
    bindings: HashMap<NodeId, Binding>,
    pub mutations: Vec<Mutation>,
    pub stats: AlignStats,
}

impl<D: AnnotationDisplay> Overlay<D> {
    pub(crate) fn new(display: D, vocab: Vec<VocabularyEntry>) -> Self {
        Self {
            display,
            vocab,
            bindings: HashMap::new(),
            mutations: Vec::new(),
            stats: AlignStats::default(),
        }
    }

    pub(crate) fn bind(&mut self, node: NodeId, binding: Binding) {
        self.bindings.insert(node, binding);
    }

    pub fn binding(&self, node: NodeId) -> Option<Binding> {
        self.bindings.get(&node).copied()
    }

    /// Vocabulary entry behind an annotated word node
    pub fn entry(&self, node: NodeId) -> Option<&VocabularyEntry> {
        self.binding(node)
            .and_then(|binding| self.vocab.get(binding.vocabulary_index))
    }

    /// Number of word nodes carrying a vocabulary binding
    pub fn bound_words(&self) -> usize {
        self.bindings.len()
    }

    /// Hover-in: show the popup for `node` if it is an annotated word
    pub fn pointer_enter(&mut self, node: NodeId) -> bool {
        let Some(entry) = self.entry(node) else {
            return false;
        };
        let content = PopupContent::from_entry(entry);
        self.display.show(node, &content);
        true
    }

    /// Hover-out: hide the popup when leaving an annotated word
    pub fn pointer_leave(&mut self, node: NodeId) -> bool {
        if !self.bindings.contains_key(&node) {
            return false;
        }
        self.display.hide();
        true
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn into_display(self) -> D {
        self.display
    }
}
