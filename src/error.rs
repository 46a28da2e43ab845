use thiserror::Error;

use crate::content::NodeId;

/// Input-contract violations detected before or during alignment.
///
/// Any of these aborts the pass. Validation runs before the first mutation, so
/// the document is left untouched when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlignError {
    #[error("token {index} starts at {position} before the previous token ends at {previous_end}")]
    TokenOutOfOrder {
        index: usize,
        position: usize,
        previous_end: usize,
    },
    #[error("token {index} starts at {position} before the text starts at {text_start}")]
    TokenBeforeText {
        index: usize,
        position: usize,
        text_start: usize,
    },
    #[error("token {index} ends at {end} past the end of the text at {text_end}")]
    TokenOutOfRange {
        index: usize,
        end: usize,
        text_end: usize,
    },
    #[error("fragment {index} starts at {found}, expected {expected}")]
    FragmentGap {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("fragment {index} declares length {declared} but its text is {actual} UTF-16 units")]
    FragmentLength {
        index: usize,
        declared: usize,
        actual: usize,
    },
    #[error("offset {offset} splits a UTF-16 surrogate pair")]
    SplitSurrogate { offset: usize },
    #[error("node {0:?} has no parent and cannot be replaced")]
    DetachedNode(NodeId),
    #[error("node {0:?} does not belong to this document")]
    UnknownNode(NodeId),
    #[error("node {0:?} is named by more than one fragment")]
    DuplicateNode(NodeId),
    #[error("fragment node {node:?} lies inside fragment node {ancestor:?}")]
    NestedNode { node: NodeId, ancestor: NodeId },
}
