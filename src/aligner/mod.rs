// WHY: Merges the fragment sequence with the tokenizer's token sequence and splices the result in
// Planning is pure and validates everything up front; mutation only starts once the plan is complete

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

use crate::content::{class_token, Document, Element, NodeId};
use crate::error::AlignError;
use crate::fragments::TextFragment;
use crate::offset::utf16_len;
use crate::parse_result::ParseResult;
use crate::popup::AnnotationDisplay;

pub mod cursor;
pub mod overlay;
pub mod pieces;

pub use cursor::{step, Action, Cursor, EmittedSpan, ReadingSource, SpanKind, Step, TokenPiece};
pub use overlay::{Binding, Overlay};
pub use pieces::restrict_parts;

pub const CONTAINER_CLASS: &str = "jpdb-parsed";
pub const WORD_CLASS: &str = "jpdb-word";
pub const UNPARSED_CLASS: &str = "unparsed";
pub const MISSING_VOCAB_CLASS: &str = "missing-vocab";
pub const WRAPPER_CLASS: &str = "jpdb-ttu-wrapper";

/// Text direction of the page, used to anchor retained originals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritingMode {
    /// Vertical text reads from the top right corner
    #[default]
    Vertical,
    Horizontal,
}

impl WritingMode {
    fn anchor_style(&self) -> &'static str {
        match self {
            WritingMode::Vertical => "position:absolute;top:0;right:0;visibility:hidden",
            WritingMode::Horizontal => "position:absolute;top:0;left:0;visibility:hidden",
        }
    }
}

/// Configuration for reconstruction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayConfig {
    /// Keep each replaced node alive, hidden inside its replacement, so external
    /// code that holds on to the original text nodes (bookmark scrolling) keeps working
    pub keep_original: bool,
    pub writing_mode: WritingMode,
}

/// Spans planned for one fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentPlan {
    pub fragment_index: usize,
    pub spans: Vec<EmittedSpan>,
}

impl FragmentPlan {
    /// Concatenated text of all spans
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// Full output of the sweep, one entry per fragment in fragment order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub fragments: Vec<FragmentPlan>,
}

impl Plan {
    pub fn spans(&self) -> impl Iterator<Item = &EmittedSpan> {
        self.fragments.iter().flat_map(|plan| plan.spans.iter())
    }

    /// Concatenated text of every span; equals the concatenated fragment text
    pub fn text(&self) -> String {
        self.spans().map(|span| span.text.as_str()).collect()
    }
}

/// One swap performed on the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Replace {
        fragment_index: usize,
        original: NodeId,
        replacement: NodeId,
        /// The original now lives hidden inside the replacement
        retained: bool,
    },
}

/// Counters for one alignment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignStats {
    pub fragments: usize,
    pub tokens: usize,
    /// Distinct tokens rendered as annotated words
    pub words: usize,
    /// Unparsed spans
    pub unparsed: usize,
    /// Tokens cut by at least one fragment boundary
    pub split_tokens: usize,
    /// Distinct tokens whose vocabulary entry is missing
    pub missing_vocab: usize,
}

/// Check that fragments are contiguous and their declared lengths match their text
fn validate_fragments(fragments: &[TextFragment]) -> Result<(), AlignError> {
    let mut expected = fragments.first().map(|f| f.offset).unwrap_or(0);

    for (index, fragment) in fragments.iter().enumerate() {
        if fragment.offset != expected {
            return Err(AlignError::FragmentGap {
                index,
                expected,
                found: fragment.offset,
            });
        }
        let actual = utf16_len(&fragment.text);
        if actual != fragment.length {
            return Err(AlignError::FragmentLength {
                index,
                declared: fragment.length,
                actual,
            });
        }
        expected = fragment.end();
    }

    Ok(())
}

/// Check that every fragment node can be replaced independently of the others:
/// it exists, is attached to a parent, is named once and does not lie inside another fragment node
fn validate_nodes(doc: &Document, fragments: &[TextFragment]) -> Result<(), AlignError> {
    let mut nodes = HashSet::with_capacity(fragments.len());

    for fragment in fragments {
        if doc.node(fragment.node).is_none() {
            return Err(AlignError::UnknownNode(fragment.node));
        }
        if doc.parent(fragment.node).is_none() {
            return Err(AlignError::DetachedNode(fragment.node));
        }
        if !nodes.insert(fragment.node) {
            return Err(AlignError::DuplicateNode(fragment.node));
        }
    }

    for fragment in fragments {
        let mut ancestor = doc.parent(fragment.node);
        while let Some(id) = ancestor {
            if nodes.contains(&id) {
                return Err(AlignError::NestedNode {
                    node: fragment.node,
                    ancestor: id,
                });
            }
            ancestor = doc.parent(id);
        }
    }

    Ok(())
}

/// Distinct tokens seen while building spans; split pieces count once
#[derive(Default)]
struct TokenTally {
    words: BTreeSet<usize>,
    split: BTreeSet<usize>,
    missing: BTreeSet<usize>,
}

/// Run the sweep over `fragments` and `result.tokens` without touching any document
pub fn plan(fragments: &[TextFragment], result: &ParseResult) -> Result<Plan, AlignError> {
    validate_fragments(fragments)?;
    let text_start = fragments.first().map(|f| f.offset).unwrap_or(0);
    let text_end = fragments.last().map(|f| f.end()).unwrap_or(text_start);
    result.validate(text_start, text_end)?;

    let mut plans: Vec<FragmentPlan> = (0..fragments.len())
        .map(|fragment_index| FragmentPlan {
            fragment_index,
            spans: Vec::new(),
        })
        .collect();

    let mut cursor = Cursor::start(fragments);
    while let Some(Step { action, next }) = step(cursor, fragments, &result.tokens)? {
        #[cfg(feature = "debug-states")]
        debug!(?cursor, ?action, "sweep transition");

        if let Action::Emit(span) = action {
            plans[cursor.fragment_index].spans.push(span);
        }
        cursor = next;
    }

    // Tokens ran out (or there were none): the rest of the current fragment and every
    // remaining fragment is unparsed text
    for (index, fragment) in fragments.iter().enumerate().skip(cursor.fragment_index) {
        let (from, from_byte) = if index == cursor.fragment_index {
            (cursor.cur_offset.0, cursor.cur_byte)
        } else {
            (fragment.offset, 0)
        };
        if from < fragment.end() {
            let span = cursor::unparsed_span(fragment, from, fragment.end(), from_byte)?;
            plans[index].spans.push(span);
        }
    }

    Ok(Plan { fragments: plans })
}

/// Align `fragments` with `result` and replace every fragment's node with its reconstructed container
///
/// The document is only mutated after the input has been validated and fully planned, so an
/// error leaves it untouched.
pub fn apply_parse_result<D: AnnotationDisplay>(
    doc: &mut Document,
    fragments: &[TextFragment],
    result: &ParseResult,
    config: &OverlayConfig,
    display: D,
) -> Result<Overlay<D>, AlignError> {
    validate_nodes(doc, fragments)?;
    let plan = plan(fragments, result)?;
    let mut overlay = Overlay::new(display, result.vocab.clone());
    overlay.stats.fragments = fragments.len();
    overlay.stats.tokens = result.tokens.len();

    let mut tally = TokenTally::default();

    for fragment_plan in &plan.fragments {
        let fragment = &fragments[fragment_plan.fragment_index];
        let container = doc.create_element(Element::new("span").with_attr("class", CONTAINER_CLASS));

        for span in &fragment_plan.spans {
            let node = build_span(doc, span, result, &mut overlay, &mut tally);
            doc.append_child(container, node)?;
        }

        let retained = swap_in(doc, fragment.node, container, config)?;
        debug!(
            "Replaced fragment {} at {}..{} with {} spans",
            fragment_plan.fragment_index,
            fragment.offset,
            fragment.end(),
            fragment_plan.spans.len()
        );

        overlay.mutations.push(Mutation::Replace {
            fragment_index: fragment_plan.fragment_index,
            original: fragment.node,
            replacement: container,
            retained,
        });
    }

    overlay.stats.words = tally.words.len();
    overlay.stats.split_tokens = tally.split.len();
    overlay.stats.missing_vocab = tally.missing.len();
    info!(
        "Applied parse: {} fragments, {} tokens, {} words, {} unparsed spans, {} split tokens, {} missing vocab",
        overlay.stats.fragments,
        overlay.stats.tokens,
        overlay.stats.words,
        overlay.stats.unparsed,
        overlay.stats.split_tokens,
        overlay.stats.missing_vocab
    );

    Ok(overlay)
}

/// Build the node for one planned span and bind word nodes to their vocabulary entry
fn build_span<D: AnnotationDisplay>(
    doc: &mut Document,
    span: &EmittedSpan,
    result: &ParseResult,
    overlay: &mut Overlay<D>,
    tally: &mut TokenTally,
) -> NodeId {
    match span.kind {
        SpanKind::Unparsed => {
            overlay.stats.unparsed += 1;
            let node = doc.create_element(
                Element::new("span").with_attr("class", format!("{WORD_CLASS} {UNPARSED_CLASS}")),
            );
            append_span_content(doc, node, span, true);
            node
        }
        SpanKind::Word {
            token_index,
            vocabulary_index,
            piece,
        } => {
            if piece != TokenPiece::Whole {
                tally.split.insert(token_index);
            }

            let Some(entry) = result.entry(vocabulary_index) else {
                if tally.missing.insert(token_index) {
                    warn!(
                        "Token {} references missing vocabulary entry {}; rendering plain text",
                        token_index, vocabulary_index
                    );
                }
                let node = doc.create_element(
                    Element::new("span")
                        .with_attr("class", format!("{WORD_CLASS} {MISSING_VOCAB_CLASS}")),
                );
                // Source ruby is original content and survives; tokenizer readings do not
                append_span_content(doc, node, span, span.readings == ReadingSource::Source);
                return node;
            };

            tally.words.insert(token_index);
            let mut classes = vec![WORD_CLASS.to_string()];
            classes.extend(
                entry
                    .card_state
                    .iter()
                    .map(|state| class_token(state))
                    .filter(|class| !class.is_empty()),
            );
            if let Some(class) = piece.class() {
                classes.push(class.to_string());
            }

            let mut element = Element::new("span")
                .with_attr("class", classes.join(" "))
                .with_attr("data-vocab-index", vocabulary_index.to_string());
            if piece != TokenPiece::Whole {
                element.set_attr("data-token-index", token_index.to_string());
            }

            let node = doc.create_element(element);
            append_span_content(doc, node, span, true);
            overlay.bind(
                node,
                Binding {
                    token_index,
                    vocabulary_index,
                },
            );
            node
        }
    }
}

fn append_span_content(doc: &mut Document, node: NodeId, span: &EmittedSpan, with_readings: bool) {
    if with_readings && !span.furigana.is_empty() {
        doc.append_furigana(node, &span.furigana);
    } else {
        doc.append_new_text(node, span.text.as_str());
    }
}

/// Replace `original` with `replacement`; in keep-original mode the original is moved into a
/// hidden wrapper at the end of the replacement. Returns whether the original was retained.
fn swap_in(
    doc: &mut Document,
    original: NodeId,
    replacement: NodeId,
    config: &OverlayConfig,
) -> Result<bool, AlignError> {
    if !config.keep_original {
        doc.replace_node(original, replacement)?;
        return Ok(false);
    }

    if let Some(element) = doc.element_mut(replacement) {
        element.set_attr("style", "position:relative");
    }
    doc.replace_node(original, replacement)?;

    let wrapper = doc.create_element(
        Element::new("span")
            .with_attr("class", WRAPPER_CLASS)
            .with_attr("style", config.writing_mode.anchor_style()),
    );
    doc.append_child(wrapper, original)?;
    doc.append_child(replacement, wrapper)?;
    Ok(true)
}
