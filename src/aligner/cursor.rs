// WHY: The sweep is a pure function of (cursor, fragments, tokens)
// Each call decides exactly one transition so individual rules can be tested without a document

use crate::error::AlignError;
use crate::fragments::TextFragment;
use crate::offset::{take_utf16, Utf16Pos};
use crate::parse_result::{FuriganaPart, Token};

use super::pieces::restrict_parts;

/// Sweep position: current token, current fragment, and offset in the shared space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub token_index: usize,
    pub fragment_index: usize,
    pub cur_offset: Utf16Pos,
    /// Byte position of `cur_offset` inside the current fragment's text
    pub cur_byte: usize,
}

impl Cursor {
    /// Start of a sweep: first token, first fragment, first fragment's offset
    pub fn start(fragments: &[TextFragment]) -> Self {
        Self {
            token_index: 0,
            fragment_index: 0,
            cur_offset: Utf16Pos::new(fragments.first().map(|f| f.offset).unwrap_or(0)),
            cur_byte: 0,
        }
    }

    /// True once either sequence has been walked to its end
    pub fn is_terminal(&self, fragment_count: usize, token_count: usize) -> bool {
        self.token_index >= token_count || self.fragment_index >= fragment_count
    }
}

/// Which part of a token a word span covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPiece {
    Whole,
    Head,
    Middle,
    Tail,
}

impl TokenPiece {
    fn of(start: usize, end: usize, token: &Token) -> Self {
        match (start == token.position_utf16, end == token.end()) {
            (true, true) => TokenPiece::Whole,
            (true, false) => TokenPiece::Head,
            (false, true) => TokenPiece::Tail,
            (false, false) => TokenPiece::Middle,
        }
    }

    /// Extra class for split pieces
    pub fn class(&self) -> Option<&'static str> {
        match self {
            TokenPiece::Whole => None,
            TokenPiece::Head => Some("jpdb-word-head"),
            TokenPiece::Middle => Some("jpdb-word-middle"),
            TokenPiece::Tail => Some("jpdb-word-tail"),
        }
    }
}

/// Where the readings of an emitted span came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingSource {
    /// Plain text, no readings
    None,
    /// The fragment's own ruby annotation
    Source,
    /// The tokenizer's furigana for the token
    Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    Unparsed,
    Word {
        token_index: usize,
        vocabulary_index: usize,
        piece: TokenPiece,
    },
}

/// One span of a fragment's replacement content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedSpan {
    pub kind: SpanKind,
    /// Source text covered by the span; always a slice of the fragment text
    pub text: String,
    /// Parts to render; empty means render `text` as is
    pub furigana: Vec<FuriganaPart>,
    pub readings: ReadingSource,
}

impl EmittedSpan {
    pub fn is_word(&self) -> bool {
        matches!(self.kind, SpanKind::Word { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The current fragment is complete and its container can be swapped in
    CloseFragment,
    /// The current token has been fully emitted
    NextToken,
    Emit(EmittedSpan),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub action: Action,
    pub next: Cursor,
}

/// Decide the next transition, or `None` once the cursor is terminal
///
/// Rules are checked in order: fragment exhausted, token exhausted, gap before the
/// token, inside the token. A token running past the fragment end is cut at the
/// boundary and stays current, so its remainder lands in the following fragment.
pub fn step(
    cursor: Cursor,
    fragments: &[TextFragment],
    tokens: &[Token],
) -> Result<Option<Step>, AlignError> {
    if cursor.is_terminal(fragments.len(), tokens.len()) {
        return Ok(None);
    }

    let fragment = &fragments[cursor.fragment_index];
    let token = &tokens[cursor.token_index];
    let cur = cursor.cur_offset.0;

    if cur >= fragment.end() {
        return Ok(Some(Step {
            action: Action::CloseFragment,
            next: Cursor {
                fragment_index: cursor.fragment_index + 1,
                cur_byte: 0,
                ..cursor
            },
        }));
    }

    if cur >= token.end() {
        return Ok(Some(Step {
            action: Action::NextToken,
            next: Cursor {
                token_index: cursor.token_index + 1,
                ..cursor
            },
        }));
    }

    if cur < token.position_utf16 {
        let end = token.position_utf16.min(fragment.end());
        let span = unparsed_span(fragment, cur, end, cursor.cur_byte)?;
        let cur_byte = cursor.cur_byte + span.text.len();
        return Ok(Some(Step {
            action: Action::Emit(span),
            next: Cursor {
                cur_offset: Utf16Pos::new(end),
                cur_byte,
                ..cursor
            },
        }));
    }

    let end = token.end().min(fragment.end());
    let span = word_span(fragment, token, cursor.token_index, cur, end, cursor.cur_byte)?;
    let cur_byte = cursor.cur_byte + span.text.len();
    let token_index = if end == token.end() {
        cursor.token_index + 1
    } else {
        cursor.token_index
    };

    Ok(Some(Step {
        action: Action::Emit(span),
        next: Cursor {
            token_index,
            fragment_index: cursor.fragment_index,
            cur_offset: Utf16Pos::new(end),
            cur_byte,
        },
    }))
}

/// Unparsed text of `fragment` over the absolute range `[start, end)`
///
/// `start_byte` is the byte position of `start` inside the fragment text, so only the
/// span itself is scanned.
pub fn unparsed_span(
    fragment: &TextFragment,
    start: usize,
    end: usize,
    start_byte: usize,
) -> Result<EmittedSpan, AlignError> {
    let (rel_start, rel_end) = (start - fragment.offset, end - fragment.offset);
    let text = span_text(fragment, start, end, start_byte)?;

    let (furigana, readings) = match &fragment.furigana {
        Some(parts) => (restrict_parts(parts, rel_start, rel_end)?, ReadingSource::Source),
        None => (Vec::new(), ReadingSource::None),
    };

    Ok(EmittedSpan {
        kind: SpanKind::Unparsed,
        text,
        furigana,
        readings,
    })
}

fn word_span(
    fragment: &TextFragment,
    token: &Token,
    token_index: usize,
    start: usize,
    end: usize,
    start_byte: usize,
) -> Result<EmittedSpan, AlignError> {
    let (rel_start, rel_end) = (start - fragment.offset, end - fragment.offset);
    let text = span_text(fragment, start, end, start_byte)?;

    let (furigana, readings) = match &fragment.furigana {
        Some(parts) => (restrict_parts(parts, rel_start, rel_end)?, ReadingSource::Source),
        None => token_readings(token, start, end, &text),
    };

    Ok(EmittedSpan {
        kind: SpanKind::Word {
            token_index,
            vocabulary_index: token.vocabulary_index,
            piece: TokenPiece::of(start, end, token),
        },
        text,
        furigana,
        readings,
    })
}

fn span_text(
    fragment: &TextFragment,
    start: usize,
    end: usize,
    start_byte: usize,
) -> Result<String, AlignError> {
    take_utf16(&fragment.text, start_byte, end - start)
        .map(str::to_string)
        .map_err(|_| AlignError::SplitSurrogate { offset: end })
}

/// Token furigana for `[start, end)`, used only when its bases spell exactly `text`
fn token_readings(
    token: &Token,
    start: usize,
    end: usize,
    text: &str,
) -> (Vec<FuriganaPart>, ReadingSource) {
    if !token.furigana_matches_length() {
        return (Vec::new(), ReadingSource::None);
    }

    let rel_start = start - token.position_utf16;
    let rel_end = end - token.position_utf16;
    match restrict_parts(&token.furigana, rel_start, rel_end) {
        Ok(parts) if spells(&parts, text) => (parts, ReadingSource::Token),
        _ => (Vec::new(), ReadingSource::None),
    }
}

fn spells(parts: &[FuriganaPart], text: &str) -> bool {
    let mut rest = text;
    for part in parts {
        match rest.strip_prefix(part.base()) {
            Some(tail) => rest = tail,
            None => return false,
        }
    }
    rest.is_empty()
}
