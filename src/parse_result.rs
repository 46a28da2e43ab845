// WHY: Wire model of the external tokenizer result
// Field names follow the JSON the parse service produces (camelCase, UTF-16 offsets)

use serde::{Deserialize, Serialize};

use crate::error::AlignError;
use crate::offset::utf16_len;

/// One piece of a word: plain text, or a `[base, reading]` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FuriganaPart {
    Plain(String),
    Ruby(String, String),
}

impl FuriganaPart {
    pub fn base(&self) -> &str {
        match self {
            FuriganaPart::Plain(text) => text,
            FuriganaPart::Ruby(base, _) => base,
        }
    }

    /// Reading of the part; plain parts read as themselves
    pub fn reading(&self) -> &str {
        match self {
            FuriganaPart::Plain(text) => text,
            FuriganaPart::Ruby(_, reading) => reading,
        }
    }

    pub fn has_reading(&self) -> bool {
        matches!(self, FuriganaPart::Ruby(..))
    }
}

/// Concatenated base text of `parts`
pub fn spelling_of(parts: &[FuriganaPart]) -> String {
    parts.iter().map(FuriganaPart::base).collect()
}

/// Concatenated reading of `parts`
pub fn reading_of(parts: &[FuriganaPart]) -> String {
    parts.iter().map(FuriganaPart::reading).collect()
}

/// A parsed word positioned in the shared UTF-16 offset space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub position_utf16: usize,
    pub length_utf16: usize,
    pub vocabulary_index: usize,
    #[serde(default)]
    pub furigana: Vec<FuriganaPart>,
}

impl Token {
    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.position_utf16 + self.length_utf16
    }

    pub fn spelling(&self) -> String {
        spelling_of(&self.furigana)
    }

    pub fn reading(&self) -> String {
        reading_of(&self.furigana)
    }

    /// True when the furigana bases account for exactly `length_utf16` units
    pub fn furigana_matches_length(&self) -> bool {
        self.furigana
            .iter()
            .map(|part| utf16_len(part.base()))
            .sum::<usize>()
            == self.length_utf16
    }
}

/// Study metadata for one word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub spelling: String,
    pub reading: String,
    #[serde(default)]
    pub card_state: Vec<String>,
    #[serde(default)]
    pub meanings: Vec<String>,
    #[serde(default)]
    pub vid: Option<u64>,
    #[serde(default)]
    pub sid: Option<u64>,
    #[serde(default)]
    pub rid: Option<u64>,
}

/// Tokens plus the vocabulary table they index into
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub vocab: Vec<VocabularyEntry>,
}

impl ParseResult {
    pub fn entry(&self, vocabulary_index: usize) -> Option<&VocabularyEntry> {
        self.vocab.get(vocabulary_index)
    }

    /// Check ordering and range of every token against the text span `[text_start, text_end]`
    ///
    /// Tokens must be sorted, must not overlap and must lie inside the text.
    pub fn validate(&self, text_start: usize, text_end: usize) -> Result<(), AlignError> {
        let mut previous_end = text_start;

        for (index, token) in self.tokens.iter().enumerate() {
            if token.position_utf16 < text_start {
                return Err(AlignError::TokenBeforeText {
                    index,
                    position: token.position_utf16,
                    text_start,
                });
            }
            if token.position_utf16 < previous_end {
                return Err(AlignError::TokenOutOfOrder {
                    index,
                    position: token.position_utf16,
                    previous_end,
                });
            }
            if token.end() > text_end {
                return Err(AlignError::TokenOutOfRange {
                    index,
                    end: token.end(),
                    text_end,
                });
            }
            previous_end = token.end();
        }

        Ok(())
    }
}
