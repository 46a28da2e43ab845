// Test fixtures with known documents, parse results and expected markup
// WHY: Golden-file testing requires deterministic input/output pairs for validation

use furigloss::{FuriganaPart, ParseResult, Token, VocabularyEntry};

/// `猫が` as text, `好` as ruby with reading `す`, then `き`
pub const CAT_DOCUMENT_JSON: &str = r#"{
  "type": "element",
  "tag": "p",
  "children": [
    {"type": "text", "text": "猫が"},
    {"type": "element", "tag": "ruby", "children": [
      {"type": "text", "text": "好"},
      {"type": "element", "tag": "rt", "children": [{"type": "text", "text": "す"}]}
    ]},
    {"type": "text", "text": "き"}
  ]
}"#;

/// Three tokens; `好き` crosses from the ruby fragment into the trailing text
pub const CAT_PARSE_JSON: &str = r#"{
  "tokens": [
    {"positionUtf16": 0, "lengthUtf16": 1, "vocabularyIndex": 0, "furigana": [["猫", "ねこ"]]},
    {"positionUtf16": 1, "lengthUtf16": 1, "vocabularyIndex": 1, "furigana": ["が"]},
    {"positionUtf16": 2, "lengthUtf16": 2, "vocabularyIndex": 2, "furigana": [["好", "す"], "き"]}
  ],
  "vocab": [
    {"spelling": "猫", "reading": "ねこ", "cardState": ["known"], "meanings": ["cat"], "vid": 1467640, "sid": 1},
    {"spelling": "が", "reading": "が", "cardState": ["never-forget"], "meanings": ["subject marker"]},
    {"spelling": "好き", "reading": "すき", "cardState": ["due", "learning"], "meanings": ["liked", "favourite"]}
  ]
}"#;

/// Annotated rendering of the cat document
pub const CAT_EXPECTED_HTML: &str = concat!(
    "<p>",
    "<span class=\"jpdb-parsed\">",
    "<span class=\"jpdb-word known\" data-vocab-index=\"0\"><ruby><rb>猫</rb><rt>ねこ</rt></ruby></span>",
    "<span class=\"jpdb-word never-forget\" data-vocab-index=\"1\">が</span>",
    "</span>",
    "<span class=\"jpdb-parsed\">",
    "<span class=\"jpdb-word due learning jpdb-word-head\" data-vocab-index=\"2\" data-token-index=\"2\">",
    "<ruby><rb>好</rb><rt>す</rt></ruby></span>",
    "</span>",
    "<span class=\"jpdb-parsed\">",
    "<span class=\"jpdb-word due learning jpdb-word-tail\" data-vocab-index=\"2\" data-token-index=\"2\">き</span>",
    "</span>",
    "</p>"
);

pub fn token(position: usize, length: usize, vocabulary_index: usize) -> Token {
    Token {
        position_utf16: position,
        length_utf16: length,
        vocabulary_index,
        furigana: Vec::new(),
    }
}

pub fn token_with_furigana(
    position: usize,
    length: usize,
    vocabulary_index: usize,
    furigana: Vec<FuriganaPart>,
) -> Token {
    Token {
        furigana,
        ..token(position, length, vocabulary_index)
    }
}

pub fn ruby(base: &str, reading: &str) -> FuriganaPart {
    FuriganaPart::Ruby(base.to_string(), reading.to_string())
}

pub fn plain(text: &str) -> FuriganaPart {
    FuriganaPart::Plain(text.to_string())
}

pub fn entry(spelling: &str, reading: &str, card_state: &[&str]) -> VocabularyEntry {
    VocabularyEntry {
        spelling: spelling.to_string(),
        reading: reading.to_string(),
        card_state: card_state.iter().map(|s| s.to_string()).collect(),
        meanings: Vec::new(),
        vid: None,
        sid: None,
        rid: None,
    }
}

/// Parse result whose vocabulary has one plain entry per token
pub fn parse_with_tokens(tokens: Vec<Token>) -> ParseResult {
    let vocab = (0..tokens.len())
        .map(|i| entry(&format!("w{i}"), &format!("w{i}"), &[]))
        .collect();
    ParseResult { tokens, vocab }
}
