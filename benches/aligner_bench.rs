use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use furigloss::aligner::OverlayConfig;
use furigloss::content::to_html;
use furigloss::{
    annotate_document, apply_parse_result, extract_children, plan, Document, FuriganaPart,
    HtmlPopup, ParseResult, SourceNode, Token, VocabularyEntry,
};

const SENTENCE: &str = "吾輩は猫である。名前はまだ無い。";

// Synthetic chapter: paragraphs of plain text interleaved with ruby and emphasis
// WHY: Exercises fragment boundaries and split tokens at a realistic density
fn chapter(paragraphs: usize) -> (SourceNode, ParseResult) {
    let mut children = Vec::new();
    let mut tokens = Vec::new();
    let mut offset = 0usize;

    for _ in 0..paragraphs {
        children.push(SourceNode::element(
            "p",
            vec![
                SourceNode::text(SENTENCE),
                SourceNode::element(
                    "ruby",
                    vec![
                        SourceNode::text("猫"),
                        SourceNode::element("rt", vec![SourceNode::text("ねこ")]),
                    ],
                ),
                SourceNode::element("em", vec![SourceNode::text("です")]),
            ],
        ));

        // One token per two characters of the sentence, then one crossing ruby + emphasis
        let sentence_len = SENTENCE.chars().count();
        for start in (0..sentence_len - 1).step_by(2) {
            tokens.push(Token {
                position_utf16: offset + start,
                length_utf16: 2,
                vocabulary_index: 0,
                furigana: Vec::new(),
            });
        }
        tokens.push(Token {
            position_utf16: offset + sentence_len,
            length_utf16: 3,
            vocabulary_index: 1,
            furigana: vec![
                FuriganaPart::Ruby("猫".to_string(), "ねこ".to_string()),
                FuriganaPart::Plain("です".to_string()),
            ],
        });
        offset += sentence_len + 3;
    }

    let entry = |spelling: &str, reading: &str| VocabularyEntry {
        spelling: spelling.to_string(),
        reading: reading.to_string(),
        card_state: vec!["learning".to_string()],
        meanings: vec!["gloss".to_string()],
        vid: Some(1),
        sid: Some(1),
        rid: None,
    };

    (
        SourceNode::element("body", children),
        ParseResult {
            tokens,
            vocab: vec![entry("吾輩", "わがはい"), entry("猫です", "ねこです")],
        },
    )
}

fn bench_alignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("alignment");

    for paragraphs in [10usize, 1000] {
        let (source, parse) = chapter(paragraphs);
        let doc = Document::from_source(&source);
        let fragments = extract_children(&doc, doc.root()).fragments;
        let text_units: usize = fragments.iter().map(|f| f.length).sum();
        group.throughput(Throughput::Elements(text_units as u64));

        group.bench_function(format!("extract_{paragraphs}"), |b| {
            b.iter(|| extract_children(black_box(&doc), doc.root()))
        });

        group.bench_function(format!("plan_{paragraphs}"), |b| {
            b.iter(|| plan(black_box(&fragments), black_box(&parse)).unwrap())
        });

        group.bench_function(format!("apply_{paragraphs}"), |b| {
            b.iter(|| {
                let mut doc = doc.clone();
                let overlay = apply_parse_result(
                    &mut doc,
                    &fragments,
                    &parse,
                    &OverlayConfig::default(),
                    HtmlPopup::default(),
                )
                .unwrap();
                black_box(overlay.stats)
            })
        });

        group.bench_function(format!("annotate_render_{paragraphs}"), |b| {
            b.iter(|| {
                let annotated =
                    annotate_document(black_box(&source), &parse, &OverlayConfig::default()).unwrap();
                black_box(annotated.html.len())
            })
        });
    }

    group.finish();
}

// One long text node with a two-unit token every four units
fn long_line(units: usize) -> (Vec<furigloss::TextFragment>, ParseResult) {
    let source = SourceNode::element("p", vec![SourceNode::text("猫".repeat(units))]);
    let doc = Document::from_source(&source);
    let fragments = extract_children(&doc, doc.root()).fragments;
    let tokens = (0..units.saturating_sub(1))
        .step_by(4)
        .map(|position| Token {
            position_utf16: position,
            length_utf16: 2,
            vocabulary_index: 0,
            furigana: Vec::new(),
        })
        .collect();
    (fragments, ParseResult { tokens, vocab: Vec::new() })
}

fn bench_long_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("long_line");

    for units in [1_000usize, 100_000] {
        let (fragments, parse) = long_line(units);
        group.throughput(Throughput::Elements(units as u64));
        group.bench_function(format!("plan_{units}"), |b| {
            b.iter(|| plan(black_box(&fragments), black_box(&parse)).unwrap())
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let (source, parse) = chapter(1000);
    let mut doc = Document::from_source(&source);
    let fragments = extract_children(&doc, doc.root()).fragments;
    apply_parse_result(
        &mut doc,
        &fragments,
        &parse,
        &OverlayConfig::default(),
        HtmlPopup::default(),
    )
    .unwrap();

    let mut group = c.benchmark_group("render");
    group.throughput(Throughput::Bytes(to_html(&doc, doc.root()).len() as u64));
    group.bench_function("to_html_1000", |b| b.iter(|| to_html(black_box(&doc), doc.root())));
    group.finish();
}

criterion_group!(benches, bench_alignment, bench_long_line, bench_render);
criterion_main!(benches);
