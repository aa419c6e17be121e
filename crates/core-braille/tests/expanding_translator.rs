//! End-to-end behaviour of `ExpandingTranslator` against stub backends.

mod common;

use common::{Completion, DEFAULT_TAG, Recorder, StubTranslator, UNCONTRACTED_TAG};
use core_braille::tables::{ComputerBrailleTable, ContractedTable};
use core_braille::{
    BrailleOutput, ExpandingTranslator, ExpansionPolicy, TranslationResult, build_style_map,
};
use core_text::{AnnotatedText, BrailleStyle, SpanKind};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn pair(recorder: &Arc<Recorder>, completion: Completion) -> ExpandingTranslator {
    let default = StubTranslator::new("default", DEFAULT_TAG, recorder).completing(completion);
    let uncontracted =
        StubTranslator::new("uncontracted", UNCONTRACTED_TAG, recorder).completing(completion);
    ExpandingTranslator::new(Arc::new(default), Some(Arc::new(uncontracted)))
}

fn field(text: &str, value: std::ops::Range<usize>, sel: std::ops::Range<usize>) -> AnnotatedText {
    AnnotatedText::new(text)
        .with_span(SpanKind::Value, value)
        .unwrap()
        .with_span(SpanKind::ValueSelection, sel)
        .unwrap()
}

/// Several chunks on both backends plus one splice.
fn busy_line() -> AnnotatedText {
    // positions 4 and 12 expand to "def" [4,7) and "mno" [12,15)
    field("abc def ghi mno pqr", 0..19, 4..13)
        .with_span(SpanKind::ExtraCells(vec![0x3c, 0x3c, 0x3c]), 10..10)
        .unwrap()
        .with_span(SpanKind::Style(BrailleStyle::BOLD), 2..9)
        .unwrap()
}

#[tokio::test]
async fn cursor_expansion_merges_into_one_uncontracted_chunk() {
    let rec = Recorder::new();
    let t = pair(&rec, Completion::Forward);
    let text = field("abc def ghij", 0..10, 5..5);
    let out = t.translate(&text, ExpansionPolicy::Selection).unwrap().await;
    assert_eq!(
        rec.call_texts(),
        vec![
            ("default", "abc ".to_string()),
            ("uncontracted", "def".to_string()),
            ("default", " ghij".to_string()),
        ]
    );
    assert_eq!(out.cells.len(), 12);
    assert!(out.cells[4..7].iter().all(|c| c & UNCONTRACTED_TAG != 0));
    assert!(out.cells[7..].iter().all(|c| c & UNCONTRACTED_TAG == 0));
}

#[tokio::test]
async fn extra_cells_spliced_between_characters() {
    let rec = Recorder::new();
    let t = pair(&rec, Completion::Forward);
    let text = AnnotatedText::new("ab")
        .with_span(SpanKind::ExtraCells(vec![0x3c, 0x3d]), 1..1)
        .unwrap();
    let out = t.translate(&text, ExpansionPolicy::None).unwrap().await;
    assert_eq!(out.cells.len(), 4);
    assert_eq!(&out.cells[1..3], &[0x3c, 0x3d]);
    assert_eq!(out.text_to_braille, vec![0, 3]);
    assert_eq!(out.braille_to_text, vec![0, 1, 1, 1]);
    assert_eq!(rec.call_texts().len(), 2);
}

#[tokio::test]
async fn empty_input_never_calls_a_backend() {
    for policy in [ExpansionPolicy::None, ExpansionPolicy::Selection, ExpansionPolicy::All] {
        let rec = Recorder::new();
        let t = pair(&rec, Completion::Forward);
        let text = field("", 0..0, 0..0);
        let pending = t.translate(&text, policy).unwrap();
        assert_eq!(pending.dispatched(), 0);
        let out = pending.await;
        assert_eq!(out, BrailleOutput::default());
        assert!(rec.calls().is_empty());
    }
}

#[tokio::test]
async fn empty_input_with_extra_cells_only() {
    let rec = Recorder::new();
    let t = pair(&rec, Completion::Forward);
    let text = AnnotatedText::new("")
        .with_span(SpanKind::ExtraCells(vec![0x07, 0x38]), 0..0)
        .unwrap();
    let out = t.translate(&text, ExpansionPolicy::All).unwrap().await;
    assert_eq!(out.cells, vec![0x07, 0x38]);
    assert!(out.text_to_braille.is_empty());
    assert_eq!(out.braille_to_text, vec![0, 0]);
    assert!(rec.calls().is_empty());
}

#[tokio::test]
async fn fast_path_equals_direct_backend_call() {
    let rec = Recorder::new();
    let t = pair(&rec, Completion::Forward);
    let text = AnnotatedText::new("plain line, no value")
        .with_span(SpanKind::Style(BrailleStyle::ITALIC), 6..10)
        .unwrap();
    let pending = t.translate(&text, ExpansionPolicy::Selection).unwrap();
    assert_eq!(pending.chunk_count(), 1);
    let out = pending.await;

    let calls = rec.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "plain line, no value");
    assert_eq!(calls[0].styles, build_style_map(&text));

    let direct = StubTranslator::new("default", DEFAULT_TAG, &Recorder::new());
    let expected = TranslationResult::from_raw(direct.translate_now("plain line, no value"), text.len());
    assert_eq!(out.cells, expected.cells);
    assert_eq!(out.text_to_braille, expected.text_to_braille);
    assert_eq!(out.braille_to_text, expected.braille_to_text);
}

#[tokio::test]
async fn completion_order_does_not_change_output() {
    let text = busy_line();
    let mut outputs = Vec::new();
    let mut completion_orders = Vec::new();
    for completion in [Completion::Forward, Completion::Reverse, Completion::Shuffled] {
        let rec = Recorder::new();
        let t = pair(&rec, completion);
        outputs.push(t.translate(&text, ExpansionPolicy::Selection).unwrap().await);
        let dispatched: Vec<String> = rec.calls().into_iter().map(|c| c.text).collect();
        assert_eq!(dispatched.len(), 6);
        let completed = rec.completions();
        assert_eq!(completed.len(), dispatched.len());
        if completion == Completion::Reverse {
            let mut reversed = dispatched.clone();
            reversed.reverse();
            assert_eq!(completed, reversed);
        }
        completion_orders.push(completed);
    }
    assert_ne!(completion_orders[0], completion_orders[1]);
    assert_ne!(completion_orders[0], completion_orders[2]);
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[0], outputs[2]);
}

#[tokio::test]
async fn mappings_stay_consistent_after_assembly() {
    let rec = Recorder::new();
    let t = pair(&rec, Completion::Shuffled);
    let text = busy_line();
    let n = text.len();
    let out = t.translate(&text, ExpansionPolicy::Selection).unwrap().await;

    assert_eq!(out.cells.len(), n + 3);
    assert_eq!(out.text_to_braille.len(), n);
    assert_eq!(out.braille_to_text.len(), out.cells.len());
    assert!(out.braille_to_text.iter().all(|&p| p < n));
    // identity backends: every character's first cell maps back to itself
    for (i, &cell) in out.text_to_braille.iter().enumerate() {
        assert_eq!(out.braille_to_text[cell], i, "char {i}");
    }
    // splice sits right before character 10
    assert_eq!(out.text_to_braille[10], 13);
    assert_eq!(&out.cells[10..13], &[0x3c, 0x3c, 0x3c]);
    assert_eq!(&out.braille_to_text[10..13], &[10, 10, 10]);
}

#[tokio::test]
async fn style_slices_follow_their_chunks() {
    let rec = Recorder::new();
    let t = pair(&rec, Completion::Forward);
    let text = busy_line();
    let map = build_style_map(&text);
    let _ = t.translate(&text, ExpansionPolicy::Selection).unwrap().await;
    let mut offset = 0;
    for call in rec.calls() {
        let len = call.text.chars().count();
        assert_eq!(call.styles, map[offset..offset + len].to_vec(), "chunk {:?}", call.text);
        offset += len;
    }
    assert_eq!(offset, text.len());
}

#[tokio::test]
async fn selection_outside_value_degrades_to_no_expansion() {
    let rec = Recorder::new();
    let t = pair(&rec, Completion::Forward);
    let text = field("abc def", 0..3, 2..6);
    let out = t.translate(&text, ExpansionPolicy::Selection).unwrap().await;
    assert_eq!(rec.call_texts(), vec![("default", "abc def".to_string())]);
    assert_eq!(out.cells.len(), 7);
}

#[tokio::test]
async fn policy_all_translates_value_uncontracted() {
    let rec = Recorder::new();
    let t = pair(&rec, Completion::Forward);
    let text = field("url: http://a.b end", 5..15, 7..7);
    let _ = t.translate(&text, ExpansionPolicy::All).unwrap().await;
    assert_eq!(
        rec.call_texts(),
        vec![
            ("default", "url: ".to_string()),
            ("uncontracted", "http://a.b".to_string()),
            ("default", " end".to_string()),
        ]
    );
}

#[tokio::test]
async fn without_uncontracted_backend_everything_is_default() {
    let rec = Recorder::new();
    let default = StubTranslator::new("default", DEFAULT_TAG, &rec);
    let t = ExpandingTranslator::new(Arc::new(default), None);
    let text = field("abc def", 0..7, 5..5);
    let pending = t.translate(&text, ExpansionPolicy::All).unwrap();
    assert_eq!(pending.chunk_count(), 1);
    pending.await;
    assert_eq!(rec.call_texts(), vec![("default", "abc def".to_string())]);
}

#[tokio::test]
async fn missing_backend_mappings_are_synthesized() {
    let rec = Recorder::new();
    let default = StubTranslator::new("default", DEFAULT_TAG, &rec);
    let uncontracted = StubTranslator::new("uncontracted", UNCONTRACTED_TAG, &rec).cells_only();
    let t = ExpandingTranslator::new(Arc::new(default), Some(Arc::new(uncontracted)));
    let text = field("ab cd", 3..5, 4..4);
    let out = t.translate(&text, ExpansionPolicy::All).unwrap().await;
    assert_eq!(out.cells.len(), 5);
    assert_eq!(out.text_to_braille, vec![0, 1, 2, 3, 3]);
    assert_eq!(out.braille_to_text, vec![0, 1, 2]);
}

#[tokio::test]
async fn callback_fires_exactly_once() {
    let rec = Recorder::new();
    let t = pair(&rec, Completion::Reverse);
    let text = busy_line();
    let fired = AtomicUsize::new(0);
    t.translate_with(&text, ExpansionPolicy::Selection, |cells, t2b, b2t| {
        fired.fetch_add(1, Ordering::SeqCst);
        assert_eq!(cells.len(), b2t.len());
        assert_eq!(t2b.len(), 19);
    })
    .await
    .unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn pending_translation_can_be_spawned() {
    let rec = Recorder::new();
    let t = pair(&rec, Completion::Shuffled);
    let pending = t.translate(&busy_line(), ExpansionPolicy::Selection).unwrap();
    let handle = tokio::spawn(std::future::IntoFuture::into_future(pending));
    let out = handle.await.unwrap();
    assert_eq!(out.text_to_braille.len(), 19);
}

#[tokio::test]
async fn reference_tables_expand_word_under_cursor() {
    let t = ExpandingTranslator::new(
        Arc::new(ContractedTable),
        Some(Arc::new(ComputerBrailleTable)),
    );
    let text = field("the cat and the dog", 0..19, 9..9);

    let expanded = t.translate(&text, ExpansionPolicy::Selection).unwrap().await;
    // "the cat " -> 6 cells, "and" spelled -> 3, " the dog" -> 6
    assert_eq!(expanded.cells.len(), 15);
    assert_eq!(&expanded.cells[6..9], &[0x01, 0x1d, 0x19]);
    assert_eq!(expanded.text_to_braille[8], 6);
    assert_eq!(&expanded.text_to_braille[0..3], &[0, 0, 0]);

    let contracted = t.translate(&text, ExpansionPolicy::None).unwrap().await;
    assert_eq!(contracted.cells.len(), 13);
    assert_eq!(contracted.cells[6], 0x2f);
    assert_eq!(&contracted.text_to_braille[8..11], &[6, 6, 6]);
}
