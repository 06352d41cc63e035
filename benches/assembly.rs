//! Benchmarks for the codec, import, and assembly pipeline.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use versicle::{
    BookTable, InMemoryRules, InputPhrase, Modifiers, ParagraphRange, Phrase, PhraseId,
    Reference, ReferenceRange, StoredPhrase, encode_reference, import_book, phrase_bounds,
    assemble,
};

/// A synthetic 30-chapter book, five phrases per verse, paragraph per verse.
fn synthetic_book() -> Vec<InputPhrase> {
    let mut phrases = Vec::new();
    for chapter in 1..=30u32 {
        for verse in 1..=25u32 {
            for word in 0..5u32 {
                phrases.push(InputPhrase {
                    text: format!("word {word} of {chapter}:{verse}"),
                    chapter: Some(chapter),
                    verse: Some(verse),
                    subverse: None,
                    modifiers: Modifiers {
                        bold: word == 2,
                        indent: u32::from(verse % 4 == 0),
                        ..Default::default()
                    },
                });
            }
        }
    }
    phrases
}

fn imported() -> (Vec<(PhraseId, Phrase)>, Vec<ParagraphRange>) {
    let genesis = BookTable::id_for("Gen").unwrap();
    let stored = import_book(genesis, 1, &synthetic_book(), &InMemoryRules::default()).unwrap();
    let mut phrases: Vec<(PhraseId, Phrase)> = stored
        .into_iter()
        .map(|StoredPhrase { id, phrase }| (id, phrase))
        .collect();
    phrases.sort_by_key(|(id, _)| *id);

    // One paragraph per verse.
    let mut paragraphs = Vec::new();
    let mut verse_ids: Vec<(Reference, PhraseId, PhraseId)> = Vec::new();
    for (id, phrase) in &phrases {
        match verse_ids.last_mut() {
            Some((reference, _, end)) if *reference == phrase.normalized => *end = *id,
            _ => verse_ids.push((phrase.normalized, *id, *id)),
        }
    }
    for (_, start, end) in verse_ids {
        paragraphs.push(ParagraphRange {
            version_id: 1,
            start,
            end,
        });
    }
    (phrases, paragraphs)
}

fn bench_encode(c: &mut Criterion) {
    let genesis = BookTable::id_for("Gen").unwrap();
    c.bench_function("encode_reference", |b| {
        b.iter(|| {
            let mut total = 0u64;
            for chapter in 1..=50u32 {
                for verse in 1..=30u32 {
                    total += encode_reference(&Reference::new(genesis, chapter, verse))
                        .unwrap()
                        .as_u64();
                }
            }
            total
        });
    });
}

fn bench_import(c: &mut Criterion) {
    let genesis = BookTable::id_for("Gen").unwrap();
    let rules = InMemoryRules::default();
    let input = synthetic_book();
    c.bench_function("import_book", |b| {
        b.iter(|| import_book(genesis, 1, &input, &rules).unwrap());
    });
}

fn bench_assemble(c: &mut Criterion) {
    let (phrases, paragraphs) = imported();
    c.bench_function("assemble_book", |b| {
        b.iter(|| assemble(&phrases, &paragraphs, &[]).unwrap());
    });
}

fn bench_window_query(c: &mut Criterion) {
    let genesis = BookTable::id_for("Gen").unwrap();
    let (phrases, paragraphs) = imported();
    let range = ReferenceRange::new(Reference::new(genesis, 5, 1))
        .with_end_chapter(5)
        .with_end_verse(25);
    let (start, end) = phrase_bounds(&range).unwrap();
    c.bench_function("assemble_chapter_window", |b| {
        b.iter(|| {
            let window: Vec<_> = phrases
                .iter()
                .filter(|(id, _)| start <= *id && *id <= end)
                .cloned()
                .collect();
            assemble(&window, &paragraphs, &[]).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_import,
    bench_assemble,
    bench_window_query
);
criterion_main!(benches);
