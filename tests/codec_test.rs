//! Codec laws: round-trip and order preservation across the id space.

use proptest::prelude::*;

use versicle::{
    BookId, PhraseRef, Reference, ReferenceRange, decode_phrase_ref, decode_reference,
    encode_phrase_ref, encode_reference, phrase_bounds, range_bounds,
};

fn valid_book_ids() -> Vec<u8> {
    (1..=87).filter(|id| !(67..=69).contains(id)).collect()
}

fn reference_strategy() -> impl Strategy<Value = Reference> {
    (
        prop::sample::select(valid_book_ids()),
        0u32..=999,
        0u32..=999,
        0u32..=99,
    )
        .prop_map(|(book, chapter, verse, subverse)| Reference {
            book: BookId::new(book).unwrap(),
            chapter: (chapter > 0).then_some(chapter),
            verse: (verse > 0).then_some(verse),
            subverse: (subverse > 0).then_some(subverse),
        })
}

fn phrase_ref_strategy() -> impl Strategy<Value = PhraseRef> {
    (reference_strategy(), 0u32..=999, 0u32..=99).prop_map(|(reference, version_id, ordinal)| {
        PhraseRef {
            reference,
            version_id,
            ordinal,
        }
    })
}

/// Canonical document order: book, then chapter, verse, subverse, with
/// missing fields sorting first.
fn canonical_order(a: &Reference, b: &Reference) -> std::cmp::Ordering {
    let key = |r: &Reference| {
        (
            r.book.as_u8(),
            r.chapter.unwrap_or(0),
            r.verse.unwrap_or(0),
            r.subverse.unwrap_or(0),
        )
    };
    key(a).cmp(&key(b))
}

proptest! {
    #[test]
    fn reference_round_trip(reference in reference_strategy()) {
        let id = encode_reference(&reference).unwrap();
        prop_assert_eq!(decode_reference(id).unwrap(), reference);
    }

    #[test]
    fn phrase_ref_round_trip(phrase in phrase_ref_strategy()) {
        let id = encode_phrase_ref(&phrase).unwrap();
        prop_assert_eq!(decode_phrase_ref(id).unwrap(), phrase);
    }

    #[test]
    fn encoding_preserves_canonical_order(a in reference_strategy(), b in reference_strategy()) {
        let id_a = encode_reference(&a).unwrap();
        let id_b = encode_reference(&b).unwrap();
        prop_assert_eq!(id_a.cmp(&id_b), canonical_order(&a, &b));
    }

    #[test]
    fn range_bounds_enclose_every_member(reference in reference_strategy()) {
        // A book-scoped range must contain every reference of that book.
        let range = ReferenceRange::new(Reference::book_only(reference.book));
        let (start, end) = range_bounds(&range).unwrap();
        let id = encode_reference(&reference).unwrap();
        prop_assert!(start <= id && id <= end);
    }

    #[test]
    fn phrase_bounds_enclose_every_member(phrase in phrase_ref_strategy()) {
        let range = ReferenceRange::new(Reference::book_only(phrase.reference.book));
        let (start, end) = phrase_bounds(&range).unwrap();
        let id = encode_phrase_ref(&phrase).unwrap();
        prop_assert!(start <= id && id <= end);
    }
}
