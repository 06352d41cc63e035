//! # versicle
//!
//! A library for storing and reconstructing structured scripture text.
//!
//! Three pieces fit together:
//!
//! - a **reference codec** that packs book/chapter/verse/subverse
//!   references into single integers whose numeric ordering equals
//!   canonical document ordering, so storage range-scans with plain
//!   `BETWEEN`-style bounds;
//! - a **versification normalizer** that maps edition-specific verse
//!   numbering onto the canonical scheme through an ordered rule table
//!   with textual test predicates, synthesizing placeholder phrases for
//!   merged or empty slots;
//! - a **content tree assembler** that rebuilds a nested document
//!   (sections, paragraphs, formatting groups, phrases) from a flat,
//!   id-ordered phrase stream.
//!
//! Persistence, transport, and rendering live behind the
//! [`StorageReader`]/[`RuleRepository`] seams and an external serializer;
//! this crate performs no I/O.
//!
//! ## Quick Start
//!
//! ```
//! use versicle::{BookTable, Reference, ReferenceRange, encode_reference, range_bounds};
//!
//! let genesis = BookTable::id_for("Gen").unwrap();
//!
//! // Reference ids order exactly like the canon.
//! let verse = encode_reference(&Reference::new(genesis, 1, 1)).unwrap();
//! assert_eq!(verse.as_u64(), 100_100_100);
//!
//! // Unbounded range ends close over the widest possible window.
//! let range = ReferenceRange::new(Reference::new(genesis, 1, 1));
//! let (start, end) = range_bounds(&range).unwrap();
//! assert!(start <= verse && verse <= end);
//! ```
//!
//! ## Importing and assembling
//!
//! An edition's raw phrases run through [`import_book`] once to receive
//! normalized references and storage keys; query results run through
//! [`assemble`] to become an output tree:
//!
//! ```
//! use versicle::{BookTable, InMemoryRules, InputPhrase, assemble, import_book};
//!
//! let genesis = BookTable::id_for("Gen").unwrap();
//! let rules = InMemoryRules::default();
//! let phrases = vec![InputPhrase {
//!     text: "In the beginning".into(),
//!     chapter: Some(1),
//!     verse: Some(1),
//!     ..Default::default()
//! }];
//!
//! let stored = import_book(genesis, 1, &phrases, &rules).unwrap();
//! let fetched: Vec<_> = stored.iter().map(|p| (p.id, p.phrase.clone())).collect();
//! let tree = assemble(&fetched, &[], &[]).unwrap();
//! assert_eq!(tree.children(tree.root()).len(), 1);
//! ```

pub mod book;
pub mod codec;
pub mod content;
pub mod error;
pub mod reference;
pub mod v11n;

pub use book::{BookId, BookTable};
pub use codec::{
    PhraseId, ReferenceId, book_bounds, decode_phrase_ref, decode_reference, encode_phrase_ref,
    encode_reference, phrase_bounds, range_bounds,
};
pub use content::{
    DocTree, GroupKind, Modifiers, NodeId, NodeKind, Numbering, OutputNode, ParagraphRange,
    Phrase, SectionRange, StorageReader, assemble,
};
pub use error::{Error, Result};
pub use reference::{PhraseRef, Reference, ReferenceRange};
pub use v11n::{
    InMemoryRules, InputPhrase, Normalized, Normalizer, Placeholder, PlaintextContext, RuleAction,
    RuleRepository, RuleTest, StoredPhrase, V11nRule, import_book, is_test_matching,
};
