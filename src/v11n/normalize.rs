//! Normalization of one book's phrase stream.
//!
//! Phrases arrive in document order carrying version numbering. Whenever
//! the version position changes, the rule table decides how that position
//! maps onto the canonical numbering; phrases between changes inherit the
//! mapping and receive consecutive ordinals. Placeholder phrases are
//! synthesized for canonical slots the edition merged away or left empty.
//!
//! Processing is strictly sequential within a book: every step depends on
//! the running state (current position, open merge range, claimed
//! references). Separate books share nothing and may be imported in
//! parallel.

use std::collections::HashSet;

use log::{debug, trace};

use crate::book::BookId;
use crate::codec::{PhraseId, ReferenceId, encode_phrase_ref, encode_reference};
use crate::content::{Modifiers, Phrase};
use crate::error::{Error, Result};
use crate::reference::{PhraseRef, Reference};

use super::context::PlaintextContext;
use super::test_expr::RuleTest;
use super::{RuleAction, RuleRepository};

/// A raw input phrase: version numbering plus content, as produced by an
/// import parser.
#[derive(Debug, Clone, Default)]
pub struct InputPhrase {
    pub text: String,
    pub chapter: Option<u32>,
    pub verse: Option<u32>,
    pub subverse: Option<u32>,
    pub modifiers: Modifiers,
}

/// A storage-ready phrase with its computed key.
#[derive(Debug, Clone)]
pub struct StoredPhrase {
    pub id: PhraseId,
    pub phrase: Phrase,
}

/// A content-less phrase synthesized for a canonical slot the edition does
/// not carry.
#[derive(Debug, Clone)]
pub struct Placeholder {
    pub reference: Reference,
    /// Start of the merge range that absorbed this slot, when one is open.
    pub join_to: Option<ReferenceId>,
    pub source_type: u32,
}

/// Outcome of normalizing one version position.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// Canonical reference for phrases at this position.
    pub reference: Reference,
    /// Rule family that decided the mapping, if any rule applied.
    pub source_type: Option<u32>,
    /// Placeholders to emit alongside this position.
    pub placeholders: Vec<Placeholder>,
    /// A renumber rule fired here, beginning a possible merge range.
    pub starts_range: bool,
}

/// Sequential normalizer for one book of one edition.
pub struct Normalizer<'a> {
    rules: &'a dyn RuleRepository,
    claimed: HashSet<u64>,
    range_start: Option<ReferenceId>,
    range_end: Option<ReferenceId>,
}

impl<'a> Normalizer<'a> {
    pub fn new(rules: &'a dyn RuleRepository) -> Self {
        Self {
            rules,
            claimed: HashSet::new(),
            range_start: None,
            range_end: None,
        }
    }

    /// Map one version-numbered position onto the canonical numbering.
    ///
    /// The first passing `Keep`/`Renumber` rule fixes the mapping; every
    /// passing `MergedAbove`/`Empty` rule emits its placeholder. With no
    /// applicable rule the version numbering is already canonical.
    pub fn normalize(&mut self, version: &Reference, ctx: &PlaintextContext) -> Result<Normalized> {
        // No chapter means nothing to normalize (book intros and the like).
        if version.chapter.is_none() {
            return Ok(Normalized {
                reference: *version,
                source_type: None,
                placeholders: Vec::new(),
                starts_range: false,
            });
        }

        let mut mapped: Option<Reference> = None;
        let mut source_type = None;
        let mut placeholders = Vec::new();
        let mut starts_range = false;

        for rule in self.rules.rules_for_source(version) {
            if !RuleTest::parse(&rule.test)?.matches(ctx) {
                continue;
            }
            trace!("rule {} ({:?}) applies at {}", rule.id, rule.action, version);
            match rule.action {
                RuleAction::Keep => {
                    if mapped.is_none() {
                        mapped = Some(*version);
                        source_type = Some(rule.source_type);
                    }
                }
                RuleAction::Renumber => {
                    if mapped.is_none() {
                        let id = encode_reference(&rule.standard)?;
                        mapped = Some(rule.standard);
                        source_type = Some(rule.source_type);
                        self.range_start = Some(id);
                        self.range_end = Some(id);
                        starts_range = true;
                    }
                }
                RuleAction::MergedAbove => {
                    let id = encode_reference(&rule.standard)?;
                    placeholders.push(Placeholder {
                        reference: rule.standard,
                        join_to: self.range_start,
                        source_type: rule.source_type,
                    });
                    self.range_end = Some(self.range_end.map_or(id, |end| end.max(id)));
                }
                RuleAction::Empty => {
                    placeholders.push(Placeholder {
                        reference: rule.standard,
                        join_to: None,
                        source_type: rule.source_type,
                    });
                }
            }
        }

        let reference = mapped.unwrap_or(*version);
        self.claim(&reference)?;
        for placeholder in &placeholders {
            self.claim(&placeholder.reference)?;
        }

        Ok(Normalized {
            reference,
            source_type,
            placeholders,
            starts_range,
        })
    }

    /// Start of the merge range currently open, if any.
    pub fn range_start(&self) -> Option<ReferenceId> {
        self.range_start
    }

    /// Largest canonical id linked into the merge range currently open.
    pub fn range_end(&self) -> Option<ReferenceId> {
        self.range_end
    }

    fn claim(&mut self, reference: &Reference) -> Result<()> {
        let id = encode_reference(reference)?;
        if !self.claimed.insert(id.as_u64()) {
            return Err(Error::DuplicateNormalizedReference(id.as_u64()));
        }
        Ok(())
    }
}

/// Ingest one book of one edition: build the plaintext context, normalize
/// the phrase stream, assign ordinals, and compute storage keys.
///
/// All-or-nothing: the first error aborts the import with nothing emitted.
pub fn import_book(
    book: BookId,
    version_id: u32,
    phrases: &[InputPhrase],
    rules: &dyn RuleRepository,
) -> Result<Vec<StoredPhrase>> {
    let mut ctx = PlaintextContext::new();
    for phrase in phrases {
        if let (Some(chapter), Some(verse)) = (phrase.chapter, phrase.verse) {
            ctx.add_text(chapter, verse, phrase.subverse, &phrase.text);
        }
    }

    let mut normalizer = Normalizer::new(rules);
    let mut out: Vec<StoredPhrase> = Vec::with_capacity(phrases.len());
    let mut position: Option<(Option<u32>, Option<u32>, Option<u32>)> = None;
    let mut current_ref = Reference::book_only(book);
    let mut current_source: Option<u32> = None;
    let mut ordinal = 0u32;
    // First phrase of the open merge range, patched to point at the range
    // end once the range is complete.
    let mut range_first: Option<usize> = None;

    for phrase in phrases {
        let triple = (phrase.chapter, phrase.verse, phrase.subverse);
        if position != Some(triple) {
            let version = Reference {
                book,
                chapter: phrase.chapter,
                verse: phrase.verse,
                subverse: phrase.subverse,
            };
            let prev_start = normalizer.range_start();
            let prev_end = normalizer.range_end();
            let outcome = normalizer.normalize(&version, &ctx)?;
            if outcome.starts_range {
                link_range_start(&mut out, range_first.take(), prev_start, prev_end);
            }
            for placeholder in &outcome.placeholders {
                let id = encode_phrase_ref(&PhraseRef {
                    reference: placeholder.reference,
                    version_id,
                    ordinal: 1,
                })?;
                out.push(StoredPhrase {
                    id,
                    phrase: Phrase::placeholder(
                        placeholder.reference,
                        placeholder.join_to,
                        placeholder.source_type,
                    ),
                });
            }
            if outcome.starts_range {
                range_first = Some(out.len());
            }
            position = Some(triple);
            current_ref = outcome.reference;
            current_source = outcome.source_type;
            ordinal = 0;
        }

        ordinal += 1;
        let id = encode_phrase_ref(&PhraseRef {
            reference: current_ref,
            version_id,
            ordinal,
        })?;
        out.push(StoredPhrase {
            id,
            phrase: Phrase {
                text: phrase.text.clone(),
                version_chapter: phrase.chapter,
                version_verse: phrase.verse,
                version_subverse: phrase.subverse,
                normalized: current_ref,
                modifiers: phrase.modifiers.clone(),
                join_to: None,
                source_type: current_source,
            },
        });
    }
    link_range_start(
        &mut out,
        range_first.take(),
        normalizer.range_start(),
        normalizer.range_end(),
    );

    debug!(
        "imported {} phrases as {} records for {} version {}",
        phrases.len(),
        out.len(),
        book,
        version_id
    );
    Ok(out)
}

/// Point the first phrase of a completed merge range forward at the true
/// end of the range.
fn link_range_start(
    out: &mut [StoredPhrase],
    first: Option<usize>,
    start: Option<ReferenceId>,
    end: Option<ReferenceId>,
) {
    if let (Some(index), Some(start), Some(end)) = (first, start, end) {
        if end > start && index < out.len() {
            out[index].phrase.join_to = Some(end);
        }
    }
}
