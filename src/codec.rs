//! Integer packing of references and phrase keys.
//!
//! A reference packs into a single integer whose numeric ordering equals
//! canonical document ordering, so storage can range-scan with plain
//! `BETWEEN`-style comparisons instead of multi-column indexes. Fields are
//! zero-padded decimal, most significant first:
//!
//! - `ReferenceId`: book(2) | chapter(3) | verse(3) | subverse(2)
//! - `PhraseId`:    reference(10) | version(3) | ordinal(2)
//!
//! Missing fields encode as zeros and decode back to `None`; a field value
//! that exceeds its width is a caller error and is rejected, never
//! truncated.

use std::fmt;

use crate::book::BookId;
use crate::error::{Error, Result};
use crate::reference::{PhraseRef, Reference, ReferenceRange};

pub const CHAPTER_MAX: u32 = 999;
pub const VERSE_MAX: u32 = 999;
pub const SUBVERSE_MAX: u32 = 99;
pub const VERSION_MAX: u32 = 999;
pub const ORDINAL_MAX: u32 = 99;

const BOOK_UNIT: u64 = 100_000_000;
const CHAPTER_UNIT: u64 = 100_000;
const VERSE_UNIT: u64 = 100;
const PHRASE_UNIT: u64 = 100_000;
const VERSION_UNIT: u64 = 100;

/// Packed normalized reference, ordered exactly like the canon.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(transparent)]
pub struct ReferenceId(pub u64);

impl ReferenceId {
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn from_u64(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Packed phrase key, ordered exactly like the document.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(transparent)]
pub struct PhraseId(pub u64);

impl PhraseId {
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn from_u64(v: u64) -> Self {
        Self(v)
    }

    /// The reference portion of this key.
    #[inline]
    pub fn reference_id(self) -> ReferenceId {
        ReferenceId(self.0 / PHRASE_UNIT)
    }
}

impl fmt::Display for PhraseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn field(value: Option<u32>, max: u32, name: &'static str) -> Result<u64> {
    match value {
        None => Ok(0),
        Some(v) if v <= max => Ok(v as u64),
        Some(v) => Err(Error::FieldOverflow {
            field: name,
            value: v as u64,
        }),
    }
}

fn nonzero(v: u32) -> Option<u32> {
    if v == 0 { None } else { Some(v) }
}

/// Pack a normalized reference into its id.
pub fn encode_reference(reference: &Reference) -> Result<ReferenceId> {
    let book = reference.book.as_u8() as u64;
    let chapter = field(reference.chapter, CHAPTER_MAX, "chapter")?;
    let verse = field(reference.verse, VERSE_MAX, "verse")?;
    let subverse = field(reference.subverse, SUBVERSE_MAX, "subverse")?;
    Ok(ReferenceId(
        book * BOOK_UNIT + chapter * CHAPTER_UNIT + verse * VERSE_UNIT + subverse,
    ))
}

/// Unpack a reference id. Zero fields decode to `None`.
pub fn decode_reference(id: ReferenceId) -> Result<Reference> {
    let raw = id.0;
    let book_num = raw / BOOK_UNIT;
    if book_num > BookId::MAX as u64 {
        return Err(Error::InvalidBookId(book_num));
    }
    let book = BookId::new(book_num as u8)?;
    Ok(Reference {
        book,
        chapter: nonzero((raw / CHAPTER_UNIT % 1000) as u32),
        verse: nonzero((raw / VERSE_UNIT % 1000) as u32),
        subverse: nonzero((raw % 100) as u32),
    })
}

/// Pack a phrase key into its id.
pub fn encode_phrase_ref(phrase: &PhraseRef) -> Result<PhraseId> {
    let reference = encode_reference(&phrase.reference)?;
    let version = field(Some(phrase.version_id), VERSION_MAX, "version")?;
    let ordinal = field(Some(phrase.ordinal), ORDINAL_MAX, "ordinal")?;
    Ok(PhraseId(
        reference.0 * PHRASE_UNIT + version * VERSION_UNIT + ordinal,
    ))
}

/// Unpack a phrase id.
pub fn decode_phrase_ref(id: PhraseId) -> Result<PhraseRef> {
    let reference = decode_reference(id.reference_id())?;
    Ok(PhraseRef {
        reference,
        version_id: (id.0 / VERSION_UNIT % 1000) as u32,
        ordinal: (id.0 % 100) as u32,
    })
}

/// Closed id interval covering a reference range.
///
/// The start encodes normally (missing fields as zeros); unset end fields
/// take their maximal value, so an unbounded range still yields a closed
/// numeric interval.
pub fn range_bounds(range: &ReferenceRange) -> Result<(ReferenceId, ReferenceId)> {
    let start = encode_reference(&range.start)?;
    let book = range.start.book.as_u8() as u64;
    let chapter = match range.end_chapter {
        Some(c) => field(Some(c), CHAPTER_MAX, "end chapter")?,
        None => CHAPTER_MAX as u64,
    };
    let verse = match range.end_verse {
        Some(v) => field(Some(v), VERSE_MAX, "end verse")?,
        None => VERSE_MAX as u64,
    };
    let subverse = match range.end_subverse {
        Some(s) => field(Some(s), SUBVERSE_MAX, "end subverse")?,
        None => SUBVERSE_MAX as u64,
    };
    let end = book * BOOK_UNIT + chapter * CHAPTER_UNIT + verse * VERSE_UNIT + subverse;
    Ok((start, ReferenceId(end)))
}

/// Closed id interval covering a whole book.
pub fn book_bounds(book: BookId) -> (ReferenceId, ReferenceId) {
    let base = book.as_u8() as u64 * BOOK_UNIT;
    let span = CHAPTER_MAX as u64 * CHAPTER_UNIT + VERSE_MAX as u64 * VERSE_UNIT + SUBVERSE_MAX as u64;
    (ReferenceId(base), ReferenceId(base + span))
}

/// Closed phrase-id interval covering a reference range, with the version
/// and ordinal fields widened to their full span.
pub fn phrase_bounds(range: &ReferenceRange) -> Result<(PhraseId, PhraseId)> {
    let (start, end) = range_bounds(range)?;
    let tail = VERSION_MAX as u64 * VERSION_UNIT + ORDINAL_MAX as u64;
    Ok((
        PhraseId(start.0 * PHRASE_UNIT),
        PhraseId(end.0 * PHRASE_UNIT + tail),
    ))
}
