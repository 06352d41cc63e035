//! Reference value types: single references, ranges, and phrase keys.
//!
//! A [`Reference`] names a position in the canon down to an optional
//! subverse. The same shape serves both flavors of numbering — the
//! version-numbered references an edition was authored with, and the
//! normalized references produced by versification — with the flavor
//! carried by context: a stored phrase holds its version numbers and its
//! normalized reference side by side.

use std::fmt;

use crate::book::BookId;

/// A position in the canon: book, optional chapter, verse, and subverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reference {
    pub book: BookId,
    pub chapter: Option<u32>,
    pub verse: Option<u32>,
    pub subverse: Option<u32>,
}

impl Reference {
    /// Chapter-and-verse reference, the common case.
    pub fn new(book: BookId, chapter: u32, verse: u32) -> Self {
        Self {
            book,
            chapter: Some(chapter),
            verse: Some(verse),
            subverse: None,
        }
    }

    /// Whole-book reference with no chapter component. References without a
    /// chapter need no normalization.
    pub fn book_only(book: BookId) -> Self {
        Self {
            book,
            chapter: None,
            verse: None,
            subverse: None,
        }
    }

    /// Chapter reference with no verse component.
    pub fn chapter_only(book: BookId, chapter: u32) -> Self {
        Self {
            book,
            chapter: Some(chapter),
            verse: None,
            subverse: None,
        }
    }

    pub fn with_subverse(mut self, subverse: u32) -> Self {
        self.subverse = Some(subverse);
        self
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.book)?;
        if let Some(chapter) = self.chapter {
            write!(f, " {}", chapter)?;
            if let Some(verse) = self.verse {
                write!(f, ":{}", verse)?;
                if let Some(subverse) = self.subverse {
                    write!(f, ".{}", subverse)?;
                }
            }
        }
        Ok(())
    }
}

/// A reference plus an optional end position. Missing end fields leave the
/// range open; the codec closes them over the widest possible window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferenceRange {
    pub start: Reference,
    pub end_chapter: Option<u32>,
    pub end_verse: Option<u32>,
    pub end_subverse: Option<u32>,
}

impl ReferenceRange {
    /// Range with an unbounded end.
    pub fn new(start: Reference) -> Self {
        Self {
            start,
            end_chapter: None,
            end_verse: None,
            end_subverse: None,
        }
    }

    pub fn with_end_chapter(mut self, chapter: u32) -> Self {
        self.end_chapter = Some(chapter);
        self
    }

    pub fn with_end_verse(mut self, verse: u32) -> Self {
        self.end_verse = Some(verse);
        self
    }

    pub fn with_end_subverse(mut self, subverse: u32) -> Self {
        self.end_subverse = Some(subverse);
        self
    }
}

/// Storage key for one phrase: its normalized reference, the edition it
/// belongs to, and its position among phrases sharing the same normalized
/// verse and subverse in that edition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PhraseRef {
    pub reference: Reference,
    pub version_id: u32,
    pub ordinal: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookTable;

    #[test]
    fn display_formats() {
        let genesis = BookTable::id_for("Gen").unwrap();
        assert_eq!(Reference::book_only(genesis).to_string(), "Gen");
        assert_eq!(Reference::chapter_only(genesis, 3).to_string(), "Gen 3");
        assert_eq!(Reference::new(genesis, 1, 2).to_string(), "Gen 1:2");
        assert_eq!(
            Reference::new(genesis, 1, 2).with_subverse(3).to_string(),
            "Gen 1:2.3"
        );
    }

    #[test]
    fn range_builders() {
        let genesis = BookTable::id_for("Gen").unwrap();
        let range = ReferenceRange::new(Reference::new(genesis, 1, 1))
            .with_end_chapter(2)
            .with_end_verse(25);
        assert_eq!(range.end_chapter, Some(2));
        assert_eq!(range.end_verse, Some(25));
        assert_eq!(range.end_subverse, None);
    }
}
