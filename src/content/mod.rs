//! Content model and document reconstruction.
//!
//! Storage holds one flat, id-ordered stream of phrases per edition, plus
//! paragraph and section ranges defined as contiguous phrase-id intervals.
//! The [`assemble`] pass rebuilds a nested document tree from those three
//! inputs; the types here are the shared vocabulary between the normalizer,
//! the assembler, and the storage collaborator.

pub mod assemble;
pub mod tree;

pub use assemble::assemble;
pub use tree::{DocTree, NodeId, NodeKind, Numbering, OutputNode};

use crate::codec::{PhraseId, ReferenceId};
use crate::reference::Reference;

/// Inline formatting and grouping state carried by each phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Modifiers {
    /// List item kind, when the phrase belongs to a list entry.
    pub list_item: Option<String>,
    /// Indentation depth, 0 = none.
    pub indent: u32,
    /// Quotation nesting depth, 0 = none.
    pub quote: u32,
    pub emphasis: bool,
    pub bold: bool,
    pub italic: bool,
    /// Marks text altered relative to the translation base.
    pub translation_change: Option<String>,
    /// Speaker attribution.
    pub person: Option<String>,
    /// Divine-name styling (small caps in most renderings).
    pub divine_name: bool,
}

/// One phrase of an edition's text with its normalized position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Phrase {
    pub text: String,
    pub version_chapter: Option<u32>,
    pub version_verse: Option<u32>,
    pub version_subverse: Option<u32>,
    pub normalized: Reference,
    pub modifiers: Modifiers,
    /// For a placeholder: the start of the merge range that absorbed its
    /// slot. For the first phrase of a merge range: the end of the range.
    pub join_to: Option<ReferenceId>,
    /// Versification rule family that placed this phrase, if any.
    pub source_type: Option<u32>,
}

impl Phrase {
    /// Content-less phrase standing in for a canonical slot the edition
    /// does not carry.
    pub fn placeholder(
        normalized: Reference,
        join_to: Option<ReferenceId>,
        source_type: u32,
    ) -> Self {
        Self {
            text: String::new(),
            version_chapter: None,
            version_verse: None,
            version_subverse: None,
            normalized,
            modifiers: Modifiers::default(),
            join_to,
            source_type: Some(source_type),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.text.is_empty() && self.version_chapter.is_none() && self.version_verse.is_none()
    }
}

/// Contiguous phrase-id interval grouped into one paragraph. Paragraphs
/// never nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParagraphRange {
    pub version_id: u32,
    pub start: PhraseId,
    pub end: PhraseId,
}

/// Contiguous phrase-id interval grouped under one section heading.
/// Sections nest strictly by increasing level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRange {
    pub version_id: u32,
    pub level: u8,
    pub start: PhraseId,
    pub end: PhraseId,
    pub title: Option<String>,
}

/// Storage access contract the assembler's caller satisfies.
///
/// The assembler itself performs no I/O: it consumes pre-fetched,
/// pre-sorted results. Suspension, retries, and atomicity all live behind
/// this trait.
pub trait StorageReader {
    /// Phrases with ids in `[start, end]`, ordered by id.
    fn phrases_in_range(
        &self,
        start: PhraseId,
        end: PhraseId,
        version_id: Option<u32>,
    ) -> Vec<(PhraseId, Phrase)>;

    /// Paragraph ranges intersecting the window.
    fn paragraphs_in_window(&self, start: PhraseId, end: PhraseId) -> Vec<ParagraphRange>;

    /// Section ranges intersecting the window.
    fn sections_in_window(&self, start: PhraseId, end: PhraseId) -> Vec<SectionRange>;
}

/// Kind of a formatting group node, one variant per modifier axis.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum GroupKind {
    ListItem(String),
    Indent(u32),
    Quote(u32),
    Emphasis,
    Bold,
    Italic,
    TranslationChange(String),
    Person(String),
    DivineName,
}
