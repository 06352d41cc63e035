//! Per-book plaintext context consulted by rule test predicates.

use std::collections::{BTreeMap, HashMap};

/// Plaintext of one book, keyed by version chapter and verse, with each
/// verse's text split into subverse slots.
///
/// Built by the caller from the raw input before normalization; read-only
/// afterwards. Slot 0 holds a verse's subverse-less text, or its
/// title/preamble when the verse is split; slot `n` holds subverse `n`.
/// Empty slots mark subverses the edition does not carry.
#[derive(Debug, Clone, Default)]
pub struct PlaintextContext {
    chapters: HashMap<u32, BTreeMap<u32, Vec<String>>>,
}

impl PlaintextContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate phrase text under a chapter/verse/subverse slot. Repeated
    /// additions to one slot are joined with single spaces.
    pub fn add_text(&mut self, chapter: u32, verse: u32, subverse: Option<u32>, text: &str) {
        let slot = subverse.unwrap_or(0) as usize;
        let slots = self
            .chapters
            .entry(chapter)
            .or_default()
            .entry(verse)
            .or_default();
        if slots.len() <= slot {
            slots.resize(slot + 1, String::new());
        }
        let entry = &mut slots[slot];
        if !entry.is_empty() && !text.is_empty() {
            entry.push(' ');
        }
        entry.push_str(text);
    }

    fn slots(&self, chapter: u32, verse: u32) -> Option<&[String]> {
        self.chapters
            .get(&chapter)
            .and_then(|verses| verses.get(&verse))
            .map(|slots| slots.as_slice())
    }

    /// Whether the verse carries any text at all.
    pub fn verse_exists(&self, chapter: u32, verse: u32) -> bool {
        self.slots(chapter, verse)
            .is_some_and(|slots| slots.iter().any(|text| !text.is_empty()))
    }

    /// Whether the verse is the last one present in its chapter.
    pub fn is_last_verse(&self, chapter: u32, verse: u32) -> bool {
        self.verse_exists(chapter, verse) && !self.verse_exists(chapter, verse + 1)
    }

    /// Subverse presence probe.
    ///
    /// Index 0 asks whether a title/preamble slot exists, index 1 whether
    /// the verse is subverse-split at all (probed through slot 0 or any
    /// slot above 1), and a higher index whether at least that many
    /// subverses exist. The 0/1 treatment mirrors the rule data this crate
    /// consumes; see DESIGN.md.
    pub fn subverse_exists(&self, chapter: u32, verse: u32, index: u32) -> bool {
        let Some(slots) = self.slots(chapter, verse) else {
            return false;
        };
        let filled = |i: usize| slots.get(i).is_some_and(|text| !text.is_empty());
        match index {
            0 => filled(0) && slots.len() > 1,
            1 => (filled(0) && slots.len() > 1) || (2..slots.len()).any(filled),
            n => (n as usize..slots.len()).any(filled),
        }
    }

    /// Text length of a comparison operand: a specific subverse slot, or
    /// the whole verse joined with spaces.
    pub fn text_len(&self, chapter: u32, verse: u32, subverse: Option<u32>) -> usize {
        let Some(slots) = self.slots(chapter, verse) else {
            return 0;
        };
        match subverse {
            Some(index) => slots.get(index as usize).map_or(0, |text| text.len()),
            None => {
                let total: usize = slots.iter().map(|text| text.len()).sum();
                let gaps = slots
                    .iter()
                    .filter(|text| !text.is_empty())
                    .count()
                    .saturating_sub(1);
                total + gaps
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis_opening() -> PlaintextContext {
        let mut ctx = PlaintextContext::new();
        ctx.add_text(1, 1, None, "in the beginning");
        ctx.add_text(1, 2, None, "let there be light");
        ctx
    }

    #[test]
    fn verse_presence() {
        let ctx = genesis_opening();
        assert!(ctx.verse_exists(1, 1));
        assert!(ctx.verse_exists(1, 2));
        assert!(!ctx.verse_exists(1, 3));
        assert!(!ctx.verse_exists(2, 1));
    }

    #[test]
    fn last_verse() {
        let ctx = genesis_opening();
        assert!(!ctx.is_last_verse(1, 1));
        assert!(ctx.is_last_verse(1, 2));
        assert!(!ctx.is_last_verse(1, 3));
    }

    #[test]
    fn slot_accumulation_joins_with_spaces() {
        let mut ctx = PlaintextContext::new();
        ctx.add_text(1, 1, None, "in the");
        ctx.add_text(1, 1, None, "beginning");
        assert_eq!(ctx.text_len(1, 1, None), "in the beginning".len());
    }

    #[test]
    fn subverse_probes() {
        let mut ctx = PlaintextContext::new();
        // Unsplit verse: no title, no splitting.
        ctx.add_text(3, 1, None, "plain verse");
        assert!(!ctx.subverse_exists(3, 1, 0));
        assert!(!ctx.subverse_exists(3, 1, 1));

        // Split verse with a title slot.
        ctx.add_text(3, 2, Some(0), "a psalm of david");
        ctx.add_text(3, 2, Some(1), "first part");
        assert!(ctx.subverse_exists(3, 2, 0));
        assert!(ctx.subverse_exists(3, 2, 1));
        assert!(!ctx.subverse_exists(3, 2, 2));

        // Split verse without a title.
        ctx.add_text(3, 3, Some(1), "first part");
        ctx.add_text(3, 3, Some(2), "second part");
        assert!(!ctx.subverse_exists(3, 3, 0));
        assert!(ctx.subverse_exists(3, 3, 1));
        assert!(ctx.subverse_exists(3, 3, 2));
        assert!(!ctx.subverse_exists(3, 3, 3));
    }

    #[test]
    fn whole_verse_length_counts_slot_gaps() {
        let mut ctx = PlaintextContext::new();
        ctx.add_text(1, 4, Some(1), "abc");
        ctx.add_text(1, 4, Some(2), "de");
        assert_eq!(ctx.text_len(1, 4, None), 6); // "abc de"
        assert_eq!(ctx.text_len(1, 4, Some(1)), 3);
        assert_eq!(ctx.text_len(1, 4, Some(3)), 0);
    }
}
