//! Reconstruction of a nested document from a flat phrase stream.
//!
//! The assembler walks phrases in id order with a single active-group
//! pointer into the growing tree. Each phrase first closes every group it
//! no longer belongs to (one upward sweep over all ancestors, so a later
//! sibling can never re-enter a group that should have been split), then
//! opens the sections, paragraph, and formatting groups it needs, picks up
//! a numbering annotation when reference fields advance, and lands as a
//! leaf. One sequential pass per query; no state survives the call.

use std::collections::BTreeMap;

use log::debug;

use crate::codec::PhraseId;
use crate::error::{Error, Result};

use super::tree::{DocTree, NodeId, NodeKind, Numbering, OutputNode};
use super::{GroupKind, ParagraphRange, Phrase, SectionRange};

/// Open sections, paragraph, and modifier values collected from the active
/// path after the close pass.
#[derive(Debug, Default)]
struct ActiveState {
    list_item: Option<String>,
    indent: u32,
    quote: u32,
    emphasis: bool,
    bold: bool,
    italic: bool,
    translation_change: Option<String>,
    person: Option<String>,
    divine_name: bool,
    /// Open sections as (level, start, end), innermost first.
    sections: Vec<(u8, PhraseId, PhraseId)>,
    /// Open paragraph interval.
    paragraph: Option<(PhraseId, PhraseId)>,
}

/// Numbering state of the previously appended phrase.
#[derive(Debug, Default)]
struct PrevNumbers {
    chapter: Option<u32>,
    verse: Option<u32>,
    version_chapter: Option<u32>,
    version_verse: Option<u32>,
}

/// Assemble one document tree from phrases sorted by id plus the paragraph
/// and section ranges of the query window.
pub fn assemble(
    phrases: &[(PhraseId, Phrase)],
    paragraphs: &[ParagraphRange],
    sections: &[SectionRange],
) -> Result<DocTree> {
    let mut by_level: BTreeMap<u8, Vec<&SectionRange>> = BTreeMap::new();
    for range in sections {
        by_level.entry(range.level).or_default().push(range);
    }
    let lowest_level = by_level.keys().next().copied();

    let mut tree = DocTree::new();
    let mut active = tree.root();
    let mut prev = PrevNumbers::default();

    for (id, phrase) in phrases {
        active = close_pass(&tree, active, *id, phrase);
        let state = collect_state(&tree, active);
        active = open_sections(&mut tree, active, &state, *id, lowest_level, &by_level)?;
        active = open_paragraph(&mut tree, active, &state, *id, paragraphs)?;
        active = open_groups(&mut tree, active, &state, phrase);
        let numbering = numbering_delta(&mut prev, phrase);
        append_phrase(&mut tree, active, *id, phrase, numbering)?;
    }

    debug!("assembled {} phrases into {} nodes", phrases.len(), tree.len());
    Ok(tree)
}

/// Close everything the phrase has left behind: the active group becomes
/// the parent of the outermost ancestor the phrase no longer belongs to.
/// Every ancestor is examined before anything reopens.
fn close_pass(tree: &DocTree, active: NodeId, id: PhraseId, phrase: &Phrase) -> NodeId {
    let mut next = active;
    for ancestor in tree.path_to_root(active) {
        if !belongs(tree.node(ancestor), id, phrase) {
            if let Some(parent) = tree.parent(ancestor) {
                next = parent;
            }
        }
    }
    next
}

/// Whether the phrase still belongs under a node: sections and paragraphs
/// by id interval, level groups by depth, value groups by equality, flag
/// groups by presence.
fn belongs(node: &OutputNode, id: PhraseId, phrase: &Phrase) -> bool {
    match &node.kind {
        NodeKind::Root => true,
        NodeKind::Section { end, .. } => id <= *end,
        NodeKind::Paragraph { end, .. } => id <= *end,
        NodeKind::Group(group) => group_holds(group, phrase),
        NodeKind::Phrase { .. } => false,
    }
}

fn group_holds(group: &GroupKind, phrase: &Phrase) -> bool {
    let m = &phrase.modifiers;
    match group {
        GroupKind::ListItem(kind) => m.list_item.as_deref() == Some(kind.as_str()),
        GroupKind::Indent(level) => m.indent >= *level,
        GroupKind::Quote(level) => m.quote >= *level,
        GroupKind::Emphasis => m.emphasis,
        GroupKind::Bold => m.bold,
        GroupKind::Italic => m.italic,
        GroupKind::TranslationChange(value) => {
            m.translation_change.as_deref() == Some(value.as_str())
        }
        GroupKind::Person(value) => m.person.as_deref() == Some(value.as_str()),
        GroupKind::DivineName => m.divine_name,
    }
}

/// Gather the open sections, paragraph, and modifier values along the
/// active path. Runs after the close pass so the closing decisions are
/// final before anything reopens.
fn collect_state(tree: &DocTree, active: NodeId) -> ActiveState {
    let mut state = ActiveState::default();
    for ancestor in tree.path_to_root(active) {
        match &tree.node(ancestor).kind {
            NodeKind::Section {
                level, start, end, ..
            } => state.sections.push((*level, *start, *end)),
            NodeKind::Paragraph { start, end } => {
                if state.paragraph.is_none() {
                    state.paragraph = Some((*start, *end));
                }
            }
            NodeKind::Group(group) => match group {
                GroupKind::ListItem(kind) => {
                    if state.list_item.is_none() {
                        state.list_item = Some(kind.clone());
                    }
                }
                GroupKind::Indent(level) => state.indent = state.indent.max(*level),
                GroupKind::Quote(level) => state.quote = state.quote.max(*level),
                GroupKind::Emphasis => state.emphasis = true,
                GroupKind::Bold => state.bold = true,
                GroupKind::Italic => state.italic = true,
                GroupKind::TranslationChange(value) => {
                    if state.translation_change.is_none() {
                        state.translation_change = Some(value.clone());
                    }
                }
                GroupKind::Person(value) => {
                    if state.person.is_none() {
                        state.person = Some(value.clone());
                    }
                }
                GroupKind::DivineName => state.divine_name = true,
            },
            NodeKind::Root | NodeKind::Phrase { .. } => {}
        }
    }
    state
}

/// Open, ascending by level, each section range covering this phrase that
/// is not already on the active path. Sections nest strictly: a deeper
/// level needs an enclosing section, and never opens under a paragraph or
/// formatting group.
fn open_sections(
    tree: &mut DocTree,
    mut active: NodeId,
    state: &ActiveState,
    id: PhraseId,
    lowest_level: Option<u8>,
    by_level: &BTreeMap<u8, Vec<&SectionRange>>,
) -> Result<NodeId> {
    let mut open = state.sections.clone();
    for (&level, ranges) in by_level {
        let Some(range) = ranges.iter().find(|r| r.start <= id && id <= r.end) else {
            continue;
        };
        if open
            .iter()
            .any(|&(l, s, e)| l == level && s == range.start && e == range.end)
        {
            continue;
        }
        match tree.node(active).kind {
            NodeKind::Root => {
                if Some(level) != lowest_level {
                    return Err(structural(
                        id,
                        format!("section level {level} opened with no enclosing section"),
                    ));
                }
            }
            NodeKind::Section {
                level: open_level, ..
            } => {
                if open_level >= level {
                    return Err(structural(
                        id,
                        format!("section level {level} cannot nest under level {open_level}"),
                    ));
                }
            }
            _ => {
                return Err(structural(
                    id,
                    format!("section level {level} opened under a non-section group"),
                ));
            }
        }
        active = tree.push_child(
            active,
            NodeKind::Section {
                level,
                title: range.title.clone(),
                start: range.start,
                end: range.end,
            },
        );
        open.push((level, range.start, range.end));
    }
    Ok(active)
}

/// Paragraphs never nest: a phrase covered by two ranges, or by a range
/// other than the open one, is corrupt range data.
fn open_paragraph(
    tree: &mut DocTree,
    active: NodeId,
    state: &ActiveState,
    id: PhraseId,
    paragraphs: &[ParagraphRange],
) -> Result<NodeId> {
    let mut covering = paragraphs.iter().filter(|r| r.start <= id && id <= r.end);
    let Some(range) = covering.next() else {
        return Ok(active);
    };
    if covering.next().is_some() {
        return Err(structural(
            id,
            "phrase covered by overlapping paragraph ranges".to_string(),
        ));
    }
    if let Some((start, end)) = state.paragraph {
        if start == range.start && end == range.end {
            return Ok(active);
        }
        return Err(structural(
            id,
            "paragraph opened inside an open paragraph".to_string(),
        ));
    }
    Ok(tree.push_child(
        active,
        NodeKind::Paragraph {
            start: range.start,
            end: range.end,
        },
    ))
}

/// Open the formatting groups the phrase needs, in fixed precedence order.
/// Each new group becomes the active one.
fn open_groups(
    tree: &mut DocTree,
    mut active: NodeId,
    state: &ActiveState,
    phrase: &Phrase,
) -> NodeId {
    let m = &phrase.modifiers;
    if let Some(kind) = &m.list_item {
        if state.list_item.as_deref() != Some(kind.as_str()) {
            active = tree.push_child(active, NodeKind::Group(GroupKind::ListItem(kind.clone())));
        }
    }
    if m.indent > state.indent {
        active = tree.push_child(active, NodeKind::Group(GroupKind::Indent(m.indent)));
    }
    if m.quote > state.quote {
        active = tree.push_child(active, NodeKind::Group(GroupKind::Quote(m.quote)));
    }
    if m.emphasis && !state.emphasis {
        active = tree.push_child(active, NodeKind::Group(GroupKind::Emphasis));
    }
    if m.bold && !state.bold {
        active = tree.push_child(active, NodeKind::Group(GroupKind::Bold));
    }
    if m.italic && !state.italic {
        active = tree.push_child(active, NodeKind::Group(GroupKind::Italic));
    }
    if let Some(value) = &m.translation_change {
        if state.translation_change.as_deref() != Some(value.as_str()) {
            active = tree.push_child(
                active,
                NodeKind::Group(GroupKind::TranslationChange(value.clone())),
            );
        }
    }
    if let Some(value) = &m.person {
        if state.person.as_deref() != Some(value.as_str()) {
            active = tree.push_child(active, NodeKind::Group(GroupKind::Person(value.clone())));
        }
    }
    if m.divine_name && !state.divine_name {
        active = tree.push_child(active, NodeKind::Group(GroupKind::DivineName));
    }
    active
}

/// Record which reference fields advanced since the previous phrase. A
/// chapter change whose verse is 0 or 1 marks the chapter itself as
/// starting (zero-indexed psalm titles) instead of a verse start.
fn numbering_delta(prev: &mut PrevNumbers, phrase: &Phrase) -> Option<Numbering> {
    let mut numbering = Numbering::default();
    let chapter = phrase.normalized.chapter;
    let verse = phrase.normalized.verse;

    if chapter != prev.chapter {
        numbering.chapter_start = chapter;
        if verse.is_none_or(|v| v <= 1) {
            numbering.chapter_is_starting = true;
        } else {
            numbering.verse_start = verse;
        }
    } else if verse != prev.verse {
        numbering.verse_start = verse;
    }

    if phrase.version_chapter != prev.version_chapter {
        numbering.version_chapter_start = phrase.version_chapter;
        if phrase.version_verse.is_none_or(|v| v <= 1) {
            numbering.version_chapter_is_starting = true;
        } else {
            numbering.version_verse_start = phrase.version_verse;
        }
    } else if phrase.version_verse != prev.version_verse {
        numbering.version_verse_start = phrase.version_verse;
    }

    prev.chapter = chapter;
    prev.verse = verse;
    prev.version_chapter = phrase.version_chapter;
    prev.version_verse = phrase.version_verse;

    if numbering.is_empty() {
        None
    } else {
        Some(numbering)
    }
}

/// Attach the numbering to the outermost node this phrase is the first
/// content of — walking up from the active group — or to the phrase leaf
/// when the active group already has children. Then append the leaf.
fn append_phrase(
    tree: &mut DocTree,
    active: NodeId,
    id: PhraseId,
    phrase: &Phrase,
    numbering: Option<Numbering>,
) -> Result<()> {
    let mut leaf_numbering = None;
    if let Some(numbering) = numbering {
        match numbering_target(tree, active, id)? {
            Some(target) => {
                let node = tree.node_mut(target);
                if node.numbering.is_some() {
                    return Err(structural(
                        id,
                        "numbering target already annotated".to_string(),
                    ));
                }
                node.numbering = Some(numbering);
            }
            None => leaf_numbering = Some(numbering),
        }
    }

    let leaf = tree.push_child(
        active,
        NodeKind::Phrase {
            id,
            phrase: phrase.clone(),
        },
    );
    if let Some(numbering) = leaf_numbering {
        tree.node_mut(leaf).numbering = Some(numbering);
    }
    Ok(())
}

/// The outermost ancestor, starting at the active group, for which this
/// phrase would be the first content; `None` when the active group already
/// has children of its own.
fn numbering_target(tree: &DocTree, active: NodeId, id: PhraseId) -> Result<Option<NodeId>> {
    if active == NodeId::ROOT || !tree.children(active).is_empty() {
        return Ok(None);
    }
    let mut target = active;
    while let Some(parent) = tree.parent(target) {
        if parent == NodeId::ROOT {
            break;
        }
        let siblings = tree.children(parent);
        if siblings.is_empty() {
            return Err(structural(
                id,
                "ancestor of the active group has no children".to_string(),
            ));
        }
        if siblings.len() != 1 {
            break;
        }
        target = parent;
    }
    Ok(Some(target))
}

fn structural(phrase: PhraseId, detail: String) -> Error {
    Error::StructuralCorruption { phrase, detail }
}
