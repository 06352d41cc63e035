//! Arena-backed output tree.
//!
//! All nodes live in one contiguous vector; parent and child links are
//! indices into it, so the tree has single ownership and no reference
//! cycles. Trees are built fresh per query and discarded after
//! serialization — nodes carry no persistent identity.

use crate::codec::PhraseId;

use super::{GroupKind, Phrase};

/// Index of a node within a [`DocTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node (always index 0).
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node variants of the output tree.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Root,
    Section {
        level: u8,
        title: Option<String>,
        start: PhraseId,
        end: PhraseId,
    },
    Paragraph {
        start: PhraseId,
        end: PhraseId,
    },
    Group(GroupKind),
    Phrase {
        id: PhraseId,
        phrase: Phrase,
    },
}

/// Numbering annotation recording which reference fields advanced at the
/// first phrase under a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Numbering {
    pub chapter_start: Option<u32>,
    pub verse_start: Option<u32>,
    pub version_chapter_start: Option<u32>,
    pub version_verse_start: Option<u32>,
    /// The normalized chapter begins here. Set instead of a verse start
    /// when the chapter changes at verse 0 or 1, so zero-indexed psalm
    /// titles still read as chapter openings.
    pub chapter_is_starting: bool,
    pub version_chapter_is_starting: bool,
}

impl Numbering {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A node of the output tree. The parent link is an arena index, never a
/// shared pointer.
#[derive(Debug, Clone)]
pub struct OutputNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub numbering: Option<Numbering>,
}

/// One assembled document tree.
#[derive(Debug, Clone)]
pub struct DocTree {
    nodes: Vec<OutputNode>,
}

impl DocTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![OutputNode {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                numbering: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node(&self, id: NodeId) -> &OutputNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut OutputNode {
        &mut self.nodes[id.index()]
    }

    /// Allocate a node and append it as the last child of `parent`.
    pub fn push_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(OutputNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            numbering: None,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Ancestors from `id` up to and including the root.
    pub fn path_to_root(&self, id: NodeId) -> PathIter<'_> {
        PathIter {
            tree: self,
            current: Some(id),
        }
    }
}

impl Default for DocTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node and its ancestors, innermost first.
pub struct PathIter<'a> {
    tree: &'a DocTree,
    current: Option<NodeId>,
}

impl Iterator for PathIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

#[cfg(feature = "serde")]
mod serialize {
    //! Nested serialization of the arena tree, root first. Parent links
    //! and id intervals stay internal; consumers see kind, payload,
    //! numbering, and children.

    use serde::ser::{Serialize, SerializeMap, Serializer};

    use super::{DocTree, NodeId, NodeKind};

    struct NodeRef<'a> {
        tree: &'a DocTree,
        id: NodeId,
    }

    struct ChildrenRef<'a> {
        tree: &'a DocTree,
        id: NodeId,
    }

    impl Serialize for DocTree {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            NodeRef {
                tree: self,
                id: NodeId::ROOT,
            }
            .serialize(serializer)
        }
    }

    impl Serialize for NodeRef<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let node = self.tree.node(self.id);
            let mut map = serializer.serialize_map(None)?;
            match &node.kind {
                NodeKind::Root => {
                    map.serialize_entry("kind", "root")?;
                }
                NodeKind::Section { level, title, .. } => {
                    map.serialize_entry("kind", "section")?;
                    map.serialize_entry("level", level)?;
                    if let Some(title) = title {
                        map.serialize_entry("title", title)?;
                    }
                }
                NodeKind::Paragraph { .. } => {
                    map.serialize_entry("kind", "paragraph")?;
                }
                NodeKind::Group(group) => {
                    map.serialize_entry("kind", "group")?;
                    map.serialize_entry("group", group)?;
                }
                NodeKind::Phrase { phrase, .. } => {
                    map.serialize_entry("kind", "phrase")?;
                    map.serialize_entry("phrase", phrase)?;
                }
            }
            if let Some(numbering) = &node.numbering {
                map.serialize_entry("numbering", numbering)?;
            }
            if !node.children.is_empty() {
                map.serialize_entry(
                    "children",
                    &ChildrenRef {
                        tree: self.tree,
                        id: self.id,
                    },
                )?;
            }
            map.end()
        }
    }

    impl Serialize for ChildrenRef<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.tree.children(self.id).iter().map(|&child| NodeRef {
                tree: self.tree,
                id: child,
            }))
        }
    }
}
