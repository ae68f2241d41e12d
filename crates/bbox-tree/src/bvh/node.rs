//! Node storage for the bounding box tree.

use crate::item::BoxBoundsItem;

/// Handle to a node in a [`BoxTree`](super::BoxTree).
///
/// Consists of a slot index and a generation counter. A freed slot gets a
/// new generation when it is reused, so a stale `NodeId` never refers to a
/// different live node. Use [`BoxTree::is_alive`](super::BoxTree::is_alive)
/// to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

/// An internal node: aggregate bounds over a set of child nodes.
///
/// While `items` is non-empty, `bounds` is the union of the item bounds.
/// A box without items is a placeholder leaf.
#[derive(Debug, Clone, Default)]
pub struct BoundingBox {
    pub(crate) bounds: BoxBoundsItem,
    pub(crate) level: u32,
    pub(crate) items: Vec<NodeId>,
}

impl BoundingBox {
    pub(crate) fn new(level: u32) -> Self {
        Self {
            bounds: BoxBoundsItem::default(),
            level,
            items: Vec::new(),
        }
    }

    /// Aggregate bounds of the box.
    #[inline]
    pub fn bounds(&self) -> &BoxBoundsItem {
        &self.bounds
    }

    /// Split depth of the box. Children created by a split sit one level
    /// below their parent.
    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Direct children of the box.
    #[inline]
    pub fn items(&self) -> &[NodeId] {
        &self.items
    }
}

/// What a node holds.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A single bounded item.
    Leaf(BoxBoundsItem),
    /// A container of other nodes.
    Box(BoundingBox),
}

impl NodeKind {
    /// Bounds of the node, whatever its kind.
    pub fn item(&self) -> &BoxBoundsItem {
        match self {
            NodeKind::Leaf(item) => item,
            NodeKind::Box(b) => &b.bounds,
        }
    }

    pub(crate) fn item_mut(&mut self) -> &mut BoxBoundsItem {
        match self {
            NodeKind::Leaf(item) => item,
            NodeKind::Box(b) => &mut b.bounds,
        }
    }

    #[inline]
    pub fn is_box(&self) -> bool {
        matches!(self, NodeKind::Box(_))
    }

    pub fn as_box(&self) -> Option<&BoundingBox> {
        match self {
            NodeKind::Box(b) => Some(b),
            NodeKind::Leaf(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

/// A slot in the arena. The generation survives while the slot is free.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) node: Option<Node>,
}
