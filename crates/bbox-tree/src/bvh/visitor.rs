//! Visitor pattern for bounding box tree traversal.
//!
//! Visitors receive every node below a root in depth-first pre-order,
//! children in insertion order. The hierarchy utilities in this module
//! (leaf and box listings, validation, labelling) are built on it.

use tracing::debug;

use super::node::{NodeId, NodeKind};
use super::tree::BoxTree;
use crate::error::{GeometryError, Result};
use crate::range::RangeComparison;

/// Visitor for processing nodes during traversal.
pub trait BoxVisitor {
    /// Called once for each node, parents before their children.
    fn visit(&mut self, id: NodeId, node: &NodeKind);
}

/// A visitor that collects the visited leaves and boxes.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    leaves: Vec<NodeId>,
    boxes: Vec<NodeId>,
}

impl CollectingVisitor {
    /// Creates a visitor with nothing collected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Leaves seen so far, in visiting order.
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    /// Boxes seen so far, in visiting order.
    pub fn boxes(&self) -> &[NodeId] {
        &self.boxes
    }

    /// Returns the collected `(leaves, boxes)`.
    pub fn into_parts(self) -> (Vec<NodeId>, Vec<NodeId>) {
        (self.leaves, self.boxes)
    }
}

impl BoxVisitor for CollectingVisitor {
    fn visit(&mut self, id: NodeId, node: &NodeKind) {
        match node {
            NodeKind::Leaf(_) => self.leaves.push(id),
            NodeKind::Box(_) => self.boxes.push(id),
        }
    }
}

/// A visitor that calls a closure for each node.
pub struct FnVisitor<F>
where
    F: FnMut(NodeId, &NodeKind),
{
    func: F,
}

impl<F> FnVisitor<F>
where
    F: FnMut(NodeId, &NodeKind),
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> BoxVisitor for FnVisitor<F>
where
    F: FnMut(NodeId, &NodeKind),
{
    fn visit(&mut self, id: NodeId, node: &NodeKind) {
        (self.func)(id, node);
    }
}

impl BoxTree {
    /// Visits `root` and everything below it in depth-first pre-order.
    pub fn traverse<V: BoxVisitor>(&self, root: NodeId, visitor: &mut V) -> Result<()> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.kind(id)?;
            visitor.visit(id, node);
            if let NodeKind::Box(b) = node {
                stack.extend(b.items().iter().rev());
            }
        }
        Ok(())
    }

    /// All leaves below `root`. A leaf root yields itself.
    pub fn leaves(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut visitor = CollectingVisitor::new();
        self.traverse(root, &mut visitor)?;
        Ok(visitor.into_parts().0)
    }

    /// All boxes below `root`, including `root`.
    pub fn boxes(&self, root: NodeId) -> Result<Vec<NodeId>> {
        let mut visitor = CollectingVisitor::new();
        self.traverse(root, &mut visitor)?;
        Ok(visitor.into_parts().1)
    }

    /// Containers of `item` from the innermost up to `root`.
    ///
    /// Returns `None` if `item` is not below `root`.
    pub fn item_path(&self, root: NodeId, item: NodeId) -> Result<Option<Vec<NodeId>>> {
        let mut path = Vec::new();
        let mut current = self.parent(item)?;
        while let Some(container) = current {
            path.push(container);
            if container == root {
                return Ok(Some(path));
            }
            current = self.parent(container)?;
        }
        Ok(None)
    }

    /// Checks that every box below `root` contains its items.
    ///
    /// # Errors
    /// [`GeometryError::ContainmentViolation`] for the first offending
    /// item found.
    pub fn validate(&self, root: NodeId, tolerance: f64) -> Result<()> {
        let NodeKind::Box(b) = self.kind(root)? else {
            return Ok(());
        };
        for &child in b.items() {
            let result = b.bounds().compare(self.get(child)?, tolerance);
            if !result.first_contains_or_equal() {
                return Err(GeometryError::ContainmentViolation { node: root, child, result });
            }
        }
        for &child in b.items() {
            self.validate(child, tolerance)?;
        }
        Ok(())
    }

    /// Checks whether the hierarchy below `root` matches the one below
    /// `other_root` in `other`.
    ///
    /// Boxes match when their bounds are equal within `tolerance`. Leaves
    /// additionally need the same [`ItemId`](crate::item::ItemId), so
    /// comparing against a clone of the tree succeeds while comparing
    /// against a rebuilt one does not.
    pub fn compare_hierarchy(
        &self,
        root: NodeId,
        other: &BoxTree,
        other_root: NodeId,
        tolerance: f64,
    ) -> Result<bool> {
        if self.get(root)?.compare(other.get(other_root)?, tolerance) != RangeComparison::Equal {
            debug!(?root, ?other_root, "root boxes differ");
            return Ok(false);
        }
        let mine = self.items(root)?;
        let theirs = other.items(other_root)?;
        if mine.len() != theirs.len() {
            debug!(?root, mine = mine.len(), theirs = theirs.len(), "item counts differ");
            return Ok(false);
        }
        for &item in mine {
            let node = self.kind(item)?;
            let mut matching = None;
            for &candidate in theirs {
                let other_node = other.kind(candidate)?;
                if node.item().compare(other_node.item(), tolerance) != RangeComparison::Equal {
                    continue;
                }
                let same = match (node, other_node) {
                    (NodeKind::Leaf(a), NodeKind::Leaf(b)) => a.uid() == b.uid(),
                    (NodeKind::Box(_), NodeKind::Box(_)) => true,
                    _ => false,
                };
                if same {
                    matching = Some(candidate);
                    break;
                }
            }
            let Some(candidate) = matching else {
                debug!(?item, "no matching item");
                return Ok(false);
            };
            if node.is_box() && !self.compare_hierarchy(item, other, candidate, tolerance)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Labels the items of `root` as `{prefix}_{k}`, with `k` the
    /// zero-padded item index.
    ///
    /// With `show_level`, `_{level}` is appended, counting from 0 at
    /// `root`. With `keep_existing`, items that already carry a label are
    /// skipped, including their subtrees. With `recursive`, boxes label
    /// their own items using their label as the prefix.
    pub fn set_child_ids(
        &mut self,
        root: NodeId,
        prefix: &str,
        show_level: bool,
        keep_existing: bool,
        recursive: bool,
    ) -> Result<()> {
        self.set_child_ids_at(root, prefix, show_level, keep_existing, recursive, 0)
    }

    fn set_child_ids_at(
        &mut self,
        id: NodeId,
        prefix: &str,
        show_level: bool,
        keep_existing: bool,
        recursive: bool,
        level: u32,
    ) -> Result<()> {
        let items = self.items(id)?.to_vec();
        for (k, child) in items.into_iter().enumerate() {
            if keep_existing && self.get(child)?.item_id().is_some_and(|s| !s.is_empty()) {
                continue;
            }
            let child_prefix = format!("{prefix}_{k:02}");
            let label = if show_level {
                format!("{child_prefix}_{level:02}")
            } else {
                child_prefix.clone()
            };
            self.set_item_id(child, Some(label))?;
            if recursive && self.is_box(child)? {
                self.set_child_ids_at(
                    child,
                    &child_prefix,
                    show_level,
                    keep_existing,
                    true,
                    level + 1,
                )?;
            }
        }
        Ok(())
    }
}
