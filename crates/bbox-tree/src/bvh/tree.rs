//! Bounding box tree container, insertion and splitting.

use std::mem;

use nalgebra::{Point3, Vector3};
use tracing::{debug, instrument};

use super::node::{BoundingBox, Node, NodeId, NodeKind, Slot};
use super::split::{Split, SplitOptions, SplitSet};
use crate::error::{GeometryError, Result};
use crate::item::{BoxBoundsItem, ItemId};
use crate::range::Range3;
use crate::tolerance;

/// Capacity limits for inserting several items into a box.
///
/// `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InsertLimits {
    /// Stop once the box holds this many items.
    pub max_items: Option<usize>,
    /// Reject items that would grow the box radius beyond this value.
    pub max_radius: Option<f64>,
}

impl InsertLimits {
    /// No limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of items in the box.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Caps the radius the box may grow to.
    pub fn with_max_radius(mut self, max_radius: f64) -> Self {
        self.max_radius = Some(max_radius);
        self
    }
}

/// A split candidate with its partition balance.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    split: Split,
    /// Difference of the partition sizes.
    d: usize,
    /// `|1 - n0 / n1|`.
    r: f64,
}

impl Candidate {
    /// Smaller difference wins; on a tie, the cut closer to the middle.
    fn beats(&self, best: Option<&Candidate>) -> bool {
        match best {
            None => true,
            Some(best) => {
                let centered = (self.split.s - 0.5).abs() < (best.split.s - 0.5).abs();
                self.d < best.d || (self.d == best.d && centered)
            }
        }
    }
}

/// A hierarchy of axis-aligned bounding boxes.
///
/// Nodes live in an arena and are addressed by [`NodeId`]. A node is either
/// a leaf holding a [`BoxBoundsItem`] or a [`BoundingBox`] holding child
/// nodes. Every node has at most one parent. The bounds of a box always
/// contain the bounds of everything below it.
///
/// Several trees may be built in one arena; any box without a parent is the
/// root of its own hierarchy.
#[derive(Debug, Clone, Default)]
pub struct BoxTree {
    slots: Vec<Slot>,
    free_list: Vec<usize>,
    len: usize,
}

impl BoxTree {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the arena holds no live nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let node = Node { parent: None, kind };
        self.len += 1;
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            slot.generation += 1;
            slot.node = Some(node);
            return NodeId::new(idx as u32, slot.generation);
        }
        self.slots.push(Slot {
            generation: 1,
            node: Some(node),
        });
        NodeId::new((self.slots.len() - 1) as u32, 1)
    }

    /// Adds a detached leaf node.
    pub fn insert_leaf(&mut self, item: BoxBoundsItem) -> NodeId {
        self.alloc(NodeKind::Leaf(item))
    }

    /// Adds a detached, empty box at the given level.
    pub fn insert_box(&mut self, level: u32) -> NodeId {
        self.alloc(NodeKind::Box(BoundingBox::new(level)))
    }

    /// Returns `true` if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.slots
            .get(id.idx())
            .is_some_and(|s| s.generation == id.generation() && s.node.is_some())
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.slots
            .get(id.idx())
            .filter(|s| s.generation == id.generation())
            .and_then(|s| s.node.as_ref())
            .ok_or(GeometryError::StaleNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.idx())
            .filter(|s| s.generation == id.generation())
            .and_then(|s| s.node.as_mut())
            .ok_or(GeometryError::StaleNode(id))
    }

    pub(crate) fn bbox(&self, id: NodeId) -> Result<&BoundingBox> {
        match &self.node(id)?.kind {
            NodeKind::Box(b) => Ok(b),
            NodeKind::Leaf(_) => Err(GeometryError::NotABox(id)),
        }
    }

    pub(crate) fn bbox_mut(&mut self, id: NodeId) -> Result<&mut BoundingBox> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Box(b) => Ok(b),
            NodeKind::Leaf(_) => Err(GeometryError::NotABox(id)),
        }
    }

    /// What the node holds.
    pub fn kind(&self, id: NodeId) -> Result<&NodeKind> {
        Ok(&self.node(id)?.kind)
    }

    /// Bounds of a node: the item of a leaf, the aggregate bounds of a box.
    pub fn get(&self, id: NodeId) -> Result<&BoxBoundsItem> {
        Ok(self.node(id)?.kind.item())
    }

    /// The box containing the node, if any.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Returns `true` if the node is a bounding box.
    pub fn is_box(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.kind.is_box())
    }

    /// Direct children of a box.
    pub fn items(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.bbox(id)?.items)
    }

    /// Number of direct children of a box.
    pub fn num_items(&self, id: NodeId) -> Result<usize> {
        Ok(self.bbox(id)?.items.len())
    }

    /// Depth of a box in its hierarchy.
    pub fn level(&self, id: NodeId) -> Result<u32> {
        Ok(self.bbox(id)?.level)
    }

    /// Overrides the depth of a box. Its children keep their levels.
    pub fn set_level(&mut self, id: NodeId, level: u32) -> Result<()> {
        self.bbox_mut(id)?.level = level;
        Ok(())
    }

    /// Finds the live node whose item has identity `uid`.
    pub fn find(&self, uid: ItemId) -> Option<NodeId> {
        self.slots.iter().enumerate().find_map(|(idx, slot)| {
            let node = slot.node.as_ref()?;
            (node.kind.item().uid() == uid).then(|| NodeId::new(idx as u32, slot.generation))
        })
    }

    /// Labels a node's item, or clears the label with `None`.
    pub fn set_item_id(&mut self, id: NodeId, item_id: Option<String>) -> Result<()> {
        self.node_mut(id)?.kind.item_mut().set_item_id(item_id);
        Ok(())
    }

    /// Moves or resizes a leaf and refreshes the bounds of its ancestors.
    ///
    /// # Errors
    /// [`GeometryError::NotALeaf`] if `id` is a box. Box bounds always
    /// follow from their items.
    pub fn set_center_and_extent(
        &mut self,
        id: NodeId,
        center: Point3<f64>,
        r_vec: Vector3<f64>,
    ) -> Result<()> {
        let node = self.node_mut(id)?;
        let parent = node.parent;
        let NodeKind::Leaf(item) = &mut node.kind else {
            return Err(GeometryError::NotALeaf(id));
        };
        item.set_center(center);
        item.set_r_vec(r_vec);
        if let Some(parent) = parent {
            self.update(parent)?;
        }
        Ok(())
    }

    /// Union of the bounds of the items of a box, or `None` if it has none.
    fn items_union(&self, id: NodeId) -> Result<Option<Range3>> {
        let mut union: Option<Range3> = None;
        for &child in &self.bbox(id)?.items {
            let b = *self.get(child)?.bounds();
            union = Some(match union {
                Some(mut u) => {
                    u.extend_range(&b);
                    u
                }
                None => b,
            });
        }
        Ok(union)
    }

    /// Recomputes the bounds of a box from its items, then does the same
    /// for each ancestor.
    ///
    /// Stops at the first box without items, whose bounds are left as
    /// they are.
    pub fn update(&mut self, id: NodeId) -> Result<()> {
        let mut current = Some(id);
        while let Some(b) = current {
            let Some(bounds) = self.items_union(b)? else {
                return Ok(());
            };
            let node = self.node_mut(b)?;
            node.kind.item_mut().set_bounds(bounds);
            current = node.parent;
        }
        Ok(())
    }

    /// Widens the ancestors of `id` to contain its bounds.
    fn propagate_extend(&mut self, id: NodeId) -> Result<()> {
        let mut child = id;
        while let Some(parent) = self.node(child)?.parent {
            let child_bounds = *self.get(child)?.bounds();
            let b = self.bbox_mut(parent)?;
            let mut bounds = *b.bounds.bounds();
            bounds.extend_range(&child_bounds);
            if bounds == *b.bounds.bounds() {
                break;
            }
            b.bounds.set_bounds(bounds);
            child = parent;
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> Result<bool> {
        let mut current = Some(of);
        while let Some(n) = current {
            if n == candidate {
                return Ok(true);
            }
            current = self.node(n)?.parent;
        }
        Ok(false)
    }

    /// Adds `item` to the box `id`.
    ///
    /// The first item seeds the box bounds; later items extend them. With
    /// `max_radius`, an item that would grow the box radius beyond the
    /// limit is rejected and `false` is returned with nothing changed.
    ///
    /// An item that already belongs to another box is moved.
    ///
    /// # Errors
    /// - [`GeometryError::NotABox`] if `id` is a leaf.
    /// - [`GeometryError::StaleNode`] if either handle is dead.
    /// - [`GeometryError::CyclicInsertion`] if `item` is `id` or one of
    ///   its ancestors.
    pub fn add_item(
        &mut self,
        id: NodeId,
        item: NodeId,
        max_radius: Option<f64>,
    ) -> Result<bool> {
        let (was_empty, present) = {
            let b = self.bbox(id)?;
            (b.items.is_empty(), b.items.contains(&item))
        };
        let item_bounds = *self.get(item)?.bounds();
        if self.is_ancestor_or_self(item, id)? {
            return Err(GeometryError::CyclicInsertion { parent: id, item });
        }
        if present {
            return Ok(true);
        }
        if let Some(max_radius) = max_radius {
            let mut bounds = if was_empty {
                item_bounds
            } else {
                *self.get(id)?.bounds()
            };
            bounds.extend_range(&item_bounds);
            let radius = bounds.radius().norm();
            if radius > max_radius {
                debug!(
                    ?id,
                    ?item,
                    radius,
                    max_radius,
                    "item rejected, box radius limit exceeded"
                );
                return Ok(false);
            }
        }
        if let Some(old) = self.node(item)?.parent {
            self.remove_item(old, item)?;
        }

        let b = self.bbox_mut(id)?;
        let mut bounds = if b.items.is_empty() {
            item_bounds
        } else {
            *b.bounds.bounds()
        };
        bounds.extend_range(&item_bounds);
        b.bounds.set_bounds(bounds);
        b.items.push(item);
        self.node_mut(item)?.parent = Some(id);
        self.propagate_extend(id)?;
        Ok(true)
    }

    /// Unlinks `item` from the box without touching any bounds.
    fn detach(&mut self, id: NodeId, item: NodeId) -> Result<bool> {
        let b = self.bbox_mut(id)?;
        let Some(pos) = b.items.iter().position(|&i| i == item) else {
            return Ok(false);
        };
        b.items.remove(pos);
        self.node_mut(item)?.parent = None;
        Ok(true)
    }

    /// Removes `item` from the box and recomputes the bounds up to the root.
    ///
    /// Returns `false` if `item` is not a direct child of `id`. The removed
    /// node stays alive, detached.
    pub fn remove_item(&mut self, id: NodeId, item: NodeId) -> Result<bool> {
        if !self.detach(id, item)? {
            return Ok(false);
        }
        self.update(id)?;
        Ok(true)
    }

    /// Adds as many of `items` as the limits allow.
    ///
    /// Returns the items that were not added, in input order.
    pub fn add_items(
        &mut self,
        id: NodeId,
        items: &[NodeId],
        limits: InsertLimits,
    ) -> Result<Vec<NodeId>> {
        let mut remaining = Vec::new();
        for &item in items {
            let n = self.num_items(id)?;
            let full = limits.max_items.is_some_and(|max| n >= max);
            if full || !self.add_item(id, item, limits.max_radius)? {
                remaining.push(item);
            }
        }
        Ok(remaining)
    }

    /// Moves items out of `items` into the box until the limits are reached.
    ///
    /// Items rejected for their radius and items left over once the box is
    /// full stay in `items`. Returns the number of items taken.
    pub fn take_items(
        &mut self,
        id: NodeId,
        items: &mut Vec<NodeId>,
        limits: InsertLimits,
    ) -> Result<usize> {
        let mut taken = 0;
        let mut i = 0;
        while i < items.len() {
            if let Some(max) = limits.max_items
                && self.num_items(id)? >= max
            {
                break;
            }
            if self.add_item(id, items[i], limits.max_radius)? {
                items.remove(i);
                taken += 1;
            } else {
                i += 1;
            }
        }
        Ok(taken)
    }

    /// Detaches all items from the box and collapses its bounds to the
    /// origin. The former items stay alive.
    pub fn clear(&mut self, id: NodeId) -> Result<()> {
        let b = self.bbox_mut(id)?;
        let items = mem::take(&mut b.items);
        b.bounds.clear();
        for item in items {
            self.node_mut(item)?.parent = None;
        }
        Ok(())
    }

    /// Frees a node and everything below it.
    ///
    /// The node is removed from its parent first. Handles to freed nodes
    /// become stale.
    pub fn release(&mut self, id: NodeId) -> Result<()> {
        if let Some(parent) = self.node(id)?.parent {
            self.remove_item(parent, id)?;
        }
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let NodeKind::Box(b) = &self.node(n)?.kind {
                stack.extend_from_slice(&b.items);
            }
            self.slots[n.idx()].node = None;
            self.free_list.push(n.idx());
            self.len -= 1;
        }
        Ok(())
    }

    /// Partitions the items of a box by a split without changing anything.
    ///
    /// Items whose center lies on or below the cut go to the first list.
    pub fn split_test(
        &self,
        id: NodeId,
        split: &Split,
        tolerance: f64,
    ) -> Result<(Vec<NodeId>, Vec<NodeId>)> {
        let b = self.bbox(id)?;
        let cut = split.cut_value(b.bounds.bounds());
        let axis = split.axis.index();
        let mut low = Vec::new();
        let mut high = Vec::new();
        for &item in &b.items {
            if tolerance::lt_or_eq(self.get(item)?.center()[axis], cut, tolerance) {
                low.push(item);
            } else {
                high.push(item);
            }
        }
        Ok((low, high))
    }

    /// Picks the candidate that splits the items of a box most evenly.
    ///
    /// Candidates leaving fewer than `options.min_items` on either side are
    /// skipped. Ties go to the cut closest to the middle of the box. With
    /// `options.prefer_longest_axis`, the best split along the longest box
    /// axis is used instead when its balance ratio is within
    /// `options.longest_axis_tolerance` of the overall best.
    pub fn get_best_split(
        &self,
        id: NodeId,
        splits: &SplitSet,
        options: &SplitOptions,
    ) -> Result<Option<Split>> {
        let b = self.bbox(id)?;
        let n = b.items.len();
        if n < options.min_items.saturating_mul(2) {
            debug!(n, min_items = options.min_items, "not enough items for splitting");
            return Ok(None);
        }
        let preferred = b.bounds.bounds().longest_axis();

        let mut best: Option<Candidate> = None;
        let mut best_preferred: Option<Candidate> = None;
        for split in splits.iter() {
            let (low, high) = self.split_test(id, split, options.tolerance)?;
            let (n0, n1) = (low.len(), high.len());
            if n0 < options.min_items || n1 < options.min_items {
                debug!(%split, n0, n1, "split not usable");
                continue;
            }
            let candidate = Candidate {
                split: *split,
                d: n0.abs_diff(n1),
                r: (1.0 - n0 as f64 / n1 as f64).abs(),
            };
            if candidate.beats(best.as_ref()) {
                best = Some(candidate);
            }
            if split.axis == preferred && candidate.beats(best_preferred.as_ref()) {
                best_preferred = Some(candidate);
            }
        }

        let Some(best) = best else {
            return Ok(None);
        };
        if options.prefer_longest_axis
            && let Some(pref) = best_preferred
        {
            let r0 = if pref.r != 0.0 {
                (1.0 - best.r / pref.r).abs()
            } else {
                0.0
            };
            if r0 <= options.longest_axis_tolerance {
                debug!(
                    split = %pref.split,
                    axis = %preferred,
                    r = pref.r,
                    "using split along longest axis"
                );
                return Ok(Some(pref.split));
            }
        }
        debug!(split = %best.split, r = best.r, "best split");
        Ok(Some(best.split))
    }

    /// Splits a box in two.
    ///
    /// The items are divided by the chosen split into two new boxes one
    /// level below `id`, which then become the only items of `id`. A single
    /// candidate is used as given; otherwise the best candidate is chosen
    /// with [`get_best_split`](Self::get_best_split).
    ///
    /// Returns `None` without changes if the box has no items, no usable
    /// split exists, the split would leave one side empty, or (when
    /// recursive) the box is too small or too deep to split.
    ///
    /// # Errors
    /// [`GeometryError::ContainmentViolation`] if a new box is not
    /// contained in `id`.
    #[instrument(level = "debug", skip(self, splits, options), fields(candidates = splits.len()))]
    pub fn split(
        &mut self,
        id: NodeId,
        splits: &SplitSet,
        options: &SplitOptions,
    ) -> Result<Option<(NodeId, NodeId)>> {
        let level = self.bbox(id)?.level;
        self.split_at(id, splits, options, level)
    }

    fn split_at(
        &mut self,
        id: NodeId,
        splits: &SplitSet,
        options: &SplitOptions,
        split_level: u32,
    ) -> Result<Option<(NodeId, NodeId)>> {
        let n = self.num_items(id)?;
        if n == 0 {
            debug!(split_level, "nothing to split");
            return Ok(None);
        }
        if options.recursive {
            if options.min_items > 0 && n <= options.min_items {
                debug!(split_level, n, "not enough items for splitting");
                return Ok(None);
            }
            if options.max_level.is_some_and(|max| split_level >= max) {
                debug!(split_level, "maximum level reached");
                return Ok(None);
            }
        }
        let chosen = if splits.len() == 1 {
            splits.get(0).copied()
        } else {
            self.get_best_split(id, splits, options)?
        };
        let Some(split) = chosen else {
            debug!(split_level, "no suitable split");
            return Ok(None);
        };
        let (low, high) = self.split_test(id, &split, options.tolerance)?;
        if low.is_empty() || high.is_empty() {
            debug!(%split, split_level, "split leaves one side empty");
            return Ok(None);
        }
        let items = self.bbox(id)?.items.clone();
        self.check_containment(id, &items, options.tolerance)?;
        debug!(
            %split,
            split_level,
            low = low.len(),
            high = high.len(),
            "splitting box"
        );

        let bounds = *self.get(id)?.bounds();
        let children = [
            self.insert_box(split_level + 1),
            self.insert_box(split_level + 1),
        ];
        let moved = self.distribute(id, children, [low, high], splits, options, split_level);
        if let Err(err) = moved {
            debug!(%err, split_level, "split failed, restoring items");
            self.restore_split(id, &items, bounds, children)?;
            return Err(err);
        }
        Ok(Some((children[0], children[1])))
    }

    /// Moves the items of `id` into `children`, splits those further if
    /// recursive, and makes them the only items of `id`.
    fn distribute(
        &mut self,
        id: NodeId,
        children: [NodeId; 2],
        parts: [Vec<NodeId>; 2],
        splits: &SplitSet,
        options: &SplitOptions,
        split_level: u32,
    ) -> Result<()> {
        for item in mem::take(&mut self.bbox_mut(id)?.items) {
            self.node_mut(item)?.parent = None;
        }
        for (child, part) in children.into_iter().zip(parts) {
            for item in part {
                self.add_item(child, item, None)?;
            }
        }
        self.check_containment(id, &children, options.tolerance)?;

        if options.recursive {
            for child in children {
                self.split_at(child, splits, options, split_level + 1)?;
            }
            self.check_containment(id, &children, options.tolerance)?;
        }

        for child in children {
            self.add_item(id, child, None)?;
        }
        Ok(())
    }

    /// Undoes a partial split: `items` go back into `id` with its old
    /// bounds, and the new boxes are freed.
    fn restore_split(
        &mut self,
        id: NodeId,
        items: &[NodeId],
        bounds: Range3,
        children: [NodeId; 2],
    ) -> Result<()> {
        for &node in children.iter().chain(items) {
            if let Some(parent) = self.node(node)?.parent {
                self.detach(parent, node)?;
            }
        }
        for child in children {
            self.release(child)?;
        }
        let b = self.bbox_mut(id)?;
        b.items = items.to_vec();
        b.bounds.set_bounds(bounds);
        for &item in items {
            self.node_mut(item)?.parent = Some(id);
        }
        Ok(())
    }

    /// Checks that the bounds of `id` contain each of `nodes`.
    fn check_containment(&self, id: NodeId, nodes: &[NodeId], tolerance: f64) -> Result<()> {
        let bounds = self.get(id)?;
        for &child in nodes {
            let result = bounds.compare(self.get(child)?, tolerance);
            if !result.first_contains_or_equal() {
                return Err(GeometryError::ContainmentViolation {
                    node: id,
                    child,
                    result,
                });
            }
        }
        Ok(())
    }
}
