//! Spatial queries over a bounding box hierarchy.
//!
//! The partition queries share one pattern: a node that is decisively on
//! the wanted side of the query shape is reported as a whole, a node that
//! is decisively on the other side is pruned, and a straddling box is
//! opened up. Straddling leaves need an exact test by the caller and are
//! reported separately.

use tracing::trace;

use super::node::{NodeId, NodeKind};
use super::tree::BoxTree;
use crate::error::{GeometryError, Result};
use crate::item::{BoxBoundsItem, Classification, Containment};
use crate::line::Line3D;
use crate::plane::Plane3D;
use crate::sphere::Sphere3D;

/// Result of a partition query.
///
/// Entries in `surely` may be boxes; every leaf below such a box satisfies
/// the query. Entries in `maybe` are always leaves whose bounds straddle
/// the query shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub surely: Vec<NodeId>,
    pub maybe: Vec<NodeId>,
}

impl Partition {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.surely.is_empty() && self.maybe.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Surely,
    Maybe,
    Never,
}

impl From<Classification> for Verdict {
    fn from(c: Classification) -> Self {
        match c {
            Classification::Front => Verdict::Surely,
            Classification::Back => Verdict::Never,
            Classification::Spanning => Verdict::Maybe,
        }
    }
}

impl From<Containment> for Verdict {
    fn from(c: Containment) -> Self {
        match c {
            Containment::Inside => Verdict::Surely,
            Containment::Outside => Verdict::Never,
            Containment::Spanning => Verdict::Maybe,
        }
    }
}

impl BoxTree {
    fn partition<F>(&self, root: NodeId, mut classify: F) -> Result<Partition>
    where
        F: FnMut(&BoxBoundsItem) -> Verdict,
    {
        let mut result = Partition::default();
        match classify(self.bbox(root)?.bounds()) {
            Verdict::Surely => {
                result.surely.push(root);
                return Ok(result);
            }
            Verdict::Never => return Ok(result),
            Verdict::Maybe => {}
        }

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let b = self.bbox(id)?;
            if b.items.is_empty() {
                return Err(GeometryError::UsedAsLeaf(id));
            }
            trace!(?id, level = b.level, items = b.items.len(), "descending");
            for &child in &b.items {
                let node = self.kind(child)?;
                match classify(node.item()) {
                    Verdict::Surely => result.surely.push(child),
                    Verdict::Never => {}
                    Verdict::Maybe if node.is_box() => stack.push(child),
                    Verdict::Maybe => result.maybe.push(child),
                }
            }
        }
        Ok(result)
    }

    fn collect_hits<F>(&self, root: NodeId, mut hit: F) -> Result<Vec<NodeId>>
    where
        F: FnMut(&BoxBoundsItem) -> Result<bool>,
    {
        let mut result = Vec::new();
        if !hit(self.bbox(root)?.bounds())? {
            return Ok(result);
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let b = self.bbox(id)?;
            if b.items.is_empty() {
                return Err(GeometryError::UsedAsLeaf(id));
            }
            trace!(?id, level = b.level, items = b.items.len(), "descending");
            for &child in &b.items {
                let node = self.kind(child)?;
                if !hit(node.item())? {
                    continue;
                }
                if node.is_box() {
                    stack.push(child);
                } else {
                    result.push(child);
                }
            }
        }
        Ok(result)
    }

    /// Nodes below `root` that lie in front of the plane.
    ///
    /// # Errors
    /// - [`GeometryError::NotABox`] if `root` is a leaf.
    /// - [`GeometryError::UsedAsLeaf`] if a straddling box has no items.
    pub fn items_above_plane(
        &self,
        root: NodeId,
        plane: &Plane3D,
        tolerance: f64,
    ) -> Result<Partition> {
        self.partition(root, |item| item.check_plane(plane, tolerance).into())
    }

    /// Nodes below `root` that lie inside the sphere.
    pub fn items_in_sphere(
        &self,
        root: NodeId,
        sphere: &Sphere3D,
        tolerance: f64,
    ) -> Result<Partition> {
        self.partition(root, |item| item.check_sphere(sphere, tolerance).into())
    }

    /// Nodes below `root` that lie inside the query box.
    ///
    /// A node whose bounds equal the query box is only a candidate and is
    /// treated like a straddling one.
    pub fn items_in_box(
        &self,
        root: NodeId,
        query: &BoxBoundsItem,
        tolerance: f64,
    ) -> Result<Partition> {
        self.partition(root, |item| item.check_box(query, tolerance).into())
    }

    /// Leaves below `root` whose bounds are hit by the line.
    ///
    /// Boxes missed by the line are pruned with everything below them.
    pub fn items_on_line(
        &self,
        root: NodeId,
        line: &Line3D,
        tolerance: f64,
    ) -> Result<Vec<NodeId>> {
        self.collect_hits(root, |item| item.check_line(line, tolerance))
    }

    /// Leaves below `root` whose bounds are hit by the ray.
    pub fn items_on_ray(
        &self,
        root: NodeId,
        ray: &Line3D,
        tolerance: f64,
    ) -> Result<Vec<NodeId>> {
        self.collect_hits(root, |item| item.check_ray(ray, tolerance))
    }

    /// Finds the most deeply nested leaf below `root` whose bounds contain
    /// `item`.
    ///
    /// Every child that contains the item is searched in order until one
    /// yields a leaf. An empty box counts as a leaf. Returns `None` if no
    /// leaf contains the item.
    pub fn containing_leaf(
        &self,
        root: NodeId,
        item: &BoxBoundsItem,
        tolerance: f64,
    ) -> Result<Option<NodeId>> {
        let node = self.kind(root)?;
        if !node.item().compare(item, tolerance).first_contains_or_equal() {
            return Ok(None);
        }
        let b = match node {
            NodeKind::Leaf(_) => return Ok(Some(root)),
            NodeKind::Box(b) if b.items.is_empty() => return Ok(Some(root)),
            NodeKind::Box(b) => b,
        };
        for &child in &b.items {
            if let Some(found) = self.containing_leaf(child, item, tolerance)? {
                return Ok(Some(found));
            }
        }
        trace!(?root, "no leaf below contains the item");
        Ok(None)
    }
}
