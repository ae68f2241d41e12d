//! Error type shared by the geometry kernel and the bounding box tree.

use nalgebra::Point3;

use crate::bvh::NodeId;
use crate::range::RangeComparison;

/// Result alias for fallible geometry and tree operations.
pub type Result<T> = std::result::Result<T, GeometryError>;

/// Everything that can go wrong in this crate.
///
/// None of these are expected under correct usage. They report invariant
/// drift or caller bugs and are never retried internally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// A linear system has no usable pivot under any axis permutation.
    #[error("linear system cannot be solved")]
    Unsolvable,

    /// A polygon has a vertex off its own tangent plane.
    #[error("polygon is not planar (vertex {vertex} lies off the plane)")]
    NonPlanarPolygon {
        /// Offending vertex, in the polygon's tangent space.
        vertex: Point3<f64>,
    },

    /// A zero-length vector was used where a direction is required.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    /// The handle does not refer to a live node in the tree.
    #[error("node {0:?} is not alive in this tree")]
    StaleNode(NodeId),

    /// A container operation was invoked on a leaf node.
    #[error("node {0:?} is a leaf, not a bounding box")]
    NotABox(NodeId),

    /// A leaf-only operation was invoked on a bounding box.
    #[error("node {0:?} is a bounding box, not a leaf")]
    NotALeaf(NodeId),

    /// An empty bounding box was queried as if it were an internal node.
    #[error("bounding box {0:?} used as a leaf")]
    UsedAsLeaf(NodeId),

    /// Inserting the item would make a box contain itself.
    #[error("cannot insert {item:?} into {parent:?}: it is the box or one of its ancestors")]
    CyclicInsertion {
        /// Box the item was inserted into.
        parent: NodeId,
        /// Rejected item.
        item: NodeId,
    },

    /// A split produced a child that the parent's bounds do not contain.
    #[error("child {child:?} is not contained in {node:?} ({result})")]
    ContainmentViolation {
        /// Box being split.
        node: NodeId,
        /// Child box that escaped the parent bounds.
        child: NodeId,
        /// How the parent compared against the child.
        result: RangeComparison,
    },
}
