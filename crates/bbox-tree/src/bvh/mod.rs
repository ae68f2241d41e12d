//! Bounding volume hierarchy of axis-aligned boxes.
//!
//! Items are inserted into boxes, boxes are split into two children along
//! the most balanced candidate cut, and the resulting hierarchy answers
//! plane, sphere, box, line and ray queries without visiting subtrees that
//! are decisively in or out.
//!
//! # Example
//!
//! ```
//! use bbox_tree::bvh::{BoxTree, InsertLimits, SplitOptions, SplitSet};
//! use bbox_tree::{BoxBoundsItem, Plane3D, DEFAULT_TOLERANCE};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut tree = BoxTree::new();
//! let root = tree.insert_box(0);
//! let leaves: Vec<_> = (0..8)
//!     .map(|i| {
//!         let center = Point3::new(i as f64, 0.0, i as f64 - 3.5);
//!         tree.insert_leaf(BoxBoundsItem::new(center, Vector3::new(0.25, 0.25, 0.25)))
//!     })
//!     .collect();
//! tree.add_items(root, &leaves, InsertLimits::default())?;
//!
//! let options = SplitOptions::default().with_recursive(true);
//! tree.split(root, &SplitSet::uniform(3), &options)?;
//! tree.validate(root, DEFAULT_TOLERANCE)?;
//!
//! let above = tree.items_above_plane(root, &Plane3D::default(), DEFAULT_TOLERANCE)?;
//! let mut count = 0;
//! for &id in &above.surely {
//!     count += tree.leaves(id)?.len();
//! }
//! assert_eq!(count, 4);
//! # Ok::<(), bbox_tree::GeometryError>(())
//! ```
//!
//! # Architecture
//!
//! - [`BoxTree`]: arena owning every node, addressed by [`NodeId`]
//! - [`NodeKind`]: a leaf item or a [`BoundingBox`] of child nodes
//! - [`SplitSet`] and [`SplitOptions`]: split candidates and strategy
//! - [`Partition`]: result of the plane, sphere and box queries
//! - [`BoxVisitor`]: visitor trait for depth-first traversal

mod node;
mod query;
mod split;
mod tree;
mod visitor;

pub use node::{BoundingBox, NodeId, NodeKind};
pub use query::Partition;
pub use split::{Split, SplitOptions, SplitSet};
pub use tree::{BoxTree, InsertLimits};
pub use visitor::{BoxVisitor, CollectingVisitor, FnVisitor};
