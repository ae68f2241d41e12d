//! Hierarchical axis-aligned bounding boxes for 3D spatial queries.
//!
//! The crate has two layers. The geometry kernel ([`Range`], [`Range3`],
//! [`Plane3D`], [`Line3D`], [`Sphere3D`], [`Polygon`] and the small linear
//! solvers) compares and intersects shapes under an explicit tolerance.
//! On top of it, [`bvh::BoxTree`] groups [`BoxBoundsItem`]s into a tree of
//! bounding boxes and prunes whole subtrees during queries.
//!
//! All comparisons take a `tolerance`; [`DEFAULT_TOLERANCE`] is the usual
//! choice.

pub mod bvh;
pub mod error;
pub mod item;
pub mod linalg;
pub mod line;
pub mod plane;
pub mod polygon;
pub mod range;
pub mod sphere;
pub mod tolerance;

pub use error::{GeometryError, Result};
pub use item::{BoxBoundsItem, Classification, Containment, ItemId};
pub use line::Line3D;
pub use plane::{Plane3D, PlaneSide};
pub use polygon::{Polygon, Polygon2};
pub use range::{Axis, Range, Range3, RangeComparison, RangeComparison3};
pub use sphere::Sphere3D;
pub use tolerance::DEFAULT_TOLERANCE;
