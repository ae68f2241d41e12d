//! Items with an axis-aligned bounding box.
//!
//! A [`BoxBoundsItem`] keeps its center, half-extent vector, radius and
//! [`Range3`] bounds consistent. Geometry changes go through one of two
//! paths: [`BoxBoundsItem::update_bounds`] after the center or extent
//! changed, or [`BoxBoundsItem::update_radius_and_center`] after the bounds
//! changed.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::{Point3, Vector3};

use crate::error::Result;
use crate::line::Line3D;
use crate::plane::Plane3D;
use crate::polygon::Polygon;
use crate::range::{Range3, RangeComparison, RangeComparison3};
use crate::sphere::Sphere3D;
use crate::tolerance;

static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an item.
///
/// Assigned on creation and never reused. Clones of an item keep its
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(u64);

impl ItemId {
    fn next() -> Self {
        ItemId(NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value of the identifier.
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position of a box relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Entirely on the side the normal points to.
    Front,
    /// Entirely on the opposite side.
    Back,
    /// Touches or crosses the plane.
    Spanning,
}

/// Position of a box relative to a closed volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// Entirely within the volume.
    Inside,
    /// Entirely clear of the volume.
    Outside,
    /// Partly inside, or too close to tell.
    Spanning,
}

/// Corner signs of the eight box vertices, top (+z) face first.
const VERTEX_SIGNS: [[f64; 3]; 8] = [
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
];

/// Vertex indices of the six box faces.
const FACE_INDICES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 7, 6, 5],
    [0, 3, 7, 4],
    [1, 5, 6, 2],
    [2, 6, 7, 3],
    [0, 4, 5, 1],
];

/// An object bounded by an axis-aligned box `center ± r_vec`.
#[derive(Debug, Clone)]
pub struct BoxBoundsItem {
    uid: ItemId,
    center: Point3<f64>,
    r_vec: Vector3<f64>,
    radius: f64,
    bounds: Range3,
    item_id: Option<String>,
}

impl Default for BoxBoundsItem {
    fn default() -> Self {
        Self::new(Point3::origin(), Vector3::zeros())
    }
}

impl PartialEq for BoxBoundsItem {
    /// Geometric equality: same center and half-extents.
    fn eq(&self, other: &Self) -> bool {
        self.center == other.center && self.r_vec == other.r_vec
    }
}

impl BoxBoundsItem {
    /// Creates an item with a fresh identity.
    pub fn new(center: Point3<f64>, r_vec: Vector3<f64>) -> Self {
        let mut item = Self {
            uid: ItemId::next(),
            center,
            r_vec,
            radius: 0.0,
            bounds: Range3::default(),
            item_id: None,
        };
        item.update_bounds();
        item
    }

    /// Creates an item with a fresh identity and an external label.
    pub fn with_item_id(
        center: Point3<f64>,
        r_vec: Vector3<f64>,
        item_id: impl Into<String>,
    ) -> Self {
        let mut item = Self::new(center, r_vec);
        item.item_id = Some(item_id.into());
        item
    }

    /// Creates an item covering `bounds`.
    pub fn from_bounds(bounds: Range3) -> Self {
        let mut item = Self::default();
        item.set_bounds(bounds);
        item
    }

    #[inline]
    pub fn uid(&self) -> ItemId {
        self.uid
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    /// Half-extent vector.
    #[inline]
    pub fn r_vec(&self) -> Vector3<f64> {
        self.r_vec
    }

    /// Length of the half-extent vector.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn bounds(&self) -> &Range3 {
        &self.bounds
    }

    /// External label, if any.
    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    pub fn set_item_id(&mut self, item_id: Option<String>) {
        self.item_id = item_id;
    }

    pub fn set_center(&mut self, center: Point3<f64>) {
        self.center = center;
        self.update_bounds();
    }

    pub fn set_r_vec(&mut self, r_vec: Vector3<f64>) {
        self.r_vec = r_vec;
        self.update_bounds();
    }

    pub fn set_bounds(&mut self, bounds: Range3) {
        self.bounds = bounds;
        self.update_radius_and_center();
    }

    /// Recomputes bounds and radius from center and half-extents.
    pub fn update_bounds(&mut self) {
        let mut bounds = Range3::from_point(self.center);
        bounds.extend_point(self.center + self.r_vec);
        bounds.extend_point(self.center - self.r_vec);
        self.bounds = bounds;
        self.radius = self.r_vec.norm();
    }

    /// Recomputes center, half-extents and radius from the bounds.
    pub fn update_radius_and_center(&mut self) {
        self.center = self.bounds.center();
        self.r_vec = self.bounds.radius();
        self.radius = self.r_vec.norm();
    }

    /// Collapses the item to a point at the origin. Identity and label are
    /// kept.
    pub fn clear(&mut self) {
        self.center = Point3::origin();
        self.r_vec = Vector3::zeros();
        self.update_bounds();
    }

    /// The eight box corners: the +z face counter-clockwise from
    /// `(+x, +y)`, then the -z face in the same order.
    pub fn vertices(&self) -> [Point3<f64>; 8] {
        VERTEX_SIGNS.map(|s| self.center + self.r_vec.component_mul(&Vector3::from(s)))
    }

    /// The six box faces as quadrilaterals.
    pub fn faces(&self) -> [Polygon; 6] {
        let v = self.vertices();
        FACE_INDICES.map(|f| Polygon::new(f.iter().map(|&i| v[i]).collect()))
    }

    /// Classifies the box against a plane.
    ///
    /// The center distance is checked against the radius first. Only if
    /// that is inconclusive are the corners tested; a corner on the plane
    /// makes the box spanning.
    pub fn check_plane(&self, plane: &Plane3D, tolerance: f64) -> Classification {
        let normal = plane.normal();
        let d = normal.dot(&(self.center - plane.origin()));
        if tolerance::gt(d, self.radius, tolerance) {
            return Classification::Front;
        }
        if tolerance::lt(d, -self.radius, tolerance) {
            return Classification::Back;
        }
        let mut side = None;
        for v in self.vertices() {
            let d = normal.dot(&(v - plane.origin()));
            if tolerance::eq(d, 0.0, tolerance) {
                return Classification::Spanning;
            }
            let s = if d > 0.0 {
                Classification::Front
            } else {
                Classification::Back
            };
            match side {
                None => side = Some(s),
                Some(c) if c != s => return Classification::Spanning,
                Some(_) => {}
            }
        }
        side.unwrap_or(Classification::Spanning)
    }

    /// Classifies the box against a sphere using its bounding radius.
    pub fn check_sphere(&self, sphere: &Sphere3D, tolerance: f64) -> Containment {
        let d = (self.center - sphere.center).norm();
        if tolerance::gt(d, self.radius + sphere.radius, tolerance) {
            return Containment::Outside;
        }
        if tolerance::lt(d + self.radius, sphere.radius, tolerance) {
            return Containment::Inside;
        }
        Containment::Spanning
    }

    /// Checks whether the line passes through any face of the box.
    ///
    /// Faces without area are skipped, so a box that is flat on every
    /// axis is never hit.
    pub fn check_line(&self, line: &Line3D, tolerance: f64) -> Result<bool> {
        for face in self.faces() {
            if line.intersects_polygon(&face, tolerance)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Checks whether a ray hits the box.
    ///
    /// Boxes entirely behind the ray origin are rejected before the line
    /// test.
    pub fn check_ray(&self, ray: &Line3D, tolerance: f64) -> Result<bool> {
        let half_space = Plane3D::from_normal(ray.direction, Vector3::x(), ray.origin);
        if self.check_plane(&half_space, tolerance) == Classification::Back {
            return Ok(false);
        }
        self.check_line(ray, tolerance)
    }

    /// Classifies this box against another box treated as a volume.
    pub fn check_box(&self, other: &BoxBoundsItem, tolerance: f64) -> Containment {
        match self.compare(other, tolerance) {
            RangeComparison::Disjoint => Containment::Outside,
            RangeComparison::OtherContains => Containment::Inside,
            _ => Containment::Spanning,
        }
    }

    pub fn compare3(&self, other: &BoxBoundsItem, tolerance: f64) -> RangeComparison3 {
        self.bounds.compare3(&other.bounds, tolerance)
    }

    /// Compares the bounds of both items.
    pub fn compare(&self, other: &BoxBoundsItem, tolerance: f64) -> RangeComparison {
        self.bounds.compare(&other.bounds, tolerance)
    }
}

impl fmt::Display for BoxBoundsItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoxBoundsItem[{} {:?}, ({}, {}, {}), ({}, {}, {})]",
            self.uid,
            self.item_id.as_deref().unwrap_or(""),
            self.center.x,
            self.center.y,
            self.center.z,
            self.r_vec.x,
            self.r_vec.y,
            self.r_vec.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerance::DEFAULT_TOLERANCE;
    use approx::assert_relative_eq;

    fn make_unit_box(x: f64, y: f64, z: f64) -> BoxBoundsItem {
        BoxBoundsItem::new(Point3::new(x, y, z), Vector3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn identities_are_unique_and_survive_clone() {
        let a = make_unit_box(0.0, 0.0, 0.0);
        let b = make_unit_box(0.0, 0.0, 0.0);
        assert_ne!(a.uid(), b.uid());
        assert_eq!(a.clone().uid(), a.uid());
        // Equality is geometric.
        assert_eq!(a, b);
    }

    #[test]
    fn bounds_follow_center_and_extent() {
        let mut item =
            BoxBoundsItem::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, -2.0, 0.5));
        let (lo, hi) = item.bounds().corners();
        assert_eq!(lo, Point3::new(0.0, 0.0, 2.5));
        assert_eq!(hi, Point3::new(2.0, 4.0, 3.5));
        assert_relative_eq!(item.radius(), 5.25f64.sqrt());

        item.set_center(Point3::origin());
        assert_eq!(item.bounds().center(), Point3::origin());

        item.set_bounds(Range3::from_bounds(
            Point3::new(-4.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 2.0),
        ));
        assert_eq!(item.center(), Point3::new(-2.0, 1.0, 1.0));
        assert_eq!(item.r_vec(), Vector3::new(2.0, 1.0, 1.0));
        assert_relative_eq!(item.radius(), 6.0f64.sqrt());
    }

    #[test]
    fn update_paths_are_idempotent() {
        let mut item =
            BoxBoundsItem::new(Point3::new(0.3, -1.7, 2.2), Vector3::new(0.1, 0.7, 1.9));
        item.update_bounds();
        let first = *item.bounds();
        item.update_radius_and_center();
        item.update_bounds();
        let (a0, a1) = first.corners();
        let (b0, b1) = item.bounds().corners();
        assert_relative_eq!(a0, b0, epsilon = 1.0e-12);
        assert_relative_eq!(a1, b1, epsilon = 1.0e-12);
    }

    #[test]
    fn clear_resets_geometry_but_keeps_identity() {
        let mut item =
            BoxBoundsItem::with_item_id(Point3::new(5.0, 5.0, 5.0), Vector3::x(), "crate");
        let uid = item.uid();
        item.clear();
        assert_eq!(item.center(), Point3::origin());
        assert_eq!(item.radius(), 0.0);
        assert_eq!(item.uid(), uid);
        assert_eq!(item.item_id(), Some("crate"));
    }

    #[test]
    fn vertices_and_faces_layout() {
        let item = BoxBoundsItem::new(Point3::new(10.0, 0.0, 0.0), Vector3::new(1.0, 2.0, 3.0));
        let v = item.vertices();
        assert_eq!(v[0], Point3::new(11.0, 2.0, 3.0));
        assert_eq!(v[2], Point3::new(9.0, -2.0, 3.0));
        assert_eq!(v[6], Point3::new(9.0, -2.0, -3.0));
        let faces = item.faces();
        assert_eq!(faces[1].vertices(), &[v[4], v[7], v[6], v[5]]);
        for face in &faces {
            assert_eq!(face.edges().len(), 4);
            // Every face normal points away from the center.
            let normal = face.normal().unwrap();
            assert!(normal.dot(&(face.barycenter() - item.center())) > 0.0);
        }
    }

    #[test]
    fn check_plane_sides() {
        let plane = Plane3D::default();
        assert_eq!(
            make_unit_box(0.0, 0.0, 5.0).check_plane(&plane, DEFAULT_TOLERANCE),
            Classification::Front
        );
        assert_eq!(
            make_unit_box(0.0, 0.0, -5.0).check_plane(&plane, DEFAULT_TOLERANCE),
            Classification::Back
        );
        assert_eq!(
            make_unit_box(0.0, 0.0, 0.5).check_plane(&plane, DEFAULT_TOLERANCE),
            Classification::Spanning
        );
        // Inside the bounding sphere but clear of the plane.
        assert_eq!(
            make_unit_box(0.0, 0.0, 1.5).check_plane(&plane, DEFAULT_TOLERANCE),
            Classification::Front
        );
        // Resting on the plane.
        assert_eq!(
            make_unit_box(0.0, 0.0, 1.0).check_plane(&plane, DEFAULT_TOLERANCE),
            Classification::Spanning
        );
    }

    #[test]
    fn check_sphere_containment() {
        let sphere = Sphere3D::new(Point3::origin(), 5.0);
        assert_eq!(
            make_unit_box(0.0, 0.0, 0.0).check_sphere(&sphere, DEFAULT_TOLERANCE),
            Containment::Inside
        );
        assert_eq!(
            make_unit_box(10.0, 0.0, 0.0).check_sphere(&sphere, DEFAULT_TOLERANCE),
            Containment::Outside
        );
        assert_eq!(
            make_unit_box(5.0, 0.0, 0.0).check_sphere(&sphere, DEFAULT_TOLERANCE),
            Containment::Spanning
        );
    }

    #[test]
    fn check_line_and_ray() {
        let item = make_unit_box(0.0, 0.0, 0.0);
        let through = Line3D::new(Point3::new(0.5, 0.5, -10.0), Vector3::z());
        let beside = Line3D::new(Point3::new(2.5, 0.5, -10.0), Vector3::z());
        assert!(item.check_line(&through, DEFAULT_TOLERANCE).unwrap());
        assert!(!item.check_line(&beside, DEFAULT_TOLERANCE).unwrap());

        let towards = Line3D::new(Point3::new(0.5, 0.5, -10.0), Vector3::z());
        let away = Line3D::new(Point3::new(0.5, 0.5, -10.0), -Vector3::z());
        assert!(item.check_ray(&towards, DEFAULT_TOLERANCE).unwrap());
        assert!(!item.check_ray(&away, DEFAULT_TOLERANCE).unwrap());
        // A line ignores direction.
        assert!(item.check_line(&away, DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn point_item_is_never_on_a_line() {
        let item = BoxBoundsItem::new(Point3::origin(), Vector3::zeros());
        let line = Line3D::new(Point3::new(0.0, 0.0, -1.0), Vector3::z());
        assert!(!item.check_line(&line, DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn check_box_and_compare() {
        let big = BoxBoundsItem::new(Point3::origin(), Vector3::new(2.0, 2.0, 2.0));
        let small = make_unit_box(0.0, 0.0, 0.0);
        let far = make_unit_box(10.0, 0.0, 0.0);
        let shifted = make_unit_box(1.5, 0.0, 0.0);
        assert_eq!(small.compare(&big, DEFAULT_TOLERANCE), RangeComparison::OtherContains);
        assert_eq!(small.check_box(&big, DEFAULT_TOLERANCE), Containment::Inside);
        assert_eq!(far.check_box(&big, DEFAULT_TOLERANCE), Containment::Outside);
        assert_eq!(shifted.check_box(&big, DEFAULT_TOLERANCE), Containment::Spanning);
        assert_eq!(big.compare3(&small, DEFAULT_TOLERANCE).x, RangeComparison::FirstContains);
    }
}
