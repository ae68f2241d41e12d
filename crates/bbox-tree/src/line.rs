//! Lines in 3D space.

use nalgebra::{Matrix3, Point3, Vector3};

use crate::error::{GeometryError, Result};
use crate::linalg::solve_3x3;
use crate::plane::Plane3D;
use crate::polygon::Polygon;

/// An infinite line through `origin` along `direction`.
///
/// The same type doubles as a ray; see
/// [`BoxBoundsItem::check_ray`](crate::item::BoxBoundsItem::check_ray).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3D {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
}

impl Default for Line3D {
    /// The Z axis.
    fn default() -> Self {
        Self::new(Point3::origin(), Vector3::z())
    }
}

impl Line3D {
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { origin, direction }
    }

    /// Line through two points, pointing from `a` to `b`.
    pub fn through(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self::new(a, b - a)
    }

    /// Point at parameter `t` along the line.
    #[inline]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Intersects the line with a plane.
    ///
    /// Returns `None` if the line is parallel to the plane or the plane is
    /// degenerate.
    pub fn intersect_plane(&self, plane: &Plane3D) -> Option<Point3<f64>> {
        let m = Matrix3::from_columns(&[plane.u(), plane.v(), -self.direction]);
        let r = solve_3x3(&m, &(self.origin - plane.origin())).ok()?;
        Some(self.point_at(r.z))
    }

    /// Checks whether the line passes through the interior or boundary of
    /// a planar polygon.
    ///
    /// A polygon whose plane is parallel to the line, or has no area, is
    /// never intersected.
    ///
    /// # Errors
    /// - [`GeometryError::DegenerateGeometry`] if the polygon has fewer than
    ///   three vertices.
    /// - [`GeometryError::NonPlanarPolygon`] if the polygon is not planar.
    pub fn intersects_polygon(&self, polygon: &Polygon, tolerance: f64) -> Result<bool> {
        let plane = polygon
            .plane()
            .ok_or(GeometryError::DegenerateGeometry("polygon needs at least three vertices"))?;
        if plane.is_degenerate() {
            return Ok(false);
        }
        match self.intersect_plane(&plane) {
            Some(p) => polygon.contains_point(p, tolerance),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerance::DEFAULT_TOLERANCE;
    use approx::assert_relative_eq;

    fn make_unit_square(z: f64) -> Polygon {
        Polygon::new(vec![
            Point3::new(-1.0, -1.0, z),
            Point3::new(1.0, -1.0, z),
            Point3::new(1.0, 1.0, z),
            Point3::new(-1.0, 1.0, z),
        ])
    }

    #[test]
    fn intersect_plane_hits_xy_plane() {
        let line = Line3D::new(Point3::new(1.0, 2.0, 5.0), Vector3::new(0.0, 0.0, -2.0));
        let p = line.intersect_plane(&Plane3D::default()).unwrap();
        assert_relative_eq!(p, Point3::new(1.0, 2.0, 0.0), epsilon = 1.0e-12);

        let oblique = Line3D::through(Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 1.0, 0.0));
        let p = oblique.intersect_plane(&Plane3D::default()).unwrap();
        assert_relative_eq!(p, Point3::new(1.0, 1.0, 0.0), epsilon = 1.0e-12);
    }

    #[test]
    fn parallel_line_has_no_intersection() {
        let line = Line3D::new(Point3::new(0.0, 0.0, 1.0), Vector3::x());
        assert_eq!(line.intersect_plane(&Plane3D::default()), None);
    }

    #[test]
    fn line_through_polygon() {
        let square = make_unit_square(2.0);
        let hit = Line3D::new(Point3::new(0.5, 0.5, 0.0), Vector3::z());
        let miss = Line3D::new(Point3::new(1.5, 0.5, 0.0), Vector3::z());
        let edge = Line3D::new(Point3::new(1.0, 0.0, 0.0), Vector3::z());
        let parallel = Line3D::new(Point3::new(0.0, 0.0, 0.0), Vector3::x());
        assert!(hit.intersects_polygon(&square, DEFAULT_TOLERANCE).unwrap());
        assert!(!miss.intersects_polygon(&square, DEFAULT_TOLERANCE).unwrap());
        assert!(edge.intersects_polygon(&square, DEFAULT_TOLERANCE).unwrap());
        assert!(!parallel.intersects_polygon(&square, DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn polygon_needs_three_vertices() {
        let segment = Polygon::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        assert!(matches!(
            Line3D::default().intersects_polygon(&segment, DEFAULT_TOLERANCE),
            Err(GeometryError::DegenerateGeometry(_))
        ));
    }
}
