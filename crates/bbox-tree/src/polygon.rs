//! Polygons in 3D space and in a plane's 2D tangent space.

use nalgebra::{Matrix2, Matrix3, Point2, Point3, Vector2, Vector3};

use crate::error::{GeometryError, Result};
use crate::linalg::{invert_3x3, solve_2x2};
use crate::plane::Plane3D;
use crate::tolerance::{self, eq_point2};

/// Builds closed-loop edges `(0,1), (1,2), ..., (n-1,0)` for `n` vertices.
///
/// Two vertices give a single open edge; fewer give none.
fn loop_edges(n: usize) -> Vec<(usize, usize)> {
    if n < 2 {
        return Vec::new();
    }
    let mut edges: Vec<(usize, usize)> = (1..n).map(|i| (i - 1, i)).collect();
    if n >= 3 {
        edges.push((n - 1, 0));
    }
    edges
}

/// A polygon in a 2D plane, given by vertices and index-pair edges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon2 {
    vertices: Vec<Point2<f64>>,
    edges: Vec<(usize, usize)>,
}

impl Polygon2 {
    /// Creates a closed polygon from an ordered vertex list.
    pub fn new(vertices: Vec<Point2<f64>>) -> Self {
        let edges = loop_edges(vertices.len());
        Self { vertices, edges }
    }

    /// Creates a polygon with explicit edges.
    pub fn with_edges(vertices: Vec<Point2<f64>>, edges: Vec<(usize, usize)>) -> Self {
        Self { vertices, edges }
    }

    /// Returns the vertices of the polygon.
    #[inline]
    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    /// Returns the edges as vertex index pairs.
    #[inline]
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Checks whether a point lies inside the polygon (boundary included).
    ///
    /// Counts crossings of a ray cast from `point` in the +x direction.
    /// A point on a vertex or on a horizontal edge is inside. When the ray
    /// passes through an edge endpoint, the test point is nudged down by
    /// `1.1 * tolerance` for that edge so the crossing is counted once.
    ///
    /// # Errors
    /// Returns [`GeometryError::Unsolvable`] if an edge intersection cannot
    /// be computed.
    pub fn contains_point(&self, point: Point2<f64>, tolerance: f64) -> Result<bool> {
        let mut crossings = 0usize;
        for &(i0, i1) in &self.edges {
            let a = self.vertices[i0];
            let b = self.vertices[i1];
            let mut p = point;
            if eq_point2(&p, &a, tolerance) || eq_point2(&p, &b, tolerance) {
                return Ok(true);
            }
            if tolerance::eq(p.y, a.y, tolerance) && tolerance::eq(p.y, b.y, tolerance) {
                if tolerance::gt_or_eq(p.x, a.x.min(b.x), tolerance)
                    && tolerance::lt_or_eq(p.x, a.x.max(b.x), tolerance)
                {
                    return Ok(true);
                }
                continue;
            }
            if tolerance::eq(p.y, a.y, tolerance) {
                p.y -= 1.1 * tolerance;
            }
            if tolerance::eq(p.y, b.y, tolerance) {
                p.y -= 1.1 * tolerance;
            }
            let left_of_point =
                tolerance::gt(p.x, a.x, tolerance) && tolerance::gt(p.x, b.x, tolerance);
            let below_point =
                tolerance::gt(p.y, a.y, tolerance) && tolerance::gt(p.y, b.y, tolerance);
            let above_point =
                tolerance::lt(p.y, a.y, tolerance) && tolerance::lt(p.y, b.y, tolerance);
            if left_of_point || below_point || above_point {
                continue;
            }
            // a + s * (b - a) = p + (dx, 0)
            let m = Matrix2::new(b.x - a.x, -1.0, b.y - a.y, 0.0);
            let r = solve_2x2(&m, &Vector2::new(p.x - a.x, p.y - a.y))?;
            let dx = r.y;
            if tolerance::eq(dx, 0.0, tolerance) {
                // On the edge.
                return Ok(true);
            }
            if tolerance::gt(dx, 0.0, tolerance) {
                crossings += 1;
            }
        }
        Ok(crossings % 2 == 1)
    }
}

/// A polygon in 3D space, defined by an ordered list of vertices and edges.
///
/// Vertices are expected to be coplanar. Operations that depend on this
/// report [`GeometryError::NonPlanarPolygon`] when it does not hold.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    vertices: Vec<Point3<f64>>,
    edges: Vec<(usize, usize)>,
}

impl Polygon {
    /// Creates a closed polygon from an ordered vertex list.
    pub fn new(vertices: Vec<Point3<f64>>) -> Self {
        let edges = loop_edges(vertices.len());
        Self { vertices, edges }
    }

    /// Creates a polygon with explicit edges.
    pub fn with_edges(vertices: Vec<Point3<f64>>, edges: Vec<(usize, usize)>) -> Self {
        Self { vertices, edges }
    }

    /// Rebuilds the edges from the vertex order. Returns the number of edges.
    pub fn create_edges(&mut self) -> usize {
        self.edges = loop_edges(self.vertices.len());
        self.edges.len()
    }

    /// Returns the vertices of the polygon.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Returns the edges as vertex index pairs.
    #[inline]
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the polygon has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the plane spanned by the first, second and last vertices.
    ///
    /// Returns `None` if the polygon has fewer than three vertices.
    pub fn plane(&self) -> Option<Plane3D> {
        let n = self.vertices.len();
        if n < 3 {
            return None;
        }
        Some(self.plane_through(0, 1, n - 1))
    }

    /// Returns the plane through the vertices at the three given indices.
    ///
    /// # Panics
    /// Panics if an index is out of bounds.
    pub fn plane_through(&self, a: usize, b: usize, c: usize) -> Plane3D {
        Plane3D::from_three_points(self.vertices[a], self.vertices[b], self.vertices[c])
    }

    /// Computes the (unnormalized) normal of the polygon plane.
    pub fn normal(&self) -> Option<Vector3<f64>> {
        self.plane().map(|p| p.u().cross(&p.v()))
    }

    /// Computes the barycenter of the polygon vertices.
    pub fn barycenter(&self) -> Point3<f64> {
        let sum: Vector3<f64> = self.vertices.iter().map(|p| p.coords).sum();
        Point3::from(sum / self.vertices.len().max(1) as f64)
    }

    /// Translates the polygon so its first vertex is at the origin and then
    /// applies `m` to every vertex.
    pub fn transform(&self, m: &Matrix3<f64>) -> Self {
        let Some(origin) = self.vertices.first().copied() else {
            return self.clone();
        };
        let vertices = self
            .vertices
            .iter()
            .map(|v| Point3::from(m * (v - origin)))
            .collect();
        Self {
            vertices,
            edges: self.edges.clone(),
        }
    }

    /// Checks whether a point lies inside the polygon.
    ///
    /// The polygon and the point are moved into the polygon's tangent space
    /// (first vertex at the origin) and tested with
    /// [`Polygon2::contains_point`]. The point is projected onto the
    /// polygon plane in the process.
    ///
    /// # Errors
    /// - [`GeometryError::DegenerateGeometry`] if the polygon has fewer than
    ///   three vertices or its plane is degenerate.
    /// - [`GeometryError::NonPlanarPolygon`] if a vertex lies off the plane.
    /// - [`GeometryError::Unsolvable`] from the tangent space inversion.
    pub fn contains_point(&self, point: Point3<f64>, tolerance: f64) -> Result<bool> {
        let plane = self
            .plane()
            .ok_or(GeometryError::DegenerateGeometry("polygon needs at least three vertices"))?;
        if plane.is_degenerate() {
            return Err(GeometryError::DegenerateGeometry("polygon plane has zero area"));
        }
        let to_tangent = invert_3x3(&plane.tangent_base())?;
        let local = self.transform(&to_tangent);
        if let Some(v) = local
            .vertices
            .iter()
            .find(|v| !tolerance::eq(v.z, 0.0, tolerance))
        {
            return Err(GeometryError::NonPlanarPolygon { vertex: *v });
        }
        let flat = Polygon2::with_edges(
            local.vertices.iter().map(|v| Point2::new(v.x, v.y)).collect(),
            local.edges.clone(),
        );
        let p = to_tangent * (point - self.vertices[0]);
        flat.contains_point(Point2::new(p.x, p.y), tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerance::DEFAULT_TOLERANCE;

    fn make_square2() -> Polygon2 {
        Polygon2::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ])
    }

    fn make_square3(z: f64) -> Polygon {
        Polygon::new(vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(2.0, 0.0, z),
            Point3::new(2.0, 2.0, z),
            Point3::new(0.0, 2.0, z),
        ])
    }

    #[test]
    fn loop_edges_close_polygon() {
        assert!(loop_edges(0).is_empty());
        assert_eq!(loop_edges(2), vec![(0, 1)]);
        assert_eq!(loop_edges(3), vec![(0, 1), (1, 2), (2, 0)]);
        let mut poly = make_square3(0.0);
        assert_eq!(poly.create_edges(), 4);
    }

    #[test]
    fn square_contains_inner_point() {
        let square = make_square2();
        assert!(square.contains_point(Point2::new(1.0, 1.0), DEFAULT_TOLERANCE).unwrap());
        assert!(square.contains_point(Point2::new(0.3, 1.7), DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn square_rejects_outer_points() {
        let square = make_square2();
        for p in [
            Point2::new(3.0, 1.0),
            Point2::new(-1.0, 1.0),
            Point2::new(1.0, 3.0),
            Point2::new(1.0, -0.5),
        ] {
            assert!(!square.contains_point(p, DEFAULT_TOLERANCE).unwrap(), "{p}");
        }
    }

    #[test]
    fn vertex_and_edge_points_are_inside() {
        let square = make_square2();
        // Polygon vertex.
        assert!(square.contains_point(Point2::new(2.0, 2.0), DEFAULT_TOLERANCE).unwrap());
        // Horizontal edge.
        assert!(square.contains_point(Point2::new(1.0, 0.0), DEFAULT_TOLERANCE).unwrap());
        // Vertical edge.
        assert!(square.contains_point(Point2::new(2.0, 1.0), DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn ray_through_vertex_counts_once() {
        // Diamond: the ray from the center passes exactly through (2, 0).
        let diamond = Polygon2::new(vec![
            Point2::new(0.0, -2.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
            Point2::new(-2.0, 0.0),
        ]);
        assert!(diamond.contains_point(Point2::new(0.0, 0.0), DEFAULT_TOLERANCE).unwrap());
        assert!(!diamond.contains_point(Point2::new(-3.0, 0.0), DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn polygon_in_tangent_space() {
        let square = make_square3(5.0);
        assert!(square.contains_point(Point3::new(1.0, 1.0, 5.0), DEFAULT_TOLERANCE).unwrap());
        assert!(!square.contains_point(Point3::new(3.0, 1.0, 5.0), DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn tilted_polygon_contains_point() {
        let poly = Polygon::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        assert!(poly.contains_point(Point3::new(0.5, 0.5, 0.5), DEFAULT_TOLERANCE).unwrap());
        assert!(!poly.contains_point(Point3::new(1.5, 0.5, 1.5), DEFAULT_TOLERANCE).unwrap());
    }

    #[test]
    fn non_planar_polygon_is_an_error() {
        let poly = Polygon::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let result = poly.contains_point(Point3::new(0.5, 0.5, 0.0), DEFAULT_TOLERANCE);
        assert!(matches!(result, Err(GeometryError::NonPlanarPolygon { .. })));
    }

    #[test]
    fn degenerate_polygon_is_an_error() {
        let poly = Polygon::new(vec![Point3::origin(); 4]);
        assert!(matches!(
            poly.contains_point(Point3::origin(), DEFAULT_TOLERANCE),
            Err(GeometryError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn barycenter_and_transform() {
        let square = make_square3(1.0);
        assert_eq!(square.barycenter(), Point3::new(1.0, 1.0, 1.0));
        let moved = square.transform(&Matrix3::identity());
        assert_eq!(moved.vertices()[0], Point3::origin());
        assert_eq!(moved.vertices()[2], Point3::new(2.0, 2.0, 0.0));
        assert_eq!(moved.edges(), square.edges());
    }
}
