//! Plane representation and operations.

use nalgebra::{Matrix3, Point3, Vector3};

use crate::linalg::ortho;
use crate::tolerance::{self, DEFAULT_TOLERANCE};

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within tolerance)
    OnPlane,
}

/// A plane in 3D space, given by a position and two spanning directions.
///
/// The spanning vectors need not be orthogonal or normalized. The
/// orthonormal tangent space is derived on demand: the tangent follows `u`,
/// the binormal is `v` rotated to be orthogonal to `u`, and the normal is
/// `u × v`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    origin: Point3<f64>,
    u: Vector3<f64>,
    v: Vector3<f64>,
}

impl Default for Plane3D {
    /// The XY plane through the origin.
    fn default() -> Self {
        Self::new(Point3::origin(), Vector3::x(), Vector3::y())
    }
}

impl Plane3D {
    /// Creates a plane from a position and two spanning directions.
    pub fn new(origin: Point3<f64>, u: Vector3<f64>, v: Vector3<f64>) -> Self {
        Self { origin, u, v }
    }

    /// Creates a plane through three points, spanned by `b - a` and `c - a`.
    ///
    /// The normal direction follows the right-hand rule: (b - a) × (c - a).
    pub fn from_three_points(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self::new(a, b - a, c - a)
    }

    /// Creates a plane from a normal vector, a tangent hint and a position.
    ///
    /// If `tangent` is parallel to `normal`, the Y and then the Z axis are
    /// tried instead. The tangent is made orthogonal to the normal and the
    /// binormal completes a right-handed basis.
    pub fn from_normal(normal: Vector3<f64>, tangent: Vector3<f64>, origin: Point3<f64>) -> Self {
        let mut u = tangent;
        for fallback in [Vector3::y(), Vector3::z()] {
            if !tolerance::eq(normal.cross(&u).norm(), 0.0, DEFAULT_TOLERANCE) {
                break;
            }
            u = fallback;
        }
        let u = ortho(&normal, &u).normalize();
        let v = normal.cross(&u).normalize();
        Self::new(origin, u, v)
    }

    /// Returns the position of the plane.
    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Returns the first spanning direction.
    #[inline]
    pub fn u(&self) -> Vector3<f64> {
        self.u
    }

    /// Returns the second spanning direction.
    #[inline]
    pub fn v(&self) -> Vector3<f64> {
        self.v
    }

    /// Unit tangent vector (direction of `u`).
    pub fn tangent(&self) -> Vector3<f64> {
        self.u.normalize()
    }

    /// Unit binormal vector (`v` orthogonalized against the tangent).
    pub fn binormal(&self) -> Vector3<f64> {
        ortho(&self.tangent(), &self.v).normalize()
    }

    /// Unit normal vector (`u × v`).
    pub fn normal(&self) -> Vector3<f64> {
        self.u.cross(&self.v).normalize()
    }

    /// Returns `true` if the spanning vectors do not define a plane.
    pub fn is_degenerate(&self) -> bool {
        self.u.cross(&self.v).norm() <= f64::EPSILON
    }

    /// Base matrix of the tangent space.
    ///
    /// The columns are tangent, binormal and normal, so the matrix maps
    /// tangent-space coordinates to world directions.
    pub fn tangent_base(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[self.tangent(), self.binormal(), self.normal()])
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is in front (same side as normal)
    /// - Negative: point is behind (opposite side from normal)
    /// - Zero: point is on the plane
    #[inline]
    pub fn signed_distance(&self, point: Point3<f64>) -> f64 {
        self.normal().dot(&(point - self.origin))
    }

    /// Classifies which side of the plane a point lies on.
    /// Uses the default tolerance.
    #[inline]
    pub fn classify_point(&self, point: Point3<f64>) -> PlaneSide {
        self.classify_point_with_tolerance(point, DEFAULT_TOLERANCE)
    }

    /// Classifies which side of the plane a point lies on, with a custom tolerance.
    pub fn classify_point_with_tolerance(&self, point: Point3<f64>, tolerance: f64) -> PlaneSide {
        let dist = self.signed_distance(point);
        if tolerance::gt(dist, 0.0, tolerance) {
            PlaneSide::Front
        } else if tolerance::lt(dist, 0.0, tolerance) {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            u: self.v,
            v: self.u,
        }
    }

    /// Projects a point onto the plane (finds the closest point on the plane).
    #[inline]
    pub fn project_point(&self, point: Point3<f64>) -> Point3<f64> {
        point - self.normal() * self.signed_distance(point)
    }
}
