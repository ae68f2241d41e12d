//! Tolerant scalar comparison.
//!
//! Every geometric predicate in this crate goes through these helpers so
//! that values within `tolerance` of each other compare as equal.

use nalgebra::{Matrix3, Point2, Point3};

/// Default tolerance for comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1.0e-6;

/// `a < b` with tolerance: `a` must be below `b - tolerance`.
#[inline]
pub fn lt(a: f64, b: f64, tolerance: f64) -> bool {
    a < b - tolerance
}

/// `a > b` with tolerance: `a` must be above `b + tolerance`.
#[inline]
pub fn gt(a: f64, b: f64, tolerance: f64) -> bool {
    a > b + tolerance
}

/// `a == b` with tolerance.
#[inline]
pub fn eq(a: f64, b: f64, tolerance: f64) -> bool {
    !(gt(a, b, tolerance) || lt(a, b, tolerance))
}

/// `a <= b` with tolerance.
#[inline]
pub fn lt_or_eq(a: f64, b: f64, tolerance: f64) -> bool {
    !gt(a, b, tolerance)
}

/// `a >= b` with tolerance.
#[inline]
pub fn gt_or_eq(a: f64, b: f64, tolerance: f64) -> bool {
    !lt(a, b, tolerance)
}

/// Component-wise tolerant equality of two 2D points.
pub fn eq_point2(a: &Point2<f64>, b: &Point2<f64>, tolerance: f64) -> bool {
    eq(a.x, b.x, tolerance) && eq(a.y, b.y, tolerance)
}

/// Component-wise tolerant equality of two 3D points.
pub fn eq_point3(a: &Point3<f64>, b: &Point3<f64>, tolerance: f64) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| eq(*x, *y, tolerance))
}

/// Element-wise tolerant equality of two 3x3 matrices.
pub fn matrix_eq(a: &Matrix3<f64>, b: &Matrix3<f64>, tolerance: f64) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| eq(*x, *y, tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_comparisons_need_more_than_tolerance() {
        assert!(!lt(1.0, 1.0 + 0.5e-6, DEFAULT_TOLERANCE));
        assert!(lt(1.0, 1.0 + 2.0e-6, DEFAULT_TOLERANCE));
        assert!(!gt(1.0 + 0.5e-6, 1.0, DEFAULT_TOLERANCE));
        assert!(gt(1.0 + 2.0e-6, 1.0, DEFAULT_TOLERANCE));
    }

    #[test]
    fn equality_within_tolerance() {
        assert!(eq(0.0, 1.0e-7, DEFAULT_TOLERANCE));
        assert!(!eq(0.0, 1.0e-3, DEFAULT_TOLERANCE));
        assert!(eq(5.0, 5.4, 0.5));
    }

    #[test]
    fn derived_operators() {
        assert!(lt_or_eq(1.0, 1.0, DEFAULT_TOLERANCE));
        assert!(lt_or_eq(1.0 + 0.5e-6, 1.0, DEFAULT_TOLERANCE));
        assert!(!lt_or_eq(2.0, 1.0, DEFAULT_TOLERANCE));
        assert!(gt_or_eq(1.0 - 0.5e-6, 1.0, DEFAULT_TOLERANCE));
        assert!(!gt_or_eq(0.0, 1.0, DEFAULT_TOLERANCE));
    }

    #[test]
    fn point_and_matrix_equality() {
        assert!(eq_point2(
            &Point2::new(1.0, 2.0),
            &Point2::new(1.0 + 1.0e-8, 2.0),
            DEFAULT_TOLERANCE
        ));
        assert!(!eq_point3(
            &Point3::new(1.0, 2.0, 3.0),
            &Point3::new(1.0, 2.0, 3.1),
            DEFAULT_TOLERANCE
        ));
        assert!(matrix_eq(
            &Matrix3::identity(),
            &Matrix3::identity(),
            DEFAULT_TOLERANCE
        ));
        assert!(!matrix_eq(
            &Matrix3::identity(),
            &Matrix3::zeros(),
            DEFAULT_TOLERANCE
        ));
    }
}
