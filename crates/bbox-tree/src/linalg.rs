//! Small fixed-size linear algebra helpers.
//!
//! The 3x3 solver reduces to the 2x2 solver by eliminating the first
//! unknown, permuting columns when the leading pivot is zero. This keeps
//! the failure mode explicit ([`GeometryError::Unsolvable`]) instead of
//! producing infinities.

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};

use crate::error::{GeometryError, Result};

/// Swaps the columns of a 2x2 matrix.
fn swap_columns_2x2(m: &Matrix2<f64>) -> Matrix2<f64> {
    Matrix2::new(m[(0, 1)], m[(0, 0)], m[(1, 1)], m[(1, 0)])
}

/// Solves `m * x = v` for a 2x2 system.
///
/// # Errors
/// Returns [`GeometryError::Unsolvable`] if neither column ordering has a
/// non-zero pivot and determinant.
pub fn solve_2x2(m: &Matrix2<f64>, v: &Vector2<f64>) -> Result<Vector2<f64>> {
    let (y11, y12, y21, y22) = (m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]);
    let (d, e) = (v.x, v.y);
    let det = y22 * y11 - y12 * y21;
    if y11 != 0.0 && det != 0.0 {
        let y = (e * y11 - d * y21) / det;
        let x = (d - y * y12) / y11;
        return Ok(Vector2::new(x, y));
    }
    if y12 != 0.0 && (y21 * y12 - y11 * y22) != 0.0 {
        let r = solve_2x2(&swap_columns_2x2(m), v)?;
        return Ok(Vector2::new(r.y, r.x));
    }
    Err(GeometryError::Unsolvable)
}

/// Permutes the components of a vector: `result[i] = v[p[i]]`.
fn permute3(v: &Vector3<f64>, p: [usize; 3]) -> Vector3<f64> {
    Vector3::new(v[p[0]], v[p[1]], v[p[2]])
}

/// Permutes the columns of a 3x3 matrix: column `i` becomes column `p[i]`.
fn permute_columns_3x3(m: &Matrix3<f64>, p: [usize; 3]) -> Matrix3<f64> {
    Matrix3::from_fn(|r, c| m[(r, p[c])])
}

/// Solves `m * x = v` for a 3x3 system.
///
/// # Errors
/// Returns [`GeometryError::Unsolvable`] if the first row has no non-zero
/// entry or the reduced 2x2 system cannot be solved.
pub fn solve_3x3(m: &Matrix3<f64>, v: &Vector3<f64>) -> Result<Vector3<f64>> {
    let x11 = m[(0, 0)];
    if x11 != 0.0 {
        let (x12, x13) = (m[(0, 1)], m[(0, 2)]);
        let (x21, x22, x23) = (m[(1, 0)], m[(1, 1)], m[(1, 2)]);
        let (x31, x32, x33) = (m[(2, 0)], m[(2, 1)], m[(2, 2)]);
        let (a, b, c) = (v.x, v.y, v.z);
        let reduced = Matrix2::new(
            (x22 * x11 - x12 * x21) / x11,
            (x23 * x11 - x13 * x21) / x11,
            (x32 * x11 - x12 * x31) / x11,
            (x33 * x11 - x13 * x31) / x11,
        );
        let rhs = Vector2::new((b * x11 - a * x21) / x11, (c * x11 - a * x31) / x11);
        let r = solve_2x2(&reduced, &rhs)?;
        let x = (a - r.x * x12 - r.y * x13) / x11;
        return Ok(Vector3::new(x, r.x, r.y));
    }
    // Both permutations are involutions, so the same `p` maps back.
    for p in [[1, 0, 2], [2, 1, 0]] {
        if m[(0, p[0])] != 0.0 {
            let r = solve_3x3(&permute_columns_3x3(m, p), v)?;
            return Ok(permute3(&r, p));
        }
    }
    Err(GeometryError::Unsolvable)
}

/// Inverts a 3x3 matrix by solving against the three standard basis vectors.
///
/// # Errors
/// Returns [`GeometryError::Unsolvable`] if the matrix is singular.
pub fn invert_3x3(m: &Matrix3<f64>) -> Result<Matrix3<f64>> {
    let x = solve_3x3(m, &Vector3::x())?;
    let y = solve_3x3(m, &Vector3::y())?;
    let z = solve_3x3(m, &Vector3::z())?;
    Ok(Matrix3::from_columns(&[x, y, z]))
}

/// Projection of `v` onto `onto`.
pub fn project(onto: &Vector3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    onto * (onto.dot(v) / onto.dot(onto))
}

/// Rotates `b` within the plane spanned by `a` and `b` so that it is
/// orthogonal to `a`, keeping the length of `b`.
pub fn ortho(a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    (b - project(a, b)).normalize() * b.norm()
}
