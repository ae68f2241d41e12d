//! Scalar and axis-aligned 3D ranges with a tolerant five-way comparison.

use std::fmt;

use nalgebra::{Point3, Vector3};

use crate::tolerance;

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of the axis in a point or vector.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Relationship between two ranges, seen from the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeComparison {
    /// Both bounds are equal within tolerance.
    Equal,
    /// The first range contains the other one.
    FirstContains,
    /// The other range contains the first one.
    OtherContains,
    /// The ranges intersect, neither contains the other.
    Overlap,
    /// The ranges do not intersect.
    Disjoint,
}

impl RangeComparison {
    /// Result of the same comparison with the operands swapped.
    pub fn flipped(self) -> Self {
        match self {
            RangeComparison::FirstContains => RangeComparison::OtherContains,
            RangeComparison::OtherContains => RangeComparison::FirstContains,
            other => other,
        }
    }

    /// `true` for [`Equal`](Self::Equal) and
    /// [`FirstContains`](Self::FirstContains).
    #[inline]
    pub fn first_contains_or_equal(self) -> bool {
        matches!(self, RangeComparison::Equal | RangeComparison::FirstContains)
    }
}

impl fmt::Display for RangeComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RangeComparison::Equal => "equal",
            RangeComparison::FirstContains => "first contains",
            RangeComparison::OtherContains => "other contains",
            RangeComparison::Overlap => "overlap",
            RangeComparison::Disjoint => "disjoint",
        };
        f.write_str(name)
    }
}

/// A closed interval of scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
    min: f64,
    max: f64,
}

impl Range {
    /// A range from `min` to `max`. The bounds are taken as given.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A degenerate range containing exactly `value`.
    pub fn from_value(value: f64) -> Self {
        Self::new(value, value)
    }

    /// Lower bound.
    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Returns `(min, max)`.
    #[inline]
    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Replaces both bounds.
    pub fn set_bounds(&mut self, min: f64, max: f64) {
        self.min = min;
        self.max = max;
    }

    /// Widens the range so that it contains `value`.
    pub fn extend(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    #[inline]
    pub fn center(&self) -> f64 {
        0.5 * (self.min + self.max)
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        0.5 * (self.max - self.min)
    }

    #[inline]
    pub fn extent(&self) -> f64 {
        self.max - self.min
    }

    /// Value at parameter `s`, where 0 maps to `min` and 1 maps to `max`.
    #[inline]
    pub fn value(&self, s: f64) -> f64 {
        self.min + (self.max - self.min) * s
    }

    /// Clamps `value` to the range.
    pub fn clamp(&self, value: f64) -> f64 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// [`value`](Self::value) clamped to the range.
    pub fn clamped_value(&self, s: f64) -> f64 {
        self.clamp(self.value(s))
    }

    /// Compares this range against `other`.
    ///
    /// Checks are applied in order: equal, disjoint, other contains, first
    /// contains, otherwise overlap.
    pub fn compare(&self, other: &Range, tolerance: f64) -> RangeComparison {
        if tolerance::eq(self.min, other.min, tolerance)
            && tolerance::eq(self.max, other.max, tolerance)
        {
            return RangeComparison::Equal;
        }
        if tolerance::lt(self.max, other.min, tolerance)
            || tolerance::gt(self.min, other.max, tolerance)
        {
            return RangeComparison::Disjoint;
        }
        if tolerance::lt_or_eq(other.min, self.min, tolerance)
            && tolerance::gt_or_eq(other.max, self.max, tolerance)
        {
            return RangeComparison::OtherContains;
        }
        if tolerance::lt_or_eq(self.min, other.min, tolerance)
            && tolerance::gt_or_eq(self.max, other.max, tolerance)
        {
            return RangeComparison::FirstContains;
        }
        RangeComparison::Overlap
    }

    /// Checks whether `value` lies within the range.
    pub fn contains_value(&self, value: f64, tolerance: f64) -> bool {
        !(tolerance::lt(value, self.min, tolerance) || tolerance::gt(value, self.max, tolerance))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Per-axis comparison results, as returned by [`Range3::compare3`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeComparison3 {
    pub x: RangeComparison,
    pub y: RangeComparison,
    pub z: RangeComparison,
}

impl RangeComparison3 {
    /// Results in axis order.
    pub fn to_array(self) -> [RangeComparison; 3] {
        [self.x, self.y, self.z]
    }

    /// Combines the per-axis results into one.
    ///
    /// Agreement on all axes wins outright. Otherwise a disjoint axis makes
    /// the whole result disjoint, before containment is considered.
    pub fn combined(self) -> RangeComparison {
        use RangeComparison::*;

        let c = self.to_array();
        if c[0] == c[1] && c[0] == c[2] {
            return c[0];
        }
        if c.contains(&Disjoint) {
            return Disjoint;
        }
        if c.iter().all(|r| matches!(r, FirstContains | Equal)) {
            return FirstContains;
        }
        if c.iter().all(|r| matches!(r, OtherContains | Equal)) {
            return OtherContains;
        }
        Overlap
    }
}

/// An axis-aligned box given by one [`Range`] per axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range3 {
    x: Range,
    y: Range,
    z: Range,
}

impl Range3 {
    pub fn new(x: Range, y: Range, z: Range) -> Self {
        Self { x, y, z }
    }

    /// A degenerate box containing exactly `p`.
    pub fn from_point(p: Point3<f64>) -> Self {
        Self::new(Range::from_value(p.x), Range::from_value(p.y), Range::from_value(p.z))
    }

    /// The smallest box containing both corners.
    pub fn from_bounds(a: Point3<f64>, b: Point3<f64>) -> Self {
        let mut r = Self::from_point(a);
        r.extend_point(b);
        r
    }

    /// Widens the box so that it contains `p`.
    pub fn extend_point(&mut self, p: Point3<f64>) {
        self.x.extend(p.x);
        self.y.extend(p.y);
        self.z.extend(p.z);
    }

    /// Widens the box so that it contains `other`.
    pub fn extend_range(&mut self, other: &Range3) {
        let (lo, hi) = other.corners();
        self.extend_point(lo);
        self.extend_point(hi);
    }

    /// Returns the `(min, max)` corners.
    pub fn corners(&self) -> (Point3<f64>, Point3<f64>) {
        (
            Point3::new(self.x.min, self.y.min, self.z.min),
            Point3::new(self.x.max, self.y.max, self.z.max),
        )
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::new(self.x.center(), self.y.center(), self.z.center())
    }

    /// Half-extent on each axis.
    pub fn radius(&self) -> Vector3<f64> {
        Vector3::new(self.x.radius(), self.y.radius(), self.z.radius())
    }

    pub fn extent(&self) -> Vector3<f64> {
        Vector3::new(self.x.extent(), self.y.extent(), self.z.extent())
    }

    /// Returns the range along `axis`.
    #[inline]
    pub fn axis_range(&self, axis: Axis) -> &Range {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Point at per-axis parameters `s`.
    pub fn value(&self, s: Vector3<f64>) -> Point3<f64> {
        Point3::new(self.x.value(s.x), self.y.value(s.y), self.z.value(s.z))
    }

    /// Clamps `p` into the box.
    pub fn clamp(&self, p: Point3<f64>) -> Point3<f64> {
        Point3::new(self.x.clamp(p.x), self.y.clamp(p.y), self.z.clamp(p.z))
    }

    pub fn clamped_value(&self, s: Vector3<f64>) -> Point3<f64> {
        self.clamp(self.value(s))
    }

    /// Compares each axis separately.
    pub fn compare3(&self, other: &Range3, tolerance: f64) -> RangeComparison3 {
        RangeComparison3 {
            x: self.x.compare(&other.x, tolerance),
            y: self.y.compare(&other.y, tolerance),
            z: self.z.compare(&other.z, tolerance),
        }
    }

    /// Compares this box against `other`. See [`RangeComparison3::combined`].
    pub fn compare(&self, other: &Range3, tolerance: f64) -> RangeComparison {
        self.compare3(other, tolerance).combined()
    }

    pub fn contains_point(&self, p: Point3<f64>, tolerance: f64) -> bool {
        self.x.contains_value(p.x, tolerance)
            && self.y.contains_value(p.y, tolerance)
            && self.z.contains_value(p.z, tolerance)
    }

    /// Axes ordered by decreasing extent. Ties keep index order.
    pub fn axis_order(&self) -> [Axis; 3] {
        let e = self.extent();
        let mut order = Axis::ALL;
        order.sort_by(|a, b| e[b.index()].total_cmp(&e[a.index()]));
        order
    }

    /// The axis with the largest extent.
    pub fn longest_axis(&self) -> Axis {
        self.axis_order()[0]
    }
}

impl fmt::Display for Range3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tolerance::DEFAULT_TOLERANCE;
    use approx::assert_relative_eq;

    use RangeComparison::*;

    fn make_cube(center: f64, radius: f64) -> Range3 {
        Range3::from_bounds(
            Point3::new(center - radius, center - radius, center - radius),
            Point3::new(center + radius, center + radius, center + radius),
        )
    }

    #[test]
    fn compare_scalar_ranges() {
        let a = Range::new(0.0, 1.0);
        assert_eq!(a.compare(&Range::new(0.0, 1.0 + 1.0e-8), DEFAULT_TOLERANCE), Equal);
        assert_eq!(a.compare(&Range::new(2.0, 3.0), DEFAULT_TOLERANCE), Disjoint);
        assert_eq!(a.compare(&Range::new(-1.0, 2.0), DEFAULT_TOLERANCE), OtherContains);
        assert_eq!(a.compare(&Range::new(0.25, 0.75), DEFAULT_TOLERANCE), FirstContains);
        assert_eq!(a.compare(&Range::new(0.5, 1.5), DEFAULT_TOLERANCE), Overlap);
        // Touching ranges share a point.
        assert_eq!(a.compare(&Range::new(1.0, 2.0), DEFAULT_TOLERANCE), Overlap);
    }

    #[test]
    fn compare_is_antisymmetric() {
        let ranges = [
            Range::new(0.0, 1.0),
            Range::new(0.0, 1.0),
            Range::new(-1.0, 2.0),
            Range::new(0.25, 0.75),
            Range::new(0.5, 1.5),
            Range::new(3.0, 4.0),
            Range::new(1.0, 1.0),
            Range::new(0.0, 0.5),
        ];
        for a in &ranges {
            for b in &ranges {
                let ab = a.compare(b, DEFAULT_TOLERANCE);
                let ba = b.compare(a, DEFAULT_TOLERANCE);
                assert_eq!(ab, ba.flipped(), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn extend_and_derived_values() {
        let mut r = Range::from_value(1.0);
        r.extend(-1.0);
        r.extend(3.0);
        r.extend(0.0);
        assert_eq!(r.bounds(), (-1.0, 3.0));
        assert_relative_eq!(r.center(), 1.0);
        assert_relative_eq!(r.radius(), 2.0);
        assert_relative_eq!(r.extent(), 4.0);
        assert_relative_eq!(r.value(0.25), 0.0);
        assert_relative_eq!(r.clamped_value(1.5), 3.0);
        assert_relative_eq!(r.clamp(-7.0), -1.0);
        assert!(r.contains_value(3.0 + 1.0e-8, DEFAULT_TOLERANCE));
        assert!(!r.contains_value(3.1, DEFAULT_TOLERANCE));
    }

    #[test]
    fn range3_union_of_points() {
        let mut r = Range3::from_point(Point3::new(1.0, 2.0, 3.0));
        r.extend_point(Point3::new(-1.0, 4.0, 3.0));
        r.extend_point(Point3::new(0.0, 0.0, 5.0));
        let (lo, hi) = r.corners();
        assert_eq!(lo, Point3::new(-1.0, 0.0, 3.0));
        assert_eq!(hi, Point3::new(1.0, 4.0, 5.0));
        assert_eq!(r.center(), Point3::new(0.0, 2.0, 4.0));
        assert_eq!(r.radius(), Vector3::new(1.0, 2.0, 1.0));

        let mut u = make_cube(10.0, 1.0);
        u.extend_range(&r);
        assert_eq!(u.corners(), (Point3::new(-1.0, 0.0, 3.0), Point3::new(11.0, 11.0, 11.0)));
    }

    #[test]
    fn range3_compare_combines_axes() {
        let outer = make_cube(0.0, 2.0);
        let inner = make_cube(0.0, 1.0);
        assert_eq!(inner.compare(&outer, DEFAULT_TOLERANCE), OtherContains);
        assert_eq!(outer.compare(&inner, DEFAULT_TOLERANCE), FirstContains);
        assert_eq!(outer.compare(&outer, DEFAULT_TOLERANCE), Equal);

        // Equal on X, containing on Y and Z.
        let slab = Range3::from_bounds(Point3::new(-2.0, -1.0, -1.0), Point3::new(2.0, 1.0, 1.0));
        assert_eq!(outer.compare(&slab, DEFAULT_TOLERANCE), FirstContains);
        assert_eq!(slab.compare(&outer, DEFAULT_TOLERANCE), OtherContains);

        // Contained on two axes but disjoint on one.
        let far = Range3::from_bounds(Point3::new(-1.0, -1.0, 5.0), Point3::new(1.0, 1.0, 6.0));
        assert_eq!(outer.compare(&far, DEFAULT_TOLERANCE), Disjoint);

        let shifted = make_cube(1.0, 2.0);
        assert_eq!(outer.compare(&shifted, DEFAULT_TOLERANCE), Overlap);
    }

    #[test]
    fn range3_compare_is_antisymmetric() {
        let boxes = [
            make_cube(0.0, 2.0),
            make_cube(0.0, 1.0),
            make_cube(1.0, 2.0),
            make_cube(9.0, 1.0),
            Range3::from_bounds(Point3::new(-2.0, -1.0, -1.0), Point3::new(2.0, 1.0, 1.0)),
        ];
        for a in &boxes {
            for b in &boxes {
                assert_eq!(
                    a.compare(b, DEFAULT_TOLERANCE),
                    b.compare(a, DEFAULT_TOLERANCE).flipped(),
                    "{a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn axis_order_by_extent() {
        let r = Range3::from_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 3.0, 2.0));
        assert_eq!(r.axis_order(), [Axis::Y, Axis::Z, Axis::X]);
        assert_eq!(r.longest_axis(), Axis::Y);
        assert_eq!(make_cube(0.0, 1.0).axis_order(), Axis::ALL);
        assert_eq!(r.axis_range(Axis::Z).bounds(), (0.0, 2.0));
    }

    #[test]
    fn range3_value_clamp_and_membership() {
        let r = make_cube(0.0, 1.0);
        assert_eq!(r.value(Vector3::new(0.0, 0.5, 1.0)), Point3::new(-1.0, 0.0, 1.0));
        assert_eq!(r.clamp(Point3::new(5.0, 0.5, -3.0)), Point3::new(1.0, 0.5, -1.0));
        assert!(r.contains_point(Point3::new(1.0, -1.0, 0.0), DEFAULT_TOLERANCE));
        assert!(!r.contains_point(Point3::new(1.1, 0.0, 0.0), DEFAULT_TOLERANCE));
    }

    #[test]
    fn comparison_display() {
        assert_eq!(OtherContains.to_string(), "other contains");
        assert_eq!(Axis::Z.to_string(), "Z");
    }
}
