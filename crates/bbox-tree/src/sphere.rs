use nalgebra::{Point3, Vector3};

use crate::range::Range3;
use crate::tolerance;

/// A sphere given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere3D {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl Default for Sphere3D {
    /// Unit sphere at the origin.
    fn default() -> Self {
        Self::new(Point3::origin(), 1.0)
    }
}

impl Sphere3D {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Checks whether `p` lies inside the sphere or on its surface.
    pub fn contains_point(&self, p: Point3<f64>, tolerance: f64) -> bool {
        tolerance::lt_or_eq((p - self.center).norm(), self.radius, tolerance)
    }

    /// Axis-aligned bounds of the sphere.
    pub fn bounds(&self) -> Range3 {
        let r = Vector3::repeat(self.radius);
        Range3::from_bounds(self.center - r, self.center + r)
    }
}
