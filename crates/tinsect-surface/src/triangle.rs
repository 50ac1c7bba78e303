//! The canonical triangle value type.

use tinsect_math::{Point3, Vec3};

use crate::bbox::Aabb3;

/// A triangle in world coordinates.
///
/// Winding order carries no meaning for the intersection math, but it
/// decides the sign of [`Triangle::normal`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex.
    pub v0: Point3,
    /// Second vertex.
    pub v1: Point3,
    /// Third vertex.
    pub v2: Point3,
}

impl Triangle {
    /// Create a triangle from three vertices.
    pub fn new(v0: Point3, v1: Point3, v2: Point3) -> Self {
        Self { v0, v1, v2 }
    }

    /// The vertices as an array, in winding order.
    pub fn vertices(&self) -> [Point3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// The three edges as `(start, end)` pairs: v0→v1, v1→v2, v2→v0.
    pub fn edges(&self) -> [(Point3, Point3); 3] {
        [(self.v0, self.v1), (self.v1, self.v2), (self.v2, self.v0)]
    }

    /// Unnormalized normal `(v1 - v0) × (v2 - v0)`.
    pub fn raw_normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Unit normal, or `+Z` when the triangle is degenerate.
    ///
    /// `degenerate` is the minimum length of the raw normal. The fallback
    /// normal keeps callers total; their sign tests reject such triangles.
    pub fn normal(&self, degenerate: f64) -> Vec3 {
        let n = self.raw_normal();
        let len = n.norm();
        if len < degenerate {
            Vec3::z()
        } else {
            n / len
        }
    }

    /// True if the raw normal is shorter than `degenerate`.
    pub fn is_degenerate(&self, degenerate: f64) -> bool {
        self.raw_normal().norm() < degenerate
    }

    /// Area in 3D.
    pub fn area(&self) -> f64 {
        0.5 * self.raw_normal().norm()
    }

    /// Area of the XY projection (footprint).
    pub fn area_xy(&self) -> f64 {
        0.5 * self.signed_area_xy2().abs()
    }

    /// Twice the signed XY area; positive for counter-clockwise footprints.
    fn signed_area_xy2(&self) -> f64 {
        (self.v1.x - self.v0.x) * (self.v2.y - self.v0.y)
            - (self.v2.x - self.v0.x) * (self.v1.y - self.v0.y)
    }

    /// Centroid.
    pub fn centroid(&self) -> Point3 {
        Point3::new(
            (self.v0.x + self.v1.x + self.v2.x) / 3.0,
            (self.v0.y + self.v1.y + self.v2.y) / 3.0,
            (self.v0.z + self.v1.z + self.v2.z) / 3.0,
        )
    }

    /// Bounding box.
    pub fn aabb(&self) -> Aabb3 {
        Aabb3::from_points(&[self.v0, self.v1, self.v2])
    }

    /// Lengths of the three edges.
    pub fn edge_lengths(&self) -> [f64; 3] {
        [
            (self.v1 - self.v0).norm(),
            (self.v2 - self.v1).norm(),
            (self.v0 - self.v2).norm(),
        ]
    }

    /// Barycentric weights of `(x, y)` with respect to the XY footprint.
    ///
    /// Returns `None` for footprints with (near) zero area, i.e. vertical
    /// or degenerate triangles.
    pub fn barycentric_xy(&self, x: f64, y: f64) -> Option<[f64; 3]> {
        let det = self.signed_area_xy2();
        if det.abs() < 1e-18 {
            return None;
        }
        let w1 = ((x - self.v0.x) * (self.v2.y - self.v0.y)
            - (self.v2.x - self.v0.x) * (y - self.v0.y))
            / det;
        let w2 = ((self.v1.x - self.v0.x) * (y - self.v0.y)
            - (x - self.v0.x) * (self.v1.y - self.v0.y))
            / det;
        Some([1.0 - w1 - w2, w1, w2])
    }

    /// Z of the triangle's plane at `(x, y)` if the point lies inside the
    /// XY footprint (boundary included, within `eps` in barycentric units).
    pub fn z_at_xy(&self, x: f64, y: f64, eps: f64) -> Option<f64> {
        let w = self.barycentric_xy(x, y)?;
        if w.iter().any(|&wi| wi < -eps) {
            return None;
        }
        Some(w[0] * self.v0.z + w[1] * self.v1.z + w[2] * self.v2.z)
    }

    /// The same triangle with reversed winding.
    pub fn flipped(&self) -> Self {
        Self::new(self.v0, self.v2, self.v1)
    }
}
