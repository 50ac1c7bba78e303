//! Axis-aligned bounding boxes.
//!
//! Used as a broadphase filter: only surface pairs and triangle pairs with
//! overlapping boxes reach the exact intersection tests.

use tinsect_math::Point3;

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Smallest AABB containing all `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(p);
        }
        aabb
    }

    /// True until at least one point has been included.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand this AABB to include another one.
    pub fn include_aabb(&mut self, other: &Aabb3) {
        if other.is_empty() {
            return;
        }
        self.include_point(&other.min);
        self.include_point(&other.max);
    }

    /// Test if two AABBs overlap (touching counts as overlap).
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        self.overlaps_xy(other) && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Test if the XY footprints of two AABBs overlap.
    pub fn overlaps_xy(&self, other: &Aabb3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Expand the AABB by a tolerance in all directions.
    pub fn expand(&mut self, tol: f64) {
        self.min.x -= tol;
        self.min.y -= tol;
        self.min.z -= tol;
        self.max.x += tol;
        self.max.y += tol;
        self.max.z += tol;
    }

    /// Largest absolute coordinate value inside the box.
    pub fn max_abs_coordinate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ]
        .iter()
        .fold(0.0f64, |acc, v| acc.max(v.abs()))
    }
}
