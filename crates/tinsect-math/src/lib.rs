#![warn(missing_docs)]

//! Math types for the tinsect surface engine.
//!
//! Thin wrappers around nalgebra providing the point and vector types used
//! by every other crate, plus the tolerance set that all geometric
//! predicates share.

use nalgebra::{Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A point in a 2D projection plane.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Fraction of the average segment length used as the chaining tolerance.
pub const CHAIN_FRACTION: f64 = 0.01;

/// Lower bound of the chaining tolerance (1 mm for meter-scale input).
pub const MIN_CHAIN_TOLERANCE: f64 = 1e-3;

/// Number of ulps of headroom granted to coordinates of large magnitude.
const MAGNITUDE_ULPS: f64 = 64.0;

/// Tolerance constants for geometric comparisons.
///
/// The linear quantities are expressed in input units (meters for survey
/// data). They are never smaller than the base constants, and grow with the
/// coordinate magnitude of the input so that UTM-sized coordinates do not
/// fall below the resolution of an `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Signed-distance threshold below which a vertex counts as on-plane.
    pub linear: f64,
    /// Minimum overlap length for an intersection interval to count.
    pub interval: f64,
    /// Minimum length of an unnormalized cross product before a triangle
    /// is treated as degenerate.
    pub degenerate: f64,
    /// Cosine above which two plane normals are treated as parallel.
    pub parallel_cos: f64,
}

impl Tolerance {
    /// Base tolerances for coordinates of unit magnitude.
    pub const DEFAULT: Self = Self {
        linear: 1e-8,
        interval: 1e-10,
        degenerate: 1e-12,
        parallel_cos: 0.9999,
    };

    /// Tolerances scaled for input whose largest absolute coordinate is
    /// `magnitude`.
    pub fn for_magnitude(magnitude: f64) -> Self {
        let base = Self::DEFAULT;
        if !magnitude.is_finite() {
            return base;
        }
        let floor = magnitude.abs() * f64::EPSILON * MAGNITUDE_ULPS;
        Self {
            linear: base.linear.max(floor),
            interval: base.interval.max(floor),
            ..base
        }
    }

    /// Check if two points are coincident within the linear tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a signed distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Classify a signed distance as -1, 0 or +1.
    pub fn sign(&self, d: f64) -> i8 {
        if d > self.linear {
            1
        } else if d < -self.linear {
            -1
        } else {
            0
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Chaining tolerance for segments of the given average length.
///
/// Large enough to absorb drift between independently computed endpoints,
/// small enough not to bridge unrelated crossings.
pub fn chain_tolerance(average_segment_length: f64) -> f64 {
    (average_segment_length * CHAIN_FRACTION).max(MIN_CHAIN_TOLERANCE)
}
