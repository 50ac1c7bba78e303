//! Triangle splitting along another surface's plane.
//!
//! A triangle that straddles the plane of a crossing triangle is cut into
//! sub-triangles that each lie entirely on one side. The cut uses the
//! per-vertex signed distances from the crossing record, so no polyline
//! bookkeeping is needed.

use std::fmt;

use serde::{Deserialize, Serialize};
use tinsect_math::Point3;
use tinsect_surface::Triangle;

/// Position of a triangle relative to the other surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// On or above the other surface.
    Above,
    /// Below the other surface.
    Below,
    /// Not covered by the other surface in plan view.
    Outside,
}

impl Side {
    /// All sides, in group order.
    pub const ALL: [Side; 3] = [Side::Above, Side::Below, Side::Outside];

    /// Lowercase name used in group ids and labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Above => "above",
            Side::Below => "below",
            Side::Outside => "outside",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A triangle tagged with its side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideTriangle {
    /// The triangle.
    pub triangle: Triangle,
    /// Its side.
    pub side: Side,
}

impl SideTriangle {
    fn new(triangle: Triangle, side: Side) -> Self {
        Self { triangle, side }
    }
}

/// Split `tri` by the plane its vertices have `distances` to.
///
/// Distances within `eps` of zero count as on the plane. A triangle that
/// does not have vertices strictly on both sides comes back whole, tagged
/// [`Side::Above`] or [`Side::Below`] (on-plane counts as above). A
/// straddling triangle comes back as exactly three pieces with the
/// original winding: the lone vertex's corner, and the remaining quad cut
/// along one diagonal.
pub fn split_triangle(tri: &Triangle, distances: [f64; 3], eps: f64) -> Vec<SideTriangle> {
    let signs = distances.map(|d| {
        if d > eps {
            1i8
        } else if d < -eps {
            -1
        } else {
            0
        }
    });
    let positive = signs.iter().filter(|&&s| s > 0).count();
    let negative = signs.iter().filter(|&&s| s < 0).count();

    if negative == 0 {
        return vec![SideTriangle::new(*tri, Side::Above)];
    }
    if positive == 0 {
        return vec![SideTriangle::new(*tri, Side::Below)];
    }

    // The lone vertex is alone on its side; with one vertex on the plane,
    // the positive vertex is taken as lone and the on-plane vertex joins
    // the opposite side.
    let lone_sign: i8 = if negative == 1 && positive == 2 { -1 } else { 1 };
    let lone = signs.iter().position(|&s| s == lone_sign).unwrap_or(0);
    let a = (lone + 1) % 3;
    let b = (lone + 2) % 3;

    let v = tri.vertices();
    // An on-plane vertex is its own crossing; its raw distance may share the
    // lone vertex's sign, which would put the interpolated point off the edge.
    let cross = |other: usize| -> Point3 {
        if signs[other] == 0 {
            return v[other];
        }
        let t = (distances[lone] / (distances[lone] - distances[other])).clamp(0.0, 1.0);
        v[lone] + t * (v[other] - v[lone])
    };
    let cross_a = cross(a);
    let cross_b = cross(b);

    let (lone_side, rest_side) = if lone_sign > 0 {
        (Side::Above, Side::Below)
    } else {
        (Side::Below, Side::Above)
    };

    vec![
        SideTriangle::new(Triangle::new(v[lone], cross_a, cross_b), lone_side),
        SideTriangle::new(Triangle::new(cross_a, v[a], v[b]), rest_side),
        SideTriangle::new(Triangle::new(cross_a, v[b], cross_b), rest_side),
    ]
}
