//! Triangle-triangle intersection (Möller interval method).
//!
//! Two non-coplanar triangles intersect along a segment of the line shared
//! by their planes. Each triangle covers one interval of that line; the
//! overlap of the two intervals is the intersection segment.
//!
//! The same computation yields two payloads: the 3D [`Segment`] used for
//! polyline output, and a [`CrossingRecord`] of per-vertex signed distances
//! used by the splitter.

use tinsect_math::{Point3, Tolerance, Vec3};
use tinsect_surface::Triangle;

/// A 3D line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point.
    pub p0: Point3,
    /// End point.
    pub p1: Point3,
}

impl Segment {
    /// Create a segment.
    pub fn new(p0: Point3, p1: Point3) -> Self {
        Self { p0, p1 }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        (self.p1 - self.p0).norm()
    }

    /// The same segment traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self::new(self.p1, self.p0)
    }
}

/// A segment tagged with the indices of the two triangles that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedSegment {
    /// The intersection segment.
    pub segment: Segment,
    /// Index of the triangle in the first surface.
    pub idx_a: usize,
    /// Index of the triangle in the second surface.
    pub idx_b: usize,
}

/// Signed distances of two crossing triangles to each other's planes.
///
/// Distances are oriented so that a positive value lies on the side the
/// upward (`+Z`) normal of the other triangle points to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingRecord {
    /// Distances of the first triangle's vertices to the second's plane.
    pub dist_a: [f64; 3],
    /// Distances of the second triangle's vertices to the first's plane.
    pub dist_b: [f64; 3],
    /// Length of the shared interval on the intersection line.
    pub overlap: f64,
}

/// Full result of a crossing: both payloads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// The intersection segment.
    pub segment: Segment,
    /// The signed-distance record.
    pub record: CrossingRecord,
}

/// Intersection segment of two triangles, if they cross.
pub fn tri_tri_intersection(a: &Triangle, b: &Triangle, tol: &Tolerance) -> Option<Segment> {
    tri_tri_crossing(a, b, tol).map(|c| c.segment)
}

/// Signed-distance record of two triangles, if they cross.
pub fn tri_tri_signed_distances(
    a: &Triangle,
    b: &Triangle,
    tol: &Tolerance,
) -> Option<CrossingRecord> {
    tri_tri_crossing(a, b, tol).map(|c| c.record)
}

/// Intersect two triangles, returning the segment and the signed-distance
/// record.
///
/// Returns `None` for disjoint boxes, separated triangles, (near) parallel
/// or coplanar planes, degenerate triangles and sub-epsilon overlaps.
pub fn tri_tri_crossing(a: &Triangle, b: &Triangle, tol: &Tolerance) -> Option<Crossing> {
    let mut box_a = a.aabb();
    box_a.expand(tol.linear);
    if !box_a.overlaps(&b.aabb()) {
        return None;
    }
    if a.is_degenerate(tol.degenerate) || b.is_degenerate(tol.degenerate) {
        return None;
    }

    let va = a.vertices();
    let vb = b.vertices();

    // A against plane(B)
    let nb = upward(b.normal(tol.degenerate));
    let dist_a = signed_distances(&va, &nb, &b.v0);
    if same_side(&dist_a, tol) {
        return None;
    }

    // B against plane(A)
    let na = upward(a.normal(tol.degenerate));
    let dist_b = signed_distances(&vb, &na, &a.v0);
    if same_side(&dist_b, tol) {
        return None;
    }

    if na.dot(&nb).abs() > tol.parallel_cos {
        return None;
    }

    let dir = na.cross(&nb).normalize();
    let origin = line_point(&na, &nb, &a.v0, &b.v0, &dir)?;

    let (a_lo, a_hi) = interval_on_line(&va, &dist_a, &origin, &dir, tol)?;
    let (b_lo, b_hi) = interval_on_line(&vb, &dist_b, &origin, &dir, tol)?;

    let lo = a_lo.max(b_lo);
    let hi = a_hi.min(b_hi);
    let overlap = hi - lo;
    if overlap.is_nan() || overlap <= tol.interval {
        return None;
    }

    Some(Crossing {
        segment: Segment::new(origin + lo * dir, origin + hi * dir),
        record: CrossingRecord {
            dist_a,
            dist_b,
            overlap,
        },
    })
}

/// Flip a unit normal so its Z component is non-negative.
pub(crate) fn upward(n: Vec3) -> Vec3 {
    if n.z < 0.0 {
        -n
    } else {
        n
    }
}

/// Signed distances of `points` to the plane through `origin` with unit
/// normal `n`.
pub(crate) fn signed_distances(points: &[Point3; 3], n: &Vec3, origin: &Point3) -> [f64; 3] {
    [
        n.dot(&(points[0] - origin)),
        n.dot(&(points[1] - origin)),
        n.dot(&(points[2] - origin)),
    ]
}

/// True if all three distances are strictly on the same side.
fn same_side(d: &[f64; 3], tol: &Tolerance) -> bool {
    let s = [tol.sign(d[0]), tol.sign(d[1]), tol.sign(d[2])];
    s[0] != 0 && s[0] == s[1] && s[1] == s[2]
}

/// A point on the line shared by both planes.
///
/// Works in coordinates relative to `a0` so that large absolute magnitudes
/// do not enter the solve. The coordinate along the dominant axis of `dir`
/// is set to zero and the remaining 2×2 system is solved by Cramer's rule;
/// its determinant is that dominant component, so it is never the smallest
/// one available.
fn line_point(na: &Vec3, nb: &Vec3, a0: &Point3, b0: &Point3, dir: &Vec3) -> Option<Point3> {
    let k = dominant_axis(dir);
    let (i, j) = match k {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    };

    // na · q = 0, nb · q = nb · (b0 - a0)
    let rhs_b = nb.dot(&(b0 - a0));
    let det = na[i] * nb[j] - na[j] * nb[i];
    if det.abs() < f64::EPSILON {
        return None;
    }

    let mut q = Vec3::zeros();
    q[i] = -na[j] * rhs_b / det;
    q[j] = na[i] * rhs_b / det;
    Some(a0 + q)
}

/// Index of the component with the largest magnitude.
pub(crate) fn dominant_axis(v: &Vec3) -> usize {
    let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());
    if ax >= ay && ax >= az {
        0
    } else if ay >= az {
        1
    } else {
        2
    }
}

/// Parameter interval `[min, max]` covered by a triangle on the line
/// `origin + t * dir`.
///
/// Collects the points where the triangle's edges cross the other plane
/// (plus vertices lying on it) and projects them onto the line relative to
/// `origin`.
fn interval_on_line(
    verts: &[Point3; 3],
    dist: &[f64; 3],
    origin: &Point3,
    dir: &Vec3,
    tol: &Tolerance,
) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    let mut push = |p: Point3| {
        let t = dir.dot(&(p - origin));
        lo = lo.min(t);
        hi = hi.max(t);
    };

    for i in 0..3 {
        let j = (i + 1) % 3;
        let (si, sj) = (tol.sign(dist[i]), tol.sign(dist[j]));
        if si == 0 {
            push(verts[i]);
        }
        if si * sj < 0 {
            let t = dist[i] / (dist[i] - dist[j]);
            push(verts[i] + t * (verts[j] - verts[i]));
        }
    }

    if lo <= hi {
        Some((lo, hi))
    } else {
        None
    }
}
