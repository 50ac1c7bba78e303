//! Intersection of coplanar, overlapping triangles.
//!
//! The interval method rejects coplanar pairs: their planes share no single
//! line. Where two surfaces lie flush over a region, the meaningful
//! intersection is the outline of that region, i.e. the parts of each
//! surface's outer boundary that run over the other surface. Each boundary
//! edge of one triangle is clipped against the other triangle in a 2D
//! projection, and the surviving piece becomes a segment. Interior edges
//! (shared by two triangles of the same surface) never contribute.

use std::collections::HashMap;

use tinsect_math::{Point2, Point3, Tolerance};
use tinsect_surface::Triangle;

use crate::intersect::{dominant_axis, signed_distances, upward, Segment};

/// Quantum used to match edge endpoints, and the shortest boundary piece
/// kept, in multiples of the linear tolerance.
const EDGE_QUANTUM_FACTOR: f64 = 1e3;

type VertexKey = (i64, i64, i64);

/// Per-triangle flags marking which edges lie on the surface boundary.
///
/// `mask[t][e]` is true when edge `e` of triangle `t` (in the order of
/// [`Triangle::edges`]) is used by exactly one triangle of the surface.
pub fn boundary_edge_mask(triangles: &[Triangle], tol: &Tolerance) -> Vec<[bool; 3]> {
    let quantum = tol.linear * EDGE_QUANTUM_FACTOR;
    let key = |p: &Point3| -> VertexKey {
        (
            (p.x / quantum).round() as i64,
            (p.y / quantum).round() as i64,
            (p.z / quantum).round() as i64,
        )
    };
    let edge_key = |a: &Point3, b: &Point3| {
        let (ka, kb) = (key(a), key(b));
        if ka <= kb {
            (ka, kb)
        } else {
            (kb, ka)
        }
    };

    let mut uses: HashMap<(VertexKey, VertexKey), u32> = HashMap::new();
    for tri in triangles {
        for (a, b) in tri.edges() {
            *uses.entry(edge_key(&a, &b)).or_insert(0) += 1;
        }
    }

    triangles
        .iter()
        .map(|tri| {
            let edges = tri.edges();
            let mut mask = [false; 3];
            for (e, (a, b)) in edges.iter().enumerate() {
                mask[e] = uses.get(&edge_key(a, b)).copied() == Some(1);
            }
            mask
        })
        .collect()
}

/// True if `a` and `b` lie in the same plane within tolerance.
pub fn are_coplanar(a: &Triangle, b: &Triangle, tol: &Tolerance) -> bool {
    if a.is_degenerate(tol.degenerate) || b.is_degenerate(tol.degenerate) {
        return false;
    }
    let na = upward(a.normal(tol.degenerate));
    let nb = upward(b.normal(tol.degenerate));
    if na.dot(&nb).abs() <= tol.parallel_cos {
        return false;
    }
    signed_distances(&a.vertices(), &nb, &b.v0)
        .iter()
        .all(|d| d.abs() <= tol.linear)
}

/// Boundary pieces of two coplanar triangles that run over each other.
///
/// `mask_a`/`mask_b` select which edges of `a`/`b` are surface boundary
/// edges. Returns nothing when the triangles are not coplanar.
pub fn coplanar_segments(
    a: &Triangle,
    mask_a: &[bool; 3],
    b: &Triangle,
    mask_b: &[bool; 3],
    tol: &Tolerance,
) -> Vec<Segment> {
    if !mask_a.iter().chain(mask_b.iter()).any(|&m| m) {
        return Vec::new();
    }
    let mut box_a = a.aabb();
    box_a.expand(tol.linear);
    if !box_a.overlaps(&b.aabb()) || !are_coplanar(a, b, tol) {
        return Vec::new();
    }

    // Drop the dominant axis of the normal for a well-conditioned projection.
    let drop = dominant_axis(&a.normal(tol.degenerate));
    let project = |p: &Point3| -> Point2 {
        match drop {
            0 => Point2::new(p.y, p.z),
            1 => Point2::new(p.z, p.x),
            _ => Point2::new(p.x, p.y),
        }
    };

    let mut out = Vec::new();
    clip_edges(a, mask_a, b, &project, tol, &mut out);
    clip_edges(b, mask_b, a, &project, tol, &mut out);
    out
}

fn clip_edges(
    from: &Triangle,
    mask: &[bool; 3],
    against: &Triangle,
    project: &impl Fn(&Point3) -> Point2,
    tol: &Tolerance,
    out: &mut Vec<Segment>,
) {
    let clip_tri = against.vertices().map(|p| project(&p));
    // Clipping slack lets collinear edges through, but also leaves slivers
    // where an edge only grazes a corner
    let min_piece = tol.linear * EDGE_QUANTUM_FACTOR;
    for (e, (p0, p1)) in from.edges().iter().enumerate() {
        if !mask[e] {
            continue;
        }
        let len = (p1 - p0).norm();
        if let Some((t0, t1)) = clip_segment_2d(&project(p0), &project(p1), &clip_tri, tol.linear) {
            if (t1 - t0) * len > min_piece {
                out.push(Segment::new(p0 + t0 * (p1 - p0), p0 + t1 * (p1 - p0)));
            }
        }
    }
}

/// Parameter range of `p0 + t (p1 - p0)`, `t ∈ [0, 1]`, inside the closed
/// triangle `tri` (Cyrus-Beck). `eps` is a distance slack on each edge.
fn clip_segment_2d(p0: &Point2, p1: &Point2, tri: &[Point2; 3], eps: f64) -> Option<(f64, f64)> {
    let area2 = cross(&(tri[1] - tri[0]), &(tri[2] - tri[0]));
    if area2 == 0.0 {
        return None;
    }
    // Inside is the left of each edge for counter-clockwise triangles.
    let orient = area2.signum();
    let d = p1 - p0;

    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for i in 0..3 {
        let a = tri[i];
        let b = tri[(i + 1) % 3];
        let e = b - a;
        let elen = e.norm();
        // f(t) = orient * cross(e, p(t) - a) + eps * |e| >= 0
        let f0 = orient * cross(&e, &(p0 - a)) + eps * elen;
        let df = orient * cross(&e, &d);
        if df == 0.0 {
            if f0 < 0.0 {
                return None;
            }
            continue;
        }
        let t = -f0 / df;
        if df > 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

fn cross(a: &tinsect_math::Vec2, b: &tinsect_math::Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn square(x0: f64, z: f64) -> Vec<Triangle> {
        vec![
            Triangle::new(p(x0, 0.0, z), p(x0 + 1.0, 0.0, z), p(x0 + 1.0, 1.0, z)),
            Triangle::new(p(x0, 0.0, z), p(x0 + 1.0, 1.0, z), p(x0, 1.0, z)),
        ]
    }

    #[test]
    fn test_boundary_mask_excludes_diagonal() {
        let sq = square(0.0, 0.0);
        let mask = boundary_edge_mask(&sq, &Tolerance::DEFAULT);
        // First triangle: bottom, right are boundary; diagonal is shared
        assert_eq!(mask[0], [true, true, false]);
        // Second triangle: diagonal shared; top, left are boundary
        assert_eq!(mask[1], [false, true, true]);
    }

    #[test]
    fn test_coplanar_detection() {
        let tol = Tolerance::DEFAULT;
        let a = square(0.0, 2.0);
        let b = square(0.5, 2.0);
        let c = square(0.5, 2.5);
        assert!(are_coplanar(&a[0], &b[0], &tol));
        assert!(!are_coplanar(&a[0], &c[0], &tol));
    }

    #[test]
    fn test_offset_squares_pieces() {
        let tol = Tolerance::DEFAULT;
        let a = square(0.0, 0.0);
        let b = square(0.5, 0.0);
        let ma = boundary_edge_mask(&a, &tol);
        let mb = boundary_edge_mask(&b, &tol);

        let mut segs = Vec::new();
        for (i, ta) in a.iter().enumerate() {
            for (j, tb) in b.iter().enumerate() {
                segs.extend(coplanar_segments(ta, &ma[i], tb, &mb[j], &tol));
            }
        }
        assert!(!segs.is_empty());
        for s in &segs {
            for q in [s.p0, s.p1] {
                assert_eq!(q.z, 0.0);
                let on_x = (q.x - 0.5).abs() < 1e-6 || (q.x - 1.0).abs() < 1e-6;
                let on_y = q.y.abs() < 1e-6 || (q.y - 1.0).abs() < 1e-6;
                assert!(on_x || on_y, "{:?} is not on the overlap outline", q);
                assert!(q.x > 0.5 - 1e-6 && q.x < 1.0 + 1e-6);
            }
        }
        let total: f64 = segs.iter().map(Segment::length).sum();
        // Outline 0.5 + 1 + 0.5 + 1, with the top and bottom runs found
        // from both surfaces
        assert_eq!(segs.len(), 8);
        assert!((total - 4.0).abs() < 1e-6, "total {}", total);
    }

    #[test]
    fn test_disjoint_coplanar_gives_nothing() {
        let tol = Tolerance::DEFAULT;
        let a = square(0.0, 0.0);
        let b = square(3.0, 0.0);
        let segs = coplanar_segments(&a[0], &[true; 3], &b[0], &[true; 3], &tol);
        assert!(segs.is_empty());
    }

    #[test]
    fn test_clip_segment_inside_and_outside() {
        let tri = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        ];
        let (t0, t1) =
            clip_segment_2d(&Point2::new(-1.0, 0.5), &Point2::new(3.0, 0.5), &tri, 0.0).unwrap();
        assert!((t0 - 0.25).abs() < 1e-12);
        assert!((t1 - 0.625).abs() < 1e-12);
        assert!(clip_segment_2d(&Point2::new(5.0, 5.0), &Point2::new(6.0, 5.0), &tri, 0.0).is_none());
    }
}
