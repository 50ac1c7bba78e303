//! Per-pair candidate scan.
//!
//! For one pair of surfaces, with the second one already gridded:
//! 1. **Query** candidates for every triangle of the first surface
//! 2. **Intersect** each candidate pair, keeping segments and the
//!    crossing record with the largest overlap per triangle
//!
//! With the `parallel` feature the per-triangle loop runs on rayon. Results
//! are collected in input order and folded sequentially, so the output does
//! not depend on the feature.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tinsect_math::Tolerance;
use tinsect_surface::Triangle;

use crate::coplanar::{boundary_edge_mask, coplanar_segments};
use crate::grid::TriangleGrid;
use crate::intersect::{tri_tri_crossing, TaggedSegment};

/// Counters describing one pair scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ScanStats {
    /// Candidate pairs returned by the grid.
    pub candidates: usize,
    /// Pairs that produced a crossing.
    pub crossings: usize,
    /// Segments produced by coplanar overlap.
    pub coplanar: usize,
    /// Degenerate triangles of the first surface, skipped.
    pub degenerate: usize,
}

/// Output of [`scan_pair`].
#[derive(Debug, Clone, Default)]
pub(crate) struct PairScan {
    /// Every intersection segment, in `(idx_a, idx_b)` order.
    pub segments: Vec<TaggedSegment>,
    /// Per triangle of the first surface: distances of its vertices to the
    /// plane of its strongest crossing.
    pub best_a: Vec<Option<[f64; 3]>>,
    /// Same for the second surface.
    pub best_b: Vec<Option<[f64; 3]>>,
    /// Counters.
    pub stats: ScanStats,
}

/// What one triangle of the first surface found.
#[derive(Default)]
struct TriangleHits {
    segments: Vec<TaggedSegment>,
    best: Option<(f64, [f64; 3])>,
    /// `(idx_b, overlap, distances of b's vertices)`
    others: Vec<(usize, f64, [f64; 3])>,
    candidates: usize,
    coplanar: usize,
    degenerate: bool,
}

/// Scan every triangle of `a` against `b`, indexed by `grid`.
///
/// With `with_coplanar`, coplanar overlaps contribute boundary segments as
/// well (see [`crate::coplanar`]).
pub(crate) fn scan_pair(
    a: &[Triangle],
    b: &[Triangle],
    grid: &TriangleGrid,
    tol: &Tolerance,
    with_coplanar: bool,
) -> PairScan {
    let masks = with_coplanar.then(|| (boundary_edge_mask(a, tol), boundary_edge_mask(b, tol)));
    let masks = masks.as_ref().map(|(ma, mb)| (ma.as_slice(), mb.as_slice()));

    #[cfg(feature = "parallel")]
    let hits: Vec<TriangleHits> = a
        .par_iter()
        .enumerate()
        .map(|(i, tri)| scan_triangle(i, tri, b, grid, masks, tol))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let hits: Vec<TriangleHits> = a
        .iter()
        .enumerate()
        .map(|(i, tri)| scan_triangle(i, tri, b, grid, masks, tol))
        .collect();

    let mut scan = PairScan {
        segments: Vec::new(),
        best_a: Vec::with_capacity(a.len()),
        best_b: vec![None; b.len()],
        stats: ScanStats::default(),
    };
    let mut best_b_overlap = vec![f64::NEG_INFINITY; b.len()];

    for hit in hits {
        scan.stats.candidates += hit.candidates;
        scan.stats.coplanar += hit.coplanar;
        scan.stats.degenerate += usize::from(hit.degenerate);
        scan.stats.crossings += hit.others.len();
        scan.segments.extend(hit.segments);
        scan.best_a.push(hit.best.map(|(_, d)| d));
        for (j, overlap, dist) in hit.others {
            if overlap > best_b_overlap[j] {
                best_b_overlap[j] = overlap;
                scan.best_b[j] = Some(dist);
            }
        }
    }

    tracing::debug!(
        triangles_a = a.len(),
        triangles_b = b.len(),
        cell_size = grid.cell_size(),
        cells = grid.occupied_cells(),
        candidates = scan.stats.candidates,
        crossings = scan.stats.crossings,
        coplanar = scan.stats.coplanar,
        degenerate = scan.stats.degenerate,
        segments = scan.segments.len(),
        "pair scan"
    );

    scan
}

fn scan_triangle(
    i: usize,
    tri: &Triangle,
    b: &[Triangle],
    grid: &TriangleGrid,
    masks: Option<(&[[bool; 3]], &[[bool; 3]])>,
    tol: &Tolerance,
) -> TriangleHits {
    let mut hits = TriangleHits::default();
    if tri.is_degenerate(tol.degenerate) {
        hits.degenerate = true;
        return hits;
    }

    let mut query = tri.aabb();
    query.expand(tol.linear);
    let candidates = grid.query(&query);
    hits.candidates = candidates.len();

    for j in candidates {
        let other = &b[j];
        if let Some(crossing) = tri_tri_crossing(tri, other, tol) {
            let record = crossing.record;
            hits.segments.push(TaggedSegment {
                segment: crossing.segment,
                idx_a: i,
                idx_b: j,
            });
            if hits.best.map_or(true, |(o, _)| record.overlap > o) {
                hits.best = Some((record.overlap, record.dist_a));
            }
            hits.others.push((j, record.overlap, record.dist_b));
        } else if let Some((mask_a, mask_b)) = masks {
            for segment in coplanar_segments(tri, &mask_a[i], other, &mask_b[j], tol) {
                hits.coplanar += 1;
                hits.segments.push(TaggedSegment {
                    segment,
                    idx_a: i,
                    idx_b: j,
                });
            }
        }
    }

    hits
}
