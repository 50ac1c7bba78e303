//! Chaining of unordered segments into polylines.
//!
//! Intersection segments come out of the pair loop in no particular order
//! and with no particular orientation. Endpoints of neighbouring segments
//! agree only up to rounding, so they are matched by distance through a 3D
//! endpoint hash rather than by exact key.

use std::collections::HashMap;

use tinsect_math::{chain_tolerance, Point3};

use crate::intersect::Segment;

type EndpointKey = (i64, i64, i64);

/// An ordered run of points.
///
/// A polyline whose last point coincides with its first is closed; the
/// closing point is stored explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    /// Vertices in traversal order.
    pub points: Vec<Point3>,
}

impl Polyline {
    /// Create a polyline.
    pub fn new(points: Vec<Point3>) -> Self {
        Self { points }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if there are no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True if the first and last vertex coincide within `tolerance`.
    pub fn is_closed(&self, tolerance: f64) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(a), Some(b)) if self.points.len() > 2 => (a - b).norm() <= tolerance,
            _ => false,
        }
    }

    /// Total length.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}

/// A polyline produced by intersecting two named surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionPolyline {
    /// Id of the first surface of the pair.
    pub surface_a: String,
    /// Id of the second surface of the pair.
    pub surface_b: String,
    /// Vertices in traversal order.
    pub points: Vec<Point3>,
    /// Whether the chain closes on itself.
    pub closed: bool,
}

/// Chain segments using a tolerance derived from their average length.
pub fn chain_segments(segments: &[Segment]) -> Vec<Polyline> {
    if segments.is_empty() {
        return Vec::new();
    }
    let avg = segments.iter().map(Segment::length).sum::<f64>() / segments.len() as f64;
    chain_segments_with_tolerance(segments, chain_tolerance(avg))
}

/// Chain segments, joining endpoints closer than `tolerance`.
///
/// Each chain is seeded with the first unused segment, extended from its
/// tail and then from its head, always taking the nearest unused endpoint.
/// A tolerance of zero joins only exactly coincident endpoints.
pub fn chain_segments_with_tolerance(segments: &[Segment], tolerance: f64) -> Vec<Polyline> {
    let index = EndpointIndex::build(segments, tolerance);
    let mut used = vec![false; segments.len()];
    let mut polylines = Vec::new();

    for seed in 0..segments.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let Segment { p0, p1 } = segments[seed];

        let mut tail = vec![p0, p1];
        while let Some(next) = index.take_nearest(tail[tail.len() - 1], segments, &mut used) {
            tail.push(next);
        }

        let mut head = Vec::new();
        let mut front = p0;
        while let Some(next) = index.take_nearest(front, segments, &mut used) {
            head.push(next);
            front = next;
        }

        head.reverse();
        head.extend(tail);
        polylines.push(Polyline::new(head));
    }

    polylines
}

/// Remove segments that repeat an earlier one within `tolerance`, in
/// either orientation. Order of the survivors is preserved.
pub fn dedup_segments(segments: &[Segment], tolerance: f64) -> Vec<Segment> {
    let cell = cell_size(tolerance);
    let tol2 = tolerance * tolerance;
    let mut by_midpoint: HashMap<EndpointKey, Vec<usize>> = HashMap::new();
    let mut kept: Vec<Segment> = Vec::with_capacity(segments.len());

    for seg in segments {
        let mid = seg.p0 + (seg.p1 - seg.p0) * 0.5;
        let key = key_of(&mid, cell);
        let duplicate = neighbours(key).any(|k| {
            by_midpoint.get(&k).is_some_and(|bucket| {
                bucket.iter().any(|&i| {
                    let other = &kept[i];
                    let same = (other.p0 - seg.p0).norm_squared() <= tol2
                        && (other.p1 - seg.p1).norm_squared() <= tol2;
                    let flipped = (other.p0 - seg.p1).norm_squared() <= tol2
                        && (other.p1 - seg.p0).norm_squared() <= tol2;
                    same || flipped
                })
            })
        });
        if !duplicate {
            by_midpoint.entry(key).or_default().push(kept.len());
            kept.push(*seg);
        }
    }

    kept
}

/// Endpoint hash: cell size twice the tolerance so any match lies in the
/// 27-cell neighbourhood of the query point.
struct EndpointIndex {
    cell: f64,
    tol2: f64,
    cells: HashMap<EndpointKey, Vec<(usize, bool)>>,
}

impl EndpointIndex {
    fn build(segments: &[Segment], tolerance: f64) -> Self {
        let cell = cell_size(tolerance);
        let mut cells: HashMap<EndpointKey, Vec<(usize, bool)>> = HashMap::new();
        for (i, seg) in segments.iter().enumerate() {
            cells.entry(key_of(&seg.p0, cell)).or_default().push((i, false));
            cells.entry(key_of(&seg.p1, cell)).or_default().push((i, true));
        }
        Self {
            cell,
            tol2: tolerance.max(0.0) * tolerance.max(0.0),
            cells,
        }
    }

    /// Mark the unused segment with the endpoint nearest to `p` as used and
    /// return its opposite endpoint.
    fn take_nearest(&self, p: Point3, segments: &[Segment], used: &mut [bool]) -> Option<Point3> {
        let mut best: Option<(f64, usize, bool)> = None;
        for key in neighbours(key_of(&p, self.cell)) {
            let Some(bucket) = self.cells.get(&key) else {
                continue;
            };
            for &(i, at_end) in bucket {
                if used[i] {
                    continue;
                }
                let q = if at_end { segments[i].p1 } else { segments[i].p0 };
                let d2 = (q - p).norm_squared();
                if d2 <= self.tol2 && best.map_or(true, |(bd, _, _)| d2 < bd) {
                    best = Some((d2, i, at_end));
                }
            }
        }

        let (_, i, at_end) = best?;
        used[i] = true;
        Some(if at_end { segments[i].p0 } else { segments[i].p1 })
    }
}

fn cell_size(tolerance: f64) -> f64 {
    if tolerance.is_finite() && tolerance > 0.0 {
        2.0 * tolerance
    } else {
        1.0
    }
}

fn key_of(p: &Point3, cell: f64) -> EndpointKey {
    (
        (p.x / cell).floor() as i64,
        (p.y / cell).floor() as i64,
        (p.z / cell).floor() as i64,
    )
}

fn neighbours((x, y, z): EndpointKey) -> impl Iterator<Item = EndpointKey> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| (x + dx, y + dy, z + dz)))
    })
}
