//! Point deduplication and stride decimation.
//!
//! Near-duplicate points are merged through a hash whose cell size is the
//! tolerance itself, so any point within tolerance of a query lies in the
//! query's cell or one of its neighbours. [`dedup_points`] works in plan
//! (XY distance, 8 neighbours); [`weld_points`] is the 3D variant used to
//! weld mesh vertices (26 neighbours). The first point seen at a location
//! always wins.

use std::collections::HashMap;

use tinsect_math::Point3;

/// Result of [`dedup_points`] and [`weld_points`].
#[derive(Debug, Clone, PartialEq)]
pub struct DedupResult {
    /// The unique points, in first-seen order.
    pub points: Vec<Point3>,
    /// Number of unique points.
    pub unique_count: usize,
    /// For every input point, the index of the unique point it merged into.
    pub remap: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    Plan,
    Space,
}

type PointKey = (i64, i64, i64);

impl Metric {
    fn key(self, p: &Point3, cell: f64) -> PointKey {
        let z = match self {
            Metric::Plan => 0,
            Metric::Space => (p.z / cell).floor() as i64,
        };
        ((p.x / cell).floor() as i64, (p.y / cell).floor() as i64, z)
    }

    fn z_reach(self) -> i64 {
        match self {
            Metric::Plan => 0,
            Metric::Space => 1,
        }
    }

    fn distance_squared(self, a: &Point3, b: &Point3) -> f64 {
        let (dx, dy) = (a.x - b.x, a.y - b.y);
        match self {
            Metric::Plan => dx * dx + dy * dy,
            Metric::Space => (a - b).norm_squared(),
        }
    }
}

/// Merge points closer than `tolerance` in XY into the first one seen.
///
/// Elevation is ignored: points stacked at the same XY collapse to the
/// first. A non-positive or non-finite tolerance merges exact XY
/// duplicates only.
pub fn dedup_points(points: &[Point3], tolerance: f64) -> DedupResult {
    merge_within(points, tolerance, Metric::Plan)
}

/// Merge points closer than `tolerance` in 3D into the first one seen.
///
/// A non-positive or non-finite tolerance merges exact duplicates only.
pub fn weld_points(points: &[Point3], tolerance: f64) -> DedupResult {
    merge_within(points, tolerance, Metric::Space)
}

fn merge_within(points: &[Point3], tolerance: f64, metric: Metric) -> DedupResult {
    let usable = tolerance.is_finite() && tolerance > 0.0;
    let cell = if usable { tolerance } else { 1.0 };
    let tol2 = if usable { tolerance * tolerance } else { 0.0 };
    let reach = metric.z_reach();

    let mut cells: HashMap<PointKey, Vec<usize>> = HashMap::new();
    let mut unique: Vec<Point3> = Vec::new();
    let mut remap = Vec::with_capacity(points.len());

    for p in points {
        let (gx, gy, gz) = metric.key(p, cell);
        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -reach..=reach {
                    let Some(bucket) = cells.get(&(gx + dx, gy + dy, gz + dz)) else {
                        continue;
                    };
                    for &u in bucket {
                        if metric.distance_squared(&unique[u], p) <= tol2 {
                            found = Some(u);
                            break 'search;
                        }
                    }
                }
            }
        }

        let idx = match found {
            Some(u) => u,
            None => {
                let u = unique.len();
                unique.push(*p);
                cells.entry((gx, gy, gz)).or_default().push(u);
                u
            }
        };
        remap.push(idx);
    }

    DedupResult {
        unique_count: unique.len(),
        points: unique,
        remap,
    }
}

/// Evenly sample at most `max_count` points, keeping the first.
///
/// Points are picked by index stride; nothing is interpolated. A
/// `max_count` of zero, or an input already within the limit, is returned
/// unchanged.
pub fn decimate_stride(points: &[Point3], max_count: usize) -> Vec<Point3> {
    if max_count == 0 || points.len() <= max_count {
        return points.to_vec();
    }
    let stride = points.len() as f64 / max_count as f64;
    (0..max_count)
        .map(|k| points[((k as f64 * stride) as usize).min(points.len() - 1)])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_collapses_to_first() {
        let first = Point3::new(10.0, 20.0, 5.0);
        let mut pts = vec![first];
        for i in 1..10 {
            let o = i as f64 * 1e-4;
            pts.push(Point3::new(10.0 + o, 20.0 - o, 5.0 + o));
        }
        let r = dedup_points(&pts, 0.01);
        assert_eq!(r.unique_count, 1);
        assert_eq!(r.points, vec![first]);
        assert!(r.remap.iter().all(|&i| i == 0));
    }

    #[test]
    fn test_across_cell_boundary() {
        // Straddles the x = 1.0 cell edge for tolerance 0.5
        let pts = vec![Point3::new(0.99, 0.0, 0.0), Point3::new(1.01, 0.0, 0.0)];
        let r = dedup_points(&pts, 0.5);
        assert_eq!(r.unique_count, 1);
        assert_eq!(r.points[0], pts[0]);
    }

    #[test]
    fn test_z_separation_is_ignored_in_plan() {
        // Same XY, far apart in Z
        let pts = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 5.0)];
        let r = dedup_points(&pts, 0.1);
        assert_eq!(r.unique_count, 1);
        assert_eq!(r.points, vec![pts[0]]);
        assert_eq!(r.remap, vec![0, 0]);
    }

    #[test]
    fn test_weld_keeps_z_separated() {
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 5.0 + 1e-4),
            Point3::new(1e-4, 0.0, 0.0),
        ];
        let r = weld_points(&pts, 0.01);
        assert_eq!(r.unique_count, 2);
        assert_eq!(r.remap, vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_weld_across_z_cell_boundary() {
        let pts = vec![Point3::new(0.0, 0.0, 0.99), Point3::new(0.0, 0.0, 1.01)];
        assert_eq!(weld_points(&pts, 0.5).unique_count, 1);
    }

    #[test]
    fn test_remap_interleaved() {
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(0.001, 0.0, 0.0),
            Point3::new(5.0, 0.001, 0.0),
            Point3::new(9.0, 9.0, 9.0),
        ];
        let r = dedup_points(&pts, 0.01);
        assert_eq!(r.unique_count, 3);
        assert_eq!(r.remap, vec![0, 1, 0, 1, 2]);
    }

    #[test]
    fn test_zero_tolerance_merges_exact_only() {
        let pts = vec![
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0 + 1e-12, 1.0, 1.0),
        ];
        assert_eq!(dedup_points(&pts, 0.0).unique_count, 2);
        assert_eq!(weld_points(&pts, -1.0).unique_count, 2);
    }

    #[test]
    fn test_stride_decimation() {
        let pts: Vec<Point3> = (0..10).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        let out = decimate_stride(&pts, 5);
        let xs: Vec<f64> = out.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0, 6.0, 8.0]);

        assert_eq!(decimate_stride(&pts, 0), pts);
        assert_eq!(decimate_stride(&pts, 20), pts);
    }
}
