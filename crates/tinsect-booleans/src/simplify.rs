//! Arc-length decimation of polylines.

use tinsect_math::Point3;

/// Thin a polyline so that kept vertices are roughly `spacing` apart along
/// its length.
///
/// A vertex is emitted once the length accumulated since the previous kept
/// vertex reaches `spacing`. The first and last vertices are always kept.
/// A non-positive or non-finite spacing returns the input unchanged.
pub fn decimate_by_arc_length(points: &[Point3], spacing: f64) -> Vec<Point3> {
    if !(spacing.is_finite() && spacing > 0.0) || points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut out = vec![points[0]];
    let mut accumulated = 0.0;
    for i in 1..last {
        accumulated += (points[i] - points[i - 1]).norm();
        if accumulated >= spacing {
            out.push(points[i]);
            accumulated = 0.0;
        }
    }
    out.push(points[last]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, step: f64) -> Vec<Point3> {
        (0..n).map(|i| Point3::new(i as f64 * step, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_keeps_every_nth() {
        let pts = line(11, 1.0);
        let out = decimate_by_arc_length(&pts, 3.0);
        let xs: Vec<f64> = out.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 3.0, 6.0, 9.0, 10.0]);
    }

    #[test]
    fn test_zero_spacing_is_identity() {
        let pts = line(5, 1.0);
        assert_eq!(decimate_by_arc_length(&pts, 0.0), pts);
        assert_eq!(decimate_by_arc_length(&pts, -1.0), pts);
    }

    #[test]
    fn test_large_spacing_keeps_endpoints() {
        let pts = line(5, 1.0);
        let out = decimate_by_arc_length(&pts, 100.0);
        assert_eq!(out, vec![pts[0], pts[4]]);
    }
}
