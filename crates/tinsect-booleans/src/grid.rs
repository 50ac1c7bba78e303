//! Uniform XY spatial hash over a triangle set.
//!
//! Each triangle is bucketed into every cell its XY bounding box covers.
//! With a cell size of about twice the average edge length, a triangle
//! touches a small, near-constant number of cells, which bounds both the
//! memory of the index and the cost of a query.

use std::collections::HashMap;

use tinsect_surface::{Aabb3, Triangle};

/// Integer cell coordinates `(gx, gy)`.
pub type CellKey = (i64, i64);

/// Cell size used when the triangle set gives no usable edge length.
const FALLBACK_CELL_SIZE: f64 = 1.0;

/// XY-bucketed index from cell to triangle indices.
#[derive(Debug, Clone)]
pub struct TriangleGrid {
    cell_size: f64,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl TriangleGrid {
    /// Index `triangles` with the given cell size.
    ///
    /// Non-positive or non-finite cell sizes fall back to 1.
    pub fn build(triangles: &[Triangle], cell_size: f64) -> Self {
        let cell_size = sanitize_cell_size(cell_size);
        let mut cells: HashMap<CellKey, Vec<usize>> = HashMap::new();

        for (idx, tri) in triangles.iter().enumerate() {
            let aabb = tri.aabb();
            let (x0, y0) = cell_of(aabb.min.x, aabb.min.y, cell_size);
            let (x1, y1) = cell_of(aabb.max.x, aabb.max.y, cell_size);
            for gx in x0..=x1 {
                for gy in y0..=y1 {
                    cells.entry((gx, gy)).or_default().push(idx);
                }
            }
        }

        Self { cell_size, cells }
    }

    /// Cell edge length.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of occupied cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Triangle indices bucketed in one cell.
    pub fn cell(&self, key: CellKey) -> &[usize] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Triangle indices in the cell containing `(x, y)`.
    pub fn at_point(&self, x: f64, y: f64) -> &[usize] {
        self.cell(cell_of(x, y, self.cell_size))
    }

    /// Deduplicated, ascending union of the triangle indices in every cell
    /// covered by the XY extent of `bbox`.
    pub fn query(&self, bbox: &Aabb3) -> Vec<usize> {
        if bbox.is_empty() {
            return Vec::new();
        }
        let (x0, y0) = cell_of(bbox.min.x, bbox.min.y, self.cell_size);
        let (x1, y1) = cell_of(bbox.max.x, bbox.max.y, self.cell_size);

        let mut out = Vec::new();
        let span = (x1 - x0 + 1).saturating_mul(y1 - y0 + 1);
        if span > self.cells.len() as i64 {
            // Query wider than the index itself: scan occupied cells instead.
            for (&(gx, gy), bucket) in &self.cells {
                if (x0..=x1).contains(&gx) && (y0..=y1).contains(&gy) {
                    out.extend_from_slice(bucket);
                }
            }
        } else {
            for gx in x0..=x1 {
                for gy in y0..=y1 {
                    if let Some(bucket) = self.cells.get(&(gx, gy)) {
                        out.extend_from_slice(bucket);
                    }
                }
            }
        }

        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Index `triangles` into a grid with the given cell size.
pub fn build_grid(triangles: &[Triangle], cell_size: f64) -> TriangleGrid {
    TriangleGrid::build(triangles, cell_size)
}

/// Triangle indices whose cells intersect the XY extent of `bbox`.
pub fn query_grid(grid: &TriangleGrid, bbox: &Aabb3) -> Vec<usize> {
    grid.query(bbox)
}

/// Mean edge length over all triangles; 0 for an empty set.
pub fn average_edge_length(triangles: &[Triangle]) -> f64 {
    if triangles.is_empty() {
        return 0.0;
    }
    let total: f64 = triangles
        .iter()
        .map(|t| t.edge_lengths().iter().sum::<f64>())
        .sum();
    total / (triangles.len() * 3) as f64
}

/// Cell size adapted to the triangle set being indexed: twice its average
/// edge length.
pub fn cell_size_for(triangles: &[Triangle]) -> f64 {
    sanitize_cell_size(2.0 * average_edge_length(triangles))
}

fn sanitize_cell_size(cell_size: f64) -> f64 {
    if cell_size.is_finite() && cell_size > 0.0 {
        cell_size
    } else {
        FALLBACK_CELL_SIZE
    }
}

/// Cell containing `(x, y)`.
pub(crate) fn cell_of(x: f64, y: f64, cell_size: f64) -> CellKey {
    (
        (x / cell_size).floor() as i64,
        (y / cell_size).floor() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinsect_math::Point3;

    fn tri_at(x: f64, y: f64, size: f64) -> Triangle {
        Triangle::new(
            Point3::new(x, y, 0.0),
            Point3::new(x + size, y, 0.0),
            Point3::new(x, y + size, 0.0),
        )
    }

    #[test]
    fn test_triangle_lands_in_covered_cells() {
        let tris = vec![tri_at(0.5, 0.5, 1.0)];
        let grid = build_grid(&tris, 1.0);
        // XY box (0.5..1.5, 0.5..1.5) touches 4 cells
        assert_eq!(grid.occupied_cells(), 4);
        assert_eq!(grid.cell((0, 0)), &[0]);
        assert_eq!(grid.cell((1, 1)), &[0]);
        assert!(grid.cell((2, 2)).is_empty());
    }

    #[test]
    fn test_query_deduplicates() {
        let tris = vec![tri_at(0.0, 0.0, 3.0), tri_at(10.0, 10.0, 1.0)];
        let grid = build_grid(&tris, 1.0);
        let q = Aabb3::new(Point3::new(0.0, 0.0, -5.0), Point3::new(2.0, 2.0, 5.0));
        assert_eq!(query_grid(&grid, &q), vec![0]);

        let all = Aabb3::new(Point3::new(-1.0, -1.0, 0.0), Point3::new(20.0, 20.0, 0.0));
        assert_eq!(grid.query(&all), vec![0, 1]);
    }

    #[test]
    fn test_wide_query_scans_occupied_cells() {
        let tris = vec![tri_at(0.0, 0.0, 1.0), tri_at(1e6, 1e6, 1.0)];
        let grid = build_grid(&tris, 0.5);
        let wide = Aabb3::new(
            Point3::new(-1e7, -1e7, 0.0),
            Point3::new(1e7, 1e7, 0.0),
        );
        assert_eq!(grid.query(&wide), vec![0, 1]);
    }

    #[test]
    fn test_negative_coordinates() {
        let tris = vec![tri_at(-2.5, -2.5, 1.0)];
        let grid = build_grid(&tris, 1.0);
        assert_eq!(grid.at_point(-2.2, -2.2), &[0]);
        assert!(grid.at_point(2.2, 2.2).is_empty());
    }

    #[test]
    fn test_cell_size_from_edges() {
        let tris = vec![tri_at(0.0, 0.0, 3.0)];
        let avg = average_edge_length(&tris);
        let expected = (3.0 + 3.0 * 2f64.sqrt() + 3.0) / 3.0;
        assert!((avg - expected).abs() < 1e-12);
        assert!((cell_size_for(&tris) - 2.0 * expected).abs() < 1e-12);
        assert_eq!(cell_size_for(&[]), FALLBACK_CELL_SIZE);
    }

    #[test]
    fn test_empty_query() {
        let grid = build_grid(&[tri_at(0.0, 0.0, 1.0)], 1.0);
        assert!(grid.query(&Aabb3::empty()).is_empty());
    }
}
