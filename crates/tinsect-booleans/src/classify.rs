//! Region classification and split-and-pick merging.
//!
//! Every triangle of both surfaces ends up in exactly one [`SplitGroup`]:
//! crossed triangles through [`split_triangle`], the rest by comparing
//! their centroid against the other surface's elevation at the same XY.
//! The resulting [`SplitSession`] holds the groups, lets the caller pick
//! which to keep, and welds the kept triangles into one mesh.

use tinsect_math::{Point3, Tolerance};
use tinsect_surface::{Surface, Triangle};

use crate::dedup::weld_points;
use crate::error::{BooleanError, Result};
use crate::grid::TriangleGrid;
use crate::sink::{MergeSink, PreviewBuilder};
use crate::split::{split_triangle, Side, SideTriangle};

/// Barycentric slack for point-in-triangle tests, so that points on a
/// shared edge still find a containing triangle.
const BARYCENTRIC_EPS: f64 = 1e-9;

/// A toggleable set of triangles from one surface on one side of the other.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitGroup {
    /// Stable id, `"{surface_id}_{side}"`.
    pub id: String,
    /// Id of the surface the triangles came from.
    pub surface_id: String,
    /// Display label, `"{surface name} ({side})"`.
    pub label: String,
    /// Side relative to the other surface.
    pub side: Side,
    /// The triangles.
    pub triangles: Vec<Triangle>,
    /// Whether the group goes into the merged result.
    pub kept: bool,
}

impl SplitGroup {
    fn new(surface: &Surface, side: Side, triangles: Vec<Triangle>) -> Self {
        Self {
            id: format!("{}_{}", surface.id, side),
            surface_id: surface.id.clone(),
            label: format!("{} ({})", surface.name, side),
            side,
            triangles,
            kept: true,
        }
    }

    /// Sum of XY footprint areas.
    pub fn footprint_area(&self) -> f64 {
        self.triangles.iter().map(Triangle::area_xy).sum()
    }
}

/// An indexed triangle mesh with welded vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedSurface {
    /// Unique vertices.
    pub vertices: Vec<Point3>,
    /// Vertex index triples, winding as in the source triangles.
    pub faces: Vec<[usize; 3]>,
}

impl MergedSurface {
    /// Number of faces.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// True if there are no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Faces as triangles.
    pub fn triangles(&self) -> Vec<Triangle> {
        self.faces
            .iter()
            .map(|&[i, j, k]| Triangle::new(self.vertices[i], self.vertices[j], self.vertices[k]))
            .collect()
    }

    /// Convert back to a triangle soup surface.
    pub fn to_surface(&self, id: impl Into<String>, name: impl Into<String>) -> Surface {
        Surface::new(id, name, self.triangles())
    }
}

/// Split groups of two surfaces and the caller's keep/drop choices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSession {
    groups: Vec<SplitGroup>,
}

impl SplitSession {
    /// Wrap groups; empty groups are dropped.
    pub fn new(groups: Vec<SplitGroup>) -> Self {
        Self {
            groups: groups.into_iter().filter(|g| !g.triangles.is_empty()).collect(),
        }
    }

    /// All groups in deterministic order: first surface then second, and
    /// above, below, outside within each.
    pub fn groups(&self) -> &[SplitGroup] {
        &self.groups
    }

    /// Look up a group by id.
    pub fn group(&self, id: &str) -> Option<&SplitGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    fn group_mut(&mut self, id: &str) -> Result<&mut SplitGroup> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| BooleanError::UnknownGroup(id.to_string()))
    }

    /// Flip a group's `kept` flag, returning the new value.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let group = self.group_mut(id)?;
        group.kept = !group.kept;
        Ok(group.kept)
    }

    /// Set a group's `kept` flag.
    pub fn set_kept(&mut self, id: &str, kept: bool) -> Result<()> {
        self.group_mut(id)?.kept = kept;
        Ok(())
    }

    /// Triangles of all kept groups, in group order.
    pub fn kept_triangles(&self) -> Vec<Triangle> {
        self.groups
            .iter()
            .filter(|g| g.kept)
            .flat_map(|g| g.triangles.iter().copied())
            .collect()
    }

    /// Weld the kept triangles into one mesh.
    ///
    /// Vertices closer than `tolerance` are merged, first seen wins. Faces
    /// that collapse to fewer than three distinct vertices are dropped.
    pub fn merge(&self, tolerance: f64) -> MergedSurface {
        let triangles = self.kept_triangles();
        let corners: Vec<Point3> = triangles.iter().flat_map(Triangle::vertices).collect();
        let welded = weld_points(&corners, tolerance);

        let faces: Vec<[usize; 3]> = welded
            .remap
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .filter(|[i, j, k]| i != j && j != k && k != i)
            .collect();

        let collapsed = triangles.len() - faces.len();
        tracing::debug!(
            triangles = triangles.len(),
            vertices = welded.unique_count,
            collapsed,
            "merged kept groups"
        );

        MergedSurface {
            vertices: welded.points,
            faces,
        }
    }

    /// Hand every group to a preview builder.
    pub fn publish_preview(&self, builder: &mut impl PreviewBuilder) {
        for group in &self.groups {
            builder.preview_group(group);
        }
    }

    /// Merge the kept groups and hand the result to `sink`.
    pub fn commit(&self, tolerance: f64, sink: &mut impl MergeSink) -> MergedSurface {
        let merged = self.merge(tolerance);
        sink.commit(&merged);
        merged
    }
}

/// Side of every triangle of `own`, splitting those with a crossing.
///
/// `crossings[i]` holds the distances of triangle `i`'s vertices to the
/// plane of its strongest crossing with the other surface.
pub(crate) fn classify_surface(
    own: &[Triangle],
    crossings: &[Option<[f64; 3]>],
    other: &[Triangle],
    other_grid: &TriangleGrid,
    tol: &Tolerance,
) -> Vec<SideTriangle> {
    let mut out = Vec::with_capacity(own.len());
    for (i, tri) in own.iter().enumerate() {
        match crossings.get(i).copied().flatten() {
            Some(distances) => out.extend(split_triangle(tri, distances, tol.linear)),
            None => out.push(SideTriangle {
                triangle: *tri,
                side: side_of_point(&tri.centroid(), other, other_grid, tol),
            }),
        }
    }
    out
}

/// Side of `p` relative to the surface `other`.
pub(crate) fn side_of_point(
    p: &Point3,
    other: &[Triangle],
    other_grid: &TriangleGrid,
    tol: &Tolerance,
) -> Side {
    let surface_z = other_grid
        .at_point(p.x, p.y)
        .iter()
        .find_map(|&j| other[j].z_at_xy(p.x, p.y, BARYCENTRIC_EPS));
    match surface_z {
        Some(z) if p.z - z >= -tol.linear => Side::Above,
        Some(_) => Side::Below,
        None => Side::Outside,
    }
}

/// Bucket classified triangles of `surface` into its three groups.
pub(crate) fn group_by_side(surface: &Surface, pieces: Vec<SideTriangle>) -> Vec<SplitGroup> {
    let mut buckets: [Vec<Triangle>; 3] = Default::default();
    for piece in pieces {
        let slot = Side::ALL.iter().position(|&s| s == piece.side).unwrap_or(2);
        buckets[slot].push(piece.triangle);
    }
    Side::ALL
        .iter()
        .zip(buckets)
        .filter(|(_, tris)| !tris.is_empty())
        .map(|(&side, tris)| SplitGroup::new(surface, side, tris))
        .collect()
}
