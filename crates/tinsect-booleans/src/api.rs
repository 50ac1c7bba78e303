//! Public entry points: surface intersection and boolean splitting.

use tinsect_math::{chain_tolerance, Tolerance};
use tinsect_surface::{Aabb3, Surface};

use crate::chain::{chain_segments_with_tolerance, dedup_segments, IntersectionPolyline};
use crate::classify::{classify_surface, group_by_side, SplitSession};
use crate::error::Result;
use crate::grid::{build_grid, cell_size_for};
use crate::intersect::Segment;
use crate::pipeline::scan_pair;
use crate::settings::IntersectSettings;
use crate::simplify::decimate_by_arc_length;
use crate::sink::{PolylineSink, PolylineStyle};

/// Result of [`intersect_surfaces`].
///
/// Only `Polylines` carries geometry; the other variants tell the caller
/// which informational message to show.
#[derive(Debug, Clone, PartialEq)]
pub enum IntersectionOutcome {
    /// Fewer than two surfaces, or a surface without triangles.
    InsufficientInput,
    /// No pair of surfaces has overlapping bounding boxes.
    NoOverlap,
    /// Boxes overlap but no triangles cross.
    NoIntersection,
    /// Chained intersection polylines, pair by pair.
    Polylines(Vec<IntersectionPolyline>),
}

impl IntersectionOutcome {
    /// The polylines, empty for every other variant.
    pub fn polylines(&self) -> &[IntersectionPolyline] {
        match self {
            IntersectionOutcome::Polylines(p) => p,
            _ => &[],
        }
    }

    /// Short user-facing description.
    pub fn message(&self) -> String {
        match self {
            IntersectionOutcome::InsufficientInput => {
                "select at least two surfaces with triangles".into()
            }
            IntersectionOutcome::NoOverlap => "surfaces do not overlap".into(),
            IntersectionOutcome::NoIntersection => "surfaces do not intersect".into(),
            IntersectionOutcome::Polylines(p) => format!("{} intersection polyline(s)", p.len()),
        }
    }
}

/// Tolerances for a set of bounding boxes, scaled to their magnitude.
pub fn tolerance_for(boxes: &[Aabb3]) -> Tolerance {
    let magnitude = boxes
        .iter()
        .filter(|b| !b.is_empty())
        .map(Aabb3::max_abs_coordinate)
        .fold(0.0, f64::max);
    Tolerance::for_magnitude(magnitude)
}

/// Intersect every pair of `surfaces` and chain the segments into
/// polylines.
pub fn intersect_surfaces(
    surfaces: &[Surface],
    settings: &IntersectSettings,
) -> Result<IntersectionOutcome> {
    settings.validate()?;
    if surfaces.len() < 2 || surfaces.iter().any(Surface::is_empty) {
        return Ok(IntersectionOutcome::InsufficientInput);
    }

    let boxes: Vec<Aabb3> = surfaces.iter().map(Surface::aabb).collect();
    let mut overlapping = 0usize;
    let mut polylines = Vec::new();

    for i in 0..surfaces.len() {
        for j in i + 1..surfaces.len() {
            let (a, b) = (&surfaces[i], &surfaces[j]);
            let tol = tolerance_for(&[boxes[i], boxes[j]]);
            let mut box_a = boxes[i];
            box_a.expand(tol.linear);
            if !box_a.overlaps(&boxes[j]) {
                tracing::debug!(a = %a.id, b = %b.id, "bounding boxes disjoint, pair skipped");
                continue;
            }
            overlapping += 1;

            let grid = build_grid(&b.triangles, cell_size_for(&b.triangles));
            let scan = scan_pair(&a.triangles, &b.triangles, &grid, &tol, true);
            let segments: Vec<Segment> = scan.segments.iter().map(|s| s.segment).collect();
            if segments.is_empty() {
                continue;
            }

            let avg = segments.iter().map(Segment::length).sum::<f64>() / segments.len() as f64;
            let chain_tol = chain_tolerance(avg);
            let unique = dedup_segments(&segments, chain_tol);
            let chains = chain_segments_with_tolerance(&unique, chain_tol);
            tracing::debug!(
                a = %a.id,
                b = %b.id,
                segments = segments.len(),
                duplicates = segments.len() - unique.len(),
                polylines = chains.len(),
                chain_tolerance = chain_tol,
                "chained pair"
            );

            for chain in chains {
                let closed = chain.is_closed(chain_tol);
                polylines.push(IntersectionPolyline {
                    surface_a: a.id.clone(),
                    surface_b: b.id.clone(),
                    points: decimate_by_arc_length(&chain.points, settings.vertex_spacing),
                    closed,
                });
            }
        }
    }

    Ok(if overlapping == 0 {
        IntersectionOutcome::NoOverlap
    } else if polylines.is_empty() {
        IntersectionOutcome::NoIntersection
    } else {
        IntersectionOutcome::Polylines(polylines)
    })
}

/// Send polylines to a sink, one entity each.
///
/// `style` is passed through as given, except that `closed` follows
/// `settings.closed_polygons`. Returns the number of entities created.
pub fn publish_polylines(
    polylines: &[IntersectionPolyline],
    style: &PolylineStyle,
    settings: &IntersectSettings,
    sink: &mut impl PolylineSink,
) -> usize {
    let style = PolylineStyle {
        closed: settings.closed_polygons,
        ..style.clone()
    };
    let mut created = 0;
    for polyline in polylines.iter().filter(|p| p.points.len() >= 2) {
        sink.create_polyline(&polyline.points, &style);
        created += 1;
    }
    created
}

/// Split `a` and `b` along their mutual intersection and classify every
/// resulting triangle.
///
/// Returns `None` when either surface is empty or their XY footprints are
/// disjoint.
pub fn compute_splits(
    a: &Surface,
    b: &Surface,
    settings: &IntersectSettings,
) -> Result<Option<SplitSession>> {
    settings.validate()?;
    if a.is_empty() || b.is_empty() {
        return Ok(None);
    }

    let (box_a, box_b) = (a.aabb(), b.aabb());
    let tol = tolerance_for(&[box_a, box_b]);
    let mut query = box_a;
    query.expand(tol.linear);
    if !query.overlaps_xy(&box_b) {
        tracing::debug!(a = %a.id, b = %b.id, "footprints disjoint, nothing to split");
        return Ok(None);
    }

    let grid_a = build_grid(&a.triangles, cell_size_for(&a.triangles));
    let grid_b = build_grid(&b.triangles, cell_size_for(&b.triangles));
    let scan = scan_pair(&a.triangles, &b.triangles, &grid_b, &tol, false);

    let pieces_a = classify_surface(&a.triangles, &scan.best_a, &b.triangles, &grid_b, &tol);
    let pieces_b = classify_surface(&b.triangles, &scan.best_b, &a.triangles, &grid_a, &tol);

    let mut groups = group_by_side(a, pieces_a);
    groups.extend(group_by_side(b, pieces_b));
    let session = SplitSession::new(groups);

    tracing::debug!(
        a = %a.id,
        b = %b.id,
        crossings = scan.stats.crossings,
        groups = session.groups().len(),
        "computed splits"
    );
    Ok(Some(session))
}
