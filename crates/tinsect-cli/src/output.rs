//! Host-side implementations of the engine's sinks, writing JSON documents.

use serde::Serialize;
use tinsect_booleans::{
    IntersectionOutcome, MergeSink, MergedSurface, PolylineSink, PolylineStyle, PreviewBuilder,
    SplitGroup,
};
use tinsect_math::Point3;
use tinsect_surface::{RawPoint, RawTriangle, SurfaceDocument, SurfaceInput};

/// A created polyline entity as written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct PolylineEntity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_b: Option<String>,
    pub style: PolylineStyle,
    pub points: Vec<RawPoint>,
}

/// Output document of the `intersect` command.
#[derive(Debug, Clone, Serialize)]
pub struct IntersectFile {
    pub message: String,
    pub polylines: Vec<PolylineEntity>,
}

/// Collects polyline entities in creation order.
#[derive(Debug, Default)]
pub struct EntityWriter {
    entities: Vec<PolylineEntity>,
}

impl PolylineSink for EntityWriter {
    fn create_polyline(&mut self, points: &[Point3], style: &PolylineStyle) {
        self.entities.push(PolylineEntity {
            surface_a: None,
            surface_b: None,
            style: style.clone(),
            points: points.iter().copied().map(RawPoint::from).collect(),
        });
    }
}

impl EntityWriter {
    /// Finish the document, tagging each entity with its surface pair.
    ///
    /// Entities are created in outcome order, skipping polylines with fewer
    /// than two points.
    pub fn into_file(mut self, outcome: &IntersectionOutcome) -> IntersectFile {
        let sources = outcome.polylines().iter().filter(|p| p.points.len() >= 2);
        for (entity, source) in self.entities.iter_mut().zip(sources) {
            entity.surface_a = Some(source.surface_a.clone());
            entity.surface_b = Some(source.surface_b.clone());
        }
        IntersectFile {
            message: outcome.message(),
            polylines: self.entities,
        }
    }
}

#[derive(Debug)]
struct GroupRow {
    id: String,
    label: String,
    triangles: usize,
    footprint: f64,
    kept: bool,
}

/// Text preview of split groups.
#[derive(Debug, Default)]
pub struct GroupTable {
    rows: Vec<GroupRow>,
}

impl PreviewBuilder for GroupTable {
    fn preview_group(&mut self, group: &SplitGroup) {
        self.rows.push(GroupRow {
            id: group.id.clone(),
            label: group.label.clone(),
            triangles: group.triangles.len(),
            footprint: group.footprint_area(),
            kept: group.kept,
        });
    }
}

impl GroupTable {
    pub fn render(&self) -> String {
        let mut out = format!(
            "{:<4} {:<24} {:<32} {:>9} {:>14}\n",
            "keep", "id", "label", "triangles", "footprint"
        );
        for row in &self.rows {
            out.push_str(&format!(
                "{:<4} {:<24} {:<32} {:>9} {:>14.3}\n",
                if row.kept { "[x]" } else { "[ ]" },
                row.id,
                row.label,
                row.triangles,
                row.footprint
            ));
        }
        out
    }
}

/// Holds the surface committed by a split session.
#[derive(Debug, Default)]
pub struct MergedFile {
    pub merged: Option<MergedSurface>,
}

impl MergeSink for MergedFile {
    fn commit(&mut self, merged: &MergedSurface) {
        self.merged = Some(merged.clone());
    }
}

/// Wrap a merged surface in a one-surface document with indexed triangles.
pub fn merged_document(merged: &MergedSurface, id: String, name: String) -> SurfaceDocument {
    let triangles = merged
        .faces
        .iter()
        .map(|&[a, b, c]| RawTriangle::Abc {
            a: a as i64,
            b: b as i64,
            c: c as i64,
        })
        .collect();
    SurfaceDocument {
        surfaces: vec![SurfaceInput {
            id: Some(id),
            name: Some(name),
            points: merged.vertices.iter().copied().map(RawPoint::from).collect(),
            triangles,
        }],
    }
}
