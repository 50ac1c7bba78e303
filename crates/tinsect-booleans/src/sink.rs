//! Seams to the host application.
//!
//! The engine never creates drawing entities, previews or surfaces itself.
//! Callers implement these traits to receive its output.

use serde::{Deserialize, Serialize};
use tinsect_math::Point3;

use crate::classify::{MergedSurface, SplitGroup};

/// Display attributes for created polylines, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolylineStyle {
    /// RGB color.
    pub color: [u8; 3],
    /// Line width in display units.
    pub line_width: f64,
    /// Whether the entity is a closed polygon.
    pub closed: bool,
    /// Target layer name.
    pub layer: String,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            color: [255, 0, 0],
            line_width: 1.0,
            closed: false,
            layer: "0".into(),
        }
    }
}

/// Receives intersection polylines.
pub trait PolylineSink {
    /// Materialize one polyline.
    fn create_polyline(&mut self, points: &[Point3], style: &PolylineStyle);
}

/// Receives split groups for preview.
pub trait PreviewBuilder {
    /// Show one group; `group.kept` decides how.
    fn preview_group(&mut self, group: &SplitGroup);
}

/// Receives the merged result of a split session.
pub trait MergeSink {
    /// Store the merged surface.
    fn commit(&mut self, merged: &MergedSurface);
}

/// A [`PolylineSink`] that keeps everything it is given.
#[derive(Debug, Clone, Default)]
pub struct PolylineCollector {
    /// Received polylines with their styles, in arrival order.
    pub polylines: Vec<(Vec<Point3>, PolylineStyle)>,
}

impl PolylineSink for PolylineCollector {
    fn create_polyline(&mut self, points: &[Point3], style: &PolylineStyle) {
        self.polylines.push((points.to_vec(), style.clone()));
    }
}
