//! Heterogeneous triangle storage and its normalization.
//!
//! Surfaces arrive with triangles in one of three shapes:
//!
//! ```json
//! { "vertices": [{"x":0,"y":0,"z":0}, {"x":1,"y":0,"z":0}, {"x":0,"y":1,"z":0}] }
//! { "a": 0, "b": 1, "c": 2 }
//! { "indices": [0, 1, 2] }
//! ```
//!
//! The index shapes refer to the surface's shared `points` array. Everything
//! is normalized once, here, into [`Triangle`] values. A triangle whose
//! vertices cannot be resolved is skipped; the rest of the surface survives.

use serde::{Deserialize, Serialize};
use tinsect_math::Point3;

use crate::triangle::Triangle;
use crate::{Result, Surface};

/// A serializable 3D point.
///
/// nalgebra's points are kept out of the wire format so the JSON shape stays
/// a plain `{x, y, z}` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    /// X coordinate (easting).
    pub x: f64,
    /// Y coordinate (northing).
    pub y: f64,
    /// Z coordinate (elevation).
    pub z: f64,
}

impl RawPoint {
    /// Create a new point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<RawPoint> for Point3 {
    fn from(p: RawPoint) -> Self {
        Point3::new(p.x, p.y, p.z)
    }
}

impl From<Point3> for RawPoint {
    fn from(p: Point3) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

/// One triangle as stored by the producer of a surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTriangle {
    /// Inline vertex array.
    Vertices {
        /// Expected to hold exactly three points.
        vertices: Vec<RawPoint>,
    },
    /// Explicit `a`/`b`/`c` indices into the shared point array.
    Abc {
        /// First vertex index.
        a: i64,
        /// Second vertex index.
        b: i64,
        /// Third vertex index.
        c: i64,
    },
    /// Index triple into the shared point array.
    Indices {
        /// Expected to hold exactly three indices.
        indices: Vec<i64>,
    },
    /// Anything else; always skipped.
    Unrecognized(serde_json::Value),
}

impl RawTriangle {
    /// Resolve to a canonical triangle, or `None` if any vertex is missing.
    pub fn resolve(&self, points: &[RawPoint]) -> Option<Triangle> {
        let lookup = |i: i64| -> Option<RawPoint> {
            usize::try_from(i)
                .ok()
                .and_then(|i| points.get(i))
                .copied()
        };
        let [p0, p1, p2] = match self {
            RawTriangle::Vertices { vertices } => match vertices.as_slice() {
                [p0, p1, p2] => [*p0, *p1, *p2],
                _ => return None,
            },
            RawTriangle::Abc { a, b, c } => [lookup(*a)?, lookup(*b)?, lookup(*c)?],
            RawTriangle::Indices { indices } => match indices.as_slice() {
                [i, j, k] => [lookup(*i)?, lookup(*j)?, lookup(*k)?],
                _ => return None,
            },
            RawTriangle::Unrecognized(_) => return None,
        };
        if !(p0.is_finite() && p1.is_finite() && p2.is_finite()) {
            return None;
        }
        Some(Triangle::new(p0.into(), p1.into(), p2.into()))
    }
}

/// Counts produced by [`SurfaceInput::normalize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Triangles converted successfully.
    pub extracted: usize,
    /// Triangles skipped because a vertex could not be resolved.
    pub skipped: usize,
}

/// A surface as read from the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurfaceInput {
    /// Caller-chosen identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Shared point array referenced by index-based triangles.
    #[serde(default)]
    pub points: Vec<RawPoint>,
    /// Triangles in any supported shape.
    #[serde(default)]
    pub triangles: Vec<RawTriangle>,
}

impl SurfaceInput {
    /// Normalize into a [`Surface`].
    ///
    /// `fallback_id` is used when the input carries no id; the name falls
    /// back to the id.
    pub fn normalize(&self, fallback_id: &str) -> (Surface, ExtractReport) {
        let id = self.id.clone().unwrap_or_else(|| fallback_id.to_string());
        let name = self.name.clone().unwrap_or_else(|| id.clone());

        let mut triangles = Vec::with_capacity(self.triangles.len());
        let mut report = ExtractReport::default();
        for raw in &self.triangles {
            match raw.resolve(&self.points) {
                Some(tri) => {
                    triangles.push(tri);
                    report.extracted += 1;
                }
                None => report.skipped += 1,
            }
        }

        if report.skipped > 0 {
            tracing::warn!(
                surface = %id,
                skipped = report.skipped,
                extracted = report.extracted,
                "skipped triangles with unresolved vertices"
            );
        }

        (Surface::new(id, name, triangles), report)
    }
}

/// A set of surfaces as read from a JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurfaceDocument {
    /// The surfaces, in selection order.
    pub surfaces: Vec<SurfaceInput>,
}

impl SurfaceDocument {
    /// Parse a document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Normalize every surface. Surfaces without an id get `S0`, `S1`, ….
    pub fn normalize(&self) -> Vec<(Surface, ExtractReport)> {
        self.surfaces
            .iter()
            .enumerate()
            .map(|(i, s)| s.normalize(&format!("S{i}")))
            .collect()
    }
}

/// Build a surface input from canonical triangles using the inline vertex
/// shape; the inverse of normalization.
pub fn to_input(surface: &Surface) -> SurfaceInput {
    SurfaceInput {
        id: Some(surface.id.clone()),
        name: Some(surface.name.clone()),
        points: Vec::new(),
        triangles: surface
            .triangles
            .iter()
            .map(|t| RawTriangle::Vertices {
                vertices: t.vertices().iter().map(|&p| p.into()).collect(),
            })
            .collect(),
    }
}
