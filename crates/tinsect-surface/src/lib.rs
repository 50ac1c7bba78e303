#![warn(missing_docs)]

//! Triangle soup surfaces for the tinsect engine.
//!
//! A [`Surface`] is an unordered collection of [`Triangle`]s with no
//! shared-vertex topology. The [`input`] module normalizes the storage
//! shapes found in the wild into that single representation.

pub mod bbox;
pub mod input;
pub mod triangle;

pub use bbox::Aabb3;
pub use input::{ExtractReport, RawPoint, RawTriangle, SurfaceDocument, SurfaceInput};
pub use triangle::Triangle;

use thiserror::Error;

/// Errors raised while reading surfaces.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("failed to parse surface document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for surface operations.
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// A named triangle soup.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Identifier used to derive split group ids.
    pub id: String,
    /// Display name used in split group labels.
    pub name: String,
    /// The triangles.
    pub triangles: Vec<Triangle>,
}

impl Surface {
    /// Create a surface.
    pub fn new(id: impl Into<String>, name: impl Into<String>, triangles: Vec<Triangle>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            triangles,
        }
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True if the surface has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounding box of all triangles; empty for an empty surface.
    pub fn aabb(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for tri in &self.triangles {
            aabb.include_aabb(&tri.aabb());
        }
        aabb
    }

    /// Sum of the XY footprint areas of all triangles.
    pub fn footprint_area(&self) -> f64 {
        self.triangles.iter().map(Triangle::area_xy).sum()
    }
}
