//! Engine settings.

use serde::{Deserialize, Serialize};

use crate::error::{BooleanError, Result};

/// User-facing intersection parameters.
///
/// Geometric tolerances are not configurable; they are derived from the
/// input magnitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectSettings {
    /// Target vertex spacing along output polylines, in input units.
    /// Zero disables decimation.
    pub vertex_spacing: f64,
    /// Mark output polylines as closed polygons.
    pub closed_polygons: bool,
}

impl Default for IntersectSettings {
    fn default() -> Self {
        Self {
            vertex_spacing: 0.0,
            closed_polygons: false,
        }
    }
}

impl IntersectSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !self.vertex_spacing.is_finite() || self.vertex_spacing < 0.0 {
            return Err(BooleanError::InvalidSettings(
                "vertex_spacing must be a non-negative number".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }
}
