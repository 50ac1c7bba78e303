//! Error types for the engine.

use thiserror::Error;

/// Errors that can occur while configuring or feeding the engine.
///
/// Degenerate geometry, disjoint surfaces and empty input are not errors;
/// they are reported through the outcome types.
#[derive(Error, Debug)]
pub enum BooleanError {
    /// Invalid engine settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A surface document could not be read.
    #[error(transparent)]
    Surface(#[from] tinsect_surface::SurfaceError),

    /// A settings document could not be read.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// A split group id does not exist in the session.
    #[error("unknown split group: {0}")]
    UnknownGroup(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, BooleanError>;
