//! Error types for camera configuration, rendering and image output
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`crate::Canvas`]
#[derive(Error, Debug)]
pub enum CanvasError {
    /// Camera normal did not have exactly three components
    #[error("Normal vector must have 3 elements, got {0}")]
    NormalDimension(usize),

    /// Camera normal had zero (or non-finite) magnitude
    #[error("Normal vector cannot be a zero vector")]
    ZeroNormal,

    /// Output file could not be created or written
    #[error("Failed to write image '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while projecting geometry onto a canvas
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("Camera normal has not been set on the canvas")]
    CameraNotSet,
}
