//! ortho3d core library: a CPU rasterizer for flat-colored triangles.
//!
//! Geometry is projected orthographically along a camera normal onto a
//! [`Canvas`], depth tested per pixel and written out as ASCII PPM.

pub mod canvas;
pub mod error;
pub mod geometry;
pub mod linalg;
pub mod object;
pub mod projection;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use canvas::{Canvas, Color, PixelSink, RowBand};
pub use error::{CanvasError, RenderError};
pub use geometry::TriangleSurface;
pub use object::TriangleObject;
pub use projection::CameraAxis;
pub use stl::{ColorPolicy, StlError};
pub use transform::{Axis, Transform};
