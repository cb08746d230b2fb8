//! Meshes: ordered groups of triangles transformed and drawn together
use std::path::Path;

use log::debug;
use nalgebra::Vector3;
use rayon::prelude::*;

use crate::canvas::{Canvas, Color};
use crate::error::RenderError;
use crate::geometry::TriangleSurface;
use crate::stl::{self, ColorPolicy, StlError};
use crate::transform::Axis;

/// Face colors of [`TriangleObject::cube`]: front, right, back, left, top, bottom
pub const CUBE_FACE_COLORS: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 1.0],
    [0.5, 0.5, 0.5],
];

/// A fixed sequence of triangles, usually loaded from an STL file.
///
/// The number of triangles never changes after construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriangleObject {
    triangles: Vec<TriangleSurface>,
}

impl TriangleObject {
    pub fn new(triangles: Vec<TriangleSurface>) -> Self {
        Self { triangles }
    }

    /// Load every facet of an ASCII or binary STL file
    pub fn from_stl_file<P: AsRef<Path>>(path: P, policy: &ColorPolicy) -> Result<Self, StlError> {
        let triangles = stl::load_stl(path, policy)?;
        Ok(Self::new(triangles))
    }

    /// Axis-aligned cube spanning `min_corner .. min_corner + size`, two
    /// triangles per face, colored with [`CUBE_FACE_COLORS`].
    pub fn cube(min_corner: Vector3<f32>, size: f32) -> Self {
        let colors = CUBE_FACE_COLORS.map(|[r, g, b]| Color::new(r, g, b));
        Self::cube_with_colors(min_corner, size, &colors)
    }

    pub fn cube_with_colors(min_corner: Vector3<f32>, size: f32, colors: &[Color; 6]) -> Self {
        let corner = |dx: f32, dy: f32, dz: f32| min_corner + Vector3::new(dx, dy, dz) * size;

        // Front face sits at the low z side, back face at the high z side.
        let v = [
            corner(0.0, 0.0, 0.0),
            corner(1.0, 0.0, 0.0),
            corner(1.0, 1.0, 0.0),
            corner(0.0, 1.0, 0.0),
            corner(0.0, 0.0, 1.0),
            corner(1.0, 0.0, 1.0),
            corner(1.0, 1.0, 1.0),
            corner(0.0, 1.0, 1.0),
        ];
        let faces: [[usize; 4]; 6] = [
            [0, 1, 2, 3],
            [1, 5, 6, 2],
            [5, 4, 7, 6],
            [4, 0, 3, 7],
            [3, 2, 6, 7],
            [0, 1, 5, 4],
        ];

        let mut triangles = Vec::with_capacity(12);
        for (face, color) in faces.into_iter().zip(colors.iter()) {
            let [p, q, r, s] = face.map(|index| v[index]);
            triangles.push(TriangleSurface::new(p, q, r, *color));
            triangles.push(TriangleSurface::new(p, r, s, *color));
        }

        Self::new(triangles)
    }

    pub fn size(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[TriangleSurface] {
        &self.triangles
    }

    /// Mean of the member centroids, or `None` for an empty object
    pub fn centroid(&self) -> Option<Vector3<f32>> {
        if self.triangles.is_empty() {
            return None;
        }
        let sum = self
            .triangles
            .iter()
            .fold(Vector3::zeros(), |acc, triangle| acc + triangle.centroid());
        Some(sum / self.triangles.len() as f32)
    }

    /// Draw every triangle into `canvas`.
    ///
    /// The canvas is split into row bands that are filled in parallel; each
    /// band walks all triangles in order, so the image is the same as
    /// [`TriangleObject::project_serial`] produces.
    pub fn project(&self, canvas: &mut Canvas) -> Result<(), RenderError> {
        let axis = canvas.camera_axis().ok_or(RenderError::CameraNotSet)?;
        let rows_per_band = band_height(canvas.height());
        debug!(
            "projecting {} triangles in bands of {} rows",
            self.triangles.len(),
            rows_per_band
        );

        canvas
            .bands_mut(rows_per_band)
            .into_par_iter()
            .for_each(|mut band| {
                for triangle in &self.triangles {
                    triangle.rasterize(&axis, &mut band);
                }
            });
        Ok(())
    }

    /// Draw every triangle into `canvas` on the calling thread
    pub fn project_serial(&self, canvas: &mut Canvas) -> Result<(), RenderError> {
        let axis = canvas.camera_axis().ok_or(RenderError::CameraNotSet)?;
        for triangle in &self.triangles {
            triangle.rasterize(&axis, canvas);
        }
        Ok(())
    }

    pub fn rotate_around(&mut self, axis: Axis, degrees: f32, pivot: &Vector3<f32>) {
        self.triangles
            .par_iter_mut()
            .for_each(|triangle| triangle.rotate_around(axis, degrees, pivot));
    }

    pub fn rotate_around_x(&mut self, degrees: f32, pivot: &Vector3<f32>) {
        self.rotate_around(Axis::X, degrees, pivot);
    }

    pub fn rotate_around_y(&mut self, degrees: f32, pivot: &Vector3<f32>) {
        self.rotate_around(Axis::Y, degrees, pivot);
    }

    pub fn rotate_around_z(&mut self, degrees: f32, pivot: &Vector3<f32>) {
        self.rotate_around(Axis::Z, degrees, pivot);
    }

    pub fn scale(&mut self, k: f32) {
        self.triangles
            .par_iter_mut()
            .for_each(|triangle| triangle.scale(k));
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.triangles
            .par_iter_mut()
            .for_each(|triangle| triangle.translate(dx, dy, dz));
    }
}

impl FromIterator<TriangleSurface> for TriangleObject {
    fn from_iter<I: IntoIterator<Item = TriangleSurface>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A few bands per worker thread keeps the load balanced when the mesh only
/// covers part of the canvas.
fn band_height(height: usize) -> usize {
    let bands = rayon::current_num_threads().max(1) * 4;
    ((height + bands - 1) / bands).max(1)
}
