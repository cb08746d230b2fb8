//! Pixel and depth buffers with an orthographic camera
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use log::{debug, error, info};
use nalgebra::Vector3;
use rand::Rng;

use crate::error::CanvasError;
use crate::projection::CameraAxis;

/// RGB color with components in `[0, 1]`
pub type Color = Vector3<f32>;

/// Anything a rasterizer can write depth-tested fragments into.
///
/// `x` is the row index and `y` the column index. Writes outside the sink are
/// ignored.
pub trait PixelSink {
    /// Rows this sink accepts writes for
    fn rows(&self) -> Range<usize>;

    fn width(&self) -> usize;

    fn put_pixel(&mut self, x: i64, y: i64, depth: f32, color: &Color);
}

/// Closer-wins depth test. An empty cell accepts any fragment; otherwise the
/// fragment must be strictly nearer, so ties keep the first writer.
fn depth_test_write(pixel: &mut Color, stored: &mut Option<f32>, depth: f32, color: &Color) {
    if depth.is_nan() {
        return;
    }
    let wins = match *stored {
        None => true,
        Some(current) => depth < current,
    };
    if wins {
        *pixel = *color;
        *stored = Some(depth);
    }
}

fn cell_index(x: i64, y: i64, rows: &Range<usize>, width: usize) -> Option<usize> {
    let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
    if !rows.contains(&x) || y >= width {
        return None;
    }
    Some((x - rows.start) * width + y)
}

/// Render target: a `height` x `width` grid of colors and depths
pub struct Canvas {
    height: usize,
    width: usize,
    pixels: Vec<Color>,
    depth: Vec<Option<f32>>,
    camera: Option<CameraAxis>,
}

impl Canvas {
    pub fn new(height: usize, width: usize) -> Self {
        let size = height * width;
        Self {
            height,
            width,
            pixels: vec![Color::zeros(); size],
            depth: vec![None; size],
            camera: None,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Point the camera along `normal`.
    ///
    /// The normal is normalised, a new screen basis is derived from it and both
    /// buffers are cleared. A zero vector is rejected and leaves the canvas
    /// untouched.
    pub fn set_camera_normal(&mut self, normal: Vector3<f32>) -> Result<CameraAxis, CanvasError> {
        let axis = CameraAxis::from_normal(&normal).ok_or(CanvasError::ZeroNormal)?;
        Ok(self.install_camera(axis))
    }

    /// Same as [`Canvas::set_camera_normal`] for untyped input such as
    /// configuration values. Anything but three components is rejected.
    pub fn set_camera_normal_from_slice(&mut self, normal: &[f32]) -> Result<CameraAxis, CanvasError> {
        match *normal {
            [x, y, z] => self.set_camera_normal(Vector3::new(x, y, z)),
            _ => Err(CanvasError::NormalDimension(normal.len())),
        }
    }

    /// Same as [`Canvas::set_camera_normal`], choosing the screen axes with
    /// random draws from `rng`.
    pub fn set_camera_normal_with_rng<R: Rng + ?Sized>(
        &mut self,
        normal: Vector3<f32>,
        rng: &mut R,
    ) -> Result<CameraAxis, CanvasError> {
        let axis = CameraAxis::from_normal_with_rng(&normal, rng).ok_or(CanvasError::ZeroNormal)?;
        Ok(self.install_camera(axis))
    }

    fn install_camera(&mut self, axis: CameraAxis) -> CameraAxis {
        debug!(
            "camera normal {:?}, screen axes {:?} / {:?}",
            axis.normal.as_slice(),
            axis.ortho1.as_slice(),
            axis.ortho2.as_slice()
        );
        self.camera = Some(axis);
        // Stored depths belong to the previous orientation.
        self.clear();
        axis
    }

    pub fn camera_normal(&self) -> Option<Vector3<f32>> {
        self.camera.map(|axis| axis.normal)
    }

    /// Camera normal and the two screen axes, if a normal was set
    pub fn camera_axis(&self) -> Option<CameraAxis> {
        self.camera
    }

    /// Reset every pixel to black and every depth cell to empty
    pub fn clear(&mut self) {
        self.pixels.fill(Color::zeros());
        self.depth.fill(None);
    }

    /// Depth-tested write; coordinates outside the canvas are ignored
    pub fn put_pixel(&mut self, x: i64, y: i64, depth: f32, color: &Color) {
        if let Some(index) = cell_index(x, y, &(0..self.height), self.width) {
            depth_test_write(&mut self.pixels[index], &mut self.depth[index], depth, color);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.height && y < self.width {
            Some(self.pixels[x * self.width + y])
        } else {
            None
        }
    }

    /// Stored depth, or `None` for an empty or out-of-bounds cell
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.height && y < self.width {
            self.depth[x * self.width + y]
        } else {
            None
        }
    }

    /// Split the buffers into disjoint bands of `rows_per_band` rows each
    /// (the last band may be shorter).
    pub fn bands_mut(&mut self, rows_per_band: usize) -> Vec<RowBand<'_>> {
        if self.width == 0 || self.height == 0 {
            return Vec::new();
        }
        let width = self.width;
        let chunk = rows_per_band.max(1) * width;

        self.pixels
            .chunks_mut(chunk)
            .zip(self.depth.chunks_mut(chunk))
            .enumerate()
            .map(|(n, (pixels, depth))| RowBand {
                first_row: n * rows_per_band.max(1),
                width,
                pixels,
                depth,
            })
            .collect()
    }

    /// Serialise as ASCII PPM (`P3`).
    ///
    /// Components are scaled to `0..=255` by truncation. Colors outside
    /// `[0, 1]` are clamped.
    pub fn write_ppm_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;

        if self.width == 0 {
            return Ok(());
        }
        for row in self.pixels.chunks(self.width) {
            let line = row
                .iter()
                .map(|c| format!("{} {} {}", to_channel(c.x), to_channel(c.y), to_channel(c.z)))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }

    /// Write the canvas to `path` as ASCII PPM. A file that cannot be created
    /// is reported and nothing is written.
    pub fn write_ppm<P: AsRef<Path>>(&self, path: P) -> Result<(), CanvasError> {
        let path = path.as_ref();
        let io_error = |source: std::io::Error| {
            error!("Error writing PPM file '{}': {}", path.display(), source);
            CanvasError::Io {
                path: path.to_path_buf(),
                source,
            }
        };

        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        self.write_ppm_to(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(io_error)?;

        info!("PPM file '{}' created successfully", path.display());
        Ok(())
    }
}

fn to_channel(component: f32) -> i32 {
    ((component * 255.0) as i32).clamp(0, 255)
}

impl PixelSink for Canvas {
    fn rows(&self) -> Range<usize> {
        0..self.height
    }

    fn width(&self) -> usize {
        self.width
    }

    fn put_pixel(&mut self, x: i64, y: i64, depth: f32, color: &Color) {
        Canvas::put_pixel(self, x, y, depth, color);
    }
}

/// A mutable view over a contiguous range of canvas rows.
///
/// Bands from one [`Canvas::bands_mut`] call never overlap, so they can be
/// filled from different threads.
pub struct RowBand<'a> {
    first_row: usize,
    width: usize,
    pixels: &'a mut [Color],
    depth: &'a mut [Option<f32>],
}

impl PixelSink for RowBand<'_> {
    fn rows(&self) -> Range<usize> {
        self.first_row..self.first_row + self.pixels.len() / self.width
    }

    fn width(&self) -> usize {
        self.width
    }

    fn put_pixel(&mut self, x: i64, y: i64, depth: f32, color: &Color) {
        if let Some(index) = cell_index(x, y, &self.rows(), self.width) {
            depth_test_write(&mut self.pixels[index], &mut self.depth[index], depth, color);
        }
    }
}
