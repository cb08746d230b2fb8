//! Flat-colored triangles and their rasterization
use nalgebra::{Vector2, Vector3};

use crate::canvas::{Canvas, Color, PixelSink};
use crate::error::RenderError;
use crate::linalg::dot_product_extremes;
use crate::projection::{barycentric, is_inside, project_point_to_plane, CameraAxis};
use crate::transform::{Axis, Transform};

/// A triangle in world space with a single flat color.
///
/// World units map 1:1 to canvas pixels along the camera's screen axes.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleSurface {
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
    color: Color,
}

impl TriangleSurface {
    /// Vertices and color are stored as given; degenerate triangles are allowed
    /// and simply cover no pixels.
    pub fn new(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>, color: Color) -> Self {
        Self { a, b, c, color }
    }

    pub fn a(&self) -> &Vector3<f32> {
        &self.a
    }

    pub fn b(&self) -> &Vector3<f32> {
        &self.b
    }

    pub fn c(&self) -> &Vector3<f32> {
        &self.c
    }

    pub fn vertices(&self) -> [Vector3<f32>; 3] {
        [self.a, self.b, self.c]
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn centroid(&self) -> Vector3<f32> {
        (self.a + self.b + self.c) / 3.0
    }

    /// Draw the triangle into `canvas` using the canvas camera
    pub fn project(&self, canvas: &mut Canvas) -> Result<(), RenderError> {
        let axis = canvas.camera_axis().ok_or(RenderError::CameraNotSet)?;
        self.rasterize(&axis, canvas);
        Ok(())
    }

    /// Orthographic rasterization into any pixel sink.
    ///
    /// Every integer pixel inside the triangle's screen-space bounding box
    /// (clipped to the sink) is tested against the projected triangle. Covered
    /// pixels get the depth of the matching point on the original triangle.
    pub fn rasterize<S: PixelSink + ?Sized>(&self, axis: &CameraAxis, sink: &mut S) {
        let projected_a = project_point_to_plane(&self.a, &axis.normal);
        let projected_b = project_point_to_plane(&self.b, &axis.normal);
        let projected_c = project_point_to_plane(&self.c, &axis.normal);

        let ((min_i, max_i), (min_j, max_j)) =
            dot_product_extremes(&projected_a, &projected_b, &projected_c, axis);

        let rows = sink.rows();
        let (Some(i_range), Some(j_range)) = (
            clip(min_i, max_i, rows.start, rows.end),
            clip(min_j, max_j, 0, sink.width()),
        ) else {
            return;
        };

        let screen_a = axis.to_screen(&projected_a);
        let screen_b = axis.to_screen(&projected_b);
        let screen_c = axis.to_screen(&projected_c);

        for i in i_range.0..=i_range.1 {
            for j in j_range.0..=j_range.1 {
                let point = Vector2::new(i as f32, j as f32);
                let Some((u, v)) = barycentric(&point, &screen_a, &screen_b, &screen_c) else {
                    // Collinear on screen: the triangle covers nothing.
                    return;
                };
                if !is_inside(u, v) {
                    continue;
                }

                let surface_point = self.a + (self.b - self.a) * u + (self.c - self.a) * v;
                sink.put_pixel(i, j, axis.depth_of(&surface_point), &self.color);
            }
        }
    }

    /// Rotate all vertices by `degrees` around `axis` through `pivot`
    pub fn rotate_around(&mut self, axis: Axis, degrees: f32, pivot: &Vector3<f32>) {
        let rotation = Transform::rotation_matrix(axis, degrees);
        for vertex in [&mut self.a, &mut self.b, &mut self.c] {
            Transform::rotate_about(vertex, &rotation, pivot);
        }
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

    /// Rotate around `axis` through the triangle's own centroid
    pub fn rotate_around_centroid(&mut self, axis: Axis, degrees: f32) {
        let pivot = self.centroid();
        self.rotate_around(axis, degrees, &pivot);
    }

    /// Scale about the world origin, not the centroid
    pub fn scale(&mut self, k: f32) {
        for vertex in [&mut self.a, &mut self.b, &mut self.c] {
            Transform::scale(vertex, k);
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        let offset = Vector3::new(dx, dy, dz);
        for vertex in [&mut self.a, &mut self.b, &mut self.c] {
            Transform::translate(vertex, &offset);
        }
    }
}

/// Integer pixel range covering `[min, max]`, clipped to `[lo, hi)`
fn clip(min: f32, max: f32, lo: usize, hi: usize) -> Option<(i64, i64)> {
    if !(min.is_finite() && max.is_finite()) || hi <= lo {
        return None;
    }
    let start = (min.floor() as i64).max(lo as i64);
    let end = (max.ceil() as i64).min(hi as i64 - 1);
    (start <= end).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn red() -> Color {
        Color::new(1.0, 0.0, 0.0)
    }

    fn sample() -> TriangleSurface {
        TriangleSurface::new(
            Vector3::new(200.0, 200.0, 300.0),
            Vector3::new(300.0, 200.0, 300.0),
            Vector3::new(300.0, 300.0, 300.0),
            red(),
        )
    }

    fn assert_same_vertices(left: &TriangleSurface, right: &TriangleSurface, epsilon: f32) {
        for (l, r) in left.vertices().iter().zip(right.vertices().iter()) {
            assert_abs_diff_eq!(*l, *r, epsilon = epsilon);
        }
    }

    fn z_canvas(size: usize) -> Canvas {
        let mut canvas = Canvas::new(size, size);
        canvas.set_camera_normal(Vector3::z()).unwrap();
        canvas
    }

    #[test]
    fn test_project_without_camera_fails() {
        let mut canvas = Canvas::new(10, 10);
        assert_eq!(sample().project(&mut canvas), Err(RenderError::CameraNotSet));
    }

    #[test]
    fn test_project_fills_inside_only() {
        let mut canvas = z_canvas(20);
        let triangle = TriangleSurface::new(
            Vector3::new(0.0, 0.0, 5.0),
            Vector3::new(10.0, 0.0, 5.0),
            Vector3::new(0.0, 10.0, 5.0),
            red(),
        );
        triangle.project(&mut canvas).unwrap();

        // Row index follows y, column index follows x for a +z camera.
        assert_eq!(canvas.pixel(1, 1), Some(red()));
        assert_eq!(canvas.pixel(0, 0), Some(red()));
        assert_eq!(canvas.pixel(0, 10), Some(red()));
        assert_eq!(canvas.pixel(5, 5), Some(red()));
        assert_eq!(canvas.pixel(6, 5), Some(Color::zeros()));
        assert_eq!(canvas.pixel(15, 15), Some(Color::zeros()));
        assert_eq!(canvas.depth_at(1, 1), Some(5.0));
    }

    #[test]
    fn test_depth_interpolates_original_vertices() {
        let mut canvas = z_canvas(20);
        let slope = TriangleSurface::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(10.0, 0.0, 10.0),
            Vector3::new(0.0, 10.0, 0.0),
            red(),
        );
        slope.project(&mut canvas).unwrap();
        assert_abs_diff_eq!(canvas.depth_at(2, 4).unwrap(), 4.0, epsilon = 1e-4);
        assert_abs_diff_eq!(canvas.depth_at(3, 0).unwrap(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_nearer_triangle_wins() {
        let mut canvas = z_canvas(20);
        let blue = Color::new(0.0, 0.0, 1.0);
        let far = TriangleSurface::new(
            Vector3::new(0.0, 0.0, 9.0),
            Vector3::new(15.0, 0.0, 9.0),
            Vector3::new(0.0, 15.0, 9.0),
            red(),
        );
        let near = TriangleSurface::new(
            Vector3::new(0.0, 0.0, 2.0),
            Vector3::new(8.0, 0.0, 2.0),
            Vector3::new(0.0, 8.0, 2.0),
            blue,
        );
        near.project(&mut canvas).unwrap();
        far.project(&mut canvas).unwrap();

        assert_eq!(canvas.pixel(2, 2), Some(blue));
        assert_eq!(canvas.pixel(10, 2), Some(red()));
    }

    #[test]
    fn test_degenerate_triangle_draws_nothing() {
        let mut canvas = z_canvas(20);
        let line = TriangleSurface::new(
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(5.0, 5.0, 1.0),
            Vector3::new(9.0, 9.0, 1.0),
            red(),
        );
        line.project(&mut canvas).unwrap();
        for x in 0..20 {
            for y in 0..20 {
                assert_eq!(canvas.depth_at(x, y), None);
            }
        }
    }

    #[test]
    fn test_edge_on_triangle_draws_nothing() {
        let mut canvas = z_canvas(20);
        let wall = TriangleSurface::new(
            Vector3::new(2.0, 2.0, 0.0),
            Vector3::new(2.0, 2.0, 8.0),
            Vector3::new(2.0, 9.0, 4.0),
            red(),
        );
        wall.project(&mut canvas).unwrap();
        assert_eq!(canvas.depth_at(5, 2), None);
    }

    #[test]
    fn test_offscreen_triangle_is_clipped() {
        let mut canvas = z_canvas(10);
        let triangle = TriangleSurface::new(
            Vector3::new(-50.0, -50.0, 1.0),
            Vector3::new(-40.0, -50.0, 1.0),
            Vector3::new(-50.0, -40.0, 1.0),
            red(),
        );
        triangle.project(&mut canvas).unwrap();
        let covering = TriangleSurface::new(
            Vector3::new(-100.0, -100.0, 1.0),
            Vector3::new(300.0, -100.0, 1.0),
            Vector3::new(-100.0, 300.0, 1.0),
            red(),
        );
        covering.project(&mut canvas).unwrap();
        assert_eq!(canvas.pixel(0, 0), Some(red()));
        assert_eq!(canvas.pixel(9, 9), Some(red()));
    }

    #[test]
    fn test_rotate_full_turn_in_quarters() {
        let original = sample();
        let pivot = Vector3::new(250.0, 250.0, 350.0);
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let mut triangle = original.clone();
            for _ in 0..4 {
                triangle.rotate_around(axis, 90.0, &pivot);
            }
            assert_same_vertices(&triangle, &original, 1e-2);
        }
    }

    #[test]
    fn test_rotate_around_x_about_vertex() {
        let mut triangle = sample();
        let pivot = *triangle.a();
        triangle.rotate_around_x(90.0, &pivot);

        assert_abs_diff_eq!(*triangle.a(), Vector3::new(200.0, 200.0, 300.0), epsilon = 1e-2);
        assert_abs_diff_eq!(*triangle.b(), Vector3::new(300.0, 200.0, 300.0), epsilon = 1e-2);
        assert_abs_diff_eq!(*triangle.c(), Vector3::new(300.0, 200.0, 400.0), epsilon = 1e-2);
    }

    #[test]
    fn test_rotate_y_and_z() {
        let mut triangle = sample();
        let origin = Vector3::zeros();
        triangle.rotate_around_y(90.0, &origin);
        assert_abs_diff_eq!(*triangle.a(), Vector3::new(300.0, 200.0, -200.0), epsilon = 1e-2);

        let mut triangle = sample();
        triangle.rotate_around_z(90.0, &origin);
        assert_abs_diff_eq!(*triangle.a(), Vector3::new(-200.0, 200.0, 300.0), epsilon = 1e-2);
    }

    #[test]
    fn test_rotate_around_centroid_keeps_centroid() {
        let mut triangle = sample();
        let centroid = triangle.centroid();
        triangle.rotate_around_centroid(Axis::Y, 37.0);
        assert_abs_diff_eq!(triangle.centroid(), centroid, epsilon = 1e-3);
    }

    #[test]
    fn test_scale_round_trip() {
        let original = sample();
        let mut triangle = original.clone();
        triangle.scale(1.1);
        assert_abs_diff_eq!(*triangle.a(), Vector3::new(220.0, 220.0, 330.0), epsilon = 1e-3);
        triangle.scale(1.0 / 1.1);
        assert_same_vertices(&triangle, &original, 1e-3);
    }

    #[test]
    fn test_translate() {
        let mut triangle = sample();
        triangle.translate(1.0, 1.0, 1.0);
        assert_eq!(*triangle.a(), Vector3::new(201.0, 201.0, 301.0));
        assert_eq!(*triangle.c(), Vector3::new(301.0, 301.0, 301.0));
        assert_eq!(*triangle.color(), red());
    }
}
