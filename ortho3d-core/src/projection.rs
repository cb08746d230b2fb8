//! Orthographic camera basis and screen-space helpers
use nalgebra::{Vector2, Vector3};
use rand::Rng;

use crate::linalg::{dot, norm, orthonormal_basis, orthonormal_basis_with_rng};

/// Camera orientation: the viewing normal plus two in-plane screen axes.
///
/// `ortho1` is the row axis of the canvas and `ortho2` the column axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAxis {
    pub normal: Vector3<f32>,
    pub ortho1: Vector3<f32>,
    pub ortho2: Vector3<f32>,
}

impl CameraAxis {
    /// Build the basis for a viewing direction. Returns `None` for a zero or
    /// non-finite vector.
    pub fn from_normal(normal: &Vector3<f32>) -> Option<Self> {
        let normal = unit(normal)?;
        let (ortho1, ortho2) = orthonormal_basis(&normal);
        Some(Self {
            normal,
            ortho1,
            ortho2,
        })
    }

    /// Like [`CameraAxis::from_normal`], with the screen axes picked by random
    /// draws from `rng`.
    pub fn from_normal_with_rng<R: Rng + ?Sized>(normal: &Vector3<f32>, rng: &mut R) -> Option<Self> {
        let normal = unit(normal)?;
        let (ortho1, ortho2) = orthonormal_basis_with_rng(&normal, rng);
        Some(Self {
            normal,
            ortho1,
            ortho2,
        })
    }

    /// Screen coordinates (row, column) of a world point
    pub fn to_screen(&self, point: &Vector3<f32>) -> Vector2<f32> {
        Vector2::new(dot(point, &self.ortho1), dot(point, &self.ortho2))
    }

    /// Signed distance along the viewing normal; smaller is nearer
    pub fn depth_of(&self, point: &Vector3<f32>) -> f32 {
        dot(point, &self.normal)
    }
}

fn unit(v: &Vector3<f32>) -> Option<Vector3<f32>> {
    let magnitude = norm(v);
    if magnitude == 0.0 || !magnitude.is_finite() {
        return None;
    }
    Some(v / magnitude)
}

/// Project a point onto the plane through the origin orthogonal to `normal`
pub fn project_point_to_plane(point: &Vector3<f32>, normal: &Vector3<f32>) -> Vector3<f32> {
    point - normal * dot(point, normal)
}

/// Barycentric weights `(u, v)` of `p` with respect to the triangle `a, b, c`,
/// such that `p = a + u * (b - a) + v * (c - a)`.
///
/// Returns `None` when the triangle is degenerate (zero determinant).
pub fn barycentric(
    p: &Vector2<f32>,
    a: &Vector2<f32>,
    b: &Vector2<f32>,
    c: &Vector2<f32>,
) -> Option<(f32, f32)> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let det = ab.x * ac.y - ab.y * ac.x;
    if det == 0.0 {
        return None;
    }

    // Cramer's rule
    let u = (ac.y * ap.x - ac.x * ap.y) / det;
    let v = (ab.x * ap.y - ab.y * ap.x) / det;
    Some((u, v))
}

/// Closed-triangle test on barycentric weights (edges and vertices count)
pub fn is_inside(u: f32, v: f32) -> bool {
    u >= 0.0 && v >= 0.0 && u + v <= 1.0
}
