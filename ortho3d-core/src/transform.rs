//! Rigid and scaling transformations applied to vertices in place
use nalgebra::{Matrix3, Rotation3, Vector3};

/// Coordinate axis to rotate around
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Transform builder for vertex transformations
pub struct Transform;

impl Transform {
    /// Right-handed rotation matrix about a coordinate axis, angle in degrees
    pub fn rotation_matrix(axis: Axis, degrees: f32) -> Matrix3<f32> {
        let unit = match axis {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        };
        Rotation3::from_axis_angle(&unit, degrees.to_radians()).into_inner()
    }

    /// Rotate `point` by `rotation` about `pivot`
    pub fn rotate_about(point: &mut Vector3<f32>, rotation: &Matrix3<f32>, pivot: &Vector3<f32>) {
        *point = rotation * (*point - pivot) + pivot;
    }

    /// Scale about the world origin
    pub fn scale(point: &mut Vector3<f32>, k: f32) {
        *point *= k;
    }

    pub fn translate(point: &mut Vector3<f32>, offset: &Vector3<f32>) {
        *point += offset;
    }
}
