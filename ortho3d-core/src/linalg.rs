//! Small vector routines used by the camera and the rasterizer
use std::cmp::Ordering;

use nalgebra::Vector3;
use rand::Rng;

use crate::projection::CameraAxis;

/// Dot product of two 3-vectors
pub fn dot(u: &Vector3<f32>, v: &Vector3<f32>) -> f32 {
    u.x * v.x + u.y * v.y + u.z * v.z
}

/// Euclidean length
pub fn norm(v: &Vector3<f32>) -> f32 {
    dot(v, v).sqrt()
}

/// Determinant of the 3x3 matrix whose rows are `v1`, `v2`, `v3`.
///
/// Zero means the three vectors are linearly dependent.
pub fn determinant3x3(v1: &Vector3<f32>, v2: &Vector3<f32>, v3: &Vector3<f32>) -> f32 {
    v1.x * (v2.y * v3.z - v2.z * v3.y) - v1.y * (v2.x * v3.z - v2.z * v3.x)
        + v1.z * (v2.x * v3.y - v2.y * v3.x)
}

/// Orders vectors by x, then y, then z
pub fn lexicographic_cmp(u: &Vector3<f32>, v: &Vector3<f32>) -> Ordering {
    u.x.partial_cmp(&v.x)
        .unwrap_or(Ordering::Equal)
        .then(u.y.partial_cmp(&v.y).unwrap_or(Ordering::Equal))
        .then(u.z.partial_cmp(&v.z).unwrap_or(Ordering::Equal))
}

fn standard_basis(index: usize) -> Vector3<f32> {
    match index {
        0 => Vector3::x(),
        1 => Vector3::y(),
        _ => Vector3::z(),
    }
}

/// Two unit vectors orthogonal to the unit vector `n` and to each other.
///
/// The candidates are the two standard basis vectors least aligned with `n`,
/// so the result only depends on `n`. The pair is returned in lexicographic
/// order.
pub fn orthonormal_basis(n: &Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let mut order = [0usize, 1, 2];
    // Stable sort keeps index order on ties.
    order.sort_by(|&i, &j| n[i].abs().partial_cmp(&n[j].abs()).unwrap_or(Ordering::Equal));
    let (first, second) = if order[0] < order[1] {
        (order[0], order[1])
    } else {
        (order[1], order[0])
    };

    let v2 = standard_basis(first);
    let v3 = standard_basis(second);
    debug_assert!(determinant3x3(n, &v2, &v3) != 0.0);

    gram_schmidt(n, v2, v3)
}

/// Same contract as [`orthonormal_basis`], but the candidates are drawn at
/// random from the standard basis until they span a space with `n`.
///
/// `n` must be non-zero, otherwise no draw ever succeeds.
pub fn orthonormal_basis_with_rng<R: Rng + ?Sized>(
    n: &Vector3<f32>,
    rng: &mut R,
) -> (Vector3<f32>, Vector3<f32>) {
    loop {
        let v2 = standard_basis(rng.gen_range(0..3));
        let v3 = standard_basis(rng.gen_range(0..3));

        if determinant3x3(n, &v2, &v3) != 0.0 {
            return gram_schmidt(n, v2, v3);
        }
    }
}

fn gram_schmidt(
    n: &Vector3<f32>,
    mut v2: Vector3<f32>,
    mut v3: Vector3<f32>,
) -> (Vector3<f32>, Vector3<f32>) {
    v2 -= n * dot(n, &v2);
    v2 /= norm(&v2);

    v3 -= n * dot(n, &v3) + v2 * dot(&v2, &v3);
    v3 /= norm(&v3);

    if lexicographic_cmp(&v3, &v2) == Ordering::Less {
        (v3, v2)
    } else {
        (v2, v3)
    }
}

/// Screen-space bounds of a triangle along the two in-plane camera axes.
///
/// Returns `((min1, max1), (min2, max2))` where the first interval is measured
/// along `axis.ortho1` and the second along `axis.ortho2`.
pub fn dot_product_extremes(
    pa: &Vector3<f32>,
    pb: &Vector3<f32>,
    pc: &Vector3<f32>,
    axis: &CameraAxis,
) -> ((f32, f32), (f32, f32)) {
    let extent = |direction: &Vector3<f32>| {
        let (a, b, c) = (dot(pa, direction), dot(pb, direction), dot(pc, direction));
        (a.min(b).min(c), a.max(b).max(c))
    };

    (extent(&axis.ortho1), extent(&axis.ortho2))
}
