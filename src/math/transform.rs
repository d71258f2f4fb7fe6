use super::{Matrix4, Point3, Vector3};

/// Builds a rigid local-to-world matrix from an orthonormal basis and origin.
///
/// Local x maps to `u`, local y to `v`, local z to `n`.
#[must_use]
pub fn frame(origin: &Point3, u: &Vector3, v: &Vector3, n: &Vector3) -> Matrix4 {
    Matrix4::from_columns(&[
        u.push(0.0),
        v.push(0.0),
        n.push(0.0),
        origin.coords.push(1.0),
    ])
}

/// Transforms a point by a 4x4 matrix (homogeneous coordinates).
#[must_use]
pub fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let v = matrix * nalgebra::Vector4::new(point.x, point.y, point.z, 1.0);
    Point3::new(v.x, v.y, v.z)
}

/// Inverse of a rigid frame built by [`frame`] (transpose rotation, negate translation).
#[must_use]
pub fn rigid_inverse(matrix: &Matrix4) -> Matrix4 {
    let rot = matrix.fixed_view::<3, 3>(0, 0).transpose();
    let t = matrix.fixed_view::<3, 1>(0, 3).into_owned();
    let inv_t = -(rot * t);
    let mut out = Matrix4::identity();
    out.fixed_view_mut::<3, 3>(0, 0).copy_from(&rot);
    out.fixed_view_mut::<3, 1>(0, 3).copy_from(&inv_t);
    out
}

/// Returns the local axis `column` (0 = x, 1 = y, 2 = z) of a frame in world space.
#[must_use]
pub fn axis(matrix: &Matrix4, column: usize) -> Vector3 {
    Vector3::new(matrix[(0, column)], matrix[(1, column)], matrix[(2, column)])
}
