use super::{Matrix4, Point3, Vector3};

/// Transforms a point by a 4x4 matrix (homogeneous coordinates).
#[must_use]
pub fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let v = matrix * nalgebra::Vector4::new(point.x, point.y, point.z, 1.0);
    Point3::new(v.x, v.y, v.z)
}

/// Transforms a direction vector by a 4x4 matrix (ignoring translation).
#[must_use]
pub fn transform_direction(matrix: &Matrix4, dir: &Vector3) -> Vector3 {
    let v = matrix * nalgebra::Vector4::new(dir.x, dir.y, dir.z, 0.0);
    Vector3::new(v.x, v.y, v.z)
}

/// Returns the linear (upper-left 3x3) part of a transform.
fn linear_part(matrix: &Matrix4) -> nalgebra::Matrix3<f64> {
    matrix.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Returns whether the transform reverses orientation (negative determinant).
#[must_use]
pub fn is_mirroring(matrix: &Matrix4) -> bool {
    linear_part(matrix).determinant() < 0.0
}

/// Returns the scale factor of a similarity transform, or `None` when the
/// linear part distorts angles.
#[must_use]
pub fn uniform_scale(matrix: &Matrix4) -> Option<f64> {
    let linear = linear_part(matrix);
    let cols = [linear.column(0), linear.column(1), linear.column(2)];
    let scale = cols[0].norm();
    if scale < super::TOLERANCE {
        return None;
    }
    let rel = 1e-9 * scale * scale;
    let lengths_match = cols
        .iter()
        .all(|c| (c.norm() - scale).abs() <= 1e-9 * scale);
    let orthogonal = cols[0].dot(&cols[1]).abs() <= rel
        && cols[1].dot(&cols[2]).abs() <= rel
        && cols[0].dot(&cols[2]).abs() <= rel;
    (lengths_match && orthogonal).then_some(scale)
}

/// Transforms an axial vector such as a plane normal.
///
/// Reflections reverse the handedness of the frame, so the image of a normal
/// is negated to keep `normal = x_axis × y_axis` for transformed axes.
#[must_use]
pub fn transform_normal(matrix: &Matrix4, normal: &Vector3) -> Vector3 {
    let mapped = transform_direction(matrix, normal);
    if is_mirroring(matrix) {
        -mapped
    } else {
        mapped
    }
}

/// Builds a reflection through the plane with the given point and normal.
#[must_use]
pub fn mirror_matrix(point: &Point3, normal: &Vector3) -> Matrix4 {
    let n = normal.normalize();
    let linear = nalgebra::Matrix3::identity() - 2.0 * n * n.transpose();
    let offset = point.coords - linear * point.coords;
    let mut m = linear.to_homogeneous();
    m[(0, 3)] = offset.x;
    m[(1, 3)] = offset.y;
    m[(2, 3)] = offset.z;
    m
}
