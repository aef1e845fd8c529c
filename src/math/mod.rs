pub mod solve;
pub mod transform;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Construction-time validity threshold for curve definitions.
pub const TOLERANCE: f64 = 1e-10;

/// Explicit tolerance context for geometric predicates.
///
/// `equal_point` is a distance: two points closer than this are equal, and a
/// vector shorter than it has zero length. `equal_vector` bounds the sine of
/// the angle between two directions considered parallel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub equal_point: f64,
    pub equal_vector: f64,
}

impl Default for Tolerance {
    /// Relaxed tolerances used while resolving fillets.
    fn default() -> Self {
        Self {
            equal_point: 1e-6,
            equal_vector: 1e-10,
        }
    }
}

impl Tolerance {
    /// Creates a tolerance context.
    #[must_use]
    pub fn new(equal_point: f64, equal_vector: f64) -> Self {
        Self {
            equal_point,
            equal_vector,
        }
    }

    /// Returns whether two points coincide.
    #[must_use]
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() <= self.equal_point
    }

    /// Returns whether a vector is too short to carry a direction.
    #[must_use]
    pub fn is_zero_length(&self, v: &Vector3) -> bool {
        v.norm() <= self.equal_point
    }

    /// Returns whether two vectors are parallel or anti-parallel.
    ///
    /// Zero-length vectors are parallel to everything.
    #[must_use]
    pub fn is_parallel(&self, a: &Vector3, b: &Vector3) -> bool {
        let la = a.norm();
        let lb = b.norm();
        if la <= f64::EPSILON || lb <= f64::EPSILON {
            return true;
        }
        a.cross(b).norm() / (la * lb) <= self.equal_vector
    }
}

/// Returns a unit vector perpendicular to `normal`.
#[must_use]
pub fn any_perpendicular(normal: &Vector3) -> Vector3 {
    let reference = if normal.x.abs() < 0.9 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };
    normal.cross(&reference).normalize()
}
