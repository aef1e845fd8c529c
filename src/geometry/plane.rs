use crate::error::{GeometryError, Result};
use crate::math::{any_perpendicular, Point2, Point3, Tolerance, Vector2, Vector3, TOLERANCE};

/// Unbounded plane with an orthonormal in-plane frame.
///
/// `u_dir × v_dir = normal`, so local coordinates keep the turning sense
/// seen from the normal's side.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Plane through `origin` facing `normal`, with an arbitrary in-plane
    /// frame.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] for a zero normal.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let normal = normal
            .try_normalize(TOLERANCE)
            .ok_or(GeometryError::ZeroVector)?;
        let u_dir = any_perpendicular(&normal);
        Ok(Self {
            origin,
            u_dir,
            v_dir: normal.cross(&u_dir),
            normal,
        })
    }

    /// Least-squares plane through `points`.
    ///
    /// Returns `None` when the points are coincident or collinear, or when
    /// they deviate from their best plane by more than `tol.equal_point`.
    #[must_use]
    pub fn fit(points: &[Point3], tol: &Tolerance) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let count = points.len() as f64;
        let centroid = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / count;
        let covariance = points.iter().fold(nalgebra::Matrix3::zeros(), |acc, p| {
            let d = p.coords - centroid;
            acc + d * d.transpose()
        }) / count;

        let eigen = covariance.symmetric_eigen();
        let mut order = [0usize, 1, 2];
        order.sort_by(|a, b| eigen.eigenvalues[*a].total_cmp(&eigen.eigenvalues[*b]));
        let [smallest, middle, _] = order;

        let spread = tol.equal_point * tol.equal_point;
        if eigen.eigenvalues[middle] <= spread || eigen.eigenvalues[smallest] > spread {
            return None;
        }
        let normal: Vector3 = eigen.eigenvectors.column(smallest).into_owned();
        Self::from_normal(Point3::from(centroid), normal).ok()
    }

    /// Unit normal.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// In-plane coordinates of the projection of `point`.
    #[must_use]
    pub fn to_local(&self, point: &Point3) -> Point2 {
        let d = point - self.origin;
        Point2::new(d.dot(&self.u_dir), d.dot(&self.v_dir))
    }

    /// In-plane components of a direction.
    #[must_use]
    pub fn to_local_dir(&self, dir: &Vector3) -> Vector2 {
        Vector2::new(dir.dot(&self.u_dir), dir.dot(&self.v_dir))
    }

    /// Point at in-plane coordinates `(u, v)`.
    #[must_use]
    pub fn point_at(&self, local: &Point2) -> Point3 {
        self.origin + self.u_dir * local.x + self.v_dir * local.y
    }
}
