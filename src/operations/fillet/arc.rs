use std::f64::consts::PI;

use crate::error::{FilletError, FilletResult, Result};
use crate::geometry::curve::Arc;
use crate::math::transform::{transform_direction, transform_normal, transform_point, uniform_scale};
use crate::math::{any_perpendicular, Matrix4, Point3, Tolerance, Vector3};

/// The arc joining two filleted curves.
///
/// Sweeps `sweep` radians counter-clockwise about `normal`, starting at
/// `center + radius * ref_dir`. A zero radius gives a degenerate arc that
/// stands for the intersection point of the two curves.
#[derive(Debug, Clone, PartialEq)]
pub struct FilletArc {
    center: Point3,
    normal: Vector3,
    ref_dir: Vector3,
    radius: f64,
    sweep: f64,
}

impl FilletArc {
    /// A zero-radius arc at `center`.
    #[must_use]
    pub fn degenerate(center: Point3, normal: Vector3) -> Self {
        Self {
            center,
            normal,
            ref_dir: any_perpendicular(&normal),
            radius: 0.0,
            sweep: 0.0,
        }
    }

    /// Arc of `radius` about `center` between two tangency points.
    ///
    /// The sweep is the non-reflex angle between the two radii. When the
    /// radii are opposite, `curve1_dir` decides the half turn: it is curve
    /// 1's direction at its tangency point, pointing along the part of the
    /// curve that is kept, and the arc bulges away from it.
    pub(crate) fn between(
        center: Point3,
        normal: Vector3,
        radius: f64,
        tangency: [Point3; 2],
        curve1_dir: Vector3,
        tol: &Tolerance,
    ) -> FilletResult<Self> {
        let vec0 = tangency[0] - center;
        let vec1 = tangency[1] - center;
        let cross = vec0.cross(&vec1);

        let (ref_vec, sweep) = if cross.norm() <= tol.equal_point * vec0.norm() * vec1.norm()
            && vec0.dot(&vec1) < 0.0
        {
            let w = normal.cross(&curve1_dir);
            let start = if w.dot(&vec1) > 0.0 { vec1 } else { vec0 };
            (start, PI)
        } else if cross.dot(&normal) > 0.0 {
            (vec0, vec0.angle(&vec1))
        } else {
            (vec1, vec0.angle(&vec1))
        };

        let in_plane = ref_vec - normal * ref_vec.dot(&normal);
        let ref_dir = in_plane.try_normalize(tol.equal_vector).ok_or_else(|| {
            FilletError::InvalidGeometry("tangency point coincides with the fillet center".into())
        })?;
        Ok(Self {
            center,
            normal,
            ref_dir,
            radius,
            sweep,
        })
    }

    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Direction from the center to the start point.
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Angular span in radians, in `[0, π]`.
    #[must_use]
    pub fn sweep(&self) -> f64 {
        self.sweep
    }

    /// Returns whether this is a point rather than a drawable arc.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.radius <= 0.0 || self.sweep <= 0.0
    }

    /// Point at `angle` radians from the start.
    #[must_use]
    pub fn point_at(&self, angle: f64) -> Point3 {
        let binormal = self.normal.cross(&self.ref_dir);
        self.center + (self.ref_dir * angle.cos() + binormal * angle.sin()) * self.radius
    }

    #[must_use]
    pub fn start_point(&self) -> Point3 {
        self.point_at(0.0)
    }

    #[must_use]
    pub fn end_point(&self) -> Point3 {
        self.point_at(self.sweep)
    }

    /// The drawable arc.
    ///
    /// # Errors
    ///
    /// Returns an error if the fillet is degenerate.
    pub fn to_arc(&self) -> Result<Arc> {
        Arc::new(self.center, self.radius, self.normal, self.ref_dir, 0.0, self.sweep)
    }

    /// Compares two fillets by their defining points within `tol`.
    #[must_use]
    pub fn is_equal_to(&self, other: &Self, tol: &Tolerance) -> bool {
        tol.points_equal(&self.center, &other.center)
            && (self.radius - other.radius).abs() <= tol.equal_point
            && tol.points_equal(&self.start_point(), &other.start_point())
            && tol.points_equal(&self.end_point(), &other.end_point())
    }

    /// Returns whether `arc` draws this fillet, in either direction.
    #[must_use]
    pub fn matches_arc(&self, arc: &Arc, tol: &Tolerance) -> bool {
        use crate::geometry::curve::Curve;

        let (Some(start), Some(end)) = (arc.start_point(), arc.end_point()) else {
            return false;
        };
        let ends = [self.start_point(), self.end_point()];
        let same = |a: &Point3, b: &Point3| tol.points_equal(a, b);
        tol.points_equal(&self.center, arc.center())
            && (self.radius - arc.radius()).abs() <= tol.equal_point
            && ((same(&ends[0], &start) && same(&ends[1], &end))
                || (same(&ends[0], &end) && same(&ends[1], &start)))
    }

    /// Applies a similarity transform. The normal maps like a curve normal,
    /// so the image of the start point stays the start under mirrors too.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform is not a similarity.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        let scale = uniform_scale(matrix)
            .ok_or(crate::error::GeometryError::NonUniformScale)?;
        let normal = transform_normal(matrix, &self.normal) / scale;
        let ref_dir = transform_direction(matrix, &self.ref_dir)
            .try_normalize(f64::MIN_POSITIVE)
            .unwrap_or_else(|| any_perpendicular(&normal));
        Ok(Self {
            center: transform_point(matrix, &self.center),
            normal,
            ref_dir,
            radius: self.radius * scale,
            sweep: self.sweep,
        })
    }
}
