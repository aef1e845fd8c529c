use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::transform::{transform_direction, transform_normal, transform_point, uniform_scale};
use crate::math::{Matrix4, Point3, Tolerance, Vector3, TOLERANCE};

use super::{conic_frame, positive_length, Curve, CurveDomain};

/// Circular arc swept counter-clockwise about `normal`.
///
/// The parameter is the angle from `ref_dir`, so `P(t)` lies at
/// `center + radius (cos t ref_dir + sin t (normal × ref_dir))` and the arc
/// covers `[start_angle, end_angle]`. A full turn makes a circle.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    center: Point3,
    radius: f64,
    normal: Vector3,
    ref_dir: Vector3,
    start_angle: f64,
    end_angle: f64,
}

impl Arc {
    /// Builds the arc from `start_angle` to `end_angle`.
    ///
    /// # Errors
    ///
    /// Fails for a non-positive radius, a zero `normal` or `ref_dir`, or a
    /// `ref_dir` outside the plane.
    pub fn new(
        center: Point3,
        radius: f64,
        normal: Vector3,
        ref_dir: Vector3,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        let (normal, ref_dir) = conic_frame(normal, ref_dir)?;
        Ok(Self {
            center,
            radius: positive_length(radius, "arc radius")?,
            normal,
            ref_dir,
            start_angle,
            end_angle,
        })
    }

    /// Full circle over `[0, 2π]`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Arc::new`].
    pub fn circle(center: Point3, radius: f64, normal: Vector3, ref_dir: Vector3) -> Result<Self> {
        Self::new(center, radius, normal, ref_dir, 0.0, TAU)
    }

    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Axis the arc turns about.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Direction of the point at angle zero.
    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    fn binormal(&self) -> Vector3 {
        self.normal.cross(&self.ref_dir)
    }

    /// Returns whether the arc sweeps a full turn.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.end_angle - self.start_angle >= TAU - 1e-12
    }

    /// Angle of `point` around the axis, in `[start_angle, start_angle + 2π)`.
    ///
    /// A point on the axis maps to `start_angle`.
    #[must_use]
    pub fn angle_of(&self, point: &Point3) -> f64 {
        let v = point - self.center;
        let x = v.dot(&self.ref_dir);
        let y = v.dot(&self.binormal());
        if x.hypot(y) < TOLERANCE {
            return self.start_angle;
        }
        wrap_from(y.atan2(x), self.start_angle)
    }

    /// The full circle carrying this arc, parameterized over `[0, 2π]`.
    #[must_use]
    pub fn full_circle(&self) -> Self {
        Self {
            start_angle: 0.0,
            end_angle: TAU,
            ..self.clone()
        }
    }

    /// Same arc with a different radius.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive.
    pub fn with_radius(&self, radius: f64) -> Result<Self> {
        Ok(Self {
            radius: positive_length(radius, "arc radius")?,
            ..self.clone()
        })
    }

    /// Replaces the angular interval.
    pub fn set_domain(&mut self, domain: CurveDomain) {
        self.start_angle = domain.t_min;
        self.end_angle = domain.t_max;
    }

    /// Applies a similarity transform. Angles are preserved, so parameters on
    /// the transformed arc match the original.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform is not a similarity.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        let scale = uniform_scale(matrix).ok_or(GeometryError::NonUniformScale)?;
        Self::new(
            transform_point(matrix, &self.center),
            self.radius * scale,
            transform_normal(matrix, &self.normal),
            transform_direction(matrix, &self.ref_dir),
            self.start_angle,
            self.end_angle,
        )
    }
}

/// Maps `angle` into `[base, base + 2π)`.
pub(crate) fn wrap_from(angle: f64, base: f64) -> f64 {
    let wrapped = base + (angle - base).rem_euclid(TAU);
    if wrapped >= base + TAU {
        base
    } else {
        wrapped
    }
}

impl Curve for Arc {
    fn evaluate(&self, t: f64) -> Point3 {
        let binormal = self.binormal();
        let x = self.radius * t.cos();
        let y = self.radius * t.sin();
        self.center + self.ref_dir * x + binormal * y
    }

    fn derivative(&self, t: f64) -> Vector3 {
        let binormal = self.binormal();
        let dx = -self.radius * t.sin();
        let dy = self.radius * t.cos();
        self.ref_dir * dx + binormal * dy
    }

    fn second_derivative(&self, t: f64) -> Vector3 {
        let binormal = self.binormal();
        -(self.ref_dir * (self.radius * t.cos()) + binormal * (self.radius * t.sin()))
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(self.start_angle, self.end_angle)
    }

    fn period(&self) -> Option<f64> {
        Some(TAU)
    }

    fn is_closed(&self, _tol: &Tolerance) -> bool {
        self.is_full()
    }

    fn is_degenerate(&self, tol: &Tolerance) -> bool {
        self.radius * (self.end_angle - self.start_angle) <= tol.equal_point
    }
}
