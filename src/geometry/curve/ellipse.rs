use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::transform::{transform_direction, transform_normal, transform_point, uniform_scale};
use crate::math::{Matrix4, Point3, Tolerance, Vector3};

use super::{conic_frame, positive_length, Curve, CurveDomain};

/// Elliptical arc parameterized by its eccentric angle.
///
/// `P(t) = center + a cos(t) major + b sin(t) (normal × major)`, turning
/// counter-clockwise about `normal` like [`Arc`](super::Arc). The axes are
/// not ordered: `a < b` is allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    center: Point3,
    semi_major: f64,
    semi_minor: f64,
    normal: Vector3,
    major_dir: Vector3,
    start_angle: f64,
    end_angle: f64,
}

impl Ellipse {
    /// Builds the arc of the ellipse with semi-axes `a` along `major_dir` and
    /// `b` across it, swept from `start_angle` to `end_angle`.
    ///
    /// # Errors
    ///
    /// Fails for a non-positive semi-axis, a zero `normal` or `major_dir`, or
    /// a `major_dir` outside the plane.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        center: Point3,
        a: f64,
        b: f64,
        normal: Vector3,
        major_dir: Vector3,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<Self> {
        let (normal, major_dir) = conic_frame(normal, major_dir)?;
        Ok(Self {
            center,
            semi_major: positive_length(a, "semi-axis")?,
            semi_minor: positive_length(b, "semi-axis")?,
            normal,
            major_dir,
            start_angle,
            end_angle,
        })
    }

    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Semi-axis along [`Ellipse::major_dir`].
    #[must_use]
    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    #[must_use]
    pub fn semi_minor(&self) -> f64 {
        self.semi_minor
    }

    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Direction of the point at angle zero.
    #[must_use]
    pub fn major_dir(&self) -> &Vector3 {
        &self.major_dir
    }

    fn axes(&self) -> (Vector3, Vector3) {
        (
            self.major_dir * self.semi_major,
            self.normal.cross(&self.major_dir) * self.semi_minor,
        )
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.end_angle - self.start_angle >= TAU - 1e-12
    }

    /// The whole ellipse over `[0, 2π]`.
    #[must_use]
    pub fn full_ellipse(&self) -> Self {
        Self {
            start_angle: 0.0,
            end_angle: TAU,
            ..self.clone()
        }
    }

    pub fn set_domain(&mut self, domain: CurveDomain) {
        self.start_angle = domain.t_min;
        self.end_angle = domain.t_max;
    }

    /// Applies a similarity transform. Eccentric angles carry over unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform is not a similarity.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        let scale = uniform_scale(matrix).ok_or(GeometryError::NonUniformScale)?;
        Self::new(
            transform_point(matrix, &self.center),
            self.semi_major * scale,
            self.semi_minor * scale,
            transform_normal(matrix, &self.normal),
            transform_direction(matrix, &self.major_dir),
            self.start_angle,
            self.end_angle,
        )
    }
}

impl Curve for Ellipse {
    fn evaluate(&self, t: f64) -> Point3 {
        let (u, v) = self.axes();
        self.center + u * t.cos() + v * t.sin()
    }

    fn derivative(&self, t: f64) -> Vector3 {
        let (u, v) = self.axes();
        v * t.cos() - u * t.sin()
    }

    fn second_derivative(&self, t: f64) -> Vector3 {
        let (u, v) = self.axes();
        -(u * t.cos() + v * t.sin())
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
        self.semi_major.max(self.semi_minor) * (self.end_angle - self.start_angle) <= tol.equal_point
    }
}
