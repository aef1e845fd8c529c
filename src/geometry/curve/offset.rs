use crate::error::{GeometryError, Result};
use crate::math::transform::{transform_normal, uniform_scale};
use crate::math::{Matrix4, Point3, Tolerance, Vector3, TOLERANCE};

use super::{Curve, CurveDomain, EdgeCurve};

/// Offset of a base curve at a signed distance to its left.
///
/// `P(t) = base(t) + distance * unit(normal × base'(t))`, so a positive
/// distance moves to the left of the base curve when looking down `normal`.
/// The parameterization is the base curve's, restricted to `domain`.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetCurve {
    base: Box<EdgeCurve>,
    distance: f64,
    normal: Vector3,
    domain: CurveDomain,
}

impl OffsetCurve {
    /// Creates an offset over the base curve's domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal is zero-length.
    pub fn new(base: EdgeCurve, distance: f64, normal: Vector3) -> Result<Self> {
        let normal = normal
            .try_normalize(TOLERANCE)
            .ok_or(GeometryError::ZeroVector)?;
        let domain = base.domain();
        Ok(Self {
            base: Box::new(base),
            distance,
            normal,
            domain,
        })
    }

    #[must_use]
    pub fn base(&self) -> &EdgeCurve {
        &self.base
    }

    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Replaces the parameter interval.
    pub fn set_domain(&mut self, domain: CurveDomain) {
        self.domain = domain;
    }

    /// Rate at which the offset point advances relative to the base point,
    /// projected on the base direction. Negative where the offset runs
    /// backwards (past a cusp).
    #[must_use]
    pub fn advance(&self, t: f64) -> f64 {
        self.derivative(t).dot(&self.base.derivative(t))
    }

    /// Applies a similarity transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform is not a similarity or the base
    /// curve cannot be transformed.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        let scale = uniform_scale(matrix).ok_or(GeometryError::NonUniformScale)?;
        let mut offset = Self::new(
            self.base.transformed(matrix)?,
            self.distance * scale,
            transform_normal(matrix, &self.normal),
        )?;
        offset.domain = self.domain;
        Ok(offset)
    }

    fn left(&self, t: f64) -> Vector3 {
        self.normal
            .cross(&self.base.derivative(t))
            .try_normalize(f64::MIN_POSITIVE)
            .unwrap_or_else(Vector3::zeros)
    }
}

impl Curve for OffsetCurve {
    fn evaluate(&self, t: f64) -> Point3 {
        self.base.evaluate(t) + self.left(t) * self.distance
    }

    fn derivative(&self, t: f64) -> Vector3 {
        let d1 = self.base.derivative(t);
        let u = self.normal.cross(&d1);
        let len = u.norm();
        if len <= f64::MIN_POSITIVE {
            return d1;
        }
        let du = self.normal.cross(&self.base.second_derivative(t));
        let d_unit = du / len - u * (u.dot(&du) / (len * len * len));
        d1 + d_unit * self.distance
    }

    fn domain(&self) -> CurveDomain {
        self.domain
    }

    fn period(&self) -> Option<f64> {
        let full = self.base.domain();
        self.base
            .period()
            .filter(|p| (self.domain.width() - p).abs() <= 1e-12 && (full.width() - p).abs() <= 1e-12)
    }

    fn is_closed(&self, tol: &Tolerance) -> bool {
        self.period().is_some() || {
            match (self.start_point(), self.end_point()) {
                (Some(a), Some(b)) => tol.points_equal(&a, &b),
                _ => false,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::{Ellipse, Line};
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    #[test]
    fn positive_distance_moves_left() {
        let line = Line::new(Point3::origin(), Vector3::x()).unwrap();
        let offset = OffsetCurve::new(EdgeCurve::Line(line), 2.0, Vector3::z()).unwrap();
        assert_relative_eq!(offset.evaluate(3.0), Point3::new(3.0, 2.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(offset.derivative(3.0), Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn ellipse_offset_keeps_constant_distance() {
        let ellipse =
            Ellipse::new(Point3::origin(), 4.0, 2.0, Vector3::z(), Vector3::x(), 0.0, TAU).unwrap();
        let base = EdgeCurve::Ellipse(ellipse);
        let offset = OffsetCurve::new(base.clone(), -0.5, Vector3::z()).unwrap();
        for t in [0.0, 0.7, 2.0, 4.5] {
            let d = offset.evaluate(t) - base.evaluate(t);
            assert_relative_eq!(d.norm(), 0.5, epsilon = 1e-12);
            assert_relative_eq!(d.dot(&base.derivative(t)), 0.0, epsilon = 1e-12);
            let h = 1e-6;
            let numeric = (offset.evaluate(t + h) - offset.evaluate(t - h)) / (2.0 * h);
            assert_relative_eq!(offset.derivative(t), numeric, epsilon = 1e-6);
        }
        assert_eq!(offset.period(), Some(TAU));
    }

    #[test]
    fn inner_offset_past_curvature_runs_backwards() {
        // Curvature radius at the major vertex is b^2 / a = 1.
        let ellipse =
            Ellipse::new(Point3::origin(), 4.0, 2.0, Vector3::z(), Vector3::x(), 0.0, TAU).unwrap();
        let offset = OffsetCurve::new(EdgeCurve::Ellipse(ellipse), 1.5, Vector3::z()).unwrap();
        assert!(offset.advance(0.0) < 0.0);
        assert!(offset.advance(std::f64::consts::FRAC_PI_2) > 0.0);
    }
}
