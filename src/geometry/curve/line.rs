use crate::error::{GeometryError, Result};
use crate::math::transform::{transform_direction, transform_point};
use crate::math::{Matrix4, Point3, Tolerance, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A straight line defined by an origin point, a unit direction, and a
/// parameter interval.
///
/// The parametric form is `P(t) = origin + t * direction`, so `t` measures
/// arc length from the origin. The interval may be infinite on either side:
/// a full line, a ray, or a segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    origin: Point3,
    direction: Vector3,
    domain: CurveDomain,
}

impl Line {
    /// Creates an infinite line from an origin and direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vector is zero-length.
    pub fn new(origin: Point3, direction: Vector3) -> Result<Self> {
        let len = direction.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            origin,
            direction: direction / len,
            domain: CurveDomain::unbounded(),
        })
    }

    /// Creates a segment from `start` to `end`, parameterized over `[0, |end - start|]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints coincide.
    pub fn segment(start: Point3, end: Point3) -> Result<Self> {
        let mut line = Self::new(start, end - start)?;
        line.domain = CurveDomain::new(0.0, (end - start).norm());
        Ok(line)
    }

    /// Returns the origin point of the line.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the unit direction vector of the line.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }

    /// Returns whether both parameter bounds are finite.
    #[must_use]
    pub fn is_segment(&self) -> bool {
        self.domain.is_bounded()
    }

    /// Parameter of the orthogonal projection of `point` onto the line.
    #[must_use]
    pub fn param_of(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.direction)
    }

    /// Same carrier line with an infinite interval.
    #[must_use]
    pub fn unbounded(&self) -> Self {
        Self {
            domain: CurveDomain::unbounded(),
            ..self.clone()
        }
    }

    /// Replaces the parameter interval.
    pub fn set_domain(&mut self, domain: CurveDomain) {
        self.domain = domain;
    }

    /// Parallel copy moved by `shift`.
    #[must_use]
    pub fn translated(&self, shift: &Vector3) -> Self {
        Self {
            origin: self.origin + shift,
            ..self.clone()
        }
    }

    /// Applies a similarity transform, scaling the parameter interval with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction collapses under the transform.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        let mapped = transform_direction(matrix, &self.direction);
        let scale = mapped.norm();
        let mut line = Self::new(transform_point(matrix, &self.origin), mapped)?;
        line.domain = CurveDomain::new(self.domain.t_min * scale, self.domain.t_max * scale);
        Ok(line)
    }
}

impl Curve for Line {
    fn evaluate(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    fn derivative(&self, _t: f64) -> Vector3 {
        self.direction
    }

    fn second_derivative(&self, _t: f64) -> Vector3 {
        Vector3::zeros()
    }

    fn domain(&self) -> CurveDomain {
        self.domain
    }

    fn is_closed(&self, _tol: &Tolerance) -> bool {
        false
    }

    fn is_degenerate(&self, tol: &Tolerance) -> bool {
        self.domain.is_bounded() && self.domain.width() <= tol.equal_point
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn segment_uses_arc_length() {
        let line = Line::segment(p(1.0, 0.0, 0.0), p(1.0, 4.0, 0.0)).unwrap();
        assert_relative_eq!(line.domain().t_max, 4.0);
        assert_relative_eq!(line.evaluate(2.0), p(1.0, 2.0, 0.0));
        assert_relative_eq!(line.end_point().unwrap(), p(1.0, 4.0, 0.0));
        assert!(line.is_segment());
    }

    #[test]
    fn zero_length_segment_is_rejected() {
        assert!(Line::segment(p(1.0, 1.0, 1.0), p(1.0, 1.0, 1.0)).is_err());
    }

    #[test]
    fn unbounded_keeps_parameterization() {
        let line = Line::segment(p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0)).unwrap();
        let full = line.unbounded();
        assert!(!full.is_segment());
        assert_relative_eq!(full.evaluate(-3.0), p(-3.0, 0.0, 0.0));
        assert!(full.start_point().is_none());
    }

    #[test]
    fn degenerate_when_interval_collapses() {
        let tol = Tolerance::default();
        let mut line = Line::segment(p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0)).unwrap();
        assert!(!line.is_degenerate(&tol));
        line.set_domain(CurveDomain::new(1.0, 1.0));
        assert!(line.is_degenerate(&tol));
    }

    #[test]
    fn mirror_preserves_parameters() {
        let line = Line::segment(p(1.0, 0.0, 0.0), p(3.0, 0.0, 0.0)).unwrap();
        let m = crate::math::transform::mirror_matrix(&Point3::origin(), &Vector3::x());
        let mirrored = line.transformed(&m).unwrap();
        assert_relative_eq!(mirrored.evaluate(2.0), p(-3.0, 0.0, 0.0));
        assert_eq!(mirrored.domain(), line.domain());
    }
}
