use crate::error::Result;
use crate::math::{Matrix4, Point3, Tolerance, Vector3};

use super::{Arc, Curve, CurveDomain, Ellipse, Line, OffsetCurve, Spline};

/// Geometry of a curve referenced by a fillet, or derived from one.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeCurve {
    Line(Line),
    Arc(Arc),
    Ellipse(Ellipse),
    Spline(Spline),
    Offset(OffsetCurve),
}

macro_rules! dispatch {
    ($self:ident, $c:ident => $e:expr) => {
        match $self {
            EdgeCurve::Line($c) => $e,
            EdgeCurve::Arc($c) => $e,
            EdgeCurve::Ellipse($c) => $e,
            EdgeCurve::Spline($c) => $e,
            EdgeCurve::Offset($c) => $e,
        }
    };
}

impl EdgeCurve {
    /// Returns whether the curve is straight.
    #[must_use]
    pub fn is_linear(&self) -> bool {
        matches!(self, Self::Line(_))
    }

    /// Returns the line if this curve is straight.
    #[must_use]
    pub fn as_line(&self) -> Option<&Line> {
        match self {
            Self::Line(line) => Some(line),
            _ => None,
        }
    }

    /// Plane normal carried by the curve definition itself, if any.
    #[must_use]
    pub fn intrinsic_normal(&self) -> Option<Vector3> {
        match self {
            Self::Arc(arc) => Some(*arc.normal()),
            Self::Ellipse(ellipse) => Some(*ellipse.normal()),
            Self::Offset(offset) => offset
                .base()
                .intrinsic_normal()
                .or(Some(*offset.normal())),
            Self::Line(_) | Self::Spline(_) => None,
        }
    }

    /// Points that span the curve's shape, for plane fitting.
    #[must_use]
    pub fn shape_points(&self, samples: usize) -> Vec<Point3> {
        match self {
            Self::Spline(spline) => spline.control_points().to_vec(),
            other => {
                let domain = other.domain();
                if !domain.is_bounded() {
                    return Vec::new();
                }
                crate::math::solve::linspace(domain.t_min, domain.t_max, samples)
                    .map(|t| other.evaluate(t))
                    .collect()
            }
        }
    }

    /// Replaces the parameter interval.
    pub fn set_domain(&mut self, domain: CurveDomain) {
        dispatch!(self, c => c.set_domain(domain));
    }

    /// Applies a transform, preserving the parameterization.
    ///
    /// # Errors
    ///
    /// Returns an error if a circular or elliptical curve is distorted by a
    /// non-uniform scale.
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        Ok(match self {
            Self::Line(c) => Self::Line(c.transformed(matrix)?),
            Self::Arc(c) => Self::Arc(c.transformed(matrix)?),
            Self::Ellipse(c) => Self::Ellipse(c.transformed(matrix)?),
            Self::Spline(c) => Self::Spline(c.transformed(matrix)?),
            Self::Offset(c) => Self::Offset(c.transformed(matrix)?),
        })
    }
}

impl Curve for EdgeCurve {
    fn evaluate(&self, t: f64) -> Point3 {
        dispatch!(self, c => c.evaluate(t))
    }

    fn derivative(&self, t: f64) -> Vector3 {
        dispatch!(self, c => c.derivative(t))
    }

    fn second_derivative(&self, t: f64) -> Vector3 {
        dispatch!(self, c => c.second_derivative(t))
    }

    fn domain(&self) -> CurveDomain {
        dispatch!(self, c => c.domain())
    }

    fn period(&self) -> Option<f64> {
        dispatch!(self, c => c.period())
    }

    fn is_closed(&self, tol: &Tolerance) -> bool {
        dispatch!(self, c => c.is_closed(tol))
    }

    fn is_degenerate(&self, tol: &Tolerance) -> bool {
        dispatch!(self, c => c.is_degenerate(tol))
    }
}

impl From<Line> for EdgeCurve {
    fn from(line: Line) -> Self {
        Self::Line(line)
    }
}

impl From<Arc> for EdgeCurve {
    fn from(arc: Arc) -> Self {
        Self::Arc(arc)
    }
}

impl From<Ellipse> for EdgeCurve {
    fn from(ellipse: Ellipse) -> Self {
        Self::Ellipse(ellipse)
    }
}

impl From<Spline> for EdgeCurve {
    fn from(spline: Spline) -> Self {
        Self::Spline(spline)
    }
}

impl From<OffsetCurve> for EdgeCurve {
    fn from(offset: OffsetCurve) -> Self {
        Self::Offset(offset)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn intrinsic_normal_by_kind() {
        let line: EdgeCurve = Line::new(Point3::origin(), Vector3::x()).unwrap().into();
        assert!(line.intrinsic_normal().is_none());
        assert!(line.is_linear());

        let arc: EdgeCurve = Arc::circle(Point3::origin(), 1.0, -Vector3::z(), Vector3::x())
            .unwrap()
            .into();
        assert_eq!(arc.intrinsic_normal(), Some(-Vector3::z()));
        assert!(arc.as_line().is_none());
    }

    #[test]
    fn set_domain_dispatches() {
        let mut curve: EdgeCurve = Line::segment(Point3::origin(), Point3::new(4.0, 0.0, 0.0))
            .unwrap()
            .into();
        curve.set_domain(CurveDomain::new(1.0, 2.0));
        assert_eq!(curve.domain(), CurveDomain::new(1.0, 2.0));
        assert_eq!(curve.start_point(), Some(Point3::new(1.0, 0.0, 0.0)));
    }
}
