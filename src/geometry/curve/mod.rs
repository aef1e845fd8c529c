mod arc;
mod edge_curve;
mod ellipse;
mod line;
mod offset;
mod spline;

pub use arc::Arc;
pub(crate) use arc::wrap_from;
pub use edge_curve::EdgeCurve;
pub use ellipse::Ellipse;
pub use line::Line;
pub use offset::OffsetCurve;
pub use spline::Spline;

use crate::error::{GeometryError, Result};
use crate::math::solve::linspace;
use crate::math::{Point3, Tolerance, Vector3, TOLERANCE};

/// Parameter domain for a curve.
///
/// Either bound may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }

    /// The whole real line.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    #[must_use]
    pub fn is_bounded_below(&self) -> bool {
        self.t_min.is_finite()
    }

    #[must_use]
    pub fn is_bounded_above(&self) -> bool {
        self.t_max.is_finite()
    }

    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.is_bounded_below() && self.is_bounded_above()
    }

    /// Length of the parameter range (infinite when unbounded).
    #[must_use]
    pub fn width(&self) -> f64 {
        self.t_max - self.t_min
    }

    /// Returns whether `t` lies in the domain, allowing a slack of `eps`.
    #[must_use]
    pub fn contains(&self, t: f64, eps: f64) -> bool {
        t >= self.t_min - eps && t <= self.t_max + eps
    }

    /// Clamps `t` into the domain.
    #[must_use]
    pub fn clamp(&self, t: f64) -> f64 {
        t.clamp(self.t_min, self.t_max)
    }
}

/// Number of chords used when a curve is approximated by sampling.
pub(crate) const SAMPLES: usize = 256;

/// Trait for parametric curves in 3D space.
///
/// Evaluation is defined for every real parameter: outside the domain a
/// curve continues naturally (lines extend, arcs keep turning, splines
/// extrapolate their end spans).
pub trait Curve {
    /// Evaluates the curve at parameter `t`.
    fn evaluate(&self, t: f64) -> Point3;

    /// First derivative with respect to the parameter.
    fn derivative(&self, t: f64) -> Vector3;

    /// Second derivative with respect to the parameter.
    fn second_derivative(&self, t: f64) -> Vector3 {
        let h = 1e-5 * (1.0 + t.abs());
        (self.derivative(t + h) - self.derivative(t - h)) / (2.0 * h)
    }

    /// Computes the unit tangent at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the derivative vanishes at `t`.
    fn tangent(&self, t: f64) -> Result<Vector3> {
        self.derivative(t)
            .try_normalize(f64::EPSILON)
            .ok_or_else(|| GeometryError::ZeroVector.into())
    }

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain;

    /// Period of the parameterization, if it repeats.
    fn period(&self) -> Option<f64> {
        None
    }

    /// Returns whether the curve is closed.
    fn is_closed(&self, tol: &Tolerance) -> bool {
        match (self.start_point(), self.end_point()) {
            (Some(a), Some(b)) => tol.points_equal(&a, &b),
            _ => false,
        }
    }

    /// Returns whether the curve collapses to a point.
    fn is_degenerate(&self, tol: &Tolerance) -> bool {
        let domain = self.domain();
        if !domain.is_bounded() {
            return false;
        }
        polyline_length(self, domain, SAMPLES) <= tol.equal_point
    }

    /// Point at the lower parameter bound, if bounded below.
    fn start_point(&self) -> Option<Point3> {
        let domain = self.domain();
        domain
            .is_bounded_below()
            .then(|| self.evaluate(domain.t_min))
    }

    /// Point at the upper parameter bound, if bounded above.
    fn end_point(&self) -> Option<Point3> {
        let domain = self.domain();
        domain
            .is_bounded_above()
            .then(|| self.evaluate(domain.t_max))
    }
}

/// Validates the plane frame of a circle or ellipse and returns it unitized.
pub(crate) fn conic_frame(normal: Vector3, ref_dir: Vector3) -> Result<(Vector3, Vector3)> {
    let normal = normal
        .try_normalize(TOLERANCE)
        .ok_or(GeometryError::ZeroVector)?;
    let ref_dir = ref_dir
        .try_normalize(TOLERANCE)
        .ok_or(GeometryError::ZeroVector)?;
    if normal.dot(&ref_dir).abs() > 1e-9 {
        return Err(GeometryError::Degenerate("reference direction leaves the plane".into()).into());
    }
    Ok((normal, ref_dir))
}

/// Rejects a radius or semi-axis too small to define a curve.
pub(crate) fn positive_length(value: f64, what: &str) -> Result<f64> {
    if value < TOLERANCE {
        return Err(GeometryError::Degenerate(format!("{what} must be positive")).into());
    }
    Ok(value)
}

/// Length of the polyline through `n + 1` samples of `curve` over `domain`.
pub(crate) fn polyline_length<C: Curve + ?Sized>(curve: &C, domain: CurveDomain, n: usize) -> f64 {
    let points: Vec<Point3> = linspace(domain.t_min, domain.t_max, n)
        .map(|t| curve.evaluate(t))
        .collect();
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}
