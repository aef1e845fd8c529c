use nalgebra::Vector4;

use crate::error::{GeometryError, Result};
use crate::math::transform::transform_point;
use crate::math::{Matrix4, Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A rational B-spline (NURBS) curve with a clamped knot vector.
///
/// Derivatives are evaluated from derivative curves built once at
/// construction, so repeated queries only pay for basis evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    degree: usize,
    knots: Vec<f64>,
    control_points: Vec<Point3>,
    weights: Vec<f64>,
    domain: CurveDomain,
    homogeneous: [HomogeneousCurve; 3],
}

impl Spline {
    /// Creates a NURBS curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the degree is zero, the knot vector does not match
    /// the control points, is decreasing or unclamped, or a weight is not
    /// positive.
    pub fn new(
        degree: usize,
        knots: Vec<f64>,
        control_points: Vec<Point3>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        if degree == 0 {
            return Err(GeometryError::Degenerate("spline degree must be positive".into()).into());
        }
        let n = control_points.len();
        if n < degree + 1 {
            return Err(GeometryError::Degenerate(format!(
                "degree {degree} spline needs at least {} control points",
                degree + 1
            ))
            .into());
        }
        if weights.len() != n {
            return Err(GeometryError::Degenerate("one weight per control point".into()).into());
        }
        if weights.iter().any(|w| *w <= 0.0) {
            return Err(GeometryError::Degenerate("weights must be positive".into()).into());
        }
        if knots.len() != n + degree + 1 {
            return Err(GeometryError::InvalidKnots(format!(
                "expected {} knots, found {}",
                n + degree + 1,
                knots.len()
            ))
            .into());
        }
        if knots.windows(2).any(|w| w[1] < w[0]) {
            return Err(GeometryError::InvalidKnots("knots must be non-decreasing".into()).into());
        }
        let first = knots[0];
        let last = knots[knots.len() - 1];
        let clamped = knots[..=degree].iter().all(|k| *k == first)
            && knots[knots.len() - degree - 1..].iter().all(|k| *k == last);
        if !clamped || last - first < TOLERANCE {
            return Err(GeometryError::InvalidKnots("knot vector must be clamped".into()).into());
        }

        let points: Vec<Vector4<f64>> = control_points
            .iter()
            .zip(&weights)
            .map(|(p, w)| Vector4::new(p.x * w, p.y * w, p.z * w, *w))
            .collect();
        let value = HomogeneousCurve {
            degree,
            knots: knots.clone(),
            points,
        };
        let first_derivative = value.derivative();
        let second_derivative = first_derivative.derivative();

        Ok(Self {
            degree,
            domain: CurveDomain::new(first, last),
            knots,
            control_points,
            weights,
            homogeneous: [value, first_derivative, second_derivative],
        })
    }

    /// Creates a non-rational B-spline with a uniform clamped knot vector.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Spline::new`].
    pub fn uniform(degree: usize, control_points: Vec<Point3>) -> Result<Self> {
        let n = control_points.len();
        if n < degree + 1 {
            return Err(GeometryError::Degenerate("not enough control points".into()).into());
        }
        let spans = n - degree;
        let mut knots = vec![0.0; degree + 1];
        #[allow(clippy::cast_precision_loss)]
        knots.extend((1..spans).map(|i| i as f64 / spans as f64));
        knots.extend(std::iter::repeat_n(1.0, degree + 1));
        let weights = vec![1.0; n];
        Self::new(degree, knots, control_points, weights)
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    /// The parameter range covered by the knot vector.
    #[must_use]
    pub fn knot_domain(&self) -> CurveDomain {
        CurveDomain::new(self.knots[0], self.knots[self.knots.len() - 1])
    }

    /// Same curve over its whole knot range.
    #[must_use]
    pub fn untrimmed(&self) -> Self {
        Self {
            domain: self.knot_domain(),
            ..self.clone()
        }
    }

    /// Replaces the parameter interval.
    pub fn set_domain(&mut self, domain: CurveDomain) {
        self.domain = domain;
    }

    /// Applies an affine transform to the control points.
    ///
    /// # Errors
    ///
    /// Propagates construction errors (not expected for valid input).
    pub fn transformed(&self, matrix: &Matrix4) -> Result<Self> {
        let points = self
            .control_points
            .iter()
            .map(|p| transform_point(matrix, p))
            .collect();
        let mut spline = Self::new(self.degree, self.knots.clone(), points, self.weights.clone())?;
        spline.domain = self.domain;
        Ok(spline)
    }

    fn rational(&self, t: f64) -> (Point3, Vector3, Vector3) {
        let [h0, h1, h2] = [0, 1, 2].map(|k| self.homogeneous[k].point(t));
        let w = h0.w;
        let point = h0.xyz() / w;
        let d1 = (h1.xyz() - point * h1.w) / w;
        let d2 = (h2.xyz() - d1 * (2.0 * h1.w) - point * h2.w) / w;
        (Point3::from(point), d1, d2)
    }
}

impl Curve for Spline {
    fn evaluate(&self, t: f64) -> Point3 {
        let h = self.homogeneous[0].point(t);
        Point3::from(h.xyz() / h.w)
    }

    fn derivative(&self, t: f64) -> Vector3 {
        self.rational(t).1
    }

    fn second_derivative(&self, t: f64) -> Vector3 {
        self.rational(t).2
    }

    fn domain(&self) -> CurveDomain {
        self.domain
    }
}

/// B-spline in homogeneous coordinates (`w * P`, `w`).
#[derive(Debug, Clone, PartialEq)]
struct HomogeneousCurve {
    degree: usize,
    knots: Vec<f64>,
    points: Vec<Vector4<f64>>,
}

impl HomogeneousCurve {
    /// Evaluates the polynomial piece of the span containing `t`. Outside the
    /// knot range the first or last piece is extrapolated.
    fn point(&self, t: f64) -> Vector4<f64> {
        if self.points.is_empty() {
            return Vector4::zeros();
        }
        let last = self.points.len() - 1;
        let span = find_span(last, self.degree, t, &self.knots);
        let basis = basis_funs(span, t, self.degree, &self.knots);
        basis
            .iter()
            .enumerate()
            .map(|(j, n)| self.points[span - self.degree + j] * *n)
            .sum()
    }

    /// Hodograph: degree `p - 1` curve over the inner knots.
    fn derivative(&self) -> Self {
        let p = self.degree;
        if p == 0 {
            return Self {
                degree: 0,
                knots: self.knots.clone(),
                points: Vec::new(),
            };
        }
        #[allow(clippy::cast_precision_loss)]
        let scale = p as f64;
        let points = self
            .points
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                let span = self.knots[i + p + 1] - self.knots[i + 1];
                if span > 0.0 {
                    (w[1] - w[0]) * (scale / span)
                } else {
                    Vector4::zeros()
                }
            })
            .collect();
        Self {
            degree: p - 1,
            knots: self.knots[1..self.knots.len() - 1].to_vec(),
            points,
        }
    }
}

/// Finds the knot span index such that `knots[span] <= u < knots[span + 1]`,
/// clamped to the first and last non-empty spans.
///
/// `n` is the index of the last control point, `p` the degree.
fn find_span(n: usize, p: usize, u: f64, knots: &[f64]) -> usize {
    if u >= knots[n + 1] {
        let mut span = n;
        while span > p && knots[span] >= knots[n + 1] {
            span -= 1;
        }
        return span;
    }
    if u <= knots[p] {
        let mut span = p;
        while span < n && knots[span + 1] <= knots[p] {
            span += 1;
        }
        return span;
    }

    let mut lo = p;
    let mut hi = n + 1;
    let mut mid = (lo + hi) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            hi = mid;
        } else {
            lo = mid;
        }
        mid = (lo + hi) / 2;
    }
    mid
}

/// Non-zero basis functions `N[span - p ..= span]` at `u` (Cox-de Boor).
fn basis_funs(span: usize, u: f64, p: usize, knots: &[f64]) -> Vec<f64> {
    let mut n = vec![0.0; p + 1];
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];
    n[0] = 1.0;
    for j in 1..=p {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }
    n
}
