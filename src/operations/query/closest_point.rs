use std::f64::consts::{PI, TAU};

use crate::geometry::curve::{Arc, Curve, CurveDomain, EdgeCurve, SAMPLES};
use crate::math::solve::linspace;
use crate::math::{Point3, TOLERANCE};

/// Fraction of the parameter width by which open curves are searched past
/// their ends when the query is unbounded.
pub(crate) const EXTEND_FRACTION: f64 = 0.25;

/// Result of a closest point query.
#[derive(Debug, Clone, Copy)]
pub struct ClosestPointResult {
    /// The closest point on the curve.
    pub point: Point3,
    /// The parameter value at the closest point.
    pub parameter: f64,
    /// The distance from the query point to the closest point.
    pub distance: f64,
}

/// Finds the closest point on a curve to a given point.
///
/// By default the search is restricted to the curve's domain. An unbounded
/// query treats lines as infinite, arcs as full circles, and lets other
/// curves extend past their ends.
pub struct ClosestPointOnCurve<'a> {
    curve: &'a EdgeCurve,
    point: Point3,
    bounded: bool,
    hint: Option<f64>,
}

impl<'a> ClosestPointOnCurve<'a> {
    /// Creates a new `ClosestPointOnCurve` query.
    #[must_use]
    pub fn new(curve: &'a EdgeCurve, point: Point3) -> Self {
        Self {
            curve,
            point,
            bounded: true,
            hint: None,
        }
    }

    /// Ignores the curve's parameter bounds.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.bounded = false;
        self
    }

    /// Searches locally around parameter `t`. Periodic results are reported
    /// on the period containing `t`.
    #[must_use]
    pub fn near(mut self, t: f64) -> Self {
        self.hint = Some(t);
        self
    }

    /// Executes the query.
    #[must_use]
    pub fn execute(&self) -> ClosestPointResult {
        let parameter = match self.curve {
            EdgeCurve::Line(line) => {
                let t = line.param_of(&self.point);
                if self.bounded {
                    line.domain().clamp(t)
                } else {
                    t
                }
            }
            EdgeCurve::Arc(arc) => self.on_arc(arc),
            _ => self.numeric(),
        };
        let point = self.curve.evaluate(parameter);
        ClosestPointResult {
            point,
            parameter,
            distance: (self.point - point).norm(),
        }
    }

    fn on_arc(&self, arc: &Arc) -> f64 {
        let domain = arc.domain();
        let to_point = self.point - arc.center();
        let in_plane = to_point - arc.normal() * to_point.dot(arc.normal());
        if in_plane.norm() < TOLERANCE {
            // Every point of the circle is equally close.
            return self.hint.unwrap_or(domain.t_min);
        }
        let angle = arc.angle_of(&self.point);
        let angle = match self.hint {
            Some(hint) => hint + (angle - hint + PI).rem_euclid(TAU) - PI,
            None => angle,
        };
        if !self.bounded || arc.is_full() {
            return angle;
        }
        let in_window = crate::geometry::curve::wrap_from(angle, domain.t_min);
        if in_window <= domain.t_max {
            return in_window;
        }
        let to_start = (arc.evaluate(domain.t_min) - self.point).norm();
        let to_end = (arc.evaluate(domain.t_max) - self.point).norm();
        if to_start <= to_end {
            domain.t_min
        } else {
            domain.t_max
        }
    }

    /// Search window for curves without a closed form.
    fn window(&self) -> Option<CurveDomain> {
        let domain = self.curve.domain();
        if !domain.is_bounded() {
            return None;
        }
        if self.bounded || self.curve.period().is_some() {
            return Some(domain);
        }
        let pad = EXTEND_FRACTION * domain.width();
        Some(CurveDomain::new(domain.t_min - pad, domain.t_max + pad))
    }

    fn numeric(&self) -> f64 {
        let window = self.window();
        let dist = |t: f64| (self.curve.evaluate(t) - self.point).norm_squared();

        if let Some(hint) = self.hint {
            let t = self.settle(newton(self.curve, &self.point, hint), window);
            if dist(t) <= dist(hint) * (1.0 + 1e-12) {
                return t;
            }
        }

        let Some(window) = window else {
            return self.hint.unwrap_or(0.0);
        };
        let mut best = window.t_min;
        let mut best_dist = f64::INFINITY;
        for t in linspace(window.t_min, window.t_max, SAMPLES) {
            let d = dist(t);
            if d < best_dist {
                best = t;
                best_dist = d;
            }
        }
        let refined = self.settle(newton(self.curve, &self.point, best), Some(window));
        if dist(refined) < best_dist {
            refined
        } else {
            best
        }
    }

    /// Brings a Newton result back into the search window.
    fn settle(&self, t: f64, window: Option<CurveDomain>) -> f64 {
        let Some(window) = window else {
            return t;
        };
        match self.curve.period() {
            Some(period) if self.hint.is_none() => {
                window.t_min + (t - window.t_min).rem_euclid(period)
            }
            Some(_) => t,
            None => window.clamp(t),
        }
    }
}

/// Newton iteration on `(C(t) - p) · C'(t) = 0` starting at `t`.
fn newton(curve: &EdgeCurve, point: &Point3, mut t: f64) -> f64 {
    for _ in 0..50 {
        let d1 = curve.derivative(t);
        let diff = curve.evaluate(t) - point;
        let f = diff.dot(&d1);
        let speed = d1.norm_squared();
        if speed <= f64::MIN_POSITIVE {
            break;
        }
        let fp = speed + diff.dot(&curve.second_derivative(t));
        let step = if fp > 0.0 { f / fp } else { f / speed };
        t -= step;
        if step.abs() <= 1e-15 * (1.0 + t.abs()) {
            break;
        }
    }
    t
}
