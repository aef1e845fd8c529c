use crate::geometry::curve::{Curve, CurveDomain, EdgeCurve};
use crate::math::Tolerance;

/// Parameter range of a curve together with its closure and periodicity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub closed: bool,
    pub domain: CurveDomain,
    pub period: Option<f64>,
}

/// Returns whether `curve` is closed, its parameter interval, and its period.
#[must_use]
pub fn curve_param_range(curve: &EdgeCurve, tol: &Tolerance) -> ParamRange {
    ParamRange {
        closed: curve.is_closed(tol),
        domain: curve.domain(),
        period: curve.period(),
    }
}

/// Shortest parametric distance between `p0` and `p1` on `curve`.
///
/// Periodic curves measure around the period in either direction. Closed
/// curves without a period may also go across the seam where the parameter
/// jumps from the end of the interval back to its start.
#[must_use]
pub fn param_distance(curve: &EdgeCurve, p0: f64, p1: f64, tol: &Tolerance) -> f64 {
    let range = curve_param_range(curve, tol);
    let direct = (p1 - p0).abs();
    if let Some(period) = range.period {
        let wrapped = (p1 - p0).rem_euclid(period);
        return direct.min(wrapped).min(period - wrapped);
    }
    if range.closed && range.domain.is_bounded() {
        let CurveDomain { t_min, t_max } = range.domain;
        let via_seam_up = (t_max - p0).abs() + (p1 - t_min).abs();
        let via_seam_down = (p0 - t_min).abs() + (t_max - p1).abs();
        return direct.min(via_seam_up).min(via_seam_down);
    }
    direct
}
