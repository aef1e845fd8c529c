use crate::error::{FilletError, FilletResult};
use crate::geometry::curve::{Curve, CurveDomain, EdgeCurve};
use crate::math::Tolerance;
use crate::operations::query::curve_param_range;

/// Trims or extends `curve` so that it ends at `param`.
///
/// An incoming curve (running into the cut) keeps its start and gets
/// `param` as its new upper bound; an outgoing curve keeps its end and gets
/// `param` as its new lower bound. On a periodic curve the parameter is first
/// wrapped into the period adjoining the kept bound. Closed periodic curves
/// (full circles and ellipses) are left as they are.
///
/// The curve is only modified when the cut succeeds.
///
/// # Errors
///
/// Returns [`FilletError::InvalidGeometry`] if the new interval is empty or
/// the trimmed curve is degenerate.
pub fn trim_or_extend(
    curve: &mut EdgeCurve,
    param: f64,
    is_incoming: bool,
    tol: &Tolerance,
) -> FilletResult<()> {
    let range = curve_param_range(curve, tol);
    let CurveDomain { t_min, t_max } = range.domain;

    let param = match range.period {
        Some(_) if range.closed => return Ok(()),
        Some(period) if is_incoming && t_min.is_finite() => {
            // Into (t_min, t_min + period].
            let wrapped = t_min + (param - t_min).rem_euclid(period);
            if wrapped <= t_min {
                wrapped + period
            } else {
                wrapped
            }
        }
        Some(period) if !is_incoming && t_max.is_finite() => {
            // Into [t_max - period, t_max).
            let wrapped = t_max - (t_max - param).rem_euclid(period);
            if wrapped >= t_max {
                wrapped - period
            } else {
                wrapped
            }
        }
        _ => param,
    };

    let domain = if is_incoming {
        CurveDomain::new(t_min, param)
    } else {
        CurveDomain::new(param, t_max)
    };
    if domain.t_min >= domain.t_max {
        tracing::debug!(t_min = domain.t_min, t_max = domain.t_max, "trim leaves an empty interval");
        return Err(FilletError::InvalidGeometry(format!(
            "trimming to {param} leaves an empty interval"
        )));
    }

    let mut trimmed = curve.clone();
    trimmed.set_domain(domain);
    if trimmed.is_degenerate(tol) {
        return Err(FilletError::InvalidGeometry(
            "trimmed curve is degenerate".into(),
        ));
    }
    *curve = trimmed;
    Ok(())
}
