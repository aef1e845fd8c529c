use crate::error::{GeometryError, Result};
use crate::geometry::curve::{Curve, CurveDomain, EdgeCurve, OffsetCurve, SAMPLES};
use crate::math::solve::{bisect_root, linspace};
use crate::math::{Tolerance, Vector3};
use crate::operations::query::EXTEND_FRACTION;

/// Returns the curve extended to its full carrier.
///
/// Segments become infinite lines, arcs full circles, elliptical arcs full
/// ellipses, and splines their whole knot range. Offset curves are returned
/// unchanged.
#[must_use]
pub fn unbounded_curve(curve: &EdgeCurve) -> EdgeCurve {
    match curve {
        EdgeCurve::Line(line) => line.unbounded().into(),
        EdgeCurve::Arc(arc) => arc.full_circle().into(),
        EdgeCurve::Ellipse(ellipse) => ellipse.full_ellipse().into(),
        EdgeCurve::Spline(spline) => spline.untrimmed().into(),
        EdgeCurve::Offset(offset) => offset.clone().into(),
    }
}

/// Offsets the unbounded carrier of `curve` by `distance` to its left,
/// looking down `normal`.
///
/// Lines and circles in the plane of `normal` are offset exactly. Any other
/// curve yields [`OffsetCurve`] pieces: the offset is split where it folds
/// back on itself and the reversed stretches are dropped. Open curves are
/// first extended past both ends so that intersections near an end are not
/// lost. An offset that collapses (a circle shrunk to nothing) yields no
/// curve.
///
/// # Errors
///
/// Returns an error if `normal` is zero-length.
pub fn offset_curves(
    curve: &EdgeCurve,
    normal: &Vector3,
    distance: f64,
    tol: &Tolerance,
) -> Result<Vec<EdgeCurve>> {
    let normal = normal
        .try_normalize(tol.equal_vector)
        .ok_or(GeometryError::ZeroVector)?;
    let base = unbounded_curve(curve);
    if distance.abs() <= f64::EPSILON {
        return Ok(vec![base]);
    }

    match &base {
        EdgeCurve::Line(line) => {
            let Some(left) = normal.cross(line.direction()).try_normalize(tol.equal_vector) else {
                return Err(GeometryError::Degenerate("line runs along the offset normal".into()).into());
            };
            Ok(vec![line.translated(&(left * distance)).into()])
        }
        EdgeCurve::Arc(arc) if tol.is_parallel(arc.normal(), &normal) => {
            // The left of a counter-clockwise circle is its inside.
            let radius = arc.radius() - distance * arc.normal().dot(&normal).signum();
            if radius <= tol.equal_point {
                return Ok(Vec::new());
            }
            Ok(vec![arc.with_radius(radius)?.into()])
        }
        _ => general_offset(base, normal, distance),
    }
}

/// Offset pieces of a curve without a closed-form offset.
fn general_offset(base: EdgeCurve, normal: Vector3, distance: f64) -> Result<Vec<EdgeCurve>> {
    let domain = base.domain();
    let periodic = base.period().is_some();
    let mut offset = OffsetCurve::new(base, distance, normal)?;
    if !domain.is_bounded() {
        return Ok(vec![offset.into()]);
    }
    let window = if periodic {
        domain
    } else {
        let pad = EXTEND_FRACTION * domain.width();
        CurveDomain::new(domain.t_min - pad, domain.t_max + pad)
    };
    offset.set_domain(window);

    let mut cuts = vec![window.t_min];
    let samples: Vec<f64> = linspace(window.t_min, window.t_max, SAMPLES).collect();
    let mut prev = offset.advance(samples[0]);
    for pair in samples.windows(2) {
        let next = offset.advance(pair[1]);
        if prev * next < 0.0 {
            cuts.push(bisect_root(|t| offset.advance(t), pair[0], pair[1], prev));
        }
        prev = next;
    }
    cuts.push(window.t_max);

    let mut pieces: Vec<CurveDomain> = cuts
        .windows(2)
        .map(|w| CurveDomain::new(w[0], w[1]))
        .filter(|piece| piece.width() > 0.0 && offset.advance(0.5 * (piece.t_min + piece.t_max)) > 0.0)
        .collect();

    // A periodic offset that is cut somewhere continues across the seam.
    if periodic && pieces.len() > 1 {
        let first = pieces[0];
        let last = pieces[pieces.len() - 1];
        if first.t_min <= window.t_min && last.t_max >= window.t_max {
            pieces.pop();
            pieces[0] = CurveDomain::new(last.t_min, window.t_max + first.width());
        }
    }

    Ok(pieces
        .into_iter()
        .map(|piece| {
            let mut part = offset.clone();
            part.set_domain(piece);
            part.into()
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::{Arc, Ellipse, Line, Spline};
    use crate::math::Point3;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn unbounded_drops_trimming() {
        let seg: EdgeCurve = Line::segment(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)).unwrap().into();
        assert!(!unbounded_curve(&seg).domain().is_bounded());

        let arc: EdgeCurve = Arc::new(p(0.0, 0.0, 0.0), 1.0, Vector3::z(), Vector3::x(), 0.5, 1.0)
            .unwrap()
            .into();
        let full = unbounded_curve(&arc);
        assert_eq!(full.domain(), CurveDomain::new(0.0, TAU));
        assert_relative_eq!(full.evaluate(0.7), arc.evaluate(0.7), epsilon = 1e-12);
    }

    #[test]
    fn line_offset_is_parallel() {
        let seg: EdgeCurve = Line::segment(p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0)).unwrap().into();
        let tol = Tolerance::default();
        let left = offset_curves(&seg, &Vector3::z(), 2.0, &tol).unwrap();
        assert_eq!(left.len(), 1);
        assert_relative_eq!(left[0].evaluate(3.0), p(3.0, 2.0, 0.0), epsilon = 1e-12);
        let right = offset_curves(&seg, &-Vector3::z(), 2.0, &tol).unwrap();
        assert_relative_eq!(right[0].evaluate(3.0), p(3.0, -2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn circle_offset_follows_normal_orientation() {
        let tol = Tolerance::default();
        let circle: EdgeCurve = Arc::circle(p(0.0, 0.0, 0.0), 10.0, Vector3::z(), Vector3::x())
            .unwrap()
            .into();
        let inner = offset_curves(&circle, &Vector3::z(), 3.0, &tol).unwrap();
        assert_relative_eq!(inner[0].evaluate(0.0), p(7.0, 0.0, 0.0), epsilon = 1e-12);
        let outer = offset_curves(&circle, &Vector3::z(), -3.0, &tol).unwrap();
        assert_relative_eq!(outer[0].evaluate(0.0), p(13.0, 0.0, 0.0), epsilon = 1e-12);
        let flipped = offset_curves(&circle, &-Vector3::z(), 3.0, &tol).unwrap();
        assert_relative_eq!(flipped[0].evaluate(0.0), p(13.0, 0.0, 0.0), epsilon = 1e-12);
        assert!(offset_curves(&circle, &Vector3::z(), 10.0, &tol).unwrap().is_empty());
    }

    #[test]
    fn zero_distance_returns_carrier() {
        let tol = Tolerance::default();
        let seg: EdgeCurve = Line::segment(p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0)).unwrap().into();
        let same = offset_curves(&seg, &Vector3::z(), 0.0, &tol).unwrap();
        assert_eq!(same, vec![unbounded_curve(&seg)]);
    }

    #[test]
    fn open_spline_offset_is_extended() {
        let tol = Tolerance::default();
        let spline: EdgeCurve = Spline::uniform(
            2,
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)],
        )
        .unwrap()
        .into();
        let pieces = offset_curves(&spline, &Vector3::z(), 1.0, &tol).unwrap();
        assert_eq!(pieces.len(), 1);
        let domain = pieces[0].domain();
        assert_relative_eq!(domain.t_min, -0.25, epsilon = 1e-12);
        assert_relative_eq!(domain.t_max, 1.25, epsilon = 1e-12);
        assert_relative_eq!(pieces[0].evaluate(0.5).y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn ellipse_inner_offset_drops_swallowtails() {
        let tol = Tolerance::default();
        let ellipse: EdgeCurve =
            Ellipse::new(p(0.0, 0.0, 0.0), 10.0, 4.0, Vector3::z(), Vector3::x(), 0.0, TAU)
                .unwrap()
                .into();
        // Tighter than the 1.6 radius of curvature at the major vertices.
        let pieces = offset_curves(&ellipse, &Vector3::z(), 3.0, &tol).unwrap();
        assert_eq!(pieces.len(), 2);
        for piece in &pieces {
            let EdgeCurve::Offset(offset) = piece else {
                panic!("expected an offset curve");
            };
            let d = piece.domain();
            assert!(offset.advance(0.5 * (d.t_min + d.t_max)) > 0.0);
        }
        // A gentle offset stays in one piece that closes on itself.
        let gentle = offset_curves(&ellipse, &Vector3::z(), 1.0, &tol).unwrap();
        assert_eq!(gentle.len(), 1);
        assert!(gentle[0].is_closed(&tol));
    }
}
