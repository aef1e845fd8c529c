use crate::geometry::curve::EdgeCurve;
use crate::geometry::Plane;
use crate::math::{Point3, Tolerance, Vector3};

use super::ClosestPointOnCurve;

/// Samples taken along a curve when fitting its plane.
const FIT_SAMPLES: usize = 32;

/// Best-effort plane normal of a single curve.
///
/// Arcs and ellipses report their own axis. Other curves are fitted with a
/// plane through their shape points, facing the side from which the curve
/// turns counterclockwise. Straight or non-planar curves fall back to +Z.
#[must_use]
pub fn curve_normal(curve: &EdgeCurve, tol: &Tolerance) -> Vector3 {
    if let Some(normal) = curve.intrinsic_normal() {
        if let Some(unit) = normal.try_normalize(tol.equal_vector) {
            return unit;
        }
    }
    let points = curve.shape_points(FIT_SAMPLES);
    Plane::fit(&points, tol).map_or_else(Vector3::z, |plane| {
        let normal = *plane.plane_normal();
        if normal.dot(&turning(&points)) < 0.0 {
            -normal
        } else {
            normal
        }
    })
}

/// Twice the signed area swept from the first point, as a vector.
fn turning(points: &[Point3]) -> Vector3 {
    let Some(first) = points.first() else {
        return Vector3::zeros();
    };
    points
        .windows(2)
        .map(|pair| (pair[0] - first).cross(&(pair[1] - first)))
        .sum()
}

/// Normal of the plane in which two curves are filleted.
///
/// Two lines span their own plane, oriented by `d0 × d1`. With one line,
/// the other curve's normal is used, and otherwise curve 0 decides. The
/// result is unit length and follows the curves continuously: it maps like
/// the curves' own normals under any similarity, so left and right do too.
#[must_use]
pub fn pair_normal(curve0: &EdgeCurve, curve1: &EdgeCurve, tol: &Tolerance) -> Vector3 {
    try_pair_normal(curve0, curve1, tol).unwrap_or_else(Vector3::z)
}

/// Like [`pair_normal`], but `None` when the curves do not determine a
/// plane (e.g. collinear lines).
#[must_use]
pub fn try_pair_normal(curve0: &EdgeCurve, curve1: &EdgeCurve, tol: &Tolerance) -> Option<Vector3> {
    let normal = match (curve0.as_line(), curve1.as_line()) {
        (Some(line0), Some(line1)) => {
            let d0 = line0.direction();
            let d1 = line1.direction();
            if tol.is_parallel(d0, d1) {
                let foot = ClosestPointOnCurve::new(curve1, *line0.origin())
                    .unbounded()
                    .execute();
                d0.cross(&(foot.point - line0.origin()))
            } else {
                d0.cross(d1)
            }
        }
        (Some(_), None) => curve_normal(curve1, tol),
        (None, _) => curve_normal(curve0, tol),
    };
    normal.try_normalize(tol.equal_vector)
}
