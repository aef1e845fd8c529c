use crate::error::Result;
use crate::geometry::curve::{Curve, EdgeCurve};
use crate::math::{Point3, Tolerance, Vector3};
use crate::operations::query::{
    ClosestPointOnCurve, CurveCurveIntersect, CurveIntersection, IntersectionConfig,
};

use super::{offset_curves, unbounded_curve};

/// Side of a curve an offset is taken on, looking down the plane normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetSide {
    Left,
    Right,
}

impl OffsetSide {
    /// Sign applied to the offset distance.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
        }
    }

    #[must_use]
    pub fn from_left(left: bool) -> Self {
        if left {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// An intersection between offsets of two curves.
#[derive(Debug, Clone, Copy)]
pub struct OffsetIntersection {
    /// Where the two offsets meet: the center of a fillet of that radius.
    pub point: Point3,
    /// Parameter on each original curve of its point closest to `point`.
    pub params: [f64; 2],
    /// Configuration of each offset relative to the other.
    pub configs: [IntersectionConfig; 2],
}

/// Lazily enumerates the intersections between every offset piece of curve 0
/// and every offset piece of curve 1.
///
/// Pieces of curve 0 form the outer loop and pieces of curve 1 the inner
/// loop; each pair yields its intersections in the order of the first
/// curve's parameter. The sequence is finite.
pub struct OffsetIntersections {
    originals: [EdgeCurve; 2],
    mids: [Option<f64>; 2],
    offsets: [Vec<EdgeCurve>; 2],
    normal: Vector3,
    tol: Tolerance,
    next_pair: (usize, usize),
    pending: std::vec::IntoIter<CurveIntersection>,
}

impl OffsetIntersections {
    /// Offsets both curves by `distance` on the given sides.
    ///
    /// # Errors
    ///
    /// Returns an error if `normal` is zero-length or an offset cannot be
    /// built.
    pub fn new(
        curves: [&EdgeCurve; 2],
        normal: Vector3,
        distance: f64,
        sides: [OffsetSide; 2],
        tol: &Tolerance,
    ) -> Result<Self> {
        let offsets = [
            offset_curves(curves[0], &normal, distance * sides[0].sign(), tol)?,
            offset_curves(curves[1], &normal, distance * sides[1].sign(), tol)?,
        ];
        tracing::trace!(
            pieces0 = offsets[0].len(),
            pieces1 = offsets[1].len(),
            distance,
            "offset pieces"
        );
        let mid = |curve: &EdgeCurve| {
            let domain = curve.domain();
            domain
                .is_bounded()
                .then(|| 0.5 * (domain.t_min + domain.t_max))
        };
        Ok(Self {
            originals: [unbounded_curve(curves[0]), unbounded_curve(curves[1])],
            mids: [mid(curves[0]), mid(curves[1])],
            offsets,
            normal,
            tol: *tol,
            next_pair: (0, 0),
            pending: Vec::new().into_iter(),
        })
    }

    /// Parameter on original curve `i` closest to `point`, near `hint`.
    ///
    /// Periodic parameters are reported within half a period of the middle
    /// of the original's interval.
    fn original_param(&self, i: usize, point: &Point3, hint: f64) -> f64 {
        let curve = &self.originals[i];
        let t = ClosestPointOnCurve::new(curve, *point)
            .unbounded()
            .near(hint)
            .execute()
            .parameter;
        match (curve.period(), self.mids[i]) {
            (Some(period), Some(mid)) => {
                let low = mid - 0.5 * period;
                low + (t - low).rem_euclid(period)
            }
            _ => t,
        }
    }
}

impl Iterator for OffsetIntersections {
    type Item = OffsetIntersection;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(hit) = self.pending.next() {
                return Some(OffsetIntersection {
                    point: hit.point,
                    params: [
                        self.original_param(0, &hit.point, hit.params[0]),
                        self.original_param(1, &hit.point, hit.params[1]),
                    ],
                    configs: hit.configs,
                });
            }
            let (i, j) = self.next_pair;
            if i >= self.offsets[0].len() || self.offsets[1].is_empty() {
                return None;
            }
            self.pending = CurveCurveIntersect::new(
                &self.offsets[0][i],
                &self.offsets[1][j],
                self.normal,
                self.tol,
            )
            .execute()
            .into_iter();
            self.next_pair = if j + 1 < self.offsets[1].len() {
                (i, j + 1)
            } else {
                (i + 1, 0)
            };
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::curve::{Arc, Line};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn corner_offsets_meet_once() {
        let tol = Tolerance::default();
        let a: EdgeCurve = Line::segment(p(0.0, 0.0, 0.0), p(20.0, 0.0, 0.0)).unwrap().into();
        let b: EdgeCurve = Line::segment(p(0.0, 0.0, 0.0), p(0.0, 20.0, 0.0)).unwrap().into();
        let hits: Vec<_> = OffsetIntersections::new(
            [&a, &b],
            Vector3::z(),
            5.0,
            [OffsetSide::Left, OffsetSide::Right],
            &tol,
        )
        .unwrap()
        .collect();
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point, p(5.0, 5.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(hits[0].params[0], 5.0, epsilon = 1e-9);
        assert_relative_eq!(hits[0].params[1], 5.0, epsilon = 1e-9);
        assert_eq!(hits[0].configs[0], IntersectionConfig::LeftRight);
    }

    #[test]
    fn outer_circle_offsets_meet_twice() {
        let tol = Tolerance::default();
        let c0: EdgeCurve = Arc::circle(p(0.0, 0.0, 0.0), 10.0, Vector3::z(), Vector3::x())
            .unwrap()
            .into();
        let c1: EdgeCurve = Arc::circle(p(15.0, 0.0, 0.0), 10.0, Vector3::z(), Vector3::x())
            .unwrap()
            .into();
        let hits: Vec<_> = OffsetIntersections::new(
            [&c0, &c1],
            Vector3::z(),
            3.0,
            [OffsetSide::Right, OffsetSide::Right],
            &tol,
        )
        .unwrap()
        .collect();
        assert_eq!(hits.len(), 2);
        let h = (13.0f64 * 13.0 - 7.5 * 7.5).sqrt();
        assert_relative_eq!(hits[0].point, p(7.5, h, 0.0), epsilon = 1e-9);
        assert_relative_eq!(hits[1].point, p(7.5, -h, 0.0), epsilon = 1e-9);
        // Parameters are reported on the radius-10 originals, centred on π.
        let on_c0 = c0.evaluate(hits[0].params[0]);
        assert_relative_eq!(on_c0.coords.norm(), 10.0, epsilon = 1e-9);
        assert!(hits[1].params[0] > 0.0 && hits[1].params[0] < std::f64::consts::TAU);
    }

    #[test]
    fn collapsed_offset_yields_nothing() {
        let tol = Tolerance::default();
        let c0: EdgeCurve = Arc::circle(p(0.0, 0.0, 0.0), 2.0, Vector3::z(), Vector3::x())
            .unwrap()
            .into();
        let line: EdgeCurve = Line::new(p(-5.0, 0.0, 0.0), Vector3::x()).unwrap().into();
        let mut hits = OffsetIntersections::new(
            [&c0, &line],
            Vector3::z(),
            3.0,
            [OffsetSide::Left, OffsetSide::Left],
            &tol,
        )
        .unwrap();
        assert!(hits.next().is_none());
        assert!(hits.next().is_none());
    }
}
