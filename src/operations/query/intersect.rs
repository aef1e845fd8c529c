use nalgebra::Matrix2;

use crate::geometry::curve::{Arc, Curve, CurveDomain, EdgeCurve, Line, SAMPLES};
use crate::geometry::Plane;
use crate::math::solve::{bisect_root, golden_min, linspace};
use crate::math::{Point2, Point3, Tolerance, Vector2, Vector3};

use super::ClosestPointOnCurve;

/// Below this sine of the crossing angle, an intersection is classified by
/// probing the neighborhood instead of by the tangent cross product.
const TANGENT_SIN: f64 = 1e-6;

/// Arc length used to probe either side of a touching intersection.
const PROBE_STEP: f64 = 1e-3;

/// How one curve passes the other at an intersection, looking down the
/// plane normal with the curve's parameter increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionConfig {
    /// Arrives from the left of the other curve and leaves to its right.
    LeftRight,
    /// Arrives from the right and leaves to the left.
    RightLeft,
    /// Touches the other curve from its left side.
    LeftLeft,
    /// Touches the other curve from its right side.
    RightRight,
    /// Could not be classified (e.g. overlapping curves).
    Unknown,
}

impl IntersectionConfig {
    /// Returns whether this is a touching (non-crossing) configuration.
    #[must_use]
    pub fn is_tangential(self) -> bool {
        matches!(self, Self::LeftLeft | Self::RightRight)
    }
}

/// Result of a curve-curve intersection.
#[derive(Debug, Clone, Copy)]
pub struct CurveIntersection {
    /// The intersection point.
    pub point: Point3,
    /// Parameter on each curve.
    pub params: [f64; 2],
    /// Configuration of each curve relative to the other.
    pub configs: [IntersectionConfig; 2],
}

/// Computes intersections between two curves lying in a common plane.
///
/// The curves are intersected in projection on the plane of `normal`;
/// projected crossings farther apart than `equal_point` in space are
/// dropped. Results are ordered by the parameter on the first curve.
pub struct CurveCurveIntersect<'a> {
    curve_a: &'a EdgeCurve,
    curve_b: &'a EdgeCurve,
    normal: Vector3,
    tol: Tolerance,
}

impl<'a> CurveCurveIntersect<'a> {
    /// Creates a new `CurveCurveIntersect` query.
    #[must_use]
    pub fn new(curve_a: &'a EdgeCurve, curve_b: &'a EdgeCurve, normal: Vector3, tol: Tolerance) -> Self {
        Self {
            curve_a,
            curve_b,
            normal,
            tol,
        }
    }

    /// Executes the query, returning all intersection points.
    #[must_use]
    pub fn execute(&self) -> Vec<CurveIntersection> {
        let Ok(plane) = Plane::from_normal(anchor(self.curve_a), self.normal) else {
            return Vec::new();
        };
        let raw = self.raw_hits(&plane);

        let mut hits: Vec<CurveIntersection> = Vec::new();
        for [ta, tb] in raw {
            let Some(ta) = self.in_domain(self.curve_a, ta) else {
                continue;
            };
            let Some(tb) = self.in_domain(self.curve_b, tb) else {
                continue;
            };
            let pa = self.curve_a.evaluate(ta);
            let pb = self.curve_b.evaluate(tb);
            if (pa - pb).norm() > self.tol.equal_point {
                continue;
            }
            let point = Point3::from((pa.coords + pb.coords) * 0.5);
            if hits
                .iter()
                .any(|h| (h.point - point).norm() <= self.tol.equal_point)
            {
                continue;
            }
            hits.push(CurveIntersection {
                point,
                params: [ta, tb],
                configs: self.classify(ta, tb),
            });
        }
        hits.sort_by(|a, b| a.params[0].total_cmp(&b.params[0]));
        hits
    }

    fn raw_hits(&self, plane: &Plane) -> Vec<[f64; 2]> {
        let coplanar = |arc: &Arc| arc.normal().dot(&self.normal).abs() >= 1.0 - 1e-9;
        match (self.curve_a, self.curve_b) {
            (EdgeCurve::Line(a), EdgeCurve::Line(b)) => self.line_line(plane, a, b),
            (EdgeCurve::Line(a), EdgeCurve::Arc(b)) if coplanar(b) => self.line_circle(plane, a, b),
            (EdgeCurve::Arc(a), EdgeCurve::Line(b)) if coplanar(a) => swap(self.line_circle(plane, b, a)),
            (EdgeCurve::Arc(a), EdgeCurve::Arc(b)) if coplanar(a) && coplanar(b) => {
                self.circle_circle(plane, a, b)
            }
            (EdgeCurve::Line(a), b) => self.line_curve(a, b),
            (a, EdgeCurve::Line(b)) => swap(self.line_curve(b, a)),
            (a, b) => self.curve_curve(plane, a, b),
        }
    }

    /// Maps `t` into the curve's domain, or rejects it.
    fn in_domain(&self, curve: &EdgeCurve, t: f64) -> Option<f64> {
        let domain = curve.domain();
        let eps = 1e-9 * (1.0 + t.abs());
        if let Some(period) = curve.period() {
            let wrapped = domain.t_min + (t - domain.t_min).rem_euclid(period);
            if domain.contains(wrapped, eps) {
                return Some(wrapped);
            }
            let below = wrapped - period;
            return domain.contains(below, eps).then_some(below);
        }
        domain.contains(t, eps).then_some(t)
    }

    fn line_line(&self, plane: &Plane, a: &Line, b: &Line) -> Vec<[f64; 2]> {
        let pa = plane.to_local(a.origin());
        let pb = plane.to_local(b.origin());
        let da = plane.to_local_dir(a.direction());
        let db = plane.to_local_dir(b.direction());
        let cross = da.perp(&db);
        if cross.abs() <= self.tol.equal_vector * da.norm() * db.norm() {
            return Vec::new();
        }
        let w = pb - pa;
        vec![[w.perp(&db) / cross, w.perp(&da) / cross]]
    }

    fn line_circle(&self, plane: &Plane, line: &Line, arc: &Arc) -> Vec<[f64; 2]> {
        let origin = plane.to_local(line.origin());
        let dir = plane.to_local_dir(line.direction());
        let center = plane.to_local(arc.center());
        let speed = dir.norm();
        if speed <= f64::EPSILON {
            return Vec::new();
        }
        let to_center = center - origin;
        let t_foot = to_center.dot(&dir) / (speed * speed);
        let h = to_center.perp(&dir).abs() / speed;
        let r = arc.radius();
        let line_params = if (h - r).abs() <= self.tol.equal_point {
            vec![t_foot]
        } else if h > r {
            Vec::new()
        } else {
            let dt = (r * r - h * h).sqrt() / speed;
            vec![t_foot - dt, t_foot + dt]
        };
        line_params
            .into_iter()
            .map(|t| [t, arc.angle_of(&line.evaluate(t))])
            .collect()
    }

    fn circle_circle(&self, plane: &Plane, a: &Arc, b: &Arc) -> Vec<[f64; 2]> {
        let ca = plane.to_local(a.center());
        let cb = plane.to_local(b.center());
        let (ra, rb) = (a.radius(), b.radius());
        let axis = cb - ca;
        let d = axis.norm();
        let eps = self.tol.equal_point;
        if d <= eps || d > ra + rb + eps || d < (ra - rb).abs() - eps {
            return Vec::new();
        }
        let along = (ra * ra - rb * rb + d * d) / (2.0 * d);
        let unit = axis / d;
        let foot = ca + unit * along;
        let touching = (d - (ra + rb)).abs() <= eps || (d - (ra - rb).abs()).abs() <= eps;
        let h2 = ra * ra - along * along;
        let points: Vec<Point2> = if touching || h2 <= 0.0 {
            vec![ca + unit * ra.copysign(along)]
        } else {
            let perp = Vector2::new(-unit.y, unit.x) * h2.sqrt();
            vec![foot + perp, foot - perp]
        };
        points
            .into_iter()
            .map(|p| {
                let p3 = plane.point_at(&p);
                [a.angle_of(&p3), b.angle_of(&p3)]
            })
            .collect()
    }

    /// Roots of the signed distance from `curve` to an infinite `line`.
    fn line_curve(&self, line: &Line, curve: &EdgeCurve) -> Vec<[f64; 2]> {
        let Some(side) = self.normal.cross(line.direction()).try_normalize(f64::EPSILON) else {
            return Vec::new();
        };
        let domain = curve.domain();
        if !domain.is_bounded() {
            return Vec::new();
        }
        let f = |t: f64| (curve.evaluate(t) - line.origin()).dot(&side);
        let ts: Vec<f64> = linspace(domain.t_min, domain.t_max, SAMPLES).collect();
        let fs: Vec<f64> = ts.iter().map(|t| f(*t)).collect();

        let mut roots = Vec::new();
        for i in 0..ts.len() {
            if fs[i] == 0.0 {
                roots.push(ts[i]);
            } else if i + 1 < ts.len() && fs[i] * fs[i + 1] < 0.0 {
                roots.push(bisect_root(f, ts[i], ts[i + 1], fs[i]));
            }
        }
        for i in 1..ts.len() - 1 {
            let same_side = fs[i - 1].signum() == fs[i].signum() && fs[i].signum() == fs[i + 1].signum();
            if same_side && fs[i].abs() <= fs[i - 1].abs() && fs[i].abs() <= fs[i + 1].abs() {
                let t = golden_min(|t| f(t).abs(), ts[i - 1], ts[i + 1]);
                if f(t).abs() <= self.tol.equal_point {
                    roots.push(t);
                }
            }
        }
        roots
            .into_iter()
            .map(|t| [line.param_of(&curve.evaluate(t)), t])
            .collect()
    }

    /// Crossings and near-touches of two sampled curves, refined in the plane.
    fn curve_curve(&self, plane: &Plane, a: &EdgeCurve, b: &EdgeCurve) -> Vec<[f64; 2]> {
        let (da, db) = (a.domain(), b.domain());
        if !da.is_bounded() || !db.is_bounded() {
            return Vec::new();
        }
        let sample = |c: &EdgeCurve, d: CurveDomain| -> Vec<(f64, Point2)> {
            linspace(d.t_min, d.t_max, SAMPLES)
                .map(|t| (t, plane.to_local(&c.evaluate(t))))
                .collect()
        };
        let sa = sample(a, da);
        let sb = sample(b, db);

        let mut seeds = Vec::new();
        for wa in sa.windows(2) {
            let (a0, a1) = (wa[0].1, wa[1].1);
            let len_a = (a1 - a0).norm();
            for wb in sb.windows(2) {
                let (b0, b1) = (wb[0].1, wb[1].1);
                let len_b = (b1 - b0).norm();
                let margin = 0.5 * (len_a + len_b);
                if !boxes_overlap(a0, a1, b0, b1, margin) {
                    continue;
                }
                let (u, w) = segment_params(a0, a1, b0, b1).unwrap_or((0.5, 0.5));
                let u = u.clamp(0.0, 1.0);
                let w = w.clamp(0.0, 1.0);
                let pa = a0 + (a1 - a0) * u;
                let pb = b0 + (b1 - b0) * w;
                if (pa - pb).norm() > margin {
                    continue;
                }
                seeds.push([
                    wa[0].0 + (wa[1].0 - wa[0].0) * u,
                    wb[0].0 + (wb[1].0 - wb[0].0) * w,
                ]);
            }
        }

        let mut found: Vec<[f64; 2]> = Vec::new();
        for seed in seeds {
            if let Some(hit) = self.refine(plane, a, b, seed) {
                let duplicate = found.iter().any(|f| {
                    (f[0] - hit[0]).abs() <= 1e-9 * (1.0 + hit[0].abs())
                        && (f[1] - hit[1]).abs() <= 1e-9 * (1.0 + hit[1].abs())
                });
                if !duplicate {
                    found.push(hit);
                }
            }
        }
        found
    }

    /// Damped Gauss-Newton on `a(s) - b(t) = 0` in plane coordinates.
    fn refine(&self, plane: &Plane, a: &EdgeCurve, b: &EdgeCurve, seed: [f64; 2]) -> Option<[f64; 2]> {
        let keep = |c: &EdgeCurve, t: f64| {
            if c.period().is_some() {
                t
            } else {
                c.domain().clamp(t)
            }
        };
        let [mut s, mut t] = seed;
        for _ in 0..80 {
            let f = plane.to_local(&a.evaluate(s)) - plane.to_local(&b.evaluate(t));
            let ja = plane.to_local_dir(&a.derivative(s));
            let jb = -plane.to_local_dir(&b.derivative(t));
            let j = Matrix2::from_columns(&[ja, jb]);
            let jtj = j.transpose() * j;
            let damping = 1e-12 * jtj.trace().max(f64::MIN_POSITIVE);
            let Some(inverse) = (jtj + Matrix2::identity() * damping).try_inverse() else {
                break;
            };
            let step = -(inverse * (j.transpose() * f));
            s = keep(a, s + step.x);
            t = keep(b, t + step.y);
            if step.x.abs() <= 1e-15 * (1.0 + s.abs()) && step.y.abs() <= 1e-15 * (1.0 + t.abs()) {
                break;
            }
        }
        ((a.evaluate(s) - b.evaluate(t)).norm() <= self.tol.equal_point).then_some([s, t])
    }

    fn classify(&self, ta: f64, tb: f64) -> [IntersectionConfig; 2] {
        let da = self.curve_a.derivative(ta);
        let db = self.curve_b.derivative(tb);
        let scale = da.norm() * db.norm();
        if scale > f64::MIN_POSITIVE {
            let sin = self.normal.dot(&da.cross(&db)) / scale;
            if sin > TANGENT_SIN {
                return [IntersectionConfig::LeftRight, IntersectionConfig::RightLeft];
            }
            if sin < -TANGENT_SIN {
                return [IntersectionConfig::RightLeft, IntersectionConfig::LeftRight];
            }
        }
        [
            self.probe(self.curve_a, ta, self.curve_b, tb),
            self.probe(self.curve_b, tb, self.curve_a, ta),
        ]
    }

    /// Classifies `x` near `tx` by which side of `y` it is on just before
    /// and just after the contact.
    fn probe(&self, x: &EdgeCurve, tx: f64, y: &EdgeCurve, ty: f64) -> IntersectionConfig {
        let speed = x.derivative(tx).norm();
        if speed <= f64::MIN_POSITIVE {
            return IntersectionConfig::Unknown;
        }
        let h = PROBE_STEP / speed;
        let side = |t: f64| {
            let q = x.evaluate(t);
            let foot = ClosestPointOnCurve::new(y, q).unbounded().near(ty).execute();
            let left = self.normal.cross(&y.derivative(foot.parameter));
            let s = (q - foot.point).dot(&left);
            if s.abs() <= 1e-12 * (1.0 + q.coords.amax()) {
                0
            } else if s > 0.0 {
                1
            } else {
                -1
            }
        };
        match (side(tx - h), side(tx + h)) {
            (1, -1) => IntersectionConfig::LeftRight,
            (-1, 1) => IntersectionConfig::RightLeft,
            (1, 1) => IntersectionConfig::LeftLeft,
            (-1, -1) => IntersectionConfig::RightRight,
            _ => IntersectionConfig::Unknown,
        }
    }
}

fn swap(hits: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
    hits.into_iter().map(|[a, b]| [b, a]).collect()
}

/// A point near the curve, used as the origin of the projection plane.
fn anchor(curve: &EdgeCurve) -> Point3 {
    match curve {
        EdgeCurve::Line(line) => *line.origin(),
        EdgeCurve::Arc(arc) => *arc.center(),
        EdgeCurve::Ellipse(ellipse) => *ellipse.center(),
        other => {
            let domain = other.domain();
            let t = if domain.is_bounded_below() { domain.t_min } else { 0.0 };
            other.evaluate(t)
        }
    }
}

fn boxes_overlap(a0: Point2, a1: Point2, b0: Point2, b1: Point2, margin: f64) -> bool {
    let (amin, amax) = (a0.inf(&a1), a0.sup(&a1));
    let (bmin, bmax) = (b0.inf(&b1), b0.sup(&b1));
    amin.x <= bmax.x + margin
        && bmin.x <= amax.x + margin
        && amin.y <= bmax.y + margin
        && bmin.y <= amax.y + margin
}

/// Parameters `(u, w)` where the carrier lines of two segments cross.
fn segment_params(a0: Point2, a1: Point2, b0: Point2, b1: Point2) -> Option<(f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let cross = da.perp(&db);
    if cross.abs() <= f64::EPSILON * da.norm() * db.norm() {
        return None;
    }
    let w = b0 - a0;
    Some((w.perp(&db) / cross, w.perp(&da) / cross))
}
