use crate::error::{FilletError, FilletResult};
use crate::geometry::curve::{Curve, EdgeCurve, Line};
use crate::math::transform::transform_point;
use crate::math::{Matrix4, Point3, Tolerance, Vector3};
use crate::operations::modification::trim_or_extend;
use crate::operations::offset::{unbounded_curve, OffsetIntersection, OffsetIntersections, OffsetSide};
use crate::operations::query::{param_distance, try_pair_normal, ClosestPointOnCurve};

use super::record::{FieldReader, FieldWriter, FilletConfigRecord};
use super::{CrossingType, FilletArc};

/// Persistent state that lets a fillet be recomputed the same way every time
/// its two curves change.
///
/// Two curves usually admit several fillets of a given radius. The first
/// solve picks one from the user's pick points; the configuration then
/// remembers which side of each curve it lies on (`crossing_type`,
/// `is_incoming`) and where it touched (`params`), and later solves choose
/// the candidate that matches.
#[derive(Debug, Clone, PartialEq)]
pub struct FilletConfig {
    is_incoming: [bool; 2],
    crossing_type: CrossingType,
    params: [f64; 2],
    arc_end_points: [Point3; 2],
    intersection_point: Option<Point3>,
    initialized: bool,
    pick_points: [Point3; 2],
    tolerance: Tolerance,
}

/// Result of one resolution pass, not yet committed.
#[derive(Debug, Clone)]
struct Solution {
    arc: FilletArc,
    curves: [EdgeCurve; 2],
    params: [f64; 2],
    end_points: [Point3; 2],
}

impl Default for FilletConfig {
    fn default() -> Self {
        Self {
            is_incoming: [true, true],
            crossing_type: CrossingType::default(),
            params: [0.0, 0.0],
            arc_end_points: [Point3::origin(); 2],
            intersection_point: None,
            initialized: false,
            pick_points: [Point3::origin(); 2],
            tolerance: Tolerance::default(),
        }
    }
}

impl FilletConfig {
    /// Creates an uninitialized configuration with default tolerances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an uninitialized configuration using `tolerance` for every
    /// geometric comparison.
    #[must_use]
    pub fn with_tolerance(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Seeds the configuration from two picked points, discarding any solved
    /// state. The next solve initializes from them.
    pub fn set_pick_points(&mut self, pick_points: [Point3; 2]) {
        self.pick_points = pick_points;
        self.initialized = false;
    }

    #[must_use]
    pub fn is_incoming(&self) -> [bool; 2] {
        self.is_incoming
    }

    #[must_use]
    pub fn crossing_type(&self) -> CrossingType {
        self.crossing_type
    }

    /// Parameters of the last tangency points.
    #[must_use]
    pub fn params(&self) -> [f64; 2] {
        self.params
    }

    #[must_use]
    pub fn arc_end_points(&self) -> [Point3; 2] {
        self.arc_end_points
    }

    /// Intersection of the two curves themselves, when one was found.
    #[must_use]
    pub fn intersection_point(&self) -> Option<Point3> {
        self.intersection_point
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Seeds of the next initialization; the origin once initialized.
    #[must_use]
    pub fn pick_points(&self) -> [Point3; 2] {
        self.pick_points
    }

    #[must_use]
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Derives the configuration from the pick points.
    ///
    /// Each curve is offset toward the pick point of the other curve, and
    /// among the offset intersections that can be classified, the one
    /// closest to both picks becomes the fillet center.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::InvalidGeometry`] if the curves do not define a
    /// plane or no candidate can be classified. The configuration is
    /// unchanged on failure.
    pub fn initialize_from_pick_points(
        &mut self,
        curves: [&EdgeCurve; 2],
        radius: f64,
    ) -> FilletResult<()> {
        let tol = self.tolerance;
        let normal = self.fillet_normal(curves[0], curves[1])?;
        let picks = self.pick_points;
        let sides = [
            pick_side(curves[0], &picks[1], &normal),
            pick_side(curves[1], &picks[0], &normal),
        ];

        let hits = OffsetIntersections::new(curves, normal, radius, sides, &tol)?;
        let seed = nearest_seed(curves, hits, radius, &picks).ok_or_else(|| {
            tracing::debug!(radius, ?sides, "no fillet candidate near the pick points");
            FilletError::InvalidGeometry("no fillet candidate near the pick points".into())
        })?;
        if seed.crossing_type.offset_sides(seed.is_incoming) != sides {
            tracing::warn!(
                ?sides,
                crossing_type = ?seed.crossing_type,
                is_incoming = ?seed.is_incoming,
                "picked sides disagree with the derived crossing"
            );
        }

        tracing::debug!(
            center = ?seed.hit.point,
            crossing_type = ?seed.crossing_type,
            is_incoming = ?seed.is_incoming,
            params = ?seed.hit.params,
            "fillet configuration initialized"
        );
        self.is_incoming = seed.is_incoming;
        self.crossing_type = seed.crossing_type;
        self.params = seed.hit.params;
        self.arc_end_points = if radius > 0.0 {
            seed.tangency
        } else {
            [seed.hit.point; 2]
        };
        self.initialized = true;
        // Seeds are consumed.
        self.pick_points = [Point3::origin(); 2];
        Ok(())
    }

    /// Computes the fillet of `curves`, trimming the flagged ones.
    ///
    /// Initializes from the pick points first if needed. With `persist`, the
    /// tangency parameters, tangency points, and the curves' own intersection
    /// are remembered for the next evaluation. With `adjust`, flagged line
    /// segments that were rotated about their fillet end are first re-anchored
    /// on the remembered intersection.
    ///
    /// `curves` are replaced with their trimmed versions only on success; on
    /// failure neither the curves nor the configuration change.
    ///
    /// # Errors
    ///
    /// Returns [`FilletError::InvalidGeometry`] when no fillet matching the
    /// configuration exists or a trim fails.
    pub fn evaluate(
        &mut self,
        persist: bool,
        curves: &mut [EdgeCurve; 2],
        radius: f64,
        trim: [bool; 2],
        adjust: bool,
    ) -> FilletResult<FilletArc> {
        let mut next = self.clone();
        if !next.initialized {
            next.initialize_from_pick_points([&curves[0], &curves[1]], radius)?;
        }
        let solution = next.solve(curves, radius, trim, adjust)?;
        if persist {
            next.intersection_point = if radius > 0.0 {
                next.curves_intersection(&solution.curves, solution.params)
            } else {
                Some(*solution.arc.center())
            };
            next.params = solution.params;
            next.arc_end_points = solution.end_points;
        }
        *self = next;
        *curves = solution.curves;
        Ok(solution.arc)
    }

    /// Computes the fillet and the trimmed curves without changing anything.
    ///
    /// An uninitialized configuration is initialized on a scratch copy.
    ///
    /// # Errors
    ///
    /// Same as [`FilletConfig::evaluate`].
    pub fn probe(
        &self,
        curves: &[EdgeCurve; 2],
        radius: f64,
        trim: [bool; 2],
        adjust: bool,
    ) -> FilletResult<(FilletArc, [EdgeCurve; 2])> {
        let solution = if self.initialized {
            self.solve(curves, radius, trim, adjust)?
        } else {
            let mut scratch = self.clone();
            scratch.initialize_from_pick_points([&curves[0], &curves[1]], radius)?;
            scratch.solve(curves, radius, trim, adjust)?
        };
        Ok((solution.arc, solution.curves))
    }

    /// Re-anchors a dragged line segment on the remembered intersection.
    ///
    /// Applies when `curve` is a segment whose end at the fillet still sits on
    /// the remembered tangency point while its direction no longer passes
    /// through the remembered intersection: that end is moved onto the
    /// intersection, keeping the segment's direction. Returns whether the
    /// curve was changed.
    pub fn adjust_tweaked_line(&self, curve: &mut EdgeCurve, index: usize) -> bool {
        let tol = &self.tolerance;
        let Some(inters) = self.intersection_point else {
            return false;
        };
        let Some(line) = curve.as_line() else {
            return false;
        };
        let (Some(start), Some(end)) = (line.start_point(), line.end_point()) else {
            return false;
        };
        let incoming = self.is_incoming[index];
        let (touch, far) = if incoming { (end, start) } else { (start, end) };
        if !tol.points_equal(&touch, &self.arc_end_points[index]) {
            return false;
        }
        let to_touch = touch - far;
        let to_inters = inters - far;
        if tol.is_zero_length(&to_inters) || tol.is_parallel(&to_touch, &to_inters) {
            return false;
        }
        let segment = if incoming {
            Line::segment(far, inters)
        } else {
            Line::segment(inters, far)
        };
        match segment {
            Ok(segment) => {
                tracing::debug!(index, ?inters, "re-anchoring tweaked line");
                *curve = segment.into();
                true
            }
            Err(_) => false,
        }
    }

    /// Applies a transform to the remembered points.
    ///
    /// The crossing type is kept, mirrors included: fillet normals map with
    /// the curves (see [`crate::operations::query::pair_normal`]), so each
    /// side keeps its image.
    pub fn transform_by(&mut self, matrix: &Matrix4) {
        self.arc_end_points = self.arc_end_points.map(|p| transform_point(matrix, &p));
        if !self.initialized {
            self.pick_points = self.pick_points.map(|p| transform_point(matrix, &p));
        }
        self.intersection_point = self
            .intersection_point
            .map(|p| transform_point(matrix, &p));
    }

    /// Snapshot of the persisted fields.
    #[must_use]
    pub fn to_record(&self) -> FilletConfigRecord {
        FilletConfigRecord {
            is_incoming: self.is_incoming,
            crossing_type: self.crossing_type,
            params: self.params,
            arc_end_points: self.arc_end_points,
            intersection_point: self.intersection_point,
            pick_points: (!self.initialized).then_some(self.pick_points),
        }
    }

    /// Restores a configuration from persisted fields, with default
    /// tolerances.
    #[must_use]
    pub fn from_record(record: &FilletConfigRecord) -> Self {
        Self {
            is_incoming: record.is_incoming,
            crossing_type: record.crossing_type,
            params: record.params,
            arc_end_points: record.arc_end_points,
            intersection_point: record.intersection_point,
            initialized: record.pick_points.is_none(),
            pick_points: record.pick_points.unwrap_or([Point3::origin(); 2]),
            tolerance: Tolerance::default(),
        }
    }

    /// Writes the persisted fields in their fixed order.
    pub fn write_fields<W: FieldWriter + ?Sized>(&self, writer: &mut W) {
        self.to_record().write_fields(writer);
    }

    /// Reads the persisted fields in their fixed order.
    ///
    /// # Errors
    ///
    /// Returns the reader's error if a field is missing or malformed.
    pub fn read_fields<R: FieldReader + ?Sized>(reader: &mut R) -> crate::error::Result<Self> {
        Ok(Self::from_record(&FilletConfigRecord::read_fields(reader)?))
    }

    fn fillet_normal(&self, curve0: &EdgeCurve, curve1: &EdgeCurve) -> FilletResult<Vector3> {
        try_pair_normal(curve0, curve1, &self.tolerance).ok_or_else(|| {
            FilletError::InvalidGeometry("curves do not define a fillet plane".into())
        })
    }

    /// Finds the fillet matching the stored configuration. Pure.
    fn solve(
        &self,
        curves: &[EdgeCurve; 2],
        radius: f64,
        trim: [bool; 2],
        adjust: bool,
    ) -> FilletResult<Solution> {
        if !self.initialized {
            return Err(FilletError::NotInitialized);
        }
        let tol = self.tolerance;
        let mut work = curves.clone();
        if adjust && radius > 0.0 {
            for (index, curve) in work.iter_mut().enumerate() {
                if trim[index] {
                    self.adjust_tweaked_line(curve, index);
                }
            }
        }

        let normal = self.fillet_normal(&work[0], &work[1])?;
        let sides = self.crossing_type.offset_sides(self.is_incoming);
        let mut best: Option<(f64, OffsetIntersection)> = None;
        let mut candidates = 0usize;
        for hit in OffsetIntersections::new([&work[0], &work[1]], normal, radius, sides, &tol)? {
            if !self.crossing_type.accepts(hit.configs[0]) {
                tracing::trace!(point = ?hit.point, configs = ?hit.configs, "candidate rejected");
                continue;
            }
            candidates += 1;
            let distance = param_distance(&work[0], hit.params[0], self.params[0], &tol)
                + param_distance(&work[1], hit.params[1], self.params[1], &tol);
            if best.as_ref().is_none_or(|(d, _)| distance < *d) {
                best = Some((distance, hit));
            }
        }
        let Some((_, hit)) = best else {
            tracing::debug!(radius, crossing_type = ?self.crossing_type, "no matching fillet");
            return Err(FilletError::InvalidGeometry(
                "no intersection matches the fillet configuration".into(),
            ));
        };
        tracing::trace!(candidates, center = ?hit.point, "fillet candidate chosen");

        let center = hit.point;
        let (arc, end_points) = if radius > 0.0 {
            let tangency = [
                work[0].evaluate(hit.params[0]),
                work[1].evaluate(hit.params[1]),
            ];
            let mut kept_dir = work[1].derivative(hit.params[1]);
            if self.is_incoming[1] {
                kept_dir = -kept_dir;
            }
            let arc = FilletArc::between(center, normal, radius, tangency, kept_dir, &tol)?;
            (arc, tangency)
        } else {
            (FilletArc::degenerate(center, normal), [center; 2])
        };

        for (index, curve) in work.iter_mut().enumerate() {
            if trim[index] {
                trim_or_extend(curve, hit.params[index], self.is_incoming[index], &tol)?;
            }
        }

        Ok(Solution {
            arc,
            curves: work,
            params: hit.params,
            end_points,
        })
    }

    /// Intersection of the full carriers of `curves` matching this
    /// configuration, nearest to `params`.
    fn curves_intersection(&self, curves: &[EdgeCurve; 2], params: [f64; 2]) -> Option<Point3> {
        let mut scratch = self.clone();
        scratch.params = params;
        let carriers = [unbounded_curve(&curves[0]), unbounded_curve(&curves[1])];
        scratch
            .solve(&carriers, 0.0, [false, false], false)
            .ok()
            .map(|solution| *solution.arc.center())
    }
}

/// A candidate center with the configuration it would establish.
#[derive(Debug, Clone)]
struct Seed {
    hit: OffsetIntersection,
    tangency: [Point3; 2],
    is_incoming: [bool; 2],
    crossing_type: CrossingType,
}

/// The classifiable candidate closest to both picks. Unclassifiable
/// candidates are skipped.
fn nearest_seed(
    curves: [&EdgeCurve; 2],
    hits: impl IntoIterator<Item = OffsetIntersection>,
    radius: f64,
    picks: &[Point3; 2],
) -> Option<Seed> {
    let pick_distance = |seed: &Seed| {
        (seed.hit.point - picks[0]).norm() + (seed.hit.point - picks[1]).norm()
    };
    hits.into_iter()
        .filter_map(|hit| match classify(curves, hit, radius, picks) {
            Ok(seed) => Some(seed),
            Err(err) => {
                tracing::trace!(%err, "skipping candidate");
                None
            }
        })
        .min_by(|a, b| pick_distance(a).total_cmp(&pick_distance(b)))
}

/// Derives the incoming flags and crossing type a candidate implies.
fn classify(
    curves: [&EdgeCurve; 2],
    hit: OffsetIntersection,
    radius: f64,
    picks: &[Point3; 2],
) -> FilletResult<Seed> {
    let center = hit.point;
    let tangency = [
        curves[0].evaluate(hit.params[0]),
        curves[1].evaluate(hit.params[1]),
    ];
    let unit = |v: Vector3| v.try_normalize(f64::MIN_POSITIVE).unwrap_or_else(Vector3::zeros);
    // Points from the fillet toward the discarded corner.
    let toward_corner = if radius > 0.0 {
        unit(tangency[0] - center) + unit(tangency[1] - center)
    } else {
        unit(center - picks[0]) + unit(center - picks[1])
    };
    let is_incoming = [
        curves[0].derivative(hit.params[0]).dot(&toward_corner) > 0.0,
        curves[1].derivative(hit.params[1]).dot(&toward_corner) > 0.0,
    ];
    let crossing_type = CrossingType::from_configs(hit.configs, is_incoming)?;
    Ok(Seed {
        hit,
        tangency,
        is_incoming,
        crossing_type,
    })
}

/// Side of `curve` on which `pick` lies.
fn pick_side(curve: &EdgeCurve, pick: &Point3, normal: &Vector3) -> OffsetSide {
    let carrier = unbounded_curve(curve);
    let foot = ClosestPointOnCurve::new(&carrier, *pick).unbounded().execute();
    let left = normal.cross(&carrier.derivative(foot.parameter));
    OffsetSide::from_left(left.dot(&(pick - foot.point)) >= 0.0)
}
