use crate::error::Result;
use crate::geometry::curve::{Arc, Curve, EdgeCurve};
use crate::math::{Matrix4, Point3, Tolerance};
use crate::operations::fillet::{FilletArc, FilletConfig};

use super::{ArcId, CurveId, Drawing};

/// Outcome of the last evaluation of a [`FilletAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    /// The drawing holds the current fillet.
    UpToDate,
    /// The last evaluation found no fillet; the drawing kept its old state.
    Failed,
    /// An input curve is gone, so the action and its arc were removed.
    Erased,
}

/// Geometry a fillet action would write into the drawing.
#[derive(Debug, Clone)]
pub struct NewGeometry {
    /// Both inputs after trimming; untrimmed inputs are unchanged copies.
    pub curves: [EdgeCurve; 2],
    /// The solved fillet.
    pub fillet: FilletArc,
    /// Drawable arc, `None` when the fillet degenerates to a point.
    pub arc: Option<Arc>,
}

/// Keeps a fillet arc associated with two curves of a [`Drawing`].
///
/// Each evaluation re-solves the fillet from the current curves, writes the
/// trimmed curves back, and creates, updates, or erases the arc entity.
#[derive(Debug, Clone)]
pub struct FilletAction {
    inputs: [CurveId; 2],
    trim: [bool; 2],
    radius: f64,
    config: FilletConfig,
    arc: Option<ArcId>,
    status: ActionStatus,
}

impl FilletAction {
    /// Creates the action and evaluates it once.
    ///
    /// # Errors
    ///
    /// Returns the failure of the first evaluation; the drawing is then
    /// unchanged.
    pub fn create(
        drawing: &mut Drawing,
        inputs: [CurveId; 2],
        trim: [bool; 2],
        pick_points: [Point3; 2],
        radius: f64,
    ) -> Result<Self> {
        let mut config = FilletConfig::new();
        config.set_pick_points(pick_points);
        let mut action = Self {
            inputs,
            trim,
            radius: radius.abs(),
            config,
            arc: None,
            status: ActionStatus::UpToDate,
        };
        action.evaluate(drawing)?;
        Ok(action)
    }

    #[must_use]
    pub fn inputs(&self) -> [CurveId; 2] {
        self.inputs
    }

    #[must_use]
    pub fn trim(&self) -> [bool; 2] {
        self.trim
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Sets the radius used by the next evaluation. Negative values are
    /// taken by magnitude.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.abs();
    }

    #[must_use]
    pub fn config(&self) -> &FilletConfig {
        &self.config
    }

    /// Id of the arc entity, if the fillet currently has one.
    #[must_use]
    pub fn arc(&self) -> Option<ArcId> {
        self.arc
    }

    #[must_use]
    pub fn status(&self) -> ActionStatus {
        self.status
    }

    /// Solves the fillet for the current input curves.
    ///
    /// With `persist` the resolver remembers the solution; otherwise the
    /// action is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if an input curve is missing or no fillet exists.
    pub fn compute_new_geometry(&mut self, drawing: &Drawing, persist: bool) -> Result<NewGeometry> {
        let mut curves = [
            drawing.curve(self.inputs[0])?.clone(),
            drawing.curve(self.inputs[1])?.clone(),
        ];
        let fillet = if persist {
            self.config
                .evaluate(true, &mut curves, self.radius, self.trim, true)?
        } else {
            let (fillet, trimmed) = self.config.probe(&curves, self.radius, self.trim, true)?;
            curves = trimmed;
            fillet
        };
        let arc = if self.radius > 0.0 && !fillet.is_degenerate() {
            Some(fillet.to_arc()?)
        } else {
            None
        };
        Ok(NewGeometry { curves, fillet, arc })
    }

    /// Re-solves the fillet and writes the result into `drawing`.
    ///
    /// A missing input curve erases the action together with its arc. An
    /// erased action stays erased.
    ///
    /// # Errors
    ///
    /// Returns the resolver's error when no fillet exists; the action is then
    /// marked [`ActionStatus::Failed`] and neither the drawing nor the
    /// resolver state changes.
    pub fn evaluate(&mut self, drawing: &mut Drawing) -> Result<ActionStatus> {
        if self.status == ActionStatus::Erased {
            return Ok(self.status);
        }
        if self.inputs.iter().any(|&id| drawing.curve(id).is_err()) {
            tracing::debug!(inputs = ?self.inputs, "fillet input removed, erasing action");
            self.erase(drawing);
            return Ok(self.status);
        }

        let geometry = match self.compute_new_geometry(drawing, true) {
            Ok(geometry) => geometry,
            Err(err) => {
                tracing::warn!(%err, radius = self.radius, "fillet evaluation failed");
                self.status = ActionStatus::Failed;
                return Err(err);
            }
        };

        let NewGeometry { curves, arc, .. } = geometry;
        for ((id, trim), curve) in self.inputs.into_iter().zip(self.trim).zip(curves) {
            if trim {
                *drawing.curve_mut(id)? = curve;
            }
        }

        match (arc, self.arc) {
            (Some(arc), Some(id)) if drawing.arc(id).is_ok() => *drawing.arc_mut(id)? = arc,
            (Some(arc), _) => self.arc = Some(drawing.add_arc(arc)),
            (None, Some(id)) => {
                drawing.remove_arc(id);
                self.arc = None;
            }
            (None, None) => {}
        }
        self.status = ActionStatus::UpToDate;
        Ok(self.status)
    }

    /// Returns whether the drawing already holds what an evaluation would
    /// produce. Read-only.
    ///
    /// # Errors
    ///
    /// Returns an error if an input curve is missing.
    pub fn matches_current_geometry(&self, drawing: &Drawing) -> Result<bool> {
        let curves = [
            drawing.curve(self.inputs[0])?.clone(),
            drawing.curve(self.inputs[1])?.clone(),
        ];
        let Ok((fillet, trimmed)) = self.config.probe(&curves, self.radius, self.trim, true) else {
            return Ok(false);
        };
        let tol = self.config.tolerance();
        if !curves
            .iter()
            .zip(&trimmed)
            .all(|(current, new)| same_extent(current, new, &tol))
        {
            return Ok(false);
        }

        let drawable = self.radius > 0.0 && !fillet.is_degenerate();
        Ok(match (drawable, self.arc) {
            (true, Some(id)) => drawing
                .arc(id)
                .is_ok_and(|arc| fillet.matches_arc(arc, &tol)),
            (false, None) => true,
            _ => false,
        })
    }

    /// Carries the resolver state through a transform of the drawing.
    pub fn transform_by(&mut self, matrix: &Matrix4) {
        self.config.transform_by(matrix);
    }

    fn erase(&mut self, drawing: &mut Drawing) {
        if let Some(id) = self.arc.take() {
            drawing.remove_arc(id);
        }
        self.status = ActionStatus::Erased;
    }
}

/// Whether two curves cover the same stretch of space.
fn same_extent(a: &EdgeCurve, b: &EdgeCurve, tol: &Tolerance) -> bool {
    let same = |p: Option<Point3>, q: Option<Point3>| match (p, q) {
        (Some(p), Some(q)) => tol.points_equal(&p, &q),
        (None, None) => true,
        _ => false,
    };
    same(a.start_point(), b.start_point())
        && same(a.end_point(), b.end_point())
        && tol.points_equal(&a.evaluate(mid_param(a)), &b.evaluate(mid_param(b)))
}

fn mid_param(curve: &EdgeCurve) -> f64 {
    let domain = curve.domain();
    if domain.is_bounded() {
        0.5 * (domain.t_min + domain.t_max)
    } else {
        domain.clamp(0.0)
    }
}
