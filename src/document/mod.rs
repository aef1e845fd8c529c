//! A minimal host drawing that keeps fillets associated with their curves.

mod action;

pub use action::{ActionStatus, FilletAction, NewGeometry};

use crate::error::{DocumentError, Result};
use crate::geometry::curve::{Arc, EdgeCurve};
use crate::math::Matrix4;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Identifier of a curve in a [`Drawing`].
    pub struct CurveId;

    /// Identifier of a fillet arc in a [`Drawing`].
    pub struct ArcId;
}

/// Arena owning the curves and arcs of a drawing.
///
/// Ids are generational, so an id of a removed entity never resolves to a
/// later one.
#[derive(Debug, Default)]
pub struct Drawing {
    curves: SlotMap<CurveId, EdgeCurve>,
    arcs: SlotMap<ArcId, Arc>,
}

impl Drawing {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Curves ---

    pub fn add_curve(&mut self, curve: impl Into<EdgeCurve>) -> CurveId {
        self.curves.insert(curve.into())
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::EntityNotFound`] for a stale id.
    pub fn curve(&self, id: CurveId) -> Result<&EdgeCurve> {
        self.curves
            .get(id)
            .ok_or_else(|| DocumentError::EntityNotFound("curve".into()).into())
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::EntityNotFound`] for a stale id.
    pub fn curve_mut(&mut self, id: CurveId) -> Result<&mut EdgeCurve> {
        self.curves
            .get_mut(id)
            .ok_or_else(|| DocumentError::EntityNotFound("curve".into()).into())
    }

    pub fn remove_curve(&mut self, id: CurveId) -> Option<EdgeCurve> {
        self.curves.remove(id)
    }

    #[must_use]
    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    // --- Arcs ---

    pub fn add_arc(&mut self, arc: Arc) -> ArcId {
        self.arcs.insert(arc)
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::EntityNotFound`] for a stale id.
    pub fn arc(&self, id: ArcId) -> Result<&Arc> {
        self.arcs
            .get(id)
            .ok_or_else(|| DocumentError::EntityNotFound("arc".into()).into())
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::EntityNotFound`] for a stale id.
    pub fn arc_mut(&mut self, id: ArcId) -> Result<&mut Arc> {
        self.arcs
            .get_mut(id)
            .ok_or_else(|| DocumentError::EntityNotFound("arc".into()).into())
    }

    pub fn remove_arc(&mut self, id: ArcId) -> Option<Arc> {
        self.arcs.remove(id)
    }

    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Transforms every entity. Nothing changes if any entity fails to
    /// transform.
    ///
    /// Fillet actions keep their cached points only if
    /// [`FilletAction::transform_by`] sees the same matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if `matrix` is not a similarity.
    pub fn transform(&mut self, matrix: &Matrix4) -> Result<()> {
        let curves = self
            .curves
            .iter()
            .map(|(id, curve)| Ok((id, curve.transformed(matrix)?)))
            .collect::<Result<Vec<_>>>()?;
        let arcs = self
            .arcs
            .iter()
            .map(|(id, arc)| Ok((id, arc.transformed(matrix)?)))
            .collect::<Result<Vec<_>>>()?;
        for (id, curve) in curves {
            self.curves[id] = curve;
        }
        for (id, arc) in arcs {
            self.arcs[id] = arc;
        }
        Ok(())
    }
}
