mod closest_point;
mod curve_normal;
mod intersect;
mod param_range;

pub(crate) use closest_point::EXTEND_FRACTION;
pub use closest_point::{ClosestPointOnCurve, ClosestPointResult};
pub use curve_normal::{curve_normal, pair_normal, try_pair_normal};
pub use intersect::{CurveCurveIntersect, CurveIntersection, IntersectionConfig};
pub use param_range::{curve_param_range, param_distance, ParamRange};
