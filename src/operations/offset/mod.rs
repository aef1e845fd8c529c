mod curve_offset;
mod offset_intersections;

pub use curve_offset::{offset_curves, unbounded_curve};
pub use offset_intersections::{OffsetIntersection, OffsetIntersections, OffsetSide};
