pub mod curve;
pub mod plane;

pub use curve::{Arc, Curve, CurveDomain, EdgeCurve, Ellipse, Line, OffsetCurve, Spline};
pub use plane::Plane;
