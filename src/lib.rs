pub mod document;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod persist;

pub use error::{GeofilletError, Result};
pub use operations::fillet::{CrossingType, FilletArc, FilletConfig};
