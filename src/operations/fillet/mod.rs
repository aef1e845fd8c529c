//! Associative fillet resolution.
//!
//! A [`FilletConfig`] turns two curves and a radius into a [`FilletArc`],
//! choosing the same one of the possible fillets on every evaluation.

mod arc;
mod config;
mod crossing;
mod record;

#[cfg(test)]
mod tests;

pub use arc::FilletArc;
pub use config::FilletConfig;
pub use crossing::CrossingType;
pub use record::{FieldReader, FieldWriter, FilletConfigRecord};
