mod trim;

pub use trim::trim_or_extend;
