use thiserror::Error;

/// Top-level error type for the geofillet crate.
#[derive(Debug, Error)]
pub enum GeofilletError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Fillet(#[from] FilletError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl GeofilletError {
    /// Returns the fillet error kind, if this is a fillet failure.
    #[must_use]
    pub fn as_fillet(&self) -> Option<&FilletError> {
        match self {
            Self::Fillet(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors related to curve construction and evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,

    #[error("invalid knot vector: {0}")]
    InvalidKnots(String),

    #[error("transform does not scale uniformly")]
    NonUniformScale,
}

/// Errors produced while resolving a fillet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilletError {
    /// No valid fillet exists for the inputs and stored configuration.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The configuration was used before it was initialized.
    #[error("fillet configuration is not initialized")]
    NotInitialized,
}

impl From<GeometryError> for FilletError {
    fn from(err: GeometryError) -> Self {
        Self::InvalidGeometry(err.to_string())
    }
}

impl From<GeofilletError> for FilletError {
    fn from(err: GeofilletError) -> Self {
        match err {
            GeofilletError::Fillet(err) => err,
            other => Self::InvalidGeometry(other.to_string()),
        }
    }
}

/// Errors related to reading or writing persisted fillet state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersistError {
    #[error("unsupported record version {found} (supported: {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },

    #[error("record ended before all fields were read")]
    Truncated,

    #[error("unknown crossing type code {0}")]
    UnknownCrossingType(i32),
}

/// Errors related to the host drawing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),
}

/// Convenience type alias for results using [`GeofilletError`].
pub type Result<T> = std::result::Result<T, GeofilletError>;

/// Result of a fillet resolution step.
pub type FilletResult<T> = std::result::Result<T, FilletError>;
