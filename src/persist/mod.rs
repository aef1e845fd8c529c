//! Versioned binary envelope for fillet configurations.
//!
//! A blob is a little-endian `u16` version followed by the configuration's
//! fields in their fixed order.

mod filer;

pub use filer::BinaryFiler;

use crate::error::{PersistError, Result};
use crate::operations::fillet::FilletConfig;

/// Version written by [`encode_config`].
pub const CURRENT_VERSION: u16 = 1;

/// Serializes `config` into a versioned blob.
#[must_use]
pub fn encode_config(config: &FilletConfig) -> Vec<u8> {
    let mut filer = BinaryFiler::new();
    filer.write_u16(CURRENT_VERSION);
    config.write_fields(&mut filer);
    filer.into_bytes()
}

/// Restores a configuration written by [`encode_config`].
///
/// # Errors
///
/// Returns [`PersistError::UnsupportedVersion`] for a blob of another
/// version, [`PersistError::Truncated`] if it ends early, and
/// [`PersistError::UnknownCrossingType`] for an invalid crossing code.
pub fn decode_config(bytes: &[u8]) -> Result<FilletConfig> {
    let mut filer = BinaryFiler::from_bytes(bytes);
    let version = filer.read_u16()?;
    if version != CURRENT_VERSION {
        tracing::warn!(version, "refusing fillet record of unknown version");
        return Err(PersistError::UnsupportedVersion {
            found: version,
            supported: CURRENT_VERSION,
        }
        .into());
    }
    let config = FilletConfig::read_fields(&mut filer)?;
    if filer.remaining() > 0 {
        tracing::debug!(extra = filer.remaining(), "trailing bytes after fillet record");
    }
    Ok(config)
}
