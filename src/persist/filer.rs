use crate::error::{PersistError, Result};
use crate::operations::fillet::{FieldReader, FieldWriter};

/// Little-endian byte buffer that reads and writes persisted fields.
///
/// Booleans take one byte, integers and floats their natural width.
#[derive(Debug, Clone, Default)]
pub struct BinaryFiler {
    bytes: Vec<u8>,
    cursor: usize,
}

impl BinaryFiler {
    /// Creates an empty filer for writing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filer that reads `bytes` from the start.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            cursor: 0,
        }
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Bytes not read yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    pub fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// # Errors
    ///
    /// Returns [`PersistError::Truncated`] if fewer than two bytes remain.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.cursor + N;
        let chunk = self
            .bytes
            .get(self.cursor..end)
            .ok_or(PersistError::Truncated)?;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        self.cursor = end;
        Ok(out)
    }
}

impl FieldWriter for BinaryFiler {
    fn write_bool(&mut self, value: bool) {
        self.bytes.push(u8::from(value));
    }

    fn write_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn write_f64(&mut self, value: f64) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }
}

impl FieldReader for BinaryFiler {
    fn read_bool(&mut self) -> Result<bool> {
        let [byte] = self.take::<1>()?;
        Ok(byte != 0)
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take()?))
    }
}
