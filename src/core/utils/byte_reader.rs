use crate::core::error::{BinError, Result};

/// Bounds-checked cursor over a persisted byte buffer.
///
/// Every read validates the remaining length first and reports a
/// [`BinError::Serialization`] naming the section that was cut short.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Start reading at the beginning of `buffer`
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Current offset in bytes
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Fail unless at least `len` more bytes are available
    pub fn ensure(&self, len: usize, what: &str) -> Result<()> {
        if self.remaining() < len {
            return Err(BinError::serialization(format!(
                "truncated buffer while reading {}: need {} bytes at offset {}, {} available",
                what,
                len,
                self.position,
                self.remaining()
            )));
        }
        Ok(())
    }

    /// Consume the next `len` bytes
    pub fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        self.ensure(len, what)?;
        let bytes = &self.buffer[self.position..self.position + len];
        self.position += len;
        Ok(bytes)
    }

    /// Consume a native-endian `i32`
    pub fn read_i32(&mut self, what: &str) -> Result<i32> {
        let bytes = self.take(4, what)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Ok(i32::from_ne_bytes(raw))
    }

    /// Consume `count` native-endian `i32` values
    pub fn read_i32_slice(&mut self, count: usize, what: &str) -> Result<Vec<i32>> {
        let len = count
            .checked_mul(4)
            .ok_or_else(|| BinError::serialization(format!("{} length overflows", what)))?;
        let bytes = self.take(len, what)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(chunk);
                i32::from_ne_bytes(raw)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_header_and_slice() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2i32.to_ne_bytes());
        for v in [0i32, 3, 5] {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        bytes.push(9);

        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_i32("row count").unwrap(), 2);
        assert_eq!(reader.read_i32_slice(3, "offsets").unwrap(), vec![0, 3, 5]);
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.take(1, "values").unwrap(), &[9]);
        assert_eq!(reader.position(), bytes.len());
    }

    #[test]
    fn test_truncated_read_reports_section() {
        let bytes = [1u8, 0];
        let mut reader = ByteReader::new(&bytes);
        let err = reader.read_i32("row count").unwrap_err();
        assert!(err.to_string().contains("row count"));
        // A failed read does not advance the cursor
        assert_eq!(reader.position(), 0);
    }
}
