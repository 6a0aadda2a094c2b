/*!
 * Copyright (c) 2022 Microsoft Corporation. All rights reserved.
 * Licensed under the MIT License. See LICENSE file in the project root for license information.
 */

use std::io;

/// An interface for serializing binary data to a sink.
///
/// Bin stores write their persisted layout through this trait, back to back
/// with no padding between sections.
pub trait BinaryWriter {
    /// Append data to this binary target
    ///
    /// # Returns
    /// Number of bytes written, or an error if the write fails
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Total number of bytes written so far
    fn bytes_written(&self) -> usize;
}

/// A simple implementation of BinaryWriter that writes to a Vec<u8>
#[derive(Debug, Clone, Default)]
pub struct VecBinaryWriter {
    buffer: Vec<u8>,
}

impl VecBinaryWriter {
    /// Create a new VecBinaryWriter with an empty buffer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new VecBinaryWriter with a pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Get a reference to the internal buffer
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the length of the buffer
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Take ownership of the internal buffer
    pub fn into_buffer(self) -> Vec<u8> {
        self.buffer
    }
}

impl BinaryWriter for VecBinaryWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(data);
        Ok(data.len())
    }

    fn bytes_written(&self) -> usize {
        self.buffer.len()
    }
}

/// Adapter that forwards to any `std::io::Write` sink (files, sockets).
#[derive(Debug)]
pub struct IoBinaryWriter<W: io::Write> {
    inner: W,
    written: usize,
}

impl<W: io::Write> IoBinaryWriter<W> {
    /// Wrap a writer
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Flush and return the wrapped writer
    pub fn into_inner(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: io::Write> BinaryWriter for IoBinaryWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.inner.write_all(data)?;
        self.written += data.len();
        Ok(data.len())
    }

    fn bytes_written(&self) -> usize {
        self.written
    }
}
