// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! Read/write cursors for DIS PDU buffer manipulation.
//!
//! The DIS wire format is big-endian throughout, IEEE-754 for floats.

use super::{DecodeError, DecodeResult};

/// Generate read methods for primitive types (eliminates code duplication)
///
/// Each generated method:
/// 1. Checks buffer bounds (returns `DecodeError::TruncatedPdu` if overflow)
/// 2. Reads N bytes from the buffer
/// 3. Converts bytes to value via `from_be_bytes()`
/// 4. Advances the offset
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> DecodeResult<$type> {
            if self.offset + $size > self.buffer.len() {
                return Err(DecodeError::TruncatedPdu { offset: self.offset });
            }
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(&self.buffer[self.offset..self.offset + $size]);
            self.offset += $size;
            Ok(<$type>::from_be_bytes(bytes))
        }
    };
}

/// Generate write methods for primitive types on the growable writer.
macro_rules! impl_write_be {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.buffer.extend_from_slice(&value.to_be_bytes());
        }
    };
}

/// Immutable cursor for reading DIS PDU fields (bounds-checked, zero-copy).
///
/// A failed read leaves no partial state worth salvaging: callers treat any
/// error as fatal for the current PDU and discard it.
pub struct PduReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> PduReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_be!(read_u8, u8, 1);
    impl_read_be!(read_u16_be, u16, 2);
    impl_read_be!(read_u32_be, u32, 4);

    pub fn read_f32_be(&mut self) -> DecodeResult<f32> {
        Ok(f32::from_bits(self.read_u32_be()?))
    }

    pub fn read_f64_be(&mut self) -> DecodeResult<f64> {
        if self.offset + 8 > self.buffer.len() {
            return Err(DecodeError::TruncatedPdu { offset: self.offset });
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.buffer[self.offset..self.offset + 8]);
        self.offset += 8;
        Ok(f64::from_be_bytes(bytes))
    }

    pub fn read_bytes(&mut self, len: usize) -> DecodeResult<&'a [u8]> {
        if self.offset + len > self.buffer.len() {
            return Err(DecodeError::TruncatedPdu { offset: self.offset });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// Advance past `len` bytes without interpreting them.
    pub fn skip(&mut self, len: usize) -> DecodeResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}

/// Growable big-endian writer, the encode counterpart of [`PduReader`].
///
/// Backs the synthetic Entity State encoder; production traffic is only ever
/// decoded, so writes are infallible appends rather than slice stores.
#[derive(Default)]
pub struct PduWriter {
    buffer: Vec<u8>,
}

impl PduWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::with_capacity(crate::config::ESPDU_FIXED_LEN) }
    }

    impl_write_be!(write_u8, u8);
    impl_write_be!(write_u16_be, u16);
    impl_write_be!(write_u32_be, u32);

    pub fn write_f32_be(&mut self, value: f32) {
        self.write_u32_be(value.to_bits());
    }

    pub fn write_f64_be(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}
