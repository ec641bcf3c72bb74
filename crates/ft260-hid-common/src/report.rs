//! Bounds-checked HID report parsing and building.
//!
//! Every decoded field access goes through [`ReportParser`], so a short or
//! malformed report surfaces as [`HidError::InvalidReport`] instead of an
//! out-of-bounds access.

use crate::{HidError, HidResult};

pub struct ReportParser {
    buffer: Vec<u8>,
    position: usize,
}

impl ReportParser {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            buffer: data.into(),
            position: 0,
        }
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            buffer: data.to_vec(),
            position: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    pub fn read_u8(&mut self) -> HidResult<u8> {
        if self.position >= self.buffer.len() {
            return Err(HidError::InvalidReport(
                "unexpected end of report".to_string(),
            ));
        }
        let value = self.buffer[self.position];
        self.position += 1;
        Ok(value)
    }

    pub fn read_bool(&mut self) -> HidResult<bool> {
        Ok(self.read_u8()? == 1)
    }

    pub fn read_u16_le(&mut self) -> HidResult<u16> {
        let lo = self.read_u8()? as u16;
        let hi = self.read_u8()? as u16;
        Ok(lo | (hi << 8))
    }

    pub fn read_bytes(&mut self, count: usize) -> HidResult<Vec<u8>> {
        if self.position + count > self.buffer.len() {
            return Err(HidError::InvalidReport(
                "unexpected end of report".to_string(),
            ));
        }
        let result = self.buffer[self.position..self.position + count].to_vec();
        self.position += count;
        Ok(result)
    }

    pub fn read_array<const N: usize>(&mut self) -> HidResult<[u8; N]> {
        let mut out = [0u8; N];
        for byte in out.iter_mut() {
            *byte = self.read_u8()?;
        }
        Ok(out)
    }

    pub fn skip(&mut self, count: usize) {
        self.position = (self.position + count).min(self.buffer.len());
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

pub struct ReportBuilder {
    buffer: Vec<u8>,
}

impl ReportBuilder {
    /// Builder over a zero-filled buffer of `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        Self {
            buffer: vec![0u8; len],
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn write_u16_le(&mut self, value: u16) -> &mut Self {
        self.buffer.push((value & 0xFF) as u8);
        self.buffer.push((value >> 8) as u8);
        self
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(data);
        self
    }

    /// Pad with zero bytes up to `len`.
    pub fn pad_to(&mut self, len: usize) -> &mut Self {
        while self.buffer.len() < len {
            self.buffer.push(0);
        }
        self
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
