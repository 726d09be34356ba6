//! Bounds-checked reads over an untrusted container buffer.
//!
//! Every read that would run past the end of the buffer yields
//! [`CodecError::Malformed`] instead of panicking.

use std::ops::Range;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::CodecError;
use crate::format::ContainerFormat;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    format: ContainerFormat,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8], format: ContainerFormat) -> Self {
        Self { data, format }
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8], CodecError> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| {
                CodecError::malformed(
                    self.format,
                    offset,
                    format!("need {len} bytes, buffer is {} bytes", self.data.len()),
                )
            })
    }

    pub(crate) fn range(&self, range: Range<usize>) -> Result<&'a [u8], CodecError> {
        let len = range.end.saturating_sub(range.start);
        self.bytes(range.start, len)
    }

    pub(crate) fn u8_at(&self, offset: usize) -> Result<u8, CodecError> {
        Ok(self.bytes(offset, 1)?[0])
    }

    pub(crate) fn u16_be(&self, offset: usize) -> Result<u16, CodecError> {
        Ok(BigEndian::read_u16(self.bytes(offset, 2)?))
    }

    pub(crate) fn u32_be(&self, offset: usize) -> Result<u32, CodecError> {
        Ok(BigEndian::read_u32(self.bytes(offset, 4)?))
    }

    pub(crate) fn u32_le(&self, offset: usize) -> Result<u32, CodecError> {
        Ok(LittleEndian::read_u32(self.bytes(offset, 4)?))
    }

    pub(crate) fn tag(&self, offset: usize) -> Result<[u8; 4], CodecError> {
        let b = self.bytes(offset, 4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    pub(crate) fn malformed(&self, offset: usize, reason: impl Into<String>) -> CodecError {
        CodecError::malformed(self.format, offset, reason)
    }
}

pub(crate) fn push_u16_be(out: &mut Vec<u8>, value: u16) {
    let mut buf = [0u8; 2];
    BigEndian::write_u16(&mut buf, value);
    out.extend_from_slice(&buf);
}

pub(crate) fn push_u16_le(out: &mut Vec<u8>, value: u16) {
    let mut buf = [0u8; 2];
    LittleEndian::write_u16(&mut buf, value);
    out.extend_from_slice(&buf);
}

pub(crate) fn push_u32_be(out: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    BigEndian::write_u32(&mut buf, value);
    out.extend_from_slice(&buf);
}

pub(crate) fn push_u32_le(out: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    out.extend_from_slice(&buf);
}

/// Whether `needle` occurs anywhere in `haystack`.
pub(crate) fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
