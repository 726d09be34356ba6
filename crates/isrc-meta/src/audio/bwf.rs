//! # Broadcast Wave (WAV)
//!
//! A WAV file is a RIFF container: `"RIFF" size[4, LE] "WAVE"` followed by
//! chunks of `id[4] size[4, LE] data`, each padded to an even length.
//!
//! The Broadcast Wave `bext` chunk stores the ISRC as a fixed-width,
//! NUL-padded ASCII field at byte 602 of the chunk data. The field is 12
//! bytes wide, so the code is written in compact form (`ZA80G2500123`).
//!
//! Embedding writes a zero-filled `bext` chunk carrying only the ISRC field,
//! inserts it immediately before the `data` chunk, drops any earlier `bext`
//! chunk, and rewrites the RIFF size.

use isrc_core::IsrcCode;

use crate::bytes::{push_u32_le, ByteReader};
use crate::codec::MetadataCodec;
use crate::error::CodecError;
use crate::fields::{EmbedFields, MetadataField};
use crate::format::ContainerFormat;

const RIFF_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// Offset of the ISRC field inside `bext` chunk data.
pub const BEXT_ISRC_OFFSET: usize = 602;
/// Width of the ISRC field.
pub const BEXT_ISRC_LEN: usize = 12;
/// Data length of the chunk this codec writes.
pub const BEXT_DATA_LEN: usize = BEXT_ISRC_OFFSET + BEXT_ISRC_LEN;

#[derive(Debug, Clone, Copy)]
struct Chunk {
    id: [u8; 4],
    /// Offset of the chunk header.
    offset: usize,
    /// Declared data length.
    size: usize,
    /// Offset just past the data and pad byte, clamped to the buffer.
    end: usize,
}

impl Chunk {
    fn data_start(&self) -> usize {
        self.offset + CHUNK_HEADER_LEN
    }
}

/// Walk the top-level chunks. A `data` chunk that claims more bytes than
/// remain is treated as running to the end of the buffer, which streaming
/// writers produce.
fn chunks(r: &ByteReader<'_>) -> Result<Vec<Chunk>, CodecError> {
    if r.bytes(0, 4)? != b"RIFF" || r.bytes(8, 4)? != b"WAVE" {
        return Err(r.malformed(0, "missing RIFF/WAVE header"));
    }
    let mut out = Vec::new();
    let mut pos = RIFF_HEADER_LEN;
    while pos + CHUNK_HEADER_LEN <= r.len() {
        let id = r.tag(pos)?;
        let size = r.u32_le(pos + 4)? as usize;
        let data_end = (pos + CHUNK_HEADER_LEN).saturating_add(size);
        if data_end > r.len() {
            if &id != b"data" {
                return Err(r.malformed(pos, format!("chunk {} overruns file", String::from_utf8_lossy(&id))));
            }
            out.push(Chunk {
                id,
                offset: pos,
                size,
                end: r.len(),
            });
            return Ok(out);
        }
        let end = (data_end + (size & 1)).min(r.len());
        out.push(Chunk {
            id,
            offset: pos,
            size,
            end,
        });
        pos = end;
    }
    Ok(out)
}

fn bext_chunk(code: &IsrcCode) -> Vec<u8> {
    let mut out = Vec::with_capacity(CHUNK_HEADER_LEN + BEXT_DATA_LEN);
    out.extend_from_slice(b"bext");
    push_u32_le(&mut out, BEXT_DATA_LEN as u32);
    let mut data = [0u8; BEXT_DATA_LEN];
    let compact = code.to_compact();
    let field = &mut data[BEXT_ISRC_OFFSET..];
    let n = compact.len().min(BEXT_ISRC_LEN);
    field[..n].copy_from_slice(&compact.as_bytes()[..n]);
    out.extend_from_slice(&data);
    out
}

/// Codec for RIFF/WAVE audio with a Broadcast Wave `bext` chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct BwfCodec;

impl MetadataCodec for BwfCodec {
    fn format(&self) -> ContainerFormat {
        ContainerFormat::Wav
    }

    fn locate(&self, data: &[u8]) -> Result<Option<MetadataField>, CodecError> {
        let r = ByteReader::new(data, ContainerFormat::Wav);
        let Some(bext) = chunks(&r)?.into_iter().find(|c| &c.id == b"bext") else {
            return Ok(None);
        };
        if bext.size <= BEXT_ISRC_OFFSET {
            tracing::debug!(size = bext.size, "bext chunk too short for an ISRC field");
            return Ok(None);
        }
        let offset = bext.data_start() + BEXT_ISRC_OFFSET;
        let length = (bext.size - BEXT_ISRC_OFFSET).min(BEXT_ISRC_LEN);
        let raw = r.bytes(offset, length)?;
        let value = raw.split(|&b| b == 0).next().unwrap_or_default();
        let text = String::from_utf8_lossy(value).trim().to_string();
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(MetadataField { offset, length, text }))
    }

    fn embed(&self, data: &[u8], code: &IsrcCode, _fields: &EmbedFields) -> Result<Vec<u8>, CodecError> {
        let r = ByteReader::new(data, ContainerFormat::Wav);
        let chunks = chunks(&r)?;
        if !chunks.iter().any(|c| &c.id == b"data") {
            return Err(r.malformed(RIFF_HEADER_LEN, "no data chunk"));
        }

        let mut out = Vec::with_capacity(data.len() + CHUNK_HEADER_LEN + BEXT_DATA_LEN);
        out.extend_from_slice(r.bytes(0, RIFF_HEADER_LEN)?);
        let mut inserted = false;
        for chunk in &chunks {
            match &chunk.id {
                b"bext" => {
                    tracing::debug!(offset = chunk.offset, "replacing existing bext chunk");
                    continue;
                }
                b"data" if !inserted => {
                    out.extend_from_slice(&bext_chunk(code));
                    inserted = true;
                }
                _ => {}
            }
            out.extend_from_slice(r.range(chunk.offset..chunk.end)?);
        }
        let tail = chunks.last().map_or(RIFF_HEADER_LEN, |c| c.end);
        out.extend_from_slice(r.range(tail..r.len())?);

        let riff_size = u32::try_from(out.len() - 8).map_err(|_| CodecError::TooLarge {
            format: ContainerFormat::Wav,
            size: out.len() - 8,
            limit: u32::MAX as usize,
        })?;
        out[4..8].copy_from_slice(&riff_size.to_le_bytes());
        Ok(out)
    }
}
