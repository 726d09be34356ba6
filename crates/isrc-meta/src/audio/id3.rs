//! # ID3v2 (MP3)
//!
//! ## Layout
//!
//! ```text
//! "ID3" major revision flags size[4, synchsafe]   10-byte header
//! [extended header]                               if flags & 0x40
//! frame*  = id[4] size[4] flags[2] payload        size synchsafe in v2.4,
//!                                                 plain big-endian in v2.3
//! padding (zero bytes)
//! [footer, 10 bytes]                              v2.4, if flags & 0x10
//! ```
//!
//! The ISRC lives in a `TSRC` text frame. Text payloads start with one
//! encoding byte: 0 Latin-1, 1 UTF-16 with BOM, 2 UTF-16BE, 3 UTF-8.
//!
//! ## Writing
//!
//! Embedding synthesises a fresh v2.4 tag holding only `TSRC` and the
//! optional `TIT2`/`TPE1`/`TCON` frames, then appends the audio that follows
//! any existing tag. The existing tag is discarded, not merged, so unrelated
//! frames it carried are lost.

use isrc_core::IsrcCode;

use crate::bytes::ByteReader;
use crate::codec::MetadataCodec;
use crate::error::CodecError;
use crate::fields::{EmbedFields, MetadataField};
use crate::format::ContainerFormat;

const MAGIC: &[u8; 3] = b"ID3";
const HEADER_LEN: usize = 10;
const FRAME_HEADER_LEN: usize = 10;
const FOOTER_LEN: usize = 10;

const FLAG_EXTENDED_HEADER: u8 = 0x40;
const FLAG_FOOTER: u8 = 0x10;

/// Version written by [`Id3Codec::embed`].
const WRITE_VERSION: u8 = 4;
const ENCODING_UTF8: u8 = 3;

/// Largest value a synchsafe integer can hold.
pub const SYNCHSAFE_MAX: u32 = (1 << 28) - 1;

/// Decode a 4-byte synchsafe integer. `None` if any byte has its top bit set.
pub fn decode_synchsafe(bytes: [u8; 4]) -> Option<u32> {
    if bytes.iter().any(|b| b & 0x80 != 0) {
        return None;
    }
    Some(bytes.iter().fold(0u32, |acc, &b| (acc << 7) | u32::from(b)))
}

/// Encode `value` as a 4-byte synchsafe integer. `None` above [`SYNCHSAFE_MAX`].
pub fn encode_synchsafe(value: u32) -> Option<[u8; 4]> {
    if value > SYNCHSAFE_MAX {
        return None;
    }
    Some([
        (value >> 21) as u8 & 0x7F,
        (value >> 14) as u8 & 0x7F,
        (value >> 7) as u8 & 0x7F,
        value as u8 & 0x7F,
    ])
}

#[derive(Debug, Clone, Copy)]
struct TagHeader {
    major: u8,
    flags: u8,
    size: usize,
}

impl TagHeader {
    fn read(r: &ByteReader<'_>) -> Result<Option<Self>, CodecError> {
        if r.len() < MAGIC.len() || r.bytes(0, 3)? != MAGIC {
            return Ok(None);
        }
        let major = r.u8_at(3)?;
        let flags = r.u8_at(5)?;
        let size = decode_synchsafe(r.tag(6)?).ok_or_else(|| r.malformed(6, "tag size is not synchsafe"))?;
        Ok(Some(Self {
            major,
            flags,
            size: size as usize,
        }))
    }

    fn body_end(&self) -> usize {
        HEADER_LEN + self.size
    }

    fn total_len(&self) -> usize {
        let footer = if self.major >= 4 && self.flags & FLAG_FOOTER != 0 {
            FOOTER_LEN
        } else {
            0
        };
        self.body_end() + footer
    }
}

/// Length of the leading ID3v2 tag, or 0 if the buffer has none.
pub fn tag_len(data: &[u8]) -> Result<usize, CodecError> {
    let r = ByteReader::new(data, ContainerFormat::Mp3);
    match TagHeader::read(&r)? {
        None => Ok(0),
        Some(header) if header.total_len() > r.len() => {
            Err(r.malformed(6, format!("tag claims {} bytes", header.total_len())))
        }
        Some(header) => Ok(header.total_len()),
    }
}

fn decode_text(payload: &[u8]) -> String {
    let Some((&encoding, text)) = payload.split_first() else {
        return String::new();
    };
    let decoded = match encoding {
        0 => text.iter().map(|&b| char::from(b)).collect(),
        1 => decode_utf16(text, false),
        2 => decode_utf16(text, true),
        _ => String::from_utf8_lossy(text).into_owned(),
    };
    decoded
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

fn decode_utf16(text: &[u8], big_endian: bool) -> String {
    let (big_endian, body) = match text {
        [0xFE, 0xFF, rest @ ..] => (true, rest),
        [0xFF, 0xFE, rest @ ..] => (false, rest),
        _ => (big_endian, text),
    };
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|c| {
            if big_endian {
                u16::from_be_bytes([c[0], c[1]])
            } else {
                u16::from_le_bytes([c[0], c[1]])
            }
        })
        .collect();
    String::from_utf16_lossy(&units)
}

fn synchsafe_len(len: usize) -> Result<[u8; 4], CodecError> {
    u32::try_from(len)
        .ok()
        .and_then(encode_synchsafe)
        .ok_or(CodecError::TooLarge {
            format: ContainerFormat::Mp3,
            size: len,
            limit: SYNCHSAFE_MAX as usize,
        })
}

fn push_text_frame(out: &mut Vec<u8>, id: &[u8; 4], text: &str) -> Result<(), CodecError> {
    out.extend_from_slice(id);
    out.extend_from_slice(&synchsafe_len(text.len() + 1)?);
    out.extend_from_slice(&[0, 0]);
    out.push(ENCODING_UTF8);
    out.extend_from_slice(text.as_bytes());
    Ok(())
}

/// Codec for ID3v2-tagged MPEG audio.
#[derive(Debug, Clone, Copy, Default)]
pub struct Id3Codec;

impl MetadataCodec for Id3Codec {
    fn format(&self) -> ContainerFormat {
        ContainerFormat::Mp3
    }

    fn locate(&self, data: &[u8]) -> Result<Option<MetadataField>, CodecError> {
        let r = ByteReader::new(data, ContainerFormat::Mp3);
        let Some(header) = TagHeader::read(&r)? else {
            return Ok(None);
        };
        if !matches!(header.major, 3 | 4) {
            tracing::debug!(major = header.major, "ID3v2 version not readable");
            return Ok(None);
        }
        let tag_end = header.body_end();
        if tag_end > r.len() {
            return Err(r.malformed(6, format!("tag claims {} bytes", tag_end)));
        }

        let mut pos = HEADER_LEN;
        if header.flags & FLAG_EXTENDED_HEADER != 0 {
            let raw = r.tag(pos)?;
            // v2.4 counts the size field itself, v2.3 does not.
            let skip = if header.major == 4 {
                decode_synchsafe(raw).ok_or_else(|| r.malformed(pos, "extended header size is not synchsafe"))?
                    as usize
            } else {
                u32::from_be_bytes(raw) as usize + 4
            };
            pos += skip;
        }

        while pos + FRAME_HEADER_LEN <= tag_end {
            let id = r.tag(pos)?;
            if id[0] == 0 {
                break;
            }
            let raw = r.tag(pos + 4)?;
            let size = if header.major == 4 {
                decode_synchsafe(raw).ok_or_else(|| r.malformed(pos + 4, "frame size is not synchsafe"))?
            } else {
                u32::from_be_bytes(raw)
            };
            let size = size as usize;
            let start = pos + FRAME_HEADER_LEN;
            let end = start
                .checked_add(size)
                .filter(|&end| end <= tag_end)
                .ok_or_else(|| r.malformed(pos, "frame overruns tag"))?;

            if &id == b"TSRC" {
                let text = decode_text(r.range(start..end)?);
                if text.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(MetadataField {
                    offset: start,
                    length: size,
                    text,
                }));
            }
            pos = end;
        }
        Ok(None)
    }

    fn embed(&self, data: &[u8], code: &IsrcCode, fields: &EmbedFields) -> Result<Vec<u8>, CodecError> {
        let audio = ByteReader::new(data, ContainerFormat::Mp3).range(tag_len(data)?..data.len())?;

        let mut body = Vec::new();
        push_text_frame(&mut body, b"TSRC", code.as_str())?;
        for (id, value) in [(b"TIT2", &fields.title), (b"TPE1", &fields.artist), (b"TCON", &fields.genre)] {
            if let Some(text) = value.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                push_text_frame(&mut body, id, text)?;
            }
        }

        let mut out = Vec::with_capacity(HEADER_LEN + body.len() + audio.len());
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&[WRITE_VERSION, 0, 0]);
        out.extend_from_slice(&synchsafe_len(body.len())?);
        out.extend_from_slice(&body);
        out.extend_from_slice(audio);
        Ok(out)
    }
}
