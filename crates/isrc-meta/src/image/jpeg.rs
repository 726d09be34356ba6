//! # JPEG (EXIF APP1)
//!
//! After the `FFD8` start-of-image marker a JPEG is a run of marker
//! segments, `FF xx len[2, BE] payload`, where `len` counts itself but not
//! the marker. Metadata lives in the APPn segments (`FFE0`..`FFEF`) that
//! precede the frame and scan headers.
//!
//! ## Reading
//!
//! APP1 (EXIF/XMP) and APP13 (IPTC) payloads are scanned as text for
//! `ISRC:<code>`. No EXIF or IPTC structure is parsed.
//!
//! ## Writing
//!
//! A new APP1 segment is inserted after the SOI marker and the leading run
//! of APPn segments. It carries a minimal little-endian TIFF structure:
//!
//! ```text
//! "Exif\0\0"
//!  0  "II" 2A 00, IFD0 offset = 8
//!  8  IFD0: 1 entry   ExifIFD (8769, LONG)            -> 26
//! 26  Exif IFD: 1 entry  UserComment (9286, UNDEFINED) -> 44
//! 44  "ASCII\0\0\0" "ISRC:" code
//! ```
//!
//! Offsets are relative to the TIFF header. An APP1 segment previously
//! written this way is dropped; every other segment is kept verbatim.

use isrc_core::IsrcCode;

use crate::bytes::{contains, push_u16_be, push_u16_le, push_u32_le, ByteReader};
use crate::codec::MetadataCodec;
use crate::error::CodecError;
use crate::fields::{EmbedFields, MetadataField};
use crate::format::ContainerFormat;
use crate::image::scan::find_isrc;

const SOI: &[u8; 2] = b"\xFF\xD8";
const APP1: u8 = 0xE1;
const APP13: u8 = 0xED;
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;

const EXIF_HEADER: &[u8; 6] = b"Exif\0\0";
const TIFF_LE: &[u8; 4] = b"II*\0";
const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_USER_COMMENT: u16 = 0x9286;
const TYPE_LONG: u16 = 4;
const TYPE_UNDEFINED: u16 = 7;
const IFD0_OFFSET: u32 = 8;
const EXIF_IFD_OFFSET: u32 = 26;
const COMMENT_OFFSET: u32 = 44;

/// EXIF UserComment character-code prefix.
const ASCII_CODE: &[u8; 8] = b"ASCII\0\0\0";
const COMMENT_PREFIX: &[u8] = b"ASCII\0\0\0ISRC:";

#[derive(Debug, Clone, Copy)]
struct Segment {
    marker: u8,
    offset: usize,
    payload_start: usize,
    end: usize,
}

impl Segment {
    fn is_app(&self) -> bool {
        (0xE0..=0xEF).contains(&self.marker)
    }
}

/// Walk marker segments up to the first SOS or EOI. Returns the segments
/// and the offset where the walk stopped.
fn segments(r: &ByteReader<'_>) -> Result<(Vec<Segment>, usize), CodecError> {
    if r.bytes(0, 2)? != SOI {
        return Err(r.malformed(0, "missing SOI marker"));
    }
    let mut out = Vec::new();
    let mut pos = SOI.len();
    while pos < r.len() {
        if r.u8_at(pos)? != 0xFF {
            return Err(r.malformed(pos, "expected marker"));
        }
        let marker = r.u8_at(pos + 1)?;
        match marker {
            // fill byte
            0xFF => pos += 1,
            EOI | SOS => return Ok((out, pos)),
            0x01 | 0xD0..=0xD7 => {
                out.push(Segment {
                    marker,
                    offset: pos,
                    payload_start: pos + 2,
                    end: pos + 2,
                });
                pos += 2;
            }
            _ => {
                let length = r.u16_be(pos + 2)? as usize;
                if length < 2 {
                    return Err(r.malformed(pos + 2, format!("segment length {length}")));
                }
                let end = pos + 2 + length;
                if end > r.len() {
                    return Err(r.malformed(pos, format!("segment FF{marker:02X} overruns file")));
                }
                out.push(Segment {
                    marker,
                    offset: pos,
                    payload_start: pos + 4,
                    end,
                });
                pos = end;
            }
        }
    }
    Ok((out, pos))
}

fn written_by_us(r: &ByteReader<'_>, seg: &Segment) -> Result<bool, CodecError> {
    Ok(seg.marker == APP1 && contains(r.range(seg.payload_start..seg.end)?, COMMENT_PREFIX))
}

fn exif_segment(code: &IsrcCode) -> Result<Vec<u8>, CodecError> {
    let mut comment = ASCII_CODE.to_vec();
    comment.extend_from_slice(b"ISRC:");
    comment.extend_from_slice(code.as_str().as_bytes());

    let mut tiff = TIFF_LE.to_vec();
    push_u32_le(&mut tiff, IFD0_OFFSET);

    push_u16_le(&mut tiff, 1);
    push_u16_le(&mut tiff, TAG_EXIF_IFD);
    push_u16_le(&mut tiff, TYPE_LONG);
    push_u32_le(&mut tiff, 1);
    push_u32_le(&mut tiff, EXIF_IFD_OFFSET);
    push_u32_le(&mut tiff, 0);

    push_u16_le(&mut tiff, 1);
    push_u16_le(&mut tiff, TAG_USER_COMMENT);
    push_u16_le(&mut tiff, TYPE_UNDEFINED);
    push_u32_le(&mut tiff, comment.len() as u32);
    push_u32_le(&mut tiff, COMMENT_OFFSET);
    push_u32_le(&mut tiff, 0);

    tiff.extend_from_slice(&comment);

    let length = EXIF_HEADER.len() + tiff.len() + 2;
    let length = u16::try_from(length).map_err(|_| CodecError::TooLarge {
        format: ContainerFormat::Jpeg,
        size: length,
        limit: u16::MAX as usize,
    })?;

    let mut out = vec![0xFF, APP1];
    push_u16_be(&mut out, length);
    out.extend_from_slice(EXIF_HEADER);
    out.extend_from_slice(&tiff);
    Ok(out)
}

/// Codec for JPEG images.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl MetadataCodec for JpegCodec {
    fn format(&self) -> ContainerFormat {
        ContainerFormat::Jpeg
    }

    fn locate(&self, data: &[u8]) -> Result<Option<MetadataField>, CodecError> {
        let r = ByteReader::new(data, ContainerFormat::Jpeg);
        let (segments, _) = segments(&r)?;
        for seg in segments.iter().filter(|s| matches!(s.marker, APP1 | APP13)) {
            if let Some(m) = find_isrc(r.range(seg.payload_start..seg.end)?) {
                return Ok(Some(MetadataField {
                    offset: seg.payload_start + m.start,
                    length: m.len,
                    text: m.text,
                }));
            }
        }
        Ok(None)
    }

    fn embed(&self, data: &[u8], code: &IsrcCode, _fields: &EmbedFields) -> Result<Vec<u8>, CodecError> {
        let r = ByteReader::new(data, ContainerFormat::Jpeg);
        let (segments, stop) = segments(&r)?;
        let app1 = exif_segment(code)?;

        let mut out = Vec::with_capacity(data.len() + app1.len());
        out.extend_from_slice(SOI);
        let mut inserted = false;
        for seg in &segments {
            if written_by_us(&r, seg)? {
                tracing::debug!(offset = seg.offset, "replacing existing ISRC APP1 segment");
                continue;
            }
            if !inserted && !seg.is_app() {
                out.extend_from_slice(&app1);
                inserted = true;
            }
            out.extend_from_slice(r.range(seg.offset..seg.end)?);
        }
        if !inserted {
            out.extend_from_slice(&app1);
        }
        out.extend_from_slice(r.range(stop..r.len())?);
        Ok(out)
    }
}
