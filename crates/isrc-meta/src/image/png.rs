//! # PNG (tEXt / iTXt)
//!
//! After the 8-byte signature a PNG is a run of chunks,
//! `len[4, BE] type[4] data crc[4]`, with the CRC-32 taken over type and
//! data. The stream ends at `IEND`.
//!
//! Text chunks store `keyword NUL text` (`tEXt`, Latin-1) or
//! `keyword NUL flag method lang NUL translated NUL text` (`iTXt`, UTF-8).
//! A chunk keyed `ISRC` is read structurally; any other text chunk is
//! scanned for `ISRC:<code>`. Compressed iTXt is scanned raw, not inflated.
//!
//! Embedding writes `tEXt` `ISRC NUL <code>` immediately before the first
//! `IDAT`, dropping any earlier `tEXt` chunk keyed `ISRC`.

use isrc_core::IsrcCode;

use crate::bytes::{push_u32_be, ByteReader};
use crate::codec::MetadataCodec;
use crate::error::CodecError;
use crate::fields::{EmbedFields, MetadataField};
use crate::format::ContainerFormat;
use crate::image::scan::find_isrc;

const SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";
const KEYWORD: &[u8] = b"ISRC";

#[derive(Debug, Clone, Copy)]
struct Chunk {
    kind: [u8; 4],
    offset: usize,
    data_start: usize,
    length: usize,
    /// Offset just past the CRC.
    end: usize,
}

impl Chunk {
    fn data<'a>(&self, r: &ByteReader<'a>) -> Result<&'a [u8], CodecError> {
        r.bytes(self.data_start, self.length)
    }

    fn is_text(&self) -> bool {
        &self.kind == b"tEXt" || &self.kind == b"iTXt"
    }
}

/// Walk chunks through `IEND`. Returns the chunks and the offset after the
/// last one.
fn chunks(r: &ByteReader<'_>) -> Result<(Vec<Chunk>, usize), CodecError> {
    if r.bytes(0, SIGNATURE.len())? != SIGNATURE {
        return Err(r.malformed(0, "missing PNG signature"));
    }
    let mut out = Vec::new();
    let mut pos = SIGNATURE.len();
    while pos < r.len() {
        let length = r.u32_be(pos)? as usize;
        let kind = r.tag(pos + 4)?;
        let data_start = pos + 8;
        let end = data_start
            .checked_add(length)
            .and_then(|e| e.checked_add(4))
            .filter(|&e| e <= r.len())
            .ok_or_else(|| r.malformed(pos, format!("chunk {} overruns file", String::from_utf8_lossy(&kind))))?;
        out.push(Chunk {
            kind,
            offset: pos,
            data_start,
            length,
            end,
        });
        pos = end;
        if &kind == b"IEND" {
            break;
        }
    }
    Ok((out, pos))
}

fn nul_after(data: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?.iter().position(|&b| b == 0).map(|i| from + i)
}

/// The value of a text chunk keyed `ISRC`, as (offset in data, text).
fn keyed_value(kind: &[u8; 4], data: &[u8]) -> Option<(usize, String)> {
    let nul = nul_after(data, 0)?;
    if !data[..nul].eq_ignore_ascii_case(KEYWORD) {
        return None;
    }
    let mut start = nul + 1;
    let international = kind == b"iTXt";
    if international {
        if *data.get(start)? != 0 {
            return None;
        }
        start += 2;
        start = nul_after(data, start)? + 1;
        start = nul_after(data, start)? + 1;
    }
    let value = data.get(start..)?;
    let text = if international {
        String::from_utf8_lossy(value).into_owned()
    } else {
        value.iter().map(|&b| char::from(b)).collect()
    };
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    (!text.is_empty()).then(|| (start, text.to_string()))
}

fn written_by_us(r: &ByteReader<'_>, chunk: &Chunk) -> Result<bool, CodecError> {
    Ok(&chunk.kind == b"tEXt" && {
        let data = chunk.data(r)?;
        data.len() > KEYWORD.len() && data[..KEYWORD.len()].eq_ignore_ascii_case(KEYWORD) && data[KEYWORD.len()] == 0
    })
}

fn text_chunk(code: &IsrcCode) -> Vec<u8> {
    let mut data = KEYWORD.to_vec();
    data.push(0);
    data.extend_from_slice(code.as_str().as_bytes());

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(b"tEXt");
    hasher.update(&data);

    let mut out = Vec::with_capacity(data.len() + 12);
    push_u32_be(&mut out, data.len() as u32);
    out.extend_from_slice(b"tEXt");
    out.extend_from_slice(&data);
    push_u32_be(&mut out, hasher.finalize());
    out
}

/// Codec for PNG images.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl MetadataCodec for PngCodec {
    fn format(&self) -> ContainerFormat {
        ContainerFormat::Png
    }

    fn locate(&self, data: &[u8]) -> Result<Option<MetadataField>, CodecError> {
        let r = ByteReader::new(data, ContainerFormat::Png);
        let (chunks, _) = chunks(&r)?;
        for chunk in chunks.iter().filter(|c| c.is_text()) {
            let payload = chunk.data(&r)?;
            let keyed = keyed_value(&chunk.kind, payload).filter(|(_, text)| IsrcCode::parse_lenient(text).is_ok());
            if let Some((start, text)) = keyed {
                return Ok(Some(MetadataField {
                    offset: chunk.data_start + start,
                    length: payload.len() - start,
                    text,
                }));
            }
            if let Some(m) = find_isrc(payload) {
                return Ok(Some(MetadataField {
                    offset: chunk.data_start + m.start,
                    length: m.len,
                    text: m.text,
                }));
            }
        }
        Ok(None)
    }

    fn embed(&self, data: &[u8], code: &IsrcCode, _fields: &EmbedFields) -> Result<Vec<u8>, CodecError> {
        let r = ByteReader::new(data, ContainerFormat::Png);
        let (chunks, end) = chunks(&r)?;
        let idat = chunks
            .iter()
            .position(|c| &c.kind == b"IDAT")
            .ok_or_else(|| r.malformed(SIGNATURE.len(), "no IDAT chunk"))?;

        let text = text_chunk(code);
        let mut out = Vec::with_capacity(data.len() + text.len());
        out.extend_from_slice(SIGNATURE);
        for (i, chunk) in chunks.iter().enumerate() {
            if written_by_us(&r, chunk)? {
                tracing::debug!(offset = chunk.offset, "replacing existing ISRC tEXt chunk");
                continue;
            }
            if i == idat {
                out.extend_from_slice(&text);
            }
            out.extend_from_slice(r.range(chunk.offset..chunk.end)?);
        }
        out.extend_from_slice(r.range(end..r.len())?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut out = (data.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(data);
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(kind);
        hasher.update(data);
        out.extend_from_slice(&hasher.finalize().to_be_bytes());
        out
    }

    fn png(extra: &[Vec<u8>]) -> Vec<u8> {
        let mut out = SIGNATURE.to_vec();
        out.extend(chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0]));
        for c in extra {
            out.extend_from_slice(c);
        }
        out.extend(chunk(b"IDAT", &[0x78, 0x9C, 0x63, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01]));
        out.extend(chunk(b"IEND", &[]));
        out
    }

    fn kinds(data: &[u8]) -> Vec<[u8; 4]> {
        let r = ByteReader::new(data, ContainerFormat::Png);
        chunks(&r).unwrap().0.iter().map(|c| c.kind).collect()
    }

    fn code() -> IsrcCode {
        IsrcCode::parse("ZA-80G-25-00123").unwrap()
    }

    #[test]
    fn test_embed_before_idat_with_valid_crc() {
        let input = png(&[]);
        let out = PngCodec.embed(&input, &code(), &EmbedFields::default()).unwrap();
        assert_eq!(kinds(&out), [*b"IHDR", *b"tEXt", *b"IDAT", *b"IEND"]);

        let expected = chunk(b"tEXt", b"ISRC\0ZA-80G-25-00123");
        assert!(crate::bytes::contains(&out, &expected));

        let field = PngCodec.locate(&out).unwrap().unwrap();
        assert_eq!(field.text, "ZA-80G-25-00123");
        assert_eq!(field.length, 15);
    }

    #[test]
    fn test_reembed_replaces_isrc_text_only() {
        let comment = chunk(b"tEXt", b"Comment\0hello");
        let input = png(&[comment.clone()]);
        let once = PngCodec.embed(&input, &code(), &EmbedFields::default()).unwrap();
        let other = IsrcCode::parse("ZA-80G-25-00124").unwrap();
        let twice = PngCodec.embed(&once, &other, &EmbedFields::default()).unwrap();
        assert_eq!(twice.len(), once.len());
        assert!(crate::bytes::contains(&twice, &comment));
        assert_eq!(PngCodec.locate(&twice).unwrap().unwrap().text, "ZA-80G-25-00124");
    }

    #[test]
    fn test_locate_itxt_keyed() {
        let input = png(&[chunk(b"iTXt", b"ISRC\0\0\0en\0\0ZA80G2500007")]);
        let field = PngCodec.locate(&input).unwrap().unwrap();
        assert_eq!(field.text, "ZA80G2500007");
    }

    #[test]
    fn test_locate_scans_other_text() {
        let input = png(&[chunk(b"tEXt", b"Copyright\0(c) 2025 Label, ISRC: ZA-80G-25-00099")]);
        assert_eq!(PngCodec.locate(&input).unwrap().unwrap().text, "ZA-80G-25-00099");
    }

    #[test]
    fn test_keyed_value_that_is_not_a_code_is_skipped() {
        let input = png(&[
            chunk(b"tEXt", b"ISRC\0pending"),
            chunk(b"tEXt", b"Comment\0ISRC: ZA-80G-25-00042"),
        ]);
        assert_eq!(PngCodec.locate(&input).unwrap().unwrap().text, "ZA-80G-25-00042");
    }

    #[test]
    fn test_overlong_comment_code_is_ignored() {
        let input = png(&[chunk(b"tEXt", b"Comment\0ISRC:ZA-80G-25-001234")]);
        assert_eq!(PngCodec.locate(&input).unwrap(), None);
    }

    #[test]
    fn test_mixed_hyphenation_does_not_hide_later_code() {
        let input = png(&[chunk(b"tEXt", b"Comment\0ISRC: ZA80G-25-00123; ISRC: ZA-80G-25-00124")]);
        assert_eq!(PngCodec.locate(&input).unwrap().unwrap().text, "ZA-80G-25-00124");
    }

    #[test]
    fn test_locate_compressed_itxt_is_not_inflated() {
        let input = png(&[chunk(b"iTXt", b"ISRC\0\x01\0\0\0\x78\x9c")]);
        assert_eq!(PngCodec.locate(&input).unwrap(), None);
    }

    #[test]
    fn test_locate_without_text() {
        assert_eq!(PngCodec.locate(&png(&[])).unwrap(), None);
    }

    #[test]
    fn test_embed_requires_idat() {
        let mut input = SIGNATURE.to_vec();
        input.extend(chunk(b"IHDR", &[0; 13]));
        input.extend(chunk(b"IEND", &[]));
        assert!(matches!(
            PngCodec.embed(&input, &code(), &EmbedFields::default()),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn test_truncated_chunk_is_malformed() {
        let mut input = png(&[]);
        input.truncate(30);
        assert!(PngCodec.locate(&input).is_err());
    }

    #[test]
    fn test_trailing_bytes_after_iend_are_kept() {
        let mut input = png(&[]);
        input.extend_from_slice(b"trailer");
        let out = PngCodec.embed(&input, &code(), &EmbedFields::default()).unwrap();
        assert!(out.ends_with(b"trailer"));
    }
}
