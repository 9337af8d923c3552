//! SOME/IP 字符串编解码
//!
//! Fixed strings occupy exactly their declared width and must start with a
//! BOM. Dynamic strings are framed by a 4-byte big-endian length field; a
//! missing BOM is tolerated and the encoding guessed from the content.
//! In both shapes the text ends at the first terminator, everything after
//! it up to the framed width is padding.

use bytes::Buf;

use crate::errors::DecodeErrorKind;

/// Length field of a dynamic string, independent of the payload byte order.
pub const DYNAMIC_LENGTH_FIELD: usize = 4;

/// bytes inspected when guessing the encoding of a BOM-less string
const INFER_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16Be,
    Utf16Le,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf16Le => "UTF-16LE",
        }
    }

    /// width of the terminator, also the search step
    pub fn unit(&self) -> usize {
        match self {
            Encoding::Utf8 => 1,
            Encoding::Utf16Be | Encoding::Utf16Le => 2,
        }
    }

    pub fn bom(&self) -> &'static [u8] {
        match self {
            Encoding::Utf8 => &[0xEF, 0xBB, 0xBF],
            Encoding::Utf16Be => &[0xFE, 0xFF],
            Encoding::Utf16Le => &[0xFF, 0xFE],
        }
    }
}

/// Encoding announced by the byte order mark at the start of `data`, and
/// the mark's length.
pub fn detect_bom(data: &[u8]) -> Option<(Encoding, usize)> {
    [Encoding::Utf8, Encoding::Utf16Be, Encoding::Utf16Le]
        .into_iter()
        .find(|e| data.starts_with(e.bom()))
        .map(|e| (e, e.bom().len()))
}

/// Position of the terminator, searched at the encoding's unit alignment.
pub fn find_terminator(data: &[u8], encoding: Encoding) -> Option<usize> {
    let unit = encoding.unit();
    data.chunks_exact(unit)
        .position(|c| c.iter().all(|b| *b == 0))
        .map(|i| i * unit)
}

/// Guess the encoding of a BOM-less body from its leading code units.
///
/// ASCII text in UTF-16BE shows up as `00 xx` pairs, in UTF-16LE as
/// `xx 00`. The last pair is left out since it normally holds the
/// terminator. No majority means UTF-8.
pub fn infer_encoding(body: &[u8]) -> Encoding {
    // one code unit plus a terminator at least
    if body.len() < 4 || body.len() % 2 != 0 {
        return Encoding::Utf8;
    }
    let window = &body[..INFER_WINDOW.min(body.len() - 2)];
    let (mut be, mut le) = (0usize, 0usize);
    for pair in window.chunks_exact(2) {
        match (pair[0], pair[1]) {
            (0, hi) if hi != 0 => be += 1,
            (lo, 0) if lo != 0 => le += 1,
            _ => {}
        }
    }
    if be > le {
        Encoding::Utf16Be
    } else if le > be {
        Encoding::Utf16Le
    } else {
        Encoding::Utf8
    }
}

pub fn convert(text: &[u8], encoding: Encoding) -> Result<String, DecodeErrorKind> {
    let invalid = |detail: String| DecodeErrorKind::InvalidText {
        encoding: encoding.name(),
        detail,
    };
    match encoding {
        Encoding::Utf8 => String::from_utf8(text.to_vec()).map_err(|e| invalid(e.to_string())),
        Encoding::Utf16Be | Encoding::Utf16Le => {
            if text.len() % 2 != 0 {
                return Err(invalid(format!("odd byte length {}", text.len())));
            }
            let units: Vec<u16> = text
                .chunks_exact(2)
                .map(|c| match encoding {
                    Encoding::Utf16Le => u16::from_le_bytes([c[0], c[1]]),
                    _ => u16::from_be_bytes([c[0], c[1]]),
                })
                .collect();
            String::from_utf16(&units).map_err(|e| invalid(e.to_string()))
        }
    }
}

/// Text of a framed body once the BOM is removed: everything before the
/// terminator. Bytes after the terminator are padding.
fn framed_text(body: &[u8], encoding: Encoding) -> Result<String, DecodeErrorKind> {
    let end = find_terminator(body, encoding).ok_or(DecodeErrorKind::TerminatorNotFound)?;
    convert(&body[..end], encoding)
}

/// Decode a fixed-width string, returns the text and the bytes consumed
/// (always `width`).
pub fn decode_fixed(data: &[u8], width: usize) -> Result<(String, usize), DecodeErrorKind> {
    if data.len() < width {
        return Err(DecodeErrorKind::InsufficientData {
            needed: width,
            got: data.len(),
        });
    }
    let body = &data[..width];
    let (encoding, bom) = detect_bom(body).ok_or(DecodeErrorKind::MissingOrInvalidBom)?;
    Ok((framed_text(&body[bom..], encoding)?, width))
}

/// Decode a length-framed string, returns the text and the bytes consumed
/// including the length field.
pub fn decode_dynamic(data: &[u8]) -> Result<(String, usize), DecodeErrorKind> {
    let mut cursor = data;
    if cursor.remaining() < DYNAMIC_LENGTH_FIELD {
        return Err(DecodeErrorKind::InsufficientData {
            needed: DYNAMIC_LENGTH_FIELD,
            got: data.len(),
        });
    }
    let length = cursor.get_u32() as usize;
    if cursor.remaining() < length {
        return Err(DecodeErrorKind::InsufficientData {
            needed: DYNAMIC_LENGTH_FIELD + length,
            got: data.len(),
        });
    }
    let body = &cursor[..length];
    let (encoding, bom) = detect_bom(body).unwrap_or_else(|| (infer_encoding(body), 0));
    Ok((framed_text(&body[bom..], encoding)?, DYNAMIC_LENGTH_FIELD + length))
}

#[cfg(test)]
pub(crate) fn encode_text(text: &str, encoding: Encoding) -> Vec<u8> {
    match encoding {
        Encoding::Utf8 => text.as_bytes().to_vec(),
        Encoding::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        Encoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
    }
}

/// BOM + text + terminator, zero padded to `width`
#[cfg(test)]
pub(crate) fn encode_fixed(text: &str, encoding: Encoding, width: usize) -> Vec<u8> {
    let mut out = encoding.bom().to_vec();
    out.extend(encode_text(text, encoding));
    out.extend(std::iter::repeat(0).take(encoding.unit()));
    assert!(out.len() <= width, "{} does not fit in {} bytes", text, width);
    out.resize(width, 0);
    out
}

/// length field + BOM + text + terminator + `padding` zero bytes
#[cfg(test)]
pub(crate) fn encode_dynamic(text: &str, encoding: Encoding, padding: usize) -> Vec<u8> {
    let mut body = encoding.bom().to_vec();
    body.extend(encode_text(text, encoding));
    body.extend(std::iter::repeat(0).take(encoding.unit() + padding));
    let mut out = (body.len() as u32).to_be_bytes().to_vec();
    out.extend(body);
    out
}
