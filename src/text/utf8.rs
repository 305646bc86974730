//! Single-code-point UTF-8 codec.
//!
//! `decode_one` consumes one code point from the front of a byte slice and
//! reports how many bytes it took; `encode_one` produces the minimal 1-4
//! byte encoding of a code point. Both sides reject the same things a strict
//! whole-buffer validator would:
//!
//! | Bytes | First byte    | Continuation bytes | Code point range     |
//! |-------|---------------|---------------------|----------------------|
//! | 1     | `0xxxxxxx`    | -                    | U+0000 - U+007F      |
//! | 2     | `110xxxxx`    | `10xxxxxx`           | U+0080 - U+07FF      |
//! | 3     | `1110xxxx`    | `10xxxxxx` × 2       | U+0800 - U+FFFF      |
//! | 4     | `11110xxx`    | `10xxxxxx` × 3       | U+10000 - U+10FFFF   |
//!
//! Rejected: invalid lead bytes, non-`10xxxxxx` continuation bytes, overlong
//! forms, surrogate code points (U+D800-U+DFFF), and code points above
//! U+10FFFF. A caller that hits [`Utf8DecodeError`] is expected to skip
//! exactly one byte and resynchronize — see [`crate::model::Model::train`].

use core::fmt;

/// Why [`decode_one`] rejected a byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8DecodeError {
    /// A byte in 0x80-0xBF or 0xF8-0xFF appeared where a lead byte was expected.
    InvalidLeadByte,
    /// A byte outside 0x80-0xBF appeared where a continuation byte was expected.
    InvalidContinuationByte,
    /// The sequence encoded a code point using more bytes than necessary.
    OverlongEncoding,
    /// The sequence encoded a surrogate code point (U+D800-U+DFFF).
    SurrogateCodepoint,
    /// The sequence encoded a code point above U+10FFFF.
    OutOfRangeCodepoint,
    /// The input ended before a multi-byte sequence was complete.
    TruncatedSequence,
}

impl fmt::Display for Utf8DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLeadByte => write!(f, "invalid UTF-8 lead byte"),
            Self::InvalidContinuationByte => write!(f, "invalid UTF-8 continuation byte"),
            Self::OverlongEncoding => write!(f, "overlong UTF-8 encoding"),
            Self::SurrogateCodepoint => write!(f, "surrogate code point in UTF-8"),
            Self::OutOfRangeCodepoint => write!(f, "code point above U+10FFFF"),
            Self::TruncatedSequence => write!(f, "truncated UTF-8 sequence"),
        }
    }
}

#[inline(always)]
fn is_continuation_byte(byte: u8) -> bool {
    (byte & 0xC0) == 0x80
}

/// Expected total sequence length for a lead byte, or `None` if `lead` can
/// never start a valid sequence (a continuation byte, or 0xF8-0xFF).
#[inline]
pub fn sequence_length(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}

/// Decode one code point from the front of `bytes`.
///
/// Returns the code point and the number of bytes consumed (1-4). Does not
/// look past the bytes the sequence needs, so it is safe to call on a
/// prefix of a longer buffer.
pub fn decode_one(bytes: &[u8]) -> Result<(u32, usize), Utf8DecodeError> {
    let lead = *bytes.first().ok_or(Utf8DecodeError::TruncatedSequence)?;
    let len = sequence_length(lead).ok_or(Utf8DecodeError::InvalidLeadByte)?;
    if len == 1 {
        return Ok((lead as u32, 1));
    }
    if bytes.len() < len {
        return Err(Utf8DecodeError::TruncatedSequence);
    }
    for &b in &bytes[1..len] {
        if !is_continuation_byte(b) {
            return Err(Utf8DecodeError::InvalidContinuationByte);
        }
    }
    let cp = match len {
        2 => ((lead as u32 & 0x1F) << 6) | (bytes[1] as u32 & 0x3F),
        3 => {
            ((lead as u32 & 0x0F) << 12)
                | ((bytes[1] as u32 & 0x3F) << 6)
                | (bytes[2] as u32 & 0x3F)
        }
        4 => {
            ((lead as u32 & 0x07) << 18)
                | ((bytes[1] as u32 & 0x3F) << 12)
                | ((bytes[2] as u32 & 0x3F) << 6)
                | (bytes[3] as u32 & 0x3F)
        }
        _ => unreachable!("sequence_length only returns 1..=4"),
    };
    let min_for_len = match len {
        2 => 0x80,
        3 => 0x800,
        4 => 0x10000,
        _ => unreachable!(),
    };
    if cp < min_for_len {
        return Err(Utf8DecodeError::OverlongEncoding);
    }
    if (0xD800..=0xDFFF).contains(&cp) {
        return Err(Utf8DecodeError::SurrogateCodepoint);
    }
    if cp > 0x10FFFF {
        return Err(Utf8DecodeError::OutOfRangeCodepoint);
    }
    Ok((cp, len))
}

/// The 1-4 byte UTF-8 encoding of a single code point, stored inline to
/// avoid a heap allocation per character.
#[derive(Debug, Clone, Copy)]
pub struct EncodedChar {
    buf: [u8; 4],
    len: u8,
}

impl EncodedChar {
    /// The encoded bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }
}

/// Encode one code point to its minimal UTF-8 form.
///
/// Returns `None` if `code_point` is not a valid Unicode scalar value (a
/// surrogate, or above U+10FFFF) — such a value must never reach a model's
/// output. Encoding 0 yields the single byte `0x00`.
pub fn encode_one(code_point: u32) -> Option<EncodedChar> {
    if (0xD800..=0xDFFF).contains(&code_point) || code_point > 0x10FFFF {
        return None;
    }
    let mut buf = [0u8; 4];
    let len = match code_point {
        0x0000..=0x007F => {
            buf[0] = code_point as u8;
            1
        }
        0x0080..=0x07FF => {
            buf[0] = 0xC0 | (code_point >> 6) as u8;
            buf[1] = 0x80 | (code_point & 0x3F) as u8;
            2
        }
        0x0800..=0xFFFF => {
            buf[0] = 0xE0 | (code_point >> 12) as u8;
            buf[1] = 0x80 | ((code_point >> 6) & 0x3F) as u8;
            buf[2] = 0x80 | (code_point & 0x3F) as u8;
            3
        }
        _ => {
            buf[0] = 0xF0 | (code_point >> 18) as u8;
            buf[1] = 0x80 | ((code_point >> 12) & 0x3F) as u8;
            buf[2] = 0x80 | ((code_point >> 6) & 0x3F) as u8;
            buf[3] = 0x80 | (code_point & 0x3F) as u8;
            4
        }
    };
    Some(EncodedChar { buf, len })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_roundtrip() {
        for b in 0u8..=0x7F {
            let enc = encode_one(b as u32).unwrap();
            assert_eq!(enc.as_bytes(), &[b]);
            let (cp, n) = decode_one(&[b]).unwrap();
            assert_eq!(cp, b as u32);
            assert_eq!(n, 1);
        }
    }

    #[test]
    fn nul_roundtrips_to_single_zero_byte() {
        let enc = encode_one(0).unwrap();
        assert_eq!(enc.as_bytes(), &[0x00]);
        assert_eq!(decode_one(&[0x00]).unwrap(), (0, 1));
    }

    #[test]
    fn multibyte_roundtrip_matches_std() {
        for c in ['é', '€', '日', '🎉', 'Ł', 'ę'] {
            let mut std_buf = [0u8; 4];
            let std_bytes = c.encode_utf8(&mut std_buf).as_bytes();
            let enc = encode_one(c as u32).unwrap();
            assert_eq!(enc.as_bytes(), std_bytes);
            let (cp, n) = decode_one(std_bytes).unwrap();
            assert_eq!(cp, c as u32);
            assert_eq!(n, std_bytes.len());
        }
    }

    #[test]
    fn rejects_bare_continuation_byte() {
        assert_eq!(decode_one(&[0x80]), Err(Utf8DecodeError::InvalidLeadByte));
    }

    #[test]
    fn rejects_invalid_lead_byte() {
        assert_eq!(decode_one(&[0xFF]), Err(Utf8DecodeError::InvalidLeadByte));
        assert_eq!(decode_one(&[0xF8]), Err(Utf8DecodeError::InvalidLeadByte));
    }

    #[test]
    fn rejects_truncated_sequence() {
        assert_eq!(
            decode_one(&[0xE2, 0x82]),
            Err(Utf8DecodeError::TruncatedSequence)
        );
        assert_eq!(decode_one(&[]), Err(Utf8DecodeError::TruncatedSequence));
    }

    #[test]
    fn rejects_overlong_encodings() {
        // 2-byte overlong encoding of NUL.
        assert_eq!(
            decode_one(&[0xC0, 0x80]),
            Err(Utf8DecodeError::OverlongEncoding)
        );
        // 3-byte overlong encoding of an ASCII letter.
        assert_eq!(
            decode_one(&[0xE0, 0x81, 0x81]),
            Err(Utf8DecodeError::OverlongEncoding)
        );
    }

    #[test]
    fn rejects_surrogates() {
        assert_eq!(
            decode_one(&[0xED, 0xA0, 0x80]),
            Err(Utf8DecodeError::SurrogateCodepoint)
        );
        assert!(encode_one(0xD800).is_none());
        assert!(encode_one(0xDFFF).is_none());
    }

    #[test]
    fn rejects_out_of_range_codepoint() {
        // 0x11_0000 encoded in the 4-byte form's bit pattern.
        assert_eq!(
            decode_one(&[0xF4, 0x90, 0x80, 0x80]),
            Err(Utf8DecodeError::OutOfRangeCodepoint)
        );
        assert!(encode_one(0x11_0000).is_none());
    }

    #[test]
    fn decode_only_consumes_what_it_needs() {
        let mut bytes = "日".as_bytes().to_vec();
        bytes.push(b'x');
        let (cp, n) = decode_one(&bytes).unwrap();
        assert_eq!(cp, '日' as u32);
        assert_eq!(n, 3);
    }
}
