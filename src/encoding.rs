//! Text decoding using `encoding_rs`, with `chardetng` guessing for `"auto"`.

use std::borrow::Cow;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use simdutf8::basic::from_utf8;

use crate::error::{DatascopeError, Result};

/// Encoding label that asks for detection instead of a fixed encoding.
pub const AUTO: &str = "auto";

/// Check if the given bytes are valid UTF-8.
///
/// Uses SIMD-accelerated validation for performance.
pub fn is_utf8(data: &[u8]) -> bool {
    from_utf8(data).is_ok()
}

/// Check if the data starts with a UTF-8 BOM (EF BB BF).
pub fn has_utf8_bom(data: &[u8]) -> bool {
    data.starts_with(&[0xEF, 0xBB, 0xBF])
}

/// Skip the UTF-8 BOM if present and return the remaining data.
pub fn skip_bom(data: &[u8]) -> &[u8] {
    if has_utf8_bom(data) { &data[3..] } else { data }
}

/// How the bytes of a text file should be turned into `str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// A fixed encoding resolved from a WHATWG label.
    Fixed(&'static Encoding),
    /// Sniff BOM, validate UTF-8, otherwise let `chardetng` guess.
    Detect,
}

impl TextEncoding {
    /// Resolve a caller-supplied label such as `"utf-8"`, `"latin1"` or `"auto"`.
    pub fn from_label(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case(AUTO) {
            return Ok(TextEncoding::Detect);
        }
        Encoding::for_label(trimmed.as_bytes())
            .map(TextEncoding::Fixed)
            .ok_or_else(|| DatascopeError::Validation(format!("unknown encoding label {label:?}")))
    }

    /// True when bytes can be streamed without transcoding.
    pub fn is_utf8(&self) -> bool {
        matches!(self, TextEncoding::Fixed(enc) if *enc == UTF_8)
    }

    /// Name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Fixed(enc) => enc.name(),
            TextEncoding::Detect => AUTO,
        }
    }

    /// Decode a whole buffer to UTF-8 text.
    ///
    /// A BOM, if present, wins over the requested encoding. Malformed input is
    /// an error rather than being replaced with U+FFFD.
    pub fn decode<'a>(&self, data: &'a [u8]) -> Result<Cow<'a, str>> {
        let (encoding, body) = match Encoding::for_bom(data) {
            Some((enc, bom_len)) => (enc, &data[bom_len..]),
            None => match self {
                TextEncoding::Fixed(enc) => (*enc, data),
                TextEncoding::Detect => (guess_encoding(data), data),
            },
        };

        if encoding == UTF_8 {
            return from_utf8(body)
                .map(Cow::Borrowed)
                .map_err(|_| utf8_error(body));
        }

        encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .ok_or_else(|| DatascopeError::Decode {
                encoding: encoding.name().to_string(),
                location: "input".to_string(),
            })
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::Fixed(UTF_8)
    }
}

/// Guess the encoding of data that carries no BOM.
fn guess_encoding(data: &[u8]) -> &'static Encoding {
    if is_utf8(data) {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(data, true);
    detector.guess(None, true)
}

/// Build a decode error pointing at the first invalid UTF-8 byte.
fn utf8_error(data: &[u8]) -> DatascopeError {
    let offset = std::str::from_utf8(data)
        .err()
        .map_or(0, |e| e.valid_up_to());
    DatascopeError::Decode {
        encoding: UTF_8.name().to_string(),
        location: format!("byte offset {offset}"),
    }
}

/// Decode one UTF-8 field of a streamed record.
pub(crate) fn decode_utf8_field<'a>(bytes: &'a [u8], row: usize) -> Result<&'a str> {
    from_utf8(bytes).map_err(|_| DatascopeError::Decode {
        encoding: UTF_8.name().to_string(),
        location: format!("row {row}"),
    })
}
