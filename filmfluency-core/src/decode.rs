//! Turning subtitle bytes into text.
//!
//! SubRip has no declared encoding. We try a fixed list of candidates in
//! order and keep the first one that decodes cleanly. A byte order mark is
//! tried before the list, and the list still runs when the body turns out not
//! to match its mark.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// Decoded as windows-1252, the superset every "latin1" label maps to.
    ///
    /// Bytes 0x80-0x9F become printable characters (`€`, `‘`, `’`, ...)
    /// instead of the C1 control codes true ISO-8859-1 gives them.
    Latin1,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
}

/// The order candidates are tried in when there is no byte order mark.
pub const FALLBACK_CHAIN: &[TextEncoding] = &[
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Utf16Le,
    TextEncoding::Utf32Le,
];

const UTF32_LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];
const UTF32_BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Utf16Le => "utf-16le",
            TextEncoding::Utf16Be => "utf-16be",
            TextEncoding::Utf32Le => "utf-32le",
            TextEncoding::Utf32Be => "utf-32be",
        }
    }

    /// Strict decode, `None` if any byte sequence is invalid for this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => strict(UTF_8, bytes),
            TextEncoding::Latin1 => strict(WINDOWS_1252, bytes),
            TextEncoding::Utf16Le => strict(UTF_16LE, bytes),
            TextEncoding::Utf16Be => strict(UTF_16BE, bytes),
            TextEncoding::Utf32Le => decode_utf32(bytes, u32::from_le_bytes),
            TextEncoding::Utf32Be => decode_utf32(bytes, u32::from_be_bytes),
        }
    }

    fn from_encoding_rs(enc: &'static Encoding) -> Option<TextEncoding> {
        if enc == UTF_8 {
            Some(TextEncoding::Utf8)
        } else if enc == UTF_16LE {
            Some(TextEncoding::Utf16Le)
        } else if enc == UTF_16BE {
            Some(TextEncoding::Utf16Be)
        } else {
            None
        }
    }
}

fn strict(enc: &'static Encoding, bytes: &[u8]) -> Option<String> {
    enc.decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

fn decode_utf32(bytes: &[u8], word: fn([u8; 4]) -> u32) -> Option<String> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    bytes
        .chunks_exact(4)
        .map(|c| char::from_u32(word([c[0], c[1], c[2], c[3]])))
        .collect()
}

/// Look for a byte order mark, returning the encoding it declares and its length.
pub fn sniff_bom(bytes: &[u8]) -> Option<(TextEncoding, usize)> {
    // the utf-32le mark starts with the utf-16le mark, check the long ones first
    if bytes.starts_with(UTF32_LE_BOM) {
        return Some((TextEncoding::Utf32Le, UTF32_LE_BOM.len()));
    }
    if bytes.starts_with(UTF32_BE_BOM) {
        return Some((TextEncoding::Utf32Be, UTF32_BE_BOM.len()));
    }
    let (enc, len) = Encoding::for_bom(bytes)?;
    TextEncoding::from_encoding_rs(enc).map(|e| (e, len))
}

/// Decode with the default chain.
pub fn decode_bytes(bytes: &[u8]) -> Option<(String, TextEncoding)> {
    decode_with_chain(bytes, FALLBACK_CHAIN)
}

/// Decode `bytes` with the first encoding in `chain` that accepts them.
///
/// Returns `None` once every candidate has been rejected.
pub fn decode_with_chain(
    bytes: &[u8],
    chain: &[TextEncoding],
) -> Option<(String, TextEncoding)> {
    let mut body = bytes;
    if let Some((enc, bom_len)) = sniff_bom(bytes) {
        log::trace!("found {} byte order mark", enc.name());
        body = &bytes[bom_len..];
        match enc.decode(body) {
            Some(text) => return Some((text, enc)),
            None => log::debug!("ignoring {} byte order mark, body does not match", enc.name()),
        }
    }

    for enc in chain {
        match enc.decode(body) {
            Some(text) => {
                log::debug!("decoded subtitles as {}", enc.name());
                return Some((text, *enc));
            }
            None => log::trace!("subtitles are not valid {}", enc.name()),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_is_preferred() {
        let (text, enc) = decode_bytes("caf\u{e9}".as_bytes()).unwrap();
        assert_eq!(text, "caf\u{e9}");
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn latin1_when_utf8_fails() {
        // "café" in latin-1, the lone 0xE9 is not valid utf-8
        let bytes = b"caf\xe9";
        let (text, enc) = decode_bytes(bytes).unwrap();
        assert_eq!(enc, TextEncoding::Latin1);
        assert_eq!(text, "caf\u{e9}");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let bytes = b"\xEF\xBB\xBF1\n";
        let (text, enc) = decode_bytes(bytes).unwrap();
        assert_eq!(enc, TextEncoding::Utf8);
        assert_eq!(text, "1\n");
    }

    #[test]
    fn utf8_bom_with_latin1_body_falls_back() {
        let bytes = b"\xEF\xBB\xBF1\n00:00:01,000 --> 00:00:02,000\ncaf\xe9\n\n";
        let (text, enc) = decode_bytes(bytes).unwrap();
        assert_eq!(enc, TextEncoding::Latin1);
        assert_eq!(text, "1\n00:00:01,000 --> 00:00:02,000\ncaf\u{e9}\n\n");
    }

    #[test]
    fn latin1_maps_the_c1_range_like_windows_1252() {
        assert_eq!(TextEncoding::Latin1.decode(b"\x80").unwrap(), "\u{20ac}");
    }

    #[test]
    fn utf16_bom_selects_utf16() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "1\nHi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let (text, enc) = decode_bytes(&bytes).unwrap();
        assert_eq!(enc, TextEncoding::Utf16Le);
        assert_eq!(text, "1\nHi");
    }

    #[test]
    fn utf32_bom_selects_utf32() {
        let mut bytes = UTF32_BE_BOM.to_vec();
        for c in "ok".chars() {
            bytes.extend_from_slice(&(c as u32).to_be_bytes());
        }
        let (text, enc) = decode_bytes(&bytes).unwrap();
        assert_eq!(enc, TextEncoding::Utf32Be);
        assert_eq!(text, "ok");
    }

    #[test]
    fn utf32_rejects_invalid_scalars() {
        assert_eq!(TextEncoding::Utf32Le.decode(&[0x00, 0xD8, 0x00, 0x00]), None);
        assert_eq!(TextEncoding::Utf32Le.decode(&[0x41, 0x00, 0x00]), None);
    }

    #[test]
    fn chain_exhaustion() {
        // odd length, unpaired surrogate: neither utf-16 nor utf-32 will take it
        let bytes = [0x00, 0xD8, 0x41];
        assert_eq!(
            decode_with_chain(&bytes, &[TextEncoding::Utf16Le, TextEncoding::Utf32Le]),
            None
        );
    }

    #[test]
    fn chain_is_tried_in_order() {
        let mut bytes = Vec::new();
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let (_, enc) =
            decode_with_chain(&bytes, &[TextEncoding::Utf16Le, TextEncoding::Utf8]).unwrap();
        assert_eq!(enc, TextEncoding::Utf16Le);
    }
}
