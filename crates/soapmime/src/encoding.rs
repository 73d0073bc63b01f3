//! MIME encoding and decoding utilities.
//!
//! Supports Base64, Quoted-Printable, RFC 2047 encoded words, charset
//! transcoding of part bodies and the ISO-8859-1 transliteration used for
//! HTTP header values.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::fmt::Write as _;

/// Maximum line length for Base64 and Quoted-Printable bodies.
const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 split into CRLF separated lines of 76 characters.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> String {
    let encoded = encode_base64(data);
    let mut result = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2);
    for (i, chunk) in encoded.as_bytes().chunks(MAX_LINE_LENGTH).enumerate() {
        if i > 0 {
            result.push_str("\r\n");
        }
        // Base64 output is pure ASCII.
        result.extend(chunk.iter().map(|&b| b as char));
    }
    result
}

/// Decodes Base64 data, ignoring any whitespace (line breaks included).
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    let cleaned: Vec<u8> = data
        .as_ref()
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Encodes bytes using Quoted-Printable encoding (RFC 2045).
///
/// Line breaks in the input are escaped (`=0D`, `=0A`) so that decoding
/// reproduces the input byte for byte.
#[must_use]
pub fn encode_quoted_printable(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len());
    let mut line_length = 0;

    for byte in data {
        // Check if we need soft line break
        if line_length >= MAX_LINE_LENGTH - 3 {
            result.push_str("=\r\n");
            line_length = 0;
        }

        match byte {
            // Printable ASCII except '='
            b'!'..=b'<' | b'>'..=b'~' => {
                result.push(*byte as char);
                line_length += 1;
            }
            b' ' => {
                if line_length >= MAX_LINE_LENGTH - 4 {
                    result.push_str("=20");
                    line_length += 3;
                } else {
                    result.push(' ');
                    line_length += 1;
                }
            }
            _ => {
                let _ = write!(result, "={byte:02X}");
                line_length += 3;
            }
        }
    }

    result
}

/// Decodes Quoted-Printable data (RFC 2045).
///
/// Soft line breaks (`=` followed by CRLF or LF) are removed. An `=` that
/// is not followed by two hex digits is kept literally.
#[must_use]
pub fn decode_quoted_printable(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        if byte != b'=' {
            result.push(byte);
            i += 1;
            continue;
        }

        match (data.get(i + 1), data.get(i + 2)) {
            (Some(b'\r'), Some(b'\n')) => i += 3,
            (Some(b'\n'), _) => i += 2,
            (Some(&hi), Some(&lo)) => match (hex_value(hi), hex_value(lo)) {
                (Some(hi), Some(lo)) => {
                    result.push((hi << 4) | lo);
                    i += 3;
                }
                _ => {
                    result.push(b'=');
                    i += 1;
                }
            },
            _ => {
                result.push(b'=');
                i += 1;
            }
        }
    }

    result
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

/// Decodes every RFC 2047 encoded word in a header value.
///
/// Format of a single word: `=?charset?encoding?encoded-text?=`. Plain
/// text around encoded words is kept; whitespace between two adjacent
/// encoded words is dropped. Text that merely starts with `=?` but lacks
/// the encoded-word structure is kept literally.
///
/// # Errors
///
/// Returns an error if an encoded word uses an unknown encoding, carries
/// invalid Base64, names an unsupported charset or does not decode to
/// valid UTF-8.
pub fn decode_encoded_words(text: &str) -> Result<String> {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    let mut previous_was_word = false;

    while let Some(start) = rest.find("=?") {
        let (before, candidate) = rest.split_at(start);
        if let Some((word, consumed)) = EncodedWord::split(candidate) {
            if !(previous_was_word && before.trim().is_empty()) {
                result.push_str(before);
            }
            result.push_str(&word.decode()?);
            rest = &candidate[consumed..];
            previous_was_word = true;
        } else {
            result.push_str(before);
            result.push_str("=?");
            rest = &candidate[2..];
            previous_was_word = false;
        }
    }
    result.push_str(rest);

    Ok(result)
}

struct EncodedWord<'a> {
    charset: &'a str,
    encoding: &'a str,
    payload: &'a str,
}

impl<'a> EncodedWord<'a> {
    /// Splits one encoded word off the front of `text` (which starts with
    /// `=?`), returning it and the number of bytes consumed.
    fn split(text: &'a str) -> Option<(Self, usize)> {
        let inner = text.strip_prefix("=?")?;
        let (charset, after_charset) = inner.split_once('?')?;
        let (encoding, after_encoding) = after_charset.split_once('?')?;
        let end = after_encoding.find("?=")?;
        if charset.is_empty() || encoding.len() != 1 || charset.contains(char::is_whitespace) {
            return None;
        }
        let payload = &after_encoding[..end];
        let consumed = 2 + charset.len() + 1 + encoding.len() + 1 + end + 2;
        Some((
            Self {
                charset,
                encoding,
                payload,
            },
            consumed,
        ))
    }

    fn decode(&self) -> Result<String> {
        let bytes = match self.encoding {
            "B" | "b" => decode_base64(self.payload)?,
            "Q" | "q" => decode_quoted_printable(self.payload.replace('_', " ").as_bytes()),
            other => {
                return Err(Error::InvalidEncoding(format!(
                    "Unknown encoded-word encoding: {other}"
                )));
            }
        };
        // RFC 2231 language suffix, e.g. "utf-8*en"
        let charset = self.charset.split('*').next().unwrap_or(self.charset);
        let utf8 = transcode_to_utf8(&bytes, charset)?;
        String::from_utf8(utf8.into_owned())
            .map_err(|e| Error::InvalidEncoding(format!("Encoded word is not valid {charset}: {e}")))
    }
}

/// Transcodes `data` from `charset` to UTF-8.
///
/// Labels are resolved the way browsers resolve them, so `latin1` and
/// `us-ascii` both decode as windows-1252. UTF-8 (and an empty label)
/// passes through unchanged. A byte order mark overrides the label.
///
/// # Errors
///
/// Returns [`Error::UnsupportedCharset`] for a label with no known
/// encoding and [`Error::InvalidEncoding`] if `data` is malformed in the
/// resolved encoding.
pub fn transcode_to_utf8<'a>(data: &'a [u8], charset: &str) -> Result<Cow<'a, [u8]>> {
    let label = charset.trim();
    if label.is_empty() {
        return Ok(Cow::Borrowed(data));
    }
    let encoding = Encoding::for_label_no_replacement(label.as_bytes())
        .ok_or_else(|| Error::UnsupportedCharset(label.to_ascii_lowercase()))?;
    if encoding == UTF_8 {
        return Ok(Cow::Borrowed(data));
    }

    let (text, actual, malformed) = encoding.decode(data);
    if malformed {
        return Err(Error::InvalidEncoding(format!(
            "Content is not valid {}",
            actual.name()
        )));
    }
    Ok(match text {
        Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
        Cow::Owned(text) => Cow::Owned(text.into_bytes()),
    })
}

/// Transliterates text so that every character fits ISO-8859-1.
///
/// Characters above U+00FF are replaced with close ASCII equivalents
/// where one exists, otherwise with `?`.
#[must_use]
pub fn to_latin1_lossy(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if u32::from(c) <= 0xFF {
            result.push(c);
            continue;
        }
        match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => result.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => result.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => result.push('-'),
            '\u{2026}' => result.push_str("..."),
            '\u{20AC}' => result.push_str("EUR"),
            '\u{2122}' => result.push_str("TM"),
            '\u{0152}' => result.push_str("OE"),
            '\u{0153}' => result.push_str("oe"),
            _ => result.push('?'),
        }
    }
    result
}
