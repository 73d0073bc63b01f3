//! Multipart codec: parsing raw messages into a [`MultiPart`] and
//! serializing it back.
//!
//! # Example
//!
//! ```
//! use soapmime::parser;
//!
//! let raw = b"--B\r\nContent-ID: <env>\r\n\r\n<Envelope/>\r\n--B--";
//! let multipart = parser::parse(
//!     raw,
//!     [("Content-Type", "multipart/related; type=\"text/xml\"; boundary=B")],
//! )?;
//! assert_eq!(multipart.main_part()?.content(), b"<Envelope/>");
//! # Ok::<(), soapmime::Error>(())
//! ```

mod parsed;
mod scanner;

pub use parsed::{ParsedPart, ParsedPartList};
pub use scanner::MimeScanner;

use crate::boundary::any_boundary;
use crate::content_type;
use crate::error::{Error, ParseContext, Result};
use crate::header::HeaderBearer;
use crate::multipart::MultiPart;
use crate::part::Part;
use tracing::debug;

/// Content type given to a single-part message when the transport does
/// not declare one.
const SINGLE_PART_CONTENT_TYPE: &str = "text/xml";

/// Parses a raw message body into a [`MultiPart`].
///
/// `transport_headers` seed the outer headers; a `Content-Type` among them
/// is split into its parameters so that `boundary` and `start` are known
/// before scanning.
///
/// A message is taken as a single main part, content kept verbatim, when
/// no boundary is declared and either the transport declares a
/// non-multipart content type or no line of the message looks like a
/// boundary. A declared boundary always forces scanning.
///
/// # Errors
///
/// Returns [`Error::MalformedMultipart`] if the multipart structure cannot
/// be followed, [`Error::NoMainPart`] or [`Error::AmbiguousMainPart`] if
/// not exactly one part qualifies as main, and a header or body decode
/// error if a part cannot be decoded.
pub fn parse<I, K, V>(raw: &[u8], transport_headers: I) -> Result<MultiPart>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut multipart = MultiPart::new();
    let mut headers_seen = Vec::new();
    let mut declared_type = None;

    for (name, value) in transport_headers {
        let (name, value) = (name.as_ref().trim(), value.as_ref().trim());
        headers_seen.push(format!("{name}: {value}"));
        if name.eq_ignore_ascii_case("Content-Type") {
            content_type::apply(multipart.headers_mut(), name, value);
            declared_type = Some(value.to_string());
        } else {
            multipart.headers_mut().set(name, value);
        }
    }
    let has_transport_headers = !headers_seen.is_empty();

    let lines: Vec<&[u8]> = raw.split(|&byte| byte == b'\n').collect();
    let single_part_type = declared_type.filter(|value| !is_multipart(value));
    if multipart.boundary().is_none() && (single_part_type.is_some() || !any_boundary(&lines)) {
        debug!(len = raw.len(), "No boundary, parsing as single main part");
        let part = single_part(raw, single_part_type.as_deref());
        multipart.add_part(part, true);
        return Ok(multipart);
    }

    if lines.len() <= 1 {
        return Err(Error::malformed(
            format!("unexpectedly low number of lines: {}", lines.len()),
            ParseContext::new(raw, headers_seen),
        ));
    }

    debug!(
        len = raw.len(),
        lines = lines.len(),
        boundary = multipart.boundary(),
        "Scanning multipart message"
    );
    let parsed = MimeScanner::new(&mut multipart, raw, has_transport_headers, &mut headers_seen)
        .scan(&lines)?;

    if parsed.is_empty() {
        return Err(Error::malformed(
            "no parts found",
            ParseContext::new(raw, headers_seen),
        ));
    }
    match parsed.main_count() {
        1 => {}
        0 => {
            return Err(Error::NoMainPart {
                content_ids: parsed.content_ids(),
                context: Some(Box::new(ParseContext::new(raw, headers_seen))),
            });
        }
        count => {
            return Err(Error::AmbiguousMainPart {
                count,
                content_ids: parsed.content_ids(),
                context: Box::new(ParseContext::new(raw, headers_seen)),
            });
        }
    }

    for ParsedPart { part, is_main } in parsed {
        multipart.add_part(part, is_main);
    }
    Ok(multipart)
}

/// Serializes a [`MultiPart`].
///
/// With `with_headers` the outer header block comes first. Each part is
/// introduced by `\r\n--boundary\r\n` and rendered with its own headers and
/// transfer encoding; the message ends with `\r\n--boundary--`.
///
/// # Errors
///
/// Returns [`Error::MissingBoundary`] if the container has no (or an empty)
/// boundary and [`Error::EmptySerialization`] if it holds no parts, since
/// the message would then be a bare terminator.
pub fn serialize(multipart: &MultiPart, with_headers: bool) -> Result<Vec<u8>> {
    let boundary = multipart
        .boundary()
        .filter(|boundary| !boundary.is_empty())
        .ok_or(Error::MissingBoundary)?;

    let mut body = Vec::new();
    for part in multipart.parts() {
        body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
        body.extend(part.message_part());
    }
    if body.is_empty() {
        return Err(Error::EmptySerialization);
    }

    let mut message = Vec::new();
    if with_headers {
        message.extend_from_slice(multipart.headers().generate().as_bytes());
    }
    message.extend(body);
    message.extend_from_slice(format!("\r\n--{boundary}--").as_bytes());
    debug!(
        len = message.len(),
        parts = multipart.len(),
        "Serialized multipart message"
    );
    Ok(message)
}

fn is_multipart(content_type: &str) -> bool {
    content_type
        .trim_start()
        .get(..10)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("multipart/"))
}

fn single_part(raw: &[u8], declared_type: Option<&str>) -> Part {
    let mut part = Part::new(raw).with_content_type(SINGLE_PART_CONTENT_TYPE);
    if let Some(value) = declared_type {
        content_type::apply(part.headers_mut(), "Content-Type", value);
    }
    part
}
