//! Single MIME body part.

use crate::encoding::{
    decode_base64, decode_quoted_printable, encode_base64_wrapped, encode_quoted_printable,
    transcode_to_utf8,
};
use crate::error::Result;
use crate::header::{HeaderBearer, Headers};
use std::fmt;
use uuid::Uuid;

/// Default content type of a constructed part.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Default charset of a constructed part.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit text.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    #[default]
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "7bit" => Self::SevenBit,
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            _ => Self::Binary,
        }
    }

    /// Encodes content for the wire.
    #[must_use]
    pub fn encode(self, content: &[u8]) -> Vec<u8> {
        match self {
            Self::Base64 => encode_base64_wrapped(content).into_bytes(),
            Self::QuotedPrintable => encode_quoted_printable(content).into_bytes(),
            Self::SevenBit | Self::EightBit | Self::Binary => content.to_vec(),
        }
    }

    /// Decodes content taken from the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if Base64 content is invalid.
    pub fn decode(self, content: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Base64 => decode_base64(content),
            Self::QuotedPrintable => Ok(decode_quoted_printable(content)),
            Self::SevenBit | Self::EightBit | Self::Binary => Ok(content.to_vec()),
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Base64 => write!(f, "base64"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// MIME body part: headers plus decoded content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    headers: Headers,
    content: Vec<u8>,
}

impl Part {
    /// Creates a part with `application/octet-stream; charset=utf-8`
    /// content type, binary transfer encoding and a generated content-id.
    #[must_use]
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        let mut part = Self::empty();
        part.content = content.into();
        part.headers.set("Content-Type", DEFAULT_CONTENT_TYPE);
        part.headers
            .set_param("Content-Type", "charset", DEFAULT_CHARSET);
        part.headers
            .set("Content-Transfer-Encoding", TransferEncoding::Binary.to_string());
        part.headers
            .set("Content-ID", format!("<{}>", generate_content_id()));
        part
    }

    /// Creates a part without any header, as the scanner does before
    /// reading a header block.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            headers: Headers::new(),
            content: Vec::new(),
        }
    }

    /// Replaces the primary content type, keeping its parameters.
    #[must_use]
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.headers.set("Content-Type", content_type);
        self
    }

    /// Sets the `charset` parameter of the content type.
    #[must_use]
    pub fn with_charset(mut self, charset: &str) -> Self {
        self.headers.set_param("Content-Type", "charset", charset);
        self
    }

    /// Sets the transfer encoding.
    #[must_use]
    pub fn with_transfer_encoding(mut self, encoding: TransferEncoding) -> Self {
        self.headers
            .set("Content-Transfer-Encoding", encoding.to_string());
        self
    }

    /// Sets the content-id (angle brackets are added when missing).
    #[must_use]
    pub fn with_content_id(mut self, content_id: &str) -> Self {
        self.set_content_id(content_id);
        self
    }

    /// Sets the content-id (angle brackets are added when missing).
    pub fn set_content_id(&mut self, content_id: &str) {
        let bare = trim_angle_brackets(content_id);
        self.headers.set("Content-ID", format!("<{bare}>"));
    }

    /// Content-id without angle brackets.
    #[must_use]
    pub fn content_id(&self) -> Option<&str> {
        self.headers.get("Content-ID").map(trim_angle_brackets)
    }

    /// Whether this part's content-id equals `content_id`, ignoring angle
    /// brackets on either side.
    #[must_use]
    pub fn has_content_id(&self, content_id: &str) -> bool {
        self.content_id() == Some(trim_angle_brackets(content_id))
    }

    /// Primary content type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    /// `charset` parameter of the content type.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.headers.get_param("Content-Type", "charset")
    }

    /// Declared transfer encoding (binary when absent).
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("Content-Transfer-Encoding")
            .map_or(TransferEncoding::Binary, TransferEncoding::parse)
    }

    /// Decoded content.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Replaces the decoded content.
    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
    }

    /// Consumes the part, returning its content.
    #[must_use]
    pub fn into_content(self) -> Vec<u8> {
        self.content
    }

    /// Decodes raw wire content according to this part's own transfer
    /// encoding and charset, yielding UTF-8 for text charsets.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer encoding is violated or the charset
    /// is not supported.
    pub fn decode_content(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let decoded = self.transfer_encoding().decode(raw)?;
        match self.charset() {
            Some(charset) => Ok(transcode_to_utf8(&decoded, charset)?.into_owned()),
            None => Ok(decoded),
        }
    }

    /// Renders the header block, a blank line and the encoded content.
    #[must_use]
    pub fn message_part(&self) -> Vec<u8> {
        let mut message = self.headers.generate().into_bytes();
        message.extend_from_slice(b"\r\n");
        message.extend(self.transfer_encoding().encode(&self.content));
        message
    }
}

impl HeaderBearer for Part {
    fn headers(&self) -> &Headers {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }
}

/// Strips surrounding whitespace and angle brackets from a content-id.
#[must_use]
pub fn trim_angle_brackets(content_id: &str) -> &str {
    content_id.trim().trim_matches(|c| c == '<' || c == '>')
}

/// Generates a random content-id of the form `part-<uuid>@soapmime.local`.
#[must_use]
pub fn generate_content_id() -> String {
    format!("part-{}@soapmime.local", Uuid::new_v4())
}
