//! Error types for MIME operations.

use std::fmt;

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Largest number of raw message bytes retained in a [`ParseContext`].
pub const MAX_EXCERPT_LEN: usize = 64 * 1024;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The message declares or implies a multipart structure that the
    /// scanner could not follow.
    #[error("Malformed multipart message ({context}): {reason}")]
    MalformedMultipart {
        /// What went wrong.
        reason: String,
        /// Raw message excerpt and headers seen so far.
        context: Box<ParseContext>,
    },

    /// No part qualifies as the main (envelope) part.
    #[error("No main part found among [{}]", content_ids.join(", "))]
    NoMainPart {
        /// Content-ids of the parts that were present.
        content_ids: Vec<String>,
        /// Parse context, when raised while parsing.
        context: Option<Box<ParseContext>>,
    },

    /// More than one part qualifies as the main part.
    #[error("Ambiguous main part: {count} candidates among [{}]", content_ids.join(", "))]
    AmbiguousMainPart {
        /// Number of main candidates.
        count: usize,
        /// Content-ids of all parsed parts.
        content_ids: Vec<String>,
        /// Raw message excerpt and headers seen so far.
        context: Box<ParseContext>,
    },

    /// A header value could not be decoded before any boundary was seen.
    ///
    /// At that point the scanner cannot tell malformed headers apart from
    /// binary content that was mistaken for a header block.
    #[error("Cannot parse headers before hitting the first boundary: {header}: {reason}")]
    UnresolvedHeaderEncoding {
        /// Header name, or the raw line when no name could be split off.
        header: String,
        /// Offending raw value (lossily converted).
        value: String,
        /// Decoder message.
        reason: String,
        /// Raw message excerpt and headers seen so far.
        context: Box<ParseContext>,
    },

    /// A header value inside a part could not be decoded.
    #[error("Cannot decode {header} header value of {length} bytes: {reason}")]
    HeaderValueDecode {
        /// Header name.
        header: String,
        /// Byte length of the offending value.
        length: usize,
        /// Decoder message.
        reason: String,
        /// Raw message excerpt and headers seen so far.
        context: Box<ParseContext>,
    },

    /// No part with the requested content-id.
    #[error("MIME part not found by content-id: {0}")]
    UnknownContentId(String),

    /// Serialization produced no bytes.
    #[error("Serialized multipart message is empty")]
    EmptySerialization,

    /// Missing boundary in multipart message.
    #[error("Missing boundary in multipart message")]
    MissingBoundary,

    /// Charset that cannot be transcoded to UTF-8.
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// Invalid encoding.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),
}

impl Error {
    /// Returns the parse context attached to this error, if any.
    #[must_use]
    pub fn context(&self) -> Option<&ParseContext> {
        match self {
            Self::MalformedMultipart { context, .. }
            | Self::AmbiguousMainPart { context, .. }
            | Self::UnresolvedHeaderEncoding { context, .. }
            | Self::HeaderValueDecode { context, .. } => Some(context),
            Self::NoMainPart { context, .. } => context.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>, context: ParseContext) -> Self {
        Self::MalformedMultipart {
            reason: reason.into(),
            context: Box::new(context),
        }
    }
}

/// Diagnostic snapshot of a message that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContext {
    excerpt: Vec<u8>,
    total_len: usize,
    headers: Vec<String>,
}

impl ParseContext {
    /// Captures up to [`MAX_EXCERPT_LEN`] bytes of `raw` and the header
    /// lines seen so far.
    #[must_use]
    pub fn new(raw: &[u8], headers: Vec<String>) -> Self {
        Self {
            excerpt: raw[..raw.len().min(MAX_EXCERPT_LEN)].to_vec(),
            total_len: raw.len(),
            headers,
        }
    }

    /// Retained prefix of the raw message.
    #[must_use]
    pub fn message(&self) -> &[u8] {
        &self.excerpt
    }

    /// Length of the full raw message.
    #[must_use]
    pub const fn message_len(&self) -> usize {
        self.total_len
    }

    /// Whether [`message`](Self::message) is shorter than the raw message.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.excerpt.len() < self.total_len
    }

    /// Header lines (`Name: value`) seen before the failure.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl fmt::Display for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes, {} headers", self.total_len, self.headers.len())
    }
}
