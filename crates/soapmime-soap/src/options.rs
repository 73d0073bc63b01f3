//! SOAP options.

use crate::error::{Error, Result};
use std::fmt;

/// Encoding label used when none is configured.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// SOAP protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SoapVersion {
    /// SOAP 1.1 (`text/xml`).
    Soap11,
    /// SOAP 1.2 (`application/soap+xml`).
    #[default]
    Soap12,
}

impl SoapVersion {
    /// Default Content-Type of a message of this version.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Soap11 => "text/xml; charset=utf-8",
            Self::Soap12 => "application/soap+xml; charset=utf-8",
        }
    }

    /// Media type of the envelope, without parameters.
    #[must_use]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Soap11 => "text/xml",
            Self::Soap12 => "application/soap+xml",
        }
    }

    /// Numeric protocol constant (1 for SOAP 1.1, 2 for SOAP 1.2).
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::Soap11 => 1,
            Self::Soap12 => 2,
        }
    }
}

impl TryFrom<u32> for SoapVersion {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(Self::Soap11),
            2 => Ok(Self::Soap12),
            other => Err(Error::InvalidSoapVersion(other)),
        }
    }
}

impl fmt::Display for SoapVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Soap11 => write!(f, "SOAP 1.1"),
            Self::Soap12 => write!(f, "SOAP 1.2"),
        }
    }
}

/// How binary data travels alongside the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttachmentType {
    /// Inline base64 inside the envelope.
    Base64,
    /// SOAP with Attachments: `multipart/related` with `href="cid:..."`.
    Swa,
    /// MTOM/XOP: `multipart/related` with `xop:Include` references.
    Mtom,
}

impl AttachmentType {
    /// Whether messages of this type are MIME multipart messages.
    #[must_use]
    pub const fn is_multipart(self) -> bool {
        matches!(self, Self::Swa | Self::Mtom)
    }
}

impl fmt::Display for AttachmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base64 => write!(f, "base64"),
            Self::Swa => write!(f, "SwA"),
            Self::Mtom => write!(f, "MTOM"),
        }
    }
}

/// SOAP options shared by the filter kernel and its filters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SoapOptions {
    soap_version: SoapVersion,
    encoding: String,
    attachment_type: Option<AttachmentType>,
}

impl Default for SoapOptions {
    fn default() -> Self {
        SoapOptionsBuilder::new().build()
    }
}

impl SoapOptions {
    /// Creates an options builder.
    #[must_use]
    pub fn builder() -> SoapOptionsBuilder {
        SoapOptionsBuilder::new()
    }

    /// SOAP version.
    #[must_use]
    pub const fn soap_version(&self) -> SoapVersion {
        self.soap_version
    }

    /// Encoding label.
    #[must_use]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Attachment type, `None` when attachments are disabled.
    #[must_use]
    pub const fn attachment_type(&self) -> Option<AttachmentType> {
        self.attachment_type
    }

    /// Whether attachments are enabled.
    #[must_use]
    pub const fn has_attachments(&self) -> bool {
        self.attachment_type.is_some()
    }
}

/// Builder for [`SoapOptions`].
///
/// Defaults to SOAP 1.2, UTF-8 and no attachments.
#[derive(Debug, Clone)]
pub struct SoapOptionsBuilder {
    soap_version: SoapVersion,
    encoding: String,
    attachment_type: Option<AttachmentType>,
}

impl Default for SoapOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SoapOptionsBuilder {
    /// Creates a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            soap_version: SoapVersion::default(),
            encoding: DEFAULT_ENCODING.to_string(),
            attachment_type: None,
        }
    }

    /// Sets the SOAP version.
    #[must_use]
    pub const fn soap_version(mut self, version: SoapVersion) -> Self {
        self.soap_version = version;
        self
    }

    /// Sets the encoding label.
    #[must_use]
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Enables attachments of the given type.
    #[must_use]
    pub const fn attachment_type(mut self, attachment_type: AttachmentType) -> Self {
        self.attachment_type = Some(attachment_type);
        self
    }

    /// Shorthand for SwA attachments.
    #[must_use]
    pub const fn swa(self) -> Self {
        self.attachment_type(AttachmentType::Swa)
    }

    /// Shorthand for MTOM attachments.
    #[must_use]
    pub const fn mtom(self) -> Self {
        self.attachment_type(AttachmentType::Mtom)
    }

    /// Builds the options.
    #[must_use]
    pub fn build(self) -> SoapOptions {
        SoapOptions {
            soap_version: self.soap_version,
            encoding: self.encoding,
            attachment_type: self.attachment_type,
        }
    }
}
