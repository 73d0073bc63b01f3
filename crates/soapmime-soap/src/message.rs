//! SOAP request and response messages.

use crate::options::SoapVersion;
use soapmime::Part;
use std::borrow::Cow;
use std::marker::PhantomData;

/// Marker for messages travelling from client to server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {}

/// Marker for messages travelling from server to client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {}

/// SOAP message: envelope bytes, transport content type and the
/// attachments that travel with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapMessage<K> {
    location: String,
    action: String,
    version: SoapVersion,
    content: Vec<u8>,
    content_type: String,
    attachments: Vec<Part>,
    kind: PhantomData<fn() -> K>,
}

/// SOAP request.
pub type SoapRequest = SoapMessage<Request>;

/// SOAP response.
pub type SoapResponse = SoapMessage<Response>;

impl<K> SoapMessage<K> {
    /// Creates a message whose content type is the default of `version`.
    #[must_use]
    pub fn new(
        location: impl Into<String>,
        action: impl Into<String>,
        version: SoapVersion,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            location: location.into(),
            action: action.into(),
            version,
            content: content.into(),
            content_type: version.content_type().to_string(),
            attachments: Vec::new(),
            kind: PhantomData,
        }
    }

    /// Replaces the transport content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Attaches parts to the message.
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Part>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Endpoint location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// SOAP action.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// SOAP version.
    #[must_use]
    pub const fn version(&self) -> SoapVersion {
        self.version
    }

    /// Message body.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Message body as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn content_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Replaces the message body.
    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
    }

    /// Transport content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Replaces the transport content type.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Attachments carried by the message.
    #[must_use]
    pub fn attachments(&self) -> &[Part] {
        &self.attachments
    }

    /// Replaces the attachments.
    pub fn set_attachments(&mut self, attachments: Vec<Part>) {
        self.attachments = attachments;
    }

    /// Whether the message carries attachments.
    #[must_use]
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

impl SoapResponse {
    /// Creates the response to `request`, sharing its location, action
    /// and version.
    #[must_use]
    pub fn for_request(request: &SoapRequest, content: impl Into<Vec<u8>>) -> Self {
        Self::new(
            request.location(),
            request.action(),
            request.version(),
            content,
        )
    }
}
