//! Filter kernel: runs the configured filters over requests and responses.

use crate::attachment::SoapAttachmentList;
use crate::converter::{MtomTypeConverter, SwaTypeConverter, TypeConverter};
use crate::error::{Error, Result};
use crate::filter::{MimeFilter, RequestFilter, ResponseFilter, build_multipart_body};
use crate::message::{SoapRequest, SoapResponse};
use crate::options::{AttachmentType, SoapOptions};
use std::fmt;
use tracing::{debug, warn};

/// Holds the options and the filter chains of one SOAP endpoint.
pub struct SoapKernel {
    options: SoapOptions,
    request_filters: Vec<Box<dyn RequestFilter>>,
    response_filters: Vec<Box<dyn ResponseFilter>>,
}

impl fmt::Debug for SoapKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoapKernel")
            .field("options", &self.options)
            .field("request_filters", &self.request_filters.len())
            .field("response_filters", &self.response_filters.len())
            .finish()
    }
}

impl SoapKernel {
    /// Creates a kernel for `options`.
    ///
    /// SwA and MTOM install a [`MimeFilter`] on both chains.
    #[must_use]
    pub fn new(options: SoapOptions) -> Self {
        let mut kernel = Self {
            options,
            request_filters: Vec::new(),
            response_filters: Vec::new(),
        };
        if kernel
            .options
            .attachment_type()
            .is_some_and(AttachmentType::is_multipart)
        {
            kernel.add_request_filter(MimeFilter);
            kernel.add_response_filter(MimeFilter);
        }
        kernel
    }

    /// Options the kernel was created with.
    #[must_use]
    pub const fn options(&self) -> &SoapOptions {
        &self.options
    }

    /// Appends a request filter.
    pub fn add_request_filter(&mut self, filter: impl RequestFilter + 'static) {
        self.request_filters.push(Box::new(filter));
    }

    /// Appends a response filter.
    pub fn add_response_filter(&mut self, filter: impl ResponseFilter + 'static) {
        self.response_filters.push(Box::new(filter));
    }

    /// Number of request and response filters.
    #[must_use]
    pub fn filter_count(&self) -> (usize, usize) {
        (self.request_filters.len(), self.response_filters.len())
    }

    /// Converter for attachment references, if attachments use MIME.
    #[must_use]
    pub fn type_converter(&self) -> Option<Box<dyn TypeConverter>> {
        match self.options.attachment_type()? {
            AttachmentType::Swa => Some(Box::new(SwaTypeConverter)),
            AttachmentType::Mtom => Some(Box::new(MtomTypeConverter)),
            AttachmentType::Base64 => None,
        }
    }

    /// Runs the request filters in order.
    ///
    /// Requests pass through unchanged when attachments are disabled.
    ///
    /// # Errors
    ///
    /// Returns the first filter error.
    pub fn filter_request(&self, request: SoapRequest) -> Result<SoapRequest> {
        let Some(attachment_type) = self.options.attachment_type() else {
            return Ok(request);
        };
        self.request_filters
            .iter()
            .try_fold(request, |request, filter| {
                filter.filter_request(request, attachment_type)
            })
    }

    /// Runs the response filters in order.
    ///
    /// Responses pass through unchanged when attachments are disabled.
    ///
    /// # Errors
    ///
    /// Returns the first filter error.
    pub fn filter_response(&self, response: SoapResponse) -> Result<SoapResponse> {
        let Some(attachment_type) = self.options.attachment_type() else {
            return Ok(response);
        };
        self.response_filters
            .iter()
            .try_fold(response, |response, filter| {
                filter.filter_response(response, attachment_type)
            })
    }

    /// Builds an outgoing request, packing `attachments` into a multipart
    /// body when SwA or MTOM is configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttachmentsNotEnabled`] if attachments are given
    /// while no attachment type is configured, or a codec error if the
    /// body cannot be built.
    pub fn create_request(
        &self,
        location: &str,
        action: &str,
        content: impl Into<Vec<u8>>,
        attachments: &SoapAttachmentList,
    ) -> Result<SoapRequest> {
        let mut request = SoapRequest::new(location, action, self.options.soap_version(), content);
        if !attachments.has_attachments() {
            return Ok(request);
        }

        let Some(attachment_type) = self.options.attachment_type() else {
            warn!(action, "Attachments supplied without an attachment type");
            return Err(Error::AttachmentsNotEnabled {
                action: action.to_string(),
                ids: attachments.ids(),
            });
        };

        if attachment_type.is_multipart() {
            let (body, content_type) = build_multipart_body(
                request.content(),
                request.version(),
                attachment_type,
                attachments.as_slice(),
            )?;
            request.set_content(body);
            request.set_content_type(content_type);
        }
        request.set_attachments(attachments.to_parts());
        debug!(action, attachments = attachments.len(), "Created SOAP request");
        Ok(request)
    }

    /// Builds the response to `request` and runs the response filters.
    ///
    /// # Errors
    ///
    /// Returns the first filter error.
    pub fn create_response(
        &self,
        request: &SoapRequest,
        content: impl Into<Vec<u8>>,
        attachments: &SoapAttachmentList,
    ) -> Result<SoapResponse> {
        let response =
            SoapResponse::for_request(request, content).with_attachments(attachments.to_parts());
        self.filter_response(response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::attachment::SoapAttachment;
    use crate::options::SoapVersion;

    fn attachments() -> SoapAttachmentList {
        [SoapAttachment::new("doc", "application/pdf", "%PDF")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_filters_per_attachment_type() {
        let kernel = SoapKernel::new(SoapOptions::builder().swa().build());
        assert_eq!(kernel.filter_count(), (1, 1));

        let kernel = SoapKernel::new(SoapOptions::builder().mtom().build());
        assert_eq!(kernel.filter_count(), (1, 1));

        let kernel = SoapKernel::new(
            SoapOptions::builder()
                .attachment_type(AttachmentType::Base64)
                .build(),
        );
        assert_eq!(kernel.filter_count(), (0, 0));
        assert!(kernel.type_converter().is_none());

        let kernel = SoapKernel::new(SoapOptions::default());
        assert_eq!(kernel.filter_count(), (0, 0));
    }

    #[test]
    fn test_type_converter() {
        let kernel = SoapKernel::new(SoapOptions::builder().mtom().build());
        let converter = kernel.type_converter().unwrap();
        let part = soapmime::Part::new("x").with_content_id("a");
        assert!(converter.reference_xml(&part).contains("xop:Include"));
    }

    #[test]
    fn test_create_request_without_attachment_type() {
        let kernel = SoapKernel::new(SoapOptions::default());
        let err = kernel
            .create_request("http://localhost/", "urn:Upload", "<a/>", &attachments())
            .unwrap_err();

        match err {
            Error::AttachmentsNotEnabled { action, ids } => {
                assert_eq!(action, "urn:Upload");
                assert_eq!(ids, vec!["doc"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_create_request_without_attachments() {
        let kernel = SoapKernel::new(SoapOptions::default());
        let request = kernel
            .create_request("http://localhost/", "urn:Ping", "<a/>", &SoapAttachmentList::new())
            .unwrap();

        assert_eq!(request.content(), b"<a/>");
        assert_eq!(request.content_type(), SoapVersion::Soap12.content_type());
    }

    #[test]
    fn test_create_request_swa() {
        let kernel = SoapKernel::new(
            SoapOptions::builder()
                .soap_version(SoapVersion::Soap11)
                .swa()
                .build(),
        );
        let request = kernel
            .create_request("http://localhost/", "urn:Upload", "<a/>", &attachments())
            .unwrap();

        assert!(request.content_type().starts_with("multipart/related"));
        assert!(request.has_attachments());
        assert!(String::from_utf8_lossy(request.content()).contains("%PDF"));
    }

    #[test]
    fn test_passthrough_without_attachment_type() {
        let kernel = SoapKernel::new(SoapOptions::default());
        let request = SoapRequest::new("", "", SoapVersion::Soap12, "not multipart");
        let filtered = kernel.filter_request(request.clone()).unwrap();
        assert_eq!(filtered, request);
    }
}
