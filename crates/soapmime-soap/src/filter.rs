//! MIME filters turning SwA/MTOM messages into plain envelopes and back.

use crate::attachment::SoapAttachment;
use crate::error::Result;
use crate::message::{SoapRequest, SoapResponse};
use crate::options::{AttachmentType, SoapVersion};
use soapmime::{HeaderBearer, MultiPart, Part, TransferEncoding, parser};
use tracing::debug;

/// Content type of the XOP root part.
pub const XOP_CONTENT_TYPE: &str = "application/xop+xml";

/// Filter applied to a request before the SOAP engine sees it.
pub trait RequestFilter: Send + Sync {
    /// Transforms `request` according to `attachment_type`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be transformed.
    fn filter_request(
        &self,
        request: SoapRequest,
        attachment_type: AttachmentType,
    ) -> Result<SoapRequest>;
}

/// Filter applied to a response after the SOAP engine produced it.
pub trait ResponseFilter: Send + Sync {
    /// Transforms `response` according to `attachment_type`.
    ///
    /// # Errors
    ///
    /// Returns an error if the response cannot be transformed.
    fn filter_response(
        &self,
        response: SoapResponse,
        attachment_type: AttachmentType,
    ) -> Result<SoapResponse>;
}

/// Splits multipart requests into envelope plus attachments and packs
/// responses with attachments into multipart messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct MimeFilter;

impl RequestFilter for MimeFilter {
    fn filter_request(
        &self,
        mut request: SoapRequest,
        attachment_type: AttachmentType,
    ) -> Result<SoapRequest> {
        let multipart = parser::parse(
            request.content(),
            [("Content-Type", request.content_type().trim())],
        )?;
        let (main, attachments) = multipart.into_main_and_attachments()?;

        let content_type = main.content_type().unwrap_or_default().to_string();
        debug!(
            %attachment_type,
            attachments = attachments.len(),
            content_type = %content_type,
            "Unpacked multipart request"
        );

        request.set_content(sanitize_hrefs(main.content()));
        request.set_content_type(content_type);
        if !attachments.is_empty() {
            request.set_attachments(attachments);
        }
        Ok(request)
    }
}

impl ResponseFilter for MimeFilter {
    fn filter_response(
        &self,
        mut response: SoapResponse,
        attachment_type: AttachmentType,
    ) -> Result<SoapResponse> {
        if !response.has_attachments() {
            return Ok(response);
        }

        let (body, content_type) = build_multipart(
            response.content(),
            response.version(),
            attachment_type,
            response.attachments().to_vec(),
        )?;
        response.set_content(body);
        response.set_content_type(content_type);
        Ok(response)
    }
}

/// Renames `href=` attributes to `myhref=` unless they point to a local
/// `#fragment`.
///
/// Only attribute names preceded by whitespace are touched, so names that
/// merely end in `href` are left alone.
#[must_use]
pub fn sanitize_hrefs(xml: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(xml.len() + 16);
    for (i, &byte) in xml.iter().enumerate() {
        let at_attribute = i == 0 || xml[i - 1].is_ascii_whitespace();
        if at_attribute && xml[i..].starts_with(b"href=") {
            let value = &xml[i + 5..];
            let first = match value.first() {
                Some(b'"' | b'\'') => value.get(1),
                other => other,
            };
            if first != Some(&b'#') {
                out.extend_from_slice(b"my");
            }
        }
        out.push(byte);
    }
    out
}

/// Packs an envelope and its attachments into a multipart body.
///
/// Returns the serialized body (without outer headers) and the transport
/// `Content-Type` to send it with.
///
/// # Errors
///
/// Returns an error if the multipart message cannot be serialized.
pub fn build_multipart_body(
    xml: &[u8],
    version: SoapVersion,
    attachment_type: AttachmentType,
    attachments: &[SoapAttachment],
) -> Result<(Vec<u8>, String)> {
    build_multipart(
        xml,
        version,
        attachment_type,
        attachments.iter().map(SoapAttachment::to_part).collect(),
    )
}

fn build_multipart(
    xml: &[u8],
    version: SoapVersion,
    attachment_type: AttachmentType,
    attachments: Vec<Part>,
) -> Result<(Vec<u8>, String)> {
    let mut multipart = MultiPart::with_boundary(MultiPart::generate_boundary());
    let mut main = Part::new(xml)
        .with_content_type("text/xml")
        .with_charset("utf-8")
        .with_transfer_encoding(TransferEncoding::EightBit);

    match (version, attachment_type) {
        (SoapVersion::Soap11, AttachmentType::Mtom) => {
            multipart.set_header("Content-Type", XOP_CONTENT_TYPE, Some("type"));
            multipart.set_header("Content-Type", "text/xml", Some("start-info"));
            main.set_header("Content-Type", XOP_CONTENT_TYPE, None);
            main.set_header("Content-Type", "text/xml", Some("type"));
        }
        (SoapVersion::Soap12, _) => {
            let media_type = SoapVersion::Soap12.media_type();
            multipart.set_header("Content-Type", media_type, Some("type"));
            main.set_header("Content-Type", media_type, None);
        }
        (SoapVersion::Soap11, _) => {}
    }

    multipart.add_part(main, true);
    let count = attachments.len();
    for attachment in attachments {
        multipart.add_part(attachment, false);
    }

    let body = parser::serialize(&multipart, false)?;
    let content_type = multipart
        .headers_for_http()
        .into_iter()
        .find_map(|header| header.strip_prefix("Content-Type: ").map(str::to_string))
        .unwrap_or_default();

    debug!(
        %version,
        %attachment_type,
        attachments = count,
        len = body.len(),
        "Packed multipart message"
    );
    Ok((body, content_type))
}
