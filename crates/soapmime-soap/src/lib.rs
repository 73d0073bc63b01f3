//! # soapmime-soap
//!
//! Bridges SOAP messages and the [`soapmime`] multipart codec.
//!
//! ## Features
//!
//! - **Request filter**: Splits an incoming SwA/MTOM request into the XML
//!   envelope and its attachments, renaming `href` references so that the
//!   XML layer does not try to fetch them
//! - **Response filter**: Packs an outgoing envelope and its attachments
//!   into a `multipart/related` body with the right content types for
//!   SOAP 1.1, SOAP 1.2 and MTOM
//! - **Kernel**: Installs the filters that the configured attachment type
//!   needs and runs them in order
//! - **Converters**: `xsd:base64Binary` reference elements for SwA and
//!   MTOM, and their resolution against received attachments
//!
//! ## Quick Start
//!
//! ```
//! use soapmime_soap::{SoapAttachment, SoapKernel, SoapOptions, SoapRequest, SoapVersion};
//!
//! let options = SoapOptions::builder()
//!     .soap_version(SoapVersion::Soap11)
//!     .swa()
//!     .build();
//! let kernel = SoapKernel::new(options);
//!
//! // Client side: pack the envelope and a file.
//! let attachments = [SoapAttachment::new("doc", "text/plain", "hello")]
//!     .into_iter()
//!     .collect();
//! let outgoing = kernel.create_request(
//!     "http://localhost/service",
//!     "urn:Upload",
//!     r#"<Envelope><file href="cid:doc"/></Envelope>"#,
//!     &attachments,
//! )?;
//!
//! // Server side: unpack it again.
//! let incoming = SoapRequest::new(
//!     "http://localhost/service",
//!     "urn:Upload",
//!     SoapVersion::Soap11,
//!     outgoing.content(),
//! )
//! .with_content_type(outgoing.content_type());
//! let request = kernel.filter_request(incoming)?;
//!
//! assert_eq!(request.content_text(), r#"<Envelope><file myhref="cid:doc"/></Envelope>"#);
//! assert_eq!(request.attachments()[0].content(), b"hello");
//! # Ok::<(), soapmime_soap::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod attachment;
mod error;
mod kernel;
mod message;
mod options;

pub mod converter;
pub mod filter;

pub use attachment::{AttachmentView, SoapAttachment, SoapAttachmentList, attachment_views};
pub use error::{Error, Result};
pub use filter::{MimeFilter, RequestFilter, ResponseFilter, build_multipart_body, sanitize_hrefs};
pub use kernel::SoapKernel;
pub use message::{Request, Response, SoapMessage, SoapRequest, SoapResponse};
pub use options::{
    AttachmentType, DEFAULT_ENCODING, SoapOptions, SoapOptionsBuilder, SoapVersion,
};
