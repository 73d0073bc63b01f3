//! # soapmime
//!
//! MIME `multipart/related` codec for SOAP with Attachments (SwA) and
//! MTOM/XOP messages.
//!
//! ## Features
//!
//! - **Parsing**: Split a raw HTTP body into the main XML part and its
//!   attachments, tolerating folded headers, mixed CRLF/LF line endings,
//!   encoded words and messages without a declared `start`
//! - **Serialization**: Assemble parts back into a multipart body with a
//!   collision-resistant boundary
//! - **Header model**: Case-insensitive headers whose values are either
//!   scalars or a primary value with ordered parameters
//! - **Encoding/Decoding**: Base64, Quoted-Printable, RFC 2047 encoded
//!   words, ISO-8859-1 transcoding
//!
//! ## Quick Start
//!
//! ### Parsing
//!
//! ```
//! use soapmime::parser;
//!
//! let raw = b"--B\r\n\
//!             Content-ID: <env>\r\n\
//!             \r\n\
//!             <Envelope/>\r\n\
//!             --B\r\n\
//!             Content-ID: <file>\r\n\
//!             Content-Transfer-Encoding: base64\r\n\
//!             \r\n\
//!             aGVsbG8=\r\n\
//!             --B--";
//!
//! let multipart = parser::parse(raw, [("Content-Type", "multipart/related; boundary=B")])?;
//! assert_eq!(multipart.main_part()?.content(), b"<Envelope/>");
//! assert_eq!(multipart.part("file")?.content(), b"hello");
//! # Ok::<(), soapmime::Error>(())
//! ```
//!
//! ### Building
//!
//! ```
//! use soapmime::{MultiPart, Part, TransferEncoding, parser};
//!
//! let mut multipart = MultiPart::with_boundary(MultiPart::generate_boundary());
//! multipart.add_part(Part::new("<Envelope/>").with_content_type("text/xml"), true);
//! multipart.add_part(
//!     Part::new(vec![0x25, 0x50, 0x44, 0x46]).with_transfer_encoding(TransferEncoding::Base64),
//!     false,
//! );
//!
//! let body = parser::serialize(&multipart, false)?;
//! assert!(body.ends_with(b"--"));
//! # Ok::<(), soapmime::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod header;
mod multipart;
mod part;

pub mod boundary;
pub mod content_type;
pub mod encoding;
pub mod parser;

pub use error::{Error, MAX_EXCERPT_LEN, ParseContext, Result};
pub use header::{HeaderBearer, HeaderValue, Headers};
pub use multipart::MultiPart;
pub use part::{
    DEFAULT_CHARSET, DEFAULT_CONTENT_TYPE, Part, TransferEncoding, generate_content_id,
    trim_angle_brackets,
};
