//! `xsd:base64Binary` converters for SwA and MTOM attachment references.

use crate::error::{Error, Result};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use soapmime::Part;
use std::borrow::Cow;
use tracing::trace;

/// XML Schema namespace.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XOP include namespace.
pub const XOP_NAMESPACE: &str = "http://www.w3.org/2004/08/xop/include";

/// Schema type handled by the converters.
pub const BASE64_BINARY: &str = "base64Binary";

/// Characters escaped in the content-id of a `cid:` URL.
const CID_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'<')
    .add(b'>');

/// Attribute names holding a reference, renamed form first.
const REFERENCE_ATTRIBUTES: [&str; 2] = ["myhref", "href"];

/// Converts between attachment parts and their XML references.
pub trait TypeConverter: Send + Sync {
    /// Namespace of the converted schema type.
    fn type_namespace(&self) -> &'static str {
        XSD_NAMESPACE
    }

    /// Local name of the converted schema type.
    fn type_name(&self) -> &'static str {
        BASE64_BINARY
    }

    /// XML element referencing `part`.
    fn reference_xml(&self, part: &Part) -> String;

    /// Wraps `content` in a new part and returns its reference element
    /// together with the part to attach.
    fn attach(&self, content: Vec<u8>) -> (String, Part) {
        let part = Part::new(content);
        (self.reference_xml(&part), part)
    }

    /// Resolves the reference found in `xml` against `attachments`.
    ///
    /// Without a `cid:` reference the XML itself is the data.
    ///
    /// # Errors
    ///
    /// Returns an error if the XML cannot be read, the reference is empty
    /// or no attachment carries the referenced content-id.
    fn resolve<'a>(&self, xml: &'a str, attachments: &'a [Part]) -> Result<Cow<'a, [u8]>> {
        resolve_reference(xml, attachments)
    }
}

/// SwA converter: `<base64Binary href="cid:..."/>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwaTypeConverter;

impl TypeConverter for SwaTypeConverter {
    fn reference_xml(&self, part: &Part) -> String {
        format!(
            "<{BASE64_BINARY} href=\"{}\"/>",
            escape(&cid_url(part.content_id().unwrap_or_default()))
        )
    }
}

/// MTOM converter: `<base64Binary><xop:Include href="cid:..."/></base64Binary>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MtomTypeConverter;

impl TypeConverter for MtomTypeConverter {
    fn reference_xml(&self, part: &Part) -> String {
        format!(
            "<{BASE64_BINARY}><xop:Include xmlns:xop=\"{XOP_NAMESPACE}\" href=\"{}\"/></{BASE64_BINARY}>",
            escape(&cid_url(part.content_id().unwrap_or_default()))
        )
    }
}

/// `cid:` URL for a content-id.
#[must_use]
pub fn cid_url(content_id: &str) -> String {
    format!("cid:{}", utf8_percent_encode(content_id, CID_ENCODE))
}

/// Finds the first `cid:` reference in `xml` and returns its decoded
/// content-id.
///
/// # Errors
///
/// Returns an error if the XML is malformed or the reference is empty.
pub fn find_cid_reference(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if let Some(content_id) = element_reference(&e)? {
                    return Ok(Some(content_id));
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn element_reference(element: &BytesStart<'_>) -> Result<Option<String>> {
    for name in REFERENCE_ATTRIBUTES {
        let Some(attr) = element
            .try_get_attribute(name)
            .map_err(quick_xml::Error::from)?
        else {
            continue;
        };
        let value = attr.unescape_value()?;
        let Some(encoded) = value.strip_prefix("cid:") else {
            continue;
        };
        let content_id = percent_decode_str(encoded).decode_utf8_lossy().into_owned();
        if content_id.trim().is_empty() {
            return Err(Error::InvalidReference(value.into_owned()));
        }
        return Ok(Some(content_id));
    }
    Ok(None)
}

/// Resolves the `cid:` reference in `xml` to the content of the matching
/// attachment, or returns `xml` itself when it holds no reference.
///
/// # Errors
///
/// Returns [`Error::UnknownAttachment`] if no attachment matches.
pub fn resolve_reference<'a>(xml: &'a str, attachments: &'a [Part]) -> Result<Cow<'a, [u8]>> {
    let Some(content_id) = find_cid_reference(xml)? else {
        return Ok(Cow::Borrowed(xml.as_bytes()));
    };
    trace!(content_id = %content_id, "Resolving attachment reference");
    attachments
        .iter()
        .find(|part| part.has_content_id(&content_id))
        .map(|part| Cow::Borrowed(part.content()))
        .ok_or(Error::UnknownAttachment(content_id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_swa_reference() {
        let part = Part::new("data").with_content_id("doc-1@example.org");
        assert_eq!(
            SwaTypeConverter.reference_xml(&part),
            r#"<base64Binary href="cid:doc-1@example.org"/>"#
        );
    }

    #[test]
    fn test_mtom_reference() {
        let part = Part::new("data").with_content_id("doc-1");
        assert_eq!(
            MtomTypeConverter.reference_xml(&part),
            r#"<base64Binary><xop:Include xmlns:xop="http://www.w3.org/2004/08/xop/include" href="cid:doc-1"/></base64Binary>"#
        );
    }

    #[test]
    fn test_cid_url_escapes() {
        assert_eq!(cid_url("a b%c"), "cid:a%20b%25c");
        assert_eq!(cid_url("part-1@host.local"), "cid:part-1@host.local");
    }

    #[test]
    fn test_find_sanitized_reference() {
        let xml = r#"<base64Binary myhref="cid:a%20b"/>"#;
        assert_eq!(find_cid_reference(xml).unwrap().as_deref(), Some("a b"));
    }

    #[test]
    fn test_find_nested_reference() {
        let xml = r#"<data><xop:Include xmlns:xop="x" href="cid:doc"/></data>"#;
        assert_eq!(find_cid_reference(xml).unwrap().as_deref(), Some("doc"));
    }

    #[test]
    fn test_non_cid_reference_is_ignored() {
        let xml = r#"<a href="http://example.org/x">text</a>"#;
        assert_eq!(find_cid_reference(xml).unwrap(), None);
    }

    #[test]
    fn test_empty_reference() {
        let xml = r#"<a myhref="cid:"/>"#;
        assert!(matches!(
            find_cid_reference(xml),
            Err(Error::InvalidReference(_))
        ));
    }

    #[test]
    fn test_resolve() {
        let (xml, part) = SwaTypeConverter.attach(b"payload".to_vec());
        let attachments = vec![part];

        let resolved = SwaTypeConverter.resolve(&xml, &attachments).unwrap();
        assert_eq!(&*resolved, b"payload");
    }

    #[test]
    fn test_resolve_unknown() {
        let xml = r#"<base64Binary myhref="cid:missing"/>"#;
        assert!(matches!(
            resolve_reference(xml, &[]),
            Err(Error::UnknownAttachment(id)) if id == "missing"
        ));
    }

    #[test]
    fn test_resolve_inline_data() {
        let resolved = resolve_reference("aGVsbG8=", &[]).unwrap();
        assert_eq!(&*resolved, b"aGVsbG8=");
    }

    #[test]
    fn test_type_name() {
        assert_eq!(SwaTypeConverter.type_name(), "base64Binary");
        assert_eq!(MtomTypeConverter.type_namespace(), XSD_NAMESPACE);
    }
}
