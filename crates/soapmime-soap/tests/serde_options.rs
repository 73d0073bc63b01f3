//! Options serialization, built with `--features serde`.

#![cfg(feature = "serde")]
#![allow(clippy::unwrap_used)]

use soapmime_soap::{AttachmentType, SoapOptions, SoapVersion};

#[test]
fn test_options_json_roundtrip() {
    let options = SoapOptions::builder()
        .soap_version(SoapVersion::Soap11)
        .mtom()
        .build();

    let json = serde_json::to_string(&options).unwrap();
    assert!(json.contains("\"Soap11\""));
    assert!(json.contains("\"Mtom\""));

    let parsed: SoapOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, options);
}

#[test]
fn test_options_from_json() {
    let json = r#"{"soap_version":"Soap12","encoding":"UTF-8","attachment_type":"Swa"}"#;
    let options: SoapOptions = serde_json::from_str(json).unwrap();

    assert_eq!(options.soap_version(), SoapVersion::Soap12);
    assert_eq!(options.attachment_type(), Some(AttachmentType::Swa));
}
