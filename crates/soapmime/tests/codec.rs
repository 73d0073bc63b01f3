//! Integration tests for the multipart codec.
//!
//! Messages are written out by hand the way SOAP stacks put them on the
//! wire, including the irregularities seen in practice.

#![allow(clippy::unwrap_used)]

use soapmime::parser::{self, MimeScanner};
use soapmime::{Error, HeaderBearer, MultiPart, Part, TransferEncoding};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const NO_HEADERS: [(&str, &str); 0] = [];

const SWA_RESPONSE: &str = "\r\n\
--uuid:0ca0e16e-feb1-426c-97d8-c4508ada5e82\r\n\
Content-Type: text/xml; charset=UTF-8\r\n\
Content-Transfer-Encoding: 8bit\r\n\
Content-ID: <rootpart@soapui.org>\r\n\
\r\n\
<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\"><soapenv:Body><file href=\"cid:attachment.txt\"/></soapenv:Body></soapenv:Envelope>\r\n\
--uuid:0ca0e16e-feb1-426c-97d8-c4508ada5e82\r\n\
Content-Type: text/plain; charset=us-ascii\r\n\
Content-Transfer-Encoding: 7bit\r\n\
Content-ID: <attachment.txt>\r\n\
Content-Disposition: attachment; name=\"attachment.txt\"\r\n\
\r\n\
first line\r\n\
second line\r\n\
--uuid:0ca0e16e-feb1-426c-97d8-c4508ada5e82--\r\n";

const SWA_CONTENT_TYPE: &str = "multipart/related; type=\"text/xml\"; \
start=\"<rootpart@soapui.org>\"; boundary=\"uuid:0ca0e16e-feb1-426c-97d8-c4508ada5e82\"";

#[test]
fn test_swa_message_with_transport_headers() {
    init_tracing();
    let multipart = parser::parse(SWA_RESPONSE.as_bytes(), [("Content-Type", SWA_CONTENT_TYPE)]).unwrap();

    let main = multipart.main_part().unwrap();
    assert_eq!(main.content_id(), Some("rootpart@soapui.org"));
    assert!(main.content().starts_with(b"<soapenv:Envelope"));
    assert!(main.content().ends_with(b"</soapenv:Envelope>"));

    let attachments = multipart.attachments();
    assert_eq!(attachments.len(), 1);
    let attachment = attachments[0];
    assert_eq!(attachment.content(), b"first line\r\nsecond line");
    assert_eq!(attachment.content_type(), Some("text/plain"));
    assert_eq!(
        attachment.header("Content-Disposition", Some("name")),
        Some("attachment.txt")
    );
    assert_eq!(
        attachment.header("Content-Location", None),
        Some("attachment.txt")
    );
}

#[test]
fn test_scenario_plain_envelope() {
    let raw = b"<soap:Envelope><soap:Body/></soap:Envelope>";
    let multipart = parser::parse(raw, NO_HEADERS).unwrap();

    assert_eq!(multipart.len(), 1);
    assert_eq!(multipart.main_part().unwrap().content(), raw);
    assert!(multipart.attachments().is_empty());
}

#[test]
fn test_scenario_explicit_start_selects_later_part() {
    let raw = "--BB\r\n\
Content-ID: <A>\r\n\
\r\n\
attachment\r\n\
--BB\r\n\
Content-ID: <B>\r\n\
\r\n\
<Envelope/>\r\n\
--BB--";
    let content_type = "multipart/related; boundary=BB; start=\"<B>\"";

    let mut multipart = MultiPart::new();
    multipart.set_header("Content-Type", "BB", Some("boundary"));
    multipart.set_header("Content-Type", "<B>", Some("start"));
    let lines: Vec<&[u8]> = raw.as_bytes().split(|&b| b == b'\n').collect();
    let mut seen = Vec::new();
    let parsed = MimeScanner::new(&mut multipart, raw.as_bytes(), false, &mut seen)
        .scan(&lines)
        .unwrap();
    let verdicts: Vec<(String, bool)> = parsed
        .iter()
        .map(|p| (p.part.content_id().unwrap().to_string(), p.is_main))
        .collect();
    assert_eq!(
        verdicts,
        vec![("A".to_string(), false), ("B".to_string(), true)]
    );

    let multipart = parser::parse(raw.as_bytes(), [("Content-Type", content_type)]).unwrap();
    assert_eq!(multipart.main_part().unwrap().content(), b"<Envelope/>");
    assert_eq!(multipart.main_part_id(), Some("B"));
    assert_eq!(multipart.content_ids(), vec!["A", "B"]);
}

#[test]
fn test_scenario_declared_boundary_absent() {
    let raw = b"--XYZ\r\nContent-ID: <a>\r\n\r\nbody\r\n--XYZ--\r\n";
    let err = parser::parse(raw, [("Content-Type", "multipart/related; boundary=ZZZ")]).unwrap_err();

    match err {
        Error::MalformedMultipart { ref context, .. } => {
            assert_eq!(context.message(), raw);
            assert_eq!(context.message_len(), raw.len());
            assert!(!context.is_truncated());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_two_parts_matching_start_are_ambiguous() {
    let raw = "--B\nContent-ID: <same>\n\none\n--B\nContent-ID: <same>\n\ntwo\n--B--\n";
    let err = parser::parse(
        raw.as_bytes(),
        [("Content-Type", "multipart/related; boundary=B; start=\"<same>\"")],
    )
    .unwrap_err();

    assert!(matches!(err, Error::AmbiguousMainPart { count: 2, .. }));
    assert!(err.context().is_some());
}

#[test]
fn test_start_matching_no_part() {
    let raw = "--B\nContent-ID: <a>\n\none\n--B\nContent-ID: <b>\n\ntwo\n--B--\n";
    let err = parser::parse(
        raw.as_bytes(),
        [("Content-Type", "multipart/related; boundary=B; start=\"<missing>\"")],
    )
    .unwrap_err();

    match err {
        Error::NoMainPart {
            content_ids,
            context,
        } => {
            assert_eq!(content_ids, vec!["a", "b"]);
            assert!(context.is_some());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_undecodable_header_before_first_boundary() {
    let raw = "Content-Type: multipart/related; boundary=B\n\
X-Note: =?x-unknown?B?AAAA?=\n\
\n\
--B\n\
Content-ID: <a>\n\
\n\
one\n\
--B--\n";
    let err = parser::parse(raw.as_bytes(), NO_HEADERS).unwrap_err();

    match err {
        Error::UnresolvedHeaderEncoding {
            header,
            value,
            context,
            ..
        } => {
            assert_eq!(header, "X-Note");
            assert_eq!(value, "=?x-unknown?B?AAAA?=");
            assert_eq!(
                context.headers(),
                &["Content-Type: multipart/related; boundary=B"]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_binary_header_line_before_first_boundary() {
    let mut raw = b"X-Junk: ".to_vec();
    raw.extend_from_slice(&[0xff, 0xfe, 0x00]);
    raw.extend_from_slice(b"\n\n--B\nContent-ID: <a>\n\none\n--B--\n");

    let err = parser::parse(&raw, [("Content-Type", "multipart/related; boundary=B")]).unwrap_err();
    assert!(matches!(err, Error::UnresolvedHeaderEncoding { ref header, .. } if header == "X-Junk"));
    assert!(err.to_string().starts_with("Cannot parse headers before hitting the first boundary"));
}

#[test]
fn test_folded_and_encoded_headers() {
    let raw = "--B\r\n\
Content-Type: text/xml;\r\n \
charset=utf-8\r\n\
Content-Description: =?utf-8?B?UsOpc3Vtw6k=?= =?utf-8?Q?_final?=\r\n\
Content-ID: <env>\r\n\
\r\n\
<Envelope/>\r\n\
--B--";
    let multipart = parser::parse(raw.as_bytes(), [("Content-Type", "multipart/related; boundary=B")]).unwrap();
    let main = multipart.main_part().unwrap();

    assert_eq!(main.content_type(), Some("text/xml"));
    assert_eq!(main.charset(), Some("utf-8"));
    assert_eq!(main.header("Content-Description", None), Some("Résumé final"));
}

#[test]
fn test_mixed_line_endings() {
    let raw = "--B\n\
Content-ID: <env>\r\n\
Content-Type: text/xml\n\
\r\n\
<Envelope>\r\n\
\x20\x20<Body/>\n\
</Envelope>\r\n\
--B\n\
Content-ID: <att>\n\
\n\
data\n\
--B--";
    let multipart = parser::parse(raw.as_bytes(), [("Content-Type", "multipart/related; boundary=B")]).unwrap();

    assert_eq!(
        multipart.main_part().unwrap().content(),
        b"<Envelope>\r\n  <Body/>\n</Envelope>"
    );
    assert_eq!(multipart.part("att").unwrap().content(), b"data");
}

#[test]
fn test_encoded_bodies() {
    let raw = "--B\r\n\
Content-ID: <env>\r\n\
\r\n\
<Envelope/>\r\n\
--B\r\n\
Content-ID: <b64>\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
JVBERi0x\r\n\
LjQK\r\n\
--B\r\n\
Content-ID: <qp>\r\n\
Content-Type: text/plain; charset=ISO-8859-1\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
\r\n\
caf=E9 au lait, tr=\r\n\
=E8s bien\r\n\
--B--\r\n";
    let multipart = parser::parse(raw.as_bytes(), [("Content-Type", "multipart/related; boundary=B")]).unwrap();

    assert_eq!(multipart.part("b64").unwrap().content(), b"%PDF-1.4\n");
    assert_eq!(
        multipart.part("qp").unwrap().content(),
        "café au lait, très bien".as_bytes()
    );
}

#[test]
fn test_invalid_base64_body() {
    let raw = "--B\r\nContent-ID: <a>\r\nContent-Transfer-Encoding: base64\r\n\r\n!!!\r\n--B--";
    let err = parser::parse(raw.as_bytes(), [("Content-Type", "multipart/related; boundary=B")]).unwrap_err();
    assert!(matches!(err, Error::InvalidEncoding(ref message) if message.contains("<a>")));
}

#[test]
fn test_unsupported_body_charset() {
    let raw = "--B\r\nContent-ID: <a>\r\nContent-Type: text/plain; charset=x-klingon\r\n\r\nqapla\r\n--B--";
    let err = parser::parse(raw.as_bytes(), [("Content-Type", "multipart/related; boundary=B")]).unwrap_err();
    assert!(matches!(err, Error::UnsupportedCharset(ref charset) if charset == "x-klingon"));
}

#[test]
fn test_windows_1252_body_and_encoded_word() {
    init_tracing();
    let mut raw = b"--B\r\n\
Content-ID: <env>\r\n\
Content-Type: text/xml\r\n\
\r\n\
<Envelope/>\r\n\
--B\r\n\
Content-ID: <note>\r\n\
Content-Type: text/plain; charset=windows-1252\r\n\
Content-Description: =?windows-1252?Q?r=E9sum=E9?=\r\n\
\r\n".to_vec();
    // "café €5" in windows-1252
    raw.extend_from_slice(&[b'c', b'a', b'f', 0xE9, b' ', 0x80, b'5']);
    raw.extend_from_slice(b"\r\n--B--\r\n");

    let multipart = parser::parse(&raw, [("Content-Type", "multipart/related; boundary=B")]).unwrap();
    let note = multipart.part("note").unwrap();

    assert_eq!(note.content(), "café €5".as_bytes());
    assert_eq!(note.header("Content-Description", None), Some("résumé"));
}

#[test]
fn test_utf16_main_part() {
    let mut raw = b"--B\r\n\
Content-ID: <env>\r\n\
Content-Type: text/xml; charset=UTF-16\r\n\
\r\n".to_vec();
    // byte order mark, then "<é/>" in UTF-16LE
    raw.extend_from_slice(&[0xFF, 0xFE, 0x3C, 0x00, 0xE9, 0x00, 0x2F, 0x00, 0x3E, 0x00]);
    raw.extend_from_slice(b"\r\n--B--\r\n");

    let multipart = parser::parse(&raw, [("Content-Type", "multipart/related; boundary=B")]).unwrap();
    assert_eq!(multipart.main_part().unwrap().content(), "<é/>".as_bytes());
}

#[test]
fn test_echoed_http_status_line() {
    let raw = "HTTP/1.1 200 OK\r\n\
Content-Type: multipart/related; boundary=B; start=\"<env>\"\r\n\
\r\n\
--B\r\n\
Content-ID: <env>\r\n\
\r\n\
<Envelope/>\r\n\
--B--\r\n";
    let multipart = parser::parse(raw.as_bytes(), NO_HEADERS).unwrap();
    assert_eq!(multipart.main_part().unwrap().content(), b"<Envelope/>");
    assert_eq!(multipart.boundary(), Some("B"));
}

#[test]
fn test_serialize_then_parse_keeps_parts() {
    init_tracing();
    let mut multipart = MultiPart::with_boundary(MultiPart::generate_boundary());
    multipart.add_part(
        Part::new("<Envelope/>")
            .with_content_type("text/xml")
            .with_transfer_encoding(TransferEncoding::EightBit)
            .with_content_id("env"),
        true,
    );
    multipart.add_part(
        Part::new(vec![0_u8, 255, b'\r', b'\n', b'-', b'-'])
            .with_transfer_encoding(TransferEncoding::Base64)
            .with_content_id("bin"),
        false,
    );
    multipart.add_part(
        Part::new("line one\r\nline two=\r\n")
            .with_content_type("text/plain")
            .with_transfer_encoding(TransferEncoding::QuotedPrintable)
            .with_content_id("text"),
        false,
    );

    let body = parser::serialize(&multipart, false).unwrap();
    let transport: Vec<(String, String)> = multipart
        .headers_for_http()
        .into_iter()
        .filter_map(|line| {
            line.split_once(": ")
                .map(|(name, value)| (name.to_string(), value.to_string()))
        })
        .collect();
    let parsed = parser::parse(&body, transport).unwrap();

    assert_eq!(parsed.content_ids(), vec!["env", "bin", "text"]);
    assert_eq!(parsed.main_part_id(), Some("env"));
    for original in multipart.parts() {
        let id = original.content_id().unwrap();
        assert_eq!(parsed.part(id).unwrap().content(), original.content(), "part {id}");
    }
}
