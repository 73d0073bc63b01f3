//! Property tests for the transfer codecs and the serialize/parse cycle.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use soapmime::encoding::{
    decode_base64, decode_quoted_printable, encode_base64_wrapped, encode_quoted_printable,
};
use soapmime::{HeaderBearer, MultiPart, Part, TransferEncoding, parser};

fn transfer_encoding() -> impl Strategy<Value = TransferEncoding> {
    prop::sample::select(vec![
        TransferEncoding::Binary,
        TransferEncoding::EightBit,
        TransferEncoding::Base64,
        TransferEncoding::QuotedPrintable,
    ])
}

fn bytes_with_line_breaks() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            any::<u8>(),
            Just(b'\r'),
            Just(b'\n'),
            Just(b'='),
            Just(b' '),
        ],
        0..600,
    )
}

proptest! {
    /// Base64 decoding restores the original bytes.
    #[test]
    fn base64_decode_restores_input(data in bytes_with_line_breaks()) {
        let encoded = encode_base64_wrapped(&data);
        prop_assert!(encoded.split("\r\n").all(|line| line.len() <= 76));
        prop_assert_eq!(decode_base64(&encoded).unwrap(), data);
    }

    /// Quoted-printable decoding restores the original bytes.
    #[test]
    fn quoted_printable_decode_restores_input(data in bytes_with_line_breaks()) {
        let encoded = encode_quoted_printable(&data);
        prop_assert!(encoded.split("\r\n").all(|line| line.len() <= 76));
        prop_assert_eq!(decode_quoted_printable(encoded.as_bytes()), data);
    }

    /// Every transfer encoding decodes what it encoded.
    #[test]
    fn transfer_encoding_is_reversible(
        data in bytes_with_line_breaks(),
        encoding in transfer_encoding(),
    ) {
        let decoded = encoding.decode(&encoding.encode(&data)).unwrap();
        prop_assert_eq!(decoded, data);
    }

    /// Parsing a serialized message yields the same parts, contents and
    /// main part.
    #[test]
    fn serialize_parse_roundtrip(
        envelope in "<Envelope>[a-zA-Z0-9 <>/=\"]{0,200}</Envelope>",
        attachments in prop::collection::vec(
            (bytes_with_line_breaks(), transfer_encoding()),
            0..4,
        ),
        main_encoding in transfer_encoding(),
        with_headers in any::<bool>(),
    ) {
        let mut multipart = MultiPart::with_boundary(MultiPart::generate_boundary());
        multipart.add_part(
            Part::new(envelope.clone())
                .with_content_type("text/xml")
                .with_transfer_encoding(main_encoding),
            true,
        );
        for (content, encoding) in attachments {
            multipart.add_part(Part::new(content).with_transfer_encoding(encoding), false);
        }

        let raw = parser::serialize(&multipart, with_headers).unwrap();
        let parsed = if with_headers {
            parser::parse(&raw, Vec::<(String, String)>::new()).unwrap()
        } else {
            let http = multipart.headers_for_http().remove(0);
            let value = http.trim_start_matches("Content-Type: ").to_string();
            parser::parse(&raw, [("Content-Type", value)]).unwrap()
        };

        prop_assert_eq!(parsed.content_ids(), multipart.content_ids());
        prop_assert_eq!(parsed.main_part_id(), multipart.main_part_id());
        prop_assert_eq!(parsed.main_part().unwrap().content(), envelope.as_bytes());
        for original in multipart.parts() {
            let id = original.content_id().unwrap();
            prop_assert_eq!(parsed.part(id).unwrap().content(), original.content());
        }
    }
}
