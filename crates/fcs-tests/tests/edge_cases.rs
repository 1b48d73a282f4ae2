//! Edge case integration tests for the FCS decoder.
//!
//! - **Header**: bad magic, blank and non-numeric offset fields, inverted
//!   TEXT bounds.
//! - **Segments**: escaped delimiters, other delimiter characters, XML
//!   ANALYSIS payloads, character encodings.
//! - **Layouts**: unsupported `$BYTEORD` / `$DATATYPE`, histogram mode.
//! - **Truncation**: buffered and streaming decodes of cut-off files, and
//!   the partial document a streaming failure carries.

use fcs_decoder::{DecodeError, DecodeOptions, FcsDecoder, StreamingDecoder};
use fcs_fixtures::OFFSET_FIELDS;
use fcs_tests::{ARIA_NAMES, aria_like, decode_in_chunks};
use fcs_types::{Segment, TypeError};
use fcs_wire::WireError;

/// Overwrite header offset field `index` with `value`, right-aligned.
fn patch_field(file: &mut [u8], index: usize, value: &str) {
    let (start, end) = OFFSET_FIELDS[index];
    file[start..end].copy_from_slice(format!("{value:>8}").as_bytes());
}

// ── Header ────────────────────────────────────────────────────────────────────

#[test]
fn bad_magic_is_invalid_format() {
    let mut file = aria_like(1).build();
    file[..3].copy_from_slice(b"GIF");

    let err = FcsDecoder::decode(&file).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidFormat(WireError::InvalidMagic { .. })));

    let failure = decode_in_chunks(&file, 17, DecodeOptions::default()).unwrap_err();
    assert!(matches!(failure.error, DecodeError::InvalidFormat(_)));
}

#[test]
fn non_numeric_offset_is_invalid_format() {
    let mut file = aria_like(1).build();
    patch_field(&mut file, 2, "12ab");
    let err = FcsDecoder::decode(&file).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InvalidFormat(WireError::InvalidOffset { start: 26, end: 34, .. })
    ));
}

#[test]
fn blank_text_offset_is_invalid_format() {
    let mut file = aria_like(1).build();
    patch_field(&mut file, 1, "");
    assert!(matches!(
        FcsDecoder::decode(&file),
        Err(DecodeError::InvalidFormat(WireError::InvalidOffset { .. }))
    ));
}

#[test]
fn blank_data_offsets_fall_back_to_text() {
    let file = aria_like(5).build();
    let expected = FcsDecoder::decode(&file).unwrap();

    let mut blanked = file.clone();
    for index in 2..6 {
        patch_field(&mut blanked, index, "");
    }
    let doc = FcsDecoder::decode(&blanked).unwrap();
    assert_eq!(doc.header, expected.header);
    assert_eq!(doc.data, expected.data);
}

#[test]
fn inverted_text_bounds() {
    let mut file = aria_like(1).build();
    patch_field(&mut file, 0, "900");
    patch_field(&mut file, 1, "300");
    assert!(matches!(
        FcsDecoder::decode(&file),
        Err(DecodeError::InvalidFormat(WireError::InvertedSegment { segment: "TEXT", .. }))
    ));
}

#[test]
fn other_version_tags_are_accepted() {
    let mut builder = aria_like(2);
    builder.version("FCS3.1");
    let doc = FcsDecoder::decode(&builder.build()).unwrap();
    assert_eq!(doc.header.version, "FCS3.1");
}

// ── Segments ──────────────────────────────────────────────────────────────────

#[test]
fn escaped_delimiters_survive_any_delimiter() {
    for delimiter in [b'|', b'/', b'\\', 0x0c] {
        let mut builder = aria_like(2);
        let delim = char::from(delimiter);
        let value = format!("a{delim}b{delim}{delim}c");
        builder.delimiter(delimiter).keyword("$COM", &value);

        let doc = FcsDecoder::decode(&builder.build()).unwrap();
        assert_eq!(doc.text_value(&["$COM"]), Some(value.as_str()), "{delimiter:#x}");
        assert_eq!(doc.text_value(&["$PAR"]), Some("8"));
    }
}

#[test]
fn xml_analysis_is_stored_verbatim() {
    let xml = "<?xml version=\"1.0\"?><gating-ML><gate name=\"P1|P2\"/></gating-ML>";
    let mut builder = aria_like(3);
    builder.analysis_raw(xml);

    let doc = FcsDecoder::decode(&builder.build()).unwrap();
    let analysis = doc.analysis.as_ref().unwrap();
    assert_eq!(analysis.as_xml(), Some(xml));
    assert_eq!(doc.analysis_value(&["gate"]), None);
    assert_eq!(doc.event_count(), 3);
}

#[test]
fn latin1_and_utf8_encodings() {
    let mut builder = aria_like(1);
    builder.keyword("$P1S", "CD3 µ");
    let file = builder.build();

    let utf8 = FcsDecoder::decode(&file).unwrap();
    assert_eq!(utf8.text_value(&["$P1S"]), Some("CD3 µ"));

    let options = DecodeOptions::from_pairs([("encoding", "latin1")]).unwrap();
    let latin1 = FcsDecoder::decode_with(&file, &options).unwrap();
    assert_eq!(latin1.text_value(&["$P1S"]), Some("CD3 \u{c2}\u{b5}"));
}

#[test]
fn dangling_keyword_is_malformed() {
    assert!(matches!(
        Segment::parse("|$TOT|5|$PAR|"),
        Err(TypeError::MalformedSegment { .. })
    ));
}

// ── Layouts ───────────────────────────────────────────────────────────────────

#[test]
fn unsupported_byte_order() {
    let mut builder = aria_like(2);
    builder.keyword("$BYTEORD", "3,4,1,2");
    let err = FcsDecoder::decode(&builder.build()).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Type(TypeError::UnsupportedByteOrder { ref value }) if value == "3,4,1,2"
    ));
}

#[test]
fn unsupported_data_type() {
    let mut builder = aria_like(2);
    builder.keyword("$DATATYPE", "A");
    let file = builder.build();
    assert!(matches!(
        FcsDecoder::decode(&file),
        Err(DecodeError::Type(TypeError::UnsupportedDataType { .. }))
    ));

    // Without DATA decoding the layout is never looked at.
    let options = DecodeOptions::from_pairs([("dataFormat", "asNone")]).unwrap();
    assert!(FcsDecoder::decode_with(&file, &options).is_ok());
}

#[test]
fn missing_parameter_count() {
    let mut builder = aria_like(2);
    builder.keyword("$PAR", "eight");
    assert!(matches!(
        FcsDecoder::decode(&builder.build()),
        Err(DecodeError::Type(TypeError::InvalidKeyword { .. }))
    ));
}

#[test]
fn oversized_parameter_count_is_rejected() {
    let mut builder = aria_like(0);
    builder
        .keyword("$PAR", "2305843009213693952")
        .keyword("$TOT", "0");
    let file = builder.build();

    for group_by in ["byEvent", "byParam"] {
        let options = DecodeOptions::from_pairs([("groupBy", group_by)]).unwrap();
        let err = FcsDecoder::decode_with(&file, &options).unwrap_err();
        assert!(
            matches!(
                err,
                DecodeError::Type(TypeError::InvalidKeyword { ref keyword, .. }) if keyword == "$PAR"
            ),
            "{group_by}: {err}"
        );

        let failure = decode_in_chunks(&file, 17, options).unwrap_err();
        assert!(matches!(
            failure.error,
            DecodeError::Type(TypeError::InvalidKeyword { .. })
        ));
    }

    // Without DATA decoding only the accessors look at $PAR.
    let options = DecodeOptions::from_pairs([("dataFormat", "asNone")]).unwrap();
    let doc = FcsDecoder::decode_with(&file, &options).unwrap();
    let names = doc.parameter_keywords("N");
    assert_eq!(names.len(), doc.text.len());
    assert_eq!(names[..ARIA_NAMES.len()], ARIA_NAMES.map(Some));
}

#[test]
fn histogram_mode_has_no_data() {
    let mut builder = aria_like(2);
    builder.keyword("$MODE", "H");
    let doc = FcsDecoder::decode(&builder.build()).unwrap();
    assert!(doc.data.is_none());
    assert_eq!(doc.text_value(&["$MODE"]), Some("H"));
}

// ── Truncation ────────────────────────────────────────────────────────────────

#[test]
fn truncated_data_buffered() {
    let file = aria_like(10).build();
    let err = FcsDecoder::decode(&file[..file.len() - 3]).unwrap_err();
    assert!(matches!(err, DecodeError::SegmentOutOfBounds { segment: "DATA", .. }));

    // Reading fewer events only needs a prefix of DATA.
    let options = DecodeOptions::from_pairs([("eventsToRead", "9")]).unwrap();
    let doc = FcsDecoder::decode_with(&file[..file.len() - 3], &options).unwrap();
    assert_eq!(doc.event_count(), 9);
}

#[test]
fn truncated_stream_reports_partial_document() {
    let file = aria_like(10).build();
    let failure = decode_in_chunks(&file[..file.len() - 3], 17, DecodeOptions::default()).unwrap_err();

    assert!(matches!(
        failure.error,
        DecodeError::StreamEndedEarly { state: "data", .. }
    ));
    assert_eq!(failure.partial.text_value(&["$CYT"]), Some("FACSAriaII"));
    assert!(failure.partial.plan.is_some());
    assert!(failure.partial.data.is_none());
    assert!(failure.to_string().contains("stream ended early"));
}

#[test]
fn closed_stream() {
    let file = aria_like(10).build();
    let mut decoder = StreamingDecoder::new(DecodeOptions::default());
    decoder.feed(&file[..300]);
    assert_eq!(decoder.state(), "text");

    let failure = decoder.close().unwrap_err();
    assert!(matches!(
        failure.error,
        DecodeError::StreamClosedEarly { state: "text", buffered: 300, .. }
    ));
    assert_eq!(failure.partial.header.begin_text, 256);
}

#[test]
fn empty_input() {
    assert!(matches!(
        FcsDecoder::decode(&[]),
        Err(DecodeError::InvalidFormat(WireError::UnexpectedEof { offset: 0 }))
    ));
    let failure = decode_in_chunks(&[], 1, DecodeOptions::default()).unwrap_err();
    assert!(matches!(
        failure.error,
        DecodeError::StreamEndedEarly { state: "header", buffered: 0, .. }
    ));
}
