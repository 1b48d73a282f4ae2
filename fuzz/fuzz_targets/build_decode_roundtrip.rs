#![no_main]

use arbitrary::Arbitrary;
use fcs_decoder::{DecodeOptions, FcsDecoder};
use fcs_fixtures::{AnalysisPlacement, FcsBuilder, Layout};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    names: Vec<String>,
    events: Vec<Vec<u16>>,
    layout_id: u8,
    little_endian: bool,
    delimiter: u8,
    keywords: Vec<(String, String)>,
    analysis: Option<Vec<(String, String)>>,
    analysis_first: bool,
    offsets_in_text_only: bool,
}

const DELIMITERS: [u8; 6] = [b'|', b'/', b'\\', b'!', b'*', 0x0c];

fn layout_from_id(id: u8) -> Layout {
    match id % 4 {
        0 => Layout::Float32,
        1 => Layout::Float64,
        2 => Layout::Int16,
        _ => Layout::Int32,
    }
}

/// Keys and values the builder can write unambiguously: non-empty and not
/// starting or ending with the delimiter.
fn writable(text: &str, delim: char) -> bool {
    !text.is_empty() && !text.starts_with(delim) && !text.ends_with(delim)
}

// Fuzz target: build a file with FcsBuilder, decode it, compare values.
//
// Integer inputs keep every layout lossless, so the decoded numbers must
// match exactly.
fuzz_target!(|input: FuzzInput| {
    let delimiter = DELIMITERS[usize::from(input.delimiter) % DELIMITERS.len()];
    let delim = char::from(delimiter);

    let names: Vec<&str> = input
        .names
        .iter()
        .map(String::as_str)
        .filter(|n| writable(n, delim) && n.trim() == *n)
        .take(16)
        .collect();
    if names.is_empty() {
        return;
    }
    let events: Vec<Vec<f64>> = input
        .events
        .iter()
        .take(256)
        .map(|row| (0..names.len()).map(|p| f64::from(row.get(p).copied().unwrap_or(0))).collect())
        .collect();

    let mut builder = FcsBuilder::new(&names);
    builder.layout(layout_from_id(input.layout_id)).delimiter(delimiter).events(events.clone());
    if input.little_endian {
        builder.little_endian();
    }
    for (key, value) in &input.keywords {
        if writable(key, delim) && key.trim() == key && !key.starts_with('$') && writable(value, delim) {
            builder.keyword(key, value);
        }
    }
    if let Some(pairs) = &input.analysis {
        let pairs: Vec<(&str, &str)> = pairs
            .iter()
            .filter(|(k, v)| writable(k, delim) && k.trim() == k && writable(v, delim))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if !pairs.is_empty() {
            builder.analysis_keywords(&pairs);
            if input.analysis_first {
                builder.analysis_placement(AnalysisPlacement::BeforeData);
            }
        }
    }
    if input.offsets_in_text_only {
        builder.offsets_in_text_only();
    }

    let file = builder.build();
    let options = DecodeOptions::from_pairs([("dataFormat", "asNumber"), ("eventsToRead", "0")]).unwrap();
    let doc = FcsDecoder::decode_with(&file, &options).unwrap();

    assert_eq!(doc.event_count(), events.len());
    for (e, row) in events.iter().enumerate() {
        assert_eq!(doc.numeric_row(e + 1), Some(&row[..]));
    }
    assert_eq!(doc.parameter_keywords("N").len(), names.len());
});
