#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: FcsDecoder::decode_with on arbitrary bytes.
//
// The first byte picks the options so that both groupings and all data
// formats are reached.
//
// Catches bugs in:
// - Segment slicing against hostile offsets
// - Plan arithmetic ($PAR, $TOT, skip stride) overflowing
// - DATA bounds checks
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let selector = data[0];
    let file = &data[1..];

    let group_by = if selector & 1 == 0 { "byEvent" } else { "byParam" };
    let data_format = ["asString", "asNumber", "asBoth", "asNone"][usize::from(selector >> 1) % 4];
    let skip = ["", "3", "spread"][usize::from(selector >> 3) % 3];
    let events = if selector & 0x40 == 0 { "1000" } else { "0" };

    let options = fcs_decoder::DecodeOptions::from_pairs([
        ("groupBy", group_by),
        ("dataFormat", data_format),
        ("skip", skip),
        ("eventsToRead", events),
    ])
    .unwrap();

    let _ = fcs_decoder::FcsDecoder::decode_with(file, &options);
});
