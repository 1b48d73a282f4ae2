#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: FcsHeader::read_from with arbitrary bytes.
//
// Catches bugs in:
// - Magic byte validation on short inputs
// - Offset field trimming and parsing
// - TEXT bound checks
fuzz_target!(|data: &[u8]| {
    if let Ok(header) = fcs_wire::FcsHeader::read_from(data) {
        assert!(header.begin_text <= header.end_text);
    }
});
