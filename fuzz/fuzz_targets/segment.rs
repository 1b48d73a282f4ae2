#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: Segment::parse on arbitrary text.
//
// Catches bugs in:
// - Escaped delimiter recovery (runs of empty tokens)
// - Multi-byte delimiters
// - Dangling keys and trailing padding
fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    if let Ok(segment) = fcs_types::Segment::parse(&text) {
        if let Some(map) = segment.keywords() {
            assert!(map.keys().all(|k| k.trim() == k));
        }
    }
});
