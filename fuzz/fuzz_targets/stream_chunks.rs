#![no_main]

use arbitrary::Arbitrary;
use fcs_decoder::{DecodeOptions, FcsDecoder, Progress, StreamingDecoder};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    file: Vec<u8>,
    chunk_sizes: Vec<u16>,
    by_param: bool,
}

// Fuzz target: streaming decode with arbitrary chunk boundaries.
//
// Whenever the buffered decoder succeeds on a file of at least one full
// header, the streaming decoder must produce the identical Document.
fuzz_target!(|input: FuzzInput| {
    let options = if input.by_param {
        DecodeOptions::from_pairs([("groupBy", "byParam")]).unwrap()
    } else {
        DecodeOptions::default()
    };

    let mut decoder = StreamingDecoder::new(options.clone());
    let mut rest = &input.file[..];
    let mut sizes = input.chunk_sizes.iter().cycle();
    while !rest.is_empty() {
        let size = sizes.next().map_or(rest.len(), |&s| usize::from(s).clamp(1, rest.len()));
        let (chunk, tail) = rest.split_at(size);
        rest = tail;
        if !matches!(decoder.feed(chunk), Progress::NeedMore { .. }) {
            break;
        }
    }
    let streamed = decoder.finish().ok();

    if input.file.len() >= fcs_wire::HEADER_SIZE {
        if let Ok(expected) = FcsDecoder::decode_with(&input.file, &options) {
            // Debug output, so that NaN values from arbitrary DATA compare equal.
            assert_eq!(format!("{streamed:?}"), format!("{:?}", Some(expected)));
        }
    }
});
