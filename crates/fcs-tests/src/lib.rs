//! Shared helpers for the FCS integration tests and benches.

use fcs_decoder::{DecodeOptions, Document, Progress, StreamFailure, StreamingDecoder};
use fcs_fixtures::FcsBuilder;

/// Parameter names of the eight-channel sorter layout used by
/// [`aria_like`].
pub const ARIA_NAMES: [&str; 8] = [
    "FSC-A", "FSC-H", "FSC-W", "SSC-A", "SSC-H", "SSC-W", "FITC-A", "PE-A",
];

/// First event of [`aria_like`] files.
pub const ARIA_FIRST_EVENT: [f64; 8] = [
    33_471.21, 33_250.0, 64_508.82, 1_234.5, 1_100.0, 70_012.0, 250.25, 310.75,
];

/// Deterministic event rows. Every value is a multiple of 0.25 below 4096,
/// so it survives the `F` and `D` layouts exactly.
#[must_use]
pub fn synthetic_events(events: usize, parameters: usize) -> Vec<Vec<f64>> {
    (0..events)
        .map(|e| {
            (0..parameters)
                .map(|p| {
                    let base = (e * 37 + p * 101) % 4096;
                    f64::from(u16::try_from(base).unwrap_or(0)) + 0.25 * (p % 4) as f64
                })
                .collect()
        })
        .collect()
}

/// A builder for an eight-parameter, big-endian `F` file whose first event
/// is [`ARIA_FIRST_EVENT`], followed by synthetic events.
#[must_use]
pub fn aria_like(events: usize) -> FcsBuilder {
    let mut rows = vec![ARIA_FIRST_EVENT.to_vec()];
    rows.extend(synthetic_events(events.saturating_sub(1), ARIA_NAMES.len()));

    let mut builder = FcsBuilder::new(&ARIA_NAMES);
    builder
        .events(rows)
        .keyword("$CYT", "FACSAriaII")
        .keyword("$SRC", "Compens|ation Controls")
        .keyword("$FIL", "AriaFile1.fcs");
    builder
}

/// Feed `file` to a [`StreamingDecoder`] in `chunk_size` pieces, stopping
/// early once the decoder is done or has failed.
///
/// # Errors
///
/// The [`StreamFailure`] reported by the decoder.
pub fn decode_in_chunks(
    file: &[u8],
    chunk_size: usize,
    options: DecodeOptions,
) -> Result<Document, StreamFailure> {
    let mut decoder = StreamingDecoder::new(options);
    for chunk in file.chunks(chunk_size.max(1)) {
        if !matches!(decoder.feed(chunk), Progress::NeedMore { .. }) {
            break;
        }
    }
    decoder.finish()
}
