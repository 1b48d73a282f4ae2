/// Errors raised while reading the fixed-layout parts of an FCS file.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete header or element could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// The first three bytes were not "FCS".
    #[error("invalid magic: expected \"FCS\", got {found:?}")]
    InvalidMagic { found: String },

    /// A header offset field held something other than a decimal integer.
    #[error("header field {field} at bytes {start}..{end} is not a number: {raw:?}")]
    InvalidOffset {
        field: &'static str,
        start: usize,
        end: usize,
        raw: String,
    },

    /// A segment's begin offset lies past its end offset.
    #[error("{segment} segment bounds are inverted: begin {begin} > end {end}")]
    InvertedSegment {
        segment: &'static str,
        begin: usize,
        end: usize,
    },
}

// InvalidOffset keeps the raw field text. Writers pad these fields with
// spaces, NULs or leading zeros.
