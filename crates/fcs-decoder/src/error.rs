use fcs_types::TypeError;
use fcs_wire::WireError;

use crate::document::Document;

/// Errors that can occur while decoding an FCS file.
///
/// Every variant is fatal to the decode attempt. There is no local retry;
/// callers that want to try again (with different options, say) start a
/// new decode.
///
/// ```text
///   DecodeError
///   ├── InvalidFormat(WireError)  ← bad magic, bad header field, inverted segment
///   ├── SegmentOutOfBounds        ← segment lies past the end of the buffer
///   ├── InvalidOption             ← option value could not be parsed
///   ├── StreamClosedEarly         ← source closed before decoding finished
///   ├── StreamEndedEarly          ← source ran dry before decoding finished
///   ├── Type(TypeError)           ← byte order, data type, segment, keywords
///   ├── Wire(WireError)           ← element read past the end of the buffer
///   └── Io(std::io::Error)        ← from the byte source (async adapter)
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The file is not a readable FCS file.
    ///
    /// Wraps the [`WireError`] from `FcsHeader::read_from`, or an
    /// [`WireError::InvertedSegment`] raised for TEXT-declared offsets.
    #[error("invalid format: {0}")]
    InvalidFormat(WireError),

    /// A segment extends past the bytes that were supplied.
    #[error("{segment} segment {begin}..{end} lies beyond the {available} bytes available")]
    SegmentOutOfBounds {
        segment: &'static str,
        begin: usize,
        end: usize,
        available: usize,
    },

    /// A recognized option key carried a value that could not be parsed.
    #[error("invalid value {value:?} for option {key}")]
    InvalidOption { key: String, value: String },

    /// The byte source was closed before the decoder reached `done`.
    #[error("stream closed early in state {state}: {buffered} of {needed} bytes received")]
    StreamClosedEarly {
        state: &'static str,
        buffered: usize,
        needed: usize,
    },

    /// The byte source signalled end of data before the decoder reached
    /// `done`.
    #[error("stream ended early in state {state}: {buffered} of {needed} bytes received")]
    StreamEndedEarly {
        state: &'static str,
        buffered: usize,
        needed: usize,
    },

    /// Keyword or segment interpretation failed. Covers
    /// `UnsupportedByteOrder`, `UnsupportedDataType` and `MalformedSegment`.
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Wire(#[from] WireError),

    /// An I/O error from the byte source, passed through untouched.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A failed streaming decode, with whatever was decoded before the
/// failure.
///
/// The partial document is useful for diagnostics: a file whose DATA
/// segment is truncated still has a readable header and TEXT segment.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct StreamFailure {
    #[source]
    pub error: DecodeError,
    pub partial: Box<Document>,
}
