use crate::error::WireError;

/// Magic prefix: ASCII "FCS". The three bytes that follow carry the
/// version number ("2.0", "3.0", "3.1").
pub const FCS_MAGIC: [u8; 3] = *b"FCS";

/// Size of the fixed header block. Only the first 58 bytes carry fields;
/// the rest is padding, but a streaming reader waits for the full block.
pub const HEADER_SIZE: usize = 256;

/// End of the last offset field. [`FcsHeader::read_from`] needs at least
/// this many bytes.
pub const HEADER_FIELDS_END: usize = 58;

/// Byte range of the version tag.
const VERSION_RANGE: (usize, usize) = (0, 6);

/// A header offset field: name, byte range, and whether a blank value is
/// allowed (and read as 0).
struct OffsetField {
    name: &'static str,
    start: usize,
    end: usize,
    blank_is_zero: bool,
}

const fn field(name: &'static str, start: usize, blank_is_zero: bool) -> OffsetField {
    OffsetField {
        name,
        start,
        end: start + 8,
        blank_is_zero,
    }
}

const BEGIN_TEXT: OffsetField = field("beginText", 10, false);
const END_TEXT: OffsetField = field("endText", 18, false);
const BEGIN_DATA: OffsetField = field("beginData", 26, true);
const END_DATA: OffsetField = field("endData", 34, true);
const BEGIN_ANALYSIS: OffsetField = field("beginAnalysis", 42, true);
const END_ANALYSIS: OffsetField = field("endAnalysis", 50, true);

/// FCS file header, the fixed-layout prefix of every FCS file.
///
/// ```text
/// ┌──────────┬─────────┬──────────────────────────────────────────┐
/// │ Bytes    │ Size    │ Description                              │
/// ├──────────┼─────────┼──────────────────────────────────────────┤
/// │ 0..6     │ 6 bytes │ Version tag: "FCS3.0", "FCS2.0", ...     │
/// │ 6..10    │ 4 bytes │ Spaces                                   │
/// │ 10..18   │ 8 bytes │ Begin TEXT   (ASCII decimal, padded)     │
/// │ 18..26   │ 8 bytes │ End TEXT                                 │
/// │ 26..34   │ 8 bytes │ Begin DATA   (0 = see $BEGINDATA)        │
/// │ 34..42   │ 8 bytes │ End DATA     (0 = see $ENDDATA)          │
/// │ 42..50   │ 8 bytes │ Begin ANALYSIS (0 = none / see TEXT)     │
/// │ 50..58   │ 8 bytes │ End ANALYSIS                             │
/// └──────────┴─────────┴──────────────────────────────────────────┘
/// ```
///
/// End offsets are used as exclusive slice bounds by the segment readers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FcsHeader {
    /// The six-byte version tag, e.g. `FCS3.0`.
    pub version: String,
    pub begin_text: usize,
    pub end_text: usize,
    pub begin_data: usize,
    pub end_data: usize,
    pub begin_analysis: usize,
    pub end_analysis: usize,
}

impl FcsHeader {
    /// Parse a header from the start of `buf`.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if `buf` is shorter than
    ///   [`HEADER_FIELDS_END`].
    /// - [`WireError::InvalidMagic`] if the file does not start with `FCS`.
    /// - [`WireError::InvalidOffset`] if an offset field is not a decimal
    ///   integer, or a TEXT offset is blank.
    /// - [`WireError::InvertedSegment`] if begin TEXT lies past end TEXT.
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        // Magic first: a short buffer that isn't an FCS file at all should
        // say so rather than report a truncation.
        if !buf.starts_with(&FCS_MAGIC) {
            let prefix = &buf[..buf.len().min(FCS_MAGIC.len())];
            if prefix.len() == FCS_MAGIC.len() || !FCS_MAGIC.starts_with(prefix) {
                return Err(WireError::InvalidMagic {
                    found: String::from_utf8_lossy(prefix).into_owned(),
                });
            }
        }

        if buf.len() < HEADER_FIELDS_END {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        let version = String::from_utf8_lossy(&buf[VERSION_RANGE.0..VERSION_RANGE.1])
            .trim_end()
            .to_owned();

        let header = Self {
            version,
            begin_text: read_offset(buf, &BEGIN_TEXT)?,
            end_text: read_offset(buf, &END_TEXT)?,
            begin_data: read_offset(buf, &BEGIN_DATA)?,
            end_data: read_offset(buf, &END_DATA)?,
            begin_analysis: read_offset(buf, &BEGIN_ANALYSIS)?,
            end_analysis: read_offset(buf, &END_ANALYSIS)?,
        };

        if header.begin_text > header.end_text {
            return Err(WireError::InvertedSegment {
                segment: "TEXT",
                begin: header.begin_text,
                end: header.end_text,
            });
        }

        Ok(header)
    }

    /// Whether the file declares an ANALYSIS segment.
    #[must_use]
    pub fn has_analysis(&self) -> bool {
        self.begin_analysis > 0
    }

    /// Whether the ANALYSIS segment sits in front of the DATA segment.
    #[must_use]
    pub fn analysis_before_data(&self) -> bool {
        self.has_analysis() && self.begin_analysis < self.begin_data
    }
}

/// Read one 8-byte ASCII offset field. Spaces and NUL padding on either
/// side are ignored.
fn read_offset(buf: &[u8], field: &OffsetField) -> Result<usize, WireError> {
    let raw = &buf[field.start..field.end];
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');

    if trimmed.is_empty() && field.blank_is_zero {
        return Ok(0);
    }

    trimmed.parse::<usize>().map_err(|_| WireError::InvalidOffset {
        field: field.name,
        start: field.start,
        end: field.end,
        raw: text.into_owned(),
    })
}
