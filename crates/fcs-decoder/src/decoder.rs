use fcs_types::keywords::{BEGINANALYSIS, BEGINDATA, ENDANALYSIS, ENDDATA, MODE, MODE_HISTOGRAM};
use fcs_types::{DataFormat, Segment};
use fcs_wire::{FcsHeader, WireError};
use tracing::debug;

use crate::config::DecodeOptions;
use crate::document::Document;
use crate::error::DecodeError;
use crate::matrix_reader;
use crate::plan::DecodePlan;

/// Synchronous FCS decoder for a file that is already in memory.
///
/// Decoding proceeds in four steps, the same ones the
/// [`StreamingDecoder`](crate::StreamingDecoder) runs as bytes arrive:
///
///   1. **Header**: validate the `FCS` magic and read the six offsets.
///   2. **TEXT**: tokenize the keyword segment, then fill in data and
///      analysis offsets the header left at 0 from `$BEGINDATA`,
///      `$ENDDATA`, `$BEGINANALYSIS` and `$ENDANALYSIS`.
///   3. **ANALYSIS**: tokenize it (or keep it as XML) when
///      `beginAnalysis > 0`.
///   4. **DATA**: derive a [`DecodePlan`] and read the matrix, unless the
///      data format is `asNone` or `$MODE` is `H`.
///
/// The input buffer is only borrowed; the returned [`Document`] owns
/// everything it holds.
///
/// # Example
///
/// ```rust
/// use fcs_decoder::{DecodeOptions, FcsDecoder};
/// use fcs_fixtures::FcsBuilder;
///
/// let file = FcsBuilder::new(&["FSC-A", "SSC-A"])
///     .events(vec![vec![1.5, 2.5], vec![3.5, 4.5]])
///     .build();
///
/// let doc = FcsDecoder::decode(&file).unwrap();
/// assert_eq!(doc.string_row(2), Some("[3.50,4.50]"));
/// ```
pub struct FcsDecoder;

impl FcsDecoder {
    /// Decode a complete file with the default options.
    ///
    /// # Errors
    ///
    /// See [`decode_with`](Self::decode_with).
    pub fn decode(buf: &[u8]) -> Result<Document, DecodeError> {
        Self::decode_with(buf, &DecodeOptions::default())
    }

    /// Decode a complete file.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::InvalidFormat`] for a bad magic, an unreadable
    ///   header field, or a segment whose end precedes its start.
    /// - [`DecodeError::SegmentOutOfBounds`] if a segment (or the part of
    ///   DATA the plan needs) lies past the end of `buf`.
    /// - [`DecodeError::Type`] if a segment is malformed or the DATA
    ///   layout is unsupported.
    pub fn decode_with(buf: &[u8], options: &DecodeOptions) -> Result<Document, DecodeError> {
        let mut doc = Document {
            header: read_header(buf)?,
            metadata: options.metadata.clone(),
            ..Document::default()
        };

        read_text(buf, &mut doc, options)?;

        if doc.header.has_analysis() {
            read_analysis(buf, &mut doc, options)?;
        }

        if events_requested(&doc, options) {
            plan_data(&mut doc, options)?;
            read_data(buf, &mut doc)?;
        }

        Ok(doc)
    }
}

pub(crate) fn read_header(buf: &[u8]) -> Result<FcsHeader, DecodeError> {
    let header = FcsHeader::read_from(buf).map_err(DecodeError::InvalidFormat)?;
    debug!(
        version = %header.version,
        text = ?(header.begin_text, header.end_text),
        data = ?(header.begin_data, header.end_data),
        analysis = ?(header.begin_analysis, header.end_analysis),
        "decoded header"
    );
    Ok(header)
}

/// Decode TEXT and patch zero header offsets from its keywords.
pub(crate) fn read_text(
    buf: &[u8],
    doc: &mut Document,
    options: &DecodeOptions,
) -> Result<(), DecodeError> {
    let header = &doc.header;
    let bytes = segment_bytes(buf, "TEXT", header.begin_text, header.end_text)?;
    doc.text = Segment::parse(&options.encoding.decode(bytes))?;

    let text = &doc.text;
    let header = &mut doc.header;
    for (offset, keyword) in [
        (&mut header.begin_data, BEGINDATA),
        (&mut header.end_data, ENDDATA),
        (&mut header.begin_analysis, BEGINANALYSIS),
        (&mut header.end_analysis, ENDANALYSIS),
    ] {
        if *offset == 0 {
            *offset = text.optional_usize(keyword)?;
            if *offset != 0 {
                debug!(keyword, offset = *offset, "header offset taken from TEXT");
            }
        }
    }

    Ok(())
}

pub(crate) fn read_analysis(
    buf: &[u8],
    doc: &mut Document,
    options: &DecodeOptions,
) -> Result<(), DecodeError> {
    let header = &doc.header;
    let bytes = segment_bytes(buf, "ANALYSIS", header.begin_analysis, header.end_analysis)?;
    let analysis = Segment::parse(&options.encoding.decode(bytes))?;
    debug!(entries = analysis.len(), xml = analysis.as_xml().is_some(), "decoded ANALYSIS");
    doc.analysis = Some(analysis);
    Ok(())
}

/// Whether the DATA step runs at all: not for `asNone`, and not for
/// histogram-mode files.
pub(crate) fn events_requested(doc: &Document, options: &DecodeOptions) -> bool {
    options.data_format != DataFormat::AsNone
        && doc.text.get(MODE).map(str::trim) != Some(MODE_HISTOGRAM)
}

/// Derive the DATA plan and store it on the document.
pub(crate) fn plan_data(doc: &mut Document, options: &DecodeOptions) -> Result<(), DecodeError> {
    let plan = DecodePlan::new(&doc.text, options)?;
    debug!(
        element = ?plan.element,
        byte_order = ?plan.byte_order,
        events = plan.events,
        total = plan.total_events,
        skip = plan.skip_events,
        "planned DATA"
    );
    doc.plan = Some(plan);
    Ok(())
}

/// Read the matrix with the plan stored by [`plan_data`].
pub(crate) fn read_data(buf: &[u8], doc: &mut Document) -> Result<(), DecodeError> {
    if let Some(plan) = doc.plan.as_ref() {
        let matrix = matrix_reader::read_matrix(buf, doc.header.begin_data, plan)?;
        debug!(rows = matrix.row_count(), group_by = %plan.group_by, "decoded DATA");
        doc.data = Some(matrix);
    }
    Ok(())
}

/// Slice `[begin, end)` out of `buf`.
fn segment_bytes<'a>(
    buf: &'a [u8],
    segment: &'static str,
    begin: usize,
    end: usize,
) -> Result<&'a [u8], DecodeError> {
    if begin > end {
        return Err(DecodeError::InvalidFormat(WireError::InvertedSegment {
            segment,
            begin,
            end,
        }));
    }
    buf.get(begin..end).ok_or(DecodeError::SegmentOutOfBounds {
        segment,
        begin,
        end,
        available: buf.len(),
    })
}
