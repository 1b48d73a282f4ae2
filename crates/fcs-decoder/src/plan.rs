use fcs_types::keywords::{self, BYTEORD, DATATYPE, PAR, TOT};
use fcs_types::{DataFormat, GroupBy, Segment, TypeError};
use fcs_wire::{ByteOrder, ElementKind};

use crate::config::{DecodeOptions, Skip};

/// Everything needed to walk the DATA segment, derived once from the TEXT
/// keywords and the caller's options.
///
/// ```text
///   TEXT ──┬── $BYTEORD ──────────────→ byte_order
///          ├── $DATATYPE + $P1B ──────→ element (width, integer?)
///          ├── $PAR ──────────────────→ parameters, bytes_per_event
///          └── $TOT ──┐
///   options ──────────┴── eventsToRead, skip ──→ events, skip_events
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodePlan {
    pub element: ElementKind,
    pub byte_order: ByteOrder,
    pub parameters: usize,
    pub total_events: usize,
    /// Events to decode: the requested count clamped to `$TOT`.
    pub events: usize,
    pub bytes_per_event: usize,
    /// Events jumped over after each decoded event.
    pub skip_events: usize,
    pub skip_bytes: usize,
    /// Precision for the text rendering. `None` for integer data, which
    /// renders without a decimal point.
    pub decimals: Option<usize>,
    pub group_by: GroupBy,
    pub data_format: DataFormat,
    pub max_per_line: usize,
}

impl DecodePlan {
    /// Derive a plan from a decoded TEXT segment.
    ///
    /// # Errors
    ///
    /// - [`TypeError::MissingKeyword`] if `$BYTEORD`, `$DATATYPE`, `$PAR` or
    ///   `$TOT` is absent.
    /// - [`TypeError::InvalidKeyword`] if `$PAR` or `$TOT` is not a
    ///   non-negative integer, or `$PAR` declares more parameters than the
    ///   segment has keywords.
    /// - [`TypeError::UnsupportedByteOrder`] / [`TypeError::UnsupportedDataType`]
    ///   for layouts this decoder cannot read.
    pub fn new(text: &Segment, options: &DecodeOptions) -> Result<Self, TypeError> {
        let byte_order = keywords::parse_byte_order(required(text, BYTEORD)?)?;
        let element = keywords::element_kind(
            required(text, DATATYPE)?,
            text.get(&keywords::parameter(1, "B")),
        )?;
        let parameters = text.required_usize(PAR)?;
        // Every parameter carries at least its own `$PnB` keyword.
        if parameters > text.len() {
            return Err(invalid_parameter_count(text));
        }
        let total_events = text.required_usize(TOT)?;

        let events = options
            .requested_events()
            .map_or(total_events, |requested| requested.min(total_events));

        let skip_events = match options.skip {
            Some(Skip::Events(n)) if events < total_events => n,
            Some(Skip::Spread) if events > 0 && events < total_events => {
                (total_events / events).saturating_sub(1)
            }
            _ => 0,
        };

        let bytes_per_event = element
            .width()
            .checked_mul(parameters)
            .ok_or_else(|| invalid_parameter_count(text))?;

        Ok(Self {
            element,
            byte_order,
            parameters,
            total_events,
            events,
            bytes_per_event,
            skip_events,
            skip_bytes: skip_events.saturating_mul(bytes_per_event),
            decimals: (!element.is_integer()).then_some(options.decimals_to_print),
            group_by: options.group_by,
            data_format: options.data_format,
            max_per_line: options.max_per_line,
        })
    }

    /// Bytes spanned by the decoded events, from the first value read to
    /// the last. No stride follows the final event.
    #[must_use]
    pub fn data_len(&self) -> usize {
        match self.events {
            0 => 0,
            n => n
                .saturating_mul(self.bytes_per_event)
                .saturating_add((n - 1).saturating_mul(self.skip_bytes)),
        }
    }

    /// Buffer length required before the DATA step can run.
    #[must_use]
    pub fn data_end(&self, begin_data: usize) -> usize {
        begin_data.saturating_add(self.data_len())
    }
}

fn invalid_parameter_count(text: &Segment) -> TypeError {
    TypeError::InvalidKeyword {
        keyword: PAR.to_owned(),
        value: text.get(PAR).unwrap_or_default().to_owned(),
    }
}

fn required<'a>(text: &'a Segment, key: &str) -> Result<&'a str, TypeError> {
    text.get(key).ok_or_else(|| TypeError::MissingKeyword {
        keyword: key.to_owned(),
    })
}
