use std::collections::BTreeMap;

use fcs_types::{DataFormat, GroupBy, TextEncoding};

use crate::error::DecodeError;

pub const DEFAULT_DECIMALS_TO_PRINT: usize = 2;
pub const DEFAULT_EVENTS_TO_READ: i64 = 1000;
pub const DEFAULT_MAX_PER_LINE: usize = 10;

/// Option keys recognized by [`DecodeOptions::merge`].
pub mod keys {
    pub const DATA_FORMAT: &str = "dataFormat";
    pub const GROUP_BY: &str = "groupBy";
    pub const DECIMALS_TO_PRINT: &str = "decimalsToPrint";
    pub const EVENTS_TO_READ: &str = "eventsToRead";
    pub const MAX_PER_LINE: &str = "maxPerLine";
    pub const ENCODING: &str = "encoding";
    pub const SKIP: &str = "skip";
}

/// Caller options for one decode.
///
/// ```text
/// ┌──────────────────┬────────────────────────────────────────┬──────────┐
/// │ Field            │ Purpose                                │ Default  │
/// ├──────────────────┼────────────────────────────────────────┼──────────┤
/// │ data_format      │ numbers, strings, both, or no DATA     │ asString │
/// │ group_by         │ rows are events or parameters          │ byEvent  │
/// │ decimals_to_print│ precision of float rendering           │ 2        │
/// │ events_to_read   │ events to decode, <= 0 means all       │ 1000     │
/// │ max_per_line     │ values per line in byParam rendering   │ 10       │
/// │ encoding         │ TEXT/ANALYSIS character encoding       │ utf8     │
/// │ skip             │ sub-sampling between decoded events    │ none     │
/// │ metadata         │ unrecognized keys, kept verbatim       │ empty    │
/// └──────────────────┴────────────────────────────────────────┴──────────┘
/// ```
///
/// `DecodeOptions::default()` is the defaults table. Caller overrides are
/// applied with [`merge`](Self::merge), which returns a new value and
/// leaves the defaults untouched, or with struct update syntax:
///
/// ```rust
/// use fcs_decoder::DecodeOptions;
/// use fcs_types::GroupBy;
///
/// let options = DecodeOptions {
///     group_by: GroupBy::ByParam,
///     ..DecodeOptions::default()
/// };
/// assert_eq!(options.events_to_read, 1000);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    pub data_format: DataFormat,
    pub group_by: GroupBy,
    pub decimals_to_print: usize,
    pub events_to_read: i64,
    pub max_per_line: usize,
    pub encoding: TextEncoding,
    pub skip: Option<Skip>,
    /// Unrecognized option keys. Copied onto the decoded
    /// [`Document`](crate::Document) so callers can attach their own
    /// annotations (file name, lab, timestamp).
    pub metadata: BTreeMap<String, String>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            data_format: DataFormat::default(),
            group_by: GroupBy::default(),
            decimals_to_print: DEFAULT_DECIMALS_TO_PRINT,
            events_to_read: DEFAULT_EVENTS_TO_READ,
            max_per_line: DEFAULT_MAX_PER_LINE,
            encoding: TextEncoding::default(),
            skip: None,
            metadata: BTreeMap::new(),
        }
    }
}

/// Sub-sampling mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Skip {
    /// Skip this many events after each decoded event.
    Events(usize),
    /// Spread the decoded events over the whole file. The stride is
    /// `floor(total / requested) - 1` events, which only approximates an
    /// even spread: the tail of the file is usually not reached.
    Spread,
}

impl DecodeOptions {
    /// Build options from string key/value pairs on top of the defaults.
    ///
    /// # Errors
    ///
    /// See [`merge`](Self::merge).
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::default().merge(pairs)
    }

    /// Return a copy of `self` with the given string options applied.
    ///
    /// Keys are matched exactly (see [`keys`]). Unrecognized keys go to
    /// [`metadata`](Self::metadata). Later pairs override earlier ones.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidOption`] if a recognized key has a
    /// value that cannot be parsed.
    pub fn merge<I, K, V>(mut self, pairs: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            let invalid = || DecodeError::InvalidOption {
                key: key.to_owned(),
                value: value.to_owned(),
            };

            match key {
                keys::DATA_FORMAT => self.data_format = value.parse().map_err(|_| invalid())?,
                keys::GROUP_BY => self.group_by = value.parse().map_err(|_| invalid())?,
                keys::ENCODING => self.encoding = value.parse().map_err(|_| invalid())?,
                keys::DECIMALS_TO_PRINT => {
                    self.decimals_to_print = value.trim().parse().map_err(|_| invalid())?;
                }
                keys::EVENTS_TO_READ => {
                    self.events_to_read = value.trim().parse().map_err(|_| invalid())?;
                }
                keys::MAX_PER_LINE => {
                    self.max_per_line = value.trim().parse().map_err(|_| invalid())?;
                }
                keys::SKIP => self.skip = parse_skip(value).ok_or_else(invalid)?,
                _ => {
                    self.metadata.insert(key.to_owned(), value.to_owned());
                }
            }
        }
        Ok(self)
    }

    /// Requested event count, `None` meaning all events.
    #[must_use]
    pub fn requested_events(&self) -> Option<usize> {
        usize::try_from(self.events_to_read).ok().filter(|&n| n > 0)
    }
}

/// Parse a `skip` option value.
///
/// ```text
///   ""  / "0"             → no sub-sampling
///   "9"                   → Skip::Events(9)
///   "-3" / "2.5"          → invalid (outer None)
///   "auto" / "true" / ... → Skip::Spread
/// ```
fn parse_skip(value: &str) -> Option<Option<Skip>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(None);
    }
    if let Ok(events) = trimmed.parse::<usize>() {
        return Some((events > 0).then_some(Skip::Events(events)));
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => None,
        _ => Some(Some(Skip::Spread)),
    }
}
