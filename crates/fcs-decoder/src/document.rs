use std::collections::BTreeMap;

use fcs_types::keywords::{self, PAR};
use fcs_types::{DataMatrix, Segment};
use fcs_wire::FcsHeader;

use crate::plan::DecodePlan;

/// The result of decoding one FCS file.
///
/// ```text
///   Document
///   ├── header     FcsHeader, offsets patched from TEXT when they were 0
///   ├── text       Segment (keywords)
///   ├── analysis   Option<Segment> (keywords or verbatim XML)
///   ├── data       Option<DataMatrix> (None for asNone, $MODE H, or no DATA)
///   ├── plan       Option<DecodePlan> (how `data` was read)
///   └── metadata   unrecognized caller options
/// ```
///
/// A `Document` never borrows the input buffer. A partially populated one
/// is handed back with a streaming failure, so every part past the header
/// may be missing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub header: FcsHeader,
    pub text: Segment,
    pub analysis: Option<Segment>,
    pub data: Option<DataMatrix>,
    pub plan: Option<DecodePlan>,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    /// First TEXT value among `keys`.
    ///
    /// ```rust
    /// # use fcs_decoder::Document;
    /// # let doc = Document::default();
    /// let cytometer = doc.text_value(&["$CYT", "CYTOMETER"]);
    /// # assert_eq!(cytometer, None);
    /// ```
    #[must_use]
    pub fn text_value(&self, keys: &[&str]) -> Option<&str> {
        self.text.first_of(keys)
    }

    /// First ANALYSIS value among `keys`. `None` when there is no ANALYSIS
    /// segment or it is XML.
    #[must_use]
    pub fn analysis_value(&self, keys: &[&str]) -> Option<&str> {
        self.analysis.as_ref()?.first_of(keys)
    }

    /// Values of `$P1<suffix>` through `$Pn<suffix>` for `n = $PAR`, missing
    /// ones as `None`. Empty when `$PAR` is absent or unreadable. `n` never
    /// exceeds the number of TEXT keywords.
    ///
    /// `parameter_keywords("N")` gives the short parameter names.
    #[must_use]
    pub fn parameter_keywords(&self, suffix: &str) -> Vec<Option<&str>> {
        let count = self
            .text
            .required_usize(PAR)
            .unwrap_or(0)
            .min(self.text.len());
        (1..=count)
            .map(|index| self.text.get(&keywords::parameter(index, suffix)))
            .collect()
    }

    /// Numeric row `index`, counting from 1. A row is an event or a
    /// parameter depending on the grouping mode.
    #[must_use]
    pub fn numeric_row(&self, index: usize) -> Option<&[f64]> {
        self.data.as_ref()?.numeric_row(index.checked_sub(1)?)
    }

    /// Formatted row `index`, counting from 1.
    #[must_use]
    pub fn string_row(&self, index: usize) -> Option<&str> {
        self.data.as_ref()?.string_row(index.checked_sub(1)?)
    }

    /// All formatted rows as one block of text.
    #[must_use]
    pub fn data_text(&self) -> Option<String> {
        self.data.as_ref()?.joined_text()
    }

    /// Number of decoded events (0 when no data was decoded).
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.data.as_ref().map_or(0, DataMatrix::event_count)
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.data.as_ref().map_or(0, DataMatrix::parameter_count)
    }
}
