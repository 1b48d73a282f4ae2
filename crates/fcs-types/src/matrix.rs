use crate::enums::GroupBy;

/// The decoded DATA segment.
///
/// Holds the same logical event x parameter grid in one of two row
/// orientations:
///
/// ```text
///   ByEvent (rows = events)          ByParam (rows = parameters)
///   ┌──────┬──────┬──────┐           ┌──────┬──────┬──────┬──────┐
///   │ e0p0 │ e0p1 │ e0p2 │           │ e0p0 │ e1p0 │ e2p0 │ e3p0 │
///   │ e1p0 │ e1p1 │ e1p2 │           │ e0p1 │ e1p1 │ e2p1 │ e3p1 │
///   │ e2p0 │ e2p1 │ e2p2 │           │ e0p2 │ e1p2 │ e2p2 │ e3p2 │
///   │ e3p0 │ e3p1 │ e3p2 │           └──────┴──────┴──────┴──────┘
///   └──────┴──────┴──────┘
/// ```
///
/// Numbers live in one flat row-major buffer. Either representation may be
/// absent, depending on the requested [`DataFormat`](crate::DataFormat).
#[derive(Clone, Debug, PartialEq)]
pub struct DataMatrix {
    group_by: GroupBy,
    events: usize,
    parameters: usize,
    numbers: Option<Vec<f64>>,
    strings: Option<Vec<String>>,
}

impl DataMatrix {
    /// Assemble a matrix from already-decoded parts.
    ///
    /// `numbers`, when present, must hold `events * parameters` values laid
    /// out row-major in `group_by` order; `strings` one entry per row.
    #[must_use]
    pub fn new(
        group_by: GroupBy,
        events: usize,
        parameters: usize,
        numbers: Option<Vec<f64>>,
        strings: Option<Vec<String>>,
    ) -> Self {
        let matrix = Self {
            group_by,
            events,
            parameters,
            numbers,
            strings,
        };
        debug_assert!(
            matrix
                .numbers
                .as_ref()
                .is_none_or(|n| n.len() == events * parameters)
        );
        debug_assert!(
            matrix
                .strings
                .as_ref()
                .is_none_or(|s| s.len() == matrix.row_count())
        );
        matrix
    }

    #[must_use]
    pub fn group_by(&self) -> GroupBy {
        self.group_by
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameters
    }

    /// Number of rows: events for `ByEvent`, parameters for `ByParam`.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self.group_by {
            GroupBy::ByEvent => self.events,
            GroupBy::ByParam => self.parameters,
        }
    }

    /// Number of values per row.
    #[must_use]
    pub fn row_len(&self) -> usize {
        match self.group_by {
            GroupBy::ByEvent => self.parameters,
            GroupBy::ByParam => self.events,
        }
    }

    /// Numeric row `index` (0-based), if numbers were decoded.
    #[must_use]
    pub fn numeric_row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.row_count() {
            return None;
        }
        let len = self.row_len();
        let start = index * len;
        self.numbers.as_deref()?.get(start..start + len)
    }

    /// Formatted row `index` (0-based), if strings were rendered.
    #[must_use]
    pub fn string_row(&self, index: usize) -> Option<&str> {
        self.strings.as_ref()?.get(index).map(String::as_str)
    }

    /// Value for `event` and `parameter`, independent of the orientation.
    #[must_use]
    pub fn value(&self, event: usize, parameter: usize) -> Option<f64> {
        if event >= self.events || parameter >= self.parameters {
            return None;
        }
        let index = match self.group_by {
            GroupBy::ByEvent => event * self.parameters + parameter,
            GroupBy::ByParam => parameter * self.events + event,
        };
        self.numbers.as_ref()?.get(index).copied()
    }

    /// The flat numeric buffer, row-major in [`group_by`](Self::group_by)
    /// order.
    #[must_use]
    pub fn numbers(&self) -> Option<&[f64]> {
        self.numbers.as_deref()
    }

    /// All formatted rows.
    #[must_use]
    pub fn strings(&self) -> Option<&[String]> {
        self.strings.as_deref()
    }

    /// All formatted rows joined into one block of text.
    ///
    /// Event rows are separated by `,\n`; parameter rows, which are long
    /// and already wrapped, by `,\n\n`.
    #[must_use]
    pub fn joined_text(&self) -> Option<String> {
        let separator = match self.group_by {
            GroupBy::ByEvent => ",\n",
            GroupBy::ByParam => ",\n\n",
        };
        self.strings.as_ref().map(|rows| rows.join(separator))
    }
}
