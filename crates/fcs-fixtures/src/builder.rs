/// Size of the fixed header prefix.
pub const HEADER_SIZE: usize = 256;

/// Byte ranges of the six header offset fields, in file order: begin/end
/// TEXT, begin/end DATA, begin/end ANALYSIS.
pub const OFFSET_FIELDS: [(usize, usize); 6] =
    [(10, 18), (18, 26), (26, 34), (34, 42), (42, 50), (50, 58)];

/// Width of the offset values written into TEXT. Fixed so that the TEXT
/// length does not depend on the offsets it describes.
const TEXT_OFFSET_WIDTH: usize = 12;

/// Largest offset that fits in an 8-character header field.
const MAX_HEADER_OFFSET: usize = 99_999_999;

/// DATA element layout, mapped to `$DATATYPE` and `$PnB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Float32,
    Float64,
    Int16,
    Int32,
}

impl Layout {
    fn datatype(self) -> &'static str {
        match self {
            Self::Float32 => "F",
            Self::Float64 => "D",
            Self::Int16 | Self::Int32 => "I",
        }
    }

    fn bits(self) -> usize {
        match self {
            Self::Int16 => 16,
            Self::Float32 | Self::Int32 => 32,
            Self::Float64 => 64,
        }
    }

    fn range(self) -> &'static str {
        match self {
            Self::Int16 => "65536",
            Self::Float32 | Self::Float64 | Self::Int32 => "262144",
        }
    }
}

/// Where the ANALYSIS segment goes relative to DATA.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AnalysisPlacement {
    BeforeData,
    #[default]
    AfterData,
}

#[derive(Clone, Debug)]
enum Analysis {
    Keywords(Vec<(String, String)>),
    Raw(String),
}

/// Builds a syntactically valid FCS file in memory.
///
/// ```text
/// ┌──────────────┬───────────────────────────────────────────────┐
/// │ [0, 256)     │ header: version, six 8-char offsets, padding  │
/// │ [256, ..)    │ TEXT: standard keywords + overrides           │
/// │ [.., ..)     │ ANALYSIS (optional, before or after DATA)     │
/// │ [.., ..)     │ DATA: events x parameters, fixed width        │
/// └──────────────┴───────────────────────────────────────────────┘
/// ```
///
/// End offsets are written exclusive (`begin + len`), which is how the
/// decoder slices segments. TEXT always carries `$BEGINDATA`, `$ENDDATA`,
/// `$BEGINANALYSIS` and `$ENDANALYSIS`; with
/// [`offsets_in_text_only`](Self::offsets_in_text_only) the matching
/// header fields are written as 0.
///
/// Methods return `&mut Self` for chaining:
///
/// ```rust
/// use fcs_fixtures::{FcsBuilder, Layout};
///
/// let file = FcsBuilder::new(&["FSC-A", "SSC-A"])
///     .layout(Layout::Int16)
///     .events(vec![vec![1.0, 2.0]])
///     .keyword("$CYT", "Aria")
///     .build();
/// assert_eq!(&file[..6], b"FCS3.0");
/// ```
#[derive(Clone, Debug)]
pub struct FcsBuilder {
    version: String,
    names: Vec<String>,
    layout: Layout,
    little_endian: bool,
    delimiter: u8,
    events: Vec<Vec<f64>>,
    overrides: Vec<(String, String)>,
    analysis: Option<Analysis>,
    placement: AnalysisPlacement,
    offsets_in_text_only: bool,
}

impl FcsBuilder {
    /// A big-endian `F` file with one parameter per name and no events.
    #[must_use]
    pub fn new(names: &[&str]) -> Self {
        Self {
            version: "FCS3.0".to_owned(),
            names: names.iter().map(|&n| n.to_owned()).collect(),
            layout: Layout::default(),
            little_endian: false,
            delimiter: b'|',
            events: Vec::new(),
            overrides: Vec::new(),
            analysis: None,
            placement: AnalysisPlacement::default(),
            offsets_in_text_only: false,
        }
    }

    /// Six-character version tag. Longer tags are cut, shorter ones padded.
    pub fn version(&mut self, version: &str) -> &mut Self {
        self.version = version.to_owned();
        self
    }

    pub fn layout(&mut self, layout: Layout) -> &mut Self {
        self.layout = layout;
        self
    }

    /// Write DATA little-endian (`$BYTEORD 1,2,...`).
    pub fn little_endian(&mut self) -> &mut Self {
        self.little_endian = true;
        self
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Event rows, one value per parameter. Missing values are written as
    /// 0; extra values are dropped.
    pub fn events(&mut self, events: Vec<Vec<f64>>) -> &mut Self {
        self.events = events;
        self
    }

    /// Add a TEXT keyword, or replace a standard one (`$DATATYPE`,
    /// `$BYTEORD`, `$MODE`, `$TOT`, ...). Delimiters in the key or value
    /// are escaped by doubling.
    pub fn keyword(&mut self, key: &str, value: &str) -> &mut Self {
        self.overrides.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Add a delimited ANALYSIS segment.
    pub fn analysis_keywords(&mut self, pairs: &[(&str, &str)]) -> &mut Self {
        self.analysis = Some(Analysis::Keywords(
            pairs
                .iter()
                .map(|&(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        ));
        self
    }

    /// Add an ANALYSIS segment written verbatim, e.g. an XML document.
    pub fn analysis_raw(&mut self, payload: &str) -> &mut Self {
        self.analysis = Some(Analysis::Raw(payload.to_owned()));
        self
    }

    pub fn analysis_placement(&mut self, placement: AnalysisPlacement) -> &mut Self {
        self.placement = placement;
        self
    }

    /// Write 0 into the header's DATA and ANALYSIS fields so that only the
    /// TEXT keywords locate them, as for files larger than 99,999,999
    /// bytes.
    pub fn offsets_in_text_only(&mut self) -> &mut Self {
        self.offsets_in_text_only = true;
        self
    }

    /// Serialize the file.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let data = self.data_bytes();
        let analysis = self.analysis_bytes();

        // TEXT length is independent of the offsets it carries.
        let text_len = self.text_bytes(&Offsets::default()).len();
        let offsets = self.offsets(text_len, data.len(), analysis.len());
        let text = self.text_bytes(&offsets);
        debug_assert_eq!(text.len(), text_len);

        let mut file = self.header_bytes(&offsets);
        file.extend_from_slice(&text);
        match self.placement {
            AnalysisPlacement::BeforeData => {
                file.extend_from_slice(&analysis);
                file.extend_from_slice(&data);
            }
            AnalysisPlacement::AfterData => {
                file.extend_from_slice(&data);
                file.extend_from_slice(&analysis);
            }
        }
        file
    }

    fn offsets(&self, text_len: usize, data_len: usize, analysis_len: usize) -> Offsets {
        let text = (HEADER_SIZE, HEADER_SIZE + text_len);
        let after_text = text.1;
        let (data, analysis) = match (analysis_len, self.placement) {
            (0, _) => ((after_text, after_text + data_len), (0, 0)),
            (_, AnalysisPlacement::BeforeData) => {
                let analysis = (after_text, after_text + analysis_len);
                ((analysis.1, analysis.1 + data_len), analysis)
            }
            (_, AnalysisPlacement::AfterData) => {
                let data = (after_text, after_text + data_len);
                (data, (data.1, data.1 + analysis_len))
            }
        };
        Offsets {
            text,
            data,
            analysis,
        }
    }

    fn header_bytes(&self, offsets: &Offsets) -> Vec<u8> {
        let mut header = vec![b' '; HEADER_SIZE];
        let version = format!("{:<6.6}", self.version);
        header[..6].copy_from_slice(version.as_bytes());

        let values = [
            (offsets.text.0, false),
            (offsets.text.1, false),
            (offsets.data.0, true),
            (offsets.data.1, true),
            (offsets.analysis.0, true),
            (offsets.analysis.1, true),
        ];
        for (&(start, end), (value, movable)) in OFFSET_FIELDS.iter().zip(values) {
            let value = if (movable && self.offsets_in_text_only) || value > MAX_HEADER_OFFSET {
                0
            } else {
                value
            };
            header[start..end].copy_from_slice(format!("{value:>8}").as_bytes());
        }
        header
    }

    fn text_bytes(&self, offsets: &Offsets) -> Vec<u8> {
        let offset = |value: usize| format!("{value:0width$}", width = TEXT_OFFSET_WIDTH);
        let byte_order = if self.little_endian {
            (1..=self.layout.bits() / 8).map(|b| b.to_string()).collect::<Vec<_>>()
        } else {
            (1..=self.layout.bits() / 8).rev().map(|b| b.to_string()).collect()
        };

        let mut pairs = vec![
            ("$BEGINANALYSIS".to_owned(), offset(offsets.analysis.0)),
            ("$BEGINDATA".to_owned(), offset(offsets.data.0)),
            ("$BEGINSTEXT".to_owned(), "0".to_owned()),
            ("$BYTEORD".to_owned(), byte_order.join(",")),
            ("$DATATYPE".to_owned(), self.layout.datatype().to_owned()),
            ("$ENDANALYSIS".to_owned(), offset(offsets.analysis.1)),
            ("$ENDDATA".to_owned(), offset(offsets.data.1)),
            ("$ENDSTEXT".to_owned(), "0".to_owned()),
            ("$MODE".to_owned(), "L".to_owned()),
            ("$NEXTDATA".to_owned(), "0".to_owned()),
            ("$PAR".to_owned(), self.names.len().to_string()),
            ("$TOT".to_owned(), self.events.len().to_string()),
        ];
        for (i, name) in self.names.iter().enumerate() {
            let n = i + 1;
            pairs.push((format!("$P{n}B"), self.layout.bits().to_string()));
            pairs.push((format!("$P{n}E"), "0,0".to_owned()));
            pairs.push((format!("$P{n}N"), name.clone()));
            pairs.push((format!("$P{n}R"), self.layout.range().to_owned()));
        }
        for (key, value) in &self.overrides {
            match pairs.iter_mut().find(|(k, _)| k == key) {
                Some(pair) => pair.1.clone_from(value),
                None => pairs.push((key.clone(), value.clone())),
            }
        }

        delimited(self.delimiter, &pairs)
    }

    fn analysis_bytes(&self) -> Vec<u8> {
        match &self.analysis {
            None => Vec::new(),
            Some(Analysis::Keywords(pairs)) => delimited(self.delimiter, pairs),
            Some(Analysis::Raw(payload)) => payload.as_bytes().to_vec(),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn data_bytes(&self) -> Vec<u8> {
        let width = self.layout.bits() / 8;
        let mut out = Vec::with_capacity(self.events.len() * self.names.len() * width);
        for event in &self.events {
            for p in 0..self.names.len() {
                let v = event.get(p).copied().unwrap_or(0.0);
                match (self.layout, self.little_endian) {
                    (Layout::Float32, false) => out.extend_from_slice(&(v as f32).to_be_bytes()),
                    (Layout::Float32, true) => out.extend_from_slice(&(v as f32).to_le_bytes()),
                    (Layout::Float64, false) => out.extend_from_slice(&v.to_be_bytes()),
                    (Layout::Float64, true) => out.extend_from_slice(&v.to_le_bytes()),
                    (Layout::Int16, false) => out.extend_from_slice(&(v as u16).to_be_bytes()),
                    (Layout::Int16, true) => out.extend_from_slice(&(v as u16).to_le_bytes()),
                    (Layout::Int32, false) => out.extend_from_slice(&(v as u32).to_be_bytes()),
                    (Layout::Int32, true) => out.extend_from_slice(&(v as u32).to_le_bytes()),
                }
            }
        }
        out
    }
}

#[derive(Default)]
struct Offsets {
    text: (usize, usize),
    data: (usize, usize),
    analysis: (usize, usize),
}

/// `|k1|v1|k2|v2|`, with delimiters inside keys and values doubled.
fn delimited(delimiter: u8, pairs: &[(String, String)]) -> Vec<u8> {
    let delim = char::from(delimiter);
    let doubled: String = [delim, delim].iter().collect();
    let mut out = String::new();
    out.push(delim);
    for (key, value) in pairs {
        out.push_str(&key.replace(delim, &doubled));
        out.push(delim);
        out.push_str(&value.replace(delim, &doubled));
        out.push(delim);
    }
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(file: &[u8], index: usize) -> usize {
        let (start, end) = OFFSET_FIELDS[index];
        std::str::from_utf8(&file[start..end])
            .unwrap()
            .trim()
            .parse()
            .unwrap()
    }

    #[test]
    fn layout_is_contiguous() {
        let file = FcsBuilder::new(&["A", "B"])
            .events(vec![vec![1.0, 2.0], vec![3.0, 4.0]])
            .analysis_keywords(&[("k", "v")])
            .build();

        assert_eq!(field(&file, 0), HEADER_SIZE);
        assert_eq!(field(&file, 2), field(&file, 1));
        assert_eq!(field(&file, 3) - field(&file, 2), 16);
        assert_eq!(field(&file, 4), field(&file, 3));
        assert_eq!(field(&file, 5), file.len());
        assert_eq!(&file[field(&file, 4)..], b"|k|v|");
    }

    #[test]
    fn text_carries_offsets() {
        let file = FcsBuilder::new(&["A"])
            .events(vec![vec![1.0]])
            .offsets_in_text_only()
            .build();
        assert_eq!(field(&file, 2), 0);

        let end_text = field(&file, 1);
        let text = std::str::from_utf8(&file[HEADER_SIZE..end_text]).unwrap();
        let begin_data = format!("|$BEGINDATA|{end_text:012}|");
        assert!(text.contains(&begin_data), "{text}");
    }

    #[test]
    fn escapes_delimiters() {
        let file = FcsBuilder::new(&["A"])
            .keyword("$SRC", "Compens|ation Controls")
            .build();
        let text = String::from_utf8_lossy(&file[HEADER_SIZE..]);
        assert!(text.contains("|$SRC|Compens||ation Controls|"));
    }

    #[test]
    fn overrides_replace_standard_keywords() {
        let file = FcsBuilder::new(&["A"]).keyword("$MODE", "H").build();
        let text = String::from_utf8_lossy(&file[HEADER_SIZE..]);
        assert!(text.contains("|$MODE|H|"));
        assert!(!text.contains("|$MODE|L|"));
    }

    #[test]
    fn integer_little_endian_data() {
        let file = FcsBuilder::new(&["A"])
            .layout(Layout::Int16)
            .little_endian()
            .events(vec![vec![258.0]])
            .build();
        assert_eq!(&file[file.len() - 2..], &[0x02, 0x01]);
        assert!(String::from_utf8_lossy(&file).contains("|$BYTEORD|1,2|"));
    }
}
