use std::collections::BTreeMap;

use tracing::debug;

use crate::error::TypeError;

/// A decoded TEXT or ANALYSIS segment.
///
/// Almost every segment is a delimited keyword list:
///
/// ```text
///   |$BYTEORD|4,3,2,1|$DATATYPE|F|$PAR|8|...|
///   ^ the first byte picks the delimiter
/// ```
///
/// Some instruments write their ANALYSIS segment as XML instead. Such a
/// segment starts with `<` and is kept verbatim in [`Segment::Xml`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
  Keywords(BTreeMap<String, String>),
  Xml(String),
}

impl Default for Segment {
  fn default() -> Self {
    Self::Keywords(BTreeMap::new())
  }
}

impl Segment {
  /// Tokenize a segment string.
  ///
  /// Processing steps:
  ///
  ///   1. Empty input gives an empty mapping; a leading `<` gives
  ///      [`Segment::Xml`].
  ///   2. Split on the delimiter (the first character). Token 0 is the
  ///      empty artifact of the leading delimiter.
  ///   3. If a doubled delimiter occurs anywhere past the first position,
  ///      rejoin escaped delimiters (see [`rejoin_escaped`]).
  ///   4. Drop a trailing empty token left by a closing delimiter.
  ///   5. Pair tokens 1, 3, 5, ... (keys, trimmed) with 2, 4, 6, ...
  ///      (values, verbatim).
  ///
  /// # Errors
  ///
  /// Returns [`TypeError::MalformedSegment`] if a non-blank keyword is
  /// left without a value.
  pub fn parse(text: &str) -> Result<Self, TypeError> {
    let Some(delim) = text.chars().next() else {
      return Ok(Self::default());
    };

    if delim == '<' {
      debug!(len = text.len(), "segment is XML, storing verbatim");
      return Ok(Self::Xml(text.to_owned()));
    }

    let split: Vec<&str> = text.split(delim).collect();
    let doubled: String = [delim, delim].iter().collect();

    let mut tokens: Vec<String> = if text[delim.len_utf8()..].contains(&doubled) {
      rejoin_escaped(&split, delim)
    } else {
      split.iter().map(|&s| s.to_owned()).collect()
    };

    if tokens.last().is_some_and(String::is_empty) {
      tokens.pop();
    }

    let mut map = BTreeMap::new();
    for pair in tokens.get(1..).unwrap_or_default().chunks(2) {
      let key = pair[0].trim();
      match pair.get(1) {
        Some(value) => {
          map.insert(key.to_owned(), value.clone());
        }
        None if key.is_empty() => {
          debug!("ignoring blank padding after the last value");
        }
        None => {
          return Err(TypeError::MalformedSegment {
            reason: format!("keyword {key:?} has no value"),
          });
        }
      }
    }

    debug!(keywords = map.len(), delimiter = %delim.escape_debug(), "decoded keyword segment");
    Ok(Self::Keywords(map))
  }

  /// Look up one keyword. Always `None` for an XML segment.
  #[must_use]
  pub fn get(&self, key: &str) -> Option<&str> {
    match self {
      Self::Keywords(map) => map.get(key).map(String::as_str),
      Self::Xml(_) => None,
    }
  }

  /// Return the value of the first key in `keys` that is present.
  #[must_use]
  pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
    keys.iter().find_map(|key| self.get(key))
  }

  /// Parse a required count-like keyword (`$PAR`, `$TOT`).
  ///
  /// # Errors
  ///
  /// [`TypeError::MissingKeyword`] when absent,
  /// [`TypeError::InvalidKeyword`] when not a non-negative integer.
  pub fn required_usize(&self, key: &str) -> Result<usize, TypeError> {
    let value = self.get(key).ok_or_else(|| TypeError::MissingKeyword {
      keyword: key.to_owned(),
    })?;
    parse_usize(key, value)
  }

  /// Parse an optional offset keyword. Absent or blank reads as 0.
  ///
  /// # Errors
  ///
  /// [`TypeError::InvalidKeyword`] when present but not an integer.
  pub fn optional_usize(&self, key: &str) -> Result<usize, TypeError> {
    match self.get(key) {
      Some(value) if !value.trim().is_empty() => parse_usize(key, value),
      _ => Ok(0),
    }
  }

  /// The keyword map, or `None` for an XML segment.
  #[must_use]
  pub fn keywords(&self) -> Option<&BTreeMap<String, String>> {
    match self {
      Self::Keywords(map) => Some(map),
      Self::Xml(_) => None,
    }
  }

  /// The verbatim XML payload, if this is an XML segment.
  #[must_use]
  pub fn as_xml(&self) -> Option<&str> {
    match self {
      Self::Keywords(_) => None,
      Self::Xml(xml) => Some(xml),
    }
  }

  /// Number of keywords; an XML segment counts as one entry.
  #[must_use]
  pub fn len(&self) -> usize {
    match self {
      Self::Keywords(map) => map.len(),
      Self::Xml(_) => 1,
    }
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

fn parse_usize(key: &str, value: &str) -> Result<usize, TypeError> {
  value
    .trim()
    .parse::<usize>()
    .map_err(|_| TypeError::InvalidKeyword {
      keyword: key.to_owned(),
      value: value.to_owned(),
    })
}

/// Rejoin values that contained escaped delimiters.
///
/// A literal delimiter inside a value is written twice, so a naive split
/// turns `a||b` into `["a", "", "b"]`. A run of `k` empty tokens between
/// two fragments stands for `k + 1` delimiters in a row:
///
/// ```text
///   k │ delimiters │ meaning                          │ result
///  ───┼────────────┼──────────────────────────────────┼──────────
///   1 │ ||         │ one literal                      │ "a|b"
///   2 │ |||        │ one literal, then a separator    │ "a|", "b"
///   3 │ ||||       │ two literals                     │ "a||b"
/// ```
///
/// `ceil(k / 2)` delimiters are appended to the value in progress. For an
/// even `k` the next fragment starts a new token, for an odd `k` it is
/// glued on. A leftover odd delimiter is absorbed rather than rejected.
///
/// `split[0]` (the empty token before the leading delimiter) is skipped;
/// the result keeps an empty token at index 0 so that keys stay on odd
/// indices.
fn rejoin_escaped(split: &[&str], delim: char) -> Vec<String> {
  let mut tokens = vec![String::new(), String::new()];
  let mut current = 0;
  let mut empties = 0usize;

  for &fragment in split.iter().skip(1) {
    if fragment.is_empty() {
      empties += 1;
      continue;
    }

    if empties > 0 {
      for _ in 0..empties.div_ceil(2) {
        tokens[current].push(delim);
      }
      if empties % 2 == 1 {
        tokens[current].push_str(fragment);
        empties = 0;
        continue;
      }
      empties = 0;
    }

    current += 1;
    if current < tokens.len() {
      tokens[current] = fragment.to_owned();
    } else {
      tokens.push(fragment.to_owned());
    }
  }

  tokens
}

#[cfg(test)]
mod tests {
  use super::*;

  fn keywords(text: &str) -> BTreeMap<String, String> {
    match Segment::parse(text).unwrap() {
      Segment::Keywords(map) => map,
      Segment::Xml(xml) => panic!("expected keywords, got XML {xml:?}"),
    }
  }

  #[test]
  fn parses_simple_segment() {
    let map = keywords("|$BYTEORD|4,3,2,1|$DATATYPE|F|$PAR|3|");
    assert_eq!(map.len(), 3);
    assert_eq!(map["$BYTEORD"], "4,3,2,1");
    assert_eq!(map["$DATATYPE"], "F");
    assert_eq!(map["$PAR"], "3");
  }

  #[test]
  fn delimiter_is_taken_from_first_character() {
    let map = keywords("/$TOT/100/$PAR/2/");
    assert_eq!(map["$TOT"], "100");
    assert_eq!(map["$PAR"], "2");

    let map = keywords("\x0c$CYT\x0cFACSort\x0c");
    assert_eq!(map["$CYT"], "FACSort");
  }

  #[test]
  fn missing_trailing_delimiter() {
    let map = keywords("|$MODE|L|$TOT|5");
    assert_eq!(map["$MODE"], "L");
    assert_eq!(map["$TOT"], "5");
  }

  #[test]
  fn escaped_delimiter_in_value() {
    let map = keywords("|$SRC|Compens||ation Controls|$TOT|10|");
    assert_eq!(map["$SRC"], "Compens|ation Controls");
    assert_eq!(map["$TOT"], "10");
  }

  #[test]
  fn escaped_delimiter_at_end_of_value() {
    // "a||" + separator: three delimiters in a row.
    let map = keywords("|KEY|a|||NEXT|b|");
    assert_eq!(map["KEY"], "a|");
    assert_eq!(map["NEXT"], "b");
  }

  #[test]
  fn two_escaped_delimiters() {
    let map = keywords("|KEY|a||||b|NEXT|c|");
    assert_eq!(map["KEY"], "a||b");
    assert_eq!(map["NEXT"], "c");
  }

  #[test]
  fn escaped_delimiter_in_key() {
    let map = keywords("/GATE 1//2 count/42/");
    assert_eq!(map["GATE 1/2 count"], "42");
  }

  #[test]
  fn keys_are_trimmed_values_are_not() {
    let map = keywords("|\n  GATE1 count |  17 |");
    assert_eq!(map["GATE1 count"], "  17 ");
  }

  #[test]
  fn trailing_blank_padding_is_ignored() {
    let map = keywords("|$TOT|5|   ");
    assert_eq!(map.len(), 1);
    assert_eq!(map["$TOT"], "5");
  }

  #[test]
  fn reject_dangling_keyword() {
    let result = Segment::parse("|$TOT|5|$PAR|");
    // "$PAR" followed only by the closing delimiter: the closing empty
    // token is dropped and the key has no value.
    assert!(matches!(result, Err(TypeError::MalformedSegment { .. })));
  }

  #[test]
  fn empty_input_is_empty_mapping() {
    let segment = Segment::parse("").unwrap();
    assert!(segment.is_empty());
    assert_eq!(segment, Segment::default());
  }

  #[test]
  fn lone_delimiter_is_empty_mapping() {
    assert!(Segment::parse("|").unwrap().is_empty());
  }

  #[test]
  fn xml_is_stored_verbatim() {
    let xml = "<?xml version=\"1.0\"?><gates><gate id=\"1\"/></gates>";
    let segment = Segment::parse(xml).unwrap();
    assert_eq!(segment.as_xml(), Some(xml));
    assert_eq!(segment.len(), 1);
    assert!(segment.keywords().is_none());
    assert_eq!(segment.get("gate"), None);
  }

  #[test]
  fn first_of_returns_first_hit() {
    let segment = Segment::parse("|$P1N|FSC-H|$P1S|Forward|").unwrap();
    assert_eq!(segment.first_of(&["$P1X", "$P1S", "$P1N"]), Some("Forward"));
    assert_eq!(segment.first_of(&["foo", "bar"]), None);
  }

  #[test]
  fn numeric_keyword_helpers() {
    let segment = Segment::parse("|$PAR| 8 |$TOT|abc|$BEGINDATA| |").unwrap();
    assert_eq!(segment.required_usize("$PAR").unwrap(), 8);
    assert!(matches!(
      segment.required_usize("$TOT"),
      Err(TypeError::InvalidKeyword { .. })
    ));
    assert!(matches!(
      segment.required_usize("$MODE"),
      Err(TypeError::MissingKeyword { .. })
    ));
    assert_eq!(segment.optional_usize("$BEGINDATA").unwrap(), 0);
    assert_eq!(segment.optional_usize("$ENDDATA").unwrap(), 0);
  }
}
