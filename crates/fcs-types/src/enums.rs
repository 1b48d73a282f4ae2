use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

// ── Macro for option-string enum boilerplate ──────────────────────────
//
// Every enum in this module is a closed set of variants, each spelled one
// way in the option table. The macro generates the `as_str` / `FromStr`
// pair plus `Display`. Variants may list extra accepted spellings after
// the canonical one.

macro_rules! option_enum {
  (
    $(#[$meta:meta])*
    pub enum $name:ident {
      $( $(#[$vmeta:meta])* $variant:ident = $canonical:literal $(| $alias:literal)* ),+ $(,)?
    }
  ) => {
    $(#[$meta])*
    pub enum $name {
      $( $(#[$vmeta])* $variant ),+
    }

    impl $name {
      /// The canonical option spelling of this variant.
      #[must_use]
      pub fn as_str(self) -> &'static str {
        match self {
          $( Self::$variant => $canonical ),+
        }
      }
    }

    impl FromStr for $name {
      type Err = TypeError;

      /// Parse an option value. Matching ignores ASCII case and
      /// surrounding whitespace.
      fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        $(
          if trimmed.eq_ignore_ascii_case($canonical)
            $( || trimmed.eq_ignore_ascii_case($alias) )*
          {
            return Ok(Self::$variant);
          }
        )+
        Err(TypeError::InvalidEnumValue {
          enum_name: stringify!($name),
          value: value.to_owned(),
        })
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
      }
    }
  };
}

// ── DataFormat ────────────────────────────────────────────────────────

option_enum! {
  /// Which representations of the DATA segment to produce.
  ///
  /// ```text
  /// ┌──────────┬──────────────────────────────────────────┐
  /// │ Option   │ Result                                   │
  /// ├──────────┼──────────────────────────────────────────┤
  /// │ asNumber │ numeric matrix only                      │
  /// │ asString │ formatted row strings only (default)     │
  /// │ asBoth   │ both, filled in one pass                 │
  /// │ asNone   │ DATA segment is not decoded at all       │
  /// └──────────┴──────────────────────────────────────────┘
  /// ```
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
  pub enum DataFormat {
    AsNumber = "asNumber",
    #[default]
    AsString = "asString",
    AsBoth = "asBoth",
    AsNone = "asNone",
  }
}

impl DataFormat {
  #[must_use]
  pub fn wants_numbers(self) -> bool {
    matches!(self, Self::AsNumber | Self::AsBoth)
  }

  #[must_use]
  pub fn wants_strings(self) -> bool {
    matches!(self, Self::AsString | Self::AsBoth)
  }
}

// ── GroupBy ───────────────────────────────────────────────────────────

option_enum! {
  /// Row orientation of the decoded matrix.
  ///
  /// The file is always event-major on disk. `ByEvent` keeps that order,
  /// one row per event. `ByParam` transposes while reading, one row per
  /// parameter.
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
  pub enum GroupBy {
    #[default]
    ByEvent = "byEvent",
    ByParam = "byParam",
  }
}

// ── TextEncoding ──────────────────────────────────────────────────────

option_enum! {
  /// Character encoding used to turn TEXT/ANALYSIS bytes into strings.
  ///
  /// FCS keywords are ASCII; vendor values are occasionally Latin-1.
  /// `Utf8` decodes lossily, so stray high bytes become U+FFFD instead of
  /// failing the decode. `Latin1` maps every byte to the code point of the
  /// same value.
  #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
  pub enum TextEncoding {
    #[default]
    Utf8 = "utf8" | "utf-8",
    Latin1 = "latin1" | "iso-8859-1" | "binary" | "ascii",
  }
}

impl TextEncoding {
  /// Decode a segment's bytes.
  #[must_use]
  pub fn decode(self, bytes: &[u8]) -> String {
    match self {
      Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
      Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
    }
  }
}
