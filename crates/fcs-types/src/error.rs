/// Errors raised while interpreting TEXT/ANALYSIS keyword segments and
/// option values.
///
/// These sit one level above `fcs_wire::WireError`: the bytes were read fine,
/// but what they say cannot be used to plan a decode.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                                  │
/// │   ├── MalformedSegment      keyword without a value     │
/// │   ├── UnsupportedByteOrder  $BYTEORD not 1,2,.. / ..,2,1│
/// │   ├── UnsupportedDataType   $DATATYPE not I, F or D     │
/// │   ├── MissingKeyword        required keyword absent     │
/// │   ├── InvalidKeyword        keyword value not a number  │
/// │   └── InvalidEnumValue      unknown option value        │
/// └─────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
  /// The segment's key/value structure could not be recovered.
  #[error("malformed segment: {reason}")]
  MalformedSegment { reason: String },

  /// `$BYTEORD` is neither ascending nor descending significance.
  #[error("unsupported $BYTEORD: {value:?}")]
  UnsupportedByteOrder { value: String },

  /// `$DATATYPE` names an element kind this decoder cannot read
  /// (ASCII `A` data, for example).
  #[error("unsupported $DATATYPE: {value:?}")]
  UnsupportedDataType { value: String },

  /// A keyword required to plan the decode is absent.
  #[error("missing required keyword {keyword}")]
  MissingKeyword { keyword: String },

  /// A keyword is present but its value is not usable.
  #[error("keyword {keyword} has invalid value {value:?}")]
  InvalidKeyword { keyword: String, value: String },

  /// An option value did not match any known variant.
  #[error("invalid {enum_name} value: {value:?}")]
  InvalidEnumValue { enum_name: &'static str, value: String },
}
