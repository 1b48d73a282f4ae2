//! Standard TEXT keyword names and the interpretation of the ones that
//! describe the DATA layout.

use fcs_wire::{ByteOrder, ElementKind};

use crate::error::TypeError;

pub const BYTEORD: &str = "$BYTEORD";
pub const DATATYPE: &str = "$DATATYPE";
pub const MODE: &str = "$MODE";
pub const PAR: &str = "$PAR";
pub const TOT: &str = "$TOT";
pub const BEGINDATA: &str = "$BEGINDATA";
pub const ENDDATA: &str = "$ENDDATA";
pub const BEGINANALYSIS: &str = "$BEGINANALYSIS";
pub const ENDANALYSIS: &str = "$ENDANALYSIS";

/// `$MODE` value of the obsolete histogram layout. Files in this mode have
/// no event-major DATA segment to decode.
pub const MODE_HISTOGRAM: &str = "H";

/// Bit width above which integer data is stored as 4-byte words.
const SHORT_INTEGER_BITS: u32 = 16;

/// Name of a per-parameter keyword, e.g. `parameter(3, "N")` is `$P3N`.
/// Parameters are numbered from 1.
#[must_use]
pub fn parameter(index: usize, suffix: &str) -> String {
    format!("$P{index}{suffix}")
}

/// Interpret `$BYTEORD`.
///
/// The value lists byte significance positions, comma separated. `1,2,3,4`
/// (ascending from 1) is little-endian, `4,3,2,1` (descending to 1) is
/// big-endian, at any width. Mixed orders such as `3,4,1,2` are rejected.
///
/// # Errors
///
/// Returns [`TypeError::UnsupportedByteOrder`] for anything else.
pub fn parse_byte_order(value: &str) -> Result<ByteOrder, TypeError> {
    let unsupported = || TypeError::UnsupportedByteOrder {
        value: value.to_owned(),
    };

    let positions = value
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| unsupported())?;

    let n = positions.len();
    if n == 0 {
        return Err(unsupported());
    }

    if positions.iter().enumerate().all(|(i, &p)| p == i + 1) {
        Ok(ByteOrder::LittleEndian)
    } else if positions.iter().enumerate().all(|(i, &p)| p == n - i) {
        Ok(ByteOrder::BigEndian)
    } else {
        Err(unsupported())
    }
}

/// Interpret `$DATATYPE`, consulting `$P1B` for integer data.
///
/// A missing or non-numeric `$P1B` counts as 16 bits.
///
/// # Errors
///
/// Returns [`TypeError::UnsupportedDataType`] for anything but `I`, `F`
/// or `D`.
pub fn element_kind(datatype: &str, p1_bits: Option<&str>) -> Result<ElementKind, TypeError> {
    match datatype.trim() {
        "D" => Ok(ElementKind::F64),
        "F" => Ok(ElementKind::F32),
        "I" => {
            let bits = p1_bits
                .and_then(|b| b.trim().parse::<u32>().ok())
                .unwrap_or(SHORT_INTEGER_BITS);
            if bits > SHORT_INTEGER_BITS {
                Ok(ElementKind::U32)
            } else {
                Ok(ElementKind::U16)
            }
        }
        _ => Err(TypeError::UnsupportedDataType {
            value: datatype.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_keyword_names() {
        assert_eq!(parameter(1, "N"), "$P1N");
        assert_eq!(parameter(12, "B"), "$P12B");
    }

    #[test]
    fn byte_order_four_bytes() {
        assert_eq!(parse_byte_order("4,3,2,1").unwrap(), ByteOrder::BigEndian);
        assert_eq!(parse_byte_order("1,2,3,4").unwrap(), ByteOrder::LittleEndian);
    }

    #[test]
    fn byte_order_other_widths_and_spacing() {
        assert_eq!(parse_byte_order("2,1").unwrap(), ByteOrder::BigEndian);
        assert_eq!(parse_byte_order(" 1, 2 ").unwrap(), ByteOrder::LittleEndian);
        assert_eq!(
            parse_byte_order("8,7,6,5,4,3,2,1").unwrap(),
            ByteOrder::BigEndian
        );
    }

    #[test]
    fn reject_mixed_byte_order() {
        for value in ["3,4,1,2", "", "big", "4,3,2", "0,1"] {
            assert!(
                matches!(
                    parse_byte_order(value),
                    Err(TypeError::UnsupportedByteOrder { .. })
                ),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn element_kinds() {
        assert_eq!(element_kind("D", None).unwrap(), ElementKind::F64);
        assert_eq!(element_kind("F", None).unwrap(), ElementKind::F32);
        assert_eq!(element_kind("I", Some("16")).unwrap(), ElementKind::U16);
        assert_eq!(element_kind("I", Some("32")).unwrap(), ElementKind::U32);
        assert_eq!(element_kind("I", Some("24")).unwrap(), ElementKind::U32);
        assert_eq!(element_kind("I", Some("10")).unwrap(), ElementKind::U16);
    }

    #[test]
    fn integer_width_without_bits_keyword() {
        assert_eq!(element_kind("I", None).unwrap(), ElementKind::U16);
        assert_eq!(element_kind("I", Some("*")).unwrap(), ElementKind::U16);
    }

    #[test]
    fn reject_ascii_datatype() {
        let err = element_kind("A", None).unwrap_err();
        assert!(matches!(err, TypeError::UnsupportedDataType { ref value } if value == "A"));
    }
}
