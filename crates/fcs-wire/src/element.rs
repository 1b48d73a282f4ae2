use crate::error::WireError;

/// Byte order of the DATA segment values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

/// Fixed-width numeric element stored in the DATA segment.
///
/// ```text
/// ┌──────┬───────┬────────────────────────────┐
/// │ Kind │ Width │ $DATATYPE / $PnB           │
/// ├──────┼───────┼────────────────────────────┤
/// │ U16  │ 2     │ I, $P1B <= 16              │
/// │ U32  │ 4     │ I, $P1B > 16               │
/// │ F32  │ 4     │ F                          │
/// │ F64  │ 8     │ D                          │
/// └──────┴───────┴────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    U16,
    U32,
    F32,
    F64,
}

impl ElementKind {
    /// Width of one element in bytes.
    #[must_use]
    pub fn width(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /// Integer elements render without a decimal point.
    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(self, Self::U16 | Self::U32)
    }

    /// Read one element at `offset`, widened to `f64`.
    ///
    /// Every supported kind converts to `f64` without loss, so the numeric
    /// matrix can hold a single element type.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if fewer than
    /// [`width`](Self::width) bytes remain at `offset`.
    pub fn read(self, buf: &[u8], offset: usize, order: ByteOrder) -> Result<f64, WireError> {
        let end = offset
            .checked_add(self.width())
            .ok_or(WireError::UnexpectedEof { offset })?;
        let bytes = buf
            .get(offset..end)
            .ok_or(WireError::UnexpectedEof { offset: buf.len() })?;

        let value = match (self, order) {
            (Self::U16, ByteOrder::BigEndian) => f64::from(u16::from_be_bytes(array(bytes))),
            (Self::U16, ByteOrder::LittleEndian) => f64::from(u16::from_le_bytes(array(bytes))),
            (Self::U32, ByteOrder::BigEndian) => f64::from(u32::from_be_bytes(array(bytes))),
            (Self::U32, ByteOrder::LittleEndian) => f64::from(u32::from_le_bytes(array(bytes))),
            (Self::F32, ByteOrder::BigEndian) => f64::from(f32::from_be_bytes(array(bytes))),
            (Self::F32, ByteOrder::LittleEndian) => f64::from(f32::from_le_bytes(array(bytes))),
            (Self::F64, ByteOrder::BigEndian) => f64::from_be_bytes(array(bytes)),
            (Self::F64, ByteOrder::LittleEndian) => f64::from_le_bytes(array(bytes)),
        };

        Ok(value)
    }
}

/// Copy a slice whose length was already checked into a fixed array.
fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
