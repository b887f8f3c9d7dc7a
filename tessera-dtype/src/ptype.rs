//! Physical type definitions and behavior.

use std::fmt::{Debug, Display, Formatter};

use bytes::{Buf, BufMut};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use num_traits::{Bounded, Num, NumCast, ToPrimitive};
use tessera_error::{TesseraError, TesseraResult, tessera_err};

/// Physical type enum, represents the in-memory physical layout of a coordinate value.
///
/// The discriminants are the persisted type tags. They are fixed by the on-disk format and are
/// deliberately not contiguous.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, IntoPrimitive, TryFromPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum PType {
    /// A signed 32-bit integer.
    I32 = 0,
    /// A signed 64-bit integer.
    I64 = 1,
    /// A 32-bit IEEE 754 float.
    F32 = 2,
    /// A 64-bit IEEE 754 float.
    F64 = 3,
    /// A signed 8-bit integer.
    I8 = 5,
    /// An unsigned 8-bit integer.
    U8 = 6,
    /// A signed 16-bit integer.
    I16 = 7,
    /// An unsigned 16-bit integer.
    U16 = 8,
    /// An unsigned 32-bit integer.
    U32 = 9,
    /// An unsigned 64-bit integer.
    U64 = 10,
}

/// A trait for native Rust types that correspond 1:1 to a PType.
pub trait NativePType:
    Send
    + Sync
    + Clone
    + Copy
    + Debug
    + Display
    + Default
    + PartialEq
    + PartialOrd
    + Num
    + NumCast
    + ToPrimitive
    + Bounded
    + 'static
{
    /// The PType that corresponds to this native type.
    const PTYPE: PType;

    /// Whether this instance (`self`) is NaN.
    /// For integer types, this is always `false`.
    fn is_nan(self) -> bool;

    /// Append the little-endian encoding of `self` to `buf`.
    fn write_le<B: BufMut>(self, buf: &mut B);

    /// Consume one little-endian value from `buf`.
    ///
    /// Callers must check that `buf` holds at least [`PType::byte_width`] bytes.
    fn read_le<B: Buf>(buf: &mut B) -> Self;
}

macro_rules! native_ptype {
    ($T:ty, $ptype:tt, $put:ident, $get:ident) => {
        impl NativePType for $T {
            const PTYPE: PType = PType::$ptype;

            #[inline]
            fn is_nan(self) -> bool {
                false
            }

            #[inline]
            fn write_le<B: BufMut>(self, buf: &mut B) {
                buf.$put(self);
            }

            #[inline]
            fn read_le<B: Buf>(buf: &mut B) -> Self {
                buf.$get()
            }
        }
    };
}

macro_rules! native_float_ptype {
    ($T:ty, $ptype:tt, $put:ident, $get:ident) => {
        impl NativePType for $T {
            const PTYPE: PType = PType::$ptype;

            #[inline]
            fn is_nan(self) -> bool {
                <$T>::is_nan(self)
            }

            #[inline]
            fn write_le<B: BufMut>(self, buf: &mut B) {
                buf.$put(self);
            }

            #[inline]
            fn read_le<B: Buf>(buf: &mut B) -> Self {
                buf.$get()
            }
        }
    };
}

native_ptype!(u8, U8, put_u8, get_u8);
native_ptype!(u16, U16, put_u16_le, get_u16_le);
native_ptype!(u32, U32, put_u32_le, get_u32_le);
native_ptype!(u64, U64, put_u64_le, get_u64_le);
native_ptype!(i8, I8, put_i8, get_i8);
native_ptype!(i16, I16, put_i16_le, get_i16_le);
native_ptype!(i32, I32, put_i32_le, get_i32_le);
native_ptype!(i64, I64, put_i64_le, get_i64_le);
native_float_ptype!(f32, F32, put_f32_le, get_f32_le);
native_float_ptype!(f64, F64, put_f64_le, get_f64_le);

/// Macro to match over each PType, binding the corresponding native type (from `NativePType`).
#[macro_export]
macro_rules! match_each_native_ptype {
    ($self:expr, | $tname:ident | $body:block) => {{
        use $crate::PType;
        match $self {
            PType::I8 => {
                type $tname = i8;
                $body
            }
            PType::I16 => {
                type $tname = i16;
                $body
            }
            PType::I32 => {
                type $tname = i32;
                $body
            }
            PType::I64 => {
                type $tname = i64;
                $body
            }
            PType::U8 => {
                type $tname = u8;
                $body
            }
            PType::U16 => {
                type $tname = u16;
                $body
            }
            PType::U32 => {
                type $tname = u32;
                $body
            }
            PType::U64 => {
                type $tname = u64;
                $body
            }
            PType::F32 => {
                type $tname = f32;
                $body
            }
            PType::F64 => {
                type $tname = f64;
                $body
            }
        }
    }};
}

impl PType {
    /// Returns the number of bytes in this PType
    pub const fn byte_width(&self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Decode a persisted type tag, rejecting tags outside the supported kinds.
    pub fn from_tag(tag: u8) -> TesseraResult<Self> {
        Self::try_from(tag).map_err(|_| tessera_err!(InvalidSerde: "unsupported type tag {}", tag))
    }

    /// The persisted type tag of this PType.
    pub fn tag(self) -> u8 {
        self.into()
    }
}

impl Display for PType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
        }
    }
}

impl TryFrom<&str> for PType {
    type Error = TesseraError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(match value {
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "f32" => Self::F32,
            "f64" => Self::F64,
            _ => return Err(tessera_err!("unknown ptype name {}", value)),
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(PType::I32, 0)]
    #[case(PType::I64, 1)]
    #[case(PType::F32, 2)]
    #[case(PType::F64, 3)]
    #[case(PType::I8, 5)]
    #[case(PType::U8, 6)]
    #[case(PType::I16, 7)]
    #[case(PType::U16, 8)]
    #[case(PType::U32, 9)]
    #[case(PType::U64, 10)]
    fn tags_are_stable(#[case] ptype: PType, #[case] tag: u8) {
        assert_eq!(ptype.tag(), tag);
        assert_eq!(PType::from_tag(tag).unwrap(), ptype);
    }

    #[rstest]
    #[case(4)]
    #[case(11)]
    #[case(255)]
    fn unsupported_tags_are_rejected(#[case] tag: u8) {
        assert!(matches!(
            PType::from_tag(tag),
            Err(TesseraError::InvalidSerde(..))
        ));
    }

    #[test]
    fn dispatch_binds_native_type() {
        for ptype in [PType::U8, PType::I16, PType::U64, PType::F32] {
            let width = match_each_native_ptype!(ptype, |T| { size_of::<T>() });
            assert_eq!(width, ptype.byte_width());
            let bound = match_each_native_ptype!(ptype, |T| { <T as NativePType>::PTYPE });
            assert_eq!(bound, ptype);
        }
    }

    #[test]
    fn little_endian_codec() {
        let mut buf = BytesMut::new();
        (-2i16).write_le(&mut buf);
        1.5f64.write_le(&mut buf);
        assert_eq!(&buf[..2], &[0xfe, 0xff]);

        let mut bytes = buf.freeze();
        assert_eq!(i16::read_le(&mut bytes), -2);
        assert_eq!(f64::read_le(&mut bytes), 1.5);
        assert!(!bytes.has_remaining());
    }

    #[test]
    fn nan_detection() {
        assert!(f32::NAN.is_nan());
        assert!(!NativePType::is_nan(3u32));
        assert!(!NativePType::is_nan(-0.0f64));
    }

    #[test]
    fn names_round_trip_through_display() {
        for ptype in [PType::U16, PType::I64, PType::F32] {
            assert_eq!(PType::try_from(ptype.to_string().as_str()).unwrap(), ptype);
        }
        assert!(PType::try_from("f16").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_names() {
        assert_eq!(serde_json::to_string(&PType::U16).unwrap(), "\"u16\"");
        assert_eq!(
            serde_json::from_str::<PType>("\"f64\"").unwrap(),
            PType::F64
        );
    }
}
