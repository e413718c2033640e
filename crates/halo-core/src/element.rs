//! The closed set of numeric element types the exchange can move.
//!
//! | Rust type | [`ElementKind`] | Bytes |
//! |-----------|-----------------|-------|
//! | `f32`     | `F32`           | 4     |
//! | `f64`     | `F64`           | 8     |
//! | `i8`      | `I8`            | 1     |
//! | `i16`     | `I16`           | 2     |
//! | `i32`     | `I32`           | 4     |
//! | `i64`     | `I64`           | 8     |
//! | `u8`      | `U8`            | 1     |
//! | `u16`     | `U16`           | 2     |
//! | `u32`     | `U32`           | 4     |
//! | `u64`     | `U64`           | 8     |
//!
//! Transfer code is written once, generic over [`Element`], and
//! instantiated per kind through [`dispatch_element!`](crate::dispatch_element).
//! The runtime branch happens once per array, never per element.

use std::fmt;

use crate::array::ArrayData;

mod sealed {
    pub trait Sealed {}
}

/// Runtime tag of a numeric element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
}

impl ElementKind {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F64 | Self::I64 | Self::U64 => 8,
        }
    }

    /// Rust name of the element type.
    pub fn name(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A numeric type that can be packed into a message and unpacked on the
/// other side.
///
/// Sealed: the set of kinds is closed. Encoding is little-endian on every
/// platform.
pub trait Element: sealed::Sealed + Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Runtime tag for this type.
    const KIND: ElementKind;

    /// Encoded size in bytes.
    const SIZE: usize;

    /// Append the little-endian encoding of `values` to `out`.
    fn encode(values: &[Self], out: &mut Vec<u8>);

    /// Decode `bytes` into `dst`. `bytes.len()` must equal `dst.len() * SIZE`.
    fn decode(bytes: &[u8], dst: &mut [Self]);

    /// Borrow the values of `data` if it holds this element type.
    fn slice(data: &ArrayData) -> Option<&[Self]>;

    /// Mutably borrow the values of `data` if it holds this element type.
    fn slice_mut(data: &mut ArrayData) -> Option<&mut [Self]>;

    /// Wrap owned values in the matching [`ArrayData`] variant.
    fn wrap(values: Vec<Self>) -> ArrayData;
}

macro_rules! impl_element {
    ($ty:ty, $kind:ident) => {
        impl sealed::Sealed for $ty {}

        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$kind;
            const SIZE: usize = std::mem::size_of::<$ty>();

            fn encode(values: &[Self], out: &mut Vec<u8>) {
                out.reserve(values.len() * Self::SIZE);
                for v in values {
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }

            fn decode(bytes: &[u8], dst: &mut [Self]) {
                debug_assert_eq!(bytes.len(), dst.len() * Self::SIZE);
                for (d, chunk) in dst.iter_mut().zip(bytes.chunks_exact(Self::SIZE)) {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    buf.copy_from_slice(chunk);
                    *d = <$ty>::from_le_bytes(buf);
                }
            }

            fn slice(data: &ArrayData) -> Option<&[Self]> {
                match data {
                    ArrayData::$kind(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            fn slice_mut(data: &mut ArrayData) -> Option<&mut [Self]> {
                match data {
                    ArrayData::$kind(v) => Some(v.as_mut_slice()),
                    _ => None,
                }
            }

            fn wrap(values: Vec<Self>) -> ArrayData {
                ArrayData::$kind(values)
            }
        }
    };
}

impl_element!(f32, F32);
impl_element!(f64, F64);
impl_element!(i8, I8);
impl_element!(i16, I16);
impl_element!(i32, I32);
impl_element!(i64, I64);
impl_element!(u8, U8);
impl_element!(u16, U16);
impl_element!(u32, U32);
impl_element!(u64, U64);

/// Run `$body` with `$T` bound to the Rust type matching an [`ElementKind`].
///
/// ```
/// use halo_core::{dispatch_element, Element, ElementKind};
///
/// fn width<T: Element>() -> usize { T::SIZE }
///
/// let kind = ElementKind::I16;
/// let bytes = dispatch_element!(kind, T => width::<T>());
/// assert_eq!(bytes, 2);
/// ```
#[macro_export]
macro_rules! dispatch_element {
    ($kind:expr, $T:ident => $body:expr) => {
        match $kind {
            $crate::ElementKind::F32 => {
                type $T = f32;
                $body
            }
            $crate::ElementKind::F64 => {
                type $T = f64;
                $body
            }
            $crate::ElementKind::I8 => {
                type $T = i8;
                $body
            }
            $crate::ElementKind::I16 => {
                type $T = i16;
                $body
            }
            $crate::ElementKind::I32 => {
                type $T = i32;
                $body
            }
            $crate::ElementKind::I64 => {
                type $T = i64;
                $body
            }
            $crate::ElementKind::U8 => {
                type $T = u8;
                $body
            }
            $crate::ElementKind::U16 => {
                type $T = u16;
                $body
            }
            $crate::ElementKind::U32 => {
                type $T = u32;
                $body
            }
            $crate::ElementKind::U64 => {
                type $T = u64;
                $body
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_kinds() {
        fn check<T: Element>() {
            assert_eq!(T::SIZE, T::KIND.size(), "{}", T::KIND);
        }
        check::<f32>();
        check::<f64>();
        check::<i8>();
        check::<i16>();
        check::<i32>();
        check::<i64>();
        check::<u8>();
        check::<u16>();
        check::<u32>();
        check::<u64>();
    }

    #[test]
    fn encoding_is_little_endian() {
        let mut out = Vec::new();
        u32::encode(&[0x0403_0201], &mut out);
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn decode_restores_negative_and_fractional_values() {
        let values = [-1.5f64, 0.0, 2.25e10];
        let mut bytes = Vec::new();
        f64::encode(&values, &mut bytes);
        let mut back = [0.0f64; 3];
        f64::decode(&bytes, &mut back);
        assert_eq!(back, values);

        let ints = [i16::MIN, -1, i16::MAX];
        let mut bytes = Vec::new();
        i16::encode(&ints, &mut bytes);
        let mut back = [0i16; 3];
        i16::decode(&bytes, &mut back);
        assert_eq!(back, ints);
    }

    #[test]
    fn slice_matches_only_own_variant() {
        let data = ArrayData::I32(vec![1, 2, 3]);
        assert_eq!(i32::slice(&data), Some(&[1, 2, 3][..]));
        assert!(f32::slice(&data).is_none());
        assert!(u32::slice(&data).is_none());
    }

    #[test]
    fn dispatch_selects_type() {
        fn kind_of<T: Element>() -> ElementKind {
            T::KIND
        }
        for kind in [ElementKind::F32, ElementKind::U8, ElementKind::I64] {
            assert_eq!(crate::dispatch_element!(kind, T => kind_of::<T>()), kind);
        }
    }
}
