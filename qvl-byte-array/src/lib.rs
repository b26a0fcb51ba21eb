//! The `ByteArray<N>` trait plus macros for defining fixed-size byte-array
//! newtypes (measurements, signatures, FMSPCs, ...) with consistent hex
//! `Display`/`Debug`/`FromStr` and zero-cost `&[u8; N] <-> &Self` casting.

use std::{
    array::TryFromSliceError,
    fmt::{self, Debug, Display},
    hash::Hash,
};

use qvl_hex::{FromHex, HexDisplay};
pub use ref_cast::RefCast;

/// A trait for types represented in memory as a byte array. Should NOT be
/// implemented for types that require validation of the byte array contents
/// (e.g. a public key that must lie on a curve) -- those should validate in
/// a fallible constructor instead and only use `ByteArray` for storage.
pub trait ByteArray<const N: usize>:
    Copy + Debug + Eq + Hash + RefCast<From = [u8; N]> + Sized
{
    // --- Required: array --- //

    fn from_array(array: [u8; N]) -> Self;
    fn to_array(&self) -> [u8; N];
    fn as_array(&self) -> &[u8; N];

    // --- Provided: array / slice / vec --- //

    fn from_array_ref(array: &[u8; N]) -> &Self {
        Self::ref_cast(array)
    }
    fn as_slice(&self) -> &[u8] {
        self.as_array().as_slice()
    }
    fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }
    fn try_from_slice(slice: &[u8]) -> Result<Self, TryFromSliceError> {
        <[u8; N]>::try_from(slice).map(Self::from_array)
    }
    fn try_from_vec(vec: Vec<u8>) -> Result<Self, TryFromSliceError> {
        Self::try_from_slice(&vec)
    }

    // --- Provided: hex --- //

    fn hex_display(&self) -> HexDisplay<'_> {
        qvl_hex::display(self.as_slice())
    }
    fn try_from_hexstr(s: &str) -> Result<Self, qvl_hex::DecodeError> {
        <[u8; N]>::from_hex(s).map(Self::from_array)
    }
    fn fmt_hexstr(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&qvl_hex::display(self.as_slice()), f)
    }
}

/// Implements `ByteArray<N>` for a `#[repr(transparent)]` tuple struct
/// wrapping a `[u8; N]`. The struct must separately `#[derive(RefCast)]`.
///
/// ```ignore
/// #[derive(Copy, Clone, Eq, PartialEq, Hash, RefCast)]
/// #[repr(transparent)]
/// pub struct Fmspc([u8; 6]);
/// qvl_byte_array::impl_byte_array!(Fmspc, 6);
/// ```
#[macro_export]
macro_rules! impl_byte_array {
    ($ty:ty, $n:expr) => {
        impl $crate::ByteArray<$n> for $ty {
            fn from_array(array: [u8; $n]) -> Self {
                Self(array)
            }
            fn to_array(&self) -> [u8; $n] {
                self.0
            }
            fn as_array(&self) -> &[u8; $n] {
                &self.0
            }
        }
    };
}

/// Implements `FromStr` and `TryFrom<&str>` in terms of `ByteArray::
/// try_from_hexstr`, so e.g. `"deadbeef".parse::<Fmspc>()` works.
#[macro_export]
macro_rules! impl_fromstr_fromhex {
    ($ty:ty, $n:expr) => {
        impl std::str::FromStr for $ty {
            type Err = $crate::QvlHexDecodeError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as $crate::ByteArray<$n>>::try_from_hexstr(s)
            }
        }
        impl std::convert::TryFrom<&str> for $ty {
            type Error = $crate::QvlHexDecodeError;
            fn try_from(s: &str) -> Result<Self, Self::Error> {
                <$ty as std::str::FromStr>::from_str(s)
            }
        }
    };
}

/// Implements `Debug` and `Display` for a `ByteArray` type as lowercase hex.
#[macro_export]
macro_rules! impl_debug_display_as_hex {
    ($ty:ty) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                $crate::ByteArray::fmt_hexstr(self, f)
            }
        }
        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($ty), $crate::ByteArray::hex_display(self))
            }
        }
    };
}

/// Re-exported under a stable name so the macros above don't need their
/// expansion site to have `qvl_hex` in scope.
pub type QvlHexDecodeError = qvl_hex::DecodeError;

#[cfg(feature = "serde")]
pub mod serde_hexstr {
    //! `serde::{Serialize, Deserialize}` via hex strings, for use with
    //! `#[serde(with = "qvl_byte_array::serde_hexstr")]` on a `ByteArray`
    //! field.
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use crate::ByteArray;

    pub fn serialize<const N: usize, T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: ByteArray<N>,
        S: Serializer,
    {
        if serializer.is_human_readable() {
            value.hex_display().to_string().serialize(serializer)
        } else {
            value.as_slice().serialize(serializer)
        }
    }

    pub fn deserialize<'de, const N: usize, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: ByteArray<N>,
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            T::try_from_hexstr(&s).map_err(de::Error::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            T::try_from_vec(bytes).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use ref_cast::RefCast;

    use super::*;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, RefCast)]
    #[repr(transparent)]
    struct TestArray([u8; 4]);

    impl_byte_array!(TestArray, 4);
    impl_fromstr_fromhex!(TestArray, 4);
    impl_debug_display_as_hex!(TestArray);

    #[test]
    fn hex_roundtrip() {
        let a = TestArray::from_array([0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(a.to_string(), "deadbeef");
        let b: TestArray = "deadbeef".parse().unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn array_roundtrip(bytes: [u8; 4]) {
            let a = TestArray::from_array(bytes);
            prop_assert_eq!(a.to_array(), bytes);
            let s = a.to_string();
            let b: TestArray = s.parse().unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
