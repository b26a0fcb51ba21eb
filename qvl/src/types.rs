//! Fixed-size byte-array newtypes for the quantities that show up while
//! parsing and verifying quotes. Built on [`qvl_byte_array::ByteArray`] so
//! each type gets consistent hex `Display`/`Debug`/`FromStr`/serde for free.

use qvl_byte_array::{impl_byte_array, impl_debug_display_as_hex, impl_fromstr_fromhex, RefCast};

macro_rules! byte_array_newtype {
    ($(#[$meta:meta])* $name:ident, $n:expr) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, RefCast)]
        #[repr(transparent)]
        pub struct $name(pub [u8; $n]);

        impl_byte_array!($name, $n);
        impl_fromstr_fromhex!($name, $n);
        impl_debug_display_as_hex!($name);

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                qvl_byte_array::serde_hexstr::serialize(self, s)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                qvl_byte_array::serde_hexstr::deserialize(d)
            }
        }
    };
}

byte_array_newtype!(
    /// Family-Model-Stepping-Platform-Customization code identifying a
    /// platform class for TCB lookup.
    Fmspc,
    6
);

byte_array_newtype!(
    /// 16-byte vector of per-component Security Version Numbers.
    CpuSvn,
    16
);

byte_array_newtype!(
    /// SGX enclave measurement (`MRENCLAVE`).
    MrEnclave,
    32
);

byte_array_newtype!(
    /// SGX enclave signer measurement (`MRSIGNER`).
    MrSigner,
    32
);

byte_array_newtype!(
    /// A 48-byte TDX measurement register (`mr_td`, `mr_seam`, `rtmr0..3`, ...).
    Measurement48,
    48
);

byte_array_newtype!(
    /// 64-byte report data field, bound by the enclave/TD to caller-chosen
    /// data (commonly a public-key hash).
    ReportData,
    64
);

byte_array_newtype!(
    /// A raw `r ‖ s` ECDSA-P256 signature, as embedded in a quote.
    EcdsaSig64,
    64
);

byte_array_newtype!(
    /// An uncompressed ECDSA-P256 public key in raw `x ‖ y` form (64 bytes,
    /// no `0x04` prefix).
    AttestationPublicKey,
    64
);

byte_array_newtype!(
    /// The Quoting Enclave vendor UUID.
    QeVendorId,
    16
);
