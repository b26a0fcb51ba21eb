//! Verification of Intel SGX/TDX DCAP ECDSA-P256 attestation quotes.
//!
//! This crate decodes a DCAP quote, checks its two embedded ECDSA-P256
//! signatures and the PCK certificate chain backing them, and evaluates
//! the platform's TCB and Quoting Enclave identity against caller-supplied
//! policy hooks. It issues no quotes, generates no keys, and owns no
//! network transport: `verify_sgx`/`verify_tdx` are pure functions over a
//! byte slice and a [`Config`], and perform no I/O or logging of their
//! own. See `VerifyHooks` for the seam where a caller plugs in collateral
//! lookup and acceptance policy.

pub mod cert;
pub mod collateral;
mod cursor;
mod ecdsa;
pub mod error;
pub mod qe_identity;
pub mod quote;
pub mod tcb;
mod verify;
mod verify_quote;
pub mod types;

#[cfg(feature = "reqwest")]
pub mod hooks;

#[cfg(test)]
mod test_support;

pub use error::VerifyError;
pub use quote::Quote;
pub use verify::{verify_sgx, verify_tdx, Config, TcbHookParams, VerifyHooks};
