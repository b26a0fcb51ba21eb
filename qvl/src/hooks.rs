//! Reference, non-core collateral-fetch hook.
//!
//! Behind the off-by-default `reqwest` cargo feature: fetches `TcbInfo`
//! and `QeIdentity` collateral from Intel's Trusted Services API. This
//! module is a caller, never invoked by [`crate::verify_sgx`]/
//! [`crate::verify_tdx`] directly -- an application wires it into a
//! [`crate::VerifyHooks`] impl if it wants Intel's live collateral instead
//! of a custom source, keeping the attestation verifier itself
//! transport-agnostic while a separate layer owns the actual HTTP client
//! plumbing.

use crate::{
    collateral::{QeIdentityEnvelope, TcbInfoEnvelope},
    error::{CollateralKind, VerifyError},
};

const SGX_BASE: &str = "https://api.trustedservices.intel.com/sgx/certification/v4";
const TDX_BASE: &str = "https://api.trustedservices.intel.com/tdx/certification/v4";

/// Fetches `TcbInfo` collateral for `fmspc` (a 12-character lowercase hex
/// string) from Intel's SGX or TDX certification endpoint.
pub async fn fetch_tcb_info(
    client: &reqwest::Client,
    fmspc: &str,
    is_tdx: bool,
) -> Result<TcbInfoEnvelope, VerifyError> {
    let base = if is_tdx { TDX_BASE } else { SGX_BASE };
    let url = format!("{base}/tcb?fmspc={fmspc}");
    tracing::debug!(%url, "fetching tcb info");

    let resp = client.get(&url).send().await.map_err(|e| {
        tracing::warn!(%url, error = %e, "tcb info request failed");
        VerifyError::CollateralUnavailable {
            kind: CollateralKind::TcbInfo,
            cause: e.to_string(),
        }
    })?;

    let resp = resp.error_for_status().map_err(|e| {
        tracing::warn!(%url, error = %e, "tcb info request returned an error status");
        VerifyError::CollateralUnavailable {
            kind: CollateralKind::TcbInfo,
            cause: e.to_string(),
        }
    })?;

    resp.json::<TcbInfoEnvelope>().await.map_err(|e| {
        tracing::warn!(%url, error = %e, "tcb info response failed to deserialize");
        VerifyError::CollateralUnavailable {
            kind: CollateralKind::TcbInfo,
            cause: e.to_string(),
        }
    })
}

/// Fetches the current `QeIdentity` collateral from Intel's SGX or TDX
/// certification endpoint.
pub async fn fetch_qe_identity(
    client: &reqwest::Client,
    is_tdx: bool,
) -> Result<QeIdentityEnvelope, VerifyError> {
    let base = if is_tdx { TDX_BASE } else { SGX_BASE };
    let url = format!("{base}/qe/identity");
    tracing::debug!(%url, "fetching qe identity");

    let resp = client.get(&url).send().await.map_err(|e| {
        tracing::warn!(%url, error = %e, "qe identity request failed");
        VerifyError::CollateralUnavailable {
            kind: CollateralKind::QeIdentity,
            cause: e.to_string(),
        }
    })?;

    let resp = resp.error_for_status().map_err(|e| {
        tracing::warn!(%url, error = %e, "qe identity request returned an error status");
        VerifyError::CollateralUnavailable {
            kind: CollateralKind::QeIdentity,
            cause: e.to_string(),
        }
    })?;

    resp.json::<QeIdentityEnvelope>().await.map_err(|e| {
        tracing::warn!(%url, error = %e, "qe identity response failed to deserialize");
        VerifyError::CollateralUnavailable {
            kind: CollateralKind::QeIdentity,
            cause: e.to_string(),
        }
    })
}
