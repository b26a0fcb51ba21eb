//! The error taxonomy for quote verification.
//!
//! Every fallible core operation returns a [`VerifyError`]. The variants are
//! ordered the way the verification pipeline runs: the first stage that
//! fails is the one reported, and nothing downstream is attempted.

use thiserror::Error;

/// Which of the two quote-internal ECDSA signatures failed to verify.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SignatureStage {
    /// The attestation key's signature over the signed region (header ‖
    /// body, or header ‖ body descriptor ‖ body for TDX v1.5).
    Attestation,
    /// The PCK leaf's signature over the QE report.
    QeReport,
}

impl std::fmt::Display for SignatureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attestation => f.write_str("attestation"),
            Self::QeReport => f.write_str("qe_report"),
        }
    }
}

/// Failures while building or validating the PCK certificate chain.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("certificate chain is missing a link (issuer not found among supplied certs)")]
    Incomplete,
    #[error("chain root does not match any pinned root certificate")]
    UntrustedRoot,
    #[error("a certificate in the chain is outside its validity window")]
    Expired,
    #[error("a certificate in the chain's serial number appears on a supplied CRL")]
    Revoked,
    #[error("a certificate's signature failed to verify against its issuer's public key")]
    BadSignature,
    #[error("terminal certificate is not self-signed (issuer != subject)")]
    NotSelfSignedRoot,
    #[error("certificate could not be parsed: {0}")]
    Unparsable(String),
}

/// Which collateral document a reference hook failed to fetch.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CollateralKind {
    TcbInfo,
    QeIdentity,
}

impl std::fmt::Display for CollateralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TcbInfo => f.write_str("tcb_info"),
            Self::QeIdentity => f.write_str("qe_identity"),
        }
    }
}

/// The top-level error type returned by `verify_sgx`/`verify_tdx` and the
/// components they're built from.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The quote's bytes could not be decoded at all.
    #[error("malformed quote: {reason}")]
    MalformedQuote { reason: String },

    /// The quote decoded fine but uses a combination of version / TEE type /
    /// attestation key type / cert data type this library doesn't support.
    #[error(
        "unsupported quote (version={version}, tee_type={tee_type:#x}, \
         att_key_type={att_key_type}, cert_data_type={cert_data_type})"
    )]
    UnsupportedQuote {
        version: u16,
        tee_type: u32,
        att_key_type: u16,
        cert_data_type: u16,
    },

    /// The PCK certificate chain failed to build or validate.
    #[error("certificate chain error: {0}")]
    ChainError(#[from] ChainError),

    /// One of the two quote-internal ECDSA signatures didn't verify.
    #[error("signature mismatch at stage: {stage}")]
    SignatureMismatch { stage: SignatureStage },

    /// The attestation-key-to-QE-report binding (SHA256(pubkey ‖ auth_data))
    /// doesn't match the QE report's `report_data`.
    #[error("attestation key is not bound to the quoting enclave report")]
    ReportDataBindingFailed,

    /// The caller's `verify_qe_identity` hook rejected the QE report.
    #[error("QE identity rejected: {detail}")]
    QeIdentityRejected { detail: String },

    /// The caller's `verify_tcb` hook rejected the platform's TCB level.
    #[error("TCB rejected (status={status}, fresh={fresh})")]
    TcbRejected { status: String, fresh: bool },

    /// Raised only by the optional reference collateral-fetch hook, never
    /// by the core verification pipeline.
    #[error("collateral unavailable ({kind}): {cause}")]
    CollateralUnavailable {
        kind: CollateralKind,
        cause: String,
    },
}

impl VerifyError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedQuote {
            reason: reason.into(),
        }
    }
}
