//! Verify orchestrator: composes the decoder, chain layer, quote signature
//! verifier, QE identity evaluator, and TCB evaluator into two entry points,
//! `verify_sgx` and `verify_tdx`.
//!
//! The core performs no I/O and no logging of its own; collateral lookup
//! and policy decisions are delegated to a caller-supplied [`VerifyHooks`]
//! impl, keeping the signature pipeline itself separate from the policy
//! record the caller controls.

use std::sync::LazyLock;

use crate::{
    cert::{
        chain::{verify_pck_chain, ChainOptions},
        Cert,
    },
    error::VerifyError,
    quote::{body::Body, Quote},
    types::Fmspc,
    verify_quote,
};

/// The Intel SGX Root CA certificate, PEM-encoded. Used as the implicit
/// pinned root when [`Config::pinned_root_certs`] is `None`.
///
/// From: <https://certificates.trustedservices.intel.com/IntelSGXRootCA.pem>
const INTEL_SGX_ROOT_CA_PEM: &str = "-----BEGIN CERTIFICATE-----
MIICjzCCAjSgAwIBAgIUImUM1lqdNInzg7SVUr9QGzknBqwwCgYIKoZIzj0EAwIw
aDEaMBgGA1UEAwwRSW50ZWwgU0dYIFJvb3QgQ0ExGjAYBgNVBAoMEUludGVsIENv
cnBvcmF0aW9uMRQwEgYDVQQHDAtTYW50YSBDbGFyYTELMAkGA1UECAwCQ0ExCzAJ
BgNVBAYTAlVTMB4XDTE4MDUyMTEwNDExMVoXDTMzMDUyMTEwNDExMFowaDEaMBgG
A1UEAwwRSW50ZWwgU0dYIFJvb3QgQ0ExGjAYBgNVBAoMEUludGVsIENvcnBvcmF0
aW9uMRQwEgYDVQQHDAtTYW50YSBDbGFyYTELMAkGA1UECAwCQ0ExCzAJBgNVBAYT
AlVTMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEC6nEwMDIYZOj/iPWsCzaEKi7
1OiOSLRFhWGjbnBVJfVnkY4u3IjkDYYL0MxO4mqsyYjlBalTVYxFP2sJBK5zlKOB
uzCBuDAfBgNVHSMEGDAWgBQiZQzWWp00ifODtJVSv1AbOScGrDBSBgNVHR8ESzBJ
MEegRaBDhkFodHRwczovL2NlcnRpZmljYXRlcy50cnVzdGVkc2VydmljZXMuaW50
ZWwuY29tL0ludGVsU0dYUm9vdENBLmNybDAdBgNVHQ4EFgQUImUM1lqdNInzg7SV
Ur9QGzknBqwwDgYDVR0PAQH/BAQDAgEGMBIGA1UdEwEB/wQIMAYBAf8CAQEwCgYI
KoZIzj0EAwIDSQAwRgIhAIpQ/KdMQPcbdLTq3ug17QPoGo3bILKQN8r0XiajmKOJ
AiEA3e5tYNTqoTasDpKQJ4dWqkWVyCUsKgVLfHUELxOCLjY=
-----END CERTIFICATE-----";

/// Lazily computed so a bad embedded constant fails loudly at first use
/// rather than silently at link time.
static DEFAULT_PINNED_ROOT: LazyLock<qvl_sha256::Hash> = LazyLock::new(|| {
    Cert::from_pem(INTEL_SGX_ROOT_CA_PEM)
        .expect("embedded Intel SGX root CA PEM must parse")
        .sha256()
});

/// The caller-chosen inputs to the TCB evaluator, passed to
/// [`VerifyHooks::verify_tcb`] so the caller can fetch the matching
/// `TcbInfo` collateral and run [`crate::tcb::evaluate`] (or a custom
/// policy) against it.
pub struct TcbHookParams<'a> {
    pub fmspc: Fmspc,
    pub cpu_svn: [u8; 16],
    pub pce_svn: u16,
    pub quote: &'a Quote,
}

/// Caller-supplied policy seams for QE identity and TCB evaluation. Modeled
/// as a trait rather than boxed closures so both a synchronous in-process
/// policy and the reference async collateral-fetch hook can implement the
/// same interface.
pub trait VerifyHooks {
    /// Evaluates the Quoting Enclave's own report against QE Identity
    /// collateral. Returning `false` aborts verification with
    /// [`VerifyError::QeIdentityRejected`].
    fn verify_qe_identity(&self, qe_report: &crate::quote::body::SgxReportBody) -> bool;

    /// Evaluates the platform's TCB level against TCB Info collateral.
    /// Returning `false` aborts verification with
    /// [`VerifyError::TcbRejected`].
    fn verify_tcb(&self, params: TcbHookParams) -> bool;
}

/// Configuration for a single `verify_sgx`/`verify_tdx` call. A plain
/// struct of borrowed slices: explicit, non-generic configuration over an
/// option bag.
pub struct Config<'a> {
    /// Evaluation time for all temporal checks (cert validity, collateral
    /// freshness).
    pub date: time::OffsetDateTime,
    /// DER-encoded CRL blobs consulted during chain verification.
    pub crls: &'a [Vec<u8>],
    /// If present, the chain's root must SHA-256-match one of these.
    /// Otherwise the embedded Intel SGX Root CA is the implicit pin.
    pub pinned_root_certs: Option<&'a [qvl_sha256::Hash]>,
    /// Additional PEM certificates appended to the chain's candidate set,
    /// for quotes whose inline `cert_data` is an incomplete chain.
    pub extra_cert_data: &'a [String],
    pub hooks: &'a dyn VerifyHooks,
}

/// Verifies an SGX quote: decode → signature pipeline → `verify_qe_identity`
/// hook → `verify_tcb` hook.
pub fn verify_sgx(bytes: &[u8], config: &Config) -> Result<(), VerifyError> {
    let quote = Quote::decode(bytes)?;
    if !quote.is_sgx() {
        return Err(VerifyError::UnsupportedQuote {
            version: quote.header.version,
            tee_type: quote.header.tee_type,
            att_key_type: quote.header.att_key_type,
            cert_data_type: quote.signature.cert_data_type,
        });
    }
    verify_decoded(&quote, config)
}

/// Verifies a TDX quote (v1.0 or v1.5 TD report): decode → signature
/// pipeline → `verify_qe_identity` hook → `verify_tcb` hook.
///
/// The TDX body's `report_data` field is opaque to this library; binding
/// it to an application-level key is the caller's responsibility.
pub fn verify_tdx(bytes: &[u8], config: &Config) -> Result<(), VerifyError> {
    let quote = Quote::decode(bytes)?;
    if !quote.is_tdx() {
        return Err(VerifyError::UnsupportedQuote {
            version: quote.header.version,
            tee_type: quote.header.tee_type,
            att_key_type: quote.header.att_key_type,
            cert_data_type: quote.signature.cert_data_type,
        });
    }
    verify_decoded(&quote, config)
}

fn verify_decoded(quote: &Quote, config: &Config) -> Result<(), VerifyError> {
    // Build and verify the PCK certificate chain.
    let mut pems = quote.signature.pck_chain_pems();
    pems.extend(config.extra_cert_data.iter().cloned());

    let pinned_root_certs = config
        .pinned_root_certs
        .unwrap_or_else(|| std::slice::from_ref(&*DEFAULT_PINNED_ROOT));
    let chain_opts = ChainOptions {
        date: config.date,
        crls: config.crls,
        pinned_root_certs: Some(pinned_root_certs),
    };
    let chain = verify_pck_chain(&pems, &chain_opts)?;
    let pck_leaf = chain.first().ok_or(crate::error::ChainError::Incomplete)?;

    // Verify the attestation key's signature, the QE report's signature, and
    // the attestation-key-to-QE-report binding.
    verify_quote::verify(quote, pck_leaf)?;

    if !config.hooks.verify_qe_identity(&quote.signature.qe_report) {
        return Err(VerifyError::QeIdentityRejected {
            detail: "caller's QE identity policy rejected the quoting enclave's report".into(),
        });
    }

    // Extract the platform's SVN inputs from the PCK leaf's custom
    // extension and (for TDX) the body's `tee_tcb_svn`.
    let pck_ext = pck_leaf
        .pck_extension()?
        .ok_or_else(|| VerifyError::malformed("PCK leaf is missing the Intel SGX extension"))?;

    let (cpu_svn, is_tdx) = match &quote.body {
        Body::Sgx(_) => (pck_ext.cpusvn.0, false),
        Body::TdxV10(_) | Body::TdxV15(_) => {
            let tee_tcb_svn = quote
                .body
                .tee_tcb_svn()
                .expect("tdx body always has a tee_tcb_svn");
            (*tee_tcb_svn, true)
        }
    };

    let params = TcbHookParams {
        fmspc: pck_ext.fmspc,
        cpu_svn,
        pce_svn: pck_ext.pcesvn,
        quote,
    };
    if !config.hooks.verify_tcb(params) {
        return Err(VerifyError::TcbRejected {
            status: "rejected by caller's verify_tcb hook".into(),
            fresh: false,
        });
    }

    Ok(())
}
