//! Quote signature verifier: turns a decoded [`Quote`] plus its cert chain
//! into a proof that the attestation key's signature, the QE report's
//! signature, and the attestation-key-to-QE-report binding all check out.

use qvl_sha256::digest_many;

use crate::{
    cert::Cert,
    ecdsa,
    error::{SignatureStage, VerifyError},
    quote::Quote,
};

/// Runs the last three steps of the pipeline: signed-region extraction
/// already happened during decoding, and chain verification is the
/// caller's job via [`crate::cert::chain::verify_pck_chain`] before calling
/// this.
pub fn verify(quote: &Quote, pck_leaf: &Cert) -> Result<(), VerifyError> {
    // Step 3: attestation key signs the signed region.
    let h1_ok = ecdsa::verify_raw(
        quote.signature.attestation_public_key.as_slice(),
        &quote.signed_region,
        quote.signature.ecdsa_signature.as_slice(),
    )
    .is_ok();
    if !h1_ok {
        return Err(VerifyError::SignatureMismatch {
            stage: SignatureStage::Attestation,
        });
    }

    // Step 4: PCK leaf signs the QE report. The quote carries this
    // signature in raw form, but `Cert::ecdsa_verify` takes DER, so we
    // convert via `ecdsa::raw_to_der` before calling into a cert-layer
    // verifier built around DER signatures.
    let mut qe_report_bytes = Vec::new();
    quote.signature.qe_report.encode(&mut qe_report_bytes);
    let qe_sig_der = ecdsa::raw_to_der(quote.signature.qe_report_signature.as_slice())?;
    pck_leaf
        .ecdsa_verify(&qe_report_bytes, &qe_sig_der)
        .map_err(|_| VerifyError::SignatureMismatch {
            stage: SignatureStage::QeReport,
        })?;

    // Step 5: attestation key is bound to the QE report's report_data.
    let binding = digest_many(&[
        quote.signature.attestation_public_key.as_slice(),
        &quote.signature.qe_auth_data,
    ]);
    let report_data = quote.signature.qe_report.report_data.as_slice();
    if report_data[..32] != *binding.as_ref() || report_data[32..] != [0u8; 32] {
        return Err(VerifyError::ReportDataBindingFailed);
    }

    Ok(())
}
