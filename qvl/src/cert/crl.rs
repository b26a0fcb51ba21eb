//! Minimal CRL handling: parse a DER certificate revocation list down to
//! its revoked serial numbers. Full CRL issuer-signature verification is
//! explicitly out of scope; we only need the revoked-serials list to
//! cross-check chain members.

use x509_parser::revocation_list::CertificateRevocationList;

use crate::error::ChainError;

/// Parses a DER CRL and returns the revoked serial numbers (raw bytes, as
/// they appear in each certificate's own serial number field).
pub fn revoked_serials(der: &[u8]) -> Result<Vec<Vec<u8>>, ChainError> {
    let (_, crl) = CertificateRevocationList::from_der(der)
        .map_err(|e| ChainError::Unparsable(e.to_string()))?;
    Ok(crl
        .iter_revoked_certificates()
        .map(|entry| entry.raw_serial().to_vec())
        .collect())
}

/// Checks whether `serial` appears on any of `crls` (each a DER blob).
pub fn is_revoked(serial: &[u8], crls: &[Vec<u8>]) -> Result<bool, ChainError> {
    for crl_der in crls {
        if revoked_serials(crl_der)?.iter().any(|s| s == serial) {
            return Ok(true);
        }
    }
    Ok(false)
}
