//! The quote's authentication section: the two embedded ECDSA signatures,
//! the QE report binding them together, and the trailing cert data that
//! carries the PCK certificate chain.

use bytes::BufMut;

use crate::{
    cursor::QuoteCursor,
    error::VerifyError,
    quote::body::{SgxReportBody, SGX_REPORT_BODY_LEN},
    types::{AttestationPublicKey, EcdsaSig64},
};

/// `cert_data_type` value meaning "PCK certificate chain, PEM-encoded,
/// concatenated". The only cert data type this library understands.
pub const CERT_DATA_TYPE_PCK_CERT_CHAIN: u16 = 5;

/// The signature section that trails a quote's header and body.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignatureData {
    /// Raw `r ‖ s` signature by the attestation key over the signed region.
    pub ecdsa_signature: EcdsaSig64,
    /// The attestation key itself, raw uncompressed `x ‖ y`.
    pub attestation_public_key: AttestationPublicKey,
    /// The Quoting Enclave's own SGX report.
    pub qe_report: SgxReportBody,
    /// Raw `r ‖ s` signature by the PCK leaf key over `qe_report`.
    pub qe_report_signature: EcdsaSig64,
    /// Opaque QE authentication data (length-prefixed, u16 length).
    pub qe_auth_data: Vec<u8>,
    /// Tags the encoding of `cert_data`; only
    /// [`CERT_DATA_TYPE_PCK_CERT_CHAIN`] is supported.
    pub cert_data_type: u16,
    /// The certification data itself (length-prefixed, u32 length). For
    /// `cert_data_type == 5` this is the concatenated PEM chain
    /// `leaf || intermediate || root`.
    pub cert_data: Vec<u8>,
}

impl SignatureData {
    /// Decodes the signature section, which runs from the `sig_len` field
    /// (already consumed by the caller as part of locating this section) to
    /// the end of the quote.
    pub fn decode(cur: &mut QuoteCursor) -> Result<Self, VerifyError> {
        let ecdsa_signature = EcdsaSig64(cur.get_bytes::<64>()?);
        let attestation_public_key = AttestationPublicKey(cur.get_bytes::<64>()?);
        let qe_report_bytes = cur.get_slice(SGX_REPORT_BODY_LEN)?;
        let qe_report = SgxReportBody::decode_from_slice(qe_report_bytes)?;
        let qe_report_signature = EcdsaSig64(cur.get_bytes::<64>()?);

        let qe_auth_data_len = cur.get_u16_le()? as usize;
        let qe_auth_data = cur.get_slice(qe_auth_data_len)?.to_vec();

        let cert_data_type = cur.get_u16_le()?;
        let cert_data_len = cur.get_u32_le()? as usize;
        let cert_data = cur.get_slice(cert_data_len)?.to_vec();

        Ok(Self {
            ecdsa_signature,
            attestation_public_key,
            qe_report,
            qe_report_signature,
            qe_auth_data,
            cert_data_type,
            cert_data,
        })
    }

    pub fn encode(&self, out: &mut impl BufMut) {
        out.put_slice(self.ecdsa_signature.as_slice());
        out.put_slice(self.attestation_public_key.as_slice());
        self.qe_report.encode(out);
        out.put_slice(self.qe_report_signature.as_slice());
        out.put_u16_le(self.qe_auth_data.len() as u16);
        out.put_slice(&self.qe_auth_data);
        out.put_u16_le(self.cert_data_type);
        out.put_u32_le(self.cert_data.len() as u32);
        out.put_slice(&self.cert_data);
    }

    /// Extracts the individual PEM certificates from `cert_data`, in the
    /// order they appear (expected to be `[leaf, intermediate, root]`).
    ///
    /// Returns an empty vec, rather than an error, if `cert_data_type` isn't
    /// the PEM chain type; callers check `cert_data_type` separately and
    /// turn that into [`VerifyError::UnsupportedQuote`].
    pub fn pck_chain_pems(&self) -> Vec<String> {
        if self.cert_data_type != CERT_DATA_TYPE_PCK_CERT_CHAIN {
            return Vec::new();
        }
        let text = match std::str::from_utf8(&self.cert_data) {
            Ok(t) => t,
            Err(_) => return Vec::new(),
        };
        const BEGIN: &str = "-----BEGIN CERTIFICATE-----";
        const END: &str = "-----END CERTIFICATE-----";
        let mut pems = Vec::new();
        let mut rest = text;
        while let Some(start) = rest.find(BEGIN) {
            let Some(end_rel) = rest[start..].find(END) else {
                break;
            };
            let end = start + end_rel + END.len();
            pems.push(rest[start..end].to_string());
            rest = &rest[end..];
        }
        pems
    }
}
