//! X.509 certificate parsing, chain building, CRL checks, and the Intel SGX
//! PCK custom extension.

pub mod chain;
pub mod crl;
pub mod pck_ext;

use asn1_rs::FromDer;
use x509_parser::certificate::X509Certificate;

use crate::error::{ChainError, VerifyError};

/// ECDSA-with-SHA256, the only signature algorithm this library trusts on
/// any certificate in the chain.
const ECDSA_WITH_SHA256_OID: &str = "1.2.840.10045.4.3.2";

/// `id-ecPublicKey`, the only SubjectPublicKeyInfo algorithm this library
/// accepts (paired with the secp256r1 curve, which every ECDSA-P256 cert
/// in practice declares).
const EC_PUBLIC_KEY_OID: &str = "1.2.840.10045.2.1";

/// A parsed X.509 certificate, holding its own DER bytes so it owns its
/// data rather than borrowing from a caller-held buffer.
///
/// Parsing is validated once at construction (`from_der`/`from_pem`); every
/// other accessor re-parses the held DER and is infallible, since a
/// `Cert` is only ever built from DER that has already been shown to parse.
pub struct Cert {
    der: Vec<u8>,
}

impl Cert {
    pub fn from_der(der: Vec<u8>) -> Result<Self, VerifyError> {
        X509Certificate::from_der(&der)
            .map_err(|e| ChainError::Unparsable(e.to_string()))?;
        Ok(Self { der })
    }

    pub fn from_pem(pem: &str) -> Result<Self, VerifyError> {
        let (_, pem) = x509_parser::pem::parse_x509_pem(pem.as_bytes())
            .map_err(|e| ChainError::Unparsable(e.to_string()))?;
        Self::from_der(pem.contents)
    }

    fn parsed(&self) -> X509Certificate<'_> {
        X509Certificate::from_der(&self.der)
            .expect("validated in from_der")
            .1
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn subject_der(&self) -> Vec<u8> {
        self.parsed().subject().as_raw().to_vec()
    }

    pub fn issuer_der(&self) -> Vec<u8> {
        self.parsed().issuer().as_raw().to_vec()
    }

    pub fn is_self_signed(&self) -> bool {
        self.subject_der() == self.issuer_der()
    }

    pub fn serial_bytes(&self) -> Vec<u8> {
        self.parsed().raw_serial().to_vec()
    }

    /// Returns `Ok(())` if `now` falls within the certificate's validity
    /// window, `Err(ChainError::Expired)` otherwise.
    pub fn check_validity(&self, now: time::OffsetDateTime) -> Result<(), ChainError> {
        let cert = self.parsed();
        let validity = cert.validity();
        let now_unix = now.unix_timestamp();
        if now_unix < validity.not_before.timestamp() || now_unix > validity.not_after.timestamp()
        {
            return Err(ChainError::Expired);
        }
        Ok(())
    }

    /// Raw uncompressed SEC1 public key bytes (`0x04 ‖ x ‖ y`), if this
    /// certificate carries an EC public key. Returns `None` for any other
    /// key type, which the caller treats as a chain validation failure.
    pub fn ecdsa_public_key(&self) -> Option<Vec<u8>> {
        let cert = self.parsed();
        let spki = &cert.tbs_certificate.subject_pki;
        if spki.algorithm.algorithm.to_id_string() != EC_PUBLIC_KEY_OID {
            return None;
        }
        Some(spki.subject_public_key.data.to_vec())
    }

    /// Verifies `der_signature` (a DER `SEQUENCE{r,s}` ECDSA-P256 signature)
    /// over `message` under this certificate's public key.
    pub fn ecdsa_verify(&self, message: &[u8], der_signature: &[u8]) -> Result<(), ChainError> {
        let pk_bytes = self
            .ecdsa_public_key()
            .ok_or_else(|| ChainError::Unparsable("not an EC public key".into()))?;
        let pk = ring::signature::UnparsedPublicKey::new(
            &ring::signature::ECDSA_P256_SHA256_ASN1,
            pk_bytes,
        );
        pk.verify(message, der_signature)
            .map_err(|_| ChainError::BadSignature)
    }

    /// Verifies that `signer` (this cert) signed `signee`'s TBS bytes.
    pub fn verify_issued(&self, signee: &Cert) -> Result<(), ChainError> {
        let signee_parsed = signee.parsed();
        let sig_alg_oid = signee_parsed.signature_algorithm.algorithm.to_id_string();
        if sig_alg_oid != ECDSA_WITH_SHA256_OID {
            return Err(ChainError::Unparsable(format!(
                "unsupported certificate signature algorithm: {sig_alg_oid}"
            )));
        }
        let tbs = signee_parsed.tbs_certificate.as_ref();
        let sig = signee_parsed.signature_value.as_ref();
        self.ecdsa_verify(tbs, sig)
    }

    /// The Intel SGX PCK custom extension, if present.
    pub fn pck_extension(&self) -> Result<Option<pck_ext::PckExtension>, VerifyError> {
        let cert = self.parsed();
        for ext in cert.extensions() {
            if ext.oid == pck_ext::sgx_extension_oid() {
                return pck_ext::PckExtension::decode(ext.value).map(Some);
            }
        }
        Ok(None)
    }

    /// SHA-256 of the certificate's DER bytes, used for root pinning.
    pub fn sha256(&self) -> qvl_sha256::Hash {
        qvl_sha256::digest(&self.der)
    }
}
