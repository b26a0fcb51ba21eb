//! ECDSA-P256 signature conversion and verification helpers shared by the
//! quote signature pipeline and the certificate chain layer.

use num_bigint::BigUint;

use crate::error::VerifyError;

/// Converts a raw `r ‖ s` (64-byte) ECDSA-P256 signature, the form embedded
/// directly in a quote, to the DER `SEQUENCE { r INTEGER, s INTEGER }`
/// encoding X.509/`ring` expect.
pub fn raw_to_der(sig: &[u8]) -> Result<Vec<u8>, VerifyError> {
    if sig.len() != 64 {
        return Err(VerifyError::malformed(format!(
            "raw ECDSA signature has wrong length: {}, expected 64",
            sig.len(),
        )));
    }
    let (r_bytes, s_bytes) = sig.split_at(32);
    let r = BigUint::from_bytes_be(r_bytes);
    let s = BigUint::from_bytes_be(s_bytes);

    let der = yasna::construct_der(|writer| {
        writer.write_sequence(|writer| {
            writer.next().write_biguint(&r);
            writer.next().write_biguint(&s);
        })
    });
    Ok(der)
}

/// Builds an uncompressed SEC1 public key (`0x04 ‖ x ‖ y`, 65 bytes) from
/// the raw 64-byte `x ‖ y` form embedded in a quote, ready for
/// [`ring::signature::UnparsedPublicKey`].
pub fn sec1_uncompressed(raw_pk: &[u8]) -> Result<[u8; 65], VerifyError> {
    if raw_pk.len() != 64 {
        return Err(VerifyError::malformed(format!(
            "attestation public key has wrong length: {}, expected 64",
            raw_pk.len(),
        )));
    }
    let mut out = [0u8; 65];
    out[0] = 0x04;
    out[1..].copy_from_slice(raw_pk);
    Ok(out)
}

/// Verifies a raw `r ‖ s` signature over `message` under the raw `x ‖ y`
/// public key `raw_pk`, both in the 64-byte quote-internal encoding. `ring`'s
/// fixed-form verifier takes the raw signature directly, so no DER
/// conversion is needed here (that's only for feeding cert-chain signatures,
/// which come pre-DER-encoded from the certs themselves, into the ASN1
/// verifier elsewhere).
pub fn verify_raw(raw_pk: &[u8], message: &[u8], raw_sig: &[u8]) -> Result<(), ()> {
    let pk_bytes = sec1_uncompressed(raw_pk).map_err(|_| ())?;
    if raw_sig.len() != 64 {
        return Err(());
    }
    let pk = ring::signature::UnparsedPublicKey::new(
        &ring::signature::ECDSA_P256_SHA256_FIXED,
        pk_bytes,
    );
    pk.verify(message, raw_sig).map_err(|_| ())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn raw_to_der_round_trips_through_yasna() {
        let mut sig = [0u8; 64];
        sig[31] = 1; // r = 1
        sig[63] = 2; // s = 2
        let der = raw_to_der(&sig).unwrap();
        // SEQUENCE, len, INTEGER 1, INTEGER 2
        assert_eq!(der, vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]);
    }

    #[test]
    fn rejects_wrong_length_signature() {
        assert!(raw_to_der(&[0u8; 10]).is_err());
    }

    #[test]
    fn sec1_uncompressed_prefixes_with_0x04() {
        let raw = [7u8; 64];
        let pk = sec1_uncompressed(&raw).unwrap();
        assert_eq!(pk[0], 0x04);
        assert_eq!(&pk[1..], &raw[..]);
    }
}
