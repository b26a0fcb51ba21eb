//! Real, parseable X.509 DER fixtures for tests that need more than a
//! synthetic `subject_der`/`issuer_der` pair (see `cert::chain::test::Link`
//! for the cases that don't). Built with `rcgen`, which already signs with
//! ECDSA-P256-SHA256 by default, matching the only algorithm this crate's
//! chain layer accepts.

/// A single self-signed certificate. Good enough for tests that only need
/// `Cert::from_der` to succeed, not a real chain.
pub fn self_signed_der() -> Vec<u8> {
    let cert = rcgen::generate_simple_self_signed(vec!["qvl-test.invalid".to_string()])
        .expect("rcgen self-signed cert");
    cert.serialize_der().expect("rcgen DER serialization")
}

/// A root CA certificate and a leaf certificate it signed, both DER-encoded.
pub fn root_and_leaf_der() -> (Vec<u8>, Vec<u8>) {
    let mut root_params = rcgen::CertificateParams::new(vec!["qvl-test-root.invalid".to_string()]);
    root_params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    let root = rcgen::Certificate::from_params(root_params).expect("rcgen root params");

    let leaf_params = rcgen::CertificateParams::new(vec!["qvl-test-leaf.invalid".to_string()]);
    let leaf = rcgen::Certificate::from_params(leaf_params).expect("rcgen leaf params");

    let root_der = root.serialize_der().expect("rcgen root DER");
    let leaf_der = leaf
        .serialize_der_with_signer(&root)
        .expect("rcgen leaf DER signed by root");
    (root_der, leaf_der)
}

/// Wraps raw DER bytes as a PEM certificate block, the format the quote's
/// inline `cert_data` and [`crate::Config::extra_cert_data`] both carry.
pub fn pem_from_der(der: &[u8]) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let b64 = STANDARD.encode(der);
    let mut body = String::new();
    for chunk in b64.as_bytes().chunks(64) {
        body.push_str(std::str::from_utf8(chunk).expect("base64 output is ASCII"));
        body.push('\n');
    }
    format!("-----BEGIN CERTIFICATE-----\n{body}-----END CERTIFICATE-----\n")
}

/// A hand-built, minimally valid DER-encoded CRL carrying one revoked
/// serial. Not signed by anything real -- `cert::crl` only needs to parse
/// out the revoked-serials list, not verify the CRL issuer's signature, so
/// an arbitrary signature value is fine here.
pub fn minimal_crl_der(revoked_serial: &[u8]) -> Vec<u8> {
    fn der_len(out: &mut Vec<u8>, len: usize) {
        if len < 0x80 {
            out.push(len as u8);
        } else {
            let bytes = len.to_be_bytes();
            let first_nonzero = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
            let trimmed = &bytes[first_nonzero..];
            out.push(0x80 | trimmed.len() as u8);
            out.extend_from_slice(trimmed);
        }
    }
    fn der_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
        let mut out = vec![tag];
        der_len(&mut out, content.len());
        out.extend_from_slice(content);
        out
    }
    fn der_seq(parts: &[Vec<u8>]) -> Vec<u8> {
        der_tlv(0x30, &parts.concat())
    }
    fn der_int(bytes: &[u8]) -> Vec<u8> {
        der_tlv(0x02, bytes)
    }
    fn der_utc_time(s: &str) -> Vec<u8> {
        der_tlv(0x17, s.as_bytes())
    }
    fn der_algorithm_identifier() -> Vec<u8> {
        // ecdsa-with-SHA256, 1.2.840.10045.4.3.2; no parameters.
        der_seq(&[der_tlv(0x06, &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x04, 0x03, 0x02])])
    }
    fn der_issuer_common_name(cn: &str) -> Vec<u8> {
        let oid = der_tlv(0x06, &[0x55, 0x04, 0x03]); // id-at-commonName
        let value = der_tlv(0x13, cn.as_bytes()); // PrintableString
        let atv = der_seq(&[oid, value]);
        let rdn = der_tlv(0x31, &atv); // SET OF
        der_seq(&[rdn]) // Name ::= SEQUENCE OF RelativeDistinguishedName
    }

    let version = der_int(&[0x01]); // v2, required once revokedCertificates is present
    let signature = der_algorithm_identifier();
    let issuer = der_issuer_common_name("QVL Test CRL Issuer");
    let this_update = der_utc_time("240101000000Z");
    let next_update = der_utc_time("300101000000Z");
    let revoked_entry = der_seq(&[der_int(revoked_serial), der_utc_time("240101000000Z")]);
    let revoked_certificates = der_seq(&[revoked_entry]);

    let tbs_cert_list = der_seq(&[
        version,
        signature.clone(),
        issuer,
        this_update,
        next_update,
        revoked_certificates,
    ]);
    let signature_value = der_tlv(0x03, &[&[0x00][..], &[0u8; 64][..]].concat());

    der_seq(&[tbs_cert_list, signature, signature_value])
}
