//! Binary quote decoding and signed-region extraction.

pub mod body;
pub mod header;
pub mod signature;

use bytes::BufMut;

use crate::{
    cursor::QuoteCursor,
    error::VerifyError,
    quote::{
        body::{Body, SgxReportBody, TdReportBodyV10, TdReportBodyV15, BODY_DESC_LEN},
        header::{Header, ATT_KEY_TYPE_ECDSA_P256, HEADER_LEN, TEE_TYPE_SGX, TEE_TYPE_TDX},
        signature::{SignatureData, CERT_DATA_TYPE_PCK_CERT_CHAIN},
    },
};

/// `body_type` values carried in a version-5 quote's body descriptor.
const BODY_TYPE_SGX: u16 = 1;
const BODY_TYPE_TD_V10: u16 = 2;
const BODY_TYPE_TD_V15: u16 = 3;

/// A fully decoded DCAP quote: header, TEE-specific body, and signature
/// section, plus the exact byte range over which the attestation key's
/// signature was computed.
#[derive(Clone, Debug)]
pub struct Quote {
    pub header: Header,
    pub body: Body,
    pub signature: SignatureData,
    /// The byte range of the original input that the attestation key's
    /// signature in `signature.ecdsa_signature` was computed over (header,
    /// optionally the v5 body descriptor, and body - never the signature
    /// section itself).
    pub signed_region: Vec<u8>,
}

impl Quote {
    /// Decodes a quote, dispatching on `header.version` and `header.tee_type`
    /// to the right body layout. Rejects anything other than ECDSA-P256
    /// attestation keys and the PEM PCK-chain cert data encoding, since
    /// those are the only combinations this library can verify.
    pub fn decode(bytes: &[u8]) -> Result<Self, VerifyError> {
        let mut cur = QuoteCursor::new(bytes);
        let header = Header::decode(&mut cur)?;

        if header.att_key_type != ATT_KEY_TYPE_ECDSA_P256 {
            return Err(unsupported(&header, 0));
        }

        let body = match header.version {
            3 => {
                if header.tee_type != TEE_TYPE_SGX {
                    return Err(unsupported(&header, 0));
                }
                let bytes = cur.get_slice(body::SGX_REPORT_BODY_LEN)?;
                Body::Sgx(SgxReportBody::decode_from_slice(bytes)?)
            }
            4 => match header.tee_type {
                TEE_TYPE_SGX => {
                    let bytes = cur.get_slice(body::SGX_REPORT_BODY_LEN)?;
                    Body::Sgx(SgxReportBody::decode_from_slice(bytes)?)
                }
                TEE_TYPE_TDX => Body::TdxV10(TdReportBodyV10::decode(&mut cur)?),
                _ => return Err(unsupported(&header, 0)),
            },
            5 => {
                let body_type = cur.get_u16_le()?;
                let body_size = cur.get_u32_le()? as usize;
                let body_start = cur.pos();
                let body = match body_type {
                    BODY_TYPE_SGX => {
                        let bytes = cur.get_slice(body::SGX_REPORT_BODY_LEN)?;
                        Body::Sgx(SgxReportBody::decode_from_slice(bytes)?)
                    }
                    BODY_TYPE_TD_V10 => Body::TdxV10(TdReportBodyV10::decode(&mut cur)?),
                    BODY_TYPE_TD_V15 => Body::TdxV15(TdReportBodyV15::decode(&mut cur)?),
                    _ => return Err(unsupported(&header, 0)),
                };
                if cur.pos() - body_start != body_size {
                    return Err(VerifyError::malformed(format!(
                        "v5 body descriptor claims {body_size} bytes but body decoded as {}",
                        cur.pos() - body_start,
                    )));
                }
                body
            }
            _ => return Err(unsupported(&header, 0)),
        };

        let signed_region_end = cur.pos();
        let signed_region = bytes
            .get(..signed_region_end)
            .ok_or_else(|| VerifyError::malformed("signed region exceeds quote length"))?
            .to_vec();

        let sig_len = cur.get_u32_le()? as usize;
        let sig_start = cur.pos();
        let signature = SignatureData::decode(&mut cur)?;
        if cur.pos() - sig_start != sig_len {
            return Err(VerifyError::malformed(format!(
                "declared signature_data_len {sig_len} does not match decoded signature section ({} bytes)",
                cur.pos() - sig_start,
            )));
        }

        if signature.cert_data_type != CERT_DATA_TYPE_PCK_CERT_CHAIN {
            return Err(VerifyError::UnsupportedQuote {
                version: header.version,
                tee_type: header.tee_type,
                att_key_type: header.att_key_type,
                cert_data_type: signature.cert_data_type,
            });
        }

        Ok(Self {
            header,
            body,
            signature,
            signed_region,
        })
    }

    /// Re-encodes the quote from its parsed parts. Used by tests to build
    /// fixtures and to check that `decode` round-trips.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.header.encode(&mut out);
        if self.header.version == 5 {
            let body_type = match &self.body {
                Body::Sgx(_) => BODY_TYPE_SGX,
                Body::TdxV10(_) => BODY_TYPE_TD_V10,
                Body::TdxV15(_) => BODY_TYPE_TD_V15,
            };
            let mut body_bytes = Vec::new();
            self.body.encode(&mut body_bytes);
            out.put_u16_le(body_type);
            out.put_u32_le(body_bytes.len() as u32);
            out.put_slice(&body_bytes);
        } else {
            self.body.encode(&mut out);
        }
        let mut sig_bytes = Vec::new();
        self.signature.encode(&mut sig_bytes);
        out.put_u32_le(sig_bytes.len() as u32);
        out.put_slice(&sig_bytes);
        out
    }

    pub fn is_sgx(&self) -> bool {
        matches!(self.body, Body::Sgx(_))
    }

    pub fn is_tdx(&self) -> bool {
        !self.is_sgx()
    }
}

fn unsupported(header: &Header, cert_data_type: u16) -> VerifyError {
    VerifyError::UnsupportedQuote {
        version: header.version,
        tee_type: header.tee_type,
        att_key_type: header.att_key_type,
        cert_data_type,
    }
}
