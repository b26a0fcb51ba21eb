//! Decoder for the Intel SGX PCK certificate's custom X.509 extension
//! (OID `1.2.840.113741.1.13.1`), which carries the platform identity data
//! the TCB evaluator needs: FMSPC, PCEID, CPUSVN, PCESVN, and the per-
//! component TCB SVN vector.
//!
//! The extension value is `SEQUENCE OF SEQUENCE { OID, ANY }`, one entry
//! per sub-field, addressed by the last arc of its OID. We walk the DER
//! TLVs by hand rather than reach for `asn1-rs`'s higher-level sequence
//! combinators, since the structure here is small, fixed, and easiest to
//! read as an explicit byte walk (the same reasoning that put a hand-rolled
//! cursor in front of the quote bytes rather than a generic parser).

use crate::{error::VerifyError, types::CpuSvn, types::Fmspc};

pub const fn sgx_extension_oid() -> asn1_rs::Oid<'static> {
    asn1_rs::oid!(1.2.840.113741.1.13.1)
}

/// Decoded form of the Intel SGX PCK certificate extension.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PckExtension {
    pub fmspc: Fmspc,
    pub pceid: [u8; 2],
    pub cpusvn: CpuSvn,
    pub pcesvn: u16,
    /// The 16 per-component TCB SVN bytes, same source bytes as `cpusvn`
    /// (Intel's `tcb` sub-sequence duplicates the CPUSVN components as
    /// individual integers; we re-derive `cpusvn` straight from those
    /// instead of trusting a second, separately-encoded copy).
    pub tcb_components: [u8; 16],
}

/// One decoded `SEQUENCE { OID, ANY }` entry.
struct Field<'a> {
    /// Last arc of the field's OID, e.g. `4` for fmspc (`....1.13.1.4`).
    last_arc: u64,
    value: &'a [u8],
}

impl PckExtension {
    pub fn decode(ext_value: &[u8]) -> Result<Self, VerifyError> {
        let (_, outer_content) = read_tlv(ext_value, 0x30)
            .map_err(|e| VerifyError::malformed(format!("PCK extension: {e}")))?;

        let mut fmspc = None;
        let mut pceid = None;
        let mut pcesvn = None;
        let mut tcb_components = [0u8; 16];
        let mut have_tcb = false;

        for field in iter_fields(outer_content)? {
            match field.last_arc {
                2 => {
                    let tcb = decode_tcb_sequence(field.value)?;
                    tcb_components = tcb.0;
                    pcesvn = Some(tcb.1);
                    have_tcb = true;
                }
                3 => {
                    let v = read_octet_or_bytes(field.value)?;
                    if v.len() != 2 {
                        return Err(VerifyError::malformed("PCK extension: pceid wrong length"));
                    }
                    pceid = Some([v[0], v[1]]);
                }
                4 => {
                    let v = read_octet_or_bytes(field.value)?;
                    if v.len() != 6 {
                        return Err(VerifyError::malformed("PCK extension: fmspc wrong length"));
                    }
                    fmspc = Some(Fmspc([v[0], v[1], v[2], v[3], v[4], v[5]]));
                }
                _ => {}
            }
        }

        let fmspc = fmspc.ok_or_else(|| VerifyError::malformed("PCK extension missing fmspc"))?;
        let pceid = pceid.ok_or_else(|| VerifyError::malformed("PCK extension missing pceid"))?;
        if !have_tcb {
            return Err(VerifyError::malformed("PCK extension missing tcb"));
        }
        let pcesvn = pcesvn.ok_or_else(|| VerifyError::malformed("PCK extension tcb missing pcesvn"))?;

        Ok(Self {
            fmspc,
            pceid,
            cpusvn: CpuSvn(tcb_components),
            pcesvn,
            tcb_components,
        })
    }
}

/// Decodes the nested `tcb` sequence: 16 `sgxtcbcompNNsvn` integers (arcs
/// `.1`..`.16`) plus `pcesvn` (arc `.17`) and `cpusvn` (arc `.18`, which we
/// ignore in favor of re-deriving it from the 16 components above).
fn decode_tcb_sequence(tcb_value: &[u8]) -> Result<([u8; 16], u16), VerifyError> {
    let (_, content) =
        read_tlv(tcb_value, 0x30).map_err(|e| VerifyError::malformed(format!("PCK tcb: {e}")))?;

    let mut components = [0u8; 16];
    let mut pcesvn = None;
    for field in iter_fields(content)? {
        if (1..=16).contains(&field.last_arc) {
            let idx = (field.last_arc - 1) as usize;
            components[idx] = read_small_uint(field.value)? as u8;
        } else if field.last_arc == 17 {
            pcesvn = Some(read_small_uint(field.value)?);
        }
    }
    let pcesvn = pcesvn.ok_or_else(|| VerifyError::malformed("PCK tcb missing pcesvn"))?;
    Ok((components, pcesvn))
}

/// Iterates the `SEQUENCE { OID, ANY }` entries inside a sequence's content.
fn iter_fields(mut content: &[u8]) -> Result<Vec<Field<'_>>, VerifyError> {
    let mut out = Vec::new();
    while !content.is_empty() {
        let (rest, entry) =
            read_tlv(content, 0x30).map_err(|e| VerifyError::malformed(format!("PCK field: {e}")))?;
        let (oid_der, oid_rest) =
            split_tlv(entry).map_err(|e| VerifyError::malformed(format!("PCK field oid: {e}")))?;
        let last_arc = last_oid_arc(oid_der)?;
        out.push(Field {
            last_arc,
            value: oid_rest,
        });
        content = rest;
    }
    Ok(out)
}

/// Reads one DER TLV expected to carry `tag`, returning its content and the
/// remaining bytes after it.
fn read_tlv(bytes: &[u8], tag: u8) -> Result<(&[u8], &[u8]), &'static str> {
    let (content, rest) = split_tlv(bytes)?;
    if bytes.first() != Some(&tag) {
        return Err("unexpected DER tag");
    }
    Ok((rest, content))
}

/// Splits a buffer into `(content-of-first-TLV, bytes-after-first-TLV)`,
/// not checking the tag.
fn split_tlv(bytes: &[u8]) -> Result<(&[u8], &[u8]), &'static str> {
    if bytes.len() < 2 {
        return Err("truncated TLV");
    }
    let len_byte = bytes[1];
    let (len, header_len) = if len_byte & 0x80 == 0 {
        (len_byte as usize, 2)
    } else {
        let num_len_bytes = (len_byte & 0x7f) as usize;
        if num_len_bytes == 0 || num_len_bytes > 4 {
            return Err("unsupported DER length encoding");
        }
        if bytes.len() < 2 + num_len_bytes {
            return Err("truncated DER length");
        }
        let mut len: usize = 0;
        for &b in &bytes[2..2 + num_len_bytes] {
            len = (len << 8) | b as usize;
        }
        (len, 2 + num_len_bytes)
    };
    if bytes.len() < header_len + len {
        return Err("truncated TLV content");
    }
    let content = &bytes[header_len..header_len + len];
    let rest = &bytes[header_len + len..];
    Ok((content, rest))
}

/// Extracts the last arc of a DER-encoded OID.
fn last_oid_arc(oid_der: &[u8]) -> Result<u64, VerifyError> {
    let (content, _) =
        split_tlv(oid_der).map_err(|e| VerifyError::malformed(format!("PCK oid: {e}")))?;
    if content.is_empty() {
        return Err(VerifyError::malformed("PCK oid: empty"));
    }
    // Walk the base-128 arcs, keeping only the last one (the continuation
    // bit, 0x80, marks all but the final byte of an arc).
    let mut last: u64 = 0;
    let mut acc: u64 = 0;
    for &b in content {
        acc = (acc << 7) | (b & 0x7f) as u64;
        if b & 0x80 == 0 {
            last = acc;
            acc = 0;
        }
    }
    Ok(last)
}

/// Reads a small DER INTEGER (tag 0x02) as a `u16`.
fn read_small_uint(bytes: &[u8]) -> Result<u16, VerifyError> {
    let (content, _) =
        read_tlv_any(bytes, 0x02).map_err(|e| VerifyError::malformed(format!("PCK int: {e}")))?;
    let mut v: u64 = 0;
    for &b in content {
        v = (v << 8) | b as u64;
    }
    Ok(v as u16)
}

/// Reads a DER OCTET STRING (tag 0x04); some PCK generators instead emit a
/// bare byte string, so fall back to treating the whole buffer as content
/// if it doesn't look like a tagged TLV of the expected kind.
fn read_octet_or_bytes(bytes: &[u8]) -> Result<&[u8], VerifyError> {
    if let Ok((content, _)) = read_tlv_any(bytes, 0x04) {
        return Ok(content);
    }
    Ok(bytes)
}

fn read_tlv_any(bytes: &[u8], tag: u8) -> Result<(&[u8], &[u8]), &'static str> {
    if bytes.first() != Some(&tag) {
        return Err("unexpected tag");
    }
    split_tlv(bytes)
}
