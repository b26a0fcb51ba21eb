//! The common quote header, present (and byte-identical in layout) across
//! SGX v3 and TDX v4/v5 quotes.

use bytes::BufMut;

use crate::{cursor::QuoteCursor, error::VerifyError, types::QeVendorId};

/// Size in bytes of the quote header.
pub const HEADER_LEN: usize = 48;

/// `tee_type` value for SGX quotes.
pub const TEE_TYPE_SGX: u32 = 0x0000_0000;
/// `tee_type` value for TDX quotes.
pub const TEE_TYPE_TDX: u32 = 0x0000_0081;

/// `att_key_type` value for ECDSA-P256; the only key type this library
/// supports.
pub const ATT_KEY_TYPE_ECDSA_P256: u16 = 2;

/// The quote header. Little-endian, 48 bytes, identical layout across all
/// supported quote versions (the `tee_type` field reads as all-zero
/// "reserved" bytes on SGX v3 quotes, which is equivalent to `TEE_TYPE_SGX`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    pub version: u16,
    pub att_key_type: u16,
    pub tee_type: u32,
    pub qe_svn: u16,
    pub pce_svn: u16,
    pub qe_vendor_id: QeVendorId,
    pub user_data: [u8; 20],
}

impl Header {
    pub fn decode(cur: &mut QuoteCursor) -> Result<Self, VerifyError> {
        let version = cur.get_u16_le()?;
        let att_key_type = cur.get_u16_le()?;
        let tee_type = cur.get_u32_le()?;
        let qe_svn = cur.get_u16_le()?;
        let pce_svn = cur.get_u16_le()?;
        let qe_vendor_id = QeVendorId(cur.get_bytes::<16>()?);
        let user_data = cur.get_bytes::<20>()?;
        Ok(Self {
            version,
            att_key_type,
            tee_type,
            qe_svn,
            pce_svn,
            qe_vendor_id,
            user_data,
        })
    }

    pub fn encode(&self, out: &mut impl BufMut) {
        out.put_u16_le(self.version);
        out.put_u16_le(self.att_key_type);
        out.put_u32_le(self.tee_type);
        out.put_u16_le(self.qe_svn);
        out.put_u16_le(self.pce_svn);
        out.put_slice(self.qe_vendor_id.as_slice());
        out.put_slice(&self.user_data);
    }
}
