//! SGX and TDX quote body layouts.

use bytes::BufMut;

use crate::{
    cursor::QuoteCursor,
    error::VerifyError,
    types::{Measurement48, MrEnclave, MrSigner, ReportData},
};

/// Size in bytes of an `SgxReport` body.
pub const SGX_REPORT_BODY_LEN: usize = 384;
/// Size in bytes of a TDX v1.0 TD report body.
pub const TD_REPORT_V10_LEN: usize = 584;
/// Additional bytes a v1.5 TD report body carries beyond v1.0.
pub const TD_REPORT_V15_EXTRA_LEN: usize = 64;
/// Size in bytes of a TDX v1.5 TD report body.
pub const TD_REPORT_V15_LEN: usize = TD_REPORT_V10_LEN + TD_REPORT_V15_EXTRA_LEN;
/// Size in bytes of the body descriptor preceding a version-5 quote's body.
pub const BODY_DESC_LEN: usize = 6;

/// The application enclave's SGX report, as embedded in an SGX DCAP quote.
///
/// This is `sgx_report_body_t` with the `key_id`/`mac` fields (which only
/// exist in the full, non-quote `sgx_report_t`) already stripped, i.e. the
/// 384-byte truncated form Intel's quote generation pipeline emits.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SgxReportBody {
    pub cpu_svn: crate::types::CpuSvn,
    pub misc_select: u32,
    pub attributes: [u8; 16],
    pub mr_enclave: MrEnclave,
    pub mr_signer: MrSigner,
    pub isv_prod_id: u16,
    pub isv_svn: u16,
    pub report_data: ReportData,
}

impl SgxReportBody {
    pub fn decode(cur: &mut QuoteCursor) -> Result<Self, VerifyError> {
        let cpu_svn = crate::types::CpuSvn(cur.get_bytes::<16>()?);
        let misc_select = cur.get_u32_le()?;
        cur.skip(28)?; // reserved1
        let attributes = cur.get_bytes::<16>()?;
        let mr_enclave = MrEnclave(cur.get_bytes::<32>()?);
        cur.skip(32)?; // reserved2
        let mr_signer = MrSigner(cur.get_bytes::<32>()?);
        cur.skip(96)?; // reserved3
        let isv_prod_id = cur.get_u16_le()?;
        let isv_svn = cur.get_u16_le()?;
        cur.skip(60)?; // reserved4
        let report_data = ReportData(cur.get_bytes::<64>()?);
        Ok(Self {
            cpu_svn,
            misc_select,
            attributes,
            mr_enclave,
            mr_signer,
            isv_prod_id,
            isv_svn,
            report_data,
        })
    }

    pub fn encode(&self, out: &mut impl BufMut) {
        out.put_slice(self.cpu_svn.as_slice());
        out.put_u32_le(self.misc_select);
        out.put_bytes(0, 28);
        out.put_slice(&self.attributes);
        out.put_slice(self.mr_enclave.as_slice());
        out.put_bytes(0, 32);
        out.put_slice(self.mr_signer.as_slice());
        out.put_bytes(0, 96);
        out.put_u16_le(self.isv_prod_id);
        out.put_u16_le(self.isv_svn);
        out.put_bytes(0, 60);
        out.put_slice(self.report_data.as_slice());
    }

    /// Decode directly from a flat 384-byte slice (used for the QE report
    /// embedded in the signature section, which has the same layout).
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self, VerifyError> {
        if bytes.len() != SGX_REPORT_BODY_LEN {
            return Err(VerifyError::malformed(format!(
                "SGX report body has wrong length: {}, expected {SGX_REPORT_BODY_LEN}",
                bytes.len(),
            )));
        }
        let mut cur = QuoteCursor::new(bytes);
        Self::decode(&mut cur)
    }
}

/// A TDX TD report, v1.0 layout (584 bytes).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TdReportBodyV10 {
    pub tee_tcb_svn: [u8; 16],
    pub mr_seam: Measurement48,
    pub mr_seam_signer: Measurement48,
    pub seam_attributes: [u8; 8],
    pub td_attributes: [u8; 8],
    pub xfam: [u8; 8],
    pub mr_td: Measurement48,
    pub mr_config_id: Measurement48,
    pub mr_owner: Measurement48,
    pub mr_owner_config: Measurement48,
    pub rtmr0: Measurement48,
    pub rtmr1: Measurement48,
    pub rtmr2: Measurement48,
    pub rtmr3: Measurement48,
    pub report_data: ReportData,
}

impl TdReportBodyV10 {
    pub fn decode(cur: &mut QuoteCursor) -> Result<Self, VerifyError> {
        Ok(Self {
            tee_tcb_svn: cur.get_bytes::<16>()?,
            mr_seam: Measurement48(cur.get_bytes::<48>()?),
            mr_seam_signer: Measurement48(cur.get_bytes::<48>()?),
            seam_attributes: cur.get_bytes::<8>()?,
            td_attributes: cur.get_bytes::<8>()?,
            xfam: cur.get_bytes::<8>()?,
            mr_td: Measurement48(cur.get_bytes::<48>()?),
            mr_config_id: Measurement48(cur.get_bytes::<48>()?),
            mr_owner: Measurement48(cur.get_bytes::<48>()?),
            mr_owner_config: Measurement48(cur.get_bytes::<48>()?),
            rtmr0: Measurement48(cur.get_bytes::<48>()?),
            rtmr1: Measurement48(cur.get_bytes::<48>()?),
            rtmr2: Measurement48(cur.get_bytes::<48>()?),
            rtmr3: Measurement48(cur.get_bytes::<48>()?),
            report_data: ReportData(cur.get_bytes::<64>()?),
        })
    }

    pub fn encode(&self, out: &mut impl BufMut) {
        out.put_slice(&self.tee_tcb_svn);
        out.put_slice(self.mr_seam.as_slice());
        out.put_slice(self.mr_seam_signer.as_slice());
        out.put_slice(&self.seam_attributes);
        out.put_slice(&self.td_attributes);
        out.put_slice(&self.xfam);
        out.put_slice(self.mr_td.as_slice());
        out.put_slice(self.mr_config_id.as_slice());
        out.put_slice(self.mr_owner.as_slice());
        out.put_slice(self.mr_owner_config.as_slice());
        out.put_slice(self.rtmr0.as_slice());
        out.put_slice(self.rtmr1.as_slice());
        out.put_slice(self.rtmr2.as_slice());
        out.put_slice(self.rtmr3.as_slice());
        out.put_slice(self.report_data.as_slice());
    }
}

/// A TDX TD report, v1.5 layout (648 bytes): the v1.0 fields plus two more.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TdReportBodyV15 {
    pub base: TdReportBodyV10,
    pub tee_tcb_svn2: [u8; 16],
    pub mr_service_td: Measurement48,
}

impl TdReportBodyV15 {
    pub fn decode(cur: &mut QuoteCursor) -> Result<Self, VerifyError> {
        let base = TdReportBodyV10::decode(cur)?;
        let tee_tcb_svn2 = cur.get_bytes::<16>()?;
        let mr_service_td = Measurement48(cur.get_bytes::<48>()?);
        Ok(Self {
            base,
            tee_tcb_svn2,
            mr_service_td,
        })
    }

    pub fn encode(&self, out: &mut impl BufMut) {
        self.base.encode(out);
        out.put_slice(&self.tee_tcb_svn2);
        out.put_slice(self.mr_service_td.as_slice());
    }
}

/// The decoded quote body, tagged by variant rather than duck-typed on
/// field presence.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Body {
    Sgx(SgxReportBody),
    TdxV10(TdReportBodyV10),
    TdxV15(TdReportBodyV15),
}

impl Body {
    pub fn encode(&self, out: &mut impl BufMut) {
        match self {
            Self::Sgx(b) => b.encode(out),
            Self::TdxV10(b) => b.encode(out),
            Self::TdxV15(b) => b.encode(out),
        }
    }

    /// The `tee_tcb_svn` vector used by the TCB evaluator (TDX only).
    pub fn tee_tcb_svn(&self) -> Option<&[u8; 16]> {
        match self {
            Self::Sgx(_) => None,
            Self::TdxV10(b) => Some(&b.tee_tcb_svn),
            Self::TdxV15(b) => Some(&b.base.tee_tcb_svn),
        }
    }

    /// The opaque `report_data` field (64 bytes), present in every variant.
    pub fn report_data(&self) -> &ReportData {
        match self {
            Self::Sgx(b) => &b.report_data,
            Self::TdxV10(b) => &b.report_data,
            Self::TdxV15(b) => &b.base.report_data,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sgx_report_round_trips() {
        let body = SgxReportBody {
            cpu_svn: crate::types::CpuSvn([1; 16]),
            misc_select: 7,
            attributes: [2; 16],
            mr_enclave: MrEnclave([3; 32]),
            mr_signer: MrSigner([4; 32]),
            isv_prod_id: 5,
            isv_svn: 6,
            report_data: ReportData([8; 64]),
        };
        let mut bytes = Vec::new();
        body.encode(&mut bytes);
        assert_eq!(bytes.len(), SGX_REPORT_BODY_LEN);
        let decoded = SgxReportBody::decode_from_slice(&bytes).unwrap();
        assert_eq!(decoded, body);
    }

    #[test]
    fn td_report_v15_round_trips() {
        let base = TdReportBodyV10 {
            tee_tcb_svn: [1; 16],
            mr_seam: Measurement48([2; 48]),
            mr_seam_signer: Measurement48([3; 48]),
            seam_attributes: [4; 8],
            td_attributes: [5; 8],
            xfam: [6; 8],
            mr_td: Measurement48([7; 48]),
            mr_config_id: Measurement48([8; 48]),
            mr_owner: Measurement48([9; 48]),
            mr_owner_config: Measurement48([10; 48]),
            rtmr0: Measurement48([11; 48]),
            rtmr1: Measurement48([12; 48]),
            rtmr2: Measurement48([13; 48]),
            rtmr3: Measurement48([14; 48]),
            report_data: ReportData([15; 64]),
        };
        let body = TdReportBodyV15 {
            base,
            tee_tcb_svn2: [16; 16],
            mr_service_td: Measurement48([17; 48]),
        };
        let mut bytes = Vec::new();
        body.encode(&mut bytes);
        assert_eq!(bytes.len(), TD_REPORT_V15_LEN);

        let mut cur = QuoteCursor::new(&bytes);
        let decoded = TdReportBodyV15::decode(&mut cur).unwrap();
        assert_eq!(decoded, body);
    }
}
