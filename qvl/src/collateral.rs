//! Serde types for Intel's signed JSON collateral: TCB Info and QE Identity.
//!
//! The core treats these envelopes as already-structurally-valid JSON
//! whose outer signature is the caller's responsibility to have checked
//! (see the open question recorded in DESIGN.md); we only decode the
//! fields the evaluators in [`crate::tcb`] and [`crate::qe_identity`] need.

use serde::{Deserialize, Serialize};

/// `GET .../tcb` response envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TcbInfoEnvelope {
    #[serde(rename = "tcbInfo")]
    pub tcb_info: TcbInfo,
    /// Hex-encoded signature over `tcbInfo`, present in the wire format but
    /// not checked by the core (see open question in DESIGN.md).
    pub signature: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TcbInfo {
    pub id: String,
    pub version: u32,
    #[serde(rename = "issueDate")]
    pub issue_date: String,
    #[serde(rename = "nextUpdate")]
    pub next_update: String,
    pub fmspc: String,
    #[serde(rename = "pceId")]
    pub pce_id: String,
    #[serde(rename = "tcbType")]
    pub tcb_type: u32,
    #[serde(rename = "tcbEvaluationDataNumber")]
    pub tcb_evaluation_data_number: u32,
    #[serde(rename = "tcbLevels")]
    pub tcb_levels: Vec<TcbLevel>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TcbLevel {
    pub tcb: TcbComponents,
    #[serde(rename = "tcbDate")]
    pub tcb_date: String,
    #[serde(rename = "tcbStatus")]
    pub tcb_status: TcbStatus,
}

/// The SVN threshold record for one `tcbLevel`. All three schemas
/// (legacy SGX, modern SGX, TDX) are modeled as optional fields on the same
/// struct, since Intel's collateral may carry any combination of them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TcbComponents {
    pub pcesvn: Option<u16>,

    #[serde(flatten)]
    pub legacy: LegacySgxComponents,

    #[serde(rename = "sgxtcbcomponents")]
    pub sgx_components: Option<Vec<TcbComponentSvn>>,

    #[serde(rename = "tdxtcbcomponents")]
    pub tdx_components: Option<Vec<TcbComponentSvn>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TcbComponentSvn {
    pub svn: u8,
}

/// The legacy `sgxtcbcompNNsvn` fields (NN = 01..16), one per struct field
/// since the JSON key embeds the component number. Flattened into
/// [`TcbComponents`] so the wire format's flat field list round-trips.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LegacySgxComponents {
    #[serde(rename = "sgxtcbcomp01svn")]
    pub comp01: Option<u8>,
    #[serde(rename = "sgxtcbcomp02svn")]
    pub comp02: Option<u8>,
    #[serde(rename = "sgxtcbcomp03svn")]
    pub comp03: Option<u8>,
    #[serde(rename = "sgxtcbcomp04svn")]
    pub comp04: Option<u8>,
    #[serde(rename = "sgxtcbcomp05svn")]
    pub comp05: Option<u8>,
    #[serde(rename = "sgxtcbcomp06svn")]
    pub comp06: Option<u8>,
    #[serde(rename = "sgxtcbcomp07svn")]
    pub comp07: Option<u8>,
    #[serde(rename = "sgxtcbcomp08svn")]
    pub comp08: Option<u8>,
    #[serde(rename = "sgxtcbcomp09svn")]
    pub comp09: Option<u8>,
    #[serde(rename = "sgxtcbcomp10svn")]
    pub comp10: Option<u8>,
    #[serde(rename = "sgxtcbcomp11svn")]
    pub comp11: Option<u8>,
    #[serde(rename = "sgxtcbcomp12svn")]
    pub comp12: Option<u8>,
    #[serde(rename = "sgxtcbcomp13svn")]
    pub comp13: Option<u8>,
    #[serde(rename = "sgxtcbcomp14svn")]
    pub comp14: Option<u8>,
    #[serde(rename = "sgxtcbcomp15svn")]
    pub comp15: Option<u8>,
    #[serde(rename = "sgxtcbcomp16svn")]
    pub comp16: Option<u8>,
}

impl LegacySgxComponents {
    /// The 16 components as `(index, Some(threshold))` pairs, skipping
    /// components the collateral didn't specify.
    pub fn present(&self) -> [Option<u8>; 16] {
        [
            self.comp01, self.comp02, self.comp03, self.comp04, self.comp05,
            self.comp06, self.comp07, self.comp08, self.comp09, self.comp10,
            self.comp11, self.comp12, self.comp13, self.comp14, self.comp15,
            self.comp16,
        ]
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TcbStatus {
    UpToDate,
    SWHardeningNeeded,
    ConfigurationNeeded,
    ConfigurationAndSWHardeningNeeded,
    OutOfDate,
    OutOfDateConfigurationNeeded,
    Revoked,
}

impl std::fmt::Display for TcbStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::UpToDate => "UpToDate",
            Self::SWHardeningNeeded => "SWHardeningNeeded",
            Self::ConfigurationNeeded => "ConfigurationNeeded",
            Self::ConfigurationAndSWHardeningNeeded => "ConfigurationAndSWHardeningNeeded",
            Self::OutOfDate => "OutOfDate",
            Self::OutOfDateConfigurationNeeded => "OutOfDateConfigurationNeeded",
            Self::Revoked => "Revoked",
        };
        f.write_str(s)
    }
}

/// `GET .../qe/identity` response envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QeIdentityEnvelope {
    #[serde(rename = "enclaveIdentity")]
    pub enclave_identity: QeIdentity,
    pub signature: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QeIdentity {
    pub id: String,
    pub version: u32,
    #[serde(rename = "issueDate")]
    pub issue_date: String,
    #[serde(rename = "nextUpdate")]
    pub next_update: String,
    #[serde(rename = "tcbEvaluationDataNumber")]
    pub tcb_evaluation_data_number: u32,
    pub miscselect: Option<String>,
    #[serde(rename = "miscselectMask")]
    pub miscselect_mask: Option<String>,
    pub attributes: String,
    #[serde(rename = "attributesMask")]
    pub attributes_mask: String,
    pub mrsigner: String,
    pub isvprodid: Option<u16>,
    #[serde(rename = "tcbLevels")]
    pub tcb_levels: Vec<QeTcbLevel>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QeTcbLevel {
    pub tcb: QeTcb,
    #[serde(rename = "tcbStatus")]
    pub tcb_status: TcbStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QeTcb {
    pub isvsvn: u16,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decodes_legacy_and_modern_tcb_info() {
        let json = r#"{
            "tcbInfo": {
                "id": "SGX",
                "version": 3,
                "issueDate": "2024-01-01T00:00:00Z",
                "nextUpdate": "2024-07-01T00:00:00Z",
                "fmspc": "90c06f000000",
                "pceId": "0000",
                "tcbType": 0,
                "tcbEvaluationDataNumber": 16,
                "tcbLevels": [
                    {
                        "tcb": {
                            "sgxtcbcomp01svn": 2,
                            "sgxtcbcomp02svn": 2,
                            "pcesvn": 11,
                            "sgxtcbcomponents": [{"svn": 2}, {"svn": 2}]
                        },
                        "tcbDate": "2024-01-01T00:00:00Z",
                        "tcbStatus": "UpToDate"
                    }
                ]
            },
            "signature": "aabb"
        }"#;
        let envelope: TcbInfoEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.tcb_info.fmspc, "90c06f000000");
        let level = &envelope.tcb_info.tcb_levels[0];
        assert_eq!(level.tcb.legacy.comp01, Some(2));
        assert_eq!(level.tcb.pcesvn, Some(11));
        assert_eq!(level.tcb.sgx_components.as_ref().unwrap().len(), 2);
        assert_eq!(level.tcb_status, TcbStatus::UpToDate);
    }

    #[test]
    fn decodes_qe_identity() {
        let json = r#"{
            "enclaveIdentity": {
                "id": "QE",
                "version": 2,
                "issueDate": "2024-01-01T00:00:00Z",
                "nextUpdate": "2024-07-01T00:00:00Z",
                "tcbEvaluationDataNumber": 16,
                "attributes": "11000000000000000000000000000000",
                "attributesMask": "fbffffffffffffff0000000000000000",
                "mrsigner": "8c4f5775d796503e96137f77c68a829a0056ac8ded70140b081b094490c57bf",
                "isvprodid": 1,
                "tcbLevels": [
                    {"tcb": {"isvsvn": 6}, "tcbStatus": "UpToDate"}
                ]
            },
            "signature": "ccdd"
        }"#;
        let envelope: QeIdentityEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.enclave_identity.isvprodid, Some(1));
        assert_eq!(envelope.enclave_identity.tcb_levels[0].tcb.isvsvn, 6);
    }
}
