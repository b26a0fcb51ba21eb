//! QE Identity evaluator: matches the Quoting Enclave's own SGX report
//! against signed `QeIdentity` collateral.

use crate::{collateral::QeIdentity, quote::body::SgxReportBody};

/// Evaluates `qe_report` against `identity`. Returns `true` only if every
/// check passes, in order; the orchestrator turns `false` into
/// `QeIdentityRejected`.
pub fn evaluate(qe_report: &SgxReportBody, identity: &QeIdentity, now: time::OffsetDateTime) -> bool {
    if !is_fresh(&identity.issue_date, &identity.next_update, now) {
        return false;
    }

    let Some(attributes_mask) = parse_hex16(&identity.attributes_mask) else {
        return false;
    };
    let Some(id_attributes) = parse_hex16(&identity.attributes) else {
        return false;
    };
    if !masked_eq(&qe_report.attributes, &id_attributes, &attributes_mask) {
        return false;
    }

    if let (Some(miscselect), Some(miscselect_mask)) =
        (&identity.miscselect, &identity.miscselect_mask)
    {
        let (Some(miscselect), Some(mask)) = (parse_hex4(miscselect), parse_hex4(miscselect_mask))
        else {
            return false;
        };
        let report_misc = qe_report.misc_select.to_le_bytes();
        if !masked_eq(&report_misc, &miscselect, &mask) {
            return false;
        }
    }

    let Some(expected_mrsigner) = parse_hex32(&identity.mrsigner) else {
        return false;
    };
    if qe_report.mr_signer.0 != expected_mrsigner {
        return false;
    }

    if let Some(expected_prod_id) = identity.isvprodid {
        if qe_report.isv_prod_id != expected_prod_id {
            return false;
        }
    }

    let selected = identity
        .tcb_levels
        .iter()
        .find(|level| level.tcb_status == crate::collateral::TcbStatus::UpToDate)
        .or_else(|| identity.tcb_levels.first());

    match selected {
        Some(level) => level.tcb.isvsvn == qe_report.isv_svn,
        None => false,
    }
}

fn masked_eq(actual: &[u8], expected: &[u8], mask: &[u8]) -> bool {
    if actual.len() != expected.len() || actual.len() != mask.len() {
        return false;
    }
    actual
        .iter()
        .zip(expected)
        .zip(mask)
        .all(|((a, e), m)| (a & m) == (e & m))
}

fn is_fresh(issue_date: &str, next_update: &str, now: time::OffsetDateTime) -> bool {
    let Ok(issue) = time::OffsetDateTime::parse(issue_date, &time::format_description::well_known::Rfc3339) else {
        return false;
    };
    let Ok(next) = time::OffsetDateTime::parse(next_update, &time::format_description::well_known::Rfc3339) else {
        return false;
    };
    now >= issue && now <= next
}

fn parse_hex16(s: &str) -> Option<[u8; 16]> {
    qvl_hex::decode_to_array(s).ok()
}

fn parse_hex32(s: &str) -> Option<[u8; 32]> {
    qvl_hex::decode_to_array(s).ok()
}

fn parse_hex4(s: &str) -> Option<[u8; 4]> {
    qvl_hex::decode_to_array(s).ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::collateral::{QeTcb, QeTcbLevel, TcbStatus};
    use crate::types::{CpuSvn, MrEnclave, MrSigner, ReportData};

    fn sample_report(mrsigner: [u8; 32], isv_svn: u16, isv_prod_id: u16) -> SgxReportBody {
        SgxReportBody {
            cpu_svn: CpuSvn([0; 16]),
            misc_select: 0,
            attributes: [0; 16],
            mr_enclave: MrEnclave([0; 32]),
            mr_signer: MrSigner(mrsigner),
            isv_prod_id,
            isv_svn,
            report_data: ReportData([0; 64]),
        }
    }

    fn sample_identity(mrsigner_hex: &str, isv_svn: u16) -> QeIdentity {
        QeIdentity {
            id: "QE".to_string(),
            version: 2,
            issue_date: "2024-01-01T00:00:00Z".to_string(),
            next_update: "2024-07-01T00:00:00Z".to_string(),
            tcb_evaluation_data_number: 16,
            miscselect: None,
            miscselect_mask: None,
            attributes: "0".repeat(32),
            attributes_mask: "ffffffffffffffff0000000000000000".to_string(),
            mrsigner: mrsigner_hex.to_string(),
            isvprodid: Some(1),
            tcb_levels: vec![QeTcbLevel {
                tcb: QeTcb { isvsvn: isv_svn },
                tcb_status: TcbStatus::UpToDate,
            }],
        }
    }

    fn now() -> time::OffsetDateTime {
        time::OffsetDateTime::parse(
            "2024-03-01T00:00:00Z",
            &time::format_description::well_known::Rfc3339,
        )
        .unwrap()
    }

    #[test]
    fn accepts_matching_identity() {
        let mrsigner = [0x8c; 32];
        let mrsigner_hex = qvl_hex::encode(&mrsigner);
        let report = sample_report(mrsigner, 6, 1);
        let identity = sample_identity(&mrsigner_hex, 6);
        assert!(evaluate(&report, &identity, now()));
    }

    #[test]
    fn rejects_mrsigner_mismatch() {
        let report = sample_report([0x8c; 32], 6, 1);
        let identity = sample_identity(&qvl_hex::encode(&[0x00; 32]), 6);
        assert!(!evaluate(&report, &identity, now()));
    }

    #[test]
    fn rejects_isvsvn_mismatch() {
        let mrsigner = [0x8c; 32];
        let report = sample_report(mrsigner, 5, 1);
        let identity = sample_identity(&qvl_hex::encode(&mrsigner), 6);
        assert!(!evaluate(&report, &identity, now()));
    }

    #[test]
    fn rejects_stale_identity() {
        let mrsigner = [0x8c; 32];
        let report = sample_report(mrsigner, 6, 1);
        let identity = sample_identity(&qvl_hex::encode(&mrsigner), 6);
        let far_future = now() + time::Duration::days(365);
        assert!(!evaluate(&report, &identity, far_future));
    }
}
