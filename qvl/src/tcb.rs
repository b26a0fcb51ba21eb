//! TCB evaluator: walks a `TcbInfo`'s `tcbLevels` and decides the
//! platform's status against its CPUSVN/PCESVN (SGX) or tee_tcb_svn (TDX).

use crate::collateral::{TcbComponents, TcbInfo, TcbStatus};

/// The platform SVN inputs to match against a `tcbLevel`.
pub struct TcbParams<'a> {
    pub cpu_svn: &'a [u8; 16],
    pub pce_svn: u16,
    pub is_tdx: bool,
}

/// Result of evaluating a platform's SVNs against `TcbInfo`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TcbRef {
    pub fmspc: String,
    pub status: TcbStatus,
    pub tcb_info_fresh: bool,
}

/// Default acceptance policy: fresh, and status is `UpToDate` or
/// `ConfigurationNeeded`. `ConfigurationAndSWHardeningNeeded` is
/// deliberately excluded; see the recorded decision in DESIGN.md.
pub fn default_accept(tcb_ref: &TcbRef) -> bool {
    tcb_ref.tcb_info_fresh
        && matches!(
            tcb_ref.status,
            TcbStatus::UpToDate | TcbStatus::ConfigurationNeeded
        )
}

/// Evaluates `tcb_info.tcbLevels` in order (newest first, as Intel
/// publishes them) and returns the first level where both the PCESVN and
/// CPUSVN/tee_tcb_svn checks pass. Falls back to `OutOfDate` if none match.
pub fn evaluate(tcb_info: &TcbInfo, params: &TcbParams, now: time::OffsetDateTime) -> TcbRef {
    let status = tcb_info
        .tcb_levels
        .iter()
        .find(|level| level_matches(&level.tcb, params))
        .map(|level| level.tcb_status)
        .unwrap_or(TcbStatus::OutOfDate);

    let tcb_info_fresh = is_fresh(&tcb_info.issue_date, &tcb_info.next_update, now);

    TcbRef {
        fmspc: tcb_info.fmspc.clone(),
        status,
        tcb_info_fresh,
    }
}

fn level_matches(tcb: &TcbComponents, params: &TcbParams) -> bool {
    let pce_ok = tcb.pcesvn.is_none_or(|threshold| threshold <= params.pce_svn);
    if !pce_ok {
        return false;
    }

    // Legacy schema: every present sgxtcbcompNNsvn must be met.
    let legacy_ok = tcb
        .legacy
        .present()
        .iter()
        .enumerate()
        .all(|(i, threshold)| match threshold {
            Some(t) => params.cpu_svn[i] >= *t,
            None => true,
        });
    if !legacy_ok {
        return false;
    }

    // Modern schema: refines the legacy check when present. SGX components
    // check against cpu_svn; TDX components check against tee_tcb_svn
    // (passed as `cpu_svn` by the caller for TDX quotes).
    let components = if params.is_tdx {
        &tcb.tdx_components
    } else {
        &tcb.sgx_components
    };
    if let Some(components) = components {
        for (i, component) in components.iter().enumerate() {
            let Some(actual) = params.cpu_svn.get(i) else {
                return false;
            };
            if *actual < component.svn {
                return false;
            }
        }
    }

    true
}

/// Checks `issue_date <= now <= next_update`, parsing both as RFC 3339
/// timestamps (the format Intel's collateral uses).
fn is_fresh(issue_date: &str, next_update: &str, now: time::OffsetDateTime) -> bool {
    let Ok(issue) = time::OffsetDateTime::parse(issue_date, &time::format_description::well_known::Rfc3339) else {
        return false;
    };
    let Ok(next) = time::OffsetDateTime::parse(next_update, &time::format_description::well_known::Rfc3339) else {
        return false;
    };
    now >= issue && now <= next
}
