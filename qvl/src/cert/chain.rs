//! Chain ordering and verification.
//!
//! The ordering logic (`order_chain`) is generic over anything exposing
//! `subject_der()`/`issuer_der()`, independent of the `x509-parser` types
//! that implement it in production. That keeps the graph-ordering logic
//! unit-testable with small synthetic byte strings rather than real DER.

use crate::{
    cert::Cert,
    error::{ChainError, VerifyError},
};

/// Anything that can report its own subject and issuer name, in DER form,
/// for the purposes of chain-linking.
pub trait ChainLink {
    fn subject_der(&self) -> Vec<u8>;
    fn issuer_der(&self) -> Vec<u8>;

    fn is_self_signed(&self) -> bool {
        self.subject_der() == self.issuer_der()
    }
}

impl ChainLink for Cert {
    fn subject_der(&self) -> Vec<u8> {
        Cert::subject_der(self)
    }

    fn issuer_der(&self) -> Vec<u8> {
        Cert::issuer_der(self)
    }
}

/// Orders an unordered set of certificates into `[leaf, intermediate, ...,
/// root]` by following issuer -> subject links. The leaf is the unique
/// certificate that is not itself anyone else's issuer; the chain ends at
/// the first self-signed certificate (the root).
pub fn order_chain<T: ChainLink>(certs: Vec<T>) -> Result<Vec<T>, ChainError> {
    let n = certs.len();
    if n == 0 {
        return Err(ChainError::Incomplete);
    }
    let subjects: Vec<Vec<u8>> = certs.iter().map(ChainLink::subject_der).collect();
    let issuers: Vec<Vec<u8>> = certs.iter().map(ChainLink::issuer_der).collect();

    let leaf_idx = (0..n)
        .find(|&i| !(0..n).any(|j| j != i && issuers[j] == subjects[i]))
        .ok_or(ChainError::Incomplete)?;

    let mut order = vec![leaf_idx];
    let mut used = vec![false; n];
    used[leaf_idx] = true;
    let mut current = leaf_idx;

    while !certs[current].is_self_signed() {
        let next = (0..n)
            .find(|&j| !used[j] && subjects[j] == issuers[current])
            .ok_or(ChainError::Incomplete)?;
        order.push(next);
        used[next] = true;
        current = next;
    }

    let mut slots: Vec<Option<T>> = certs.into_iter().map(Some).collect();
    Ok(order.into_iter().map(|i| slots[i].take().expect("index used once")).collect())
}

/// Options controlling chain verification, matching `Config`'s subset of
/// fields that are relevant to the cert layer.
pub struct ChainOptions<'a> {
    pub date: time::OffsetDateTime,
    pub crls: &'a [Vec<u8>],
    pub pinned_root_certs: Option<&'a [qvl_sha256::Hash]>,
}

/// Builds and fully verifies a PCK certificate chain from an unordered set
/// of PEM certificates, returning it ordered `[leaf, intermediate, root]`.
pub fn verify_pck_chain(pems: &[String], opts: &ChainOptions) -> Result<Vec<Cert>, VerifyError> {
    let certs: Vec<Cert> = pems
        .iter()
        .map(|pem| Cert::from_pem(pem))
        .collect::<Result<_, _>>()?;

    let ordered = order_chain(certs).map_err(VerifyError::from)?;

    let root = ordered.last().ok_or(ChainError::Incomplete)?;
    if !root.is_self_signed() {
        return Err(ChainError::NotSelfSignedRoot.into());
    }

    if let Some(pinned) = opts.pinned_root_certs {
        let root_hash = root.sha256();
        if !pinned.iter().any(|h| *h == root_hash) {
            return Err(ChainError::UntrustedRoot.into());
        }
    }

    for cert in &ordered {
        cert.check_validity(opts.date)?;
        if !opts.crls.is_empty()
            && crate::cert::crl::is_revoked(&cert.serial_bytes(), opts.crls)?
        {
            return Err(ChainError::Revoked.into());
        }
    }

    for window in ordered.windows(2) {
        let [signee, signer] = window else { unreachable!() };
        signer.verify_issued(signee)?;
    }
    root.verify_issued(root)?;

    Ok(ordered)
}

#[cfg(test)]
mod test {
    use super::*;

    struct Link {
        subject: Vec<u8>,
        issuer: Vec<u8>,
    }

    impl ChainLink for Link {
        fn subject_der(&self) -> Vec<u8> {
            self.subject.clone()
        }
        fn issuer_der(&self) -> Vec<u8> {
            self.issuer.clone()
        }
    }

    #[test]
    fn orders_shuffled_three_cert_chain() {
        let root = Link {
            subject: vec![3],
            issuer: vec![3],
        };
        let intermediate = Link {
            subject: vec![2],
            issuer: vec![3],
        };
        let leaf = Link {
            subject: vec![1],
            issuer: vec![2],
        };
        // shuffled input order
        let input = vec![intermediate, root, leaf];
        let ordered = order_chain(input).unwrap();
        assert_eq!(ordered.iter().map(|l| l.subject.clone()).collect::<Vec<_>>(), vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn missing_link_is_incomplete() {
        let leaf = Link {
            subject: vec![1],
            issuer: vec![2],
        };
        // no cert with subject == 2
        let input = vec![leaf];
        assert!(matches!(order_chain(input), Err(ChainError::Incomplete)));
    }

    #[test]
    fn verifies_two_cert_chain_against_its_own_pinned_root() {
        let (root_der, leaf_der) = crate::test_support::root_and_leaf_der();
        let root_hash = qvl_sha256::digest(&root_der);
        let pems = vec![
            crate::test_support::pem_from_der(&leaf_der),
            crate::test_support::pem_from_der(&root_der),
        ];

        let opts = ChainOptions {
            date: time::OffsetDateTime::now_utc(),
            crls: &[],
            pinned_root_certs: Some(std::slice::from_ref(&root_hash)),
        };
        let ordered = verify_pck_chain(&pems, &opts).expect("chain signed by its own root verifies");
        assert_eq!(ordered.len(), 2);
        assert_eq!(ordered.last().unwrap().sha256(), root_hash);
    }

    #[test]
    fn rejects_chain_pinned_to_an_unrelated_root() {
        let (root_der, leaf_der) = crate::test_support::root_and_leaf_der();
        let (other_root_der, _) = crate::test_support::root_and_leaf_der();
        let other_root_hash = qvl_sha256::digest(&other_root_der);
        let pems = vec![
            crate::test_support::pem_from_der(&leaf_der),
            crate::test_support::pem_from_der(&root_der),
        ];

        let opts = ChainOptions {
            date: time::OffsetDateTime::now_utc(),
            crls: &[],
            pinned_root_certs: Some(std::slice::from_ref(&other_root_hash)),
        };
        let err = verify_pck_chain(&pems, &opts).expect_err("root is not the pinned one");
        assert!(matches!(err, VerifyError::ChainError(ChainError::UntrustedRoot)));
    }

    #[test]
    fn revoked_leaf_serial_is_rejected() {
        let (root_der, leaf_der) = crate::test_support::root_and_leaf_der();
        let root_hash = qvl_sha256::digest(&root_der);
        let leaf = Cert::from_der(leaf_der.clone()).expect("leaf DER parses");
        let crl_der = crate::test_support::minimal_crl_der(&leaf.serial_bytes());
        let pems = vec![
            crate::test_support::pem_from_der(&leaf_der),
            crate::test_support::pem_from_der(&root_der),
        ];

        let opts = ChainOptions {
            date: time::OffsetDateTime::now_utc(),
            crls: std::slice::from_ref(&crl_der),
            pinned_root_certs: Some(std::slice::from_ref(&root_hash)),
        };
        let err = verify_pck_chain(&pems, &opts).expect_err("leaf serial is on the CRL");
        assert!(matches!(err, VerifyError::ChainError(ChainError::Revoked)));
    }
}
