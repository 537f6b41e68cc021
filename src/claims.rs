//! Ownership dispute adjudication.
//!
//! Stateless: each request is judged only on the artifacts it carries. Every
//! precondition must hold before any payload is decrypted, and a payload that
//! fails to decrypt denies the claim.

use ctlog_primitives::{ct_eq_hash, Pk32};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    encryption::{PayloadCipher, PayloadDomain},
    errors::ClaimDenied,
    merkle::verify_leaf_proof_hashes,
    ser::{decode_proof, decode_sot},
    signatures::{verify_leaf, verify_ownership, verify_tree_head},
    types::{InclusionProof, SignedOwnershipTimestamp},
};

/// Verdict as returned to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimResponse {
    pub granted: bool,
    /// Released contact data on grant, the denial reason otherwise.
    pub data: String,
}

impl From<Result<Vec<u8>, ClaimDenied>> for ClaimResponse {
    fn from(verdict: Result<Vec<u8>, ClaimDenied>) -> Self {
        match verdict {
            Ok(data) => Self {
                granted: true,
                data: String::from_utf8_lossy(&data).into_owned(),
            },
            Err(denied) => Self {
                granted: false,
                data: denied.to_string(),
            },
        }
    }
}

/// Head signature and hash chain of `proof` both check out under `pk`.
#[must_use]
pub fn verify_proof(pk: &Pk32, proof: &InclusionProof) -> bool {
    verify_tree_head(pk, &proof.head) && verify_leaf_proof_hashes(proof)
}

pub struct Adjudicator {
    authority: Pk32,
    cipher: PayloadCipher,
}

impl Adjudicator {
    #[must_use]
    pub const fn new(authority: Pk32, cipher: PayloadCipher) -> Self {
        Self { authority, cipher }
    }

    /// Grant when `sot` registered the claimed leaf's content before the leaf
    /// was created. Returns the claimed leaf's private payload.
    pub fn adjudicate_private(
        &self,
        sot: &SignedOwnershipTimestamp,
        claimed: &InclusionProof,
    ) -> Result<Vec<u8>, ClaimDenied> {
        if !verify_ownership(&self.authority, sot) {
            return Err(ClaimDenied::InvalidOwnershipSignature);
        }
        if !verify_tree_head(&self.authority, &claimed.head) {
            return Err(ClaimDenied::InvalidClaimedHeadSignature);
        }
        if !verify_leaf_proof_hashes(claimed) {
            return Err(ClaimDenied::InvalidClaimedProof);
        }
        if !ct_eq_hash(
            &sot.ownership.content_hash,
            &claimed.leaf.ownership.content_hash,
        ) {
            return Err(ClaimDenied::ContentHashMismatch);
        }
        if !sot.timestamp.is_before(&claimed.leaf.created) {
            return Err(ClaimDenied::NotEarlier);
        }
        self.cipher
            .decrypt(PayloadDomain::PrivateClaim, &claimed.leaf.private_claim_data)
            .ok_or(ClaimDenied::Undecryptable)
    }

    /// Grant when `claiming` sits earlier in the log than `claimed` for the
    /// same content and `signature` proves control of the claiming leaf's key.
    /// Returns the claimed leaf's public payload.
    pub fn adjudicate_public(
        &self,
        claiming: &InclusionProof,
        claimed: &InclusionProof,
        signature: &[u8],
    ) -> Result<Vec<u8>, ClaimDenied> {
        if !verify_tree_head(&self.authority, &claiming.head) {
            return Err(ClaimDenied::InvalidClaimingHeadSignature);
        }
        if !verify_leaf_proof_hashes(claiming) {
            return Err(ClaimDenied::InvalidClaimingProof);
        }
        if !verify_tree_head(&self.authority, &claimed.head) {
            return Err(ClaimDenied::InvalidClaimedHeadSignature);
        }
        if !verify_leaf_proof_hashes(claimed) {
            return Err(ClaimDenied::InvalidClaimedProof);
        }
        if !ct_eq_hash(
            &claiming.leaf.ownership.content_hash,
            &claimed.leaf.ownership.content_hash,
        ) {
            return Err(ClaimDenied::ContentHashMismatch);
        }
        if claimed.index <= claiming.index {
            return Err(ClaimDenied::NotLater);
        }
        if !verify_leaf(&claiming.leaf.public_key, &claiming.leaf, signature) {
            return Err(ClaimDenied::InvalidLeafSignature);
        }
        self.cipher
            .decrypt(PayloadDomain::PublicClaim, &claimed.leaf.public_claim_data)
            .ok_or(ClaimDenied::Undecryptable)
    }

    /// Private claim over serialized artifacts.
    pub fn claim_private(&self, sot: &[u8], claimed_proof: &[u8]) -> ClaimResponse {
        let verdict = decode_sot(sot)
            .and_then(|sot| Ok((sot, decode_proof(claimed_proof)?)))
            .map_err(ClaimDenied::from)
            .and_then(|(sot, claimed)| self.adjudicate_private(&sot, &claimed));
        log_verdict("private", &verdict);
        verdict.into()
    }

    /// Public claim over serialized artifacts.
    pub fn claim_public(
        &self,
        claiming_proof: &[u8],
        claimed_proof: &[u8],
        claiming_signature: &[u8],
    ) -> ClaimResponse {
        let verdict = decode_proof(claiming_proof)
            .and_then(|claiming| Ok((claiming, decode_proof(claimed_proof)?)))
            .map_err(ClaimDenied::from)
            .and_then(|(claiming, claimed)| {
                self.adjudicate_public(&claiming, &claimed, claiming_signature)
            });
        log_verdict("public", &verdict);
        verdict.into()
    }
}

fn log_verdict(kind: &str, verdict: &Result<Vec<u8>, ClaimDenied>) {
    match verdict {
        Ok(_) => info!(kind, "claim granted"),
        Err(reason) => warn!(kind, %reason, "claim denied"),
    }
}
