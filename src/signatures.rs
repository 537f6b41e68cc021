//! Ed25519 signing over domain-separated checksums.
//!
//! Nothing here signs or verifies caller-supplied bytes directly: every entry
//! point recomputes the checksum of a typed structure first.

use ctlog_primitives::{
    checksum,
    constants::{TAG_OWNERSHIP, TAG_STH},
    hash_leaf, CodecError, Hash256, Pk32, Sig64,
};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

use crate::{
    ser::{encode_leaf, encode_ownership, encode_timestamp},
    types::{Ownership, SignedOwnershipTimestamp, SignedTreeHead, Timestamp, TreeLeaf},
};

/// `SHA3("sth" || size || timestamp || root_hash)`
#[must_use]
pub fn tree_head_checksum(sth: &SignedTreeHead) -> Hash256 {
    checksum(
        TAG_STH,
        &[
            &sth.size.to_be_bytes(),
            &encode_timestamp(&sth.timestamp),
            &sth.hash,
        ],
    )
}

/// `SHA3("ownership" || timestamp || ownership)`
pub fn ownership_checksum(
    timestamp: &Timestamp,
    ownership: &Ownership,
) -> Result<Hash256, CodecError> {
    Ok(checksum(
        TAG_OWNERSHIP,
        &[&encode_timestamp(timestamp), &encode_ownership(ownership)?],
    ))
}

/// Untagged hash of the full leaf serialization.
pub fn leaf_checksum(leaf: &TreeLeaf) -> Result<Hash256, CodecError> {
    Ok(hash_leaf(&encode_leaf(leaf)?))
}

pub(crate) fn sign_digest(key: &SigningKey, digest: &Hash256) -> Sig64 {
    key.sign(digest).to_bytes()
}

pub(crate) fn verify_digest(pk: &[u8], digest: &Hash256, sig: &[u8]) -> bool {
    let Ok(pk) = Pk32::try_from(pk) else {
        return false;
    };
    match (VerifyingKey::from_bytes(&pk), Signature::from_slice(sig)) {
        (Ok(vk), Ok(sig)) => vk.verify_strict(digest, &sig).is_ok(),
        _ => false,
    }
}

/// The log's signing identity.
pub struct LogAuthority {
    key: SigningKey,
}

impl LogAuthority {
    #[must_use]
    pub const fn new(key: SigningKey) -> Self {
        Self { key }
    }

    #[must_use]
    pub fn public_key(&self) -> Pk32 {
        self.key.verifying_key().to_bytes()
    }

    /// Attach a signature to `head`, replacing any previous one.
    #[must_use]
    pub fn sign_tree_head(&self, mut head: SignedTreeHead) -> SignedTreeHead {
        head.signature = Some(sign_digest(&self.key, &tree_head_checksum(&head)));
        head
    }

    pub fn sign_ownership(
        &self,
        timestamp: Timestamp,
        ownership: Ownership,
    ) -> Result<SignedOwnershipTimestamp, CodecError> {
        let digest = ownership_checksum(&timestamp, &ownership)?;
        Ok(SignedOwnershipTimestamp {
            timestamp,
            ownership,
            signature: sign_digest(&self.key, &digest),
        })
    }

    /// Sign `ownership` as registered now.
    pub fn timestamp_ownership(
        &self,
        ownership: Ownership,
    ) -> Result<SignedOwnershipTimestamp, CodecError> {
        self.sign_ownership(Timestamp::now(), ownership)
    }
}

/// An unsigned head never verifies.
#[must_use]
pub fn verify_tree_head(pk: &Pk32, sth: &SignedTreeHead) -> bool {
    sth.signature
        .is_some_and(|sig| verify_digest(pk, &tree_head_checksum(sth), &sig))
}

#[must_use]
pub fn verify_ownership(pk: &Pk32, sot: &SignedOwnershipTimestamp) -> bool {
    ownership_checksum(&sot.timestamp, &sot.ownership)
        .is_ok_and(|digest| verify_digest(pk, &digest, &sot.signature))
}

/// Client-side signature over a leaf, proving control of its public key.
pub fn sign_leaf(key: &SigningKey, leaf: &TreeLeaf) -> Result<Sig64, CodecError> {
    Ok(sign_digest(key, &leaf_checksum(leaf)?))
}

/// Keys and signatures of the wrong length fail verification.
#[must_use]
pub fn verify_leaf(pk: &[u8], leaf: &TreeLeaf, sig: &[u8]) -> bool {
    leaf_checksum(leaf).is_ok_and(|digest| verify_digest(pk, &digest, sig))
}
