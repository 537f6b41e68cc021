//! Log-side operations as a transport layer would call them.
//!
//! Inputs are raw request fields, outputs are wire encodings. Heads and proofs
//! leave here signed; claim payloads are sealed before they reach the tree.

use ctlog_primitives::{constants::HASH_LEN, Pk32};
use tracing::{debug, info};

use crate::{
    config::{KeyMaterial, LogConfig},
    encryption::{PayloadCipher, PayloadDomain},
    errors::{LogError, LogResult},
    ser::{encode_leaf, encode_proof, encode_sot, encode_sth},
    signatures::LogAuthority,
    storage::{AnyRepository, Repository},
    tree::MerkleTree,
    types::{InclusionProof, Ownership, SignedTreeHead, Timestamp, TreeLeaf},
};

pub struct LogService<R: Repository> {
    tree: MerkleTree<R>,
    authority: LogAuthority,
    cipher: PayloadCipher,
    max_page_size: u64,
}

impl LogService<AnyRepository> {
    /// Open the configured backend and serve it with `keys`.
    pub fn from_config(config: &LogConfig, keys: &KeyMaterial) -> LogResult<Self> {
        config.validate()?;
        Self::new(config.storage.open()?, keys, config.max_page_size)
    }
}

fn ownership(content_hash: &[u8], name: &str) -> LogResult<Ownership> {
    if content_hash.len() != HASH_LEN {
        return Err(LogError::InvalidContentHash(content_hash.len()));
    }
    Ok(Ownership::new(content_hash, name)?)
}

impl<R: Repository> LogService<R> {
    pub fn new(repo: R, keys: &KeyMaterial, max_page_size: u64) -> LogResult<Self> {
        if max_page_size == 0 {
            return Err(LogError::Config("max_page_size must be positive".into()));
        }
        let tree = MerkleTree::new(repo)?;
        let authority = keys.authority();
        info!(size = tree.size(), max_page_size, "log service ready");
        Ok(Self {
            tree,
            authority,
            cipher: keys.cipher(),
            max_page_size,
        })
    }

    pub const fn tree(&self) -> &MerkleTree<R> {
        &self.tree
    }

    pub const fn max_page_size(&self) -> u64 {
        self.max_page_size
    }

    pub fn get_pubkey(&self) -> Pk32 {
        self.authority.public_key()
    }

    pub fn signed_head(&self) -> LogResult<SignedTreeHead> {
        Ok(self.authority.sign_tree_head(self.tree.head()?))
    }

    pub fn get_head(&self) -> LogResult<Vec<u8>> {
        Ok(encode_sth(&self.signed_head()?))
    }

    /// Seal both payloads and append a new leaf; returns its index.
    pub fn append_entry(
        &self,
        content_hash: &[u8],
        name: &str,
        public_key: &[u8],
        private_payload: &[u8],
        public_payload: &[u8],
    ) -> LogResult<u64> {
        let leaf = TreeLeaf {
            created: Timestamp::now(),
            ownership: ownership(content_hash, name)?,
            public_key: public_key.to_vec(),
            private_claim_data: self
                .cipher
                .encrypt(PayloadDomain::PrivateClaim, private_payload)?,
            public_claim_data: self
                .cipher
                .encrypt(PayloadDomain::PublicClaim, public_payload)?,
        };
        self.tree.append(&leaf)
    }

    /// Off-log timestamp for a private registration.
    pub fn sign_ownership(&self, content_hash: &[u8], name: &str) -> LogResult<Vec<u8>> {
        let sot = self
            .authority
            .timestamp_ownership(ownership(content_hash, name)?)?;
        debug!(name, "signed ownership timestamp");
        Ok(encode_sot(&sot)?)
    }

    /// Leaves `[start, end)` after page and range checks; `end` is clamped to the size.
    pub fn leaves(&self, start: u64, end: u64) -> LogResult<Vec<TreeLeaf>> {
        if end <= start {
            return Err(LogError::InvalidRange {
                start,
                end,
                reason: "end must be greater than start",
            });
        }
        if end - start > self.max_page_size {
            return Err(LogError::InvalidRange {
                start,
                end,
                reason: "range exceeds page size",
            });
        }
        let size = self.tree.size();
        if start >= size {
            return Err(LogError::IndexOutOfRange { index: start, size });
        }
        self.tree.get_leaves(start, end)
    }

    pub fn get_entries(&self, start: u64, end: u64) -> LogResult<Vec<Vec<u8>>> {
        self.leaves(start, end)?
            .iter()
            .map(|leaf| Ok(encode_leaf(leaf)?))
            .collect()
    }

    pub fn proof(&self, index: u64) -> LogResult<InclusionProof> {
        let mut proof = self.tree.get_leaf_proof(index)?;
        proof.head = self.authority.sign_tree_head(proof.head);
        Ok(proof)
    }

    pub fn get_entry_and_proof(&self, index: u64) -> LogResult<Vec<u8>> {
        Ok(encode_proof(&self.proof(index)?)?)
    }
}
