//! End-to-end harness for the ctlog pipeline
//!
//! A `Client` talks to an in-process `LogService` and `Adjudicator` strictly
//! through serialized artifacts, checking everything it receives the way a
//! remote client would before filing or presenting it.

#![forbid(unsafe_code)]

use ctlog::{
    ser::{decode_proof, decode_sot, decode_sth},
    sign_leaf, verify_ownership, verify_proof, verify_tree_head, Adjudicator, ClaimResponse,
    LogError, LogService, Pk32, Repository,
};
use ctlog_primitives::{ct_eq_hash, CodecError, Hash256};
use ed25519_dalek::SigningKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("log error: {0}")]
    Log(#[from] LogError),
    #[error("malformed response: {0}")]
    Codec(#[from] CodecError),
    #[error("invalid sth signature")]
    InvalidHead,
    #[error("invalid sot signature")]
    InvalidSot,
    #[error("invalid proof")]
    InvalidProof,
    #[error("artifact for wrong hash")]
    WrongHash,
}

/// An artifact a client keeps after registering, to present in a later claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filing {
    /// Serialized signed ownership timestamp.
    Sot(Vec<u8>),
    /// Serialized inclusion proof of the client's own leaf.
    Proof(Vec<u8>),
}

pub struct Client<'a, R: Repository> {
    log: &'a LogService<R>,
    monitor: &'a Adjudicator,
    key: SigningKey,
    log_key: Pk32,
}

impl<'a, R: Repository> Client<'a, R> {
    pub fn new(log: &'a LogService<R>, monitor: &'a Adjudicator, key: SigningKey) -> Self {
        let log_key = log.get_pubkey();
        Self {
            log,
            monitor,
            key,
            log_key,
        }
    }

    #[must_use]
    pub fn public_key(&self) -> Pk32 {
        self.key.verifying_key().to_bytes()
    }

    /// Fetch and check the current head; returns its size and root as hex.
    pub fn show(&self) -> Result<(u64, String), ClientError> {
        let head = decode_sth(&self.log.get_head()?)?;
        if !verify_tree_head(&self.log_key, &head) {
            return Err(ClientError::InvalidHead);
        }
        Ok((head.size, hex::encode(head.hash)))
    }

    /// Register privately, keeping only the signed timestamp.
    pub fn preregister(&self, content: &Hash256, name: &str) -> Result<Filing, ClientError> {
        let bytes = self.log.sign_ownership(content, name)?;
        let sot = decode_sot(&bytes)?;
        if !verify_ownership(&self.log_key, &sot) {
            return Err(ClientError::InvalidSot);
        }
        if !ct_eq_hash(&sot.ownership.content_hash, content) {
            return Err(ClientError::WrongHash);
        }
        Ok(Filing::Sot(bytes))
    }

    /// Register publicly and keep the proof of the new leaf.
    pub fn register(
        &self,
        content: &Hash256,
        name: &str,
        private_data: &str,
        public_data: &str,
    ) -> Result<(u64, Filing), ClientError> {
        let index = self.log.append_entry(
            content,
            name,
            &self.public_key(),
            private_data.as_bytes(),
            public_data.as_bytes(),
        )?;
        let bytes = self.log.get_entry_and_proof(index)?;
        let proof = decode_proof(&bytes)?;
        if !verify_proof(&self.log_key, &proof) {
            return Err(ClientError::InvalidProof);
        }
        if !ct_eq_hash(&proof.leaf.ownership.content_hash, content) {
            return Err(ClientError::WrongHash);
        }
        Ok((index, Filing::Proof(bytes)))
    }

    /// Dispute the leaf at `index` with a kept filing.
    pub fn claim(&self, filing: &Filing, index: u64) -> Result<ClaimResponse, ClientError> {
        let claimed = self.log.get_entry_and_proof(index)?;
        match filing {
            Filing::Sot(sot) => Ok(self.monitor.claim_private(sot, &claimed)),
            Filing::Proof(own) => {
                let proof = decode_proof(own)?;
                let sig = sign_leaf(&self.key, &proof.leaf)?;
                Ok(self.monitor.claim_public(own, &claimed, &sig))
            }
        }
    }
}
