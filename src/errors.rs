use ctlog_primitives::CodecError;
use thiserror::Error;

use crate::storage::StoreError;

pub type LogResult<T> = Result<T, LogError>;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("malformed input: {0}")]
    Codec(#[from] CodecError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("index out of range: {index} not in [0, {size})")]
    IndexOutOfRange { index: u64, size: u64 },

    #[error("invalid range [{start}, {end}): {reason}")]
    InvalidRange {
        start: u64,
        end: u64,
        reason: &'static str,
    },

    #[error("invalid content hash: expected 32 bytes got {0}")]
    InvalidContentHash(usize),

    #[error("payload encryption failed")]
    Encryption,

    #[error("config error: {0}")]
    Config(String),
}

/// Why a claim was refused. Checks run in declaration order within each
/// claim kind and stop at the first failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ClaimDenied {
    #[error("malformed claim input: {0}")]
    Malformed(CodecError),

    #[error("invalid ownership timestamp signature")]
    InvalidOwnershipSignature,

    #[error("invalid claiming tree head signature")]
    InvalidClaimingHeadSignature,

    #[error("invalid claiming inclusion proof")]
    InvalidClaimingProof,

    #[error("invalid claimed tree head signature")]
    InvalidClaimedHeadSignature,

    #[error("invalid claimed inclusion proof")]
    InvalidClaimedProof,

    #[error("this is not your content")]
    ContentHashMismatch,

    #[error("claimed content was first")]
    NotEarlier,

    #[error("claimed content was first")]
    NotLater,

    #[error("invalid claiming leaf signature")]
    InvalidLeafSignature,

    #[error("could not decrypt claim data")]
    Undecryptable,
}

impl From<CodecError> for ClaimDenied {
    fn from(e: CodecError) -> Self {
        Self::Malformed(e)
    }
}
