use core::convert::TryFrom;
use std::time::{SystemTime, UNIX_EPOCH};

use ctlog_primitives::{constants::MAX_NAME_LEN, CodecError, Hash256, Sig64};

/// Wall-clock instant with nanosecond precision, always UTC.
///
/// Ordering is chronological; serialization is the fixed 15-byte layout in [`crate::ser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    secs: i64,
    nanos: u32,
}

impl Timestamp {
    /// Build from Unix seconds and a sub-second nanosecond part.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::TimestampNanos` if `nanos` is not below one second.
    pub const fn from_unix(secs: i64, nanos: u32) -> Result<Self, CodecError> {
        if nanos >= 1_000_000_000 {
            return Err(CodecError::TimestampNanos);
        }
        Ok(Self { secs, nanos })
    }

    #[must_use]
    pub fn now() -> Self {
        let d = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            secs: i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            nanos: d.subsec_nanos(),
        }
    }

    #[must_use]
    pub const fn unix_secs(&self) -> i64 {
        self.secs
    }

    #[must_use]
    pub const fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    /// Strictly earlier than `other`.
    #[must_use]
    pub fn is_before(&self, other: &Self) -> bool {
        self < other
    }
}

/// A content hash together with the name claiming it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ownership {
    pub content_hash: Hash256,
    pub name: String,
}

impl Ownership {
    /// Validate raw request fields into an ownership record.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::InvalidLength` for a content hash that is not 32 bytes
    /// and `CodecError::TooLong` for names over 255 bytes.
    pub fn new(content_hash: &[u8], name: impl Into<String>) -> Result<Self, CodecError> {
        let name = name.into();
        if name.len() > MAX_NAME_LEN {
            return Err(CodecError::TooLong {
                got: name.len(),
                max: MAX_NAME_LEN,
            });
        }
        let content_hash = Hash256::try_from(content_hash).map_err(|_| {
            CodecError::InvalidLength {
                expected: 32,
                got: content_hash.len(),
            }
        })?;
        Ok(Self { content_hash, name })
    }
}

/// Off-log attestation that `ownership` was registered before `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedOwnershipTimestamp {
    pub timestamp: Timestamp,
    pub ownership: Ownership,
    pub signature: Sig64,
}

/// Authority attestation of tree size and root at an instant.
///
/// `signature` is `None` until the authority signs the head; the engine only
/// ever produces unsigned heads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTreeHead {
    pub size: u64,
    pub timestamp: Timestamp,
    pub hash: Hash256,
    pub signature: Option<Sig64>,
}

/// One appended ownership record. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLeaf {
    pub created: Timestamp,
    pub ownership: Ownership,
    /// Submitter's key, used to authenticate public claims. Not length-checked on append.
    pub public_key: Vec<u8>,
    /// Contact data released to a winning private claim (ciphertext).
    pub private_claim_data: Vec<u8>,
    /// Contact data released to a winning public claim (ciphertext).
    pub public_claim_data: Vec<u8>,
}

/// Leaf + head + sibling path, verifiable without store access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionProof {
    pub head: SignedTreeHead,
    pub index: u64,
    pub leaf: TreeLeaf,
    /// Sibling hashes from leaf to root.
    pub hashes: Vec<Hash256>,
}

/// A leaf announced to followers, with its position in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLeaf {
    pub index: u64,
    pub leaf: TreeLeaf,
}
