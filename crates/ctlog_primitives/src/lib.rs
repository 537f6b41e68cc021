#![forbid(unsafe_code)]
#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

//! ctlog primitives: hashing, checksum tags, fixed-width big-endian encodings.
//
// This crate holds the normative utilities shared by the log engine and its clients:
//
// - SHA3-256 leaf and interior node hashing
// - Tagged checksums over signable structures
// - Big-endian integer encodings and a bounded read cursor for strict decoding
// - Constant-time equality for 32-byte digests

use sha3::{Digest, Sha3_256};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// 32-byte hash (SHA3-256 output).
pub type Hash256 = [u8; 32];

/// 32-byte public key (Ed25519).
pub type Pk32 = [u8; 32];

/// 64-byte signature (Ed25519 canonical encoding).
pub type Sig64 = [u8; 64];

/// Hash of a range that holds no leaves yet.
pub const ZERO_HASH: Hash256 = [0u8; 32];

pub mod constants;

/// Hash of a serialized leaf.
#[must_use]
pub fn hash_leaf(serialized: &[u8]) -> Hash256 {
    finish(Sha3_256::new_with_prefix(serialized))
}

/// Hash of an interior node from its two children.
#[must_use]
pub fn hash_children(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut h = Sha3_256::new();
    h.update(left);
    h.update(right);
    finish(h)
}

/// Tagged checksum: `SHA3_256( UTF8(tag) || parts... )`.
///
/// Parts are concatenated without framing; every signable structure feeds
/// fixed-width fields or its own length-prefixed serialization.
#[must_use]
pub fn checksum(tag: &str, parts: &[&[u8]]) -> Hash256 {
    let mut h = Sha3_256::new();
    h.update(tag.as_bytes());
    for p in parts {
        h.update(p);
    }
    finish(h)
}

fn finish(h: Sha3_256) -> Hash256 {
    let digest = h.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Constant-time equality for two 32-byte hashes.
#[must_use]
pub fn ct_eq_hash(a: &Hash256, b: &Hash256) -> bool {
    a.ct_eq(b).into()
}

// ——— Encodings ————————————————————————————————————————————————

/// Malformed wire input. Raised before any cryptographic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("input too short")]
    Short,
    #[error("trailing bytes after decode")]
    Trailing,
    #[error("field of {got} bytes exceeds limit {max}")]
    TooLong { got: usize, max: usize },
    #[error("invalid length: expected {expected} got {got}")]
    InvalidLength { expected: usize, got: usize },
    #[error("unsupported timestamp version {0}")]
    TimestampVersion(u8),
    #[error("timestamp nanoseconds out of range")]
    TimestampNanos,
    #[error("name is not valid UTF-8")]
    NameEncoding,
}

/// Bounded read cursor over an input slice.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    src: &'a [u8],
}

impl<'a> Reader<'a> {
    #[must_use]
    pub const fn new(src: &'a [u8]) -> Self {
        Self { src }
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.src.len()
    }

    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.src.len() < n {
            return Err(CodecError::Short);
        }
        let (a, b) = self.src.split_at(n);
        self.src = b;
        Ok(a)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let b = self.read_exact(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(b);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    pub fn read_hash(&mut self) -> Result<Hash256, CodecError> {
        self.read_array()
    }

    /// `u16` length prefix followed by that many bytes.
    pub fn read_prefixed(&mut self) -> Result<&'a [u8], CodecError> {
        let n = self.read_u16()?;
        self.read_exact(usize::from(n))
    }

    /// Everything not yet consumed.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = self.src;
        self.src = &[];
        rest
    }

    pub const fn finish(self) -> Result<(), CodecError> {
        if self.src.is_empty() {
            Ok(())
        } else {
            Err(CodecError::Trailing)
        }
    }
}

/// Append a `u16` length prefix and the bytes.
pub fn write_prefixed(out: &mut Vec<u8>, bytes: &[u8]) -> Result<(), CodecError> {
    let n = u16::try_from(bytes.len()).map_err(|_| CodecError::TooLong {
        got: bytes.len(),
        max: constants::MAX_FIELD_LEN,
    })?;
    out.extend_from_slice(&n.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

/// Big-endian `u64` key for a leaf index.
#[must_use]
pub const fn be64(x: u64) -> [u8; 8] {
    x.to_be_bytes()
}

/// Big-endian `(left, right)` key for an interior node range.
#[must_use]
pub fn be64_pair(a: u64, b: u64) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[..8].copy_from_slice(&a.to_be_bytes());
    out[8..].copy_from_slice(&b.to_be_bytes());
    out
}
