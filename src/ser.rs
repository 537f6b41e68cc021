//! Canonical wire codecs.
//!
//! All integers are big-endian; variable fields carry a `u16` length prefix
//! (ownership names a single length byte). Decoders are strict: short input,
//! trailing bytes and malformed fixed fields are rejected before any
//! cryptographic check sees the value.

use ctlog_primitives::{
    constants::{
        MAX_FIELD_LEN, MAX_NAME_LEN, MAX_PROOF_HASHES, SIGNATURE_LEN, TIMESTAMP_LEN, TIMESTAMP_VERSION,
        UNIX_TO_ABSOLUTE_SECS, UTC_OFFSET_MARKER,
    },
    write_prefixed, CodecError, Reader, Sig64,
};

use crate::types::{
    InclusionProof, Ownership, SignedOwnershipTimestamp, SignedTreeHead, Timestamp, TreeLeaf,
};

// ——— Timestamp ————————————————————————————————————————————————

/// `version(1) || seconds since year 1 (i64) || nanos (i32) || zone offset minutes (i16)`
#[must_use]
pub fn encode_timestamp(ts: &Timestamp) -> [u8; TIMESTAMP_LEN] {
    let mut out = [0u8; TIMESTAMP_LEN];
    out[0] = TIMESTAMP_VERSION;
    let abs = ts.unix_secs().wrapping_add(UNIX_TO_ABSOLUTE_SECS);
    out[1..9].copy_from_slice(&abs.to_be_bytes());
    // nanos < 10^9 always fits in i32
    out[9..13].copy_from_slice(&ts.subsec_nanos().to_be_bytes());
    out[13..15].copy_from_slice(&UTC_OFFSET_MARKER.to_be_bytes());
    out
}

pub fn decode_timestamp(b: &[u8]) -> Result<Timestamp, CodecError> {
    let mut r = Reader::new(b);
    let ts = read_timestamp(&mut r)?;
    r.finish()?;
    Ok(ts)
}

fn read_timestamp(r: &mut Reader<'_>) -> Result<Timestamp, CodecError> {
    let version = r.read_u8()?;
    if version != TIMESTAMP_VERSION {
        return Err(CodecError::TimestampVersion(version));
    }
    let abs = i64::from_be_bytes(r.read_array()?);
    let nanos = i32::from_be_bytes(r.read_array()?);
    // zone offset is presentation only; instants are stored in UTC
    let _offset = i16::from_be_bytes(r.read_array()?);
    let nanos = u32::try_from(nanos).map_err(|_| CodecError::TimestampNanos)?;
    Timestamp::from_unix(abs.wrapping_sub(UNIX_TO_ABSOLUTE_SECS), nanos)
}

// ——— Ownership ————————————————————————————————————————————————

/// `content_hash(32) || name_len(u8) || name`
pub fn encode_ownership(o: &Ownership) -> Result<Vec<u8>, CodecError> {
    let name = o.name.as_bytes();
    let len = u8::try_from(name.len()).map_err(|_| CodecError::TooLong {
        got: name.len(),
        max: MAX_NAME_LEN,
    })?;
    let mut out = Vec::with_capacity(32 + 1 + name.len());
    out.extend_from_slice(&o.content_hash);
    out.push(len);
    out.extend_from_slice(name);
    Ok(out)
}

pub fn decode_ownership(b: &[u8]) -> Result<Ownership, CodecError> {
    let mut r = Reader::new(b);
    let o = read_ownership(&mut r)?;
    r.finish()?;
    Ok(o)
}

fn read_ownership(r: &mut Reader<'_>) -> Result<Ownership, CodecError> {
    let content_hash = r.read_hash()?;
    let len = r.read_u8()?;
    let name = r.read_exact(usize::from(len))?;
    let name = core::str::from_utf8(name)
        .map_err(|_| CodecError::NameEncoding)?
        .to_owned();
    Ok(Ownership { content_hash, name })
}

// ——— Signed ownership timestamp ————————————————————————————————

/// `timestamp(15) || ownership || signature(64)`
pub fn encode_sot(sot: &SignedOwnershipTimestamp) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(TIMESTAMP_LEN + 33 + sot.ownership.name.len() + SIGNATURE_LEN);
    out.extend_from_slice(&encode_timestamp(&sot.timestamp));
    out.extend_from_slice(&encode_ownership(&sot.ownership)?);
    out.extend_from_slice(&sot.signature);
    Ok(out)
}

pub fn decode_sot(b: &[u8]) -> Result<SignedOwnershipTimestamp, CodecError> {
    let mut r = Reader::new(b);
    let timestamp = read_timestamp(&mut r)?;
    let ownership = read_ownership(&mut r)?;
    let signature: Sig64 = r.read_array()?;
    r.finish()?;
    Ok(SignedOwnershipTimestamp {
        timestamp,
        ownership,
        signature,
    })
}

// ——— Signed tree head ————————————————————————————————————————

/// `size(u64) || timestamp(15) || root_hash(32) || signature(0 or 64)`
#[must_use]
pub fn encode_sth(sth: &SignedTreeHead) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + TIMESTAMP_LEN + 32 + SIGNATURE_LEN);
    out.extend_from_slice(&sth.size.to_be_bytes());
    out.extend_from_slice(&encode_timestamp(&sth.timestamp));
    out.extend_from_slice(&sth.hash);
    if let Some(sig) = &sth.signature {
        out.extend_from_slice(sig);
    }
    out
}

pub fn decode_sth(b: &[u8]) -> Result<SignedTreeHead, CodecError> {
    let mut r = Reader::new(b);
    let size = r.read_u64()?;
    let timestamp = read_timestamp(&mut r)?;
    let hash = r.read_hash()?;
    let sig = r.read_rest();
    let signature = match sig.len() {
        0 => None,
        SIGNATURE_LEN => {
            let mut s = [0u8; SIGNATURE_LEN];
            s.copy_from_slice(sig);
            Some(s)
        }
        got => {
            return Err(CodecError::InvalidLength {
                expected: SIGNATURE_LEN,
                got,
            })
        }
    };
    Ok(SignedTreeHead {
        size,
        timestamp,
        hash,
        signature,
    })
}

// ——— Tree leaf ————————————————————————————————————————————————

/// `created(15) || [ownership] || [public_key] || [private data] || [public data]`,
/// each bracketed field `u16`-prefixed.
///
/// The whole encoding must itself fit a `u16` prefix, since an inclusion proof
/// carries the leaf as one prefixed field.
pub fn encode_leaf(leaf: &TreeLeaf) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(
        TIMESTAMP_LEN
            + 8
            + 33
            + leaf.ownership.name.len()
            + leaf.public_key.len()
            + leaf.private_claim_data.len()
            + leaf.public_claim_data.len(),
    );
    out.extend_from_slice(&encode_timestamp(&leaf.created));
    write_prefixed(&mut out, &encode_ownership(&leaf.ownership)?)?;
    write_prefixed(&mut out, &leaf.public_key)?;
    write_prefixed(&mut out, &leaf.private_claim_data)?;
    write_prefixed(&mut out, &leaf.public_claim_data)?;
    if out.len() > MAX_FIELD_LEN {
        return Err(CodecError::TooLong {
            got: out.len(),
            max: MAX_FIELD_LEN,
        });
    }
    Ok(out)
}

pub fn decode_leaf(b: &[u8]) -> Result<TreeLeaf, CodecError> {
    let mut r = Reader::new(b);
    let created = read_timestamp(&mut r)?;
    let ownership = decode_ownership(r.read_prefixed()?)?;
    let public_key = r.read_prefixed()?.to_vec();
    let private_claim_data = r.read_prefixed()?.to_vec();
    let public_claim_data = r.read_prefixed()?.to_vec();
    r.finish()?;
    Ok(TreeLeaf {
        created,
        ownership,
        public_key,
        private_claim_data,
        public_claim_data,
    })
}

// ——— Inclusion proof ————————————————————————————————————————

/// `[sth] || index(u64) || [leaf] || count(u16) || count * 32-byte hashes`
pub fn encode_proof(proof: &InclusionProof) -> Result<Vec<u8>, CodecError> {
    let count = u16::try_from(proof.hashes.len()).map_err(|_| CodecError::TooLong {
        got: proof.hashes.len(),
        max: MAX_PROOF_HASHES,
    })?;
    let leaf = encode_leaf(&proof.leaf)?;
    let mut out = Vec::with_capacity(2 + 119 + 8 + 2 + leaf.len() + 2 + 32 * proof.hashes.len());
    write_prefixed(&mut out, &encode_sth(&proof.head))?;
    out.extend_from_slice(&proof.index.to_be_bytes());
    write_prefixed(&mut out, &leaf)?;
    out.extend_from_slice(&count.to_be_bytes());
    for h in &proof.hashes {
        out.extend_from_slice(h);
    }
    Ok(out)
}

pub fn decode_proof(b: &[u8]) -> Result<InclusionProof, CodecError> {
    let mut r = Reader::new(b);
    let head = decode_sth(r.read_prefixed()?)?;
    let index = r.read_u64()?;
    let leaf = decode_leaf(r.read_prefixed()?)?;
    let count = usize::from(r.read_u16()?);
    if r.remaining() != 32 * count {
        return Err(CodecError::InvalidLength {
            expected: 32 * count,
            got: r.remaining(),
        });
    }
    let mut hashes = Vec::with_capacity(count);
    for _ in 0..count {
        hashes.push(r.read_hash()?);
    }
    r.finish()?;
    Ok(InclusionProof {
        head,
        index,
        leaf,
        hashes,
    })
}
