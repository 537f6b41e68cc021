//! Pointerless Merkle tree arithmetic.
//!
//! Every node is a half-open leaf range `[left, right)` whose width is a power
//! of two and whose `left` is a multiple of that width. Parent, sibling and
//! root are derived from the range alone; persisted state is a flat map from
//! range to hash.

use ctlog_primitives::{ct_eq_hash, hash_children, hash_leaf, Hash256, ZERO_HASH};

use crate::{ser::encode_leaf, types::InclusionProof, types::TreeLeaf};

/// Largest tree the range arithmetic can address: every range then lies
/// within `[0, 2^63]`.
pub const MAX_TREE_SIZE: u64 = 1 << 63;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRange {
    pub left: u64,
    pub right: u64,
}

impl NodeRange {
    /// Range of the single leaf at `index`.
    #[must_use]
    pub const fn leaf(index: u64) -> Self {
        Self {
            left: index,
            right: index + 1,
        }
    }

    /// Smallest `[0, 2^k)` covering `size` leaves (`[0, 1)` for an empty tree).
    #[must_use]
    pub const fn root_for(size: u64) -> Self {
        let mut right = 1u64;
        while right < size {
            right *= 2;
        }
        Self { left: 0, right }
    }

    #[must_use]
    pub const fn width(&self) -> u64 {
        self.right - self.left
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.width() == 1
    }

    /// Whether this range is the root of a tree holding `size` leaves.
    #[must_use]
    pub const fn is_root(&self, size: u64) -> bool {
        self.left == 0 && self.right >= size
    }

    /// `left` is a multiple of twice the width.
    #[must_use]
    pub const fn is_left_child(&self) -> bool {
        self.left & self.width() == 0
    }

    #[must_use]
    pub const fn parent(&self) -> Self {
        let w = self.width();
        if self.is_left_child() {
            Self {
                left: self.left,
                right: self.right + w,
            }
        } else {
            Self {
                left: self.left - w,
                right: self.right,
            }
        }
    }

    #[must_use]
    pub const fn sibling(&self) -> Self {
        let w = self.width();
        if self.is_left_child() {
            Self {
                left: self.right,
                right: self.right + w,
            }
        } else {
            Self {
                left: self.left - w,
                right: self.left,
            }
        }
    }

    /// Fold `own` with the sibling hash into the parent hash.
    #[must_use]
    pub fn combine(&self, own: &Hash256, sibling: &Hash256) -> Hash256 {
        if self.is_left_child() {
            hash_children(own, sibling)
        } else {
            hash_children(sibling, own)
        }
    }
}

/// Leaf hash over the canonical serialization; `None` if the leaf cannot be encoded.
#[must_use]
pub fn leaf_hash(leaf: &TreeLeaf) -> Option<Hash256> {
    encode_leaf(leaf).ok().map(|b| hash_leaf(&b))
}

/// Check the proof's hash chain against its head. Does not check the head signature.
///
/// Beyond folding the path to the root hash this enforces that:
/// - `index < head.size <= MAX_TREE_SIZE`,
/// - the walk reaches the root for `head.size` exactly when the hashes run out,
/// - siblings starting at or past `head.size` carry the zero hash and no other sibling does.
#[must_use]
pub fn verify_leaf_proof_hashes(proof: &InclusionProof) -> bool {
    let size = proof.head.size;
    if size > MAX_TREE_SIZE || proof.index >= size {
        return false;
    }
    let Some(mut acc) = leaf_hash(&proof.leaf) else {
        return false;
    };
    let mut pos = NodeRange::leaf(proof.index);
    for sib in &proof.hashes {
        if pos.is_root(size) {
            return false;
        }
        let sib_range = pos.sibling();
        let sib_is_zero = ct_eq_hash(sib, &ZERO_HASH);
        if sib_is_zero != (sib_range.left >= size) {
            return false;
        }
        acc = pos.combine(&acc, sib);
        pos = pos.parent();
    }
    pos.is_root(size) && ct_eq_hash(&acc, &proof.head.hash)
}
