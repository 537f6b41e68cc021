//! Append-only Merkle tree over a transactional store.
//!
//! One writer at a time appends a leaf and rewrites the hashes on its path to
//! the root inside a single write transaction; readers work from snapshots and
//! never wait for the writer.

use std::sync::atomic::{AtomicU64, Ordering};

use ctlog_primitives::{hash_leaf, Hash256, ZERO_HASH};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::{
    errors::{LogError, LogResult},
    merkle::NodeRange,
    ser::encode_leaf,
    storage::{ReadTransaction, Repository, StoreError, WriteTransaction},
    types::{InclusionProof, SignedTreeHead, Timestamp, TreeLeaf},
};

pub struct MerkleTree<R: Repository> {
    repo: R,
    writer: Mutex<()>,
    size: AtomicU64,
}

/// Hash of `range` as seen by `tx`. Ranges with nothing persisted hash to zero.
fn node_hash<T: ReadTransaction>(tx: &T, range: NodeRange) -> LogResult<Hash256> {
    if range.is_leaf() {
        return Ok(tx
            .get_leaf_bytes(range.left)?
            .map_or(ZERO_HASH, |b| hash_leaf(&b)));
    }
    Ok(tx.get_node_hash(range)?.unwrap_or(ZERO_HASH))
}

fn head_at<T: ReadTransaction>(tx: &T, size: u64) -> LogResult<SignedTreeHead> {
    Ok(SignedTreeHead {
        size,
        timestamp: Timestamp::now(),
        hash: node_hash(tx, NodeRange::root_for(size))?,
        signature: None,
    })
}

fn missing_leaf(index: u64) -> LogError {
    StoreError::Missing {
        key: format!("leaf {index}"),
    }
    .into()
}

impl<R: Repository> MerkleTree<R> {
    /// Open a tree over `repo`, picking up the persisted size.
    pub fn new(repo: R) -> LogResult<Self> {
        let size = repo.read_transaction()?.get_size()?;
        info!(size, "opened merkle tree");
        Ok(Self {
            repo,
            writer: Mutex::new(()),
            size: AtomicU64::new(size),
        })
    }

    /// Leaf count as of the last committed append.
    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Acquire)
    }

    pub const fn repository(&self) -> &R {
        &self.repo
    }

    /// Unsigned head for the latest committed state.
    pub fn head(&self) -> LogResult<SignedTreeHead> {
        let tx = self.repo.read_transaction()?;
        let size = tx.get_size()?;
        head_at(&tx, size)
    }

    pub fn get_leaf(&self, index: u64) -> LogResult<Option<TreeLeaf>> {
        let tx = self.repo.read_transaction()?;
        if index >= tx.get_size()? {
            return Ok(None);
        }
        Ok(tx.get_leaf(index)?)
    }

    /// Leaves `[start, end)`, with `end` clamped to the size. Empty past the end.
    pub fn get_leaves(&self, start: u64, end: u64) -> LogResult<Vec<TreeLeaf>> {
        let tx = self.repo.read_transaction()?;
        let end = end.min(tx.get_size()?);
        (start..end)
            .map(|i| tx.get_leaf(i)?.ok_or_else(|| missing_leaf(i)))
            .collect()
    }

    /// Append `leaf` and return its index.
    ///
    /// The leaf, every hash on its path to the root and the new size land in
    /// one commit.
    pub fn append(&self, leaf: &TreeLeaf) -> LogResult<u64> {
        let bytes = encode_leaf(leaf)?;
        let _guard = self.writer.lock();
        let mut tx = self.repo.write_transaction()?;
        let index = tx.get_size()?;
        let size = index + 1;
        tx.put_leaf(index, &bytes)?;

        let mut pos = NodeRange::leaf(index);
        let mut acc = hash_leaf(&bytes);
        while !pos.is_root(size) {
            let sib = pos.sibling();
            let sib_hash = if sib.left >= size {
                ZERO_HASH
            } else {
                node_hash(&tx, sib)?
            };
            acc = pos.combine(&acc, &sib_hash);
            pos = pos.parent();
            tx.put_node_hash(pos, &acc)?;
        }

        tx.put_size(size)?;
        tx.commit()?;
        self.size.store(size, Ordering::Release);
        debug!(index, root_width = pos.width(), "appended leaf");
        Ok(index)
    }

    /// Unsigned inclusion proof for the leaf at `index` against the current head.
    pub fn get_leaf_proof(&self, index: u64) -> LogResult<InclusionProof> {
        let tx = self.repo.read_transaction()?;
        let size = tx.get_size()?;
        if index >= size {
            return Err(LogError::IndexOutOfRange { index, size });
        }
        let leaf = tx.get_leaf(index)?.ok_or_else(|| missing_leaf(index))?;
        let head = head_at(&tx, size)?;

        let mut hashes = Vec::new();
        let mut pos = NodeRange::leaf(index);
        while !pos.is_root(size) {
            let sib = pos.sibling();
            hashes.push(if sib.left >= size {
                ZERO_HASH
            } else {
                node_hash(&tx, sib)?
            });
            pos = pos.parent();
        }
        debug!(index, size, path = hashes.len(), "built inclusion proof");
        Ok(InclusionProof {
            head,
            index,
            leaf,
            hashes,
        })
    }
}
