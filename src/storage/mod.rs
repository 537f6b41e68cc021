//! Transactional key→bytes store behind the tree engine.
//!
//! Reads run in snapshot transactions that never block the writer; writes run
//! in a single exclusive transaction whose puts become visible atomically at
//! commit. Dropping a transaction without committing discards it.
//!
//! Key layout:
//! - leaf: `BE64(index)` → serialized leaf
//! - interior node: `BE64(left) || BE64(right)` → 32-byte hash
//! - `"size"` → `BE64(size)`

use ctlog_primitives::{be64, be64_pair, constants::KEY_SIZE, Hash256};

use crate::{merkle::NodeRange, ser::decode_leaf, types::TreeLeaf};

pub mod any;
pub mod error;
pub mod memory;
pub mod sqlite;

pub use any::AnyRepository;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;

/// Snapshot view of the store.
pub trait ReadTransaction {
    /// Raw lookup. A missing key is `Ok(None)`.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Release the snapshot. Equivalent to dropping the transaction.
    fn discard(self)
    where
        Self: Sized,
    {
    }

    /// Serialized leaf bytes at `index`, exactly as they were hashed on append.
    fn get_leaf_bytes(&self, index: u64) -> StoreResult<Option<Vec<u8>>> {
        self.get(&be64(index))
    }

    fn get_leaf(&self, index: u64) -> StoreResult<Option<TreeLeaf>> {
        self.get_leaf_bytes(index)?
            .map(|b| {
                decode_leaf(&b).map_err(|source| StoreError::Corrupt {
                    key: format!("leaf {index}"),
                    source,
                })
            })
            .transpose()
    }

    fn get_node_hash(&self, range: NodeRange) -> StoreResult<Option<Hash256>> {
        let Some(b) = self.get(&be64_pair(range.left, range.right))? else {
            return Ok(None);
        };
        let hash = Hash256::try_from(b.as_slice()).map_err(|_| StoreError::BadWidth {
            key: format!("node [{}, {})", range.left, range.right),
            len: b.len(),
        })?;
        Ok(Some(hash))
    }

    /// Persisted leaf count; an absent counter is an empty log.
    fn get_size(&self) -> StoreResult<u64> {
        let Some(b) = self.get(KEY_SIZE)? else {
            return Ok(0);
        };
        let raw = <[u8; 8]>::try_from(b.as_slice()).map_err(|_| StoreError::BadWidth {
            key: "size".to_owned(),
            len: b.len(),
        })?;
        Ok(u64::from_be_bytes(raw))
    }
}

/// Exclusive read-write view. Reads observe this transaction's own puts.
pub trait WriteTransaction: ReadTransaction {
    fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Atomically publish every put made in this transaction.
    fn commit(self) -> StoreResult<()>;

    fn put_leaf(&mut self, index: u64, serialized: &[u8]) -> StoreResult<()> {
        self.put(&be64(index), serialized)
    }

    fn put_node_hash(&mut self, range: NodeRange, hash: &Hash256) -> StoreResult<()> {
        self.put(&be64_pair(range.left, range.right), hash)
    }

    fn put_size(&mut self, size: u64) -> StoreResult<()> {
        self.put(KEY_SIZE, &be64(size))
    }
}

/// A store that hands out read and write transactions.
pub trait Repository: Send + Sync {
    type Reader: ReadTransaction;
    type Writer: WriteTransaction;

    /// Begin a snapshot read. Never waits for an in-flight writer.
    fn read_transaction(&self) -> StoreResult<Self::Reader>;

    /// Begin the exclusive write transaction, waiting for any other writer.
    fn write_transaction(&self) -> StoreResult<Self::Writer>;
}
