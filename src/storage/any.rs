//! Backend chosen at runtime from configuration.

use super::{
    memory::{MemoryReadTransaction, MemoryWriteTransaction},
    sqlite::{SqliteReadTransaction, SqliteWriteTransaction},
    MemoryRepository, ReadTransaction, Repository, SqliteRepository, StoreResult,
    WriteTransaction,
};

#[derive(Clone)]
pub enum AnyRepository {
    Memory(MemoryRepository),
    Sqlite(SqliteRepository),
}

pub enum AnyReadTransaction {
    Memory(MemoryReadTransaction),
    Sqlite(SqliteReadTransaction),
}

pub enum AnyWriteTransaction {
    Memory(MemoryWriteTransaction),
    Sqlite(SqliteWriteTransaction),
}

impl ReadTransaction for AnyReadTransaction {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        match self {
            Self::Memory(tx) => tx.get(key),
            Self::Sqlite(tx) => tx.get(key),
        }
    }
}

impl ReadTransaction for AnyWriteTransaction {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        match self {
            Self::Memory(tx) => tx.get(key),
            Self::Sqlite(tx) => tx.get(key),
        }
    }
}

impl WriteTransaction for AnyWriteTransaction {
    fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        match self {
            Self::Memory(tx) => tx.put(key, value),
            Self::Sqlite(tx) => tx.put(key, value),
        }
    }

    fn commit(self) -> StoreResult<()> {
        match self {
            Self::Memory(tx) => tx.commit(),
            Self::Sqlite(tx) => tx.commit(),
        }
    }
}

impl Repository for AnyRepository {
    type Reader = AnyReadTransaction;
    type Writer = AnyWriteTransaction;

    fn read_transaction(&self) -> StoreResult<Self::Reader> {
        Ok(match self {
            Self::Memory(r) => AnyReadTransaction::Memory(r.read_transaction()?),
            Self::Sqlite(r) => AnyReadTransaction::Sqlite(r.read_transaction()?),
        })
    }

    fn write_transaction(&self) -> StoreResult<Self::Writer> {
        Ok(match self {
            Self::Memory(r) => AnyWriteTransaction::Memory(r.write_transaction()?),
            Self::Sqlite(r) => AnyWriteTransaction::Sqlite(r.write_transaction()?),
        })
    }
}

impl From<MemoryRepository> for AnyRepository {
    fn from(r: MemoryRepository) -> Self {
        Self::Memory(r)
    }
}

impl From<SqliteRepository> for AnyRepository {
    fn from(r: SqliteRepository) -> Self {
        Self::Sqlite(r)
    }
}
