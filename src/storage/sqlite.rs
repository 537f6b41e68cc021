//! SQLite-backed store.
//!
//! One `kv` table in WAL mode. Each transaction leases its own connection
//! from a small idle pool so readers keep a stable snapshot while the writer
//! commits. Read transactions open with `BEGIN DEFERRED` and touch the table
//! immediately to pin their snapshot; the writer opens with `BEGIN IMMEDIATE`.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use super::{ReadTransaction, Repository, StoreError, StoreResult, WriteTransaction};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key   BLOB PRIMARY KEY,
    value BLOB NOT NULL
)";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Idle connections kept around for reuse.
const MAX_IDLE: usize = 8;

struct Pool {
    path: PathBuf,
    idle: Mutex<Vec<Connection>>,
    writer: Arc<Mutex<()>>,
}

impl Pool {
    fn acquire(&self) -> StoreResult<Connection> {
        if let Some(conn) = self.idle.lock().pop() {
            return Ok(conn);
        }
        connect(&self.path)
    }

    fn release(&self, conn: Connection) {
        let mut idle = self.idle.lock();
        if idle.len() < MAX_IDLE {
            idle.push(conn);
        }
    }
}

fn connect(path: &Path) -> StoreResult<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        warn!(path = %path.display(), mode = %mode, "sqlite store not in WAL mode");
    }
    Ok(conn)
}

/// Durable repository over a single SQLite file. Clones share the pool.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: Arc<Pool>,
}

impl SqliteRepository {
    /// Open or create the database at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or SQLite fails to
    /// open the file or create the schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = connect(&path)?;
        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            pool: Arc::new(Pool {
                path,
                idle: Mutex::new(vec![conn]),
                writer: Arc::new(Mutex::new(())),
            }),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.pool.path
    }
}

/// A pooled connection inside an open SQL transaction.
struct Lease {
    pool: Arc<Pool>,
    conn: Option<Connection>,
    finished: bool,
}

impl Lease {
    fn begin(pool: &Arc<Pool>, sql: &str) -> StoreResult<Self> {
        let conn = pool.acquire()?;
        conn.execute_batch(sql)?;
        Ok(Self {
            pool: Arc::clone(pool),
            conn: Some(conn),
            finished: false,
        })
    }

    fn conn(&self) -> StoreResult<&Connection> {
        self.conn.as_ref().ok_or(StoreError::Finished)
    }

    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached("SELECT value FROM kv WHERE key = ?1")?;
        let value = stmt
            .query_row(params![key], |row| row.get::<_, Vec<u8>>(0))
            .optional()?;
        Ok(value)
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.conn()?.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        if !self.finished {
            if let Err(e) = conn.execute_batch("ROLLBACK") {
                // connection state is unknown; do not return it to the pool
                warn!(error = %e, "sqlite rollback failed");
                return;
            }
        }
        self.pool.release(conn);
    }
}

pub struct SqliteReadTransaction {
    lease: Lease,
}

impl ReadTransaction for SqliteReadTransaction {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.lease.get(key)
    }
}

pub struct SqliteWriteTransaction {
    lease: Lease,
    _guard: ArcMutexGuard<RawMutex, ()>,
}

impl ReadTransaction for SqliteWriteTransaction {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.lease.get(key)
    }
}

impl WriteTransaction for SqliteWriteTransaction {
    fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let conn = self.lease.conn()?;
        let mut stmt = conn.prepare_cached("INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)")?;
        stmt.execute(params![key, value])?;
        Ok(())
    }

    fn commit(mut self) -> StoreResult<()> {
        self.lease.commit()
    }
}

impl Repository for SqliteRepository {
    type Reader = SqliteReadTransaction;
    type Writer = SqliteWriteTransaction;

    fn read_transaction(&self) -> StoreResult<Self::Reader> {
        let lease = Lease::begin(&self.pool, "BEGIN DEFERRED")?;
        // the first read fixes the WAL snapshot
        lease
            .conn()?
            .prepare_cached("SELECT 1 FROM kv LIMIT 1")?
            .query_row([], |_| Ok(()))
            .optional()?;
        Ok(SqliteReadTransaction { lease })
    }

    fn write_transaction(&self) -> StoreResult<Self::Writer> {
        let guard = self.pool.writer.lock_arc();
        let lease = Lease::begin(&self.pool, "BEGIN IMMEDIATE")?;
        Ok(SqliteWriteTransaction {
            lease,
            _guard: guard,
        })
    }
}
