//! Multi-version in-memory store.
//!
//! Every committed put is kept as `(version, value)`; a read transaction pins
//! the version that was current when it began and never sees later commits.
//! The writer holds an exclusive lock for its whole lifetime and publishes its
//! buffered puts under the next version in one step.
//!
//! Open readers are counted per pinned version. A commit drops, for each key
//! it writes, the versions that neither the latest state nor any open reader
//! can still observe.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use parking_lot::{ArcMutexGuard, Mutex, RawMutex, RwLock};

use super::{ReadTransaction, Repository, StoreResult, WriteTransaction};

type Versions = Vec<(u64, Arc<[u8]>)>;

#[derive(Default)]
struct State {
    version: u64,
    entries: HashMap<Vec<u8>, Versions>,
    /// Pinned version -> number of open readers.
    readers: BTreeMap<u64, usize>,
}

impl State {
    fn pin(&mut self) -> u64 {
        *self.readers.entry(self.version).or_default() += 1;
        self.version
    }

    fn unpin(&mut self, version: u64) {
        if let Some(n) = self.readers.get_mut(&version) {
            *n -= 1;
            if *n == 0 {
                self.readers.remove(&version);
            }
        }
    }

    fn get_at(&self, key: &[u8], version: u64) -> Option<Vec<u8>> {
        self.entries.get(key).and_then(|versions| {
            versions
                .iter()
                .rev()
                .find(|(v, _)| *v <= version)
                .map(|(_, value)| value.to_vec())
        })
    }
}

#[derive(Default)]
struct Shared {
    state: RwLock<State>,
    writer: Arc<Mutex<()>>,
}

/// In-memory repository. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    shared: Arc<Shared>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Version of the latest commit (0 for a fresh store).
    #[must_use]
    pub fn committed_version(&self) -> u64 {
        self.shared.state.read().version
    }

    /// Number of values held for `key` across all retained versions.
    #[must_use]
    pub fn retained_versions(&self, key: &[u8]) -> usize {
        self.shared.state.read().entries.get(key).map_or(0, Vec::len)
    }
}

/// Keep the newest value and each value some pinned reader resolves to.
fn prune(versions: &mut Versions, readers: &BTreeMap<u64, usize>) {
    let mut next: Option<u64> = None;
    let mut keep = vec![false; versions.len()];
    for (i, (v, _)) in versions.iter().enumerate().rev() {
        keep[i] = match next {
            None => true,
            Some(n) => readers.range(*v..n).next().is_some(),
        };
        next = Some(*v);
    }
    let mut flags = keep.into_iter();
    versions.retain(|_| flags.next().unwrap_or(true));
}

pub struct MemoryReadTransaction {
    shared: Arc<Shared>,
    version: u64,
}

impl ReadTransaction for MemoryReadTransaction {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.shared.state.read().get_at(key, self.version))
    }
}

impl Drop for MemoryReadTransaction {
    fn drop(&mut self) {
        self.shared.state.write().unpin(self.version);
    }
}

pub struct MemoryWriteTransaction {
    shared: Arc<Shared>,
    base: u64,
    pending: HashMap<Vec<u8>, Vec<u8>>,
    _guard: ArcMutexGuard<RawMutex, ()>,
}

impl ReadTransaction for MemoryWriteTransaction {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        if let Some(v) = self.pending.get(key) {
            return Ok(Some(v.clone()));
        }
        Ok(self.shared.state.read().get_at(key, self.base))
    }
}

impl WriteTransaction for MemoryWriteTransaction {
    fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.pending.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn commit(self) -> StoreResult<()> {
        let mut guard = self.shared.state.write();
        let state = &mut *guard;
        let version = state.version + 1;
        for (key, value) in self.pending {
            let versions = state.entries.entry(key).or_default();
            versions.push((version, Arc::from(value)));
            prune(versions, &state.readers);
        }
        state.version = version;
        Ok(())
    }
}

impl Repository for MemoryRepository {
    type Reader = MemoryReadTransaction;
    type Writer = MemoryWriteTransaction;

    fn read_transaction(&self) -> StoreResult<Self::Reader> {
        // pin under the write lock so no commit prunes in between
        let version = self.shared.state.write().pin();
        Ok(MemoryReadTransaction {
            shared: Arc::clone(&self.shared),
            version,
        })
    }

    fn write_transaction(&self) -> StoreResult<Self::Writer> {
        let guard = self.shared.writer.lock_arc();
        // read the base only after winning the writer lock
        let base = self.shared.state.read().version;
        Ok(MemoryWriteTransaction {
            shared: Arc::clone(&self.shared),
            base,
            pending: HashMap::new(),
            _guard: guard,
        })
    }
}

#[cfg(test)]
mod tests {
    use ctlog_primitives::constants::KEY_SIZE;

    use super::*;

    #[test]
    fn missing_key_is_none() {
        let repo = MemoryRepository::new();
        let tx = repo.read_transaction().unwrap();
        assert_eq!(tx.get(b"nope").unwrap(), None);
        assert_eq!(tx.get_size().unwrap(), 0);
    }

    #[test]
    fn uncommitted_puts_are_invisible() {
        let repo = MemoryRepository::new();
        let mut w = repo.write_transaction().unwrap();
        w.put(b"k", b"v").unwrap();
        assert_eq!(w.get(b"k").unwrap().as_deref(), Some(&b"v"[..]));

        let r = repo.read_transaction().unwrap();
        assert_eq!(r.get(b"k").unwrap(), None);
        w.discard();

        let r = repo.read_transaction().unwrap();
        assert_eq!(r.get(b"k").unwrap(), None);
        assert_eq!(repo.committed_version(), 0);
    }

    #[test]
    fn reader_keeps_its_snapshot_across_commits() {
        let repo = MemoryRepository::new();
        let mut w = repo.write_transaction().unwrap();
        w.put_size(1).unwrap();
        w.commit().unwrap();

        let old = repo.read_transaction().unwrap();

        let mut w = repo.write_transaction().unwrap();
        w.put_size(2).unwrap();
        w.put(b"extra", b"x").unwrap();
        w.commit().unwrap();

        assert_eq!(old.get_size().unwrap(), 1);
        assert_eq!(old.get(b"extra").unwrap(), None);

        let new = repo.read_transaction().unwrap();
        assert_eq!(new.get_size().unwrap(), 2);
        assert!(new.get(b"extra").unwrap().is_some());
    }

    #[test]
    fn unpinned_versions_are_pruned() {
        let repo = MemoryRepository::new();
        for n in 1..=50 {
            let mut w = repo.write_transaction().unwrap();
            w.put_size(n).unwrap();
            w.commit().unwrap();
        }
        assert_eq!(repo.retained_versions(KEY_SIZE), 1);

        let pinned = repo.read_transaction().unwrap();
        for n in 51..=60 {
            let mut w = repo.write_transaction().unwrap();
            w.put_size(n).unwrap();
            w.commit().unwrap();
        }
        // the reader's version plus the latest
        assert_eq!(repo.retained_versions(KEY_SIZE), 2);
        assert_eq!(pinned.get_size().unwrap(), 50);

        drop(pinned);
        let mut w = repo.write_transaction().unwrap();
        w.put_size(61).unwrap();
        w.commit().unwrap();
        assert_eq!(repo.retained_versions(KEY_SIZE), 1);
        assert_eq!(repo.read_transaction().unwrap().get_size().unwrap(), 61);
    }

    #[test]
    fn pruning_keeps_every_pinned_snapshot() {
        let repo = MemoryRepository::new();
        let mut readers = Vec::new();
        for n in 1..=5 {
            let mut w = repo.write_transaction().unwrap();
            w.put_size(n).unwrap();
            w.put(b"other", &[u8::try_from(n).unwrap()]).unwrap();
            w.commit().unwrap();
            readers.push((n, repo.read_transaction().unwrap()));
        }
        for (n, r) in &readers {
            assert_eq!(r.get_size().unwrap(), *n);
            assert_eq!(r.get(b"other").unwrap(), Some(vec![u8::try_from(*n).unwrap()]));
        }
    }

    #[test]
    fn writers_are_serialized() {
        let repo = MemoryRepository::new();
        let first = repo.write_transaction().unwrap();
        let handle = {
            let repo = repo.clone();
            std::thread::spawn(move || {
                let mut second = repo.write_transaction().unwrap();
                let seen = second.get_size().unwrap();
                second.put_size(seen + 1).unwrap();
                second.commit().unwrap();
                seen
            })
        };
        let mut first = first;
        first.put_size(10).unwrap();
        first.commit().unwrap();
        // the second writer starts from the first writer's commit
        assert_eq!(handle.join().unwrap(), 10);
        assert_eq!(repo.read_transaction().unwrap().get_size().unwrap(), 11);
    }
}
