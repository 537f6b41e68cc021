//! Tracking new leaves as the log grows.
//!
//! A follower remembers the next index it has not reported and pulls new
//! leaves page by page, in log order. Delivering them (websocket, queue, ...)
//! is up to the caller.

use crate::{
    errors::LogResult,
    service::LogService,
    storage::Repository,
    tree::MerkleTree,
    types::{NewLeaf, TreeLeaf},
};

/// Anything that can report its size and hand out leaf ranges.
pub trait LeafSource {
    fn tree_size(&self) -> LogResult<u64>;

    /// Leaves `[start, end)`; `end` is within the reported size.
    fn entries(&self, start: u64, end: u64) -> LogResult<Vec<TreeLeaf>>;
}

impl<R: Repository> LeafSource for MerkleTree<R> {
    fn tree_size(&self) -> LogResult<u64> {
        Ok(self.size())
    }

    fn entries(&self, start: u64, end: u64) -> LogResult<Vec<TreeLeaf>> {
        self.get_leaves(start, end)
    }
}

impl<R: Repository> LeafSource for LogService<R> {
    fn tree_size(&self) -> LogResult<u64> {
        Ok(self.tree().size())
    }

    fn entries(&self, start: u64, end: u64) -> LogResult<Vec<TreeLeaf>> {
        self.leaves(start, end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogFollower {
    next: u64,
    page: u64,
}

impl LogFollower {
    /// Follow from `next`, fetching at most `page` leaves per request.
    #[must_use]
    pub const fn new(next: u64, page: u64) -> Self {
        let page = if page == 0 { 1 } else { page };
        Self { next, page }
    }

    /// Follow only leaves appended after now.
    pub fn at_head<S: LeafSource>(source: &S, page: u64) -> LogResult<Self> {
        Ok(Self::new(source.tree_size()?, page))
    }

    #[must_use]
    pub const fn next_index(&self) -> u64 {
        self.next
    }

    /// Every leaf appended since the last poll, oldest first.
    ///
    /// On error the follower keeps the position of the last leaf it returned
    /// in a previous call, so a retry loses nothing.
    pub fn poll<S: LeafSource>(&mut self, source: &S) -> LogResult<Vec<NewLeaf>> {
        let size = source.tree_size()?;
        let mut next = self.next;
        let mut out = Vec::new();
        while next < size {
            let end = size.min(next + self.page);
            let leaves = source.entries(next, end)?;
            if leaves.is_empty() {
                break;
            }
            for leaf in leaves {
                out.push(NewLeaf { index: next, leaf });
                next += 1;
            }
        }
        self.next = next;
        Ok(out)
    }
}
