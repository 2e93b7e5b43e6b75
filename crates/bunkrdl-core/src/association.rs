//! Page → expected-name table shared by the orchestrator, the namer and the
//! lifecycle manager.
//!
//! Entries are last-write-wins per page. The table is bounded: entries older
//! than `max_age` are pruned, and once `max_entries` is exceeded the oldest
//! entry is evicted. Pages that never trigger a download, or that are closed
//! outside this process, therefore cannot accumulate forever.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

use crate::config::AssociationBounds;
use crate::host::PageId;

/// What a page is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    /// Display name to use for the page's download, if known.
    pub expected_name: Option<String>,
    /// When the entry was last written.
    pub started_at: Instant,
    /// Table-wide write counter; orders writes that share a timestamp.
    pub seq: u64,
}

impl Association {
    fn recency(&self) -> (Instant, u64) {
        (self.started_at, self.seq)
    }
}

#[derive(Debug)]
struct Inner {
    entries: HashMap<PageId, Association>,
    next_seq: u64,
    bounds: AssociationBounds,
}

impl Inner {
    fn prune_expired(&mut self, now: Instant) {
        let Some(max_age) = self.bounds.max_age() else {
            return;
        };
        let before = self.entries.len();
        self.entries
            .retain(|_, a| now.saturating_duration_since(a.started_at) <= max_age);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            tracing::debug!(dropped, "pruned expired page associations");
        }
    }

    fn enforce_capacity(&mut self) {
        let max = self.bounds.max_entries.max(1);
        while self.entries.len() > max {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, a)| a.recency())
                .map(|(id, _)| *id)
            else {
                break;
            };
            self.entries.remove(&oldest);
            tracing::debug!(page = %oldest, "evicted oldest page association");
        }
    }
}

/// Cheaply cloneable handle to the shared table.
#[derive(Debug, Clone)]
pub struct AssociationTable {
    inner: Arc<Mutex<Inner>>,
}

impl Default for AssociationTable {
    fn default() -> Self {
        Self::new(AssociationBounds::default())
    }
}

impl AssociationTable {
    pub fn new(bounds: AssociationBounds) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                next_seq: 0,
                bounds,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the bounds; applied immediately.
    pub fn set_bounds(&self, bounds: AssociationBounds) {
        let mut inner = self.lock();
        inner.bounds = bounds;
        inner.prune_expired(Instant::now());
        inner.enforce_capacity();
    }

    /// Create or overwrite the entry for `page`, stamping it as the most recent write.
    pub fn record(&self, page: PageId, expected_name: Option<String>) -> Association {
        let now = Instant::now();
        let mut inner = self.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let assoc = Association {
            expected_name,
            started_at: now,
            seq,
        };
        inner.entries.insert(page, assoc.clone());
        inner.prune_expired(now);
        inner.enforce_capacity();
        assoc
    }

    pub fn get(&self, page: PageId) -> Option<Association> {
        self.lock().entries.get(&page).cloned()
    }

    /// The most recently written live entry.
    ///
    /// The host does not say which page triggered a download, so callers use
    /// this as an approximation. With several pages downloading at once it
    /// can pick the wrong one.
    pub fn most_recent(&self) -> Option<(PageId, Association)> {
        let mut inner = self.lock();
        inner.prune_expired(Instant::now());
        inner
            .entries
            .iter()
            .max_by_key(|(_, a)| a.recency())
            .map(|(id, a)| (*id, a.clone()))
    }

    pub fn remove(&self, page: PageId) -> Option<Association> {
        self.lock().entries.remove(&page)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
