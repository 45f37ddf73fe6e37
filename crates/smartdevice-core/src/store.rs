// ── Snapshot store ──
//
// Holds the latest `Snapshot` behind an `ArcSwap` so readers never block
// and never observe a half-built poll result. Every replacement is also
// published on a `watch` channel for reactive consumers.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::Snapshot;
use crate::stream::SnapshotStream;

pub struct SnapshotStore {
    current: ArcSwap<Snapshot>,
    updates: watch::Sender<Arc<Snapshot>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let initial = Arc::new(Snapshot::default());
        let (updates, _) = watch::channel(Arc::clone(&initial));
        let (last_refresh, _) = watch::channel(None);
        Self {
            current: ArcSwap::new(initial),
            updates,
            last_refresh,
        }
    }

    /// The latest snapshot. Cheap; clones an `Arc`.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Swap in a freshly built snapshot and stamp the refresh time.
    pub(crate) fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.current.store(Arc::clone(&snapshot));
        self.updates.send_replace(Arc::clone(&snapshot));
        self.last_refresh.send_replace(Some(Utc::now()));
        snapshot
    }

    /// Return to the empty state (used on unload).
    pub(crate) fn clear(&self) {
        let empty = Arc::new(Snapshot::default());
        self.current.store(Arc::clone(&empty));
        self.updates.send_replace(empty);
        self.last_refresh.send_replace(None);
    }

    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.updates.subscribe())
    }

    /// When the last poll tick completed, if any.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    pub fn subscribe_last_refresh(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
