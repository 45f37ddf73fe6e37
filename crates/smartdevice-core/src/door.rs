// ── Auto-door debounce ──
//
// Motorised doors report transient states while moving. A tracker only
// publishes a state once it has been observed without interruption for
// the debounce window; every new observation restarts the window.

use std::collections::HashMap;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Sleep, sleep};
use tracing::debug;

use crate::model::{ControlKey, DoorState, Snapshot};

// ── DoorTracker ──────────────────────────────────────────────────

/// Confirmed state of one door. Starts as `Unknown`.
///
/// Owns a background task; dropping the tracker stops it.
#[derive(Debug)]
pub struct DoorTracker {
    observations: mpsc::UnboundedSender<DoorState>,
    confirmed: watch::Receiver<DoorState>,
    task: JoinHandle<()>,
}

impl DoorTracker {
    /// Must be called within a tokio runtime.
    pub fn spawn(debounce: Duration) -> Self {
        let (observations, rx) = mpsc::unbounded_channel();
        let (confirmed_tx, confirmed) = watch::channel(DoorState::Unknown);
        let task = tokio::spawn(debounce_loop(rx, confirmed_tx, debounce));
        Self {
            observations,
            confirmed,
            task,
        }
    }

    /// Feed one raw observation. Restarts the debounce window.
    pub fn observe(&self, state: DoorState) {
        let _ = self.observations.send(state);
    }

    pub fn confirmed(&self) -> DoorState {
        *self.confirmed.borrow()
    }

    /// Receiver notified whenever the confirmed state changes.
    pub fn subscribe(&self) -> watch::Receiver<DoorState> {
        self.confirmed.clone()
    }
}

impl Drop for DoorTracker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn debounce_loop(
    mut rx: mpsc::UnboundedReceiver<DoorState>,
    confirmed: watch::Sender<DoorState>,
    debounce: Duration,
) {
    // Wait for the start of a burst.
    while let Some(first) = rx.recv().await {
        let mut pending = first;
        let mut timer: Pin<Box<Sleep>> = Box::pin(sleep(debounce));

        loop {
            tokio::select! {
                next = rx.recv() => {
                    let Some(state) = next else { return };
                    pending = state;
                    timer.as_mut().reset(Instant::now() + debounce);
                }
                () = &mut timer => break,
            }
        }

        confirmed.send_if_modified(|current| {
            if *current == pending {
                false
            } else {
                debug!(from = %current, to = %pending, "door state confirmed");
                *current = pending;
                true
            }
        });
    }
}

// ── DoorWatcher ──────────────────────────────────────────────────

type DoorId = (String, ControlKey);

/// One tracker per `(device_id, ControlKey)` of every auto door seen in a
/// snapshot. Trackers are created on first sight and kept for the life of
/// the watcher.
#[derive(Debug)]
pub struct DoorWatcher {
    debounce: Duration,
    trackers: Mutex<HashMap<DoorId, DoorTracker>>,
}

impl DoorWatcher {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            trackers: Mutex::new(HashMap::new()),
        }
    }

    /// Feed every auto-door control of `snapshot` into its tracker.
    pub async fn observe(&self, snapshot: &Snapshot) {
        let mut trackers = self.trackers.lock().await;
        for appliance in &snapshot.appliances {
            for door in appliance.doors() {
                let id = (
                    appliance.device_id.clone(),
                    ControlKey::new(door.name.clone(), door.zone_id),
                );
                trackers
                    .entry(id)
                    .or_insert_with(|| DoorTracker::spawn(self.debounce))
                    .observe(door.state());
            }
        }
    }

    /// Confirmed state of a door, `Unknown` if it was never observed.
    pub async fn confirmed(&self, device_id: &str, key: &ControlKey) -> DoorState {
        self.trackers
            .lock()
            .await
            .get(&(device_id.to_owned(), key.clone()))
            .map_or(DoorState::Unknown, DoorTracker::confirmed)
    }

    pub async fn subscribe(
        &self,
        device_id: &str,
        key: &ControlKey,
    ) -> Option<watch::Receiver<DoorState>> {
        self.trackers
            .lock()
            .await
            .get(&(device_id.to_owned(), key.clone()))
            .map(DoorTracker::subscribe)
    }

    /// Stop all trackers.
    pub async fn clear(&self) {
        self.trackers.lock().await.clear();
    }
}
