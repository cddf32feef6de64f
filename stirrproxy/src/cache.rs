use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::Snapshot;

/**
    Holder of the current snapshot.

    Readers get a shared handle to a complete snapshot and render from
    it without holding the lock. Writers swap in a fully built
    snapshot; the one being replaced stays alive for as long as any
    reader still holds it.
*/
#[derive(Default)]
pub struct SnapshotCache {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        The current snapshot, or `None` before the first successful refresh.
    */
    pub fn read(&self) -> Option<Arc<Snapshot>> {
        self.current.read().clone()
    }

    /**
        Install a new snapshot, returning the one it replaced.
    */
    pub fn replace(&self, snapshot: Snapshot) -> Option<Arc<Snapshot>> {
        let snapshot = Arc::new(snapshot);
        self.current.write().replace(snapshot)
    }
}
