//! Cache tag registry: the invalidation glue between mutating calls and
//! previously cached reads.
//!
//! The registry caches nothing itself. Mutations declare which opaque tags
//! went stale; read-path owners subscribe and drop their entries. Keeping the
//! declaration next to the mutation is the whole point.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::debug;

#[derive(Clone)]
pub struct CacheTagRegistry {
    invalidated: Arc<Mutex<Vec<String>>>,
    tx: broadcast::Sender<Vec<String>>,
}

impl CacheTagRegistry {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            invalidated: Arc::new(Mutex::new(Vec::new())),
            tx,
        }
    }

    /// Mark the given tags stale and notify subscribers.
    pub fn invalidate(&self, tags: &[String]) {
        if tags.is_empty() {
            return;
        }
        debug!("invalidating cache tags: {:?}", tags);
        self.invalidated.lock().unwrap().extend_from_slice(tags);
        let _ = self.tx.send(tags.to_vec());
    }

    /// Subscribe to invalidation events. Each event is the tag list of one
    /// `invalidate` call.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<String>> {
        self.tx.subscribe()
    }

    /// Take every tag invalidated so far, in call order. For pollers and
    /// tests; subscribers should prefer `subscribe`.
    pub fn drain_invalidated(&self) -> Vec<String> {
        std::mem::take(&mut *self.invalidated.lock().unwrap())
    }
}

impl Default for CacheTagRegistry {
    fn default() -> Self {
        Self::new()
    }
}
