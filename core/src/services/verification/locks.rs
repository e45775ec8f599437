//! Per-phone mutual exclusion

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

const SHARDS: usize = 64;

/// Fixed table of async mutexes; a phone always maps to the same shard
///
/// Two phones may share a shard and then serialize against each other,
/// which is harmless. The guard is owned so it can move into a spawned task.
pub(crate) struct PhoneLocks {
    shards: Vec<Arc<Mutex<()>>>,
}

impl PhoneLocks {
    pub(crate) fn new() -> Self {
        Self {
            shards: (0..SHARDS).map(|_| Arc::new(Mutex::new(()))).collect(),
        }
    }

    pub(crate) async fn lock(&self, phone: &str) -> OwnedMutexGuard<()> {
        let mut hasher = DefaultHasher::new();
        phone.hash(&mut hasher);
        let shard = (hasher.finish() as usize) % self.shards.len();
        Arc::clone(&self.shards[shard]).lock_owned().await
    }
}
