use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-key async mutexes. Holding the guard serialises every operation on
/// that key within this process; dropping it releases the key.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    inner: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let slot = self.inner.entry(key.to_owned()).or_default().value().clone();
        slot.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.len()
    }
}
