//! Per-key guards so concurrent cache misses for the same key
//! wait on one token exchange instead of each issuing their own.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
pub struct KeyedGuards {
    inner: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

/// Held for the duration of one exchange; unregisters the key on drop
/// when nobody else is waiting on it.
#[derive(Debug)]
pub struct InflightGuard {
    key: String,
    registry: KeyedGuards,
    lock: Arc<AsyncMutex<()>>,
    _held: OwnedMutexGuard<()>,
}

impl KeyedGuards {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> InflightGuard {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            map.entry(key.to_owned()).or_default().clone()
        };
        let held = lock.clone().lock_owned().await;
        InflightGuard { key: key.to_owned(), registry: self.clone(), lock, _held: held }
    }

    /// Keys with a registered guard.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        let mut map = self.registry.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // registry + this guard (field `lock` and the owned guard's inner Arc)
        if Arc::strong_count(&self.lock) <= 3 {
            map.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn second_acquire_waits_for_first_release() {
        let guards = KeyedGuards::new();
        let first = guards.acquire("k").await;

        let waiting = {
            let guards = guards.clone();
            tokio::spawn(async move {
                let _second = guards.acquire("k").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiting.is_finished());

        drop(first);
        waiting.await.unwrap();
        assert!(guards.is_empty());
    }

    #[tokio::test]
    async fn distinct_keys_do_not_block() {
        let guards = KeyedGuards::new();
        let _a = guards.acquire("a").await;
        let b = tokio::time::timeout(Duration::from_millis(200), guards.acquire("b")).await;
        assert!(b.is_ok());
        assert_eq!(guards.len(), 2);
    }
}
