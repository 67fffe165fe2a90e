//! Per-key writer locks.
//!
//! At most one writer per key at a time within a client. Different keys
//! never wait on each other. Entries are removed when the last holder or
//! waiter goes away, so the map only holds keys with writers in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Async lock table keyed by cache key.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other writer holds `key`, then hold it until the guard drops.
    ///
    /// Dropping the returned future while it waits gives up its place and
    /// cleans up the entry like a released guard would.
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let mutex = {
            let mut locks = self.table();
            Arc::clone(locks.entry(key.to_string()).or_default())
        };

        let waiter = Waiter { locks: self, key };
        let guard = mutex.lock_owned().await;
        drop(waiter);

        KeyGuard {
            locks: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of keys with a holder or waiter.
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove `key` if only the table still references its mutex.
    fn remove_unused(&self, key: &str) {
        let mut locks = self.table();
        if locks
            .get(key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            locks.remove(key);
        }
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive hold on one key. Released on drop.
#[derive(Debug)]
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyGuard<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.remove_unused(&self.key);
    }
}

/// Lives for the duration of a pending `lock` call. The pending
/// `lock_owned` future, and with it its `Arc`, is dropped first.
struct Waiter<'a> {
    locks: &'a KeyLocks,
    key: &'a str,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        self.locks.remove_unused(self.key);
    }
}
