//! Correlation-keyed waiter registrations
//!
//! A caller registers interest in a key and gets a [`Waiter`]. The first
//! `notify` for that key hands the value to every registered listener and
//! forgets them. Dropping a `Waiter` before it resolves removes only that
//! listener.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

struct Listeners<K, V> {
    next_id: u64,
    by_key: HashMap<K, Vec<(u64, oneshot::Sender<V>)>>,
}

type Shared<K, V> = Arc<Mutex<Listeners<K, V>>>;

fn lock<K, V>(shared: &Shared<K, V>) -> MutexGuard<'_, Listeners<K, V>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Listeners grouped by correlation key
pub struct WaiterMap<K, V> {
    shared: Shared<K, V>,
}

impl<K, V> Default for WaiterMap<K, V> {
    fn default() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Listeners {
                next_id: 0,
                by_key: HashMap::new(),
            })),
        }
    }
}

impl<K, V> WaiterMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener for `key`
    pub fn register(&self, key: K) -> Waiter<K, V> {
        let (tx, rx) = oneshot::channel();
        let id = {
            let mut listeners = lock(&self.shared);
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.by_key.entry(key.clone()).or_default().push((id, tx));
            id
        };

        Waiter {
            key,
            id,
            rx,
            shared: Arc::clone(&self.shared),
        }
    }

    /// Resolve and forget every listener on `key`; returns how many were woken
    pub fn notify(&self, key: &K, value: V) -> usize {
        let senders = lock(&self.shared).by_key.remove(key).unwrap_or_default();

        senders
            .into_iter()
            .filter_map(|(_, tx)| tx.send(value.clone()).ok())
            .count()
    }

    /// Forget every listener on `key` without a value
    pub fn abandon(&self, key: &K) {
        lock(&self.shared).by_key.remove(key);
    }

    /// Forget every listener on every key without a value
    pub fn clear(&self) {
        lock(&self.shared).by_key.clear();
    }

    pub fn listener_count(&self, key: &K) -> usize {
        lock(&self.shared).by_key.get(key).map_or(0, Vec::len)
    }
}

/// One pending registration
pub struct Waiter<K: Eq + Hash, V> {
    key: K,
    id: u64,
    rx: oneshot::Receiver<V>,
    shared: Shared<K, V>,
}

impl<K: Eq + Hash, V> Waiter<K, V> {
    /// Wait for the value; `None` if the registration was abandoned
    pub async fn wait(mut self) -> Option<V> {
        (&mut self.rx).await.ok()
    }

    /// Value if the key has already been notified
    #[cfg(test)]
    pub fn try_take(&mut self) -> Option<V> {
        self.rx.try_recv().ok()
    }
}

impl<K: Eq + Hash, V> Drop for Waiter<K, V> {
    fn drop(&mut self) {
        let mut listeners = lock(&self.shared);
        if let Some(entries) = listeners.by_key.get_mut(&self.key) {
            entries.retain(|(id, _)| *id != self.id);
            if entries.is_empty() {
                listeners.by_key.remove(&self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_wakes_every_listener() {
        let waiters: WaiterMap<(i64, usize), &str> = WaiterMap::new();
        let first = waiters.register((1, 0));
        let second = waiters.register((1, 0));
        let other = waiters.register((1, 1));

        assert_eq!(waiters.notify(&(1, 0), "Accepted"), 2);
        assert_eq!(first.wait().await, Some("Accepted"));
        assert_eq!(second.wait().await, Some("Accepted"));

        assert_eq!(waiters.listener_count(&(1, 0)), 0);
        assert_eq!(waiters.listener_count(&(1, 1)), 1);
        drop(other);
    }

    #[tokio::test]
    async fn test_dropping_a_waiter_removes_only_that_listener() {
        let waiters: WaiterMap<i64, f64> = WaiterMap::new();
        let kept = waiters.register(7);
        let cancelled = waiters.register(7);
        assert_eq!(waiters.listener_count(&7), 2);

        drop(cancelled);
        assert_eq!(waiters.listener_count(&7), 1);

        assert_eq!(waiters.notify(&7, 50.0), 1);
        assert_eq!(kept.wait().await, Some(50.0));
    }

    #[tokio::test]
    async fn test_cancelled_wait_deregisters() {
        let waiters: WaiterMap<i64, f64> = WaiterMap::new();
        let waiter = waiters.register(3);

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            waiter.wait(),
        )
        .await;

        assert!(timed_out.is_err());
        assert_eq!(waiters.listener_count(&3), 0);
    }

    #[test]
    fn test_notify_without_listeners_is_noop() {
        let waiters: WaiterMap<i64, f64> = WaiterMap::new();
        assert_eq!(waiters.notify(&1, 1.0), 0);
    }

    #[tokio::test]
    async fn test_clear_abandons_listeners() {
        let waiters: WaiterMap<i64, f64> = WaiterMap::new();
        let waiter = waiters.register(1);
        let mut notified = waiters.register(2);
        waiters.notify(&2, 10.0);

        waiters.clear();
        assert_eq!(waiter.wait().await, None);
        assert_eq!(notified.try_take(), Some(10.0));
    }
}
