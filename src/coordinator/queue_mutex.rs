//! Named FIFO execution lock
//!
//! Each resource domain owns a queue of pending operations. At most one
//! operation per domain runs at a time and operations run in the order
//! `enqueue` was called. A domain keeps advancing whatever its operations do:
//! errors go back to the caller, and a panic is caught at the task boundary
//! and reported to the caller as an internal error.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::anyhow;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::oneshot;

use crate::error::{AppError, AppResult};

/// Resource domains whose writes must not interleave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceDomain {
    Submissions,
    Results,
}

impl fmt::Display for ResourceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submissions => write!(f, "submissions"),
            Self::Results => write!(f, "results"),
        }
    }
}

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

#[derive(Default)]
struct DomainQueue {
    pending: VecDeque<Job>,
}

type Domains<K> = Arc<Mutex<HashMap<K, DomainQueue>>>;

/// FIFO lock keyed by resource domain
///
/// A domain is present in the map exactly while a driver task is draining it.
pub struct QueueMutex<K = ResourceDomain> {
    domains: Domains<K>,
}

impl<K> Clone for QueueMutex<K> {
    fn clone(&self) -> Self {
        Self {
            domains: Arc::clone(&self.domains),
        }
    }
}

impl<K> Default for QueueMutex<K> {
    fn default() -> Self {
        Self {
            domains: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K> QueueMutex<K>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(domains: &Domains<K>) -> MutexGuard<'_, HashMap<K, DomainQueue>> {
        domains.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue `operation` behind everything already queued for `domain`.
    ///
    /// The entry is appended before this returns, so call order is run order.
    /// Dropping the returned future does not cancel the operation.
    pub fn enqueue<F, Fut, T>(
        &self,
        domain: K,
        operation: F,
    ) -> impl Future<Output = AppResult<T>> + Send + 'static
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            async move {
                let outcome = operation().await;
                let _ = tx.send(outcome);
            }
            .boxed()
        });

        let start_driver = {
            let mut domains = Self::lock(&self.domains);
            match domains.get_mut(&domain) {
                Some(queue) => {
                    queue.pending.push_back(job);
                    false
                }
                None => {
                    let mut queue = DomainQueue::default();
                    queue.pending.push_back(job);
                    domains.insert(domain.clone(), queue);
                    true
                }
            }
        };

        if start_driver {
            tokio::spawn(Self::drain(Arc::clone(&self.domains), domain));
        }

        async move {
            rx.await.unwrap_or_else(|_| {
                Err(AppError::Internal(anyhow!(
                    "queued operation did not complete"
                )))
            })
        }
    }

    /// Run queued jobs for `domain` until its queue is empty
    async fn drain(domains: Domains<K>, domain: K) {
        loop {
            let job = {
                let mut guard = Self::lock(&domains);
                let Some(queue) = guard.get_mut(&domain) else {
                    return;
                };
                match queue.pending.pop_front() {
                    Some(job) => job,
                    None => {
                        guard.remove(&domain);
                        return;
                    }
                }
            };

            // Separate task so a panic unwinds there and the drain keeps going
            if let Err(e) = tokio::spawn(job()).await {
                tracing::error!(domain = ?domain, error = %e, "Queued operation panicked");
            }
        }
    }

    /// Whether nothing is running or waiting on `domain`
    #[cfg(test)]
    pub fn is_idle(&self, domain: &K) -> bool {
        !Self::lock(&self.domains).contains_key(domain)
    }

    /// Operations waiting on `domain`, excluding the one currently running
    #[cfg(test)]
    pub fn pending(&self, domain: &K) -> usize {
        Self::lock(&self.domains)
            .get(domain)
            .map_or(0, |q| q.pending.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn recorder() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_operations_complete_in_enqueue_order() {
        let queue = QueueMutex::new();
        let log = recorder();

        let step = |label: &'static str, delay_ms: u64| {
            let log = Arc::clone(&log);
            move || async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                log.lock().unwrap().push(label);
                Ok(label)
            }
        };

        let a = queue.enqueue(ResourceDomain::Submissions, step("A", 50));
        let b = queue.enqueue(ResourceDomain::Submissions, step("B", 0));
        let c = queue.enqueue(ResourceDomain::Submissions, step("C", 10));

        // Awaiting out of order does not change run order
        let c = c.await.unwrap();
        let (a, b) = tokio::join!(a, b);
        assert_eq!((a.unwrap(), b.unwrap(), c), ("A", "B", "C"));
        assert_eq!(*log.lock().unwrap(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_error_does_not_stall_domain() {
        let queue = QueueMutex::new();

        let failing = queue.enqueue(ResourceDomain::Results, || async {
            Err::<(), _>(AppError::Validation("nope".to_string()))
        });
        let next = queue.enqueue(ResourceDomain::Results, || async { Ok(2) });

        assert!(matches!(failing.await, Err(AppError::Validation(_))));
        assert_eq!(next.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_panic_surfaces_as_internal_error() {
        let queue = QueueMutex::new();

        let panicking = queue.enqueue(ResourceDomain::Results, || async {
            if true {
                panic!("boom");
            }
            Ok(())
        });
        let next = queue.enqueue(ResourceDomain::Results, || async { Ok("still running") });

        assert!(matches!(panicking.await, Err(AppError::Internal(_))));
        assert_eq!(next.await.unwrap(), "still running");
    }

    #[tokio::test]
    async fn test_domains_are_independent() {
        let queue = QueueMutex::new();
        let gate = Arc::new(Notify::new());

        let blocked = queue.enqueue(ResourceDomain::Submissions, {
            let gate = Arc::clone(&gate);
            move || async move {
                gate.notified().await;
                Ok("submissions")
            }
        });
        let waiting = queue.enqueue(ResourceDomain::Submissions, || async { Ok("second") });

        let results = queue
            .enqueue(ResourceDomain::Results, || async { Ok("results") })
            .await;
        assert_eq!(results.unwrap(), "results");
        assert!(!queue.is_idle(&ResourceDomain::Submissions));
        assert!(queue.pending(&ResourceDomain::Submissions) <= 1);

        gate.notify_one();
        assert_eq!(blocked.await.unwrap(), "submissions");
        assert_eq!(waiting.await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_dropped_future_still_runs() {
        let queue = QueueMutex::new();
        let log = recorder();

        drop(queue.enqueue(ResourceDomain::Submissions, {
            let log = Arc::clone(&log);
            move || async move {
                log.lock().unwrap().push("dropped");
                Ok(())
            }
        }));
        queue
            .enqueue(ResourceDomain::Submissions, || async { Ok(()) })
            .await
            .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["dropped"]);
    }
}
