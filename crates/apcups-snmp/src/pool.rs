//! Process-wide SNMP work limiter.

use std::future::Future;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::Semaphore;

/// Maximum number of in-flight SNMP requests across the process.
const MAX_CONCURRENT_REQUESTS: usize = 4;

static SHARED: Mutex<Weak<PoolInner>> = Mutex::new(Weak::new());

#[derive(Debug)]
struct PoolInner {
    permits: Semaphore,
}

/// Shared limiter for concurrent SNMP work.
///
/// Handles are reference-counted: the underlying pool is created lazily
/// by the first `shared()` call, reused while any handle is alive, and
/// released when the last handle drops. A later `shared()` call after
/// that simply builds a fresh pool, so teardown and re-setup of clients
/// is safe in any order.
#[derive(Debug, Clone)]
pub struct SnmpWorkerPool {
    inner: Arc<PoolInner>,
}

impl SnmpWorkerPool {
    /// Get a handle to the process-wide pool, creating it if needed.
    pub fn shared() -> Self {
        let mut slot = SHARED.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(inner) = slot.upgrade() {
            return Self { inner };
        }
        let inner = Arc::new(PoolInner {
            permits: Semaphore::new(MAX_CONCURRENT_REQUESTS),
        });
        *slot = Arc::downgrade(&inner);
        tracing::debug!(workers = MAX_CONCURRENT_REQUESTS, "created SNMP worker pool");
        Self { inner }
    }

    /// Run one unit of SNMP work, waiting for a free slot first.
    pub async fn run<F: Future>(&self, work: F) -> F::Output {
        let _permit = self
            .inner
            .permits
            .acquire()
            .await
            .expect("pool semaphore is never closed");
        work.await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Tests share the process-wide registry; serialize the ones that
    // reason about reference counts.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn handles_share_one_pool() {
        let _guard = TEST_LOCK.lock().unwrap();
        let a = SnmpWorkerPool::shared();
        let b = SnmpWorkerPool::shared();
        assert!(Arc::ptr_eq(&a.inner, &b.inner));
    }

    #[tokio::test]
    async fn pool_is_recreated_after_last_handle_drops() {
        let _guard = TEST_LOCK.lock().unwrap();
        let first = SnmpWorkerPool::shared();
        drop(first);

        // No live handles remain, so this must build a new pool.
        let second = SnmpWorkerPool::shared();
        assert_eq!(Arc::strong_count(&second.inner), 1);
        // The registry's weak slot must point at the new pool.
        let third = SnmpWorkerPool::shared();
        assert!(Arc::ptr_eq(&second.inner, &third.inner));
    }

    #[tokio::test]
    async fn work_runs_to_completion_under_limit() {
        let _guard = TEST_LOCK.lock().unwrap();
        let pool = SnmpWorkerPool::shared();
        let mut total = 0;
        for i in 0..10 {
            total += pool.run(async move { i }).await;
        }
        assert_eq!(total, 45);
    }
}
