//! Collapses concurrent refreshes of the same key into a single attempt.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

struct Flight<T> {
    completed: AtomicU64,
    outcome: Mutex<Option<T>>,
}

impl<T> Default for Flight<T> {
    fn default() -> Self {
        Self {
            completed: AtomicU64::new(0),
            outcome: Mutex::new(None),
        }
    }
}

/// Runs at most one operation per key at a time.
///
/// A caller that arrives while an operation for its key is running waits for it
/// and receives a clone of its outcome instead of starting another one.
pub struct FetchCoalescer<T> {
    inflight: Mutex<HashMap<String, Arc<Flight<T>>>>,
}

impl<T: Clone + Send> FetchCoalescer<T> {
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn run<F, Fut>(&self, key: &str, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let flight = {
            let mut inflight = self.inflight.lock().await;
            Arc::clone(inflight.entry(key.to_string()).or_default())
        };

        let ticket = flight.completed.load(Ordering::Acquire);
        let mut outcome = flight.outcome.lock().await;
        if flight.completed.load(Ordering::Acquire) != ticket {
            if let Some(shared) = outcome.as_ref() {
                debug!(key, "Joined in-flight refresh");
                return shared.clone();
            }
        }

        let value = operation().await;
        *outcome = Some(value.clone());
        flight.completed.fetch_add(1, Ordering::Release);
        value
    }
}

impl<T: Clone + Send> Default for FetchCoalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}
