//! Request-scoped context
//!
//! Every RPC gets a fresh Context carrying the RPC name, the resource or
//! data source type it targets, a cancellation signal and an optional
//! deadline. Providers may also attach typed values to it.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};
use tokio::time;

/// Context is passed as first parameter to all async trait methods
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    rpc: String,
    type_name: String,
    deadline: Option<Instant>,
    values: RwLock<HashMap<String, Box<dyn Any + Send + Sync>>>,
    done: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        Self::build(String::new(), String::new(), None)
    }

    /// Context for a single RPC against the given type name
    pub fn for_rpc(rpc: &str, type_name: &str) -> Self {
        Self::build(rpc.to_string(), type_name.to_string(), None)
    }

    fn build(rpc: String, type_name: String, deadline: Option<Instant>) -> Self {
        let (done_tx, done_rx) = watch::channel(false);

        if let Some(deadline) = deadline {
            let timer_tx = done_tx.clone();
            tokio::spawn(async move {
                time::sleep_until(deadline.into()).await;
                let _ = timer_tx.send(true);
            });
        }

        Self {
            inner: Arc::new(ContextInner {
                rpc,
                type_name,
                deadline,
                values: RwLock::new(HashMap::new()),
                done: done_rx,
                done_tx,
            }),
        }
    }

    /// Returns a new context that is cancelled once `timeout` elapses.
    /// Values stored on the original context are not carried over.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self::build(
            self.inner.rpc.clone(),
            self.inner.type_name.clone(),
            Some(Instant::now() + timeout),
        )
    }

    pub async fn with_value<T: Send + Sync + 'static>(self, key: &str, value: T) -> Self {
        let mut values = self.inner.values.write().await;
        values.insert(key.to_string(), Box::new(value));
        drop(values);
        self
    }

    pub async fn get_value<T>(&self, key: &str) -> Option<T>
    where
        T: Send + Sync + Clone + 'static,
    {
        let values = self.inner.values.read().await;
        values.get(key).and_then(|v| v.downcast_ref::<T>()).cloned()
    }

    /// Name of the RPC this context was created for, empty outside the server
    pub fn rpc(&self) -> &str {
        &self.inner.rpc
    }

    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Receiver flipped to true when work for this context should stop
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("rpc", &self.inner.rpc)
            .field("type_name", &self.inner.type_name)
            .field("deadline", &self.inner.deadline)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
