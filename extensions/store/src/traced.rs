//! # Traced: Observability Decorator
//!
//! Wraps any `KeyValueStore` and records each call with its duration.
//! Values are never logged, only keys and sizes: a will's content is plaintext.

use async_trait::async_trait;
use legacy_clock_core::capability::KeyValueStore;
use legacy_clock_core::error::StoreError;
use tracing::{Instrument, debug_span};

#[derive(Debug, Clone)]
pub struct Traced<S> {
    inner: S,
    name: String,
}

impl<S> Traced<S> {
    pub fn new(inner: S, name: &str) -> Self {
        Self {
            inner,
            name: name.to_string(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn report<T>(op: &'static str, result: &Result<T, StoreError>, duration: std::time::Duration) {
    match result {
        Ok(_) => tracing::debug!(op, ?duration, "Store call completed"),
        Err(e) => tracing::error!(op, error = %e, ?duration, "Store call failed"),
    }
}

#[async_trait]
impl<S: KeyValueStore> KeyValueStore for Traced<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let span = debug_span!("Store", legacy_clock.store = %self.name, key);
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.get(key).await;
            if let Ok(value) = &result {
                tracing::trace!(hit = value.is_some(), "Store lookup");
            }
            report("get", &result, start.elapsed());
            result
        }
        .instrument(span)
        .await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let span = debug_span!("Store", legacy_clock.store = %self.name, key, bytes = value.len());
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.set(key, value).await;
            report("set", &result, start.elapsed());
            result
        }
        .instrument(span)
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let span = debug_span!("Store", legacy_clock.store = %self.name, key);
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.remove(key).await;
            report("remove", &result, start.elapsed());
            result
        }
        .instrument(span)
        .await
    }
}
