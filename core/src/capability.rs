//! # Capabilities: What the Engine Consumes
//!
//! The engine never reaches for a global store, clock or session. Each of these
//! is injected as a capability so tests can substitute deterministic fakes.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::StoreError;
use crate::will::Address;

/// Opaque string key-value persistence.
///
/// Implementations must distinguish "absent" (`Ok(None)`) from a failed read.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key).await
    }
}

/// Storage key scheme.
pub mod keys {
    pub const WILL_PREFIX: &str = "will:";
    pub const CHECK_IN_PREFIX: &str = "checkin:";
    pub const SESSION_PRINCIPAL: &str = "session:principal";

    pub fn will(testator: &str) -> String {
        format!("{WILL_PREFIX}{testator}")
    }

    pub fn check_in(testator: &str) -> String {
        format!("{CHECK_IN_PREFIX}{testator}")
    }
}

/// Source of "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for deterministic tests. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Start at the Unix epoch.
    pub fn at_epoch() -> Self {
        Self::new(DateTime::<Utc>::default())
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    pub fn advance_ms(&self, ms: i64) {
        self.advance(Duration::milliseconds(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Who is acting.
pub trait Identity: Send + Sync {
    /// The principal bound to the current session, if any.
    fn current_principal(&self) -> Option<Address>;
}

/// A fixed identity (or the absence of one).
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    principal: Option<Address>,
}

impl StaticIdentity {
    pub fn new(principal: impl Into<Address>) -> Self {
        Self {
            principal: Some(principal.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { principal: None }
    }
}

impl Identity for StaticIdentity {
    fn current_principal(&self) -> Option<Address> {
        self.principal.clone()
    }
}
