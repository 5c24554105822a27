//! Wallet session: the identity capability backed by the store.
//!
//! Connecting binds a principal and remembers it, so a later process over the
//! same store starts out connected as the same principal.

use legacy_clock_core::capability::{Identity, KeyValueStore, keys};
use legacy_clock_core::error::{EngineError, EngineResult};
use legacy_clock_core::will::Address;
use parking_lot::RwLock;
use std::sync::Arc;

pub struct WalletSession {
    store: Arc<dyn KeyValueStore>,
    principal: RwLock<Option<Address>>,
}

impl WalletSession {
    /// A disconnected session that has not looked at the store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            principal: RwLock::new(None),
        }
    }

    /// Load the previously connected principal, if any.
    pub async fn restore(store: Arc<dyn KeyValueStore>) -> EngineResult<Self> {
        let principal = store
            .get(keys::SESSION_PRINCIPAL)
            .await
            .map_err(|e| EngineError::persistence(keys::SESSION_PRINCIPAL, e))?
            .map(|raw| raw.trim().to_string())
            .filter(|p| !p.is_empty());

        if let Some(p) = &principal {
            tracing::debug!(principal = %p, "Restored wallet session");
        }

        Ok(Self {
            store,
            principal: RwLock::new(principal),
        })
    }

    pub async fn connect(&self, address: impl Into<Address>) -> EngineResult<()> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(EngineError::NotAuthenticated);
        }

        self.store
            .set(keys::SESSION_PRINCIPAL, address.clone())
            .await
            .map_err(|e| EngineError::persistence(keys::SESSION_PRINCIPAL, e))?;

        tracing::info!(principal = %address, "Wallet connected");
        *self.principal.write() = Some(address);
        Ok(())
    }

    pub async fn disconnect(&self) -> EngineResult<()> {
        self.store
            .remove(keys::SESSION_PRINCIPAL)
            .await
            .map_err(|e| EngineError::persistence(keys::SESSION_PRINCIPAL, e))?;

        if let Some(previous) = self.principal.write().take() {
            tracing::info!(principal = %previous, "Wallet disconnected");
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.principal.read().is_some()
    }
}

impl Identity for WalletSession {
    fn current_principal(&self) -> Option<Address> {
        self.principal.read().clone()
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("principal", &*self.principal.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legacy_clock_store::MemoryStore;

    #[tokio::test]
    async fn test_connect_is_remembered() {
        let store = Arc::new(MemoryStore::new());

        let session = WalletSession::restore(store.clone()).await.unwrap();
        assert!(!session.is_connected());

        session.connect("0xalice").await.unwrap();
        assert_eq!(session.current_principal().as_deref(), Some("0xalice"));

        let restored = WalletSession::restore(store.clone()).await.unwrap();
        assert_eq!(restored.current_principal().as_deref(), Some("0xalice"));
    }

    #[tokio::test]
    async fn test_disconnect_forgets() {
        let store = Arc::new(MemoryStore::new());
        let session = WalletSession::new(store.clone());
        session.connect("0xalice").await.unwrap();
        session.disconnect().await.unwrap();

        assert_eq!(session.current_principal(), None);
        assert!(store.is_empty());
        let restored = WalletSession::restore(store).await.unwrap();
        assert!(!restored.is_connected());
    }

    #[tokio::test]
    async fn test_blank_address_is_rejected() {
        let session = WalletSession::new(Arc::new(MemoryStore::new()));
        assert_eq!(
            session.connect("   ").await,
            Err(EngineError::NotAuthenticated)
        );
    }
}
