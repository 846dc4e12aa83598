//! Secure credential storage.
//!
//! [`CredentialStore`] is the seam to a platform secret store (Keychain,
//! Secret Service, Credential Manager, ...). Stores are namespaced by a
//! service name, and [`SecureStorage`] binds a store to one service and turns
//! every failure into a logged absence so callers never see store errors.

use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An async key-value store for secrets.
///
/// Implementations report failures as [`Error::CredentialStore`].
///
/// # Examples
///
/// ```
/// use api_manager::{CredentialStore, Error};
/// use async_trait::async_trait;
///
/// struct ReadOnlyStore(Option<String>);
///
/// #[async_trait]
/// impl CredentialStore for ReadOnlyStore {
///     async fn get(&self, _service: &str, _key: &str) -> Result<Option<Vec<u8>>, Error> {
///         Ok(self.0.clone().map(String::into_bytes))
///     }
///
///     async fn set(&self, _service: &str, _key: &str, _value: &[u8]) -> Result<(), Error> {
///         Err(Error::CredentialStore("store is read-only".to_string()))
///     }
///
///     async fn remove(&self, _service: &str, _key: &str) -> Result<(), Error> {
///         Err(Error::CredentialStore("store is read-only".to_string()))
///     }
///
///     async fn remove_all(&self, _service: &str) -> Result<(), Error> {
///         Err(Error::CredentialStore("store is read-only".to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if there is none.
    async fn get(&self, service: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, service: &str, key: &str, value: &[u8]) -> Result<()>;

    /// Deletes the value stored under `key`. Deleting a missing key succeeds.
    async fn remove(&self, service: &str, key: &str) -> Result<()>;

    /// Deletes every value stored for `service`.
    async fn remove_all(&self, service: &str) -> Result<()>;
}

/// A process-local [`CredentialStore`].
///
/// Nothing is persisted. Useful in tests and on hosts without a platform
/// secret store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, service: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(service.to_string(), key.to_string()))
            .cloned())
    }

    async fn set(&self, service: &str, key: &str, value: &[u8]) -> Result<()> {
        self.entries
            .write()
            .await
            .insert((service.to_string(), key.to_string()), value.to_vec());
        Ok(())
    }

    async fn remove(&self, service: &str, key: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .remove(&(service.to_string(), key.to_string()));
        Ok(())
    }

    async fn remove_all(&self, service: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .retain(|(entry_service, _), _| entry_service != service);
        Ok(())
    }
}

/// A [`CredentialStore`] scoped to one service name.
///
/// All operations fail silently: errors are logged with `tracing` and reads
/// degrade to `None`.
#[derive(Clone)]
pub struct SecureStorage {
    service: String,
    store: Arc<dyn CredentialStore>,
}

impl SecureStorage {
    /// Binds `store` to `service`.
    pub fn new(service: impl Into<String>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            service: service.into(),
            store,
        }
    }

    /// The service name this storage is scoped to.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Reads a UTF-8 string. Missing keys, store failures and invalid UTF-8
    /// all yield `None`.
    pub async fn get_string(&self, key: &str) -> Option<String> {
        let data = self.get_data(key).await?;
        match String::from_utf8(data) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(
                    service = %self.service,
                    key = key,
                    error = %e,
                    "Stored credential is not valid UTF-8"
                );
                None
            }
        }
    }

    /// Reads raw bytes.
    pub async fn get_data(&self, key: &str) -> Option<Vec<u8>> {
        match self.store.get(&self.service, key).await {
            Ok(data) => data,
            Err(e) => {
                self.log_failure("read", key, &e);
                None
            }
        }
    }

    /// Stores a string under `key`.
    pub async fn save(&self, value: &str, key: &str) {
        self.save_data(value.as_bytes(), key).await
    }

    /// Stores raw bytes under `key`.
    pub async fn save_data(&self, value: &[u8], key: &str) {
        if let Err(e) = self.store.set(&self.service, key, value).await {
            self.log_failure("write", key, &e);
        }
    }

    /// Deletes `key`.
    pub async fn remove(&self, key: &str) {
        if let Err(e) = self.store.remove(&self.service, key).await {
            self.log_failure("remove", key, &e);
        }
    }

    /// Deletes every key of this service.
    pub async fn remove_all(&self) {
        if let Err(e) = self.store.remove_all(&self.service).await {
            tracing::error!(
                service = %self.service,
                error = %e,
                "Credential store operation failed: remove_all"
            );
        }
    }

    fn log_failure(&self, operation: &str, key: &str, error: &Error) {
        tracing::error!(
            service = %self.service,
            key = key,
            error = %error,
            "Credential store operation failed: {}",
            operation
        );
    }
}

impl std::fmt::Debug for SecureStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureStorage")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}
