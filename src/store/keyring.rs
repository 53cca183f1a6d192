// OS keychain backend

use async_trait::async_trait;
use keyring::Entry;

use super::{SecretStore, SERVICE};
use crate::error::AuthError;

/// Secret store backed by the OS keychain. Keyring calls are blocking, so
/// each operation runs on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE.to_string(),
        }
    }

    /// Create a store under a different service namespace
    #[allow(dead_code)]
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretStore for KeyringStore {
    async fn get(&self, name: &str) -> Result<Option<String>, AuthError> {
        let service = self.service.clone();
        let name = name.to_string();

        tokio::task::spawn_blocking(move || {
            let entry =
                Entry::new(&service, &name).map_err(|e| AuthError::Store(e.to_string()))?;

            match entry.get_password() {
                Ok(value) => Ok(Some(value)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(AuthError::Store(e.to_string())),
            }
        })
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), AuthError> {
        let service = self.service.clone();
        let name = name.to_string();
        let value = value.to_string();

        tokio::task::spawn_blocking(move || {
            let entry =
                Entry::new(&service, &name).map_err(|e| AuthError::Store(e.to_string()))?;
            entry
                .set_password(&value)
                .map_err(|e| AuthError::Store(e.to_string()))
        })
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?
    }
}
