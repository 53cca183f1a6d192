// In-memory backend

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::SecretStore;
use crate::error::AuthError;

/// Mutex-guarded map store. Used by tests in place of the OS keychain.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<String>, AuthError> {
        let values = self
            .values
            .lock()
            .map_err(|_| AuthError::Store("memory store lock poisoned".to_string()))?;
        Ok(values.get(name).cloned())
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), AuthError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| AuthError::Store("memory store lock poisoned".to_string()))?;
        values.insert(name.to_string(), value.to_string());
        Ok(())
    }
}
