// Credential persistence through the secret store

use std::sync::Arc;

use crate::error::AuthError;
use crate::store::SecretStore;

use super::types::CredentialRecord;

/// Translates between the secret store's single string value and the
/// structured credential record
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn SecretStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Load the record stored under `name`. A missing or empty entry is a
    /// normal state (not yet authorized) and yields an empty record; an
    /// entry that fails to parse indicates store corruption and surfaces
    /// as an error.
    pub async fn load(&self, name: &str) -> Result<CredentialRecord, AuthError> {
        match self.store.get(name).await? {
            None => Ok(CredentialRecord::default()),
            Some(raw) if raw.trim().is_empty() => Ok(CredentialRecord::default()),
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|source| AuthError::StoreCorrupt {
                    name: name.to_string(),
                    source,
                })
            }
        }
    }

    /// Serialize the full record and overwrite whatever is stored under
    /// `name`
    pub async fn save(&self, name: &str, record: &CredentialRecord) -> Result<(), AuthError> {
        let raw = serde_json::to_string(record)
            .map_err(|e| AuthError::Store(format!("failed to serialize record: {e}")))?;
        self.store.set(name, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn store_with_memory() -> (Arc<MemoryStore>, CredentialStore) {
        let memory = Arc::new(MemoryStore::new());
        let store = CredentialStore::new(memory.clone() as Arc<dyn SecretStore>);
        (memory, store)
    }

    #[tokio::test]
    async fn test_absent_name_yields_empty_record() {
        let (_, store) = store_with_memory();
        let record = store.load("missing").await.unwrap();
        assert_eq!(record, CredentialRecord::default());
        assert!(!record.is_complete());
    }

    #[tokio::test]
    async fn test_empty_value_yields_empty_record() {
        let (memory, store) = store_with_memory();
        memory.set("blank", "  ").await.unwrap();
        let record = store.load("blank").await.unwrap();
        assert_eq!(record, CredentialRecord::default());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips_all_fields() {
        let (_, store) = store_with_memory();
        let record = CredentialRecord {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            refresh_token: Some("refresh".to_string()),
            access_token: Some("bearer".to_string()),
            expiry: Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap()),
        };

        store.save("slot", &record).await.unwrap();
        let loaded = store.load("slot").await.unwrap();
        assert_eq!(loaded, record);

        // Saving what was loaded must be a fixed point
        store.save("slot", &loaded).await.unwrap();
        assert_eq!(store.load("slot").await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_malformed_blob_is_store_corruption() {
        let (memory, store) = store_with_memory();
        memory.set("bad", "{not json").await.unwrap();

        let err = store.load("bad").await.unwrap_err();
        match err {
            AuthError::StoreCorrupt { name, .. } => assert_eq!(name, "bad"),
            other => panic!("expected StoreCorrupt, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_save_overwrites_prior_value() {
        let (_, store) = store_with_memory();
        let mut record = CredentialRecord {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            refresh_token: Some("refresh".to_string()),
            access_token: Some("old".to_string()),
            expiry: None,
        };
        store.save("slot", &record).await.unwrap();

        record.access_token = None;
        store.save("slot", &record).await.unwrap();

        let loaded = store.load("slot").await.unwrap();
        assert_eq!(loaded.access_token, None);
    }
}
