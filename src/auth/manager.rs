// Token lifecycle manager
// Decides whether a stored token is still usable, refreshes it when not,
// and persists the refreshed record under the same slot

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;

use crate::error::AuthError;
use crate::store::SecretStore;

use super::credentials::CredentialStore;
use super::refresh;

pub struct TokenManager {
    /// Credential persistence
    store: CredentialStore,

    /// HTTP client for refresh requests
    client: Client,

    /// OAuth2 token endpoint
    token_url: String,

    /// Seconds before expiry at which a token is no longer handed out
    /// (default: 300 = 5 minutes)
    refresh_threshold: i64,
}

impl TokenManager {
    pub fn new(
        store: Arc<dyn SecretStore>,
        token_url: impl Into<String>,
        refresh_threshold: u64,
        http_timeout: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(http_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            store: CredentialStore::new(store),
            client,
            token_url: token_url.into(),
            refresh_threshold: refresh_threshold as i64,
        })
    }

    /// Get a valid access token for the credential slot `name`.
    ///
    /// The stored token is returned as-is when it is present and outside the
    /// expiry threshold. Otherwise a refresh grant is performed and the
    /// refreshed record is persisted back under the same slot. Each call is
    /// one store read, at most one network call, at most one store write.
    pub async fn get_token(&self, name: &str, force_refresh: bool) -> Result<String, AuthError> {
        let record = self.store.load(name).await?;

        let Some((client_id, client_secret, refresh_token)) = record.refresh_parts() else {
            return Err(AuthError::NotAuthorized(name.to_string()));
        };

        let mut candidate = record.access_token.clone();

        if force_refresh {
            candidate = None;
        }

        if candidate.is_some() {
            if let Some(expiry) = record.expiry {
                if self.is_expiring_soon(expiry) {
                    tracing::debug!(
                        expiry = %expiry.to_rfc3339(),
                        "stored token is inside the expiry threshold"
                    );
                    candidate = None;
                }
            }
        }

        if let Some(token) = candidate {
            return Ok(token);
        }

        let fresh = refresh::refresh_access_token(
            &self.client,
            &self.token_url,
            client_id,
            client_secret,
            refresh_token,
        )
        .await?;

        let mut updated = record.clone();
        updated.access_token = Some(fresh.access_token.clone());
        updated.expiry = Some(fresh.expiry);
        // The server may rotate the refresh token; keep the old one otherwise
        if let Some(new_refresh_token) = fresh.refresh_token {
            updated.refresh_token = Some(new_refresh_token);
        }

        if let Err(e) = self.store.save(name, &updated).await {
            // A freshly obtained token is valid even when caching it fails
            tracing::warn!(error = %e, name, "failed to persist refreshed record");
        }

        Ok(fresh.access_token)
    }

    /// True when `expiry` falls within the refresh threshold of now,
    /// boundary inclusive
    fn is_expiring_soon(&self, expiry: DateTime<Utc>) -> bool {
        Utc::now() >= expiry - Duration::seconds(self.refresh_threshold)
    }
}
