// Credential record and OAuth2 wire types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted credential slot, serialized as JSON field/value pairs in
/// the secret store. All fields are optional in the serialized form; fields
/// absent from the stored blob stay unset, and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Records written by older tooling stored this under the key `token`
    #[serde(default, alias = "token", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl CredentialRecord {
    /// The three fields a refresh grant requires, or `None` if any is
    /// missing or empty
    pub fn refresh_parts(&self) -> Option<(&str, &str, &str)> {
        let client_id = self.client_id.as_deref().filter(|s| !s.is_empty())?;
        let client_secret = self.client_secret.as_deref().filter(|s| !s.is_empty())?;
        let refresh_token = self.refresh_token.as_deref().filter(|s| !s.is_empty())?;
        Some((client_id, client_secret, refresh_token))
    }

    /// A record is complete when it can be refreshed without re-running
    /// the authorization flow
    #[allow(dead_code)]
    pub fn is_complete(&self) -> bool {
        self.refresh_parts().is_some()
    }
}

/// Token data produced by a successful refresh or code exchange
#[derive(Debug, Clone)]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
}

/// Token endpoint success response (refresh-token and authorization-code
/// grants share this shape)
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
}

/// Client secrets file: the OAuth client sits under either an `installed`
/// or a `web` key
#[derive(Debug, Deserialize)]
pub struct ClientSecretsFile {
    pub installed: Option<ClientSecrets>,
    pub web: Option<ClientSecrets>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ClientSecretsFile {
    pub fn into_client(self) -> Option<ClientSecrets> {
        self.installed.or(self.web)
    }
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_completeness_requires_all_three_fields() {
        let mut record = CredentialRecord {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            refresh_token: Some("refresh".to_string()),
            access_token: None,
            expiry: None,
        };
        assert!(record.is_complete());

        record.refresh_token = None;
        assert!(!record.is_complete());

        record.refresh_token = Some(String::new());
        assert!(!record.is_complete());

        assert!(!CredentialRecord::default().is_complete());
    }

    #[test]
    fn test_serialization_round_trip() {
        let record = CredentialRecord {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            refresh_token: Some("refresh".to_string()),
            access_token: Some("bearer".to_string()),
            expiry: Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap()),
        };

        let raw = serde_json::to_string(&record).unwrap();
        let parsed: CredentialRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_optional_fields_are_omitted_when_absent() {
        let record = CredentialRecord {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            refresh_token: Some("refresh".to_string()),
            access_token: None,
            expiry: None,
        };

        let raw = serde_json::to_string(&record).unwrap();
        assert!(!raw.contains("access_token"));
        assert!(!raw.contains("expiry"));

        let parsed: CredentialRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_legacy_token_key_is_accepted() {
        let raw = r#"{
            "client_id": "id",
            "client_secret": "secret",
            "refresh_token": "refresh",
            "token": "bearer",
            "expiry": "2025-06-01T12:30:00Z",
            "token_uri": "https://oauth2.googleapis.com/token",
            "scopes": ["https://mail.google.com/"]
        }"#;

        let parsed: CredentialRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.access_token.as_deref(), Some("bearer"));
        assert!(parsed.is_complete());
        assert_eq!(
            parsed.expiry,
            Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_client_secrets_installed_and_web() {
        let installed = r#"{"installed": {"client_id": "id", "client_secret": "s"}}"#;
        let file: ClientSecretsFile = serde_json::from_str(installed).unwrap();
        let client = file.into_client().unwrap();
        assert_eq!(client.client_id, "id");
        assert_eq!(client.auth_uri, "https://accounts.google.com/o/oauth2/auth");
        assert_eq!(client.token_uri, "https://oauth2.googleapis.com/token");

        let web = r#"{"web": {"client_id": "w", "client_secret": "s", "token_uri": "https://example.com/token"}}"#;
        let file: ClientSecretsFile = serde_json::from_str(web).unwrap();
        let client = file.into_client().unwrap();
        assert_eq!(client.client_id, "w");
        assert_eq!(client.token_uri, "https://example.com/token");

        let neither: ClientSecretsFile = serde_json::from_str("{}").unwrap();
        assert!(neither.into_client().is_none());
    }
}
