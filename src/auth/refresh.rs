// Token refresh against the authorization server

use chrono::{Duration, Utc};
use reqwest::Client;

use crate::error::AuthError;

use super::types::{TokenData, TokenResponse};

/// Exchange a refresh token for a new access token using the standard
/// OAuth2 refresh-token grant. A rejection from the server is definitive:
/// no retry is attempted here.
pub async fn refresh_access_token(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenData, AuthError> {
    tracing::debug!(%token_url, "refreshing access token");

    let form = [
        ("grant_type", "refresh_token"),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
    ];

    let response = client.post(token_url).form(&form).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = parse_oauth_error(&body).unwrap_or(body);
        tracing::error!(status = status.as_u16(), %message, "token refresh rejected");
        return Err(AuthError::RefreshRejected {
            status: status.as_u16(),
            message,
        });
    }

    let data: TokenResponse = response.json().await?;
    if data.access_token.is_empty() {
        return Err(AuthError::RefreshRejected {
            status: status.as_u16(),
            message: "response contains no access_token".to_string(),
        });
    }

    let expires_in = data.expires_in.unwrap_or(3600);
    let expiry = Utc::now() + Duration::seconds(expires_in);

    tracing::info!(expiry = %expiry.to_rfc3339(), "access token refreshed");

    Ok(TokenData {
        access_token: data.access_token,
        refresh_token: data.refresh_token,
        expiry,
    })
}

/// Pull `error`/`error_description` out of an OAuth2 error body when present
fn parse_oauth_error(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let code = json.get("error")?.as_str()?;
    match json.get("error_description").and_then(|v| v.as_str()) {
        Some(desc) => Some(format!("{code}: {desc}")),
        None => Some(code.to_string()),
    }
}
