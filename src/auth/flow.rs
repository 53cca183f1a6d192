// Interactive authorization flow
// Obtains the first credential record via the OAuth2 authorization-code
// grant with PKCE, then persists it through the credential store

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use rand::RngCore;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use url::Url;

use crate::store::SecretStore;

use super::credentials::CredentialStore;
use super::types::{ClientSecrets, ClientSecretsFile, CredentialRecord, TokenResponse};

/// Out-of-band redirect target for the headless (console) flow
const OOB_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";

/// PKCE S256 challenge pair
struct PkceChallenge {
    verifier: String,
    challenge: String,
}

/// Run the authorization flow and persist the resulting record under
/// `name`. Default mode listens on an ephemeral loopback port for the
/// browser redirect; headless mode prints the consent URL and reads the
/// code from stdin.
pub async fn authorize(
    store: Arc<dyn SecretStore>,
    name: &str,
    client_secrets_path: &Path,
    scope: &str,
    headless: bool,
    http_timeout: u64,
) -> Result<()> {
    let secrets = load_client_secrets(client_secrets_path)?;

    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(http_timeout))
        .build()
        .context("Failed to create HTTP client")?;

    let pkce = generate_pkce();
    let state = generate_state();

    let (code, redirect_uri) = if headless {
        let auth_url = build_auth_url(&secrets, scope, OOB_REDIRECT, &state, &pkce.challenge)?;
        let code = prompt_for_code(&auth_url).await?;
        (code, OOB_REDIRECT.to_string())
    } else {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind loopback listener for the redirect")?;
        let redirect_uri = format!("http://127.0.0.1:{}/", listener.local_addr()?.port());
        let auth_url = build_auth_url(&secrets, scope, &redirect_uri, &state, &pkce.challenge)?;

        println!("Open this URL in your browser to authorize:\n\n  {auth_url}\n");
        println!("Waiting for the redirect...");

        let code = wait_for_callback(listener, &state).await?;
        (code, redirect_uri)
    };

    let record = exchange_code(&client, &secrets, &code, &redirect_uri, &pkce.verifier).await?;

    CredentialStore::new(store).save(name, &record).await?;
    tracing::info!(name, "credential record saved");

    Ok(())
}

fn load_client_secrets(path: &Path) -> Result<ClientSecrets> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read client secrets file: {}", path.display()))?;
    let file: ClientSecretsFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse client secrets file: {}", path.display()))?;
    file.into_client()
        .context("client secrets file contains neither an 'installed' nor a 'web' section")
}

/// Generate a PKCE S256 challenge pair
fn generate_pkce() -> PkceChallenge {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let verifier = URL_SAFE_NO_PAD.encode(bytes);

    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    let challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

    PkceChallenge {
        verifier,
        challenge,
    }
}

/// Generate a random state parameter
fn generate_state() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn build_auth_url(
    secrets: &ClientSecrets,
    scope: &str,
    redirect_uri: &str,
    state: &str,
    challenge: &str,
) -> Result<String> {
    let mut url =
        Url::parse(&secrets.auth_uri).context("Invalid auth_uri in client secrets file")?;

    // access_type=offline plus prompt=consent makes the server issue a
    // refresh token even for a previously authorized client
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &secrets.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", scope)
        .append_pair("state", state)
        .append_pair("code_challenge", challenge)
        .append_pair("code_challenge_method", "S256")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");

    Ok(url.to_string())
}

/// Accept a single redirect on the loopback listener and extract the
/// authorization code
async fn wait_for_callback(listener: TcpListener, expected_state: &str) -> Result<String> {
    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept the authorization redirect")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read the authorization redirect")?;

    let result = parse_redirect(&request_line, expected_state);

    let body = match &result {
        Ok(_) => "Authorization complete. You can close this window.",
        Err(_) => "Authorization failed. Check the terminal for details.",
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );

    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;

    result
}

/// Parse `GET /?code=...&state=... HTTP/1.1` into the authorization code,
/// verifying the state parameter
fn parse_redirect(request_line: &str, expected_state: &str) -> Result<String> {
    let path = request_line
        .split_whitespace()
        .nth(1)
        .context("Malformed redirect request")?;
    let url =
        Url::parse(&format!("http://localhost{path}")).context("Malformed redirect URL")?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        bail!("authorization was denied: {error}");
    }
    if state.as_deref() != Some(expected_state) {
        bail!("state mismatch in authorization redirect");
    }
    code.context("authorization redirect carried no code")
}

/// Console fallback: print the consent URL and read the code from stdin
async fn prompt_for_code(auth_url: &str) -> Result<String> {
    println!("Open this URL in a browser, authorize, and paste the code below:\n\n  {auth_url}\n");
    print!("Code: ");
    std::io::Write::flush(&mut std::io::stdout()).context("Failed to flush stdout")?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read the authorization code")?;

    let code = line.trim().to_string();
    if code.is_empty() {
        bail!("no authorization code entered");
    }
    Ok(code)
}

/// Exchange the authorization code for tokens and assemble the complete
/// credential record
async fn exchange_code(
    client: &Client,
    secrets: &ClientSecrets,
    code: &str,
    redirect_uri: &str,
    code_verifier: &str,
) -> Result<CredentialRecord> {
    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", secrets.client_id.as_str()),
        ("client_secret", secrets.client_secret.as_str()),
        ("redirect_uri", redirect_uri),
        ("code_verifier", code_verifier),
    ];

    let response = client
        .post(&secrets.token_uri)
        .form(&form)
        .send()
        .await
        .context("Failed to send the token exchange request")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("token exchange failed: {status} - {body}");
    }

    let data: TokenResponse = response
        .json()
        .await
        .context("Failed to parse the token exchange response")?;

    let refresh_token = data.refresh_token.context(
        "authorization server returned no refresh token; \
         revoke the application's access and authorize again",
    )?;

    let expiry = data.expires_in.map(|s| Utc::now() + Duration::seconds(s));

    Ok(CredentialRecord {
        client_id: Some(secrets.client_id.clone()),
        client_secret: Some(secrets.client_secret.clone()),
        refresh_token: Some(refresh_token),
        access_token: Some(data.access_token).filter(|t| !t.is_empty()),
        expiry,
    })
}
