// Configuration module
// CLI arguments with environment fallbacks, priority: CLI > ENV > defaults

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// OAuth2 credential manager for mail access
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// OAuth2 token endpoint URL
    #[arg(
        long,
        env = "TOKEN_URL",
        default_value = "https://oauth2.googleapis.com/token",
        global = true
    )]
    pub token_url: String,

    /// Seconds before expiry at which a stored token is refreshed anyway
    #[arg(long, env = "REFRESH_THRESHOLD", default_value = "300", global = true)]
    pub refresh_threshold: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_TIMEOUT", default_value = "30", global = true)]
    pub http_timeout: u64,

    /// OAuth2 scope requested during authorization
    #[arg(
        long,
        env = "OAUTH_SCOPE",
        default_value = "https://mail.google.com/",
        global = true
    )]
    pub scope: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the interactive authorization flow and store the result
    Authorize {
        /// Path to the client secrets JSON file
        client_secrets: PathBuf,

        /// Name for this credential
        #[arg(long, default_value = "default")]
        name: String,

        /// Print the consent URL and read the code from stdin instead of
        /// listening for the browser redirect
        #[arg(long)]
        headless: bool,
    },

    /// Print a valid access token for a stored credential
    Get {
        /// Name for this credential
        #[arg(default_value = "default")]
        name: String,

        /// Discard the cached token and refresh unconditionally
        #[arg(long)]
        force_refresh: bool,
    },
}

impl Cli {
    /// Parse CLI arguments, loading `.env` first so env-backed flags see it
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.token_url)
            .with_context(|| format!("invalid token URL: {}", self.token_url))?;
        Ok(())
    }
}
