use std::process::ExitCode;
use std::sync::Arc;

mod auth;
mod config;
mod error;
mod store;

use config::{Cli, Command};
use error::AuthError;
use store::{KeyringStore, SecretStore};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::load();

    // Logging goes to stderr: stdout is reserved for the token itself
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level.to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli.validate() {
        tracing::error!("invalid configuration: {e:#}");
        return ExitCode::from(2);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), AuthError> {
    let store: Arc<dyn SecretStore> = Arc::new(KeyringStore::new());

    match cli.command {
        Command::Authorize {
            client_secrets,
            name,
            headless,
        } => {
            auth::flow::authorize(
                store,
                &name,
                &client_secrets,
                &cli.scope,
                headless,
                cli.http_timeout,
            )
            .await?;
            Ok(())
        }

        Command::Get {
            name,
            force_refresh,
        } => {
            let manager = auth::TokenManager::new(
                store,
                cli.token_url,
                cli.refresh_threshold,
                cli.http_timeout,
            )?;

            let token = manager.get_token(&name, force_refresh).await?;
            println!("{token}");
            Ok(())
        }
    }
}
