// Secret store abstraction
// Single-value-per-key storage under a fixed service namespace

use async_trait::async_trait;

use crate::error::AuthError;

mod keyring;
#[allow(dead_code)]
mod memory;

pub use self::keyring::KeyringStore;
pub use self::memory::MemoryStore;

/// Service namespace under which all credential slots are stored
pub const SERVICE: &str = "oauth2-mail";

/// Opaque get/set-by-name storage. The store holds one string value per
/// name; everything above this trait treats that value as a blob.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Look up the value stored under `name`. Absence is a normal state,
    /// not an error.
    async fn get(&self, name: &str) -> Result<Option<String>, AuthError>;

    /// Write `value` under `name`, overwriting any prior value
    async fn set(&self, name: &str, value: &str) -> Result<(), AuthError>;
}
