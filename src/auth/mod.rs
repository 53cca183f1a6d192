// Authorization module
// Credential record lifecycle: persistence, refresh, and the interactive
// flow that creates the first record

pub mod credentials;
pub mod flow;
pub mod manager;
pub mod refresh;
pub mod types;

pub use manager::TokenManager;
