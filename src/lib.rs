// OAuth2 Mail - Library root for testing

pub mod auth;
pub mod config;
pub mod error;
pub mod store;
