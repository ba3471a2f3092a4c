//! Headless client for the household pantry and recipes backend.
//!
//! `ApiClient` is the entry point. It wraps a `SessionManager` that keeps the JWT
//! pair fresh (single-flight refresh) and a `Dispatcher` that performs the JSON
//! exchanges. Persistence of secrets and preferences is pluggable via `store`.

pub mod error;
pub mod config;
pub mod models;
pub mod store;
pub mod identity;
pub mod client;
pub mod services;

pub use client::{ApiClient, Dispatcher, HttpMethod};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, HttpError, TokenDecodeError};
pub use identity::{IdentityClaims, SessionManager, SessionState};
pub use models::TokenPair;
pub use store::{JsonFileStore, MemoryStore, PreferenceStore, SecretStore};
