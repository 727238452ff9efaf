//! # Bearer Client Library
//!
//! Authenticated API-access core for a web front end: attaches bearer
//! credentials to outbound requests, keeps them valid across two execution
//! contexts (request-scoped server vs. session-scoped browser), renews them
//! with a single-flight coordinator, and coordinates tag-based cache
//! invalidation after mutating calls.
//!
//! Modules:
//! - `config` — runtime settings (base URLs, timeout, cookie policy)
//! - `credential` — credential pair and the two store variants
//! - `token` — pure expiry oracle over self-describing tokens
//! - `refresh` — single-flight renewal coordinator
//! - `client` — request executor, auth endpoint bindings, envelopes
//! - `cache` — cache tag registry

pub mod cache;
pub mod client;
pub mod config;
pub mod context;
pub mod credential;
pub mod error;
pub mod helpers;
pub mod refresh;
pub mod tests;
pub mod token;
pub mod utils;

pub use crate::cache::CacheTagRegistry;
pub use crate::client::{ApiClient, ApiEnvelope, PagedEnvelope, RequestBody, RequestConfig};
pub use crate::config::ApiSettings;
pub use crate::context::{ExecutionContext, RequestContext, SessionContext};
pub use crate::credential::{Credential, CredentialStore, RequestScopedStore, SessionStore};
pub use crate::error::{ApiError, ClientError, ErrorMessage};
pub use crate::refresh::RefreshCoordinator;
