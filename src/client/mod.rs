pub mod auth;
pub mod envelope;
pub mod executor;

pub use envelope::{ApiEnvelope, PageMeta, PagedEnvelope};
pub use executor::{ApiClient, RequestBody, RequestConfig};
