pub mod cookie;
pub mod request_store;
pub mod session_store;
pub mod store;

pub use request_store::RequestScopedStore;
pub use session_store::SessionStore;
pub use store::{Credential, CredentialStore};
