//! Execution-context capability: which trust/storage boundary a call site
//! runs in, and the credential store that goes with it.
//!
//! Exactly one variant is active per call site. The core is polymorphic over
//! this capability instead of reaching for a shared mutable global.

use std::sync::Arc;

use crate::credential::store::CredentialStore;
use crate::credential::{RequestScopedStore, SessionStore};

pub trait ExecutionContext: Send + Sync {
    fn credential_store(&self) -> Arc<dyn CredentialStore>;
    fn is_server_scoped(&self) -> bool;
}

/// Trusted, request-scoped context: lives for one inbound server request,
/// credentials come from that request's cookie jar.
pub struct RequestContext {
    store: Arc<RequestScopedStore>,
}

impl RequestContext {
    pub fn new(store: RequestScopedStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &RequestScopedStore {
        &self.store
    }
}

impl ExecutionContext for RequestContext {
    fn credential_store(&self) -> Arc<dyn CredentialStore> {
        self.store.clone()
    }

    fn is_server_scoped(&self) -> bool {
        true
    }
}

/// Untrusted, session-scoped context: lives until explicit sign-out,
/// credentials come from durable storage mirrored into cookies.
pub struct SessionContext {
    store: Arc<SessionStore>,
}

impl SessionContext {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}

impl ExecutionContext for SessionContext {
    fn credential_store(&self) -> Arc<dyn CredentialStore> {
        self.store.clone()
    }

    fn is_server_scoped(&self) -> bool {
        false
    }
}
