//! Request-scoped credential store.
//!
//! Lives for exactly one inbound server request: reads the request's `Cookie`
//! header, and collects outbound `Set-Cookie` values for the response that
//! ends the request.

use std::sync::Mutex;

use tracing::debug;

use crate::credential::cookie::{
    format_removal_cookie, format_set_cookie, parse_cookie_header, ACCESS_COOKIE,
    ACCESS_COOKIE_MAX_AGE, REFRESH_COOKIE, REFRESH_COOKIE_MAX_AGE,
};
use crate::credential::store::{Credential, CredentialStore};

#[derive(Debug)]
pub struct RequestScopedStore {
    current: Mutex<Option<Credential>>,
    outbound: Mutex<Vec<String>>,
    secure: bool,
}

impl RequestScopedStore {
    /// Build the store from the inbound `Cookie` header, if the request
    /// carried one.
    pub fn from_cookie_header(header: Option<&str>, secure: bool) -> Self {
        let current = header.and_then(|header| {
            let jar = parse_cookie_header(header);
            let access = jar.get(ACCESS_COOKIE)?;
            Some(Credential::new(
                access.clone(),
                jar.get(REFRESH_COOKIE).cloned(),
            ))
        });
        Self {
            current: Mutex::new(current),
            outbound: Mutex::new(Vec::new()),
            secure,
        }
    }

    pub fn empty(secure: bool) -> Self {
        Self::from_cookie_header(None, secure)
    }

    /// `Set-Cookie` values accumulated during this request, in write order.
    /// The response layer is expected to emit them verbatim.
    pub fn outbound_cookies(&self) -> Vec<String> {
        self.outbound.lock().unwrap().clone()
    }
}

impl CredentialStore for RequestScopedStore {
    fn read(&self) -> Option<Credential> {
        self.current.lock().unwrap().clone()
    }

    fn write(&self, credential: &Credential) {
        let mut outbound = self.outbound.lock().unwrap();
        outbound.push(format_set_cookie(
            ACCESS_COOKIE,
            &credential.access_token,
            ACCESS_COOKIE_MAX_AGE,
            self.secure,
        ));
        if let Some(refresh) = &credential.refresh_token {
            outbound.push(format_set_cookie(
                REFRESH_COOKIE,
                refresh,
                REFRESH_COOKIE_MAX_AGE,
                self.secure,
            ));
        }
        drop(outbound);
        *self.current.lock().unwrap() = Some(credential.clone());
        debug!("request-scoped store updated");
    }

    fn clear(&self) {
        let mut outbound = self.outbound.lock().unwrap();
        outbound.push(format_removal_cookie(ACCESS_COOKIE, self.secure));
        outbound.push(format_removal_cookie(REFRESH_COOKIE, self.secure));
        drop(outbound);
        *self.current.lock().unwrap() = None;
        debug!("request-scoped store cleared");
    }
}
