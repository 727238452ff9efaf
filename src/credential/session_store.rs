//! Session-scoped credential store.
//!
//! Lives until explicit sign-out: the credential is persisted as a small JSON
//! document at a caller-supplied path, and both values are mirrored into
//! cookie strings so a subsequent server-rendered request can read them from
//! its own cookie jar.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::credential::cookie::{
    format_removal_cookie, format_set_cookie, ACCESS_COOKIE, ACCESS_COOKIE_MAX_AGE,
    REFRESH_COOKIE, REFRESH_COOKIE_MAX_AGE,
};
use crate::credential::store::{Credential, CredentialStore};

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    mirror: Mutex<Vec<String>>,
    secure: bool,
}

impl SessionStore {
    pub fn new(path: impl AsRef<Path>, secure: bool) -> Self {
        Self {
            path: path.as_ref().to_owned(),
            mirror: Mutex::new(Vec::new()),
            secure,
        }
    }

    /// Cookie strings mirroring the durable values, for the response layer to
    /// forward so the request-scoped variant sees them on the next request.
    pub fn mirrored_cookies(&self) -> Vec<String> {
        self.mirror.lock().unwrap().clone()
    }
}

impl CredentialStore for SessionStore {
    fn read(&self) -> Option<Credential> {
        let raw = std::fs::read(&self.path).ok()?;
        match serde_json::from_slice(&raw) {
            Ok(credential) => Some(credential),
            Err(err) => {
                warn!("unreadable credential document at {:?}: {err}", self.path);
                None
            }
        }
    }

    fn write(&self, credential: &Credential) {
        let doc = serde_json::to_vec(credential).expect("credential serializes");
        // write-then-rename so a concurrent read never sees a half-written
        // document
        let tmp = self.path.with_extension("tmp");
        let result =
            std::fs::write(&tmp, doc).and_then(|()| std::fs::rename(&tmp, &self.path));
        if let Err(err) = result {
            warn!("failed to persist credential at {:?}: {err}", self.path);
        }
        let mut mirror = self.mirror.lock().unwrap();
        mirror.clear();
        mirror.push(format_set_cookie(
            ACCESS_COOKIE,
            &credential.access_token,
            ACCESS_COOKIE_MAX_AGE,
            self.secure,
        ));
        if let Some(refresh) = &credential.refresh_token {
            mirror.push(format_set_cookie(
                REFRESH_COOKIE,
                refresh,
                REFRESH_COOKIE_MAX_AGE,
                self.secure,
            ));
        }
        debug!("session store updated at {:?}", self.path);
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("session store cleared at {:?}", self.path),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!("failed to clear credential at {:?}: {err}", self.path),
        }
        let mut mirror = self.mirror.lock().unwrap();
        mirror.clear();
        mirror.push(format_removal_cookie(ACCESS_COOKIE, self.secure));
        mirror.push(format_removal_cookie(REFRESH_COOKIE, self.secure));
    }
}
