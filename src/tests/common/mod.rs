// tests/common/mod.rs
use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::json;
use tempfile::TempDir;

use crate::config::ApiSettings;
use crate::context::SessionContext;
use crate::credential::SessionStore;
use crate::utils::logging::{init_logging, LogFormat};

/// Idempotent; later calls are no-ops once a subscriber is installed.
pub fn init_test_logging() {
    init_logging("debug", LogFormat::Compact);
}

/// Build an unsigned three-segment token with the given `exp` claim.
/// The signature segment is garbage; nothing here verifies signatures.
pub fn make_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(json!({"alg": "HS256", "typ": "JWT"}).to_string());
    let payload = URL_SAFE_NO_PAD.encode(
        json!({"sub": "user-1", "email": "user@example.com", "exp": exp}).to_string(),
    );
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn settings_for(base_url: &str) -> ApiSettings {
    ApiSettings {
        server_base_url: base_url.to_owned(),
        browser_base_url: base_url.to_owned(),
        timeout_ms: 10_000,
        secure_cookies: false,
    }
}

/// Session-scoped context backed by a file in a throwaway directory.
pub fn session_context(dir: &TempDir) -> (Arc<SessionContext>, PathBuf) {
    let path = dir.path().join("credentials.json");
    let context = Arc::new(SessionContext::new(SessionStore::new(&path, false)));
    (context, path)
}
