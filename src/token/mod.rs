//! Expiry oracle: decode-and-compare on self-describing bearer tokens.
//!
//! The access token is a three-segment dot-separated token whose middle
//! segment is a base64url JSON document carrying an `exp` claim. Everything
//! here is pure; no I/O, no clock other than wall time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use crate::helpers::time::now_i64;

/// Minimal identity claims carried by the access token.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub exp: Option<i64>,
    pub sub: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Decode the payload segment of a token without verifying its signature.
///
/// Returns `None` for anything that is not a three-segment token with a
/// base64url JSON payload.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return None,
    };
    let raw = URL_SAFE_NO_PAD.decode(payload.as_bytes()).ok()?;
    serde_json::from_slice(&raw).ok()
}

/// Whether the token's embedded expiry has passed.
///
/// Fail closed: a token that cannot be decoded, or that carries no `exp`
/// claim, is reported as expired.
pub fn is_expired(token: &str) -> bool {
    match decode_claims(token).and_then(|claims| claims.exp) {
        Some(exp) => now_i64() >= exp,
        None => true,
    }
}
