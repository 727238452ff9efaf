//! Cookie header parsing and `Set-Cookie` formatting for credential storage.

use std::collections::HashMap;

pub const ACCESS_COOKIE: &str = "auth_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Storage ceiling for the access cookie, independent of the token's own
/// embedded expiry.
pub const ACCESS_COOKIE_MAX_AGE: u64 = 7 * 24 * 60 * 60;
/// Storage ceiling for the renewal cookie.
pub const REFRESH_COOKIE_MAX_AGE: u64 = 30 * 24 * 60 * 60;

/// Parse an inbound `Cookie` header into name/value pairs.
pub fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_owned(), value.trim().to_owned()))
        })
        .collect()
}

/// Format an outbound `Set-Cookie` value with the crate's credential-cookie
/// attributes: `HttpOnly`, `SameSite=Lax`, `Secure` when requested.
pub fn format_set_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Max-Age={max_age}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Format a `Set-Cookie` value that removes the cookie.
pub fn format_removal_cookie(name: &str, secure: bool) -> String {
    format_set_cookie(name, "", 0, secure)
}
