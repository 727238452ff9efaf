use serde::{Deserialize, Serialize};

/// Bearer credential pair held for the signed-in identity.
///
/// Mutated only by sign-in, successful renewal, or sign-out; a failed renewal
/// destroys it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

/// Storage contract shared by the two execution-context variants.
///
/// A missing credential is not an error: `read` returns `None` and callers
/// treat that as "unauthenticated".
pub trait CredentialStore: Send + Sync {
    fn read(&self) -> Option<Credential>;
    fn write(&self, credential: &Credential);
    fn clear(&self);
}
