//! Bindings for the identity collaborator's endpoints.
//!
//! Renewal is not duplicated here; it belongs to the refresh coordinator.

use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::client::executor::{ApiClient, RequestBody, RequestConfig};
use crate::credential::store::Credential;
use crate::error::ClientError;
use crate::refresh::TokenPair;

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl ApiClient {
    /// Sign in and persist the returned credential in the active store.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credential, ClientError> {
        let pair: TokenPair = self
            .request(
                Method::POST,
                "/auth/login",
                Some(RequestBody::Json(json!(LoginRequest { email, password }))),
                RequestConfig::default(),
            )
            .await?;
        let credential = Credential::new(pair.access_token, pair.refresh_token);
        self.store().write(&credential);
        info!("signed in, credential stored");
        Ok(credential)
    }

    /// Sign out. The local credential is destroyed whether or not the backend
    /// acknowledged.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self
            .request::<serde_json::Value>(
                Method::POST,
                "/auth/logout",
                None,
                RequestConfig::default(),
            )
            .await;
        self.store().clear();
        info!("signed out, credential destroyed");
        result.map(|_| ())
    }

    /// Current identity as reported by the backend. The schema belongs to the
    /// caller.
    pub async fn me<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        self.get("/auth/me", RequestConfig::default()).await
    }
}
