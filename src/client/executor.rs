//! Request executor: builds the outbound request, attaches the credential,
//! applies timeout/cancellation, and normalizes success and failure into one
//! shape.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use http::Method;
use reqwest::multipart::Form;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::CacheTagRegistry;
use crate::config::ApiSettings;
use crate::context::ExecutionContext;
use crate::credential::store::CredentialStore;
use crate::error::{ApiError, ClientError};
use crate::refresh::{RefreshCoordinator, RefreshTransport};

/// Advisory header carrying the caller's cache-tag list to downstream
/// infrastructure. Forwarded by server-scoped contexts only.
pub const CACHE_TAGS_HEADER: &str = "x-cache-tags";

/// Per-call options. All advisory; `Default` is a plain JSON call with the
/// client's default timeout.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
    /// Tags that go stale if this call mutates state. Meaningful on mutating
    /// calls only; not enforced here.
    pub invalidation_tags: Vec<String>,
}

impl RequestConfig {
    pub fn with_tags(tags: &[&str]) -> Self {
        Self {
            invalidation_tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            ..Self::default()
        }
    }
}

pub enum RequestBody {
    Json(serde_json::Value),
    /// Binary multipart payload. No `Content-Type` is set so the transport
    /// can pick the boundary.
    Multipart(Form),
}

impl RequestBody {
    pub fn json(body: &impl Serialize) -> Result<Self, ClientError> {
        Ok(RequestBody::Json(serde_json::to_value(body)?))
    }
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    context: Arc<dyn ExecutionContext>,
    coordinator: RefreshCoordinator,
    tags: CacheTagRegistry,
    default_timeout: Duration,
}

impl ApiClient {
    pub fn new(
        settings: &ApiSettings,
        context: Arc<dyn ExecutionContext>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().build()?;
        let base_url = settings.base_url_for(context.as_ref()).to_owned();
        let transport = RefreshTransport::new(
            format!("{base_url}/auth/refresh"),
            settings.timeout(),
        );
        let coordinator = RefreshCoordinator::new(context.credential_store(), transport);
        Ok(Self {
            client,
            base_url,
            context,
            coordinator,
            tags: CacheTagRegistry::new(),
            default_timeout: settings.timeout(),
        })
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn tags(&self) -> &CacheTagRegistry {
        &self.tags
    }

    pub(crate) fn store(&self) -> Arc<dyn CredentialStore> {
        self.context.credential_store()
    }

    /// Execute one call against the backend.
    ///
    /// Absence of a credential is not an error here: the call goes out
    /// without an `Authorization` header and the backend decides. Non-2xx
    /// responses come back as `ClientError::Api`; local give-ups as
    /// `Timeout`/`Cancelled`. No automatic 401 retry — see
    /// `request_with_reauth` for the caller-composed pattern.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
        config: RequestConfig,
    ) -> Result<T, ClientError> {
        let timeout = config.timeout.unwrap_or(self.default_timeout);

        // The cancellation signal covers the whole call, credential
        // resolution included: a cancelled caller must not sit through a
        // slow renewal.
        let response = match config.cancellation.as_ref() {
            Some(signal) => tokio::select! {
                _ = signal.cancelled() => return Err(ClientError::Cancelled),
                response = self.dispatch(&method, path, body, &config, timeout) => response?,
            },
            None => self.dispatch(&method, path, body, &config, timeout).await?,
        };

        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await?;
            let err = serde_json::from_slice::<ApiError>(&bytes)
                .unwrap_or_else(|_| ApiError::from_status(status.as_u16(), path));
            debug!("{} {} failed: {}", method, path, err);
            return Err(ClientError::Api(err));
        }

        if is_mutating(&method) {
            self.tags.invalidate(&config.invalidation_tags);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            // 204-style responses decode as JSON null so `()` and
            // `Option<T>` targets work.
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: Option<RequestBody>,
        config: &RequestConfig,
        timeout: Duration,
    ) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method.clone(), &url);

        if let Some(access_token) = self.coordinator.get_valid_credential().await {
            request = request.bearer_auth(access_token);
        }
        request = request.headers(self.build_headers(config));

        match body {
            Some(RequestBody::Json(value)) => request = request.json(&value),
            Some(RequestBody::Multipart(form)) => request = request.multipart(form),
            None => {}
        }

        debug!("{} {} (timeout {:?})", method, url, timeout);
        match tokio::time::timeout(timeout, request.send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) if err.is_timeout() => Err(ClientError::Timeout(timeout)),
            Ok(Err(err)) => Err(ClientError::Transport(err)),
            Err(_) => Err(ClientError::Timeout(timeout)),
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<T, ClientError> {
        self.request(Method::GET, path, None, config).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        config: RequestConfig,
    ) -> Result<T, ClientError> {
        self.request(Method::POST, path, Some(RequestBody::json(body)?), config)
            .await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        config: RequestConfig,
    ) -> Result<T, ClientError> {
        self.request(Method::PUT, path, Some(RequestBody::json(body)?), config)
            .await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
        config: RequestConfig,
    ) -> Result<T, ClientError> {
        self.request(Method::PATCH, path, Some(RequestBody::json(body)?), config)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<T, ClientError> {
        self.request(Method::DELETE, path, None, config).await
    }

    /// The documented refresh-then-retry-once pattern for backend 401s.
    ///
    /// A stored token can look valid locally and still be rejected (revoked,
    /// clock skew). On a 401, force one renewal through the coordinator's
    /// single-flight gate and retry exactly once with the fresh token; any
    /// other outcome is returned as-is.
    pub async fn request_with_reauth<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        config: RequestConfig,
    ) -> Result<T, ClientError> {
        let first = self
            .request(
                method.clone(),
                path,
                body.clone().map(RequestBody::Json),
                config.clone(),
            )
            .await;
        match first {
            Err(ClientError::Api(ref err)) if err.status_code == 401 => {
                if self.coordinator.refresh_once().await.is_none() {
                    return first;
                }
                debug!("retrying {} {} after renewal", method, path);
                self.request(method, path, body.map(RequestBody::Json), config)
                    .await
            }
            other => other,
        }
    }

    fn build_headers(&self, config: &RequestConfig) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!("skipping malformed header '{}'", name),
            }
        }
        if self.context.is_server_scoped() && !config.invalidation_tags.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&config.invalidation_tags.join(",")) {
                headers.insert(HeaderName::from_static(CACHE_TAGS_HEADER), value);
            }
        }
        headers
    }
}

fn is_mutating(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}
