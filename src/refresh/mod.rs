//! Refresh coordinator: single-flight renewal of an expired access token.
//!
//! At most one renewal operation exists per coordinator at any instant.
//! Callers that find a renewal already in flight attach to it and observe the
//! same outcome. A failed renewal is treated as a terminated session, not a
//! transient error: the store is cleared entirely. (Deliberately aggressive —
//! a transient network failure on the renewal endpoint also signs the session
//! out.)

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::credential::store::{Credential, CredentialStore};
use crate::error::{ApiError, ClientError};
use crate::token;

/// Renewal outcome fanned out to waiters: the fresh access token, or `None`
/// when the session was terminated.
type RefreshOutcome = Option<String>;

enum RefreshState {
    Idle,
    InFlight(broadcast::Sender<RefreshOutcome>),
}

/// Unauthenticated transport for the renewal endpoint.
///
/// Constructed up front and passed into the coordinator so the coordinator
/// never depends on the authenticated executor it serves.
#[derive(Debug, Clone)]
pub struct RefreshTransport {
    client: Client,
    refresh_url: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl RefreshTransport {
    pub fn new(refresh_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            refresh_url,
            timeout,
        }
    }

    async fn exchange(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
        let send = self
            .client
            .post(&self.refresh_url)
            .json(&RefreshRequest { refresh_token })
            .send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))??;

        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await?;
            let err = serde_json::from_slice::<ApiError>(&bytes)
                .unwrap_or_else(|_| ApiError::from_status(status.as_u16(), &self.refresh_url));
            return Err(ClientError::Api(err));
        }
        Ok(response.json::<TokenPair>().await?)
    }
}

pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn CredentialStore>,
    transport: RefreshTransport,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new(store: Arc<dyn CredentialStore>, transport: RefreshTransport) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                transport,
                state: Mutex::new(RefreshState::Idle),
            }),
        }
    }

    /// Resolve an access token that is usable right now.
    ///
    /// Returns `None` when no credential is stored (unauthenticated) or when
    /// renewal fails (session terminated). Never contacts the backend while
    /// the stored token is still valid.
    pub async fn get_valid_credential(&self) -> Option<String> {
        let credential = self.inner.store.read()?;
        if !token::is_expired(&credential.access_token) {
            return Some(credential.access_token);
        }
        debug!("access token expired, entering renewal");
        self.refresh_once().await
    }

    /// Run (or attach to) a single renewal operation.
    ///
    /// Exposed for the refresh-then-retry-once pattern after a backend 401:
    /// the stored token may look valid locally and still be rejected.
    ///
    /// The renewal itself runs on its own task. A caller that gives up and
    /// drops this future — a `select!`, a caller-side timeout — cannot leave
    /// the in-flight marker set: the task always restores `Idle` and wakes
    /// the remaining waiters.
    pub async fn refresh_once(&self) -> RefreshOutcome {
        let mut rx = {
            let mut state = self.inner.state.lock().await;
            match &*state {
                RefreshState::InFlight(tx) => {
                    debug!("renewal already in flight, awaiting its outcome");
                    tx.subscribe()
                }
                RefreshState::Idle => {
                    let (tx, rx) = broadcast::channel(1);
                    *state = RefreshState::InFlight(tx);
                    let inner = self.inner.clone();
                    tokio::spawn(async move {
                        let outcome = inner.renew().await;
                        // Clear the in-flight marker before waking waiters so
                        // the next expired-token observation starts a fresh
                        // renewal.
                        let mut state = inner.state.lock().await;
                        if let RefreshState::InFlight(tx) =
                            std::mem::replace(&mut *state, RefreshState::Idle)
                        {
                            let _ = tx.send(outcome);
                        }
                    });
                    rx
                }
            }
        };
        rx.recv().await.ok().flatten()
    }
}

impl Inner {
    async fn renew(&self) -> RefreshOutcome {
        let refresh_token = match self.store.read().and_then(|c| c.refresh_token) {
            Some(token) => token,
            None => {
                info!("no renewal credential stored, terminating session");
                self.store.clear();
                return None;
            }
        };

        match self.transport.exchange(&refresh_token).await {
            Ok(pair) => {
                let credential = Credential::new(
                    pair.access_token.clone(),
                    pair.refresh_token.or(Some(refresh_token)),
                );
                self.store.write(&credential);
                info!("access token renewed");
                Some(pair.access_token)
            }
            Err(err) => {
                warn!("renewal failed, terminating session: {err}");
                self.store.clear();
                None
            }
        }
    }
}
