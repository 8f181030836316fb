//! Session guard implementation
//!
//! Request path: scope gate, cached-credential check, single-flight
//! refresh, idempotent header injection. Response path: invalidation on
//! 401/403 or a redirect into the login flow.

use super::types::{InjectOutcome, InvalidationReason, ResponseOutcome};
use crate::auth::{Authenticator, Credential};
use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::scope::ScopeFilter;
use crate::store::{CredentialStore, MemoryStore, SharedStore};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, COOKIE, LOCATION, REFERER};
use reqwest::StatusCode;
use std::sync::Arc;
use std::sync::LazyLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Matches a `token=` entry at a cookie-name boundary, so an existing
/// `mytoken=` cookie does not count.
static COOKIE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|;\s*)token=").unwrap());

/// Keeps a scanner's traffic authenticated against one target.
///
/// Both hooks are safe to invoke concurrently from many worker tasks;
/// the store is the only shared mutable state and refreshes are
/// single-flighted, so concurrent callers that observe a missing or
/// expiring credential collapse into one login.
pub struct SessionGuard {
    scope: ScopeFilter,
    store: SharedStore,
    authenticator: Authenticator,
    refresh_margin: chrono::Duration,
    referer: HeaderValue,
    refresh_lock: Mutex<()>,
}

impl SessionGuard {
    /// Create a guard with its own in-memory store and HTTP client.
    pub fn new(config: ScanConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Create a guard over an injected credential store.
    pub fn with_store(config: ScanConfig, store: SharedStore) -> Result<Self> {
        config.validate()?;
        let authenticator = Authenticator::new(&config, Arc::clone(&store))?;
        Self::assemble(config, store, authenticator)
    }

    /// Create a guard sharing the host's HTTP client, so the login call
    /// follows the same timeout policy as ordinary outbound requests.
    pub fn with_client(
        config: ScanConfig,
        store: SharedStore,
        http_client: reqwest::Client,
    ) -> Result<Self> {
        config.validate()?;
        let authenticator = Authenticator::with_client(&config, Arc::clone(&store), http_client);
        Self::assemble(config, store, authenticator)
    }

    fn assemble(
        config: ScanConfig,
        store: SharedStore,
        authenticator: Authenticator,
    ) -> Result<Self> {
        let scope = ScopeFilter::new(&config.base_url, &config.login_path);
        let referer = config.referer.clone().unwrap_or_else(|| config.base_url.clone());
        let referer =
            HeaderValue::from_str(&referer).map_err(|_| Error::invalid_header("Referer"))?;

        Ok(Self {
            scope,
            store,
            authenticator,
            refresh_margin: config.refresh_margin(),
            referer,
            refresh_lock: Mutex::new(()),
        })
    }

    /// Request-path hook: given the URL of a request about to be sent,
    /// mutate its headers so it carries the session credential.
    ///
    /// Out-of-scope requests and the login call itself pass through
    /// unchanged. When no credential can be obtained the request
    /// proceeds unauthenticated; that is a per-request degradation, not
    /// a fault. Re-running the hook on an already-mutated request yields
    /// the same headers.
    pub async fn before_send(&self, url: &str, headers: &mut HeaderMap) -> Result<InjectOutcome> {
        if !self.scope.in_scope(url) {
            return Ok(InjectOutcome::OutOfScope);
        }
        if self.scope.is_login_endpoint(url) {
            return Ok(InjectOutcome::LoginEndpoint);
        }

        let credential = match self.usable_credential().await {
            Some(credential) => credential,
            None => match self.refresh().await {
                Ok(credential) => credential,
                Err(e) => {
                    warn!(url, error = %e, "no credential available, proceeding unauthenticated");
                    return Ok(InjectOutcome::Unauthenticated);
                }
            },
        };

        self.inject(&credential, headers)?;
        debug!(url, "session credential injected");
        Ok(InjectOutcome::Injected)
    }

    /// Response-path hook: inspect a response for signals that the
    /// cached credential is no longer accepted, and drop it if so.
    /// Never mutates the response.
    pub async fn after_receive(
        &self,
        url: &str,
        status: StatusCode,
        headers: &HeaderMap,
    ) -> ResponseOutcome {
        if !self.scope.in_scope(url) {
            return ResponseOutcome::OutOfScope;
        }
        if self.scope.is_login_endpoint(url) {
            return ResponseOutcome::LoginEndpoint;
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.store.clear().await;
            info!(url, status = status.as_u16(), "credential invalidated by response status");
            return ResponseOutcome::Invalidated(InvalidationReason::Rejected {
                status: status.as_u16(),
            });
        }

        if status.is_redirection() {
            // a redirect without a Location header is not a login redirect
            if let Some(location) = headers.get(LOCATION).and_then(|v| v.to_str().ok()) {
                if self.scope.is_login_redirect(location) {
                    self.store.clear().await;
                    info!(url, location, "credential invalidated by login redirect");
                    return ResponseOutcome::Invalidated(InvalidationReason::LoginRedirect {
                        location: location.to_string(),
                    });
                }
            }
        }

        ResponseOutcome::Kept
    }

    /// Inject into a built [`reqwest::Request`] before execution.
    pub async fn prepare(&self, request: &mut reqwest::Request) -> Result<InjectOutcome> {
        let url = request.url().to_string();
        self.before_send(&url, request.headers_mut()).await
    }

    /// Observe a [`reqwest::Response`] after execution.
    pub async fn observe(&self, response: &reqwest::Response) -> ResponseOutcome {
        self.after_receive(response.url().as_str(), response.status(), response.headers())
            .await
    }

    /// The scope predicates this guard applies.
    pub fn scope(&self) -> &ScopeFilter {
        &self.scope
    }

    /// The cached credential, if the store currently holds a plausible,
    /// not-expiring-soon one.
    async fn usable_credential(&self) -> Option<Credential> {
        let credential = self.store.get().await?;
        if !credential.is_plausible() {
            debug!("stored credential below plausibility length, treating as absent");
            return None;
        }
        if credential.expires_within(self.refresh_margin) {
            debug!("stored credential expires within the refresh margin");
            return None;
        }
        Some(credential)
    }

    /// Log in, collapsing concurrent refreshes into one call.
    async fn refresh(&self) -> Result<Credential> {
        let _guard = self.refresh_lock.lock().await;

        // another task may have refreshed while we waited for the lock
        if let Some(credential) = self.usable_credential().await {
            return Ok(credential);
        }

        self.authenticator.login().await
    }

    /// Apply the additive, idempotent header mutations.
    fn inject(&self, credential: &Credential, headers: &mut HeaderMap) -> Result<()> {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", credential.token))
            .map_err(|_| Error::invalid_header("Authorization"))?;
        headers.insert(AUTHORIZATION, bearer);

        // never duplicate or overwrite an existing token entry;
        // unreadable cookie values are left alone
        let cookie = match headers.get(COOKIE) {
            None => Some(format!("token={}", credential.token)),
            Some(existing) => match existing.to_str() {
                Ok(existing) if !COOKIE_TOKEN.is_match(existing) => {
                    Some(format!("{existing}; token={}", credential.token))
                }
                _ => None,
            },
        };
        if let Some(cookie) = cookie {
            let cookie =
                HeaderValue::from_str(&cookie).map_err(|_| Error::invalid_header("Cookie"))?;
            headers.insert(COOKIE, cookie);
        }

        if !headers.contains_key(REFERER) {
            headers.insert(REFERER, self.referer.clone());
        }

        Ok(())
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("scope", &self.scope)
            .field("refresh_margin", &self.refresh_margin)
            .finish_non_exhaustive()
    }
}
