//! Login exchange
//!
//! Builds the POST login request, waits for the full response, and
//! publishes the credential to the store on success. The store is never
//! touched on failure, so a rejected login cannot clobber a still-valid
//! cached credential.

use super::types::{Credential, LoginRequest, LoginResponse};
use crate::config::ScanConfig;
use crate::error::{Error, Result};
use crate::store::{CredentialStore, SharedStore};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

/// Longest response-body slice carried into errors and log lines.
const BODY_SNIPPET_LEN: usize = 256;

/// Performs the login exchange against the configured endpoint.
pub struct Authenticator {
    login_url: String,
    request: LoginRequest,
    http_client: Client,
    store: SharedStore,
}

impl Authenticator {
    /// Create an authenticator with its own HTTP client, using the
    /// configured timeout.
    pub fn new(config: &ScanConfig, store: SharedStore) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(Error::Http)?;
        Ok(Self::with_client(config, store, http_client))
    }

    /// Create an authenticator sharing an existing client, so the login
    /// call follows the same timeout and transport policy as ordinary
    /// outbound requests.
    pub fn with_client(config: &ScanConfig, store: SharedStore, http_client: Client) -> Self {
        Self {
            login_url: config.login_url(),
            request: LoginRequest {
                email: config.email.clone(),
                password: config.password.clone(),
            },
            http_client,
            store,
        }
    }

    /// Perform the login exchange and store the credential on success.
    ///
    /// Success requires HTTP 200, a JSON body, an absent-or-true
    /// `success` flag, and a non-empty `token`. On any failure the store
    /// is untouched and the error is typed; callers treat it as
    /// "credential unavailable" for the current request.
    pub async fn login(&self) -> Result<Credential> {
        debug!(url = %self.login_url, "attempting login");

        let response = self
            .http_client
            .post(&self.login_url)
            .json(&self.request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), body = snippet(&body), "login failed");
            return Err(Error::login_failed(status.as_u16(), snippet(&body)));
        }

        let parsed: LoginResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, body = snippet(&body), "login response was not valid JSON");
                return Err(Error::login_failed(status.as_u16(), snippet(&body)));
            }
        };

        if !parsed.accepted() {
            let message = parsed
                .message
                .unwrap_or_else(|| "endpoint reported failure".to_string());
            warn!(%message, "login rejected");
            return Err(Error::login_rejected(message));
        }

        let token = match parsed.token() {
            Some(token) => token,
            None => {
                warn!(body = snippet(&body), "login response carried no token");
                return Err(Error::TokenMissing);
            }
        };

        let credential = Credential::from_token(token);
        self.store.set(credential.clone()).await;
        info!(expires_at = ?credential.expires_at, "login succeeded");

        Ok(credential)
    }

    /// URL of the login endpoint this authenticator targets.
    pub fn login_url(&self) -> &str {
        &self.login_url
    }
}

/// Truncate a body for logs and error payloads.
pub(crate) fn snippet(body: &str) -> &str {
    match body.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
