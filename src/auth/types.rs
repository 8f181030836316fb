//! Credential and login wire types

use crate::claims;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Stored values shorter than this are treated as absent. Defends
/// against empty-string or malformed stored tokens.
pub const MIN_TOKEN_LEN: usize = 10;

/// A session credential: the raw bearer token plus the expiry decoded
/// from its claims payload, when readable.
///
/// Immutable once obtained. Created by the authenticator on a
/// successful login, read by the guard on every request, and dropped on
/// an invalidation signal or shortly before expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// The raw token, without any header scheme prefix
    pub token: String,
    /// When the token expires, if its `exp` claim was readable
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Build a credential from a raw token, decoding its expiry claim.
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let millis = claims::decode_expiry_millis(&token);
        let expires_at = if millis > 0 {
            Utc.timestamp_millis_opt(millis).single()
        } else {
            None
        };

        Self { token, expires_at }
    }

    /// Whether the stored value is long enough to be a real token.
    pub fn is_plausible(&self) -> bool {
        self.token.len() >= MIN_TOKEN_LEN
    }

    /// Whether the credential expires within `margin` from now. An
    /// unknown expiry never reports as expiring; such a credential stays
    /// in use until an explicit invalidation signal.
    pub fn expires_within(&self, margin: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + margin >= expires_at,
            None => false,
        }
    }
}

/// Body of the login request
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of the login response
///
/// Endpoints differ on whether they send a `success` flag; an absent
/// flag counts as success when a token is present.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// The issued session token
    #[serde(default)]
    pub token: Option<String>,
    /// Explicit success indicator, when the endpoint provides one
    #[serde(default)]
    pub success: Option<bool>,
    /// Human-readable status message, when provided
    #[serde(default)]
    pub message: Option<String>,
}

impl LoginResponse {
    /// Whether the endpoint accepted the login.
    pub fn accepted(&self) -> bool {
        self.success.unwrap_or(true)
    }

    /// The issued token, when present and non-empty.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}
