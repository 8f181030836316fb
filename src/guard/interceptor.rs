//! Interceptor seam for HTTP client middleware chains
//!
//! Hosts that drive their own client stack register the guard through
//! this trait: call `before_send` with each outbound request's URL and
//! headers, and `after_receive` with each response's URL, status, and
//! headers. Responses are read-only.

use super::types::{InjectOutcome, ResponseOutcome};
use super::SessionGuard;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// Two-method hook interface for outbound traffic.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Invoked before each outbound request; may mutate headers. Must
    /// never block past the login call's own timeout.
    async fn before_send(&self, url: &str, headers: &mut HeaderMap) -> Result<InjectOutcome>;

    /// Invoked after each response arrives; read-only.
    async fn after_receive(
        &self,
        url: &str,
        status: StatusCode,
        headers: &HeaderMap,
    ) -> ResponseOutcome;
}

#[async_trait]
impl Interceptor for SessionGuard {
    async fn before_send(&self, url: &str, headers: &mut HeaderMap) -> Result<InjectOutcome> {
        SessionGuard::before_send(self, url, headers).await
    }

    async fn after_receive(
        &self,
        url: &str,
        status: StatusCode,
        headers: &HeaderMap,
    ) -> ResponseOutcome {
        SessionGuard::after_receive(self, url, status, headers).await
    }
}
