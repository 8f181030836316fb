//! # scanguard
//!
//! Transparent JWT session management for security scanner traffic.
//!
//! A scanner (crawler, fuzzer, active-scan engine) has no native notion
//! of authentication state. scanguard sits between the scanner and the
//! network as an interceptor: it logs in once, caches the session
//! credential process-wide, injects it into every in-scope request,
//! re-logs-in shortly before the token expires, and drops the credential
//! the moment the target answers 401/403 or redirects back to the login
//! page. The scanner keeps operating as if it were already
//! authenticated.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scanguard::{ScanConfig, SessionGuard};
//!
//! #[tokio::main]
//! async fn main() -> scanguard::Result<()> {
//!     let guard = SessionGuard::new(ScanConfig::from_env())?;
//!     let client = reqwest::Client::new();
//!
//!     let mut request = client.get("http://target:8080/api/users").build()?;
//!     guard.prepare(&mut request).await?;   // injects Authorization
//!     let response = client.execute(request).await?;
//!     guard.observe(&response).await;       // clears on 401/403/login redirect
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! scanner ──► before_send ─────────► network ─────────► after_receive
//!                │                                            │
//!                ├── ScopeFilter (in scope? login itself?)    │
//!                ├── CredentialStore ◄── clear on 401/403/────┘
//!                │        ▲              login redirect
//!                └── Authenticator (POST /login, single-flight)
//! ```
//!
//! No failure in this crate aborts the surrounding scan: a failed login
//! degrades the affected request to unauthenticated and is retried on
//! the next eligible one.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types for the guard
pub mod error;

/// Guard configuration
pub mod config;

/// Expiry extraction from compact JWTs
pub mod claims;

/// Credential storage
pub mod store;

/// Login exchange
pub mod auth;

/// Scope predicates
pub mod scope;

/// Request/response interception
pub mod guard;

/// Command-line interface
pub mod cli;

pub use auth::{Authenticator, Credential};
pub use config::ScanConfig;
pub use error::{Error, Result};
pub use guard::{InjectOutcome, Interceptor, InvalidationReason, ResponseOutcome, SessionGuard};
pub use scope::ScopeFilter;
pub use store::{CredentialStore, MemoryStore, SharedStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
