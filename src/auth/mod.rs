//! Login exchange and credential types
//!
//! The `Authenticator` performs the login exchange against the
//! configured endpoint and publishes the resulting credential to the
//! store. Failures are typed; the guard decides how to degrade.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{Credential, LoginRequest, LoginResponse, MIN_TOKEN_LEN};
