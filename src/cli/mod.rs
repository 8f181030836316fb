//! CLI module
//!
//! Operator diagnostics for a guarded scan target.
//!
//! # Commands
//!
//! - `check` - Probe the login endpoint with the configured credentials
//! - `inspect` - Decode the expiry claim of a token
//! - `validate` - Validate the guard configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
