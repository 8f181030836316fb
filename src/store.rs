//! Process-wide credential slot
//!
//! The original host kept the session token in a global variable
//! facility. Here the slot is behind an injectable trait so the guard
//! can be constructed with test doubles or a host-specific backing.
//! Operations are atomic per call; the read-check-refresh-write sequence
//! around them is deliberately not a single transaction (see
//! [`SessionGuard`](crate::guard::SessionGuard) for the refresh
//! coordination).

use crate::auth::Credential;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared handle to a credential store
pub type SharedStore = Arc<dyn CredentialStore>;

/// Single-slot storage for the current session credential
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current credential, if any.
    async fn get(&self) -> Option<Credential>;

    /// Replace the current credential. Last write wins.
    async fn set(&self, credential: Credential);

    /// Drop the current credential.
    async fn clear(&self);
}

/// In-memory credential store
///
/// Readers always see either the previous or the new whole value, never
/// a partial write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self) -> Option<Credential> {
        self.slot.read().await.clone()
    }

    async fn set(&self, credential: Credential) {
        *self.slot.write().await = Some(credential);
    }

    async fn clear(&self) {
        *self.slot.write().await = None;
    }
}
