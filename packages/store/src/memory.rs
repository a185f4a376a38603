use std::sync::{Arc, Mutex};

use crate::models::AuthToken;
use crate::token::TokenStore;

/// In-memory TokenStore for tests and platforms without persistent storage.
///
/// Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore {
    token: Arc<Mutex<Option<AuthToken>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: AuthToken) -> Self {
        Self {
            token: Arc::new(Mutex::new(Some(token))),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<AuthToken>> {
        // A poisoned slot still holds a valid Option.
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<AuthToken> {
        self.slot().clone()
    }

    fn save(&self, token: &AuthToken) {
        *self.slot() = Some(token.clone());
    }

    fn clear(&self) {
        *self.slot() = None;
    }
}
