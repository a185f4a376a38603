//! # Browser localStorage token store
//!
//! [`LocalStorageTokenStore`] is the [`TokenStore`] used on the web platform.
//! The token lives under a single localStorage key (`"token"` by default), so
//! a reload or a second tab picks up the same session.
//!
//! Storage can be unavailable (private browsing, sandboxed iframes); every
//! method then degrades to "no token" instead of failing.

use tracing::warn;

use crate::models::AuthToken;
use crate::token::TokenStore;

#[derive(Clone, Debug)]
pub struct LocalStorageTokenStore {
    key: String,
}

impl LocalStorageTokenStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl TokenStore for LocalStorageTokenStore {
    fn load(&self) -> Option<AuthToken> {
        let raw = Self::storage()?.get_item(&self.key).ok().flatten()?;
        AuthToken::new(raw).ok()
    }

    fn save(&self, token: &AuthToken) {
        let Some(storage) = Self::storage() else {
            warn!("localStorage unavailable; session will not survive a reload");
            return;
        };
        if storage.set_item(&self.key, token.as_str()).is_err() {
            warn!("failed to write session token to localStorage");
        }
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(&self.key);
        }
    }
}
