//! Shared token store constructor for all platforms.
//!
//! Returns the [`store::TokenStore`] the session token lives in:
//! - **Web** (WASM + `web` feature): browser localStorage via [`store::LocalStorageTokenStore`]
//! - **Desktop / Mobile** (native): a file under the platform data dir via [`store::FileTokenStore`]
//! - anything else: [`store::MemoryTokenStore`], so the session ends with the process

use store::ClientConfig;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub type PlatformTokenStore = store::LocalStorageTokenStore;
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformTokenStore = store::FileTokenStore;
#[cfg(all(target_arch = "wasm32", not(feature = "web")))]
pub type PlatformTokenStore = store::MemoryTokenStore;

/// Create the platform token store, keyed by `auth.token_key`.
pub fn make_token_store(config: &ClientConfig) -> PlatformTokenStore {
    let key = config.auth.token_key.as_str();
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        store::LocalStorageTokenStore::new(key)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let base = dirs::data_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("hospital-records");
        store::FileTokenStore::new(base, key)
    }
    #[cfg(all(target_arch = "wasm32", not(feature = "web")))]
    {
        let _ = key;
        store::MemoryTokenStore::new()
    }
}
