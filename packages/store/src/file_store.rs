//! # Filesystem-backed token store
//!
//! [`FileTokenStore`] keeps the session token in a single file so desktop and
//! mobile builds stay signed in across restarts.
//!
//! ```text
//! <base_dir>/
//! └── <key>        # the raw token, no trailing newline
//! ```
//!
//! Use [`dirs::data_dir()`] joined with `hospital-records` as the base:
//!
//! | Platform | Path |
//! |----------|------|
//! | macOS / iOS | `~/Library/Application Support/hospital-records/` |
//! | Linux | `~/.local/share/hospital-records/` |
//! | Windows | `C:\Users\<user>\AppData\Roaming\hospital-records\` |
//!
//! [`dirs::data_dir()`]: https://docs.rs/dirs

use std::path::PathBuf;

use tracing::warn;

use crate::models::AuthToken;
use crate::token::TokenStore;

#[derive(Clone, Debug)]
pub struct FileTokenStore {
    base: PathBuf,
    key: String,
}

impl FileTokenStore {
    pub fn new(base: PathBuf, key: impl Into<String>) -> Self {
        Self {
            base,
            key: key.into(),
        }
    }

    fn path(&self) -> PathBuf {
        self.base.join(&self.key)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<AuthToken> {
        let content = std::fs::read_to_string(self.path()).ok()?;
        AuthToken::new(content.trim()).ok()
    }

    fn save(&self, token: &AuthToken) {
        if let Err(e) = std::fs::create_dir_all(&self.base) {
            warn!("failed to create token directory {}: {e}", self.base.display());
            return;
        }
        if let Err(e) = std::fs::write(self.path(), token.as_str()) {
            warn!("failed to persist session token: {e}");
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(self.path()) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to remove session token: {e}"),
        }
    }
}
