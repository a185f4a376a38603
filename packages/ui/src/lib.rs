//! This crate contains all shared UI for the workspace.

mod tokens;
pub use tokens::{make_token_store, PlatformTokenStore};

mod app;
pub use app::{use_app, AppHandle, AppProvider, Context};

mod auth;
pub use auth::{use_cancel_on_drop, use_session, LogoutButton};

mod components;
pub use components::{EnvelopeStatus, ErrorBanner, FieldError, StatusBadge};

mod navbar;
pub use navbar::Navbar;
